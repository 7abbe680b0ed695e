//! Runtime credential management. The key itself is never echoed back.

use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct ApiKeyStatus {
    pub configured: bool,
    pub model: String,
}

#[derive(Debug, Deserialize)]
pub struct SetApiKeyRequest {
    /// `null` or blank clears the key.
    pub api_key: Option<String>,
}

async fn status(state: &AppState) -> ApiKeyStatus {
    ApiKeyStatus {
        configured: state.llm.has_credential().await,
        model: state.llm.model().to_string(),
    }
}

/// GET /api/v1/settings/api-key
pub async fn handle_api_key_status(State(state): State<AppState>) -> Json<ApiKeyStatus> {
    Json(status(&state).await)
}

/// PUT /api/v1/settings/api-key
pub async fn handle_set_api_key(
    State(state): State<AppState>,
    Json(req): Json<SetApiKeyRequest>,
) -> Json<ApiKeyStatus> {
    state.llm.set_api_key(req.api_key).await;
    let status = status(&state).await;
    info!("API key updated (configured: {})", status.configured);
    Json(status)
}
