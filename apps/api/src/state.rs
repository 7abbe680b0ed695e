use crate::config::Config;
use crate::llm_client::LlmClient;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    /// Completion client. Its API key can be replaced at runtime.
    pub llm: LlmClient,
    pub config: Config,
}
