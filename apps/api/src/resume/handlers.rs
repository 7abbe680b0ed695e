//! Axum route handlers for the document and résumé API.

use std::io::Write;
use std::path::Path;

use anyhow::Context;
use axum::{
    extract::{Multipart, State},
    Json,
};
use bytes::Bytes;
use serde::Serialize;
use tracing::{debug, info};

use crate::document::sections::SectionMap;
use crate::document::{lowercase_extension, parse_document, DocumentFormat, ParsedDocument};
use crate::errors::AppError;
use crate::llm_client::LlmError;
use crate::render::render_preview;
use crate::resume::generator::{run_generation, GenerationOutcome};
use crate::resume::models::UserInfoRecord;
use crate::resume::optimizer::{run_optimization, OptimizationOutcome};
use crate::state::AppState;

// ────────────────────────────────────────────────────────────────────────────
// Uploads
// ────────────────────────────────────────────────────────────────────────────

/// A résumé file received in a multipart request.
#[derive(Debug, Clone)]
pub struct UploadedFile {
    pub file_name: String,
    pub bytes: Bytes,
}

impl UploadedFile {
    /// Extracts the upload and detects its sections on the blocking pool.
    pub async fn parse(self) -> Result<ParsedDocument, AppError> {
        tokio::task::spawn_blocking(move || self.parse_blocking())
            .await
            .map_err(anyhow::Error::from)?
    }

    /// Extraction works on paths, so the bytes are spilled to a temp file that
    /// keeps the original extension. The file is removed on drop.
    fn parse_blocking(&self) -> Result<ParsedDocument, AppError> {
        let extension = lowercase_extension(Path::new(&self.file_name));
        DocumentFormat::from_extension(&extension)?;

        let mut spill = tempfile::Builder::new()
            .prefix("resume-upload-")
            .suffix(&extension)
            .tempfile()
            .context("Failed to create upload spill file")?;
        spill
            .write_all(&self.bytes)
            .and_then(|_| spill.flush())
            .context("Failed to write upload spill file")?;
        debug!("Spilled upload {} to {}", self.file_name, spill.path().display());

        Ok(parse_document(spill.path())?)
    }
}

#[derive(Debug, Default)]
struct ResumeUpload {
    file: Option<UploadedFile>,
    job_description: Option<String>,
}

fn invalid_upload(e: impl std::fmt::Display) -> AppError {
    AppError::Validation(format!("Invalid upload: {e}"))
}

/// Reads the `file` and optional `job_description` fields; others are ignored.
async fn read_upload(mut multipart: Multipart) -> Result<ResumeUpload, AppError> {
    let mut upload = ResumeUpload::default();

    while let Some(field) = multipart.next_field().await.map_err(invalid_upload)? {
        let name = field.name().map(str::to_owned);
        match name.as_deref() {
            Some("file") => {
                let file_name = field.file_name().unwrap_or_default().to_string();
                let bytes = field.bytes().await.map_err(invalid_upload)?;
                upload.file = Some(UploadedFile { file_name, bytes });
            }
            Some("job_description") => {
                upload.job_description = Some(field.text().await.map_err(invalid_upload)?);
            }
            _ => {}
        }
    }

    Ok(upload)
}

fn require_file(upload: &mut ResumeUpload) -> Result<UploadedFile, AppError> {
    upload
        .file
        .take()
        .ok_or_else(|| AppError::Validation("Please select a resume file first.".to_string()))
}

// ────────────────────────────────────────────────────────────────────────────
// Request / Response types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
pub struct ParseDocumentResponse {
    pub file_name: String,
    pub text: String,
    /// `null` when no section header was found.
    pub sections: Option<SectionMap>,
}

#[derive(Debug, Serialize)]
pub struct OptimizeResponse {
    pub sections: Option<SectionMap>,
    #[serde(flatten)]
    pub outcome: OptimizationOutcome,
}

#[derive(Debug, Serialize)]
pub struct PreviewResponse {
    pub preview: String,
}

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// POST /api/v1/documents/parse
///
/// Extracts text from an uploaded résumé and reports detected sections.
/// No AI call is made.
pub async fn handle_parse_document(
    multipart: Multipart,
) -> Result<Json<ParseDocumentResponse>, AppError> {
    let mut upload = read_upload(multipart).await?;
    let file = require_file(&mut upload)?;
    let file_name = file.file_name.clone();

    let parsed = file.parse().await?;
    info!(
        "Parsed {file_name}: {} chars, {} sections",
        parsed.text.len(),
        parsed.sections.sections().map_or(0, |s| s.len())
    );

    Ok(Json(ParseDocumentResponse {
        file_name,
        text: parsed.text,
        sections: parsed.sections.into_sections(),
    }))
}

/// POST /api/v1/resumes/optimize
///
/// Multipart: `file` (required), `job_description` (optional).
pub async fn handle_optimize(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<Json<OptimizeResponse>, AppError> {
    if !state.llm.has_credential().await {
        return Err(LlmError::MissingCredential.into());
    }

    let mut upload = read_upload(multipart).await?;
    let file = require_file(&mut upload)?;
    let parsed = file.parse().await?;

    let outcome = run_optimization(
        &state.llm,
        &state.config.output_dir,
        &parsed.text,
        upload.job_description.as_deref(),
    )
    .await?;

    Ok(Json(OptimizeResponse {
        sections: parsed.sections.into_sections(),
        outcome,
    }))
}

/// POST /api/v1/resumes/generate
///
/// The record is validated before the credential is checked, so input
/// errors are reported even without a key.
pub async fn handle_generate(
    State(state): State<AppState>,
    Json(info): Json<UserInfoRecord>,
) -> Result<Json<GenerationOutcome>, AppError> {
    let outcome = run_generation(&state.llm, &state.config.output_dir, &info).await?;
    Ok(Json(outcome))
}

/// POST /api/v1/resumes/preview
///
/// Renders the record as entered. Works without an API key.
pub async fn handle_preview(Json(info): Json<UserInfoRecord>) -> Json<PreviewResponse> {
    Json(PreviewResponse {
        preview: render_preview(&info),
    })
}
