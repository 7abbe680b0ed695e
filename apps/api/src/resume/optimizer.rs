//! Résumé optimization: one completion call per request, no retries.

use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::info;

use crate::errors::AppError;
use crate::llm_client::{LlmClient, LlmError};
use crate::render::{render_text, write_output, Operation};
use crate::resume::models::OptimizationResult;
use crate::resume::prompts::build_optimization_prompt;
use crate::resume::recovery::recover;

/// An optimization result and the file it was saved to.
#[derive(Debug, Clone, Serialize)]
pub struct OptimizationOutcome {
    pub result: OptimizationResult,
    pub output_path: PathBuf,
}

/// Asks the model to optimize `resume_text`, optionally tailored to a job.
///
/// Fails only when the request itself fails. A reply that is not the
/// requested JSON still yields a result (see `resume::recovery`).
pub async fn optimize_resume(
    llm: &LlmClient,
    resume_text: &str,
    job_description: Option<&str>,
) -> Result<OptimizationResult, LlmError> {
    let prompt = build_optimization_prompt(resume_text, job_description);
    let envelope = llm.complete(&prompt).await?;
    Ok(recover::<OptimizationResult>(&envelope))
}

/// Optimizes extracted résumé text, then renders and saves the result.
pub async fn run_optimization(
    llm: &LlmClient,
    output_dir: &Path,
    resume_text: &str,
    job_description: Option<&str>,
) -> Result<OptimizationOutcome, AppError> {
    info!(
        "Optimizing resume ({} chars, tailored: {})",
        resume_text.len(),
        job_description.is_some_and(|j| !j.trim().is_empty())
    );

    let result = optimize_resume(llm, resume_text, job_description).await?;
    let output_path = write_output(output_dir, Operation::Optimized, &render_text(&result)).await?;

    Ok(OptimizationOutcome {
        result,
        output_path,
    })
}
