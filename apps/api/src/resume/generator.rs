//! Résumé generation from a user-information record.

use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::info;

use crate::errors::AppError;
use crate::llm_client::{LlmClient, LlmError};
use crate::render::{render_text, write_output, Operation};
use crate::resume::models::{text_of, GenerationResult, UserInfoRecord};
use crate::resume::prompts::build_generation_prompt;
use crate::resume::recovery::recover;

/// A generated résumé and the file it was saved to.
#[derive(Debug, Clone, Serialize)]
pub struct GenerationOutcome {
    pub result: GenerationResult,
    pub output_path: PathBuf,
}

/// Asks the model to write a résumé from `info`. The record is not
/// validated here.
pub async fn generate_resume(
    llm: &LlmClient,
    info: &UserInfoRecord,
) -> Result<GenerationResult, LlmError> {
    let prompt = build_generation_prompt(info);
    let envelope = llm.complete(&prompt).await?;
    Ok(recover::<GenerationResult>(&envelope))
}

/// Validates the record, generates a résumé from it, then renders and saves it.
pub async fn run_generation(
    llm: &LlmClient,
    output_dir: &Path,
    info: &UserInfoRecord,
) -> Result<GenerationOutcome, AppError> {
    info.validate()?;
    info!("Generating resume for {}", text_of(&info.contact.name).trim());

    let result = generate_resume(llm, info).await?;
    let output_path = write_output(output_dir, Operation::Generated, &render_text(&result)).await?;

    Ok(GenerationOutcome {
        result,
        output_path,
    })
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::llm_client::testing::{settings, FakeTransport};
    use crate::render::ATTRIBUTION_FOOTER;
    use crate::resume::models::ContactInfo;
    use crate::resume::recovery::{FALLBACK_ADDITIONAL, FALLBACK_SUMMARY};

    fn record() -> UserInfoRecord {
        UserInfoRecord {
            contact: ContactInfo {
                name: Some("Jane Doe".to_string()),
                email: Some("jane@example.com".to_string()),
                ..Default::default()
            },
            experience: Some("Engineer at Acme".to_string()),
            education: Some("BSc CS".to_string()),
            target_job: Some("Staff Engineer".to_string()),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_generation_saves_rendered_sections() {
        let output = tempfile::tempdir().unwrap();
        let reply = json!({"content": {
            "summary": "Seasoned engineer",
            "experience": "Acme: shipped billing",
            "education": "BSc CS",
            "skills": "",
            "additional": ""
        }})
        .to_string();
        let fake = FakeTransport::with_reply_text(&reply);
        let llm = LlmClient::with_transport(settings(Some("sk-test")), fake.clone());

        let outcome = run_generation(&llm, output.path(), &record()).await.unwrap();

        assert_eq!(outcome.result.summary, "Seasoned engineer");
        let calls = fake.calls.lock().unwrap();
        let prompt = calls[0].2["messages"][1]["content"].as_str().unwrap();
        assert!(prompt.contains("for Jane Doe"));
        assert!(prompt.contains("TARGET JOB/ROLE: Staff Engineer"));

        let name = outcome.output_path.file_name().unwrap().to_str().unwrap();
        assert!(name.starts_with("Generated_Resume_"));
        let saved = std::fs::read_to_string(&outcome.output_path).unwrap();
        assert!(saved.starts_with("SUMMARY\n"));
        assert!(saved.contains("EXPERIENCE\n--------------------\nAcme: shipped billing\n"));
        assert!(!saved.contains("SKILLS"));
        assert!(saved.ends_with(ATTRIBUTION_FOOTER));
    }

    #[tokio::test]
    async fn test_invalid_record_never_calls_the_model() {
        let output = tempfile::tempdir().unwrap();
        let fake = FakeTransport::with_reply_text("{}");
        let llm = LlmClient::with_transport(settings(Some("sk-test")), fake.clone());

        let mut info = record();
        info.experience = None;
        let err = run_generation(&llm, output.path(), &info).await.unwrap_err();

        assert!(matches!(err, AppError::Validation(ref m) if m.contains("work experience")));
        assert_eq!(fake.call_count(), 0);
    }

    #[tokio::test]
    async fn test_plain_reply_becomes_fallback() {
        let fake = FakeTransport::with_reply_text("Jane Doe\nEngineer at Acme");
        let llm = LlmClient::with_transport(settings(Some("sk-test")), fake);

        let result = generate_resume(&llm, &record()).await.unwrap();

        assert_eq!(result.summary, FALLBACK_SUMMARY);
        assert_eq!(result.experience, "Jane Doe\nEngineer at Acme");
        assert_eq!(result.additional, FALLBACK_ADDITIONAL);
    }

    #[tokio::test]
    async fn test_network_failure_surfaces() {
        let output = tempfile::tempdir().unwrap();
        let fake = FakeTransport::unreachable("connection refused");
        let llm = LlmClient::with_transport(settings(Some("sk-test")), fake);

        let err = run_generation(&llm, output.path(), &record()).await.unwrap_err();

        assert!(matches!(
            err,
            AppError::Llm(LlmError::RequestFailed { status: None, .. })
        ));
    }
}
