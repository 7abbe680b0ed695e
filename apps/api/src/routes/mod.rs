pub mod health;
pub mod settings;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};

use crate::resume::handlers;
use crate::state::AppState;

/// Largest accepted request body. Résumé uploads are small.
const MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        // Documents
        .route(
            "/api/v1/documents/parse",
            post(handlers::handle_parse_document),
        )
        // Resumes
        .route("/api/v1/resumes/optimize", post(handlers::handle_optimize))
        .route("/api/v1/resumes/generate", post(handlers::handle_generate))
        .route("/api/v1/resumes/preview", post(handlers::handle_preview))
        // Settings
        .route(
            "/api/v1/settings/api-key",
            get(settings::handle_api_key_status).put(settings::handle_set_api_key),
        )
        .layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES))
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use std::path::Path;
    use std::sync::Arc;

    use axum::{
        body::Body,
        http::{header, Request, StatusCode},
    };
    use serde_json::{json, Value};
    use tower::ServiceExt;

    use super::*;
    use crate::config::Config;
    use crate::llm_client::testing::{settings as llm_settings, FakeTransport};
    use crate::llm_client::LlmClient;

    const BOUNDARY: &str = "resume-test-boundary";
    const RESUME: &str = "EXPERIENCE\nEngineer at Acme, 2020-2023\n\nEDUCATION\nBSc CS, 2020";

    fn app(api_key: Option<&str>, fake: Arc<FakeTransport>, output_dir: &Path) -> Router {
        build_router(AppState {
            llm: LlmClient::with_transport(llm_settings(api_key), fake),
            config: Config::for_tests(output_dir.to_path_buf()),
        })
    }

    /// (field name, file name, contents)
    fn multipart(parts: &[(&str, Option<&str>, &[u8])]) -> Body {
        let mut body = Vec::new();
        for (name, file_name, contents) in parts {
            body.extend_from_slice(format!("--{BOUNDARY}\r\n").as_bytes());
            let disposition = match file_name {
                Some(file_name) => {
                    format!("Content-Disposition: form-data; name=\"{name}\"; filename=\"{file_name}\"\r\n\r\n")
                }
                None => format!("Content-Disposition: form-data; name=\"{name}\"\r\n\r\n"),
            };
            body.extend_from_slice(disposition.as_bytes());
            body.extend_from_slice(contents);
            body.extend_from_slice(b"\r\n");
        }
        body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());
        Body::from(body)
    }

    fn multipart_request(uri: &str, parts: &[(&str, Option<&str>, &[u8])]) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header(
                header::CONTENT_TYPE,
                format!("multipart/form-data; boundary={BOUNDARY}"),
            )
            .body(multipart(parts))
            .unwrap()
    }

    fn json_request(method: &str, uri: &str, body: Value) -> Request<Body> {
        Request::builder()
            .method(method)
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    async fn send(app: Router, request: Request<Body>) -> (StatusCode, Value) {
        let response = app.oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, serde_json::from_slice(&bytes).unwrap_or(Value::Null))
    }

    fn valid_record() -> Value {
        json!({
            "contact": {"name": "Jane Doe", "email": "jane@example.com"},
            "experience": "Engineer at Acme",
            "education": "BSc CS"
        })
    }

    #[tokio::test]
    async fn test_health() {
        let dir = tempfile::tempdir().unwrap();
        let app = app(None, FakeTransport::with_reply_text("{}"), dir.path());
        let request = Request::builder().uri("/health").body(Body::empty()).unwrap();

        let (status, body) = send(app, request).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["service"], "resume-api");
    }

    #[tokio::test]
    async fn test_parse_document_reports_sections() {
        let dir = tempfile::tempdir().unwrap();
        let app = app(None, FakeTransport::with_reply_text("{}"), dir.path());
        let request = multipart_request(
            "/api/v1/documents/parse",
            &[("file", Some("resume.txt"), RESUME.as_bytes())],
        );

        let (status, body) = send(app, request).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["file_name"], "resume.txt");
        assert_eq!(body["text"], RESUME);
        assert_eq!(body["sections"]["experience"], "Engineer at Acme, 2020-2023");
        assert_eq!(body["sections"]["education"], "BSc CS, 2020");
    }

    #[tokio::test]
    async fn test_parse_document_without_headers_has_null_sections() {
        let dir = tempfile::tempdir().unwrap();
        let app = app(None, FakeTransport::with_reply_text("{}"), dir.path());
        let request = multipart_request(
            "/api/v1/documents/parse",
            &[("file", Some("notes.txt"), b"just some prose".as_slice())],
        );

        let (status, body) = send(app, request).await;

        assert_eq!(status, StatusCode::OK);
        assert!(body["sections"].is_null());
    }

    #[tokio::test]
    async fn test_parse_document_rejects_unsupported_format() {
        let dir = tempfile::tempdir().unwrap();
        let app = app(None, FakeTransport::with_reply_text("{}"), dir.path());
        let request = multipart_request(
            "/api/v1/documents/parse",
            &[("file", Some("resume.rtf"), b"{\\rtf1}".as_slice())],
        );

        let (status, body) = send(app, request).await;

        assert_eq!(status, StatusCode::UNSUPPORTED_MEDIA_TYPE);
        assert_eq!(body["error"]["code"], "UNSUPPORTED_FORMAT");
    }

    #[tokio::test]
    async fn test_parse_document_requires_file() {
        let dir = tempfile::tempdir().unwrap();
        let app = app(None, FakeTransport::with_reply_text("{}"), dir.path());
        let request = multipart_request(
            "/api/v1/documents/parse",
            &[("job_description", None, b"Rust role".as_slice())],
        );

        let (status, body) = send(app, request).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["code"], "VALIDATION_ERROR");
    }

    #[tokio::test]
    async fn test_optimize_without_key_is_a_configuration_error() {
        let dir = tempfile::tempdir().unwrap();
        let fake = FakeTransport::with_reply_text("{}");
        let app = app(None, fake.clone(), dir.path());
        let request = multipart_request(
            "/api/v1/resumes/optimize",
            &[("file", Some("resume.txt"), RESUME.as_bytes())],
        );

        let (status, body) = send(app, request).await;

        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(body["error"]["code"], "MISSING_CREDENTIAL");
        assert!(body["error"]["message"]
            .as_str()
            .unwrap()
            .contains("OPENROUTER_API_KEY"));
        assert_eq!(fake.call_count(), 0);
    }

    #[tokio::test]
    async fn test_optimize_end_to_end() {
        let dir = tempfile::tempdir().unwrap();
        let fake = FakeTransport::with_reply_text(
            r#"{"optimized_content":"X","improvements":["a"],"suggestions":["b"]}"#,
        );
        let app = app(Some("sk-test"), fake.clone(), dir.path());
        let request = multipart_request(
            "/api/v1/resumes/optimize",
            &[
                ("file", Some("Resume.TXT"), RESUME.as_bytes()),
                ("job_description", None, b"Senior Rust engineer".as_slice()),
            ],
        );

        let (status, body) = send(app, request).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["result"]["optimized_content"], "X");
        assert_eq!(body["result"]["improvements"], json!(["a"]));
        assert_eq!(body["sections"]["experience"], "Engineer at Acme, 2020-2023");

        let calls = fake.calls.lock().unwrap();
        let prompt = calls[0].2["messages"][1]["content"].as_str().unwrap();
        assert!(prompt.contains("Senior Rust engineer"));

        let output_path = body["output_path"].as_str().unwrap();
        let saved = std::fs::read_to_string(output_path).unwrap();
        assert!(saved.contains("- a"));
        assert!(saved.contains("- b"));
    }

    #[tokio::test]
    async fn test_upstream_failure_is_bad_gateway() {
        let dir = tempfile::tempdir().unwrap();
        let app = app(
            Some("sk-test"),
            FakeTransport::replying(401, r#"{"error":"invalid key"}"#),
            dir.path(),
        );
        let request = multipart_request(
            "/api/v1/resumes/optimize",
            &[("file", Some("resume.txt"), RESUME.as_bytes())],
        );

        let (status, body) = send(app, request).await;

        assert_eq!(status, StatusCode::BAD_GATEWAY);
        assert_eq!(body["error"]["code"], "REQUEST_FAILED");
    }

    #[tokio::test]
    async fn test_generate_validates_before_credential_check() {
        let dir = tempfile::tempdir().unwrap();
        let app = app(None, FakeTransport::with_reply_text("{}"), dir.path());
        let request = json_request(
            "POST",
            "/api/v1/resumes/generate",
            json!({"contact": {"name": ""}}),
        );

        let (status, body) = send(app, request).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["message"], "Please enter your name.");
    }

    #[tokio::test]
    async fn test_generate_without_key() {
        let dir = tempfile::tempdir().unwrap();
        let fake = FakeTransport::with_reply_text("{}");
        let app = app(None, fake.clone(), dir.path());
        let request = json_request("POST", "/api/v1/resumes/generate", valid_record());

        let (status, body) = send(app, request).await;

        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(body["error"]["code"], "MISSING_CREDENTIAL");
        assert_eq!(fake.call_count(), 0);
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
    }

    #[tokio::test]
    async fn test_null_style_fields_take_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let app = app(None, FakeTransport::with_reply_text("{}"), dir.path());
        let mut record = valid_record();
        record["style"] = json!({"tone": null, "auto_skills": null});
        let request = json_request("POST", "/api/v1/resumes/preview", record);

        let (status, body) = send(app, request).await;

        assert_eq!(status, StatusCode::OK);
        assert!(body["preview"].as_str().unwrap().starts_with("JANE DOE\n"));
    }

    #[tokio::test]
    async fn test_generate_end_to_end() {
        let dir = tempfile::tempdir().unwrap();
        let reply = json!({"content": {
            "summary": "S", "experience": "E", "education": "Ed", "skills": "Sk", "additional": "A"
        }})
        .to_string();
        let app = app(
            Some("sk-test"),
            FakeTransport::with_reply_text(&reply),
            dir.path(),
        );
        let request = json_request("POST", "/api/v1/resumes/generate", valid_record());

        let (status, body) = send(app, request).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["result"]["skills"], "Sk");
        let output_path = body["output_path"].as_str().unwrap();
        assert!(output_path.contains("Generated_Resume_"));
    }

    #[tokio::test]
    async fn test_preview_needs_no_key() {
        let dir = tempfile::tempdir().unwrap();
        let fake = FakeTransport::with_reply_text("{}");
        let app = app(None, fake.clone(), dir.path());
        let request = json_request("POST", "/api/v1/resumes/preview", valid_record());

        let (status, body) = send(app, request).await;

        assert_eq!(status, StatusCode::OK);
        assert!(body["preview"].as_str().unwrap().starts_with("JANE DOE\n"));
        assert_eq!(fake.call_count(), 0);
    }

    #[tokio::test]
    async fn test_api_key_can_be_set_at_runtime() {
        let dir = tempfile::tempdir().unwrap();
        let app = app(None, FakeTransport::with_reply_text("{}"), dir.path());

        let request = Request::builder()
            .uri("/api/v1/settings/api-key")
            .body(Body::empty())
            .unwrap();
        let (_, body) = send(app.clone(), request).await;
        assert_eq!(body["configured"], false);

        let request = json_request(
            "PUT",
            "/api/v1/settings/api-key",
            json!({"api_key": "sk-new"}),
        );
        let (status, body) = send(app.clone(), request).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["configured"], true);
        assert!(body.get("api_key").is_none());

        let request = json_request("PUT", "/api/v1/settings/api-key", json!({"api_key": "  "}));
        let (_, body) = send(app, request).await;
        assert_eq!(body["configured"], false);
    }
}
