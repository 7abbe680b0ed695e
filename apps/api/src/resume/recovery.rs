//! Response recovery: turns a completion envelope into a full result record.
//!
//! The model is asked for JSON but nothing enforces it. Recovery is
//! decode-or-degrade:
//! 1. take `choices[0].message.content` ("" when absent)
//! 2. cut from the first `{` to the last `}`
//! 3. decode strictly against the result type
//! 4. on any failure, build the type's fallback from the raw reply text
//!
//! Recovery never fails and never returns a record with missing keys.
//! Optimization replies must carry every key; generation replies that decode
//! to an object keep what they have and get the rest backfilled.
//! The brace cut is greedy: commentary that itself contains braces around the
//! JSON will break decoding and land in the fallback.

use serde::de::DeserializeOwned;
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, warn};

use crate::resume::models::{GenerationResult, OptimizationResult};

pub const FALLBACK_IMPROVEMENT: &str = "AI-generated optimization";
pub const FALLBACK_SUGGESTION: &str = "Review the optimized resume carefully";
pub const FALLBACK_SUMMARY: &str = "Professional Summary (AI-generated)";
pub const FALLBACK_ADDITIONAL: &str = "Review and edit this AI-generated content.";

/// Describes one result schema: how to decode it and how to degrade.
pub trait RecoverySchema: DeserializeOwned {
    /// Task name for log lines.
    const TASK: &'static str;

    /// Hook to unwrap an envelope object the model was asked to nest the
    /// result in. Default: use the decoded value as-is.
    fn unwrap_payload(decoded: Value) -> Value {
        decoded
    }

    /// Schema-conformant result carrying the full raw reply text.
    fn fallback(reply_text: &str) -> Self;
}

impl RecoverySchema for OptimizationResult {
    const TASK: &'static str = "optimization";

    fn fallback(reply_text: &str) -> Self {
        OptimizationResult {
            optimized_content: reply_text.to_string(),
            improvements: vec![FALLBACK_IMPROVEMENT.to_string()],
            suggestions: vec![FALLBACK_SUGGESTION.to_string()],
        }
    }
}

impl RecoverySchema for GenerationResult {
    const TASK: &'static str = "generation";

    /// Generation replies are requested as `{"content": {...}}`.
    fn unwrap_payload(decoded: Value) -> Value {
        match decoded {
            Value::Object(mut map) => match map.remove("content") {
                Some(inner) => inner,
                None => Value::Object(map),
            },
            other => other,
        }
    }

    fn fallback(reply_text: &str) -> Self {
        GenerationResult {
            summary: FALLBACK_SUMMARY.to_string(),
            experience: reply_text.to_string(),
            education: String::new(),
            skills: String::new(),
            additional: FALLBACK_ADDITIONAL.to_string(),
        }
    }
}

#[derive(Debug, Error)]
enum DecodeFailure {
    #[error("no JSON object in reply")]
    NoJsonObject,

    #[error("invalid JSON: {0}")]
    InvalidJson(serde_json::Error),

    #[error("JSON does not match the expected shape: {0}")]
    WrongShape(serde_json::Error),
}

/// Recovers a result of type `S` from a completion envelope.
pub fn recover<S: RecoverySchema>(envelope: &Value) -> S {
    let reply = reply_text(envelope);

    match decode::<S>(&reply) {
        Ok(result) => {
            debug!("Recovered structured {} result", S::TASK);
            result
        }
        Err(failure) => {
            warn!("Using fallback {} result: {failure}", S::TASK);
            S::fallback(&reply)
        }
    }
}

/// The assistant text of the first choice; empty when the envelope has none.
pub fn reply_text(envelope: &Value) -> String {
    envelope
        .pointer("/choices/0/message/content")
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string()
}

/// Greedy cut from the first `{` to the last `}`.
pub fn find_json_object(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let end = text.rfind('}')?;
    (end > start).then(|| &text[start..=end])
}

fn decode<S: RecoverySchema>(reply: &str) -> Result<S, DecodeFailure> {
    let candidate = find_json_object(reply).ok_or(DecodeFailure::NoJsonObject)?;
    let decoded: Value = serde_json::from_str(candidate).map_err(DecodeFailure::InvalidJson)?;
    serde_json::from_value(S::unwrap_payload(decoded)).map_err(DecodeFailure::WrongShape)
}
