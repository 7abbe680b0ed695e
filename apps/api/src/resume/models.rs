use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::errors::AppError;
use crate::render::Renderable;
use crate::resume::recovery::{FALLBACK_ADDITIONAL, FALLBACK_SUMMARY};

// ────────────────────────────────────────────────────────────────────────────
// Generation input
// ────────────────────────────────────────────────────────────────────────────

/// Everything the user typed in to have a résumé generated from scratch.
///
/// Every field may be missing at this boundary. Missing text renders as an
/// empty segment in prompts; missing style fields take their defaults.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct UserInfoRecord {
    #[serde(deserialize_with = "null_as_default")]
    pub contact: ContactInfo,
    pub summary: Option<String>,
    pub experience: Option<String>,
    pub education: Option<String>,
    pub skills: Option<String>,
    pub additional: Option<String>,
    pub target_job: Option<String>,
    #[serde(deserialize_with = "null_as_default")]
    pub style: StylePreferences,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ContactInfo {
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub location: Option<String>,
}

/// Missing or null style fields take their defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "StyleFields")]
pub struct StylePreferences {
    pub layout: String,
    pub length: String,
    pub tone: String,
    pub focus: String,
    pub auto_summary: bool,
    pub auto_skills: bool,
}

/// Wire form of `StylePreferences`, where every field may be absent or null.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct StyleFields {
    layout: Option<String>,
    length: Option<String>,
    tone: Option<String>,
    focus: Option<String>,
    auto_summary: Option<bool>,
    auto_skills: Option<bool>,
}

impl From<StyleFields> for StylePreferences {
    fn from(fields: StyleFields) -> Self {
        let defaults = StylePreferences::default();
        Self {
            layout: fields.layout.unwrap_or(defaults.layout),
            length: fields.length.unwrap_or(defaults.length),
            tone: fields.tone.unwrap_or(defaults.tone),
            focus: fields.focus.unwrap_or(defaults.focus),
            auto_summary: fields.auto_summary.unwrap_or(defaults.auto_summary),
            auto_skills: fields.auto_skills.unwrap_or(defaults.auto_skills),
        }
    }
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

impl Default for StylePreferences {
    fn default() -> Self {
        Self {
            layout: "Traditional".to_string(),
            length: "1-page".to_string(),
            tone: "Professional".to_string(),
            focus: "Experience".to_string(),
            auto_summary: true,
            auto_skills: true,
        }
    }
}

/// Borrows an optional text field, absent as "".
pub fn text_of(field: &Option<String>) -> &str {
    field.as_deref().unwrap_or("")
}

fn is_blank(field: &Option<String>) -> bool {
    text_of(field).trim().is_empty()
}

impl UserInfoRecord {
    /// Minimum content needed before a generation request is worth sending:
    /// a name, one way to reach the person, and experience and education.
    pub fn validate(&self) -> Result<(), AppError> {
        if is_blank(&self.contact.name) {
            return Err(AppError::Validation("Please enter your name.".to_string()));
        }
        if is_blank(&self.contact.email) && is_blank(&self.contact.phone) {
            return Err(AppError::Validation(
                "Please provide at least one contact method (email or phone).".to_string(),
            ));
        }
        if is_blank(&self.experience) {
            return Err(AppError::Validation(
                "Please enter your work experience.".to_string(),
            ));
        }
        if is_blank(&self.education) {
            return Err(AppError::Validation(
                "Please enter your education details.".to_string(),
            ));
        }
        Ok(())
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Recovered results
// ────────────────────────────────────────────────────────────────────────────

/// The optimization reply. All three keys are required when decoding; a reply
/// missing any of them is replaced by the fallback.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OptimizationResult {
    pub optimized_content: String,
    pub improvements: Vec<String>,
    pub suggestions: Vec<String>,
}

/// The generated résumé body. List or null values coming back from the model
/// are flattened to text rather than rejected. Keys the model left out are
/// backfilled: `summary` and `additional` with their fallback literals, the
/// rest with "".
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerationResult {
    #[serde(default = "fallback_summary", deserialize_with = "flatten_text")]
    pub summary: String,
    #[serde(default, deserialize_with = "flatten_text")]
    pub experience: String,
    #[serde(default, deserialize_with = "flatten_text")]
    pub education: String,
    #[serde(default, deserialize_with = "flatten_text")]
    pub skills: String,
    #[serde(default = "fallback_additional", deserialize_with = "flatten_text")]
    pub additional: String,
}

fn fallback_summary() -> String {
    FALLBACK_SUMMARY.to_string()
}

fn fallback_additional() -> String {
    FALLBACK_ADDITIONAL.to_string()
}

fn flatten_text<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(value_to_text(&value))
}

fn value_to_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        Value::Array(items) => items
            .iter()
            .map(value_to_text)
            .collect::<Vec<_>>()
            .join("\n"),
        other => other.to_string(),
    }
}

impl Renderable for OptimizationResult {
    fn body_sections(&self) -> Vec<(&str, &str)> {
        vec![("optimized_content", self.optimized_content.as_str())]
    }

    fn item_lists(&self) -> Vec<(&str, &[String])> {
        vec![
            ("IMPROVEMENTS MADE", self.improvements.as_slice()),
            ("ADDITIONAL SUGGESTIONS", self.suggestions.as_slice()),
        ]
    }
}

impl Renderable for GenerationResult {
    fn body_sections(&self) -> Vec<(&str, &str)> {
        vec![
            ("summary", self.summary.as_str()),
            ("experience", self.experience.as_str()),
            ("education", self.education.as_str()),
            ("skills", self.skills.as_str()),
            ("additional", self.additional.as_str()),
        ]
    }
}
