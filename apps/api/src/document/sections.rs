//! Heuristic résumé section detection.
//!
//! Finds the four canonical sections by header synonyms. A section body runs
//! from its header line to the next blank-line-delimited header (an all-caps
//! line, or any known synonym in any case) or to the end of the text.
//!
//! This is best-effort: detection never fails, it reports `Undetected`.

use std::collections::BTreeMap;

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;
use tracing::{debug, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SectionKind {
    Summary,
    Experience,
    Education,
    Skills,
}

impl SectionKind {
    pub const ALL: [SectionKind; 4] = [
        SectionKind::Summary,
        SectionKind::Experience,
        SectionKind::Education,
        SectionKind::Skills,
    ];

    pub fn key(self) -> &'static str {
        match self {
            SectionKind::Summary => "summary",
            SectionKind::Experience => "experience",
            SectionKind::Education => "education",
            SectionKind::Skills => "skills",
        }
    }

    /// Header spellings recognised for this kind, matched case-insensitively.
    pub fn synonyms(self) -> &'static [&'static str] {
        match self {
            SectionKind::Summary => &["SUMMARY", "PROFESSIONAL SUMMARY", "PROFILE", "OBJECTIVE"],
            SectionKind::Experience => &[
                "EXPERIENCE",
                "WORK EXPERIENCE",
                "PROFESSIONAL EXPERIENCE",
                "EMPLOYMENT",
            ],
            SectionKind::Education => &["EDUCATION", "ACADEMIC BACKGROUND", "QUALIFICATIONS"],
            SectionKind::Skills => &[
                "SKILLS",
                "TECHNICAL SKILLS",
                "CORE COMPETENCIES",
                "AREAS OF EXPERTISE",
            ],
        }
    }
}

/// Detected sections in canonical order. A key is present only if its header
/// was found; the body may still be empty.
pub type SectionMap = BTreeMap<SectionKind, String>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SectionDetection {
    Detected(SectionMap),
    Undetected,
}

impl SectionDetection {
    pub fn sections(&self) -> Option<&SectionMap> {
        match self {
            SectionDetection::Detected(map) => Some(map),
            SectionDetection::Undetected => None,
        }
    }

    pub fn into_sections(self) -> Option<SectionMap> {
        match self {
            SectionDetection::Detected(map) => Some(map),
            SectionDetection::Undetected => None,
        }
    }
}

struct SectionPatterns {
    blank_runs: Regex,
    headers: Vec<(SectionKind, Regex)>,
    boundary: Regex,
}

impl SectionPatterns {
    fn compile() -> Result<Self, regex::Error> {
        let blank_runs = Regex::new(r"\n(?:[ \t]*\n)+")?;

        let headers = SectionKind::ALL
            .iter()
            .map(|&kind| {
                let pattern = format!(
                    r"(?im)^[ \t]*(?:{})[ \t]*:?[ \t]*(?:\n|\z)",
                    alternation(kind.synonyms())
                );
                Regex::new(&pattern).map(|re| (kind, re))
            })
            .collect::<Result<Vec<_>, _>>()?;

        let every_synonym: Vec<&str> = SectionKind::ALL
            .iter()
            .flat_map(|k| k.synonyms().iter().copied())
            .collect();
        let boundary = Regex::new(&format!(
            r"(?:\A|\n)\n[ \t]*(?:[A-Z][A-Z0-9&/ \t]*[A-Z]|(?i:{}))[ \t]*:?[ \t]*(?:\n|\z)",
            alternation(&every_synonym)
        ))?;

        Ok(Self {
            blank_runs,
            headers,
            boundary,
        })
    }

    /// CRLF becomes LF and every run of blank lines becomes one paragraph break.
    fn normalize(&self, text: &str) -> String {
        let text = text.replace("\r\n", "\n");
        self.blank_runs.replace_all(&text, "\n\n").into_owned()
    }
}

/// Joins synonyms into a regex alternation; inner spaces match any run of
/// spaces or tabs.
fn alternation(synonyms: &[&str]) -> String {
    synonyms
        .iter()
        .map(|s| {
            s.split_whitespace()
                .map(regex::escape)
                .collect::<Vec<_>>()
                .join(r"[ \t]+")
        })
        .collect::<Vec<_>>()
        .join("|")
}

static PATTERNS: Lazy<Result<SectionPatterns, regex::Error>> = Lazy::new(SectionPatterns::compile);

/// Locates the canonical résumé sections in `text`.
pub fn detect(text: &str) -> SectionDetection {
    let patterns = match PATTERNS.as_ref() {
        Ok(p) => p,
        Err(e) => {
            warn!("Section patterns failed to compile, skipping detection: {e}");
            return SectionDetection::Undetected;
        }
    };

    let text = patterns.normalize(text);
    let mut sections = SectionMap::new();

    for (kind, header) in &patterns.headers {
        let Some(m) = header.find(&text) else {
            continue;
        };
        let rest = &text[m.end()..];
        let end = patterns
            .boundary
            .find(rest)
            .map(|b| b.start())
            .unwrap_or(rest.len());
        sections.insert(*kind, rest[..end].trim().to_string());
    }

    if sections.is_empty() {
        warn!("No resume sections detected");
        SectionDetection::Undetected
    } else {
        debug!(
            "Detected sections: {:?}",
            sections.keys().map(|k| k.key()).collect::<Vec<_>>()
        );
        SectionDetection::Detected(sections)
    }
}
