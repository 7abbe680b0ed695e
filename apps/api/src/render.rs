//! Plain-text rendering of résumé results, and the output files they land in.
//!
//! Layout of a rendered file:
//!
//! ```text
//! SECTION_NAME
//! --------------------
//! body
//!
//! ...
//!
//! ----------------------------------------
//! <attribution footer>
//! ```

use std::path::{Path, PathBuf};

use chrono::{DateTime, Local};
use tracing::info;

use crate::resume::models::{text_of, UserInfoRecord};

pub const ATTRIBUTION_FOOTER: &str = "Made with ❤️ by robbie09 & lilian09";
const SECTION_RULE_WIDTH: usize = 20;
const FOOTER_RULE_WIDTH: usize = 40;

/// A result that can be written out as a flat annotated text block.
pub trait Renderable {
    /// Named text sections in output order. Empty bodies are skipped.
    fn body_sections(&self) -> Vec<(&str, &str)>;

    /// Titled bullet lists rendered after the body. Empty lists are skipped.
    fn item_lists(&self) -> Vec<(&str, &[String])> {
        Vec::new()
    }
}

/// Which operation produced a file. Used as the file name prefix.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Generated,
    Optimized,
}

impl Operation {
    fn label(self) -> &'static str {
        match self {
            Operation::Generated => "Generated",
            Operation::Optimized => "Optimized",
        }
    }
}

pub fn render_text<R: Renderable + ?Sized>(document: &R) -> String {
    let mut out = String::new();

    for (title, body) in document.body_sections() {
        if body.is_empty() {
            continue;
        }
        push_section(&mut out, &title.to_uppercase(), body);
    }

    for (title, items) in document.item_lists() {
        if items.is_empty() {
            continue;
        }
        push_header(&mut out, title);
        for item in items {
            out.push_str("- ");
            out.push_str(item);
            out.push('\n');
        }
        out.push('\n');
    }

    push_footer(&mut out);
    out
}

/// Renders a record as the user entered it, without any AI involvement.
pub fn render_preview(info: &UserInfoRecord) -> String {
    let mut out = String::new();

    out.push_str(&text_of(&info.contact.name).trim().to_uppercase());
    out.push('\n');

    let contact_parts: Vec<String> = [
        ("Email", &info.contact.email),
        ("Phone", &info.contact.phone),
        ("Location", &info.contact.location),
    ]
    .into_iter()
    .filter_map(|(label, value)| {
        let value = text_of(value).trim();
        (!value.is_empty()).then(|| format!("{label}: {value}"))
    })
    .collect();
    out.push_str(&contact_parts.join(" | "));
    out.push_str("\n\n");

    for (title, body) in [
        ("PROFESSIONAL SUMMARY", &info.summary),
        ("EXPERIENCE", &info.experience),
        ("EDUCATION", &info.education),
        ("SKILLS", &info.skills),
        ("ADDITIONAL INFORMATION", &info.additional),
    ] {
        let body = text_of(body).trim();
        if !body.is_empty() {
            push_section(&mut out, title, body);
        }
    }

    out.push('\n');
    out.push_str(&"-".repeat(FOOTER_RULE_WIDTH));
    out.push('\n');
    out.push_str("PREVIEW MODE: Final resume will be formatted professionally\n");
    out.push_str(ATTRIBUTION_FOOTER);
    out
}

fn push_header(out: &mut String, title: &str) {
    out.push_str(title);
    out.push('\n');
    out.push_str(&"-".repeat(SECTION_RULE_WIDTH));
    out.push('\n');
}

fn push_section(out: &mut String, title: &str, body: &str) {
    push_header(out, title);
    out.push_str(body);
    out.push_str("\n\n");
}

fn push_footer(out: &mut String) {
    out.push('\n');
    out.push_str(&"-".repeat(FOOTER_RULE_WIDTH));
    out.push('\n');
    out.push_str(ATTRIBUTION_FOOTER);
}

/// `<Operation>_Resume_<YYYYMMDD_HHMMSS>.txt`
pub fn output_file_name(operation: Operation, at: DateTime<Local>) -> String {
    format!(
        "{}_Resume_{}.txt",
        operation.label(),
        at.format("%Y%m%d_%H%M%S")
    )
}

/// Writes a rendered result into `output_dir`, creating the directory first.
pub async fn write_output(
    output_dir: &Path,
    operation: Operation,
    contents: &str,
) -> std::io::Result<PathBuf> {
    tokio::fs::create_dir_all(output_dir).await?;
    let path = output_dir.join(output_file_name(operation, Local::now()));
    tokio::fs::write(&path, contents).await?;
    info!("Resume saved to: {}", path.display());
    Ok(path)
}
