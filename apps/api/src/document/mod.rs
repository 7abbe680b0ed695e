//! Document ingestion. Turns an uploaded résumé file into plain text.
//!
//! Dispatch is by lowercased extension only; file contents are never sniffed.
//! Section detection over the extracted text lives in `sections`.

use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::{debug, info, warn};

use crate::document::sections::SectionDetection;

pub mod sections;

#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("Unsupported file format: {0}")]
    UnsupportedFormat(String),

    #[error("Failed to extract text from '{path}': {cause}")]
    ExtractionFailed { path: PathBuf, cause: String },
}

/// The formats a résumé can arrive in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentFormat {
    Pdf,
    Word,
    PlainText,
}

impl DocumentFormat {
    /// Maps a lowercased extension (with leading dot, or empty) to a format.
    pub fn from_extension(extension: &str) -> Result<Self, ExtractError> {
        match extension {
            ".pdf" => Ok(Self::Pdf),
            ".docx" | ".doc" => Ok(Self::Word),
            ".txt" | ".text" => Ok(Self::PlainText),
            other => Err(ExtractError::UnsupportedFormat(other.to_string())),
        }
    }
}

/// A résumé file read into memory. Lives only until its text is extracted.
#[derive(Debug)]
pub struct RawDocument {
    pub path: PathBuf,
    /// Lowercased, with the leading dot (".pdf"); empty when the file has none.
    pub extension: String,
    pub bytes: Vec<u8>,
}

impl RawDocument {
    /// Reads the file. The extension is checked first, so an unsupported
    /// file is rejected without being opened.
    pub fn read(path: &Path) -> Result<(Self, DocumentFormat), ExtractError> {
        let extension = lowercase_extension(path);
        let format = DocumentFormat::from_extension(&extension)?;

        let bytes = std::fs::read(path).map_err(|e| ExtractError::ExtractionFailed {
            path: path.to_path_buf(),
            cause: e.to_string(),
        })?;

        Ok((
            Self {
                path: path.to_path_buf(),
                extension,
                bytes,
            },
            format,
        ))
    }

    fn failed(&self, cause: impl ToString) -> ExtractError {
        ExtractError::ExtractionFailed {
            path: self.path.clone(),
            cause: cause.to_string(),
        }
    }
}

/// Extracts the text of a résumé file.
///
/// PDF pages are joined with a newline between pages, Word documents are
/// flattened to one paragraph per line, plain text is returned verbatim.
pub fn extract(path: &Path) -> Result<String, ExtractError> {
    let (document, format) = RawDocument::read(path)?;
    info!(
        "Extracting {:?} text ({}) from {}",
        format,
        document.extension,
        path.display()
    );

    let text = match format {
        DocumentFormat::Pdf => extract_pdf(&document)?,
        DocumentFormat::Word => extract_word(&document)?,
        DocumentFormat::PlainText => extract_plain(&document)?,
    };

    debug!("Extracted {} chars from {}", text.len(), path.display());
    Ok(text)
}

/// Extracted text plus whatever sections could be found in it.
#[derive(Debug, Clone)]
pub struct ParsedDocument {
    pub text: String,
    pub sections: SectionDetection,
}

/// Extracts a file and runs section detection over the text.
pub fn parse_document(path: &Path) -> Result<ParsedDocument, ExtractError> {
    let text = extract(path)?;
    let sections = sections::detect(&text);
    Ok(ParsedDocument { text, sections })
}

/// Runs a parsing backend, turning both its errors and its panics into
/// `ExtractionFailed`. pdf-extract panics on some malformed input.
fn run_backend<T, E, F>(document: &RawDocument, backend: F) -> Result<T, ExtractError>
where
    E: std::fmt::Display,
    F: FnOnce() -> Result<T, E>,
{
    match panic::catch_unwind(AssertUnwindSafe(backend)) {
        Ok(result) => result.map_err(|e| document.failed(e)),
        Err(payload) => {
            let cause = panic_message(payload.as_ref());
            warn!("Extraction backend panicked on {}: {cause}", document.path.display());
            Err(document.failed(format!("parser panicked: {cause}")))
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}

fn extract_pdf(document: &RawDocument) -> Result<String, ExtractError> {
    let pages = run_backend(document, || {
        pdf_extract::extract_text_from_mem_by_pages(&document.bytes)
    })?;
    debug!("PDF has {} pages", pages.len());
    Ok(pages.join("\n"))
}

fn extract_word(document: &RawDocument) -> Result<String, ExtractError> {
    use docx_rs::{read_docx, DocumentChild, ParagraphChild, RunChild};

    let docx = run_backend(document, || read_docx(&document.bytes))?;

    let paragraphs: Vec<String> = docx
        .document
        .children
        .iter()
        .filter_map(|child| match child {
            DocumentChild::Paragraph(para) => Some(
                para.children
                    .iter()
                    .filter_map(|pc| match pc {
                        ParagraphChild::Run(run) => Some(
                            run.children
                                .iter()
                                .filter_map(|rc| match rc {
                                    RunChild::Text(t) => Some(t.text.as_str()),
                                    _ => None,
                                })
                                .collect::<String>(),
                        ),
                        _ => None,
                    })
                    .collect::<String>(),
            ),
            _ => None,
        })
        .collect();

    Ok(paragraphs.join("\n"))
}

fn extract_plain(document: &RawDocument) -> Result<String, ExtractError> {
    String::from_utf8(document.bytes.clone()).map_err(|e| document.failed(e))
}

/// Lowercased extension with its leading dot, or "" when there is none.
pub fn lowercase_extension(path: &Path) -> String {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| format!(".{}", e.to_lowercase()))
        .unwrap_or_default()
}
