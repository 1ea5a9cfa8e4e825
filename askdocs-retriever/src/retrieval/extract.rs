//! Plain-text extraction for the supported document formats.
//!
//! Dispatch is by file extension: txt and md are read as UTF-8, pdf goes
//! through `pdf-extract`, docx is unpacked from its ZIP container and the
//! `<w:t>` runs of `word/document.xml` are collected one line per paragraph,
//! and csv rows are flattened to space-joined fields, one line per row.
//! Anything else is [`ExtractError::UnsupportedFormat`].

use std::io::Read;
use std::path::Path;

/// Extraction failure for a single file.
#[derive(Debug, thiserror::Error)]
pub enum ExtractError {
    /// The extension is not one of txt/md/pdf/docx/csv.
    #[error("unsupported format: .{extension}")]
    UnsupportedFormat { extension: String },

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("pdf extraction failed: {0}")]
    Pdf(String),

    #[error("docx extraction failed: {0}")]
    Docx(String),

    #[error("csv extraction failed: {0}")]
    Csv(String),

    /// The blocking parse task panicked or was cancelled.
    #[error("extraction task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

/// Extract plain text from `path`, dispatching on its extension.
///
/// PDF and DOCX parsing are CPU-bound and run on the blocking thread pool.
pub async fn extract_text(path: &Path) -> Result<String, ExtractError> {
    let extension = path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.to_ascii_lowercase())
        .unwrap_or_default();

    match extension.as_str() {
        "txt" | "md" => Ok(tokio::fs::read_to_string(path).await?),
        "pdf" => {
            let bytes = tokio::fs::read(path).await?;
            tokio::task::spawn_blocking(move || {
                pdf_extract::extract_text_from_mem(&bytes)
                    .map_err(|err| ExtractError::Pdf(err.to_string()))
            })
            .await?
        }
        "docx" => {
            let bytes = tokio::fs::read(path).await?;
            tokio::task::spawn_blocking(move || extract_docx(&bytes)).await?
        }
        "csv" => {
            let raw = tokio::fs::read_to_string(path).await?;
            flatten_csv(&raw)
        }
        _ => Err(ExtractError::UnsupportedFormat { extension }),
    }
}

/// Flatten CSV rows: fields of a row joined by spaces, rows by newlines.
/// Empty rows are dropped.
fn flatten_csv(raw: &str) -> Result<String, ExtractError> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(raw.as_bytes());

    let mut lines = Vec::new();
    for record in reader.records() {
        let record = record.map_err(|err| ExtractError::Csv(err.to_string()))?;
        let line = record
            .iter()
            .map(str::trim)
            .filter(|field| !field.is_empty())
            .collect::<Vec<_>>()
            .join(" ");
        if !line.is_empty() {
            lines.push(line);
        }
    }

    Ok(lines.join("\n"))
}

/// Pull the text runs out of a DOCX body, one output line per paragraph.
fn extract_docx(bytes: &[u8]) -> Result<String, ExtractError> {
    let mut archive = zip::ZipArchive::new(std::io::Cursor::new(bytes))
        .map_err(|err| ExtractError::Docx(err.to_string()))?;

    let mut xml = String::new();
    archive
        .by_name("word/document.xml")
        .map_err(|_| ExtractError::Docx("word/document.xml not found".to_string()))?
        .read_to_string(&mut xml)
        .map_err(|err| ExtractError::Docx(err.to_string()))?;

    let mut reader = quick_xml::Reader::from_reader(xml.as_bytes());
    let mut buf = Vec::new();
    let mut out = String::new();
    let mut paragraph = String::new();
    let mut in_text = false;

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(quick_xml::events::Event::Start(e)) => {
                if e.local_name().as_ref() == b"t" {
                    in_text = true;
                }
            }
            Ok(quick_xml::events::Event::Text(t)) if in_text => {
                paragraph.push_str(t.unescape().unwrap_or_default().as_ref());
            }
            Ok(quick_xml::events::Event::End(e)) => match e.local_name().as_ref() {
                b"t" => in_text = false,
                b"p" => {
                    let line = paragraph.trim();
                    if !line.is_empty() {
                        out.push_str(line);
                        out.push('\n');
                    }
                    paragraph.clear();
                }
                _ => {}
            },
            Ok(quick_xml::events::Event::Eof) => break,
            Err(err) => return Err(ExtractError::Docx(err.to_string())),
            _ => {}
        }
        buf.clear();
    }

    Ok(out.trim_end().to_string())
}
