//! Document ingestion: bytes → text → chunks

use crate::error::{Result, ToolchatError};
use sha2::{Digest, Sha256};
use std::fmt;
use std::path::Path;
use std::str::FromStr;

/// Supported upload formats
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DocumentFormat {
    Pdf,
    Txt,
    Md,
}

impl DocumentFormat {
    /// Format tag
    pub fn as_str(&self) -> &'static str {
        match self {
            DocumentFormat::Pdf => "pdf",
            DocumentFormat::Txt => "txt",
            DocumentFormat::Md => "md",
        }
    }

    /// Infer the format from a file extension
    pub fn from_path(path: &Path) -> Result<Self> {
        let extension = path
            .extension()
            .and_then(|ext| ext.to_str())
            .ok_or_else(|| {
                ToolchatError::Ingestion(format!("{} has no file extension", path.display()))
            })?;
        extension.parse()
    }
}

impl fmt::Display for DocumentFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DocumentFormat {
    type Err = ToolchatError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "pdf" => Ok(DocumentFormat::Pdf),
            "txt" | "text" => Ok(DocumentFormat::Txt),
            "md" | "markdown" => Ok(DocumentFormat::Md),
            other => Err(ToolchatError::Ingestion(format!(
                "unsupported document format '{}' (expected pdf, txt or md)",
                other
            ))),
        }
    }
}

/// An uploaded file
#[derive(Debug, Clone)]
pub struct Document {
    /// Display name, usually the file name
    pub name: String,
    /// Declared format
    pub format: DocumentFormat,
    /// Raw contents
    pub bytes: Vec<u8>,
}

impl Document {
    /// Document from memory
    pub fn new(name: impl Into<String>, format: DocumentFormat, bytes: impl Into<Vec<u8>>) -> Self {
        Self {
            name: name.into(),
            format,
            bytes: bytes.into(),
        }
    }

    /// Read a file, inferring the format from its extension
    pub async fn from_path(path: &Path) -> Result<Self> {
        let format = DocumentFormat::from_path(path)?;
        let bytes = tokio::fs::read(path).await.map_err(|e| {
            ToolchatError::Ingestion(format!("cannot read {}: {}", path.display(), e))
        })?;
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        Ok(Self::new(name, format, bytes))
    }

    /// SHA-256 of the bytes, hex encoded; the file's identity
    pub fn fingerprint(&self) -> String {
        fingerprint(&self.bytes)
    }
}

/// SHA-256 hex digest
pub fn fingerprint(bytes: &[u8]) -> String {
    format!("{:x}", Sha256::digest(bytes))
}

/// Pull plain text out of a document
pub fn extract_text(document: &Document) -> Result<String> {
    let text = match document.format {
        DocumentFormat::Pdf => pdf_extract::extract_text_from_mem(&document.bytes).map_err(|e| {
            ToolchatError::Ingestion(format!("cannot read PDF {}: {}", document.name, e))
        })?,
        DocumentFormat::Txt | DocumentFormat::Md => String::from_utf8(document.bytes.clone())
            .map_err(|_| {
                ToolchatError::Ingestion(format!("{} is not valid UTF-8 text", document.name))
            })?,
    };
    Ok(text)
}

/// Fixed-size character chunks sharing `overlap` characters
///
/// Whitespace-only chunks are dropped.
pub fn chunk_text(content: &str, chunk_size: usize, overlap: usize) -> Vec<String> {
    let chars: Vec<char> = content.chars().collect();
    let total_len = chars.len();
    let step = chunk_size.saturating_sub(overlap).max(1);

    let mut chunks = Vec::new();
    let mut start = 0;
    while start < total_len {
        let end = (start + chunk_size).min(total_len);
        let chunk: String = chars[start..end].iter().collect();
        let trimmed = chunk.trim();
        if !trimmed.is_empty() {
            chunks.push(trimmed.to_string());
        }
        if end >= total_len {
            break;
        }
        start += step;
    }
    chunks
}
