//! Text extraction from uploaded documents.
//!
//! Extraction itself is delegated to external collaborators: `pdf-extract`
//! for PDFs and plain UTF-8 decoding for text files. This module owns the
//! policy around those calls: which file types are accepted, how page texts
//! are joined, and the guarantee that a spooled temporary copy of an uploaded
//! document is removed on every exit path.

use std::io::Write;
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;
use thiserror::Error;

/// File extensions accepted for summarization.
pub const ALLOWED_EXTENSIONS: [&str; 2] = ["pdf", "txt"];

/// Declared type of an uploaded document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentKind {
    /// A PDF document; text is pulled from every page in order.
    Pdf,
    /// A plain-text document, decoded as UTF-8.
    Text,
}

impl DocumentKind {
    /// Determine the document kind from a file name's extension.
    ///
    /// Returns `None` for missing or disallowed extensions; the caller
    /// rejects those before any extraction is attempted.
    pub fn from_filename(filename: &str) -> Option<Self> {
        let extension = Path::new(filename).extension()?.to_str()?;
        match extension.to_lowercase().as_str() {
            "pdf" => Some(Self::Pdf),
            "txt" => Some(Self::Text),
            _ => None,
        }
    }
}

/// Errors raised while pulling text out of a document.
#[derive(Debug, Error)]
pub enum ExtractionError {
    /// The file could not be read from disk.
    #[error("failed to read {path}: {source}")]
    Io {
        /// Path that failed to open or read.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },
    /// The PDF library failed to parse the document.
    #[error("failed to extract PDF text: {0}")]
    Pdf(String),
    /// A text file was not valid UTF-8.
    #[error("file is not valid UTF-8: {0}")]
    Decode(#[from] std::string::FromUtf8Error),
    /// The document contained no extractable text.
    #[error("no text could be extracted from the document")]
    Empty,
}

/// Extract the textual content of the document at `path`.
///
/// PDF pages are joined with a single space and the result is trimmed of
/// surrounding whitespace; a document that yields no text at all is an error
/// rather than an empty success.
pub fn extract_path(path: &Path, kind: DocumentKind) -> Result<String, ExtractionError> {
    let bytes = std::fs::read(path).map_err(|source| ExtractionError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let text = match kind {
        DocumentKind::Pdf => {
            let raw = pdf_extract::extract_text_from_mem(&bytes)
                .map_err(|error| ExtractionError::Pdf(error.to_string()))?;
            join_pages(raw.split('\x0C'))
        }
        DocumentKind::Text => String::from_utf8(bytes)?.trim().to_string(),
    };
    if text.is_empty() {
        return Err(ExtractionError::Empty);
    }
    tracing::debug!(
        path = %path.display(),
        chars = text.chars().count(),
        "Extracted document text"
    );
    Ok(text)
}

/// Join per-page texts with a single space and trim the result.
///
/// Pages with no extractable text contribute an empty string, so a trailing
/// empty page collapses into the final trim instead of leaving a dangling
/// separator.
fn join_pages<'a>(pages: impl Iterator<Item = &'a str>) -> String {
    let mut joined = String::new();
    for (index, page) in pages.enumerate() {
        if index > 0 {
            joined.push(' ');
        }
        joined.push_str(page);
    }
    joined.trim().to_string()
}

/// An uploaded document spooled to a temporary file for the duration of one request.
///
/// The temporary copy keeps the original extension so downstream tooling sees
/// a plausible file name. Dropping the spool deletes the file, on success and
/// failure alike.
pub struct SpooledDocument {
    file: NamedTempFile,
    kind: DocumentKind,
}

impl SpooledDocument {
    /// Write uploaded bytes to a temporary file with an extension matching `kind`.
    pub fn write(kind: DocumentKind, bytes: &[u8]) -> std::io::Result<Self> {
        let suffix = match kind {
            DocumentKind::Pdf => ".pdf",
            DocumentKind::Text => ".txt",
        };
        let mut file = tempfile::Builder::new()
            .prefix("docsum-")
            .suffix(suffix)
            .tempfile()?;
        file.write_all(bytes)?;
        file.flush()?;
        Ok(Self { file, kind })
    }

    /// Path of the temporary copy.
    pub fn path(&self) -> &Path {
        self.file.path()
    }

    /// Declared kind of the spooled document.
    pub fn kind(&self) -> DocumentKind {
        self.kind
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn filename_extension_detection() {
        assert_eq!(
            DocumentKind::from_filename("report.pdf"),
            Some(DocumentKind::Pdf)
        );
        assert_eq!(
            DocumentKind::from_filename("NOTES.TXT"),
            Some(DocumentKind::Text)
        );
        assert_eq!(DocumentKind::from_filename("notes.docx"), None);
        assert_eq!(DocumentKind::from_filename("no_extension"), None);
    }

    #[test]
    fn join_pages_uses_single_interior_space() {
        assert_eq!(join_pages(["alpha", "beta"].into_iter()), "alpha beta");
    }

    #[test]
    fn join_pages_drops_trailing_empty_page() {
        // A two-page document where page 2 has no extractable text must not
        // leave a trailing separator behind.
        assert_eq!(join_pages(["Page one text.", ""].into_iter()), "Page one text.");
        assert_eq!(join_pages(["", "Page two text."].into_iter()), "Page two text.");
    }

    #[test]
    fn extract_text_file_trims_whitespace() {
        let mut file = NamedTempFile::new().expect("temp file");
        file.write_all(b"  hello world \n").expect("write");
        let text = extract_path(file.path(), DocumentKind::Text).expect("extract");
        assert_eq!(text, "hello world");
    }

    #[test]
    fn extract_rejects_empty_text_file() {
        let mut file = NamedTempFile::new().expect("temp file");
        file.write_all(b"   \n\t ").expect("write");
        let error = extract_path(file.path(), DocumentKind::Text).unwrap_err();
        assert!(matches!(error, ExtractionError::Empty));
    }

    #[test]
    fn extract_rejects_invalid_utf8() {
        let mut file = NamedTempFile::new().expect("temp file");
        file.write_all(&[0xff, 0xfe, 0x00]).expect("write");
        let error = extract_path(file.path(), DocumentKind::Text).unwrap_err();
        assert!(matches!(error, ExtractionError::Decode(_)));
    }

    #[test]
    fn spooled_document_is_removed_on_drop() {
        let spool = SpooledDocument::write(DocumentKind::Text, b"hello").expect("spool");
        let path = spool.path().to_path_buf();
        assert!(path.exists());
        assert_eq!(path.extension().and_then(|e| e.to_str()), Some("txt"));
        drop(spool);
        assert!(!path.exists());
    }
}
