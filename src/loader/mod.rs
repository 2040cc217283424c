mod docx;
#[cfg(test)]
pub(crate) mod fixtures;
mod pdf;

pub use docx::extract_docx_text;
pub use pdf::extract_pdf_pages;

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{RagError, Result};

/// Loader strategy for a supported file extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoaderKind {
    Text,
    Pdf,
    Docx,
}

impl LoaderKind {
    pub const SUPPORTED_EXTENSIONS: [&'static str; 3] = ["txt", "pdf", "docx"];

    /// Look up the loader for a path by extension (case-insensitive).
    /// Returns `None` for anything unsupported.
    pub fn for_path(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?.to_ascii_lowercase();
        match ext.as_str() {
            "txt" => Some(LoaderKind::Text),
            "pdf" => Some(LoaderKind::Pdf),
            "docx" => Some(LoaderKind::Docx),
            _ => None,
        }
    }

    /// Read the file and extract its plain text.
    ///
    /// Text and DOCX files give one document. PDFs give one document per
    /// page, numbered from 1, so chunks never span a page break.
    pub fn load(self, path: &Path) -> Result<Vec<Document>> {
        let source = source_name(path);
        let document = |text: String, page: Option<usize>| Document {
            source: source.clone(),
            path: path.to_path_buf(),
            kind: self,
            page,
            text,
        };

        let documents = match self {
            LoaderKind::Text => {
                let bytes = fs::read(path).map_err(|e| load_error(path, e))?;
                let text = String::from_utf8(bytes).map_err(|e| load_error(path, e))?;
                vec![document(text, None)]
            }
            LoaderKind::Pdf => extract_pdf_pages(path)?
                .into_iter()
                .enumerate()
                .map(|(i, text)| document(text, Some(i + 1)))
                .collect(),
            LoaderKind::Docx => vec![document(extract_docx_text(path)?, None)],
        };

        Ok(documents)
    }
}

impl fmt::Display for LoaderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LoaderKind::Text => write!(f, "text"),
            LoaderKind::Pdf => write!(f, "pdf"),
            LoaderKind::Docx => write!(f, "docx"),
        }
    }
}

/// A loaded source file. Immutable once created.
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    /// File name used as the source label on every chunk.
    pub source: String,
    pub path: PathBuf,
    pub kind: LoaderKind,
    /// 1-based page number for paginated formats.
    pub page: Option<usize>,
    pub text: String,
}

impl Document {
    pub fn new(source: impl Into<String>, text: impl Into<String>) -> Self {
        let source = source.into();
        Self {
            path: PathBuf::from(&source),
            source,
            kind: LoaderKind::Text,
            page: None,
            text: text.into(),
        }
    }
}

pub(crate) fn source_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

pub(crate) fn load_error(path: &Path, err: impl fmt::Display) -> RagError {
    RagError::Load {
        path: path.to_path_buf(),
        message: err.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_extension_table() {
        assert_eq!(LoaderKind::for_path(Path::new("a.txt")), Some(LoaderKind::Text));
        assert_eq!(LoaderKind::for_path(Path::new("b.PDF")), Some(LoaderKind::Pdf));
        assert_eq!(LoaderKind::for_path(Path::new("c.Docx")), Some(LoaderKind::Docx));
        assert_eq!(LoaderKind::for_path(Path::new("d.xyz")), None);
        assert_eq!(LoaderKind::for_path(Path::new("README")), None);
    }

    #[test]
    fn test_load_text_sets_source_to_file_name() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("notes.txt");
        fs::write(&path, "hello world").unwrap();

        let docs = LoaderKind::Text.load(&path).unwrap();
        assert_eq!(docs.len(), 1);
        assert_eq!(docs[0].source, "notes.txt");
        assert_eq!(docs[0].text, "hello world");
        assert_eq!(docs[0].kind, LoaderKind::Text);
        assert_eq!(docs[0].page, None);
    }

    #[test]
    fn test_invalid_utf8_is_a_load_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("binary.txt");
        fs::write(&path, [0xff, 0xfe, 0x00, 0xc3]).unwrap();

        let err = LoaderKind::Text.load(&path).unwrap_err();
        assert!(matches!(err, RagError::Load { .. }));
    }

    #[test]
    fn test_corrupt_docx_is_a_load_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("broken.docx");
        fs::write(&path, "not a zip archive").unwrap();

        let err = LoaderKind::Docx.load(&path).unwrap_err();
        assert!(err.to_string().contains("broken.docx"));
    }

    #[test]
    fn test_load_docx_paragraphs() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("report.docx");
        fixtures::write_docx(&path, &["Quarterly results", "Revenue grew &amp; costs fell"]);

        let docs = LoaderKind::Docx.load(&path).unwrap();
        assert_eq!(docs.len(), 1);
        assert_eq!(docs[0].source, "report.docx");
        assert_eq!(docs[0].kind, LoaderKind::Docx);
        assert_eq!(docs[0].text.trim(), "Quarterly results\nRevenue grew & costs fell");
    }

    #[test]
    fn test_load_pdf_one_document_per_page() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("manual.pdf");
        fixtures::write_text_pdf(&path, &["Installation steps", "Troubleshooting guide"]);

        let docs = LoaderKind::Pdf.load(&path).unwrap();
        assert_eq!(docs.len(), 2);
        assert!(docs.iter().all(|d| d.source == "manual.pdf"));
        assert_eq!(docs[0].page, Some(1));
        assert_eq!(docs[1].page, Some(2));
        assert!(docs[0].text.contains("Installation"));
        assert!(docs[1].text.contains("Troubleshooting"));
        assert!(!docs[0].text.contains("Troubleshooting"));
    }

    #[test]
    fn test_malformed_pdf_is_a_load_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("broken.pdf");
        fixtures::write_pdf_without_resources(&path);

        let err = LoaderKind::Pdf.load(&path).unwrap_err();
        assert!(matches!(err, RagError::Load { .. }));
        assert!(err.to_string().contains("broken.pdf"));
    }

    #[test]
    fn test_garbage_pdf_is_a_load_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("noise.pdf");
        fs::write(&path, "%PDF-1.4 this is not a pdf").unwrap();

        assert!(matches!(
            LoaderKind::Pdf.load(&path),
            Err(RagError::Load { .. })
        ));
    }
}
