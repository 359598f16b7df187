//! Document text extraction for uploaded resumes and job descriptions.

use std::path::Path;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum DocumentError {
    #[error("Unsupported document format: {0}")]
    Unsupported(String),

    #[error("Failed to read PDF '{filename}': {message}")]
    Pdf { filename: String, message: String },

    #[error("Failed to read DOCX '{filename}': {message}")]
    Docx { filename: String, message: String },

    #[error("Document '{0}' is not valid UTF-8 text")]
    InvalidUtf8(String),

    #[error("No text could be extracted from '{0}'")]
    Empty(String),
}

/// Formats recognised by file extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentKind {
    Pdf,
    Docx,
    /// Legacy binary Word. Recognised so it can be rejected with a clear message.
    Doc,
    Text,
}

impl DocumentKind {
    pub fn from_filename(filename: &str) -> Self {
        let ext = Path::new(filename)
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase());

        match ext.as_deref() {
            Some("pdf") => DocumentKind::Pdf,
            Some("docx") => DocumentKind::Docx,
            Some("doc") => DocumentKind::Doc,
            _ => DocumentKind::Text,
        }
    }

    /// True for formats accepted as resumes in batch directories.
    pub fn is_resume_format(filename: &str) -> bool {
        matches!(
            Self::from_filename(filename),
            DocumentKind::Pdf | DocumentKind::Docx | DocumentKind::Doc
        )
    }
}

/// An uploaded or on-disk document, kept in memory until parsed.
#[derive(Debug, Clone)]
pub struct SourceDocument {
    pub filename: String,
    pub bytes: Vec<u8>,
}

impl SourceDocument {
    pub fn new(filename: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            filename: filename.into(),
            bytes,
        }
    }

    /// Wraps pasted text as a plain-text document.
    pub fn from_text(filename: impl Into<String>, text: &str) -> Self {
        Self::new(filename, text.as_bytes().to_vec())
    }

    pub async fn read(path: &Path) -> std::io::Result<Self> {
        let bytes = tokio::fs::read(path).await?;
        let filename = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        Ok(Self { filename, bytes })
    }

    pub fn kind(&self) -> DocumentKind {
        DocumentKind::from_filename(&self.filename)
    }
}

/// Extracts and cleans the text of a document.
pub fn extract_text(doc: &SourceDocument) -> Result<String, DocumentError> {
    let raw = match doc.kind() {
        DocumentKind::Pdf => pdf_extract::extract_text_from_mem(&doc.bytes).map_err(|e| {
            DocumentError::Pdf {
                filename: doc.filename.clone(),
                message: e.to_string(),
            }
        })?,
        DocumentKind::Docx => extract_docx_text(doc)?,
        DocumentKind::Doc => {
            return Err(DocumentError::Unsupported(format!(
                "{} (legacy .doc files must be converted to .docx or .pdf)",
                doc.filename
            )))
        }
        DocumentKind::Text => String::from_utf8(doc.bytes.clone())
            .map_err(|_| DocumentError::InvalidUtf8(doc.filename.clone()))?,
    };

    let cleaned = clean_text(&raw);
    if cleaned.is_empty() {
        return Err(DocumentError::Empty(doc.filename.clone()));
    }
    Ok(cleaned)
}

fn extract_docx_text(doc: &SourceDocument) -> Result<String, DocumentError> {
    use docx_rs::{DocumentChild, ParagraphChild, RunChild};

    let docx = docx_rs::read_docx(&doc.bytes).map_err(|e| DocumentError::Docx {
        filename: doc.filename.clone(),
        message: e.to_string(),
    })?;

    let mut text = String::new();
    for child in &docx.document.children {
        if let DocumentChild::Paragraph(paragraph) = child {
            for paragraph_child in &paragraph.children {
                if let ParagraphChild::Run(run) = paragraph_child {
                    for run_child in &run.children {
                        if let RunChild::Text(t) = run_child {
                            text.push_str(&t.text);
                        }
                    }
                }
            }
            text.push('\n');
        }
    }
    Ok(text)
}

/// Normalises extracted text while keeping its line structure.
///
/// Whitespace runs inside a line collapse to one space, decorative symbols are
/// dropped, and consecutive blank lines collapse to one.
pub fn clean_text(text: &str) -> String {
    let mut lines: Vec<String> = Vec::new();
    let mut previous_blank = true;

    for line in text.lines() {
        let filtered: String = line.chars().filter(|c| is_kept_char(*c)).collect();
        let collapsed = filtered.split_whitespace().collect::<Vec<_>>().join(" ");

        if collapsed.is_empty() {
            if !previous_blank {
                lines.push(String::new());
            }
            previous_blank = true;
        } else {
            lines.push(collapsed);
            previous_blank = false;
        }
    }

    while lines.last().is_some_and(|l| l.is_empty()) {
        lines.pop();
    }
    lines.join("\n")
}

fn is_kept_char(c: char) -> bool {
    c.is_alphanumeric()
        || c == ' '
        || c == '\t'
        || matches!(
            c,
            '-' | '.' | ',' | '@' | '+' | '#' | '/' | ':' | '(' | ')' | '&' | '\'' | '•' | '·' | ';' | '|' | '%' | '–'
        )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_from_extension_is_case_insensitive() {
        assert_eq!(DocumentKind::from_filename("CV.PDF"), DocumentKind::Pdf);
        assert_eq!(DocumentKind::from_filename("cv.Docx"), DocumentKind::Docx);
        assert_eq!(DocumentKind::from_filename("old.doc"), DocumentKind::Doc);
        assert_eq!(DocumentKind::from_filename("jd.txt"), DocumentKind::Text);
        assert_eq!(DocumentKind::from_filename("pasted"), DocumentKind::Text);
    }

    #[test]
    fn test_resume_formats() {
        assert!(DocumentKind::is_resume_format("a.pdf"));
        assert!(DocumentKind::is_resume_format("a.docx"));
        assert!(DocumentKind::is_resume_format("a.doc"));
        assert!(!DocumentKind::is_resume_format("a.txt"));
        assert!(!DocumentKind::is_resume_format("notes"));
    }

    #[test]
    fn test_clean_text_keeps_lines_and_collapses_spaces() {
        let input = "Jane   Doe\n\n\n\nSkills:\tRust,  C++ ,  Node.js\n   \n★ Led team ★\n\n";
        let cleaned = clean_text(input);
        assert_eq!(cleaned, "Jane Doe\n\nSkills: Rust, C++ , Node.js\n\nLed team");
    }

    #[test]
    fn test_clean_text_keeps_email_characters() {
        let cleaned = clean_text("jane.doe+jobs@example.com  |  +1 (555) 010-2000");
        assert_eq!(cleaned, "jane.doe+jobs@example.com | +1 (555) 010-2000");
    }

    #[test]
    fn test_extract_plain_text() {
        let doc = SourceDocument::from_text("jd.txt", "Position: Rust Engineer\nRequired skills: Rust");
        let text = extract_text(&doc).unwrap();
        assert!(text.starts_with("Position: Rust Engineer"));
    }

    #[test]
    fn test_extract_rejects_legacy_doc() {
        let doc = SourceDocument::new("resume.doc", vec![0xD0, 0xCF, 0x11, 0xE0]);
        assert!(matches!(extract_text(&doc), Err(DocumentError::Unsupported(_))));
    }

    #[test]
    fn test_extract_rejects_invalid_utf8_text() {
        let doc = SourceDocument::new("jd.txt", vec![0xFF, 0xFE, 0xFD]);
        assert!(matches!(extract_text(&doc), Err(DocumentError::InvalidUtf8(_))));
    }

    #[test]
    fn test_extract_empty_text_is_error() {
        let doc = SourceDocument::from_text("empty.txt", "   \n\n  ★ ");
        assert!(matches!(extract_text(&doc), Err(DocumentError::Empty(_))));
    }

    #[test]
    fn test_extract_docx_one_line_per_paragraph() {
        use docx_rs::{Docx, Paragraph, Run};

        let mut cursor = std::io::Cursor::new(Vec::new());
        Docx::new()
            .add_paragraph(Paragraph::new().add_run(Run::new().add_text("Jane Doe")))
            .add_paragraph(
                Paragraph::new()
                    .add_run(Run::new().add_text("Skills: "))
                    .add_run(Run::new().add_text("Rust, Go")),
            )
            .build()
            .pack(&mut cursor)
            .unwrap();

        let doc = SourceDocument::new("jane.docx", cursor.into_inner());
        assert_eq!(extract_text(&doc).unwrap(), "Jane Doe\nSkills: Rust, Go");
    }

    #[test]
    fn test_corrupt_docx_is_docx_error() {
        let doc = SourceDocument::from_text("cv.docx", "plain text, not a zip archive");
        match extract_text(&doc) {
            Err(DocumentError::Docx { filename, .. }) => assert_eq!(filename, "cv.docx"),
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[test]
    fn test_corrupt_pdf_is_pdf_error() {
        let doc = SourceDocument::from_text("cv.pdf", "plain text, not a pdf");
        match extract_text(&doc) {
            Err(DocumentError::Pdf { filename, .. }) => assert_eq!(filename, "cv.pdf"),
            other => panic!("unexpected result: {other:?}"),
        }
    }
}
