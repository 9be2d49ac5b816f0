//! Validation of files handed to the editor.

use crate::config::EditorConfig;

pub const PDF_MIME: &str = "application/pdf";
const PDF_MAGIC: &[u8] = b"%PDF-";

/// A file as received from a picker, drop target or the command line.
#[derive(Debug, Clone)]
pub struct IncomingFile {
    pub name: String,
    /// Empty when the source did not report one.
    pub mime_type: String,
    pub bytes: Vec<u8>,
}

impl IncomingFile {
    pub fn new(name: impl Into<String>, mime_type: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self { name: name.into(), mime_type: mime_type.into(), bytes }
    }

    pub fn size(&self) -> u64 {
        self.bytes.len() as u64
    }

    fn looks_like_pdf(&self) -> bool {
        if !self.mime_type.is_empty() {
            return self.mime_type.eq_ignore_ascii_case(PDF_MIME);
        }
        self.bytes.starts_with(PDF_MAGIC) || self.name.to_ascii_lowercase().ends_with(".pdf")
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum IntakeError {
    #[error("file is not a PDF (type {mime_type:?})")]
    NotPdf { mime_type: String },
    #[error("file is {size} bytes, limit is {limit}")]
    TooLarge { size: u64, limit: u64 },
}

impl IntakeError {
    /// Message for the person who picked the file.
    pub fn user_message(&self) -> String {
        match self {
            IntakeError::NotPdf { .. } => {
                "Ungültige Datei. Bitte laden Sie eine PDF-Datei hoch.".to_owned()
            }
            IntakeError::TooLarge { limit, .. } => {
                format!("Die Datei ist zu groß. Maximal {} MB erlaubt.", limit / (1024 * 1024))
            }
        }
    }
}

/// Accept `file` if it is a PDF within the configured size limit.
///
/// The type is checked before the size, so an oversized non-PDF reports the
/// type problem.
pub fn validate_incoming(file: &IncomingFile, config: &EditorConfig) -> Result<(), IntakeError> {
    if !file.looks_like_pdf() {
        log::debug!("rejecting {}: type {:?}", file.name, file.mime_type);
        return Err(IntakeError::NotPdf { mime_type: file.mime_type.clone() });
    }

    if file.size() > config.max_upload_bytes {
        log::debug!("rejecting {}: {} bytes", file.name, file.size());
        return Err(IntakeError::TooLarge { size: file.size(), limit: config.max_upload_bytes });
    }

    Ok(())
}
