use std::future::Future;

use anyhow::Result;
use tracing::{debug, warn};

use super::types::{Document, UploadFile};

/// Media types the intake accepts, matched exactly against the declared type.
pub const ACCEPTED_MEDIA_TYPES: [&str; 3] = [
    "application/pdf",
    "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
    "text/plain",
];

pub const UNSUPPORTED_TYPE_MESSAGE: &str = "Please upload a PDF, DOCX, or TXT file";
pub const UPLOAD_FAILED_MESSAGE: &str = "Failed to upload file";

/// Check a declared media type against the allow-list.
///
/// Parameters such as `; charset=utf-8` are not part of the type and are
/// ignored; the `type/subtype` essence must match one entry exactly.
pub fn is_accepted(media_type: &str) -> bool {
    let essence = media_type.split(';').next().unwrap_or("").trim();
    ACCEPTED_MEDIA_TYPES.contains(&essence)
}

/// Result of one drop/select interaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DropOutcome {
    /// An upload is already in flight; the event was not processed.
    Disabled,
    /// No file was provided.
    Empty,
    /// Declared media type is not accepted. No upload was attempted.
    Rejected(String),
    Uploaded(Document),
    Failed(String),
}

/// Drop/select surface for a single file. Holds only its own error text;
/// the transport lives behind the upload operation it is handed.
#[derive(Debug, Default)]
pub struct UploadIntake {
    error: Option<String>,
}

impl UploadIntake {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// Caption shown on the drop surface.
    pub fn status_line(is_uploading: bool) -> &'static str {
        if is_uploading {
            "Uploading..."
        } else {
            "Attach a file to upload (PDF, DOCX, or TXT files only)"
        }
    }

    /// Process one drop. Clears the previous error, validates the first file
    /// and hands it to `on_upload`. Any failure is kept as the local error
    /// until the next drop.
    pub async fn on_drop<F, Fut>(&mut self, files: Vec<UploadFile>, on_upload: F) -> DropOutcome
    where
        F: FnOnce(UploadFile) -> Fut,
        Fut: Future<Output = Result<Document>>,
    {
        self.error = None;

        let Some(file) = files.into_iter().next() else {
            return DropOutcome::Empty;
        };

        if !is_accepted(&file.media_type) {
            debug!(name = %file.name, media_type = %file.media_type, "rejected unsupported file type");
            self.error = Some(UNSUPPORTED_TYPE_MESSAGE.to_string());
            return DropOutcome::Rejected(UNSUPPORTED_TYPE_MESSAGE.to_string());
        }

        match on_upload(file).await {
            Ok(doc) => DropOutcome::Uploaded(doc),
            Err(e) => {
                let message = e.to_string();
                let message = if message.trim().is_empty() {
                    UPLOAD_FAILED_MESSAGE.to_string()
                } else {
                    message
                };
                warn!(error = %message, "upload failed");
                self.error = Some(message.clone());
                DropOutcome::Failed(message)
            }
        }
    }
}
