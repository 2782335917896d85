use serde::{Deserialize, Serialize};

/// Server-assigned document ID.
pub type DocId = String;

/// A document record as returned by the document service after upload.
/// Never mutated once received.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Document {
    pub id: DocId,
    pub title: String,
    /// Short label, e.g. "PDF"
    pub file_type: String,
    pub page_count: u32,
    /// ISO-8601 timestamp
    pub created_at: String,
}

/// A file handed to the upload intake: name, declared media type and raw bytes.
#[derive(Debug, Clone)]
pub struct UploadFile {
    pub name: String,
    /// As declared by the sender, e.g. "application/pdf" or "text/plain; charset=utf-8"
    pub media_type: String,
    pub bytes: Vec<u8>,
}

impl UploadFile {
    pub fn new(name: impl Into<String>, media_type: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            media_type: media_type.into(),
            bytes,
        }
    }
}
