use std::time::Duration;

use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::docs::types::{Document, UploadFile};

pub const UPLOAD_FALLBACK: &str = "Failed to upload document";
pub const ANSWER_FALLBACK: &str = "Failed to get answer";

#[derive(Debug, Serialize)]
struct AskRequest<'a> {
    question: &'a str,
}

/// Successful body of the question-answering endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct AnswerPayload {
    pub answer: String,
    #[serde(default)]
    pub citations: Option<Vec<String>>,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    error: Option<String>,
}

/// Pull a user-facing message out of a failure body, falling back to `fallback`
/// when the body is not JSON or carries no usable `error` field.
pub fn failure_message(body: &str, fallback: &str) -> String {
    serde_json::from_str::<ErrorBody>(body)
        .ok()
        .and_then(|b| b.error)
        .filter(|e| !e.trim().is_empty())
        .unwrap_or_else(|| fallback.to_string())
}

/// Parse a success body of the question endpoint. A body without `answer`
/// counts as a failed request.
pub fn parse_answer(body: &str) -> Result<AnswerPayload> {
    serde_json::from_str(body).map_err(|e| {
        debug!(error = %e, "malformed answer body");
        anyhow!(ANSWER_FALLBACK)
    })
}

/// Requests run to completion unless a timeout is configured.
fn request_timeout(setting: Option<String>) -> Option<Duration> {
    setting
        .and_then(|s| s.trim().parse::<u64>().ok())
        .map(Duration::from_secs)
}

/// The document service as seen by the page: the two calls it makes, plus listing.
#[async_trait]
pub trait DocumentBackend: Send + Sync {
    async fn upload_document(&self, file: UploadFile) -> Result<Document>;

    async fn ask_question(&self, question: &str) -> Result<AnswerPayload>;

    async fn list_documents(&self) -> Result<Vec<Document>>;
}

/// reqwest client for the document service's REST API.
pub struct ApiClient {
    client: reqwest::Client,
    base_url: String,
}

impl ApiClient {
    pub fn from_env() -> Result<Self> {
        let base_url = dotenv::var("DOCINTEL_API_URL")
            .unwrap_or_else(|_| "http://localhost:8000".to_string());
        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = request_timeout(dotenv::var("DOCINTEL_HTTP_TIMEOUT_SECS").ok()) {
            builder = builder.timeout(timeout);
        }
        let client = builder.build().context("Failed to create HTTP client")?;

        Ok(Self::with_client(client, base_url))
    }

    pub fn with_client(client: reqwest::Client, base_url: impl Into<String>) -> Self {
        let base_url: String = base_url.into();
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn documents_endpoint(&self) -> String {
        format!("{}/api/documents/", self.base_url)
    }

    fn ask_endpoint(&self) -> String {
        format!("{}/api/documents/ask_question/", self.base_url)
    }
}

#[async_trait]
impl DocumentBackend for ApiClient {
    async fn upload_document(&self, file: UploadFile) -> Result<Document> {
        let size = file.bytes.len();
        let part = Part::bytes(file.bytes)
            .file_name(file.name.clone())
            .mime_str(&file.media_type)
            .context(UPLOAD_FALLBACK)?;
        let form = Form::new().part("file", part);

        info!(name = %file.name, media_type = %file.media_type, size, "uploading document");

        let resp = self
            .client
            .post(self.documents_endpoint())
            .multipart(form)
            .send()
            .await
            .context(UPLOAD_FALLBACK)?;
        let status = resp.status();
        let text = resp.text().await.context(UPLOAD_FALLBACK)?;

        // Any rejected upload reads the same to the user; the body is only logged.
        if !status.is_success() {
            debug!(status = status.as_u16(), body = %text, "upload rejected");
            return Err(anyhow!(UPLOAD_FALLBACK));
        }

        let doc: Document = serde_json::from_str(&text).context(UPLOAD_FALLBACK)?;
        info!(doc_id = %doc.id, title = %doc.title, pages = doc.page_count, "document uploaded");
        Ok(doc)
    }

    async fn ask_question(&self, question: &str) -> Result<AnswerPayload> {
        let resp = self
            .client
            .post(self.ask_endpoint())
            .json(&AskRequest { question })
            .send()
            .await
            .context(ANSWER_FALLBACK)?;
        let status = resp.status();
        let text = resp.text().await.context(ANSWER_FALLBACK)?;

        if !status.is_success() {
            let message = failure_message(&text, ANSWER_FALLBACK);
            debug!(status = status.as_u16(), %message, "question rejected");
            return Err(anyhow!(message));
        }

        let payload = parse_answer(&text)?;
        info!(
            answer_len = payload.answer.len(),
            citations = payload.citations.as_ref().map_or(0, |c| c.len()),
            "answer received"
        );
        Ok(payload)
    }

    async fn list_documents(&self) -> Result<Vec<Document>> {
        let resp = self
            .client
            .get(self.documents_endpoint())
            .send()
            .await
            .context("Failed to list documents")?;
        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(anyhow!(failure_message(&body, "Failed to list documents")));
        }
        let docs: Vec<Document> = resp.json().await.context("Failed to list documents")?;
        debug!(count = docs.len(), "listed server documents");
        Ok(docs)
    }
}
