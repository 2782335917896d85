pub mod render;

use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

use crate::api::{AnswerPayload, DocumentBackend, ANSWER_FALLBACK};

/// One turn of the conversation. Immutable once appended.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Message {
    Question {
        content: String,
    },
    Answer {
        content: String,
        /// Present only when the backend supplied at least one citation.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        citations: Option<Vec<String>>,
    },
}

impl Message {
    pub fn answer(payload: AnswerPayload) -> Self {
        Message::Answer {
            content: payload.answer,
            citations: payload.citations.filter(|c| !c.is_empty()),
        }
    }

    pub fn content(&self) -> &str {
        match self {
            Message::Question { content } | Message::Answer { content, .. } => content,
        }
    }
}

/// Append-only conversation log with its input draft, pending flag and error.
///
/// Answers are correlated with questions by position only: every answer is
/// appended after the question whose request produced it.
#[derive(Debug, Default)]
pub struct Transcript {
    messages: Vec<Message>,
    draft: String,
    pending: bool,
    error: Option<String>,
}

impl Transcript {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn draft(&self) -> &str {
        &self.draft
    }

    pub fn is_pending(&self) -> bool {
        self.pending
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// Edit the input field. Refused while a request is pending.
    pub fn set_draft(&mut self, text: &str) -> bool {
        if self.pending {
            return false;
        }
        self.draft = text.to_string();
        true
    }

    /// Submit the current draft. Returns the question to send, or `None` when
    /// the draft is blank or a request is already pending.
    pub fn submit(&mut self) -> Option<String> {
        let question = self.draft.trim();
        if question.is_empty() || self.pending {
            return None;
        }
        let question = question.to_string();

        self.error = None;
        self.pending = true;
        self.messages.push(Message::Question {
            content: question.clone(),
        });
        self.draft.clear();
        Some(question)
    }

    /// Apply the outcome of the request started by the last `submit`.
    /// A failure leaves the log untouched and becomes the local error.
    pub fn resolve(&mut self, result: anyhow::Result<AnswerPayload>) -> std::result::Result<&Message, &str> {
        self.pending = false;
        match result {
            Ok(payload) => {
                self.messages.push(Message::answer(payload));
                let last = self.messages.len() - 1;
                Ok(&self.messages[last])
            }
            Err(e) => {
                let message = e.to_string();
                let message = if message.trim().is_empty() {
                    ANSWER_FALLBACK.to_string()
                } else {
                    message
                };
                Err(self.error.insert(message).as_str())
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AskOutcome {
    /// Nothing changed and no request was made.
    Ignored(IgnoreReason),
    Answered(Message),
    Failed(String),
}

/// Why a submit was not accepted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IgnoreReason {
    Blank,
    /// Another question is still in flight.
    Pending,
}

/// The Q&A section: owns one transcript for the whole session and serializes
/// questions through its pending flag.
#[derive(Debug, Default)]
pub struct QaSection {
    transcript: RwLock<Transcript>,
}

impl QaSection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Type `input` into the form and submit it.
    pub async fn ask(&self, backend: &dyn DocumentBackend, input: &str) -> AskOutcome {
        match self.submit(input).await {
            Ok(question) => self.complete(backend, &question).await,
            Err(reason) => AskOutcome::Ignored(reason),
        }
    }

    /// First half of `ask`: append the question and mark the section pending.
    /// Every `Ok` must be followed by `complete`, or the section stays pending.
    pub async fn submit(&self, input: &str) -> Result<String, IgnoreReason> {
        let mut transcript = self.transcript.write().await;
        if !transcript.set_draft(input) {
            debug!("question ignored, request pending");
            return Err(IgnoreReason::Pending);
        }
        let question = transcript.submit().ok_or(IgnoreReason::Blank)?;
        info!(question = %question, "question submitted");
        Ok(question)
    }

    /// Second half of `ask`: send the submitted question and record the
    /// outcome. The transcript lock is released while the request is in flight.
    pub async fn complete(&self, backend: &dyn DocumentBackend, question: &str) -> AskOutcome {
        let result = backend.ask_question(question).await;

        let mut transcript = self.transcript.write().await;
        match transcript.resolve(result) {
            Ok(message) => AskOutcome::Answered(message.clone()),
            Err(error) => {
                warn!(%error, "question failed");
                AskOutcome::Failed(error.to_string())
            }
        }
    }

    pub async fn is_pending(&self) -> bool {
        self.transcript.read().await.is_pending()
    }

    pub async fn messages(&self) -> Vec<Message> {
        self.transcript.read().await.messages().to_vec()
    }

    /// Render the full transcript view.
    pub async fn render(&self) -> String {
        render::render_transcript(&*self.transcript.read().await)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::Ordering;
    use std::sync::Arc;

    use super::*;
    use crate::api::scripted::ScriptedBackend;

    fn payload(answer: &str, citations: Option<Vec<&str>>) -> AnswerPayload {
        AnswerPayload {
            answer: answer.to_string(),
            citations: citations.map(|c| c.into_iter().map(String::from).collect()),
        }
    }

    #[test]
    fn test_submit_appends_trimmed_question_and_clears_draft() {
        let mut t = Transcript::new();
        assert!(t.set_draft("  What is the refund policy?  "));
        assert_eq!(t.submit().as_deref(), Some("What is the refund policy?"));
        assert_eq!(
            t.messages(),
            &[Message::Question {
                content: "What is the refund policy?".to_string()
            }]
        );
        assert_eq!(t.draft(), "");
        assert!(t.is_pending());
    }

    #[test]
    fn test_blank_submit_is_ignored() {
        let mut t = Transcript::new();
        for blank in ["", "   ", "\n\t"] {
            t.set_draft(blank);
            assert_eq!(t.submit(), None);
        }
        assert!(t.messages().is_empty());
        assert!(!t.is_pending());
    }

    #[test]
    fn test_submit_while_pending_is_ignored() {
        let mut t = Transcript::new();
        t.set_draft("first");
        t.submit();
        assert!(!t.set_draft("second"));
        assert_eq!(t.submit(), None);
        assert_eq!(t.messages().len(), 1);
    }

    #[test]
    fn test_failure_keeps_log_and_sets_error() {
        let mut t = Transcript::new();
        t.set_draft("q");
        t.submit();
        let err = t.resolve(Err(anyhow::anyhow!("No relevant chunks found"))).unwrap_err();
        assert_eq!(err, "No relevant chunks found");
        assert_eq!(t.messages().len(), 1);
        assert_eq!(t.error(), Some("No relevant chunks found"));
        assert!(!t.is_pending());

        // next submit clears the error
        t.set_draft("q2");
        t.submit();
        assert_eq!(t.error(), None);
    }

    #[test]
    fn test_empty_citations_are_dropped() {
        let mut t = Transcript::new();
        t.set_draft("q");
        t.submit();
        let msg = t.resolve(Ok(payload("a", Some(vec![])))).unwrap().clone();
        assert_eq!(
            msg,
            Message::Answer {
                content: "a".to_string(),
                citations: None
            }
        );
    }

    #[test]
    fn test_message_wire_shape() {
        let q = serde_json::to_value(Message::Question {
            content: "hi".to_string(),
        })
        .unwrap();
        assert_eq!(q, serde_json::json!({ "type": "question", "content": "hi" }));

        let a = serde_json::to_value(Message::answer(payload("30 days", Some(vec!["doc1.pdf p.2"]))))
            .unwrap();
        assert_eq!(
            a,
            serde_json::json!({ "type": "answer", "content": "30 days", "citations": ["doc1.pdf p.2"] })
        );

        let bare = serde_json::to_value(Message::answer(payload("ok", None))).unwrap();
        assert!(bare.get("citations").is_none());
    }

    #[tokio::test]
    async fn test_ask_success_appends_question_then_answer() {
        let backend = ScriptedBackend::new();
        backend.push_answer(Ok(payload("30 days", Some(vec!["doc1.pdf p.2", "terms.txt"]))));
        let qa = QaSection::new();

        let outcome = qa.ask(&backend, "What is the refund policy?").await;

        let expected = Message::Answer {
            content: "30 days".to_string(),
            citations: Some(vec!["doc1.pdf p.2".to_string(), "terms.txt".to_string()]),
        };
        assert_eq!(outcome, AskOutcome::Answered(expected.clone()));
        assert_eq!(
            qa.messages().await,
            vec![
                Message::Question {
                    content: "What is the refund policy?".to_string()
                },
                expected
            ]
        );
        assert!(!qa.is_pending().await);
        assert_eq!(
            backend.asked.lock().unwrap().as_slice(),
            &["What is the refund policy?".to_string()]
        );
    }

    #[tokio::test]
    async fn test_ask_failure_appends_only_question() {
        let backend = ScriptedBackend::new();
        backend.push_answer(Err("Question is required".to_string()));
        let qa = QaSection::new();

        let outcome = qa.ask(&backend, "anything?").await;
        assert_eq!(outcome, AskOutcome::Failed("Question is required".to_string()));
        assert_eq!(qa.messages().await.len(), 1);
        assert!(!qa.is_pending().await);
    }

    #[tokio::test]
    async fn test_blank_ask_makes_no_request() {
        let backend = ScriptedBackend::new();
        let qa = QaSection::new();
        assert_eq!(
            qa.ask(&backend, "   ").await,
            AskOutcome::Ignored(IgnoreReason::Blank)
        );
        assert_eq!(backend.ask_calls.load(Ordering::SeqCst), 0);
        assert!(qa.messages().await.is_empty());
    }

    #[tokio::test]
    async fn test_rapid_submits_while_pending_are_ignored() {
        let backend = Arc::new(ScriptedBackend::gated());
        backend.push_answer(Ok(payload("first answer", None)));
        let qa = Arc::new(QaSection::new());

        let in_flight = {
            let backend = backend.clone();
            let qa = qa.clone();
            tokio::spawn(async move { qa.ask(backend.as_ref(), "first").await })
        };
        backend.entered.notified().await;
        assert!(qa.is_pending().await);

        for _ in 0..5 {
            assert_eq!(
                qa.ask(backend.as_ref(), "again").await,
                AskOutcome::Ignored(IgnoreReason::Pending)
            );
        }
        assert_eq!(qa.messages().await.len(), 1);

        backend.release();
        let outcome = in_flight.await.unwrap();
        assert!(matches!(outcome, AskOutcome::Answered(_)));
        assert_eq!(qa.messages().await.len(), 2);
        assert_eq!(backend.ask_calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_submit_reports_pending_before_any_request() {
        let backend = ScriptedBackend::new();
        backend.push_answer(Ok(payload("first", None)));
        let qa = QaSection::new();

        let question = qa.submit("  first question ").await.unwrap();
        assert_eq!(question, "first question");
        assert!(qa.is_pending().await);
        assert_eq!(qa.submit("second").await, Err(IgnoreReason::Pending));
        assert_eq!(qa.submit("   ").await, Err(IgnoreReason::Pending));
        assert_eq!(backend.ask_calls.load(Ordering::SeqCst), 0);

        let outcome = qa.complete(&backend, &question).await;
        assert!(matches!(outcome, AskOutcome::Answered(_)));
        assert!(!qa.is_pending().await);
        assert_eq!(qa.submit(" ").await, Err(IgnoreReason::Blank));
        assert_eq!(qa.messages().await.len(), 2);
    }
}
