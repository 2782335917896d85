use super::{Message, Transcript};

pub const LOADING_INDICATOR: &str = "• • •";
const CITATION_SEPARATOR: &str = ", ";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Alignment {
    Left,
    Right,
}

impl Message {
    /// Questions sit on the right, answers on the left.
    pub fn alignment(&self) -> Alignment {
        match self {
            Message::Question { .. } => Alignment::Right,
            Message::Answer { .. } => Alignment::Left,
        }
    }
}

/// `Sources: a, b` footer, only for answers that carry citations.
pub fn sources_footer(message: &Message) -> Option<String> {
    match message {
        Message::Answer {
            citations: Some(citations),
            ..
        } if !citations.is_empty() => {
            Some(format!("Sources: {}", citations.join(CITATION_SEPARATOR)))
        }
        _ => None,
    }
}

/// Render one message as a chat bubble.
pub fn render_message(message: &Message) -> String {
    let mut out = match message.alignment() {
        // right-aligned bubbles are rendered as a quote block
        Alignment::Right => message
            .content()
            .lines()
            .map(|l| format!("> {}", l))
            .collect::<Vec<_>>()
            .join("\n"),
        Alignment::Left => message.content().to_string(),
    };
    if let Some(footer) = sources_footer(message) {
        out.push_str(&format!("\n-# {}", footer));
    }
    out
}

/// Whole transcript: every bubble in order, the loading indicator while a
/// request is pending, then the current error.
pub fn render_transcript(transcript: &Transcript) -> String {
    let mut parts: Vec<String> = transcript.messages().iter().map(render_message).collect();
    if transcript.is_pending() {
        parts.push(LOADING_INDICATOR.to_string());
    }
    if let Some(error) = transcript.error() {
        parts.push(format!("**Error:** {}", error));
    }
    if parts.is_empty() {
        return "No questions asked yet. Use `/docintel ask` to start.".to_string();
    }
    parts.join("\n\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::AnswerPayload;

    fn answer(content: &str, citations: &[&str]) -> Message {
        Message::answer(AnswerPayload {
            answer: content.to_string(),
            citations: Some(citations.iter().map(|s| s.to_string()).collect()),
        })
    }

    #[test]
    fn test_alignment_by_type() {
        let q = Message::Question {
            content: "q".to_string(),
        };
        assert_eq!(q.alignment(), Alignment::Right);
        assert_eq!(answer("a", &[]).alignment(), Alignment::Left);
    }

    #[test]
    fn test_sources_footer() {
        assert_eq!(
            sources_footer(&answer("30 days", &["doc1.pdf p.2"])).as_deref(),
            Some("Sources: doc1.pdf p.2")
        );
        assert_eq!(
            sources_footer(&answer("x", &["a", "b", "c"])).as_deref(),
            Some("Sources: a, b, c")
        );
        assert_eq!(sources_footer(&answer("x", &[])), None);
        assert_eq!(
            sources_footer(&Message::Question {
                content: "q".to_string()
            }),
            None
        );
    }

    #[test]
    fn test_refund_policy_scenario() {
        let mut t = Transcript::new();
        t.set_draft("What is the refund policy?");
        t.submit();
        t.resolve(Ok(AnswerPayload {
            answer: "30 days".to_string(),
            citations: Some(vec!["doc1.pdf p.2".to_string()]),
        }))
        .unwrap();

        let out = render_transcript(&t);
        assert_eq!(
            out,
            "> What is the refund policy?\n\n30 days\n-# Sources: doc1.pdf p.2"
        );
    }

    #[test]
    fn test_pending_shows_loading_indicator() {
        let mut t = Transcript::new();
        t.set_draft("q");
        t.submit();
        let out = render_transcript(&t);
        assert!(out.ends_with(LOADING_INDICATOR));
    }

    #[test]
    fn test_error_is_rendered_after_messages() {
        let mut t = Transcript::new();
        t.set_draft("q");
        t.submit();
        let _ = t.resolve(Err(anyhow::anyhow!("Failed to get answer")));
        let out = render_transcript(&t);
        assert_eq!(out, "> q\n\n**Error:** Failed to get answer");
    }

    #[test]
    fn test_multiline_question_quotes_every_line() {
        let q = Message::Question {
            content: "line one\nline two".to_string(),
        };
        assert_eq!(render_message(&q), "> line one\n> line two");
    }
}
