//! Chat transcript types.
//!
//! This module contains types for representing messages in the assistant
//! conversation, including roles and the append-only transcript.

use serde::{Deserialize, Serialize};

/// Represents the author of a transcript message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    /// Message typed by the user.
    User,
    /// Message from the AI assistant.
    Ai,
    /// System-generated notice (e.g. autofill summaries).
    System,
}

/// A single message in the session transcript.
///
/// `is_interview` is true only for AI messages that are interview questions;
/// it drives styling in the view layer. Routing of the next user message is
/// decided by the session mode, not by this flag.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    /// The role of the message author.
    pub role: MessageRole,
    /// The display text.
    pub text: String,
    /// True for AI messages that are interview questions.
    #[serde(default, rename = "isInterview")]
    pub is_interview: bool,
    /// Timestamp when the message was created (RFC 3339 format).
    pub timestamp: String,
}

impl ChatMessage {
    fn new(role: MessageRole, text: impl Into<String>, is_interview: bool) -> Self {
        Self {
            role,
            text: text.into(),
            is_interview,
            timestamp: chrono::Utc::now().to_rfc3339(),
        }
    }

    /// A message typed by the user.
    pub fn user(text: impl Into<String>) -> Self {
        Self::new(MessageRole::User, text, false)
    }

    /// A plain assistant reply.
    pub fn ai(text: impl Into<String>) -> Self {
        Self::new(MessageRole::Ai, text, false)
    }

    /// An assistant message that is an interview question.
    pub fn interview_question(text: impl Into<String>) -> Self {
        Self::new(MessageRole::Ai, text, true)
    }

    /// A system-generated notice.
    pub fn system(text: impl Into<String>) -> Self {
        Self::new(MessageRole::System, text, false)
    }
}

/// Append-only ordered log of chat messages.
///
/// Order is chronological and load-bearing. Messages are never mutated or
/// removed; the whole transcript is replaced only on session reset.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transcript {
    messages: Vec<ChatMessage>,
}

impl Transcript {
    /// Creates an empty transcript.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a transcript holding a single message.
    pub fn with_message(message: ChatMessage) -> Self {
        Self {
            messages: vec![message],
        }
    }

    /// Appends a message, preserving order.
    pub fn append(&mut self, message: ChatMessage) {
        self.messages.push(message);
    }

    /// Returns all messages in chronological order.
    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    /// Returns the most recent message, if any.
    pub fn last(&self) -> Option<&ChatMessage> {
        self.messages.last()
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn append_preserves_order() {
        let mut transcript = Transcript::new();
        transcript.append(ChatMessage::user("hello"));
        transcript.append(ChatMessage::ai("hi"));

        let texts: Vec<&str> = transcript.messages().iter().map(|m| m.text.as_str()).collect();
        assert_eq!(texts, vec!["hello", "hi"]);
    }

    #[test]
    fn only_interview_constructor_sets_the_flag() {
        assert!(ChatMessage::interview_question("q?").is_interview);
        assert!(!ChatMessage::ai("reply").is_interview);
        assert!(!ChatMessage::system("notice").is_interview);
        assert_eq!(ChatMessage::interview_question("q?").role, MessageRole::Ai);
    }
}
