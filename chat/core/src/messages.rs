//! Chat Messages
//!
//! Identifiers, conversation turns, and the notices the engine sends to the
//! presentation layer.
//!
//! A [`ChatMessage`] is created once (when the user submits, or when a
//! response or error arrives) and never mutated afterwards. The timeline owns
//! every message; surfaces only borrow them for rendering.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::payload::ResearchPayload;
use crate::pipeline::RequestState;

/// Message identifier
///
/// Derived from the creation timestamp plus a process-wide counter, so two
/// messages created in the same millisecond still differ. Used for list
/// identity only, never for ordering.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MessageId(pub String);

impl MessageId {
    /// Generate a new unique message ID
    pub fn new() -> Self {
        use std::sync::atomic::{AtomicU64, Ordering};
        static COUNTER: AtomicU64 = AtomicU64::new(0);
        let count = COUNTER.fetch_add(1, Ordering::SeqCst);
        Self(format!("msg_{}_{count}", now_ms()))
    }
}

impl Default for MessageId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for MessageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Backend-issued session identifier (opaque)
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SessionId(pub String);

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Who sent a message
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum MessageRole {
    /// User input
    User,
    /// Research assistant
    Assistant,
}

/// One conversation turn
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    /// Unique message ID
    pub id: MessageId,
    /// Who sent this message
    pub role: MessageRole,
    /// Display text
    pub content: String,
    /// Structured analysis, only on successful assistant turns
    pub research: Option<ResearchPayload>,
    /// Synthesized failure message
    pub is_error: bool,
    /// When the message was created (Unix timestamp ms)
    pub timestamp: u64,
}

impl ChatMessage {
    /// A user turn
    pub fn user(content: impl Into<String>) -> Self {
        Self::build(MessageRole::User, content.into(), None, false)
    }

    /// A plain assistant turn (greeting)
    pub fn assistant(content: impl Into<String>) -> Self {
        Self::build(MessageRole::Assistant, content.into(), None, false)
    }

    /// An assistant turn carrying an analysis
    pub fn research(summary: impl Into<String>, payload: ResearchPayload) -> Self {
        Self::build(MessageRole::Assistant, summary.into(), Some(payload), false)
    }

    /// The fallback assistant turn shown when a request fails
    pub fn failure(content: impl Into<String>) -> Self {
        Self::build(MessageRole::Assistant, content.into(), None, true)
    }

    fn build(
        role: MessageRole,
        content: String,
        research: Option<ResearchPayload>,
        is_error: bool,
    ) -> Self {
        Self {
            id: MessageId::new(),
            role,
            content,
            research,
            is_error,
            timestamp: now_ms(),
        }
    }
}

/// Notices from the engine to the presentation layer
///
/// Purely advisory: a surface that drops them still renders correctly by
/// reading the timeline.
#[derive(Clone, Debug, PartialEq)]
pub enum ChatNotice {
    /// A message was appended; scroll to the newest entry
    ScrollToLatest {
        /// The appended message
        message_id: MessageId,
    },
    /// The request state machine moved
    StateChanged {
        /// The new state
        state: RequestState,
    },
    /// A session id was adopted
    SessionAdopted {
        /// The adopted id
        session_id: SessionId,
    },
}

/// Current Unix time in milliseconds
pub(crate) fn now_ms() -> u64 {
    u64::try_from(chrono::Utc::now().timestamp_millis()).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_message_id_unique() {
        let id1 = MessageId::new();
        let id2 = MessageId::new();
        assert_ne!(id1, id2);
        assert!(id1.0.starts_with("msg_"));
    }

    #[test]
    fn test_constructors_set_role_and_flags() {
        let user = ChatMessage::user("hi");
        assert_eq!(user.role, MessageRole::User);
        assert!(!user.is_error);
        assert!(user.research.is_none());

        let failure = ChatMessage::failure("sorry");
        assert_eq!(failure.role, MessageRole::Assistant);
        assert!(failure.is_error);
    }
}
