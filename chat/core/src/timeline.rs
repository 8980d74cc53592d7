//! Message Timeline
//!
//! Append-only, insertion-ordered log of conversation turns. Appending is the
//! only mutation, so a surface can re-render from [`Timeline::all`] at any
//! moment.

use tokio::sync::mpsc;

use crate::messages::{ChatMessage, ChatNotice, MessageId};

/// Ordered conversation log
#[derive(Debug, Default)]
pub struct Timeline {
    messages: Vec<ChatMessage>,
    /// Where scroll hints go (optional)
    notices: Option<mpsc::Sender<ChatNotice>>,
}

impl Timeline {
    /// Create an empty timeline without a notice channel
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty timeline that sends scroll hints on `notices`
    pub fn with_notices(notices: mpsc::Sender<ChatNotice>) -> Self {
        Self {
            messages: Vec::new(),
            notices: Some(notices),
        }
    }

    /// Append a message and hint the surface to scroll to it
    pub fn append(&mut self, message: ChatMessage) -> MessageId {
        let id = message.id.clone();
        tracing::trace!(message_id = %id, role = ?message.role, "Timeline append");
        self.messages.push(message);

        if let Some(tx) = &self.notices {
            // Hints are best-effort; a full or closed channel is not an error.
            let _ = tx.try_send(ChatNotice::ScrollToLatest {
                message_id: id.clone(),
            });
        }

        id
    }

    /// All messages, oldest first
    pub fn all(&self) -> &[ChatMessage] {
        &self.messages
    }

    /// Number of messages
    pub fn len(&self) -> usize {
        self.messages.len()
    }

    /// Whether the timeline is empty
    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    /// The newest message
    pub fn last(&self) -> Option<&ChatMessage> {
        self.messages.last()
    }

    /// Look up a message by id
    pub fn get(&self, id: &MessageId) -> Option<&ChatMessage> {
        self.messages.iter().find(|m| &m.id == id)
    }
}
