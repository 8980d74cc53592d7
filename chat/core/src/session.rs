//! Session Management
//!
//! Owns the backend session identifier for one conversation.
//!
//! The backend issues an id on the first successful exchange and is expected
//! to echo it afterwards. Adoption is first-wins: once an id is held it is
//! attached to every later request and never replaced, even if the backend
//! starts answering with a different one.

use serde::{Deserialize, Serialize};

use crate::messages::{now_ms, SessionId};

/// Result of offering a session id to the session
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Adoption {
    /// No id was held; this one is now in use
    Adopted,
    /// An id was already held and kept
    Kept {
        /// The id offered by the backend
        offered: SessionId,
    },
}

/// Session identity for one conversation
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct ChatSession {
    /// Adopted id, absent until the first successful response
    session_id: Option<SessionId>,
    /// When the id was adopted (Unix timestamp ms)
    adopted_at: Option<u64>,
    /// Successful exchanges in this session
    exchanges: u32,
}

impl ChatSession {
    /// Create an empty session
    pub fn new() -> Self {
        Self::default()
    }

    /// The adopted id, if any
    pub fn session_id(&self) -> Option<&SessionId> {
        self.session_id.as_ref()
    }

    /// Adopt `id` unless one is already held
    pub fn adopt(&mut self, id: SessionId) -> Adoption {
        match &self.session_id {
            None => {
                tracing::debug!(session_id = %id, "Adopted session id");
                self.session_id = Some(id);
                self.adopted_at = Some(now_ms());
                Adoption::Adopted
            }
            Some(current) => {
                if *current != id {
                    tracing::warn!(
                        current = %current,
                        offered = %id,
                        "Backend returned a different session id; keeping the first"
                    );
                }
                Adoption::Kept { offered: id }
            }
        }
    }

    /// When the id was adopted
    pub fn adopted_at(&self) -> Option<u64> {
        self.adopted_at
    }

    /// Count a successful exchange
    pub fn record_exchange(&mut self) {
        self.exchanges = self.exchanges.saturating_add(1);
    }

    /// Successful exchanges so far
    pub fn exchanges(&self) -> u32 {
        self.exchanges
    }
}
