//! Request Pipeline
//!
//! Turns user input into backend calls, one at a time, and folds every
//! outcome back into the timeline.
//!
//! # State Machine
//!
//! ```text
//!   Idle ──submit──▶ Pending ──settle──▶ Settled(Success | Failure)
//!                       ▲                        │
//!                       └─────────submit─────────┘
//! ```
//!
//! A submission while `Pending` is rejected, never queued. Failures of any
//! kind (network, HTTP status, malformed body, timeout) become one fixed
//! assistant message; the detail only goes to the logs.
//!
//! The backend call runs on a spawned task so an event loop can keep
//! drawing. Surfaces either drive it with [`RequestPipeline::submit`] plus
//! [`RequestPipeline::poll`], or await the whole turn with
//! [`RequestPipeline::send`].

use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::backend::ResearchBackend;
use crate::config::ChatConfig;
use crate::error::{ChatError, SendRejected};
use crate::messages::{ChatMessage, ChatNotice, MessageId};
use crate::payload::{ChatRequest, ChatResponse};
use crate::session::{Adoption, ChatSession};
use crate::timeline::Timeline;

/// Assistant text appended when a request fails
pub const FAILURE_MESSAGE: &str =
    "Sorry, I encountered an error processing your request. Please try again.";

/// Assistant text shown when a conversation opens
pub const WELCOME_MESSAGE: &str = "Welcome to Juno! I'm your AI crypto research assistant. \
Ask me about any cryptocurrency, market trends, or get technical analysis. \
Try asking: \"Analyze BTC\" or \"What's the sentiment on Ethereum?\"";

/// How the last request ended
#[derive(Clone, Debug, PartialEq)]
pub enum Settlement {
    /// Analysis appended
    Success,
    /// Fallback message appended
    Failure(ChatError),
}

/// Request state machine
#[derive(Clone, Debug, PartialEq, Default)]
pub enum RequestState {
    /// Nothing sent yet
    #[default]
    Idle,
    /// A request is in flight
    Pending {
        /// When it was submitted
        since: Instant,
    },
    /// The last request finished
    Settled(Settlement),
}

impl RequestState {
    /// Human-readable description for status bars
    #[must_use]
    pub fn description(&self) -> &'static str {
        match self {
            Self::Idle => "Ready",
            Self::Pending { .. } => "Analyzing with multi-agent system...",
            Self::Settled(Settlement::Success) => "Ready",
            Self::Settled(Settlement::Failure(_)) => "Last request failed",
        }
    }
}

/// Result of [`RequestPipeline::send`]
#[derive(Clone, Debug, PartialEq)]
pub enum SendOutcome {
    /// Nothing happened
    Rejected(SendRejected),
    /// The request ran and settled
    Completed(Settlement),
}

type InFlight = JoinHandle<Result<ChatResponse, ChatError>>;

/// One conversation's request pipeline
///
/// Owns the session, the timeline and the request state. Surfaces read them
/// through the accessors; nothing else mutates them.
pub struct RequestPipeline<B: ResearchBackend + 'static> {
    backend: Arc<B>,
    request_timeout: Duration,
    session: ChatSession,
    timeline: Timeline,
    state: RequestState,
    notices: Option<mpsc::Sender<ChatNotice>>,
    in_flight: Option<InFlight>,
}

impl<B: ResearchBackend + 'static> RequestPipeline<B> {
    /// Create a pipeline without a notice channel
    pub fn new(backend: Arc<B>, request_timeout: Duration) -> Self {
        Self {
            backend,
            request_timeout,
            session: ChatSession::new(),
            timeline: Timeline::new(),
            state: RequestState::Idle,
            notices: None,
            in_flight: None,
        }
    }

    /// Create a pipeline that reports scroll hints and state changes on `notices`
    pub fn with_notices(
        backend: Arc<B>,
        request_timeout: Duration,
        notices: mpsc::Sender<ChatNotice>,
    ) -> Self {
        Self {
            backend,
            request_timeout,
            session: ChatSession::new(),
            timeline: Timeline::with_notices(notices.clone()),
            state: RequestState::Idle,
            notices: Some(notices),
            in_flight: None,
        }
    }

    /// Create a pipeline using the timeout from `config`
    pub fn from_config(
        backend: Arc<B>,
        config: &ChatConfig,
        notices: mpsc::Sender<ChatNotice>,
    ) -> Self {
        Self::with_notices(backend, config.request_timeout, notices)
    }

    /// The backend in use
    pub fn backend(&self) -> &Arc<B> {
        &self.backend
    }

    /// Session identity
    pub fn session(&self) -> &ChatSession {
        &self.session
    }

    /// Conversation so far
    pub fn timeline(&self) -> &Timeline {
        &self.timeline
    }

    /// Current request state
    pub fn state(&self) -> &RequestState {
        &self.state
    }

    /// Whether a request is in flight
    pub fn is_pending(&self) -> bool {
        matches!(self.state, RequestState::Pending { .. })
    }

    /// Append the welcome message
    pub fn greet(&mut self) -> MessageId {
        self.timeline.append(ChatMessage::assistant(WELCOME_MESSAGE))
    }

    /// Append the user turn and start the backend call
    ///
    /// Must be called from within a tokio runtime. The text is sent as typed;
    /// only the emptiness check looks at its trimmed form.
    pub fn submit(&mut self, text: &str) -> Result<MessageId, SendRejected> {
        if text.trim().is_empty() {
            return Err(SendRejected::EmptyInput);
        }
        if self.is_pending() {
            tracing::debug!("Ignoring submission while a request is pending");
            return Err(SendRejected::Busy);
        }

        let message_id = self.timeline.append(ChatMessage::user(text));
        let request = ChatRequest::new(text, self.session.session_id());

        tracing::info!(
            message_id = %message_id,
            backend = self.backend.name(),
            session = ?self.session.session_id().map(ToString::to_string),
            "Submitting research request"
        );

        let backend = Arc::clone(&self.backend);
        let timeout = self.request_timeout;
        self.in_flight = Some(tokio::spawn(async move {
            match tokio::time::timeout(timeout, backend.chat(&request)).await {
                Ok(result) => result,
                Err(_) => Err(ChatError::Timeout(timeout)),
            }
        }));

        self.set_state(RequestState::Pending {
            since: Instant::now(),
        });
        Ok(message_id)
    }

    /// Settle the in-flight request if it has finished
    ///
    /// Returns `true` when a request was settled by this call. Never waits on
    /// the network.
    pub async fn poll(&mut self) -> bool {
        let finished = self
            .in_flight
            .as_ref()
            .is_some_and(JoinHandle::is_finished);
        if !finished {
            return false;
        }
        self.wait_settled().await.is_some()
    }

    /// Wait for the in-flight request and settle it
    ///
    /// Returns `None` when nothing is in flight. Cancel safe: dropping the
    /// future leaves the request in flight.
    pub async fn wait_settled(&mut self) -> Option<Settlement> {
        let handle = self.in_flight.as_mut()?;
        let joined = handle.await;
        self.in_flight = None;

        let result = joined.unwrap_or_else(|e| Err(ChatError::Aborted(e.to_string())));
        Some(self.settle(result))
    }

    /// Run one full turn: submit, then wait for it to settle
    pub async fn send(&mut self, text: &str) -> SendOutcome {
        if let Err(rejected) = self.submit(text) {
            return SendOutcome::Rejected(rejected);
        }
        let settlement = match self.wait_settled().await {
            Some(settlement) => settlement,
            None => Settlement::Failure(ChatError::Aborted("no request in flight".to_string())),
        };
        SendOutcome::Completed(settlement)
    }

    fn settle(&mut self, result: Result<ChatResponse, ChatError>) -> Settlement {
        let settlement = match result {
            Ok(response) => {
                let (session_id, summary, payload) = response.into_parts();
                if self.session.adopt(session_id.clone()) == Adoption::Adopted {
                    self.notify(ChatNotice::SessionAdopted { session_id });
                }
                self.session.record_exchange();
                self.timeline.append(ChatMessage::research(summary, payload));

                tracing::info!(
                    exchanges = self.session.exchanges(),
                    "Research request succeeded"
                );
                Settlement::Success
            }
            Err(error) => {
                tracing::warn!(
                    backend = self.backend.name(),
                    error = %error,
                    network_or_server = error.is_network_or_server(),
                    "Research request failed"
                );
                self.timeline.append(ChatMessage::failure(FAILURE_MESSAGE));
                Settlement::Failure(error)
            }
        };

        self.set_state(RequestState::Settled(settlement.clone()));
        settlement
    }

    fn set_state(&mut self, state: RequestState) {
        self.state = state.clone();
        self.notify(ChatNotice::StateChanged { state });
    }

    fn notify(&self, notice: ChatNotice) {
        if let Some(tx) = &self.notices {
            let _ = tx.try_send(notice);
        }
    }
}

impl<B: ResearchBackend + 'static> Drop for RequestPipeline<B> {
    fn drop(&mut self) {
        if let Some(handle) = self.in_flight.take() {
            handle.abort();
        }
    }
}
