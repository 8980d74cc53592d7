//! Chat Client
//!
//! Thin wrapper around the [`RequestPipeline`] for TUI integration.
//! The pipeline is embedded directly; the client bundles it with the notice
//! receiver so the app has one thing to talk to.
//!
//! # Architecture
//!
//! The TUI is a thin client. It:
//! 1. Converts key presses into [`ChatClient::send_message`] calls
//! 2. Calls [`ChatClient::poll`] every frame to settle finished requests
//! 3. Drains notices with [`ChatClient::recv_all`] into its display state
//! 4. Renders the timeline

use std::sync::Arc;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use research_core::{
    ChatConfig, ChatNotice, ChatSession, MessageId, RequestPipeline, RequestState,
    ResearchBackend, SendRejected, Timeline,
};

/// Notice channel capacity
const NOTICE_BUFFER: usize = 100;

/// Client for the embedded request pipeline
pub struct ChatClient<B: ResearchBackend + 'static> {
    /// The embedded pipeline
    pipeline: RequestPipeline<B>,
    /// Receiver for notices from the pipeline
    rx: mpsc::Receiver<ChatNotice>,
    /// Whether to show the welcome message on start
    greet_on_start: bool,
}

impl<B: ResearchBackend + 'static> ChatClient<B> {
    /// Create a client around `backend`
    pub fn new(backend: Arc<B>, config: &ChatConfig) -> Self {
        let (tx, rx) = mpsc::channel(NOTICE_BUFFER);
        let pipeline = RequestPipeline::from_config(backend, config, tx);
        Self {
            pipeline,
            rx,
            greet_on_start: config.greet_on_start,
        }
    }

    /// Check the backend and show the welcome message
    ///
    /// Returns whether the backend answered its health check. An unhealthy
    /// backend is not an error: requests will fail into the usual fallback
    /// message.
    pub async fn start(&mut self) -> bool {
        self.greet();
        let healthy = self.pipeline.backend().health_check().await;
        log_health(self.pipeline.backend().name(), healthy);
        healthy
    }

    /// Show the welcome message if configured
    pub fn greet(&mut self) {
        if self.greet_on_start {
            self.pipeline.greet();
        }
    }

    /// Run the health check on its own task
    pub fn spawn_health_check(&self) -> JoinHandle<bool> {
        let backend = Arc::clone(self.pipeline.backend());
        tokio::spawn(async move {
            let healthy = backend.health_check().await;
            log_health(backend.name(), healthy);
            healthy
        })
    }

    /// Send a user message (returns as soon as the request is in flight)
    pub fn send_message(&mut self, content: &str) -> Result<MessageId, SendRejected> {
        self.pipeline.submit(content)
    }

    /// Settle a finished request, if any (must be called regularly)
    pub async fn poll(&mut self) -> bool {
        self.pipeline.poll().await
    }

    /// Receive all pending notices (non-blocking)
    pub fn recv_all(&mut self) -> Vec<ChatNotice> {
        let mut notices = Vec::new();
        while let Ok(notice) = self.rx.try_recv() {
            notices.push(notice);
        }
        notices
    }

    /// Conversation so far
    pub fn timeline(&self) -> &Timeline {
        self.pipeline.timeline()
    }

    /// Session identity
    pub fn session(&self) -> &ChatSession {
        self.pipeline.session()
    }

    /// Current request state
    pub fn state(&self) -> &RequestState {
        self.pipeline.state()
    }

    /// Whether a request is in flight
    pub fn is_pending(&self) -> bool {
        self.pipeline.is_pending()
    }

    /// The backend in use
    pub fn backend(&self) -> &Arc<B> {
        self.pipeline.backend()
    }
}

fn log_health(backend: &str, healthy: bool) {
    if healthy {
        tracing::info!(backend, "Backend reachable");
    } else {
        tracing::warn!(backend, "Backend health check failed");
    }
}
