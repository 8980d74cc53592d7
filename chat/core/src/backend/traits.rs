//! Research Backend Traits
//!
//! The engine talks to the research service only through [`ResearchBackend`].
//! The HTTP implementation lives next door; tests plug in scripted backends.

use async_trait::async_trait;

use crate::error::ChatError;
use crate::market::MarketSnapshot;
use crate::payload::{ChatRequest, ChatResponse};

/// Research backend trait
///
/// Implementations must return only validated responses: a `ChatResponse`
/// handed back from [`ResearchBackend::chat`] is assumed to satisfy the
/// payload invariants.
#[async_trait]
pub trait ResearchBackend: Send + Sync {
    /// Backend name for logs (e.g. "HTTP")
    fn name(&self) -> &str;

    /// Check if the backend is reachable
    async fn health_check(&self) -> bool;

    /// Send one chat turn and wait for the analysis
    async fn chat(&self, request: &ChatRequest) -> Result<ChatResponse, ChatError>;

    /// Fetch the current price snapshot for `symbol`
    async fn market(&self, symbol: &str) -> Result<MarketSnapshot, ChatError>;
}
