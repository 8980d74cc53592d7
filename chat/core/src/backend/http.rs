//! HTTP Research Backend
//!
//! [`ResearchBackend`] over the research service's JSON API.
//!
//! # Endpoints
//!
//! - `POST /api/chat` - one chat turn, returns session id and analysis
//! - `GET /api/market/{symbol}` - price and 24h change
//! - `GET /api/` - liveness

use std::time::Duration;

use async_trait::async_trait;

use super::traits::ResearchBackend;
use crate::config::ChatConfig;
use crate::error::ChatError;
use crate::market::{MarketQuote, MarketSnapshot};
use crate::payload::{parse_chat_response, ChatRequest, ChatResponse};

/// Longest error body kept in [`ChatError::Status`]
const MAX_ERROR_BODY: usize = 512;

/// HTTP research backend client
#[derive(Clone)]
pub struct HttpResearchBackend {
    /// Base URL without trailing slash (e.g. `http://localhost:8001`)
    base_url: String,
    /// HTTP client
    http_client: reqwest::Client,
}

impl HttpResearchBackend {
    /// Create a backend for `base_url` with a per-request timeout
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, ChatError> {
        let http_client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ChatError::Transport(format!("failed to create HTTP client: {e}")))?;

        Ok(Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            http_client,
        })
    }

    /// Create from [`ChatConfig`]
    pub fn from_config(config: &ChatConfig) -> Result<Self, ChatError> {
        Self::new(config.backend_url.clone(), config.request_timeout)
    }

    /// Base URL in use
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn chat_url(&self) -> String {
        format!("{}/api/chat", self.base_url)
    }

    fn market_url(&self, symbol: &str) -> String {
        format!("{}/api/market/{}", self.base_url, symbol)
    }

    fn health_url(&self) -> String {
        format!("{}/api/", self.base_url)
    }

    /// Turn a non-success response into [`ChatError::Status`]
    async fn check_status(response: reqwest::Response) -> Result<reqwest::Response, ChatError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let mut body = response.text().await.unwrap_or_default();
        if body.len() > MAX_ERROR_BODY {
            let mut cut = MAX_ERROR_BODY;
            while !body.is_char_boundary(cut) {
                cut -= 1;
            }
            body.truncate(cut);
        }
        Err(ChatError::Status {
            status: status.as_u16(),
            body,
        })
    }
}

#[async_trait]
impl ResearchBackend for HttpResearchBackend {
    fn name(&self) -> &str {
        "HTTP"
    }

    async fn health_check(&self) -> bool {
        match self
            .http_client
            .get(self.health_url())
            .timeout(Duration::from_secs(5))
            .send()
            .await
        {
            Ok(response) => response.status().is_success(),
            Err(e) => {
                tracing::debug!(error = %e, "Health check failed");
                false
            }
        }
    }

    async fn chat(&self, request: &ChatRequest) -> Result<ChatResponse, ChatError> {
        tracing::debug!(
            url = %self.chat_url(),
            has_session = request.session_id.is_some(),
            "Sending chat request"
        );

        let response = self
            .http_client
            .post(self.chat_url())
            .json(request)
            .send()
            .await?;
        let response = Self::check_status(response).await?;

        let body = response.text().await?;
        parse_chat_response(&body)
    }

    async fn market(&self, symbol: &str) -> Result<MarketSnapshot, ChatError> {
        let response = self
            .http_client
            .get(self.market_url(symbol))
            .send()
            .await?;
        let response = Self::check_status(response).await?;

        let body = response.text().await?;
        let quote: MarketQuote = serde_json::from_str(&body)?;
        MarketSnapshot::from_quote(symbol, quote)
    }
}
