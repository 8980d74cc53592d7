//! Research Core - Headless Chat Engine for Market Research
//!
//! This crate holds everything a research chat client needs apart from the
//! pixels: the wire model of the research backend, session identity, the
//! conversation timeline, the request pipeline, and a pure renderer that
//! turns structured analyses into display primitives.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                        UI Surface                            │
//! │     reads Timeline + ResearchView, receives ChatNotice       │
//! └──────────────┬──────────────────────────────▲────────────────┘
//!                │ submit / poll / send          │ notices
//! ┌──────────────▼──────────────────────────────┴────────────────┐
//! │                      RequestPipeline                         │
//! │  ┌────────────┐  ┌────────────┐  ┌──────────────────────────┐ │
//! │  │ ChatSession│  │  Timeline  │  │ RequestState (Idle/      │ │
//! │  │ (first-win │  │ (append-   │  │ Pending/Settled)         │ │
//! │  │  id)       │  │  only)     │  │                          │ │
//! │  └────────────┘  └────────────┘  └──────────────────────────┘ │
//! └──────────────┬───────────────────────────────────────────────┘
//!                │ ResearchBackend (async trait)
//! ┌──────────────▼───────────────────────────────────────────────┐
//! │      HttpResearchBackend: POST /api/chat, GET /api/market     │
//! └──────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Quick Start
//!
//! ```ignore
//! use std::sync::Arc;
//! use research_core::{ChatConfig, HttpResearchBackend, RequestPipeline, render};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = ChatConfig::load(None)?;
//!     let backend = Arc::new(HttpResearchBackend::from_config(&config)?);
//!     let (tx, _rx) = tokio::sync::mpsc::channel(64);
//!     let mut pipeline = RequestPipeline::from_config(backend, &config, tx);
//!
//!     pipeline.send("Analyze BTC").await;
//!     if let Some(payload) = pipeline.timeline().last().and_then(|m| m.research.as_ref()) {
//!         println!("{}", render(payload).market.label);
//!     }
//!     Ok(())
//! }
//! ```
//!
//! # Module Overview
//!
//! - [`payload`]: Research payload model and the parse boundary
//! - [`messages`]: Message ids, conversation turns, notices to surfaces
//! - [`session`]: Session id adoption
//! - [`timeline`]: Append-only conversation log
//! - [`pipeline`]: One-at-a-time request state machine
//! - [`render`]: Payload to display model projection
//! - [`backend`]: Research backend abstraction and HTTP client
//! - [`market`]: Independent price snapshots for side panels
//! - [`config`]: Layered client configuration
//! - [`error`]: Error types
//!
//! # No TUI Dependencies
//!
//! This crate has **zero** dependencies on ratatui, crossterm, or any other
//! UI framework.

#![deny(missing_docs)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod backend;
pub mod config;
pub mod error;
pub mod market;
pub mod messages;
pub mod payload;
pub mod pipeline;
pub mod render;
pub mod session;
pub mod timeline;

// Re-exports for convenience
pub use backend::{HttpResearchBackend, ResearchBackend};
pub use config::{default_config_path, ChatConfig, ConfigError, ConfigOverrides, ConfigSource};
pub use error::{ChatError, SendRejected};
pub use market::{fetch_all, MarketEntry, MarketSnapshot, MarketWatch};
pub use messages::{ChatMessage, ChatNotice, MessageId, MessageRole, SessionId};
pub use payload::{
    parse_chat_response, AgentEvidence, Bias, ChatRequest, ChatResponse, MarketView,
    Recommendation, ResearchPayload, ResearchResponse,
};
pub use pipeline::{
    RequestPipeline, RequestState, SendOutcome, Settlement, FAILURE_MESSAGE, WELCOME_MESSAGE,
};
pub use render::{
    render, AgentCard, BiasClass, Direction, MarketBadge, RecommendationCard, ResearchView,
};
pub use session::{Adoption, ChatSession};
pub use timeline::Timeline;
