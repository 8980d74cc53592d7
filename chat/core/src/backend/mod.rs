//! Research Backend Integration
//!
//! Abstracted access to the research service through a common trait.
//!
//! # Usage
//!
//! ```ignore
//! use research_core::backend::{HttpResearchBackend, ResearchBackend};
//! use research_core::payload::ChatRequest;
//!
//! let backend = HttpResearchBackend::from_config(&config)?;
//! let response = backend.chat(&ChatRequest::new("Analyze BTC", None)).await?;
//! ```

mod http;
mod traits;

pub use http::HttpResearchBackend;
pub use traits::ResearchBackend;
