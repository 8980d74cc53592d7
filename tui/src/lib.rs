//! Research TUI - Terminal interface for the crypto research assistant
//!
//! A full-screen chat where each assistant answer can carry a structured
//! multi-agent analysis, laid out as badges, agent cards and recommendations.
//!
//! # Architecture
//!
//! - **App**: Event loop, input handling and frame rendering
//! - **ChatClient**: Embeds the `research-core` request pipeline
//! - **Display**: Turns timeline messages into wrapped, toned lines
//! - **MarketPanel**: Live price side panel
//! - **Theme**: Palette and tone styles

pub mod app;
pub mod chat_client;
pub mod display;
pub mod market_panel;
pub mod theme;

pub use app::App;
pub use chat_client::ChatClient;
