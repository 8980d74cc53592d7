//! Market Panel
//!
//! Side panel with live prices for a few symbols. Refreshes on its own task
//! through [`MarketWatch`], so a slow price feed never holds up the chat.

use std::sync::Arc;
use std::time::Duration;

use research_core::{MarketEntry, MarketWatch, ResearchBackend};

use crate::display::{DisplayLine, Tone};

/// Panel width in columns
pub const PANEL_WIDTH: u16 = 30;

/// Price side panel
pub struct MarketPanel {
    watch: Option<MarketWatch>,
    symbols: Vec<String>,
    entries: Vec<MarketEntry>,
}

impl MarketPanel {
    /// Start watching `symbols`; an empty list disables the panel
    pub fn spawn<B: ResearchBackend + 'static>(
        backend: Arc<B>,
        symbols: Vec<String>,
        every: Duration,
    ) -> Self {
        let watch = if symbols.is_empty() {
            None
        } else {
            Some(MarketWatch::spawn(backend, symbols.clone(), every))
        };
        Self {
            watch,
            symbols,
            entries: Vec::new(),
        }
    }

    /// Whether the panel has anything to show
    pub fn is_enabled(&self) -> bool {
        self.watch.is_some()
    }

    /// Pull the latest rows from the watcher
    pub fn refresh(&mut self) {
        if let Some(watch) = &self.watch {
            self.entries = watch.latest();
        }
    }

    /// Replace the rows directly
    pub fn set_entries(&mut self, entries: Vec<MarketEntry>) {
        self.entries = entries;
    }

    /// Panel content as styled lines
    pub fn lines(&self) -> Vec<DisplayLine> {
        let mut lines = vec![DisplayLine::new("Markets", Tone::Heading)];

        if self.entries.is_empty() {
            for symbol in &self.symbols {
                lines.push(DisplayLine::new(format!("{symbol:<5} loading..."), Tone::Dim));
            }
            return lines;
        }

        for entry in &self.entries {
            lines.push(entry_line(entry));
        }
        lines
    }
}

fn entry_line(entry: &MarketEntry) -> DisplayLine {
    match &entry.snapshot {
        Ok(snapshot) => DisplayLine::new(
            format!(
                "{:<5} {:>12} {} {}",
                entry.symbol,
                snapshot.price_text(),
                snapshot.trend().glyph(),
                snapshot.change_text()
            ),
            snapshot.trend().into(),
        ),
        Err(_) => DisplayLine::new(format!("{:<5} unavailable", entry.symbol), Tone::Dim),
    }
}
