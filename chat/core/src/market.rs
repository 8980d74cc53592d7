//! Market Snapshot
//!
//! Price side-panel data. Fetched on its own schedule and never touches the
//! chat timeline or the request pipeline.

use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

use crate::backend::ResearchBackend;
use crate::error::ChatError;
use crate::render::Direction;

/// Shortest refresh interval the watcher accepts
const MIN_REFRESH: Duration = Duration::from_secs(1);

/// Wire body of `GET /api/market/{symbol}`
#[derive(Clone, Debug, Deserialize)]
pub struct MarketQuote {
    /// Price in USD
    pub usd: f64,
    /// 24h change in percent
    pub usd_24h_change: f64,
    /// Market capitalisation in USD
    #[serde(default)]
    pub usd_market_cap: Option<f64>,
    /// 24h traded volume in USD
    #[serde(default)]
    pub usd_24h_vol: Option<f64>,
}

/// Price snapshot for one symbol
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MarketSnapshot {
    /// Symbol as requested (e.g. "BTC")
    pub symbol: String,
    /// Price in USD
    pub usd: f64,
    /// 24h change in percent
    pub usd_24h_change: f64,
    /// Market capitalisation in USD
    pub usd_market_cap: Option<f64>,
    /// 24h traded volume in USD
    pub usd_24h_vol: Option<f64>,
}

impl MarketSnapshot {
    /// Build from a wire quote, rejecting non-finite numbers
    pub fn from_quote(symbol: &str, quote: MarketQuote) -> Result<Self, ChatError> {
        if !quote.usd.is_finite() || !quote.usd_24h_change.is_finite() {
            return Err(ChatError::MalformedResponse(format!(
                "non-finite market data for {symbol}"
            )));
        }
        Ok(Self {
            symbol: symbol.to_string(),
            usd: quote.usd,
            usd_24h_change: quote.usd_24h_change,
            usd_market_cap: quote.usd_market_cap,
            usd_24h_vol: quote.usd_24h_vol,
        })
    }

    /// Price text, e.g. `$64250.12` (sub-dollar prices get four decimals)
    #[must_use]
    pub fn price_text(&self) -> String {
        if self.usd.abs() < 1.0 {
            format!("${:.4}", self.usd)
        } else {
            format!("${:.2}", self.usd)
        }
    }

    /// Signed change text, e.g. `+2.35%`
    #[must_use]
    pub fn change_text(&self) -> String {
        format!("{:+.2}%", self.usd_24h_change)
    }

    /// Direction of the 24h move
    #[must_use]
    pub fn trend(&self) -> Direction {
        Direction::of(self.usd_24h_change)
    }
}

/// One row of the side panel
#[derive(Clone, Debug, PartialEq)]
pub struct MarketEntry {
    /// Requested symbol
    pub symbol: String,
    /// Snapshot, or why it is unavailable
    pub snapshot: Result<MarketSnapshot, ChatError>,
}

/// Fetch snapshots for every symbol, in order
pub async fn fetch_all<B: ResearchBackend + ?Sized>(
    backend: &B,
    symbols: &[String],
) -> Vec<MarketEntry> {
    let mut entries = Vec::with_capacity(symbols.len());
    for symbol in symbols {
        let snapshot = backend.market(symbol).await;
        if let Err(ref e) = snapshot {
            tracing::debug!(symbol = %symbol, error = %e, "Market snapshot unavailable");
        }
        entries.push(MarketEntry {
            symbol: symbol.clone(),
            snapshot,
        });
    }
    entries
}

/// Background refresher for the market panel
///
/// Runs on its own task and publishes the latest rows on a watch channel.
/// Dropping the watcher stops the task.
pub struct MarketWatch {
    rx: watch::Receiver<Vec<MarketEntry>>,
    handle: JoinHandle<()>,
}

impl MarketWatch {
    /// Start refreshing `symbols` every `every`
    pub fn spawn<B: ResearchBackend + 'static>(
        backend: Arc<B>,
        symbols: Vec<String>,
        every: Duration,
    ) -> Self {
        let (tx, rx) = watch::channel(Vec::new());
        let every = every.max(MIN_REFRESH);

        let handle = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(every);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                ticker.tick().await;
                let entries = fetch_all(backend.as_ref(), &symbols).await;
                if tx.send(entries).is_err() {
                    break;
                }
            }
        });

        Self { rx, handle }
    }

    /// Latest published rows (empty until the first fetch completes)
    pub fn latest(&self) -> Vec<MarketEntry> {
        self.rx.borrow().clone()
    }

    /// Wait until a new set of rows is published
    pub async fn changed(&mut self) -> bool {
        self.rx.changed().await.is_ok()
    }
}

impl Drop for MarketWatch {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn snapshot(usd: f64, change: f64) -> MarketSnapshot {
        MarketSnapshot {
            symbol: "BTC".to_string(),
            usd,
            usd_24h_change: change,
            usd_market_cap: None,
            usd_24h_vol: None,
        }
    }

    #[test]
    fn test_quote_requires_price_fields() {
        assert!(serde_json::from_str::<MarketQuote>("{}").is_err());
        let quote: MarketQuote =
            serde_json::from_str(r#"{"usd": 64000.5, "usd_24h_change": -1.25}"#).unwrap();
        let snap = MarketSnapshot::from_quote("BTC", quote).unwrap();
        assert_eq!(snap.symbol, "BTC");
        assert!(snap.usd_market_cap.is_none());
    }

    #[test]
    fn test_price_and_change_text() {
        assert_eq!(snapshot(64000.5, 2.5).price_text(), "$64000.50");
        assert_eq!(snapshot(0.5123, 0.0).price_text(), "$0.5123");
        assert_eq!(snapshot(1.0, 2.5).change_text(), "+2.50%");
        assert_eq!(snapshot(1.0, -1.2).change_text(), "-1.20%");
    }

    #[test]
    fn test_trend_follows_change_sign() {
        assert_eq!(snapshot(1.0, 3.0).trend(), Direction::Positive);
        assert_eq!(snapshot(1.0, -3.0).trend(), Direction::Negative);
        assert_eq!(snapshot(1.0, 0.0).trend(), Direction::Neutral);
    }
}
