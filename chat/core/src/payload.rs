//! Research Payload Model
//!
//! Typed representation of the research backend's analysis response and the
//! chat wire format that carries it.
//!
//! # Parse Boundary
//!
//! Everything the backend sends goes through [`parse_chat_response`], which
//! deserializes into fixed-shape records and then checks value invariants
//! (percentages in range, probabilities in `[0, 1]`, finite numbers). Any
//! violation becomes [`ChatError::MalformedResponse`]; nothing half-parsed
//! ever reaches the timeline.
//!
//! Optional sections (`recommendations`, `disclosures`, highlights, key
//! levels, ...) default to empty when absent. An empty section is valid data,
//! not an error.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::ChatError;
use crate::messages::SessionId;

/// Directional market stance
///
/// Unknown stance strings are kept verbatim in [`Bias::Other`] so the
/// renderer can still show them; they are never a parse error.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Bias {
    /// Upward stance
    Bullish,
    /// Downward stance
    Bearish,
    /// No clear direction
    Neutral,
    /// Anything else the backend sent
    Other(String),
}

impl Bias {
    /// Wire representation
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::Bullish => "bullish",
            Self::Bearish => "bearish",
            Self::Neutral => "neutral",
            Self::Other(raw) => raw,
        }
    }
}

impl From<String> for Bias {
    fn from(raw: String) -> Self {
        match raw.as_str() {
            "bullish" => Self::Bullish,
            "bearish" => Self::Bearish,
            "neutral" => Self::Neutral,
            _ => Self::Other(raw),
        }
    }
}

impl From<Bias> for String {
    fn from(bias: Bias) -> Self {
        match bias {
            Bias::Other(raw) => raw,
            known => known.as_str().to_string(),
        }
    }
}

impl fmt::Display for Bias {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Overall market view for one asset
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MarketView {
    /// Asset symbol (e.g. "BTC")
    pub asset: String,
    /// Analysis timeframe (e.g. "4h", "1d")
    pub timeframe: String,
    /// Directional stance
    pub bias: Bias,
    /// Certainty of the overall view (0-100)
    pub conviction: u8,
    /// Named price levels, e.g. "support" / "resistance"
    #[serde(default)]
    pub key_levels: BTreeMap<String, Vec<f64>>,
    /// Expected drivers
    #[serde(default)]
    pub catalysts: Vec<String>,
    /// Known risks
    #[serde(default)]
    pub risks: Vec<String>,
}

/// One agent's contribution to the analysis
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AgentEvidence {
    /// Agent name (e.g. "Sentiment")
    pub agent: String,
    /// Signed score; positive leans bullish
    pub score: f64,
    /// Certainty of the score (0-100)
    pub confidence: u8,
    /// Short supporting notes
    #[serde(default)]
    pub highlights: Vec<String>,
    /// Data sources the agent used
    #[serde(default)]
    pub sources: Vec<String>,
}

/// An actionable idea derived from the analysis
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Recommendation {
    /// Idea kind: idea, hedge, rebalance, alert
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    /// Where to enter
    pub entry_zone: String,
    /// Reward per unit of risk ("R:1")
    #[serde(rename = "r_r", alias = "risk_reward")]
    pub risk_reward: f64,
    /// Estimated probability of a win, in `[0, 1]`
    pub probability_win: f64,
    /// Why this suits the user
    #[serde(default)]
    pub fit_for_user: String,
    /// Level that invalidates the idea
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub invalidation: Option<String>,
    /// Profit targets
    #[serde(default)]
    pub targets: Vec<String>,
    /// Holding horizon
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time_horizon: Option<String>,
    /// Position sizing hint
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sizing_guidance: Option<String>,
}

/// Structured multi-agent analysis attached to an assistant turn
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ResearchPayload {
    /// Overall view
    pub market_view: MarketView,
    /// Per-agent evidence, in backend order
    #[serde(default)]
    pub agent_evidence: Vec<AgentEvidence>,
    /// Recommendations, in backend order (may be empty)
    #[serde(default)]
    pub recommendations: Vec<Recommendation>,
    /// Legal/risk disclosures
    #[serde(default)]
    pub disclosures: Vec<String>,
}

impl ResearchPayload {
    /// Check value invariants that serde's types cannot express
    pub fn validate(&self) -> Result<(), ChatError> {
        check_percent("market_view.conviction", self.market_view.conviction)?;

        for (i, evidence) in self.agent_evidence.iter().enumerate() {
            check_percent(&format!("agent_evidence[{i}].confidence"), evidence.confidence)?;
            if !evidence.score.is_finite() {
                return Err(malformed(format!("agent_evidence[{i}].score is not finite")));
            }
        }

        for (i, rec) in self.recommendations.iter().enumerate() {
            if !(0.0..=1.0).contains(&rec.probability_win) {
                return Err(malformed(format!(
                    "recommendations[{i}].probability_win {} outside [0, 1]",
                    rec.probability_win
                )));
            }
            if !rec.risk_reward.is_finite() {
                return Err(malformed(format!("recommendations[{i}].r_r is not finite")));
            }
        }

        Ok(())
    }
}

fn check_percent(field: &str, value: u8) -> Result<(), ChatError> {
    if value > 100 {
        return Err(malformed(format!("{field} {value} outside [0, 100]")));
    }
    Ok(())
}

fn malformed(reason: String) -> ChatError {
    ChatError::MalformedResponse(reason)
}

/// Analysis plus the display summary, as carried in the chat response
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ResearchResponse {
    /// Human-readable summary used as the assistant message text
    pub summary: String,
    /// The structured analysis
    #[serde(flatten)]
    pub payload: ResearchPayload,
}

/// Body of `POST /api/chat`
#[derive(Clone, Debug, Serialize)]
pub struct ChatRequest {
    /// What the user typed
    pub message: String,
    /// Current session id, `null` before one is adopted
    pub session_id: Option<String>,
}

impl ChatRequest {
    /// Build a request for the given text and session
    pub fn new(message: impl Into<String>, session_id: Option<&SessionId>) -> Self {
        Self {
            message: message.into(),
            session_id: session_id.map(|id| id.0.clone()),
        }
    }
}

/// Response of `POST /api/chat`
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ChatResponse {
    /// Session id issued (or echoed) by the backend
    pub session_id: String,
    /// The analysis with its summary
    pub response: ResearchResponse,
}

impl ChatResponse {
    /// Split into session id, summary text and payload
    #[must_use]
    pub fn into_parts(self) -> (SessionId, String, ResearchPayload) {
        (
            SessionId(self.session_id),
            self.response.summary,
            self.response.payload,
        )
    }
}

/// Parse and validate a chat response body
pub fn parse_chat_response(body: &str) -> Result<ChatResponse, ChatError> {
    let response: ChatResponse = serde_json::from_str(body)?;
    if response.session_id.trim().is_empty() {
        return Err(malformed("session_id is empty".to_string()));
    }
    response.response.payload.validate()?;
    Ok(response)
}
