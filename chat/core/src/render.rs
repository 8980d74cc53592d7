//! Result Renderer
//!
//! Pure projection of a [`ResearchPayload`] into display primitives: badges,
//! bars, signed numbers and optional sections. Surfaces turn a
//! [`ResearchView`] into pixels or terminal cells; they never look at the raw
//! payload.
//!
//! The projection cannot fail. Empty optional data simply drops the matching
//! section, and an unknown bias string falls back to the neutral class.

use crate::payload::{AgentEvidence, Bias, MarketView, Recommendation, ResearchPayload};

/// Filled cell of a bar
const BAR_FILLED: char = '█';
/// Empty cell of a bar
const BAR_EMPTY: char = '░';

/// Visual class of the bias badge
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum BiasClass {
    /// Bullish badge
    Bullish,
    /// Bearish badge
    Bearish,
    /// Neutral badge, also used for unrecognised stances
    #[default]
    Neutral,
}

impl From<&Bias> for BiasClass {
    fn from(bias: &Bias) -> Self {
        match bias {
            Bias::Bullish => Self::Bullish,
            Bias::Bearish => Self::Bearish,
            Bias::Neutral | Bias::Other(_) => Self::Neutral,
        }
    }
}

/// Sign of a score or price move
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Direction {
    /// Greater than zero
    Positive,
    /// Less than zero
    Negative,
    /// Exactly zero (or NaN)
    Neutral,
}

impl Direction {
    /// Classify `value` by sign
    #[must_use]
    pub fn of(value: f64) -> Self {
        if value > 0.0 {
            Self::Positive
        } else if value < 0.0 {
            Self::Negative
        } else {
            Self::Neutral
        }
    }

    /// Terminal glyph for the indicator
    #[must_use]
    pub fn glyph(&self) -> &'static str {
        match self {
            Self::Positive => "▲",
            Self::Negative => "▼",
            Self::Neutral => "•",
        }
    }
}

/// Market view badge
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MarketBadge {
    /// Badge text, e.g. `bullish 83%`
    pub label: String,
    /// Badge colour class
    pub class: BiasClass,
    /// Conviction, e.g. `83%`
    pub conviction: String,
    /// `{asset} • {timeframe}`
    pub subtitle: String,
}

/// One agent evidence card
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AgentCard {
    /// Agent name
    pub agent: String,
    /// Score with sign and one decimal, e.g. `+0.8`
    pub score: String,
    /// Sign indicator
    pub direction: Direction,
    /// Confidence, e.g. `85%`
    pub confidence: String,
    /// Raw confidence (0-100) for bars
    pub confidence_value: u8,
    /// Joined highlights, omitted when there are none
    pub highlights: Option<String>,
    /// Joined sources, omitted when there are none
    pub sources: Option<String>,
}

impl AgentCard {
    /// Confidence as a fixed-width bar
    #[must_use]
    pub fn confidence_bar(&self, width: usize) -> String {
        percent_bar(self.confidence_value, width)
    }
}

/// One recommendation card
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RecommendationCard {
    /// Idea kind, if given
    pub kind: Option<String>,
    /// Entry zone text
    pub entry_zone: String,
    /// Risk/reward, e.g. `2:1`
    pub risk_reward: String,
    /// Win probability as a whole percent, e.g. `62%`
    pub probability: String,
    /// Why it fits the user, omitted when blank
    pub fit_for_user: Option<String>,
    /// Invalidation level, if given
    pub invalidation: Option<String>,
    /// Joined targets, omitted when there are none
    pub targets: Option<String>,
    /// Holding horizon, if given
    pub time_horizon: Option<String>,
    /// Sizing hint, if given
    pub sizing_guidance: Option<String>,
}

/// Display model for one research payload
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ResearchView {
    /// Market badge
    pub market: MarketBadge,
    /// Agent cards in backend order
    pub agents: Vec<AgentCard>,
    /// Recommendation cards; `None` when the payload has none
    pub recommendations: Option<Vec<RecommendationCard>>,
    /// Key levels as `name: a, b` lines
    pub key_levels: Vec<String>,
    /// Catalysts, empty when absent
    pub catalysts: Vec<String>,
    /// Risks, empty when absent
    pub risks: Vec<String>,
    /// Disclosures, empty when absent
    pub disclosures: Vec<String>,
}

/// Project a payload into its display model
#[must_use]
pub fn render(payload: &ResearchPayload) -> ResearchView {
    let recommendations = if payload.recommendations.is_empty() {
        None
    } else {
        Some(
            payload
                .recommendations
                .iter()
                .map(recommendation_card)
                .collect(),
        )
    };

    ResearchView {
        market: market_badge(&payload.market_view),
        agents: payload.agent_evidence.iter().map(agent_card).collect(),
        recommendations,
        key_levels: key_level_lines(&payload.market_view),
        catalysts: payload.market_view.catalysts.clone(),
        risks: payload.market_view.risks.clone(),
        disclosures: payload.disclosures.clone(),
    }
}

fn market_badge(view: &MarketView) -> MarketBadge {
    let conviction = format_percent(view.conviction);
    MarketBadge {
        label: format!("{} {}", view.bias, conviction),
        class: BiasClass::from(&view.bias),
        conviction,
        subtitle: format!("{} • {}", view.asset, view.timeframe),
    }
}

fn agent_card(evidence: &AgentEvidence) -> AgentCard {
    AgentCard {
        agent: evidence.agent.clone(),
        score: format_score(evidence.score),
        direction: Direction::of(evidence.score),
        confidence: format_percent(evidence.confidence),
        confidence_value: evidence.confidence,
        highlights: join_non_empty(&evidence.highlights, "; "),
        sources: join_non_empty(&evidence.sources, ", "),
    }
}

fn recommendation_card(rec: &Recommendation) -> RecommendationCard {
    RecommendationCard {
        kind: rec.kind.clone(),
        entry_zone: rec.entry_zone.clone(),
        risk_reward: format!("{}:1", rec.risk_reward),
        probability: format_probability(rec.probability_win),
        fit_for_user: Some(rec.fit_for_user.trim())
            .filter(|s| !s.is_empty())
            .map(str::to_string),
        invalidation: rec.invalidation.clone(),
        targets: join_non_empty(&rec.targets, ", "),
        time_horizon: rec.time_horizon.clone(),
        sizing_guidance: rec.sizing_guidance.clone(),
    }
}

fn key_level_lines(view: &MarketView) -> Vec<String> {
    view.key_levels
        .iter()
        .filter(|(_, levels)| !levels.is_empty())
        .map(|(name, levels)| {
            let joined = levels
                .iter()
                .map(|level| level.to_string())
                .collect::<Vec<_>>()
                .join(", ");
            format!("{name}: {joined}")
        })
        .collect()
}

fn join_non_empty(items: &[String], separator: &str) -> Option<String> {
    if items.is_empty() {
        None
    } else {
        Some(items.join(separator))
    }
}

/// Score with one decimal and a leading `+` when non-negative
#[must_use]
pub fn format_score(score: f64) -> String {
    if score >= 0.0 {
        // abs() drops the sign of -0.0
        format!("+{:.1}", score.abs())
    } else {
        format!("{score:.1}")
    }
}

/// Integer percentage, as received
#[must_use]
pub fn format_percent(value: u8) -> String {
    format!("{value}%")
}

/// Probability in `[0, 1]` as a rounded whole percent
#[must_use]
pub fn format_probability(probability: f64) -> String {
    format!("{}%", (probability * 100.0).round() as i64)
}

/// Fixed-width bar for a 0-100 value
#[must_use]
pub fn percent_bar(value: u8, width: usize) -> String {
    let filled = (usize::from(value.min(100)) * width + 50) / 100;
    let filled = filled.min(width);
    let mut bar = String::with_capacity(width * 3);
    bar.extend(std::iter::repeat(BAR_FILLED).take(filled));
    bar.extend(std::iter::repeat(BAR_EMPTY).take(width - filled));
    bar
}
