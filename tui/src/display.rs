//! Display State Types
//!
//! Types that represent what the TUI draws. They are derived from the
//! engine's timeline and notices and carry no business logic.
//!
//! - [`DisplayLine`]: One styled, already-wrapped line of the conversation
//! - [`DisplayState`]: Request state, session and scroll hints for the chrome
//!
//! Research analyses are projected through [`research_core::render`] first;
//! this module only lays the resulting [`ResearchView`] out as lines.

use research_core::{
    render, BiasClass, ChatMessage, ChatNotice, Direction, MessageRole, RequestState,
    ResearchView, SessionId,
};

/// Assistant name shown in the conversation
pub const ASSISTANT_NAME: &str = "Juno";

/// Indent for research sections under an assistant message
const SECTION_INDENT: &str = "  ";

/// Indent for details under a card
const DETAIL_INDENT: &str = "    ";

/// Width of agent confidence bars
const CONFIDENCE_BAR_WIDTH: usize = 10;

/// Semantic colour of a line; the theme maps it to a style
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Tone {
    /// User text
    User,
    /// Assistant text
    Assistant,
    /// Section heading
    Heading,
    /// Failure message
    Error,
    /// Bullish badge
    Bullish,
    /// Bearish badge
    Bearish,
    /// Neutral badge
    Neutral,
    /// Positive score or move
    Positive,
    /// Negative score or move
    Negative,
    /// Secondary text
    Dim,
    /// Spacer
    Blank,
}

impl From<BiasClass> for Tone {
    fn from(class: BiasClass) -> Self {
        match class {
            BiasClass::Bullish => Tone::Bullish,
            BiasClass::Bearish => Tone::Bearish,
            BiasClass::Neutral => Tone::Neutral,
        }
    }
}

impl From<Direction> for Tone {
    fn from(direction: Direction) -> Self {
        match direction {
            Direction::Positive => Tone::Positive,
            Direction::Negative => Tone::Negative,
            Direction::Neutral => Tone::Neutral,
        }
    }
}

/// One wrapped line of output
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DisplayLine {
    /// Text, already wrapped to the target width
    pub text: String,
    /// Colour class
    pub tone: Tone,
}

impl DisplayLine {
    /// Create a line
    pub fn new(text: impl Into<String>, tone: Tone) -> Self {
        Self {
            text: text.into(),
            tone,
        }
    }

    /// An empty spacer line
    pub fn blank() -> Self {
        Self::new(String::new(), Tone::Blank)
    }
}

/// Lay out one message (and its analysis, if any) at `width` columns
pub fn message_lines(message: &ChatMessage, width: usize) -> Vec<DisplayLine> {
    let width = width.max(10);
    let mut lines = Vec::new();

    let (prefix, tone) = match message.role {
        MessageRole::User => ("You: ".to_string(), Tone::User),
        MessageRole::Assistant if message.is_error => (format!("{ASSISTANT_NAME}: "), Tone::Error),
        MessageRole::Assistant => (format!("{ASSISTANT_NAME}: "), Tone::Assistant),
    };
    push_wrapped(
        &mut lines,
        &format!("{prefix}{}", message.content),
        width,
        "",
        tone,
    );

    if let Some(payload) = &message.research {
        lines.extend(research_lines(&render(payload), width));
    }

    lines.push(DisplayLine::blank());
    lines
}

/// Lay out a rendered analysis as indented sections
pub fn research_lines(view: &ResearchView, width: usize) -> Vec<DisplayLine> {
    let mut lines = Vec::new();

    lines.push(DisplayLine::new(
        format!("{SECTION_INDENT}[{}]  {}", view.market.label, view.market.subtitle),
        view.market.class.into(),
    ));

    if !view.agents.is_empty() {
        lines.push(DisplayLine::new(
            format!("{SECTION_INDENT}Agent Analysis"),
            Tone::Heading,
        ));
        for agent in &view.agents {
            lines.push(DisplayLine::new(
                format!(
                    "{SECTION_INDENT}{} {}  {}  confidence {} [{}]",
                    agent.direction.glyph(),
                    agent.agent,
                    agent.score,
                    agent.confidence,
                    agent.confidence_bar(CONFIDENCE_BAR_WIDTH),
                ),
                agent.direction.into(),
            ));
            if let Some(highlights) = &agent.highlights {
                push_wrapped(&mut lines, highlights, width, DETAIL_INDENT, Tone::Dim);
            }
            if let Some(sources) = &agent.sources {
                push_wrapped(
                    &mut lines,
                    &format!("sources: {sources}"),
                    width,
                    DETAIL_INDENT,
                    Tone::Dim,
                );
            }
        }
    }

    push_list(&mut lines, "Key Levels", &view.key_levels, width);
    push_list(&mut lines, "Catalysts", &view.catalysts, width);
    push_list(&mut lines, "Risks", &view.risks, width);

    if let Some(cards) = &view.recommendations {
        let heading = if cards.len() == 1 {
            "Recommendation"
        } else {
            "Recommendations"
        };
        lines.push(DisplayLine::new(
            format!("{SECTION_INDENT}{heading}"),
            Tone::Heading,
        ));
        for card in cards {
            let entry = match &card.kind {
                Some(kind) => format!("Entry ({kind}): {}", card.entry_zone),
                None => format!("Entry: {}", card.entry_zone),
            };
            push_wrapped(&mut lines, &entry, width, SECTION_INDENT, Tone::Assistant);
            lines.push(DisplayLine::new(
                format!(
                    "{SECTION_INDENT}Risk/Reward {}   Probability {}",
                    card.risk_reward, card.probability
                ),
                Tone::Assistant,
            ));

            let details = [
                ("Invalidation", card.invalidation.as_ref()),
                ("Targets", card.targets.as_ref()),
                ("Horizon", card.time_horizon.as_ref()),
                ("Sizing", card.sizing_guidance.as_ref()),
            ];
            for (label, value) in details {
                if let Some(value) = value {
                    push_wrapped(
                        &mut lines,
                        &format!("{label}: {value}"),
                        width,
                        DETAIL_INDENT,
                        Tone::Dim,
                    );
                }
            }
            if let Some(fit) = &card.fit_for_user {
                push_wrapped(&mut lines, fit, width, DETAIL_INDENT, Tone::Dim);
            }
        }
    }

    for disclosure in &view.disclosures {
        push_wrapped(&mut lines, disclosure, width, SECTION_INDENT, Tone::Dim);
    }

    lines
}

fn push_list(lines: &mut Vec<DisplayLine>, heading: &str, items: &[String], width: usize) {
    if items.is_empty() {
        return;
    }
    lines.push(DisplayLine::new(
        format!("{SECTION_INDENT}{heading}"),
        Tone::Heading,
    ));
    for item in items {
        push_wrapped(lines, &format!("- {item}"), width, DETAIL_INDENT, Tone::Dim);
    }
}

fn push_wrapped(lines: &mut Vec<DisplayLine>, text: &str, width: usize, indent: &str, tone: Tone) {
    let options = textwrap::Options::new(width)
        .initial_indent(indent)
        .subsequent_indent(indent);
    for line in textwrap::wrap(text, options) {
        lines.push(DisplayLine::new(line.into_owned(), tone));
    }
}

/// Chrome state for the status bar and scrolling
///
/// Request state and session come straight from the pipeline on every frame
/// (see [`DisplayState::status_text`]). Notices only carry scroll hints here: they are sent
/// best effort, so nothing that must stay accurate depends on them.
#[derive(Clone, Debug, Default)]
pub struct DisplayState {
    /// Result of the startup health check (`None` until known)
    pub backend_healthy: Option<bool>,
    /// One-line notification for the status bar
    pub notification: Option<String>,
    /// A new message arrived and the view should jump to it
    scroll_to_latest: bool,
}

impl DisplayState {
    /// Create empty display state
    pub fn new() -> Self {
        Self::default()
    }

    /// Apply an engine notice
    pub fn apply_notice(&mut self, notice: ChatNotice) {
        match notice {
            ChatNotice::ScrollToLatest { .. } => {
                self.scroll_to_latest = true;
            }
            ChatNotice::StateChanged { .. } | ChatNotice::SessionAdopted { .. } => {}
        }
    }

    /// Record the startup health check
    pub fn set_backend_health(&mut self, healthy: bool) {
        self.backend_healthy = Some(healthy);
        self.notification = if healthy {
            None
        } else {
            Some("Research backend is not reachable".to_string())
        };
    }

    /// Consume the pending scroll hint
    pub fn take_scroll_to_latest(&mut self) -> bool {
        std::mem::take(&mut self.scroll_to_latest)
    }

    /// Left part of the status bar
    pub fn status_text(&self, state: &RequestState, session_id: Option<&SessionId>) -> String {
        let mut status = state.description().to_string();
        if let Some(session_id) = session_id {
            status.push_str(&format!(" | session {}", short_id(&session_id.0)));
        }
        if let Some(note) = &self.notification {
            status.push_str(&format!(" | {note}"));
        }
        status
    }
}

/// First eight characters of an id
fn short_id(id: &str) -> &str {
    match id.char_indices().nth(8) {
        Some((idx, _)) => &id[..idx],
        None => id,
    }
}
