//! Main Application
//!
//! The App struct manages the TUI lifecycle as a thin display client:
//! - Event loop (keyboard, mouse, resize)
//! - ChatClient for the request pipeline
//! - DisplayState and MarketPanel for rendering
//!
//! Each frame the app settles finished requests, drains engine notices,
//! then redraws the conversation from the timeline.

use std::io;
use std::sync::Arc;
use std::time::Duration;

use crossterm::event::{
    self, Event, EventStream, KeyCode, KeyEventKind, KeyModifiers, MouseEventKind,
};
use futures::StreamExt;
use ratatui::backend::CrosstermBackend;
use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::style::Style;
use ratatui::Terminal;
use tokio::time::MissedTickBehavior;

use research_core::{ChatConfig, ResearchBackend, SendRejected};

use crate::chat_client::ChatClient;
use crate::display::{message_lines, DisplayLine, DisplayState, Tone, ASSISTANT_NAME};
use crate::market_panel::{MarketPanel, PANEL_WIDTH};
use crate::theme::{self, DIM_GRAY, PENDING_AMBER};

/// Input box height (lines) for text wrapping
const INPUT_HEIGHT: u16 = 4;

/// Narrowest terminal that still gets the market panel
const MIN_WIDTH_FOR_PANEL: u16 = 80;

/// Lines scrolled per mouse wheel step
const WHEEL_STEP: usize = 3;

/// Main application state
pub struct App<B: ResearchBackend + 'static> {
    // === Core State ===
    /// Is the app still running?
    running: bool,

    // === Engine Integration ===
    /// Client for the embedded request pipeline
    client: ChatClient<B>,
    /// Scroll hints and health notification
    display: DisplayState,
    /// Price side panel
    market: MarketPanel,

    // === Input State ===
    /// User input buffer
    input_buffer: String,
    /// Scroll offset (lines from bottom, 0 = latest)
    scroll_offset: usize,
    /// Total rendered lines (for scroll bounds)
    total_lines: usize,

    /// Terminal size
    size: (u16, u16),
}

impl<B: ResearchBackend + 'static> App<B> {
    /// Create a new App for a terminal of `size`
    pub fn new(backend: Arc<B>, config: &ChatConfig, size: (u16, u16)) -> Self {
        let market = MarketPanel::spawn(
            Arc::clone(&backend),
            config.market_symbols.clone(),
            config.market_refresh,
        );
        Self {
            running: true,
            client: ChatClient::new(backend, config),
            display: DisplayState::new(),
            market,
            input_buffer: String::new(),
            scroll_offset: 0,
            total_lines: 0,
            size,
        }
    }

    /// Main event loop
    pub async fn run(
        &mut self,
        terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    ) -> anyhow::Result<()> {
        // ~10 FPS is plenty for a chat surface
        let mut frame_tick = tokio::time::interval(Duration::from_millis(100));
        frame_tick.set_missed_tick_behavior(MissedTickBehavior::Skip);

        // Async event stream for non-blocking terminal events
        let mut event_stream = EventStream::new();

        self.client.greet();
        let mut health = self.client.spawn_health_check();
        let mut health_pending = true;

        // Render initial frame immediately so user sees UI
        self.process_notices();
        self.render(terminal)?;

        while self.running {
            tokio::select! {
                biased;

                // Terminal events first
                maybe_event = event_stream.next() => {
                    match maybe_event {
                        Some(Ok(Event::Key(key))) if key.kind == KeyEventKind::Press => {
                            self.handle_key(key);
                        }
                        Some(Ok(Event::Mouse(mouse))) => self.handle_mouse(mouse),
                        Some(Ok(Event::Resize(w, h))) => self.handle_resize(w, h),
                        Some(Ok(_)) => {}
                        Some(Err(e)) => {
                            tracing::warn!(error = %e, "Terminal event error");
                        }
                        None => self.running = false,
                    }
                }

                joined = &mut health, if health_pending => {
                    health_pending = false;
                    self.display.set_backend_health(joined.unwrap_or(false));
                }

                _ = frame_tick.tick() => {}
            }

            self.client.poll().await;
            self.process_notices();
            self.market.refresh();
            self.render(terminal)?;
        }

        if health_pending {
            health.abort();
        }
        Ok(())
    }

    /// Apply all pending notices from the engine
    fn process_notices(&mut self) {
        for notice in self.client.recv_all() {
            self.display.apply_notice(notice);
        }
        if self.display.take_scroll_to_latest() {
            self.scroll_offset = 0;
        }
    }

    /// Handle keyboard input
    fn handle_key(&mut self, key: event::KeyEvent) {
        match key.code {
            // Quit
            KeyCode::Esc => self.running = false,
            KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                self.running = false;
            }

            // Submit message
            KeyCode::Enter => self.submit_input(),

            // Conversation scrolling
            KeyCode::PageUp => {
                let page = self.page_size();
                self.scroll_up(page);
            }
            KeyCode::PageDown => {
                let page = self.page_size();
                self.scroll_offset = self.scroll_offset.saturating_sub(page);
            }
            KeyCode::Home if key.modifiers.contains(KeyModifiers::CONTROL) => {
                self.scroll_offset = self.total_lines.saturating_sub(1);
            }
            KeyCode::End if key.modifiers.contains(KeyModifiers::CONTROL) => {
                self.scroll_offset = 0;
            }

            // Typing
            KeyCode::Char(c) if !key.modifiers.contains(KeyModifiers::CONTROL) => {
                self.input_buffer.push(c);
            }
            KeyCode::Backspace => {
                self.input_buffer.pop();
            }

            _ => {}
        }
    }

    /// Send the input buffer; kept as-is while a request is pending
    fn submit_input(&mut self) {
        match self.client.send_message(&self.input_buffer) {
            Ok(_) => {
                self.input_buffer.clear();
                self.scroll_offset = 0;
            }
            Err(SendRejected::EmptyInput) => self.input_buffer.clear(),
            Err(SendRejected::Busy) => {}
        }
    }

    /// Handle mouse input
    fn handle_mouse(&mut self, mouse: event::MouseEvent) {
        match mouse.kind {
            MouseEventKind::ScrollUp => self.scroll_up(WHEEL_STEP),
            MouseEventKind::ScrollDown => {
                self.scroll_offset = self.scroll_offset.saturating_sub(WHEEL_STEP);
            }
            _ => {}
        }
    }

    /// Handle terminal resize
    fn handle_resize(&mut self, width: u16, height: u16) {
        self.size = (width, height);
    }

    fn scroll_up(&mut self, lines: usize) {
        let max_scroll = self.total_lines.saturating_sub(1);
        self.scroll_offset = (self.scroll_offset + lines).min(max_scroll);
    }

    fn page_size(&self) -> usize {
        usize::from(self.size.1.saturating_sub(INPUT_HEIGHT + 1) / 2).max(1)
    }

    /// Screen regions: conversation, market panel, input, status
    fn layout(&self) -> (Rect, Option<Rect>, Rect, Rect) {
        let (width, height) = self.size;
        let body_height = height.saturating_sub(INPUT_HEIGHT + 1);

        let show_panel = self.market.is_enabled() && width >= MIN_WIDTH_FOR_PANEL;
        let conversation_width = if show_panel {
            width.saturating_sub(PANEL_WIDTH + 1)
        } else {
            width
        };

        let conversation = Rect::new(0, 0, conversation_width, body_height);
        let panel = show_panel
            .then(|| Rect::new(width.saturating_sub(PANEL_WIDTH), 0, PANEL_WIDTH, body_height));
        let input = Rect::new(0, body_height, width, INPUT_HEIGHT);
        let status = Rect::new(0, height.saturating_sub(1), width, 1);
        (conversation, panel, input, status)
    }

    /// Every conversation line at `width`, plus the pending indicator
    fn conversation_lines(&self, width: usize) -> Vec<DisplayLine> {
        let mut lines: Vec<DisplayLine> = self
            .client
            .timeline()
            .all()
            .iter()
            .flat_map(|message| message_lines(message, width))
            .collect();

        if self.client.is_pending() {
            lines.push(DisplayLine::new(
                format!("{ASSISTANT_NAME}: Analyzing with multi-agent system..."),
                Tone::Dim,
            ));
        }
        lines
    }

    /// Render the UI
    fn render(
        &mut self,
        terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    ) -> anyhow::Result<()> {
        let (conversation, panel, input, status) = self.layout();

        let lines = self.conversation_lines(usize::from(conversation.width.saturating_sub(1)));
        self.total_lines = lines.len();
        let max_scroll = self.total_lines.saturating_sub(usize::from(conversation.height));
        self.scroll_offset = self.scroll_offset.min(max_scroll);

        let market_lines = self.market.lines();
        let input_text = format!("You: {}_", self.input_buffer);
        let status_text = self.status_line();
        let scroll_offset = self.scroll_offset;
        let pending = self.client.is_pending();

        terminal.draw(|frame| {
            let buf = frame.buffer_mut();
            draw_conversation(buf, conversation, &lines, scroll_offset);
            if let Some(panel) = panel {
                draw_lines(buf, panel, &market_lines);
            }
            draw_input(buf, input, &input_text, pending);
            let status_style = if pending {
                Style::default().fg(PENDING_AMBER)
            } else {
                Style::default().fg(DIM_GRAY)
            };
            buf.set_stringn(
                status.x,
                status.y,
                &status_text,
                usize::from(status.width),
                status_style,
            );
        })?;

        Ok(())
    }

    /// Status bar text
    fn status_line(&self) -> String {
        let scroll_info = if self.scroll_offset > 0 {
            format!(" [^{} lines - PgDn to scroll]", self.scroll_offset)
        } else {
            String::new()
        };
        format!(
            " {} | Esc to quit | PgUp/PgDn scroll{}",
            self.display
                .status_text(self.client.state(), self.client.session().session_id()),
            scroll_info
        )
    }
}

/// Draw the visible window of `lines`, `scroll_offset` lines up from the bottom
fn draw_conversation(buf: &mut Buffer, area: Rect, lines: &[DisplayLine], scroll_offset: usize) {
    let height = usize::from(area.height);
    let visible_end = lines.len().saturating_sub(scroll_offset);
    let visible_start = visible_end.saturating_sub(height);
    draw_lines(buf, area, &lines[visible_start..visible_end]);
}

/// Draw lines top-down, clipped to `area`
fn draw_lines(buf: &mut Buffer, area: Rect, lines: &[DisplayLine]) {
    for (i, line) in lines.iter().take(usize::from(area.height)).enumerate() {
        let y = area.y + u16::try_from(i).unwrap_or(u16::MAX);
        buf.set_stringn(
            area.x,
            y,
            &line.text,
            usize::from(area.width),
            theme::style_for(line.tone),
        );
    }
}

/// Draw the separator and the wrapped input, showing its last lines
fn draw_input(buf: &mut Buffer, area: Rect, input_text: &str, pending: bool) {
    if area.height < 2 || area.width < 5 {
        return;
    }

    let separator = "-".repeat(usize::from(area.width));
    buf.set_string(area.x, area.y, &separator, Style::default().fg(DIM_GRAY));

    let text_height = usize::from(area.height - 1);
    let wrapped = textwrap::wrap(input_text, usize::from(area.width.saturating_sub(1)));
    let skip = wrapped.len().saturating_sub(text_height);
    let tone = if pending { Tone::Dim } else { Tone::User };

    for (i, line) in wrapped.iter().skip(skip).enumerate() {
        let y = area.y + 1 + u16::try_from(i).unwrap_or(u16::MAX);
        buf.set_string(area.x, y, line, theme::style_for(tone));
    }
}
