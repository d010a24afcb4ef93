//! Main Application
//!
//! The App struct manages the TUI lifecycle as a thin display client:
//! - Event loop (keyboard, resize)
//! - ConductorClient for orchestration
//! - DisplayState for rendering
//!
//! The App:
//! 1. Converts terminal events and slash commands to SurfaceEvents
//! 2. Sends events to the embedded Conductor via ConductorClient
//! 3. Receives ConductorMessages and updates DisplayState
//! 4. Renders based on DisplayState

use std::io;
use std::path::PathBuf;
use std::time::Duration;

use crossterm::event::{self, Event, EventStream, KeyCode, KeyEventKind, KeyModifiers};
use futures::StreamExt;
use ratatui::backend::CrosstermBackend;
use ratatui::buffer::Buffer;
use ratatui::layout::{Constraint, Layout, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::Terminal;
use unicode_width::UnicodeWidthStr;

use docchat_core::{
    ClientConfig, ConductorMessage, FileFilter, Mode, NotifyLevel, ProcessingStatus, Strings,
};

use crate::commands::{self, Command, HELP};
use crate::conductor_client::ConductorClient;
use crate::display::{DisplayRole, DisplayState};
use crate::theme::{
    ACCENT_MAGENTA, ASSISTANT_BLUE, DIM_GRAY, ERROR_RED, FADE_DARK, FADE_LIGHT, SUCCESS_GREEN,
    USER_GREEN, WARNING_YELLOW,
};

/// Input box height (separator plus wrapped text)
const INPUT_HEIGHT: u16 = 4;

/// Idle frame interval
const FRAME_DURATION: Duration = Duration::from_millis(50);

/// Main application state
pub struct App {
    // === Core State ===
    /// Is the app still running?
    running: bool,

    // === Conductor Integration ===
    /// Client for communicating with the embedded Conductor
    conductor: ConductorClient,
    /// Display state derived from ConductorMessages
    display: DisplayState,
    /// User-facing strings
    strings: Strings,
    /// Which files `/upload` and `/file` accept
    filter: FileFilter,

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

impl App {
    /// Create a new App instance
    pub fn new(config: &ClientConfig) -> anyhow::Result<Self> {
        let size = crossterm::terminal::size()?;

        Ok(Self {
            running: true,
            conductor: ConductorClient::new(config)?,
            display: DisplayState::new(),
            strings: Strings::new(config.locale),
            filter: config.file_filter(),
            input_buffer: String::new(),
            scroll_offset: 0,
            total_lines: 0,
            size,
        })
    }

    /// Main event loop
    pub async fn run(
        &mut self,
        terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    ) -> anyhow::Result<()> {
        // Create async event stream for non-blocking terminal events
        let mut event_stream = EventStream::new();

        // Render initial frame immediately so user sees UI
        self.conductor.connect().await?;
        self.process_conductor_messages();
        self.render(terminal)?;

        // The health check runs in the background; a warning arrives
        // through poll_completions like any other result
        if let Err(e) = self.conductor.start().await {
            tracing::warn!("Conductor start error: {}", e);
        }

        while self.running {
            tokio::select! {
                biased;

                // Check for terminal events - highest priority
                maybe_event = event_stream.next() => match maybe_event {
                    // Only handle Press events (not Release or Repeat)
                    Some(Ok(Event::Key(key))) if key.kind == KeyEventKind::Press => {
                        self.handle_key(key).await;
                    }
                    Some(Ok(Event::Resize(w, h))) => self.size = (w, h),
                    Some(Ok(_)) => {}
                    Some(Err(e)) => tracing::warn!("Terminal event error: {}", e),
                    None => self.running = false,
                },

                // Frame tick
                () = tokio::time::sleep(FRAME_DURATION) => {}
            }

            // Apply finished backend calls
            self.conductor.poll_completions().await;

            // Receive and process messages from Conductor
            self.process_conductor_messages();

            self.display.update();
            self.render(terminal)?;

            if self.display.quit {
                self.running = false;
            }
        }

        Ok(())
    }

    /// Process all pending messages from the Conductor
    fn process_conductor_messages(&mut self) {
        for msg in self.conductor.recv_all() {
            match &msg {
                ConductorMessage::InputChanged { text } => self.input_buffer.clone_from(text),
                ConductorMessage::Snapshot { snapshot } => {
                    self.input_buffer.clone_from(&snapshot.input);
                }
                ConductorMessage::MessageAdded { .. } | ConductorMessage::HistoryCleared => {
                    self.scroll_offset = 0;
                }
                _ => {}
            }

            // Apply message to display state
            self.display.apply_message(msg);
        }
    }

    /// Handle keyboard input
    async fn handle_key(&mut self, key: event::KeyEvent) {
        match key.code {
            // Quit
            KeyCode::Esc => self.quit().await,
            KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                self.quit().await;
            }

            // Reset confirmation swallows everything else
            code if self.display.awaiting_confirm() => self.handle_confirm_key(code).await,

            // Conversation scrolling
            KeyCode::PageUp => {
                let page_size = self.page_size();
                let max_scroll = self.total_lines.saturating_sub(1);
                self.scroll_offset = (self.scroll_offset + page_size).min(max_scroll);
            }
            KeyCode::PageDown => {
                let page_size = self.page_size();
                self.scroll_offset = self.scroll_offset.saturating_sub(page_size);
            }

            // Input is disabled while a reply is pending
            _ if self.display.loading => {}

            KeyCode::Enter => self.submit().await,

            KeyCode::Char(c) => {
                self.input_buffer.push(c);
                self.sync_input().await;
            }

            KeyCode::Backspace => {
                if self.input_buffer.pop().is_some() {
                    self.sync_input().await;
                }
            }

            _ => {}
        }
    }

    /// Answer the reset prompt
    async fn handle_confirm_key(&mut self, code: KeyCode) {
        let confirmed = match code {
            KeyCode::Char('y' | 'Y') => true,
            KeyCode::Char('n' | 'N') | KeyCode::Enter => false,
            _ => return,
        };
        self.display.confirm = None;
        if let Err(e) = self.conductor.answer_reset(confirmed).await {
            tracing::warn!(error = %e, "Failed to answer reset");
        }
    }

    /// Half the conversation pane
    fn page_size(&self) -> usize {
        usize::from(self.size.1.saturating_sub(INPUT_HEIGHT + 1) / 2)
    }

    async fn sync_input(&mut self) {
        if let Err(e) = self.conductor.set_input(self.input_buffer.clone()).await {
            tracing::warn!(error = %e, "Failed to update input");
        }
    }

    /// Send the input line or run it as a command
    async fn submit(&mut self) {
        if self.input_buffer.trim().is_empty() {
            return;
        }

        let result = match commands::parse(&self.input_buffer, &self.filter) {
            // The Conductor already holds this exact text as its input
            Ok(Command::Send(text)) if text == self.input_buffer => {
                self.scroll_offset = 0;
                self.conductor.submit().await
            }
            Ok(command) => {
                self.input_buffer.clear();
                self.sync_input().await;
                self.run_command(command).await
            }
            Err(e) => {
                self.display.notify(NotifyLevel::Warning, e.to_string());
                Ok(())
            }
        };

        if let Err(e) = result {
            tracing::warn!(error = %e, "Conductor event failed");
        }
    }

    /// Run a slash command
    async fn run_command(&mut self, command: Command) -> anyhow::Result<()> {
        match command {
            Command::Send(text) => {
                self.scroll_offset = 0;
                self.conductor.send_message(text).await
            }
            Command::Upload(path) => {
                if let Some(path) = path {
                    self.select(path).await?;
                }
                self.conductor.upload().await
            }
            Command::SelectFile(path) => self.select(path).await,
            Command::Mode(mode) => {
                let mode = mode.unwrap_or(match self.display.mode {
                    Mode::General => Mode::Document,
                    Mode::Document => Mode::General,
                });
                self.conductor.set_mode(mode).await
            }
            Command::Reset => self.conductor.request_reset().await,
            Command::Quit => {
                self.quit().await;
                Ok(())
            }
            Command::Help => {
                self.display.push_system(HELP);
                Ok(())
            }
        }
    }

    async fn select(&mut self, path: PathBuf) -> anyhow::Result<()> {
        let path = expand_home(path);
        if !tokio::fs::try_exists(&path).await.unwrap_or(false) {
            self.display.notify(
                NotifyLevel::Warning,
                format!("File not found: {}", path.display()),
            );
        }
        self.conductor.select_file(path).await
    }

    async fn quit(&mut self) {
        if let Err(e) = self.conductor.request_quit().await {
            tracing::warn!(error = %e, "Quit request failed");
        }
        self.running = false;
    }

    /// Render the UI
    fn render(&mut self, terminal: &mut Terminal<CrosstermBackend<io::Stdout>>) -> anyhow::Result<()> {
        terminal.draw(|frame| {
            let [conversation, input, status] = Layout::vertical([
                Constraint::Min(3),
                Constraint::Length(INPUT_HEIGHT),
                Constraint::Length(1),
            ])
            .areas(frame.area());

            let buf = frame.buffer_mut();
            self.render_conversation(buf, conversation);
            self.render_input(buf, input);
            self.render_status(buf, status);
        })?;

        Ok(())
    }

    /// Render conversation pane
    fn render_conversation(&mut self, buf: &mut Buffer, area: Rect) {
        let width = usize::from(area.width.saturating_sub(1));
        let height = usize::from(area.height);

        if width < 10 || height < 3 {
            return;
        }

        // Build wrapped lines from display messages
        let mut all_lines: Vec<(String, Style)> = Vec::new();

        for msg in &self.display.messages {
            let base_style = match msg.role {
                DisplayRole::User => Style::default().fg(USER_GREEN),
                DisplayRole::Assistant => Style::default().fg(ASSISTANT_BLUE),
                DisplayRole::System => Style::default().fg(DIM_GRAY),
            };

            let content = format!("{}{}", msg.role.prefix(), msg.content);
            for line in textwrap::wrap(&content, width) {
                all_lines.push((line.into_owned(), base_style));
            }
            all_lines.push((String::new(), Style::default()));
        }

        if self.display.loading {
            all_lines.push((
                format!("{}{}", DisplayRole::Assistant.prefix(), self.strings.typing()),
                Style::default().fg(DIM_GRAY).add_modifier(Modifier::ITALIC),
            ));
        }

        self.total_lines = all_lines.len();

        // Clamp scroll offset
        let max_scroll = self.total_lines.saturating_sub(height);
        if self.scroll_offset > max_scroll {
            self.scroll_offset = max_scroll;
        }

        // Calculate visible range
        let visible_end = self.total_lines.saturating_sub(self.scroll_offset);
        let visible_start = visible_end.saturating_sub(height);

        let has_content_above = visible_start > 0;
        let has_content_below = self.scroll_offset > 0;

        for (i, (line, style)) in all_lines
            .iter()
            .skip(visible_start)
            .take(height)
            .enumerate()
        {
            // Fade the edges when there is more to scroll to
            let final_style = if has_content_above && i < 2 {
                Style::default().fg(if i == 0 { FADE_DARK } else { FADE_LIGHT })
            } else if has_content_below && i >= height.saturating_sub(2) {
                let dist_from_bottom = height.saturating_sub(1).saturating_sub(i);
                Style::default().fg(if dist_from_bottom == 0 {
                    FADE_DARK
                } else {
                    FADE_LIGHT
                })
            } else {
                *style
            };

            #[allow(clippy::cast_possible_truncation)]
            let y = area.y + i as u16;
            buf.set_stringn(area.x, y, line, usize::from(area.width), final_style);
        }
    }

    /// Render input box
    fn render_input(&self, buf: &mut Buffer, area: Rect) {
        if area.height < 2 {
            return;
        }

        let separator = "-".repeat(usize::from(area.width));
        buf.set_string(area.x, area.y, &separator, Style::default().fg(DIM_GRAY));

        if let Some(question) = &self.display.confirm {
            buf.set_stringn(
                area.x,
                area.y + 1,
                format!("{question} [y/n]"),
                usize::from(area.width),
                Style::default()
                    .fg(WARNING_YELLOW)
                    .add_modifier(Modifier::BOLD),
            );
            return;
        }

        let text_height = usize::from(area.height.saturating_sub(1));
        let text_width = usize::from(area.width.saturating_sub(1));

        if text_width < 5 {
            return;
        }

        let (full_input, style) = if self.input_buffer.is_empty() {
            (
                format!("You: {}", self.strings.input_placeholder()),
                Style::default().fg(DIM_GRAY),
            )
        } else if self.display.loading {
            (
                format!("You: {}", self.input_buffer),
                Style::default().fg(DIM_GRAY),
            )
        } else {
            (
                format!("You: {}_", self.input_buffer),
                Style::default().fg(USER_GREEN),
            )
        };

        let wrapped_lines: Vec<String> = textwrap::wrap(&full_input, text_width)
            .into_iter()
            .map(std::borrow::Cow::into_owned)
            .collect();
        let skip = wrapped_lines.len().saturating_sub(text_height);

        for (i, line) in wrapped_lines.iter().skip(skip).enumerate() {
            #[allow(clippy::cast_possible_truncation)]
            let y = area.y + 1 + i as u16;
            buf.set_stringn(area.x, y, line, usize::from(area.width), style);
        }

        if skip > 0 {
            buf.set_string(
                area.x + area.width.saturating_sub(3),
                area.y,
                "^",
                Style::default().fg(WARNING_YELLOW),
            );
        }
    }

    /// Render status bar
    fn render_status(&self, buf: &mut Buffer, area: Rect) {
        let document = self.display.upload.active_document.as_deref().unwrap_or("-");
        let left = format!(" {} | {} ", self.display.mode, document);
        let (x, _) = buf.set_stringn(
            area.x,
            area.y,
            &left,
            usize::from(area.width),
            Style::default().fg(ACCENT_MAGENTA),
        );

        let (detail, detail_style) = if let Some(notification) = &self.display.notification {
            let color = match notification.level {
                NotifyLevel::Info => DIM_GRAY,
                NotifyLevel::Warning => WARNING_YELLOW,
                NotifyLevel::Error => ERROR_RED,
            };
            (notification.message.clone(), Style::default().fg(color))
        } else if !self.display.status_text.is_empty() {
            let color = match self.display.status {
                ProcessingStatus::Error => ERROR_RED,
                ProcessingStatus::Done => SUCCESS_GREEN,
                _ => WARNING_YELLOW,
            };
            (self.display.status_text.clone(), Style::default().fg(color))
        } else if let Some(pending) = &self.display.upload.pending {
            (format!("[{pending}]"), Style::default().fg(DIM_GRAY))
        } else {
            (String::new(), Style::default())
        };

        let hint = if self.scroll_offset > 0 {
            format!("[^{} lines] PgDn | Esc quit | /help ", self.scroll_offset)
        } else {
            "Esc quit | /help ".to_string()
        };
        #[allow(clippy::cast_possible_truncation)]
        let hint_width = hint.width() as u16;
        let hint_x = area.right().saturating_sub(hint_width);

        let room = usize::from(hint_x.saturating_sub(x + 1));
        buf.set_stringn(x, area.y, &detail, room, detail_style);
        if hint_x > x {
            buf.set_string(hint_x, area.y, &hint, Style::default().fg(DIM_GRAY));
        }
    }
}

/// Expand a leading `~/` to the home directory
fn expand_home(path: PathBuf) -> PathBuf {
    match (path.strip_prefix("~"), dirs::home_dir()) {
        (Ok(rest), Some(home)) => home.join(rest),
        _ => path,
    }
}
