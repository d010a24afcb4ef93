//! Display State Types
//!
//! Types that represent the current display state for the TUI.
//! These are derived from ConductorMessages and used for rendering.
//!
//! # Design Philosophy
//!
//! The TUI is a "thin client" - it just renders what the Conductor tells it to.
//! Display state is the bridge between ConductorMessages and rendering.
//!
//! - DisplayMessage: A rendered conversation message
//! - DisplayNotification: A transient line in the status bar

use std::time::{Duration, Instant};

use docchat_core::{
    ChatMessage, ChatSnapshot, ConductorMessage, MessageId, Mode, NotifyLevel, ProcessingStatus,
    Sender, UploadSnapshot,
};

/// How long a notification stays in the status bar
const NOTIFICATION_TTL: Duration = Duration::from_secs(6);

/// A rendered conversation message
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DisplayMessage {
    /// Message ID (None for lines the TUI adds itself)
    pub id: Option<MessageId>,
    /// Who sent this message
    pub role: DisplayRole,
    /// The message content
    pub content: String,
}

impl DisplayMessage {
    /// A system line that is not part of the conversation history
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            id: None,
            role: DisplayRole::System,
            content: content.into(),
        }
    }
}

impl From<ChatMessage> for DisplayMessage {
    fn from(message: ChatMessage) -> Self {
        Self {
            id: Some(message.id),
            role: message.sender.into(),
            content: message.text,
        }
    }
}

/// Display role for messages
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DisplayRole {
    /// User input
    User,
    /// Backend reply
    Assistant,
    /// TUI-local line
    System,
}

impl From<Sender> for DisplayRole {
    fn from(sender: Sender) -> Self {
        match sender {
            Sender::User => DisplayRole::User,
            Sender::Bot => DisplayRole::Assistant,
        }
    }
}

impl DisplayRole {
    /// Get the prefix for this role
    pub fn prefix(&self) -> &'static str {
        match self {
            DisplayRole::User => "You: ",
            DisplayRole::Assistant => "AI: ",
            DisplayRole::System => "",
        }
    }
}

/// A notification to display
#[derive(Clone, Debug)]
pub struct DisplayNotification {
    /// Notification level
    pub level: NotifyLevel,
    /// Notification message
    pub message: String,
    /// When it was shown
    pub shown_at: Instant,
}

/// The full display state for the TUI
#[derive(Debug, Default)]
pub struct DisplayState {
    /// Conversation messages
    pub messages: Vec<DisplayMessage>,
    /// Whether a reply is pending
    pub loading: bool,
    /// Request mode
    pub mode: Mode,
    /// Selection and active document
    pub upload: UploadSnapshot,
    /// Processing status
    pub status: ProcessingStatus,
    /// Status line text
    pub status_text: String,
    /// Outstanding reset confirmation question
    pub confirm: Option<String>,
    /// Pending notification (if any)
    pub notification: Option<DisplayNotification>,
    /// Conductor asked the surface to quit
    pub quit: bool,
}

impl DisplayState {
    /// Create a new display state
    pub fn new() -> Self {
        Self::default()
    }

    /// Apply a ConductorMessage to update display state
    pub fn apply_message(&mut self, msg: ConductorMessage) {
        match msg {
            ConductorMessage::Snapshot { snapshot } => {
                self.apply_snapshot(snapshot);
            }

            // Conversation messages
            ConductorMessage::MessageAdded { message } => {
                self.messages.push(message.into());
            }
            ConductorMessage::MessageReplaced { id, text } => {
                if let Some(msg) = self.find_mut(&id) {
                    msg.content = text;
                }
            }
            ConductorMessage::MessageRemoved { id } => {
                self.messages.retain(|m| m.id.as_ref() != Some(&id));
            }
            ConductorMessage::HistoryCleared => {
                self.messages.clear();
                self.confirm = None;
            }
            // The App owns the input line and mirrors it on its own
            ConductorMessage::InputChanged { .. } => {}
            ConductorMessage::Loading { loading } => {
                self.loading = loading;
            }
            ConductorMessage::ModeChanged { mode } => {
                self.mode = mode;
            }

            // Upload messages
            ConductorMessage::UploadState { upload } => {
                self.upload = upload;
            }
            ConductorMessage::Status { status, text } => {
                self.status = status;
                self.status_text = text;
            }

            // Prompts
            ConductorMessage::Prompt { text } => {
                self.notify(NotifyLevel::Warning, text);
            }
            ConductorMessage::ConfirmReset { text } => {
                self.confirm = Some(text);
            }
            ConductorMessage::Notify { level, message } => {
                self.notify(level, message);
            }

            // System
            ConductorMessage::Quit => {
                self.quit = true;
            }
        }
    }

    fn apply_snapshot(&mut self, snapshot: ChatSnapshot) {
        self.messages = snapshot.messages.into_iter().map(Into::into).collect();
        self.loading = snapshot.loading;
        self.mode = snapshot.mode;
        self.upload = snapshot.upload;
        self.status = snapshot.status;
        self.status_text = snapshot.status_text;
    }

    fn find_mut(&mut self, id: &MessageId) -> Option<&mut DisplayMessage> {
        self.messages.iter_mut().find(|m| m.id.as_ref() == Some(id))
    }

    /// Show a notification in the status bar
    pub fn notify(&mut self, level: NotifyLevel, message: impl Into<String>) {
        self.notification = Some(DisplayNotification {
            level,
            message: message.into(),
            shown_at: Instant::now(),
        });
    }

    /// Append a line that only the TUI shows
    pub fn push_system(&mut self, content: impl Into<String>) {
        self.messages.push(DisplayMessage::system(content));
    }

    /// Expire old notifications
    pub fn update(&mut self) {
        if self
            .notification
            .as_ref()
            .is_some_and(|n| n.shown_at.elapsed() >= NOTIFICATION_TTL)
        {
            self.notification = None;
        }
    }

    /// Whether a reset confirmation is waiting for y/n
    pub fn awaiting_confirm(&self) -> bool {
        self.confirm.is_some()
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn added(sender: Sender, text: &str) -> (MessageId, ConductorMessage) {
        let message = ChatMessage::new(sender, text);
        (message.id.clone(), ConductorMessage::MessageAdded { message })
    }

    #[test]
    fn test_added_and_replaced() {
        let mut display = DisplayState::new();
        let (_, user) = added(Sender::User, "hi");
        let (bot_id, bot) = added(Sender::Bot, "uploading");
        display.apply_message(user);
        display.apply_message(bot);

        display.apply_message(ConductorMessage::MessageReplaced {
            id: bot_id,
            text: "done".to_string(),
        });

        let contents: Vec<_> = display.messages.iter().map(|m| m.content.as_str()).collect();
        assert_eq!(contents, vec!["hi", "done"]);
        assert_eq!(display.messages[0].role, DisplayRole::User);
        assert_eq!(display.messages[1].role, DisplayRole::Assistant);
    }

    #[test]
    fn test_removed_keeps_other_messages() {
        let mut display = DisplayState::new();
        let (keep_id, keep) = added(Sender::User, "keep");
        let (drop_id, placeholder) = added(Sender::Bot, "processing");
        display.apply_message(keep);
        display.apply_message(placeholder);

        display.apply_message(ConductorMessage::MessageRemoved { id: drop_id });

        assert_eq!(display.messages.len(), 1);
        assert_eq!(display.messages[0].id, Some(keep_id));
    }

    #[test]
    fn test_history_cleared_drops_confirm() {
        let mut display = DisplayState::new();
        let (_, msg) = added(Sender::User, "hi");
        display.apply_message(msg);
        display.apply_message(ConductorMessage::ConfirmReset {
            text: "sure?".to_string(),
        });
        assert!(display.awaiting_confirm());

        display.apply_message(ConductorMessage::HistoryCleared);
        assert!(display.messages.is_empty());
        assert!(!display.awaiting_confirm());
    }

    #[test]
    fn test_snapshot_replaces_state() {
        let mut display = DisplayState::new();
        display.push_system("local line");

        display.apply_message(ConductorMessage::Snapshot {
            snapshot: ChatSnapshot {
                messages: vec![ChatMessage::new(Sender::Bot, "welcome back")],
                mode: Mode::Document,
                status: ProcessingStatus::Processing,
                status_text: "working".to_string(),
                ..Default::default()
            },
        });

        assert_eq!(display.messages.len(), 1);
        assert_eq!(display.mode, Mode::Document);
        assert_eq!(display.status_text, "working");
    }

    #[test]
    fn test_prompt_becomes_notification() {
        let mut display = DisplayState::new();
        display.apply_message(ConductorMessage::Prompt {
            text: "choose a file".to_string(),
        });

        let notification = display.notification.as_ref().unwrap();
        assert_eq!(notification.level, NotifyLevel::Warning);
        assert_eq!(notification.message, "choose a file");
    }

    #[test]
    fn test_quit_flag() {
        let mut display = DisplayState::new();
        display.apply_message(ConductorMessage::Quit);
        assert!(display.quit);
    }
}
