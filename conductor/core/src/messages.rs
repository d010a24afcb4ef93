//! Conductor Messages
//!
//! Messages sent from the Conductor to UI surfaces, plus the shared value
//! types they carry (message identity, sender, mode, processing status).
//!
//! # Design Philosophy
//!
//! Surfaces are pure renderers. Every state change the Conductor makes is
//! described by exactly one `ConductorMessage`, so a surface can rebuild its
//! display from a [`ChatSnapshot`] followed by the message stream.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Messages from Conductor to UI Surface
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConductorMessage {
    // ============================================
    // Conversation Messages
    // ============================================
    /// Full state, sent when a surface connects
    Snapshot {
        /// The current client state
        snapshot: ChatSnapshot,
    },

    /// A message was appended to the history
    MessageAdded {
        /// The new message
        message: ChatMessage,
    },

    /// An existing message was rewritten in place
    MessageReplaced {
        /// Which message changed
        id: MessageId,
        /// Its new text
        text: String,
    },

    /// A message was removed from the history
    MessageRemoved {
        /// Which message was removed
        id: MessageId,
    },

    /// The whole history was cleared
    HistoryCleared,

    /// The input buffer changed
    InputChanged {
        /// New buffer contents
        text: String,
    },

    /// A send started or finished
    Loading {
        /// Whether a send is in flight
        loading: bool,
    },

    /// The request mode changed
    ModeChanged {
        /// New mode
        mode: Mode,
    },

    // ============================================
    // Upload Messages
    // ============================================
    /// Upload controller state changed
    UploadState {
        /// Current upload state
        upload: UploadSnapshot,
    },

    /// Processing status or status text changed
    Status {
        /// Current processing status
        status: ProcessingStatus,
        /// Human-readable status line (empty when nothing to show)
        text: String,
    },

    // ============================================
    // Prompts and Notifications
    // ============================================
    /// A blocking prompt the user must dismiss (validation errors)
    Prompt {
        /// Prompt text
        text: String,
    },

    /// Ask the user to confirm clearing the conversation
    ConfirmReset {
        /// Yes/no question to show
        text: String,
    },

    /// Show a notification
    Notify {
        /// Severity
        level: NotifyLevel,
        /// Notification text
        message: String,
    },

    /// Request surface to quit
    Quit,
}

/// Message identifier
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MessageId(pub String);

impl MessageId {
    /// Generate a new unique message ID
    #[must_use]
    pub fn new() -> Self {
        use std::sync::atomic::{AtomicU64, Ordering};
        static COUNTER: AtomicU64 = AtomicU64::new(0);
        let id = COUNTER.fetch_add(1, Ordering::SeqCst);
        Self(format!("msg_{id}"))
    }
}

impl Default for MessageId {
    fn default() -> Self {
        Self::new()
    }
}

/// Who sent a message
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sender {
    /// User input
    User,
    /// Backend reply or client status
    Bot,
}

/// A message in the conversation
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    /// Unique message ID
    pub id: MessageId,
    /// Who sent this message
    pub sender: Sender,
    /// Message text
    pub text: String,
}

impl ChatMessage {
    /// Create a new message with a fresh ID
    pub fn new(sender: Sender, text: impl Into<String>) -> Self {
        Self {
            id: MessageId::new(),
            sender,
            text: text.into(),
        }
    }
}

/// Which conversational context the backend should use
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    /// Plain chat
    #[default]
    General,
    /// Answers grounded in the uploaded document
    Document,
}

impl Mode {
    /// Wire name of this mode
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::General => "general",
            Self::Document => "document",
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Mode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "general" => Ok(Self::General),
            "document" | "doc" => Ok(Self::Document),
            other => Err(format!("unknown mode: {other}")),
        }
    }
}

/// Document processing status
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProcessingStatus {
    /// Nothing happening
    #[default]
    Idle,
    /// File bytes are being sent
    Uploading,
    /// Backend is processing the document
    Processing,
    /// Upload or status check failed
    Error,
    /// Document is ready
    Done,
}

/// Upload controller state as seen by surfaces
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UploadSnapshot {
    /// Display name of the selected file, if any
    pub pending: Option<String>,
    /// Whether an upload or poll chain is in flight
    pub uploading: bool,
    /// Last successfully ingested document
    pub active_document: Option<String>,
}

/// Full client state
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatSnapshot {
    /// Conversation history
    pub messages: Vec<ChatMessage>,
    /// Input buffer
    pub input: String,
    /// Whether a send is in flight
    pub loading: bool,
    /// Request mode
    pub mode: Mode,
    /// Upload state
    pub upload: UploadSnapshot,
    /// Processing status
    pub status: ProcessingStatus,
    /// Status line text
    pub status_text: String,
}

/// Notification levels
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum NotifyLevel {
    /// Informational
    Info,
    /// Warning
    Warning,
    /// Error
    Error,
}
