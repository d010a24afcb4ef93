//! Surface Events
//!
//! Events sent from UI surfaces to the Conductor.
//!
//! # Design Philosophy
//!
//! UI surfaces forward user actions without interpreting them. Validation,
//! in-flight guards and confirmation flow all live in the Conductor.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::messages::Mode;

/// Events from UI Surface to Conductor
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum SurfaceEvent {
    // ============================================
    // Connection Events
    // ============================================
    /// Surface connected; Conductor replies with a snapshot
    Connected,

    /// Surface is going away
    Disconnected,

    // ============================================
    // Conversation Events
    // ============================================
    /// User edited the input buffer
    InputChanged {
        /// New buffer contents
        text: String,
    },

    /// User submitted the current input buffer
    Submit,

    /// User submitted a message directly
    UserMessage {
        /// The message content
        content: String,
    },

    /// User switched between general and document mode
    SetMode {
        /// The new mode
        mode: Mode,
    },

    // ============================================
    // Upload Events
    // ============================================
    /// User picked a file
    SelectFile {
        /// Path on disk
        path: PathBuf,
    },

    /// User asked to upload the selected file
    Upload,

    // ============================================
    // Reset Flow
    // ============================================
    /// User asked to clear the conversation
    ResetRequested,

    /// User answered the reset confirmation
    ResetAnswered {
        /// Whether the user agreed
        confirmed: bool,
    },

    // ============================================
    // Lifecycle Events
    // ============================================
    /// User requested quit
    QuitRequested,
}
