//! Conversation Controller
//!
//! Owns the message history, the input buffer, the in-flight flag and the
//! request mode. Sending is split in two halves so the network call can run
//! elsewhere:
//!
//! 1. [`ConversationController::begin_send`] validates, captures the history
//!    payload, appends the user message and raises `loading`.
//! 2. [`ConversationController::complete_send`] appends exactly one bot
//!    message and lowers `loading`, whatever the outcome.
//!
//! The history payload is captured *before* the user message is appended, so
//! the backend never sees the current message inside `history`.

use thiserror::Error;

use crate::backend::{BackendError, ConversationRequest, ReplyBody};
use crate::locale::Strings;
use crate::messages::{ChatMessage, Mode, Sender};
use crate::session::History;

/// Local validation failures; these never reach the network layer
#[derive(Clone, Copy, Debug, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// Message is empty after trimming
    #[error("message is empty")]
    EmptyMessage,
    /// A send is already in flight
    #[error("a message is already being sent")]
    SendInFlight,
    /// Upload requested with no file selected
    #[error("no file selected")]
    NoFileSelected,
    /// An upload is already in flight
    #[error("an upload is already in progress")]
    UploadInFlight,
}

/// A send that passed validation
#[derive(Clone, Debug)]
pub struct PendingSend {
    /// The user message appended to the history
    pub message: ChatMessage,
    /// Request to post to the backend
    pub request: ConversationRequest,
}

/// Conversation state and commands
#[derive(Debug, Default)]
pub struct ConversationController {
    history: History,
    input: String,
    loading: bool,
    mode: Mode,
}

impl ConversationController {
    /// Create a controller in the given mode
    #[must_use]
    pub fn new(mode: Mode) -> Self {
        Self {
            mode,
            ..Default::default()
        }
    }

    /// Replace the input buffer
    pub fn set_input(&mut self, text: impl Into<String>) {
        self.input = text.into();
    }

    /// Change the request mode
    pub fn set_mode(&mut self, mode: Mode) {
        self.mode = mode;
    }

    /// Validate and start a send
    ///
    /// # Errors
    ///
    /// [`ValidationError::EmptyMessage`] for blank input and
    /// [`ValidationError::SendInFlight`] while a send is pending. Nothing is
    /// changed in either case.
    pub fn begin_send(&mut self, text: &str) -> Result<PendingSend, ValidationError> {
        if text.trim().is_empty() {
            return Err(ValidationError::EmptyMessage);
        }
        if self.loading {
            return Err(ValidationError::SendInFlight);
        }

        let request = ConversationRequest {
            message: text.to_string(),
            mode: self.mode,
            history: self.history.payload(),
        };

        let message = self.history.push(Sender::User, text);
        self.input.clear();
        self.loading = true;

        Ok(PendingSend { message, request })
    }

    /// Finish a send with the backend outcome
    ///
    /// Returns the appended bot message.
    pub fn complete_send(
        &mut self,
        result: Result<ReplyBody, BackendError>,
        strings: &Strings,
    ) -> ChatMessage {
        let text = match result {
            Ok(reply) => reply.into_text(),
            Err(e) => {
                tracing::warn!(error = %e, "Conversation request failed");
                strings.server_unreachable()
            }
        };
        self.loading = false;
        self.history.push(Sender::Bot, text)
    }

    /// Append a bot message that did not come from a send
    pub fn push_bot(&mut self, text: impl Into<String>) -> ChatMessage {
        self.history.push(Sender::Bot, text)
    }

    /// Mutable access for targeted edits
    pub fn history_mut(&mut self) -> &mut History {
        &mut self.history
    }

    /// Clear history, input and the in-flight flag
    pub fn reset(&mut self) {
        self.history.clear();
        self.input.clear();
        self.loading = false;
    }

    /// Conversation history
    #[must_use]
    pub fn history(&self) -> &History {
        &self.history
    }

    /// Input buffer
    #[must_use]
    pub fn input(&self) -> &str {
        &self.input
    }

    /// Whether a send is in flight
    #[must_use]
    pub fn is_loading(&self) -> bool {
        self.loading
    }

    /// Request mode
    #[must_use]
    pub fn mode(&self) -> Mode {
        self.mode
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn test_blank_input_is_rejected_without_changes() {
        let mut conv = ConversationController::default();
        conv.set_input("   ");

        assert_eq!(conv.begin_send("").unwrap_err(), ValidationError::EmptyMessage);
        assert_eq!(conv.begin_send("   ").unwrap_err(), ValidationError::EmptyMessage);
        assert!(conv.history().is_empty());
        assert_eq!(conv.input(), "   ");
        assert!(!conv.is_loading());
    }

    #[test]
    fn test_begin_send_is_optimistic() {
        let mut conv = ConversationController::new(Mode::Document);
        conv.set_input("hello");

        let pending = conv.begin_send("hello").unwrap();
        assert_eq!(pending.message.sender, Sender::User);
        assert_eq!(pending.request.mode, Mode::Document);
        assert!(pending.request.history.is_empty());
        assert_eq!(conv.history().len(), 1);
        assert_eq!(conv.input(), "");
        assert!(conv.is_loading());
    }

    #[test]
    fn test_second_send_suppressed_while_loading() {
        let mut conv = ConversationController::default();
        conv.begin_send("first").unwrap();
        assert_eq!(conv.begin_send("second").unwrap_err(), ValidationError::SendInFlight);
        assert_eq!(conv.history().len(), 1);
    }

    #[test]
    fn test_history_excludes_current_message() {
        let strings = Strings::default();
        let mut conv = ConversationController::default();

        conv.begin_send("q1").unwrap();
        conv.complete_send(Ok("a1".into()), &strings);

        let pending = conv.begin_send("q2").unwrap();
        let texts: Vec<_> = pending.request.history.iter().map(|h| h.text.as_str()).collect();
        assert_eq!(texts, vec!["q1", "a1"]);
        assert_eq!(pending.request.message, "q2");
    }

    #[test]
    fn test_failure_appends_fallback_and_clears_loading() {
        let strings = Strings::default();
        let mut conv = ConversationController::default();
        conv.begin_send("hi").unwrap();

        let bot = conv.complete_send(
            Err(BackendError::Status {
                status: 500,
                body: String::new(),
            }),
            &strings,
        );
        assert_eq!(bot.sender, Sender::Bot);
        assert_eq!(bot.text, strings.server_unreachable());
        assert!(!conv.is_loading());
        assert_eq!(conv.history().len(), 2);
    }

    #[test]
    fn test_reset_clears_everything() {
        let strings = Strings::default();
        let mut conv = ConversationController::default();
        conv.begin_send("hi").unwrap();
        conv.complete_send(Ok("yo".into()), &strings);
        conv.set_input("draft");

        conv.reset();
        assert!(conv.history().is_empty());
        assert_eq!(conv.input(), "");
        assert!(!conv.is_loading());
    }
}
