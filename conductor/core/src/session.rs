//! Conversation History
//!
//! Ordered, append-only message history for one session. The only in-place
//! edits are targeted by [`MessageId`], so an upload status placeholder is
//! rewritten correctly even if other messages were appended after it.

use serde::{Deserialize, Serialize};

use crate::backend::HistoryEntry;
use crate::messages::{ChatMessage, MessageId, Sender};

/// Ordered conversation history
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct History {
    messages: Vec<ChatMessage>,
}

impl History {
    /// Create an empty history
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a message and return a copy of it
    pub fn push(&mut self, sender: Sender, text: impl Into<String>) -> ChatMessage {
        let msg = ChatMessage::new(sender, text);
        self.messages.push(msg.clone());
        msg
    }

    /// Rewrite the text of a message by ID
    ///
    /// Returns false if the message is no longer in the history.
    pub fn replace(&mut self, id: &MessageId, text: impl Into<String>) -> bool {
        match self.messages.iter_mut().find(|m| &m.id == id) {
            Some(msg) => {
                msg.text = text.into();
                true
            }
            None => false,
        }
    }

    /// Remove a message by ID
    pub fn remove(&mut self, id: &MessageId) -> bool {
        let before = self.messages.len();
        self.messages.retain(|m| &m.id != id);
        self.messages.len() != before
    }

    /// Get a message by ID
    #[must_use]
    pub fn get(&self, id: &MessageId) -> Option<&ChatMessage> {
        self.messages.iter().find(|m| &m.id == id)
    }

    /// The `{sender, text}` pairs sent to the backend as context
    #[must_use]
    pub fn payload(&self) -> Vec<HistoryEntry> {
        self.messages
            .iter()
            .map(|m| HistoryEntry {
                sender: m.sender,
                text: m.text.clone(),
            })
            .collect()
    }

    /// All messages in order
    #[must_use]
    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    /// Most recent message
    #[must_use]
    pub fn last(&self) -> Option<&ChatMessage> {
        self.messages.last()
    }

    /// Number of messages
    #[must_use]
    pub fn len(&self) -> usize {
        self.messages.len()
    }

    /// Whether the history is empty
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    /// Drop every message
    pub fn clear(&mut self) {
        self.messages.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_push_preserves_order() {
        let mut history = History::new();
        history.push(Sender::User, "one");
        history.push(Sender::Bot, "two");
        history.push(Sender::User, "three");

        let texts: Vec<_> = history.messages().iter().map(|m| m.text.as_str()).collect();
        assert_eq!(texts, vec!["one", "two", "three"]);
    }

    #[test]
    fn test_replace_targets_id_not_last() {
        let mut history = History::new();
        let placeholder = history.push(Sender::Bot, "Uploading...");
        history.push(Sender::User, "typed meanwhile");

        assert!(history.replace(&placeholder.id, "Done"));
        assert_eq!(history.messages()[0].text, "Done");
        assert_eq!(history.messages()[1].text, "typed meanwhile");
    }

    #[test]
    fn test_replace_missing_id() {
        let mut history = History::new();
        let msg = history.push(Sender::Bot, "x");
        history.clear();
        assert!(!history.replace(&msg.id, "y"));
        assert!(history.is_empty());
    }

    #[test]
    fn test_remove() {
        let mut history = History::new();
        let a = history.push(Sender::Bot, "a");
        history.push(Sender::Bot, "b");
        assert!(history.remove(&a.id));
        assert!(!history.remove(&a.id));
        assert_eq!(history.len(), 1);
    }

    #[test]
    fn test_payload_pairs() {
        let mut history = History::new();
        history.push(Sender::User, "q");
        history.push(Sender::Bot, "a");

        let payload = history.payload();
        assert_eq!(payload.len(), 2);
        assert_eq!(payload[0].sender, Sender::User);
        assert_eq!(payload[1].text, "a");
    }
}
