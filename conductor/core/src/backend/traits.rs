//! Chat Backend Traits
//!
//! Trait and wire types for the conversational backend. This abstraction
//! lets the Conductor work against the real HTTP server or a test double
//! without changing core logic.
//!
//! # Design Philosophy
//!
//! The ChatBackend trait provides one method per endpoint. Implementations
//! return raw outcomes; deciding what the user sees is the Conductor's job.

use std::path::Path;
use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use super::error::BackendError;
use super::reply::ReplyBody;
use crate::messages::{Mode, Sender};

/// One prior message as sent to the backend
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryEntry {
    /// Who sent it
    pub sender: Sender,
    /// What was said
    pub text: String,
}

/// Body of `POST /conversation`
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversationRequest {
    /// The new user message
    pub message: String,
    /// Requested context
    pub mode: Mode,
    /// Every message before this one
    pub history: Vec<HistoryEntry>,
}

impl ConversationRequest {
    /// Create a request with no history in general mode
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            mode: Mode::General,
            history: Vec::new(),
        }
    }

    /// Set mode
    #[must_use]
    pub fn with_mode(mut self, mode: Mode) -> Self {
        self.mode = mode;
        self
    }

    /// Set history
    #[must_use]
    pub fn with_history(mut self, history: Vec<HistoryEntry>) -> Self {
        self.history = history;
        self
    }
}

/// A document ready to be posted to `/upload`
#[derive(Clone, Debug)]
pub struct UploadFile {
    /// File name sent in the multipart part
    pub file_name: String,
    /// MIME type of the part
    pub mime: &'static str,
    /// File contents
    pub bytes: Vec<u8>,
}

impl UploadFile {
    /// Build from in-memory bytes
    pub fn new(file_name: impl Into<String>, bytes: Vec<u8>) -> Self {
        let file_name = file_name.into();
        let mime = mime_for(&file_name);
        Self {
            file_name,
            mime,
            bytes,
        }
    }

    /// Read a file from disk
    ///
    /// # Errors
    ///
    /// Returns [`BackendError::File`] if the file cannot be read.
    pub async fn from_path(path: &Path) -> Result<Self, BackendError> {
        let bytes = tokio::fs::read(path)
            .await
            .map_err(|source| BackendError::File {
                path: path.to_path_buf(),
                source,
            })?;
        let file_name = path
            .file_name()
            .map_or_else(|| "upload".to_string(), |n| n.to_string_lossy().into_owned());
        Ok(Self::new(file_name, bytes))
    }
}

fn mime_for(file_name: &str) -> &'static str {
    let is_pdf = Path::new(file_name)
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("pdf"));
    if is_pdf {
        "application/pdf"
    } else {
        "application/octet-stream"
    }
}

/// Document processing state reported by `POST /status`
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RemoteStatus {
    /// Still working
    Processing,
    /// Finished; must be acknowledged
    Done,
    /// Anything else (idle, error, unknown)
    Other(String),
}

impl RemoteStatus {
    /// Interpret the `message` field of a status response
    #[must_use]
    pub fn from_message(message: &str) -> Self {
        match message {
            "processing" => Self::Processing,
            "done" => Self::Done,
            other => Self::Other(other.to_string()),
        }
    }
}

/// Chat backend trait
///
/// Implement this trait to drive the Conductor from a different server or a
/// test harness.
#[async_trait]
pub trait ChatBackend: Send + Sync {
    /// Get the backend name
    fn name(&self) -> &str;

    /// Check if the backend is reachable
    async fn health_check(&self) -> bool;

    /// Send a message with history and wait for the reply
    async fn converse(&self, request: &ConversationRequest) -> Result<ReplyBody, BackendError>;

    /// Upload a document for ingestion
    async fn upload(&self, file: UploadFile) -> Result<(), BackendError>;

    /// Query document processing status
    async fn status(&self) -> Result<RemoteStatus, BackendError>;

    /// Acknowledge a finished document so the backend resets its status
    async fn reset_status(&self) -> Result<(), BackendError>;
}

/// Backend connection configuration
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BackendConfig {
    /// Base URL, without trailing slash
    pub base_url: String,
    /// Timeout applied to every request
    pub request_timeout: Duration,
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8000".to_string(),
            request_timeout: Duration::from_secs(120),
        }
    }
}

impl BackendConfig {
    /// Create configuration for a base URL with the default timeout
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            ..Default::default()
        }
    }
}
