//! Chat Backend Integration
//!
//! This module provides access to the conversational-AI backend through a
//! common trait interface, so the Conductor can be driven by the real HTTP
//! client or by a mock in tests.
//!
//! # Endpoints
//!
//! - `POST /conversation` - Send a message with history, receive a reply
//! - `POST /upload` - Multipart document upload
//! - `POST /status` - Document processing status
//! - `GET /reset_status` - Acknowledge a finished document
//!
//! # Usage
//!
//! ```ignore
//! use docchat_core::backend::{BackendConfig, ChatBackend, ConversationRequest, HttpBackend};
//!
//! let backend = HttpBackend::new(&BackendConfig::default())?;
//! let reply = backend.converse(&ConversationRequest::new("Hello")).await?;
//! println!("{}", reply.into_text());
//! ```

mod error;
mod http;
mod reply;
mod traits;

pub use error::BackendError;
pub use http::HttpBackend;
pub use reply::{ReplyBody, ReplySegment};
pub use traits::{
    BackendConfig, ChatBackend, ConversationRequest, HistoryEntry, RemoteStatus, UploadFile,
};
