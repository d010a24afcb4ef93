//! docchat Core - Headless Chat and Document-Upload Orchestration
//!
//! This crate provides the client-side orchestration for docchat, completely
//! independent of any UI framework. It drives a conversational-AI backend over
//! HTTP: sending messages with their history, uploading documents for
//! retrieval-augmented answers, and polling the backend until a document has
//! been processed.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                        UI Surfaces                            │
//! │        ┌─────────┐      ┌──────────────┐                      │
//! │        │   TUI   │      │ Tests / CLI  │                      │
//! │        └────┬────┘      └──────┬───────┘                      │
//! │             └────────┬─────────┘                              │
//! │              SurfaceEvent (up)                                │
//! │            ConductorMessage (down)                            │
//! └──────────────────────┼───────────────────────────────────────┘
//!                        │
//! ┌──────────────────────┼───────────────────────────────────────┐
//! │                DOCCHAT CORE                                   │
//! │  ┌───────────────────┴──────────────────────────────────────┐ │
//! │  │                     Conductor                             │ │
//! │  │  ┌──────────────┐  ┌──────────────┐  ┌────────────────┐  │ │
//! │  │  │ Conversation │  │    Upload    │  │ Status Poller  │  │ │
//! │  │  │  Controller  │  │  Controller  │  │ (cancellable)  │  │ │
//! │  │  └──────────────┘  └──────────────┘  └────────────────┘  │ │
//! │  │                 ChatBackend (HTTP)                        │ │
//! │  └──────────────────────────────────────────────────────────┘ │
//! └──────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Key Types
//!
//! - [`Conductor`]: Owns all client state and applies every mutation
//! - [`ConductorMessage`]: State changes sent from the Conductor to surfaces
//! - [`SurfaceEvent`]: User actions sent from surfaces to the Conductor
//! - [`History`]: Ordered conversation history
//! - [`ChatBackend`]: The backend abstraction, implemented by [`HttpBackend`]
//!
//! # Quick Start
//!
//! ```ignore
//! use docchat_core::{Conductor, HttpBackend, SurfaceEvent, load_config};
//! use tokio::sync::mpsc;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = load_config()?;
//!     let backend = HttpBackend::new(&config.backend)?;
//!
//!     let (tx, mut rx) = mpsc::channel(100);
//!     let (events_tx, events_rx) = mpsc::channel(100);
//!     let conductor = Conductor::new(backend, config.conductor_config(), tx);
//!     tokio::spawn(conductor.run(events_rx));
//!
//!     events_tx.send(SurfaceEvent::UserMessage { content: "Hello".into() }).await?;
//!     while let Some(msg) = rx.recv().await {
//!         // Render message to UI
//!     }
//!     Ok(())
//! }
//! ```
//!
//! # No TUI Dependencies
//!
//! This crate has **zero** dependencies on ratatui, crossterm, or any other
//! UI framework.

#![deny(missing_docs)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod backend;
pub mod conductor;
pub mod config;
pub mod conversation;
pub mod events;
pub mod locale;
pub mod messages;
pub mod poller;
pub mod session;
pub mod upload;

// Re-exports for convenience
pub use backend::{
    BackendConfig, BackendError, ChatBackend, ConversationRequest, HistoryEntry, HttpBackend,
    RemoteStatus, ReplyBody, UploadFile,
};
pub use conductor::{Conductor, ConductorConfig};
pub use config::{
    default_config_path, load_config, load_config_from_path, ClientConfig, ClientToml,
    ConfigError, ConfigOverrides, ConfigSource,
};
pub use conversation::{ConversationController, PendingSend, ValidationError};
pub use events::SurfaceEvent;
pub use locale::{Locale, Strings};
pub use messages::{
    ChatMessage, ChatSnapshot, ConductorMessage, MessageId, Mode, NotifyLevel, ProcessingStatus,
    Sender, UploadSnapshot,
};
pub use poller::{PollConfig, PollEvent, PollOutcome, ProcessingMode, StatusPoller};
pub use session::History;
pub use upload::{FileFilter, PendingUpload, StatusDisplay, UploadController};
