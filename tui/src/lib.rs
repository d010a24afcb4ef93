//! docchat TUI - Terminal interface for docchat
//!
//! This crate provides a full-screen terminal UI for chatting with a
//! document-aware backend and uploading documents to it.
//!
//! # Architecture
//!
//! - **App**: Event loop, slash commands and rendering
//! - **ConductorClient**: Embedded Conductor driven once per frame
//! - **Display**: Display state derived from ConductorMessages
//! - **Theme**: Colors

pub mod app;
pub mod commands;
pub mod conductor_client;
pub mod display;
pub mod theme;

pub use app::App;
pub use conductor_client::ConductorClient;
pub use display::DisplayState;
