//! Conductor Client
//!
//! Thin wrapper around the Conductor for TUI integration.
//! This client embeds the Conductor directly and provides a convenient
//! interface for sending events and receiving messages.
//!
//! # Architecture
//!
//! The TUI is a "thin client" - it doesn't contain any business logic.
//! All orchestration happens in the Conductor. The TUI's job is:
//! 1. Convert terminal events to SurfaceEvents
//! 2. Send SurfaceEvents to Conductor
//! 3. Apply finished backend calls once per frame
//! 4. Receive ConductorMessages and render display state

use std::path::PathBuf;

use tokio::sync::mpsc;

use docchat_core::{
    ChatBackend, ClientConfig, Conductor, ConductorConfig, ConductorMessage, HttpBackend, Mode,
    SurfaceEvent,
};

/// Capacity of the Conductor -> TUI channel
const MESSAGE_BUFFER: usize = 256;

/// Client for communicating with the embedded Conductor
pub struct ConductorClient<B: ChatBackend + 'static = HttpBackend> {
    /// The embedded Conductor instance
    conductor: Conductor<B>,
    /// Receiver for messages from Conductor
    rx: mpsc::Receiver<ConductorMessage>,
}

impl ConductorClient<HttpBackend> {
    /// Create a client talking to the configured HTTP backend
    pub fn new(config: &ClientConfig) -> anyhow::Result<Self> {
        let backend = HttpBackend::new(&config.backend)?;
        Ok(Self::with_backend(backend, config.conductor_config()))
    }
}

impl<B: ChatBackend + 'static> ConductorClient<B> {
    /// Create a client around any backend
    pub fn with_backend(backend: B, config: ConductorConfig) -> Self {
        // Create channel for Conductor -> TUI messages
        let (tx, rx) = mpsc::channel(MESSAGE_BUFFER);
        let conductor = Conductor::new(backend, config, tx);
        Self { conductor, rx }
    }

    /// Start the Conductor (background health check)
    pub async fn start(&mut self) -> anyhow::Result<()> {
        self.conductor.start().await
    }

    /// Connect this surface to the Conductor
    pub async fn connect(&mut self) -> anyhow::Result<()> {
        self.conductor.handle_event(SurfaceEvent::Connected).await
    }

    /// Mirror the input buffer to the Conductor
    pub async fn set_input(&mut self, text: String) -> anyhow::Result<()> {
        self.conductor
            .handle_event(SurfaceEvent::InputChanged { text })
            .await
    }

    /// Submit the input buffer
    pub async fn submit(&mut self) -> anyhow::Result<()> {
        self.conductor.handle_event(SurfaceEvent::Submit).await
    }

    /// Send a user message to the Conductor
    pub async fn send_message(&mut self, content: String) -> anyhow::Result<()> {
        self.conductor
            .handle_event(SurfaceEvent::UserMessage { content })
            .await
    }

    /// Switch request mode
    pub async fn set_mode(&mut self, mode: Mode) -> anyhow::Result<()> {
        self.conductor
            .handle_event(SurfaceEvent::SetMode { mode })
            .await
    }

    /// Select a file for upload
    pub async fn select_file(&mut self, path: PathBuf) -> anyhow::Result<()> {
        self.conductor
            .handle_event(SurfaceEvent::SelectFile { path })
            .await
    }

    /// Upload the selected file
    pub async fn upload(&mut self) -> anyhow::Result<()> {
        self.conductor.handle_event(SurfaceEvent::Upload).await
    }

    /// Ask to clear the conversation
    pub async fn request_reset(&mut self) -> anyhow::Result<()> {
        self.conductor
            .handle_event(SurfaceEvent::ResetRequested)
            .await
    }

    /// Answer the reset confirmation
    pub async fn answer_reset(&mut self, confirmed: bool) -> anyhow::Result<()> {
        self.conductor
            .handle_event(SurfaceEvent::ResetAnswered { confirmed })
            .await
    }

    /// Notify Conductor that user wants to quit
    pub async fn request_quit(&mut self) -> anyhow::Result<()> {
        self.conductor
            .handle_event(SurfaceEvent::QuitRequested)
            .await
    }

    /// Apply finished backend calls (must be called regularly)
    pub async fn poll_completions(&mut self) -> bool {
        self.conductor.poll_completions().await
    }

    /// Wait for the next backend call to finish and apply it
    pub async fn next_completion(&mut self) {
        self.conductor.next_completion().await;
    }

    /// Receive all pending messages from the Conductor (non-blocking)
    pub fn recv_all(&mut self) -> Vec<ConductorMessage> {
        let mut messages = Vec::new();
        while let Ok(msg) = self.rx.try_recv() {
            messages.push(msg);
        }
        messages
    }

    /// The embedded Conductor
    pub fn conductor(&self) -> &Conductor<B> {
        &self.conductor
    }
}
