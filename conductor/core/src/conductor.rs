//! Conductor - The Orchestration Core
//!
//! The Conductor owns the conversation and upload controllers and is the only
//! place their state changes. It:
//! - turns `SurfaceEvent`s into controller commands
//! - spawns backend calls as tasks
//! - applies the completions of those tasks in arrival order
//! - reports every state change to the surface as a `ConductorMessage`
//!
//! # Concurrency
//!
//! Spawned tasks never touch controller state. They send their results back
//! over an internal channel tagged with the session epoch, and the Conductor
//! applies them one at a time, so a reply and a poll result that finish at
//! the same moment cannot interleave their history edits. A reset bumps the
//! epoch and cancels the session token: in-flight requests and the poll chain
//! stop, and anything they already queued is discarded.

use std::path::Path;
use std::sync::Arc;

use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use crate::backend::{BackendError, ChatBackend, ReplyBody, UploadFile};
use crate::conversation::{ConversationController, PendingSend, ValidationError};
use crate::events::SurfaceEvent;
use crate::locale::{Locale, Strings};
use crate::messages::{ChatSnapshot, ConductorMessage, Mode, NotifyLevel};
use crate::poller::{PollConfig, PollEvent, ProcessingMode, StatusPoller};
use crate::upload::{PendingUpload, StatusDisplay, UploadController};

/// Conductor configuration
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ConductorConfig {
    /// Initial request mode
    pub mode: Mode,
    /// Language for user-facing text
    pub locale: Locale,
    /// Where upload progress is shown
    pub status_display: StatusDisplay,
    /// Status polling behaviour
    pub poll: PollConfig,
}

/// Result of a spawned backend call
enum Completion {
    Health(bool),
    Reply(Result<ReplyBody, BackendError>),
    Uploaded(Result<(), BackendError>),
    Poll(PollEvent),
}

/// A completion stamped with the session it belongs to
struct Tagged {
    epoch: u64,
    completion: Completion,
}

/// The Conductor - headless orchestration core
pub struct Conductor<B: ChatBackend> {
    /// Configuration
    config: ConductorConfig,
    /// Chat backend
    backend: Arc<B>,
    /// User-facing strings
    strings: Strings,
    /// History, input, loading flag and mode
    conversation: ConversationController,
    /// Selection, uploading flag and status
    upload: UploadController,
    /// Channel to send messages to UI surface
    tx: mpsc::Sender<ConductorMessage>,
    /// Completions from spawned tasks
    completion_tx: mpsc::UnboundedSender<Tagged>,
    completion_rx: mpsc::UnboundedReceiver<Tagged>,
    /// Bumped on every reset; completions from older epochs are dropped
    epoch: u64,
    /// Cancels every task spawned in the current epoch
    session_cancel: CancellationToken,
    /// Waiting for the user to answer the reset prompt
    reset_pending: bool,
    /// Cleared by shutdown
    running: bool,
}

impl<B: ChatBackend + 'static> Conductor<B> {
    /// Create a new Conductor with the given backend
    pub fn new(backend: B, config: ConductorConfig, tx: mpsc::Sender<ConductorMessage>) -> Self {
        let (completion_tx, completion_rx) = mpsc::unbounded_channel();

        Self {
            strings: Strings::new(config.locale),
            conversation: ConversationController::new(config.mode),
            upload: UploadController::new(),
            config,
            backend: Arc::new(backend),
            tx,
            completion_tx,
            completion_rx,
            epoch: 0,
            session_cancel: CancellationToken::new(),
            reset_pending: false,
            running: true,
        }
    }

    /// Conversation state
    pub fn conversation(&self) -> &ConversationController {
        &self.conversation
    }

    /// Upload state
    pub fn upload(&self) -> &UploadController {
        &self.upload
    }

    /// User-facing strings
    pub fn strings(&self) -> &Strings {
        &self.strings
    }

    /// Whether a reset confirmation is outstanding
    pub fn is_reset_pending(&self) -> bool {
        self.reset_pending
    }

    /// Whether shutdown has been requested
    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Full client state
    pub fn snapshot(&self) -> ChatSnapshot {
        ChatSnapshot {
            messages: self.conversation.history().messages().to_vec(),
            input: self.conversation.input().to_string(),
            loading: self.conversation.is_loading(),
            mode: self.conversation.mode(),
            upload: self.upload.snapshot(),
            status: self.upload.status(),
            status_text: self.upload.status_text().to_string(),
        }
    }

    /// Start the Conductor
    ///
    /// Checks in the background that the backend is reachable. The result
    /// arrives as a completion and warns the surface if the check failed.
    pub async fn start(&mut self) -> anyhow::Result<()> {
        let backend = Arc::clone(&self.backend);
        let tx = self.completion_tx.clone();
        let cancel = self.session_cancel.clone();
        let epoch = self.epoch;

        tokio::spawn(async move {
            let reachable = tokio::select! {
                () = cancel.cancelled() => return,
                reachable = backend.health_check() => reachable,
            };
            let _ = tx.send(Tagged {
                epoch,
                completion: Completion::Health(reachable),
            });
        });
        Ok(())
    }

    /// Handle an event from the UI surface
    pub async fn handle_event(&mut self, event: SurfaceEvent) -> anyhow::Result<()> {
        match event {
            SurfaceEvent::Connected => {
                self.send(ConductorMessage::Snapshot {
                    snapshot: self.snapshot(),
                })
                .await;
            }

            SurfaceEvent::Disconnected => {
                tracing::debug!("Surface disconnected");
            }

            SurfaceEvent::InputChanged { text } => {
                self.conversation.set_input(text.clone());
                self.send(ConductorMessage::InputChanged { text }).await;
            }

            SurfaceEvent::Submit => {
                let text = self.conversation.input().to_string();
                self.send_message(text).await;
            }

            SurfaceEvent::UserMessage { content } => {
                self.send_message(content).await;
            }

            SurfaceEvent::SetMode { mode } => {
                self.conversation.set_mode(mode);
                self.send(ConductorMessage::ModeChanged { mode }).await;
            }

            SurfaceEvent::SelectFile { path } => {
                let pending = self.upload.select_file(path);
                tracing::debug!(file = %pending.file_name, "File selected");
                self.publish_upload().await;
            }

            SurfaceEvent::Upload => {
                self.start_upload().await;
            }

            SurfaceEvent::ResetRequested => {
                self.reset_pending = true;
                self.send(ConductorMessage::ConfirmReset {
                    text: self.strings.confirm_reset(),
                })
                .await;
            }

            SurfaceEvent::ResetAnswered { confirmed } => {
                if self.reset_pending {
                    self.reset_pending = false;
                    if confirmed {
                        self.reset().await;
                    }
                } else {
                    tracing::debug!("Reset answer without a pending prompt");
                }
            }

            SurfaceEvent::QuitRequested => {
                self.shutdown().await?;
            }
        }

        Ok(())
    }

    /// Validate, append the user message and post it
    async fn send_message(&mut self, text: String) {
        let PendingSend { message, request } = match self.conversation.begin_send(&text) {
            Ok(pending) => pending,
            Err(reason) => {
                tracing::debug!(reason = %reason, "Send ignored");
                return;
            }
        };

        self.send(ConductorMessage::MessageAdded { message }).await;
        self.send(ConductorMessage::InputChanged {
            text: String::new(),
        })
        .await;
        self.send(ConductorMessage::Loading { loading: true }).await;

        let backend = Arc::clone(&self.backend);
        let tx = self.completion_tx.clone();
        let cancel = self.session_cancel.clone();
        let epoch = self.epoch;

        tokio::spawn(async move {
            let result = tokio::select! {
                () = cancel.cancelled() => return,
                result = backend.converse(&request) => result,
            };
            let _ = tx.send(Tagged {
                epoch,
                completion: Completion::Reply(result),
            });
        });
    }

    /// Validate the selection and start the upload task
    async fn start_upload(&mut self) {
        let pending = match self.upload.begin_upload(&self.strings) {
            Ok(pending) => pending,
            Err(ValidationError::NoFileSelected) => {
                self.send(ConductorMessage::Prompt {
                    text: self.strings.choose_file(),
                })
                .await;
                return;
            }
            Err(reason) => {
                tracing::debug!(reason = %reason, "Upload ignored");
                return;
            }
        };

        tracing::info!(file = %pending.file_name, "Uploading document");

        if self.config.status_display == StatusDisplay::ChatMessage {
            let placeholder = self.conversation.push_bot(self.upload.status_text());
            self.upload.set_placeholder(placeholder.id.clone());
            self.send(ConductorMessage::MessageAdded {
                message: placeholder,
            })
            .await;
        }
        self.publish_upload().await;
        self.publish_status().await;

        self.spawn_upload(pending);
    }

    /// Upload, then poll until the backend finishes (async processing only)
    fn spawn_upload(&self, pending: PendingUpload) {
        let backend = Arc::clone(&self.backend);
        let tx = self.completion_tx.clone();
        let cancel = self.session_cancel.clone();
        let epoch = self.epoch;
        let poller = StatusPoller::new(self.config.poll.clone());
        let poll_after_upload = self.config.poll.processing == ProcessingMode::Async;

        tokio::spawn(async move {
            let result = tokio::select! {
                () = cancel.cancelled() => return,
                result = upload_from_path(backend.as_ref(), &pending.path) => result,
            };
            let uploaded = result.is_ok();
            let delivered = tx
                .send(Tagged {
                    epoch,
                    completion: Completion::Uploaded(result),
                })
                .is_ok();

            if !(uploaded && delivered && poll_after_upload) {
                return;
            }

            poller
                .run(backend.as_ref(), &cancel, |event| {
                    let _ = tx.send(Tagged {
                        epoch,
                        completion: Completion::Poll(event),
                    });
                })
                .await;
        });
    }

    /// Apply one completion from a spawned task
    async fn apply_completion(&mut self, tagged: Tagged) {
        // A reset does not make the health result stale
        let health = matches!(tagged.completion, Completion::Health(_));
        if tagged.epoch != self.epoch && !health {
            tracing::debug!(
                epoch = tagged.epoch,
                current = self.epoch,
                "Dropping completion from a previous session"
            );
            return;
        }

        match tagged.completion {
            Completion::Health(true) => {
                tracing::info!(backend = self.backend.name(), "Backend reachable");
            }

            Completion::Health(false) => {
                tracing::warn!(backend = self.backend.name(), "Backend not reachable");
                self.notify(NotifyLevel::Warning, self.strings.backend_unavailable())
                    .await;
            }

            Completion::Reply(result) => {
                let message = self.conversation.complete_send(result, &self.strings);
                self.send(ConductorMessage::MessageAdded { message }).await;
                self.send(ConductorMessage::Loading { loading: false }).await;
            }

            Completion::Uploaded(Ok(())) => {
                tracing::info!("Upload accepted");
                if self.config.poll.processing == ProcessingMode::Sync {
                    self.apply_poll_event(PollEvent::Done).await;
                } else {
                    self.upload.processing(&self.strings);
                    self.publish_status().await;
                }
            }

            Completion::Uploaded(Err(e)) => {
                tracing::warn!(error = %e, "Upload failed");
                self.upload.upload_failed();
                let text = self.strings.upload_failed(&e.to_string());
                self.post_upload_outcome(text).await;
                self.publish_upload().await;
                self.publish_status().await;
            }

            Completion::Poll(event) => {
                self.apply_poll_event(event).await;
            }
        }
    }

    /// Apply a poll transition to the upload controller
    async fn apply_poll_event(&mut self, event: PollEvent) {
        match event {
            PollEvent::Processing => {
                self.upload.processing(&self.strings);
                self.publish_status().await;
            }

            PollEvent::Done => {
                let file_name = self.upload.completed();
                tracing::info!(file = %file_name, "Document ready");
                let text = self.strings.upload_complete(&file_name);
                self.post_upload_outcome(text).await;
                self.publish_upload().await;
                self.publish_status().await;
            }

            PollEvent::Finished(status) => {
                tracing::debug!(status = %status, "Processing ended");
                self.upload.finished_other();
                if let Some(id) = self.upload.take_placeholder() {
                    if self.conversation.history_mut().remove(&id) {
                        self.send(ConductorMessage::MessageRemoved { id }).await;
                    }
                }
                self.publish_upload().await;
                self.publish_status().await;
            }

            PollEvent::Failed(e) => {
                tracing::warn!(error = %e, "Document status polling stopped");
                self.upload.poll_failed(&self.strings);
                self.publish_status().await;
                self.upload.take_placeholder();
                self.publish_upload().await;
            }
        }
    }

    /// Show the final upload outcome, replacing the placeholder if there is one
    async fn post_upload_outcome(&mut self, text: String) {
        if let Some(id) = self.upload.take_placeholder() {
            if self.conversation.history_mut().replace(&id, text.clone()) {
                self.send(ConductorMessage::MessageReplaced { id, text }).await;
                return;
            }
        }
        let message = self.conversation.push_bot(text);
        self.send(ConductorMessage::MessageAdded { message }).await;
    }

    /// Clear the conversation after confirmation
    async fn reset(&mut self) {
        self.session_cancel.cancel();
        self.session_cancel = CancellationToken::new();
        self.epoch += 1;

        self.conversation.reset();
        self.upload.reset();
        tracing::info!(epoch = self.epoch, "Conversation reset");

        self.send(ConductorMessage::HistoryCleared).await;
        self.send(ConductorMessage::InputChanged {
            text: String::new(),
        })
        .await;
        self.send(ConductorMessage::Loading { loading: false }).await;
        self.publish_upload().await;
        self.publish_status().await;
    }

    /// Shut down the Conductor, cancelling all background work
    pub async fn shutdown(&mut self) -> anyhow::Result<()> {
        self.running = false;
        self.session_cancel.cancel();
        self.send(ConductorMessage::Quit).await;
        Ok(())
    }

    /// Apply every completion that is ready, without waiting
    ///
    /// Returns true if anything was applied.
    pub async fn poll_completions(&mut self) -> bool {
        let mut ready = Vec::new();
        while let Ok(tagged) = self.completion_rx.try_recv() {
            ready.push(tagged);
        }

        if ready.is_empty() {
            return false;
        }

        for tagged in ready {
            self.apply_completion(tagged).await;
        }
        true
    }

    /// Wait for the next completion and apply it
    pub async fn next_completion(&mut self) {
        if let Some(tagged) = self.completion_rx.recv().await {
            self.apply_completion(tagged).await;
        }
    }

    /// Own the Conductor on one task until the surface quits
    ///
    /// Surface events and task completions are applied strictly one at a
    /// time. Dropping the event sender shuts the Conductor down.
    pub async fn run(mut self, mut events: mpsc::Receiver<SurfaceEvent>) -> anyhow::Result<()> {
        self.start().await?;

        while self.running {
            tokio::select! {
                event = events.recv() => match event {
                    Some(event) => self.handle_event(event).await?,
                    None => self.shutdown().await?,
                },
                Some(tagged) = self.completion_rx.recv() => {
                    self.apply_completion(tagged).await;
                }
            }
        }

        Ok(())
    }

    async fn publish_upload(&self) {
        self.send(ConductorMessage::UploadState {
            upload: self.upload.snapshot(),
        })
        .await;
    }

    /// Report the status line, mirroring it into the placeholder message
    async fn publish_status(&mut self) {
        let text = self.upload.status_text().to_string();
        self.send(ConductorMessage::Status {
            status: self.upload.status(),
            text: text.clone(),
        })
        .await;

        let Some(id) = self.upload.placeholder().cloned() else {
            return;
        };
        let changed = self
            .conversation
            .history()
            .get(&id)
            .is_some_and(|m| m.text != text);
        if !text.is_empty() && changed {
            self.conversation.history_mut().replace(&id, text.clone());
            self.send(ConductorMessage::MessageReplaced { id, text }).await;
        }
    }

    /// Send notification
    async fn notify(&self, level: NotifyLevel, message: String) {
        self.send(ConductorMessage::Notify { level, message }).await;
    }

    /// Send a message to the UI surface
    async fn send(&self, msg: ConductorMessage) {
        if let Err(e) = self.tx.send(msg).await {
            tracing::warn!("Failed to send message to surface: {}", e);
        }
    }
}

impl<B: ChatBackend> Drop for Conductor<B> {
    fn drop(&mut self) {
        self.session_cancel.cancel();
    }
}

/// Read a file and post it
async fn upload_from_path<B>(backend: &B, path: &Path) -> Result<(), BackendError>
where
    B: ChatBackend + ?Sized,
{
    let file = UploadFile::from_path(path).await?;
    backend.upload(file).await
}
