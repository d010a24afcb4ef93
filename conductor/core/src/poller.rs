//! Status Poller
//!
//! Waits for the backend to finish processing an uploaded document. The
//! poller is an explicit loop rather than self-rescheduling callbacks: it
//! checks a [`CancellationToken`] before every wait and every query, so a
//! reset or shutdown stops it deterministically.
//!
//! # State Machine
//!
//! ```text
//!            ┌──────────── processing ───────────┐
//!            ▼                                   │
//!   wait(interval) ──► POST /status ─────────────┤
//!                                                ├── done ──► GET /reset_status ──► Done
//!                                                ├── other ─────────────────────► Finished
//!                                                └── error ─────────────────────► Failed
//! ```

use std::time::Duration;

use serde::{Deserialize, Serialize};
use tokio_util::sync::CancellationToken;

use crate::backend::{BackendError, ChatBackend, RemoteStatus};

/// Whether the backend ingests documents in the background
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProcessingMode {
    /// Upload returns immediately; poll `/status` until done
    #[default]
    Async,
    /// Upload returns once ingestion is finished; no polling
    Sync,
}

/// Polling configuration
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PollConfig {
    /// Delay before each status query
    pub interval: Duration,
    /// Give up after this many queries (0 = never)
    pub max_polls: u32,
    /// Background or inline ingestion
    pub processing: ProcessingMode,
}

impl Default for PollConfig {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(5),
            max_polls: 0,
            processing: ProcessingMode::Async,
        }
    }
}

/// Progress reported while polling
#[derive(Debug)]
pub enum PollEvent {
    /// Backend is still processing
    Processing,
    /// Backend finished and was acknowledged
    Done,
    /// Backend reported some other status; polling stopped
    Finished(String),
    /// Status query failed; polling stopped
    Failed(BackendError),
}

/// How a poll chain ended
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PollOutcome {
    /// Reached `done`
    Done,
    /// Reached a non-processing, non-done status
    Finished,
    /// Transport error or poll limit
    Failed,
    /// Cancelled before reaching a terminal state
    Cancelled,
}

/// Cancellable status polling loop
#[derive(Clone, Debug, Default)]
pub struct StatusPoller {
    config: PollConfig,
}

impl StatusPoller {
    /// Create a poller
    #[must_use]
    pub fn new(config: PollConfig) -> Self {
        Self { config }
    }

    /// Poll until a terminal status, an error, or cancellation
    ///
    /// Every intermediate and terminal state is passed to `emit`. Nothing is
    /// emitted after cancellation.
    pub async fn run<B>(
        &self,
        backend: &B,
        cancel: &CancellationToken,
        mut emit: impl FnMut(PollEvent),
    ) -> PollOutcome
    where
        B: ChatBackend + ?Sized,
    {
        let mut polls: u32 = 0;

        loop {
            if self.config.max_polls > 0 && polls >= self.config.max_polls {
                tracing::warn!(polls, "Giving up on document status");
                emit(PollEvent::Failed(BackendError::PollLimit(polls)));
                return PollOutcome::Failed;
            }

            tokio::select! {
                () = cancel.cancelled() => return PollOutcome::Cancelled,
                () = tokio::time::sleep(self.config.interval) => {}
            }

            let status = tokio::select! {
                () = cancel.cancelled() => return PollOutcome::Cancelled,
                status = backend.status() => status,
            };
            polls += 1;

            match status {
                Ok(RemoteStatus::Processing) => {
                    tracing::debug!(polls, "Document still processing");
                    emit(PollEvent::Processing);
                }
                Ok(RemoteStatus::Done) => {
                    if let Err(e) = backend.reset_status().await {
                        tracing::warn!(error = %e, "Failed to acknowledge finished document");
                    }
                    if cancel.is_cancelled() {
                        return PollOutcome::Cancelled;
                    }
                    tracing::info!(polls, "Document processing finished");
                    emit(PollEvent::Done);
                    return PollOutcome::Done;
                }
                Ok(RemoteStatus::Other(status)) => {
                    tracing::info!(status = %status, "Document processing ended without completion");
                    emit(PollEvent::Finished(status));
                    return PollOutcome::Finished;
                }
                Err(e) => {
                    tracing::warn!(error = %e, "Status check failed");
                    emit(PollEvent::Failed(e));
                    return PollOutcome::Failed;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::VecDeque;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    use async_trait::async_trait;

    use super::*;
    use crate::backend::{ConversationRequest, ReplyBody, UploadFile};

    /// Backend that replays a scripted status sequence
    struct ScriptedBackend {
        statuses: Mutex<VecDeque<Result<RemoteStatus, BackendError>>>,
        status_calls: AtomicUsize,
        reset_calls: AtomicUsize,
    }

    impl ScriptedBackend {
        fn new(statuses: Vec<Result<RemoteStatus, BackendError>>) -> Self {
            Self {
                statuses: Mutex::new(statuses.into()),
                status_calls: AtomicUsize::new(0),
                reset_calls: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait]
    impl ChatBackend for ScriptedBackend {
        fn name(&self) -> &str {
            "Scripted"
        }

        async fn health_check(&self) -> bool {
            true
        }

        async fn converse(&self, _request: &ConversationRequest) -> Result<ReplyBody, BackendError> {
            Ok("unused".into())
        }

        async fn upload(&self, _file: UploadFile) -> Result<(), BackendError> {
            Ok(())
        }

        async fn status(&self) -> Result<RemoteStatus, BackendError> {
            self.status_calls.fetch_add(1, Ordering::SeqCst);
            self.statuses
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or(Ok(RemoteStatus::Processing))
        }

        async fn reset_status(&self) -> Result<(), BackendError> {
            self.reset_calls.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }
    }

    fn event_names(events: &[PollEvent]) -> Vec<&'static str> {
        events
            .iter()
            .map(|e| match e {
                PollEvent::Processing => "processing",
                PollEvent::Done => "done",
                PollEvent::Finished(_) => "finished",
                PollEvent::Failed(_) => "failed",
            })
            .collect()
    }

    #[tokio::test(start_paused = true)]
    async fn test_processing_then_done() {
        let backend = ScriptedBackend::new(vec![
            Ok(RemoteStatus::Processing),
            Ok(RemoteStatus::Processing),
            Ok(RemoteStatus::Done),
        ]);
        let mut events = Vec::new();

        let outcome = StatusPoller::default()
            .run(&backend, &CancellationToken::new(), |e| events.push(e))
            .await;

        assert_eq!(outcome, PollOutcome::Done);
        assert_eq!(event_names(&events), vec!["processing", "processing", "done"]);
        assert_eq!(backend.status_calls.load(Ordering::SeqCst), 3);
        assert_eq!(backend.reset_calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_waits_interval_before_each_query() {
        let backend = ScriptedBackend::new(vec![Ok(RemoteStatus::Processing), Ok(RemoteStatus::Done)]);
        let start = tokio::time::Instant::now();

        StatusPoller::default()
            .run(&backend, &CancellationToken::new(), |_| {})
            .await;

        assert!(start.elapsed() >= Duration::from_secs(10));
    }

    #[tokio::test(start_paused = true)]
    async fn test_other_status_is_terminal() {
        let backend = ScriptedBackend::new(vec![Ok(RemoteStatus::Other("idle".to_string()))]);
        let mut events = Vec::new();

        let outcome = StatusPoller::default()
            .run(&backend, &CancellationToken::new(), |e| events.push(e))
            .await;

        assert_eq!(outcome, PollOutcome::Finished);
        assert_eq!(event_names(&events), vec!["finished"]);
        assert_eq!(backend.reset_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_transport_error_stops_polling() {
        let backend = ScriptedBackend::new(vec![
            Ok(RemoteStatus::Processing),
            Err(BackendError::Status {
                status: 502,
                body: String::new(),
            }),
            Ok(RemoteStatus::Done),
        ]);
        let mut events = Vec::new();

        let outcome = StatusPoller::default()
            .run(&backend, &CancellationToken::new(), |e| events.push(e))
            .await;

        assert_eq!(outcome, PollOutcome::Failed);
        assert_eq!(event_names(&events), vec!["processing", "failed"]);
        assert_eq!(backend.status_calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancelled_before_first_query() {
        let backend = ScriptedBackend::new(vec![Ok(RemoteStatus::Done)]);
        let cancel = CancellationToken::new();
        cancel.cancel();
        let mut events = Vec::new();

        let outcome = StatusPoller::default()
            .run(&backend, &cancel, |e| events.push(e))
            .await;

        assert_eq!(outcome, PollOutcome::Cancelled);
        assert!(events.is_empty());
        assert_eq!(backend.status_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_poll_limit() {
        let backend = ScriptedBackend::new(vec![]);
        let poller = StatusPoller::new(PollConfig {
            max_polls: 3,
            ..Default::default()
        });
        let mut events = Vec::new();

        let outcome = poller
            .run(&backend, &CancellationToken::new(), |e| events.push(e))
            .await;

        assert_eq!(outcome, PollOutcome::Failed);
        assert_eq!(
            event_names(&events),
            vec!["processing", "processing", "processing", "failed"]
        );
        assert!(matches!(events.last(), Some(PollEvent::Failed(BackendError::PollLimit(3)))));
    }
}
