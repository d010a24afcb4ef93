//! Upload Controller
//!
//! Tracks the selected file, the uploading flag, the active document and the
//! processing status line. The controller never performs I/O; the Conductor
//! drives it from upload and poll completions.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::conversation::ValidationError;
use crate::locale::Strings;
use crate::messages::{MessageId, ProcessingStatus, UploadSnapshot};

/// How upload progress is shown
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StatusDisplay {
    /// Dedicated status line
    #[default]
    StatusLine,
    /// A bot message that is rewritten in place as status changes
    ChatMessage,
}

/// A file chosen but not yet ingested
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PendingUpload {
    /// Path on disk
    pub path: PathBuf,
    /// Name shown to the user and sent to the backend
    pub file_name: String,
}

impl PendingUpload {
    /// Create from a path
    pub fn new(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let file_name = path
            .file_name()
            .map_or_else(|| path.display().to_string(), |n| n.to_string_lossy().into_owned());
        Self { path, file_name }
    }
}

/// Extension filter applied by surfaces when the user picks a file
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FileFilter {
    extensions: Vec<String>,
}

impl FileFilter {
    /// Accept the given extensions (case-insensitive, without dots)
    pub fn new<I, S>(extensions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            extensions: extensions
                .into_iter()
                .map(|e| e.as_ref().trim_start_matches('.').to_lowercase())
                .collect(),
        }
    }

    /// Whether a path passes the filter; an empty filter accepts everything
    #[must_use]
    pub fn accepts(&self, path: &Path) -> bool {
        if self.extensions.is_empty() {
            return true;
        }
        path.extension()
            .and_then(|e| e.to_str())
            .is_some_and(|ext| self.extensions.iter().any(|a| a.eq_ignore_ascii_case(ext)))
    }

    /// Accepted extensions
    #[must_use]
    pub fn extensions(&self) -> &[String] {
        &self.extensions
    }
}

impl Default for FileFilter {
    fn default() -> Self {
        Self::new(["pdf"])
    }
}

/// Upload state and transitions
#[derive(Debug, Default)]
pub struct UploadController {
    pending: Option<PendingUpload>,
    /// File currently being uploaded or processed
    in_flight: Option<String>,
    uploading: bool,
    active_document: Option<String>,
    status: ProcessingStatus,
    status_text: String,
    placeholder: Option<MessageId>,
}

impl UploadController {
    /// Create an idle controller
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the selected file unconditionally
    pub fn select_file(&mut self, path: impl Into<PathBuf>) -> &PendingUpload {
        self.pending.insert(PendingUpload::new(path))
    }

    /// Validate and start an upload
    ///
    /// # Errors
    ///
    /// [`ValidationError::NoFileSelected`] without a selection and
    /// [`ValidationError::UploadInFlight`] while an upload or poll chain runs.
    pub fn begin_upload(&mut self, strings: &Strings) -> Result<PendingUpload, ValidationError> {
        if self.uploading {
            return Err(ValidationError::UploadInFlight);
        }
        let pending = self.pending.clone().ok_or(ValidationError::NoFileSelected)?;

        self.uploading = true;
        self.in_flight = Some(pending.file_name.clone());
        self.status = ProcessingStatus::Uploading;
        self.status_text = strings.uploading(&pending.file_name);

        Ok(pending)
    }

    /// Remember the chat message that mirrors the status line
    pub fn set_placeholder(&mut self, id: MessageId) {
        self.placeholder = Some(id);
    }

    /// Chat message mirroring the status line, if any
    #[must_use]
    pub fn placeholder(&self) -> Option<&MessageId> {
        self.placeholder.as_ref()
    }

    /// Forget and return the status placeholder
    pub fn take_placeholder(&mut self) -> Option<MessageId> {
        self.placeholder.take()
    }

    /// Upload request failed; the selection is kept for a retry
    pub fn upload_failed(&mut self) {
        self.uploading = false;
        self.in_flight = None;
        self.status = ProcessingStatus::Error;
        self.status_text.clear();
    }

    /// Backend reports the document is still being processed
    pub fn processing(&mut self, strings: &Strings) {
        let name = self.in_flight.as_deref().unwrap_or_default();
        self.status = ProcessingStatus::Processing;
        self.status_text = strings.processing(name);
    }

    /// Backend finished the document; returns its name
    pub fn completed(&mut self) -> String {
        let name = self
            .in_flight
            .take()
            .or_else(|| self.pending.as_ref().map(|p| p.file_name.clone()))
            .unwrap_or_default();
        self.active_document = Some(name.clone());
        self.pending = None;
        self.uploading = false;
        self.status = ProcessingStatus::Done;
        self.status_text.clear();
        name
    }

    /// Poll ended in a status that is neither processing nor done
    pub fn finished_other(&mut self) {
        self.uploading = false;
        self.in_flight = None;
        self.status = ProcessingStatus::Idle;
        self.status_text.clear();
    }

    /// Status check failed; polling has stopped
    pub fn poll_failed(&mut self, strings: &Strings) {
        self.uploading = false;
        self.in_flight = None;
        self.status = ProcessingStatus::Error;
        self.status_text = strings.status_check_failed();
    }

    /// Clear selection, flags and status text; the active document stays
    pub fn reset(&mut self) {
        self.pending = None;
        self.in_flight = None;
        self.uploading = false;
        self.status = ProcessingStatus::Idle;
        self.status_text.clear();
        self.placeholder = None;
    }

    /// Selected file
    #[must_use]
    pub fn pending(&self) -> Option<&PendingUpload> {
        self.pending.as_ref()
    }

    /// Whether an upload or poll chain is in flight
    #[must_use]
    pub fn is_uploading(&self) -> bool {
        self.uploading
    }

    /// Last ingested document
    #[must_use]
    pub fn active_document(&self) -> Option<&str> {
        self.active_document.as_deref()
    }

    /// Processing status
    #[must_use]
    pub fn status(&self) -> ProcessingStatus {
        self.status
    }

    /// Status line text
    #[must_use]
    pub fn status_text(&self) -> &str {
        &self.status_text
    }

    /// Snapshot for surfaces
    #[must_use]
    pub fn snapshot(&self) -> UploadSnapshot {
        UploadSnapshot {
            pending: self.pending.as_ref().map(|p| p.file_name.clone()),
            uploading: self.uploading,
            active_document: self.active_document.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_upload_requires_selection() {
        let strings = Strings::default();
        let mut upload = UploadController::new();
        assert_eq!(
            upload.begin_upload(&strings).unwrap_err(),
            ValidationError::NoFileSelected
        );
        assert!(!upload.is_uploading());
        assert_eq!(upload.status(), ProcessingStatus::Idle);
    }

    #[test]
    fn test_selection_replaced_wholesale() {
        let mut upload = UploadController::new();
        upload.select_file("/docs/a.pdf");
        upload.select_file("/docs/b.pdf");
        assert_eq!(upload.pending().unwrap().file_name, "b.pdf");
    }

    #[test]
    fn test_duplicate_upload_suppressed() {
        let strings = Strings::default();
        let mut upload = UploadController::new();
        upload.select_file("/docs/a.pdf");
        upload.begin_upload(&strings).unwrap();
        assert_eq!(
            upload.begin_upload(&strings).unwrap_err(),
            ValidationError::UploadInFlight
        );
    }

    #[test]
    fn test_completion_sets_active_document() {
        let strings = Strings::default();
        let mut upload = UploadController::new();
        upload.select_file("/docs/tor.pdf");
        upload.begin_upload(&strings).unwrap();
        upload.processing(&strings);
        assert_eq!(upload.status(), ProcessingStatus::Processing);
        assert!(upload.status_text().contains("tor.pdf"));

        assert_eq!(upload.completed(), "tor.pdf");
        assert_eq!(upload.active_document(), Some("tor.pdf"));
        assert!(upload.pending().is_none());
        assert!(!upload.is_uploading());
        assert_eq!(upload.status_text(), "");
    }

    #[test]
    fn test_completion_names_in_flight_file() {
        let strings = Strings::default();
        let mut upload = UploadController::new();
        upload.select_file("/docs/first.pdf");
        upload.begin_upload(&strings).unwrap();
        upload.select_file("/docs/second.pdf");

        assert_eq!(upload.completed(), "first.pdf");
        assert_eq!(upload.active_document(), Some("first.pdf"));
        assert!(upload.pending().is_none());
    }

    #[test]
    fn test_upload_failure_keeps_selection() {
        let strings = Strings::default();
        let mut upload = UploadController::new();
        upload.select_file("/docs/a.pdf");
        upload.begin_upload(&strings).unwrap();
        upload.upload_failed();

        assert!(!upload.is_uploading());
        assert_eq!(upload.status(), ProcessingStatus::Error);
        assert!(upload.pending().is_some());
    }

    #[test]
    fn test_poll_failure_sets_error_text() {
        let strings = Strings::default();
        let mut upload = UploadController::new();
        upload.select_file("/docs/a.pdf");
        upload.begin_upload(&strings).unwrap();
        upload.poll_failed(&strings);

        assert!(!upload.is_uploading());
        assert!(!upload.status_text().is_empty());
        assert!(upload.active_document().is_none());
    }

    #[test]
    fn test_file_filter() {
        let filter = FileFilter::default();
        assert!(filter.accepts(Path::new("/x/Report.PDF")));
        assert!(!filter.accepts(Path::new("/x/report.docx")));
        assert!(!filter.accepts(Path::new("/x/noext")));

        let open = FileFilter::new(Vec::<String>::new());
        assert!(open.accepts(Path::new("/x/anything.bin")));

        let dotted = FileFilter::new([".txt", "md"]);
        assert_eq!(dotted.extensions(), ["txt", "md"]);
    }
}
