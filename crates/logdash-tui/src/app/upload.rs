use std::path::PathBuf;

use ratatui::widgets::ListState;

use logdash_types::{UploadReceipt, UploadState, expand_home};

use super::TextField;

pub const UPLOAD_FAILED: &str = "Upload failed";
const UPLOADING: &str = "Uploading file...";
const UPLOADED: &str = "File uploaded successfully! Processing logs...";
const PROCESSED: &str = "Logs processed successfully!";
const PROCESS_FAILED: &str = "Failed to process logs.";
const STATUS_ERROR: &str = "Error checking upload status.";
const STOPPED_WAITING: &str = "Stopped waiting for processing.";

/// Where the current upload is in its lifecycle
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum UploadPhase {
    #[default]
    Idle,
    /// `POST /uploads/` in flight
    Uploading,
    /// Accepted by the server; polling its status
    Processing { upload_id: i64, checks: u32 },
    Completed,
    ProcessingFailed,
    /// The upload request itself was rejected
    UploadFailed,
    /// A status check failed
    StatusError,
    GaveUp,
    Cancelled,
}

impl UploadPhase {
    pub fn is_busy(&self) -> bool {
        matches!(self, Self::Uploading | Self::Processing { .. })
    }

    pub fn is_error(&self) -> bool {
        matches!(
            self,
            Self::ProcessingFailed | Self::UploadFailed | Self::StatusError | Self::GaveUp
        )
    }
}

/// State of the upload tab
#[derive(Debug, Default)]
pub struct UploadPanel {
    /// Path of the file to upload
    pub path: TextField,
    pub phase: UploadPhase,
    /// Status line shown under the form
    pub message: Option<String>,
    /// Most recent uploads, newest first
    pub recent: Vec<UploadReceipt>,
    pub list_state: ListState,
    /// A recent-uploads request is in flight
    pub loading_recent: bool,
}

impl UploadPanel {
    pub fn is_busy(&self) -> bool {
        self.phase.is_busy()
    }

    /// Upload id being polled
    pub fn polling_id(&self) -> Option<i64> {
        match self.phase {
            UploadPhase::Processing { upload_id, .. } => Some(upload_id),
            _ => None,
        }
    }

    /// Validate the path and enter the uploading phase.
    ///
    /// Returns `None` (with a message set) when nothing should be sent.
    pub fn begin(&mut self) -> Option<PathBuf> {
        if self.is_busy() {
            return None;
        }
        if self.path.is_blank() {
            self.fail_locally("Enter the path of a log file to upload");
            return None;
        }

        let path = expand_home(self.path.value().trim());
        if !path.is_file() {
            self.fail_locally(&format!("Error: {} is not a readable file", path.display()));
            return None;
        }

        self.phase = UploadPhase::Uploading;
        self.message = Some(UPLOADING.to_string());
        Some(path)
    }

    fn fail_locally(&mut self, message: &str) {
        self.phase = UploadPhase::UploadFailed;
        self.message = Some(message.to_string());
    }

    /// The server accepted the file
    pub fn accepted(&mut self, receipt: &UploadReceipt) {
        self.phase = UploadPhase::Processing {
            upload_id: receipt.id,
            checks: 0,
        };
        self.message = Some(UPLOADED.to_string());
    }

    /// The upload request failed; `banner` is the server detail or fallback
    pub fn upload_failed(&mut self, banner: &str) {
        self.phase = UploadPhase::UploadFailed;
        self.message = Some(format!("Error: {banner}"));
    }

    /// A non-terminal status came back
    pub fn status_checked(&mut self, attempt: u32) {
        if let UploadPhase::Processing { checks, .. } = &mut self.phase {
            *checks = attempt;
        }
    }

    /// Processing reached a terminal state
    pub fn finished(&mut self, state: UploadState) {
        if state == UploadState::Completed {
            self.phase = UploadPhase::Completed;
            self.message = Some(PROCESSED.to_string());
        } else {
            self.phase = UploadPhase::ProcessingFailed;
            self.message = Some(PROCESS_FAILED.to_string());
        }
    }

    pub fn status_failed(&mut self) {
        self.phase = UploadPhase::StatusError;
        self.message = Some(STATUS_ERROR.to_string());
    }

    pub fn gave_up(&mut self, attempts: u32) {
        self.phase = UploadPhase::GaveUp;
        self.message = Some(format!(
            "Still processing after {attempts} checks; stopped waiting."
        ));
    }

    /// Stop waiting for the current upload. Returns false if nothing was polled.
    pub fn cancel(&mut self) -> bool {
        if self.polling_id().is_none() {
            return false;
        }
        self.phase = UploadPhase::Cancelled;
        self.message = Some(STOPPED_WAITING.to_string());
        true
    }

    /// Gauge ratio for the current phase
    pub fn progress(&self) -> f64 {
        match self.phase {
            UploadPhase::Idle | UploadPhase::Cancelled => 0.0,
            UploadPhase::Uploading => 0.2,
            // Creep towards 90% while processing
            UploadPhase::Processing { checks, .. } => {
                0.4 + 0.5 * (1.0 - 1.0 / (1.0 + f64::from(checks) / 5.0))
            }
            UploadPhase::Completed
            | UploadPhase::ProcessingFailed
            | UploadPhase::UploadFailed
            | UploadPhase::StatusError
            | UploadPhase::GaveUp => 1.0,
        }
    }

    pub fn set_recent(&mut self, uploads: Vec<UploadReceipt>) {
        self.loading_recent = false;
        self.recent = uploads;
        let selected = if self.recent.is_empty() { None } else { Some(0) };
        self.list_state.select(selected);
    }

    pub fn recent_up(&mut self) {
        let len = self.recent.len();
        if len == 0 {
            return;
        }
        let i = match self.list_state.selected() {
            Some(0) | None => len - 1,
            Some(i) => i - 1,
        };
        self.list_state.select(Some(i));
    }

    pub fn recent_down(&mut self) {
        let len = self.recent.len();
        if len == 0 {
            return;
        }
        let i = match self.list_state.selected() {
            Some(i) if i + 1 < len => i + 1,
            _ => 0,
        };
        self.list_state.select(Some(i));
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn receipt(id: i64) -> UploadReceipt {
        UploadReceipt {
            id,
            filename: Some("app.log".to_string()),
            size: Some(10),
            status: UploadState::Processing,
            upload_timestamp: None,
        }
    }

    #[test]
    fn test_begin_requires_existing_file() {
        let mut panel = UploadPanel::default();
        assert!(panel.begin().is_none());
        assert_eq!(panel.phase, UploadPhase::UploadFailed);

        panel.path.set("/definitely/not/here.log");
        assert!(panel.begin().is_none());
        assert!(panel.message.as_deref().unwrap().contains("not a readable file"));
    }

    #[test]
    fn test_lifecycle_messages() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("app.log");
        std::fs::write(&file, "line\n").unwrap();

        let mut panel = UploadPanel::default();
        panel.path.set(file.to_string_lossy());

        assert_eq!(panel.begin(), Some(file.clone()));
        assert_eq!(panel.message.as_deref(), Some(UPLOADING));
        // Second submit while in flight is ignored
        assert!(panel.begin().is_none());

        panel.accepted(&receipt(9));
        assert_eq!(panel.polling_id(), Some(9));
        assert_eq!(panel.message.as_deref(), Some(UPLOADED));
        assert!(panel.begin().is_none());

        panel.status_checked(3);
        assert_eq!(
            panel.phase,
            UploadPhase::Processing {
                upload_id: 9,
                checks: 3
            }
        );

        panel.finished(UploadState::Completed);
        assert_eq!(panel.message.as_deref(), Some(PROCESSED));
        assert!(!panel.is_busy());
        assert_eq!(panel.progress(), 1.0);
    }

    #[test]
    fn test_failures() {
        let mut panel = UploadPanel::default();
        panel.upload_failed("File too large");
        assert_eq!(panel.message.as_deref(), Some("Error: File too large"));
        assert!(panel.phase.is_error());

        panel.accepted(&receipt(1));
        panel.finished(UploadState::Failed);
        assert_eq!(panel.message.as_deref(), Some(PROCESS_FAILED));

        panel.accepted(&receipt(2));
        panel.status_failed();
        assert_eq!(panel.message.as_deref(), Some(STATUS_ERROR));
    }

    #[test]
    fn test_cancel_only_while_polling() {
        let mut panel = UploadPanel::default();
        assert!(!panel.cancel());

        panel.accepted(&receipt(4));
        assert!(panel.cancel());
        assert_eq!(panel.phase, UploadPhase::Cancelled);
        assert!(panel.polling_id().is_none());
    }

    #[test]
    fn test_progress_stays_below_complete_while_processing() {
        let mut panel = UploadPanel::default();
        panel.accepted(&receipt(4));
        panel.status_checked(1000);
        assert!(panel.progress() < 0.9);
        assert!(panel.progress() > 0.4);
    }

    #[test]
    fn test_recent_selection_wraps() {
        let mut panel = UploadPanel::default();
        panel.set_recent(vec![receipt(1), receipt(2)]);
        assert_eq!(panel.list_state.selected(), Some(0));
        panel.recent_up();
        assert_eq!(panel.list_state.selected(), Some(1));
        panel.recent_down();
        assert_eq!(panel.list_state.selected(), Some(0));
    }
}
