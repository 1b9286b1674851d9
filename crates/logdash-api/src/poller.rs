use std::time::Duration;

use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use logdash_types::UploadState;

use crate::client::ApiClient;
use crate::error::ApiError;

pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(2);
pub const DEFAULT_MAX_POLL_ATTEMPTS: u32 = 150;

/// How often and how long to poll an upload
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PollSettings {
    /// Delay between status requests (no backoff)
    pub interval: Duration,
    /// Give up after this many requests; 0 polls until cancelled
    pub max_attempts: u32,
}

impl Default for PollSettings {
    fn default() -> Self {
        Self {
            interval: DEFAULT_POLL_INTERVAL,
            max_attempts: DEFAULT_MAX_POLL_ATTEMPTS,
        }
    }
}

/// Progress reported by a running poll
#[derive(Debug)]
pub enum PollEvent {
    /// A non-terminal status was observed
    Status {
        upload_id: i64,
        state: UploadState,
        attempt: u32,
    },
    /// The upload reached `completed` or `failed`
    Finished { upload_id: i64, state: UploadState },
    /// A status request failed; polling stopped
    Failed { upload_id: i64, error: ApiError },
    /// `max_attempts` requests went by without a terminal status
    GaveUp { upload_id: i64, attempts: u32 },
}

/// Polls `GET /uploads/{id}/status` on a background task
pub struct UploadPoller {
    /// Cancellation token for stopping the poll
    cancel: CancellationToken,

    /// Active poll task
    task: Option<tokio::task::JoinHandle<()>>,

    settings: PollSettings,
}

impl UploadPoller {
    pub fn new(settings: PollSettings) -> Self {
        Self {
            cancel: CancellationToken::new(),
            task: None,
            settings,
        }
    }

    pub fn settings(&self) -> PollSettings {
        self.settings
    }

    /// Start polling an upload, replacing any poll already running
    pub fn start(&mut self, client: ApiClient, upload_id: i64, tx: mpsc::UnboundedSender<PollEvent>) {
        self.stop();

        let cancel = self.cancel.clone();
        let settings = self.settings;
        tracing::debug!(upload_id, interval_ms = settings.interval.as_millis() as u64, "polling upload status");

        self.task = Some(tokio::spawn(async move {
            poll_until_done(client, upload_id, settings, cancel, tx).await;
        }));
    }

    /// Stop the current poll
    pub fn stop(&mut self) {
        self.cancel.cancel();
        if let Some(task) = self.task.take() {
            task.abort();
        }
        // Fresh token for future polls
        self.cancel = CancellationToken::new();
    }

    /// Check if a poll is still running
    pub fn is_running(&self) -> bool {
        self.task.as_ref().is_some_and(|t| !t.is_finished())
    }
}

impl Default for UploadPoller {
    fn default() -> Self {
        Self::new(PollSettings::default())
    }
}

impl Drop for UploadPoller {
    fn drop(&mut self) {
        self.stop();
    }
}

async fn poll_until_done(
    client: ApiClient,
    upload_id: i64,
    settings: PollSettings,
    cancel: CancellationToken,
    tx: mpsc::UnboundedSender<PollEvent>,
) {
    let mut attempt: u32 = 0;

    loop {
        attempt += 1;

        let result = tokio::select! {
            _ = cancel.cancelled() => return,
            result = client.upload_status(upload_id) => result,
        };

        let event = match result {
            Ok(status) if status.status.is_terminal() => PollEvent::Finished {
                upload_id,
                state: status.status,
            },
            Ok(status) => PollEvent::Status {
                upload_id,
                state: status.status,
                attempt,
            },
            Err(error) => PollEvent::Failed { upload_id, error },
        };

        let done = !matches!(event, PollEvent::Status { .. });
        if tx.send(event).is_err() || done {
            return;
        }

        if settings.max_attempts > 0 && attempt >= settings.max_attempts {
            tracing::warn!(upload_id, attempts = attempt, "upload still processing, giving up");
            let _ = tx.send(PollEvent::GaveUp {
                upload_id,
                attempts: attempt,
            });
            return;
        }

        tokio::select! {
            _ = cancel.cancelled() => return,
            _ = tokio::time::sleep(settings.interval) => {}
        }
    }
}
