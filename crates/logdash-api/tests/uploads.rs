mod common;

use std::time::Duration;

use logdash_api::{ApiClient, ApiError, PollEvent, PollSettings, UploadPoller, UploadState};
use tokio::sync::mpsc;

use common::{Stub, client, spawn};

const FAST: PollSettings = PollSettings {
    interval: Duration::from_millis(10),
    max_attempts: 150,
};

async fn signed_in(stub: &Stub) -> ApiClient {
    let base_url = spawn(stub.clone()).await;
    let mut client = client(&base_url);
    client.set_token("token-alice");
    client
}

async fn next_event(rx: &mut mpsc::UnboundedReceiver<PollEvent>) -> PollEvent {
    tokio::time::timeout(Duration::from_secs(5), rx.recv())
        .await
        .expect("poll event within timeout")
        .expect("poller channel open")
}

#[tokio::test]
async fn upload_sends_multipart_file() {
    let stub = Stub::new(&["completed"]);
    let client = signed_in(&stub).await;

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("access.log");
    std::fs::write(&path, "127.0.0.1 - - [15/Jan/2024:10:30:00 +0000] \"GET / HTTP/1.1\" 200 12\n")
        .unwrap();

    let receipt = client.upload_log(&path).await.unwrap();

    assert_eq!(receipt.id, 42);
    assert_eq!(receipt.status, UploadState::Processing);
    let uploads = &stub.recorded.lock().unwrap().uploads;
    assert_eq!(uploads.len(), 1);
    assert_eq!(uploads[0].0, "access.log");
    assert_eq!(uploads[0].1 as u64, std::fs::metadata(&path).unwrap().len());
}

#[tokio::test]
async fn upload_of_missing_file_fails_before_sending() {
    let stub = Stub::new(&["completed"]);
    let client = signed_in(&stub).await;

    let err = client
        .upload_log(std::path::Path::new("/definitely/not/here.log"))
        .await
        .unwrap_err();
    assert!(matches!(err, ApiError::Io { .. }));
    assert!(stub.recorded.lock().unwrap().uploads.is_empty());
}

#[tokio::test]
async fn poll_stops_on_completed() {
    let stub = Stub::new(&["processing", "processing", "completed"]);
    let client = signed_in(&stub).await;
    let (tx, mut rx) = mpsc::unbounded_channel();
    let mut poller = UploadPoller::new(FAST);

    poller.start(client, 42, tx);

    for expected in 1..=2 {
        match next_event(&mut rx).await {
            PollEvent::Status { state, attempt, .. } => {
                assert_eq!(state, UploadState::Processing);
                assert_eq!(attempt, expected);
            }
            other => panic!("unexpected event: {other:?}"),
        }
    }
    match next_event(&mut rx).await {
        PollEvent::Finished { upload_id, state } => {
            assert_eq!(upload_id, 42);
            assert_eq!(state, UploadState::Completed);
        }
        other => panic!("unexpected event: {other:?}"),
    }

    // No further requests after the terminal status
    tokio::time::sleep(Duration::from_millis(60)).await;
    assert_eq!(stub.status_calls(), 3);
    assert!(!poller.is_running());
}

#[tokio::test]
async fn poll_stops_on_failed() {
    let stub = Stub::new(&["processing", "failed"]);
    let client = signed_in(&stub).await;
    let (tx, mut rx) = mpsc::unbounded_channel();
    let mut poller = UploadPoller::new(FAST);

    poller.start(client, 42, tx);

    assert!(matches!(next_event(&mut rx).await, PollEvent::Status { .. }));
    assert!(matches!(
        next_event(&mut rx).await,
        PollEvent::Finished {
            state: UploadState::Failed,
            ..
        }
    ));
    tokio::time::sleep(Duration::from_millis(60)).await;
    assert_eq!(stub.status_calls(), 2);
}

#[tokio::test]
async fn poll_error_stops_polling() {
    let stub = Stub::new(&["processing", "error"]);
    let client = signed_in(&stub).await;
    let (tx, mut rx) = mpsc::unbounded_channel();
    let mut poller = UploadPoller::new(FAST);

    poller.start(client, 42, tx);

    assert!(matches!(next_event(&mut rx).await, PollEvent::Status { .. }));
    match next_event(&mut rx).await {
        PollEvent::Failed { error, .. } => assert_eq!(error.status(), Some(500)),
        other => panic!("unexpected event: {other:?}"),
    }
    tokio::time::sleep(Duration::from_millis(60)).await;
    assert_eq!(stub.status_calls(), 2);
}

#[tokio::test]
async fn poll_gives_up_after_max_attempts() {
    let stub = Stub::new(&["processing"]);
    let client = signed_in(&stub).await;
    let (tx, mut rx) = mpsc::unbounded_channel();
    let mut poller = UploadPoller::new(PollSettings {
        interval: Duration::from_millis(5),
        max_attempts: 3,
    });

    poller.start(client, 42, tx);

    let mut statuses = 0;
    loop {
        match next_event(&mut rx).await {
            PollEvent::Status { .. } => statuses += 1,
            PollEvent::GaveUp { attempts, .. } => {
                assert_eq!(attempts, 3);
                break;
            }
            other => panic!("unexpected event: {other:?}"),
        }
    }
    assert_eq!(statuses, 3);
    assert_eq!(stub.status_calls(), 3);
}

#[tokio::test]
async fn stopped_poll_makes_no_more_requests() {
    let stub = Stub::new(&["processing"]);
    let client = signed_in(&stub).await;
    let (tx, mut rx) = mpsc::unbounded_channel();
    let mut poller = UploadPoller::new(PollSettings {
        interval: Duration::from_millis(20),
        max_attempts: 0,
    });

    poller.start(client, 42, tx);
    assert!(matches!(next_event(&mut rx).await, PollEvent::Status { .. }));
    poller.stop();
    assert!(!poller.is_running());

    let calls = stub.status_calls();
    tokio::time::sleep(Duration::from_millis(100)).await;
    assert_eq!(stub.status_calls(), calls);
}

#[tokio::test]
async fn unknown_upload_reports_not_found() {
    let stub = Stub::new(&["processing"]);
    let client = signed_in(&stub).await;
    let (tx, mut rx) = mpsc::unbounded_channel();
    let mut poller = UploadPoller::new(FAST);

    poller.start(client, 7, tx);

    match next_event(&mut rx).await {
        PollEvent::Failed { upload_id, error } => {
            assert_eq!(upload_id, 7);
            assert_eq!(error.detail(), Some("Upload not found"));
        }
        other => panic!("unexpected event: {other:?}"),
    }
}
