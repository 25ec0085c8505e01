use crate::{
    ControllerCommand, DeviceErrorKind, SessionStatus, UploadOutcome,
    tests::support::harness_with,
};

use std::time::Duration;

use tokio::sync::{mpsc, watch};

const WAIT: Duration = Duration::from_secs(5);

/// WHAT: Commands and device events drive a full attempt through the run loop
/// WHY: Validates the wiring a front end relies on
#[tokio::test]
async fn given_running_controller_when_start_data_stop_then_snapshots_reach_uploaded() {
    // Given: A running controller over an echoing fake device
    let h = harness_with("rain", UploadOutcome::Success, true, None).unwrap();
    let mut snapshots = h.controller.subscribe();
    let (command_tx, command_rx) = mpsc::channel(8);
    let (_shutdown_tx, shutdown_rx) = watch::channel(false);
    let uploader = h.uploader.clone();
    let sink = h.sink.clone();
    let task = tokio::spawn(h.controller.run(command_rx, shutdown_rx));

    // When: Start, two chunks, stop
    command_tx.send(ControllerCommand::Start).await.unwrap();
    tokio::time::timeout(WAIT, snapshots.wait_for(|s| s.session.status == SessionStatus::Recording))
        .await
        .unwrap()
        .unwrap();
    sink.data(b"b1".to_vec());
    sink.data(b"b2".to_vec());
    command_tx.send(ControllerCommand::Stop).await.unwrap();

    // Then: Snapshots reach Uploaded and the artifact holds both chunks
    let uploaded = tokio::time::timeout(
        WAIT,
        snapshots.wait_for(|s| s.session.status == SessionStatus::Uploaded),
    )
    .await
    .unwrap()
    .unwrap()
    .clone();
    assert_eq!(uploaded.session.chunk_number, 2);
    assert_eq!(uploader.calls()[0].0.bytes(), b"b1b2");

    command_tx.send(ControllerCommand::Shutdown).await.unwrap();
    tokio::time::timeout(WAIT, task).await.unwrap().unwrap().unwrap();
}

/// WHAT: Device errors become notices on the next snapshot
/// WHY: The renderer is the only place the user learns about faults
#[tokio::test]
async fn given_running_controller_when_device_errors_then_notice_published() {
    // Given: A running controller
    let h = harness_with("rain", UploadOutcome::Success, true, None).unwrap();
    let mut snapshots = h.controller.subscribe();
    let (command_tx, command_rx) = mpsc::channel(8);
    let (_shutdown_tx, shutdown_rx) = watch::channel(false);
    let sink = h.sink.clone();
    let task = tokio::spawn(h.controller.run(command_rx, shutdown_rx));

    // When: The device reports an InvalidState error
    sink.error(DeviceErrorKind::InvalidState, "busy");

    // Then: A notice with the user-facing message appears; status unchanged
    let snap = tokio::time::timeout(WAIT, snapshots.wait_for(|s| s.notice.is_some()))
        .await
        .unwrap()
        .unwrap()
        .clone();
    assert_eq!(snap.session.status, SessionStatus::Waiting);
    assert_eq!(
        snap.notice.map(|n| n.message).as_deref(),
        Some(DeviceErrorKind::InvalidState.notice())
    );

    drop(command_tx);
    tokio::time::timeout(WAIT, task).await.unwrap().unwrap().unwrap();
}

/// WHAT: Shutdown mid-recording stops the device and waits for the upload
/// WHY: No recorded chunk is lost on exit
#[tokio::test]
async fn given_recording_when_shutdown_then_recording_uploaded_before_exit() {
    // Given: A running controller that is recording one chunk
    let h = harness_with("rain", UploadOutcome::Success, true, None).unwrap();
    let mut snapshots = h.controller.subscribe();
    let (command_tx, command_rx) = mpsc::channel(8);
    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let uploader = h.uploader.clone();
    let sink = h.sink.clone();
    let task = tokio::spawn(h.controller.run(command_rx, shutdown_rx));

    command_tx.send(ControllerCommand::Start).await.unwrap();
    tokio::time::timeout(WAIT, snapshots.wait_for(|s| s.session.status == SessionStatus::Recording))
        .await
        .unwrap()
        .unwrap();
    sink.data(b"last".to_vec());
    tokio::time::timeout(WAIT, snapshots.wait_for(|s| s.session.chunk_number == 1))
        .await
        .unwrap()
        .unwrap();

    // When: Shutdown is signalled
    shutdown_tx.send(true).unwrap();
    tokio::time::timeout(WAIT, task).await.unwrap().unwrap().unwrap();

    // Then: The recording was finalized and uploaded
    assert_eq!(uploader.calls().len(), 1);
    assert_eq!(snapshots.borrow().session.status, SessionStatus::Uploaded);
}
