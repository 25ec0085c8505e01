//! Fakes shared by the controller and capture tests.

use crate::{
    Artifact, CaptureDevice, ConstructionFailure, ControllerOptions, DeviceEventSink, DeviceFault,
    ManualClock, RecordingController, SessionResult, UploadOutcome, Uploader,
};

use std::{
    sync::{Arc, Mutex},
    time::Duration,
};

use async_trait::async_trait;
use uuid::Uuid;

pub(crate) const SESSION_ID: Uuid = Uuid::from_u128(0x5eed_0000_0000_4000_8000_0000_0000_0001);

/// Calls observed by a [`FakeDevice`].
#[derive(Debug, Default, Clone)]
pub(crate) struct DeviceLog {
    pub(crate) starts: Arc<Mutex<Vec<Duration>>>,
    pub(crate) stops: Arc<Mutex<usize>>,
}

impl DeviceLog {
    pub(crate) fn start_count(&self) -> usize {
        self.starts.lock().unwrap().len()
    }

    pub(crate) fn stop_count(&self) -> usize {
        *self.stops.lock().unwrap()
    }
}

/// Device that records calls and, when `echo` is set, answers start/stop
/// with the matching lifecycle event.
pub(crate) struct FakeDevice {
    log: DeviceLog,
    sink: DeviceEventSink,
    echo: bool,
    fail_start: Option<DeviceFault>,
}

impl CaptureDevice for FakeDevice {
    fn start(&mut self, chunk_interval: Duration) -> Result<(), DeviceFault> {
        if let Some(fault) = self.fail_start.clone() {
            return Err(fault);
        }
        self.log.starts.lock().unwrap().push(chunk_interval);
        if self.echo {
            self.sink.started();
        }
        Ok(())
    }

    fn stop(&mut self) -> Result<(), DeviceFault> {
        *self.log.stops.lock().unwrap() += 1;
        if self.echo {
            self.sink.stopped();
        }
        Ok(())
    }

    fn file_extension(&self) -> &str {
        "webm"
    }
}

/// Uploader that records every call and answers with a fixed outcome.
pub(crate) struct StubUploader {
    outcome: UploadOutcome,
    calls: Mutex<Vec<(Artifact, String)>>,
}

impl StubUploader {
    pub(crate) fn new(outcome: UploadOutcome) -> Arc<Self> {
        Arc::new(Self {
            outcome,
            calls: Mutex::new(Vec::new()),
        })
    }

    pub(crate) fn calls(&self) -> Vec<(Artifact, String)> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl Uploader for StubUploader {
    async fn upload(&self, artifact: Artifact, user: &str) -> UploadOutcome {
        self.calls
            .lock()
            .unwrap()
            .push((artifact, user.to_string()));
        self.outcome.clone()
    }
}

/// Everything a controller test needs to poke at.
pub(crate) struct Harness {
    pub(crate) controller: RecordingController<FakeDevice>,
    pub(crate) log: DeviceLog,
    pub(crate) sink: DeviceEventSink,
    pub(crate) uploader: Arc<StubUploader>,
    pub(crate) clock: ManualClock,
}

pub(crate) fn options(prefix: &str, clock: &ManualClock) -> ControllerOptions {
    let mut options = ControllerOptions::new("you");
    options.prefix = prefix.to_string();
    options.session_id = SESSION_ID;
    options.clock = Arc::new(clock.clone());
    options
}

pub(crate) fn harness(prefix: &str, outcome: UploadOutcome) -> Harness {
    harness_with(prefix, outcome, false, None).unwrap()
}

pub(crate) fn harness_with(
    prefix: &str,
    outcome: UploadOutcome,
    echo: bool,
    fail_start: Option<DeviceFault>,
) -> SessionResult<Harness> {
    let clock = ManualClock::new();
    let log = DeviceLog::default();
    let uploader = StubUploader::new(outcome);
    let mut sink_slot = None;

    let device_log = log.clone();
    let controller = RecordingController::connect(
        |sink: DeviceEventSink| {
            sink_slot = Some(sink.clone());
            Ok::<_, ConstructionFailure>(FakeDevice {
                log: device_log,
                sink,
                echo,
                fail_start,
            })
        },
        uploader.clone(),
        options(prefix, &clock),
    )?;

    let sink = sink_slot.unwrap();

    Ok(Harness {
        controller,
        log,
        sink,
        uploader,
        clock,
    })
}
