mod artifact;
mod clock;
mod filename;
mod snapshot;
mod state;
mod status;

pub use {
    artifact::Artifact,
    clock::{Clock, ManualClock, MonotonicClock},
    filename::Filename,
    snapshot::SessionSnapshot,
    state::SessionState,
    status::SessionStatus,
};
