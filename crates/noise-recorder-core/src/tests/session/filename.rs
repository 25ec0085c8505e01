use crate::{ManualClock, SessionState, tests::support::SESSION_ID};

use std::sync::Arc;

/// WHAT: Filename renders as prefix, session ID, extension
/// WHY: The server identifies uploads by this exact shape
#[test]
fn given_prefix_when_rendering_filename_then_dot_separated_parts() {
    // Given: A session re-armed with the "rain" prefix
    let mut session = SessionState::with_clock(SESSION_ID, "webm", Arc::new(ManualClock::new()));
    session.reset("rain").unwrap();

    // When: Rendering the filename
    let rendered = session.filename().to_string();

    // Then: It is <prefix>.<sessionID>.<ext>
    assert_eq!(rendered, format!("rain.{}.webm", SESSION_ID));
    assert_eq!(session.filename().prefix(), "rain");
    assert_eq!(session.filename().extension(), "webm");
}

/// WHAT: Fresh sessions get distinct session IDs
/// WHY: Uploads from different sessions must not collide
#[test]
fn given_two_new_sessions_when_comparing_ids_then_distinct() {
    // Given/When: Two independently created sessions
    let a = SessionState::new("webm");
    let b = SessionState::new("webm");

    // Then: Their session IDs differ
    assert_ne!(a.filename().session_id(), b.filename().session_id());
}
