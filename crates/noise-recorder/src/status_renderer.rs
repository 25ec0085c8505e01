//! Passive terminal view of the recorder.
//!
//! Only reads [`RecorderSnapshot`]s and the catalog; never mutates either.

use noise_recorder_core::{Catalog, RecorderSnapshot};

use std::fmt::Write;

use tokio::sync::watch;
use tracing::debug;

/// Format milliseconds as `mm:ss`.
pub fn format_time(ms: u64) -> String {
    let secs = ms / 1000;
    format!("{:02}:{:02}", secs / 60, secs % 60)
}

/// One status line, plus a notice line when there is one.
pub fn render_status(snapshot: &RecorderSnapshot) -> String {
    let session = &snapshot.session;
    let mut out = format!(
        "[{}] {} | chunk #{} | {}",
        format_time(session.elapsed_ms),
        session.status.description(),
        session.chunk_number,
        session.filename
    );

    if let Some(prefix) = &snapshot.pending_prefix {
        let _ = write!(out, " | next: {}", prefix);
    }

    if let Some(notice) = &snapshot.notice {
        let _ = write!(out, "\n  ! {}", notice.message);
    }

    out
}

/// Numbered catalog listing with the selection marked and preview URLs
/// under their entries.
pub fn render_catalog(catalog: &Catalog) -> String {
    let mut out = String::new();

    for (index, item) in catalog.items().iter().enumerate() {
        let marker = if index == catalog.selected_index() {
            '*'
        } else {
            ' '
        };
        let _ = write!(
            out,
            "{} {:>2}. {}",
            marker,
            index + 1,
            item.entry.name
        );
        if !item.entry.desc.is_empty() {
            let _ = write!(out, " - {}", item.entry.desc);
        }
        let _ = writeln!(out, " [{}]", item.display_status.description());
        if !item.entry.preview.is_empty() {
            let _ = writeln!(out, "      preview: {}", item.entry.preview);
        }
    }

    out
}

/// Prints a status line whenever the snapshot changes.
pub struct StatusRenderer {
    snapshots: watch::Receiver<RecorderSnapshot>,
}

impl StatusRenderer {
    /// Render from `snapshots`.
    pub fn new(snapshots: watch::Receiver<RecorderSnapshot>) -> Self {
        Self { snapshots }
    }

    /// Run until shutdown or until the controller goes away.
    pub async fn run(mut self, mut shutdown_rx: watch::Receiver<bool>) {
        println!("{}", render_status(&self.snapshots.borrow_and_update()));

        loop {
            tokio::select! {
                _ = shutdown_rx.changed() => break,
                changed = self.snapshots.changed() => {
                    if changed.is_err() {
                        break;
                    }
                    let line = render_status(&self.snapshots.borrow_and_update());
                    println!("{}", line);
                }
            }
        }

        debug!("Status renderer stopped");
    }
}
