//! Progress-callback trait for per-row fill events.
//!
//! Inject an [`Arc<dyn FillProgressCallback>`] via
//! [`crate::config::FillConfigBuilder::progress_callback`] to receive events
//! as the run moves through its phases and writes each file.
//!
//! # Example
//!
//! ```rust
//! use csv2pdf::{FillConfig, FillProgressCallback};
//! use std::path::Path;
//! use std::sync::{Arc, atomic::{AtomicUsize, Ordering}};
//!
//! struct CountingCallback {
//!     written: AtomicUsize,
//! }
//!
//! impl FillProgressCallback for CountingCallback {
//!     fn on_file_written(&self, row: usize, total_rows: usize, path: &Path, _bytes: usize) {
//!         self.written.fetch_add(1, Ordering::SeqCst);
//!         eprintln!("{}/{} → {}", row, total_rows, path.display());
//!     }
//! }
//!
//! let counter = Arc::new(CountingCallback { written: AtomicUsize::new(0) });
//!
//! let config = FillConfig::builder()
//!     .progress_callback(counter as Arc<dyn FillProgressCallback>)
//!     .build()
//!     .unwrap();
//! ```

use crate::output::RunPhase;
use std::path::Path;
use std::sync::Arc;

/// Called by the fill run as it progresses.
///
/// Rows are processed one at a time, so calls never overlap within a run.
/// The trait is still `Send + Sync` so a callback can be shared with other
/// tasks (a UI thread, a channel forwarder). All methods default to no-ops.
pub trait FillProgressCallback: Send + Sync {
    /// Called on every phase transition, including the move to `Failed`.
    fn on_phase_change(&self, phase: RunPhase) {
        let _ = phase;
    }

    /// Called once the data rows are known, before the first row.
    ///
    /// # Arguments
    /// * `total_rows` — data rows to process (header excluded)
    fn on_run_start(&self, total_rows: usize) {
        let _ = total_rows;
    }

    /// Called before a row is bound.
    ///
    /// # Arguments
    /// * `row`        — 1-indexed data row number
    /// * `total_rows` — data rows in the run
    fn on_row_start(&self, row: usize, total_rows: usize) {
        let _ = (row, total_rows);
    }

    /// Called after a row's PDF is on disk.
    ///
    /// # Arguments
    /// * `row`        — 1-indexed data row number
    /// * `total_rows` — data rows in the run
    /// * `path`       — file written
    /// * `bytes`      — size of the written PDF
    fn on_file_written(&self, row: usize, total_rows: usize, path: &Path, bytes: usize) {
        let _ = (row, total_rows, path, bytes);
    }

    /// Called once after the last row.
    fn on_run_complete(&self, files_written: usize) {
        let _ = files_written;
    }
}

/// A no-op implementation for callers that don't need progress events.
pub struct NoopProgressCallback;

impl FillProgressCallback for NoopProgressCallback {}

/// Convenience alias matching the type stored in [`crate::config::FillConfig`].
pub type ProgressCallback = Arc<dyn FillProgressCallback>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    #[derive(Default)]
    struct Recorder {
        phases: Mutex<Vec<RunPhase>>,
        written: Mutex<Vec<(usize, String)>>,
    }

    impl FillProgressCallback for Recorder {
        fn on_phase_change(&self, phase: RunPhase) {
            self.phases.lock().unwrap().push(phase);
        }

        fn on_file_written(&self, row: usize, _total: usize, path: &Path, _bytes: usize) {
            self.written
                .lock()
                .unwrap()
                .push((row, path.display().to_string()));
        }
    }

    #[test]
    fn noop_callback_does_not_panic() {
        let cb = NoopProgressCallback;
        cb.on_phase_change(RunPhase::LoadingRecords);
        cb.on_run_start(3);
        cb.on_row_start(1, 3);
        cb.on_file_written(1, 3, Path::new("outputs/a.pdf"), 1024);
        cb.on_run_complete(3);
    }

    #[test]
    fn recorder_receives_events() {
        let rec = Recorder::default();
        rec.on_phase_change(RunPhase::IteratingRows);
        rec.on_file_written(2, 2, Path::new("outputs/b.pdf"), 10);
        rec.on_phase_change(RunPhase::Done);

        assert_eq!(
            *rec.phases.lock().unwrap(),
            [RunPhase::IteratingRows, RunPhase::Done]
        );
        assert_eq!(rec.written.lock().unwrap()[0], (2, "outputs/b.pdf".to_string()));
    }

    #[test]
    fn arc_dyn_callback_is_send_sync() {
        fn assert_send_sync<T: Send + Sync + ?Sized>() {}
        assert_send_sync::<dyn FillProgressCallback>();
        let cb: ProgressCallback = Arc::new(NoopProgressCallback);
        cb.on_run_start(0);
    }
}
