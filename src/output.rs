//! What a fill run reports back: its phase while running and a summary
//! once it is done.

use serde::Serialize;
use std::fmt;
use std::path::PathBuf;

/// Where a run is in its linear sequence.
///
/// `IteratingRows` repeats once per data row and then moves to `Done`. Any
/// failure moves straight to `Failed`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum RunPhase {
    NotStarted,
    LoadingRecords,
    LoadingTemplate,
    BindingStatic,
    IteratingRows,
    Done,
    Failed,
}

impl fmt::Display for RunPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            RunPhase::NotStarted => "not started",
            RunPhase::LoadingRecords => "loading records",
            RunPhase::LoadingTemplate => "loading template",
            RunPhase::BindingStatic => "binding static fields",
            RunPhase::IteratingRows => "filling rows",
            RunPhase::Done => "done",
            RunPhase::Failed => "failed",
        };
        f.write_str(s)
    }
}

/// Result of a completed run.
#[derive(Debug, Clone, Default, Serialize)]
pub struct RunSummary {
    /// Data rows processed (header excluded).
    pub rows: usize,
    /// Files written; one per row, overwritten paths included.
    pub files_written: usize,
    /// Distinct output paths, in first-written order.
    pub outputs: Vec<PathBuf>,
    /// Rows whose output path had already been written in this run.
    pub collisions: usize,
    /// Wall-clock time of the whole run.
    pub duration_ms: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn phase_display() {
        assert_eq!(RunPhase::BindingStatic.to_string(), "binding static fields");
        assert_eq!(RunPhase::Failed.to_string(), "failed");
    }

    #[test]
    fn summary_serialises() {
        let s = RunSummary {
            rows: 2,
            files_written: 2,
            outputs: vec!["outputs/a.pdf".into()],
            collisions: 1,
            duration_ms: 12,
        };
        let json = serde_json::to_value(&s).unwrap();
        assert_eq!(json["files_written"], 2);
        assert_eq!(json["collisions"], 1);
        assert_eq!(json["outputs"][0], "outputs/a.pdf");
    }
}
