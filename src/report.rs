//! Batch report rendering
//!
//! Human-readable summary lines for the terminal and, with the
//! `diagnostics` feature, a JSON document for tooling.

use crate::dispatcher::BatchReport;

/// Final line of every run, also printed when nothing was converted
pub fn summary_line(report: &BatchReport) -> String {
    format!(
        "Converted {} out of {} files in total in {:.3}s.",
        report.converted,
        report.files_found,
        report.elapsed.as_secs_f64()
    )
}

/// Per-worker lines, skipped files, then the summary line
pub fn summary_lines(report: &BatchReport) -> Vec<String> {
    let mut lines: Vec<String> = report
        .workers
        .iter()
        .map(|w| format!("Thread {} processed {} files.", w.worker_id, w.converted))
        .collect();

    lines.extend(report.skipped().map(|skip| {
        format!(
            "Skipped {}: {}",
            skip.path.display(),
            skip.reason
        )
    }));

    lines.push(summary_line(report));
    lines
}

#[cfg(feature = "diagnostics")]
pub use self::json::{to_json, write_json, ReportDocument};

#[cfg(feature = "diagnostics")]
mod json {
    use std::fs;
    use std::io;
    use std::path::Path;

    use chrono::{DateTime, Utc};
    use serde::Serialize;

    use crate::dispatcher::BatchReport;

    /// Serializable view of a [`BatchReport`]
    #[derive(Debug, Serialize)]
    pub struct ReportDocument {
        pub generated_at: DateTime<Utc>,
        pub files_found: usize,
        pub converted: usize,
        pub elapsed_secs: f64,
        pub workers: Vec<WorkerEntry>,
        pub skipped: Vec<SkippedEntry>,
    }

    #[derive(Debug, Serialize)]
    pub struct WorkerEntry {
        pub worker_id: usize,
        pub claimed: usize,
        pub converted: usize,
    }

    #[derive(Debug, Serialize)]
    pub struct SkippedEntry {
        pub path: String,
        pub reason: String,
        pub fatal: bool,
    }

    impl From<&BatchReport> for ReportDocument {
        fn from(report: &BatchReport) -> Self {
            Self {
                generated_at: Utc::now(),
                files_found: report.files_found,
                converted: report.converted,
                elapsed_secs: report.elapsed.as_secs_f64(),
                workers: report
                    .workers
                    .iter()
                    .map(|w| WorkerEntry {
                        worker_id: w.worker_id,
                        claimed: w.claimed,
                        converted: w.converted,
                    })
                    .collect(),
                skipped: report
                    .skipped()
                    .map(|s| SkippedEntry {
                        path: s.path.display().to_string(),
                        reason: s.reason.clone(),
                        fatal: s.fatal,
                    })
                    .collect(),
            }
        }
    }

    pub fn to_json(report: &BatchReport) -> serde_json::Result<String> {
        serde_json::to_string_pretty(&ReportDocument::from(report))
    }

    pub fn write_json<P: AsRef<Path>>(report: &BatchReport, path: P) -> io::Result<()> {
        let json = to_json(report).map_err(io::Error::other)?;
        fs::write(path, json)
    }
}
