//! Unit tests for batch report rendering

use std::path::PathBuf;
use std::time::Duration;

use crate::dispatcher::BatchReport;
use crate::report::*;
use crate::worker::{SkippedFile, WorkerStats};

fn sample_report() -> BatchReport {
    BatchReport {
        files_found: 3,
        converted: 2,
        workers: vec![
            WorkerStats {
                worker_id: 0,
                converted: 2,
                claimed: 2,
                skipped: Vec::new(),
            },
            WorkerStats {
                worker_id: 1,
                converted: 0,
                claimed: 1,
                skipped: vec![SkippedFile {
                    path: PathBuf::from("in/bad.wav"),
                    reason: "No 'data' chunk found".to_string(),
                    fatal: false,
                }],
            },
        ],
        elapsed: Duration::from_millis(1500),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_summary_line() {
        assert_eq!(
            summary_line(&sample_report()),
            "Converted 2 out of 3 files in total in 1.500s."
        );
    }

    #[test]
    fn test_summary_line_for_empty_run() {
        assert_eq!(
            summary_line(&BatchReport::default()),
            "Converted 0 out of 0 files in total in 0.000s."
        );
    }

    #[test]
    fn test_summary_lines_order() {
        let lines = summary_lines(&sample_report());

        assert_eq!(
            lines,
            vec![
                "Thread 0 processed 2 files.".to_string(),
                "Thread 1 processed 0 files.".to_string(),
                "Skipped in/bad.wav: No 'data' chunk found".to_string(),
                "Converted 2 out of 3 files in total in 1.500s.".to_string(),
            ]
        );
    }

    #[test]
    fn test_report_aggregates() {
        let report = sample_report();
        assert_eq!(report.claimed(), 3);
        assert_eq!(report.skipped_count(), 1);
        assert_eq!(report.skipped().next().map(|s| s.fatal), Some(false));
    }

    #[cfg(feature = "diagnostics")]
    #[test]
    fn test_json_report() {
        let json = to_json(&sample_report()).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();

        assert_eq!(value["files_found"], 3);
        assert_eq!(value["converted"], 2);
        assert_eq!(value["workers"].as_array().map(Vec::len), Some(2));
        assert_eq!(value["skipped"][0]["path"], "in/bad.wav");
        assert!(value["generated_at"].is_string());
    }
}
