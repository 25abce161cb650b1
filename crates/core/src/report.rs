//! Aggregation of outcomes into a run report, and its text rendering.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt::Write;
use std::path::PathBuf;

use crate::locator::DiscoveryError;
use crate::task::{ConversionOutcome, FailureKind};

/// A file that was converted and archived.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConvertedFile {
    pub source: PathBuf,
    pub output: PathBuf,
    pub archived_to: PathBuf,
}

/// A file whose conversion failed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FailedFile {
    pub source: PathBuf,
    pub kind: FailureKind,
    pub reason: String,
}

/// Result of a whole run, folded from every [`ConversionOutcome`].
///
/// Lists are kept in completion order.
#[derive(Debug, Clone)]
pub struct Report {
    pub successes: Vec<ConvertedFile>,
    pub failures: Vec<FailedFile>,
    /// Paths the walk could not read and skipped.
    pub discovery_errors: Vec<String>,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
}

impl Report {
    /// Starts an empty report.
    pub fn new(started_at: DateTime<Utc>) -> Self {
        Self {
            successes: Vec::new(),
            failures: Vec::new(),
            discovery_errors: Vec::new(),
            started_at,
            finished_at: started_at,
        }
    }

    /// Folds one outcome in.
    pub fn record(&mut self, outcome: ConversionOutcome) {
        match outcome {
            ConversionOutcome::Success {
                source,
                output,
                archived_to,
            } => self.successes.push(ConvertedFile {
                source: source.into_path(),
                output,
                archived_to,
            }),
            ConversionOutcome::Failure { source, error } => self.failures.push(FailedFile {
                source: source.into_path(),
                kind: error.kind(),
                reason: error.reason(),
            }),
        }
    }

    pub fn record_discovery_error(&mut self, error: &DiscoveryError) {
        self.discovery_errors.push(error.to_string());
    }

    /// Stamps the finish time.
    pub fn finish(mut self) -> Self {
        self.finished_at = Utc::now();
        self
    }

    /// Number of outcomes recorded.
    pub fn total(&self) -> usize {
        self.successes.len() + self.failures.len()
    }

    pub fn has_failures(&self) -> bool {
        !self.failures.is_empty()
    }

    /// Orders both lists by source path.
    pub fn sort_by_path(&mut self) {
        self.successes.sort_by(|a, b| a.source.cmp(&b.source));
        self.failures.sort_by(|a, b| a.source.cmp(&b.source));
    }

    /// Run duration.
    pub fn elapsed(&self) -> chrono::Duration {
        self.finished_at - self.started_at
    }
}

/// Options for rendering a report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportConfig {
    /// Sort listed paths so output does not depend on completion order.
    #[serde(default = "default_true")]
    pub sort_paths: bool,
}

fn default_true() -> bool {
    true
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self { sort_paths: true }
    }
}

/// Renders a [`Report`] as human-readable text.
#[derive(Debug, Clone, Default)]
pub struct Reporter {
    config: ReportConfig,
}

impl Reporter {
    pub fn new(config: ReportConfig) -> Self {
        Self { config }
    }

    pub fn render(&self, report: &Report) -> String {
        let mut sorted;
        let report = if self.config.sort_paths {
            sorted = report.clone();
            sorted.sort_by_path();
            &sorted
        } else {
            report
        };

        let mut out = String::new();
        let _ = writeln!(out, "--- Conversion Report ---");
        let _ = writeln!(
            out,
            "Files converted successfully: {}",
            report.successes.len()
        );
        for file in &report.successes {
            let _ = writeln!(out, "  - {}", file.source.display());
        }

        if report.failures.is_empty() {
            let _ = writeln!(out, "\nNo failures occurred.");
        } else {
            let _ = writeln!(out, "\nFiles that failed: {}", report.failures.len());
            for file in &report.failures {
                let _ = writeln!(
                    out,
                    "  - {} [{}]: {}",
                    file.source.display(),
                    file.kind,
                    file.reason
                );
            }
        }

        if !report.discovery_errors.is_empty() {
            let _ = writeln!(
                out,
                "\nSkipped unreadable paths: {}",
                report.discovery_errors.len()
            );
            for error in &report.discovery_errors {
                let _ = writeln!(out, "  - {}", error);
            }
        }

        let elapsed_ms = report.elapsed().num_milliseconds().max(0);
        let _ = writeln!(
            out,
            "\nFinished in {}.{:01}s",
            elapsed_ms / 1000,
            (elapsed_ms % 1000) / 100
        );
        out
    }
}

/// Renders with default options.
pub fn render(report: &Report) -> String {
    Reporter::default().render(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::locator::SourceFile;
    use crate::task::TaskError;
    use crate::transcoder::TranscodeError;
    use chrono::TimeZone;

    fn started() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 1, 1, 12, 0, 0).unwrap()
    }

    fn success(path: &str) -> ConversionOutcome {
        ConversionOutcome::Success {
            source: SourceFile::new(path),
            output: PathBuf::from(path).with_extension("mp4"),
            archived_to: PathBuf::from("/archive").join(PathBuf::from(path).file_name().unwrap()),
        }
    }

    fn failure(path: &str, stderr: &str) -> ConversionOutcome {
        ConversionOutcome::Failure {
            source: SourceFile::new(path),
            error: TaskError::Transcode(TranscodeError::failed(
                "FFmpeg exited with code: Some(1)",
                Some(stderr.to_string()),
            )),
        }
    }

    fn report_with(outcomes: Vec<ConversionOutcome>) -> Report {
        let mut report = Report::new(started());
        for outcome in outcomes {
            report.record(outcome);
        }
        report.finished_at = started() + chrono::Duration::milliseconds(2500);
        report
    }

    #[test]
    fn test_record_counts() {
        let report = report_with(vec![
            failure("/m/a.mkv", "bad"),
            success("/m/b.mkv"),
            failure("/m/c.mkv", "bad"),
        ]);
        assert_eq!(report.total(), 3);
        assert_eq!(report.successes.len(), 1);
        assert_eq!(report.failures.len(), 2);
        assert!(report.has_failures());
        assert_eq!(report.failures[0].kind, FailureKind::Transcode);
    }

    #[test]
    fn test_render_with_failures() {
        let report = report_with(vec![
            success("/m/z.mkv"),
            failure("/m/movie2.mkv", "Invalid data found when processing input"),
            success("/m/a.mkv"),
        ]);

        let text = render(&report);

        assert!(text.contains("Files converted successfully: 2"));
        assert!(text.contains("Files that failed: 1"));
        assert!(text.contains(
            "  - /m/movie2.mkv [transcode]: Transcode failed: FFmpeg exited with code: Some(1): Invalid data found when processing input"
        ));
        assert!(!text.contains("No failures occurred."));
        assert!(text.contains("Finished in 2.5s"));
        // Sorted by default
        let a = text.find("/m/a.mkv").unwrap();
        let z = text.find("/m/z.mkv").unwrap();
        assert!(a < z);
    }

    #[test]
    fn test_render_without_failures() {
        let report = report_with(vec![success("/m/a.mkv")]);
        let text = render(&report);
        assert!(text.contains("Files converted successfully: 1"));
        assert!(text.contains("No failures occurred."));
        assert!(!text.contains("Skipped unreadable paths"));
    }

    #[test]
    fn test_render_keeps_completion_order_when_unsorted() {
        let report = report_with(vec![success("/m/z.mkv"), success("/m/a.mkv")]);
        let text = Reporter::new(ReportConfig { sort_paths: false }).render(&report);
        let a = text.find("/m/a.mkv").unwrap();
        let z = text.find("/m/z.mkv").unwrap();
        assert!(z < a);
    }

    #[test]
    fn test_render_empty_report() {
        let report = report_with(vec![]);
        let text = render(&report);
        assert!(text.contains("Files converted successfully: 0"));
        assert!(text.contains("No failures occurred."));
    }
}
