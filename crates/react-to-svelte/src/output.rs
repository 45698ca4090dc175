//! Output formatting.

use crate::cli::OutputFormat;
use camino::Utf8PathBuf;
use react_transformer::{Diagnostic, Severity};
use serde::Serialize;

/// What happened to one source file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FileStatus {
    /// The component was written to disk.
    Written,
    /// The component was converted but not written (dry run).
    Converted,
    /// A discovered file without a component.
    Skipped,
    /// The conversion failed.
    Failed,
}

/// The outcome for one source file.
#[derive(Debug, Clone)]
pub struct FileReport {
    pub source: Utf8PathBuf,
    pub status: FileStatus,
    pub component: Option<String>,
    pub output: Option<Utf8PathBuf>,
    pub diagnostics: Vec<Diagnostic>,
    pub error: Option<String>,
    /// The generated component, kept for dry runs.
    pub code: Option<String>,
}

impl FileReport {
    /// A report for a file that produced no component.
    pub fn without_output(source: Utf8PathBuf, status: FileStatus, error: Option<String>) -> Self {
        Self {
            source,
            status,
            component: None,
            output: None,
            diagnostics: Vec::new(),
            error,
            code: None,
        }
    }
}

/// A formatted diagnostic for output.
#[derive(Debug, Serialize)]
pub struct FormattedDiagnostic {
    /// The diagnostic type (Warning or Hint).
    #[serde(rename = "type")]
    pub diagnostic_type: String,
    /// 1-indexed line number.
    pub line: usize,
    /// 1-indexed column number.
    pub column: usize,
    pub message: String,
    pub code: String,
}

impl From<&Diagnostic> for FormattedDiagnostic {
    fn from(diagnostic: &Diagnostic) -> Self {
        Self {
            diagnostic_type: severity_label(diagnostic.severity).to_string(),
            line: diagnostic.line,
            column: diagnostic.column,
            message: diagnostic.message.clone(),
            code: diagnostic.code.to_string(),
        }
    }
}

#[derive(Debug, Serialize)]
struct FormattedFile<'a> {
    source: &'a str,
    status: FileStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    component: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    output: Option<&'a str>,
    diagnostics: Vec<FormattedDiagnostic>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    code: Option<&'a str>,
}

#[derive(Debug, Serialize)]
struct Report<'a> {
    files: Vec<FormattedFile<'a>>,
    summary: &'a RunSummary,
}

fn severity_label(severity: Severity) -> &'static str {
    match severity {
        Severity::Warning => "Warning",
        Severity::Hint => "Hint",
    }
}

/// Formats run results for output.
pub struct Formatter {
    format: OutputFormat,
}

impl Formatter {
    /// Creates a new formatter.
    pub fn new(format: OutputFormat) -> Self {
        Self { format }
    }

    /// Formats the per-file reports and the summary.
    pub fn format(&self, reports: &[FileReport], summary: &RunSummary) -> String {
        match self.format {
            OutputFormat::Human => self.format_human(reports, summary),
            OutputFormat::Json => self.format_json(reports, summary),
        }
    }

    /// Formats as human-readable output.
    fn format_human(&self, reports: &[FileReport], summary: &RunSummary) -> String {
        let mut output = String::new();

        for report in reports {
            if let Some(error) = &report.error {
                output.push_str(&format!("{}\nError: {}\n\n", report.source, error));
            }
            for diag in &report.diagnostics {
                output.push_str(&format!(
                    "{}:{}:{}\n{}: {} ({})\n\n",
                    report.source,
                    diag.line,
                    diag.column,
                    severity_label(diag.severity),
                    diag.message,
                    diag.code
                ));
            }
            if let (Some(code), Some(path)) = (&report.code, &report.output) {
                output.push_str(&format!("==> {} <==\n{}\n", path, code));
            }
        }

        output.push_str(&summary.format());
        output.push('\n');
        output
    }

    /// Formats as a JSON report.
    fn format_json(&self, reports: &[FileReport], summary: &RunSummary) -> String {
        let report = Report {
            files: reports
                .iter()
                .map(|report| FormattedFile {
                    source: report.source.as_str(),
                    status: report.status,
                    component: report.component.as_deref(),
                    output: report.output.as_ref().map(|p| p.as_str()),
                    diagnostics: report.diagnostics.iter().map(FormattedDiagnostic::from).collect(),
                    error: report.error.as_deref(),
                    code: report.code.as_deref(),
                })
                .collect(),
            summary,
        };
        serde_json::to_string_pretty(&report).unwrap_or_else(|_| "{}".to_string())
    }
}

/// Summary of a conversion run.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize)]
pub struct RunSummary {
    /// Components converted (written, or printed on a dry run).
    pub converted: usize,
    /// Discovered files without a component.
    pub skipped: usize,
    /// Files that failed to convert.
    pub failed: usize,
    pub warnings: usize,
    pub hints: usize,
}

impl RunSummary {
    /// Tallies the reports.
    pub fn from_reports(reports: &[FileReport]) -> Self {
        let mut summary = Self::default();
        for report in reports {
            match report.status {
                FileStatus::Written | FileStatus::Converted => summary.converted += 1,
                FileStatus::Skipped => summary.skipped += 1,
                FileStatus::Failed => summary.failed += 1,
            }
            for diag in &report.diagnostics {
                match diag.severity {
                    Severity::Warning => summary.warnings += 1,
                    Severity::Hint => summary.hints += 1,
                }
            }
        }
        summary
    }

    /// Formats the summary line.
    pub fn format(&self) -> String {
        let plural = |count: usize, word: &str| {
            if count == 1 {
                format!("{count} {word}")
            } else {
                format!("{count} {word}s")
            }
        };

        format!(
            "====================================\nreact-to-svelte converted {} ({} failed, {} skipped) with {} and {}",
            plural(self.converted, "component"),
            self.failed,
            self.skipped,
            plural(self.warnings, "warning"),
            plural(self.hints, "hint"),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use react_transformer::DiagnosticCode;

    fn reports() -> Vec<FileReport> {
        vec![
            FileReport {
                source: Utf8PathBuf::from("src/Card.jsx"),
                status: FileStatus::Written,
                component: Some("Card".to_string()),
                output: Some(Utf8PathBuf::from("out/Card.svelte")),
                diagnostics: vec![Diagnostic::new(
                    DiagnosticCode::UnresolvedImport,
                    "cannot resolve `../lib/format`",
                    1,
                    20,
                )],
                error: None,
                code: None,
            },
            FileReport::without_output(
                Utf8PathBuf::from("src/Broken.jsx"),
                FileStatus::Failed,
                Some("no component found in src/Broken.jsx".to_string()),
            ),
        ]
    }

    #[test]
    fn test_format_human() {
        let reports = reports();
        let summary = RunSummary::from_reports(&reports);
        let output = Formatter::new(OutputFormat::Human).format(&reports, &summary);
        assert_eq!(
            output,
            "\
src/Card.jsx:1:20
Warning: cannot resolve `../lib/format` (unresolved-import)

src/Broken.jsx
Error: no component found in src/Broken.jsx

====================================
react-to-svelte converted 1 component (1 failed, 0 skipped) with 1 warning and 0 hints
"
        );
    }

    #[test]
    fn test_format_json() {
        let reports = reports();
        let summary = RunSummary::from_reports(&reports);
        let output = Formatter::new(OutputFormat::Json).format(&reports, &summary);
        let value: serde_json::Value = serde_json::from_str(&output).unwrap();

        assert_eq!(value["files"][0]["status"], "written");
        assert_eq!(value["files"][0]["output"], "out/Card.svelte");
        assert_eq!(value["files"][0]["diagnostics"][0]["type"], "Warning");
        assert_eq!(value["files"][0]["diagnostics"][0]["code"], "unresolved-import");
        assert_eq!(value["files"][0]["diagnostics"][0]["column"], 20);
        assert_eq!(value["files"][1]["status"], "failed");
        assert!(value["files"][1].get("output").is_none());
        assert_eq!(value["summary"]["failed"], 1);
    }

    #[test]
    fn test_summary() {
        let summary = RunSummary {
            converted: 5,
            skipped: 2,
            failed: 0,
            warnings: 3,
            hints: 1,
        };
        assert_eq!(
            summary.format(),
            "====================================\nreact-to-svelte converted 5 components (0 failed, 2 skipped) with 3 warnings and 1 hint"
        );
    }
}
