//! Local CSV report files.
//!
//! Reports are rendered fully in memory, written next to their final path
//! with a `.partial` suffix and renamed into place, so a failed run never
//! leaves a truncated report behind.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tracing::debug;

use sns_audit_application::ReportSink;
use sns_audit_core::{AppError, AppResult};
use sns_audit_domain::{ReportName, ReportTable};

const LINE_TERMINATOR: &str = "\r\n";
const PARTIAL_SUFFIX: &str = ".partial";

/// Report sink writing UTF-8 CSV files into a directory.
#[derive(Debug, Clone)]
pub struct CsvReportWriter {
    output_dir: PathBuf,
}

impl CsvReportWriter {
    /// Creates a writer targeting `output_dir`.
    #[must_use]
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
        }
    }
}

#[async_trait]
impl ReportSink for CsvReportWriter {
    async fn write_report(&self, name: &ReportName, table: &ReportTable) -> AppResult<PathBuf> {
        tokio::fs::create_dir_all(&self.output_dir)
            .await
            .map_err(|error| {
                AppError::Internal(format!(
                    "failed to create output directory '{}': {error}",
                    self.output_dir.display()
                ))
            })?;

        let final_path = self.output_dir.join(name.file_name());
        let partial_path = self
            .output_dir
            .join(format!("{}{PARTIAL_SUFFIX}", name.file_name()));
        let contents = render_csv(table);

        if let Err(error) = tokio::fs::write(&partial_path, contents.as_bytes()).await {
            discard_partial(&partial_path).await;
            return Err(AppError::Internal(format!(
                "failed to write report '{}': {error}",
                partial_path.display()
            )));
        }

        if let Err(error) = tokio::fs::rename(&partial_path, &final_path).await {
            discard_partial(&partial_path).await;
            return Err(AppError::Internal(format!(
                "failed to move report into '{}': {error}",
                final_path.display()
            )));
        }

        debug!(
            path = %final_path.display(),
            bytes = contents.len(),
            "report written"
        );
        Ok(final_path)
    }
}

async fn discard_partial(path: &Path) {
    if let Err(error) = tokio::fs::remove_file(path).await {
        debug!(path = %path.display(), error = %error, "partial report not removed");
    }
}

/// Renders the header and rows as CSV text.
fn render_csv(table: &ReportTable) -> String {
    let mut output = String::new();
    push_record(&mut output, table.columns());
    for row in table.rows() {
        push_record(&mut output, row);
    }

    output
}

fn push_record(output: &mut String, fields: &[String]) {
    for (index, field) in fields.iter().enumerate() {
        if index > 0 {
            output.push(',');
        }
        output.push_str(&csv_escape(field));
    }
    output.push_str(LINE_TERMINATOR);
}

/// Quotes a field containing a separator, quote or line break; inner
/// quotes are doubled.
fn csv_escape(field: &str) -> String {
    if field.contains([',', '"', '\r', '\n']) {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_owned()
    }
}
