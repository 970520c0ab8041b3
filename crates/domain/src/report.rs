use chrono::{DateTime, Utc};
use sns_audit_core::{AppError, AppResult};

use crate::AccountContext;

/// Timestamp format embedded in report file names.
pub const REPORT_TIMESTAMP_FORMAT: &str = "%Y%m%d_%H%M%S";

const WRITE_OPERATIONS_PREFIX: &str = "sns-write-operations";

/// Base name of a report file, without extension.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportName(String);

impl ReportName {
    /// Name of the topic inventory report: `{account}-{region}-{timestamp}`.
    #[must_use]
    pub fn topic_inventory(account: &AccountContext, generated_at: DateTime<Utc>) -> Self {
        Self(format!(
            "{}-{}-{}",
            account.account_id(),
            account.region(),
            generated_at.format(REPORT_TIMESTAMP_FORMAT)
        ))
    }

    /// Name of the write-operation report:
    /// `sns-write-operations-{account}-{region}-{timestamp}`.
    #[must_use]
    pub fn write_operations(account: &AccountContext, generated_at: DateTime<Utc>) -> Self {
        Self(format!(
            "{WRITE_OPERATIONS_PREFIX}-{}-{}-{}",
            account.account_id(),
            account.region(),
            generated_at.format(REPORT_TIMESTAMP_FORMAT)
        ))
    }

    /// Returns the CSV file name.
    #[must_use]
    pub fn file_name(&self) -> String {
        format!("{}.csv", self.0)
    }
}

/// Header plus rows of a tabular report.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportTable {
    columns: Vec<String>,
    rows: Vec<Vec<String>>,
}

impl ReportTable {
    /// Creates an empty table with the given header.
    #[must_use]
    pub fn new(columns: &[&str]) -> Self {
        Self {
            columns: columns.iter().map(|column| (*column).to_owned()).collect(),
            rows: Vec::new(),
        }
    }

    /// Appends a row; its width must match the header.
    pub fn push_row(&mut self, row: Vec<String>) -> AppResult<()> {
        if row.len() != self.columns.len() {
            return Err(AppError::Internal(format!(
                "report row has {} fields, expected {}",
                row.len(),
                self.columns.len()
            )));
        }

        self.rows.push(row);
        Ok(())
    }

    /// Returns the header columns.
    #[must_use]
    pub fn columns(&self) -> &[String] {
        self.columns.as_slice()
    }

    /// Returns the data rows.
    #[must_use]
    pub fn rows(&self) -> &[Vec<String>] {
        self.rows.as_slice()
    }

    /// Returns the number of data rows.
    #[must_use]
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }
}
