//! Audit of historical write operations against topics.

use std::path::PathBuf;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tracing::{info, warn};

use sns_audit_core::AppResult;
use sns_audit_domain::{
    AccountContext, LookupWindow, RawAuditEvent, ReportName, ReportTable,
    WRITE_OPERATION_EVENT_NAMES, WRITE_OPERATION_REPORT_COLUMNS, WriteOperationRecord,
    sort_newest_first,
};

use crate::{AuditEventSource, Page, PageCursor, PageSource, ReportSink};


const WINDOW_DATE_FORMAT: &str = "%Y-%m-%d";

struct EventPages<'a> {
    source: &'a dyn AuditEventSource,
    event_name: &'a str,
    window: LookupWindow,
}

#[async_trait]
impl PageSource for EventPages<'_> {
    type Item = RawAuditEvent;

    async fn fetch_page(&self, next_token: Option<String>) -> AppResult<Page<RawAuditEvent>> {
        self.source
            .lookup_events(self.event_name, self.window, next_token)
            .await
    }
}

/// Normalized events gathered across all queried event names.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WriteOperationCollection {
    /// Records sorted newest first.
    pub records: Vec<WriteOperationRecord>,
    /// Event names whose query stopped early because of an error.
    pub failed_event_names: Vec<String>,
}

/// Result of one write-operation audit run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WriteOperationOutcome {
    /// No events were found; no report was written.
    NoEvents {
        /// Event names whose query stopped early because of an error.
        failed_event_names: Vec<String>,
    },
    /// The report was written.
    Written(WriteOperationSummary),
}

/// Totals of a written write-operation report.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WriteOperationSummary {
    /// Number of reported events.
    pub event_count: usize,
    /// Event names whose query stopped early because of an error.
    pub failed_event_names: Vec<String>,
    /// Where the report was written.
    pub location: PathBuf,
}

/// Application service for the write-operation audit.
#[derive(Clone)]
pub struct WriteOperationAuditService {
    event_source: Arc<dyn AuditEventSource>,
    report_sink: Arc<dyn ReportSink>,
}

impl WriteOperationAuditService {
    /// Creates a service from port implementations.
    #[must_use]
    pub fn new(event_source: Arc<dyn AuditEventSource>, report_sink: Arc<dyn ReportSink>) -> Self {
        Self {
            event_source,
            report_sink,
        }
    }

    /// Queries every write-operation event name inside `window`.
    ///
    /// A failing query keeps the pages fetched before the failure and the
    /// remaining event names are still queried.
    pub async fn collect_records(&self, window: LookupWindow) -> WriteOperationCollection {
        let mut collection = WriteOperationCollection::default();

        for event_name in WRITE_OPERATION_EVENT_NAMES {
            info!(event_name, "querying events");
            let mut cursor = PageCursor::new(EventPages {
                source: self.event_source.as_ref(),
                event_name,
                window,
            });

            loop {
                match cursor.next_page().await {
                    Ok(Some(events)) => collection
                        .records
                        .extend(events.iter().map(WriteOperationRecord::from_raw)),
                    Ok(None) => break,
                    Err(error) => {
                        warn!(event_name, error = %error, "failed to query events");
                        collection.failed_event_names.push(event_name.to_owned());
                        break;
                    }
                }
            }
        }

        sort_newest_first(&mut collection.records);
        collection
    }

    /// Runs the audit over the `lookback_days` before `now` and writes the
    /// report when any event was found.
    pub async fn run(
        &self,
        account: &AccountContext,
        now: DateTime<Utc>,
        lookback_days: u32,
    ) -> AppResult<WriteOperationOutcome> {
        let window = LookupWindow::ending_at(now, lookback_days)?;
        info!(
            start = %window.start().format(WINDOW_DATE_FORMAT),
            end = %window.end().format(WINDOW_DATE_FORMAT),
            "querying SNS write operations"
        );

        let collection = self.collect_records(window).await;
        if collection.records.is_empty() {
            if collection.failed_event_names.is_empty() {
                info!("no SNS write operations found in the specified time range");
            } else {
                warn!(
                    failed_event_names = ?collection.failed_event_names,
                    "no SNS write operations found; some event names could not be queried"
                );
            }
            return Ok(WriteOperationOutcome::NoEvents {
                failed_event_names: collection.failed_event_names,
            });
        }

        let event_count = collection.records.len();
        let mut table = ReportTable::new(&WRITE_OPERATION_REPORT_COLUMNS);
        for record in collection.records {
            table.push_row(record.into_fields())?;
        }

        let name = ReportName::write_operations(account, now);
        let location = self.report_sink.write_report(&name, &table).await?;
        info!(event_count, "found SNS write operations");
        info!(path = %location.display(), "results saved");
        if !collection.failed_event_names.is_empty() {
            warn!(
                failed_event_names = ?collection.failed_event_names,
                "report is incomplete for some event names"
            );
        }

        Ok(WriteOperationOutcome::Written(WriteOperationSummary {
            event_count,
            failed_event_names: collection.failed_event_names,
            location,
        }))
    }
}
