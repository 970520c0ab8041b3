//! Write-operation audit events and their normalization into report rows.

use chrono::{DateTime, Duration, Utc};
use serde_json::Value;
use sns_audit_core::{AppError, AppResult};

/// Topic write operations queried from the audit log, in query order.
pub const WRITE_OPERATION_EVENT_NAMES: [&str; 9] = [
    "Publish",
    "PublishBatch",
    "CreateTopic",
    "DeleteTopic",
    "Subscribe",
    "Unsubscribe",
    "SetTopicAttributes",
    "AddPermission",
    "RemovePermission",
];

/// Default audit log lookback in days.
pub const DEFAULT_LOOKBACK_DAYS: u32 = 360;

/// CSV columns of the write-operation report, in output order.
pub const WRITE_OPERATION_REPORT_COLUMNS: [&str; 9] = [
    "EventTime",
    "EventName",
    "UserName",
    "SourceIPAddress",
    "UserAgent",
    "ResourceName",
    "ResourceType",
    "ErrorCode",
    "ErrorMessage",
];

/// Zero-padded fixed-width format; lexicographic order equals time order.
pub const EVENT_TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

const ERROR_CODE_MARKER: &str = "errorCode";

/// Closed time range an audit log query covers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LookupWindow {
    start: DateTime<Utc>,
    end: DateTime<Utc>,
}

impl LookupWindow {
    /// Creates the window `[end - days, end]`.
    pub fn ending_at(end: DateTime<Utc>, days: u32) -> AppResult<Self> {
        if days == 0 {
            return Err(AppError::Validation(
                "lookback window must span at least one day".to_owned(),
            ));
        }

        let start = end
            .checked_sub_signed(Duration::days(i64::from(days)))
            .ok_or_else(|| {
                AppError::Validation(format!("lookback of {days} days is out of range"))
            })?;

        Ok(Self { start, end })
    }

    /// Returns the inclusive start of the window.
    #[must_use]
    pub fn start(&self) -> DateTime<Utc> {
        self.start
    }

    /// Returns the inclusive end of the window.
    #[must_use]
    pub fn end(&self) -> DateTime<Utc> {
        self.end
    }
}

/// Resource attached to an audit record.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AuditResource {
    /// Resource name, usually a topic ARN.
    pub name: Option<String>,
    /// Resource type such as `AWS::SNS::Topic`.
    pub resource_type: Option<String>,
}

/// Audit record as returned by the audit log lookup API.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawAuditEvent {
    /// When the operation happened.
    pub event_time: Option<DateTime<Utc>>,
    /// Operation name.
    pub event_name: Option<String>,
    /// Acting user name.
    pub username: Option<String>,
    /// Caller IP address when the lookup API exposes it directly.
    pub source_ip_address: Option<String>,
    /// Caller user agent when the lookup API exposes it directly.
    pub user_agent: Option<String>,
    /// Resources referenced by the operation.
    pub resources: Vec<AuditResource>,
    /// Embedded raw event JSON.
    pub payload: Option<String>,
}

/// One normalized row of the write-operation report.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WriteOperationRecord {
    /// Event time formatted with [`EVENT_TIME_FORMAT`].
    pub event_time: String,
    /// Operation name.
    pub event_name: String,
    /// Acting user name.
    pub user_name: String,
    /// Caller IP address.
    pub source_ip_address: String,
    /// Caller user agent.
    pub user_agent: String,
    /// Name of the first referenced resource.
    pub resource_name: String,
    /// Type of the first referenced resource.
    pub resource_type: String,
    /// Server-side error code if the operation failed.
    pub error_code: String,
    /// Server-side error message if the operation failed.
    pub error_message: String,
}

impl WriteOperationRecord {
    /// Normalizes a raw audit record.
    ///
    /// Only the first resource is kept. Payload parsing is best-effort:
    /// malformed JSON leaves the payload-derived fields empty.
    #[must_use]
    pub fn from_raw(raw: &RawAuditEvent) -> Self {
        let payload = raw
            .payload
            .as_deref()
            .and_then(|text| serde_json::from_str::<Value>(text).ok());
        let has_error_marker = raw
            .payload
            .as_deref()
            .is_some_and(|text| text.contains(ERROR_CODE_MARKER));
        let first_resource = raw.resources.first();

        let (error_code, error_message) = match (&payload, has_error_marker) {
            (Some(payload), true) => (
                payload_field(payload, "errorCode"),
                payload_field(payload, "errorMessage"),
            ),
            _ => (String::new(), String::new()),
        };

        Self {
            event_time: raw
                .event_time
                .map(|time| time.format(EVENT_TIME_FORMAT).to_string())
                .unwrap_or_default(),
            event_name: raw.event_name.clone().unwrap_or_default(),
            user_name: raw.username.clone().unwrap_or_default(),
            source_ip_address: raw.source_ip_address.clone().unwrap_or_else(|| {
                payload
                    .as_ref()
                    .map(|payload| payload_field(payload, "sourceIPAddress"))
                    .unwrap_or_default()
            }),
            user_agent: raw.user_agent.clone().unwrap_or_else(|| {
                payload
                    .as_ref()
                    .map(|payload| payload_field(payload, "userAgent"))
                    .unwrap_or_default()
            }),
            resource_name: first_resource
                .and_then(|resource| resource.name.clone())
                .unwrap_or_default(),
            resource_type: first_resource
                .and_then(|resource| resource.resource_type.clone())
                .unwrap_or_default(),
            error_code,
            error_message,
        }
    }

    /// Returns the row values in [`WRITE_OPERATION_REPORT_COLUMNS`] order.
    #[must_use]
    pub fn into_fields(self) -> Vec<String> {
        vec![
            self.event_time,
            self.event_name,
            self.user_name,
            self.source_ip_address,
            self.user_agent,
            self.resource_name,
            self.resource_type,
            self.error_code,
            self.error_message,
        ]
    }
}

/// Sorts records newest first. Ties keep their collection order.
pub fn sort_newest_first(records: &mut [WriteOperationRecord]) {
    records.sort_by(|left, right| right.event_time.cmp(&left.event_time));
}

fn payload_field(payload: &Value, key: &str) -> String {
    match payload.get(key) {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(value)) => value.clone(),
        Some(other) => other.to_string(),
    }
}
