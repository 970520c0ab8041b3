//! Domain model for SNS topic and write-operation audits.

#![forbid(unsafe_code)]

mod account;
mod policy;
mod report;
mod topic;
mod write_operation;

pub use account::AccountContext;
pub use policy::{
    OneOrMany, POLICY_NOT_FOUND_REASON, PUBLISH_ACTION, PolicyDocument, PolicyStatement,
    Principal, Publishers, TopicPolicy,
};
pub use report::{REPORT_TIMESTAMP_FORMAT, ReportName, ReportTable};
pub use topic::{Subscription, TOPIC_REPORT_COLUMNS, Topic, TopicReportRow, flatten_topic_rows};
pub use write_operation::{
    AuditResource, DEFAULT_LOOKBACK_DAYS, EVENT_TIME_FORMAT, LookupWindow, RawAuditEvent,
    WRITE_OPERATION_EVENT_NAMES, WRITE_OPERATION_REPORT_COLUMNS, WriteOperationRecord,
    sort_newest_first,
};
