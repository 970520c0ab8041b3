//! Infrastructure adapters for application ports.

#![forbid(unsafe_code)]

mod aws_cloudtrail_event_source;
mod aws_sns_topic_directory;
mod aws_sts_caller_identity;
mod csv_report_writer;

pub use aws_cloudtrail_event_source::AwsCloudTrailEventSource;
pub use aws_sns_topic_directory::AwsSnsTopicDirectory;
pub use aws_sts_caller_identity::AwsStsCallerIdentity;
pub use csv_report_writer::CsvReportWriter;
