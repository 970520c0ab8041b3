use std::path::PathBuf;

use async_trait::async_trait;

use sns_audit_core::AppResult;
use sns_audit_domain::{
    LookupWindow, RawAuditEvent, ReportName, ReportTable, Subscription, Topic,
};

use crate::Page;

/// Port for the topic and subscription management API.
#[async_trait]
pub trait TopicDirectory: Send + Sync {
    /// Lists one page of topics in the account and region.
    async fn list_topics(&self, next_token: Option<String>) -> AppResult<Page<Topic>>;

    /// Lists one page of subscriptions of a topic.
    async fn list_subscriptions(
        &self,
        topic: &Topic,
        next_token: Option<String>,
    ) -> AppResult<Page<Subscription>>;

    /// Returns the raw JSON policy attribute of a topic, if set.
    ///
    /// Returns `AppError::NotFound` when the topic no longer exists.
    async fn get_policy_attribute(&self, topic: &Topic) -> AppResult<Option<String>>;
}

/// Port for resolving the caller's account.
#[async_trait]
pub trait CallerIdentity: Send + Sync {
    /// Returns the account identifier of the active credentials.
    async fn account_id(&self) -> AppResult<String>;
}

/// Port for the audit log lookup API.
#[async_trait]
pub trait AuditEventSource: Send + Sync {
    /// Lists one page of events with exactly this event name inside `window`.
    async fn lookup_events(
        &self,
        event_name: &str,
        window: LookupWindow,
        next_token: Option<String>,
    ) -> AppResult<Page<RawAuditEvent>>;
}

/// Port for persisting finished reports.
#[async_trait]
pub trait ReportSink: Send + Sync {
    /// Stores the report and returns where it was written.
    async fn write_report(&self, name: &ReportName, table: &ReportTable) -> AppResult<PathBuf>;
}
