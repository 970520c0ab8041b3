//! Topic, subscriber and publisher inventory.

use std::path::PathBuf;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tracing::{info, warn};

use sns_audit_core::{AppError, AppResult};
use sns_audit_domain::{
    AccountContext, POLICY_NOT_FOUND_REASON, ReportName, ReportTable, Subscription,
    TOPIC_REPORT_COLUMNS, Topic, TopicPolicy, TopicReportRow, flatten_topic_rows,
};

use crate::{Page, PageCursor, PageSource, ReportSink, TopicDirectory};

#[cfg(test)]
mod tests;

struct TopicPages<'a> {
    directory: &'a dyn TopicDirectory,
}

#[async_trait]
impl PageSource for TopicPages<'_> {
    type Item = Topic;

    async fn fetch_page(&self, next_token: Option<String>) -> AppResult<Page<Topic>> {
        self.directory.list_topics(next_token).await
    }
}

struct SubscriptionPages<'a> {
    directory: &'a dyn TopicDirectory,
    topic: &'a Topic,
}

#[async_trait]
impl PageSource for SubscriptionPages<'_> {
    type Item = Subscription;

    async fn fetch_page(&self, next_token: Option<String>) -> AppResult<Page<Subscription>> {
        self.directory
            .list_subscriptions(self.topic, next_token)
            .await
    }
}

/// Result of one topic audit run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TopicAuditOutcome {
    /// The account has no topics; no report was written.
    NoTopics,
    /// The report was written.
    Written(TopicAuditSummary),
}

/// Totals of a written topic report.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TopicAuditSummary {
    /// Number of audited topics.
    pub topic_count: usize,
    /// Number of report rows.
    pub row_count: usize,
    /// Where the report was written.
    pub location: PathBuf,
}

/// Application service for the topic inventory audit.
#[derive(Clone)]
pub struct TopicAuditService {
    directory: Arc<dyn TopicDirectory>,
    report_sink: Arc<dyn ReportSink>,
}

impl TopicAuditService {
    /// Creates a service from port implementations.
    #[must_use]
    pub fn new(directory: Arc<dyn TopicDirectory>, report_sink: Arc<dyn ReportSink>) -> Self {
        Self {
            directory,
            report_sink,
        }
    }

    /// Lists every topic, following continuation tokens.
    pub async fn list_topics(&self) -> AppResult<Vec<Topic>> {
        PageCursor::new(TopicPages {
            directory: self.directory.as_ref(),
        })
        .collect_all()
        .await
    }

    /// Lists every subscription of a topic, following continuation tokens.
    pub async fn list_subscriptions(&self, topic: &Topic) -> AppResult<Vec<Subscription>> {
        PageCursor::new(SubscriptionPages {
            directory: self.directory.as_ref(),
            topic,
        })
        .collect_all()
        .await
    }

    /// Fetches and parses a topic's policy. Never fails: fetch and parse
    /// errors become [`TopicPolicy::Unavailable`].
    pub async fn inspect_policy(&self, topic: &Topic) -> TopicPolicy {
        match self.directory.get_policy_attribute(topic).await {
            Ok(attribute) => TopicPolicy::from_attribute(attribute.as_deref()),
            Err(AppError::NotFound(_)) => TopicPolicy::Unavailable {
                reason: POLICY_NOT_FOUND_REASON.to_owned(),
            },
            Err(error) => TopicPolicy::Unavailable {
                reason: error.to_string(),
            },
        }
    }

    /// Builds report rows for the given topics, in topic order.
    pub async fn collect_rows(&self, topics: &[Topic]) -> AppResult<Vec<TopicReportRow>> {
        let mut rows = Vec::new();

        for topic in topics {
            let subscriptions = self.list_subscriptions(topic).await?;
            let policy = self.inspect_policy(topic).await;
            if let TopicPolicy::Unavailable { reason } = &policy {
                warn!(
                    topic_arn = %topic.arn(),
                    reason = %reason,
                    "topic policy unavailable; reporting no publishers"
                );
            }

            let publishers = policy.publishers().to_report_value();
            info!(
                topic_arn = %topic.arn(),
                subscription_count = subscriptions.len(),
                "audited topic"
            );
            rows.extend(flatten_topic_rows(topic, &subscriptions, &publishers));
        }

        Ok(rows)
    }

    /// Runs the full audit and writes the report.
    ///
    /// Listing failures abort the run before anything is written.
    pub async fn run(
        &self,
        account: &AccountContext,
        generated_at: DateTime<Utc>,
    ) -> AppResult<TopicAuditOutcome> {
        let topics = self.list_topics().await?;
        if topics.is_empty() {
            info!(
                account_id = %account.account_id(),
                region = %account.region(),
                "no SNS topics found in the account"
            );
            return Ok(TopicAuditOutcome::NoTopics);
        }

        info!(topic_count = topics.len(), "listed SNS topics");
        let rows = self.collect_rows(&topics).await?;

        let mut table = ReportTable::new(&TOPIC_REPORT_COLUMNS);
        for row in rows {
            table.push_row(row.into_fields())?;
        }

        let name = ReportName::topic_inventory(account, generated_at);
        let location = self.report_sink.write_report(&name, &table).await?;
        info!(
            topic_count = topics.len(),
            row_count = table.row_count(),
            path = %location.display(),
            "results saved"
        );

        Ok(TopicAuditOutcome::Written(TopicAuditSummary {
            topic_count: topics.len(),
            row_count: table.row_count(),
            location,
        }))
    }
}
