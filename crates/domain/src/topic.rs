use sns_audit_core::{AppResult, NonEmptyString};

/// CSV columns of the topic inventory report, in output order.
pub const TOPIC_REPORT_COLUMNS: [&str; 5] = [
    "TopicArn",
    "SubscriptionArn",
    "Protocol",
    "Endpoint",
    "Publishers",
];

/// Messaging topic identified by its ARN.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Topic {
    arn: NonEmptyString,
}

impl Topic {
    /// Creates a topic from its ARN.
    pub fn new(arn: impl Into<String>) -> AppResult<Self> {
        Ok(Self {
            arn: NonEmptyString::new(arn)?,
        })
    }

    /// Returns the topic ARN.
    #[must_use]
    pub fn arn(&self) -> &str {
        self.arn.as_str()
    }
}

/// Read-only snapshot of one topic subscriber.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Subscription {
    /// Subscription ARN, or a pending-confirmation marker.
    pub subscription_arn: String,
    /// Delivery protocol such as `email`, `sqs` or `https`.
    pub protocol: String,
    /// Delivery endpoint address.
    pub endpoint: String,
}

/// One flattened row of the topic inventory report.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TopicReportRow {
    /// Topic ARN.
    pub topic_arn: String,
    /// Subscription ARN, empty on a topic's placeholder row.
    pub subscription_arn: String,
    /// Delivery protocol, empty on a topic's placeholder row.
    pub protocol: String,
    /// Delivery endpoint, empty on a topic's placeholder row.
    pub endpoint: String,
    /// `; `-joined publisher principals of the topic.
    pub publishers: String,
}

impl TopicReportRow {
    /// Returns the row values in [`TOPIC_REPORT_COLUMNS`] order.
    #[must_use]
    pub fn into_fields(self) -> Vec<String> {
        vec![
            self.topic_arn,
            self.subscription_arn,
            self.protocol,
            self.endpoint,
            self.publishers,
        ]
    }
}

/// Flattens one topic with its subscriptions into report rows.
///
/// A topic without subscriptions still yields exactly one row, with empty
/// subscription columns. Every row of a topic repeats the same publishers.
#[must_use]
pub fn flatten_topic_rows(
    topic: &Topic,
    subscriptions: &[Subscription],
    publishers: &str,
) -> Vec<TopicReportRow> {
    if subscriptions.is_empty() {
        return vec![TopicReportRow {
            topic_arn: topic.arn().to_owned(),
            subscription_arn: String::new(),
            protocol: String::new(),
            endpoint: String::new(),
            publishers: publishers.to_owned(),
        }];
    }

    subscriptions
        .iter()
        .map(|subscription| TopicReportRow {
            topic_arn: topic.arn().to_owned(),
            subscription_arn: subscription.subscription_arn.clone(),
            protocol: subscription.protocol.clone(),
            endpoint: subscription.endpoint.clone(),
            publishers: publishers.to_owned(),
        })
        .collect()
}
