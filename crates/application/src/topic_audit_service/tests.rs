use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;

use chrono::{TimeZone, Utc};

use sns_audit_domain::{
    AccountContext, POLICY_NOT_FOUND_REASON, Subscription, TOPIC_REPORT_COLUMNS, Topic,
    TopicPolicy,
};

use crate::test_support::{FakePolicy, FakeTopicDirectory, RecordingReportSink, ScriptedPage};

use super::{TopicAuditOutcome, TopicAuditService};

const ORDERS_ARN: &str = "arn:aws:sns:us-east-1:123456789012:orders";
const ALERTS_ARN: &str = "arn:aws:sns:us-east-1:123456789012:alerts";

fn topic(arn: &str) -> Topic {
    Topic::new(arn).unwrap_or_else(|_| unreachable!())
}

fn subscription(index: usize) -> Subscription {
    Subscription {
        subscription_arn: format!("{ORDERS_ARN}:sub-{index}"),
        protocol: "sqs".to_owned(),
        endpoint: format!("arn:aws:sqs:us-east-1:123456789012:queue-{index}"),
    }
}

fn account() -> AccountContext {
    AccountContext::new("123456789012", "us-east-1").unwrap_or_else(|_| unreachable!())
}

fn publish_policy(principals: &[&str]) -> FakePolicy {
    let statements: Vec<String> = principals
        .iter()
        .map(|principal| {
            format!(r#"{{"Effect":"Allow","Action":["sns:Publish"],"Principal":"{principal}"}}"#)
        })
        .collect();
    FakePolicy::Attribute(Some(format!(
        r#"{{"Version":"2008-10-17","Statement":[{}]}}"#,
        statements.join(",")
    )))
}

fn service(directory: FakeTopicDirectory) -> (TopicAuditService, Arc<RecordingReportSink>) {
    let sink = Arc::new(RecordingReportSink::default());
    (
        TopicAuditService::new(Arc::new(directory), sink.clone()),
        sink,
    )
}

#[tokio::test]
async fn list_subscriptions_follows_every_page() {
    let mut subscription_pages = HashMap::new();
    subscription_pages.insert(
        ORDERS_ARN.to_owned(),
        vec![
            ScriptedPage::Items((0..10).map(subscription).collect()),
            ScriptedPage::Items((10..20).map(subscription).collect()),
            ScriptedPage::Items((20..30).map(subscription).collect()),
        ],
    );
    let (service, _) = service(FakeTopicDirectory {
        subscription_pages,
        ..FakeTopicDirectory::default()
    });

    let subscriptions = service.list_subscriptions(&topic(ORDERS_ARN)).await;

    assert!(subscriptions.is_ok());
    let subscriptions = subscriptions.unwrap_or_default();
    assert_eq!(subscriptions.len(), 30);
    assert_eq!(subscriptions[29], subscription(29));
}

#[tokio::test]
async fn inspect_policy_maps_not_found_to_placeholder() {
    let mut policies = HashMap::new();
    policies.insert(ORDERS_ARN.to_owned(), FakePolicy::NotFound);
    policies.insert(
        ALERTS_ARN.to_owned(),
        FakePolicy::Failure("access denied".to_owned()),
    );
    let (service, _) = service(FakeTopicDirectory {
        policies,
        ..FakeTopicDirectory::default()
    });

    let not_found = service.inspect_policy(&topic(ORDERS_ARN)).await;
    let failed = service.inspect_policy(&topic(ALERTS_ARN)).await;

    assert_eq!(
        not_found,
        TopicPolicy::Unavailable {
            reason: POLICY_NOT_FOUND_REASON.to_owned()
        }
    );
    assert!(matches!(
        failed,
        TopicPolicy::Unavailable { ref reason } if reason.contains("access denied")
    ));
    assert!(failed.publishers().as_slice().is_empty());
}

#[tokio::test]
async fn run_writes_placeholder_and_per_subscription_rows() {
    let mut subscription_pages = HashMap::new();
    subscription_pages.insert(
        ORDERS_ARN.to_owned(),
        vec![ScriptedPage::Items(vec![subscription(1), subscription(2)])],
    );
    let mut policies = HashMap::new();
    policies.insert(ORDERS_ARN.to_owned(), publish_policy(&["A", "B"]));
    policies.insert(ALERTS_ARN.to_owned(), FakePolicy::NotFound);
    let (service, sink) = service(FakeTopicDirectory {
        topic_pages: vec![ScriptedPage::Items(vec![
            topic(ORDERS_ARN),
            topic(ALERTS_ARN),
        ])],
        subscription_pages,
        policies,
    });
    let generated_at = Utc
        .with_ymd_and_hms(2024, 6, 1, 12, 30, 45)
        .single()
        .unwrap_or_else(|| unreachable!());

    let outcome = service.run(&account(), generated_at).await;

    assert!(outcome.is_ok());
    let outcome = outcome.unwrap_or_else(|_| unreachable!());
    let TopicAuditOutcome::Written(summary) = outcome else {
        unreachable!("expected a written report");
    };
    assert_eq!(summary.topic_count, 2);
    assert_eq!(summary.row_count, 3);
    assert_eq!(
        summary.location,
        PathBuf::from("123456789012-us-east-1-20240601_123045.csv")
    );

    let reports = sink.reports.lock().await;
    assert_eq!(reports.len(), 1);
    let table = &reports[0].1;
    assert_eq!(table.columns(), TOPIC_REPORT_COLUMNS);
    assert_eq!(table.rows()[0][0], ORDERS_ARN);
    assert_eq!(table.rows()[0][4], "A; B");
    assert_eq!(table.rows()[1][1], subscription(2).subscription_arn);
    assert_eq!(table.rows()[1][4], "A; B");
    assert_eq!(
        table.rows()[2],
        vec![
            ALERTS_ARN.to_owned(),
            String::new(),
            String::new(),
            String::new(),
            String::new(),
        ]
    );
}

#[tokio::test]
async fn run_without_topics_writes_nothing() {
    let (service, sink) = service(FakeTopicDirectory::default());

    let outcome = service.run(&account(), Utc::now()).await;

    assert!(matches!(outcome, Ok(TopicAuditOutcome::NoTopics)));
    assert!(sink.reports.lock().await.is_empty());
}

#[tokio::test]
async fn subscription_listing_failure_aborts_without_report() {
    let mut subscription_pages = HashMap::new();
    subscription_pages.insert(
        ALERTS_ARN.to_owned(),
        vec![
            ScriptedPage::Items(vec![subscription(1)]),
            ScriptedPage::Failure("throttled".to_owned()),
        ],
    );
    let (service, sink) = service(FakeTopicDirectory {
        topic_pages: vec![ScriptedPage::Items(vec![
            topic(ORDERS_ARN),
            topic(ALERTS_ARN),
        ])],
        subscription_pages,
        ..FakeTopicDirectory::default()
    });

    let outcome = service.run(&account(), Utc::now()).await;

    assert!(outcome.is_err());
    assert!(sink.reports.lock().await.is_empty());
}

#[tokio::test]
async fn topic_listing_failure_propagates() {
    let (service, _) = service(FakeTopicDirectory {
        topic_pages: vec![
            ScriptedPage::Items(vec![topic(ORDERS_ARN)]),
            ScriptedPage::Failure("expired token".to_owned()),
        ],
        ..FakeTopicDirectory::default()
    });

    let topics = service.list_topics().await;

    assert!(topics.is_err());
}
