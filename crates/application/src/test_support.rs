use std::collections::HashMap;
use std::path::PathBuf;

use async_trait::async_trait;
use tokio::sync::Mutex;

use sns_audit_core::{AppError, AppResult};
use sns_audit_domain::{
    LookupWindow, RawAuditEvent, ReportName, ReportTable, Subscription, Topic,
};

use crate::{AuditEventSource, CallerIdentity, Page, ReportSink, TopicDirectory};

/// Scripted result of one page request.
pub enum ScriptedPage<T> {
    Items(Vec<T>),
    Failure(String),
}

/// Serves scripted pages, chaining them with `page-{n}` tokens.
fn serve_page<T: Clone>(
    pages: &[ScriptedPage<T>],
    next_token: Option<&str>,
) -> AppResult<Page<T>> {
    let index = next_token
        .and_then(|token| token.strip_prefix("page-"))
        .and_then(|index| index.parse::<usize>().ok())
        .unwrap_or(0);

    match pages.get(index) {
        None => Ok(Page::last(Vec::new())),
        Some(ScriptedPage::Failure(message)) => Err(AppError::Upstream(message.clone())),
        Some(ScriptedPage::Items(items)) => {
            let next_token = (index + 1 < pages.len()).then(|| format!("page-{}", index + 1));
            Ok(Page::new(items.clone(), next_token))
        }
    }
}

pub enum FakePolicy {
    Attribute(Option<String>),
    NotFound,
    Failure(String),
}

#[derive(Default)]
pub struct FakeTopicDirectory {
    pub topic_pages: Vec<ScriptedPage<Topic>>,
    pub subscription_pages: HashMap<String, Vec<ScriptedPage<Subscription>>>,
    pub policies: HashMap<String, FakePolicy>,
}

#[async_trait]
impl TopicDirectory for FakeTopicDirectory {
    async fn list_topics(&self, next_token: Option<String>) -> AppResult<Page<Topic>> {
        serve_page(&self.topic_pages, next_token.as_deref())
    }

    async fn list_subscriptions(
        &self,
        topic: &Topic,
        next_token: Option<String>,
    ) -> AppResult<Page<Subscription>> {
        match self.subscription_pages.get(topic.arn()) {
            Some(pages) => serve_page(pages, next_token.as_deref()),
            None => Ok(Page::last(Vec::new())),
        }
    }

    async fn get_policy_attribute(&self, topic: &Topic) -> AppResult<Option<String>> {
        match self.policies.get(topic.arn()) {
            None => Ok(None),
            Some(FakePolicy::Attribute(attribute)) => Ok(attribute.clone()),
            Some(FakePolicy::NotFound) => Err(AppError::NotFound(format!(
                "topic '{}' does not exist",
                topic.arn()
            ))),
            Some(FakePolicy::Failure(message)) => Err(AppError::Upstream(message.clone())),
        }
    }
}

#[derive(Default)]
pub struct FakeAuditEventSource {
    pub pages: HashMap<String, Vec<ScriptedPage<RawAuditEvent>>>,
    pub requests: Mutex<Vec<(String, Option<String>)>>,
}

#[async_trait]
impl AuditEventSource for FakeAuditEventSource {
    async fn lookup_events(
        &self,
        event_name: &str,
        _window: LookupWindow,
        next_token: Option<String>,
    ) -> AppResult<Page<RawAuditEvent>> {
        self.requests
            .lock()
            .await
            .push((event_name.to_owned(), next_token.clone()));

        match self.pages.get(event_name) {
            Some(pages) => serve_page(pages, next_token.as_deref()),
            None => Ok(Page::last(Vec::new())),
        }
    }
}

pub struct FakeCallerIdentity(pub String);

#[async_trait]
impl CallerIdentity for FakeCallerIdentity {
    async fn account_id(&self) -> AppResult<String> {
        Ok(self.0.clone())
    }
}

#[derive(Default)]
pub struct RecordingReportSink {
    pub reports: Mutex<Vec<(ReportName, ReportTable)>>,
}

#[async_trait]
impl ReportSink for RecordingReportSink {
    async fn write_report(&self, name: &ReportName, table: &ReportTable) -> AppResult<PathBuf> {
        self.reports
            .lock()
            .await
            .push((name.clone(), table.clone()));
        Ok(PathBuf::from(name.file_name()))
    }
}
