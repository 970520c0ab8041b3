use async_trait::async_trait;
use aws_sdk_cloudtrail::Client;
use aws_sdk_cloudtrail::error::DisplayErrorContext;
use aws_sdk_cloudtrail::primitives::DateTime as SdkDateTime;
use aws_sdk_cloudtrail::types::{Event, LookupAttribute, LookupAttributeKey};
use chrono::{DateTime, Utc};

use sns_audit_application::{AuditEventSource, Page};
use sns_audit_core::{AppError, AppResult};
use sns_audit_domain::{AuditResource, LookupWindow, RawAuditEvent};

/// CloudTrail-backed audit event lookup.
#[derive(Clone)]
pub struct AwsCloudTrailEventSource {
    client: Client,
}

impl AwsCloudTrailEventSource {
    /// Creates an event source over a CloudTrail client.
    #[must_use]
    pub fn new(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl AuditEventSource for AwsCloudTrailEventSource {
    async fn lookup_events(
        &self,
        event_name: &str,
        window: LookupWindow,
        next_token: Option<String>,
    ) -> AppResult<Page<RawAuditEvent>> {
        let attribute = LookupAttribute::builder()
            .attribute_key(LookupAttributeKey::EventName)
            .attribute_value(event_name)
            .build()
            .map_err(|error| {
                AppError::Internal(format!(
                    "failed to build lookup attribute for '{event_name}': {error}"
                ))
            })?;

        let output = self
            .client
            .lookup_events()
            .lookup_attributes(attribute)
            .start_time(to_sdk_time(window.start()))
            .end_time(to_sdk_time(window.end()))
            .set_next_token(next_token)
            .send()
            .await
            .map_err(|error| {
                AppError::Upstream(format!(
                    "failed to look up '{event_name}' events: {}",
                    DisplayErrorContext(&error)
                ))
            })?;

        let events = output.events().iter().map(to_raw_event).collect();

        Ok(Page::new(events, output.next_token().map(str::to_owned)))
    }
}

fn to_sdk_time(time: DateTime<Utc>) -> SdkDateTime {
    SdkDateTime::from_secs(time.timestamp())
}

fn to_raw_event(event: &Event) -> RawAuditEvent {
    RawAuditEvent {
        event_time: event
            .event_time()
            .and_then(|time| DateTime::<Utc>::from_timestamp(time.secs(), time.subsec_nanos())),
        event_name: event.event_name().map(str::to_owned),
        username: event.username().map(str::to_owned),
        // Lookup results only carry caller details inside the raw payload.
        source_ip_address: None,
        user_agent: None,
        resources: event
            .resources()
            .iter()
            .map(|resource| AuditResource {
                name: resource.resource_name().map(str::to_owned),
                resource_type: resource.resource_type().map(str::to_owned),
            })
            .collect(),
        payload: event.cloud_trail_event().map(str::to_owned),
    }
}
