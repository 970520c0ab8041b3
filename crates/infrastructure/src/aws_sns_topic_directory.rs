use async_trait::async_trait;
use aws_sdk_sns::Client;
use aws_sdk_sns::error::DisplayErrorContext;

use sns_audit_application::{Page, TopicDirectory};
use sns_audit_core::{AppError, AppResult};
use sns_audit_domain::{Subscription, Topic};

const POLICY_ATTRIBUTE: &str = "Policy";

/// SNS-backed topic directory.
#[derive(Clone)]
pub struct AwsSnsTopicDirectory {
    client: Client,
}

impl AwsSnsTopicDirectory {
    /// Creates a directory over an SNS client.
    #[must_use]
    pub fn new(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl TopicDirectory for AwsSnsTopicDirectory {
    async fn list_topics(&self, next_token: Option<String>) -> AppResult<Page<Topic>> {
        let output = self
            .client
            .list_topics()
            .set_next_token(next_token)
            .send()
            .await
            .map_err(|error| {
                AppError::Upstream(format!(
                    "failed to list topics: {}",
                    DisplayErrorContext(&error)
                ))
            })?;

        let topics = output
            .topics()
            .iter()
            .filter_map(|topic| topic.topic_arn())
            .map(Topic::new)
            .collect::<AppResult<Vec<_>>>()?;

        Ok(Page::new(topics, output.next_token().map(str::to_owned)))
    }

    async fn list_subscriptions(
        &self,
        topic: &Topic,
        next_token: Option<String>,
    ) -> AppResult<Page<Subscription>> {
        let output = self
            .client
            .list_subscriptions_by_topic()
            .topic_arn(topic.arn())
            .set_next_token(next_token)
            .send()
            .await
            .map_err(|error| {
                AppError::Upstream(format!(
                    "failed to list subscriptions of topic '{}': {}",
                    topic.arn(),
                    DisplayErrorContext(&error)
                ))
            })?;

        let subscriptions = output
            .subscriptions()
            .iter()
            .map(|subscription| Subscription {
                subscription_arn: subscription
                    .subscription_arn()
                    .unwrap_or_default()
                    .to_owned(),
                protocol: subscription.protocol().unwrap_or_default().to_owned(),
                endpoint: subscription.endpoint().unwrap_or_default().to_owned(),
            })
            .collect();

        Ok(Page::new(
            subscriptions,
            output.next_token().map(str::to_owned),
        ))
    }

    async fn get_policy_attribute(&self, topic: &Topic) -> AppResult<Option<String>> {
        let output = self
            .client
            .get_topic_attributes()
            .topic_arn(topic.arn())
            .send()
            .await
            .map_err(|error| {
                if error
                    .as_service_error()
                    .is_some_and(|service_error| service_error.is_not_found_exception())
                {
                    return AppError::NotFound(format!("topic '{}' does not exist", topic.arn()));
                }

                AppError::Upstream(format!(
                    "failed to get attributes of topic '{}': {}",
                    topic.arn(),
                    DisplayErrorContext(&error)
                ))
            })?;

        Ok(output
            .attributes()
            .and_then(|attributes| attributes.get(POLICY_ATTRIBUTE))
            .cloned())
    }
}
