use async_trait::async_trait;
use aws_sdk_sts::Client;
use aws_sdk_sts::error::DisplayErrorContext;

use sns_audit_application::CallerIdentity;
use sns_audit_core::{AppError, AppResult};

/// STS-backed caller identity lookup.
#[derive(Clone)]
pub struct AwsStsCallerIdentity {
    client: Client,
}

impl AwsStsCallerIdentity {
    /// Creates a lookup over an STS client.
    #[must_use]
    pub fn new(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl CallerIdentity for AwsStsCallerIdentity {
    async fn account_id(&self) -> AppResult<String> {
        let output = self
            .client
            .get_caller_identity()
            .send()
            .await
            .map_err(|error| {
                AppError::Upstream(format!(
                    "failed to resolve caller identity: {}",
                    DisplayErrorContext(&error)
                ))
            })?;

        output.account().map(str::to_owned).ok_or_else(|| {
            AppError::Upstream("caller identity response has no account".to_owned())
        })
    }
}
