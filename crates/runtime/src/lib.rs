//! Runtime bootstrap shared by the SNS audit binaries: configuration,
//! cloud SDK wiring and console tracing.

#![forbid(unsafe_code)]

use std::env;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use aws_config::{BehaviorVersion, SdkConfig};
use tracing::error;
use tracing_subscriber::EnvFilter;

use sns_audit_application::resolve_account_context;
use sns_audit_core::{AppError, AppResult};
use sns_audit_domain::{AccountContext, DEFAULT_LOOKBACK_DAYS};
use sns_audit_infrastructure::{
    AwsCloudTrailEventSource, AwsSnsTopicDirectory, AwsStsCallerIdentity, CsvReportWriter,
};

/// Runtime settings read from the environment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuditConfig {
    /// Directory CSV reports are written to.
    pub output_dir: PathBuf,
    /// Length of the write-operation lookback window in days.
    pub lookback_days: u32,
}

impl AuditConfig {
    /// Loads settings, falling back to defaults for unset variables.
    pub fn load() -> AppResult<Self> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> AppResult<Self> {
        let output_dir = lookup("SNS_AUDIT_OUTPUT_DIR")
            .map(|value| value.trim().to_owned())
            .filter(|value| !value.is_empty())
            .map_or_else(|| PathBuf::from("."), PathBuf::from);
        let lookback_days = match lookup("SNS_AUDIT_LOOKBACK_DAYS") {
            Some(value) => value.trim().parse::<u32>().map_err(|error| {
                AppError::Validation(format!(
                    "invalid SNS_AUDIT_LOOKBACK_DAYS value '{value}': {error}"
                ))
            })?,
            None => DEFAULT_LOOKBACK_DAYS,
        };

        if lookback_days == 0 {
            return Err(AppError::Validation(
                "SNS_AUDIT_LOOKBACK_DAYS must be greater than zero".to_owned(),
            ));
        }

        Ok(Self {
            output_dir,
            lookback_days,
        })
    }

    /// Builds the CSV report writer for the configured directory.
    #[must_use]
    pub fn report_writer(&self) -> Arc<CsvReportWriter> {
        Arc::new(CsvReportWriter::new(self.output_dir.clone()))
    }
}

/// Cloud SDK configuration resolved from the default provider chain.
pub struct CloudEnvironment {
    sdk_config: SdkConfig,
    region: String,
}

impl CloudEnvironment {
    /// Resolves credentials and region from the ambient configuration.
    pub async fn load() -> AppResult<Self> {
        let sdk_config = aws_config::defaults(BehaviorVersion::latest()).load().await;
        let region = sdk_config
            .region()
            .map(ToString::to_string)
            .ok_or_else(|| AppError::Validation("AWS region is not configured".to_owned()))?;

        Ok(Self { sdk_config, region })
    }

    /// Returns the resolved region name.
    #[must_use]
    pub fn region(&self) -> &str {
        self.region.as_str()
    }

    /// Resolves the account of the active credentials in this region.
    pub async fn account_context(&self) -> AppResult<AccountContext> {
        let identity = AwsStsCallerIdentity::new(aws_sdk_sts::Client::new(&self.sdk_config));
        resolve_account_context(&identity, self.region()).await
    }

    /// Builds the SNS topic directory adapter.
    #[must_use]
    pub fn topic_directory(&self) -> Arc<AwsSnsTopicDirectory> {
        Arc::new(AwsSnsTopicDirectory::new(aws_sdk_sns::Client::new(
            &self.sdk_config,
        )))
    }

    /// Builds the CloudTrail event source adapter.
    #[must_use]
    pub fn audit_event_source(&self) -> Arc<AwsCloudTrailEventSource> {
        Arc::new(AwsCloudTrailEventSource::new(
            aws_sdk_cloudtrail::Client::new(&self.sdk_config),
        ))
    }
}

/// Installs the console tracing subscriber; `RUST_LOG` overrides `info`.
pub fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .compact()
        .init();
}

/// Maps the outcome of a job to the process exit code, logging a failure
/// with its display text.
pub fn exit_code(job: &str, result: AppResult<()>) -> ExitCode {
    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(error) => {
            error!("{}", failure_message(job, &error));
            ExitCode::FAILURE
        }
    }
}

fn failure_message(job: &str, error: &AppError) -> String {
    format!("{job} failed: {error}")
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::path::PathBuf;
    use std::process::ExitCode;

    use sns_audit_core::AppError;

    use super::{AuditConfig, exit_code, failure_message};

    fn load_with(values: &[(&str, &str)]) -> Result<AuditConfig, String> {
        let values: HashMap<String, String> = values
            .iter()
            .map(|(name, value)| ((*name).to_owned(), (*value).to_owned()))
            .collect();
        AuditConfig::from_lookup(|name| values.get(name).cloned()).map_err(|error| error.to_string())
    }

    #[test]
    fn defaults_apply_when_unset() {
        let config = load_with(&[]);

        assert_eq!(
            config,
            Ok(AuditConfig {
                output_dir: PathBuf::from("."),
                lookback_days: 360,
            })
        );
    }

    #[test]
    fn overrides_are_read() {
        let config = load_with(&[
            ("SNS_AUDIT_OUTPUT_DIR", "/tmp/audits"),
            ("SNS_AUDIT_LOOKBACK_DAYS", " 30 "),
        ]);

        assert_eq!(
            config,
            Ok(AuditConfig {
                output_dir: PathBuf::from("/tmp/audits"),
                lookback_days: 30,
            })
        );
    }

    #[test]
    fn invalid_lookback_is_rejected() {
        assert!(load_with(&[("SNS_AUDIT_LOOKBACK_DAYS", "soon")]).is_err());
        assert!(load_with(&[("SNS_AUDIT_LOOKBACK_DAYS", "0")]).is_err());
    }

    #[test]
    fn failure_message_uses_display_text() {
        let error = AppError::Upstream("failed to list topics: expired token".to_owned());

        assert_eq!(
            failure_message("sns-topic-audit", &error),
            "sns-topic-audit failed: upstream error: failed to list topics: expired token"
        );
    }

    #[test]
    fn exit_code_reflects_job_result() {
        assert_eq!(exit_code("sns-write-audit", Ok(())), ExitCode::SUCCESS);
        assert_eq!(
            exit_code(
                "sns-write-audit",
                Err(AppError::Validation("AWS region is not configured".to_owned()))
            ),
            ExitCode::FAILURE
        );
    }
}
