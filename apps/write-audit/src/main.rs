//! Reports SNS write operations recorded in the audit log.

#![forbid(unsafe_code)]

use std::process::ExitCode;

use chrono::Utc;
use tracing::info;

use sns_audit_application::WriteOperationAuditService;
use sns_audit_core::AppResult;
use sns_audit_runtime::{AuditConfig, CloudEnvironment, exit_code, init_tracing};

const JOB_NAME: &str = "sns-write-audit";

#[tokio::main]
async fn main() -> ExitCode {
    dotenvy::dotenv().ok();
    init_tracing();

    exit_code(JOB_NAME, run().await)
}

async fn run() -> AppResult<()> {
    let config = AuditConfig::load()?;
    let cloud = CloudEnvironment::load().await?;
    let account = cloud.account_context().await?;
    let now = Utc::now();

    info!(
        account_id = %account.account_id(),
        region = %account.region(),
        lookback_days = config.lookback_days,
        output_dir = %config.output_dir.display(),
        "{JOB_NAME} started"
    );

    let service =
        WriteOperationAuditService::new(cloud.audit_event_source(), config.report_writer());
    service.run(&account, now, config.lookback_days).await?;

    Ok(())
}
