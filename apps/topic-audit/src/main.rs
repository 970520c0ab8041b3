//! Inventories SNS topics with their subscribers and inferred publishers.

#![forbid(unsafe_code)]

use std::process::ExitCode;

use chrono::Utc;
use tracing::info;

use sns_audit_application::TopicAuditService;
use sns_audit_core::AppResult;
use sns_audit_runtime::{AuditConfig, CloudEnvironment, exit_code, init_tracing};

const JOB_NAME: &str = "sns-topic-audit";

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
    let generated_at = Utc::now();

    info!(
        account_id = %account.account_id(),
        region = %account.region(),
        output_dir = %config.output_dir.display(),
        "{JOB_NAME} started"
    );

    let service = TopicAuditService::new(cloud.topic_directory(), config.report_writer());
    service.run(&account, generated_at).await?;

    Ok(())
}
