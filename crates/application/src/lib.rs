//! Application services and ports.

#![forbid(unsafe_code)]

mod audit_ports;
mod pagination;
mod topic_audit_service;
mod write_operation_audit_service;

#[cfg(test)]
mod test_support;

pub use audit_ports::{AuditEventSource, CallerIdentity, ReportSink, TopicDirectory};
pub use pagination::{Page, PageCursor, PageSource};
pub use topic_audit_service::{TopicAuditOutcome, TopicAuditService, TopicAuditSummary};
pub use write_operation_audit_service::{
    WriteOperationAuditService, WriteOperationCollection, WriteOperationOutcome,
    WriteOperationSummary,
};

use sns_audit_core::AppResult;
use sns_audit_domain::AccountContext;

/// Resolves the account the audit runs against.
///
/// Identity failures are fatal and propagate to the caller.
pub async fn resolve_account_context(
    identity: &dyn CallerIdentity,
    region: &str,
) -> AppResult<AccountContext> {
    let account_id = identity.account_id().await?;
    AccountContext::new(account_id, region)
}

#[cfg(test)]
mod tests {
    use crate::resolve_account_context;
    use crate::test_support::FakeCallerIdentity;

    #[tokio::test]
    async fn account_context_combines_identity_and_region() {
        let identity = FakeCallerIdentity("123456789012".to_owned());

        let context = resolve_account_context(&identity, "ap-southeast-2").await;

        assert!(context.is_ok());
        let context = context.unwrap_or_else(|_| unreachable!());
        assert_eq!(context.account_id(), "123456789012");
        assert_eq!(context.region(), "ap-southeast-2");
    }

    #[tokio::test]
    async fn blank_account_identifier_is_rejected() {
        let identity = FakeCallerIdentity(String::new());

        assert!(resolve_account_context(&identity, "us-east-1").await.is_err());
    }
}
