use sns_audit_core::{AppResult, NonEmptyString};

/// Account and region the audit runs against.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccountContext {
    account_id: NonEmptyString,
    region: NonEmptyString,
}

impl AccountContext {
    /// Creates a validated account context.
    pub fn new(account_id: impl Into<String>, region: impl Into<String>) -> AppResult<Self> {
        Ok(Self {
            account_id: NonEmptyString::new(account_id)?,
            region: NonEmptyString::new(region)?,
        })
    }

    /// Returns the cloud account identifier.
    #[must_use]
    pub fn account_id(&self) -> &str {
        self.account_id.as_str()
    }

    /// Returns the region name.
    #[must_use]
    pub fn region(&self) -> &str {
        self.region.as_str()
    }
}

#[cfg(test)]
mod tests {
    use super::AccountContext;

    #[test]
    fn account_context_rejects_blank_region() {
        assert!(AccountContext::new("123456789012", " ").is_err());
    }
}
