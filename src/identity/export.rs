//! Key export capability.
//!
//! The secure export UI belongs to the identity provider. This crate only
//! invokes it through [`WalletExporter`] and records the outcome.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Opens the provider's secure export flow.
#[async_trait]
pub trait WalletExporter: Send + Sync {
    /// Resolves when the user completed the flow, or fails with the
    /// provider-supplied message.
    async fn attempt_export(&self, address_hint: Option<&str>) -> Result<(), String>;
}

/// Outcome of an export flow the host already ran against the provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportedExport(pub Result<(), String>);

impl ReportedExport {
    pub fn from_error(error: Option<String>) -> Self {
        Self(error.map_or(Ok(()), Err))
    }
}

#[async_trait]
impl WalletExporter for ReportedExport {
    async fn attempt_export(&self, _address_hint: Option<&str>) -> Result<(), String> {
        self.0.clone()
    }
}

/// Initialization state of the identity provider.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", content = "reason", rename_all = "snake_case")]
pub enum ProviderStatus {
    /// The provider SDK has not finished loading.
    #[default]
    Initializing,
    Ready,
    /// The provider failed to initialize; the host should offer a reload.
    Failed(String),
}

impl ProviderStatus {
    pub fn is_ready(&self) -> bool {
        matches!(self, ProviderStatus::Ready)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_reported_export() {
        let ok = ReportedExport::from_error(None);
        assert_eq!(ok.attempt_export(Some("0xabc")).await, Ok(()));

        let failed = ReportedExport::from_error(Some("User exited the modal".to_string()));
        assert_eq!(
            failed.attempt_export(None).await,
            Err("User exited the modal".to_string())
        );
    }

    #[test]
    fn test_provider_status() {
        assert!(!ProviderStatus::default().is_ready());
        assert!(ProviderStatus::Ready.is_ready());
        assert!(!ProviderStatus::Failed("boom".to_string()).is_ready());
    }

    #[test]
    fn test_provider_status_serde() {
        let ready: ProviderStatus = serde_json::from_str(r#"{"status":"ready"}"#).unwrap();
        assert_eq!(ready, ProviderStatus::Ready);

        let failed: ProviderStatus =
            serde_json::from_str(r#"{"status":"failed","reason":"iframe blocked"}"#).unwrap();
        assert_eq!(failed, ProviderStatus::Failed("iframe blocked".to_string()));
    }
}
