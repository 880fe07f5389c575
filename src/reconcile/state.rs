//! Per-session diagnostic state.

use serde::Serialize;

use crate::identity::{EmbeddedWallet, Identity, LinkedWallet, ProviderStatus};
use crate::reconcile::matching::SignerMatch;

/// Inputs shorter than this cannot be submitted for lookup.
pub const MIN_CONTRACT_ADDRESS_LEN: usize = 42;

/// Whether `input` passes the submission length gate.
pub fn is_submittable(input: &str) -> bool {
    input.chars().count() >= MIN_CONTRACT_ADDRESS_LEN
}

/// Where a session is in the reconciliation workflow.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionPhase {
    #[default]
    Unauthenticated,
    AwaitingContractAddress,
    ContractSubmitted,
    SignersResolved,
    SignerLookupFailed,
    BalancesResolved,
}

/// Identifies one contract submission. Results carrying a different tag
/// than the current one are stale.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SubmissionTag {
    pub generation: u64,
    pub address: String,
}

/// Token balance held by one address.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BalanceRecord {
    pub address: String,
    pub balance: String,
}

/// Outcome of the provider's export flow.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(tag = "status", content = "message", rename_all = "snake_case")]
pub enum ExportState {
    #[default]
    NotAttempted,
    InProgress,
    Succeeded,
    Failed(String),
}

/// Everything a session has gathered so far.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SessionState {
    pub provider: ProviderStatus,
    pub phase: SessionPhase,
    pub identity: Option<Identity>,
    pub embedded_wallet: Option<EmbeddedWallet>,
    /// Raw text of the contract address field.
    pub contract_input: String,
    pub submission: Option<SubmissionTag>,
    pub signers: Option<Vec<String>>,
    pub signer_error: Option<String>,
    pub agw_balance: Option<String>,
    pub signer_balances: Option<Vec<BalanceRecord>>,
    pub balance_loading: bool,
    pub export: ExportState,
}

impl SessionState {
    pub fn is_authenticated(&self) -> bool {
        self.identity.is_some()
    }

    /// Address of the current submission, if any.
    pub fn submitted_address(&self) -> Option<&str> {
        self.submission.as_ref().map(|tag| tag.address.as_str())
    }

    pub fn can_submit(&self) -> bool {
        self.is_authenticated() && is_submittable(&self.contract_input)
    }

    pub fn signer_match(&self) -> SignerMatch {
        SignerMatch::classify(self.signers.as_deref(), self.embedded_wallet.as_ref())
    }

    /// Linked wallets of the identity, for the account section.
    pub fn linked_wallets(&self) -> Vec<LinkedWallet> {
        self.identity
            .as_ref()
            .map(Identity::linked_wallets)
            .unwrap_or_default()
    }

    /// Drop everything derived from a contract submission.
    pub(crate) fn clear_results(&mut self) {
        self.signers = None;
        self.signer_error = None;
        self.agw_balance = None;
        self.signer_balances = None;
        self.balance_loading = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_length_gate() {
        let short = format!("0x{}", "a".repeat(39));
        let exact = format!("0x{}", "a".repeat(40));
        assert_eq!(short.len(), 41);
        assert!(!is_submittable(&short));
        assert!(is_submittable(&exact));
        assert!(is_submittable(&format!("{exact}0")));
        assert!(!is_submittable(""));
    }

    #[test]
    fn test_can_submit_requires_identity() {
        let mut state = SessionState {
            contract_input: format!("0x{}", "b".repeat(40)),
            ..Default::default()
        };
        assert!(!state.can_submit());

        state.identity = Some(Identity {
            id: "u1".to_string(),
            email: None,
            linked_accounts: Vec::new(),
        });
        assert!(state.can_submit());
    }

    #[test]
    fn test_export_state_serde() {
        let json = serde_json::to_value(ExportState::Failed("nope".to_string())).unwrap();
        assert_eq!(json, serde_json::json!({"status": "failed", "message": "nope"}));

        let json = serde_json::to_value(ExportState::NotAttempted).unwrap();
        assert_eq!(json, serde_json::json!({"status": "not_attempted"}));
    }
}
