//! Copyable recovery report.
//!
//! The output is what users paste into a support request, so the line
//! order and the sentinels for missing data are fixed.

use crate::identity::{EmbeddedWallet, Identity};
use crate::reconcile::state::{BalanceRecord, ExportState, SessionState};

/// Shown when the identity has no embedded wallet.
pub const NOT_FOUND: &str = "NOT FOUND";
/// Shown when no contract address has been submitted.
pub const NOT_ENTERED: &str = "(not entered)";
/// Shown when signers have not been resolved.
pub const NOT_QUERIED: &str = "(not queried)";

const MISSING: &str = "-";

/// Names that depend on configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportLabels {
    pub token_symbol: String,
    pub network_name: String,
}

impl Default for ReportLabels {
    fn default() -> Self {
        Self {
            token_symbol: "USDC".to_string(),
            network_name: "Polygon".to_string(),
        }
    }
}

/// A fully resolved snapshot to render.
#[derive(Debug, Clone, Copy)]
pub struct SummaryInput<'a> {
    pub identity: Option<&'a Identity>,
    pub embedded_wallet: Option<&'a EmbeddedWallet>,
    pub contract_address: Option<&'a str>,
    pub signers: Option<&'a [String]>,
    pub matches: bool,
    pub agw_balance: Option<&'a str>,
    pub signer_balances: Option<&'a [BalanceRecord]>,
    pub export: &'a ExportState,
    /// Client environment string (e.g., the browser user agent).
    pub client: &'a str,
    pub labels: &'a ReportLabels,
}

impl<'a> SummaryInput<'a> {
    pub fn from_state(state: &'a SessionState, labels: &'a ReportLabels, client: &'a str) -> Self {
        Self {
            identity: state.identity.as_ref(),
            embedded_wallet: state.embedded_wallet.as_ref(),
            contract_address: state.submitted_address(),
            signers: state.signers.as_deref(),
            matches: state.signer_match().is_match(),
            agw_balance: state.agw_balance.as_deref(),
            signer_balances: state.signer_balances.as_deref(),
            export: &state.export,
            client,
            labels,
        }
    }
}

/// Render the report. Same input, same bytes.
pub fn format_summary(input: &SummaryInput<'_>) -> String {
    let labels = input.labels;
    let mut lines = Vec::with_capacity(12);

    lines.push(format!(
        "User ID: {}",
        input.identity.map_or(MISSING, |id| id.id.as_str())
    ));
    lines.push(format!(
        "Login Contact: {}",
        input.identity.and_then(Identity::login_contact).unwrap_or(MISSING)
    ));
    lines.push(format!(
        "Embedded Wallet: {}",
        input.embedded_wallet.map_or(NOT_FOUND, |w| w.address.as_str())
    ));
    lines.push(format!(
        "AGW Contract Address: {}",
        input.contract_address.unwrap_or(NOT_ENTERED)
    ));
    lines.push(match input.signers {
        Some(signers) => format!("AGW Signer (k1Owner): {}", signers.join(", ")),
        None => format!("AGW Signer: {NOT_QUERIED}"),
    });
    lines.push(format!(
        "Signer Matches Embedded Wallet: {}",
        if input.matches { "YES" } else { "NO" }
    ));

    if let Some(balance) = input.agw_balance {
        lines.push(format!(
            "{} at AGW on {}: {}",
            labels.token_symbol, labels.network_name, balance
        ));
    }
    for record in input.signer_balances.unwrap_or_default() {
        lines.push(format!(
            "{} at Signer {} on {}: {}",
            labels.token_symbol, record.address, labels.network_name, record.balance
        ));
    }

    lines.push(format!("Export Attempted: {}", export_outcome(input.export)));
    lines.push(format!("Client: {}", input.client));

    lines.join("\n")
}

fn export_outcome(export: &ExportState) -> String {
    match export {
        ExportState::NotAttempted => "No".to_string(),
        ExportState::InProgress => "IN PROGRESS".to_string(),
        ExportState::Succeeded => "SUCCESS".to_string(),
        ExportState::Failed(message) => format!("FAILED - {message}"),
    }
}
