//! Session workflow: signer lookup, matching and balance aggregation.
//!
//! # State Transitions
//! ```text
//! Unauthenticated → AwaitingContractAddress      authenticate()
//! AwaitingContractAddress → ContractSubmitted     submit_contract_address()
//! ContractSubmitted → SignersResolved | SignerLookupFailed
//! SignersResolved → BalancesResolved              automatic when signers exist
//! any → Unauthenticated                           logout()
//! ```
//!
//! Every submission gets a fresh [`SubmissionTag`]. Lookups and balance
//! fetches commit only while their tag is still the current one, so a newer
//! submission always wins over a stale in-flight result.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use futures_util::future::{try_join, try_join_all};
use tokio::sync::watch;

use crate::blockchain::{ChainError, ChainReader, Network};
use crate::config::RecoveryConfig;
use crate::error::{RecoveryError, RecoveryResult};
use crate::identity::{Identity, ProviderStatus, ReportedExport, WalletExporter};
use crate::observability::metrics;
use crate::reconcile::state::{
    is_submittable, BalanceRecord, ExportState, SessionPhase, SessionState, SubmissionTag,
    MIN_CONTRACT_ADDRESS_LEN,
};
use crate::report::{format_summary, ReportLabels, SummaryInput};

/// Where the engine reads from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LookupTargets {
    /// Network holding token balances.
    pub token_network: Network,
    /// Token contract on `token_network`.
    pub token_address: String,
    /// Network hosting the smart-contract wallets.
    pub wallet_network: Network,
    pub labels: ReportLabels,
}

impl LookupTargets {
    pub fn from_config(config: &RecoveryConfig) -> Self {
        Self {
            token_network: Network::Polygon,
            token_address: config.token.address.clone(),
            wallet_network: Network::Abstract,
            labels: ReportLabels {
                token_symbol: config.token.symbol.clone(),
                network_name: config.chains.polygon.name.clone(),
            },
        }
    }
}

/// Stored as the lookup error when a lookup is abandoned mid-flight.
pub const CANCELLED_MESSAGE: &str = "lookup cancelled before it completed";

/// Settles the pending state of a submission if the operation's future is
/// dropped before it finishes (request timeout, client disconnect).
struct PendingCommit<'a> {
    engine: &'a ReconciliationEngine,
    tag: &'a SubmissionTag,
    operation: &'static str,
    settle: fn(&mut SessionState),
    armed: bool,
}

impl<'a> PendingCommit<'a> {
    fn new(
        engine: &'a ReconciliationEngine,
        tag: &'a SubmissionTag,
        operation: &'static str,
        settle: fn(&mut SessionState),
    ) -> Self {
        Self {
            engine,
            tag,
            operation,
            settle,
            armed: true,
        }
    }

    fn disarm(mut self) {
        self.armed = false;
    }
}

impl Drop for PendingCommit<'_> {
    fn drop(&mut self) {
        if !self.armed {
            return;
        }
        if self.engine.commit_if_current(self.tag, self.settle) {
            tracing::warn!(
                contract = %self.tag.address,
                generation = self.tag.generation,
                operation = self.operation,
                "Operation cancelled before completion"
            );
        }
    }
}

/// Per-session reconciliation state machine. The engine is the only
/// writer of its state; readers get snapshots or a change stream.
pub struct ReconciliationEngine {
    reader: Arc<dyn ChainReader>,
    targets: LookupTargets,
    state: watch::Sender<SessionState>,
    generation: AtomicU64,
}

impl ReconciliationEngine {
    pub fn new(reader: Arc<dyn ChainReader>, targets: LookupTargets) -> Self {
        Self {
            reader,
            targets,
            state: watch::Sender::new(SessionState::default()),
            generation: AtomicU64::new(0),
        }
    }

    /// Current state.
    pub fn snapshot(&self) -> SessionState {
        self.state.borrow().clone()
    }

    /// Stream of state changes. Stale results never produce a notification.
    pub fn subscribe(&self) -> watch::Receiver<SessionState> {
        self.state.subscribe()
    }

    pub fn targets(&self) -> &LookupTargets {
        &self.targets
    }

    /// Record the identity provider's readiness.
    pub fn set_provider_status(&self, status: ProviderStatus) {
        if let ProviderStatus::Failed(reason) = &status {
            tracing::error!(reason = %reason, "Identity provider failed to initialize");
        }
        self.state.send_modify(|s| s.provider = status);
    }

    /// Start a session for a provider-authenticated identity.
    pub fn authenticate(&self, identity: Identity) -> RecoveryResult<()> {
        self.ensure_ready()?;

        let embedded_wallet = identity.embedded_wallet();
        match &embedded_wallet {
            Some(wallet) => {
                tracing::info!(user_id = %identity.id, embedded_wallet = %wallet.address, "Identity authenticated")
            }
            None => {
                tracing::warn!(user_id = %identity.id, "Identity authenticated without an embedded wallet")
            }
        }

        self.state.send_modify(|s| {
            *s = SessionState {
                provider: s.provider.clone(),
                phase: SessionPhase::AwaitingContractAddress,
                identity: Some(identity),
                embedded_wallet,
                ..Default::default()
            };
        });
        Ok(())
    }

    /// Forget the identity and everything derived from it.
    pub fn logout(&self) {
        self.state.send_modify(|s| {
            *s = SessionState {
                provider: s.provider.clone(),
                ..Default::default()
            };
        });
        tracing::info!("Session logged out");
    }

    /// Replace the contract address field. Any submission is withdrawn.
    pub fn set_contract_input(&self, input: &str) -> RecoveryResult<()> {
        self.ensure_authenticated()?;
        self.state.send_modify(|s| {
            s.contract_input = input.to_string();
            s.submission = None;
            s.clear_results();
            s.phase = SessionPhase::AwaitingContractAddress;
        });
        Ok(())
    }

    /// Whether the lookup action is enabled.
    pub fn can_submit(&self) -> bool {
        self.state.borrow().can_submit()
    }

    /// Submit the current contract address: resolve its signers and, when
    /// there are any, their balances.
    ///
    /// Chain failures are stored in the state for display; only
    /// precondition failures are returned.
    pub async fn submit_contract_address(&self) -> RecoveryResult<()> {
        self.ensure_authenticated()?;

        let input = self.state.borrow().contract_input.clone();
        if !is_submittable(&input) {
            return Err(RecoveryError::AddressTooShort {
                len: input.chars().count(),
                min: MIN_CONTRACT_ADDRESS_LEN,
            });
        }

        let tag = SubmissionTag {
            generation: self.generation.fetch_add(1, Ordering::SeqCst) + 1,
            address: input,
        };
        self.state.send_modify(|s| {
            s.submission = Some(tag.clone());
            s.clear_results();
            s.phase = SessionPhase::ContractSubmitted;
        });

        tracing::info!(contract = %tag.address, generation = tag.generation, "Looking up AGW signers");
        let pending = PendingCommit::new(self, &tag, "signer lookup", |s| {
            s.signer_error = Some(CANCELLED_MESSAGE.to_string());
            s.phase = SessionPhase::SignerLookupFailed;
        });
        let result = self
            .reader
            .authorized_signers(self.targets.wallet_network, &tag.address)
            .await;
        pending.disarm();

        let committed = self.commit_if_current(&tag, |s| match &result {
            Ok(signers) => {
                s.signers = Some(signers.clone());
                s.phase = SessionPhase::SignersResolved;
            }
            Err(e) => {
                s.signer_error = Some(e.short_message());
                s.phase = SessionPhase::SignerLookupFailed;
            }
        });
        if !committed {
            tracing::debug!(contract = %tag.address, generation = tag.generation, "Discarding stale signer lookup");
            metrics::record_signer_lookup("stale");
            return Ok(());
        }

        match result {
            Ok(signers) => {
                metrics::record_signer_lookup("success");
                tracing::info!(contract = %tag.address, signers = signers.len(), "AGW signers resolved");
                if !signers.is_empty() {
                    self.fetch_balances(&tag, &signers).await;
                }
            }
            Err(e) => {
                metrics::record_signer_lookup("failure");
                tracing::warn!(contract = %tag.address, error = %e, "AGW signer lookup failed");
            }
        }
        Ok(())
    }

    /// Re-issue the balance fetch for the current submission.
    pub async fn refresh_balances(&self) -> RecoveryResult<()> {
        self.ensure_authenticated()?;

        let (tag, signers) = {
            let state = self.state.borrow();
            match (&state.submission, &state.signers) {
                (Some(tag), Some(signers)) => (tag.clone(), signers.clone()),
                _ => return Err(RecoveryError::NoSubmission),
            }
        };
        self.fetch_balances(&tag, &signers).await;
        Ok(())
    }

    /// Run the provider's export flow and record its outcome.
    pub async fn attempt_export(&self, exporter: &dyn WalletExporter) -> RecoveryResult<ExportState> {
        self.ensure_authenticated()?;

        let (user_id, hint) = {
            let state = self.state.borrow();
            (
                state.identity.as_ref().map(|i| i.id.clone()),
                state.embedded_wallet.as_ref().map(|w| w.address.clone()),
            )
        };
        self.state.send_modify(|s| s.export = ExportState::InProgress);

        let outcome = match exporter.attempt_export(hint.as_deref()).await {
            Ok(()) => {
                metrics::record_export("success");
                tracing::info!(address_hint = ?hint, "Key export completed");
                ExportState::Succeeded
            }
            Err(message) => {
                metrics::record_export("failure");
                tracing::error!(address_hint = ?hint, error = %message, "Key export failed");
                ExportState::Failed(message)
            }
        };

        // A logout while the flow was open leaves nothing to record against.
        self.state.send_if_modified(|s| {
            if s.identity.as_ref().map(|i| &i.id) != user_id.as_ref() {
                return false;
            }
            s.export = outcome.clone();
            true
        });
        Ok(outcome)
    }

    /// Record the outcome of an export flow the host ran itself.
    pub async fn record_export(&self, outcome: Result<(), String>) -> RecoveryResult<ExportState> {
        self.attempt_export(&ReportedExport(outcome)).await
    }

    /// Render the copyable report for the current state.
    pub fn summary(&self, client: &str) -> String {
        let state = self.state.borrow();
        format_summary(&SummaryInput::from_state(&state, &self.targets.labels, client))
    }

    /// Fetch the AGW balance and every signer balance together. Nothing is
    /// committed unless all of them succeed.
    async fn fetch_balances(&self, tag: &SubmissionTag, signers: &[String]) {
        if !self.commit_if_current(tag, |s| s.balance_loading = true) {
            return;
        }
        let pending = PendingCommit::new(self, tag, "balance fetch", |s| s.balance_loading = false);

        let network = self.targets.token_network;
        let token = self.targets.token_address.as_str();
        let agw = self.reader.token_balance(network, token, &tag.address);
        let signer_balances = try_join_all(signers.iter().map(move |address| async move {
            let balance = self.reader.token_balance(network, token, address).await?;
            Ok::<_, ChainError>(BalanceRecord {
                address: address.clone(),
                balance,
            })
        }));

        let fetched = try_join(agw, signer_balances).await;
        pending.disarm();

        match fetched {
            Ok((agw_balance, records)) => {
                let committed = self.commit_if_current(tag, |s| {
                    s.agw_balance = Some(agw_balance);
                    s.signer_balances = (!records.is_empty()).then_some(records);
                    s.balance_loading = false;
                    s.phase = SessionPhase::BalancesResolved;
                });
                metrics::record_balance_fetch(if committed { "success" } else { "stale" });
            }
            Err(e) => {
                tracing::error!(contract = %tag.address, error = %e, "Balance fetch failed");
                metrics::record_balance_fetch("failure");
                self.commit_if_current(tag, |s| s.balance_loading = false);
            }
        }
    }

    /// Apply `update` only while `tag` is the current submission.
    fn commit_if_current(&self, tag: &SubmissionTag, update: impl FnOnce(&mut SessionState)) -> bool {
        self.state.send_if_modified(|s| {
            if s.submission.as_ref() != Some(tag) {
                return false;
            }
            update(s);
            true
        })
    }

    fn ensure_ready(&self) -> RecoveryResult<()> {
        match &self.state.borrow().provider {
            ProviderStatus::Ready => Ok(()),
            ProviderStatus::Initializing => Err(RecoveryError::NotReady),
            ProviderStatus::Failed(reason) => Err(RecoveryError::Initialization(reason.clone())),
        }
    }

    fn ensure_authenticated(&self) -> RecoveryResult<()> {
        self.ensure_ready()?;
        if self.state.borrow().is_authenticated() {
            Ok(())
        } else {
            Err(RecoveryError::NotAuthenticated)
        }
    }
}

impl std::fmt::Debug for ReconciliationEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ReconciliationEngine")
            .field("targets", &self.targets)
            .field("phase", &self.state.borrow().phase)
            .finish()
    }
}
