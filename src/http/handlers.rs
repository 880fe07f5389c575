use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::{header, HeaderMap, StatusCode},
    response::IntoResponse,
    Json,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::blockchain::Network;
use crate::error::{RecoveryError, RecoveryResult};
use crate::http::server::AppState;
use crate::identity::{Identity, LinkedWallet, ProviderStatus};
use crate::reconcile::{ReconciliationEngine, SessionState, SignerMatch};

/// Client string used when the request carries no `User-Agent`.
const UNKNOWN_CLIENT: &str = "unknown";

#[derive(Debug, Serialize)]
pub struct CreatedSession {
    pub session_id: Uuid,
}

/// Session snapshot plus the values a page derives from it.
#[derive(Debug, Serialize)]
pub struct SessionView {
    #[serde(flatten)]
    pub state: SessionState,
    pub signer_match: SignerMatch,
    pub can_submit: bool,
    pub linked_wallets: Vec<LinkedWallet>,
}

impl From<SessionState> for SessionView {
    fn from(state: SessionState) -> Self {
        Self {
            signer_match: state.signer_match(),
            can_submit: state.can_submit(),
            linked_wallets: state.linked_wallets(),
            state,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct ContractInput {
    pub address: String,
}

/// Outcome reported by a host that ran the provider's export flow.
#[derive(Debug, Deserialize)]
pub struct ExportReport {
    #[serde(default)]
    pub error: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct NetworkHealth {
    pub network: Network,
    pub healthy: bool,
}

#[derive(Debug, Serialize)]
pub struct HealthReport {
    pub status: &'static str,
    pub version: &'static str,
    pub sessions: usize,
    pub networks: Vec<NetworkHealth>,
}

fn session(state: &AppState, id: Uuid) -> RecoveryResult<Arc<ReconciliationEngine>> {
    state
        .registry
        .get(&id)
        .ok_or_else(|| RecoveryError::SessionNotFound(id.to_string()))
}

fn view(engine: &ReconciliationEngine) -> Json<SessionView> {
    Json(engine.snapshot().into())
}

pub async fn create_session(State(state): State<AppState>) -> impl IntoResponse {
    let (session_id, _) = state.registry.create();
    (StatusCode::CREATED, Json(CreatedSession { session_id }))
}

pub async fn get_session(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> RecoveryResult<Json<SessionView>> {
    let engine = session(&state, id)?;
    Ok(view(&engine))
}

pub async fn delete_session(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> RecoveryResult<StatusCode> {
    if state.registry.remove(&id) {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(RecoveryError::SessionNotFound(id.to_string()))
    }
}

pub async fn set_provider(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(status): Json<ProviderStatus>,
) -> RecoveryResult<Json<SessionView>> {
    let engine = session(&state, id)?;
    engine.set_provider_status(status);
    Ok(view(&engine))
}

pub async fn authenticate(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(identity): Json<Identity>,
) -> RecoveryResult<Json<SessionView>> {
    let engine = session(&state, id)?;
    engine.authenticate(identity)?;
    Ok(view(&engine))
}

pub async fn logout(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> RecoveryResult<Json<SessionView>> {
    let engine = session(&state, id)?;
    engine.logout();
    Ok(view(&engine))
}

pub async fn set_contract(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(input): Json<ContractInput>,
) -> RecoveryResult<Json<SessionView>> {
    let engine = session(&state, id)?;
    engine.set_contract_input(&input.address)?;
    Ok(view(&engine))
}

/// Runs the signer lookup and, when signers exist, the balance fetch
/// before answering.
pub async fn lookup_contract(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> RecoveryResult<Json<SessionView>> {
    let engine = session(&state, id)?;
    engine.submit_contract_address().await?;
    Ok(view(&engine))
}

pub async fn refresh_balances(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> RecoveryResult<Json<SessionView>> {
    let engine = session(&state, id)?;
    engine.refresh_balances().await?;
    Ok(view(&engine))
}

pub async fn record_export(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(report): Json<ExportReport>,
) -> RecoveryResult<Json<SessionView>> {
    let engine = session(&state, id)?;
    engine
        .record_export(report.error.map_or(Ok(()), Err))
        .await?;
    Ok(view(&engine))
}

pub async fn summary(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    headers: HeaderMap,
) -> RecoveryResult<impl IntoResponse> {
    let engine = session(&state, id)?;
    let client = headers
        .get(header::USER_AGENT)
        .and_then(|value| value.to_str().ok())
        .unwrap_or(UNKNOWN_CLIENT);

    Ok((
        [(header::CONTENT_TYPE, "text/plain; charset=utf-8")],
        engine.summary(client),
    ))
}

pub async fn health(State(state): State<AppState>) -> Json<HealthReport> {
    let (polygon, abstract_chain) = tokio::join!(
        state.reader.is_healthy(Network::Polygon),
        state.reader.is_healthy(Network::Abstract),
    );

    Json(HealthReport {
        status: if polygon && abstract_chain { "ok" } else { "degraded" },
        version: env!("CARGO_PKG_VERSION"),
        sessions: state.registry.len(),
        networks: vec![
            NetworkHealth {
                network: Network::Polygon,
                healthy: polygon,
            },
            NetworkHealth {
                network: Network::Abstract,
                healthy: abstract_chain,
            },
        ],
    })
}
