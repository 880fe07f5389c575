//! Metrics collection and exposition.
//!
//! # Metrics
//! - `agw_signer_lookups_total` (counter): k1 signer lookups by outcome
//! - `agw_balance_fetches_total` (counter): aggregated balance fetches by outcome
//! - `agw_export_attempts_total` (counter): export flows by outcome
//! - `agw_active_sessions` (gauge): sessions in the registry
//! - `agw_rpc_health` (gauge): 1=healthy, 0=unhealthy, per network
//!
//! Outcomes are `success`, `failure` or `stale`.

use std::net::SocketAddr;

use metrics_exporter_prometheus::PrometheusBuilder;

use crate::blockchain::Network;

/// Start the Prometheus scrape endpoint on `addr`. Must run inside a Tokio
/// runtime.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics endpoint listening"),
        Err(e) => tracing::error!(address = %addr, error = %e, "Failed to install metrics exporter"),
    }
}

pub fn record_signer_lookup(outcome: &'static str) {
    metrics::counter!("agw_signer_lookups_total", "outcome" => outcome).increment(1);
}

pub fn record_balance_fetch(outcome: &'static str) {
    metrics::counter!("agw_balance_fetches_total", "outcome" => outcome).increment(1);
}

pub fn record_export(outcome: &'static str) {
    metrics::counter!("agw_export_attempts_total", "outcome" => outcome).increment(1);
}

pub fn set_active_sessions(count: usize) {
    metrics::gauge!("agw_active_sessions").set(count as f64);
}

pub fn record_rpc_health(network: Network, healthy: bool) {
    metrics::gauge!("agw_rpc_health", "network" => network.as_str())
        .set(if healthy { 1.0 } else { 0.0 });
}
