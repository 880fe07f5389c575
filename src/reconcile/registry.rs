//! Live diagnostic sessions keyed by id.

use std::sync::Arc;
use std::time::{Duration, Instant};

use dashmap::DashMap;
use uuid::Uuid;

use crate::blockchain::ChainReader;
use crate::observability::metrics;
use crate::reconcile::engine::{LookupTargets, ReconciliationEngine};

struct SessionEntry {
    engine: Arc<ReconciliationEngine>,
    last_seen: Instant,
}

impl SessionEntry {
    fn is_idle(&self, now: Instant, ttl: Duration) -> bool {
        now.saturating_duration_since(self.last_seen) >= ttl
    }
}

/// Concurrent map of session id to engine. Every engine shares one reader.
///
/// A session that has not been accessed for `idle_ttl` is expired: lookups
/// treat it as absent and [`SessionRegistry::sweep`] drops it.
pub struct SessionRegistry {
    sessions: DashMap<Uuid, SessionEntry>,
    reader: Arc<dyn ChainReader>,
    targets: LookupTargets,
    idle_ttl: Duration,
}

impl SessionRegistry {
    pub fn new(reader: Arc<dyn ChainReader>, targets: LookupTargets, idle_ttl: Duration) -> Self {
        Self {
            sessions: DashMap::new(),
            reader,
            targets,
            idle_ttl,
        }
    }

    /// Open a session. The engine starts with the provider initializing.
    pub fn create(&self) -> (Uuid, Arc<ReconciliationEngine>) {
        let id = Uuid::new_v4();
        let engine = Arc::new(ReconciliationEngine::new(
            self.reader.clone(),
            self.targets.clone(),
        ));
        self.sessions.insert(
            id,
            SessionEntry {
                engine: engine.clone(),
                last_seen: Instant::now(),
            },
        );
        metrics::set_active_sessions(self.sessions.len());
        tracing::debug!(session = %id, "Session created");
        (id, engine)
    }

    /// The session's engine, refreshing its idle timer. An expired session
    /// is evicted and reported as absent.
    pub fn get(&self, id: &Uuid) -> Option<Arc<ReconciliationEngine>> {
        let now = Instant::now();
        {
            let mut entry = self.sessions.get_mut(id)?;
            if !entry.is_idle(now, self.idle_ttl) {
                entry.last_seen = now;
                return Some(entry.engine.clone());
            }
        }

        if self
            .sessions
            .remove_if(id, |_, entry| entry.is_idle(now, self.idle_ttl))
            .is_some()
        {
            metrics::set_active_sessions(self.sessions.len());
            tracing::debug!(session = %id, "Session expired");
        }
        None
    }

    /// Drop a session. In-flight lookups finish against their own engine
    /// handle and are then discarded.
    pub fn remove(&self, id: &Uuid) -> bool {
        let removed = self.sessions.remove(id).is_some();
        if removed {
            metrics::set_active_sessions(self.sessions.len());
            tracing::debug!(session = %id, "Session removed");
        }
        removed
    }

    /// Drop every expired session. Returns how many were dropped.
    pub fn sweep(&self) -> usize {
        let now = Instant::now();
        let before = self.sessions.len();
        self.sessions
            .retain(|_, entry| !entry.is_idle(now, self.idle_ttl));
        let expired = before.saturating_sub(self.sessions.len());
        if expired > 0 {
            metrics::set_active_sessions(self.sessions.len());
            tracing::info!(expired, remaining = self.sessions.len(), "Expired idle sessions");
        }
        expired
    }

    /// Sweep every `interval` until `stop` resolves.
    pub async fn run_sweeper<F>(self: Arc<Self>, interval: Duration, stop: F)
    where
        F: std::future::Future<Output = ()>,
    {
        let mut ticker = tokio::time::interval(interval);
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
        tokio::pin!(stop);
        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    self.sweep();
                }
                _ = &mut stop => break,
            }
        }
        tracing::debug!("Session sweeper stopped");
    }

    pub fn idle_ttl(&self) -> Duration {
        self.idle_ttl
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }
}
