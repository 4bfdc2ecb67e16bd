//! Table reconciliation.
//!
//! # Responsibilities
//! - Periodically read each pool's wanted set
//! - Diff it against the live table membership
//! - Converge with a minimal patch, additions before removals
//!
//! A failed tool call leaves the pool pending: the next tick re-diffs from
//! scratch, so transient pfctl failures are self-correcting.

use std::collections::{HashMap, HashSet};
use std::net::IpAddr;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::broadcast;
use tokio::time;

use crate::lbpool::Pool;
use crate::pfctl::table::{TableBackend, TableError};

const SYNC_INTERVAL: Duration = Duration::from_millis(100);

pub struct Reconciler {
    pools: Vec<Arc<Pool>>,
    table: Arc<dyn TableBackend>,
    interval: Duration,

    /// Desired sets not yet applied, kept across ticks so a tool failure
    /// is retried.
    pending: HashMap<usize, Vec<IpAddr>>,
    /// Last membership successfully applied per table, to skip redundant
    /// pfctl calls when the wanted set is already in place.
    applied: HashMap<String, HashSet<IpAddr>>,
}

impl Reconciler {
    pub fn new(pools: Vec<Arc<Pool>>, table: Arc<dyn TableBackend>) -> Self {
        Self {
            pools,
            table,
            interval: SYNC_INTERVAL,
            pending: HashMap::new(),
            applied: HashMap::new(),
        }
    }

    /// Fixed-period loop, independent of check cadence.
    pub async fn run(mut self, mut shutdown: broadcast::Receiver<()>) {
        let mut ticker = time::interval(self.interval);
        loop {
            tokio::select! {
                _ = ticker.tick() => self.sync_once().await,
                _ = shutdown.recv() => {
                    tracing::debug!("reconciler received shutdown");
                    return;
                }
            }
        }
    }

    /// One reconciliation pass over every pool.
    pub async fn sync_once(&mut self) {
        for idx in 0..self.pools.len() {
            let pool = Arc::clone(&self.pools[idx]);

            if let Some(wanted) = pool.wanted_nodes().await {
                self.pending.insert(idx, wanted);
            }
            let Some(wanted) = self.pending.get(&idx).cloned() else {
                continue;
            };

            match self.converge(&pool, &wanted).await {
                Ok(()) => {
                    self.pending.remove(&idx);
                }
                Err(e) => {
                    // Not fatal: retried from a fresh diff next tick.
                    tracing::warn!(pool = %pool.name(), table = pool.pf_name(), error = %e, "table sync failed, will retry");
                }
            }
        }
    }

    async fn converge(&mut self, pool: &Pool, wanted: &[IpAddr]) -> Result<(), TableError> {
        let table = pool.pf_name();
        let wanted_set: HashSet<IpAddr> = wanted.iter().copied().collect();

        if self.applied.get(table) == Some(&wanted_set) {
            return Ok(());
        }

        let current = self.table.list(table).await?;

        let additions: Vec<IpAddr> =
            wanted.iter().filter(|ip| !current.contains(ip)).copied().collect();
        let removals: Vec<IpAddr> =
            current.iter().filter(|ip| !wanted_set.contains(ip)).copied().collect();

        // Additions first: a backend that stays wanted must never vanish
        // from the table during churn. Empty sets skip the call entirely.
        if !additions.is_empty() {
            self.table.add(table, &additions).await?;
        }
        if !removals.is_empty() {
            self.table.remove(table, &removals).await?;
        }

        if !additions.is_empty() || !removals.is_empty() {
            tracing::info!(
                pool = %pool.name(),
                table,
                added = additions.len(),
                removed = removals.len(),
                "table converged"
            );
        }

        self.applied.insert(table.to_string(), wanted_set);
        Ok(())
    }
}
