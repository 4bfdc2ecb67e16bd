//! Per-backend health aggregation.
//!
//! A node owns a set of checks and folds their most recent hard states into
//! a single Up/Down verdict: Up iff every check's last report is Good. No
//! verdict is produced until every check has reported at least once.

use std::net::IpAddr;
use std::sync::Arc;

use tokio::sync::{broadcast, mpsc};

use crate::healthcheck::{CheckEvent, CheckResult, CheckSpec};
use crate::lbpool::pool::Pool;

/// Hard state of one backend node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeState {
    Unknown,
    Down,
    Up,
}

/// Static identity of a backend node.
#[derive(Debug, Clone)]
pub struct Node {
    pub name: String,
    pub ip: IpAddr,
    pub backup: bool,
    /// The checks this node runs, in configuration order. Contains exactly
    /// one synthetic always-Good check when nothing was configured.
    pub checks: Vec<CheckSpec>,
}

/// Mutable health state of a node, guarded by the pool lock.
#[derive(Debug)]
pub struct NodeHealth {
    /// Latest hard state per check, indexed like `Node::checks`.
    results: Vec<CheckResult>,
    pub state: NodeState,
    /// Whether any check has ever reported.
    pub checked: bool,
}

impl NodeHealth {
    pub fn new(check_count: usize) -> Self {
        Self {
            results: vec![CheckResult::Unknown; check_count],
            state: NodeState::Unknown,
            checked: false,
        }
    }

    /// Fold one check report into the verdict. Returns the new hard state
    /// when it changed; the caller notifies the pool while still holding
    /// the lock.
    pub fn apply(&mut self, check_idx: usize, result: CheckResult) -> Option<NodeState> {
        self.checked = true;
        if let Some(slot) = self.results.get_mut(check_idx) {
            *slot = result;
        }

        let unknown = self.results.iter().filter(|r| **r == CheckResult::Unknown).count();
        if unknown > 0 {
            // Do not act until every check has reported at least once.
            return None;
        }

        let (good, total) = self.good_total();
        let verdict = if good == total { NodeState::Up } else { NodeState::Down };
        if self.state != verdict {
            self.state = verdict;
            return Some(verdict);
        }
        None
    }

    pub fn good_total(&self) -> (usize, usize) {
        let good = self.results.iter().filter(|r| r.is_good()).count();
        (good, self.results.len())
    }
}

/// Node message loop: forwards check reports into the pool until shutdown.
pub async fn run(
    pool: Arc<Pool>,
    node_idx: usize,
    mut events: mpsc::UnboundedReceiver<CheckEvent>,
    mut shutdown: broadcast::Receiver<()>,
) {
    loop {
        tokio::select! {
            Some(event) = events.recv() => pool.apply_check_result(node_idx, event).await,
            _ = shutdown.recv() => return,
        }
    }
}
