//! Pool admission policy and the wanted set.
//!
//! # Data Flow
//! ```text
//! node verdict change (under the pool lock)
//!     → full recompute of the wanted set:
//!         healthy primaries, capped by max_nodes
//!         → degrade action when fewer than min_nodes are healthy
//!     → wanted set replaced, dirty flag raised
//!
//! reconciler: wanted_nodes() → Some(set) once per change, then None
//! ```
//!
//! The wanted set and the per-node health states are the only state touched
//! by multiple tasks; one mutex guards them and every critical section is
//! short and await-free.

use std::net::IpAddr;
use std::sync::Arc;

use tokio::sync::{mpsc, Mutex};
use tokio::task::JoinSet;

use crate::config::schema::{DegradeAction, NodeConfig, PoolConfig};
use crate::healthcheck::{CheckEvent, CheckSpec, HealthCheck};
use crate::lbpool::node::{self, Node, NodeHealth, NodeState};
use crate::lifecycle::Shutdown;

/// Address family of one instantiated pool. A configuration entry carrying
/// both an `ip4` and an `ip6` address yields two independent pools.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Proto {
    V4,
    V6,
}

impl Proto {
    fn suffix(self) -> &'static str {
        match self {
            Proto::V4 => "4",
            Proto::V6 => "6",
        }
    }

    fn pool_addr(self, cfg: &PoolConfig) -> Option<IpAddr> {
        match self {
            Proto::V4 => cfg.ip4.map(IpAddr::V4),
            Proto::V6 => cfg.ip6.map(IpAddr::V6),
        }
    }

    fn node_addr(self, cfg: &NodeConfig) -> Option<IpAddr> {
        match self {
            Proto::V4 => cfg.ip4.map(IpAddr::V4),
            Proto::V6 => cfg.ip6.map(IpAddr::V6),
        }
    }
}

pub struct Pool {
    name: String,
    ip: IpAddr,
    pf_name: String,
    min_nodes: usize,
    max_nodes: usize,
    action: DegradeAction,
    nodes: Vec<Node>,
    shared: Mutex<PoolShared>,
}

/// State mutated concurrently by node tasks and the reconciler.
struct PoolShared {
    health: Vec<NodeHealth>,
    wanted: Vec<IpAddr>,
    dirty: bool,
}

impl Pool {
    /// Build the pools for one configuration entry, one per configured
    /// address family. A broken entry (missing name or pf table, no address
    /// for either family) yields no pools and never aborts the load.
    pub fn from_config(cfg: &PoolConfig) -> Vec<Arc<Pool>> {
        if cfg.name.is_empty() || cfg.pf_name.is_empty() {
            tracing::warn!(pool = %cfg.name, "pool without a name or pf table, skipping");
            return Vec::new();
        }

        let pools: Vec<Arc<Pool>> = [Proto::V4, Proto::V6]
            .into_iter()
            .filter_map(|proto| Self::for_proto(cfg, proto))
            .collect();

        if pools.is_empty() {
            tracing::warn!(pool = %cfg.name, "pool without an IP address for any family, skipping");
        }
        pools
    }

    /// One address family's pool. Nodes lacking this family's address are
    /// left out; a node whose check list produced no usable probe gets the
    /// synthetic always-Good check.
    fn for_proto(cfg: &PoolConfig, proto: Proto) -> Option<Arc<Pool>> {
        let ip = proto.pool_addr(cfg)?;
        let name = format!("{}_{}", cfg.name, proto.suffix());
        let pf_name = format!("{}_{}", cfg.pf_name, proto.suffix());

        let mut nodes = Vec::new();
        for node_cfg in &cfg.nodes {
            if node_cfg.name.is_empty() {
                tracing::warn!(pool = %name, "node without a name, skipping");
                continue;
            }
            let Some(node_ip) = proto.node_addr(node_cfg) else {
                tracing::debug!(pool = %name, node = %node_cfg.name, "node without an address in this family, skipping");
                continue;
            };

            let check_cfgs = node_cfg.healthchecks.as_ref().unwrap_or(&cfg.healthchecks);
            let mut checks: Vec<CheckSpec> = check_cfgs
                .iter()
                .filter_map(|c| CheckSpec::from_config(c, node_ip))
                .collect();

            if checks.is_empty() {
                tracing::debug!(pool = %name, node = %node_cfg.name, "no usable checks, adding always-good dummy");
                checks.push(CheckSpec::always_good());
            }

            nodes.push(Node {
                name: node_cfg.name.clone(),
                ip: node_ip,
                backup: node_cfg.backup,
                checks,
            });
        }

        let health = nodes.iter().map(|n| NodeHealth::new(n.checks.len())).collect();

        tracing::info!(
            pool = %name,
            ip = %ip,
            pf_name = %pf_name,
            min = cfg.min_nodes,
            max = cfg.max_nodes,
            nodes = nodes.len(),
            "pool created"
        );

        Some(Arc::new(Pool {
            name,
            ip,
            pf_name,
            min_nodes: cfg.min_nodes,
            max_nodes: cfg.max_nodes,
            action: cfg.min_nodes_action,
            nodes,
            shared: Mutex::new(PoolShared { health, wanted: Vec::new(), dirty: false }),
        }))
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn ip(&self) -> IpAddr {
        self.ip
    }

    pub fn pf_name(&self) -> &str {
        &self.pf_name
    }

    /// Start one task per check and one per node, all signing off on the
    /// shared shutdown signal.
    pub fn spawn(self: &Arc<Self>, tasks: &mut JoinSet<()>, shutdown: &Shutdown) {
        for (node_idx, node) in self.nodes.iter().enumerate() {
            let (tx, rx) = mpsc::unbounded_channel::<CheckEvent>();

            for (check_idx, spec) in node.checks.iter().enumerate() {
                let check = HealthCheck::new(
                    check_idx,
                    spec.clone(),
                    node.name.clone(),
                    node.ip,
                    tx.clone(),
                );
                tasks.spawn(check.run(shutdown.subscribe()));
            }

            tasks.spawn(node::run(Arc::clone(self), node_idx, rx, shutdown.subscribe()));
        }
    }

    /// Fold a check's hard-state report into its node and, on a verdict
    /// change, recompute the wanted set. Everything happens under the pool
    /// lock so sibling notifications never interleave.
    pub async fn apply_check_result(&self, node_idx: usize, event: CheckEvent) {
        let mut shared = self.shared.lock().await;
        if node_idx >= shared.health.len() {
            return;
        }

        if let Some(verdict) = shared.health[node_idx].apply(event.check_idx, event.result) {
            let (good, total) = shared.health[node_idx].good_total();
            tracing::info!(
                pool = %self.name,
                node = %self.nodes[node_idx].name,
                good,
                total,
                action = if verdict == NodeState::Up { "up" } else { "down" },
                "node verdict changed"
            );
            self.recompute(&mut shared, node_idx);
        }
    }

    /// Full recomputation of the wanted set. Deferred until every node has
    /// a known verdict; after that, every node edge recomputes from scratch
    /// for determinism.
    fn recompute(&self, shared: &mut PoolShared, trigger_idx: usize) {
        if shared.health.iter().any(|h| h.state == NodeState::Unknown) {
            return;
        }

        let mut wanted: Vec<IpAddr> = Vec::new();

        // Healthy primaries, in configuration order, capped by max_nodes.
        // The up-count deliberately counts all healthy primaries: the
        // degrade action only applies when too few are healthy, not when
        // the cap keeps them out of the table.
        let mut up = 0;
        for (idx, node) in self.nodes.iter().enumerate() {
            if !node.backup && shared.health[idx].state == NodeState::Up {
                up += 1;
                if self.max_nodes == 0 || wanted.len() < self.max_nodes {
                    wanted.push(node.ip);
                }
            }
        }

        let mut forced = 0;
        if self.min_nodes > 0 && up < self.min_nodes {
            match self.action {
                DegradeAction::ForceDown => {
                    wanted.clear();
                }
                DegradeAction::ForceUp => {
                    // The triggering node goes first: it was the last one
                    // alive, so keep loadbalancing where it was. The rest
                    // follow in configuration order.
                    let order = std::iter::once(trigger_idx)
                        .chain((0..self.nodes.len()).filter(|&i| i != trigger_idx));
                    for idx in order {
                        if forced >= self.min_nodes {
                            break;
                        }
                        let node = &self.nodes[idx];
                        if !node.backup && !wanted.contains(&node.ip) {
                            wanted.push(node.ip);
                            forced += 1;
                        }
                    }
                }
                DegradeAction::BackupPool => {
                    for (idx, node) in self.nodes.iter().enumerate() {
                        if node.backup && shared.health[idx].state == NodeState::Up {
                            wanted.push(node.ip);
                            forced += 1;
                        }
                    }
                }
            }
        }

        tracing::info!(
            pool = %self.name,
            up,
            forced,
            min = self.min_nodes,
            max = self.max_nodes,
            total = self.nodes.len(),
            "wanted set recomputed"
        );
        for ip in &wanted {
            tracing::debug!(pool = %self.name, node = %ip, "action: active");
        }

        shared.wanted = wanted;
        shared.dirty = true;
    }

    /// The reconciler's read side: `Some(addresses)` exactly once per
    /// change, `None` while unchanged. `None` must never be read as "empty
    /// desired set" — an intentionally empty set is signalled once, when it
    /// becomes empty.
    pub async fn wanted_nodes(&self) -> Option<Vec<IpAddr>> {
        let mut shared = self.shared.lock().await;
        if !shared.dirty {
            return None;
        }
        shared.dirty = false;
        Some(shared.wanted.clone())
    }
}
