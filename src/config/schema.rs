//! Configuration schema definitions.
//!
//! All types derive Serde traits for deserialization from the TOML
//! configuration file. Optional fields carry the documented defaults so a
//! minimal configuration stays minimal.

use std::net::{Ipv4Addr, Ipv6Addr};
use std::time::Duration;

use serde::Deserialize;

/// Root configuration: a list of loadbalancer pools.
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct AppConfig {
    #[serde(rename = "pool")]
    pub pools: Vec<PoolConfig>,
}

/// One virtual service and its admission policy.
///
/// A single entry drives both address families: one pool is built per
/// configured `ip4`/`ip6` address, with `_4`/`_6` appended to the pool and
/// pf table names.
#[derive(Debug, Clone, Deserialize)]
pub struct PoolConfig {
    #[serde(default)]
    pub name: String,

    /// IPv4 service address.
    pub ip4: Option<Ipv4Addr>,

    /// IPv6 service address.
    pub ip6: Option<Ipv6Addr>,

    /// Base name of the pf tables holding this pool's routable backends.
    #[serde(default)]
    pub pf_name: String,

    /// Minimum number of healthy primary nodes before the degrade action
    /// applies (0 disables the minimum).
    #[serde(default)]
    pub min_nodes: usize,

    /// Maximum number of active nodes (0 = unlimited).
    #[serde(default)]
    pub max_nodes: usize,

    /// What to do when fewer than `min_nodes` primary nodes are healthy.
    #[serde(default)]
    pub min_nodes_action: DegradeAction,

    /// Checks shared by every node of the pool. A node may override this
    /// list with its own.
    #[serde(default)]
    pub healthchecks: Vec<CheckConfig>,

    #[serde(default)]
    pub nodes: Vec<NodeConfig>,
}

/// One backend server within a pool.
#[derive(Debug, Clone, Deserialize)]
pub struct NodeConfig {
    #[serde(default)]
    pub name: String,

    /// IPv4 backend address. Nodes without the pool's address family are
    /// left out of that family's pool.
    pub ip4: Option<Ipv4Addr>,

    /// IPv6 backend address.
    pub ip6: Option<Ipv6Addr>,

    /// Backup nodes receive traffic only under the BackupPool degrade
    /// action.
    #[serde(default)]
    pub backup: bool,

    /// Node-specific checks overriding the pool's shared list.
    pub healthchecks: Option<Vec<CheckConfig>>,
}

/// Policy applied when fewer than `min_nodes` primary nodes are healthy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum DegradeAction {
    /// Keep serving: force known nodes into the table even if down.
    #[default]
    ForceUp,
    /// Fail safe: empty the table rather than route to unhealthy backends.
    ForceDown,
    /// Switch traffic to the pool's healthy backup nodes.
    BackupPool,
}

/// One healthcheck definition.
///
/// Loosely typed on purpose: per-variant fields live side by side and the
/// probe factory validates them, so one malformed check is skipped with a
/// warning instead of failing the whole configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CheckConfig {
    /// Check type: ping, http, https, script or dummy.
    #[serde(rename = "type")]
    pub kind: String,

    /// Seconds between the end of one attempt and the start of the next.
    pub interval: u64,

    /// Per-attempt timeout in milliseconds.
    pub timeout: u64,

    /// Consecutive failures before the check reports a hard Bad.
    pub max_failed: u32,

    /// http/https: request path.
    pub url: Option<String>,

    /// http/https: Host header override.
    pub host: Option<String>,

    /// http/https: port override (defaults to the scheme port).
    pub port: Option<u16>,

    /// http/https: comma-separated acceptable status codes.
    pub ok_codes: Option<String>,

    /// script: command run through the shell.
    pub script: Option<String>,

    /// dummy: fixed result, "good" or "bad".
    pub result: Option<String>,
}

impl Default for CheckConfig {
    fn default() -> Self {
        Self {
            kind: String::new(),
            interval: 1,
            timeout: 1000,
            max_failed: 3,
            url: None,
            host: None,
            port: None,
            ok_codes: None,
            script: None,
            result: None,
        }
    }
}

impl CheckConfig {
    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.interval)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout)
    }
}
