//! Health-check driven manager for pf loadbalancer tables.
//!
//! # Architecture Overview
//!
//! ```text
//!   ┌────────────────────────────────────────────────────────────┐
//!   │                         pfguard                            │
//!   │                                                            │
//!   │   probes ──▶ healthcheck ──▶ node ──▶ pool ──▶ reconciler ─┼──▶ pf table
//!   │  (ping/http/   hysteresis     all     min/max    diff +    │   (pfctl)
//!   │   script/      edge-trigger  checks   degrade    ordered   │
//!   │   dummy)                     folded   policy     patch     │
//!   │                                                            │
//!   │   supervisor: config lifecycle, signals, cascading stop    │
//!   └────────────────────────────────────────────────────────────┘
//! ```
//!
//! Data flows upward (probe → check → node → pool → reconciler → table),
//! control and shutdown flow downward (supervisor → pool → node → check).

// Core subsystems
pub mod config;
pub mod healthcheck;
pub mod lbpool;
pub mod pfctl;

// Cross-cutting concerns
pub mod lifecycle;

pub use config::AppConfig;
pub use lbpool::Pool;
pub use lifecycle::{Shutdown, Supervisor};
pub use pfctl::{PfctlTable, Reconciler, TableBackend};
