//! Loadbalancer pools and nodes.
//!
//! # Data Flow
//! ```text
//! check runner emits hard state
//!     → node.rs folds per-check results into one Up/Down verdict
//!     → pool.rs recomputes the wanted backend set under the pool lock
//!     → reconciler reads the wanted set and drives the pf table
//! ```
//!
//! # Design Decisions
//! - Verdicts are recomputed only on check messages, never polled
//! - A node with no configured checks is always eligible (dummy check)
//! - The wanted set is replaced wholesale on every change, not patched

pub mod node;
pub mod pool;

pub use node::{Node, NodeState};
pub use pool::Pool;
