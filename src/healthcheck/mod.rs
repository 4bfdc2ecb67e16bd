//! Health checking subsystem.
//!
//! # Data Flow
//! ```text
//! probe variant (ping.rs / http.rs / script.rs / dummy.rs):
//!     One attempt → ProbeOutcome (Good / Bad / Error + cause)
//!
//! runner (runner.rs):
//!     schedule attempts on an interval
//!     → apply asymmetric hysteresis
//!     → emit edge-triggered hard state (CheckEvent) to the owning node
//! ```
//!
//! # Design Decisions
//! - Probes are a tagged enum behind one `run()` seam, not trait objects
//! - Fast recovery (one Good probe), slow failure (max_failed consecutive)
//! - Probe failures are never fatal; the loop runs until shutdown

pub mod dummy;
pub mod http;
pub mod ping;
pub mod probe;
pub mod result;
pub mod runner;
pub mod script;

pub use probe::Probe;
pub use result::{CheckEvent, CheckResult, ProbeError, ProbeOutcome};
pub use runner::{CheckSpec, HealthCheck};
