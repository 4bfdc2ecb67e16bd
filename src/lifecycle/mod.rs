//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Startup (supervisor.rs):
//!     Load config → build pools → spawn checks, nodes, reconciler
//!
//! Shutdown (shutdown.rs):
//!     SIGINT/SIGTERM → broadcast stop → drain JoinSet → exit
//!
//! Reload (signals.rs):
//!     SIGHUP → broadcast stop → drain → rebuild from fresh config
//! ```

pub mod shutdown;
pub mod signals;
pub mod supervisor;

pub use shutdown::Shutdown;
pub use signals::{SignalEvent, Signals};
pub use supervisor::Supervisor;
