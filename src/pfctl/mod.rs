//! pf table backend and the reconciliation loop.

pub mod sync;
pub mod table;

pub use sync::Reconciler;
pub use table::{PfctlTable, TableBackend, TableError};
