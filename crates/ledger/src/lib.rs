//! Unspent-output ledger and transaction settlement for minicoin.
//!
//! - `store`: the owner-keyed map of unspent outputs
//! - `process`: validation gates and atomic settlement

pub mod process;
pub mod store;

// Re-export commonly used types at the crate root
pub use process::{ProcessError, Processor};
pub use store::{Ledger, LedgerError};
