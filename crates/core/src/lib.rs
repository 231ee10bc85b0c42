//! Core primitives for minicoin.
//!
//! This crate provides the fundamental types of the transaction model:
//! - Cryptographic primitives (hashing, signing, identities)
//! - Unspent transaction outputs
//! - Transactions and their id sequence

pub mod crypto;
pub mod hash;
pub mod output;
pub mod transaction;

// Re-export commonly used types at the crate root
pub use crypto::{CryptoError, Keypair, PublicKey, Signature};
pub use hash::{hash, hash_concat, Hash};
pub use output::{OutputView, TransactionOutput};
pub use transaction::{Sequence, Transaction, TransactionView};
