//! Unspent transaction outputs.

use crate::crypto::PublicKey;
use crate::hash::{hash_concat, Hash};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Schema version of [`OutputView`].
const VIEW_VERSION: u32 = 1;

/// A spendable amount assigned to an identity by some transaction.
///
/// Immutable once constructed; the id is fully determined by the other
/// fields. The index distinguishes sibling outputs of one transaction,
/// so a payment and its change stay distinct even when recipient, value
/// and parent all match.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TransactionOutput {
    /// Content-derived identifier.
    pub id: Hash,
    /// Id of the transaction that minted this output.
    pub parent_id: Hash,
    /// Position among the minting transaction's outputs.
    pub index: u32,
    /// Amount carried.
    pub value: u64,
    /// Identity entitled to spend this output.
    pub recipient: PublicKey,
}

impl TransactionOutput {
    /// Mint the `index`-th output of a transaction: `value` to `recipient`,
    /// parented on the creating transaction's id.
    pub fn new(recipient: PublicKey, value: u64, parent_id: Hash, index: u32) -> Self {
        let id = hash_concat(&[
            &recipient.as_bytes(),
            &value.to_le_bytes(),
            parent_id.as_bytes(),
            &index.to_le_bytes(),
        ]);
        Self {
            id,
            parent_id,
            index,
            value,
            recipient,
        }
    }

    /// Whether `identity` owns this output, compared by canonical key encoding.
    pub fn is_owned_by(&self, identity: &PublicKey) -> bool {
        self.recipient == *identity
    }

    /// Projection of the public fields for rendering and export.
    pub fn view(&self) -> OutputView {
        OutputView {
            version: VIEW_VERSION,
            id: self.id.to_hex(),
            parent_id: self.parent_id.to_hex(),
            index: self.index,
            value: self.value,
            recipient: self.recipient.to_hex(),
        }
    }
}

impl fmt::Display for TransactionOutput {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match serde_json::to_string_pretty(&self.view()) {
            Ok(json) => f.write_str(&json),
            Err(_) => Err(fmt::Error),
        }
    }
}

/// Versioned, serialization-friendly projection of an output.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputView {
    pub version: u32,
    pub id: String,
    pub parent_id: String,
    pub index: u32,
    pub value: u64,
    pub recipient: String,
}
