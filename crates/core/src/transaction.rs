//! Transactions: construction, identity, signing and verification.

use crate::crypto::{Keypair, PublicKey, Signature};
use crate::hash::{hash, Hash};
use crate::output::{OutputView, TransactionOutput};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;

/// Schema version of [`TransactionView`].
const VIEW_VERSION: u32 = 1;

/// Issues the per-construction tick that keeps transaction ids unique.
///
/// Otherwise-identical transactions hash different ticks and so get
/// different ids. Ticks carry no meaning beyond uniqueness within one
/// counter's lifetime; they are never persisted.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Sequence(u64);

impl Sequence {
    /// Start a fresh counter.
    pub fn new() -> Self {
        Self(0)
    }

    /// Take the next tick. The first call returns 1.
    pub fn next(&mut self) -> u64 {
        self.0 += 1;
        self.0
    }
}

/// A transfer of value from `sender` to `recipient`, consuming `inputs`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transaction {
    /// Unique identifier, hashed over the participants, the amount and a
    /// sequence tick.
    pub id: Hash,
    /// Identity authorizing the spend.
    pub sender: PublicKey,
    /// Identity being paid.
    pub recipient: PublicKey,
    /// Amount to transfer.
    pub value: u64,
    /// Signature over `id`; zeroed until `sign` is called.
    pub signature: Signature,
    /// Unspent outputs the sender claims and consumes.
    pub inputs: HashSet<TransactionOutput>,
    /// Outputs minted by successful processing; empty before that.
    pub outputs: HashSet<TransactionOutput>,
}

/// Id preimage (for hashing at construction).
#[derive(Serialize)]
struct IdPreimage {
    sender: PublicKey,
    recipient: PublicKey,
    value: u64,
    sequence: u64,
}

impl Transaction {
    /// Create an unprocessed, unsigned transfer. Takes one tick from
    /// `sequence` so duplicate transfers still get distinct ids.
    pub fn new(
        sender: PublicKey,
        recipient: PublicKey,
        value: u64,
        inputs: HashSet<TransactionOutput>,
        sequence: &mut Sequence,
    ) -> Self {
        let preimage = IdPreimage {
            sender: sender.clone(),
            recipient: recipient.clone(),
            value,
            sequence: sequence.next(),
        };
        let encoded = bincode::serialize(&preimage).expect("serialization should not fail");
        Self {
            id: hash(&encoded),
            sender,
            recipient,
            value,
            signature: Signature::default(),
            inputs,
            outputs: HashSet::new(),
        }
    }

    /// Create a genesis transaction: fixed zero id and one immediate output
    /// of `value` to `recipient`. Consumes nothing, skips the sequence and
    /// is never validated or processed.
    pub fn genesis(sender: PublicKey, recipient: PublicKey, value: u64) -> Self {
        let mut outputs = HashSet::new();
        outputs.insert(TransactionOutput::new(recipient.clone(), value, Hash::ZERO, 0));
        Self {
            id: Hash::ZERO,
            sender,
            recipient,
            value,
            signature: Signature::default(),
            inputs: HashSet::new(),
            outputs,
        }
    }

    /// Sign the id with the sender's key. Must precede processing.
    pub fn sign(&mut self, keypair: &Keypair) {
        self.signature = keypair.sign_hash(&self.id);
    }

    /// Sign and return the transaction.
    pub fn signed(mut self, keypair: &Keypair) -> Self {
        self.sign(keypair);
        self
    }

    /// Whether `signature` is valid for `sender` over this transaction's id.
    pub fn verify(&self) -> bool {
        self.sender.verify(self.id.as_bytes(), &self.signature).is_ok()
    }

    /// Total value carried by the claimed inputs; 0 for none.
    /// Saturates at `u64::MAX` rather than wrapping.
    pub fn inputs_value(&self) -> u64 {
        self.inputs
            .iter()
            .fold(0u64, |sum, output| sum.saturating_add(output.value))
    }

    /// Projection of the public fields for rendering and export.
    /// Inputs and outputs are ordered by id so the rendering is stable.
    pub fn view(&self) -> TransactionView {
        let mut inputs: Vec<OutputView> = self.inputs.iter().map(|o| o.view()).collect();
        inputs.sort_by(|a, b| a.id.cmp(&b.id));
        let mut outputs: Vec<OutputView> = self.outputs.iter().map(|o| o.view()).collect();
        outputs.sort_by(|a, b| a.id.cmp(&b.id));

        TransactionView {
            version: VIEW_VERSION,
            id: self.id.to_hex(),
            sender: self.sender.to_hex(),
            recipient: self.recipient.to_hex(),
            value: self.value,
            signature: self.signature.to_hex(),
            inputs,
            outputs,
        }
    }
}

impl fmt::Display for Transaction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match serde_json::to_string_pretty(&self.view()) {
            Ok(json) => f.write_str(&json),
            Err(_) => Err(fmt::Error),
        }
    }
}

/// Versioned, serialization-friendly projection of a transaction.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransactionView {
    pub version: u32,
    pub id: String,
    pub sender: String,
    pub recipient: String,
    pub value: u64,
    pub signature: String,
    pub inputs: Vec<OutputView>,
    pub outputs: Vec<OutputView>,
}
