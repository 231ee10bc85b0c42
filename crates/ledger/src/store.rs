//! The unspent-output ledger: which identity currently owns which outputs.

use minicoin_core::{Hash, PublicKey, TransactionOutput};
use std::collections::{HashMap, HashSet};
use thiserror::Error;

/// Errors raised by ledger mutations.
#[derive(Debug, Error)]
pub enum LedgerError {
    #[error("output {0} is not among the owner's unspent outputs")]
    UnknownOutput(Hash),
}

pub type Result<T> = std::result::Result<T, LedgerError>;

/// Maps each owner to the set of outputs it can spend.
///
/// An owner without an entry owns nothing; every accessor treats absence
/// as the empty set. Entries emptied by spending stay in the map.
#[derive(Debug, Clone, Default)]
pub struct Ledger {
    entries: HashMap<PublicKey, HashSet<TransactionOutput>>,
}

impl Ledger {
    /// Create an empty ledger.
    pub fn new() -> Self {
        Self {
            entries: HashMap::new(),
        }
    }

    /// Iterate the outputs currently owned by `owner`.
    pub fn outputs(&self, owner: &PublicKey) -> impl Iterator<Item = &TransactionOutput> {
        self.entries.get(owner).into_iter().flatten()
    }

    /// Whether `owner` currently owns `output`.
    pub fn contains(&self, owner: &PublicKey, output: &TransactionOutput) -> bool {
        self.entries
            .get(owner)
            .map_or(false, |owned| owned.contains(output))
    }

    /// Whether every output in `outputs` is currently owned by `owner`.
    pub fn owns_all(&self, owner: &PublicKey, outputs: &HashSet<TransactionOutput>) -> bool {
        match self.entries.get(owner) {
            Some(owned) => outputs.is_subset(owned),
            None => outputs.is_empty(),
        }
    }

    /// File an output under its recipient, creating the entry if absent.
    pub fn insert(&mut self, output: TransactionOutput) {
        self.entries
            .entry(output.recipient.clone())
            .or_default()
            .insert(output);
    }

    /// Remove every output in `outputs` from the owner's entry.
    pub fn remove_all(&mut self, owner: &PublicKey, outputs: &HashSet<TransactionOutput>) {
        if let Some(owned) = self.entries.get_mut(owner) {
            for output in outputs {
                owned.remove(output);
            }
        }
    }

    /// Spendable balance of `owner`: the sum of its owned output values.
    /// Saturates at `u64::MAX` rather than wrapping.
    pub fn balance(&self, owner: &PublicKey) -> u64 {
        self.outputs(owner)
            .fold(0u64, |sum, output| sum.saturating_add(output.value))
    }

    /// Settle a spend as one atomic update: every output in `spent` leaves
    /// the sender's entry and every output in `minted` is filed under its
    /// recipient.
    ///
    /// Ownership of `spent` is re-validated against the current state first;
    /// on failure nothing is mutated and the offending output is reported.
    pub fn commit(
        &mut self,
        sender: &PublicKey,
        spent: &HashSet<TransactionOutput>,
        minted: &[TransactionOutput],
    ) -> Result<()> {
        if let Some(missing) = spent.iter().find(|output| !self.contains(sender, output)) {
            return Err(LedgerError::UnknownOutput(missing.id));
        }

        self.remove_all(sender, spent);
        for output in minted {
            self.insert(output.clone());
        }
        Ok(())
    }

    /// Number of owners with an entry.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether no owner has an entry.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use minicoin_core::Keypair;

    fn output_for(owner: &PublicKey, value: u64, tag: &[u8]) -> TransactionOutput {
        TransactionOutput::new(owner.clone(), value, minicoin_core::hash(tag), 0)
    }

    #[test]
    fn test_absent_owner_owns_nothing() {
        let ledger = Ledger::new();
        let kp = Keypair::generate();

        assert_eq!(ledger.balance(&kp.public_key), 0);
        assert_eq!(ledger.outputs(&kp.public_key).count(), 0);
        assert!(ledger.owns_all(&kp.public_key, &HashSet::new()));

        let mut outputs = HashSet::new();
        outputs.insert(output_for(&kp.public_key, 10, b"a"));
        assert!(!ledger.owns_all(&kp.public_key, &outputs));
    }

    #[test]
    fn test_insert_files_under_recipient() {
        let mut ledger = Ledger::new();
        let alice = Keypair::generate();
        let bob = Keypair::generate();

        ledger.insert(output_for(&alice.public_key, 50, b"a"));
        ledger.insert(output_for(&bob.public_key, 7, b"b"));

        assert_eq!(ledger.balance(&alice.public_key), 50);
        assert_eq!(ledger.balance(&bob.public_key), 7);
        assert_eq!(ledger.len(), 2);
    }

    #[test]
    fn test_insert_keeps_same_value_grants_distinct() {
        let mut ledger = Ledger::new();
        let alice = Keypair::generate();

        // Two grants of 20 from the same transaction, distinguished by index.
        let parent = minicoin_core::hash(b"grants");
        let first = TransactionOutput::new(alice.public_key.clone(), 20, parent, 0);
        let second = TransactionOutput::new(alice.public_key.clone(), 20, parent, 1);

        ledger.insert(first.clone());
        ledger.insert(second);
        assert_eq!(ledger.balance(&alice.public_key), 40);
        assert_eq!(ledger.outputs(&alice.public_key).count(), 2);

        // Re-filing an output the owner already holds changes nothing.
        ledger.insert(first);
        assert_eq!(ledger.balance(&alice.public_key), 40);
        assert_eq!(ledger.outputs(&alice.public_key).count(), 2);
    }

    #[test]
    fn test_balance_saturates_at_max() {
        let mut ledger = Ledger::new();
        let alice = Keypair::generate();

        ledger.insert(output_for(&alice.public_key, u64::MAX, b"a"));
        ledger.insert(output_for(&alice.public_key, 7, b"b"));

        assert_eq!(ledger.balance(&alice.public_key), u64::MAX);
    }

    #[test]
    fn test_remove_all_keeps_emptied_entry() {
        let mut ledger = Ledger::new();
        let alice = Keypair::generate();
        let output = output_for(&alice.public_key, 50, b"a");

        ledger.insert(output.clone());
        let mut spent = HashSet::new();
        spent.insert(output);
        ledger.remove_all(&alice.public_key, &spent);

        assert_eq!(ledger.balance(&alice.public_key), 0);
        assert_eq!(ledger.len(), 1);
    }

    #[test]
    fn test_commit_moves_spent_and_files_minted() {
        let mut ledger = Ledger::new();
        let alice = Keypair::generate();
        let bob = Keypair::generate();

        let funding = output_for(&alice.public_key, 50, b"a");
        ledger.insert(funding.clone());

        let mut spent = HashSet::new();
        spent.insert(funding);
        let minted = vec![
            output_for(&bob.public_key, 30, b"payment"),
            output_for(&alice.public_key, 20, b"change"),
        ];

        ledger.commit(&alice.public_key, &spent, &minted).unwrap();

        assert_eq!(ledger.balance(&alice.public_key), 20);
        assert_eq!(ledger.balance(&bob.public_key), 30);
    }

    #[test]
    fn test_commit_rejects_unowned_spend_untouched() {
        let mut ledger = Ledger::new();
        let alice = Keypair::generate();
        let bob = Keypair::generate();

        ledger.insert(output_for(&alice.public_key, 50, b"a"));

        // Bob's output, never filed under Alice.
        let foreign = output_for(&bob.public_key, 5, b"b");
        let mut spent = HashSet::new();
        spent.insert(foreign.clone());
        let minted = vec![output_for(&bob.public_key, 5, b"minted")];

        let err = ledger
            .commit(&alice.public_key, &spent, &minted)
            .unwrap_err();
        assert!(matches!(err, LedgerError::UnknownOutput(id) if id == foreign.id));

        assert_eq!(ledger.balance(&alice.public_key), 50);
        assert_eq!(ledger.balance(&bob.public_key), 0);
    }
}
