//! Transaction validation and settlement against the ledger.

use crate::store::{Ledger, LedgerError};
use minicoin_core::{Hash, Transaction, TransactionOutput};
use thiserror::Error;
use tracing::{debug, warn};

/// A transaction rejection. Every variant is recoverable: the ledger is
/// left untouched and the claimed inputs remain spendable.
#[derive(Debug, Error)]
pub enum ProcessError {
    #[error("transaction signature failed verification")]
    SignatureInvalid,

    #[error("input {output} is not among the sender's unspent outputs")]
    UnknownInput { output: Hash },

    #[error("insufficient inputs (required {required}, available {available})")]
    InsufficientInputs { required: u64, available: u64 },
}

pub type Result<T> = std::result::Result<T, ProcessError>;

/// Validates transactions and settles them against a ledger.
pub struct Processor<'a> {
    ledger: &'a mut Ledger,
}

impl<'a> Processor<'a> {
    /// Create a processor over the given ledger.
    pub fn new(ledger: &'a mut Ledger) -> Self {
        Self { ledger }
    }

    /// Validate `tx` and settle it.
    ///
    /// Gates run in order: signature, input ownership, input sufficiency.
    /// A failed gate rejects the transaction with nothing mutated. On
    /// success the inputs leave the sender's entry and the minted payment
    /// and change outputs are filed under their recipients in one atomic
    /// ledger update, then recorded in `tx.outputs`.
    pub fn process(&mut self, tx: &mut Transaction) -> Result<()> {
        if !tx.verify() {
            warn!("rejecting transaction {}: signature failed verification", tx.id);
            return Err(ProcessError::SignatureInvalid);
        }

        if let Some(missing) = tx
            .inputs
            .iter()
            .find(|output| !self.ledger.contains(&tx.sender, output))
        {
            warn!(
                "rejecting transaction {}: input {} not owned by sender",
                tx.id, missing.id
            );
            return Err(ProcessError::UnknownInput { output: missing.id });
        }

        let available = tx.inputs_value();
        if available < tx.value {
            warn!(
                "rejecting transaction {}: inputs carry {}, {} requested",
                tx.id, available, tx.value
            );
            return Err(ProcessError::InsufficientInputs {
                required: tx.value,
                available,
            });
        }

        // A transaction fee, once introduced, comes out of the change here.
        // Payment is output 0, change output 1, so the two stay distinct
        // even when a self-payment splits an input into equal halves.
        let change = available - tx.value;
        let mut minted = vec![TransactionOutput::new(tx.recipient.clone(), tx.value, tx.id, 0)];
        if change > 0 {
            minted.push(TransactionOutput::new(tx.sender.clone(), change, tx.id, 1));
        }

        match self.ledger.commit(&tx.sender, &tx.inputs, &minted) {
            Ok(()) => {}
            Err(LedgerError::UnknownOutput(id)) => {
                return Err(ProcessError::UnknownInput { output: id });
            }
        }
        tx.outputs.extend(minted);

        debug!(
            "settled transaction {}: spent {} input(s), minted {} output(s)",
            tx.id,
            tx.inputs.len(),
            tx.outputs.len()
        );
        Ok(())
    }
}
