use crate::transaction::{Balance, Transaction};

use super::chain::{Block, Ledger};

/// Owned copy of a ledger's contents, for rendering.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct LedgerSnapshot {
    pub chain: Vec<Block>,
    pub pending_transactions: Vec<Transaction>,
}

impl Ledger {
    /// Every committed transaction, in chain order then block order.
    pub fn committed_transactions(&self) -> impl Iterator<Item = &Transaction> {
        self.chain.iter().flat_map(|block| block.transactions.iter())
    }

    /// Net amount for `address` over committed blocks only.
    ///
    /// A transaction debits its sender, otherwise credits its recipient, so a
    /// self transfer only debits.
    pub fn get_balance(&self, address: &str) -> Balance {
        self.committed_transactions().fold(Balance::ZERO, |balance, tx| {
            if tx.sender == address {
                balance - Balance::from_num(tx.amount)
            } else if tx.recipient == address {
                balance + Balance::from_num(tx.amount)
            } else {
                balance
            }
        })
    }

    /// First committed transaction with this id. The pending pool is not searched.
    pub fn get_transaction_by_id(&self, id: &str) -> Option<&Transaction> {
        self.committed_transactions().find(|tx| tx.id == id)
    }

    pub fn snapshot(&self) -> LedgerSnapshot {
        LedgerSnapshot {
            chain: self.chain.clone(),
            pending_transactions: self.pending_transactions.clone(),
        }
    }
}
