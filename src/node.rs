//! Shared ledger handle for callers on more than one thread.
//!
//! Mutations (`add_transaction`, mining) take the write lock, queries take
//! the read lock and may run side by side. Results cross threads as owned
//! clones, never as references into the ledger.

use crate::blockchain::{Block, Ledger, LedgerSnapshot};
use crate::error::{ChainError, Result};
use crate::miner::DEFAULT_CANCEL_CHECK_INTERVAL;
use crate::transaction::{Amount, Balance, Transaction};
use parking_lot::RwLock;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::oneshot;
use tracing::info;

#[derive(Debug, Clone)]
pub struct Node {
    ledger: Arc<RwLock<Ledger>>,
    cancel_check_interval: u64,
}

impl Default for Node {
    fn default() -> Self {
        Self::new(Ledger::new())
    }
}

impl Node {
    pub fn new(ledger: Ledger) -> Self {
        Self::with_cancel_check_interval(ledger, DEFAULT_CANCEL_CHECK_INTERVAL)
    }

    pub fn with_cancel_check_interval(ledger: Ledger, cancel_check_interval: u64) -> Self {
        Node {
            ledger: Arc::new(RwLock::new(ledger)),
            cancel_check_interval: cancel_check_interval.max(1),
        }
    }

    pub fn from_config(config: &crate::config::Config) -> Self {
        Self::with_cancel_check_interval(Ledger::new(), config.miner.cancel_check_interval)
    }

    pub fn add_transaction(&self, sender: &str, recipient: &str, amount: Amount) -> Transaction {
        self.ledger.write().add_transaction(sender, recipient, amount).clone()
    }

    /// Blocking mine on the calling thread.
    pub fn mine(&self, miner_address: &str) -> bool {
        self.ledger.write().mine(miner_address)
    }

    pub fn get_balance(&self, address: &str) -> Balance {
        self.ledger.read().get_balance(address)
    }

    pub fn get_transaction_by_id(&self, id: &str) -> Option<Transaction> {
        self.ledger.read().get_transaction_by_id(id).cloned()
    }

    pub fn is_chain_valid(&self) -> bool {
        self.ledger.read().is_chain_valid()
    }

    pub fn validate_chain(&self) -> Result<()> {
        self.ledger.read().validate_chain()
    }

    pub fn snapshot(&self) -> LedgerSnapshot {
        self.ledger.read().snapshot()
    }

    pub fn len(&self) -> usize {
        self.ledger.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.ledger.read().is_empty()
    }

    /// Mine on the blocking thread pool. Must be called from within a tokio
    /// runtime.
    ///
    /// The worker holds the write lock for the whole search, so other
    /// mutations and queries wait for it to finish or be cancelled.
    pub fn spawn_mining(&self, miner_address: impl Into<String>) -> MiningTask {
        let miner_address = miner_address.into();
        let (sender, receiver) = oneshot::channel();
        let cancel = Arc::new(AtomicBool::new(false));

        let ledger = Arc::clone(&self.ledger);
        let flag = Arc::clone(&cancel);
        let interval = self.cancel_check_interval;
        tokio::task::spawn_blocking(move || {
            info!(miner = %miner_address, "background mining started");
            let outcome = ledger
                .write()
                .mine_cancellable(&miner_address, &flag, interval)
                .map(Block::clone);
            // The task owner may have stopped listening; nothing to do then.
            let _ = sender.send(outcome);
        });

        MiningTask {
            cancel,
            result: receiver,
        }
    }
}

/// Handle to a background mine started by [`Node::spawn_mining`].
#[derive(Debug)]
pub struct MiningTask {
    cancel: Arc<AtomicBool>,
    result: oneshot::Receiver<Result<Block>>,
}

impl MiningTask {
    /// Ask the worker to stop. It notices at its next flag check.
    pub fn cancel(&self) {
        self.cancel.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancel.load(Ordering::SeqCst)
    }

    /// Wait for the committed block or the reason nothing was committed.
    pub async fn wait(self) -> Result<Block> {
        self.result
            .await
            .map_err(|_| ChainError::WorkerError("mining worker exited without a result".to_string()))?
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blocking_operations() {
        let node = Node::default();
        assert!(!node.mine("M"));

        let tx = node.add_transaction("A", "B", Amount::from_num(10));
        assert!(node.mine("M"));
        assert_eq!(node.len(), 2);
        assert_eq!(node.get_transaction_by_id(&tx.id), Some(tx));
        assert_eq!(node.get_balance("A"), Balance::from_num(-10));
        assert!(node.is_chain_valid());
        assert!(node.validate_chain().is_ok());
    }

    #[test]
    fn test_parallel_readers() {
        let node = Node::default();
        node.add_transaction("A", "B", Amount::from_num(10));
        assert!(node.mine("M"));

        let handles: Vec<_> = (0..4)
            .map(|_| {
                let node = node.clone();
                std::thread::spawn(move || (node.get_balance("B"), node.is_chain_valid()))
            })
            .collect();
        for handle in handles {
            assert_eq!(handle.join().unwrap(), (Balance::from_num(10), true));
        }
    }

    #[tokio::test]
    async fn test_background_mining_commits() {
        let node = Node::default();
        node.add_transaction("A", "B", Amount::from_num(10));

        let block = node.spawn_mining("M").wait().await.unwrap();
        assert_eq!(block.index, 1);
        assert!(block.verify_proof());
        assert_eq!(node.len(), 2);
        assert_eq!(node.snapshot().chain[1], block);
        assert_eq!(node.snapshot().pending_transactions[0].recipient, "M");
    }

    #[tokio::test]
    async fn test_background_mining_without_pending() {
        let node = Node::default();
        let err = node.spawn_mining("M").wait().await.unwrap_err();
        assert_eq!(err, ChainError::NoPendingTransactions);
        assert_eq!(node.len(), 1);
    }

    #[tokio::test]
    async fn test_cancel_before_search_starts() {
        let node = Node::default();
        node.add_transaction("A", "B", Amount::from_num(10));

        // Keep the worker parked on the write lock until the flag is set.
        let guard = node.ledger.read();
        let task = node.spawn_mining("M");
        task.cancel();
        assert!(task.is_cancelled());
        drop(guard);

        assert_eq!(task.wait().await.unwrap_err(), ChainError::MiningCancelled);
        assert_eq!(node.len(), 1);
        assert_eq!(node.snapshot().pending_transactions[0].sender, "A");
    }
}
