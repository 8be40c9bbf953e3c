use crate::error::{ChainError, Result};
use crate::miner::{proof_of_work, proof_of_work_cancellable, valid_proof};
use crate::transaction::{update_len_prefixed, Amount, Transaction};
use sha2::{Digest, Sha256};
use std::sync::atomic::AtomicBool;
use tracing::{debug, info, warn};

/// `previous_hash` recorded on the genesis block.
pub const GENESIS_PREVIOUS_HASH: &str = "0";

/// Hash of a block's fields in the fixed canonical layout.
///
/// Layout, all integers little-endian: index (u64), timestamp in epoch
/// milliseconds (i64), transaction count (u64), each transaction as written by
/// [`Transaction::update_hasher`], the length-prefixed previous hash, nonce
/// (u64). The SHA-256 digest is returned as lowercase hex.
pub fn calculate_hash(
    index: u64,
    timestamp: i64,
    transactions: &[Transaction],
    previous_hash: &str,
    nonce: u64,
) -> String {
    let mut hasher = Sha256::new();
    hasher.update(index.to_le_bytes());
    hasher.update(timestamp.to_le_bytes());
    hasher.update((transactions.len() as u64).to_le_bytes());
    for tx in transactions {
        tx.update_hasher(&mut hasher);
    }
    update_len_prefixed(&mut hasher, previous_hash.as_bytes());
    hasher.update(nonce.to_le_bytes());
    hex::encode(hasher.finalize())
}

/// A committed chain position.
///
/// Blocks are only produced sealed: either as genesis or from a
/// [`CandidateBlock`] once its nonce is known.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Block {
    pub index: u64,
    /// Epoch milliseconds, UTC.
    pub timestamp: i64,
    pub transactions: Vec<Transaction>,
    pub previous_hash: String,
    pub nonce: u64,
    pub hash: String,
}

impl Block {
    pub fn genesis() -> Self {
        CandidateBlock::new(0, now_millis(), Vec::new(), GENESIS_PREVIOUS_HASH).seal(0)
    }

    /// Re-derive the hash from the stored fields. Does not touch `self.hash`.
    pub fn recompute_hash(&self) -> String {
        calculate_hash(
            self.index,
            self.timestamp,
            &self.transactions,
            &self.previous_hash,
            self.nonce,
        )
    }

    /// Hash of the same fields with the nonce reset to 0.
    pub fn provisional_hash(&self) -> String {
        calculate_hash(self.index, self.timestamp, &self.transactions, &self.previous_hash, 0)
    }

    /// Whether the stored nonce is a valid proof of work for this block.
    pub fn verify_proof(&self) -> bool {
        valid_proof(&self.provisional_hash(), self.nonce)
    }

    pub fn is_genesis(&self) -> bool {
        self.index == 0
    }
}

/// An unsealed block: fields fixed, nonce not yet searched.
#[derive(Debug, Clone)]
pub struct CandidateBlock {
    index: u64,
    timestamp: i64,
    transactions: Vec<Transaction>,
    previous_hash: String,
    provisional_hash: String,
}

impl CandidateBlock {
    pub fn new(
        index: u64,
        timestamp: i64,
        transactions: Vec<Transaction>,
        previous_hash: impl Into<String>,
    ) -> Self {
        let previous_hash = previous_hash.into();
        let provisional_hash = calculate_hash(index, timestamp, &transactions, &previous_hash, 0);
        CandidateBlock {
            index,
            timestamp,
            transactions,
            previous_hash,
            provisional_hash,
        }
    }

    pub fn index(&self) -> u64 {
        self.index
    }

    /// The nonce-0 hash the proof-of-work search runs against.
    pub fn provisional_hash(&self) -> &str {
        &self.provisional_hash
    }

    /// Fix the nonce and compute the final hash over every field.
    pub fn seal(self, nonce: u64) -> Block {
        let hash = calculate_hash(
            self.index,
            self.timestamp,
            &self.transactions,
            &self.previous_hash,
            nonce,
        );
        Block {
            index: self.index,
            timestamp: self.timestamp,
            transactions: self.transactions,
            previous_hash: self.previous_hash,
            nonce,
            hash,
        }
    }
}

pub(crate) fn now_millis() -> i64 {
    chrono::Utc::now().timestamp_millis()
}

/// The chain of committed blocks plus the pool of transactions waiting for
/// the next block.
///
/// Single writer: callers sharing a ledger across threads go through
/// [`crate::node::Node`].
#[derive(Debug, Clone)]
pub struct Ledger {
    pub(crate) chain: Vec<Block>,
    pub(crate) pending_transactions: Vec<Transaction>,
}

impl Default for Ledger {
    fn default() -> Self {
        Self::new()
    }
}

impl Ledger {
    /// A ledger holding only the genesis block and an empty pending pool.
    pub fn new() -> Self {
        Ledger {
            chain: vec![Block::genesis()],
            pending_transactions: Vec::new(),
        }
    }

    pub fn chain(&self) -> &[Block] {
        &self.chain
    }

    pub fn pending_transactions(&self) -> &[Transaction] {
        &self.pending_transactions
    }

    pub fn len(&self) -> usize {
        self.chain.len()
    }

    /// Always false: genesis is present from construction.
    pub fn is_empty(&self) -> bool {
        self.chain.is_empty()
    }

    pub fn last_block(&self) -> &Block {
        // The chain starts with genesis and is never shortened.
        &self.chain[self.chain.len() - 1]
    }

    /// Queue a transaction for the next block. Never fails.
    pub fn add_transaction(
        &mut self,
        sender: impl Into<String>,
        recipient: impl Into<String>,
        amount: Amount,
    ) -> &Transaction {
        let tx = Transaction::new(sender, recipient, amount);
        debug!(id = %tx.id, sender = %tx.sender, recipient = %tx.recipient, amount = %tx.amount, "transaction queued");
        self.pending_transactions.push(tx);
        &self.pending_transactions[self.pending_transactions.len() - 1]
    }

    /// Mine the pending pool into a new block.
    ///
    /// Returns `false` without touching any state when nothing is pending.
    /// Blocks the caller for the whole proof-of-work search.
    pub fn mine(&mut self, miner_address: &str) -> bool {
        self.try_mine(miner_address).is_ok()
    }

    /// [`Ledger::mine`] reporting the committed block, or
    /// [`ChainError::NoPendingTransactions`].
    pub fn try_mine(&mut self, miner_address: &str) -> Result<&Block> {
        let candidate = self.next_candidate()?;
        let nonce = proof_of_work(candidate.provisional_hash());
        Ok(self.commit(candidate.seal(nonce), miner_address))
    }

    /// Like [`Ledger::try_mine`], but gives up with
    /// [`ChainError::MiningCancelled`] once `cancel` is observed set. The
    /// flag is read every `check_interval` attempts. A cancelled search
    /// leaves chain and pending pool untouched.
    pub fn mine_cancellable(
        &mut self,
        miner_address: &str,
        cancel: &AtomicBool,
        check_interval: u64,
    ) -> Result<&Block> {
        let candidate = self.next_candidate()?;
        match proof_of_work_cancellable(candidate.provisional_hash(), cancel, check_interval) {
            Some(nonce) => Ok(self.commit(candidate.seal(nonce), miner_address)),
            None => {
                warn!(index = candidate.index(), "mining cancelled before a proof was found");
                Err(ChainError::MiningCancelled)
            }
        }
    }

    fn next_candidate(&self) -> Result<CandidateBlock> {
        if self.pending_transactions.is_empty() {
            return Err(ChainError::NoPendingTransactions);
        }
        Ok(CandidateBlock::new(
            self.chain.len() as u64,
            now_millis(),
            self.pending_transactions.clone(),
            self.last_block().hash.clone(),
        ))
    }

    fn commit(&mut self, block: Block, miner_address: &str) -> &Block {
        info!(
            index = block.index,
            nonce = block.nonce,
            hash = %block.hash,
            transactions = block.transactions.len(),
            "block committed"
        );
        self.chain.push(block);
        self.pending_transactions = vec![Transaction::reward(miner_address)];
        self.last_block()
    }
}
