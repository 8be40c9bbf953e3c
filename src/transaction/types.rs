/// Transaction types for minichain
use fixed::types::{I32F32, I64F64};
use rand::distributions::Alphanumeric;
use rand::Rng;
use sha2::{Digest, Sha256};

/// Signed fixed-point quantity carried by a transaction.
pub type Amount = I32F32;

/// Running total of many [`Amount`]s. Wide enough that summing every
/// transaction a ledger can hold in memory never overflows.
pub type Balance = I64F64;

/// Length of the identifiers produced by [`generate_transaction_id`].
pub const TRANSACTION_ID_LENGTH: usize = 10;

/// Sender recorded on the synthetic transaction that rewards a miner.
pub const REWARD_SENDER: &str = "Blockchain";

/// Amount credited to the miner of each block.
pub const MINING_REWARD: Amount = Amount::from_bits(1i64 << 32);

/// A value transfer between two free-form addresses.
///
/// Nothing here is validated: negative or zero amounts, self transfers and
/// colliding ids are all recorded as given.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Transaction {
    pub id: String,
    pub sender: String,
    pub recipient: String,
    pub amount: Amount,
}

impl Transaction {
    /// Build a transaction with a freshly generated id.
    pub fn new(sender: impl Into<String>, recipient: impl Into<String>, amount: Amount) -> Self {
        Transaction {
            id: generate_transaction_id(),
            sender: sender.into(),
            recipient: recipient.into(),
            amount,
        }
    }

    /// The reward credited to `miner_address` after a block is committed.
    pub fn reward(miner_address: impl Into<String>) -> Self {
        Transaction::new(REWARD_SENDER, miner_address, MINING_REWARD)
    }

    pub fn is_reward(&self) -> bool {
        self.sender == REWARD_SENDER
    }

    /// Feed this transaction into a block hash.
    ///
    /// Layout: `id`, `sender`, `recipient` (each length-prefixed), then the
    /// amount's raw little-endian bits.
    pub fn update_hasher(&self, hasher: &mut Sha256) {
        update_len_prefixed(hasher, self.id.as_bytes());
        update_len_prefixed(hasher, self.sender.as_bytes());
        update_len_prefixed(hasher, self.recipient.as_bytes());
        hasher.update(self.amount.to_bits().to_le_bytes());
    }
}

/// Random alphanumeric id of [`TRANSACTION_ID_LENGTH`] characters.
///
/// Collisions are possible and never checked.
pub fn generate_transaction_id() -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(TRANSACTION_ID_LENGTH)
        .map(char::from)
        .collect()
}

/// Hash a u64 little-endian length followed by the bytes themselves.
pub(crate) fn update_len_prefixed(hasher: &mut Sha256, bytes: &[u8]) {
    hasher.update((bytes.len() as u64).to_le_bytes());
    hasher.update(bytes);
}
