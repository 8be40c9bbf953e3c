use crate::error::{ChainError, Result};
use tracing::warn;

use super::chain::{Block, Ledger};

/// Check `block` against its own stored hash and against its predecessor.
pub fn validate_block_link(previous: &Block, block: &Block) -> Result<()> {
    let recomputed = block.recompute_hash();
    if block.hash != recomputed {
        return Err(ChainError::InvalidBlock {
            index: block.index,
            reason: format!("stored hash {} does not match recomputed {}", block.hash, recomputed),
        });
    }
    if block.previous_hash != previous.hash {
        return Err(ChainError::InvalidBlock {
            index: block.index,
            reason: format!(
                "previous hash {} does not match block {} hash {}",
                block.previous_hash, previous.index, previous.hash
            ),
        });
    }
    Ok(())
}

impl Ledger {
    /// Walk blocks 1.. checking hashes and linkage, stopping at the first
    /// failure. Genesis is only used as the anchor of block 1.
    pub fn validate_chain(&self) -> Result<()> {
        for pair in self.chain.windows(2) {
            if let Err(e) = validate_block_link(&pair[0], &pair[1]) {
                warn!("chain validation failed: {}", e);
                return Err(e);
            }
        }
        Ok(())
    }

    pub fn is_chain_valid(&self) -> bool {
        self.validate_chain().is_ok()
    }
}
