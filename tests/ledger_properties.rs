//! Integration tests for the ledger's public API
//!
//! These exercise the ledger the way a front-end would: queue transfers,
//! mine, then read balances, lookups and validity through owned results.

use minichain::blockchain::{calculate_hash, Block, CandidateBlock, Ledger, GENESIS_PREVIOUS_HASH};
use minichain::error::ChainError;
use minichain::miner::{proof_digest, DIFFICULTY_PREFIX};
use minichain::node::Node;
use minichain::transaction::{
    Amount, Balance, Transaction, REWARD_SENDER, TRANSACTION_ID_LENGTH,
};

fn amount(n: i32) -> Amount {
    Amount::from_num(n)
}

fn balance(n: i64) -> Balance {
    Balance::from_num(n)
}

#[test]
fn test_recompute_hash_is_stable() {
    let tx = Transaction {
        id: "0123456789".to_string(),
        sender: "A".to_string(),
        recipient: "B".to_string(),
        amount: amount(10),
    };
    let block = CandidateBlock::new(1, 1_700_000_000_123, vec![tx.clone()], "abc").seal(5);

    assert_eq!(block.recompute_hash(), block.recompute_hash());
    assert_eq!(block.hash, calculate_hash(1, 1_700_000_000_123, &[tx], "abc", 5));
}

#[test]
fn test_genesis_block() {
    let genesis = Block::genesis();
    assert!(genesis.is_genesis());
    assert_eq!(genesis.previous_hash, GENESIS_PREVIOUS_HASH);
    assert_eq!(genesis.nonce, 0);
    assert_eq!(genesis.hash, genesis.recompute_hash());

    let ledger = Ledger::default();
    assert_eq!(ledger.chain().len(), 1);
    assert_eq!(ledger.chain()[0].index, 0);
    assert!(ledger.chain()[0].transactions.is_empty());
    assert!(!ledger.is_empty());
}

#[test]
fn test_empty_pool_cannot_be_mined() {
    let mut ledger = Ledger::new();
    let before = ledger.snapshot();

    assert!(!ledger.mine("anyone"));
    assert_eq!(ledger.snapshot(), before);
    assert!(matches!(ledger.try_mine("anyone"), Err(ChainError::NoPendingTransactions)));
}

#[test]
fn test_mine_end_to_end() -> Result<(), Box<dyn std::error::Error>> {
    let mut ledger = Ledger::new();
    let queued = ledger.add_transaction("A", "B", amount(10)).clone();

    let block = ledger.try_mine("M")?.clone();
    assert_eq!(ledger.len(), 2);
    assert_eq!(block.transactions, vec![queued.clone()]);
    assert!(proof_digest(&block.provisional_hash(), block.nonce).starts_with(DIFFICULTY_PREFIX));
    assert_eq!(block.hash, block.recompute_hash());
    assert_eq!(block.previous_hash, ledger.chain()[0].hash);

    let pending = ledger.pending_transactions();
    assert_eq!(pending.len(), 1);
    assert_eq!(pending[0].sender, REWARD_SENDER);
    assert_eq!(pending[0].recipient, "M");
    assert_eq!(pending[0].amount, amount(1));
    assert_eq!(pending[0].id.len(), TRANSACTION_ID_LENGTH);

    // Committing the reward gives the miner its balance.
    assert!(ledger.mine("M"));
    assert_eq!(ledger.get_balance("A"), balance(-10));
    assert_eq!(ledger.get_balance("B"), balance(10));
    assert_eq!(ledger.get_balance("M"), balance(1));
    assert_eq!(ledger.get_balance("unknown"), Balance::ZERO);

    assert_eq!(ledger.get_transaction_by_id(&queued.id), Some(&queued));
    assert!(ledger.get_transaction_by_id("missing").is_none());
    assert!(ledger.is_chain_valid());
    Ok(())
}

#[test]
fn test_self_transfer_debits() {
    let mut ledger = Ledger::new();
    ledger.add_transaction("A", "A", amount(5));
    assert!(ledger.mine("M"));
    assert_eq!(ledger.get_balance("A"), balance(-5));
}

#[test]
fn test_snapshot_mutation_does_not_reach_ledger() {
    let mut ledger = Ledger::new();
    ledger.add_transaction("A", "B", amount(10));
    assert!(ledger.mine("M"));

    let mut snapshot = ledger.snapshot();
    snapshot.chain[1].transactions[0].amount = amount(999);
    assert!(ledger.is_chain_valid());
    assert_eq!(ledger.get_balance("B"), balance(10));
}

#[test]
fn test_chain_grows_with_linked_blocks() {
    let mut ledger = Ledger::new();
    for i in 0..3 {
        ledger.add_transaction("A", format!("R{}", i), amount(i + 1));
        assert!(ledger.mine("M"));
    }

    assert_eq!(ledger.len(), 4);
    for (i, pair) in ledger.chain().windows(2).enumerate() {
        assert_eq!(pair[1].index, i as u64 + 1);
        assert_eq!(pair[1].previous_hash, pair[0].hash);
        assert!(pair[1].verify_proof());
    }
    // Blocks 2 and 3 also carry the previous reward.
    assert_eq!(ledger.chain()[2].transactions.len(), 2);
    assert_eq!(ledger.get_balance("M"), balance(2));
    assert_eq!(ledger.get_balance("A"), balance(-6));
}

#[test]
fn test_extreme_amounts_do_not_abort_balance() {
    let mut ledger = Ledger::new();
    ledger.add_transaction("A", "B", Amount::from_num(2_000_000_000));
    ledger.add_transaction("C", "B", Amount::from_num(2_000_000_000));
    ledger.add_transaction("A", "B", Amount::MIN);
    assert!(ledger.mine("M"));

    let min = Balance::from_num(Amount::MIN);
    assert_eq!(ledger.get_balance("B"), balance(4_000_000_000) + min);
    assert_eq!(ledger.get_balance("A"), balance(-2_000_000_000) - min);
    assert!(ledger.is_chain_valid());
}

#[tokio::test]
async fn test_node_background_mining() {
    let node = Node::default();
    let tx = node.add_transaction("A", "B", amount(10));

    let block = node.spawn_mining("M").wait().await.unwrap();
    assert_eq!(block.transactions[0].id, tx.id);
    assert_eq!(node.get_transaction_by_id(&tx.id), Some(tx));
    assert!(node.is_chain_valid());
}
