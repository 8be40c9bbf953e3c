#![forbid(unsafe_code)]
//! Command-line driver: queue transactions, mine, and print the ledger.

use clap::Parser;
use colored::*;
use minichain::blockchain::LedgerSnapshot;
use minichain::config::{load_config, load_config_from};
use minichain::node::Node;
use minichain::transaction::{Amount, Transaction};
use std::path::PathBuf;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Configuration file (defaults to ./minichain.toml)
    #[arg(long)]
    config: Option<PathBuf>,
    /// Transaction to queue, as SENDER:RECIPIENT:AMOUNT
    #[arg(long = "tx", value_parser = parse_transfer)]
    transactions: Vec<Transfer>,
    /// Miner address; overrides miner.beneficiary_address
    #[arg(long)]
    miner: Option<String>,
    /// Number of blocks to mine
    #[arg(long, default_value_t = 1)]
    blocks: u32,
    /// Address to report the balance of
    #[arg(long)]
    balance: Vec<String>,
    /// Transaction id to look up
    #[arg(long)]
    lookup: Option<String>,
    /// Log level; overrides logging.level
    #[arg(long)]
    log_level: Option<String>,
    /// Print the ledger as JSON instead of a summary
    #[arg(long)]
    json: bool,
}

#[derive(Debug, Clone)]
struct Transfer {
    sender: String,
    recipient: String,
    amount: Amount,
}

fn parse_transfer(s: &str) -> Result<Transfer, String> {
    let (addresses, amount) = s
        .rsplit_once(':')
        .ok_or("expected SENDER:RECIPIENT:AMOUNT")?;
    let (sender, recipient) = addresses
        .split_once(':')
        .ok_or("expected SENDER:RECIPIENT:AMOUNT")?;
    let amount = amount
        .parse::<Amount>()
        .map_err(|e| format!("invalid amount {:?}: {}", amount, e))?;
    Ok(Transfer {
        sender: sender.to_string(),
        recipient: recipient.to_string(),
        amount,
    })
}

fn describe(tx: &Transaction) -> String {
    let line = format!("{} {} -> {} ({})", tx.id, tx.sender, tx.recipient, tx.amount);
    if tx.is_reward() {
        format!("{} {}", line, "[reward]".magenta())
    } else {
        line
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => load_config_from(path)?,
        None => load_config()?,
    };
    let level: tracing::Level = cli
        .log_level
        .as_deref()
        .unwrap_or(config.logging.level.as_str())
        .parse()?;
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .init();

    let miner = cli
        .miner
        .clone()
        .unwrap_or_else(|| config.miner.beneficiary_address.clone());
    let node = Node::from_config(&config);

    for transfer in &cli.transactions {
        let tx = node.add_transaction(&transfer.sender, &transfer.recipient, transfer.amount);
        if !cli.json {
            println!("{} {}", "queued".cyan(), describe(&tx));
        }
    }

    for _ in 0..cli.blocks {
        match node.spawn_mining(miner.as_str()).wait().await {
            Ok(block) => {
                if !cli.json {
                    println!(
                        "{} block #{} nonce {} hash {}",
                        "mined".green().bold(),
                        block.index,
                        block.nonce,
                        block.hash
                    );
                }
            }
            Err(e) => {
                eprintln!("{} {}", "not mined:".yellow(), e);
                break;
            }
        }
    }

    let snapshot = node.snapshot();
    if cli.json {
        println!("{}", serde_json::to_string_pretty(&snapshot)?);
        return Ok(());
    }

    print_chain(&snapshot);

    for address in &cli.balance {
        println!("Balance of {}: {}", address.bright_yellow(), node.get_balance(address));
    }

    if let Some(id) = &cli.lookup {
        match node.get_transaction_by_id(id) {
            Some(tx) => println!("Found {}", describe(&tx)),
            None => println!("Transaction {} not found", id.bright_yellow()),
        }
    }

    match node.validate_chain() {
        Ok(()) => println!("Chain valid: {}", "yes".green()),
        Err(e) => println!("Chain valid: {} ({})", "no".red(), e),
    }

    Ok(())
}

fn print_chain(snapshot: &LedgerSnapshot) {
    println!("\n{}", "Blockchain:".bright_cyan().bold());
    for block in &snapshot.chain {
        println!("Index: {}", block.index);
        println!("Timestamp: {}", block.timestamp);
        println!("Transactions: {}", block.transactions.len());
        for tx in &block.transactions {
            println!("  {}", describe(tx));
        }
        println!("Previous Hash: {}", block.previous_hash);
        println!("Nonce: {}", block.nonce);
        println!("Hash: {}\n", block.hash);
    }

    println!("{}", "Pending:".bright_cyan().bold());
    for tx in &snapshot.pending_transactions {
        println!("  {}", describe(tx));
    }
}
