//! minichain - A minimal append-only proof-of-work ledger
//!
//! # Architecture
//!
//! ## Core Ledger
//! - [`blockchain`] - Blocks, the ledger, mining, queries and chain validation
//! - [`transaction`] - Transaction type, amounts and id generation
//!
//! ## Consensus
//! - [`miner`] - Fixed-difficulty proof-of-work search
//!
//! ## Concurrency
//! - [`node`] - Lock-serialized shared ledger and background mining
//!
//! ## Configuration & Utilities
//! - [`config`] - Configuration management
//! - [`error`] - Error types

#![forbid(unsafe_code)]

// ============================================================================
// Core Ledger
// ============================================================================
pub mod blockchain;
pub mod transaction;

// ============================================================================
// Consensus & Mining
// ============================================================================
pub mod miner;

// ============================================================================
// Concurrency
// ============================================================================
pub mod node;

// ============================================================================
// Configuration & Utilities
// ============================================================================
pub mod config;
pub mod error;
