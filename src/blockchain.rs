// Thin re-export module: implementation is in `blockchain/core.rs`, split
// into block/mining, query and validation submodules.

pub mod core;
pub use core::*;
