//! Transaction module split into types and id generation helpers

pub mod types;

pub use types::*;
