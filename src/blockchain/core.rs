// core.rs splits responsibilities into submodules: block construction and
// mining, read-side queries, chain validation.
pub mod chain;
pub mod state;
pub mod validation;

pub use chain::*;
pub use state::*;
pub use validation::*;
