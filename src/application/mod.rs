pub mod classifier;
pub mod debits;
pub mod engine;
