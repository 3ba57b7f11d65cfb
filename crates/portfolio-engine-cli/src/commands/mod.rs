pub mod allocation;
pub mod classify;
pub mod contribute;
pub mod macro_targets;
pub mod optimize;
pub mod rebalance;
