pub mod allocation;
pub mod holdings;

pub use allocation::{current_allocation, AllocationInput, AllocationOutput, ClassAllocation};
pub use holdings::{Holding, Portfolio, Position};
