pub mod error;
pub mod types;

#[cfg(feature = "classification")]
pub mod classification;

#[cfg(feature = "portfolio")]
pub mod portfolio;

#[cfg(feature = "optimization")]
pub mod optimization;

#[cfg(feature = "macro_scenario")]
pub mod macro_scenario;

#[cfg(feature = "allocation")]
pub mod rebalance;

#[cfg(feature = "allocation")]
pub mod contribution;

pub use error::PortfolioError;
pub use types::*;

/// Standard result type for all engine operations
pub type PortfolioResult<T> = Result<T, PortfolioError>;
