//! Weighting strategies over a historical return series.
//!
//! Three interchangeable strategies share the same contract: given an
//! aligned `ReturnSeries`, produce long-only weights over exactly its
//! tickers, in [0, 1], summing to 1. Convergence fallbacks are never
//! silent; they set `converged = false` and add a warning to the
//! computation envelope.

pub mod hrp;
pub(crate) mod linalg;
pub mod mean_variance;
pub mod risk_parity;
pub mod series;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

pub use hrp::optimize_hrp;
pub use mean_variance::{optimize_min_volatility, MinVolInput};
pub use risk_parity::optimize_risk_parity;
pub use series::ReturnSeries;

/// A single optimized asset weight.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssetWeight {
    pub ticker: String,
    pub weight: Decimal,
}

/// Common output of every weighting strategy.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StrategyOutput {
    /// Weights keyed by the return series' tickers, in series order.
    pub weights: Vec<AssetWeight>,
    /// Mean periodic return of the weighted portfolio.
    pub expected_return: Decimal,
    /// Periodic standard deviation of the weighted portfolio.
    pub portfolio_volatility: Decimal,
    /// False when the documented equal-weight fallback was used.
    pub converged: bool,
}

impl StrategyOutput {
    pub(crate) fn from_weights(series: &ReturnSeries, w: Vec<Decimal>, converged: bool) -> Self {
        let cov = series.covariance();
        let mu = series.mean_returns();
        let expected_return = linalg::dot(&w, &mu);
        let portfolio_volatility = linalg::portfolio_std(&w, &cov);
        StrategyOutput {
            weights: series
                .asset_names
                .iter()
                .cloned()
                .zip(w)
                .map(|(ticker, weight)| AssetWeight { ticker, weight })
                .collect(),
            expected_return,
            portfolio_volatility,
            converged,
        }
    }
}
