//! Aligned historical return series.
//!
//! Callers pre-align observations by index; the engine only checks that
//! every asset carries the same number of observations.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::PortfolioError;
use crate::optimization::linalg::sqrt_decimal;
use crate::PortfolioResult;

/// Periodic returns per asset, aligned by index.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReturnSeries {
    /// Asset identifiers.
    #[serde(alias = "assets")]
    pub asset_names: Vec<String>,
    /// One equal-length return vector per asset, same order as `asset_names`.
    pub returns: Vec<Vec<Decimal>>,
}

impl ReturnSeries {
    pub fn validate(&self) -> PortfolioResult<()> {
        let n = self.asset_names.len();
        if n == 0 {
            return Err(PortfolioError::InsufficientData(
                "At least one asset required".into(),
            ));
        }
        if self.returns.len() != n {
            return Err(PortfolioError::InvalidInput {
                field: "returns".into(),
                reason: format!(
                    "Expected {} return vectors (one per asset), got {}",
                    n,
                    self.returns.len()
                ),
            });
        }

        let obs = self.returns[0].len();
        if obs < 2 {
            return Err(PortfolioError::InsufficientData(
                "At least 2 return observations required per asset".into(),
            ));
        }
        for (i, r) in self.returns.iter().enumerate() {
            if r.len() != obs {
                return Err(PortfolioError::InvalidInput {
                    field: format!("returns[{}]", i),
                    reason: format!(
                        "Misaligned series: {} has {} observations, expected {}",
                        self.asset_names[i],
                        r.len(),
                        obs
                    ),
                });
            }
        }
        Ok(())
    }

    pub fn n_assets(&self) -> usize {
        self.asset_names.len()
    }

    pub fn n_observations(&self) -> usize {
        self.returns.first().map(|r| r.len()).unwrap_or(0)
    }

    /// Mean periodic return per asset.
    pub fn mean_returns(&self) -> Vec<Decimal> {
        self.returns
            .iter()
            .map(|r| {
                if r.is_empty() {
                    Decimal::ZERO
                } else {
                    r.iter().sum::<Decimal>() / Decimal::from(r.len() as i64)
                }
            })
            .collect()
    }

    /// Sample covariance matrix (n-1 denominator).
    pub fn covariance(&self) -> Vec<Vec<Decimal>> {
        let n = self.n_assets();
        let obs = self.n_observations();
        let means = self.mean_returns();
        let mut cov = vec![vec![Decimal::ZERO; n]; n];
        if obs < 2 {
            return cov;
        }
        let denom = Decimal::from((obs - 1) as i64);

        for i in 0..n {
            for j in i..n {
                let mut acc = Decimal::ZERO;
                for t in 0..obs {
                    acc += (self.returns[i][t] - means[i]) * (self.returns[j][t] - means[j]);
                }
                let c = acc / denom;
                cov[i][j] = c;
                cov[j][i] = c;
            }
        }
        cov
    }

    /// Correlation matrix derived from the sample covariance.
    /// Zero-variance assets get zero correlation with everything else.
    pub fn correlation(&self) -> Vec<Vec<Decimal>> {
        let cov = self.covariance();
        let n = cov.len();
        let vols: Vec<Decimal> = (0..n).map(|i| sqrt_decimal(cov[i][i])).collect();
        let mut corr = vec![vec![Decimal::ZERO; n]; n];
        for i in 0..n {
            for j in 0..n {
                if i == j {
                    corr[i][j] = Decimal::ONE;
                } else if !vols[i].is_zero() && !vols[j].is_zero() {
                    corr[i][j] = cov[i][j] / (vols[i] * vols[j]);
                }
            }
        }
        corr
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
