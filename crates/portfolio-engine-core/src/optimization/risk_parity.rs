//! Risk-parity weighting: every asset contributes equally to total
//! portfolio risk.
//!
//! Uses the multiplicative iteration w_i <- w_i * sqrt(target / rc_i)
//! where rc_i = w_i * (Sigma w)_i is the variance contribution and the
//! target is total variance / n. Iterations are capped; failure to
//! equalize contributions within the cap falls back to equal weights
//! with an explicit warning.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::Serialize;
use std::time::Instant;

use crate::optimization::linalg::{
    equal_weights, mat_vec_multiply, normalize_weights, sqrt_decimal,
};
use crate::optimization::series::ReturnSeries;
use crate::optimization::StrategyOutput;
use crate::types::{with_metadata, ComputationOutput};
use crate::PortfolioResult;

const MAX_ITERATIONS: u32 = 500;
/// Relative dispersion of risk contributions below which the search stops.
const CONTRIBUTION_TOLERANCE: Decimal = dec!(0.0000001);

#[derive(Serialize)]
struct Assumptions {
    n_assets: usize,
    n_observations: usize,
    max_iterations: u32,
}

/// Compute risk-parity weights for a return series.
pub fn optimize_risk_parity(
    series: &ReturnSeries,
) -> PortfolioResult<ComputationOutput<StrategyOutput>> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();

    series.validate()?;
    let n = series.n_assets();
    let sigma = series.covariance();

    let degenerate = (0..n).any(|i| sigma[i][i] <= Decimal::ZERO);
    let (weights, converged) = if degenerate {
        warnings.push(
            "At least one asset has zero sample variance; risk contributions cannot be \
             equalized, substituting equal weights"
                .into(),
        );
        (equal_weights(n), false)
    } else {
        match equalize_contributions(&sigma, n) {
            Some(w) => (w, true),
            None => {
                warnings.push(format!(
                    "Risk-parity search did not converge within {} iterations; \
                     falling back to equal weights",
                    MAX_ITERATIONS
                ));
                (equal_weights(n), false)
            }
        }
    };

    let output = StrategyOutput::from_weights(series, weights, converged);

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "Risk Parity (equal risk contribution)",
        &Assumptions {
            n_assets: n,
            n_observations: series.n_observations(),
            max_iterations: MAX_ITERATIONS,
        },
        warnings,
        elapsed,
        output,
    ))
}

/// Variance contribution of each asset: w_i * (Sigma w)_i.
pub(crate) fn variance_contributions(w: &[Decimal], sigma: &[Vec<Decimal>]) -> Vec<Decimal> {
    let sigma_w = mat_vec_multiply(sigma, w);
    w.iter().zip(sigma_w.iter()).map(|(wi, si)| *wi * *si).collect()
}

fn equalize_contributions(sigma: &[Vec<Decimal>], n: usize) -> Option<Vec<Decimal>> {
    // Inverse-volatility start: exact for a diagonal covariance, a good
    // neighborhood for everything else.
    let mut w: Vec<Decimal> = (0..n)
        .map(|i| {
            let vol = sqrt_decimal(sigma[i][i]);
            if vol.is_zero() {
                Decimal::ONE
            } else {
                Decimal::ONE / vol
            }
        })
        .collect();
    normalize_weights(&mut w);

    let n_dec = Decimal::from(n as i64);

    for _ in 0..MAX_ITERATIONS {
        let rc = variance_contributions(&w, sigma);
        let total_var: Decimal = rc.iter().copied().sum();
        if total_var <= Decimal::ZERO {
            return None;
        }
        let target = total_var / n_dec;

        let dispersion = rc
            .iter()
            .map(|c| (*c - target).abs())
            .fold(Decimal::ZERO, |a, d| if d > a { d } else { a })
            / total_var;
        if dispersion < CONTRIBUTION_TOLERANCE {
            return Some(w);
        }

        for i in 0..n {
            // Negative contributions come from strong negative covariance;
            // clamp so the multiplicative update stays defined.
            let c = if rc[i] > Decimal::ZERO {
                rc[i]
            } else {
                target / dec!(100)
            };
            w[i] *= sqrt_decimal(target / c);
        }
        normalize_weights(&mut w);
    }

    // Accept the final iterate only if contributions are genuinely close.
    let rc = variance_contributions(&w, sigma);
    let total_var: Decimal = rc.iter().copied().sum();
    if total_var <= Decimal::ZERO {
        return None;
    }
    let target = total_var / n_dec;
    let dispersion = rc
        .iter()
        .map(|c| (*c - target).abs())
        .fold(Decimal::ZERO, |a, d| if d > a { d } else { a })
        / total_var;
    if dispersion < dec!(0.0001) {
        Some(w)
    } else {
        None
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
