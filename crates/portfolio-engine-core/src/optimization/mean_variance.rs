//! Minimum-volatility portfolio in the Markowitz mean-variance framework.
//!
//! Minimizes sqrt(w' Sigma w) subject to sum(w) = 1 and 0 <= w_i <= cap.
//! The unconstrained analytical solution (Sigma^-1 * 1, normalized) is
//! tried first; when it violates the box constraints or Sigma is
//! singular, projected gradient descent from equal weights takes over.
//! Non-convergence falls back to equal weights and is flagged in the
//! output, never silently returned as an optimum.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::time::Instant;

use crate::error::PortfolioError;
use crate::optimization::linalg::{
    equal_weights, mat_inverse, mat_vec_multiply, normalize_weights,
};
use crate::optimization::series::ReturnSeries;
use crate::optimization::StrategyOutput;
use crate::types::{with_metadata, ComputationOutput, WEIGHT_SUM_TOLERANCE};
use crate::PortfolioResult;

const MAX_ITERATIONS: u32 = 500;
const STEP_TOLERANCE: Decimal = dec!(0.0000000001);

/// Input to minimum-volatility optimization.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MinVolInput {
    pub series: ReturnSeries,
    /// Optional per-asset upper bound on weight (default 1).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_weight: Option<Decimal>,
}

/// Compute the minimum-volatility portfolio.
pub fn optimize_min_volatility(
    input: &MinVolInput,
) -> PortfolioResult<ComputationOutput<StrategyOutput>> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();

    input.series.validate()?;
    let n = input.series.n_assets();
    let cap = input.max_weight.unwrap_or(Decimal::ONE);

    if cap <= Decimal::ZERO || cap > Decimal::ONE {
        return Err(PortfolioError::InvalidInput {
            field: "max_weight".into(),
            reason: format!("Must be in (0, 1], got {}", cap),
        });
    }
    if cap * Decimal::from(n as i64) < Decimal::ONE {
        return Err(PortfolioError::InvalidInput {
            field: "max_weight".into(),
            reason: format!(
                "Cap {} over {} assets cannot reach a weight sum of 1",
                cap, n
            ),
        });
    }

    let sigma = input.series.covariance();
    let max_diag = sigma
        .iter()
        .enumerate()
        .map(|(i, row)| row[i])
        .fold(Decimal::ZERO, |a, b| if b > a { b } else { a });

    let (weights, converged) = if max_diag.is_zero() {
        warnings.push(
            "All assets have zero sample variance; substituting equal weights".into(),
        );
        (equal_weights(n), false)
    } else {
        match solve(&sigma, n, cap, max_diag) {
            Some(w) => (w, true),
            None => {
                warnings.push(format!(
                    "Minimum-volatility optimizer did not converge within {} iterations; \
                     falling back to equal weights",
                    MAX_ITERATIONS
                ));
                (equal_weights(n), false)
            }
        }
    };

    for (i, w) in weights.iter().enumerate() {
        if *w > dec!(0.40) {
            warnings.push(format!(
                "Concentrated position: {} has weight {:.4}",
                input.series.asset_names[i], w
            ));
        }
    }

    let output = StrategyOutput::from_weights(&input.series, weights, converged);

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "Markowitz Minimum-Volatility Optimization",
        &serde_json::json!({
            "n_assets": n,
            "n_observations": input.series.n_observations(),
            "max_weight": cap.to_string(),
            "long_only": true,
        }),
        warnings,
        elapsed,
        output,
    ))
}

/// Analytical solution when feasible, projected gradient descent otherwise.
/// Returns None when the iterate ends up outside the constraint set.
fn solve(sigma: &[Vec<Decimal>], n: usize, cap: Decimal, max_diag: Decimal) -> Option<Vec<Decimal>> {
    // Unconstrained minimum variance: w* = Sigma^-1 * 1 / (1' * Sigma^-1 * 1)
    if let Some(sigma_inv) = mat_inverse(sigma) {
        let ones = vec![Decimal::ONE; n];
        let mut w = mat_vec_multiply(&sigma_inv, &ones);
        normalize_weights(&mut w);
        if is_feasible(&w, cap) {
            return Some(w);
        }
    }

    // Projected gradient descent on w' Sigma w, gradient = 2 * Sigma * w.
    // Step is scaled by the largest variance so the update magnitude is
    // stable across daily and annual return scales.
    let mut w = equal_weights(n);
    let step = dec!(0.05) / max_diag;

    for _ in 0..MAX_ITERATIONS {
        let sigma_w = mat_vec_multiply(sigma, &w);
        let mut w_new: Vec<Decimal> = (0..n)
            .map(|i| w[i] - step * dec!(2) * sigma_w[i])
            .collect();
        project_box_simplex(&mut w_new, cap);

        let delta = w
            .iter()
            .zip(w_new.iter())
            .map(|(a, b)| (*a - *b).abs())
            .fold(Decimal::ZERO, |acc, d| if d > acc { d } else { acc });
        w = w_new;
        if delta < STEP_TOLERANCE {
            break;
        }
    }

    if is_feasible(&w, cap) {
        Some(w)
    } else {
        None
    }
}

fn is_feasible(w: &[Decimal], cap: Decimal) -> bool {
    let sum: Decimal = w.iter().sum();
    if (sum - Decimal::ONE).abs() > WEIGHT_SUM_TOLERANCE {
        return false;
    }
    w.iter()
        .all(|wi| *wi >= -WEIGHT_SUM_TOLERANCE && *wi <= cap + WEIGHT_SUM_TOLERANCE)
}

/// Euclidean projection onto { w : sum(w) = 1, 0 <= w_i <= cap }:
/// w_i = clamp(v_i - lambda, 0, cap), with lambda found by bisection on
/// the monotone non-increasing map lambda -> sum(clamp(v_i - lambda)).
/// Requires cap * n >= 1, validated upstream.
fn project_box_simplex(w: &mut [Decimal], cap: Decimal) {
    if w.is_empty() {
        return;
    }
    let clamp = |x: Decimal| {
        if x < Decimal::ZERO {
            Decimal::ZERO
        } else if x > cap {
            cap
        } else {
            x
        }
    };
    let sum_at = |v: &[Decimal], lambda: Decimal| -> Decimal {
        v.iter().map(|vi| clamp(*vi - lambda)).sum()
    };

    let min_v = w
        .iter()
        .copied()
        .fold(Decimal::MAX, |a, b| if b < a { b } else { a });
    let max_v = w
        .iter()
        .copied()
        .fold(Decimal::MIN, |a, b| if b > a { b } else { a });

    // sum_at(lo) = n * cap >= 1; sum_at(hi) = 0.
    let mut lo = min_v - cap - Decimal::ONE;
    let mut hi = max_v;
    for _ in 0..100 {
        let mid = (lo + hi) / dec!(2);
        if sum_at(w, mid) >= Decimal::ONE {
            lo = mid;
        } else {
            hi = mid;
        }
        if hi - lo < dec!(0.000000000001) {
            break;
        }
    }

    let lambda = (lo + hi) / dec!(2);
    for wi in w.iter_mut() {
        *wi = clamp(*wi - lambda);
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
