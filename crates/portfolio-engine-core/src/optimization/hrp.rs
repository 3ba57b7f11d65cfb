//! Hierarchical Risk Parity (Lopez de Prado).
//!
//! Correlation distance d_ij = sqrt(0.5 * (1 - corr_ij)), single-linkage
//! hierarchical clustering, quasi-diagonal seriation of the covariance
//! matrix, then recursive bisection allocating capital in inverse
//! proportion to each half's cluster variance. No covariance inversion
//! anywhere, which keeps the method stable under near-singular inputs.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::Serialize;
use std::time::Instant;

use crate::optimization::linalg::{dot, equal_weights, normalize_weights, sqrt_decimal};
use crate::optimization::series::ReturnSeries;
use crate::optimization::StrategyOutput;
use crate::types::{with_metadata, ComputationOutput};
use crate::PortfolioResult;

#[derive(Serialize)]
struct Assumptions {
    n_assets: usize,
    n_observations: usize,
    linkage: &'static str,
}

/// Compute Hierarchical Risk Parity weights for a return series.
pub fn optimize_hrp(series: &ReturnSeries) -> PortfolioResult<ComputationOutput<StrategyOutput>> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();

    series.validate()?;
    let n = series.n_assets();
    let mut converged = true;

    let weights = if n == 1 {
        vec![Decimal::ONE]
    } else {
        let cov = series.covariance();
        let corr = series.correlation();

        let mut dist = vec![vec![Decimal::ZERO; n]; n];
        for i in 0..n {
            for j in 0..n {
                let gap = Decimal::ONE - corr[i][j];
                let half = if gap > Decimal::ZERO {
                    gap / dec!(2)
                } else {
                    Decimal::ZERO
                };
                dist[i][j] = sqrt_decimal(half);
            }
        }

        let order = seriate(&dist);

        let mut w = vec![Decimal::ONE; n];
        bisect(&order, &cov, &mut w);

        let total: Decimal = w.iter().sum();
        if total.is_zero() {
            warnings.push(
                "Degenerate covariance produced zero cluster weights; substituting equal weights"
                    .into(),
            );
            w = equal_weights(n);
            converged = false;
        } else {
            normalize_weights(&mut w);
        }
        w
    };

    let output = StrategyOutput::from_weights(series, weights, converged);

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "Hierarchical Risk Parity",
        &Assumptions {
            n_assets: n,
            n_observations: series.n_observations(),
            linkage: "single",
        },
        warnings,
        elapsed,
        output,
    ))
}

/// Single-linkage agglomerative clustering over the distance matrix,
/// returning the leaf order of the dendrogram (quasi-diagonalization).
fn seriate(dist: &[Vec<Decimal>]) -> Vec<usize> {
    let n = dist.len();
    if n <= 1 {
        return (0..n).collect();
    }

    let mut left_child: Vec<usize> = Vec::with_capacity(n - 1);
    let mut right_child: Vec<usize> = Vec::with_capacity(n - 1);
    let mut active = vec![true; n];
    let mut d = dist.to_vec();
    // Slot i holds the id of the cluster currently stored there; merged
    // clusters get ids n, n+1, ... as in a scipy linkage matrix.
    let mut node_id: Vec<usize> = (0..n).collect();

    for step in 0..(n - 1) {
        let mut min_d = Decimal::MAX;
        let mut mi = 0;
        let mut mj = 0;

        for i in 0..n {
            if !active[i] {
                continue;
            }
            for j in (i + 1)..n {
                if !active[j] {
                    continue;
                }
                if d[i][j] < min_d {
                    min_d = d[i][j];
                    mi = i;
                    mj = j;
                }
            }
        }

        left_child.push(node_id[mi]);
        right_child.push(node_id[mj]);
        node_id[mi] = n + step;
        active[mj] = false;

        // Single linkage: distance to the merged cluster is the minimum
        // of the distances to its members.
        for k in 0..n {
            if !active[k] || k == mi {
                continue;
            }
            let merged = if d[mi][k] < d[mj][k] { d[mi][k] } else { d[mj][k] };
            d[mi][k] = merged;
            d[k][mi] = merged;
        }
    }

    fn collect_leaves(
        node: usize,
        n: usize,
        left: &[usize],
        right: &[usize],
        out: &mut Vec<usize>,
    ) {
        if node < n {
            out.push(node);
        } else {
            let idx = node - n;
            collect_leaves(left[idx], n, left, right, out);
            collect_leaves(right[idx], n, left, right, out);
        }
    }

    let root = 2 * n - 2;
    let mut order = Vec::with_capacity(n);
    collect_leaves(root, n, &left_child, &right_child, &mut order);
    order
}

/// Recursive bisection of the seriated asset list. Each half receives
/// capital in inverse proportion to its cluster variance.
fn bisect(order: &[usize], cov: &[Vec<Decimal>], weights: &mut [Decimal]) {
    if order.len() <= 1 {
        return;
    }

    let mid = order.len() / 2;
    let left = &order[..mid];
    let right = &order[mid..];

    let var_left = cluster_variance(left, cov);
    let var_right = cluster_variance(right, cov);

    let denom = var_left + var_right;
    let alpha = if denom > Decimal::ZERO {
        Decimal::ONE - var_left / denom
    } else {
        dec!(0.5)
    };

    for &i in left {
        weights[i] *= alpha;
    }
    for &i in right {
        weights[i] *= Decimal::ONE - alpha;
    }

    bisect(left, cov, weights);
    bisect(right, cov, weights);
}

/// Variance of a cluster under its internal inverse-variance allocation:
/// w = diag(Sigma)^-1 normalized, variance = w' Sigma_sub w.
fn cluster_variance(indices: &[usize], cov: &[Vec<Decimal>]) -> Decimal {
    match indices.len() {
        0 => return Decimal::ZERO,
        1 => return cov[indices[0]][indices[0]],
        _ => {}
    }

    let inv_vars: Vec<Decimal> = indices
        .iter()
        .map(|&i| {
            let v = cov[i][i];
            if v > Decimal::ZERO {
                Decimal::ONE / v
            } else {
                Decimal::ZERO
            }
        })
        .collect();

    let total: Decimal = inv_vars.iter().copied().sum();
    if total.is_zero() {
        return Decimal::ZERO;
    }
    let w: Vec<Decimal> = inv_vars.iter().map(|iv| *iv / total).collect();

    let mut var = Decimal::ZERO;
    for (a, &i) in indices.iter().enumerate() {
        let row: Vec<Decimal> = indices.iter().map(|&j| cov[i][j]).collect();
        var += w[a] * dot(&row, &w);
    }
    var
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn series(names: &[&str], rows: Vec<Vec<Decimal>>) -> ReturnSeries {
        ReturnSeries {
            asset_names: names.iter().map(|s| s.to_string()).collect(),
            returns: rows,
        }
    }

    /// Two tightly correlated noisy assets plus one quiet diversifier.
    fn clustered_series() -> ReturnSeries {
        series(
            &["N1", "N2", "QUIET"],
            vec![
                vec![
                    dec!(0.05),
                    dec!(-0.04),
                    dec!(0.06),
                    dec!(-0.05),
                    dec!(0.04),
                    dec!(-0.05),
                ],
                vec![
                    dec!(0.04),
                    dec!(-0.05),
                    dec!(0.05),
                    dec!(-0.04),
                    dec!(0.05),
                    dec!(-0.04),
                ],
                vec![
                    dec!(0.01),
                    dec!(0.01),
                    dec!(-0.01),
                    dec!(0.01),
                    dec!(-0.01),
                    dec!(0.00),
                ],
            ],
        )
    }

    // ------------------------------------------------------------------
    // 1. Weight contract: [0,1], sum to 1, series key order
    // ------------------------------------------------------------------
    #[test]
    fn test_weight_contract() {
        let out = optimize_hrp(&clustered_series()).unwrap();
        let res = &out.result;

        assert_eq!(res.weights.len(), 3);
        assert_eq!(res.weights[0].ticker, "N1");
        let sum: Decimal = res.weights.iter().map(|w| w.weight).sum();
        assert!((sum - Decimal::ONE).abs() < dec!(0.000001));
        for w in &res.weights {
            assert!(w.weight >= Decimal::ZERO && w.weight <= Decimal::ONE);
        }
        assert!(res.converged);
    }

    // ------------------------------------------------------------------
    // 2. The diversifier outweighs each member of the noisy cluster
    // ------------------------------------------------------------------
    #[test]
    fn test_diversifier_weight() {
        let out = optimize_hrp(&clustered_series()).unwrap();
        let w = &out.result.weights;
        assert!(
            w[2].weight > w[0].weight && w[2].weight > w[1].weight,
            "Quiet diversifier should dominate: {:?}",
            w
        );
    }

    // ------------------------------------------------------------------
    // 3. Not the equal-weight placeholder
    // ------------------------------------------------------------------
    #[test]
    fn test_not_equal_weight_placeholder() {
        let out = optimize_hrp(&clustered_series()).unwrap();
        let third = Decimal::ONE / dec!(3);
        let deviates = out
            .result
            .weights
            .iter()
            .any(|w| (w.weight - third).abs() > dec!(0.05));
        assert!(deviates, "HRP must not degenerate to equal weights");
    }

    // ------------------------------------------------------------------
    // 4. Seriation groups the correlated pair adjacently
    // ------------------------------------------------------------------
    #[test]
    fn test_seriation_groups_cluster() {
        let s = clustered_series();
        let corr = s.correlation();
        let n = 3;
        let mut dist = vec![vec![Decimal::ZERO; n]; n];
        for i in 0..n {
            for j in 0..n {
                let gap = Decimal::ONE - corr[i][j];
                dist[i][j] = sqrt_decimal(if gap > Decimal::ZERO {
                    gap / dec!(2)
                } else {
                    Decimal::ZERO
                });
            }
        }
        let order = seriate(&dist);
        let pos_n1 = order.iter().position(|&i| i == 0).unwrap();
        let pos_n2 = order.iter().position(|&i| i == 1).unwrap();
        assert_eq!(
            (pos_n1 as i64 - pos_n2 as i64).abs(),
            1,
            "Correlated pair should be adjacent in {:?}",
            order
        );
    }

    // ------------------------------------------------------------------
    // 5. Single asset gets weight one
    // ------------------------------------------------------------------
    #[test]
    fn test_single_asset() {
        let s = series(&["ONLY"], vec![vec![dec!(0.01), dec!(-0.02), dec!(0.01)]]);
        let out = optimize_hrp(&s).unwrap();
        assert_eq!(out.result.weights[0].weight, Decimal::ONE);
    }

    // ------------------------------------------------------------------
    // 6. Two identical assets split evenly
    // ------------------------------------------------------------------
    #[test]
    fn test_identical_pair_splits_evenly() {
        let r = vec![dec!(0.02), dec!(-0.01), dec!(0.03), dec!(-0.02)];
        let s = series(&["A", "B"], vec![r.clone(), r]);
        let out = optimize_hrp(&s).unwrap();
        let w = &out.result.weights;
        assert!((w[0].weight - dec!(0.5)).abs() < dec!(0.0001));
        assert!((w[1].weight - dec!(0.5)).abs() < dec!(0.0001));
    }

    // ------------------------------------------------------------------
    // 7. Misaligned series rejected
    // ------------------------------------------------------------------
    #[test]
    fn test_misaligned_rejected() {
        let s = series(
            &["A", "B"],
            vec![vec![dec!(0.01), dec!(0.02)], vec![dec!(0.01)]],
        );
        assert!(optimize_hrp(&s).is_err());
    }

    // ------------------------------------------------------------------
    // 8. Cluster variance of a singleton is its own variance
    // ------------------------------------------------------------------
    #[test]
    fn test_cluster_variance_singleton() {
        let cov = vec![vec![dec!(0.04), dec!(0.01)], vec![dec!(0.01), dec!(0.09)]];
        assert_eq!(cluster_variance(&[0], &cov), dec!(0.04));
        assert_eq!(cluster_variance(&[1], &cov), dec!(0.09));
    }

    // ------------------------------------------------------------------
    // 9. Four-asset seriation covers every index exactly once
    // ------------------------------------------------------------------
    #[test]
    fn test_seriation_permutation() {
        let n = 4;
        let mut dist = vec![vec![Decimal::ZERO; n]; n];
        let values = [
            (0usize, 1usize, dec!(0.1)),
            (0, 2, dec!(0.6)),
            (0, 3, dec!(0.7)),
            (1, 2, dec!(0.5)),
            (1, 3, dec!(0.65)),
            (2, 3, dec!(0.2)),
        ];
        for (i, j, v) in values {
            dist[i][j] = v;
            dist[j][i] = v;
        }
        let mut order = seriate(&dist);
        assert_eq!(order.len(), 4);
        order.sort_unstable();
        assert_eq!(order, vec![0, 1, 2, 3]);
    }
}
