//! Dense matrix helpers shared by the weighting strategies.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;

/// Dot product.
pub(crate) fn dot(a: &[Decimal], b: &[Decimal]) -> Decimal {
    a.iter().zip(b.iter()).map(|(x, y)| *x * *y).sum()
}

/// Matrix-vector multiplication.
pub(crate) fn mat_vec_multiply(mat: &[Vec<Decimal>], v: &[Decimal]) -> Vec<Decimal> {
    mat.iter().map(|row| dot(row, v)).collect()
}

/// Portfolio standard deviation: sqrt(w' * Sigma * w).
pub(crate) fn portfolio_std(w: &[Decimal], sigma: &[Vec<Decimal>]) -> Decimal {
    let sigma_w = mat_vec_multiply(sigma, w);
    sqrt_decimal(dot(w, &sigma_w))
}

/// Equal weights for n assets.
pub(crate) fn equal_weights(n: usize) -> Vec<Decimal> {
    let w = Decimal::ONE / Decimal::from(n as i64);
    vec![w; n]
}

/// Normalize weights to sum to 1. No-op for an all-zero vector.
pub(crate) fn normalize_weights(w: &mut [Decimal]) {
    let total: Decimal = w.iter().sum();
    if !total.is_zero() {
        for wi in w.iter_mut() {
            *wi /= total;
        }
    }
}

/// Matrix inverse via Gauss-Jordan with partial pivoting.
/// Returns None for singular (or near-singular) matrices.
#[allow(clippy::needless_range_loop)]
pub(crate) fn mat_inverse(mat: &[Vec<Decimal>]) -> Option<Vec<Vec<Decimal>>> {
    let n = mat.len();
    if n == 0 {
        return Some(Vec::new());
    }

    let mut aug: Vec<Vec<Decimal>> = Vec::with_capacity(n);
    for i in 0..n {
        let mut row = Vec::with_capacity(2 * n);
        row.extend_from_slice(&mat[i]);
        for j in 0..n {
            row.push(if i == j { Decimal::ONE } else { Decimal::ZERO });
        }
        aug.push(row);
    }

    for col in 0..n {
        // Partial pivoting
        let mut max_row = col;
        let mut max_val = aug[col][col].abs();
        for row in (col + 1)..n {
            let val = aug[row][col].abs();
            if val > max_val {
                max_val = val;
                max_row = row;
            }
        }

        if max_val < dec!(0.000000000000001) {
            return None;
        }

        if max_row != col {
            aug.swap(col, max_row);
        }

        let pivot = aug[col][col];
        for cell in aug[col].iter_mut() {
            *cell /= pivot;
        }

        let pivot_row = aug[col].clone();
        for row in 0..n {
            if row == col {
                continue;
            }
            let factor = aug[row][col];
            for (cell, &pv) in aug[row].iter_mut().zip(pivot_row.iter()) {
                *cell -= factor * pv;
            }
        }
    }

    Some(aug.iter().map(|row| row[n..].to_vec()).collect())
}

/// Square root via Newton's method.
pub(crate) fn sqrt_decimal(val: Decimal) -> Decimal {
    if val <= Decimal::ZERO {
        return Decimal::ZERO;
    }
    if val == Decimal::ONE {
        return Decimal::ONE;
    }
    let two = dec!(2);
    let mut guess = val / two;
    if guess.is_zero() {
        guess = dec!(0.0000001);
    }
    for _ in 0..50 {
        if guess.is_zero() {
            return Decimal::ZERO;
        }
        let next = (guess + val / guess) / two;
        if (next - guess).abs() < dec!(0.0000000000001) {
            return next;
        }
        guess = next;
    }
    guess
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    // ------------------------------------------------------------------
    // 1. Dot product
    // ------------------------------------------------------------------
    #[test]
    fn test_dot() {
        let a = vec![dec!(1), dec!(2), dec!(3)];
        let b = vec![dec!(4), dec!(5), dec!(6)];
        assert_eq!(dot(&a, &b), dec!(32));
    }

    // ------------------------------------------------------------------
    // 2. Matrix inverse round-trips
    // ------------------------------------------------------------------
    #[test]
    fn test_mat_inverse() {
        let a = vec![vec![dec!(2), dec!(1)], vec![dec!(5), dec!(3)]];
        let inv = mat_inverse(&a).unwrap();
        // A * A^-1 = I
        for i in 0..2 {
            for j in 0..2 {
                let cell = dot(&a[i], &[inv[0][j], inv[1][j]]);
                let expected = if i == j { Decimal::ONE } else { Decimal::ZERO };
                assert!((cell - expected).abs() < dec!(0.0000001));
            }
        }
    }

    // ------------------------------------------------------------------
    // 3. Singular matrix returns None
    // ------------------------------------------------------------------
    #[test]
    fn test_singular_matrix() {
        let a = vec![vec![dec!(1), dec!(2)], vec![dec!(2), dec!(4)]];
        assert!(mat_inverse(&a).is_none());
    }

    // ------------------------------------------------------------------
    // 4. Newton sqrt
    // ------------------------------------------------------------------
    #[test]
    fn test_sqrt_decimal() {
        assert!((sqrt_decimal(dec!(4)) - dec!(2)).abs() < dec!(0.0000001));
        assert!((sqrt_decimal(dec!(0.0001)) - dec!(0.01)).abs() < dec!(0.0000001));
        assert_eq!(sqrt_decimal(Decimal::ZERO), Decimal::ZERO);
        assert_eq!(sqrt_decimal(dec!(-1)), Decimal::ZERO);
    }

    // ------------------------------------------------------------------
    // 5. Normalize
    // ------------------------------------------------------------------
    #[test]
    fn test_normalize() {
        let mut w = vec![dec!(2), dec!(3), dec!(5)];
        normalize_weights(&mut w);
        assert_eq!(w, vec![dec!(0.2), dec!(0.3), dec!(0.5)]);

        let mut zeros = vec![Decimal::ZERO; 3];
        normalize_weights(&mut zeros);
        assert_eq!(zeros, vec![Decimal::ZERO; 3]);
    }

    // ------------------------------------------------------------------
    // 6. Equal weights
    // ------------------------------------------------------------------
    #[test]
    fn test_equal_weights() {
        let w = equal_weights(4);
        assert_eq!(w, vec![dec!(0.25); 4]);
    }
}
