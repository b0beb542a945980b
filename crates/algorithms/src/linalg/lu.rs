//! LU decomposition for covariance matrices
//!
//! Doolittle-style outer-product elimination without pivoting. Inputs are
//! covariance or correlation matrices, whose largest magnitude in each row
//! sits on the diagonal, so no row or column swaps are done. A pivot that
//! is numerically zero is replaced by a small epsilon derived from the
//! smallest diagonal entry, which keeps the factors finite for singular
//! inputs at the cost of accuracy.

use ndarray::{Array2, ArrayView2};

/// Tolerance below which a value counts as zero
pub const ZERO_TOLERANCE: f64 = f64::EPSILON;

/// Fraction of the smallest diagonal entry used as the replacement pivot
const EPSILON_SCALE: f64 = 0.01;

/// L and U factors packed in one square matrix.
///
/// Entries below the diagonal hold L (unit diagonal implied); the diagonal
/// and everything above it hold U.
#[derive(Debug, Clone, PartialEq)]
pub struct LuMatrix {
    lu: Array2<f64>,
}

/// Decompose a square matrix into packed LU factors.
///
/// # Panics
/// Panics if `matrix` is not square.
pub fn compute_lu(matrix: ArrayView2<'_, f64>) -> LuMatrix {
    let (n, m) = matrix.dim();
    assert_eq!(n, m, "LU decomposition needs a square matrix");

    let mut lu = matrix.to_owned();

    let mut min_diag = (0..n).map(|i| lu[(i, i)]).fold(f64::INFINITY, f64::min);
    if n == 0 || min_diag.abs() < ZERO_TOLERANCE {
        min_diag = 0.01;
    }
    let epsilon = min_diag * EPSILON_SCALE;

    for i in 0..n {
        if lu[(i, i)].abs() < ZERO_TOLERANCE {
            lu[(i, i)] = epsilon;
        }
        let pivot = lu[(i, i)];
        for j in (i + 1)..n {
            let factor = lu[(j, i)] / pivot;
            lu[(j, i)] = factor;
            for k in (i + 1)..n {
                lu[(j, k)] -= lu[(i, k)] * factor;
            }
        }
    }

    LuMatrix { lu }
}

impl LuMatrix {
    /// Matrix dimension
    pub fn size(&self) -> usize {
        self.lu.nrows()
    }

    /// Packed factors
    pub fn packed(&self) -> &Array2<f64> {
        &self.lu
    }

    /// Unit lower-triangular factor
    pub fn lower(&self) -> Array2<f64> {
        let n = self.size();
        Array2::from_shape_fn((n, n), |(i, j)| match i.cmp(&j) {
            std::cmp::Ordering::Greater => self.lu[(i, j)],
            std::cmp::Ordering::Equal => 1.0,
            std::cmp::Ordering::Less => 0.0,
        })
    }

    /// Upper-triangular factor
    pub fn upper(&self) -> Array2<f64> {
        let n = self.size();
        Array2::from_shape_fn((n, n), |(i, j)| if j >= i { self.lu[(i, j)] } else { 0.0 })
    }

    /// Determinant of the decomposed matrix (product of the U diagonal)
    pub fn determinant(&self) -> f64 {
        self.lu.diag().iter().product()
    }

    /// Solve `L y = b` in place
    pub fn forward_substitute(&self, b: &mut [f64]) {
        let n = self.size();
        for i in 0..n {
            let mut sum = b[i];
            for k in 0..i {
                sum -= self.lu[(i, k)] * b[k];
            }
            b[i] = sum;
        }
    }

    /// Solve `U x = y` in place
    pub fn back_substitute(&self, y: &mut [f64]) {
        let n = self.size();
        for i in (0..n).rev() {
            let mut sum = y[i];
            for k in (i + 1)..n {
                sum -= self.lu[(i, k)] * y[k];
            }
            y[i] = sum / self.lu[(i, i)];
        }
    }

    /// Solve `A x = b` in place
    pub fn solve(&self, b: &mut [f64]) {
        self.forward_substitute(b);
        self.back_substitute(b);
    }

    /// Quadratic form `dᵗ A⁻¹ d` computed by substitution.
    ///
    /// For a covariance matrix this is the squared Mahalanobis distance of
    /// the difference vector `diff`. `scratch` must have the matrix size.
    pub fn quadratic_form(&self, diff: &[f64], scratch: &mut [f64]) -> f64 {
        scratch.copy_from_slice(diff);
        self.solve(scratch);
        scratch.iter().zip(diff).map(|(u, d)| u * d).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use ndarray::array;

    fn assert_matrix_eq(a: &Array2<f64>, b: &Array2<f64>, eps: f64) {
        assert_eq!(a.dim(), b.dim());
        for (x, y) in a.iter().zip(b.iter()) {
            assert_relative_eq!(*x, *y, epsilon = eps);
        }
    }

    #[test]
    fn test_reconstructs_spd_matrix() {
        let a = array![
            [4.0, 2.0, 0.6],
            [2.0, 5.0, 1.0],
            [0.6, 1.0, 3.0],
        ];
        let lu = compute_lu(a.view());
        let product = lu.lower().dot(&lu.upper());
        assert_matrix_eq(&product, &a, 1e-12);
    }

    #[test]
    fn test_known_factors() {
        let a = array![[4.0, 2.0], [2.0, 3.0]];
        let lu = compute_lu(a.view());
        assert_matrix_eq(lu.packed(), &array![[4.0, 2.0], [0.5, 2.0]], 1e-15);
        assert_relative_eq!(lu.determinant(), 8.0, epsilon = 1e-12);
    }

    #[test]
    fn test_zero_diagonal_is_regularized() {
        // min diagonal is 0, so the replacement pivot is 0.01 * 0.01
        let a = array![[4.0, 0.0], [0.0, 0.0]];
        let lu = compute_lu(a.view());
        assert!(lu.packed().iter().all(|v| v.is_finite()));
        assert_relative_eq!(lu.packed()[(1, 1)], 1e-4, epsilon = 1e-18);
    }

    #[test]
    fn test_pivot_cancelled_by_elimination() {
        // second pivot becomes 0 after elimination; epsilon = 0.01 * min(1, 1)
        let a = array![[1.0, 1.0], [1.0, 1.0]];
        let lu = compute_lu(a.view());
        assert!(lu.packed().iter().all(|v| v.is_finite()));
        assert_relative_eq!(lu.packed()[(1, 1)], 0.01, epsilon = 1e-15);

        let mut b = vec![1.0, 2.0];
        lu.solve(&mut b);
        assert!(b.iter().all(|v| v.is_finite()));
    }

    #[test]
    fn test_solve_and_quadratic_form() {
        let a = array![[2.0, 1.0], [1.0, 3.0]];
        let lu = compute_lu(a.view());

        let mut x = vec![3.0, 5.0];
        lu.solve(&mut x);
        // A x = [3, 5] -> x = [0.8, 1.4]
        assert_relative_eq!(x[0], 0.8, epsilon = 1e-12);
        assert_relative_eq!(x[1], 1.4, epsilon = 1e-12);

        let mut scratch = vec![0.0; 2];
        let q = lu.quadratic_form(&[3.0, 5.0], &mut scratch);
        assert_relative_eq!(q, 3.0 * 0.8 + 5.0 * 1.4, epsilon = 1e-12);
    }

    #[test]
    fn test_identity_quadratic_form_is_squared_norm() {
        let lu = compute_lu(Array2::<f64>::eye(3).view());
        let mut scratch = vec![0.0; 3];
        assert_relative_eq!(lu.quadratic_form(&[1.0, 2.0, 2.0], &mut scratch), 9.0);
    }
}
