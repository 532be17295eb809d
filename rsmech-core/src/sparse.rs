//! Banded sparse system used by the fixed-step diffusion solve.

use crate::constants::FloatValue;
use crate::errors::{MechanismError, MechanismResult};

/// Pivots with a magnitude below this are treated as zero.
const PIVOT_TOLERANCE: FloatValue = 1e-300;

/// Tridiagonal system $A x = d$ solved with the Thomas algorithm
///
/// The matrix has the form:
/// ```text
/// | diag[0]  upper[0]    0        ...      0      |
/// | lower[1] diag[1]   upper[1]   ...      0      |
/// |   ...      ...       ...      ...     ...     |
/// |   0        ...     lower[n-1]      diag[n-1]  |
/// ```
/// `lower[0]` and `upper[n-1]` are unused.
///
/// A one-state pool is the degenerate `n = 1` case. Chained pools reuse the
/// same assembly and solve.
#[derive(Debug, Clone, PartialEq)]
pub struct TridiagonalSystem {
    lower: Vec<FloatValue>,
    diag: Vec<FloatValue>,
    upper: Vec<FloatValue>,
    rhs: Vec<FloatValue>,
}

impl TridiagonalSystem {
    /// An all-zero system with `n` unknowns
    pub fn new(n: usize) -> Self {
        Self {
            lower: vec![0.0; n],
            diag: vec![0.0; n],
            upper: vec![0.0; n],
            rhs: vec![0.0; n],
        }
    }

    pub fn len(&self) -> usize {
        self.diag.len()
    }

    pub fn is_empty(&self) -> bool {
        self.diag.is_empty()
    }

    /// Zero every coefficient while keeping the size
    pub fn clear(&mut self) {
        for values in [&mut self.lower, &mut self.diag, &mut self.upper, &mut self.rhs] {
            values.iter_mut().for_each(|x| *x = 0.0);
        }
    }

    pub fn add_diagonal(&mut self, row: usize, value: FloatValue) {
        self.diag[row] += value;
    }

    pub fn add_rhs(&mut self, row: usize, value: FloatValue) {
        self.rhs[row] += value;
    }

    /// Symmetric exchange between neighbouring rows with strength `coupling`
    ///
    /// Adds `coupling` to both diagonals and `-coupling` to both off-diagonals.
    pub fn add_coupling(&mut self, row: usize, coupling: FloatValue) {
        let next = row + 1;
        self.diag[row] += coupling;
        self.diag[next] += coupling;
        self.upper[row] -= coupling;
        self.lower[next] -= coupling;
    }

    /// Solve the system, leaving the coefficients untouched
    pub fn solve(&self) -> MechanismResult<Vec<FloatValue>> {
        let n = self.len();
        if n == 0 {
            return Ok(vec![]);
        }

        let mut c_prime = vec![0.0; n];
        let mut d_prime = vec![0.0; n];

        // Forward sweep
        if self.diag[0].abs() < PIVOT_TOLERANCE {
            return Err(MechanismError::SingularMatrix { row: 0 });
        }
        c_prime[0] = self.upper[0] / self.diag[0];
        d_prime[0] = self.rhs[0] / self.diag[0];

        for i in 1..n {
            let denom = self.diag[i] - self.lower[i] * c_prime[i - 1];
            if denom.abs() < PIVOT_TOLERANCE || !denom.is_finite() {
                return Err(MechanismError::SingularMatrix { row: i });
            }
            if i < n - 1 {
                c_prime[i] = self.upper[i] / denom;
            }
            d_prime[i] = (self.rhs[i] - self.lower[i] * d_prime[i - 1]) / denom;
        }

        // Back substitution
        let mut x = d_prime;
        for i in (0..n - 1).rev() {
            x[i] -= c_prime[i] * x[i + 1];
        }
        Ok(x)
    }
}
