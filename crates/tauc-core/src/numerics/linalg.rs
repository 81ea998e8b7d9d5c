use faer::Mat;

pub type DenseMatrix = Mat<f64>;

const SINGULAR_PIVOT_EPSILON: f64 = 1.0e-14;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LuError {
    #[error("LU factorization requires a square matrix, got {rows}x{cols}")]
    NonSquareMatrix { rows: usize, cols: usize },
    #[error("LU factorization requires a non-empty matrix")]
    EmptyMatrix,
    #[error("matrix is singular at pivot index {pivot_index}")]
    SingularMatrix { pivot_index: usize },
    #[error("right-hand side length mismatch: expected {expected}, got {actual}")]
    RhsLengthMismatch { expected: usize, actual: usize },
}

/// Partial-pivoting LU factors of a small dense system, packed in one matrix.
#[derive(Debug, Clone)]
pub struct LuDecomposition {
    lu: DenseMatrix,
    pivots: Vec<usize>,
}

impl LuDecomposition {
    pub fn dimension(&self) -> usize {
        self.lu.nrows()
    }

    pub fn solve(&self, rhs: &[f64]) -> Result<Vec<f64>, LuError> {
        let dimension = self.dimension();
        if rhs.len() != dimension {
            return Err(LuError::RhsLengthMismatch {
                expected: dimension,
                actual: rhs.len(),
            });
        }

        let mut forward = vec![0.0; dimension];
        for row in 0..dimension {
            let mut value = rhs[self.pivots[row]];
            for col in 0..row {
                value -= self.lu[(row, col)] * forward[col];
            }
            forward[row] = value;
        }

        let mut solution = vec![0.0; dimension];
        for row in (0..dimension).rev() {
            let mut value = forward[row];
            for col in (row + 1)..dimension {
                value -= self.lu[(row, col)] * solution[col];
            }
            solution[row] = value / self.lu[(row, row)];
        }

        Ok(solution)
    }
}

pub fn lu_factorize(matrix: &DenseMatrix) -> Result<LuDecomposition, LuError> {
    let rows = matrix.nrows();
    let cols = matrix.ncols();
    if rows == 0 || cols == 0 {
        return Err(LuError::EmptyMatrix);
    }
    if rows != cols {
        return Err(LuError::NonSquareMatrix { rows, cols });
    }

    let dimension = rows;
    let scale = matrix_max_abs(matrix).max(f64::MIN_POSITIVE);
    let mut lu = matrix.clone();
    let mut pivots: Vec<usize> = (0..dimension).collect();

    for pivot_col in 0..dimension {
        let mut pivot_row = pivot_col;
        for row in (pivot_col + 1)..dimension {
            if lu[(row, pivot_col)].abs() > lu[(pivot_row, pivot_col)].abs() {
                pivot_row = row;
            }
        }

        if lu[(pivot_row, pivot_col)].abs() <= SINGULAR_PIVOT_EPSILON * scale {
            return Err(LuError::SingularMatrix {
                pivot_index: pivot_col,
            });
        }

        if pivot_row != pivot_col {
            for col in 0..dimension {
                let upper = lu[(pivot_col, col)];
                lu[(pivot_col, col)] = lu[(pivot_row, col)];
                lu[(pivot_row, col)] = upper;
            }
            pivots.swap(pivot_col, pivot_row);
        }

        let pivot = lu[(pivot_col, pivot_col)];
        for row in (pivot_col + 1)..dimension {
            lu[(row, pivot_col)] /= pivot;
            let multiplier = lu[(row, pivot_col)];
            for col in (pivot_col + 1)..dimension {
                let updated = lu[(row, col)] - multiplier * lu[(pivot_col, col)];
                lu[(row, col)] = updated;
            }
        }
    }

    Ok(LuDecomposition { lu, pivots })
}

pub fn lu_solve(matrix: &DenseMatrix, rhs: &[f64]) -> Result<Vec<f64>, LuError> {
    lu_factorize(matrix)?.solve(rhs)
}

/// Least-squares polynomial coefficients (lowest power first) of degree `order`
/// through `(abscissa, values)`, from the normal equations.
pub fn polynomial_least_squares(
    abscissa: &[f64],
    values: &[f64],
    order: usize,
) -> Result<Vec<f64>, LuError> {
    let terms = order + 1;
    let mut normal = DenseMatrix::zeros(terms, terms);
    let mut rhs = vec![0.0; terms];

    for (&t, &value) in abscissa.iter().zip(values) {
        let powers = monomials(t, 2 * order);
        for row in 0..terms {
            rhs[row] += powers[row] * value;
            for col in 0..terms {
                normal[(row, col)] += powers[row + col];
            }
        }
    }

    lu_solve(&normal, &rhs)
}

pub fn evaluate_polynomial(coefficients: &[f64], t: f64) -> f64 {
    coefficients
        .iter()
        .rev()
        .fold(0.0, |accumulator, coefficient| accumulator * t + coefficient)
}

pub(crate) fn monomials(t: f64, degree: usize) -> Vec<f64> {
    let mut powers = Vec::with_capacity(degree + 1);
    let mut value = 1.0;
    for _ in 0..=degree {
        powers.push(value);
        value *= t;
    }
    powers
}

fn matrix_max_abs(matrix: &DenseMatrix) -> f64 {
    let mut max = 0.0_f64;
    for row in 0..matrix.nrows() {
        for col in 0..matrix.ncols() {
            max = max.max(matrix[(row, col)].abs());
        }
    }
    max
}
