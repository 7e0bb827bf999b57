use crate::types::Matrix;
use crate::{EmptyMatrixSnafu, Error, NotSquareSnafu, NotSymmetricSnafu};
use snafu::prelude::*;
use tracing::{debug, warn};

pub const MAX_ROTATIONS: usize = 100;
pub const CONVERGENCE_EPSILON: f64 = 1e-5;
// Largest off-diagonal magnitude still treated as zero
const PIVOT_TOLERANCE: f64 = 1e-15;

/// Eigenvalues of a symmetric matrix paired with its eigenvectors.
///
/// Column `j` of `eigenvectors` is the unit eigenvector for `eigenvalues[j]`.
/// The eigenvalues are in the order they end up on the diagonal, not sorted.
#[derive(Debug, Clone)]
pub struct EigenDecomposition {
    pub eigenvalues: Vec<f64>,
    pub eigenvectors: Matrix,
    pub rotations: usize,
    pub converged: bool,
    /// Sum of squares of the off-diagonal entries left after the last
    /// rotation. Every entry of `V diag(eigenvalues) V^T - A` is bounded by its
    /// square root.
    pub residual: f64,
}

impl EigenDecomposition {
    /// `true` when the rotation cap was hit before the off-diagonal mass
    /// stopped shrinking, so the values are only an approximation.
    pub fn is_approximate(&self) -> bool {
        !self.converged
    }

    pub fn len(&self) -> usize {
        self.eigenvalues.len()
    }

    pub fn is_empty(&self) -> bool {
        self.eigenvalues.is_empty()
    }
}

/// Diagonalize a symmetric matrix with the classical Jacobi method (always
/// rotating away the largest off-diagonal entry), using the default rotation
/// cap and convergence threshold.
///
/// ```
/// let m = spkmeans::Matrix::from_rows(&[[2.0, 1.0], [1.0, 2.0]]).unwrap();
/// let eigen = spkmeans::jacobi(m).unwrap();
///
/// let mut values = eigen.eigenvalues.clone();
/// values.sort_by(f64::total_cmp);
/// assert!((values[0] - 1.0).abs() < 1e-9);
/// assert!((values[1] - 3.0).abs() < 1e-9);
/// ```
pub fn jacobi(matrix: Matrix) -> Result<EigenDecomposition, Error> {
    jacobi_extra(matrix, MAX_ROTATIONS, CONVERGENCE_EPSILON)
}

pub fn jacobi_extra(
    mut a: Matrix,
    max_rotations: usize,
    epsilon: f64,
) -> Result<EigenDecomposition, Error> {
    ensure!(a.rows() > 0, EmptyMatrixSnafu);
    ensure!(
        a.is_square(),
        NotSquareSnafu {
            rows: a.rows(),
            cols: a.cols()
        }
    );
    if let Some((row, col)) = a.find_asymmetry() {
        return NotSymmetricSnafu { row, col }.fail();
    }

    let n = a.rows();
    let mut v = Matrix::identity(n);
    let mut rotations = 0;
    let mut converged = false;
    let mut off = off_diagonal_square(&a);

    loop {
        let Some((p, q)) = find_pivot(&a) else {
            converged = true;
            break;
        };
        if rotations == max_rotations {
            break;
        }

        let rotation = Rotation::new(&a, p, q);
        rotation.apply(&mut a);
        rotation.accumulate(&mut v);
        rotations += 1;

        let off_after = off_diagonal_square(&a);
        let reduction = off - off_after;
        off = off_after;
        if reduction <= epsilon {
            converged = true;
            break;
        }
    }

    if converged {
        debug!(n, rotations, off, "jacobi converged");
    } else {
        warn!(n, rotations, off, "jacobi hit the rotation cap, eigenpairs are approximate");
    }

    let mut eigenvalues = a.diagonal();
    unsign_zero_eigenvalues(&mut eigenvalues, &mut v);

    Ok(EigenDecomposition {
        eigenvalues,
        eigenvectors: v,
        rotations,
        converged,
        residual: off,
    })
}

/// Upper-triangle position `(p, q)` with the largest `|a_pq|`, the first one in
/// row-major order on ties. `None` once the matrix is effectively diagonal.
fn find_pivot(a: &Matrix) -> Option<(usize, usize)> {
    let n = a.rows();
    let mut max = -1.0;
    let mut pivot = (0, 0);
    for i in 0..n {
        for (j, &value) in a.row(i).iter().enumerate().skip(i + 1) {
            let value = value.abs();
            if value > max {
                max = value;
                pivot = (i, j);
            }
        }
    }

    (max > PIVOT_TOLERANCE).then_some(pivot)
}

/// Sum of squares of every off-diagonal entry, both triangles included.
fn off_diagonal_square(a: &Matrix) -> f64 {
    let mut sum = 0.0;
    for i in 0..a.rows() {
        for (j, &value) in a.row(i).iter().enumerate() {
            if i != j {
                sum = value.mul_add(value, sum);
            }
        }
    }
    sum
}

/// Plane rotation `P` equal to the identity except `P[p][p] = P[q][q] = c`,
/// `P[p][q] = s` and `P[q][p] = -s`, with `p < q`.
#[derive(Debug, Copy, Clone)]
struct Rotation {
    p: usize,
    q: usize,
    c: f64,
    s: f64,
}

impl Rotation {
    fn new(a: &Matrix, p: usize, q: usize) -> Self {
        let theta = (a[(q, q)] - a[(p, p)]) / (2.0 * a[(p, q)]);
        let sign = if theta < 0.0 { -1.0 } else { 1.0 };
        let t = sign / (theta.abs() + theta.mul_add(theta, 1.0).sqrt());
        let c = t.mul_add(t, 1.0).sqrt().recip();
        let s = t * c;
        Self { p, q, c, s }
    }

    /// `A <- P^T A P`, touching only rows and columns `p` and `q`.
    fn apply(&self, a: &mut Matrix) {
        let Self { p, q, c, s } = *self;
        let (app, aqq, apq) = (a[(p, p)], a[(q, q)], a[(p, q)]);

        for r in 0..a.rows() {
            if r == p || r == q {
                continue;
            }
            let (arp, arq) = (a[(r, p)], a[(r, q)]);
            let new_rp = c * arp - s * arq;
            let new_rq = c * arq + s * arp;
            a[(r, p)] = new_rp;
            a[(p, r)] = new_rp;
            a[(r, q)] = new_rq;
            a[(q, r)] = new_rq;
        }

        a[(p, p)] = c * c * app + s * s * aqq - 2.0 * s * c * apq;
        a[(q, q)] = s * s * app + c * c * aqq + 2.0 * s * c * apq;
        a[(p, q)] = 0.0;
        a[(q, p)] = 0.0;
    }

    /// `V <- V P`, touching only columns `p` and `q`.
    fn accumulate(&self, v: &mut Matrix) {
        let Self { p, q, c, s } = *self;
        for r in 0..v.rows() {
            let row = v.row_mut(r);
            let (vrp, vrq) = (row[p], row[q]);
            row[p] = c * vrp - s * vrq;
            row[q] = s * vrp + c * vrq;
        }
    }
}

fn unsign_zero_eigenvalues(eigenvalues: &mut [f64], eigenvectors: &mut Matrix) {
    for (j, value) in eigenvalues.iter_mut().enumerate() {
        if *value == 0.0 && value.is_sign_negative() {
            *value = 0.0;
            for r in 0..eigenvectors.rows() {
                eigenvectors[(r, j)] = -eigenvectors[(r, j)];
            }
        }
    }
}
