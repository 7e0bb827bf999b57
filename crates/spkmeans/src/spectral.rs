use crate::jacobi::EigenDecomposition;
use crate::types::Matrix;
use crate::{Error, InvalidKSnafu, TooFewPointsSnafu};
use snafu::prelude::*;

/// Number of clusters suggested by the largest gap in the sorted spectrum.
///
/// Only the first `n / 2` gaps are considered, and the first maximal gap wins.
/// A maximal gap between the eigenvalues of rank `k - 1` and `k` (0-based)
/// means `k` clusters.
pub fn eigengap_heuristic(eigenvalues: &[f64]) -> Result<usize, Error> {
    let n = eigenvalues.len();
    ensure!(n >= 2, TooFewPointsSnafu { n });

    let mut sorted = eigenvalues.to_vec();
    sorted.sort_by(f64::total_cmp);

    let mut best = 0;
    let mut best_gap = f64::NEG_INFINITY;
    for (i, pair) in sorted.windows(2).take(n / 2).enumerate() {
        let gap = (pair[1] - pair[0]).abs();
        if gap > best_gap {
            best_gap = gap;
            best = i;
        }
    }

    Ok(best + 1)
}

/// Project the points onto the eigenvectors of the `k` smallest eigenvalues.
///
/// Row `i` of the result is point `i` in the `k`-dimensional eigenspace. Equal
/// eigenvalues keep their original relative order. Rows are not renormalized.
pub fn embed(eigen: &EigenDecomposition, k: usize) -> Result<Matrix, Error> {
    let n = eigen.len();
    ensure!(k >= 1 && k <= n, InvalidKSnafu { k, n });

    let mut order: Vec<usize> = (0..n).collect();
    order.sort_by(|&a, &b| eigen.eigenvalues[a].total_cmp(&eigen.eigenvalues[b]));

    let mut u = Matrix::zeros(n, k);
    for i in 0..n {
        let source = eigen.eigenvectors.row(i);
        for (dst, &col) in u.row_mut(i).iter_mut().zip(&order[..k]) {
            *dst = source[col];
        }
    }
    Ok(u)
}
