#[cfg(feature = "_debug")]
pub mod kmeans;
#[cfg(not(feature = "_debug"))]
mod kmeans;
#[cfg(feature = "_debug")]
pub mod rng;
#[cfg(not(feature = "_debug"))]
mod rng;
#[cfg(feature = "_debug")]
pub mod spectral;
#[cfg(not(feature = "_debug"))]
mod spectral;

mod graph;
mod jacobi;
pub mod text_io;
mod types;

pub use graph::{build_ddg, build_laplacian, build_wam};
pub use jacobi::{CONVERGENCE_EPSILON, EigenDecomposition, MAX_ROTATIONS, jacobi, jacobi_extra};
pub use kmeans::lloyds::{CONVERGENCE_TOLERANCE, MAX_ITER};
pub use types::Matrix;

use rand::RngExt;
use snafu::prelude::*;
use tracing::debug;

#[derive(Debug, Snafu)]
#[snafu(visibility(pub(crate)))]
#[non_exhaustive]
pub enum Error {
    #[snafu(display("matrix is empty"))]
    EmptyMatrix,

    #[snafu(display("row {row} has {len} values, expected {expected}"))]
    RaggedRow {
        row: usize,
        len: usize,
        expected: usize,
    },

    #[snafu(display("value at ({row}, {col}) is not finite"))]
    NonFiniteValue { row: usize, col: usize },

    #[snafu(display("at least 2 points are required, got {n}"))]
    TooFewPoints { n: usize },

    #[snafu(display("matrix must be square, got {rows}x{cols}"))]
    NotSquare { rows: usize, cols: usize },

    #[snafu(display("matrix is not symmetric at ({row}, {col})"))]
    NotSymmetric { row: usize, col: usize },

    #[snafu(display("expected a {expected}x{expected} matrix, got {rows}x{cols}"))]
    ShapeMismatch {
        expected: usize,
        rows: usize,
        cols: usize,
    },

    #[snafu(display("points have dimension {expected}, centroids have dimension {got}"))]
    DimensionMismatch { expected: usize, got: usize },

    #[snafu(display("k must be in 1..{n}, got {k}"))]
    InvalidK { k: usize, n: usize },

    #[snafu(display("vertex {vertex} has zero degree"))]
    ZeroDegree { vertex: usize },
}

/// Coarse classification of [`Error`], stable across new variants.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum ErrorKind {
    /// Malformed or inconsistent matrices, or too few points.
    InvalidInput,
    /// A cluster count outside `1..n`.
    InvalidArgument,
    /// A vertex without edges, so the Laplacian can't be normalized.
    SingularDegree,
}

impl Error {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::InvalidK { .. } => ErrorKind::InvalidArgument,
            Error::ZeroDegree { .. } => ErrorKind::SingularDegree,
            Error::EmptyMatrix
            | Error::RaggedRow { .. }
            | Error::NonFiniteValue { .. }
            | Error::TooFewPoints { .. }
            | Error::NotSquare { .. }
            | Error::NotSymmetric { .. }
            | Error::ShapeMismatch { .. }
            | Error::DimensionMismatch { .. } => ErrorKind::InvalidInput,
        }
    }
}

#[derive(Debug, Clone)]
pub struct SpectralClustering {
    /// Number of clusters, either requested or picked by the eigengap heuristic.
    pub k: usize,
    /// Indices of the points k-means++ picked as initial centroids.
    pub centroid_indices: Vec<usize>,
    /// Final centroids in the eigenspace, one per row.
    pub centroids: Matrix,
    /// Centroid index for every input point.
    pub assignments: Vec<usize>,
}

#[derive(Debug)]
pub struct DebugInfo {
    pub sorted_eigenvalues: Vec<f64>,
    pub jacobi_rotations: usize,
    pub jacobi_converged: bool,
    pub kmeans_loop_iterations: usize,
    pub kmeans_converged: bool,
}

/// Cluster points (one per row) with normalized spectral clustering.
///
/// With `k = None` the number of clusters comes from the eigengap heuristic.
///
/// ```
/// let points = spkmeans::Matrix::from_rows(&[
///     [0.0, 0.0], [0.2, 0.1], [0.1, 0.3],
///     [9.0, 9.0], [9.2, 9.1], [9.1, 9.3],
/// ]).unwrap();
///
/// let result = spkmeans::spectral_cluster(&points, Some(2)).unwrap();
///
/// assert_eq!(result.k, 2);
/// assert_eq!(result.assignments[0], result.assignments[1]);
/// assert_eq!(result.assignments[3], result.assignments[5]);
/// assert_ne!(result.assignments[0], result.assignments[3]);
/// ```
///
/// The result is reproducible: the same input always yields the same
/// `centroid_indices`, `centroids` and `assignments`.
///
/// See also [`spectral_cluster_extra`] for the same function with the Lloyd
/// refinement parameters exposed.
pub fn spectral_cluster(points: &Matrix, k: Option<usize>) -> Result<SpectralClustering, Error> {
    spectral_cluster_extra(points, k, MAX_ITER, CONVERGENCE_TOLERANCE)
}

pub fn spectral_cluster_extra(
    points: &Matrix,
    k: Option<usize>,
    max_iter: usize,
    epsilon: f64,
) -> Result<SpectralClustering, Error> {
    let mut rng = rng::new();
    spectral_cluster_extra_debug(&mut rng, points, k, max_iter, epsilon).map(|(result, _)| result)
}

pub fn spectral_cluster_extra_debug(
    rng: &mut impl RngExt,
    points: &Matrix,
    k: Option<usize>,
    max_iter: usize,
    epsilon: f64,
) -> Result<(SpectralClustering, DebugInfo), Error> {
    let n = points.rows();
    ensure!(n >= 2, TooFewPointsSnafu { n });
    if let Some(k) = k {
        ensure!(k >= 1 && k < n, InvalidKSnafu { k, n });
    }

    debug!(n, dim = points.cols(), "building normalized graph laplacian");
    let wam = build_wam(points)?;
    let ddg = build_ddg(&wam)?;
    let gl = build_laplacian(&wam, &ddg)?;

    let eigen = jacobi(gl)?;

    let k = match k {
        Some(k) => k,
        None => {
            let k = spectral::eigengap_heuristic(&eigen.eigenvalues)?;
            debug!(k, "eigengap heuristic picked the number of clusters");
            k
        }
    };

    let u = spectral::embed(&eigen, k)?;
    let initial = kmeans::plus_plus_init::find_initial(rng, &u, k)?;
    debug!(indices = ?initial.indices, "k-means++ picked initial centroids");

    let (centroids, loop_result) =
        kmeans::lloyds::find_centroids(&u, initial.centroids, max_iter, epsilon)?;

    let mut sorted_eigenvalues = eigen.eigenvalues;
    sorted_eigenvalues.sort_by(f64::total_cmp);

    Ok((
        SpectralClustering {
            k,
            centroid_indices: initial.indices,
            centroids: centroids.centroids,
            assignments: centroids.assignments,
        },
        DebugInfo {
            sorted_eigenvalues,
            jacobi_rotations: eigen.rotations,
            jacobi_converged: eigen.converged,
            kmeans_loop_iterations: loop_result.iterations,
            kmeans_converged: loop_result.converged,
        },
    ))
}
