use super::Centroids;
use crate::types::{Matrix, distance, squared_distance};
use crate::{DimensionMismatchSnafu, EmptyMatrixSnafu, Error};
use snafu::prelude::*;
use tracing::debug;

pub const MAX_ITER: usize = 300;
pub const CONVERGENCE_TOLERANCE: f64 = 1e-3;

/// Assign every point to its nearest centroid, the lowest index on ties.
#[inline]
pub fn assign_points(points: &Matrix, centroids: &Matrix, assignments: &mut [usize]) {
    for (point, assignment) in points.iter_rows().zip(assignments.iter_mut()) {
        let mut min = f64::INFINITY;
        let mut min_idx = 0;
        for (j, centroid) in centroids.iter_rows().enumerate() {
            let d = squared_distance(point, centroid);
            if d < min {
                min = d;
                min_idx = j;
            }
        }

        *assignment = min_idx;
    }
}

#[derive(Debug)]
pub struct UpdateResult {
    pub max_shift: f64,
    pub counts: Vec<usize>,
}

/// Replace every centroid with the mean of its assigned points.
///
/// A centroid without points keeps its previous value.
#[inline]
pub fn update_centroids(
    points: &Matrix,
    assignments: &[usize],
    centroids: &mut Matrix,
) -> UpdateResult {
    let k = centroids.rows();
    let mut counts = vec![0usize; k];
    let mut sums = Matrix::zeros(k, points.cols());

    for (point, &assigned_c) in points.iter_rows().zip(assignments) {
        assert!(assigned_c < k);

        counts[assigned_c] += 1;
        for (sum, &x) in sums.row_mut(assigned_c).iter_mut().zip(point) {
            *sum += x;
        }
    }

    let mut max_shift = 0f64;

    for (i, &count) in counts.iter().enumerate() {
        if count == 0 {
            // It's an empty cluster, keep the previous centroid
            continue;
        }

        let mean = sums.row_mut(i);
        for x in mean.iter_mut() {
            *x /= count as f64;
        }

        max_shift = max_shift.max(distance(centroids.row(i), mean));
        centroids.row_mut(i).copy_from_slice(mean);
    }

    UpdateResult { max_shift, counts }
}

#[derive(Debug)]
pub struct LloydsLoopResult {
    pub iterations: usize,
    pub converged: bool,
}

/// Refine `centroids` in place until no centroid moves by more than `epsilon`
/// or `max_iter` iterations have run. `assignments` ends up consistent with the
/// final centroids.
pub fn lloyds_loop(
    points: &Matrix,
    assignments: &mut [usize],
    centroids: &mut Matrix,
    max_iter: usize,
    epsilon: f64,
) -> LloydsLoopResult {
    assert_eq!(points.rows(), assignments.len());
    assert_eq!(points.cols(), centroids.cols());
    assert!(centroids.rows() > 0);

    let mut result = LloydsLoopResult {
        iterations: max_iter,
        converged: false,
    };

    for i in 0..max_iter {
        assign_points(points, centroids, assignments);
        let update_result = update_centroids(points, assignments, centroids);

        let empty = update_result.counts.iter().filter(|&&c| c == 0).count();
        if empty > 0 {
            debug!(iteration = i, empty, "empty clusters kept their centroids");
        }

        if update_result.max_shift <= epsilon {
            result = LloydsLoopResult {
                iterations: i + 1,
                converged: true,
            };
            break;
        }
    }

    // Final pass so that the assignments match the centroids that are returned
    assign_points(points, centroids, assignments);
    result
}

/// Run Lloyd's algorithm from the given initial centroids (one per row).
pub fn find_centroids(
    points: &Matrix,
    initial: Matrix,
    max_iter: usize,
    epsilon: f64,
) -> Result<(Centroids, LloydsLoopResult), Error> {
    ensure!(points.rows() > 0 && initial.rows() > 0, EmptyMatrixSnafu);
    ensure!(
        initial.cols() == points.cols(),
        DimensionMismatchSnafu {
            expected: points.cols(),
            got: initial.cols()
        }
    );

    let mut centroids = initial;
    let mut assignments = vec![0usize; points.rows()];
    let loop_result = lloyds_loop(points, &mut assignments, &mut centroids, max_iter, epsilon);

    debug!(
        k = centroids.rows(),
        iterations = loop_result.iterations,
        converged = loop_result.converged,
        "lloyd refinement finished"
    );

    Ok((
        Centroids {
            centroids,
            assignments,
        },
        loop_result,
    ))
}
