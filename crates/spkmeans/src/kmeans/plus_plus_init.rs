use crate::types::{Matrix, distance};
use crate::{Error, InvalidKSnafu};
use rand::RngExt;
use snafu::prelude::*;

/// Initial centroids chosen by k-means++, with the indices of the points they
/// were copied from.
#[derive(Debug, Clone)]
pub struct InitialCentroids {
    pub indices: Vec<usize>,
    pub centroids: Matrix,
}

#[inline(always)]
fn sample_by_distance(rng: &mut impl RngExt, min_distances: &[f64], sum: f64) -> usize {
    // Every point already coincides with a centroid, nothing to weigh by
    if sum <= 0.0 {
        return rng.random_range(0..min_distances.len());
    }

    let random_threshold = rng.random::<f64>() * sum;
    let mut cumsum = 0.0;

    for (i, &distance) in min_distances.iter().enumerate() {
        cumsum += distance;
        if cumsum > random_threshold {
            return i;
        }
    }

    // Rounding can leave cumsum a hair below the threshold, fall back to the
    // last point with non-zero weight
    min_distances
        .iter()
        .rposition(|&d| d > 0.0)
        .unwrap_or(min_distances.len() - 1)
}

/// Pick `k` of the `points` (one per row) as initial centroids.
///
/// The first one is uniform, every next one is sampled with probability
/// proportional to its distance from the nearest centroid chosen so far.
/// Requires `1 <= k < n`.
pub fn find_initial(
    rng: &mut impl RngExt,
    points: &Matrix,
    k: usize,
) -> Result<InitialCentroids, Error> {
    let n = points.rows();
    ensure!(k >= 1 && k < n, InvalidKSnafu { k, n });

    let mut indices = Vec::<usize>::with_capacity(k);
    let c0 = rng.random_range(0..n);
    indices.push(c0);

    let mut min_distances: Vec<f64> = points
        .iter_rows()
        .map(|p| distance(p, points.row(c0)))
        .collect();
    let mut min_distances_sum: f64 = min_distances.iter().sum();

    for _ in 1..k {
        let next = sample_by_distance(rng, &min_distances, min_distances_sum);
        indices.push(next);

        let centroid = points.row(next);
        min_distances_sum = 0.0;
        for (i, min) in min_distances.iter_mut().enumerate() {
            *min = min.min(distance(points.row(i), centroid));
            min_distances_sum += *min;
        }
    }

    let mut centroids = Matrix::zeros(k, points.cols());
    for (j, &idx) in indices.iter().enumerate() {
        centroids.row_mut(j).copy_from_slice(points.row(idx));
    }

    Ok(InitialCentroids { indices, centroids })
}
