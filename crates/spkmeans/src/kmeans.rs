use crate::types::Matrix;

pub mod lloyds;
pub mod plus_plus_init;

// References:
// - k-means++: The Advantages of Careful Seeding (D. Arthur, S. Vassilvitskii)
//   https://theory.stanford.edu/~sergei/papers/kMeansPP-soda.pdf
// - https://scikit-learn.org/stable/modules/generated/sklearn.cluster.KMeans.html
//
// Unlike scikit, the seeding weighs points by plain (not squared) distance and
// samples a single candidate per step.

#[derive(Debug)]
pub struct Centroids {
    pub centroids: Matrix,
    pub assignments: Vec<usize>,
}
