use crate::types::{Matrix, distance};
use crate::{
    Error, NotSquareSnafu, NotSymmetricSnafu, ShapeMismatchSnafu, TooFewPointsSnafu,
    ZeroDegreeSnafu,
};
use snafu::prelude::*;

/// Weighted adjacency matrix of a point set.
///
/// `w_ij = exp(-||x_i - x_j|| / 2)` for `i != j` and `w_ii = 0`, where the norm
/// is the Euclidean distance. Row `i` of `points` is point `i`.
pub fn build_wam(points: &Matrix) -> Result<Matrix, Error> {
    let n = points.rows();
    ensure!(n >= 2, TooFewPointsSnafu { n });

    let mut wam = Matrix::zeros(n, n);
    for i in 0..n {
        for j in (i + 1)..n {
            let w = (-distance(points.row(i), points.row(j)) / 2.0).exp();
            wam[(i, j)] = w;
            wam[(j, i)] = w;
        }
    }
    Ok(wam)
}

/// Diagonal degree matrix: `d_ii = sum_j w_ij`, zero elsewhere.
pub fn build_ddg(wam: &Matrix) -> Result<Matrix, Error> {
    ensure_square(wam)?;

    let n = wam.rows();
    let mut ddg = Matrix::zeros(n, n);
    for i in 0..n {
        ddg[(i, i)] = wam.row(i).iter().sum();
    }
    Ok(ddg)
}

/// Normalized graph Laplacian `I - D^{-1/2} W D^{-1/2}`.
///
/// `wam` must be symmetric. Every vertex must have a positive degree, otherwise
/// the normalization is undefined and [`Error::ZeroDegree`] is returned.
pub fn build_laplacian(wam: &Matrix, ddg: &Matrix) -> Result<Matrix, Error> {
    ensure_square(wam)?;
    if let Some((row, col)) = wam.find_asymmetry() {
        return NotSymmetricSnafu { row, col }.fail();
    }
    let n = wam.rows();
    ensure!(
        ddg.rows() == n && ddg.cols() == n,
        ShapeMismatchSnafu {
            expected: n,
            rows: ddg.rows(),
            cols: ddg.cols(),
        }
    );

    let mut inv_sqrt_degrees = Vec::with_capacity(n);
    for vertex in 0..n {
        let degree = ddg[(vertex, vertex)];
        ensure!(degree > 0.0, ZeroDegreeSnafu { vertex });
        inv_sqrt_degrees.push(degree.sqrt().recip());
    }

    let mut gl = Matrix::zeros(n, n);
    for i in 0..n {
        gl[(i, i)] = 1.0;
        for j in (i + 1)..n {
            let v = -wam[(i, j)] * inv_sqrt_degrees[i] * inv_sqrt_degrees[j];
            gl[(i, j)] = v;
            gl[(j, i)] = v;
        }
    }
    Ok(gl)
}

fn ensure_square(m: &Matrix) -> Result<(), Error> {
    ensure!(
        m.is_square(),
        NotSquareSnafu {
            rows: m.rows(),
            cols: m.cols()
        }
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ErrorKind;
    use pretty_assertions::assert_eq;

    fn triangle() -> Matrix {
        Matrix::from_rows(&[[0.0, 0.0], [3.0, 4.0], [0.0, 1.0]]).unwrap()
    }

    #[test]
    fn wam_known_values() {
        let wam = build_wam(&triangle()).unwrap();

        assert_eq!(wam.diagonal(), vec![0.0, 0.0, 0.0]);
        // ||(0,0) - (3,4)|| = 5
        assert!((wam[(0, 1)] - (-2.5f64).exp()).abs() < 1e-12);
        // ||(0,0) - (0,1)|| = 1
        assert!((wam[(0, 2)] - (-0.5f64).exp()).abs() < 1e-12);
        // ||(3,4) - (0,1)|| = sqrt(18)
        assert!((wam[(1, 2)] - (-(18f64).sqrt() / 2.0).exp()).abs() < 1e-12);
        assert_eq!(wam.find_asymmetry(), None);
    }

    #[test]
    fn wam_identical_points_weigh_one() {
        let points = Matrix::from_rows(&[[1.5, -2.0], [1.5, -2.0]]).unwrap();
        let wam = build_wam(&points).unwrap();
        assert_eq!(wam[(0, 1)], 1.0);
        assert_eq!(wam[(1, 0)], 1.0);
    }

    #[test]
    fn wam_needs_two_points() {
        let points = Matrix::from_rows(&[[1.0, 2.0]]).unwrap();
        let err = build_wam(&points).unwrap_err();
        assert!(matches!(err, Error::TooFewPoints { n: 1 }));
        assert_eq!(err.kind(), ErrorKind::InvalidInput);
    }

    #[test]
    fn ddg_is_row_sums() {
        let wam = build_wam(&triangle()).unwrap();
        let ddg = build_ddg(&wam).unwrap();

        for i in 0..3 {
            let expected: f64 = wam.row(i).iter().sum();
            assert!((ddg[(i, i)] - expected).abs() < 1e-12);
            for j in 0..3 {
                if i != j {
                    assert_eq!(ddg[(i, j)], 0.0);
                }
            }
        }
    }

    #[test]
    fn ddg_rejects_non_square() {
        let m = Matrix::zeros(2, 3);
        assert!(matches!(
            build_ddg(&m).unwrap_err(),
            Error::NotSquare { rows: 2, cols: 3 }
        ));
    }

    #[test]
    fn laplacian_known_values() {
        let wam = build_wam(&triangle()).unwrap();
        let ddg = build_ddg(&wam).unwrap();
        let gl = build_laplacian(&wam, &ddg).unwrap();

        assert_eq!(gl.diagonal(), vec![1.0, 1.0, 1.0]);
        for i in 0..3 {
            for j in 0..3 {
                if i != j {
                    let expected = -wam[(i, j)] / (ddg[(i, i)] * ddg[(j, j)]).sqrt();
                    assert!((gl[(i, j)] - expected).abs() < 1e-12);
                }
            }
        }
        assert_eq!(gl.find_asymmetry(), None);
    }

    #[test]
    fn laplacian_two_points() {
        // Two vertices joined by a single edge: D^{-1/2} W D^{-1/2} has 1 off the diagonal
        let points = Matrix::from_rows(&[[0.0], [2.0]]).unwrap();
        let wam = build_wam(&points).unwrap();
        let ddg = build_ddg(&wam).unwrap();
        let gl = build_laplacian(&wam, &ddg).unwrap();
        assert!((gl[(0, 1)] + 1.0).abs() < 1e-12);
        assert!((gl[(1, 0)] + 1.0).abs() < 1e-12);
    }

    #[test]
    fn laplacian_zero_degree() {
        // exp(-1000) underflows to zero, so both vertices are isolated
        let points = Matrix::from_rows(&[[0.0, 0.0], [2000.0, 0.0]]).unwrap();
        let wam = build_wam(&points).unwrap();
        let ddg = build_ddg(&wam).unwrap();
        let err = build_laplacian(&wam, &ddg).unwrap_err();
        assert!(matches!(err, Error::ZeroDegree { vertex: 0 }));
        assert_eq!(err.kind(), ErrorKind::SingularDegree);
    }

    #[test]
    fn laplacian_rejects_asymmetric_wam() {
        let mut wam = build_wam(&triangle()).unwrap();
        let ddg = build_ddg(&wam).unwrap();
        wam[(2, 0)] += 0.25;

        let err = build_laplacian(&wam, &ddg).unwrap_err();
        assert!(matches!(err, Error::NotSymmetric { row: 0, col: 2 }));
        assert_eq!(err.kind(), ErrorKind::InvalidInput);
    }

    #[test]
    fn laplacian_shape_mismatch() {
        let wam = build_wam(&triangle()).unwrap();
        let ddg = Matrix::identity(2);
        assert!(matches!(
            build_laplacian(&wam, &ddg).unwrap_err(),
            Error::ShapeMismatch { expected: 3, .. }
        ));
    }
}
