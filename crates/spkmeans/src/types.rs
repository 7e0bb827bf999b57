use crate::{EmptyMatrixSnafu, Error, NonFiniteValueSnafu, RaggedRowSnafu};
use snafu::prelude::*;
use std::ops::{Index, IndexMut};

/// A dense row-major matrix of `f64` backed by a single allocation.
///
/// Point sets are matrices too: row `i` is point `i`, and the number of columns
/// is the dimension shared by all points.
#[derive(Debug, Clone, PartialEq)]
pub struct Matrix {
    rows: usize,
    cols: usize,
    data: Vec<f64>,
}

impl Matrix {
    pub fn zeros(rows: usize, cols: usize) -> Self {
        Self {
            rows,
            cols,
            data: vec![0.0; rows * cols],
        }
    }

    pub fn identity(n: usize) -> Self {
        let mut m = Self::zeros(n, n);
        for i in 0..n {
            m[(i, i)] = 1.0;
        }
        m
    }

    /// Build a matrix from rows of equal, non-zero length containing only
    /// finite values.
    ///
    /// ```
    /// let m = spkmeans::Matrix::from_rows(&[[1.0, 2.0], [3.0, 4.0]]).unwrap();
    /// assert_eq!(m.rows(), 2);
    /// assert_eq!(m[(1, 0)], 3.0);
    ///
    /// assert!(spkmeans::Matrix::from_rows(&[vec![1.0], vec![1.0, 2.0]]).is_err());
    /// ```
    pub fn from_rows<R: AsRef<[f64]>>(rows: &[R]) -> Result<Self, Error> {
        ensure!(!rows.is_empty(), EmptyMatrixSnafu);
        let cols = rows[0].as_ref().len();
        ensure!(cols > 0, EmptyMatrixSnafu);

        let mut data = Vec::with_capacity(rows.len() * cols);
        for (row, values) in rows.iter().enumerate() {
            let values = values.as_ref();
            ensure!(
                values.len() == cols,
                RaggedRowSnafu {
                    row,
                    len: values.len(),
                    expected: cols
                }
            );
            for (col, &value) in values.iter().enumerate() {
                ensure!(value.is_finite(), NonFiniteValueSnafu { row, col });
                data.push(value);
            }
        }

        Ok(Self {
            rows: rows.len(),
            cols,
            data,
        })
    }

    #[inline]
    pub fn rows(&self) -> usize {
        self.rows
    }

    #[inline]
    pub fn cols(&self) -> usize {
        self.cols
    }

    #[inline]
    pub fn is_square(&self) -> bool {
        self.rows == self.cols
    }

    #[inline]
    pub fn row(&self, i: usize) -> &[f64] {
        &self.data[i * self.cols..(i + 1) * self.cols]
    }

    #[inline]
    pub fn row_mut(&mut self, i: usize) -> &mut [f64] {
        &mut self.data[i * self.cols..(i + 1) * self.cols]
    }

    pub fn iter_rows(&self) -> impl Iterator<Item = &[f64]> {
        (0..self.rows).map(|i| self.row(i))
    }

    pub fn column(&self, j: usize) -> Vec<f64> {
        (0..self.rows).map(|i| self[(i, j)]).collect()
    }

    pub fn diagonal(&self) -> Vec<f64> {
        (0..self.rows.min(self.cols)).map(|i| self[(i, i)]).collect()
    }

    pub fn to_rows(&self) -> Vec<Vec<f64>> {
        self.iter_rows().map(<[f64]>::to_vec).collect()
    }

    /// Returns the first `(row, col)` pair whose mirrored entry differs by more
    /// than a relative `1e-9`, or `None` for a symmetric matrix.
    pub(crate) fn find_asymmetry(&self) -> Option<(usize, usize)> {
        for i in 0..self.rows {
            for j in (i + 1)..self.cols {
                let (a, b) = (self[(i, j)], self[(j, i)]);
                let scale = a.abs().max(b.abs()).max(1.0);
                if (a - b).abs() > SYMMETRY_TOLERANCE * scale {
                    return Some((i, j));
                }
            }
        }
        None
    }
}

const SYMMETRY_TOLERANCE: f64 = 1e-9;

impl Index<(usize, usize)> for Matrix {
    type Output = f64;

    #[inline]
    fn index(&self, (i, j): (usize, usize)) -> &f64 {
        debug_assert!(i < self.rows && j < self.cols);
        &self.data[i * self.cols + j]
    }
}

impl IndexMut<(usize, usize)> for Matrix {
    #[inline]
    fn index_mut(&mut self, (i, j): (usize, usize)) -> &mut f64 {
        debug_assert!(i < self.rows && j < self.cols);
        &mut self.data[i * self.cols + j]
    }
}

#[inline]
pub(crate) fn squared_distance(x: &[f64], y: &[f64]) -> f64 {
    debug_assert_eq!(x.len(), y.len());
    x.iter().zip(y).fold(0.0, |acc, (a, b)| {
        let d = a - b;
        d.mul_add(d, acc)
    })
}

#[inline]
pub(crate) fn distance(x: &[f64], y: &[f64]) -> f64 {
    squared_distance(x, y).sqrt()
}
