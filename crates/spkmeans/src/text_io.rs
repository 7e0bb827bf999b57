//! Comma-separated text input and fixed-precision output for the CLI.

use crate::types::Matrix;
use snafu::prelude::*;
use std::num::ParseFloatError;
use std::path::{Path, PathBuf};

#[derive(Debug, Snafu)]
#[non_exhaustive]
pub enum ReadMatrixError {
    #[snafu(display("failed to read {}", path.display()))]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[snafu(display("line {line}, value {column}: can't parse {value:?}"))]
    ParseValue {
        line: usize,
        column: usize,
        value: String,
        source: ParseFloatError,
    },

    #[snafu(display("invalid matrix"))]
    Shape { source: crate::Error },
}

/// Parse comma-separated rows of numbers. Blank lines are skipped and
/// whitespace around values is ignored.
///
/// ```
/// let m = spkmeans::text_io::parse_matrix("1.0,2.5\n-3,4e-1\n").unwrap();
/// assert_eq!(m.to_rows(), vec![vec![1.0, 2.5], vec![-3.0, 0.4]]);
/// ```
pub fn parse_matrix(text: &str) -> Result<Matrix, ReadMatrixError> {
    let mut rows = Vec::new();
    for (i, line) in text.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        let row = line
            .split(',')
            .enumerate()
            .map(|(j, value)| {
                let value = value.trim();
                value.parse::<f64>().context(ParseValueSnafu {
                    line: i + 1,
                    column: j + 1,
                    value,
                })
            })
            .collect::<Result<Vec<_>, _>>()?;
        rows.push(row);
    }

    Matrix::from_rows(&rows).context(ShapeSnafu)
}

pub fn read_matrix(path: &Path) -> Result<Matrix, ReadMatrixError> {
    let text = std::fs::read_to_string(path).context(IoSnafu { path })?;
    parse_matrix(&text)
}

/// Four decimals, and never a negative zero.
pub fn format_value(value: f64) -> String {
    let formatted = format!("{value:.4}");
    if formatted == "-0.0000" {
        "0.0000".to_owned()
    } else {
        formatted
    }
}

pub fn format_row(row: &[f64]) -> String {
    row.iter()
        .map(|&v| format_value(v))
        .collect::<Vec<_>>()
        .join(",")
}

pub fn format_matrix(matrix: &Matrix) -> String {
    matrix
        .iter_rows()
        .map(format_row)
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn format_indices(indices: &[usize]) -> String {
    indices
        .iter()
        .map(usize::to_string)
        .collect::<Vec<_>>()
        .join(",")
}
