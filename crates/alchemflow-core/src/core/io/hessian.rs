use nalgebra::DMatrix;
use std::path::Path;
use thiserror::Error;

const HESSIAN_MARKER: &str = "$hessian";

#[derive(Debug, Error)]
pub enum HessianError {
    #[error("File I/O error for '{path}': {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },
    #[error("No '$hessian' block found")]
    MissingBlock,
    #[error("Parse error on line {line}: {message}")]
    Parse { line: usize, message: String },
    #[error("Hessian block is incomplete: {filled} of {expected} columns read")]
    Incomplete { filled: usize, expected: usize },
}

/// The second-derivative matrix stored in the `$hessian` block of an ORCA `.hess` file.
///
/// The block starts with the dimension `3N` and continues with column groups:
/// a line of column indices followed by `3N` rows of `row_index value...`.
#[derive(Debug, Clone, PartialEq)]
pub struct OrcaHessian {
    pub matrix: DMatrix<f64>,
}

impl OrcaHessian {
    pub fn from_path(path: &Path) -> Result<Self, HessianError> {
        let content = std::fs::read_to_string(path).map_err(|e| HessianError::Io {
            path: path.to_string_lossy().to_string(),
            source: e,
        })?;
        Self::parse(&content)
    }

    pub fn parse(content: &str) -> Result<Self, HessianError> {
        let mut lines = content
            .lines()
            .enumerate()
            .map(|(i, line)| (i + 1, line.trim()))
            .skip_while(|(_, line)| *line != HESSIAN_MARKER)
            .skip(1)
            .filter(|(_, line)| !line.is_empty());

        let (dim_line, dim_raw) = lines.next().ok_or(HessianError::MissingBlock)?;
        let dim: usize = dim_raw.parse().map_err(|_| HessianError::Parse {
            line: dim_line,
            message: format!("invalid dimension '{}'", dim_raw),
        })?;

        let mut matrix = DMatrix::zeros(dim, dim);
        let mut filled = 0;

        while filled < dim {
            let Some((header_line, header)) = lines.next() else {
                break;
            };
            if header.starts_with('$') {
                break;
            }
            let columns = header
                .split_whitespace()
                .map(|raw| {
                    raw.parse::<usize>()
                        .ok()
                        .filter(|&col| col < dim)
                        .ok_or_else(|| HessianError::Parse {
                            line: header_line,
                            message: format!("invalid column index '{}'", raw),
                        })
                })
                .collect::<Result<Vec<_>, _>>()?;

            for _ in 0..dim {
                let (row_line, row) = lines.next().ok_or(HessianError::Incomplete {
                    filled,
                    expected: dim,
                })?;
                let mut fields = row.split_whitespace();
                let row_idx = fields
                    .next()
                    .and_then(|raw| raw.parse::<usize>().ok())
                    .filter(|&idx| idx < dim)
                    .ok_or_else(|| HessianError::Parse {
                        line: row_line,
                        message: format!("invalid row index in '{}'", row),
                    })?;

                let values = fields
                    .map(|raw| {
                        raw.parse::<f64>().map_err(|_| HessianError::Parse {
                            line: row_line,
                            message: format!("invalid value '{}'", raw),
                        })
                    })
                    .collect::<Result<Vec<_>, _>>()?;
                if values.len() != columns.len() {
                    return Err(HessianError::Parse {
                        line: row_line,
                        message: format!(
                            "expected {} values, found {}",
                            columns.len(),
                            values.len()
                        ),
                    });
                }
                for (&col, value) in columns.iter().zip(values) {
                    matrix[(row_idx, col)] = value;
                }
            }
            filled += columns.len();
        }

        if filled != dim {
            return Err(HessianError::Incomplete {
                filled,
                expected: dim,
            });
        }
        Ok(Self { matrix })
    }

    #[inline]
    pub fn dimension(&self) -> usize {
        self.matrix.nrows()
    }

    /// Row-major flattening, matching the `hess[i][j]` column order of training sets.
    pub fn flattened(&self) -> Vec<f64> {
        let n = self.dimension();
        let mut flat = Vec::with_capacity(n * n);
        for i in 0..n {
            for j in 0..n {
                flat.push(self.matrix[(i, j)]);
            }
        }
        flat
    }
}
