//! Fixed-shape numeric arrays.
//!
//! [`NumericArray`] is a row-major `f64` matrix; the combined table becomes
//! an `n x 2` array of (response, count). [`ResponseGrid`] arranges whole
//! (response, count) pairs in a grid. Neither ever truncates or pads data
//! when reshaped.

use crate::analysis::stats::ColumnStats;
use crate::error::SurveyError;
use serde::Serialize;

/// `rows * cols == len`, treating an overflowing product as a mismatch.
fn fits(rows: usize, cols: usize, len: usize) -> bool {
    rows.checked_mul(cols) == Some(len)
}

/// Row-major offset of `(row, col)`, or `None` when out of range.
fn cell_index(row: usize, col: usize, rows: usize, cols: usize) -> Option<usize> {
    if row >= rows || col >= cols {
        return None;
    }
    row.checked_mul(cols)?.checked_add(col)
}

/// Position and value of an extreme cell.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct CellExtreme {
    pub value: f64,
    pub row: usize,
    pub col: usize,
}

/// Row-major two-dimensional array of `f64`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NumericArray {
    rows: usize,
    cols: usize,
    data: Vec<f64>,
}

impl NumericArray {
    /// Build an array, checking that `data` holds exactly `rows * cols` values.
    pub fn new(rows: usize, cols: usize, data: Vec<f64>) -> Result<Self, SurveyError> {
        if !fits(rows, cols, data.len()) {
            return Err(SurveyError::ShapeMismatch {
                rows,
                cols,
                len: data.len(),
            });
        }
        Ok(Self { rows, cols, data })
    }

    /// Caller guarantees `data.len() == rows * cols`.
    pub(crate) fn from_parts(rows: usize, cols: usize, data: Vec<f64>) -> Self {
        debug_assert!(fits(rows, cols, data.len()));
        Self { rows, cols, data }
    }

    /// `(rows, cols)`.
    pub fn shape(&self) -> (usize, usize) {
        (self.rows, self.cols)
    }

    /// Total number of cells.
    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// All cells in row-major order.
    pub fn values(&self) -> &[f64] {
        &self.data
    }

    pub fn get(&self, row: usize, col: usize) -> Option<f64> {
        let index = cell_index(row, col, self.rows, self.cols)?;
        self.data.get(index).copied()
    }

    /// Iterate over rows as slices.
    pub fn row_slices(&self) -> impl Iterator<Item = &[f64]> {
        // chunks(0) panics; a zero-column array has no row content anyway.
        self.data.chunks(self.cols.max(1))
    }

    /// Same cells, new shape. Fails unless `rows * cols` equals the cell count.
    pub fn reshape(&self, rows: usize, cols: usize) -> Result<Self, SurveyError> {
        Self::new(rows, cols, self.data.clone())
    }

    /// Copy of one column, or `None` if out of range.
    pub fn column(&self, col: usize) -> Option<Vec<f64>> {
        if col >= self.cols {
            return None;
        }
        Some(self.row_slices().map(|row| row[col]).collect())
    }

    /// Population statistics for every column.
    pub fn column_stats(&self) -> Vec<ColumnStats> {
        (0..self.cols)
            .filter_map(|col| self.column(col))
            .filter_map(|values| ColumnStats::compute(&values))
            .collect()
    }

    /// Smallest cell; the first one wins on ties.
    pub fn min(&self) -> Option<CellExtreme> {
        self.extreme(|candidate, best| candidate < best)
    }

    /// Largest cell; the first one wins on ties.
    pub fn max(&self) -> Option<CellExtreme> {
        self.extreme(|candidate, best| candidate > best)
    }

    fn extreme<F>(&self, better: F) -> Option<CellExtreme>
    where
        F: Fn(f64, f64) -> bool,
    {
        let cols = self.cols.max(1);
        let (index, value) = self
            .data
            .iter()
            .copied()
            .enumerate()
            .reduce(|best, candidate| {
                if better(candidate.1, best.1) {
                    candidate
                } else {
                    best
                }
            })?;

        Some(CellExtreme {
            value,
            row: index / cols,
            col: index % cols,
        })
    }

    /// First `n` rows.
    pub fn head(&self, n: usize) -> Self {
        let rows = n.min(self.rows);
        Self::from_parts(rows, self.cols, self.data[..rows * self.cols].to_vec())
    }

    /// Rows whose value in `col` is strictly greater than `threshold`.
    pub fn filter_rows(&self, col: usize, threshold: f64) -> Self {
        let kept: Vec<&[f64]> = self
            .row_slices()
            .filter(|row| row.get(col).is_some_and(|v| *v > threshold))
            .collect();
        let rows = kept.len();
        Self::from_parts(rows, self.cols, kept.concat())
    }

    /// One column multiplied by `factor`.
    pub fn scale_column(&self, col: usize, factor: f64) -> Option<Vec<f64>> {
        self.column(col)
            .map(|values| values.into_iter().map(|v| v * factor).collect())
    }
}

/// (response, count) pairs arranged in a fixed grid.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResponseGrid {
    rows: usize,
    cols: usize,
    cells: Vec<(f64, u64)>,
}

impl ResponseGrid {
    /// Fails unless `rows * cols` equals the number of pairs.
    pub fn new(rows: usize, cols: usize, cells: Vec<(f64, u64)>) -> Result<Self, SurveyError> {
        if !fits(rows, cols, cells.len()) {
            return Err(SurveyError::ShapeMismatch {
                rows,
                cols,
                len: cells.len(),
            });
        }
        Ok(Self { rows, cols, cells })
    }

    pub fn shape(&self) -> (usize, usize) {
        (self.rows, self.cols)
    }

    pub fn get(&self, row: usize, col: usize) -> Option<(f64, u64)> {
        let index = cell_index(row, col, self.rows, self.cols)?;
        self.cells.get(index).copied()
    }
}
