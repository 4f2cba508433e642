//! Dense row-major matrix
//!
//! The container learning algorithms consume: one row per example, one
//! column per feature slot.

use crate::{Error, Result, Vector};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct Matrix {
    rows: usize,
    cols: usize,
    data: Vec<f64>,
}

impl Matrix {
    #[must_use]
    pub fn zeros(rows: usize, cols: usize) -> Self {
        Self {
            rows,
            cols,
            data: vec![0.0; rows * cols],
        }
    }

    /// Build from rows that must all have the same width
    pub fn from_rows(rows: Vec<Vec<f64>>) -> Result<Self> {
        let cols = rows.first().map(Vec::len).unwrap_or(0);
        Self::from_rows_with_width(rows, cols)
    }

    /// Build from rows of a known width; an empty row set keeps `cols`
    pub fn from_rows_with_width(rows: Vec<Vec<f64>>, cols: usize) -> Result<Self> {
        let mut data = Vec::with_capacity(rows.len() * cols);
        for row in &rows {
            if row.len() != cols {
                return Err(Error::InvalidConfig(format!(
                    "ragged rows: expected width {}, got {}",
                    cols,
                    row.len()
                )));
            }
            data.extend_from_slice(row);
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
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    #[inline]
    pub fn get(&self, row: usize, col: usize) -> f64 {
        assert!(row < self.rows && col < self.cols, "index ({}, {}) out of bounds", row, col);
        self.data[row * self.cols + col]
    }

    #[inline]
    pub fn set(&mut self, row: usize, col: usize, value: f64) {
        assert!(row < self.rows && col < self.cols, "index ({}, {}) out of bounds", row, col);
        self.data[row * self.cols + col] = value;
    }

    /// Borrow one row
    #[inline]
    pub fn row(&self, row: usize) -> &[f64] {
        let start = row * self.cols;
        &self.data[start..start + self.cols]
    }

    #[inline]
    pub fn row_mut(&mut self, row: usize) -> &mut [f64] {
        let start = row * self.cols;
        &mut self.data[start..start + self.cols]
    }

    /// Copy of column `col` as a vector
    pub fn col(&self, col: usize) -> Vector {
        (0..self.rows).map(|r| self.get(r, col)).collect()
    }

    pub fn iter_rows(&self) -> impl Iterator<Item = &[f64]> {
        // chunks_exact panics on zero
        self.data.chunks_exact(self.cols.max(1)).take(self.rows)
    }

    #[inline]
    pub fn as_slice(&self) -> &[f64] {
        &self.data
    }
}
