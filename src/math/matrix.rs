use rand::prelude::*;

use crate::error::{NnError, NnResult};

/// Row-major 2-D buffer: one row per sample, element (r, c) at `r * cols + c`.
///
/// The shape is fixed at construction, so `data.len() == rows * cols` holds
/// for the lifetime of the value.
#[derive(Debug, Clone, PartialEq)]
pub struct Matrix {
    rows: usize,
    cols: usize,
    data: Vec<f64>,
}

impl Matrix {
    /// Zero-filled matrix. Fails instead of aborting when the buffer cannot
    /// be reserved.
    pub fn zeros(rows: usize, cols: usize) -> NnResult<Matrix> {
        let len = rows
            .checked_mul(cols)
            .ok_or(NnError::AllocationFailure { rows, cols })?;

        let mut data = Vec::new();
        data.try_reserve_exact(len)
            .map_err(|_| NnError::AllocationFailure { rows, cols })?;
        data.resize(len, 0.0);

        Ok(Matrix { rows, cols, data })
    }

    pub fn from_vec(rows: usize, cols: usize, data: Vec<f64>) -> NnResult<Matrix> {
        if rows.checked_mul(cols) != Some(data.len()) {
            return Err(NnError::ShapeMismatch {
                expected_rows: rows,
                expected_cols: cols,
                rows: 1,
                cols: data.len(),
            });
        }
        Ok(Matrix { rows, cols, data })
    }

    /// Uniform values in [-1, 1).
    pub fn random(rows: usize, cols: usize) -> NnResult<Matrix> {
        let mut rng = rand::thread_rng();
        let mut res = Matrix::zeros(rows, cols)?;

        for x in res.data.iter_mut() {
            *x = rng.gen::<f64>() * 2.0 - 1.0;
        }

        Ok(res)
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    #[inline]
    pub fn get(&self, r: usize, c: usize) -> f64 {
        self.data[r * self.cols + c]
    }

    #[inline]
    pub fn set(&mut self, r: usize, c: usize, value: f64) {
        self.data[r * self.cols + c] = value;
    }

    pub fn row(&self, r: usize) -> &[f64] {
        &self.data[r * self.cols..(r + 1) * self.cols]
    }

    pub fn row_mut(&mut self, r: usize) -> &mut [f64] {
        let cols = self.cols;
        &mut self.data[r * cols..(r + 1) * cols]
    }

    pub fn as_slice(&self) -> &[f64] {
        &self.data
    }

    pub fn as_mut_slice(&mut self) -> &mut [f64] {
        &mut self.data
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// `ShapeMismatch` unless this matrix is exactly `rows x cols`.
    pub fn ensure_shape(&self, rows: usize, cols: usize) -> NnResult<()> {
        if self.rows != rows || self.cols != cols {
            return Err(NnError::ShapeMismatch {
                expected_rows: rows,
                expected_cols: cols,
                rows: self.rows,
                cols: self.cols,
            });
        }
        Ok(())
    }

    pub fn sum(&self) -> f64 {
        self.data.iter().sum()
    }
}

impl Default for Matrix {
    fn default() -> Self {
        Matrix { rows: 0, cols: 0, data: vec![] }
    }
}
