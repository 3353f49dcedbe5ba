//! A row-major container for data laid out on a time × range grid.
//!
//! Rows are profiles (one per time), columns are range gates. Rows are stored contiguously so
//! disjoint groups of rows can be handed out as independent mutable slices.
use crate::error::{AnalysisError, Result};
use std::slice::{Chunks, ChunksMut};

/// Values on a time × range grid.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Grid<T> {
    data: Vec<T>,
    num_rows: usize,
    num_cols: usize,
}

impl<T: Clone> Grid<T> {
    /// Create a grid with every element set to `value`.
    pub fn filled(num_rows: usize, num_cols: usize, value: T) -> Self {
        Grid {
            data: vec![value; num_rows * num_cols],
            num_rows,
            num_cols,
        }
    }

    /// Build a grid from a list of rows, all rows must have the same length.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use cloud_layers::Grid;
    ///
    /// let grid = Grid::from_rows(vec![vec![1, 2, 3], vec![4, 5, 6]]).unwrap();
    /// assert_eq!(grid.num_rows(), 2);
    /// assert_eq!(grid.row(1), Some(&[4, 5, 6][..]));
    ///
    /// assert!(Grid::from_rows(vec![vec![1, 2, 3], vec![4, 5]]).is_err());
    /// ```
    pub fn from_rows(rows: Vec<Vec<T>>) -> Result<Self> {
        let num_rows = rows.len();
        let num_cols = rows.first().map(|r| r.len()).unwrap_or(0);

        if rows.iter().any(|r| r.len() != num_cols) {
            return Err(AnalysisError::MismatchedDimensions);
        }

        let data = rows.into_iter().flatten().collect();
        Ok(Grid {
            data,
            num_rows,
            num_cols,
        })
    }

    /// Copy out the columns `1..num_cols - 1`, dropping the first and last gate of every row.
    pub fn interior(&self) -> Grid<T> {
        let num_cols = self.num_cols.saturating_sub(2);
        let data = self
            .rows()
            .flat_map(|row| row.iter().skip(1).take(num_cols).cloned())
            .collect();

        Grid {
            data,
            num_rows: self.num_rows,
            num_cols,
        }
    }
}

impl<T> Grid<T> {
    /// Wrap a flat, row-major vector.
    pub fn from_vec(num_rows: usize, num_cols: usize, data: Vec<T>) -> Result<Self> {
        if data.len() != num_rows * num_cols {
            return Err(AnalysisError::MismatchedDimensions);
        }

        Ok(Grid {
            data,
            num_rows,
            num_cols,
        })
    }

    /// Number of rows (times).
    #[inline]
    pub fn num_rows(&self) -> usize {
        self.num_rows
    }

    /// Number of columns (range gates).
    #[inline]
    pub fn num_cols(&self) -> usize {
        self.num_cols
    }

    /// (rows, columns)
    #[inline]
    pub fn shape(&self) -> (usize, usize) {
        (self.num_rows, self.num_cols)
    }

    /// Get a row.
    #[inline]
    pub fn row(&self, index: usize) -> Option<&[T]> {
        if index < self.num_rows {
            let start = index * self.num_cols;
            Some(&self.data[start..(start + self.num_cols)])
        } else {
            None
        }
    }

    /// Get a mutable row.
    #[inline]
    pub fn row_mut(&mut self, index: usize) -> Option<&mut [T]> {
        if index < self.num_rows {
            let start = index * self.num_cols;
            Some(&mut self.data[start..(start + self.num_cols)])
        } else {
            None
        }
    }

    /// Get a single element.
    #[inline]
    pub fn get(&self, row: usize, col: usize) -> Option<&T> {
        if col < self.num_cols {
            self.row(row).map(|r| &r[col])
        } else {
            None
        }
    }

    /// Iterate over the rows.
    #[inline]
    pub fn rows(&self) -> Chunks<'_, T> {
        // chunks() panics on zero, and there is nothing to hand out anyway.
        self.data.chunks(self.num_cols.max(1))
    }

    /// Iterate over the rows mutably.
    #[inline]
    pub fn rows_mut(&mut self) -> ChunksMut<'_, T> {
        self.data.chunks_mut(self.num_cols.max(1))
    }

    /// The underlying row-major storage.
    #[inline]
    pub fn as_slice(&self) -> &[T] {
        &self.data
    }

    /// The underlying row-major storage, mutable.
    #[inline]
    pub fn as_mut_slice(&mut self) -> &mut [T] {
        &mut self.data
    }

    /// Apply `f` to every element, keeping the shape.
    pub fn map<U, F>(&self, f: F) -> Grid<U>
    where
        F: FnMut(&T) -> U,
    {
        Grid {
            data: self.data.iter().map(f).collect(),
            num_rows: self.num_rows,
            num_cols: self.num_cols,
        }
    }
}
