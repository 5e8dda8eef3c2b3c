//! In-memory column batch consumed by block packing.
//!
//! A batch holds one fixed-width byte run per column: the values of column
//! `i` for rows `0..row_count`, concatenated in row order. Null values are
//! whatever sentinel byte pattern the surrounding type system produces;
//! this layer copies them through without interpretation.

use crate::storage::error::{BlockError, BlockResult};

/// One fixed-width column: `row_count` values of `width` bytes each,
/// concatenated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FixedColumn {
    width: usize,
    values: Vec<u8>,
}

impl FixedColumn {
    /// Width in bytes of a single value.
    pub fn width(&self) -> usize {
        self.width
    }

    /// All value bytes, row 0 first.
    pub fn values(&self) -> &[u8] {
        &self.values
    }

    /// The value bytes for rows `start..start + count`.
    pub fn rows(&self, start: usize, count: usize) -> &[u8] {
        &self.values[start * self.width..(start + count) * self.width]
    }
}

/// A batch of rows represented column-wise, ready to be packed into blocks.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ColumnBatch {
    row_count: usize,
    columns: Vec<FixedColumn>,
}

impl ColumnBatch {
    /// Create an empty batch that will hold `row_count` rows per column.
    pub fn new(row_count: usize) -> Self {
        Self {
            row_count,
            columns: Vec::new(),
        }
    }

    /// Add a column of fixed `width`. `values` must hold exactly
    /// `width * row_count` bytes.
    pub fn push_column(&mut self, width: usize, values: Vec<u8>) -> BlockResult<()> {
        if width == 0 {
            return Err(BlockError::SchemaMismatch(format!(
                "column {} has zero width",
                self.columns.len()
            )));
        }
        let expected = width * self.row_count;
        if values.len() != expected {
            return Err(BlockError::ColumnSizeMismatch {
                column: self.columns.len(),
                got: values.len(),
                expected,
            });
        }
        self.columns.push(FixedColumn { width, values });
        Ok(())
    }

    /// Number of rows in the batch.
    pub fn row_count(&self) -> usize {
        self.row_count
    }

    /// Number of columns in the batch.
    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    /// Byte width of one full row (sum of column widths).
    pub fn tuple_size(&self) -> usize {
        self.columns.iter().map(|c| c.width).sum()
    }

    /// Per-column widths, in column order.
    pub fn widths(&self) -> Vec<usize> {
        self.columns.iter().map(|c| c.width).collect()
    }

    /// Access one column.
    pub fn column(&self, index: usize) -> &FixedColumn {
        &self.columns[index]
    }
}
