//! Storage layer error types.

use thiserror::Error;

/// Errors that can occur in the block storage layer.
#[derive(Error, Debug)]
pub enum BlockError {
    #[error("invalid tuple size: {tuple_size} bytes (usable block space: {available})")]
    InvalidTupleSize { tuple_size: usize, available: usize },

    #[error("batch has {got} columns, block header supports at most {limit}")]
    TooManyColumns { got: usize, limit: usize },

    #[error("column {column}: values buffer is {got} bytes, expected width * rows = {expected}")]
    ColumnSizeMismatch {
        column: usize,
        got: usize,
        expected: usize,
    },

    #[error("batch schema does not match block: {0}")]
    SchemaMismatch(String),

    #[error("row index {start} is out of range for batch of {rows} rows")]
    RowIndexOutOfRange { start: usize, rows: usize },

    #[error("packing would write {required} bytes into a block with {available} free")]
    CapacityExceeded { required: usize, available: usize },

    #[error("block {0} not found in file")]
    BlockNotFound(crate::storage::block::BlockId),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("corruption: {0}")]
    Corruption(String),
}

/// Result type for block storage operations.
pub type BlockResult<T> = Result<T, BlockError>;
