//! Capacity planning and block construction.
//!
//! One builder instance serves one batch: it turns a fixed tuple width into
//! a per-block tuple capacity and manufactures empty blocks for the caller
//! to pack. The running `block_count` tells the caller how many file slots
//! to provision for the batch.

use crate::storage::block::data_block::DataBlock;
use crate::storage::block::header::{BLOCK_SIZE, HEADER_SIZE};
use crate::storage::error::{BlockError, BlockResult};

/// Manufactures empty data blocks for a given tuple width.
#[derive(Debug, Default)]
pub struct BlockBuilder {
    block_count: usize,
}

impl BlockBuilder {
    /// A fresh builder with no blocks produced. Instantiate one per batch;
    /// the counter is scoped to this instance.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build an empty block for tuples of `tuple_size` bytes.
    ///
    /// Capacity is `(BLOCK_SIZE - HEADER_SIZE) / tuple_size` tuples, at
    /// least 1 for every accepted width. A `tuple_size` of zero, or one too
    /// wide for a single tuple to fit, is a caller bug and is rejected; a
    /// rejected build produces no block and does not count one.
    pub fn build(&mut self, tuple_size: usize) -> BlockResult<DataBlock> {
        let available = BLOCK_SIZE - HEADER_SIZE;
        if tuple_size == 0 || tuple_size > available {
            return Err(BlockError::InvalidTupleSize {
                tuple_size,
                available,
            });
        }
        let capacity = available / tuple_size;
        self.block_count += 1;
        Ok(DataBlock::new(tuple_size, capacity))
    }

    /// How many blocks this builder has produced so far.
    pub fn block_count(&self) -> usize {
        self.block_count
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_capacity_arithmetic() -> BlockResult<()> {
        let mut builder = BlockBuilder::new();

        // The reference case: 100-byte tuples in a 16 KiB block.
        let block = builder.build(100)?;
        assert_eq!(block.capacity(), 163);

        // capacity * tuple_size never exceeds the usable space.
        for tuple_size in [1, 3, 8, 100, 1000, BLOCK_SIZE - HEADER_SIZE] {
            let block = builder.build(tuple_size)?;
            assert!(block.capacity() >= 1);
            assert!(block.capacity() * tuple_size <= BLOCK_SIZE - HEADER_SIZE);
        }
        Ok(())
    }

    #[test]
    fn test_zero_tuple_size_rejected() {
        let mut builder = BlockBuilder::new();
        assert!(matches!(
            builder.build(0),
            Err(BlockError::InvalidTupleSize { tuple_size: 0, .. })
        ));
        assert_eq!(builder.block_count(), 0);
    }

    #[test]
    fn test_oversized_tuple_rejected() {
        let mut builder = BlockBuilder::new();
        assert!(builder.build(BLOCK_SIZE - HEADER_SIZE + 1).is_err());
        assert!(builder.build(BLOCK_SIZE).is_err());
        assert_eq!(builder.block_count(), 0);
    }

    #[test]
    fn test_block_count_tracks_builds() -> BlockResult<()> {
        let mut builder = BlockBuilder::new();
        assert_eq!(builder.block_count(), 0);

        builder.build(100)?;
        builder.build(100)?;
        assert_eq!(builder.block_count(), 2);

        // Failed builds do not count.
        let _ = builder.build(0);
        assert_eq!(builder.block_count(), 2);
        Ok(())
    }
}
