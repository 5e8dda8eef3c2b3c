//! The data block: one fixed-size page of packed column data.
//!
//! A block owns its 16 KiB buffer exclusively for its whole lifetime. It is
//! filled through `append` by a single producer, flushed once, and never
//! mutated afterwards. The data region is kept as a tightly packed PAX
//! image after every append: column `i` occupies one contiguous run of
//! `tuple_count * width_i` bytes, and the header's offset table always
//! describes the current layout.

use std::path::Path;

use crate::storage::batch::ColumnBatch;
use crate::storage::block::header::{BlockHeader, BLOCK_SIZE, HEADER_SIZE, MAX_COLUMNS};
use crate::storage::block::BlockId;
use crate::storage::disk;
use crate::storage::error::{BlockError, BlockResult};

/// A fixed-size block of packed column data, the physical unit of storage.
pub struct DataBlock {
    header: BlockHeader,
    data: Box<[u8; BLOCK_SIZE]>,
    tuple_size: usize,
    capacity: usize,
    /// Column widths, fixed by the first non-empty append.
    widths: Vec<usize>,
    is_full: bool,
}

impl DataBlock {
    /// Blocks are only manufactured by `BlockBuilder::build`, which owns
    /// the capacity arithmetic.
    pub(crate) fn new(tuple_size: usize, capacity: usize) -> Self {
        Self {
            header: BlockHeader::new(),
            data: Box::new([0u8; BLOCK_SIZE]),
            tuple_size,
            capacity,
            widths: Vec::new(),
            is_full: false,
        }
    }

    /// Pack rows `start..` of `batch` into the block, stopping when the
    /// block's tuple capacity is reached. Returns the number of rows
    /// consumed; when fewer than the remaining rows fit, the block is
    /// marked full and the caller re-invokes `append` on a fresh block
    /// with `start` advanced by the returned count.
    pub fn append(&mut self, batch: &ColumnBatch, start: usize) -> BlockResult<usize> {
        let rows = batch.row_count();
        if start > rows {
            return Err(BlockError::RowIndexOutOfRange { start, rows });
        }
        let remaining = rows - start;
        if remaining == 0 {
            return Ok(0);
        }

        self.check_schema(batch)?;

        let old = self.header.tuple_count as usize;
        let take = remaining.min(self.capacity - old);
        if take == 0 {
            self.is_full = true;
            return Ok(0);
        }
        let new = old + take;

        // Invariant guard: the builder's capacity math must keep us inside
        // the block. Writing past it would corrupt the page image.
        let required = new * self.tuple_size;
        let available = BLOCK_SIZE - HEADER_SIZE;
        if required > available {
            return Err(BlockError::CapacityExceeded {
                required,
                available,
            });
        }

        let widths = self.widths.clone();
        let prefix = prefix_widths(&widths);

        // Existing runs move to their new positions first, highest column
        // first so no unmoved run is overwritten.
        for i in (1..widths.len()).rev() {
            let len = old * widths[i];
            let old_at = HEADER_SIZE + old * prefix[i];
            let new_at = HEADER_SIZE + new * prefix[i];
            if len > 0 && old_at != new_at {
                self.data.copy_within(old_at..old_at + len, new_at);
            }
        }

        // Append the new values at the tail of each run.
        for (i, width) in widths.iter().enumerate() {
            let src = batch.column(i).rows(start, take);
            let at = HEADER_SIZE + new * prefix[i] + old * width;
            self.data[at..at + src.len()].copy_from_slice(src);
        }

        self.header.tuple_count = new as u64;
        self.header.data_size = (new * self.tuple_size) as u64;
        self.header.column_offsets = prefix
            .iter()
            .take(widths.len())
            .map(|p| (new * p) as u32)
            .collect();
        if new == self.capacity {
            self.is_full = true;
        }

        Ok(take)
    }

    fn check_schema(&mut self, batch: &ColumnBatch) -> BlockResult<()> {
        if self.widths.is_empty() {
            let columns = batch.column_count();
            if columns > MAX_COLUMNS {
                return Err(BlockError::TooManyColumns {
                    got: columns,
                    limit: MAX_COLUMNS,
                });
            }
            if batch.tuple_size() != self.tuple_size {
                return Err(BlockError::SchemaMismatch(format!(
                    "batch tuple size {} does not match block tuple size {}",
                    batch.tuple_size(),
                    self.tuple_size
                )));
            }
            self.widths = batch.widths();
        } else if batch.widths() != self.widths {
            return Err(BlockError::SchemaMismatch(format!(
                "batch widths {:?} do not match block widths {:?}",
                batch.widths(),
                self.widths
            )));
        }
        Ok(())
    }

    /// Write the block to its slot (`block_id * BLOCK_SIZE`) in the file at
    /// `path`. The caller-assigned id is stamped into the encoded header.
    /// Takes `&self`: a failed flush leaves the block unchanged and it can
    /// be flushed again.
    pub fn flush_on_disk(&self, path: &Path, block_id: BlockId) -> BlockResult<()> {
        disk::write_block(path, self, block_id)
    }

    /// Rows packed so far.
    pub fn tuple_count(&self) -> usize {
        self.header.tuple_count as usize
    }

    /// Bytes of packed column data.
    pub fn data_size(&self) -> usize {
        self.header.data_size as usize
    }

    /// Maximum rows this block can hold, from the builder's capacity math.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Whether no further row can be appended.
    pub fn is_full(&self) -> bool {
        self.is_full
    }

    /// The current header.
    pub fn header(&self) -> &BlockHeader {
        &self.header
    }

    /// The packed run of one column, or `None` if no such column has been
    /// appended. This is the per-column scan path the PAX layout exists for.
    pub fn column_data(&self, index: usize) -> Option<&[u8]> {
        let width = *self.widths.get(index)?;
        let at = HEADER_SIZE + self.header.column_offsets[index] as usize;
        Some(&self.data[at..at + self.tuple_count() * width])
    }

    /// The whole packed data region, header excluded.
    pub(crate) fn packed_data(&self) -> &[u8] {
        &self.data[HEADER_SIZE..HEADER_SIZE + self.data_size()]
    }
}

fn prefix_widths(widths: &[usize]) -> Vec<usize> {
    let mut prefix = Vec::with_capacity(widths.len());
    let mut sum = 0;
    for width in widths {
        prefix.push(sum);
        sum += width;
    }
    prefix
}
