//! Block header layout and codec.
//!
//! The header occupies the first 48 bytes of every block, little-endian,
//! versionless:
//!
//! ```text
//! [0..8)   block_id     (u64)
//! [8..16)  data_size    (u64)  bytes of packed column data
//! [16..24) tuple_count  (u64)  rows packed into the block
//! [24..48) offset table (6 x u32)  per-column data-region offsets
//! ```
//!
//! The header does not record the column count; the reader supplies it from
//! the schema it owns. Unused offset slots are written as zero and never
//! interpreted.

use crate::storage::block::BlockId;
use crate::storage::error::{BlockError, BlockResult};

/// Total size of one block on disk.
pub const BLOCK_SIZE: usize = 16384;

/// Size of the encoded header at the start of each block.
pub const HEADER_SIZE: usize = 48;

/// Columns per block the fixed offset-table budget allows:
/// (HEADER_SIZE - 3 * 8) / 4 slots of u32.
pub const MAX_COLUMNS: usize = 6;

const BLOCK_ID_OFFSET: usize = 0;
const DATA_SIZE_OFFSET: usize = 8;
const TUPLE_COUNT_OFFSET: usize = 16;
const OFFSET_TABLE_OFFSET: usize = 24;

/// Header of one data block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlockHeader {
    /// Slot of the block within its file; caller-assigned.
    pub block_id: BlockId,
    /// Bytes of packed column data following the header.
    pub data_size: u64,
    /// Rows packed into the block.
    pub tuple_count: u64,
    /// Start of each column's contiguous run, relative to the data region.
    /// `column_offsets[i + 1] - column_offsets[i]` is the byte length of
    /// column `i`'s run; the last run ends at `data_size`.
    pub column_offsets: Vec<u32>,
}

impl BlockHeader {
    /// An empty header for a freshly built block.
    pub fn new() -> Self {
        Self {
            block_id: BlockId(0),
            data_size: 0,
            tuple_count: 0,
            column_offsets: Vec::new(),
        }
    }

    /// Encode into the fixed 48-byte on-disk form.
    pub fn encode(&self) -> [u8; HEADER_SIZE] {
        debug_assert!(self.column_offsets.len() <= MAX_COLUMNS);
        let mut buf = [0u8; HEADER_SIZE];
        buf[BLOCK_ID_OFFSET..BLOCK_ID_OFFSET + 8].copy_from_slice(&self.block_id.0.to_le_bytes());
        buf[DATA_SIZE_OFFSET..DATA_SIZE_OFFSET + 8].copy_from_slice(&self.data_size.to_le_bytes());
        buf[TUPLE_COUNT_OFFSET..TUPLE_COUNT_OFFSET + 8]
            .copy_from_slice(&self.tuple_count.to_le_bytes());
        for (i, offset) in self.column_offsets.iter().enumerate() {
            let at = OFFSET_TABLE_OFFSET + i * 4;
            buf[at..at + 4].copy_from_slice(&offset.to_le_bytes());
        }
        buf
    }

    /// Decode a header from the first `HEADER_SIZE` bytes of `buf`.
    ///
    /// `column_count` comes from the reader's schema and selects how many
    /// offset-table slots are meaningful. Internally inconsistent fields
    /// are reported as corruption.
    pub fn decode(buf: &[u8], column_count: usize) -> BlockResult<Self> {
        if column_count > MAX_COLUMNS {
            return Err(BlockError::TooManyColumns {
                got: column_count,
                limit: MAX_COLUMNS,
            });
        }
        if buf.len() < HEADER_SIZE {
            return Err(BlockError::Corruption(format!(
                "header truncated: {} bytes, need {}",
                buf.len(),
                HEADER_SIZE
            )));
        }

        let block_id = u64::from_le_bytes(buf[BLOCK_ID_OFFSET..BLOCK_ID_OFFSET + 8].try_into().unwrap());
        let data_size =
            u64::from_le_bytes(buf[DATA_SIZE_OFFSET..DATA_SIZE_OFFSET + 8].try_into().unwrap());
        let tuple_count = u64::from_le_bytes(
            buf[TUPLE_COUNT_OFFSET..TUPLE_COUNT_OFFSET + 8]
                .try_into()
                .unwrap(),
        );

        if data_size as usize > BLOCK_SIZE - HEADER_SIZE {
            return Err(BlockError::Corruption(format!(
                "data_size {} exceeds block capacity {}",
                data_size,
                BLOCK_SIZE - HEADER_SIZE
            )));
        }

        let mut column_offsets = Vec::with_capacity(column_count);
        for i in 0..column_count {
            let at = OFFSET_TABLE_OFFSET + i * 4;
            let offset = u32::from_le_bytes(buf[at..at + 4].try_into().unwrap());
            if u64::from(offset) > data_size {
                return Err(BlockError::Corruption(format!(
                    "column {} offset {} lies beyond data_size {}",
                    i, offset, data_size
                )));
            }
            if let Some(&prev) = column_offsets.last() {
                if offset < prev {
                    return Err(BlockError::Corruption(format!(
                        "column offsets not non-decreasing: {} after {}",
                        offset, prev
                    )));
                }
            }
            column_offsets.push(offset);
        }

        Ok(Self {
            block_id: BlockId(block_id),
            data_size,
            tuple_count,
            column_offsets,
        })
    }
}

impl Default for BlockHeader {
    fn default() -> Self {
        Self::new()
    }
}
