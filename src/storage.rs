//! PAX data-block storage core.
//!
//! This module implements the physical unit of persistent storage: a
//! fixed-size (16 KiB) data block holding one header plus the data of
//! multiple columns, packed in a PAX way (column-contiguous runs within a
//! row-local page). Key components:
//!
//! - **BlockHeader**: the 48-byte binary header with the per-column offset
//!   table, plus its encode/decode codec
//! - **DataBlock**: an owned 16 KiB page buffer with the column-packing
//!   `append` and the `flush_on_disk` write path
//! - **BlockBuilder**: capacity planning — how many tuples fit one block,
//!   how many blocks a batch needs
//! - **ColumnBatch**: the in-memory fixed-width column data consumed by
//!   the packer
//!
//! Blocks are write-once: a block is filled by a single producer, flushed
//! to its slot (`block_id * BLOCK_SIZE`) and never mutated afterwards.
//! Durability beyond a single synced write belongs to the layer above.

pub mod batch;
pub mod block;
pub mod disk;
pub mod error;

pub use batch::{ColumnBatch, FixedColumn};
pub use block::builder::BlockBuilder;
pub use block::data_block::DataBlock;
pub use block::header::{BlockHeader, BLOCK_SIZE, HEADER_SIZE, MAX_COLUMNS};
pub use block::BlockId;
pub use disk::{read_block, write_block};
pub use error::{BlockError, BlockResult};
