pub mod builder;
pub mod data_block;
pub mod header;

use std::fmt;

/// Logical slot index of a block within its file. Assigned by the caller
/// (the storage manager owns id allocation); determines the byte offset
/// `block_id * BLOCK_SIZE`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BlockId(pub u64);

impl fmt::Display for BlockId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "BlockId({})", self.0)
    }
}

pub use builder::BlockBuilder;
pub use data_block::DataBlock;
pub use header::BlockHeader;
