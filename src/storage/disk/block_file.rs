//! Slot-addressed block file I/O.
//!
//! A block file is a flat sequence of fixed-size slots; block `n` lives at
//! byte offset `n * BLOCK_SIZE`, so distinct blocks never overlap on disk
//! and distinct slots may be written from distinct threads. Each operation
//! opens its own scoped file handle, released on every exit path. No
//! retries happen here; a failed write leaves the slot's content
//! unspecified and the caller decides whether to flush again.

use log::debug;
use std::fs::OpenOptions;
use std::io::{Read, Seek, SeekFrom, Write};
use std::path::Path;

use crate::storage::block::data_block::DataBlock;
use crate::storage::block::header::{BlockHeader, BLOCK_SIZE, HEADER_SIZE};
use crate::storage::block::BlockId;
use crate::storage::error::{BlockError, BlockResult};

/// Write `block` to its slot in the file at `path`, growing the file if the
/// slot lies past the current end. The caller-assigned `block_id` is
/// stamped into the header as it is encoded; only the header and the
/// block's `data_size` bytes are written, the rest of the slot is left
/// unspecified.
pub fn write_block(path: &Path, block: &DataBlock, block_id: BlockId) -> BlockResult<()> {
    let offset = block_offset(block_id);

    let mut file = OpenOptions::new()
        .read(true)
        .write(true)
        .create(true)
        .open(path)?;

    let file_size = file.metadata()?.len();
    let slot_end = offset + BLOCK_SIZE as u64;
    if slot_end > file_size {
        debug!("extending {:?} from {} to {} bytes", path, file_size, slot_end);
        file.set_len(slot_end)?;
    }

    let mut header = block.header().clone();
    header.block_id = block_id;

    file.seek(SeekFrom::Start(offset))?;
    file.write_all(&header.encode())?;
    file.write_all(block.packed_data())?;
    file.sync_all()?;

    debug!(
        "flushed {}: {} tuples, {} data bytes at offset {}",
        block_id,
        header.tuple_count,
        header.data_size,
        offset
    );
    Ok(())
}

/// Read the block at `block_id`'s slot: the decoded header and the packed
/// data region. `column_count` comes from the reader's schema and selects
/// how many header offset slots are meaningful.
pub fn read_block(
    path: &Path,
    block_id: BlockId,
    column_count: usize,
) -> BlockResult<(BlockHeader, Vec<u8>)> {
    let offset = block_offset(block_id);

    let mut file = OpenOptions::new().read(true).open(path)?;

    let file_size = file.metadata()?.len();
    if offset >= file_size {
        return Err(BlockError::BlockNotFound(block_id));
    }

    file.seek(SeekFrom::Start(offset))?;
    let mut header_buf = [0u8; HEADER_SIZE];
    file.read_exact(&mut header_buf)?;
    let header = BlockHeader::decode(&header_buf, column_count)?;

    let mut data = vec![0u8; header.data_size as usize];
    file.read_exact(&mut data)?;

    debug!(
        "read {}: {} tuples, {} data bytes",
        block_id, header.tuple_count, header.data_size
    );
    Ok((header, data))
}

fn block_offset(block_id: BlockId) -> u64 {
    block_id.0 * BLOCK_SIZE as u64
}
