//! End-to-end tests for the block storage core: packing a batch across
//! several blocks and flushing them to slot-addressed positions in a file.

use anyhow::Result;
use paxstore::storage::{
    read_block, BlockBuilder, BlockId, ColumnBatch, DataBlock, BLOCK_SIZE, HEADER_SIZE,
};
use tempfile::tempdir;

fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// A batch of 100-byte tuples: u64 row id, an 88-byte payload, u32 tag.
fn wide_batch(rows: usize) -> ColumnBatch {
    let mut batch = ColumnBatch::new(rows);
    batch
        .push_column(8, (0..rows as u64).flat_map(|v| v.to_le_bytes()).collect())
        .unwrap();
    batch
        .push_column(
            88,
            (0..rows).flat_map(|r| std::iter::repeat(r as u8).take(88)).collect(),
        )
        .unwrap();
    batch
        .push_column(4, (0..rows as u32).flat_map(|v| v.to_le_bytes()).collect())
        .unwrap();
    batch
}

/// Pack the whole batch, building a new block whenever the current one
/// fills up. This is the caller loop the builder contract is designed for.
fn pack_batch(builder: &mut BlockBuilder, batch: &ColumnBatch) -> Result<Vec<DataBlock>> {
    let mut blocks = Vec::new();
    let mut start = 0;
    while start < batch.row_count() || blocks.is_empty() {
        let mut block = builder.build(batch.tuple_size())?;
        start += block.append(batch, start)?;
        blocks.push(block);
        if batch.row_count() == 0 {
            break;
        }
    }
    Ok(blocks)
}

#[test]
fn test_400_rows_of_100_bytes_need_three_blocks() -> Result<()> {
    init_logging();
    let batch = wide_batch(400);
    assert_eq!(batch.tuple_size(), 100);

    let mut builder = BlockBuilder::new();
    let blocks = pack_batch(&mut builder, &batch)?;

    // (16384 - 48) / 100 = 163 tuples per block.
    assert_eq!(blocks.len(), 3);
    assert_eq!(builder.block_count(), 3);
    let counts: Vec<usize> = blocks.iter().map(|b| b.tuple_count()).collect();
    assert_eq!(counts, vec![163, 163, 74]);
    assert!(blocks[0].is_full());
    assert!(blocks[1].is_full());
    assert!(!blocks[2].is_full());
    Ok(())
}

#[test]
fn test_no_row_dropped_or_duplicated_across_blocks() -> Result<()> {
    init_logging();
    let batch = wide_batch(400);
    let mut builder = BlockBuilder::new();
    let blocks = pack_batch(&mut builder, &batch)?;

    // Reassemble the row-id column from the per-block runs.
    let mut ids = Vec::new();
    for block in &blocks {
        for chunk in block.column_data(0).unwrap().chunks(8) {
            ids.push(u64::from_le_bytes(chunk.try_into().unwrap()));
        }
    }
    let expected: Vec<u64> = (0..400).collect();
    assert_eq!(ids, expected);
    Ok(())
}

#[test]
fn test_flush_addressing_is_slot_exact() -> Result<()> {
    init_logging();
    let dir = tempdir()?;
    let path = dir.path().join("table.db");

    let batch = wide_batch(400);
    let mut builder = BlockBuilder::new();
    let blocks = pack_batch(&mut builder, &batch)?;

    for (i, block) in blocks.iter().enumerate() {
        block.flush_on_disk(&path, BlockId(i as u64))?;
    }

    // Raw bytes at offset i * BLOCK_SIZE are exactly that block's
    // header + packed data, with no overlap between slots.
    let file = std::fs::read(&path)?;
    assert_eq!(file.len(), 3 * BLOCK_SIZE);
    for (i, block) in blocks.iter().enumerate() {
        let slot = &file[i * BLOCK_SIZE..(i + 1) * BLOCK_SIZE];

        let mut header = block.header().clone();
        header.block_id = BlockId(i as u64);
        assert_eq!(&slot[..HEADER_SIZE], &header.encode());

        let data_size = block.data_size();
        let (header, data) = read_block(&path, BlockId(i as u64), 3)?;
        assert_eq!(header.tuple_count as usize, block.tuple_count());
        assert_eq!(data.len(), data_size);
        assert_eq!(&slot[HEADER_SIZE..HEADER_SIZE + data_size], &data[..]);
    }
    Ok(())
}

#[test]
fn test_flushed_blocks_scan_back_per_column() -> Result<()> {
    init_logging();
    let dir = tempdir()?;
    let path = dir.path().join("table.db");

    let batch = wide_batch(200);
    let mut builder = BlockBuilder::new();
    let blocks = pack_batch(&mut builder, &batch)?;
    for (i, block) in blocks.iter().enumerate() {
        block.flush_on_disk(&path, BlockId(i as u64))?;
    }

    // Read back and walk the tag column (column 2) of every block using
    // only the header's offset table.
    let mut tags = Vec::new();
    for i in 0..blocks.len() {
        let (header, data) = read_block(&path, BlockId(i as u64), 3)?;
        let start = header.column_offsets[2] as usize;
        let end = header.data_size as usize;
        for chunk in data[start..end].chunks(4) {
            tags.push(u32::from_le_bytes(chunk.try_into().unwrap()));
        }
    }
    let expected: Vec<u32> = (0..200).collect();
    assert_eq!(tags, expected);
    Ok(())
}

#[test]
fn test_empty_batch_builds_one_empty_block() -> Result<()> {
    init_logging();
    let batch = wide_batch(0);
    let mut builder = BlockBuilder::new();
    let blocks = pack_batch(&mut builder, &batch)?;

    assert_eq!(blocks.len(), 1);
    assert_eq!(builder.block_count(), 1);
    assert_eq!(blocks[0].tuple_count(), 0);
    assert_eq!(blocks[0].data_size(), 0);
    assert!(!blocks[0].is_full());
    Ok(())
}
