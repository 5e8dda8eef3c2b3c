pub mod block_file;

pub use block_file::{read_block, write_block};
