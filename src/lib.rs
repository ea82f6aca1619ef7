//! An in-memory block device with a FIFO free-list allocator, a directory
//! tree kept in a node arena, and append-only files mapped onto blocks.

pub mod block_store;
pub mod content;
pub mod error;
pub mod free_list;
pub mod fs_ops;
pub mod fs_structs;
pub mod namespace;
pub mod shell;

pub use error::{FsError, Result};
pub use fs_ops::{CdOutcome, FileSystem, WriteReport};
pub use fs_structs::{DirEntry, DiskUsage, FsConfig, NodeKind, BLOCK_SIZE, MAX_NAME_LEN, NUM_BLOCKS};
pub use shell::{parse_line, Command, Shell};
