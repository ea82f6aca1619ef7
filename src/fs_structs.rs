// Struct definitions for the filesystem
use serde::Serialize;

use crate::error::{FsError, Result};

pub const NUM_BLOCKS: usize = 5000;
pub const BLOCK_SIZE: usize = 512;
pub const MAX_NAME_LEN: usize = 50; // Max length for a file or directory name

/// Geometry of the simulated disk. Fixed for the lifetime of a `FileSystem`.
#[derive(Serialize, Debug, Clone, Copy, PartialEq, Eq)]
pub struct FsConfig {
    pub total_blocks: usize,
    pub block_size: usize,
    pub max_name_len: usize,
}

impl Default for FsConfig {
    fn default() -> Self {
        FsConfig {
            total_blocks: NUM_BLOCKS,
            block_size: BLOCK_SIZE,
            max_name_len: MAX_NAME_LEN,
        }
    }
}

impl FsConfig {
    pub fn validate(&self) -> Result<()> {
        if self.total_blocks == 0 {
            return Err(FsError::InvalidConfig("block count must be non-zero".into()));
        }
        if self.block_size == 0 {
            return Err(FsError::InvalidConfig("block size must be non-zero".into()));
        }
        if self.max_name_len == 0 {
            return Err(FsError::InvalidConfig("name length bound must be non-zero".into()));
        }
        if self.total_blocks.checked_mul(self.block_size).is_none() {
            return Err(FsError::InvalidConfig("disk size overflows".into()));
        }
        Ok(())
    }

    /// Number of blocks needed to hold `len` bytes.
    pub fn blocks_for(&self, len: usize) -> usize {
        (len + self.block_size - 1) / self.block_size
    }
}

/// Handle of a node in the namespace arena. Stable for the node's lifetime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(pub(crate) usize);

#[derive(Serialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum NodeKind {
    Directory,
    File,
}

/// File payload: the ordered block indices and the logical byte length.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FileData {
    pub block_pointers: Vec<usize>,
    pub content_size: usize,
}

impl FileData {
    pub fn num_blocks(&self) -> usize {
        self.block_pointers.len()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeBody {
    /// Head of the circular child ring, `None` when empty.
    Directory { first_child: Option<NodeId> },
    File(FileData),
}

/// A file or directory entry in the arena.
#[derive(Debug, Clone)]
pub struct Node {
    pub name: String,
    pub parent: Option<NodeId>,
    pub prev_sibling: Option<NodeId>,
    pub next_sibling: Option<NodeId>,
    pub body: NodeBody,
}

impl Node {
    pub fn new(name: &str, kind: NodeKind) -> Self {
        let body = match kind {
            NodeKind::Directory => NodeBody::Directory { first_child: None },
            NodeKind::File => NodeBody::File(FileData::default()),
        };
        Node {
            name: name.to_string(),
            parent: None,
            prev_sibling: None,
            next_sibling: None,
            body,
        }
    }

    pub fn kind(&self) -> NodeKind {
        match self.body {
            NodeBody::Directory { .. } => NodeKind::Directory,
            NodeBody::File(_) => NodeKind::File,
        }
    }

    pub fn is_dir(&self) -> bool {
        self.kind() == NodeKind::Directory
    }

    pub fn file_data(&self) -> Option<&FileData> {
        match &self.body {
            NodeBody::File(data) => Some(data),
            NodeBody::Directory { .. } => None,
        }
    }
}

/// One line of an `ls` listing.
#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
pub struct DirEntry {
    pub name: String,
    pub kind: NodeKind,
}

impl std::fmt::Display for DirEntry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.kind {
            NodeKind::Directory => write!(f, "{}/", self.name),
            NodeKind::File => write!(f, "{}", self.name),
        }
    }
}

/// Block usage summary reported by `df`.
#[derive(Serialize, Debug, Clone, Copy, PartialEq)]
pub struct DiskUsage {
    pub total_blocks: usize,
    pub used_blocks: usize,
    pub free_blocks: usize,
    pub usage_percent: f64,
}

impl DiskUsage {
    pub fn new(total_blocks: usize, free_blocks: usize) -> Self {
        let used_blocks = total_blocks - free_blocks;
        DiskUsage {
            total_blocks,
            used_blocks,
            free_blocks,
            usage_percent: used_blocks as f64 / total_blocks as f64 * 100.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_matches_constants() {
        let config = FsConfig::default();
        assert_eq!(config.total_blocks, 5000);
        assert_eq!(config.block_size, 512);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn zero_geometry_is_rejected() {
        let config = FsConfig {
            block_size: 0,
            ..FsConfig::default()
        };
        assert!(matches!(config.validate(), Err(FsError::InvalidConfig(_))));
    }

    #[test]
    fn oversized_geometry_is_rejected() {
        let config = FsConfig {
            total_blocks: usize::MAX / 2,
            block_size: 4,
            ..FsConfig::default()
        };
        match config.validate() {
            Err(FsError::InvalidConfig(reason)) => assert_eq!(reason, "disk size overflows"),
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn blocks_for_rounds_up() {
        let config = FsConfig::default();
        assert_eq!(config.blocks_for(0), 0);
        assert_eq!(config.blocks_for(1), 1);
        assert_eq!(config.blocks_for(512), 1);
        assert_eq!(config.blocks_for(513), 2);
    }

    #[test]
    fn directory_entries_are_suffixed() {
        let dir = DirEntry { name: "docs".into(), kind: NodeKind::Directory };
        let file = DirEntry { name: "f1".into(), kind: NodeKind::File };
        assert_eq!(dir.to_string(), "docs/");
        assert_eq!(file.to_string(), "f1");
    }

    #[test]
    fn disk_usage_percent() {
        let usage = DiskUsage::new(200, 150);
        assert_eq!(usage.used_blocks, 50);
        assert!((usage.usage_percent - 25.0).abs() < f64::EPSILON);
    }
}
