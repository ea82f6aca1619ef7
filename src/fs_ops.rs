// Core logic for the filesystem operations.

use std::collections::HashSet;

use log::{debug, info};

use crate::block_store::BlockStore;
use crate::content;
use crate::error::{FsError, Result};
use crate::free_list::FreeList;
use crate::fs_structs::{DirEntry, DiskUsage, FsConfig, NodeId, NodeKind};
use crate::namespace::Namespace;

/// Where `cd` ended up.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CdOutcome {
    Moved(String),
    AlreadyAtRoot,
}

/// Result of a successful `write`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WriteReport {
    pub bytes_written: usize,
    pub num_blocks: usize,
    pub content_size: usize,
}

/// FileSystem owns the simulated disk, the free list and the namespace,
/// and tracks the current directory. One instance lives for the whole
/// session; every command is a method on it.
pub struct FileSystem {
    config: FsConfig,
    store: BlockStore,
    free_list: FreeList,
    namespace: Namespace,
    cwd: NodeId,
}

impl FileSystem {
    pub fn new(config: FsConfig) -> Result<Self> {
        config.validate()?;
        let namespace = Namespace::new();
        let cwd = namespace.root();
        info!(
            "initialized disk with {} blocks of {} bytes",
            config.total_blocks, config.block_size
        );
        Ok(FileSystem {
            config,
            store: BlockStore::new(config.total_blocks, config.block_size),
            free_list: FreeList::new(config.total_blocks),
            namespace,
            cwd,
        })
    }

    pub fn config(&self) -> &FsConfig {
        &self.config
    }

    pub fn namespace(&self) -> &Namespace {
        &self.namespace
    }

    pub fn cwd(&self) -> NodeId {
        self.cwd
    }

    pub fn free_block_count(&self) -> usize {
        self.free_list.count()
    }

    /// Shell prompt: `/ > ` at the root, `<dir> > ` elsewhere.
    pub fn prompt(&self) -> String {
        if self.cwd == self.namespace.root() {
            "/ > ".to_string()
        } else {
            format!("{} > ", self.namespace.node(self.cwd).name)
        }
    }

    fn lookup(&self, name: &str) -> Result<NodeId> {
        self.namespace
            .find_child(self.cwd, name)
            .ok_or_else(|| FsError::NotFound(name.to_string()))
    }

    fn lookup_file(&self, name: &str) -> Result<NodeId> {
        let id = self.lookup(name)?;
        if self.namespace.node(id).is_dir() {
            return Err(FsError::IsADirectory(name.to_string()));
        }
        Ok(id)
    }

    pub fn mkdir(&mut self, name: &str) -> Result<NodeId> {
        self.namespace
            .create_child(self.cwd, name, NodeKind::Directory, self.config.max_name_len)
    }

    pub fn create(&mut self, name: &str) -> Result<NodeId> {
        self.namespace
            .create_child(self.cwd, name, NodeKind::File, self.config.max_name_len)
    }

    pub fn ls(&self) -> Vec<DirEntry> {
        self.namespace.list_children(self.cwd)
    }

    pub fn pwd(&self) -> String {
        self.namespace.path(self.cwd)
    }

    /// Changes directory to `/`, `..` or a named child of the cwd.
    pub fn cd(&mut self, target: &str) -> Result<CdOutcome> {
        let next = match target {
            "/" => self.namespace.root(),
            ".." => match self.namespace.parent(self.cwd) {
                Some(parent) => parent,
                None => return Ok(CdOutcome::AlreadyAtRoot),
            },
            name => {
                let id = self.lookup(name)?;
                if !self.namespace.node(id).is_dir() {
                    return Err(FsError::NotADirectory(name.to_string()));
                }
                id
            }
        };
        self.cwd = next;
        Ok(CdOutcome::Moved(self.pwd()))
    }

    /// Appends already-decoded bytes to a file in the cwd.
    pub fn write_bytes(&mut self, name: &str, payload: &[u8]) -> Result<WriteReport> {
        let id = self.lookup_file(name)?;
        let file = self
            .namespace
            .file_data_mut(id)
            .ok_or_else(|| FsError::IsADirectory(name.to_string()))?;
        let bytes_written = content::append(file, payload, &mut self.free_list, &mut self.store)?;
        Ok(WriteReport {
            bytes_written,
            num_blocks: file.num_blocks(),
            content_size: file.content_size,
        })
    }

    /// Appends shell text to a file, decoding backslash escapes first.
    pub fn write(&mut self, name: &str, text: &str) -> Result<WriteReport> {
        let payload = content::unescape(text);
        self.write_bytes(name, &payload)
    }

    pub fn read(&self, name: &str) -> Result<Vec<u8>> {
        let id = self.lookup_file(name)?;
        let file = self
            .namespace
            .file_data(id)
            .ok_or_else(|| FsError::IsADirectory(name.to_string()))?;
        Ok(content::read(file, &self.store))
    }

    /// Removes a file, returning its blocks to the free list first.
    /// Returns the number of blocks released.
    pub fn delete(&mut self, name: &str) -> Result<usize> {
        let id = self.lookup_file(name)?;
        let released = match self.namespace.file_data_mut(id) {
            Some(file) => content::truncate_and_release(file, &mut self.free_list),
            None => 0,
        };
        self.namespace.remove_child(self.cwd, id);
        self.namespace.release_node(id);
        debug!("deleted file '{}', released {} blocks", name, released);
        Ok(released)
    }

    pub fn rmdir(&mut self, name: &str) -> Result<()> {
        let id = self.lookup(name)?;
        if !self.namespace.node(id).is_dir() {
            return Err(FsError::NotADirectory(name.to_string()));
        }
        if self.namespace.has_children(id) {
            return Err(FsError::DirectoryNotEmpty(name.to_string()));
        }
        self.namespace.remove_child(self.cwd, id);
        self.namespace.release_node(id);
        debug!("removed directory '{}'", name);
        Ok(())
    }

    pub fn df(&self) -> DiskUsage {
        DiskUsage::new(self.config.total_blocks, self.free_list.count())
    }

    /// Number of blocks held by a file in the cwd.
    pub fn num_blocks(&self, name: &str) -> Result<usize> {
        let id = self.lookup_file(name)?;
        Ok(self.namespace.file_data(id).map_or(0, |f| f.num_blocks()))
    }

    /// Walks the whole tree and the free list and checks that they agree.
    pub fn check_integrity(&self) -> Result<()> {
        let ns = &self.namespace;
        let mut owned: HashSet<usize> = HashSet::new();
        let mut held = 0;

        for id in ns.post_order(ns.root()) {
            let node = ns.node(id);
            if id != ns.root() && node.parent.is_none() {
                return Err(FsError::Corrupt(format!("'{}' has no parent", node.name)));
            }
            if let Some(file) = node.file_data() {
                let n = file.num_blocks();
                if self.config.blocks_for(file.content_size) != n {
                    return Err(FsError::Corrupt(format!(
                        "'{}' holds {} blocks for {} bytes",
                        node.name, n, file.content_size
                    )));
                }
                for &blocknr in &file.block_pointers {
                    if blocknr >= self.config.total_blocks || !owned.insert(blocknr) {
                        return Err(FsError::Corrupt(format!(
                            "block {} referenced twice or out of range",
                            blocknr
                        )));
                    }
                }
                held += n;
                continue;
            }

            let mut seen = HashSet::new();
            for child in ns.children(id) {
                let c = ns.node(child);
                if c.parent != Some(id) {
                    return Err(FsError::Corrupt(format!("'{}' has a stale parent link", c.name)));
                }
                let linked_back = c
                    .next_sibling
                    .map_or(false, |next| ns.node(next).prev_sibling == Some(child));
                if !linked_back {
                    return Err(FsError::Corrupt(format!("broken sibling ring at '{}'", c.name)));
                }
                if !seen.insert(c.name.as_str()) {
                    return Err(FsError::Corrupt(format!("duplicate sibling '{}'", c.name)));
                }
            }
        }

        for &blocknr in self.free_list.iter() {
            if !owned.insert(blocknr) {
                return Err(FsError::Corrupt(format!("block {} is both free and in use", blocknr)));
            }
        }
        if self.free_list.count() + held != self.config.total_blocks {
            return Err(FsError::Corrupt(format!(
                "{} free + {} held != {} total",
                self.free_list.count(),
                held,
                self.config.total_blocks
            )));
        }
        Ok(())
    }

    /// Releases every file's blocks and drops every node below the root,
    /// children before parents. Leaves an empty filesystem at the root.
    pub fn shutdown(&mut self) {
        let root = self.namespace.root();
        let mut released = 0;
        for id in self.namespace.post_order(root) {
            if id == root {
                continue;
            }
            if let Some(file) = self.namespace.file_data_mut(id) {
                released += content::truncate_and_release(file, &mut self.free_list);
            }
            if let Some(parent) = self.namespace.parent(id) {
                self.namespace.remove_child(parent, id);
            }
            self.namespace.release_node(id);
        }
        self.cwd = root;
        info!(
            "released {} blocks, {} of {} free",
            released,
            self.free_list.count(),
            self.config.total_blocks
        );
    }
}

impl Drop for FileSystem {
    fn drop(&mut self) {
        if self.namespace.len() > 1 {
            self.shutdown();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn small() -> FileSystem {
        FileSystem::new(FsConfig {
            total_blocks: 8,
            block_size: 4,
            max_name_len: 8,
        })
        .unwrap()
    }

    #[test]
    fn cd_rejects_files_and_missing_names() {
        let mut fs = small();
        fs.create("f").unwrap();
        assert!(matches!(fs.cd("f"), Err(FsError::NotADirectory(_))));
        assert!(matches!(fs.cd("nope"), Err(FsError::NotFound(_))));
        assert_eq!(fs.cwd(), fs.namespace().root());
    }

    #[test]
    fn cd_up_at_root_is_signalled() {
        let mut fs = small();
        assert_eq!(fs.cd("..").unwrap(), CdOutcome::AlreadyAtRoot);
    }

    #[test]
    fn prompt_follows_cwd() {
        let mut fs = small();
        assert_eq!(fs.prompt(), "/ > ");
        fs.mkdir("docs").unwrap();
        fs.cd("docs").unwrap();
        assert_eq!(fs.prompt(), "docs > ");
    }

    #[test]
    fn file_ops_reject_directories() {
        let mut fs = small();
        fs.mkdir("d").unwrap();
        assert!(matches!(fs.write("d", "x"), Err(FsError::IsADirectory(_))));
        assert!(matches!(fs.read("d"), Err(FsError::IsADirectory(_))));
        assert!(matches!(fs.delete("d"), Err(FsError::IsADirectory(_))));
    }

    #[test]
    fn rmdir_rejects_files() {
        let mut fs = small();
        fs.create("f").unwrap();
        assert!(matches!(fs.rmdir("f"), Err(FsError::NotADirectory(_))));
        assert!(matches!(fs.rmdir("g"), Err(FsError::NotFound(_))));
    }

    #[test]
    fn shutdown_returns_every_block() {
        let mut fs = small();
        fs.mkdir("d").unwrap();
        fs.cd("d").unwrap();
        fs.create("f").unwrap();
        fs.write("f", "0123456789").unwrap();
        fs.cd("/").unwrap();
        fs.create("g").unwrap();
        fs.write("g", "ab").unwrap();
        assert_eq!(fs.free_block_count(), 4);

        fs.shutdown();
        assert_eq!(fs.free_block_count(), 8);
        assert_eq!(fs.namespace().len(), 1);
        assert!(fs.ls().is_empty());
        fs.check_integrity().unwrap();
    }

    #[test]
    fn invalid_config_is_refused() {
        let err = FileSystem::new(FsConfig {
            total_blocks: 0,
            ..FsConfig::default()
        });
        assert!(matches!(err, Err(FsError::InvalidConfig(_))));
    }
}
