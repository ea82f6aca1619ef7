// Hierarchical namespace kept in an arena of nodes addressed by `NodeId`.
//
// Each directory holds the head of a circular, doubly linked ring of its
// children. New children go in front of the head (the logical tail), so
// walking the ring from the head yields insertion order.

use log::debug;

use crate::error::{FsError, Result};
use crate::fs_structs::{DirEntry, FileData, Node, NodeBody, NodeId, NodeKind};

pub struct Namespace {
    slots: Vec<Option<Node>>,
    vacant: Vec<usize>,
    root: NodeId,
}

impl Namespace {
    pub fn new() -> Self {
        Namespace {
            slots: vec![Some(Node::new("/", NodeKind::Directory))],
            vacant: Vec::new(),
            root: NodeId(0),
        }
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    pub fn get(&self, id: NodeId) -> Option<&Node> {
        self.slots.get(id.0).and_then(|slot| slot.as_ref())
    }

    /// Looks up a live node. Handles are only produced by this arena, so a
    /// dangling one is a bookkeeping bug.
    pub fn node(&self, id: NodeId) -> &Node {
        self.get(id)
            .unwrap_or_else(|| panic!("dangling node handle {:?}", id))
    }

    fn node_mut(&mut self, id: NodeId) -> &mut Node {
        self.slots
            .get_mut(id.0)
            .and_then(|slot| slot.as_mut())
            .unwrap_or_else(|| panic!("dangling node handle {:?}", id))
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.node(id).parent
    }

    /// Number of live nodes, root included.
    pub fn len(&self) -> usize {
        self.slots.len() - self.vacant.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn file_data(&self, id: NodeId) -> Option<&FileData> {
        self.node(id).file_data()
    }

    pub fn file_data_mut(&mut self, id: NodeId) -> Option<&mut FileData> {
        match &mut self.node_mut(id).body {
            NodeBody::File(data) => Some(data),
            NodeBody::Directory { .. } => None,
        }
    }

    fn first_child(&self, dir: NodeId) -> Option<NodeId> {
        match self.node(dir).body {
            NodeBody::Directory { first_child } => first_child,
            NodeBody::File(_) => None,
        }
    }

    fn set_first_child(&mut self, dir: NodeId, head: Option<NodeId>) {
        if let NodeBody::Directory { first_child } = &mut self.node_mut(dir).body {
            *first_child = head;
        }
    }

    pub fn has_children(&self, dir: NodeId) -> bool {
        self.first_child(dir).is_some()
    }

    /// Checks a candidate name against the length bound and the reserved names.
    pub fn validate_name(name: &str, max_len: usize) -> Result<()> {
        if name.len() > max_len {
            return Err(FsError::NameTooLong {
                name: name.to_string(),
                max: max_len,
            });
        }
        if name.is_empty() || name == "." || name == ".." || name.contains('/') {
            return Err(FsError::InvalidName(name.to_string()));
        }
        Ok(())
    }

    /// Creates a node and attaches it as the new tail of `parent`'s children.
    /// All checks run before anything is mutated.
    pub fn create_child(
        &mut self,
        parent: NodeId,
        name: &str,
        kind: NodeKind,
        max_name_len: usize,
    ) -> Result<NodeId> {
        if !self.node(parent).is_dir() {
            return Err(FsError::NotADirectory(self.node(parent).name.clone()));
        }
        Self::validate_name(name, max_name_len)?;
        if self.find_child(parent, name).is_some() {
            return Err(FsError::DuplicateName(name.to_string()));
        }

        let node = Node::new(name, kind);
        let id = match self.vacant.pop() {
            Some(slot) => {
                self.slots[slot] = Some(node);
                NodeId(slot)
            }
            None => {
                self.slots.push(Some(node));
                NodeId(self.slots.len() - 1)
            }
        };
        self.insert_child(parent, id);
        debug!("created {:?} '{}' as {:?} under {:?}", kind, name, id, parent);
        Ok(id)
    }

    fn insert_child(&mut self, parent: NodeId, id: NodeId) {
        self.node_mut(id).parent = Some(parent);
        match self.first_child(parent) {
            None => {
                let node = self.node_mut(id);
                node.prev_sibling = Some(id);
                node.next_sibling = Some(id);
                self.set_first_child(parent, Some(id));
            }
            Some(head) => {
                let tail = self.node(head).prev_sibling.unwrap_or(head);
                self.node_mut(tail).next_sibling = Some(id);
                self.node_mut(head).prev_sibling = Some(id);
                let node = self.node_mut(id);
                node.prev_sibling = Some(tail);
                node.next_sibling = Some(head);
            }
        }
    }

    /// Case-sensitive linear scan of `parent`'s children.
    pub fn find_child(&self, parent: NodeId, name: &str) -> Option<NodeId> {
        self.children(parent).find(|&id| self.node(id).name == name)
    }

    /// Unlinks `id` from its sibling ring in O(1). The node stays in the
    /// arena with cleared links until `release_node` drops it. File content
    /// must already have been released by the caller.
    pub fn remove_child(&mut self, parent: NodeId, id: NodeId) {
        let (prev, next) = {
            let node = self.node(id);
            (node.prev_sibling, node.next_sibling)
        };
        match (prev, next) {
            (Some(prev), Some(next)) if next != id => {
                self.node_mut(prev).next_sibling = Some(next);
                self.node_mut(next).prev_sibling = Some(prev);
                if self.first_child(parent) == Some(id) {
                    self.set_first_child(parent, Some(next));
                }
            }
            _ => self.set_first_child(parent, None),
        }

        let node = self.node_mut(id);
        node.prev_sibling = None;
        node.next_sibling = None;
        node.parent = None;
        debug!("detached {:?} from {:?}", id, parent);
    }

    /// Drops a detached node from the arena and hands it back.
    pub fn release_node(&mut self, id: NodeId) -> Option<Node> {
        debug_assert!(id != self.root, "root is never released");
        let node = self.slots.get_mut(id.0)?.take()?;
        self.vacant.push(id.0);
        Some(node)
    }

    pub fn children(&self, dir: NodeId) -> Children<'_> {
        let head = self.first_child(dir);
        Children {
            namespace: self,
            head,
            next: head,
        }
    }

    pub fn list_children(&self, dir: NodeId) -> Vec<DirEntry> {
        self.children(dir)
            .map(|id| {
                let node = self.node(id);
                DirEntry {
                    name: node.name.clone(),
                    kind: node.kind(),
                }
            })
            .collect()
    }

    /// Absolute path of `id`, built by walking parent links up to the root.
    pub fn path(&self, id: NodeId) -> String {
        let mut names = Vec::new();
        let mut cur = id;
        while cur != self.root {
            let node = self.node(cur);
            names.push(node.name.as_str());
            match node.parent {
                Some(parent) => cur = parent,
                None => break,
            }
        }
        if names.is_empty() {
            return "/".to_string();
        }
        names.iter().rev().fold(String::new(), |mut path, name| {
            path.push('/');
            path.push_str(name);
            path
        })
    }

    /// Every live node in post-order below and including `id`.
    pub fn post_order(&self, id: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack = vec![(id, false)];
        while let Some((cur, expanded)) = stack.pop() {
            if expanded {
                out.push(cur);
                continue;
            }
            stack.push((cur, true));
            let kids: Vec<_> = self.children(cur).collect();
            for child in kids.into_iter().rev() {
                stack.push((child, false));
            }
        }
        out
    }
}

impl Default for Namespace {
    fn default() -> Self {
        Self::new()
    }
}

/// Walks a directory's child ring once, starting at the head.
pub struct Children<'a> {
    namespace: &'a Namespace,
    head: Option<NodeId>,
    next: Option<NodeId>,
}

impl<'a> Iterator for Children<'a> {
    type Item = NodeId;

    fn next(&mut self) -> Option<Self::Item> {
        let cur = self.next?;
        self.next = self.namespace.node(cur).next_sibling.filter(|&n| Some(n) != self.head);
        Some(cur)
    }
}
