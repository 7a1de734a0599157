use std::collections::{HashMap, HashSet};

use crate::error::{Error, Result};
use crate::model::{Node, NodeId, NodeKind, TrashEntry};
use crate::utils::id::generate_id;

/// Live hierarchy of notes and directories, stored as an arena keyed by ID.
///
/// Every ID reachable from root has exactly one parent; the only way out of
/// the arena is [`NoteTree::detach_subtree`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NoteTree {
    nodes: HashMap<NodeId, Node>,
}

impl NoteTree {
    pub fn with_root(title: impl Into<String>) -> Self {
        let mut nodes = HashMap::new();
        nodes.insert(NodeId::root(), Node::directory(title));
        Self { nodes }
    }

    /// Rebuild from a persisted mapping.
    ///
    /// Fails if root is missing or not a directory, or if the mapping breaks
    /// the single-parent hierarchy (dangling children, cycles, orphans).
    pub fn from_nodes(nodes: HashMap<NodeId, Node>) -> Result<Self> {
        match nodes.get(&NodeId::root()) {
            Some(root) if root.is_directory() => {}
            _ => return Err(Error::NotFound(NodeId::root())),
        }
        let tree = Self { nodes };
        tree.check_integrity().map_err(Error::CorruptSnapshot)?;
        Ok(tree)
    }

    pub fn nodes(&self) -> &HashMap<NodeId, Node> {
        &self.nodes
    }

    pub fn get(&self, id: &NodeId) -> Option<&Node> {
        self.nodes.get(id)
    }

    pub fn contains(&self, id: &NodeId) -> bool {
        self.nodes.contains_key(id)
    }

    pub fn is_directory(&self, id: &NodeId) -> bool {
        self.nodes.get(id).is_some_and(Node::is_directory)
    }

    pub fn root(&self) -> &Node {
        // from_nodes/with_root guarantee root presence
        &self.nodes[&NodeId::root()]
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    fn children_mut(&mut self, dir_id: &NodeId) -> Option<&mut Vec<NodeId>> {
        self.nodes.get_mut(dir_id).and_then(Node::child_ids_mut)
    }

    /// Insert a new directory at the front of `parent_id`.
    pub fn add_directory(&mut self, parent_id: &NodeId, title: impl Into<String>) -> Result<NodeId> {
        self.add_child(parent_id, Node::directory(title))
    }

    /// Insert a new note at the front of `parent_id`.
    ///
    /// Notes must live under a user directory, never directly under root.
    pub fn add_note(&mut self, parent_id: &NodeId, title: impl Into<String>) -> Result<NodeId> {
        if parent_id.is_root() {
            return Err(Error::InvalidParent(parent_id.clone()));
        }
        self.add_child(parent_id, Node::note(title))
    }

    fn add_child(&mut self, parent_id: &NodeId, node: Node) -> Result<NodeId> {
        let id = generate_id();
        let children = self
            .children_mut(parent_id)
            .ok_or_else(|| Error::InvalidParent(parent_id.clone()))?;
        children.insert(0, id.clone());
        self.nodes.insert(id.clone(), node);
        Ok(id)
    }

    pub fn rename(&mut self, id: &NodeId, title: impl Into<String>) -> Result<()> {
        let node = self
            .nodes
            .get_mut(id)
            .ok_or_else(|| Error::NotFound(id.clone()))?;
        node.title = title.into();
        Ok(())
    }

    /// Flip a note's favorite flag and return the new value.
    pub fn toggle_favorite(&mut self, id: &NodeId) -> Result<bool> {
        let node = self
            .nodes
            .get_mut(id)
            .ok_or_else(|| Error::NotFound(id.clone()))?;
        match &mut node.kind {
            NodeKind::Note { favorite } => {
                *favorite = !*favorite;
                Ok(*favorite)
            }
            NodeKind::Directory { .. } => Err(Error::InvalidTarget(id.clone())),
        }
    }

    /// Remove `id` and its whole subtree from the tree.
    ///
    /// Returns one trash entry per removed node, parents before children.
    /// The detached root records `parent_id`; every descendant records its
    /// immediate parent. Nothing changes on error.
    pub fn detach_subtree(&mut self, id: &NodeId, parent_id: &NodeId) -> Result<Vec<TrashEntry>> {
        if id.is_root() {
            return Err(Error::InvalidTarget(id.clone()));
        }
        if !self.contains(id) {
            return Err(Error::NotFound(id.clone()));
        }
        let position = self
            .get(parent_id)
            .filter(|parent| parent.is_directory())
            .and_then(|parent| parent.child_ids().iter().position(|child| child == id))
            .ok_or_else(|| Error::InvalidParent(parent_id.clone()))?;

        if let Some(children) = self.children_mut(parent_id) {
            children.remove(position);
        }

        let mut entries = Vec::new();
        let mut stack = vec![(id.clone(), parent_id.clone())];

        while let Some((current, parent)) = stack.pop() {
            let Some(node) = self.nodes.remove(&current) else {
                continue;
            };
            // Reverse keeps preorder once popped
            for child in node.child_ids().iter().rev() {
                stack.push((child.clone(), current.clone()));
            }
            entries.push(TrashEntry {
                id: current,
                parent_id: parent,
                node,
            });
        }

        log::debug!("Detached {} node(s) under {}", entries.len(), id);
        Ok(entries)
    }

    /// Insert a node without linking it to a parent.
    ///
    /// Callers link the subtree root with [`NoteTree::append_child`] in the same operation.
    pub(crate) fn insert_detached(&mut self, id: NodeId, node: Node) {
        self.nodes.insert(id, node);
    }

    pub(crate) fn append_child(&mut self, dir_id: &NodeId, id: NodeId) -> Result<()> {
        let children = self
            .children_mut(dir_id)
            .ok_or_else(|| Error::InvalidDestination(dir_id.clone()))?;
        children.push(id);
        Ok(())
    }

    /// Bubble the edited note to the front of every directory on its ancestor chain.
    ///
    /// `ancestor_chain` runs from root to the note's parent directory. Returns
    /// whether any directory was reordered.
    pub fn sort_by_recency(&mut self, note_id: &NodeId, ancestor_chain: &[NodeId]) -> Result<bool> {
        let mut moves = Vec::new();

        for (i, dir_id) in ancestor_chain.iter().enumerate() {
            let target = ancestor_chain.get(i + 1).unwrap_or(note_id);
            let dir = self
                .get(dir_id)
                .ok_or_else(|| Error::NotFound(dir_id.clone()))?;
            let position = dir
                .child_ids()
                .iter()
                .position(|child| child == target)
                .ok_or_else(|| Error::InvalidParent(dir_id.clone()))?;
            if position != 0 {
                moves.push((dir_id.clone(), position));
            }
        }

        let reordered = !moves.is_empty();
        for (dir_id, position) in moves {
            if let Some(children) = self.children_mut(&dir_id) {
                let target = children.remove(position);
                children.insert(0, target);
            }
        }

        Ok(reordered)
    }

    pub fn parent_of(&self, id: &NodeId) -> Option<&NodeId> {
        self.nodes
            .iter()
            .find(|(_, node)| node.child_ids().contains(id))
            .map(|(parent_id, _)| parent_id)
    }

    /// Directories from root down to the parent of `id`.
    ///
    /// Empty for root itself, `None` when `id` is not reachable from root.
    pub fn ancestors_of(&self, id: &NodeId) -> Option<Vec<NodeId>> {
        let mut chain = Vec::new();
        let mut current = id.clone();

        while !current.is_root() {
            // A chain longer than the arena means a cycle
            if chain.len() >= self.nodes.len() {
                return None;
            }
            let parent = self.parent_of(&current)?.clone();
            chain.push(parent.clone());
            current = parent;
        }

        chain.reverse();
        Some(chain)
    }

    /// IDs in depth-first order, following `child_ids` order, starting at root.
    pub fn preorder(&self) -> Vec<NodeId> {
        let mut order = Vec::with_capacity(self.nodes.len());
        let mut stack = vec![NodeId::root()];

        while let Some(id) = stack.pop() {
            if let Some(node) = self.nodes.get(&id) {
                stack.extend(node.child_ids().iter().rev().cloned());
            }
            order.push(id);
        }

        order
    }

    /// All live directories except root
    pub fn directories(&self) -> impl Iterator<Item = (&NodeId, &Node)> {
        self.nodes
            .iter()
            .filter(|(id, node)| node.is_directory() && !id.is_root())
    }

    /// Favorite notes in tree order
    pub fn favorites(&self) -> Vec<NodeId> {
        self.preorder()
            .into_iter()
            .filter(|id| self.nodes.get(id).is_some_and(Node::is_favorite))
            .collect()
    }

    /// Check the structural invariants: every child resolves, every node has
    /// exactly one parent (root none), no cycles, nothing unreachable.
    pub fn check_integrity(&self) -> std::result::Result<(), String> {
        let mut seen = HashSet::new();
        let mut stack = vec![NodeId::root()];

        if !self.is_directory(&NodeId::root()) {
            return Err("root is missing or not a directory".to_string());
        }

        while let Some(id) = stack.pop() {
            if !seen.insert(id.clone()) {
                return Err(format!("{} reachable twice", id));
            }
            let node = self
                .nodes
                .get(&id)
                .ok_or_else(|| format!("dangling child {}", id))?;
            stack.extend(node.child_ids().iter().cloned());
        }

        if seen.len() != self.nodes.len() {
            return Err(format!(
                "{} node(s) unreachable from root",
                self.nodes.len() - seen.len()
            ));
        }

        Ok(())
    }
}
