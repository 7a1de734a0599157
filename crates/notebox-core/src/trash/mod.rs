use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::model::{Node, NodeId, NodeKind, TrashEntry};

mod destinations;


pub use destinations::{default_destination, destination_options, DestinationLabel, Destinations, Suggestion};

/// Flat record of every trashed node, keyed by ID.
///
/// Entries keep the order they were trashed in; the view groups siblings in
/// that order. Persisted as a plain list.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Vec<TrashEntry>", into = "Vec<TrashEntry>")]
pub struct TrashIndex {
    entries: HashMap<NodeId, TrashEntry>,
    order: Vec<NodeId>,
}

impl From<Vec<TrashEntry>> for TrashIndex {
    fn from(entries: Vec<TrashEntry>) -> Self {
        let mut index = Self::default();
        index.extend(entries);
        index
    }
}

impl From<TrashIndex> for Vec<TrashEntry> {
    fn from(mut index: TrashIndex) -> Self {
        index
            .order
            .iter()
            .filter_map(|id| index.entries.remove(id))
            .collect()
    }
}

impl TrashIndex {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, entry: TrashEntry) {
        if !self.entries.contains_key(&entry.id) {
            self.order.push(entry.id.clone());
        }
        self.entries.insert(entry.id.clone(), entry);
    }

    pub fn extend(&mut self, entries: impl IntoIterator<Item = TrashEntry>) {
        for entry in entries {
            self.insert(entry);
        }
    }

    pub fn get(&self, id: &NodeId) -> Option<&TrashEntry> {
        self.entries.get(id)
    }

    pub fn contains(&self, id: &NodeId) -> bool {
        self.entries.contains_key(id)
    }

    pub(crate) fn remove(&mut self, id: &NodeId) -> Option<TrashEntry> {
        let entry = self.entries.remove(id)?;
        self.order.retain(|other| other != id);
        Some(entry)
    }

    /// Drop `child` from a trashed directory's snapshot, if that directory is trashed.
    pub(crate) fn unlink_child(&mut self, parent_id: &NodeId, child: &NodeId) {
        if let Some(children) = self
            .entries
            .get_mut(parent_id)
            .and_then(|entry| entry.node.child_ids_mut())
        {
            children.retain(|id| id != child);
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries in the order they were trashed
    pub fn iter(&self) -> impl Iterator<Item = &TrashEntry> {
        self.order.iter().filter_map(|id| self.entries.get(id))
    }

    /// Group entries into a navigable tree.
    ///
    /// An entry hangs under its recorded parent when that parent is trashed
    /// too; otherwise it goes into the top-level bucket. Directory children
    /// come from this grouping, not from the frozen snapshots, so items
    /// trashed before their directory reappear under it.
    pub fn build_view(&self) -> TrashTree {
        let mut view = TrashTree::default();

        for entry in self.iter() {
            if let Some(parent) = view.nodes.get_mut(&entry.parent_id) {
                if let Some(children) = parent.child_ids_mut() {
                    children.push(entry.id.clone());
                }
            } else if let Some(parent_entry) = self.entries.get(&entry.parent_id) {
                view.nodes.insert(
                    entry.parent_id.clone(),
                    Node {
                        title: parent_entry.node.title.clone(),
                        kind: NodeKind::Directory {
                            child_ids: vec![entry.id.clone()],
                        },
                    },
                );
            } else {
                view.roots.push(entry.id.clone());
            }

            view.nodes
                .entry(entry.id.clone())
                .or_insert_with(|| view_node(&entry.node));
        }

        view
    }
}

fn view_node(node: &Node) -> Node {
    let kind = match node.kind {
        NodeKind::Directory { .. } => NodeKind::Directory {
            child_ids: Vec::new(),
        },
        NodeKind::Note { favorite } => NodeKind::Note { favorite },
    };
    Node {
        title: node.title.clone(),
        kind,
    }
}

/// Navigable view over the trash, rebuilt on demand from [`TrashIndex`]
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrashTree {
    pub roots: Vec<NodeId>,
    pub nodes: HashMap<NodeId, Node>,
}

impl TrashTree {
    pub fn get(&self, id: &NodeId) -> Option<&Node> {
        self.nodes.get(id)
    }

    /// `id` and everything grouped under it, parents first
    pub fn subtree(&self, id: &NodeId) -> Vec<NodeId> {
        let mut ids = Vec::new();
        let mut stack = vec![id.clone()];

        while let Some(current) = stack.pop() {
            let Some(node) = self.nodes.get(&current) else {
                continue;
            };
            stack.extend(node.child_ids().iter().rev().cloned());
            ids.push(current);
        }

        ids
    }
}
