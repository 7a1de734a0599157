use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifier of the root directory. Created once, never trashed.
pub const ROOT_ID: &str = "root";

/// Stable identifier of a note or directory
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeId(pub String);

impl NodeId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn root() -> Self {
        Self(ROOT_ID.to_string())
    }

    pub fn is_root(&self) -> bool {
        self.0 == ROOT_ID
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for NodeId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for NodeId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

/// What a node is: a directory with ordered children, or a leaf note.
///
/// `child_ids` front is the most recently touched entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum NodeKind {
    Directory { child_ids: Vec<NodeId> },
    Note { favorite: bool },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Node {
    pub title: String,
    pub kind: NodeKind,
}

impl Node {
    pub fn directory(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            kind: NodeKind::Directory {
                child_ids: Vec::new(),
            },
        }
    }

    pub fn note(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            kind: NodeKind::Note { favorite: false },
        }
    }

    pub fn is_directory(&self) -> bool {
        matches!(self.kind, NodeKind::Directory { .. })
    }

    pub fn child_ids(&self) -> &[NodeId] {
        match &self.kind {
            NodeKind::Directory { child_ids } => child_ids,
            NodeKind::Note { .. } => &[],
        }
    }

    pub(crate) fn child_ids_mut(&mut self) -> Option<&mut Vec<NodeId>> {
        match &mut self.kind {
            NodeKind::Directory { child_ids } => Some(child_ids),
            NodeKind::Note { .. } => None,
        }
    }

    pub fn is_favorite(&self) -> bool {
        matches!(self.kind, NodeKind::Note { favorite: true })
    }
}

/// Frozen record of a trashed node.
///
/// `parent_id` is the directory the node was detached from; it may no
/// longer exist in the live tree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrashEntry {
    pub id: NodeId,
    pub parent_id: NodeId,
    pub node: Node,
}

/// One matching line of a note body (line numbers are 1-based)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchHit {
    pub text: String,
    pub line_num: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchResult {
    pub id: NodeId,
    pub hits: Vec<SearchHit>,
    pub hits_count: usize,
}
