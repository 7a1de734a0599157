use serde::{Deserialize, Serialize};

use crate::model::NodeId;
use crate::trash::TrashIndex;
use crate::tree::NoteTree;

mod engine;
mod mutations;
mod queries;
mod selection;
mod trash_ops;

#[cfg(test)]
mod tests;

pub use engine::{apply_op, BodyFailure, NoteboxEngine, PlanReport};

/// Which note and directory the user is on.
///
/// `parent_ids` always equals the ancestor chain (root first) of `note_id`,
/// or is `None` when no note is selected.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Selection {
    pub note_id: Option<NodeId>,
    pub dir_id: NodeId,
    pub parent_ids: Option<Vec<NodeId>>,
    /// Line to scroll to after opening a search hit
    pub line_num: Option<usize>,
    /// Freshly added item awaiting its first rename
    pub created_id: Option<NodeId>,
}

impl Default for Selection {
    fn default() -> Self {
        Self {
            note_id: None,
            dir_id: NodeId::root(),
            parent_ids: None,
            line_num: None,
            created_id: None,
        }
    }
}

/// Body I/O requested by a structural change.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "camelCase")]
pub enum BodyOp {
    Load { id: NodeId },
    Save { id: NodeId, content: String },
    /// Move between live and trash areas
    Relocate { id: NodeId, to_trash: bool },
    /// Remove a trashed body
    Erase { id: NodeId },
}

impl BodyOp {
    pub fn id(&self) -> &NodeId {
        match self {
            Self::Load { id }
            | Self::Save { id, .. }
            | Self::Relocate { id, .. }
            | Self::Erase { id } => id,
        }
    }
}

/// Ordered body operations to run once a structural change has committed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BodyPlan {
    pub ops: Vec<BodyOp>,
}

impl BodyPlan {
    pub fn push(&mut self, op: BodyOp) {
        self.ops.push(op);
    }

    pub fn is_empty(&self) -> bool {
        self.ops.is_empty()
    }

    pub fn len(&self) -> usize {
        self.ops.len()
    }
}

impl IntoIterator for BodyPlan {
    type Item = BodyOp;
    type IntoIter = std::vec::IntoIter<BodyOp>;

    fn into_iter(self) -> Self::IntoIter {
        self.ops.into_iter()
    }
}

/// Which snapshots a mutation invalidated
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Dirty {
    pub tree: bool,
    pub trash: bool,
}

impl Dirty {
    pub const NONE: Self = Self {
        tree: false,
        trash: false,
    };
    pub const TREE: Self = Self {
        tree: true,
        trash: false,
    };
    pub const TRASH: Self = Self {
        tree: false,
        trash: true,
    };
    pub const BOTH: Self = Self {
        tree: true,
        trash: true,
    };
}

/// Result of a committed mutation
#[derive(Debug)]
pub struct Outcome<T> {
    pub value: T,
    pub plan: BodyPlan,
    pub dirty: Dirty,
}

impl<T> Outcome<T> {
    pub(crate) fn new(value: T, plan: BodyPlan, dirty: Dirty) -> Self {
        Self { value, plan, dirty }
    }
}

/// The live tree, the trash and the selection, mutated as one unit.
///
/// Every mutation validates first and commits after, so a failed call
/// leaves all three untouched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notebook {
    pub(crate) tree: NoteTree,
    pub(crate) trash: TrashIndex,
    pub(crate) selection: Selection,
}

impl Notebook {
    /// Fresh notebook holding only the root directory
    pub fn new(root_title: impl Into<String>) -> Self {
        Self::from_parts(NoteTree::with_root(root_title), TrashIndex::default())
    }

    pub fn from_parts(tree: NoteTree, trash: TrashIndex) -> Self {
        Self {
            tree,
            trash,
            selection: Selection::default(),
        }
    }
}
