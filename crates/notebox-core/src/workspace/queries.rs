use crate::error::Result;
use crate::model::{Node, NodeId};
use crate::trash::{destination_options, Destinations, TrashIndex, TrashTree};
use crate::tree::NoteTree;

use super::{Notebook, Selection};

/// Read-only access. Callers query the notebook directly; only mutations
/// go through the engine.
impl Notebook {
    pub fn tree(&self) -> &NoteTree {
        &self.tree
    }

    pub fn trash(&self) -> &TrashIndex {
        &self.trash
    }

    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    pub fn node(&self, id: &NodeId) -> Option<&Node> {
        self.tree.get(id)
    }

    pub fn trash_tree(&self) -> TrashTree {
        self.trash.build_view()
    }

    /// Restore targets for a trashed item, relative to the selected directory
    pub fn destinations(&self, entry_id: &NodeId) -> Result<Destinations> {
        destination_options(&self.trash, &self.tree, &self.selection.dir_id, entry_id)
    }

    pub fn favorites(&self) -> Vec<(NodeId, String)> {
        self.tree
            .favorites()
            .into_iter()
            .filter_map(|id| {
                let title = self.tree.get(&id)?.title.clone();
                Some((id, title))
            })
            .collect()
    }

    /// Every ID is live in exactly one of tree and trash
    pub fn check_integrity(&self) -> std::result::Result<(), String> {
        self.tree.check_integrity()?;

        if let Some(id) = self.trash.iter().map(|e| &e.id).find(|id| self.tree.contains(id)) {
            return Err(format!("{} is both live and trashed", id));
        }
        for entry in self.trash.iter() {
            if let Some(child) = entry
                .node
                .child_ids()
                .iter()
                .find(|child| !self.trash.contains(child))
            {
                return Err(format!("trashed {} lists missing child {}", entry.id, child));
            }
        }

        if let Some(note_id) = &self.selection.note_id {
            if self.tree.ancestors_of(note_id) != self.selection.parent_ids {
                return Err(format!("stale ancestor chain for {}", note_id));
            }
        } else if self.selection.parent_ids.is_some() {
            return Err("ancestor chain without a selected note".to_string());
        }

        Ok(())
    }
}
