use crate::error::{Error, Result};
use crate::model::NodeId;

use super::{BodyOp, BodyPlan, Dirty, Notebook, Outcome};

impl Notebook {
    /// Select a note and/or a directory.
    ///
    /// Selecting a note makes its parent the selected directory and
    /// requests its body when it was not already open. The ancestor chain
    /// is always recomputed from the tree.
    pub fn select(
        &mut self,
        note_id: Option<&NodeId>,
        dir_id: Option<&NodeId>,
        line_num: Option<usize>,
    ) -> Result<Outcome<()>> {
        let note_chain = match note_id {
            Some(id) => {
                let node = self.tree.get(id).ok_or_else(|| Error::NotFound(id.clone()))?;
                if node.is_directory() {
                    return Err(Error::InvalidTarget(id.clone()));
                }
                let chain = self
                    .tree
                    .ancestors_of(id)
                    .ok_or_else(|| Error::NotFound(id.clone()))?;
                Some((id.clone(), chain))
            }
            None => None,
        };
        if let Some(id) = dir_id {
            if !self.tree.contains(id) {
                return Err(Error::NotFound(id.clone()));
            }
            if !self.tree.is_directory(id) {
                return Err(Error::InvalidTarget(id.clone()));
            }
        }

        let mut plan = BodyPlan::default();

        if let Some((id, chain)) = note_chain {
            if self.selection.note_id.as_ref() != Some(&id) {
                plan.push(BodyOp::Load { id: id.clone() });
            }
            if let Some(parent) = chain.last() {
                self.selection.dir_id = parent.clone();
            }
            self.selection.note_id = Some(id);
            self.selection.parent_ids = Some(chain);
        }
        if let Some(id) = dir_id {
            self.selection.dir_id = id.clone();
        }
        self.selection.line_num = line_num;

        Ok(Outcome::new((), plan, Dirty::NONE))
    }

    /// Recompute the ancestor chain after a structural change.
    ///
    /// Drops the note selection when the note is no longer reachable and
    /// falls back to root when the selected directory is gone.
    pub(crate) fn refresh_selection(&mut self) {
        if let Some(note_id) = &self.selection.note_id {
            match self.tree.ancestors_of(note_id) {
                Some(chain) => self.selection.parent_ids = Some(chain),
                None => {
                    self.selection.note_id = None;
                    self.selection.parent_ids = None;
                }
            }
        } else {
            self.selection.parent_ids = None;
        }

        if !self.tree.is_directory(&self.selection.dir_id) {
            self.selection.dir_id = NodeId::root();
        }
        if let Some(created) = &self.selection.created_id {
            if !self.tree.contains(created) {
                self.selection.created_id = None;
            }
        }
    }
}
