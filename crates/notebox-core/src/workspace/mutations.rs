use crate::error::{Error, Result};
use crate::model::NodeId;

use super::{BodyOp, BodyPlan, Dirty, Notebook, Outcome};

/// Tree edits driven by user intent.
/// Each returns the body I/O it implies; nothing here touches the disk.
impl Notebook {
    /// Add a directory to the selected directory and select it.
    pub fn add_directory(&mut self, title: &str) -> Result<Outcome<NodeId>> {
        let parent = self.selection.dir_id.clone();
        let id = self.tree.add_directory(&parent, title)?;
        log::debug!("Added directory {} under {}", id, parent);

        self.selection.dir_id = id.clone();
        self.selection.created_id = Some(id.clone());
        self.refresh_selection();

        Ok(Outcome::new(id, BodyPlan::default(), Dirty::TREE))
    }

    /// Add a note to the selected directory and select it.
    ///
    /// The selected directory must not be root. An empty body is written
    /// right away so the note shows up in search candidates.
    pub fn add_note(&mut self, title: &str) -> Result<Outcome<NodeId>> {
        let parent = self.selection.dir_id.clone();
        let id = self.tree.add_note(&parent, title)?;
        log::debug!("Added note {} under {}", id, parent);

        self.selection.note_id = Some(id.clone());
        self.selection.created_id = Some(id.clone());
        self.refresh_selection();

        let mut plan = BodyPlan::default();
        plan.push(BodyOp::Save {
            id: id.clone(),
            content: String::new(),
        });

        Ok(Outcome::new(id, plan, Dirty::TREE))
    }

    pub fn rename(&mut self, id: &NodeId, title: &str) -> Result<Outcome<()>> {
        self.tree.rename(id, title)?;
        self.selection.created_id = None;
        Ok(Outcome::new((), BodyPlan::default(), Dirty::TREE))
    }

    /// Leave the freshly added item with its default title.
    pub fn cancel_new_item_rename(&mut self) {
        self.selection.created_id = None;
    }

    pub fn toggle_favorite(&mut self, id: &NodeId) -> Result<Outcome<bool>> {
        let favorite = self.tree.toggle_favorite(id)?;
        Ok(Outcome::new(favorite, BodyPlan::default(), Dirty::TREE))
    }

    /// Save the selected note's body and bubble it to the front of every
    /// ancestor directory.
    ///
    /// The value reports whether the tree was reordered; only then does the
    /// tree snapshot need rewriting.
    pub fn save_body(&mut self, content: &str) -> Result<Outcome<bool>> {
        let note_id = self.selection.note_id.clone().ok_or(Error::NoSelection)?;
        let chain = match &self.selection.parent_ids {
            Some(chain) => chain.clone(),
            None => self
                .tree
                .ancestors_of(&note_id)
                .ok_or_else(|| Error::NotFound(note_id.clone()))?,
        };

        let reordered = self.tree.sort_by_recency(&note_id, &chain)?;

        let mut plan = BodyPlan::default();
        plan.push(BodyOp::Save {
            id: note_id,
            content: content.to_string(),
        });
        let dirty = if reordered { Dirty::TREE } else { Dirty::NONE };

        Ok(Outcome::new(reordered, plan, dirty))
    }
}
