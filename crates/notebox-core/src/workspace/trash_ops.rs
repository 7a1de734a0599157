use crate::error::{Error, Result};
use crate::model::{Node, NodeId, NodeKind, TrashEntry};
use crate::trash::TrashTree;

use super::{BodyOp, BodyPlan, Dirty, Notebook, Outcome};

impl Notebook {
    /// Detach `id` from `parent_id` and move its whole subtree to the trash.
    ///
    /// Every note body in the subtree is relocated to the trash area. A
    /// selected note inside the subtree is deselected; a selected directory
    /// inside it falls back to `parent_id`.
    pub fn move_to_trash(&mut self, id: &NodeId, parent_id: &NodeId) -> Result<Outcome<usize>> {
        let entries = self.tree.detach_subtree(id, parent_id)?;
        let count = entries.len();

        let mut plan = BodyPlan::default();
        for entry in &entries {
            if !entry.node.is_directory() {
                plan.push(BodyOp::Relocate {
                    id: entry.id.clone(),
                    to_trash: true,
                });
            }
            if self.selection.dir_id == entry.id {
                self.selection.dir_id = parent_id.clone();
            }
        }

        self.trash.extend(entries);
        self.refresh_selection();
        log::debug!("Trashed {} ({} node(s))", id, count);

        Ok(Outcome::new(count, plan, Dirty::BOTH))
    }

    /// Restore a trashed item, and everything grouped under it, into
    /// `destination` (appended last).
    pub fn restore_from_trash(&mut self, id: &NodeId, destination: &NodeId) -> Result<Outcome<usize>> {
        let view = self.trash.build_view();
        self.restore_from_snapshot(id, destination, &view)
    }

    /// Restore walking a previously built trash view.
    ///
    /// Directory children come from the view. Fails without changes when
    /// the destination is not a live directory or the view references
    /// items that are no longer trashed.
    pub fn restore_from_snapshot(
        &mut self,
        id: &NodeId,
        destination: &NodeId,
        view: &TrashTree,
    ) -> Result<Outcome<usize>> {
        if !self.tree.is_directory(destination) {
            return Err(Error::InvalidDestination(destination.clone()));
        }
        let ids = self.trashed_subtree(id, view)?;
        let count = ids.len();

        let mut plan = BodyPlan::default();
        for current in &ids {
            let Some(entry) = self.trash.remove(current) else {
                continue;
            };
            let kind = match (&entry.node.kind, view.get(current)) {
                (NodeKind::Directory { .. }, Some(view_node)) => NodeKind::Directory {
                    child_ids: view_node.child_ids().to_vec(),
                },
                (kind, _) => kind.clone(),
            };
            if matches!(kind, NodeKind::Note { .. }) {
                plan.push(BodyOp::Relocate {
                    id: current.clone(),
                    to_trash: false,
                });
            }
            if current == id {
                self.trash.unlink_child(&entry.parent_id, current);
            }
            self.tree.insert_detached(
                current.clone(),
                Node {
                    title: entry.node.title,
                    kind,
                },
            );
        }
        self.tree.append_child(destination, id.clone())?;

        self.refresh_selection();
        log::debug!("Restored {} into {} ({} node(s))", id, destination, count);

        Ok(Outcome::new(count, plan, Dirty::BOTH))
    }

    /// Permanently delete a trashed item and everything grouped under it.
    pub fn permanently_delete(&mut self, id: &NodeId) -> Result<Outcome<usize>> {
        let view = self.trash.build_view();
        self.permanently_delete_from_snapshot(id, &view)
    }

    pub fn permanently_delete_from_snapshot(
        &mut self,
        id: &NodeId,
        view: &TrashTree,
    ) -> Result<Outcome<usize>> {
        let ids = self.trashed_subtree(id, view)?;
        let count = ids.len();

        let mut plan = BodyPlan::default();
        for current in &ids {
            let Some(TrashEntry { parent_id, node, .. }) = self.trash.remove(current) else {
                continue;
            };
            if !node.is_directory() {
                plan.push(BodyOp::Erase { id: current.clone() });
            }
            if current == id {
                self.trash.unlink_child(&parent_id, current);
            }
        }
        log::debug!("Purged {} ({} node(s))", id, count);

        Ok(Outcome::new(count, plan, Dirty::TRASH))
    }

    /// Validate and collect `id` plus its view descendants, all of which must be trashed.
    fn trashed_subtree(&self, id: &NodeId, view: &TrashTree) -> Result<Vec<NodeId>> {
        if !self.trash.contains(id) {
            return Err(Error::NotFound(id.clone()));
        }
        let ids = view.subtree(id);
        if ids.is_empty() {
            return Err(Error::NotFound(id.clone()));
        }
        if let Some(missing) = ids.iter().find(|other| !self.trash.contains(other)) {
            return Err(Error::NotFound(missing.clone()));
        }
        Ok(ids)
    }
}
