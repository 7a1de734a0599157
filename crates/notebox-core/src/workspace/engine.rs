use std::path::Path;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use super::{BodyOp, BodyPlan, Dirty, Notebook, Outcome};
use crate::config::NoteboxConfig;
use crate::error::{Error, Result};
use crate::matcher::Matcher;
use crate::model::{NodeId, SearchResult};
use crate::persistence::Persistence;
use crate::search::search_note;
use crate::trash::{Destinations, TrashTree};
use crate::tree::NoteTree;
use crate::utils::is_blank_query;
use crate::vfs::FileStore;

/// A body operation that failed after its structural change committed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BodyFailure {
    pub id: NodeId,
    pub message: String,
}

/// What applying a body plan produced
#[derive(Debug, Default)]
pub struct PlanReport {
    pub loaded: Vec<(NodeId, String)>,
    pub failures: Vec<BodyFailure>,
}

/// The NoteboxEngine acts as the high-level Facade for the Notebox Core.
///
/// *   **Commands (Write)**: go through the engine. Each one mutates the
///     notebook, rewrites the affected snapshots and hands back the body
///     plan for the caller to run (now, or later on another thread).
///
/// *   **Queries (Read)**: use [`NoteboxEngine::notebook`] directly.
///
/// A snapshot that fails to persist stays pending and is retried by the
/// next command or [`NoteboxEngine::flush`]. The failure itself is kept
/// for [`NoteboxEngine::take_persist_error`]; the command still succeeds
/// and still hands back its body plan.
pub struct NoteboxEngine {
    config: NoteboxConfig,
    notebook: Option<Notebook>,
    persistence: Persistence,
    fs: Arc<dyn FileStore>,
    pending: Dirty,
    persist_error: Option<Error>,
}

impl NoteboxEngine {
    pub fn new(config: NoteboxConfig, fs: Arc<dyn FileStore>, persistence: Persistence) -> Self {
        Self {
            config,
            notebook: None,
            persistence,
            fs,
            pending: Dirty::NONE,
            persist_error: None,
        }
    }

    pub fn config(&self) -> &NoteboxConfig {
        &self.config
    }

    pub fn fs(&self) -> Arc<dyn FileStore> {
        Arc::clone(&self.fs)
    }

    pub fn notebook(&self) -> Result<&Notebook> {
        self.notebook.as_ref().ok_or(Error::NotInitialized)
    }

    fn notebook_mut(&mut self) -> Result<&mut Notebook> {
        self.notebook.as_mut().ok_or(Error::NotInitialized)
    }

    /// Restore the persisted tree and trash.
    ///
    /// Returns `false` on first run, when nothing has been persisted yet.
    pub fn open(&mut self) -> Result<bool> {
        let Some(state) = self.persistence.load()? else {
            return Ok(false);
        };
        let tree = NoteTree::from_nodes(state.nodes)?;
        log::info!(
            "Loaded {} node(s) and {} trashed item(s)",
            tree.len(),
            state.trash.len()
        );
        self.notebook = Some(Notebook::from_parts(tree, state.trash));
        self.pending = Dirty::NONE;
        self.fs.ensure_directories_exist()?;
        Ok(true)
    }

    /// Initialise the root directory at `location` and persist it.
    pub fn create_root(&mut self, location: &Path) -> Result<()> {
        self.fs.ensure_directories_exist()?;
        let notebook = Notebook::new(self.config.titles.root.as_str());
        self.persistence.store_nodes(notebook.tree.nodes())?;
        self.persistence.store_trash(&notebook.trash)?;
        self.persistence.store_storage_location(location)?;
        self.notebook = Some(notebook);
        self.pending = Dirty::NONE;
        log::info!("Created root at {:?}", location);
        Ok(())
    }

    fn commit<T>(&mut self, outcome: Outcome<T>) -> (T, BodyPlan) {
        self.pending.tree |= outcome.dirty.tree;
        self.pending.trash |= outcome.dirty.trash;

        if let Err(e) = self.flush() {
            log::error!("Failed to persist snapshot: {}", e);
            self.persist_error = Some(e);
        }
        (outcome.value, outcome.plan)
    }

    /// Write every snapshot still pending.
    pub fn flush(&mut self) -> Result<()> {
        let Some(notebook) = self.notebook.as_ref() else {
            return Err(Error::NotInitialized);
        };
        if self.pending.tree {
            self.persistence.store_nodes(notebook.tree.nodes())?;
            self.pending.tree = false;
        }
        if self.pending.trash {
            self.persistence.store_trash(&notebook.trash)?;
            self.pending.trash = false;
        }
        Ok(())
    }

    /// Whether a committed change has not reached the snapshot store yet
    pub fn has_unsaved_changes(&self) -> bool {
        self.pending.tree || self.pending.trash
    }

    /// The most recent persistence failure, if not yet reported
    pub fn take_persist_error(&mut self) -> Option<Error> {
        self.persist_error.take()
    }

    pub fn add_directory(&mut self) -> Result<(NodeId, BodyPlan)> {
        let title = self.config.titles.directory.clone();
        let outcome = self.notebook_mut()?.add_directory(&title)?;
        Ok(self.commit(outcome))
    }

    pub fn add_note(&mut self) -> Result<(NodeId, BodyPlan)> {
        let title = self.config.titles.note.clone();
        let outcome = self.notebook_mut()?.add_note(&title)?;
        Ok(self.commit(outcome))
    }

    pub fn rename(&mut self, id: &NodeId, title: &str) -> Result<()> {
        let outcome = self.notebook_mut()?.rename(id, title)?;
        self.commit(outcome);
        Ok(())
    }

    pub fn cancel_new_item_rename(&mut self) -> Result<()> {
        self.notebook_mut()?.cancel_new_item_rename();
        Ok(())
    }

    pub fn toggle_favorite(&mut self, id: &NodeId) -> Result<bool> {
        let outcome = self.notebook_mut()?.toggle_favorite(id)?;
        Ok(self.commit(outcome).0)
    }

    /// Move to trash; the plan relocates every body in the subtree.
    pub fn remove(&mut self, id: &NodeId, parent_id: &NodeId) -> Result<BodyPlan> {
        let outcome = self.notebook_mut()?.move_to_trash(id, parent_id)?;
        Ok(self.commit(outcome).1)
    }

    pub fn restore_from_trash(&mut self, id: &NodeId, destination: &NodeId) -> Result<BodyPlan> {
        let outcome = self.notebook_mut()?.restore_from_trash(id, destination)?;
        Ok(self.commit(outcome).1)
    }

    /// Permanently delete; the plan erases every trashed body in the subtree.
    pub fn delete_from_trash(&mut self, id: &NodeId) -> Result<BodyPlan> {
        let outcome = self.notebook_mut()?.permanently_delete(id)?;
        Ok(self.commit(outcome).1)
    }

    pub fn select(
        &mut self,
        note_id: Option<&NodeId>,
        dir_id: Option<&NodeId>,
        line_num: Option<usize>,
    ) -> Result<BodyPlan> {
        let outcome = self.notebook_mut()?.select(note_id, dir_id, line_num)?;
        Ok(self.commit(outcome).1)
    }

    /// Save the selected note; returns whether the tree was reordered.
    pub fn save_body(&mut self, content: &str) -> Result<(bool, BodyPlan)> {
        let outcome = self.notebook_mut()?.save_body(content)?;
        Ok(self.commit(outcome))
    }

    pub fn trash_tree(&self) -> Result<TrashTree> {
        Ok(self.notebook()?.trash_tree())
    }

    pub fn destinations(&self, entry_id: &NodeId) -> Result<Destinations> {
        self.notebook()?.destinations(entry_id)
    }

    /// Run a body plan synchronously, in order.
    ///
    /// Failures are collected, never raised: the structural change they
    /// belong to has already committed.
    pub fn apply_plan(&self, plan: BodyPlan) -> PlanReport {
        let mut report = PlanReport::default();

        for op in plan {
            let id = op.id().clone();
            match apply_op(&*self.fs, op) {
                Ok(Some(content)) => report.loaded.push((id, content)),
                Ok(None) => {}
                Err(e) => {
                    log::warn!("Body operation on {} failed: {}", id, e);
                    report.failures.push(BodyFailure {
                        id,
                        message: e.to_string(),
                    });
                }
            }
        }

        report
    }

    /// Scan every live body for `query`, one note at a time.
    ///
    /// A blank query yields nothing without scanning. Notes that cannot be
    /// read are logged and skipped.
    pub fn search(&self, query: &str) -> Result<Vec<SearchResult>> {
        if is_blank_query(query) {
            return Ok(Vec::new());
        }

        let matcher = Matcher::build(query)?;
        let mut results = Vec::new();

        for id in self.fs.list_live_note_ids()? {
            let scanned = self
                .fs
                .open_body(&id)
                .and_then(|reader| search_note(&matcher, id.clone(), reader));
            match scanned {
                Ok(Some(result)) => results.push(result),
                Ok(None) => {}
                Err(e) => log::warn!("Failed to search note {}: {}", id, e),
            }
        }

        Ok(results)
    }
}

/// Perform one body operation. Loads return the body text.
pub fn apply_op(fs: &dyn FileStore, op: BodyOp) -> std::io::Result<Option<String>> {
    match op {
        BodyOp::Load { id } => fs.load_body(&id).map(Some),
        BodyOp::Save { id, content } => fs.save_body(&id, &content).map(|_| None),
        BodyOp::Relocate { id, to_trash } => fs.relocate_body(&id, to_trash).map(|_| None),
        BodyOp::Erase { id } => fs.erase_body(&id).map(|_| None),
    }
}
