use super::*;
use crate::config::NoteboxConfig;
use crate::error::Error;
use crate::model::NodeKind;
use crate::persistence::{MemorySnapshotStore, Persistence, SnapshotStore};
use crate::vfs::{FileStore, PhysicalFileStore};
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tempfile::TempDir;

fn notebook() -> Notebook {
    Notebook::new("Root Folder")
}

/// root
/// └── Projects
///     ├── Draft (note)
///     └── Ideas
///         └── Spark (note)
fn sample() -> (Notebook, NodeId, NodeId, NodeId, NodeId) {
    let mut nb = notebook();
    let projects = nb.add_directory("Projects").unwrap().value;
    let ideas = nb.add_directory("Ideas").unwrap().value;
    let spark = nb.add_note("Spark").unwrap().value;
    nb.select(None, Some(&projects), None).unwrap();
    let draft = nb.add_note("Draft").unwrap().value;
    (nb, projects, ideas, spark, draft)
}

fn titles(nb: &Notebook, dir: &NodeId) -> Vec<String> {
    nb.tree()
        .get(dir)
        .unwrap()
        .child_ids()
        .iter()
        .map(|id| nb.tree().get(id).unwrap().title.clone())
        .collect()
}

#[test]
fn test_add_items_follow_selected_directory() {
    let (nb, projects, ideas, spark, draft) = sample();

    assert_eq!(nb.tree().root().child_ids(), &[projects.clone()]);
    assert_eq!(titles(&nb, &projects), vec!["Draft", "Ideas"]);
    assert_eq!(nb.tree().get(&ideas).unwrap().child_ids(), &[spark]);
    assert_eq!(nb.selection().note_id, Some(draft.clone()));
    assert_eq!(nb.selection().created_id, Some(draft));
    assert_eq!(nb.selection().parent_ids, Some(vec![NodeId::root(), projects]));
    nb.check_integrity().unwrap();
}

#[test]
fn test_add_note_under_root_is_rejected() {
    let mut nb = notebook();
    let err = nb.add_note("N").unwrap_err();
    assert!(matches!(err, Error::InvalidParent(id) if id.is_root()));
    assert_eq!(nb.tree().len(), 1);
}

#[test]
fn test_add_note_requests_empty_body() {
    let mut nb = notebook();
    nb.add_directory("D").unwrap();
    let outcome = nb.add_note("N").unwrap();

    assert_eq!(
        outcome.plan.ops,
        vec![BodyOp::Save {
            id: outcome.value.clone(),
            content: String::new(),
        }]
    );
    assert_eq!(outcome.dirty, Dirty::TREE);
}

#[test]
fn test_rename_clears_created_marker() {
    let (mut nb, _, _, _, draft) = sample();
    nb.rename(&draft, "Final").unwrap();
    assert_eq!(nb.node(&draft).unwrap().title, "Final");
    assert_eq!(nb.selection().created_id, None);
}

#[test]
fn test_trash_then_restore_round_trip() {
    let (mut nb, projects, ideas, spark, draft) = sample();
    let before = nb.tree().clone();

    let outcome = nb.move_to_trash(&projects, &NodeId::root()).unwrap();
    assert_eq!(outcome.value, 4);
    assert_eq!(outcome.dirty, Dirty::BOTH);
    assert_eq!(nb.tree().len(), 1);
    assert_eq!(nb.trash().len(), 4);
    nb.check_integrity().unwrap();

    nb.restore_from_trash(&projects, &NodeId::root()).unwrap();

    assert_eq!(nb.tree(), &before);
    assert!(nb.trash().is_empty());
    assert_eq!(titles(&nb, &projects), vec!["Draft", "Ideas"]);
    assert_eq!(nb.tree().get(&ideas).unwrap().child_ids(), &[spark]);
    assert!(nb.tree().contains(&draft));
    nb.check_integrity().unwrap();
}

#[test]
fn test_trashing_a_directory_snapshots_every_node() {
    let mut nb = notebook();
    let dir = nb.add_directory("D").unwrap().value;
    nb.add_directory("Sub").unwrap();
    nb.add_note("Leaf").unwrap();

    let outcome = nb.move_to_trash(&dir, &NodeId::root()).unwrap();

    assert_eq!(outcome.value, 3);
    assert_eq!(nb.trash().len(), 3);
    assert!(nb.tree().root().child_ids().is_empty());
    for entry in nb.trash().iter() {
        assert!(!nb.tree().contains(&entry.id));
        for child in entry.node.child_ids() {
            assert!(nb.trash().contains(child));
        }
    }
    let relocations: Vec<&BodyOp> = outcome.plan.ops.iter().collect();
    assert_eq!(relocations.len(), 1);
    assert!(matches!(relocations[0], BodyOp::Relocate { to_trash: true, .. }));
}

#[test]
fn test_trash_clears_selection_inside_subtree() {
    let (mut nb, projects, ideas, spark, _draft) = sample();
    nb.select(Some(&spark), None, Some(3)).unwrap();
    assert_eq!(nb.selection().dir_id, ideas);

    nb.move_to_trash(&ideas, &projects).unwrap();

    assert_eq!(nb.selection().note_id, None);
    assert_eq!(nb.selection().parent_ids, None);
    assert_eq!(nb.selection().dir_id, projects);
    nb.check_integrity().unwrap();
}

#[test]
fn test_trash_keeps_selected_note_outside_subtree() {
    let (mut nb, projects, ideas, _spark, draft) = sample();
    nb.select(Some(&draft), None, None).unwrap();

    nb.move_to_trash(&ideas, &projects).unwrap();

    assert_eq!(nb.selection().note_id, Some(draft));
    assert_eq!(
        nb.selection().parent_ids,
        Some(vec![NodeId::root(), projects])
    );
}

#[test]
fn test_trash_with_wrong_parent_changes_nothing() {
    let (mut nb, _projects, ideas, _spark, draft) = sample();
    let before = nb.clone();

    let err = nb.move_to_trash(&draft, &ideas).unwrap_err();

    assert!(matches!(err, Error::InvalidParent(_)));
    assert_eq!(nb, before);
}

#[test]
fn test_restore_to_another_directory() {
    let (mut nb, projects, ideas, spark, _draft) = sample();
    nb.move_to_trash(&spark, &ideas).unwrap();

    let outcome = nb.restore_from_trash(&spark, &projects).unwrap();

    assert_eq!(nb.tree().get(&projects).unwrap().child_ids().last(), Some(&spark));
    assert!(nb.tree().get(&ideas).unwrap().child_ids().is_empty());
    assert_eq!(
        outcome.plan.ops,
        vec![BodyOp::Relocate {
            id: spark,
            to_trash: false,
        }]
    );
    nb.check_integrity().unwrap();
}

#[test]
fn test_restore_to_invalid_destination_changes_nothing() {
    let (mut nb, _projects, ideas, spark, draft) = sample();
    nb.move_to_trash(&spark, &ideas).unwrap();
    let before = nb.clone();

    assert!(matches!(
        nb.restore_from_trash(&spark, &draft).unwrap_err(),
        Error::InvalidDestination(_)
    ));
    assert!(matches!(
        nb.restore_from_trash(&spark, &NodeId::from("gone")).unwrap_err(),
        Error::InvalidDestination(_)
    ));
    assert!(matches!(
        nb.restore_from_trash(&draft, &ideas).unwrap_err(),
        Error::NotFound(_)
    ));
    assert_eq!(nb, before);
}

#[test]
fn test_directory_restore_brings_back_items_trashed_earlier() {
    let (mut nb, projects, ideas, spark, draft) = sample();
    nb.move_to_trash(&draft, &projects).unwrap();
    nb.move_to_trash(&projects, &NodeId::root()).unwrap();

    let view = nb.trash_tree();
    assert_eq!(view.roots, vec![projects.clone()]);

    nb.restore_from_trash(&projects, &NodeId::root()).unwrap();

    assert!(nb.trash().is_empty());
    assert_eq!(
        nb.tree().get(&projects).unwrap().child_ids(),
        &[draft, ideas.clone()]
    );
    assert_eq!(nb.tree().get(&ideas).unwrap().child_ids(), &[spark]);
    nb.check_integrity().unwrap();
}

#[test]
fn test_restoring_nested_item_unlinks_it_from_trashed_parent() {
    let (mut nb, projects, ideas, spark, _draft) = sample();
    nb.move_to_trash(&ideas, &projects).unwrap();

    nb.restore_from_trash(&spark, &projects).unwrap();

    let ideas_entry = nb.trash().get(&ideas).unwrap();
    assert!(ideas_entry.node.child_ids().is_empty());
    assert!(nb.tree().contains(&spark));
    nb.check_integrity().unwrap();
}

#[test]
fn test_permanent_delete_purges_whole_subtree() {
    let (mut nb, projects, _ideas, _spark, _draft) = sample();
    nb.move_to_trash(&projects, &NodeId::root()).unwrap();

    let outcome = nb.permanently_delete(&projects).unwrap();

    assert_eq!(outcome.value, 4);
    assert_eq!(outcome.dirty, Dirty::TRASH);
    assert!(nb.trash().is_empty());
    assert!(nb.trash_tree().roots.is_empty());
    let erased = outcome
        .plan
        .ops
        .iter()
        .filter(|op| matches!(op, BodyOp::Erase { .. }))
        .count();
    assert_eq!(erased, 2);
    nb.check_integrity().unwrap();
}

#[test]
fn test_permanent_delete_with_stale_view_changes_nothing() {
    let (mut nb, projects, ideas, spark, _draft) = sample();
    nb.move_to_trash(&ideas, &projects).unwrap();
    let stale = nb.trash_tree();
    nb.restore_from_trash(&spark, &projects).unwrap();
    let before = nb.clone();

    let err = nb.permanently_delete_from_snapshot(&ideas, &stale).unwrap_err();

    assert!(matches!(err, Error::NotFound(id) if id == spark));
    assert_eq!(nb, before);
}

#[test]
fn test_save_body_bubbles_note_and_is_idempotent() {
    let (mut nb, projects, ideas, spark, _draft) = sample();
    nb.select(None, Some(&NodeId::root()), None).unwrap();
    nb.add_directory("Later").unwrap();
    nb.select(Some(&spark), None, None).unwrap();

    let first = nb.save_body("# Spark").unwrap();
    assert!(first.value);
    assert_eq!(first.dirty, Dirty::TREE);
    assert_eq!(nb.tree().root().child_ids()[0], projects);
    assert_eq!(nb.tree().get(&projects).unwrap().child_ids()[0], ideas);
    assert_eq!(
        first.plan.ops,
        vec![BodyOp::Save {
            id: spark.clone(),
            content: "# Spark".to_string(),
        }]
    );

    let second = nb.save_body("# Spark 2").unwrap();
    assert!(!second.value);
    assert_eq!(second.dirty, Dirty::NONE);
    assert_eq!(second.plan.len(), 1);
}

#[test]
fn test_save_body_without_selection() {
    let mut nb = notebook();
    assert!(matches!(nb.save_body("x").unwrap_err(), Error::NoSelection));
}

#[test]
fn test_select_loads_only_on_change() {
    let (mut nb, projects, _ideas, spark, draft) = sample();

    let first = nb.select(Some(&spark), None, Some(7)).unwrap();
    assert_eq!(first.plan.ops, vec![BodyOp::Load { id: spark.clone() }]);
    assert_eq!(nb.selection().line_num, Some(7));

    let again = nb.select(Some(&spark), None, None).unwrap();
    assert!(again.plan.is_empty());
    assert_eq!(nb.selection().line_num, None);

    nb.select(None, Some(&projects), None).unwrap();
    assert_eq!(nb.selection().dir_id, projects);
    assert_eq!(nb.selection().note_id, Some(spark));
    assert!(matches!(
        nb.select(Some(&projects), None, None).unwrap_err(),
        Error::InvalidTarget(_)
    ));
    assert!(matches!(
        nb.select(None, Some(&draft), None).unwrap_err(),
        Error::InvalidTarget(_)
    ));
    nb.check_integrity().unwrap();
}

#[test]
fn test_favorites_in_tree_order() {
    let (mut nb, _projects, _ideas, spark, draft) = sample();
    nb.toggle_favorite(&spark).unwrap();
    nb.toggle_favorite(&draft).unwrap();

    let favorites: Vec<NodeId> = nb.favorites().into_iter().map(|(id, _)| id).collect();
    assert_eq!(favorites, vec![draft, spark]);
}

#[test]
fn test_favorite_survives_trash_round_trip() {
    let (mut nb, projects, ideas, spark, _draft) = sample();
    nb.toggle_favorite(&spark).unwrap();
    nb.move_to_trash(&ideas, &projects).unwrap();
    nb.restore_from_trash(&ideas, &projects).unwrap();

    assert!(matches!(
        nb.node(&spark).unwrap().kind,
        NodeKind::Note { favorite: true }
    ));
}

#[test]
fn test_every_id_has_one_parent_after_mixed_operations() {
    let (mut nb, projects, ideas, spark, draft) = sample();
    nb.move_to_trash(&draft, &projects).unwrap();
    nb.move_to_trash(&ideas, &projects).unwrap();
    nb.select(None, Some(&NodeId::root()), None).unwrap();
    let other = nb.add_directory("Other").unwrap().value;
    nb.restore_from_trash(&draft, &other).unwrap();
    nb.restore_from_trash(&spark, &other).unwrap();
    nb.permanently_delete(&ideas).unwrap();

    let mut parents: HashMap<NodeId, usize> = HashMap::new();
    for node in nb.tree().nodes().values() {
        for child in node.child_ids() {
            *parents.entry(child.clone()).or_default() += 1;
        }
    }
    assert!(parents.values().all(|count| *count == 1));
    assert!(nb.trash().is_empty());
    nb.check_integrity().unwrap();
}

// ----------------------------------------------------------------------------
// Engine
// ----------------------------------------------------------------------------

fn create_test_engine() -> (NoteboxEngine, TempDir) {
    let temp_dir = TempDir::new().unwrap();
    let config = NoteboxConfig::with_notes_dir(temp_dir.path().to_path_buf());
    let fs = Arc::new(PhysicalFileStore::new(&config.storage));
    let persistence = Persistence::on_disk(&config.storage.snapshot_dir());
    let mut engine = NoteboxEngine::new(config, fs, persistence);
    engine.create_root(temp_dir.path()).unwrap();
    (engine, temp_dir)
}

fn reopen(temp_dir: &TempDir) -> NoteboxEngine {
    let config = NoteboxConfig::with_notes_dir(temp_dir.path().to_path_buf());
    let fs = Arc::new(PhysicalFileStore::new(&config.storage));
    let persistence = Persistence::on_disk(&config.storage.snapshot_dir());
    let mut engine = NoteboxEngine::new(config, fs, persistence);
    assert!(engine.open().unwrap());
    engine
}

#[test]
fn test_engine_requires_initialization() {
    let temp_dir = TempDir::new().unwrap();
    let config = NoteboxConfig::with_notes_dir(temp_dir.path().to_path_buf());
    let fs = Arc::new(PhysicalFileStore::new(&config.storage));
    let mut engine = NoteboxEngine::new(config, fs, Persistence::in_memory());

    assert!(!engine.open().unwrap());
    assert!(matches!(engine.add_directory().unwrap_err(), Error::NotInitialized));
}

#[test]
fn test_engine_persists_every_mutation() {
    let (mut engine, temp_dir) = create_test_engine();
    let (dir, _) = engine.add_directory().unwrap();
    let (note, plan) = engine.add_note().unwrap();
    engine.apply_plan(plan);
    engine.rename(&note, "Groceries").unwrap();
    engine.toggle_favorite(&note).unwrap();

    let reopened = reopen(&temp_dir);
    let nb = reopened.notebook().unwrap();
    assert_eq!(nb.node(&dir).unwrap().title, "New Folder");
    assert_eq!(nb.node(&note).unwrap().title, "Groceries");
    assert!(nb.node(&note).unwrap().is_favorite());
    assert_eq!(nb.tree().root().title, "Root Folder");
}

#[test]
fn test_engine_body_lifecycle() {
    let (mut engine, temp_dir) = create_test_engine();
    let (dir, _) = engine.add_directory().unwrap();
    let (note, plan) = engine.add_note().unwrap();
    assert!(engine.apply_plan(plan).failures.is_empty());

    let (_, plan) = engine.save_body("milk\neggs").unwrap();
    engine.apply_plan(plan);
    assert_eq!(engine.fs().load_body(&note).unwrap(), "milk\neggs");

    let plan = engine.remove(&dir, &NodeId::root()).unwrap();
    assert!(engine.apply_plan(plan).failures.is_empty());
    assert!(temp_dir.path().join("trash").join(format!("{}.md", note)).is_file());
    assert_eq!(reopen(&temp_dir).notebook().unwrap().trash().len(), 2);

    let plan = engine.restore_from_trash(&dir, &NodeId::root()).unwrap();
    engine.apply_plan(plan);
    assert_eq!(engine.fs().load_body(&note).unwrap(), "milk\neggs");

    let plan = engine.remove(&dir, &NodeId::root()).unwrap();
    engine.apply_plan(plan);
    let plan = engine.delete_from_trash(&dir).unwrap();
    assert!(engine.apply_plan(plan).failures.is_empty());
    assert!(!temp_dir.path().join("trash").join(format!("{}.md", note)).exists());
    assert!(reopen(&temp_dir).notebook().unwrap().trash().is_empty());
}

#[test]
fn test_engine_select_loads_body() {
    let (mut engine, _temp_dir) = create_test_engine();
    engine.add_directory().unwrap();
    let (note, plan) = engine.add_note().unwrap();
    engine.apply_plan(plan);
    engine.fs().save_body(&note, "hello").unwrap();

    engine.select(None, Some(&NodeId::root()), None).unwrap();
    engine.add_directory().unwrap();
    let (other, plan) = engine.add_note().unwrap();
    engine.apply_plan(plan);

    let plan = engine.select(Some(&note), None, Some(1)).unwrap();
    let report = engine.apply_plan(plan);
    assert_eq!(report.loaded, vec![(note, "hello".to_string())]);
    assert_ne!(other, NodeId::root());
}

#[test]
fn test_engine_reports_body_failures_without_rollback() {
    let (mut engine, temp_dir) = create_test_engine();
    let (dir, _) = engine.add_directory().unwrap();
    // Body never written: relocation must fail
    let (note, _) = engine.add_note().unwrap();

    let plan = engine.remove(&dir, &NodeId::root()).unwrap();
    let report = engine.apply_plan(plan);

    assert_eq!(report.failures.len(), 1);
    assert_eq!(report.failures[0].id, note);
    let nb = engine.notebook().unwrap();
    assert!(nb.trash().contains(&note));
    assert!(!nb.tree().contains(&dir));
    assert!(reopen(&temp_dir).notebook().unwrap().trash().contains(&dir));
}

#[test]
fn test_engine_search() {
    let (mut engine, _temp_dir) = create_test_engine();
    engine.add_directory().unwrap();
    let (first, plan) = engine.add_note().unwrap();
    engine.apply_plan(plan);
    let (_, plan) = engine.save_body("hello world\nfoo").unwrap();
    engine.apply_plan(plan);
    let (second, plan) = engine.add_note().unwrap();
    engine.apply_plan(plan);
    let (_, plan) = engine.save_body("nothing here").unwrap();
    engine.apply_plan(plan);

    let results = engine.search("hello").unwrap();
    assert_eq!(results.len(), 1);
    assert_eq!(results[0].id, first);
    assert_eq!(results[0].hits[0].line_num, 1);
    assert!(results.iter().all(|r| r.id != second));

    assert!(engine.search("").unwrap().is_empty());
    assert!(engine.search("   ").unwrap().is_empty());
}

#[test]
fn test_engine_search_skips_trashed_notes() {
    let (mut engine, _temp_dir) = create_test_engine();
    let (dir, _) = engine.add_directory().unwrap();
    let (_, plan) = engine.add_note().unwrap();
    engine.apply_plan(plan);
    let (_, plan) = engine.save_body("needle").unwrap();
    engine.apply_plan(plan);

    assert_eq!(engine.search("needle").unwrap().len(), 1);
    let plan = engine.remove(&dir, &NodeId::root()).unwrap();
    engine.apply_plan(plan);
    assert!(engine.search("needle").unwrap().is_empty());
}

#[test]
fn test_engine_destinations() {
    let (mut engine, _temp_dir) = create_test_engine();
    let (dir, _) = engine.add_directory().unwrap();
    let (note, plan) = engine.add_note().unwrap();
    engine.apply_plan(plan);
    let plan = engine.remove(&note, &dir).unwrap();
    engine.apply_plan(plan);

    let destinations = engine.destinations(&note).unwrap();
    assert_eq!(destinations.default, Some(dir.clone()));
    assert_eq!(destinations.suggestions[0].id, dir);
    assert_eq!(engine.trash_tree().unwrap().roots, vec![note]);
}

/// Snapshot store whose writes can be switched off
#[derive(Clone, Default)]
struct FlakyStore {
    blobs: Arc<MemorySnapshotStore>,
    failing: Arc<AtomicBool>,
}

impl SnapshotStore for FlakyStore {
    fn get(&self, key: &str) -> std::io::Result<Option<Vec<u8>>> {
        self.blobs.get(key)
    }

    fn put(&self, key: &str, bytes: &[u8]) -> std::io::Result<()> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(std::io::Error::other("disk full"));
        }
        self.blobs.put(key, bytes)
    }
}

#[test]
fn test_engine_keeps_body_plan_when_snapshot_write_fails() {
    let temp_dir = TempDir::new().unwrap();
    let store = FlakyStore::default();
    let config = NoteboxConfig::with_notes_dir(temp_dir.path().to_path_buf());
    let fs = Arc::new(PhysicalFileStore::new(&config.storage));
    let mut engine = NoteboxEngine::new(config, fs, Persistence::new(Box::new(store.clone())));
    engine.create_root(temp_dir.path()).unwrap();

    let (dir, _) = engine.add_directory().unwrap();
    let (first, plan) = engine.add_note().unwrap();
    engine.apply_plan(plan);
    let (_, plan) = engine.add_note().unwrap();
    engine.apply_plan(plan);
    let plan = engine.select(Some(&first), None, None).unwrap();
    engine.apply_plan(plan);

    store.failing.store(true, Ordering::SeqCst);

    // Reordering save: the tree snapshot fails but the body is still written
    let (reordered, plan) = engine.save_body("needle").unwrap();
    assert!(reordered);
    assert!(matches!(
        plan.ops.as_slice(),
        [BodyOp::Save { id, .. }] if *id == first
    ));
    assert!(matches!(engine.take_persist_error(), Some(Error::Io(_))));
    assert!(engine.apply_plan(plan).failures.is_empty());
    assert_eq!(engine.search("needle").unwrap()[0].id, first);

    let plan = engine.remove(&dir, &NodeId::root()).unwrap();
    assert_eq!(plan.len(), 2);
    assert!(engine.apply_plan(plan).failures.is_empty());
    assert!(engine.search("needle").unwrap().is_empty());
    assert!(temp_dir
        .path()
        .join("trash")
        .join(format!("{}.md", first))
        .is_file());
    assert!(engine.has_unsaved_changes());
    assert!(engine.take_persist_error().is_some());
    assert!(engine.take_persist_error().is_none());

    // Pending snapshots catch up once writes work again
    store.failing.store(false, Ordering::SeqCst);
    engine.flush().unwrap();
    assert!(!engine.has_unsaved_changes());

    let state = Persistence::new(Box::new(store)).load().unwrap().unwrap();
    assert!(state.trash.contains(&dir));
    assert!(state.trash.contains(&first));
    assert!(!state.nodes.contains_key(&first));
}
