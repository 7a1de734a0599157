use std::collections::BTreeSet;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::PathBuf;

use walkdir::WalkDir;

use crate::config::StorageConfig;
use crate::model::NodeId;
use crate::utils::{body_file_name, note_id_from_path};

/// Abstract interface for note body storage.
///
/// Bodies are keyed by note ID and live in one of two areas: live or trash.
pub trait FileStore: Send + Sync {
    /// Read a live note body.
    fn load_body(&self, id: &NodeId) -> std::io::Result<String>;

    /// Open a live note body for line-by-line reading.
    fn open_body(&self, id: &NodeId) -> std::io::Result<Box<dyn BufRead + Send>>;

    /// Write a live note body, creating it if needed.
    fn save_body(&self, id: &NodeId, content: &str) -> std::io::Result<()>;

    /// Move a body between the live and trash areas.
    fn relocate_body(&self, id: &NodeId, to_trash: bool) -> std::io::Result<()>;

    /// Remove a trashed body for good.
    fn erase_body(&self, id: &NodeId) -> std::io::Result<()>;

    /// IDs of every body in the live area.
    fn list_live_note_ids(&self) -> std::io::Result<BTreeSet<NodeId>>;

    /// Create the live and trash areas if missing.
    fn ensure_directories_exist(&self) -> std::io::Result<()>;
}

/// Standard implementation of FileStore using std::fs and walkdir.
///
/// Layout: `<notes_dir>/<notes_subdir>/<id>.<ext>` for live bodies and
/// `<notes_dir>/<trash_subdir>/<id>.<ext>` for trashed ones.
pub struct PhysicalFileStore {
    live_dir: PathBuf,
    trash_dir: PathBuf,
    extension: String,
}

impl PhysicalFileStore {
    pub fn new(storage: &StorageConfig) -> Self {
        Self {
            live_dir: storage.live_dir(),
            trash_dir: storage.trash_dir(),
            extension: storage.extension.clone(),
        }
    }

    fn body_path(&self, id: &NodeId, trash: bool) -> PathBuf {
        let dir = if trash { &self.trash_dir } else { &self.live_dir };
        dir.join(body_file_name(id, &self.extension))
    }
}

impl FileStore for PhysicalFileStore {
    fn load_body(&self, id: &NodeId) -> std::io::Result<String> {
        std::fs::read_to_string(self.body_path(id, false))
    }

    fn open_body(&self, id: &NodeId) -> std::io::Result<Box<dyn BufRead + Send>> {
        let file = File::open(self.body_path(id, false))?;
        Ok(Box::new(BufReader::new(file)))
    }

    fn save_body(&self, id: &NodeId, content: &str) -> std::io::Result<()> {
        std::fs::write(self.body_path(id, false), content)
    }

    fn relocate_body(&self, id: &NodeId, to_trash: bool) -> std::io::Result<()> {
        let from = self.body_path(id, !to_trash);
        let to = self.body_path(id, to_trash);
        std::fs::rename(from, to)
    }

    fn erase_body(&self, id: &NodeId) -> std::io::Result<()> {
        std::fs::remove_file(self.body_path(id, true))
    }

    fn list_live_note_ids(&self) -> std::io::Result<BTreeSet<NodeId>> {
        let mut ids = BTreeSet::new();

        for entry in WalkDir::new(&self.live_dir).min_depth(1).max_depth(1) {
            let entry = entry.map_err(std::io::Error::from)?;
            if !entry.file_type().is_file() {
                continue;
            }
            if let Some(id) = note_id_from_path(entry.path(), &self.extension) {
                ids.insert(id);
            }
        }

        Ok(ids)
    }

    fn ensure_directories_exist(&self) -> std::io::Result<()> {
        for dir in [&self.live_dir, &self.trash_dir] {
            if !dir.is_dir() {
                std::fs::create_dir_all(dir)?;
            } else {
                log::debug!("Using existing dir: {:?}", dir);
            }
        }
        Ok(())
    }
}
