use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::model::{Node, NodeId};
use crate::trash::TrashIndex;

pub const NOTES_KEY: &str = "notes";
pub const TRASH_KEY: &str = "trash";
pub const STORAGE_KEY: &str = "storage";

/// Durable key/value blob storage for tree snapshots.
pub trait SnapshotStore: Send + Sync {
    fn get(&self, key: &str) -> std::io::Result<Option<Vec<u8>>>;
    fn put(&self, key: &str, bytes: &[u8]) -> std::io::Result<()>;
}

/// One file per key inside a state directory.
pub struct FileSnapshotStore {
    dir: PathBuf,
}

impl FileSnapshotStore {
    pub fn new(dir: PathBuf) -> Self {
        Self { dir }
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{}.bin", key))
    }
}

impl SnapshotStore for FileSnapshotStore {
    fn get(&self, key: &str) -> std::io::Result<Option<Vec<u8>>> {
        match std::fs::read(self.path_for(key)) {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e),
        }
    }

    fn put(&self, key: &str, bytes: &[u8]) -> std::io::Result<()> {
        std::fs::create_dir_all(&self.dir)?;
        // Write-then-rename so a crash never leaves a torn blob
        let tmp = self.dir.join(format!("{}.bin.tmp", key));
        std::fs::write(&tmp, bytes)?;
        std::fs::rename(tmp, self.path_for(key))
    }
}

/// In-memory store, for tests and ephemeral sessions.
#[derive(Default)]
pub struct MemorySnapshotStore {
    blobs: Mutex<HashMap<String, Vec<u8>>>,
}

impl MemorySnapshotStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl SnapshotStore for MemorySnapshotStore {
    fn get(&self, key: &str) -> std::io::Result<Option<Vec<u8>>> {
        let blobs = self
            .blobs
            .lock()
            .map_err(|_| std::io::Error::other("snapshot store poisoned"))?;
        Ok(blobs.get(key).cloned())
    }

    fn put(&self, key: &str, bytes: &[u8]) -> std::io::Result<()> {
        let mut blobs = self
            .blobs
            .lock()
            .map_err(|_| std::io::Error::other("snapshot store poisoned"))?;
        blobs.insert(key.to_string(), bytes.to_vec());
        Ok(())
    }
}

#[derive(Serialize, Deserialize)]
struct Envelope<T> {
    version: u32,
    payload: T,
}

/// Whole-state snapshot restored at startup
pub struct PersistentState {
    pub nodes: HashMap<NodeId, Node>,
    pub trash: TrashIndex,
    pub storage: Option<PathBuf>,
}

/// Writes the tree and trash mappings wholesale on every mutation.
pub struct Persistence {
    store: Box<dyn SnapshotStore>,
}

impl Persistence {
    pub const CURRENT_VERSION: u32 = 1;

    pub fn new(store: Box<dyn SnapshotStore>) -> Self {
        Self { store }
    }

    pub fn in_memory() -> Self {
        Self::new(Box::new(MemorySnapshotStore::new()))
    }

    pub fn on_disk(dir: &Path) -> Self {
        Self::new(Box::new(FileSnapshotStore::new(dir.to_path_buf())))
    }

    pub fn store_nodes(&self, nodes: &HashMap<NodeId, Node>) -> Result<()> {
        self.put(NOTES_KEY, nodes)
    }

    pub fn store_trash(&self, trash: &TrashIndex) -> Result<()> {
        self.put(TRASH_KEY, trash)
    }

    pub fn store_storage_location(&self, location: &Path) -> Result<()> {
        self.put(STORAGE_KEY, &location.to_path_buf())
    }

    /// Returns `None` when nothing has been persisted yet (first run).
    pub fn load(&self) -> Result<Option<PersistentState>> {
        let Some(nodes) = self.get::<HashMap<NodeId, Node>>(NOTES_KEY)? else {
            return Ok(None);
        };
        let trash = self.get::<TrashIndex>(TRASH_KEY)?.unwrap_or_default();
        let storage = self.get::<PathBuf>(STORAGE_KEY)?;

        Ok(Some(PersistentState {
            nodes,
            trash,
            storage,
        }))
    }

    fn put<T: Serialize>(&self, key: &str, payload: &T) -> Result<()> {
        let envelope = Envelope {
            version: Self::CURRENT_VERSION,
            payload,
        };
        let buffer = bincode::serialize(&envelope)?;
        self.store.put(key, &buffer)?;
        Ok(())
    }

    fn get<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>> {
        let Some(buffer) = self.store.get(key)? else {
            return Ok(None);
        };

        let version: u32 = bincode::deserialize(&buffer)?;
        if version != Self::CURRENT_VERSION {
            return Err(Error::IncompatibleSnapshot {
                found: version,
                expected: Self::CURRENT_VERSION,
            });
        }

        let envelope: Envelope<T> = bincode::deserialize(&buffer)?;
        Ok(Some(envelope.payload))
    }
}
