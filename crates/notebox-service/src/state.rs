use std::sync::Arc;
use tokio::sync::RwLock;

use notebox_core::{NoteboxConfig, NoteboxEngine};

/// Global state for the service
/// Must be Send + Sync
#[derive(Clone)]
pub struct GlobalState {
    /// RwLock-protected core engine
    /// Reads (snapshot, trash view, search setup) are concurrent
    /// Mutations are exclusive, so no two tree edits ever interleave
    pub engine: Arc<RwLock<Option<NoteboxEngine>>>,

    pub config: Arc<RwLock<NoteboxConfig>>,
}

impl GlobalState {
    pub fn new(config: NoteboxConfig) -> Self {
        Self {
            engine: Arc::new(RwLock::new(None)),
            config: Arc::new(RwLock::new(config)),
        }
    }
}
