use std::path::PathBuf;
use std::sync::Arc;

use notebox_core::persistence::Persistence;
use notebox_core::vfs::PhysicalFileStore;
use notebox_core::{NoteboxConfig, NoteboxEngine, Result};

use super::join_error;
use crate::protocol::Response;
use crate::state::GlobalState;

fn build_engine(config: NoteboxConfig) -> NoteboxEngine {
    let fs = Arc::new(PhysicalFileStore::new(&config.storage));
    let persistence = Persistence::on_disk(&config.storage.snapshot_dir());
    NoteboxEngine::new(config, fs, persistence)
}

/// Handle "open": restore the persisted notebook, if any
pub async fn handle_open(state: &GlobalState) -> Result<Response> {
    let config = state.config.read().await.clone();
    log::info!("Opening notebook at {:?}", config.storage.notes_dir);

    let (engine, initialized) = tokio::task::spawn_blocking(move || {
        let mut engine = build_engine(config);
        engine.open().map(|initialized| (engine, initialized))
    })
    .await
    .map_err(join_error)??;

    if !initialized {
        log::info!("No persisted notebook found; waiting for createRoot");
    }
    *state.engine.write().await = Some(engine);

    Ok(Response::Opened { initialized })
}

/// Handle "createRoot": start an empty notebook stored under `location`
pub async fn handle_create_root(state: &GlobalState, location: PathBuf) -> Result<Response> {
    let config = {
        let mut config = state.config.write().await;
        config.storage.notes_dir = location.clone();
        config.clone()
    };

    let engine = tokio::task::spawn_blocking(move || {
        let mut engine = build_engine(config);
        engine.create_root(&location).map(|_| engine)
    })
    .await
    .map_err(join_error)??;

    *state.engine.write().await = Some(engine);

    Ok(Response::Ok)
}
