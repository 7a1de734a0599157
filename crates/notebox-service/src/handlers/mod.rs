mod lifecycle;
mod notes;
mod search;
mod trash;

pub use lifecycle::*;
pub use notes::*;
pub use search::*;
pub use trash::*;

use std::sync::Arc;

use notebox_core::{BodyPlan, Error, NoteboxEngine, Result};
use tokio::task::JoinError;

use crate::body_sync::BodySync;
use crate::protocol::Notification;
use crate::state::GlobalState;

/// Run a command on the blocking pool under the exclusive engine lock.
///
/// Snapshot writes happen inside the command, so they stay off the async
/// workers. The body plan is queued once the lock is released, and a
/// snapshot write failure is reported without failing the command.
async fn with_engine_mut<T, F>(state: &GlobalState, body: &BodySync, f: F) -> Result<T>
where
    T: Send + 'static,
    F: FnOnce(&mut NoteboxEngine) -> Result<(T, BodyPlan)> + Send + 'static,
{
    let mut guard = Arc::clone(&state.engine).write_owned().await;
    let (result, fs, persist_error) = tokio::task::spawn_blocking(move || {
        let engine = guard.as_mut().ok_or(Error::NotInitialized)?;
        let result = f(engine);
        Ok::<_, Error>((result, engine.fs(), engine.take_persist_error()))
    })
    .await
    .map_err(join_error)??;

    if let Some(e) = persist_error {
        body.report(Notification::SnapshotFailed {
            message: e.to_string(),
        });
    }
    let (value, plan) = result?;
    body.dispatch(fs, plan);
    Ok(value)
}

async fn with_engine<T>(
    state: &GlobalState,
    f: impl FnOnce(&NoteboxEngine) -> Result<T>,
) -> Result<T> {
    let guard = state.engine.read().await;
    let engine = guard.as_ref().ok_or(Error::NotInitialized)?;
    f(engine)
}

fn join_error(e: JoinError) -> Error {
    Error::Io(std::io::Error::other(e))
}
