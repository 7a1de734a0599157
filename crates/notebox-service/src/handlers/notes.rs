use notebox_core::{BodyPlan, NodeId, Result};

use super::{with_engine, with_engine_mut};
use crate::body_sync::BodySync;
use crate::protocol::Response;
use crate::state::GlobalState;

pub async fn handle_add_directory(state: &GlobalState, body: &BodySync) -> Result<Response> {
    let id = with_engine_mut(state, body, |engine| engine.add_directory()).await?;
    Ok(Response::Created { id })
}

/// Handle "addNote"; the empty body is written in the background
pub async fn handle_add_note(state: &GlobalState, body: &BodySync) -> Result<Response> {
    let id = with_engine_mut(state, body, |engine| engine.add_note()).await?;
    Ok(Response::Created { id })
}

pub async fn handle_rename(
    state: &GlobalState,
    body: &BodySync,
    id: NodeId,
    title: String,
) -> Result<Response> {
    with_engine_mut(state, body, move |engine| {
        engine.rename(&id, &title).map(|_| ((), BodyPlan::default()))
    })
    .await?;
    Ok(Response::Ok)
}

pub async fn handle_cancel_new_item_rename(
    state: &GlobalState,
    body: &BodySync,
) -> Result<Response> {
    with_engine_mut(state, body, |engine| {
        engine
            .cancel_new_item_rename()
            .map(|_| ((), BodyPlan::default()))
    })
    .await?;
    Ok(Response::Ok)
}

pub async fn handle_toggle_favorite(
    state: &GlobalState,
    body: &BodySync,
    id: NodeId,
) -> Result<Response> {
    let favorite = with_engine_mut(state, body, move |engine| {
        engine
            .toggle_favorite(&id)
            .map(|favorite| (favorite, BodyPlan::default()))
    })
    .await?;
    Ok(Response::Favorite { favorite })
}

/// Handle "select"; a newly opened note arrives later as `bodyLoaded`
pub async fn handle_select(
    state: &GlobalState,
    body: &BodySync,
    note_id: Option<NodeId>,
    dir_id: Option<NodeId>,
    line_num: Option<usize>,
) -> Result<Response> {
    with_engine_mut(state, body, move |engine| {
        engine
            .select(note_id.as_ref(), dir_id.as_ref(), line_num)
            .map(|plan| ((), plan))
    })
    .await?;
    Ok(Response::Ok)
}

pub async fn handle_save_body(
    state: &GlobalState,
    body: &BodySync,
    content: String,
) -> Result<Response> {
    let reordered = with_engine_mut(state, body, move |engine| engine.save_body(&content)).await?;
    Ok(Response::Saved { reordered })
}

/// Handle "snapshot": the live tree, the selection and the favorites list
pub async fn handle_snapshot(state: &GlobalState) -> Result<Response> {
    with_engine(state, |engine| {
        let notebook = engine.notebook()?;
        Ok(Response::Snapshot {
            nodes: notebook.tree().nodes().clone(),
            selection: notebook.selection().clone(),
            favorites: notebook.favorites(),
        })
    })
    .await
}
