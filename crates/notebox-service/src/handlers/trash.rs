use notebox_core::{NodeId, Result};

use super::{with_engine, with_engine_mut};
use crate::body_sync::BodySync;
use crate::protocol::Response;
use crate::state::GlobalState;

/// Handle "remove": move an item and its subtree to the trash
pub async fn handle_remove(
    state: &GlobalState,
    body: &BodySync,
    id: NodeId,
    parent_id: NodeId,
) -> Result<Response> {
    with_engine_mut(state, body, move |engine| {
        engine.remove(&id, &parent_id).map(|plan| ((), plan))
    })
    .await?;
    Ok(Response::Ok)
}

pub async fn handle_restore_from_trash(
    state: &GlobalState,
    body: &BodySync,
    id: NodeId,
    destination_dir_id: NodeId,
) -> Result<Response> {
    with_engine_mut(state, body, move |engine| {
        engine
            .restore_from_trash(&id, &destination_dir_id)
            .map(|plan| ((), plan))
    })
    .await?;
    Ok(Response::Ok)
}

/// Handle "deleteFromTrash": purge for good, bodies included
pub async fn handle_delete_from_trash(
    state: &GlobalState,
    body: &BodySync,
    id: NodeId,
) -> Result<Response> {
    with_engine_mut(state, body, move |engine| {
        engine.delete_from_trash(&id).map(|plan| ((), plan))
    })
    .await?;
    Ok(Response::Ok)
}

pub async fn handle_trash_tree(state: &GlobalState) -> Result<Response> {
    let tree = with_engine(state, |engine| engine.trash_tree()).await?;
    Ok(Response::Trash { tree })
}

pub async fn handle_destinations(state: &GlobalState, id: NodeId) -> Result<Response> {
    let destinations = with_engine(state, |engine| engine.destinations(&id)).await?;
    Ok(Response::Destinations { destinations })
}
