//! Notebox Service Library
//!
//! Protocol layer: turns newline-delimited JSON commands into Core calls
//! and runs body I/O and search off the request path.

use notebox_core::NoteboxConfig;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};
use tokio::sync::mpsc::{self, UnboundedReceiver};

use crate::body_sync::{BodySync, BodyWorker};
use crate::protocol::{Incoming, Notification, Outgoing, Request, Response, ResponseEnvelope};
use crate::state::GlobalState;

pub mod body_sync;
pub mod handlers;
pub mod protocol;
pub mod state;


/// Request dispatcher shared by every connection task
pub struct Backend {
    state: GlobalState,
    body: BodySync,
}

impl Backend {
    /// Create the backend and start its body worker.
    ///
    /// Body I/O outcomes arrive on the returned receiver.
    pub fn new(config: NoteboxConfig) -> (Self, UnboundedReceiver<Notification>) {
        let (plan_tx, plan_rx) = mpsc::unbounded_channel();
        let (notify_tx, notify_rx) = mpsc::unbounded_channel();

        tokio::spawn(BodyWorker::new(plan_rx, notify_tx.clone()).start());

        let backend = Self {
            state: GlobalState::new(config),
            body: BodySync::new(plan_tx, notify_tx),
        };
        (backend, notify_rx)
    }

    pub fn state(&self) -> &GlobalState {
        &self.state
    }

    pub async fn handle(&self, request: Request) -> Response {
        let state = &self.state;
        let body = &self.body;

        let result = match request {
            Request::CreateRoot { location } => handlers::handle_create_root(state, location).await,
            Request::Open => handlers::handle_open(state).await,
            Request::AddDirectory => handlers::handle_add_directory(state, body).await,
            Request::AddNote => handlers::handle_add_note(state, body).await,
            Request::Rename { id, title } => handlers::handle_rename(state, body, id, title).await,
            Request::CancelNewItemRename => handlers::handle_cancel_new_item_rename(state, body).await,
            Request::ToggleFavorite { id } => handlers::handle_toggle_favorite(state, body, id).await,
            Request::Remove { id, parent_id } => {
                handlers::handle_remove(state, body, id, parent_id).await
            }
            Request::RestoreFromTrash {
                id,
                destination_dir_id,
            } => handlers::handle_restore_from_trash(state, body, id, destination_dir_id).await,
            Request::DeleteFromTrash { id } => {
                handlers::handle_delete_from_trash(state, body, id).await
            }
            Request::Select {
                note_id,
                dir_id,
                line_num,
            } => handlers::handle_select(state, body, note_id, dir_id, line_num).await,
            Request::SaveBody { content } => handlers::handle_save_body(state, body, content).await,
            Request::Search { query } => handlers::handle_search(state, query).await,
            Request::TrashTree => handlers::handle_trash_tree(state).await,
            Request::Destinations { id } => handlers::handle_destinations(state, id).await,
            Request::Snapshot => handlers::handle_snapshot(state).await,
        };

        result.unwrap_or_else(|e| {
            if e.is_structural() {
                log::debug!("Request rejected: {}", e);
            } else {
                log::warn!("Request failed: {}", e);
            }
            Response::from(e)
        })
    }
}

/// Serve newline-delimited JSON until the reader closes.
///
/// Each line is one [`Incoming`] request, answered in order. Notifications
/// from the body worker are interleaved as they arrive.
pub async fn serve<R, W>(config: NoteboxConfig, reader: R, writer: W) -> std::io::Result<()>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin + Send + 'static,
{
    let (backend, mut notifications) = Backend::new(config);
    let (out_tx, out_rx) = mpsc::unbounded_channel::<Outgoing>();
    let writer_task = tokio::spawn(write_outgoing(writer, out_rx));

    let forward_tx = out_tx.clone();
    tokio::spawn(async move {
        while let Some(notification) = notifications.recv().await {
            if forward_tx.send(Outgoing::Notification(notification)).is_err() {
                break;
            }
        }
    });

    let mut lines = reader.lines();
    while let Some(line) = lines.next_line().await? {
        if line.trim().is_empty() {
            continue;
        }
        let envelope = match serde_json::from_str::<Incoming>(&line) {
            Ok(incoming) => ResponseEnvelope {
                request_id: incoming.request_id,
                response: backend.handle(incoming.request).await,
            },
            Err(e) => {
                log::warn!("Malformed request: {}", e);
                ResponseEnvelope {
                    request_id: 0,
                    response: Response::Error {
                        kind: "malformedRequest".to_string(),
                        message: e.to_string(),
                        structural: false,
                    },
                }
            }
        };
        if out_tx.send(Outgoing::Response(envelope)).is_err() {
            break;
        }
    }

    // Closing the plan queue lets the worker drain, which in turn closes
    // the notification stream and finally the writer.
    drop(backend);
    drop(out_tx);
    log::info!("Input closed, shutting down");
    writer_task.await.map_err(std::io::Error::other)?
}

async fn write_outgoing<W>(mut writer: W, mut outgoing: UnboundedReceiver<Outgoing>) -> std::io::Result<()>
where
    W: AsyncWrite + Unpin,
{
    while let Some(message) = outgoing.recv().await {
        let mut line = serde_json::to_vec(&message)?;
        line.push(b'\n');
        writer.write_all(&line).await?;
        writer.flush().await?;
    }
    Ok(())
}
