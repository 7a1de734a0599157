use std::collections::HashMap;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use notebox_core::trash::Destinations;
use notebox_core::{Node, NodeId, SearchResult, Selection, TrashTree};

/// Commands accepted from the UI layer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(
    tag = "command",
    rename_all = "camelCase",
    rename_all_fields = "camelCase"
)]
pub enum Request {
    CreateRoot {
        location: PathBuf,
    },
    /// Load persisted state
    Open,
    AddDirectory,
    AddNote,
    Rename {
        id: NodeId,
        title: String,
    },
    CancelNewItemRename,
    ToggleFavorite {
        id: NodeId,
    },
    Remove {
        id: NodeId,
        parent_id: NodeId,
    },
    RestoreFromTrash {
        id: NodeId,
        destination_dir_id: NodeId,
    },
    DeleteFromTrash {
        id: NodeId,
    },
    Select {
        #[serde(default)]
        note_id: Option<NodeId>,
        #[serde(default)]
        dir_id: Option<NodeId>,
        #[serde(default)]
        line_num: Option<usize>,
    },
    SaveBody {
        content: String,
    },
    Search {
        query: String,
    },
    TrashTree,
    Destinations {
        id: NodeId,
    },
    Snapshot,
}

/// A request line: caller-chosen correlation ID plus the command
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Incoming {
    pub request_id: u64,
    #[serde(flatten)]
    pub request: Request,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum Response {
    Ok,
    Opened {
        initialized: bool,
    },
    Created {
        id: NodeId,
    },
    Favorite {
        favorite: bool,
    },
    Saved {
        reordered: bool,
    },
    SearchResults {
        results: Vec<SearchResult>,
    },
    Trash {
        tree: TrashTree,
    },
    Destinations {
        destinations: Destinations,
    },
    Snapshot {
        nodes: HashMap<NodeId, Node>,
        selection: Selection,
        favorites: Vec<(NodeId, String)>,
    },
    /// `structural` errors were rejected before anything changed
    Error {
        kind: String,
        message: String,
        structural: bool,
    },
}

impl From<notebox_core::Error> for Response {
    fn from(err: notebox_core::Error) -> Self {
        Self::Error {
            kind: err.kind().to_string(),
            message: err.to_string(),
            structural: err.is_structural(),
        }
    }
}

/// Unsolicited messages produced by background body I/O
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(
    tag = "notification",
    rename_all = "camelCase",
    rename_all_fields = "camelCase"
)]
pub enum Notification {
    BodyLoaded { id: NodeId, content: String },
    BodyIoFailed { id: NodeId, message: String },
    /// A committed change could not be persisted; it is retried on the next command
    SnapshotFailed { message: String },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResponseEnvelope {
    pub request_id: u64,
    #[serde(flatten)]
    pub response: Response,
}

/// Everything written back to the client
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Outgoing {
    Response(ResponseEnvelope),
    Notification(Notification),
}
