//! Notebox Core Library
//!
//! Hierarchical note/trash store, line-indexed search and the contracts
//! the store keeps with on-disk markdown bodies and persisted snapshots.
//!

pub mod config;
pub mod error;
pub mod matcher;
pub mod model;
pub mod persistence;
pub mod search;
pub mod trash;
pub mod tree;
pub mod utils;
pub mod vfs;
pub mod workspace;

pub use config::NoteboxConfig;
pub use error::{Error, Result};
pub use matcher::Matcher;
pub use model::{Node, NodeId, NodeKind, SearchHit, SearchResult, TrashEntry, ROOT_ID};
pub use trash::{TrashIndex, TrashTree};
pub use tree::NoteTree;
pub use workspace::{BodyOp, BodyPlan, NoteboxEngine, Notebook, Selection};
