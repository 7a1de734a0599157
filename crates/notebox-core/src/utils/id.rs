use crate::model::NodeId;

/// Generate a unique ID for a note or directory.
///
/// Returns a hyphenated UUID v4 string. IDs are never reused, so a
/// trashed node keeps its ID across restore.
pub fn generate_id() -> NodeId {
    NodeId(uuid::Uuid::new_v4().to_string())
}
