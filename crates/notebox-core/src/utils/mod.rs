pub mod id;

use std::path::Path;

use crate::model::NodeId;

/// Derive a node ID from a body file path.
///
/// Strips the directory part and the given extension.
///
/// # Examples
///
/// ```
/// use std::path::Path;
/// use notebox_core::utils::note_id_from_path;
///
/// assert_eq!(note_id_from_path(Path::new("notes/abc.md"), "md").unwrap().as_str(), "abc");
/// assert!(note_id_from_path(Path::new("notes/abc.txt"), "md").is_none());
/// ```
pub fn note_id_from_path(path: &Path, extension: &str) -> Option<NodeId> {
    if path.extension()? != extension {
        return None;
    }
    let stem = path.file_stem()?.to_string_lossy();
    Some(NodeId(stem.to_string()))
}

/// File name of a note body: `<id>.<extension>`
pub fn body_file_name(id: &NodeId, extension: &str) -> String {
    format!("{}.{}", id, extension)
}

/// Whether a search query has nothing to look for
pub fn is_blank_query(query: &str) -> bool {
    query.trim().is_empty()
}
