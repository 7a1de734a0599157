use serde::{Deserialize, Serialize};

use super::TrashIndex;
use crate::error::{Error, Result};
use crate::model::NodeId;
use crate::tree::NoteTree;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum DestinationLabel {
    /// Directory the item was deleted from
    Previous,
    /// Currently selected directory
    Selected,
    Root,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Suggestion {
    pub label: DestinationLabel,
    pub id: NodeId,
    pub title: String,
}

/// Restore targets for one trashed item
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Destinations {
    /// Contextual picks, in Previous, Selected, Root order
    pub suggestions: Vec<Suggestion>,
    /// Remaining live directories as (id, title), sorted by title
    pub directories: Vec<(NodeId, String)>,
    /// Preselected destination, if any
    pub default: Option<NodeId>,
}

/// Compute restore destinations for `entry_id`.
///
/// No directory is offered twice: the general list skips root, the
/// selected directory and the previous parent.
pub fn destination_options(
    trash: &TrashIndex,
    tree: &NoteTree,
    selected_dir: &NodeId,
    entry_id: &NodeId,
) -> Result<Destinations> {
    let entry = trash
        .get(entry_id)
        .ok_or_else(|| Error::NotFound(entry_id.clone()))?;
    let is_directory = entry.node.is_directory();
    let previous = tree
        .is_directory(&entry.parent_id)
        .then(|| entry.parent_id.clone());

    let mut suggestions: Vec<Suggestion> = Vec::new();
    let mut offer = |label: DestinationLabel, id: &NodeId| {
        if suggestions.iter().any(|s| &s.id == id) {
            return;
        }
        if let Some(node) = tree.get(id).filter(|node| node.is_directory()) {
            suggestions.push(Suggestion {
                label,
                id: id.clone(),
                title: node.title.clone(),
            });
        }
    };

    if let Some(previous) = &previous {
        offer(DestinationLabel::Previous, previous);
    }
    if is_directory || !selected_dir.is_root() {
        offer(DestinationLabel::Selected, selected_dir);
    }
    if is_directory {
        offer(DestinationLabel::Root, &NodeId::root());
    }

    let mut directories: Vec<(NodeId, String)> = tree
        .directories()
        .filter(|(id, _)| *id != selected_dir && Some(*id) != previous.as_ref())
        .map(|(id, node)| (id.clone(), node.title.clone()))
        .collect();
    directories.sort_by(|(a_id, a), (b_id, b)| {
        a.to_uppercase()
            .cmp(&b.to_uppercase())
            .then_with(|| a_id.cmp(b_id))
    });

    Ok(Destinations {
        suggestions,
        directories,
        default: default_destination(trash, tree, selected_dir, entry_id),
    })
}

/// Preselected restore target: the previous parent while it exists, else
/// the selected directory. A note never defaults to root.
pub fn default_destination(
    trash: &TrashIndex,
    tree: &NoteTree,
    selected_dir: &NodeId,
    entry_id: &NodeId,
) -> Option<NodeId> {
    let entry = trash.get(entry_id)?;

    if tree.is_directory(&entry.parent_id) {
        Some(entry.parent_id.clone())
    } else if !entry.node.is_directory() && selected_dir.is_root() {
        None
    } else {
        Some(selected_dir.clone())
    }
}
