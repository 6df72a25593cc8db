//! Node types of the displayed tree and the actions each one permits.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

/// Type of a node in the folder tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeKind {
    /// A category root folder, or the synthetic anchor of a tree.
    Root,
    /// A regular folder.
    Folder,
    /// A resource.
    File,
}

/// A user-facing operation on a tree node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Action {
    /// Create a child folder.
    CreateFolder,
    /// Upload files into the folder.
    Upload,
    /// Rename in place.
    Rename,
    /// Move under another parent.
    Move,
    /// Copy with all contents.
    Copy,
    /// Delete with all contents.
    Delete,
    /// Remove every resource below, keeping folders.
    Clear,
    /// Download as an archive.
    Download,
}

impl NodeKind {
    /// The set of actions available on a node of this kind.
    pub fn allowed_actions(&self) -> BTreeSet<Action> {
        let actions: &[Action] = match self {
            Self::Root => &[
                Action::CreateFolder,
                Action::Upload,
                Action::Clear,
                Action::Download,
            ],
            Self::Folder => &[
                Action::CreateFolder,
                Action::Upload,
                Action::Rename,
                Action::Move,
                Action::Copy,
                Action::Delete,
                Action::Clear,
                Action::Download,
            ],
            Self::File => &[Action::Rename, Action::Move, Action::Delete, Action::Download],
        };
        actions.iter().copied().collect()
    }

    /// Whether `action` is available on a node of this kind.
    pub fn allows(&self, action: Action) -> bool {
        self.allowed_actions().contains(&action)
    }
}

impl std::fmt::Display for Action {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            Self::CreateFolder => "create a folder in",
            Self::Upload => "upload into",
            Self::Rename => "rename",
            Self::Move => "move",
            Self::Copy => "copy",
            Self::Delete => "delete",
            Self::Clear => "clear",
            Self::Download => "download",
        };
        f.write_str(label)
    }
}
