//! Tree structures for hierarchical display.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::action::{Action, NodeKind};

/// A node in the displayed folder tree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TreeNode {
    /// Leaf name (empty for the synthetic root).
    pub name: String,
    /// Full dotted path (empty for the synthetic root).
    pub path: String,
    /// Node type.
    pub kind: NodeKind,
    /// Backing folder row, when one exists. Folders implied only by
    /// resource paths have none.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub folder_id: Option<Uuid>,
    /// Backing resource. Always set on file nodes; set on a folder node
    /// only when a resource shares its path.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resource_id: Option<Uuid>,
    /// Actions the UI may offer on this node.
    pub actions: Vec<Action>,
    /// Child nodes: folders first, then files, each sorted by name.
    pub children: Vec<TreeNode>,
}

impl TreeNode {
    /// Create a node without children.
    pub fn new(name: impl Into<String>, path: impl Into<String>, kind: NodeKind) -> Self {
        Self {
            name: name.into(),
            path: path.into(),
            kind,
            folder_id: None,
            resource_id: None,
            actions: kind.allowed_actions().into_iter().collect(),
            children: Vec::new(),
        }
    }

    /// Find a node by path and kind anywhere below (and including) this node.
    pub fn find(&self, path: &str, kind: NodeKind) -> Option<&TreeNode> {
        if self.path == path && self.kind == kind {
            return Some(self);
        }
        self.children.iter().find_map(|c| c.find(path, kind))
    }

    /// Find a container (root or folder) node by path.
    pub fn find_folder(&self, path: &str) -> Option<&TreeNode> {
        self.find(path, NodeKind::Folder)
            .or_else(|| self.find(path, NodeKind::Root))
    }

    /// Count descendant nodes of the given kind, excluding this node.
    pub fn count(&self, kind: NodeKind) -> usize {
        self.children
            .iter()
            .map(|c| usize::from(c.kind == kind) + c.count(kind))
            .sum()
    }
}
