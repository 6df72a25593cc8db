//! Display tree built from folder rows and resource paths.

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use assetdeck_core::path;
use assetdeck_core::result::AppResult;
use assetdeck_database::AssetStore;
use assetdeck_entity::action::NodeKind;
use assetdeck_entity::category::AssetCategory;
use assetdeck_entity::folder::{Folder, TreeNode};
use assetdeck_entity::resource::Resource;

use super::ensure_root;
use crate::context::RequestContext;

/// Builds the folder tree shown to clients.
#[derive(Debug, Clone)]
pub struct TreeService {
    /// Persistence.
    store: Arc<dyn AssetStore>,
}

impl TreeService {
    /// Creates a new tree service.
    pub fn new(store: Arc<dyn AssetStore>) -> Self {
        Self { store }
    }

    /// Build the full tree of a category, creating its root folder first
    /// if needed.
    pub async fn build_tree(
        &self,
        ctx: &RequestContext,
        category: AssetCategory,
    ) -> AppResult<TreeNode> {
        let scope = ctx.scope(category);
        let mut tx = self.store.begin().await?;
        ensure_root(tx.as_mut(), scope).await?;
        let folders = tx.list_folders(scope).await?;
        let resources = tx.list_resources(scope).await?;
        tx.commit().await?;

        Ok(reconcile(&folders, &resources))
    }
}

/// Merge explicit folder rows and the folders implied by resource paths
/// into one tree under a synthetic root at the empty path.
///
/// Nodes are keyed by path, so a folder that is both explicit and implied
/// appears once. A resource whose path is also a folder's collapses into
/// that folder node, which then carries the `resource_id`; siblings never
/// share a name. Intermediate folders missing from `folders` are
/// synthesized without a `folder_id`. The output depends only on the input
/// sets, not their order.
pub fn reconcile(folders: &[Folder], resources: &[Resource]) -> TreeNode {
    let mut dirs: BTreeMap<String, TreeNode> = BTreeMap::new();
    let mut files: BTreeMap<String, TreeNode> = BTreeMap::new();

    for folder in folders {
        let Some(node) = ensure_chain(&mut dirs, &folder.path) else {
            continue;
        };
        node.folder_id = Some(folder.id);
        let kind = folder.node_kind();
        if node.kind != kind {
            node.kind = kind;
            node.actions = kind.allowed_actions().into_iter().collect();
        }
    }

    for resource in resources {
        let segments: Vec<&str> = path::segments(&resource.file_path).collect();
        let Some((leaf, parents)) = segments.split_last() else {
            continue;
        };
        let parent_path = parents.join(&path::DELIMITER.to_string());
        ensure_chain(&mut dirs, &parent_path);

        let file_path = path::join(&parent_path, leaf);
        let node = files
            .entry(file_path.clone())
            .or_insert_with(|| TreeNode::new(*leaf, file_path, NodeKind::File));
        // Two rows can only share a cached path if the cache is stale; keep
        // the smallest id so the result stays order independent.
        if node.resource_id.is_none_or(|id| resource.id < id) {
            node.resource_id = Some(resource.id);
        }
    }

    let mut pending: HashMap<String, Vec<TreeNode>> = HashMap::new();
    for (file_path, node) in files {
        if let Some(dir) = dirs.get_mut(&file_path) {
            dir.resource_id = node.resource_id;
            continue;
        }
        let parent = path::parent_of(&file_path).unwrap_or("").to_string();
        pending.entry(parent).or_default().push(node);
    }

    // Deepest folders first, so every folder's children are complete
    // before it is attached to its own parent.
    let mut ordered: Vec<(String, TreeNode)> = dirs.into_iter().collect();
    ordered.sort_by(|(a, _), (b, _)| path::depth(b).cmp(&path::depth(a)).then(a.cmp(b)));

    for (dir_path, mut node) in ordered {
        node.children = take_sorted(&mut pending, &dir_path);
        let parent = path::parent_of(&dir_path).unwrap_or("").to_string();
        pending.entry(parent).or_default().push(node);
    }

    let mut root = TreeNode::new("", "", NodeKind::Root);
    root.children = take_sorted(&mut pending, "");
    root
}

/// Create folder nodes for `dir_path` and every ancestor, returning the
/// node at `dir_path`. The empty path has no node.
fn ensure_chain<'a>(
    dirs: &'a mut BTreeMap<String, TreeNode>,
    dir_path: &str,
) -> Option<&'a mut TreeNode> {
    let mut current = String::new();
    for segment in path::segments(dir_path) {
        current = path::join(&current, segment);
        dirs.entry(current.clone())
            .or_insert_with(|| TreeNode::new(segment, current.clone(), NodeKind::Folder));
    }
    if current.is_empty() {
        None
    } else {
        dirs.get_mut(&current)
    }
}

/// Remove and order the children collected for `parent`: folders first,
/// then files, each by name.
fn take_sorted(pending: &mut HashMap<String, Vec<TreeNode>>, parent: &str) -> Vec<TreeNode> {
    let mut children = pending.remove(parent).unwrap_or_default();
    children.sort_by(|a, b| {
        (a.kind == NodeKind::File)
            .cmp(&(b.kind == NodeKind::File))
            .then_with(|| a.name.cmp(&b.name))
    });
    children
}
