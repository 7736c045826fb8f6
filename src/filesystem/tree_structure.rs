use std::collections::{HashMap, HashSet};
use std::rc::Rc;

use tracing::{debug, warn};

use crate::ext::CloudPathExt;
use crate::filesystem::{FileRecord, LoadingStatus, TreeNode};

/// In-memory view of a lazily listed remote file system.
///
/// Directory nodes are indexed by their normalized path relative to
/// `base_path`; file nodes are only reachable through their parent's children.
/// Listings can be applied in any order and any grouping: ancestors missing
/// from a batch are synthesized, and re-applying a known entry never removes
/// existing children. When a file and a directory share a path, the directory
/// is kept.
#[derive(Debug)]
pub struct TreeStructure {
    base_path: String,
    directories: HashMap<String, Rc<TreeNode>>,
}

impl TreeStructure {
    pub fn new(base_path: &str) -> Self {
        let root = Rc::new(TreeNode::directory(""));
        let directories = HashMap::from([(String::new(), root)]);

        Self {
            base_path: base_path.as_base_directory(),
            directories,
        }
    }

    pub fn base_path(&self) -> &str {
        &self.base_path
    }

    /// Merges a batch of listing records into the tree.
    pub fn add_files(&mut self, files: impl IntoIterator<Item = FileRecord>) {
        let mut added = 0usize;
        let mut touched = HashSet::new();

        for file in files {
            let node = file.to_tree_node(&self.base_path);
            if !self.is_insertable(&node) {
                continue;
            }

            let folder = node.path().cloud_dirname();
            self.ensure_directory(&folder, &mut touched);
            let Some(parent) = self.directories.get(&folder).cloned() else {
                warn!("No parent directory for {:?}, skipping it", node.path());
                continue;
            };

            if node.is_directory() {
                if !self.directories.contains_key(node.path()) {
                    let node = Rc::new(node);
                    self.directories
                        .insert(node.path().to_string(), Rc::clone(&node));
                    parent.children_mut().insert(node);
                }
            } else {
                parent.children_mut().insert(Rc::new(node));
            }
            touched.insert(folder);
            added += 1;
        }

        for path in &touched {
            if let Some(directory) = self.directories.get(path) {
                directory.children_mut().sort_for_display();
            }
        }

        debug!(
            "Merged {} records, {} directories indexed",
            added,
            self.directories.len()
        );
    }

    /// Returns the node at `path`, or an unknown placeholder when the tree has
    /// never seen it. Placeholders are not inserted anywhere.
    pub fn get_node(&self, path: &str) -> Rc<TreeNode> {
        let path = path.normalize_cloud_path();
        if let Some(directory) = self.directories.get(&path) {
            return Rc::clone(directory);
        }

        let parent = path.cloud_dirname();
        if let Some(child) = self
            .directories
            .get(&parent)
            .and_then(|parent| parent.child(&path))
        {
            return child;
        }

        Rc::new(TreeNode::placeholder(path))
    }

    /// Removes the node at `path`. A parent left without children is removed
    /// as well, repeatedly, stopping at the root.
    pub fn delete_node(&mut self, path: &str) {
        let mut current = path.normalize_cloud_path();

        while !current.is_empty() {
            let node = self.get_node(&current);
            if node.is_unknown() {
                debug!("Nothing to delete at {:?}", current);
                return;
            }
            if node.is_directory() {
                self.forget_directory(&current);
            }

            let parent_path = current.cloud_dirname();
            let Some(parent) = self.directories.get(&parent_path) else {
                return;
            };
            let removed = parent.children_mut().remove(&current).is_some();
            if !removed || parent.has_children() {
                return;
            }

            debug!("Collapsing empty directory {:?}", parent_path);
            current = parent_path;
        }
    }

    pub fn is_path_loaded(&self, path: &str) -> bool {
        self.directories
            .get(&path.normalize_cloud_path())
            .is_some_and(|directory| directory.loading_status() == LoadingStatus::Ready)
    }

    pub fn get_parent(&self, node: &TreeNode) -> Option<Rc<TreeNode>> {
        if node.path().is_empty() {
            return None;
        }
        self.directories.get(&node.path().cloud_dirname()).cloned()
    }

    /// Marks a known directory as fully listed. Returns `false` for paths that
    /// are not indexed directories.
    pub fn mark_path_loaded(&self, path: &str) -> bool {
        match self.directories.get(&path.normalize_cloud_path()) {
            Some(directory) => {
                directory.mark_as_loaded();
                true
            }
            None => false,
        }
    }

    /// Drops everything below a known directory and sets it back to `Loading`,
    /// keeping the directory itself in place.
    pub fn clear_directory(&mut self, path: &str) -> bool {
        let path = path.normalize_cloud_path();
        let Some(directory) = self.directories.get(&path).cloned() else {
            return false;
        };

        directory.children_mut().clear();
        directory.set_loading_status(LoadingStatus::Loading);
        self.directories
            .retain(|key, _| !is_descendant(key, &path));
        debug!("Cleared directory {:?}", path);
        true
    }

    /// Indexed directories still waiting for their listing, sorted by path.
    pub fn pending_directories(&self) -> Vec<String> {
        let mut pending: Vec<String> = self
            .directories
            .iter()
            .filter(|(_, node)| node.loading_status() == LoadingStatus::Loading)
            .map(|(path, _)| path.clone())
            .collect();
        pending.sort();
        pending
    }

    /// Makes sure `directory` and all of its ancestors are indexed and linked.
    ///
    /// The nearest ancestor that already exists is marked `Ready`: an entry
    /// being listed below it means its listing is authoritative for that entry.
    /// A synthesized directory replaces a file child with the same path.
    fn ensure_directory(&mut self, directory: &str, touched: &mut HashSet<String>) {
        let mut missing = Vec::new();
        let mut current = directory.to_string();

        loop {
            if let Some(existing) = self.directories.get(&current) {
                existing.mark_as_loaded();
                break;
            }

            let parent = current.cloud_dirname();
            debug_assert!(
                parent.len() < current.len(),
                "dirname of {current:?} does not shorten it"
            );
            if parent.len() >= current.len() {
                warn!("Cannot resolve the ancestors of {:?}", current);
                return;
            }
            missing.push(current);
            current = parent;
        }

        for path in missing.into_iter().rev() {
            debug!("Synthesizing directory {:?}", path);
            let node = Rc::new(TreeNode::directory(path.as_str()));
            let parent_path = path.cloud_dirname();
            if let Some(parent) = self.directories.get(&parent_path) {
                parent.children_mut().insert(Rc::clone(&node));
            }
            touched.insert(parent_path);
            self.directories.insert(path, node);
        }
    }

    fn forget_directory(&mut self, path: &str) {
        self.directories
            .retain(|key, _| key != path && !is_descendant(key, path));
    }

    fn is_insertable(&self, node: &TreeNode) -> bool {
        if node.is_directory() {
            return true;
        }

        let insertable = !node.path().is_empty() && !self.directories.contains_key(node.path());
        if !insertable {
            warn!("File record {:?} collides with a directory, skipping it", node.path());
        }
        insertable
    }
}

fn is_descendant(path: &str, ancestor: &str) -> bool {
    if ancestor.is_empty() {
        return !path.is_empty();
    }
    path.strip_prefix(ancestor)
        .is_some_and(|rest| rest.starts_with('/'))
}
