use std::cell::{Cell, RefCell, RefMut};
use std::cmp::Ordering;
use std::rc::Rc;
use std::time::SystemTime;

use derive_more::Display;
use hashlink::LinkedHashMap;

use crate::ext::CloudPathExt;

/// Whether the listing of a node is authoritative yet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum LoadingStatus {
    #[display("loading")]
    Loading,
    #[display("ready")]
    Ready,
}

/// Canonical display order: directories before files, then by name.
pub fn display_order(a: &TreeNode, b: &TreeNode) -> Ordering {
    b.is_directory
        .cmp(&a.is_directory)
        .then_with(|| a.name.cmp(&b.name))
        .then_with(|| a.path.cmp(&b.path))
}

/// Child entries of a directory, keyed by full child path.
///
/// Keyed access does not depend on insertion order. The iteration order is the
/// display order computed by the last [`Children::sort_for_display`] call;
/// entries inserted since then follow in insertion order.
#[derive(Debug, Default)]
pub struct Children {
    entries: LinkedHashMap<String, Rc<TreeNode>>,
}

impl Children {
    pub fn get(&self, path: &str) -> Option<&Rc<TreeNode>> {
        self.entries.get(path)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn values(&self) -> impl Iterator<Item = &Rc<TreeNode>> {
        self.entries.values()
    }

    /// Inserts under the node's own path, replacing any previous entry.
    pub(super) fn insert(&mut self, node: Rc<TreeNode>) -> Option<Rc<TreeNode>> {
        self.entries.insert(node.path.clone(), node)
    }

    pub(super) fn remove(&mut self, path: &str) -> Option<Rc<TreeNode>> {
        self.entries.remove(path)
    }

    pub(super) fn clear(&mut self) {
        self.entries.clear();
    }

    pub(super) fn sort_for_display(&mut self) {
        let mut entries: Vec<_> = std::mem::take(&mut self.entries).into_iter().collect();
        entries.sort_by(|(_, a), (_, b)| display_order(a, b));
        self.entries = entries.into_iter().collect();
    }
}

impl FromIterator<Rc<TreeNode>> for Children {
    fn from_iter<T: IntoIterator<Item = Rc<TreeNode>>>(iter: T) -> Self {
        Self {
            entries: iter
                .into_iter()
                .map(|node| (node.path.clone(), node))
                .collect(),
        }
    }
}

/// Construction parameters for a [`TreeNode`].
#[derive(Debug, Default)]
pub struct TreeNodeParams {
    pub path: String,
    pub is_directory: bool,
    pub children: Option<Children>,
    /// Defaults to `Loading` for directories and `Ready` for files.
    pub loading_status: Option<LoadingStatus>,
    pub content_length: Option<u64>,
    pub last_modified: Option<SystemTime>,
    pub is_unknown: bool,
}

/// One file or directory of a remote tree.
#[derive(Debug)]
pub struct TreeNode {
    path: String,
    name: String,
    is_directory: bool,
    children: Rc<RefCell<Children>>,
    loading_status: Cell<LoadingStatus>,
    content_length: Option<u64>,
    last_modified: Option<SystemTime>,
    is_unknown: bool,
}

impl TreeNode {
    pub fn new(params: TreeNodeParams) -> Self {
        let loading_status = params.loading_status.unwrap_or(if params.is_directory {
            LoadingStatus::Loading
        } else {
            LoadingStatus::Ready
        });

        Self {
            name: params.path.cloud_basename(),
            path: params.path,
            is_directory: params.is_directory,
            children: Rc::new(RefCell::new(params.children.unwrap_or_default())),
            loading_status: Cell::new(loading_status),
            content_length: params.content_length,
            last_modified: params.last_modified,
            is_unknown: params.is_unknown,
        }
    }

    /// A directory whose listing has not been seen yet.
    pub fn directory(path: impl Into<String>) -> Self {
        Self::new(TreeNodeParams {
            path: path.into(),
            is_directory: true,
            ..Default::default()
        })
    }

    /// Stand-in returned for a path the tree knows nothing about.
    pub fn placeholder(path: impl Into<String>) -> Self {
        Self::new(TreeNodeParams {
            path: path.into(),
            is_directory: true,
            loading_status: Some(LoadingStatus::Loading),
            is_unknown: true,
            ..Default::default()
        })
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn is_directory(&self) -> bool {
        self.is_directory
    }

    pub fn is_unknown(&self) -> bool {
        self.is_unknown
    }

    pub fn loading_status(&self) -> LoadingStatus {
        self.loading_status.get()
    }

    pub fn content_length(&self) -> Option<u64> {
        self.content_length
    }

    pub fn last_modified(&self) -> Option<SystemTime> {
        self.last_modified
    }

    pub fn mark_as_loaded(&self) {
        self.loading_status.set(LoadingStatus::Ready);
    }

    /// Iterates the children in display order.
    ///
    /// The children are collected eagerly into a snapshot when `walk` is
    /// called. The iterator stays valid while the tree is mutated; call `walk`
    /// again to observe the new state.
    pub fn walk(&self) -> impl Iterator<Item = Rc<TreeNode>> + use<> {
        self.children
            .borrow()
            .values()
            .cloned()
            .collect::<Vec<_>>()
            .into_iter()
    }

    pub fn child(&self, path: &str) -> Option<Rc<TreeNode>> {
        self.children.borrow().get(path).cloned()
    }

    pub fn has_children(&self) -> bool {
        !self.children.borrow().is_empty()
    }

    pub fn children_count(&self) -> usize {
        self.children.borrow().len()
    }

    pub(super) fn children_mut(&self) -> RefMut<'_, Children> {
        self.children.borrow_mut()
    }

    pub(super) fn set_loading_status(&self, status: LoadingStatus) {
        self.loading_status.set(status);
    }
}

/// Copies every field. The children map is shared with the original node, so
/// structural changes made later by the tree are visible through both.
impl Clone for TreeNode {
    fn clone(&self) -> Self {
        Self {
            path: self.path.clone(),
            name: self.name.clone(),
            is_directory: self.is_directory,
            children: Rc::clone(&self.children),
            loading_status: Cell::new(self.loading_status.get()),
            content_length: self.content_length,
            last_modified: self.last_modified,
            is_unknown: self.is_unknown,
        }
    }
}
