//! Lazily loaded remote file tree.
//!
//! Listings of a remote store arrive as flat batches, one directory at a time
//! and in no particular order. [`TreeStructure`] stitches them into a single
//! hierarchy of [`TreeNode`]s, synthesizing ancestors it has not been told
//! about yet and tracking which directories have been listed.

mod file_record;
mod tree_node;
mod tree_structure;

pub use file_record::FileRecord;
pub use tree_node::{LoadingStatus, TreeNode, TreeNodeParams};
pub use tree_structure::TreeStructure;
