use std::time::SystemTime;

use crate::ext::CloudPathExt;
use crate::filesystem::{TreeNode, TreeNodeParams};

/// A single entry of a remote listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileRecord {
    /// Full remote path, base path included.
    pub path: String,
    pub is_directory: bool,
    pub content_length: Option<u64>,
    pub last_modified: Option<SystemTime>,
}

impl FileRecord {
    pub fn file(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            is_directory: false,
            content_length: None,
            last_modified: None,
        }
    }

    pub fn directory(path: impl Into<String>) -> Self {
        Self {
            is_directory: true,
            ..Self::file(path)
        }
    }

    pub fn with_content_length(mut self, content_length: u64) -> Self {
        self.content_length = Some(content_length);
        self
    }

    pub fn with_last_modified(mut self, last_modified: SystemTime) -> Self {
        self.last_modified = Some(last_modified);
        self
    }

    /// Path of the record inside a tree rooted at `base_path`.
    ///
    /// `base_path` is expected in base-directory form. The base directory
    /// itself maps to the root path `""`; paths outside the base are kept whole.
    pub fn relative_path(&self, base_path: &str) -> String {
        let normalized = self.path.normalize_cloud_path();
        if base_path.is_empty() {
            return normalized;
        }
        if normalized.as_base_directory() == base_path {
            return String::new();
        }
        match normalized.strip_prefix(base_path) {
            Some(relative) => relative.to_string(),
            None => normalized,
        }
    }

    pub fn to_tree_node(&self, base_path: &str) -> TreeNode {
        // Directories carry no metadata, whichever way they entered the tree.
        let (content_length, last_modified) = if self.is_directory {
            (None, None)
        } else {
            (self.content_length, self.last_modified)
        };

        TreeNode::new(TreeNodeParams {
            path: self.relative_path(base_path),
            is_directory: self.is_directory,
            content_length,
            last_modified,
            ..Default::default()
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ext::system_time_from_unix_seconds;
    use crate::filesystem::LoadingStatus;
    use rstest::*;

    #[rstest]
    #[case("", "/docs/readme.txt", "/docs/readme.txt")]
    #[case("wd/", "wd/out/a.txt", "out/a.txt")]
    #[case("wd/", "wd\\out\\a.txt", "out/a.txt")]
    #[case("wd/", "wd/", "")]
    #[case("wd/", "wd", "")]
    #[case("wd/", "other/a.txt", "other/a.txt")]
    fn relative_path_strips_base(#[case] base: &str, #[case] path: &str, #[case] expected: &str) {
        assert_eq!(FileRecord::file(path).relative_path(base), expected);
    }

    #[test]
    fn file_record_keeps_metadata() {
        let modified = system_time_from_unix_seconds(1_700_000_000);
        let node = FileRecord::file("wd/out/a.txt")
            .with_content_length(42)
            .with_last_modified(modified)
            .to_tree_node("wd/");

        assert_eq!(node.path(), "out/a.txt");
        assert_eq!(node.name(), "a.txt");
        assert!(!node.is_directory());
        assert_eq!(node.content_length(), Some(42));
        assert_eq!(node.last_modified(), Some(modified));
        assert_eq!(node.loading_status(), LoadingStatus::Ready);
    }

    #[test]
    fn directory_record_drops_metadata() {
        let node = FileRecord::directory("wd/out")
            .with_content_length(0)
            .with_last_modified(system_time_from_unix_seconds(1))
            .to_tree_node("wd/");

        assert!(node.is_directory());
        assert_eq!(node.content_length(), None);
        assert_eq!(node.last_modified(), None);
        assert_eq!(node.loading_status(), LoadingStatus::Loading);
    }
}
