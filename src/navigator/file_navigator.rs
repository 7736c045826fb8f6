use std::rc::Rc;

use futures::StreamExt;
use futures::stream::FuturesUnordered;
use snafu::{ResultExt, Snafu};
use tracing::{debug, info};

use crate::ext::CloudPathExt;
use crate::filesystem::{TreeNode, TreeStructure};
use crate::listing::{FileLoader, ListingError};

/// A browsing session over one remote location.
///
/// Owns the tree for the session and fetches listings from the loader as
/// directories are opened. Listings requested together are awaited together
/// and merged in whatever order they complete.
pub struct FileNavigator<L: FileLoader> {
    loader: L,
    tree: TreeStructure,
    current_path: String,
}

impl<L: FileLoader> FileNavigator<L> {
    pub fn new(loader: L, base_path: &str) -> Self {
        Self {
            loader,
            tree: TreeStructure::new(base_path),
            current_path: String::new(),
        }
    }

    pub fn tree(&self) -> &TreeStructure {
        &self.tree
    }

    pub fn current_path(&self) -> &str {
        &self.current_path
    }

    pub fn current_node(&self) -> Rc<TreeNode> {
        self.tree.get_node(&self.current_path)
    }

    /// Opens `path`, fetching its listing unless it is already loaded.
    pub async fn navigate(&mut self, path: &str) -> Result<Rc<TreeNode>, NavigatorError> {
        self.current_path = path.normalize_cloud_path();
        if !self.tree.is_path_loaded(&self.current_path) {
            let path = self.current_path.clone();
            self.load_path(&path).await?;
        }
        Ok(self.current_node())
    }

    pub async fn load_path(&mut self, path: &str) -> Result<(), NavigatorError> {
        self.load_paths([path]).await
    }

    /// Fetches the listings of all `paths` concurrently and merges each one
    /// into the tree as soon as it arrives.
    pub async fn load_paths<I, S>(&mut self, paths: I) -> Result<(), NavigatorError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let loader = &self.loader;
        let base_path = self.tree.base_path().to_string();
        let base_path = base_path.as_str();

        let mut pending = paths
            .into_iter()
            .map(|path| {
                let path = path.as_ref().normalize_cloud_path();
                let prefix = base_path.cloud_join(&path).as_base_directory();
                async move {
                    let result = loader.list(&prefix).await;
                    (path, result)
                }
            })
            .collect::<FuturesUnordered<_>>();
        debug!("Fetching {} listings", pending.len());

        while let Some((path, result)) = pending.next().await {
            let records = result.context(ListFailedSnafu { path: path.clone() })?;
            debug!("Received {} records for '{}'", records.len(), path);
            self.tree.add_files(records);
            self.tree.mark_path_loaded(&path);
        }

        Ok(())
    }

    /// Lists the current directory again from scratch, so that entries removed
    /// remotely disappear.
    pub async fn refresh(&mut self) -> Result<Rc<TreeNode>, NavigatorError> {
        let path = self.current_path.clone();
        self.tree.clear_directory(&path);
        self.load_path(&path).await?;
        Ok(self.current_node())
    }

    /// Loads every directory below the current one, one depth level per round.
    pub async fn expand_all(&mut self) -> Result<(), NavigatorError> {
        let mut rounds = 0usize;
        loop {
            let pending: Vec<String> = self
                .tree
                .pending_directories()
                .into_iter()
                .filter(|path| is_within(path, &self.current_path))
                .collect();
            if pending.is_empty() {
                break;
            }

            rounds += 1;
            debug!("Expansion round {}: {} directories", rounds, pending.len());
            self.load_paths(pending).await?;
        }

        info!("Expanded '{}' in {} rounds", self.current_path, rounds);
        Ok(())
    }

    /// Deletes the remote entry, then drops it from the tree.
    pub async fn delete_file(&mut self, path: &str) -> Result<(), NavigatorError> {
        let path = path.normalize_cloud_path();
        let remote_path = self.tree.base_path().cloud_join(&path);

        self.loader
            .delete(&remote_path)
            .await
            .context(DeleteFailedSnafu { path: path.clone() })?;
        self.tree.delete_node(&path);

        info!("Deleted '{}'", path);
        Ok(())
    }
}

fn is_within(path: &str, directory: &str) -> bool {
    directory.is_empty()
        || path == directory
        || path
            .strip_prefix(directory)
            .is_some_and(|rest| rest.starts_with('/'))
}

#[derive(Debug, Snafu)]
pub enum NavigatorError {
    #[snafu(display("Failed to list '{}'", path))]
    ListFailed { path: String, source: ListingError },
    #[snafu(display("Failed to delete '{}'", path))]
    DeleteFailed { path: String, source: ListingError },
}
