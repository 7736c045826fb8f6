use snafu::Snafu;
use snafu::prelude::*;
use tracing::debug;
use tracing::info;

use crate::application::{RuntimeConfig, TreeView};
use crate::listing::{ListingError, StaticListing};
use crate::navigator::{FileNavigator, NavigatorError};

pub struct Application;

impl Application {
    pub async fn run(app_config: impl Into<RuntimeConfig>) -> Result<(), ApplicationError> {
        let rendered = Self::browse(app_config.into()).await?;
        print!("{rendered}");
        Ok(())
    }

    /// Opens the configured listing, applies the requested operations and
    /// returns the rendered tree below the opened directory.
    pub async fn browse(app_config: RuntimeConfig) -> Result<String, ApplicationError> {
        let listing = StaticListing::read(&app_config.listing)
            .await
            .context(ListingSourceSnafu)?;
        debug!("Loaded listing with {} entries", listing.len());

        let base_path = app_config
            .base_path
            .clone()
            .unwrap_or_else(|| listing.base_path().to_string());
        let mut navigator = FileNavigator::new(listing, &base_path);
        info!("Browsing base path '{}'", navigator.tree().base_path());

        navigator
            .navigate(&app_config.path)
            .await
            .context(NavigationSnafu)?;

        if app_config.refresh {
            navigator.refresh().await.context(NavigationSnafu)?;
        }

        if app_config.expand {
            navigator.expand_all().await.context(NavigationSnafu)?;
        }

        for path in &app_config.delete {
            navigator.delete_file(path).await.context(NavigationSnafu)?;
        }

        let current = navigator.current_node();
        info!(
            "Opened '{}' with {} entries",
            navigator.current_path(),
            current.children_count()
        );

        let view = TreeView::new(app_config.color, app_config.max_depth);
        let mut rendered = String::new();
        if let Some(parent) = navigator.tree().get_parent(&current) {
            rendered.push_str(&view.parent_line(&parent));
        }
        rendered.push_str(&view.render(&current));
        Ok(rendered)
    }
}

#[derive(Debug, Snafu)]
pub enum ApplicationError {
    #[snafu(display("Critical failure encountered while reading the listing"))]
    ListingSourceError { source: ListingError },
    #[snafu(display("Critical failure encountered while browsing the tree"))]
    NavigationError { source: NavigatorError },
}
