use std::path::PathBuf;

use supports_color::Stream;

use crate::cli::Cli;

#[derive(Debug, Clone)]
pub struct RuntimeConfig {
    pub listing: PathBuf,
    pub path: String,
    pub base_path: Option<String>,
    pub refresh: bool,
    pub expand: bool,
    pub delete: Vec<String>,
    pub max_depth: Option<usize>,
    pub color: bool,
}

impl From<Cli> for RuntimeConfig {
    fn from(cli: Cli) -> Self {
        Self {
            listing: cli.listing,
            path: cli.path,
            base_path: cli.base_path,
            refresh: cli.refresh,
            expand: cli.expand,
            delete: cli.delete,
            max_depth: cli.max_depth,
            color: supports_color::on(Stream::Stdout).is_some(),
        }
    }
}
