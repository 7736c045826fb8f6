use std::path::PathBuf;

use clap::Parser;

use crate::application::data::LogLevel;

/// Browse a remote file listing as a lazily loaded tree.
#[derive(Parser, Debug, Clone)]
#[command(version)]
pub struct Cli {
    /// YAML listing describing the remote store
    pub listing: PathBuf,

    /// Directory to open, relative to the base path
    #[clap(long, short, default_value = "")]
    pub path: String,

    /// Overrides the base path declared in the listing
    #[clap(long, short)]
    pub base_path: Option<String>,

    /// List the opened directory again, dropping everything known below it
    #[clap(long, short)]
    pub refresh: bool,

    /// Load every directory below the opened one
    #[clap(long, short)]
    pub expand: bool,

    /// Delete a path (relative to the base path) before printing; repeatable
    #[clap(long, short)]
    pub delete: Vec<String>,

    /// Deepest level of the tree to print
    #[clap(long)]
    pub max_depth: Option<usize>,

    #[clap(long, short, default_value = "warn", value_enum)]
    pub log_level: LogLevel,
}
