mod application_impl;
pub mod data;
mod runtime_config;
mod tree_view;

pub use application_impl::{Application, ApplicationError};
pub use runtime_config::RuntimeConfig;
pub use tree_view::TreeView;
