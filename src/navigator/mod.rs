mod file_navigator;

pub use file_navigator::{FileNavigator, NavigatorError};
