mod cloud_path_ext;
mod system_time_ext;

pub use cloud_path_ext::CloudPathExt;
pub use system_time_ext::system_time_from_unix_seconds;
