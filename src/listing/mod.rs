mod file_loader;
mod static_listing;

pub use file_loader::{FileLoader, ListingError};
pub use static_listing::StaticListing;
