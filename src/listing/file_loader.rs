use std::string::FromUtf8Error;

use snafu::Snafu;

use crate::filesystem::FileRecord;

/// Access to a remote store that can be listed one directory at a time.
pub trait FileLoader {
    /// Lists the immediate entries below `prefix`, given in base-directory
    /// form. Anything deeper is reported as a single directory record for the
    /// first path segment below the prefix.
    async fn list(&self, prefix: &str) -> Result<Vec<FileRecord>, ListingError>;

    /// Deletes a file, or a directory together with everything below it.
    async fn delete(&self, path: &str) -> Result<(), ListingError>;
}

#[derive(Debug, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum ListingError {
    #[snafu(display("Failed to read the listing file: {}", file_path))]
    ReadError {
        file_path: String,
        source: std::io::Error,
    },
    #[snafu(display("Listing file {} is not valid UTF-8", file_path))]
    EncodingError {
        file_path: String,
        source: FromUtf8Error,
    },
    #[snafu(display("Failed to parse the listing file"))]
    ParseError { source: saphyr::ScanError },
    #[snafu(display("Improperly formatted listing file"))]
    MalformedListing,
    #[snafu(display("Top level of the listing should be a map"))]
    TopLevelNotMap,
    #[snafu(display("Files section should be a sequence"))]
    FilesNotSequence,
    #[snafu(display("Listing entry #{} has no path", index))]
    MissingPath { index: usize },
    #[snafu(display("No remote entry at '{}'", path))]
    NotFound { path: String },
}
