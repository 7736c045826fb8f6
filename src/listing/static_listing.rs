use std::borrow::Cow;
use std::cell::RefCell;
use std::path::Path;

use hashlink::LinkedHashMap;
use saphyr::{LoadableYamlNode, Scalar, Yaml};
use snafu::prelude::*;
use tracing::debug;

use crate::ext::{CloudPathExt, system_time_from_unix_seconds};
use crate::filesystem::FileRecord;
use crate::listing::file_loader::{EncodingSnafu, NotFoundSnafu, ParseSnafu, ReadSnafu};
use crate::listing::{FileLoader, ListingError};

/// A remote store held entirely in memory, in declaration order.
///
/// Usually read from a YAML listing file:
///
/// ```yaml
/// basePath: "job-1/out/"
/// files:
///   - path: job-1/out/stdout.txt
///     size: 1024
///     lastModified: 1700000000
///   - path: job-1/out/empty-dir
///     directory: true
/// ```
#[derive(Debug, Default)]
pub struct StaticListing {
    base_path: String,
    entries: RefCell<LinkedHashMap<String, FileRecord>>,
}

impl StaticListing {
    pub fn new(base_path: &str, records: impl IntoIterator<Item = FileRecord>) -> Self {
        let entries = records
            .into_iter()
            .map(|record| {
                let path = record.path.normalize_cloud_path();
                (path.clone(), FileRecord { path, ..record })
            })
            .collect();

        Self {
            base_path: base_path.as_base_directory(),
            entries: RefCell::new(entries),
        }
    }

    pub async fn read(path: &Path) -> Result<Self, ListingError> {
        debug!("Reading listing file: {}", path.display());
        let bytes = compio::fs::read(path).await.context(ReadSnafu {
            file_path: path.display().to_string(),
        })?;
        debug!("Successfully read listing file: {} bytes", bytes.len());

        let contents = String::from_utf8(bytes).context(EncodingSnafu {
            file_path: path.display().to_string(),
        })?;
        contents.as_str().try_into()
    }

    pub fn base_path(&self) -> &str {
        &self.base_path
    }

    pub fn len(&self) -> usize {
        self.entries.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.borrow().is_empty()
    }

    fn parse_entry(index: usize, entry: &Yaml) -> Result<Option<FileRecord>, ListingError> {
        let Some(mapping) = entry.as_mapping() else {
            debug!("Skipping listing entry #{}: not a map", index);
            return Ok(None);
        };

        let path = str_field(mapping, "path").ok_or(ListingError::MissingPath { index })?;
        let is_directory = matches!(
            field(mapping, "directory"),
            Some(Yaml::Value(Scalar::Boolean(true)))
        );

        let mut record = if is_directory {
            FileRecord::directory(path)
        } else {
            FileRecord::file(path)
        };
        if let Some(size) = unsigned_field(mapping, "size") {
            record = record.with_content_length(size);
        }
        if let Some(seconds) = unsigned_field(mapping, "lastModified") {
            record = record.with_last_modified(system_time_from_unix_seconds(seconds));
        }

        Ok(Some(record))
    }
}

fn field<'a, 'input>(
    mapping: &'a LinkedHashMap<Yaml<'input>, Yaml<'input>>,
    key: &'static str,
) -> Option<&'a Yaml<'input>> {
    mapping.get(&Yaml::Value(Scalar::String(Cow::Borrowed(key))))
}

fn str_field<'a, 'input>(
    mapping: &'a LinkedHashMap<Yaml<'input>, Yaml<'input>>,
    key: &'static str,
) -> Option<&'a str> {
    match field(mapping, key)? {
        Yaml::Value(Scalar::String(value)) => Some(value.as_ref()),
        _ => None,
    }
}

fn unsigned_field<'input>(
    mapping: &LinkedHashMap<Yaml<'input>, Yaml<'input>>,
    key: &'static str,
) -> Option<u64> {
    match field(mapping, key)? {
        Yaml::Value(Scalar::Integer(value)) => u64::try_from(*value).ok(),
        _ => None,
    }
}

impl TryFrom<&str> for StaticListing {
    type Error = ListingError;

    fn try_from(contents: &str) -> Result<Self, Self::Error> {
        let documents = Yaml::load_from_str(contents).context(ParseSnafu)?;
        let document = documents.first().ok_or(ListingError::MalformedListing)?;
        let top_level = document
            .as_mapping()
            .ok_or(ListingError::TopLevelNotMap)?;

        let base_path = str_field(top_level, "basePath").unwrap_or_default();

        let records = match field(top_level, "files") {
            Some(Yaml::Sequence(files)) => files
                .iter()
                .enumerate()
                .map(|(index, entry)| Self::parse_entry(index, entry))
                .filter_map(Result::transpose)
                .collect::<Result<Vec<_>, _>>()?,
            Some(_) => return Err(ListingError::FilesNotSequence),
            None => Vec::new(),
        };

        Ok(StaticListing::new(base_path, records))
    }
}

impl FileLoader for StaticListing {
    async fn list(&self, prefix: &str) -> Result<Vec<FileRecord>, ListingError> {
        let prefix = prefix.as_base_directory();
        let entries = self.entries.borrow();
        let mut listed: LinkedHashMap<String, FileRecord> = LinkedHashMap::new();

        for (path, record) in entries.iter() {
            let Some(rest) = path.strip_prefix(prefix.as_str()) else {
                continue;
            };
            let trimmed = rest.trim_start_matches('/');
            if trimmed.is_empty() {
                continue;
            }

            match trimmed.find('/') {
                None => {
                    listed.insert(path.clone(), record.clone());
                }
                Some(index) => {
                    let end = prefix.len() + (rest.len() - trimmed.len()) + index;
                    let directory = &path[..end];
                    listed
                        .entry(directory.to_string())
                        .or_insert_with(|| FileRecord::directory(directory));
                }
            }
        }

        debug!("Listed {} entries under '{}'", listed.len(), prefix);
        Ok(listed.into_iter().map(|(_, record)| record).collect())
    }

    async fn delete(&self, path: &str) -> Result<(), ListingError> {
        let path = path.normalize_cloud_path();
        let nested = path.as_base_directory();
        let mut entries = self.entries.borrow_mut();
        let before = entries.len();

        entries.retain(|key, _| *key != path && !key.starts_with(nested.as_str()));
        ensure!(entries.len() < before, NotFoundSnafu { path });

        debug!("Deleted {} remote entries at '{}'", before - entries.len(), path);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    const LISTING: &str = r#"
basePath: "job-1/out"
files:
  - path: job-1/out/stdout.txt
    size: 1024
    lastModified: 1700000000
  - path: job-1/out/logs/run.log
    size: 12
  - path: job-1/out/logs/deep/trace.log
  - path: job-1/out/empty-dir
    directory: true
"#;

    fn paths(records: &[FileRecord]) -> Vec<&str> {
        records.iter().map(|r| r.path.as_str()).collect()
    }

    #[test]
    fn parses_listing_file() {
        let listing: StaticListing = LISTING.try_into().expect("valid listing");

        assert_eq!(listing.base_path(), "job-1/out/");
        assert_eq!(listing.len(), 4);

        let entries = listing.entries.borrow();
        let stdout = entries.get("job-1/out/stdout.txt").expect("stdout entry");
        assert_eq!(stdout.content_length, Some(1024));
        assert_eq!(
            stdout.last_modified,
            Some(system_time_from_unix_seconds(1_700_000_000))
        );
        assert!(entries.get("job-1/out/empty-dir").is_some_and(|r| r.is_directory));
    }

    #[test]
    fn missing_files_section_is_empty_listing() {
        let listing: StaticListing = "basePath: wd".try_into().expect("valid listing");
        assert!(listing.is_empty());
        assert_eq!(listing.base_path(), "wd/");
    }

    #[test]
    fn non_map_entries_are_skipped() {
        let listing: StaticListing = "files:\n  - just-a-string\n  - path: a.txt"
            .try_into()
            .expect("valid listing");
        assert_eq!(listing.len(), 1);
    }

    #[rstest]
    #[case("invalid: yaml: content: [unclosed")]
    fn invalid_yaml_is_parse_error(#[case] contents: &str) {
        let result: Result<StaticListing, _> = contents.try_into();
        assert!(matches!(result, Err(ListingError::ParseError { .. })));
    }

    #[test]
    fn empty_file_is_malformed() {
        let result: Result<StaticListing, _> = "".try_into();
        assert!(matches!(result, Err(ListingError::MalformedListing)));
    }

    #[rstest]
    #[case("- item1\n- item2")]
    #[case("just a string")]
    fn top_level_must_be_map(#[case] contents: &str) {
        let result: Result<StaticListing, _> = contents.try_into();
        assert!(matches!(result, Err(ListingError::TopLevelNotMap)));
    }

    #[test]
    fn files_must_be_sequence() {
        let result: Result<StaticListing, _> = "files:\n  a: b".try_into();
        assert!(matches!(result, Err(ListingError::FilesNotSequence)));
    }

    #[test]
    fn entry_without_path_is_rejected() {
        let result: Result<StaticListing, _> = "files:\n  - size: 3".try_into();
        assert!(matches!(
            result,
            Err(ListingError::MissingPath { index: 0 })
        ));
    }

    #[compio::test]
    async fn list_returns_immediate_entries() {
        let listing: StaticListing = LISTING.try_into().expect("valid listing");

        let root = listing.list("job-1/out/").await.expect("listing");
        assert_eq!(
            paths(&root),
            ["job-1/out/stdout.txt", "job-1/out/logs", "job-1/out/empty-dir"]
        );
        assert!(root[1].is_directory);

        let logs = listing.list("job-1/out/logs").await.expect("listing");
        assert_eq!(paths(&logs), ["job-1/out/logs/run.log", "job-1/out/logs/deep"]);
    }

    #[compio::test]
    async fn list_folds_deep_entries_into_unique_directories() {
        let listing = StaticListing::new(
            "",
            [
                FileRecord::file("/docs/readme.txt"),
                FileRecord::file("/docs/img/logo.png"),
                FileRecord::file("/docs/img/icon.png"),
                FileRecord::file("/top.txt"),
            ],
        );

        let root = listing.list("").await.expect("listing");
        assert_eq!(paths(&root), ["/docs", "/top.txt"]);

        let docs = listing.list("/docs/").await.expect("listing");
        assert_eq!(paths(&docs), ["/docs/readme.txt", "/docs/img"]);
    }

    #[compio::test]
    async fn list_of_unknown_prefix_is_empty() {
        let listing: StaticListing = LISTING.try_into().expect("valid listing");
        assert!(listing.list("elsewhere/").await.expect("listing").is_empty());
    }

    #[compio::test]
    async fn delete_removes_file_or_subtree() {
        let listing: StaticListing = LISTING.try_into().expect("valid listing");

        listing.delete("job-1/out/logs").await.expect("delete");
        assert_eq!(listing.len(), 2);

        listing.delete("job-1/out/stdout.txt").await.expect("delete");
        assert_eq!(listing.len(), 1);
    }

    #[compio::test]
    async fn delete_of_missing_path_is_not_found() {
        let listing: StaticListing = LISTING.try_into().expect("valid listing");

        let result = listing.delete("job-1/out/nope.txt").await;
        assert!(matches!(result, Err(ListingError::NotFound { .. })));
        assert_eq!(listing.len(), 4);
    }

    #[compio::test]
    async fn read_from_file() {
        let mut file = NamedTempFile::new().expect("Failed to create temp file");
        write!(file, "{}", LISTING).expect("Failed to write to temp file");

        let listing = StaticListing::read(file.path()).await.expect("listing");
        assert_eq!(listing.len(), 4);
    }

    #[compio::test]
    async fn read_nonexistent_file_is_read_error() {
        let result = StaticListing::read(Path::new("nonexistent-listing.yaml")).await;
        assert!(matches!(result, Err(ListingError::ReadError { .. })));
    }

    #[compio::test]
    async fn read_non_utf8_file_is_encoding_error() {
        let mut file = NamedTempFile::new().expect("Failed to create temp file");
        file.write_all(&[0xff, 0xfe, 0xfd]).expect("Failed to write to temp file");

        let result = StaticListing::read(file.path()).await;
        assert!(matches!(result, Err(ListingError::EncodingError { .. })));
    }

    #[test]
    fn error_display() {
        let error = ListingError::NotFound {
            path: "a/b.txt".into(),
        };
        assert!(error.to_string().contains("a/b.txt"));
    }
}
