/// Separator used by every remote path, regardless of the host platform.
pub const SEPARATOR: char = '/';

/// Normalizes a remote path: backslashes become `/`, runs of separators are
/// collapsed and a trailing separator is dropped. A leading separator is kept.
pub fn normalize(path: &str) -> String {
    let mut normalized = String::with_capacity(path.len());
    let mut previous_was_separator = false;

    for c in path.chars() {
        let c = if c == '\\' { SEPARATOR } else { c };
        if c == SEPARATOR {
            if previous_was_separator {
                continue;
            }
            previous_was_separator = true;
        } else {
            previous_was_separator = false;
        }
        normalized.push(c);
    }

    if normalized.len() > 1 && normalized.ends_with(SEPARATOR) {
        normalized.pop();
    }
    normalized
}

/// Everything before the last separator, `""` when there is none.
pub fn dirname(path: &str) -> String {
    let normalized = normalize(path);
    match normalized.rfind(SEPARATOR) {
        Some(index) => normalized[..index].to_string(),
        None => String::new(),
    }
}

pub fn basename(path: &str) -> String {
    let normalized = normalize(path);
    match normalized.rfind(SEPARATOR) {
        Some(index) => normalized[index + 1..].to_string(),
        None => normalized,
    }
}

pub fn join(base: &str, other: &str) -> String {
    match (base.is_empty(), other.is_empty()) {
        (true, _) => normalize(other),
        (_, true) => normalize(base),
        _ => normalize(&format!("{base}{SEPARATOR}{other}")),
    }
}

/// Canonical prefix form: normalized, with a trailing separator unless empty.
pub fn as_base_directory(path: &str) -> String {
    let mut normalized = normalize(path);
    if !normalized.is_empty() && !normalized.ends_with(SEPARATOR) {
        normalized.push(SEPARATOR);
    }
    normalized
}

pub trait CloudPathExt {
    fn normalize_cloud_path(&self) -> String;
    fn cloud_dirname(&self) -> String;
    fn cloud_basename(&self) -> String;
    fn cloud_join(&self, other: &str) -> String;
    fn as_base_directory(&self) -> String;
}

impl CloudPathExt for str {
    fn normalize_cloud_path(&self) -> String {
        normalize(self)
    }

    fn cloud_dirname(&self) -> String {
        dirname(self)
    }

    fn cloud_basename(&self) -> String {
        basename(self)
    }

    fn cloud_join(&self, other: &str) -> String {
        join(self, other)
    }

    fn as_base_directory(&self) -> String {
        as_base_directory(self)
    }
}

impl CloudPathExt for String {
    fn normalize_cloud_path(&self) -> String {
        normalize(self)
    }

    fn cloud_dirname(&self) -> String {
        dirname(self)
    }

    fn cloud_basename(&self) -> String {
        basename(self)
    }

    fn cloud_join(&self, other: &str) -> String {
        join(self, other)
    }

    fn as_base_directory(&self) -> String {
        as_base_directory(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::*;

    #[rstest]
    #[case("", "")]
    #[case("/", "/")]
    #[case("a/b/c", "a/b/c")]
    #[case("a\\b\\c.txt", "a/b/c.txt")]
    #[case("a//b///c/", "a/b/c")]
    #[case("/docs/", "/docs")]
    fn normalize_cases(#[case] input: &str, #[case] expected: &str) {
        assert_eq!(input.normalize_cloud_path(), expected);
    }

    #[rstest]
    #[case("", "")]
    #[case("docs", "")]
    #[case("/docs", "")]
    #[case("/docs/readme.txt", "/docs")]
    #[case("a/b/c/", "a/b")]
    fn dirname_cases(#[case] input: &str, #[case] expected: &str) {
        assert_eq!(input.cloud_dirname(), expected);
    }

    #[rstest]
    #[case("", "")]
    #[case("/docs", "docs")]
    #[case("a/b/c.txt", "c.txt")]
    fn basename_cases(#[case] input: &str, #[case] expected: &str) {
        assert_eq!(input.cloud_basename(), expected);
    }

    #[rstest]
    #[case("", "a/b", "a/b")]
    #[case("wd/", "out", "wd/out")]
    #[case("wd", "/out/", "wd/out")]
    #[case("wd/", "", "wd")]
    #[case("", "/docs", "/docs")]
    fn join_cases(#[case] base: &str, #[case] other: &str, #[case] expected: &str) {
        assert_eq!(base.cloud_join(other), expected);
    }

    #[rstest]
    #[case("", "")]
    #[case("wd", "wd/")]
    #[case("wd/", "wd/")]
    #[case("job\\out", "job/out/")]
    fn base_directory_cases(#[case] input: &str, #[case] expected: &str) {
        assert_eq!(input.as_base_directory(), expected);
    }

    #[test]
    fn dirname_always_shortens_non_empty_paths() {
        for path in ["a", "/a", "a/b", "/a/b/c", "x/y/z/w.txt"] {
            assert!(path.cloud_dirname().len() < path.normalize_cloud_path().len());
        }
    }
}
