// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

//! Validated path values.
//!
//! Paths are plain strings with a kind attached. They never hold a handle
//! and are interpreted by whichever driver receives them: native drivers
//! treat them as host paths, the virtual backends as `/`-rooted keys.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

pub const SEPARATOR: char = '/';

fn check_common(kind: &str, value: &str) -> Result<()> {
    if value.is_empty() {
        return Err(Error::invalid_path(value, format!("{kind} must not be empty")));
    }
    if value.contains('\0') {
        return Err(Error::invalid_path(value, format!("{kind} must not contain NUL")));
    }
    Ok(())
}

macro_rules! path_kind {
    ($(#[$meta:meta])* $name:ident, $label:literal, $check:expr) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(try_from = "String", into = "String")]
        pub struct $name(String);

        impl $name {
            /// Validate and wrap `value`.
            pub fn new<S: Into<String>>(value: S) -> Result<Self> {
                let value = value.into();
                check_common($label, &value)?;
                let check: fn(&str) -> Result<()> = $check;
                check(&value)?;
                Ok(Self(value))
            }

            /// Wrap a value already known to be valid.
            pub(crate) fn new_unchecked<S: Into<String>>(value: S) -> Self {
                Self(value.into())
            }

            #[must_use]
            pub fn as_str(&self) -> &str {
                &self.0
            }

            #[must_use]
            pub fn into_string(self) -> String {
                self.0
            }

            /// Final path component; `/` for the root.
            #[must_use]
            pub fn name(&self) -> String {
                basename(&self.0)
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }

        impl FromStr for $name {
            type Err = Error;

            fn from_str(s: &str) -> Result<Self> {
                Self::new(s)
            }
        }

        impl TryFrom<String> for $name {
            type Error = Error;

            fn try_from(value: String) -> Result<Self> {
                Self::new(value)
            }
        }

        impl TryFrom<&str> for $name {
            type Error = Error;

            fn try_from(value: &str) -> Result<Self> {
                Self::new(value)
            }
        }

        impl From<$name> for String {
            fn from(value: $name) -> String {
                value.0
            }
        }
    };
}

path_kind!(
    /// A path starting with `/`.
    AbsolutePath,
    "absolute path",
    |s| {
        if s.starts_with(SEPARATOR) {
            Ok(())
        } else {
            Err(Error::invalid_path(s, "absolute path must start with '/'"))
        }
    }
);

path_kind!(
    /// A path that does not start with `/`.
    RelativePath,
    "relative path",
    |s| {
        if s.starts_with(SEPARATOR) {
            Err(Error::invalid_path(s, "relative path must not start with '/'"))
        } else {
            Ok(())
        }
    }
);

path_kind!(
    /// A path naming a file.
    FilePath,
    "file path",
    |_| Ok(())
);

path_kind!(
    /// A path naming a directory. Conventionally ends with `/`, but
    /// every driver accepts it either way.
    DirectoryPath,
    "directory path",
    |_| Ok(())
);

impl DirectoryPath {
    /// The root of a virtual namespace.
    #[must_use]
    pub fn root() -> Self {
        Self::new_unchecked("/")
    }

    /// Path of a child entry.
    #[must_use]
    pub fn join(&self, name: &str) -> FilePath {
        FilePath::new_unchecked(join(&self.0, name))
    }

    /// Path of a child directory.
    #[must_use]
    pub fn join_dir(&self, name: &str) -> DirectoryPath {
        DirectoryPath::new_unchecked(join(&self.0, name))
    }

    /// The same location with exactly one trailing separator.
    #[must_use]
    pub fn with_trailing_separator(&self) -> String {
        let trimmed = self.0.trim_end_matches(SEPARATOR);
        format!("{trimmed}{SEPARATOR}")
    }

    /// Reinterpret as a file path, e.g. to pass to `stat` or `rm`.
    #[must_use]
    pub fn as_file_path(&self) -> FilePath {
        FilePath::new_unchecked(self.0.clone())
    }
}

impl FilePath {
    /// Parent directory, `None` at a root or for a bare name.
    #[must_use]
    pub fn parent(&self) -> Option<DirectoryPath> {
        parent(&self.0).map(DirectoryPath::new_unchecked)
    }

    /// Reinterpret as a directory path, e.g. to pass to `readdir` or `mkdir`.
    #[must_use]
    pub fn as_directory_path(&self) -> DirectoryPath {
        DirectoryPath::new_unchecked(self.0.clone())
    }
}

impl From<AbsolutePath> for FilePath {
    fn from(value: AbsolutePath) -> Self {
        FilePath::new_unchecked(value.0)
    }
}

impl From<AbsolutePath> for DirectoryPath {
    fn from(value: AbsolutePath) -> Self {
        DirectoryPath::new_unchecked(value.0)
    }
}

impl From<RelativePath> for FilePath {
    fn from(value: RelativePath) -> Self {
        FilePath::new_unchecked(value.0)
    }
}

/// Normalize a path in a `/`-rooted virtual namespace.
///
/// Empty and `.` map to `/`; a leading separator is added; repeated,
/// trailing and `.` components are dropped. `..` is kept as-is so callers
/// that care about escaping the root can reject it.
#[must_use]
pub fn normalize_virtual(path: &str) -> String {
    let parts: Vec<&str> = path
        .split(SEPARATOR)
        .filter(|p| !p.is_empty() && *p != ".")
        .collect();
    if parts.is_empty() {
        return "/".to_string();
    }
    format!("/{}", parts.join("/"))
}

/// Last component of `path`, ignoring trailing separators.
#[must_use]
pub fn basename(path: &str) -> String {
    let trimmed = path.trim_end_matches(SEPARATOR);
    if trimmed.is_empty() {
        return if path.is_empty() {
            String::new()
        } else {
            "/".to_string()
        };
    }
    match trimmed.rfind(SEPARATOR) {
        Some(idx) => trimmed[idx + 1..].to_string(),
        None => trimmed.to_string(),
    }
}

/// Parent of `path`, ignoring trailing separators.
#[must_use]
pub fn parent(path: &str) -> Option<String> {
    let trimmed = path.trim_end_matches(SEPARATOR);
    if trimmed.is_empty() {
        return None;
    }
    let idx = trimmed.rfind(SEPARATOR)?;
    if idx == 0 {
        Some("/".to_string())
    } else {
        Some(trimmed[..idx].to_string())
    }
}

/// Join a directory and a child name with a single separator.
#[must_use]
pub fn join(dir: &str, name: &str) -> String {
    let dir = dir.trim_end_matches(SEPARATOR);
    let name = name.trim_start_matches(SEPARATOR);
    if dir.is_empty() && name.is_empty() {
        "/".to_string()
    } else {
        format!("{dir}{SEPARATOR}{name}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    #[test]
    fn test_absolute_requires_leading_separator() {
        assert!(AbsolutePath::new("/a/b").is_ok());
        let err = AbsolutePath::new("a/b").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidInput);
        assert!(AbsolutePath::new("").is_err());
    }

    #[test]
    fn test_relative_rejects_leading_separator() {
        assert!(RelativePath::new("a/b").is_ok());
        assert!(RelativePath::new("/a").is_err());
        assert!(RelativePath::new("").is_err());
    }

    #[test]
    fn test_nul_is_rejected() {
        assert!(FilePath::new("/a\0b").is_err());
        assert!(DirectoryPath::new("\0").is_err());
    }

    #[test]
    fn test_round_trip_through_display() {
        for raw in ["/", "/a/b.txt", "/dir/", "notes.txt", "./x"] {
            let f = FilePath::new(raw).unwrap();
            assert_eq!(FilePath::new(f.to_string()).unwrap(), f);
            let d = DirectoryPath::new(raw).unwrap();
            assert_eq!(d.to_string().parse::<DirectoryPath>().unwrap(), d);
        }
        let a = AbsolutePath::new("/x/y").unwrap();
        assert_eq!(AbsolutePath::new(a.to_string()).unwrap(), a);
        let r = RelativePath::new("x/y").unwrap();
        assert_eq!(RelativePath::new(r.to_string()).unwrap(), r);
    }

    #[test]
    fn test_serde_validates() {
        let p: FilePath = serde_json::from_str("\"/a/b\"").unwrap();
        assert_eq!(p.as_str(), "/a/b");
        assert!(serde_json::from_str::<AbsolutePath>("\"rel\"").is_err());
        assert_eq!(serde_json::to_string(&p).unwrap(), "\"/a/b\"");
    }

    #[test]
    fn test_normalize_virtual() {
        assert_eq!(normalize_virtual(""), "/");
        assert_eq!(normalize_virtual("."), "/");
        assert_eq!(normalize_virtual("/"), "/");
        assert_eq!(normalize_virtual("a/b/"), "/a/b");
        assert_eq!(normalize_virtual("//a//./b"), "/a/b");
        assert_eq!(normalize_virtual("/a/../b"), "/a/../b");
    }

    #[test]
    fn test_components() {
        assert_eq!(basename("/a/b.txt"), "b.txt");
        assert_eq!(basename("/a/dir/"), "dir");
        assert_eq!(basename("/"), "/");
        assert_eq!(basename("name"), "name");
        assert_eq!(parent("/a/b"), Some("/a".to_string()));
        assert_eq!(parent("/a"), Some("/".to_string()));
        assert_eq!(parent("/"), None);
        assert_eq!(parent("name"), None);
        assert_eq!(join("/", "a"), "/a");
        assert_eq!(join("/a/", "b"), "/a/b");
    }

    #[test]
    fn test_directory_helpers() {
        let dir = DirectoryPath::new("/src").unwrap();
        assert_eq!(dir.join("main.rs").as_str(), "/src/main.rs");
        assert_eq!(dir.with_trailing_separator(), "/src/");
        assert_eq!(DirectoryPath::root().with_trailing_separator(), "/");
        let file = dir.join("main.rs");
        assert_eq!(file.parent().unwrap().as_str(), "/src");
        assert_eq!(file.name(), "main.rs");
    }
}
