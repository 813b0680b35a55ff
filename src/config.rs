// SPDX-FileCopyrightText: 2025 Jason Pena <jasonpena@awkless.com>
// SPDX-License-Identifier: MIT

//! Configuration layout.
//!
//! Specify the layout for files that dirhop reads and writes to simplify the
//! process of serialization and deserialization. File I/O is left to the
//! caller to figure out.

use crate::stack::Entry;

use serde::{Deserialize, Serialize};
use std::{
    fmt::{Display, Error as FmtError, Formatter, Result as FmtResult},
    str::FromStr,
    string::FromUtf8Error,
};

/// Current version of the directory stack file layout.
pub const STACK_FILE_VERSION: u32 = 1;

/// Directory stack file layout.
///
/// A flat, versioned listing of stack entries. Entries are written most
/// recently visited first, but readers must not rely on that ordering.
///
/// # General Layout
///
/// ```toml
/// version = 1
///
/// [[entry]]
/// path = "/tmp"
/// visited_at = "2025-01-01T12:00:00.123456789+01:00"
/// ```
#[derive(Debug, PartialEq, Eq, Clone, Deserialize, Serialize)]
pub struct StackFile {
    /// Layout version.
    pub version: u32,

    /// Recorded stack entries.
    #[serde(rename = "entry", default)]
    pub entries: Vec<Entry>,
}

impl StackFile {
    /// Construct new stack file layout of the current version.
    pub fn new(entries: impl IntoIterator<Item = Entry>) -> Self {
        Self {
            version: STACK_FILE_VERSION,
            entries: entries.into_iter().collect(),
        }
    }
}

impl FromStr for StackFile {
    type Err = ConfigError;

    fn from_str(data: &str) -> Result<Self, Self::Err> {
        let layout: StackFile = toml::de::from_str(data).map_err(ConfigError::Deserialize)?;

        // INVARIANT: Never guess at layouts from the future.
        if layout.version != STACK_FILE_VERSION {
            return Err(ConfigError::UnsupportedVersion {
                found: layout.version,
                expected: STACK_FILE_VERSION,
            });
        }

        Ok(layout)
    }
}

impl StackFile {
    /// Serialize layout into TOML.
    ///
    /// # Errors
    ///
    /// - Return [`ConfigError::Serialize`] if some value has no TOML form,
    ///   e.g., a path that is not valid UTF-8.
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        toml::ser::to_string_pretty(self).map_err(ConfigError::Serialize)
    }
}

impl Display for StackFile {
    fn fmt(&self, fmt: &mut Formatter<'_>) -> FmtResult {
        fmt.write_str(self.to_toml()?.as_str())
    }
}

/// Bookmark file layout.
///
/// # General Layout
///
/// ```toml
/// [[bookmark]]
/// path = "~/src/*"
/// desc = "source trees"
/// ```
///
/// Paths may start with `~`, and may contain glob patterns.
#[derive(Default, Debug, PartialEq, Eq, Clone, Deserialize, Serialize)]
pub struct BookmarkFile {
    /// Bookmark definitions.
    #[serde(rename = "bookmark", default)]
    pub bookmarks: Vec<BookmarkDefinition>,
}

impl FromStr for BookmarkFile {
    type Err = ConfigError;

    fn from_str(data: &str) -> Result<Self, Self::Err> {
        let mut layout: BookmarkFile =
            toml::de::from_str(data).map_err(ConfigError::Deserialize)?;

        // INVARIANT: Perform tilde expansion on bookmark paths.
        for bookmark in &mut layout.bookmarks {
            bookmark.path = shellexpand::tilde(bookmark.path.as_str()).into_owned();
        }

        Ok(layout)
    }
}

impl BookmarkFile {
    /// Serialize layout into TOML.
    ///
    /// # Errors
    ///
    /// - Return [`ConfigError::Serialize`] if layout cannot be serialized.
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        toml::ser::to_string_pretty(self).map_err(ConfigError::Serialize)
    }
}

impl Display for BookmarkFile {
    fn fmt(&self, fmt: &mut Formatter<'_>) -> FmtResult {
        fmt.write_str(self.to_toml()?.as_str())
    }
}

/// Single bookmark definition.
#[derive(Default, Debug, PartialEq, Eq, Clone, Deserialize, Serialize)]
pub struct BookmarkDefinition {
    /// Directory path or glob pattern of directories.
    pub path: String,

    /// Short description shown next to the path.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub desc: Option<String>,
}

/// Recently used bookmark file layout.
#[derive(Default, Debug, PartialEq, Eq, Clone, Deserialize, Serialize)]
pub struct RecentFile {
    /// Paths, most recently used first.
    #[serde(default)]
    pub paths: Vec<String>,
}

impl FromStr for RecentFile {
    type Err = ConfigError;

    fn from_str(data: &str) -> Result<Self, Self::Err> {
        toml::de::from_str(data).map_err(ConfigError::Deserialize)
    }
}

impl RecentFile {
    /// Serialize layout into TOML.
    ///
    /// # Errors
    ///
    /// - Return [`ConfigError::Serialize`] if layout cannot be serialized.
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        toml::ser::to_string_pretty(self).map_err(ConfigError::Serialize)
    }
}

impl Display for RecentFile {
    fn fmt(&self, fmt: &mut Formatter<'_>) -> FmtResult {
        fmt.write_str(self.to_toml()?.as_str())
    }
}

/// Configuration error types.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Failed to deserialize configuration.
    #[error(transparent)]
    Deserialize(#[from] toml::de::Error),

    /// Failed to serialize configuration.
    #[error(transparent)]
    Serialize(#[from] toml::ser::Error),

    /// File contents are not valid UTF-8.
    #[error(transparent)]
    Encoding(#[from] FromUtf8Error),

    /// File layout version is not understood.
    #[error("unsupported file layout version {found}, expected {expected}")]
    UnsupportedVersion { found: u32, expected: u32 },
}

impl From<ConfigError> for FmtError {
    fn from(_: ConfigError) -> Self {
        FmtError
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Local, TimeZone};
    use indoc::indoc;
    use pretty_assertions::assert_eq;
    use sealed_test::prelude::*;
    use std::path::PathBuf;

    #[test]
    fn deserialize_stack_file() -> anyhow::Result<()> {
        let result: StackFile = indoc! {r#"
            version = 1

            [[entry]]
            path = "/etc"
            visited_at = "2025-03-04T05:06:07.000000123Z"

            [[entry]]
            path = "/tmp"
            visited_at = "2025-03-04T05:06:00Z"
        "#}
        .parse()?;

        let expect = StackFile::new([
            Entry {
                path: PathBuf::from("/etc"),
                visited_at: Local.timestamp_opt(1741064767, 123).unwrap(),
            },
            Entry {
                path: PathBuf::from("/tmp"),
                visited_at: Local.timestamp_opt(1741064760, 0).unwrap(),
            },
        ]);
        assert_eq!(result, expect);

        Ok(())
    }

    #[test]
    fn stack_file_layout_survives_display() -> anyhow::Result<()> {
        let layout = StackFile::new([Entry {
            path: PathBuf::from("/srv/with space"),
            visited_at: Local.timestamp_opt(1700000000, 987654321).unwrap(),
        }]);

        let result: StackFile = layout.to_string().parse()?;
        assert_eq!(result, layout);

        Ok(())
    }

    #[test]
    fn reject_unknown_stack_file_version() {
        let result = "version = 2\n".parse::<StackFile>();
        assert!(matches!(
            result,
            Err(ConfigError::UnsupportedVersion {
                found: 2,
                expected: 1
            })
        ));
    }

    #[test]
    fn non_utf8_path_fails_to_serialize() {
        use std::{ffi::OsStr, os::unix::ffi::OsStrExt};

        let layout = StackFile::new([Entry {
            path: PathBuf::from(OsStr::from_bytes(b"/tmp/bad\xff")),
            visited_at: Local.timestamp_opt(1700000000, 0).unwrap(),
        }]);
        assert!(matches!(layout.to_toml(), Err(ConfigError::Serialize(_))));
    }

    #[test]
    fn reject_garbage_stack_file() {
        let result = "\u{0}\u{1}not toml at all [[[".parse::<StackFile>();
        assert!(matches!(result, Err(ConfigError::Deserialize(_))));
    }

    #[sealed_test(env = [("HOME", "/home/blah")])]
    fn deserialize_bookmark_file() -> anyhow::Result<()> {
        let result: BookmarkFile = indoc! {r#"
            [[bookmark]]
            path = "~/src/*"
            desc = "source trees"

            [[bookmark]]
            path = "/etc"
        "#}
        .parse()?;

        let expect = BookmarkFile {
            bookmarks: vec![
                BookmarkDefinition {
                    path: "/home/blah/src/*".into(),
                    desc: Some("source trees".into()),
                },
                BookmarkDefinition {
                    path: "/etc".into(),
                    desc: None,
                },
            ],
        };
        assert_eq!(result, expect);

        Ok(())
    }

    #[test]
    fn serialize_bookmark_file() -> anyhow::Result<()> {
        let layout = BookmarkFile {
            bookmarks: vec![
                BookmarkDefinition {
                    path: "/etc".into(),
                    desc: Some("system config".into()),
                },
                BookmarkDefinition {
                    path: "/srv".into(),
                    desc: None,
                },
            ],
        };
        let result = layout.to_string();

        assert!(result.contains("[[bookmark]]"));
        assert_eq!(result.matches("desc").count(), 1);
        assert_eq!(result.parse::<BookmarkFile>()?, layout);

        Ok(())
    }
}
