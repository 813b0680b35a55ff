// SPDX-FileCopyrightText: 2025 Jason Pena <jasonpena@awkless.com>
// SPDX-License-Identifier: MIT

//! Bookmarked directories.
//!
//! Bookmarks are kept in a hand edited file, see [`BookmarkFile`] for its
//! layout. A bookmark path may be a glob pattern, in which case every
//! directory it matches becomes a bookmark of its own.
//!
//! Bookmarks are listed sorted by path, except that the ones used most
//! recently float to the top. Recent use is tracked separately in a
//! [`RecentlyUsed`] file that only ever holds the last
//! [`RecentlyUsed::CAPACITY`] paths.

use crate::{
    config::{BookmarkDefinition, BookmarkFile, ConfigError, RecentFile},
    term::Printer,
};

use nu_ansi_term::Color;
use std::{
    cmp::Ordering,
    fs::{read_to_string, write},
    path::{Path, PathBuf},
};
use tracing::{debug, info, instrument, warn};

/// Single bookmarked directory.
#[derive(Debug, Clone)]
pub struct Bookmark {
    /// Absolute path of directory.
    pub path: String,

    /// Optional description.
    pub description: Option<String>,
}

impl Bookmark {
    /// Construct new bookmark.
    pub fn new(path: impl Into<String>, description: Option<String>) -> Self {
        Self {
            path: path.into(),
            description,
        }
    }

    /// Format bookmark for listing.
    pub fn format(&self, printer: &Printer) -> String {
        let mut line = printer.paint(&self.path, Color::Green);
        if let Some(description) = &self.description {
            line.push_str(&format!("\t({description})"));
        }

        line
    }
}

// INVARIANT: Bookmarks are identified by path alone.
impl PartialEq for Bookmark {
    fn eq(&self, other: &Self) -> bool {
        self.path == other.path
    }
}

impl Eq for Bookmark {}

impl PartialOrd for Bookmark {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Bookmark {
    fn cmp(&self, other: &Self) -> Ordering {
        self.path.cmp(&other.path)
    }
}

/// Bookmarks loaded from a bookmark file.
#[derive(Debug, Clone)]
pub struct Bookmarks {
    file: PathBuf,
    bookmarks: Vec<Bookmark>,
}

impl Bookmarks {
    /// Load bookmarks from target file.
    ///
    /// A missing file means no bookmarks. Plain paths that do not exist, and
    /// malformed glob patterns, are skipped with a warning. Glob patterns
    /// expand to the directories they match.
    ///
    /// # Errors
    ///
    /// - Return [`BookmarkError::Read`] if file exists but cannot be read.
    /// - Return [`BookmarkError::Parse`] if file cannot be parsed.
    #[instrument(skip(file), level = "debug")]
    pub fn load(file: impl Into<PathBuf>) -> Result<Self> {
        let file = file.into();
        let mut bookmarks = Vec::new();
        if !file.exists() {
            debug!("no bookmark file at {:?}", file.display());
            return Ok(Self { file, bookmarks });
        }

        let layout: BookmarkFile = read_to_string(&file)
            .map_err(|err| BookmarkError::Read {
                source: err,
                path: file.clone(),
            })?
            .parse()
            .map_err(|err| BookmarkError::Parse {
                source: err,
                path: file.clone(),
            })?;

        for definition in layout.bookmarks {
            if !definition.path.contains('*') && !Path::new(&definition.path).exists() {
                warn!(
                    "bookmark {:?} doesn't exist, file: {:?}",
                    definition.path,
                    file.display()
                );
                continue;
            }

            let matches = match glob::glob(&definition.path) {
                Ok(matches) => matches,
                Err(error) => {
                    warn!(
                        "bookmark {:?} is not a valid pattern, file: {:?}: {error}",
                        definition.path,
                        file.display()
                    );
                    continue;
                }
            };

            for matched in matches.flatten() {
                if matched.is_dir() {
                    bookmarks.push(Bookmark::new(
                        matched.to_string_lossy(),
                        definition.desc.clone(),
                    ));
                }
            }
        }

        Ok(Self { file, bookmarks })
    }

    /// Path of bookmark file.
    pub fn file(&self) -> &Path {
        self.file.as_path()
    }

    /// Number of bookmarks.
    pub fn len(&self) -> usize {
        self.bookmarks.len()
    }

    /// Check if there are no bookmarks.
    pub fn is_empty(&self) -> bool {
        self.bookmarks.is_empty()
    }

    /// Check if path is bookmarked.
    pub fn contains(&self, path: impl AsRef<Path>) -> bool {
        self.bookmarks
            .iter()
            .any(|bookmark| Path::new(&bookmark.path) == path.as_ref())
    }

    /// Bookmark a new directory, appending it to the bookmark file.
    ///
    /// Existing contents of the bookmark file are left untouched. Returns
    /// `false` if the directory was already bookmarked.
    ///
    /// # Errors
    ///
    /// - Return [`BookmarkError::NotADirectory`] if path is not a directory.
    /// - Return [`BookmarkError::Encode`] if bookmark cannot be serialized.
    /// - Return [`BookmarkError::Write`] if bookmark file cannot be written.
    pub fn bookmark(&mut self, path: impl AsRef<Path>, description: Option<String>) -> Result<bool> {
        let path = path.as_ref();
        if !path.is_dir() {
            return Err(BookmarkError::NotADirectory {
                path: path.to_path_buf(),
            });
        }

        if self.contains(path) {
            info!("{:?} is already bookmarked", path.display());
            return Ok(false);
        }

        let definition = BookmarkDefinition {
            path: path.to_string_lossy().into_owned(),
            desc: description,
        };
        let mut content = read_to_string(&self.file).unwrap_or_default();
        if !content.is_empty() && !content.ends_with('\n') {
            content.push('\n');
        }
        if !content.is_empty() {
            content.push('\n');
        }
        let appended = BookmarkFile {
            bookmarks: vec![definition.clone()],
        }
        .to_toml()
        .map_err(|err| BookmarkError::Encode {
            source: err,
            path: self.file.clone(),
        })?;
        content.push_str(&appended);
        write_file(&self.file, &content)?;

        self.bookmarks.push(Bookmark::new(definition.path, definition.desc));
        Ok(true)
    }

    /// Bookmarks sorted by path, with recently used ones moved to the front.
    ///
    /// Recently used paths keep their recency order. Recent paths that are not
    /// bookmarked are ignored.
    pub fn ordered(&self, recent: Option<&RecentlyUsed>) -> Vec<&Bookmark> {
        let mut sorted: Vec<&Bookmark> = self.bookmarks.iter().collect();
        sorted.sort();
        sorted.dedup();

        let Some(recent) = recent else {
            return sorted;
        };

        let mut ordered = Vec::with_capacity(sorted.len());
        for path in recent.paths() {
            if let Some(position) = sorted.iter().position(|bookmark| &bookmark.path == path) {
                ordered.push(sorted.remove(position));
            }
        }
        ordered.extend(sorted);

        ordered
    }
}

/// Recently used bookmark paths.
///
/// # Invariant
///
/// - Most recently used path comes first.
/// - No duplicate paths.
/// - Holds at most [`RecentlyUsed::CAPACITY`] paths.
#[derive(Debug, Clone)]
pub struct RecentlyUsed {
    file: PathBuf,
    paths: Vec<String>,
}

impl RecentlyUsed {
    /// Maximum number of remembered paths.
    pub const CAPACITY: usize = 10;

    /// Load recently used paths from target file.
    ///
    /// # Errors
    ///
    /// - Return [`BookmarkError::Read`] if file exists but cannot be read.
    /// - Return [`BookmarkError::Parse`] if file cannot be parsed.
    pub fn load(file: impl Into<PathBuf>) -> Result<Self> {
        let file = file.into();
        if !file.exists() {
            return Ok(Self {
                file,
                paths: Vec::new(),
            });
        }

        let layout: RecentFile = read_to_string(&file)
            .map_err(|err| BookmarkError::Read {
                source: err,
                path: file.clone(),
            })?
            .parse()
            .map_err(|err| BookmarkError::Parse {
                source: err,
                path: file.clone(),
            })?;
        info!(
            "read {} recently used paths from {:?}",
            layout.paths.len(),
            file.display()
        );

        Ok(Self {
            file,
            paths: layout.paths,
        })
    }

    /// Recently used paths, most recent first.
    pub fn paths(&self) -> &[String] {
        self.paths.as_slice()
    }

    /// Move path to the front, then write file.
    ///
    /// # Errors
    ///
    /// - Return [`BookmarkError::Encode`] if paths cannot be serialized.
    /// - Return [`BookmarkError::Write`] if file cannot be written.
    pub fn add(&mut self, path: impl Into<String>) -> Result<()> {
        let path = path.into();
        self.paths.retain(|known| known != &path);
        self.paths.insert(0, path);
        self.paths.truncate(Self::CAPACITY);

        let content = RecentFile {
            paths: self.paths.clone(),
        }
        .to_toml()
        .map_err(|err| BookmarkError::Encode {
            source: err,
            path: self.file.clone(),
        })?;
        write_file(&self.file, &content)?;
        debug!("wrote paths to {:?}: {:?}", self.file.display(), self.paths);

        Ok(())
    }
}

fn write_file(path: &Path, content: &str) -> Result<()> {
    let wrap = |err| BookmarkError::Write {
        source: err,
        path: path.to_path_buf(),
    };
    if let Some(parent) = path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
        mkdirp::mkdirp(parent).map_err(wrap)?;
    }

    write(path, content).map_err(wrap)
}

/// Bookmark error types.
#[derive(Debug, thiserror::Error)]
pub enum BookmarkError {
    /// File cannot be read from.
    #[error("failed to read from {:?}", path.display())]
    Read {
        #[source]
        source: std::io::Error,
        path: PathBuf,
    },

    /// File cannot be written to.
    #[error("failed to write to {:?}", path.display())]
    Write {
        #[source]
        source: std::io::Error,
        path: PathBuf,
    },

    /// File contents cannot be understood.
    #[error("failed to parse {:?}", path.display())]
    Parse {
        #[source]
        source: ConfigError,
        path: PathBuf,
    },

    /// Contents cannot be serialized for file.
    #[error("failed to encode contents of {:?}", path.display())]
    Encode {
        #[source]
        source: ConfigError,
        path: PathBuf,
    },

    /// Only directories can be bookmarked.
    #[error("{:?} is not a directory", path.display())]
    NotADirectory { path: PathBuf },
}

/// Friendly result alias :3
pub type Result<T, E = BookmarkError> = std::result::Result<T, E>;

#[cfg(test)]
mod tests {
    use super::*;
    use indoc::formatdoc;
    use pretty_assertions::assert_eq;
    use sealed_test::prelude::*;
    use std::{env, fs};

    fn cwd() -> anyhow::Result<PathBuf> {
        Ok(env::current_dir()?.canonicalize()?)
    }

    fn paths(bookmarks: Vec<&Bookmark>) -> Vec<String> {
        bookmarks.into_iter().map(|bookmark| bookmark.path.clone()).collect()
    }

    #[sealed_test]
    fn missing_file_means_no_bookmarks() -> anyhow::Result<()> {
        let bookmarks = Bookmarks::load(cwd()?.join("bookmarks.toml"))?;
        assert!(bookmarks.is_empty());

        Ok(())
    }

    #[sealed_test]
    fn load_expands_globs_and_skips_missing() -> anyhow::Result<()> {
        let cwd = cwd()?;
        for dir in ["src/one", "src/two", "etc"] {
            fs::create_dir_all(cwd.join(dir))?;
        }
        fs::write(cwd.join("src/not-a-dir"), "")?;
        let file = cwd.join("bookmarks.toml");
        fs::write(
            &file,
            formatdoc! {r#"
                [[bookmark]]
                path = "{cwd}/src/*"
                desc = "sources"

                [[bookmark]]
                path = "{cwd}/etc"

                [[bookmark]]
                path = "{cwd}/missing"
            "#, cwd = cwd.display()},
        )?;

        let bookmarks = Bookmarks::load(&file)?;
        assert_eq!(bookmarks.len(), 3);
        assert!(bookmarks.contains(cwd.join("src/one")));
        assert!(bookmarks.contains(cwd.join("etc")));
        assert!(!bookmarks.contains(cwd.join("missing")));
        assert!(!bookmarks.contains(cwd.join("src/not-a-dir")));

        let printer = Printer::new(false);
        let lines: Vec<String> = bookmarks
            .ordered(None)
            .into_iter()
            .map(|bookmark| bookmark.format(&printer))
            .collect();
        assert_eq!(
            lines,
            vec![
                format!("{}", cwd.join("etc").display()),
                format!("{}\t(sources)", cwd.join("src/one").display()),
                format!("{}\t(sources)", cwd.join("src/two").display()),
            ]
        );

        Ok(())
    }

    #[sealed_test]
    fn malformed_pattern_is_skipped() -> anyhow::Result<()> {
        let cwd = cwd()?;
        fs::create_dir_all(cwd.join("src/one"))?;
        fs::create_dir_all(cwd.join("etc"))?;
        let file = cwd.join("bookmarks.toml");
        fs::write(
            &file,
            formatdoc! {r#"
                [[bookmark]]
                path = "{cwd}/src/[*"

                [[bookmark]]
                path = "{cwd}/etc"
                desc = "config"
            "#, cwd = cwd.display()},
        )?;

        let bookmarks = Bookmarks::load(&file)?;
        assert_eq!(bookmarks.len(), 1);
        assert!(bookmarks.contains(cwd.join("etc")));

        let printer = Printer::new(false);
        assert_eq!(
            bookmarks.ordered(None)[0].format(&printer),
            format!("{}\t(config)", cwd.join("etc").display())
        );

        Ok(())
    }

    #[sealed_test]
    fn recently_used_bookmarks_come_first() -> anyhow::Result<()> {
        let cwd = cwd()?;
        for dir in ["a", "b", "c"] {
            fs::create_dir_all(cwd.join(dir))?;
        }
        let mut bookmarks = Bookmarks::load(cwd.join("bookmarks.toml"))?;
        for dir in ["c", "a", "b"] {
            bookmarks.bookmark(cwd.join(dir), None)?;
        }

        let mut recent = RecentlyUsed::load(cwd.join("recent.toml"))?;
        recent.add(cwd.join("b").to_string_lossy())?;
        recent.add(cwd.join("c").to_string_lossy())?;
        recent.add("/not/bookmarked")?;

        let name = |dir: &str| cwd.join(dir).to_string_lossy().into_owned();
        assert_eq!(paths(bookmarks.ordered(None)), vec![name("a"), name("b"), name("c")]);
        assert_eq!(
            paths(bookmarks.ordered(Some(&recent))),
            vec![name("c"), name("b"), name("a")]
        );

        Ok(())
    }

    #[sealed_test]
    fn bookmark_appends_to_file() -> anyhow::Result<()> {
        let cwd = cwd()?;
        fs::create_dir_all(cwd.join("a"))?;
        let file = cwd.join("config/bookmarks.toml");

        let mut bookmarks = Bookmarks::load(&file)?;
        assert!(bookmarks.bookmark(cwd.join("a"), Some("first".into()))?);
        assert!(!bookmarks.bookmark(cwd.join("a"), None)?);
        assert!(matches!(
            bookmarks.bookmark(cwd.join("missing"), None),
            Err(BookmarkError::NotADirectory { .. })
        ));

        let reloaded = Bookmarks::load(&file)?;
        assert_eq!(reloaded.len(), 1);
        assert_eq!(reloaded.ordered(None)[0].description.as_deref(), Some("first"));

        Ok(())
    }

    #[sealed_test]
    fn recently_used_is_capped_and_deduplicated() -> anyhow::Result<()> {
        let file = cwd()?.join("recent.toml");
        let mut recent = RecentlyUsed::load(&file)?;
        for index in 0..15 {
            recent.add(format!("/dir/{index}"))?;
        }
        recent.add("/dir/10")?;

        let reloaded = RecentlyUsed::load(&file)?;
        assert_eq!(reloaded.paths().len(), RecentlyUsed::CAPACITY);
        assert_eq!(reloaded.paths()[0], "/dir/10");
        assert_eq!(reloaded.paths()[1], "/dir/14");
        assert_eq!(reloaded.paths().iter().filter(|p| *p == "/dir/10").count(), 1);

        Ok(())
    }
}
