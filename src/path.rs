// SPDX-FileCopyrightText: 2025 Jason Pena <jasonpena@awkless.com>
// SPDX-License-Identifier: MIT

//! Path resolution utilities.
//!
//! Determine relevent path information for the files dirhop manages, and
//! normalize user supplied paths into the canonical keys used by the
//! directory stack.
//!
//! # Stack Keys
//!
//! Every entry of the directory stack is keyed by an absolute path with any
//! symbolic links resolved. User input can arrive in three shapes: a raw
//! string typed on the command line, a path that already went through
//! normalization, or an existing stack [`Entry`]. All three are funneled
//! through [`IntoStackKey`] so the stack never has to care which one it got.

use crate::stack::Entry;

use std::{
    env,
    path::{Component, Path, PathBuf},
};

/// Determine absolute path to user's home directory.
///
/// Does not check if the path returned actually exists.
///
/// # Errors
///
/// - Return [`NoWayHome`] if home directory path cannot be determined.
pub fn home_dir() -> Result<PathBuf> {
    dirs::home_dir().ok_or(NoWayHome)
}

/// Determine default absolute path to the directory stack file.
///
/// Uses XDG Base Directory path `$XDG_CACHE_HOME/dirhop/dirstack.toml`. Does
/// not check if the path returned actually exists.
///
/// # Errors
///
/// - Return [`NoWayHome`] if home directory path cannot be determined.
///
/// # See Also
///
/// - [XDG Base Directory](https://wiki.archlinux.org/title/XDG_Base_Directory)
pub fn default_stack_file() -> Result<PathBuf> {
    cache_dir().map(|path| path.join("dirstack.toml"))
}

/// Determine default absolute path to the bookmark file.
///
/// Uses `$XDG_CONFIG_HOME/dirhop/bookmarks.toml`.
///
/// # Errors
///
/// - Return [`NoWayHome`] if home directory path cannot be determined.
pub fn default_bookmark_file() -> Result<PathBuf> {
    dirs::config_dir()
        .map(|path| path.join("dirhop").join("bookmarks.toml"))
        .ok_or(NoWayHome)
}

/// Determine default absolute path to the recently used bookmark file.
///
/// # Errors
///
/// - Return [`NoWayHome`] if home directory path cannot be determined.
pub fn default_recent_file() -> Result<PathBuf> {
    cache_dir().map(|path| path.join("fzfdirs-recent.toml"))
}

fn cache_dir() -> Result<PathBuf> {
    dirs::cache_dir()
        .map(|path| path.join("dirhop"))
        .ok_or(NoWayHome)
}

/// Resolve user input relative to a working directory and home directory.
///
/// Normalization is a function of the input, the working directory, and the
/// home directory alone. Keeping both directories in one value lets callers
/// pin them down explicitly instead of relying on process state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathResolver {
    cwd: PathBuf,
    home: PathBuf,
}

impl PathResolver {
    /// Construct new resolver from explicit directories.
    pub fn new(cwd: impl Into<PathBuf>, home: impl Into<PathBuf>) -> Self {
        Self {
            cwd: cwd.into(),
            home: home.into(),
        }
    }

    /// Construct new resolver from current process environment.
    ///
    /// # Errors
    ///
    /// - Return [`NoWayHome`] if either the current working directory or the
    ///   home directory cannot be determined.
    pub fn from_env() -> Result<Self> {
        let cwd = env::current_dir().map_err(|_| NoWayHome)?;
        Ok(Self::new(cwd, home_dir()?))
    }

    /// Current working directory used as resolution base.
    pub fn cwd(&self) -> &Path {
        self.cwd.as_path()
    }

    /// Home directory used for `~` expansion.
    pub fn home(&self) -> &Path {
        self.home.as_path()
    }

    /// Resolve raw user input into an absolute, symlink-resolved path.
    ///
    /// Expands a leading `~` and joins relative input onto the working
    /// directory. Components are then walked one at a time, following symbolic
    /// links before any `..` that comes after them is applied. Components that
    /// do not exist are kept verbatim.
    pub fn resolve(&self, input: impl AsRef<str>) -> PathBuf {
        let expanded = shellexpand::tilde_with_context(input.as_ref(), || self.home.to_str());
        resolve_links(&self.cwd.join(expanded.as_ref()))
    }
}

/// Convert some value into a directory stack key.
pub trait IntoStackKey {
    /// Produce the canonical key for this value.
    fn into_stack_key(self, resolver: &PathResolver) -> PathBuf;
}

impl IntoStackKey for &str {
    fn into_stack_key(self, resolver: &PathResolver) -> PathBuf {
        resolver.resolve(self)
    }
}

impl IntoStackKey for String {
    fn into_stack_key(self, resolver: &PathResolver) -> PathBuf {
        resolver.resolve(self)
    }
}

impl IntoStackKey for &String {
    fn into_stack_key(self, resolver: &PathResolver) -> PathBuf {
        resolver.resolve(self)
    }
}

impl IntoStackKey for PathBuf {
    fn into_stack_key(self, _: &PathResolver) -> PathBuf {
        self
    }
}

impl IntoStackKey for &Path {
    fn into_stack_key(self, _: &PathResolver) -> PathBuf {
        self.to_path_buf()
    }
}

impl IntoStackKey for Entry {
    fn into_stack_key(self, _: &PathResolver) -> PathBuf {
        self.path
    }
}

impl IntoStackKey for &Entry {
    fn into_stack_key(self, _: &PathResolver) -> PathBuf {
        self.path.clone()
    }
}

fn resolve_links(path: &Path) -> PathBuf {
    let mut resolved = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                resolved.pop();
            }
            other => {
                resolved.push(other.as_os_str());

                // INVARIANT: Missing components stay lexical.
                if let Ok(real) = resolved.canonicalize() {
                    resolved = real;
                }
            }
        }
    }

    resolved
}

/// No way to determine user's home directory.
///
/// # See Also
///
/// - [`dirs::home_dir`](https://docs.rs/dirs/latest/dirs/fn.home_dir.html)
#[derive(Clone, Debug, thiserror::Error)]
#[error("cannot determine absolute path to user's home directory")]
pub struct NoWayHome;

/// Friendly result alias :3
pub type Result<T, E = NoWayHome> = std::result::Result<T, E>;
