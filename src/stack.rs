// SPDX-FileCopyrightText: 2025 Jason Pena <jasonpena@awkless.com>
// SPDX-License-Identifier: MIT

//! Directory stack management and persistence.
//!
//! The __directory stack__ remembers which directories the user visited, and
//! when. Each directory is keyed by its canonical path, so visiting the same
//! place twice through different spellings refreshes one entry instead of
//! creating two.
//!
//! # Stack File
//!
//! The stack is kept in a single file, by default at
//! `$XDG_CACHE_HOME/dirhop/dirstack.toml`. A missing file is simply an empty
//! stack. Saving an empty stack removes the file instead of writing an empty
//! listing. Writes go through a temporary file in the same directory that is
//! renamed over the target, so a reader never observes a half written stack.
//!
//! There is no locking between processes. Two invocations that mutate the
//! stack at the same time race, and whoever saves last wins.

use crate::{
    config::{ConfigError, StackFile},
    path::{IntoStackKey, NoWayHome, PathResolver},
};

use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};
use std::{
    collections::HashMap,
    fs::{read, remove_file},
    io::{ErrorKind, Write},
    path::{Path, PathBuf},
};
use tempfile::NamedTempFile;
use tracing::{debug, info, instrument, warn};

/// Single directory stack entry.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Deserialize, Serialize)]
pub struct Entry {
    /// Canonical absolute path of the visited directory.
    pub path: PathBuf,

    /// Last time the directory was added or visited.
    pub visited_at: DateTime<Local>,
}

/// Source of timestamps for stack entries.
pub trait Clock {
    /// Current point in time.
    fn now(&self) -> DateTime<Local>;
}

/// Wall clock of the local system.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Local> {
        Local::now()
    }
}

#[derive(Debug, Clone)]
struct Slot {
    entry: Entry,
    order: u64,
}

/// Recency ordered stack of visited directories.
///
/// # Invariant
///
/// - Every key equals the path of the entry stored under it.
/// - Only existing directories get added. Entries loaded from the stack file
///   are not revalidated.
#[derive(Debug)]
pub struct DirStack<C = SystemClock>
where
    C: Clock,
{
    file: PathBuf,
    entries: HashMap<PathBuf, Slot>,
    next_order: u64,
    resolver: PathResolver,
    clock: C,
}

impl DirStack<SystemClock> {
    /// Construct new empty stack bound to target file.
    ///
    /// # Errors
    ///
    /// - Return [`StackError::NoWayHome`] if the current working directory or
    ///   home directory cannot be determined.
    pub fn new(file: impl Into<PathBuf>) -> Result<Self> {
        Ok(Self::with_parts(file, PathResolver::from_env()?, SystemClock))
    }

    /// Load stack from target file.
    ///
    /// # Errors
    ///
    /// - Return [`StackError::NoWayHome`] if the current working directory or
    ///   home directory cannot be determined.
    /// - Return [`StackError::CorruptState`] if stack file exists but cannot
    ///   be parsed.
    pub fn load(file: impl Into<PathBuf>) -> Result<Self> {
        Self::load_with(file, PathResolver::from_env()?, SystemClock)
    }

    /// Load stack from target file, starting over if it is corrupt.
    ///
    /// # Errors
    ///
    /// - Return [`StackError::NoWayHome`] if the current working directory or
    ///   home directory cannot be determined.
    pub fn load_or_recover(file: impl Into<PathBuf>) -> Result<Self> {
        Self::load_or_recover_with(file, PathResolver::from_env()?, SystemClock)
    }
}

impl<C> DirStack<C>
where
    C: Clock,
{
    /// Construct new empty stack from explicit parts.
    pub fn with_parts(file: impl Into<PathBuf>, resolver: PathResolver, clock: C) -> Self {
        Self {
            file: file.into(),
            entries: HashMap::new(),
            next_order: 0,
            resolver,
            clock,
        }
    }

    /// Load stack from target file with explicit parts.
    ///
    /// A stack file that does not exist, or cannot be opened, yields an empty
    /// stack bound to that file.
    ///
    /// # Errors
    ///
    /// - Return [`StackError::CorruptState`] if stack file exists but is not
    ///   valid UTF-8, or cannot be parsed.
    #[instrument(skip(file, resolver, clock), level = "debug")]
    pub fn load_with(file: impl Into<PathBuf>, resolver: PathResolver, clock: C) -> Result<Self> {
        let mut stack = Self::with_parts(file, resolver, clock);
        let bytes = match read(&stack.file) {
            Ok(bytes) => bytes,
            Err(error) => {
                debug!("cannot open {:?}: {error}", stack.file.display());
                return Ok(stack);
            }
        };

        let corrupt = |err: ConfigError| StackError::CorruptState {
            source: err,
            stack_path: stack.file.clone(),
        };
        let content = String::from_utf8(bytes).map_err(|err| corrupt(err.into()))?;
        let layout: StackFile = content.parse().map_err(corrupt)?;

        // INVARIANT: File order decides ties between equal timestamps.
        for entry in layout.entries {
            stack.insert(entry);
        }
        debug!("loaded {} entries from {:?}", stack.len(), stack.file.display());

        Ok(stack)
    }

    /// Load stack from target file with explicit parts, starting over if it is
    /// corrupt.
    ///
    /// The corrupt file is left alone until the next [`save`](Self::save)
    /// overwrites or removes it.
    pub fn load_or_recover_with(
        file: impl Into<PathBuf>,
        resolver: PathResolver,
        clock: C,
    ) -> Result<Self>
    where
        C: Clone,
    {
        let file = file.into();
        match Self::load_with(&file, resolver.clone(), clock.clone()) {
            Err(StackError::CorruptState { source, stack_path }) => {
                warn!(
                    "{:?} is unreadable, starting with an empty stack: {source}",
                    stack_path.display()
                );
                Ok(Self::with_parts(file, resolver, clock))
            }
            result => result,
        }
    }

    /// Path of file the stack is saved to.
    pub fn file(&self) -> &Path {
        self.file.as_path()
    }

    /// Resolver used to normalize incoming paths.
    pub fn resolver(&self) -> &PathResolver {
        &self.resolver
    }

    /// Add or refresh an entry.
    ///
    /// Paths that are not existing directories are skipped with a warning.
    /// So are paths that are not valid UTF-8, because the stack file cannot
    /// record them. Adding a path that is already on the stack replaces its
    /// entry with a freshly timestamped one.
    pub fn add(&mut self, item: impl IntoStackKey) {
        let path = item.into_stack_key(&self.resolver);
        if !path.is_dir() {
            warn!("{:?} doesn't exist, skip adding it", path.display());
            return;
        }

        if path.to_str().is_none() {
            warn!("{:?} is not valid UTF-8, skip adding it", path.display());
            return;
        }

        let mut visited_at = self.clock.now();
        if let Some(slot) = self.entries.get(&path) {
            debug!("overwriting entry: {:?}", slot.entry);

            // INVARIANT: Timestamps of one path never go backwards.
            visited_at = visited_at.max(slot.entry.visited_at);
        }

        self.insert(Entry { path, visited_at });
    }

    /// Remove and return an entry.
    ///
    /// # Errors
    ///
    /// - Return [`StackError::NotFound`] if nothing is stored for the path.
    pub fn pop(&mut self, item: impl IntoStackKey) -> Result<Entry> {
        let path = item.into_stack_key(&self.resolver);
        self.entries
            .remove(&path)
            .map(|slot| slot.entry)
            .ok_or(StackError::NotFound { path })
    }

    /// Entries ordered most recently visited first.
    ///
    /// Equal timestamps keep the order in which they were inserted.
    pub fn sorted(&self) -> Vec<Entry> {
        let mut slots: Vec<&Slot> = self.entries.values().collect();
        slots.sort_by(|a, b| {
            b.entry
                .visited_at
                .cmp(&a.entry.visited_at)
                .then(a.order.cmp(&b.order))
        });

        slots.into_iter().map(|slot| slot.entry.clone()).collect()
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if stack has no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Remove all entries, and the stack file along with them.
    ///
    /// # Errors
    ///
    /// - Return [`StackError::RemoveStackFile`] if stack file cannot be
    ///   removed.
    pub fn delete(&mut self) -> Result<()> {
        self.entries.clear();
        self.save()
    }

    /// Write stack to its file.
    ///
    /// An empty stack removes the file instead. Parent directories are created
    /// as needed.
    ///
    /// # Errors
    ///
    /// - Return [`StackError::RemoveStackFile`] if an empty stack cannot
    ///   remove the stack file.
    /// - Return [`StackError::EncodeStackFile`] if some entry cannot be
    ///   serialized.
    /// - Return [`StackError::WriteStackFile`] if stack file cannot be
    ///   written.
    #[instrument(skip(self), level = "debug")]
    pub fn save(&self) -> Result<()> {
        if self.is_empty() {
            info!("stack is empty, removing {:?}", self.file.display());
            return match remove_file(&self.file) {
                Err(error) if error.kind() != ErrorKind::NotFound => {
                    Err(StackError::RemoveStackFile {
                        source: error,
                        stack_path: self.file.clone(),
                    })
                }
                _ => Ok(()),
            };
        }

        let content = StackFile::new(self.sorted())
            .to_toml()
            .map_err(|err| StackError::EncodeStackFile {
                source: err,
                stack_path: self.file.clone(),
            })?;
        self.write_atomic(content.as_bytes())
            .map_err(|err| StackError::WriteStackFile {
                source: err,
                stack_path: self.file.clone(),
            })?;
        debug!("wrote stack to {:?}", self.file.display());

        Ok(())
    }

    fn write_atomic(&self, content: &[u8]) -> std::io::Result<()> {
        let parent = match self.file.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        mkdirp::mkdirp(parent)?;

        let mut staged = NamedTempFile::new_in(parent)?;
        staged.write_all(content)?;
        staged.as_file().sync_all()?;
        staged.persist(&self.file).map_err(|err| err.error)?;

        Ok(())
    }

    fn insert(&mut self, entry: Entry) {
        let order = self.next_order;
        self.next_order += 1;
        self.entries.insert(entry.path.clone(), Slot { entry, order });
    }
}

/// Directory stack error types.
#[derive(Debug, thiserror::Error)]
pub enum StackError {
    /// Path has no entry on the stack.
    #[error("no stack entry for {:?}", path.display())]
    NotFound { path: PathBuf },

    /// Stack file exists but its contents cannot be understood.
    #[error("stack file at {:?} is corrupt", stack_path.display())]
    CorruptState {
        #[source]
        source: ConfigError,
        stack_path: PathBuf,
    },

    /// Stack entries cannot be serialized.
    #[error("failed to encode stack for {:?}", stack_path.display())]
    EncodeStackFile {
        #[source]
        source: ConfigError,
        stack_path: PathBuf,
    },

    /// Stack file cannot be written to.
    #[error("failed to write to stack file at {:?}", stack_path.display())]
    WriteStackFile {
        #[source]
        source: std::io::Error,
        stack_path: PathBuf,
    },

    /// Stack file cannot be removed.
    #[error("failed to remove stack file at {:?}", stack_path.display())]
    RemoveStackFile {
        #[source]
        source: std::io::Error,
        stack_path: PathBuf,
    },

    /// Working or home directory cannot be determined.
    #[error(transparent)]
    NoWayHome(#[from] NoWayHome),
}

/// Friendly result alias :3
pub type Result<T, E = StackError> = std::result::Result<T, E>;
