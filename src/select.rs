// SPDX-FileCopyrightText: 2025 Jason Pena <jasonpena@awkless.com>
// SPDX-License-Identifier: MIT

//! Interactive selection over the directory stack.
//!
//! The stack is presented as a numbered menu, most recently visited first,
//! followed by a fixed set of [`Action`]s. Picking a directory visits it, which
//! bumps it back to the top of the stack. Picking an action opens a second menu
//! of directories that the action is applied to.
//!
//! Menu rendering is left to a [`Selector`]. The one used by the `ds` binary
//! is [`InquireSelector`], but anything that can pick an index out of a list of
//! strings will do.

use crate::stack::{Clock, DirStack, Entry, StackError};

use inquire::{InquireError, Select};
use std::{
    fmt::{Display, Formatter, Result as FmtResult},
    path::{Path, PathBuf},
};
use tracing::{debug, info, instrument};

/// Exit code when nothing was selected, or nothing could be selected.
pub const EXIT_NOOP: i32 = 3;

/// Exit code when entries were deleted from the stack.
pub const EXIT_DELETED: i32 = 4;

/// Actions offered below the directory listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    /// Remove one directory, and print it.
    PopOne,

    /// Remove one directory.
    DeleteOne,

    /// Remove one directory and everything visited before it.
    DeleteOlderThan,

    /// Visit most recent directory that is not the current one.
    ShowLast,
}

impl Action {
    /// All actions in menu order.
    pub const ALL: [Action; 4] = [
        Action::PopOne,
        Action::DeleteOne,
        Action::DeleteOlderThan,
        Action::ShowLast,
    ];

    /// Menu label.
    pub fn label(self) -> &'static str {
        match self {
            Self::PopOne => "[p] pop an entry",
            Self::DeleteOne => "[d] delete an entry",
            Self::DeleteOlderThan => "[o] delete entries older than...",
            Self::ShowLast => "[l] last visited directory",
        }
    }

    /// Title of follow up directory menu, if any.
    pub fn title(self) -> Option<&'static str> {
        match self {
            Self::DeleteOlderThan => Some("Delete all entries from selected and older:"),
            _ => None,
        }
    }
}

impl Display for Action {
    fn fmt(&self, fmt: &mut Formatter<'_>) -> FmtResult {
        fmt.write_str(self.label())
    }
}

/// Stack entry paired with its position in the recency ordering.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MenuEntry {
    /// Zero based position, most recent first.
    pub index: usize,

    /// The stack entry itself.
    pub entry: Entry,
}

impl Display for MenuEntry {
    fn fmt(&self, fmt: &mut Formatter<'_>) -> FmtResult {
        write!(
            fmt,
            "[{}] {}  {}",
            self.index + 1,
            self.entry.visited_at.format("%Y-%m-%d %H:%M:%S"),
            self.entry.path.display()
        )
    }
}

/// List stack entries for display.
pub fn menu_entries<C: Clock>(stack: &DirStack<C>) -> Vec<MenuEntry> {
    stack
        .sorted()
        .into_iter()
        .enumerate()
        .map(|(index, entry)| MenuEntry { index, entry })
        .collect()
}

/// Pick one item out of a list.
pub trait Selector {
    /// Show items and return index of chosen one.
    ///
    /// Returns `None` if the user backed out without choosing.
    fn select(&mut self, title: Option<&str>, items: &[String]) -> Result<Option<usize>>;
}

/// Terminal menu selector through inquire.
#[derive(Debug, Default, Clone, Copy)]
pub struct InquireSelector;

impl Selector for InquireSelector {
    fn select(&mut self, title: Option<&str>, items: &[String]) -> Result<Option<usize>> {
        if items.is_empty() {
            return Ok(None);
        }

        let prompt = Select::new(title.unwrap_or(""), items.to_vec()).with_page_size(20);
        match prompt.raw_prompt() {
            Ok(choice) => Ok(Some(choice.index)),
            Err(InquireError::OperationCanceled | InquireError::OperationInterrupted) => Ok(None),
            Err(error) => Err(SelectError::Prompt(error)),
        }
    }
}

/// Result of a completed menu interaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// Directory was visited, and should be changed into.
    Visit(PathBuf),

    /// Directory was popped off the stack, and should be changed into.
    Popped(PathBuf),

    /// Directories were deleted from the stack.
    Deleted(Vec<PathBuf>),
}

impl Outcome {
    /// Process exit code matching this outcome.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::Deleted(_) => EXIT_DELETED,
            _ => 0,
        }
    }
}

/// Visit most recent directory that is not `cwd`.
///
/// # Errors
///
/// - Return [`SelectError::NoEntryAvailable`] if no other directory exists.
/// - Return [`SelectError::Stack`] if stack cannot be saved.
pub fn visit_last<C: Clock>(stack: &mut DirStack<C>, cwd: impl AsRef<Path>) -> Result<Entry> {
    let entry = stack
        .sorted()
        .into_iter()
        .find(|entry| entry.path != cwd.as_ref())
        .ok_or(SelectError::NoEntryAvailable)?;
    revisit(stack, &entry)?;

    Ok(entry)
}

/// Visit chosen entry again, refreshing its timestamp.
///
/// # Errors
///
/// - Return [`SelectError::Stack`] if stack cannot be saved.
pub fn revisit<C: Clock>(stack: &mut DirStack<C>, entry: &Entry) -> Result<()> {
    debug!("visit {:?}", entry.path.display());
    stack.add(entry);
    stack.save()?;

    Ok(())
}

/// Remove one entry from the stack.
///
/// # Errors
///
/// - Return [`SelectError::Stack`] if entry is gone, or stack cannot be saved.
pub fn pop_one<C: Clock>(stack: &mut DirStack<C>, entry: &Entry) -> Result<Entry> {
    let popped = stack.pop(entry)?;
    stack.save()?;

    Ok(popped)
}

/// Remove entry at `index` of `sorted`, and every older entry after it.
///
/// # Errors
///
/// - Return [`SelectError::Stack`] if any entry is gone, or stack cannot be
///   saved.
pub fn pop_from<C: Clock>(
    stack: &mut DirStack<C>,
    sorted: &[Entry],
    index: usize,
) -> Result<Vec<Entry>> {
    let mut popped = Vec::new();
    for entry in sorted.get(index..).unwrap_or(&[]) {
        info!("delete {:?}", entry.path.display());
        popped.push(stack.pop(entry)?);
    }
    stack.save()?;

    Ok(popped)
}

/// Run the whole menu interaction.
///
/// # Errors
///
/// - Return [`SelectError::NothingSelected`] if user cancels any prompt.
/// - Return [`SelectError::NoEntryAvailable`] if chosen action has nothing to
///   operate on.
/// - Return [`SelectError::Stack`] if stack manipulation fails.
#[instrument(skip(stack, selector, cwd), level = "debug")]
pub fn run_menu<C, S>(stack: &mut DirStack<C>, selector: &mut S, cwd: &Path) -> Result<Outcome>
where
    C: Clock,
    S: Selector,
{
    let listing = menu_entries(stack);
    let lines: Vec<String> = listing.iter().map(ToString::to_string).collect();
    let mut items = lines.clone();
    items.extend(Action::ALL.iter().map(ToString::to_string));

    let index = selector
        .select(None, &items)?
        .ok_or(SelectError::NothingSelected)?;

    if let Some(chosen) = listing.get(index) {
        debug!("selected: {:?}", chosen.entry);
        revisit(stack, &chosen.entry)?;
        return Ok(Outcome::Visit(chosen.entry.path.clone()));
    }

    let action = Action::ALL
        .get(index - listing.len())
        .copied()
        .ok_or(SelectError::OutOfRange { index })?;
    debug!("action: {action:?}");

    if action == Action::ShowLast {
        return Ok(Outcome::Visit(visit_last(stack, cwd)?.path));
    }

    if listing.is_empty() {
        return Err(SelectError::NoEntryAvailable);
    }

    let index = selector
        .select(action.title(), &lines)?
        .ok_or(SelectError::NothingSelected)?;
    let chosen = listing
        .get(index)
        .ok_or(SelectError::OutOfRange { index })?;

    let outcome = match action {
        Action::PopOne => Outcome::Popped(pop_one(stack, &chosen.entry)?.path),
        Action::DeleteOne => Outcome::Deleted(vec![pop_one(stack, &chosen.entry)?.path]),
        _ => {
            let sorted: Vec<Entry> = listing.into_iter().map(|item| item.entry).collect();
            let popped = pop_from(stack, &sorted, index)?;
            Outcome::Deleted(popped.into_iter().map(|entry| entry.path).collect())
        }
    };

    Ok(outcome)
}

/// Selection error types.
#[derive(Debug, thiserror::Error)]
pub enum SelectError {
    /// User backed out of a prompt.
    #[error("Nothing selected")]
    NothingSelected,

    /// No entry left to operate on.
    #[error("No entry available")]
    NoEntryAvailable,

    /// Selector returned an index past the end of the menu.
    #[error("menu index {index} is out of range")]
    OutOfRange { index: usize },

    /// Prompt could not be shown.
    #[error(transparent)]
    Prompt(#[from] InquireError),

    /// Stack manipulation fails.
    #[error(transparent)]
    Stack(#[from] StackError),
}

impl SelectError {
    /// Process exit code matching this error.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::NothingSelected | Self::NoEntryAvailable => EXIT_NOOP,
            _ => 1,
        }
    }
}

/// Friendly result alias :3
pub type Result<T, E = SelectError> = std::result::Result<T, E>;
