// SPDX-FileCopyrightText: 2025 Jason Pena <jasonpena@awkless.com>
// SPDX-License-Identifier: MIT

//! Directory hopping toolbox.
//!
//! Dirhop remembers where the user has been, and where they like to go. The
//! [`stack`] module keeps a recency ordered stack of visited directories, the
//! [`select`] module drives the interactive menu over that stack, and the
//! [`bookmarks`] module lists hand picked directories for a fuzzy finder.

pub mod bookmarks;
pub mod config;
pub mod path;
pub mod select;
pub mod stack;
pub mod term;
