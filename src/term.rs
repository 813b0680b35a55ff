// SPDX-FileCopyrightText: 2025 Jason Pena <jasonpena@awkless.com>
// SPDX-License-Identifier: MIT

//! Terminal output context.
//!
//! Whether output gets colored is decided once per process, then carried
//! around in a [`Printer`] value that is handed to whatever needs to write
//! user facing text.

use nu_ansi_term::Color;
use std::io::IsTerminal;

/// Color output mode.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum ColorMode {
    /// Auto-detect based on TTY and `NO_COLOR`.
    #[default]
    Auto,

    /// Always use colors.
    Always,

    /// Never use colors.
    Never,
}

impl ColorMode {
    /// Decide if colors should be used.
    pub fn use_colors(self) -> bool {
        match self {
            Self::Always => true,
            Self::Never => false,
            Self::Auto => std::env::var_os("NO_COLOR").is_none() && std::io::stdout().is_terminal(),
        }
    }
}

/// Writer of user facing messages with optional color.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Printer {
    color: bool,
}

impl Printer {
    /// Construct new printer.
    pub fn new(color: bool) -> Self {
        Self { color }
    }

    /// Construct new printer from color mode.
    pub fn from_mode(mode: ColorMode) -> Self {
        Self::new(mode.use_colors())
    }

    /// Check if printer emits colors.
    pub fn color(&self) -> bool {
        self.color
    }

    /// Paint text in given color if colors are enabled.
    pub fn paint(&self, text: impl AsRef<str>, color: Color) -> String {
        if self.color {
            color.paint(text.as_ref()).to_string()
        } else {
            text.as_ref().to_string()
        }
    }

    /// Print line to stdout.
    pub fn out(&self, text: impl AsRef<str>) {
        println!("{}", text.as_ref());
    }

    /// Print colored line to stderr.
    pub fn err(&self, text: impl AsRef<str>, color: Color) {
        eprintln!("{}", self.paint(text, color));
    }
}
