// SPDX-FileCopyrightText: 2025 Jason Pena <jasonpena@awkless.com>
// SPDX-License-Identifier: MIT

use dirhop::{
    bookmarks::{Bookmarks, RecentlyUsed},
    path::{default_bookmark_file, default_recent_file, home_dir},
    term::{ColorMode, Printer},
};

use anyhow::{anyhow, Result};
use clap::Parser;
use nu_ansi_term::Color;
use std::{
    env,
    path::{Path, PathBuf},
    process::{exit, Command},
};
use tracing::{debug, error, info};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Print bookmarked directories to feed to fzf.
///
/// A shell function opens fzf with the list of bookmarks and changes into the
/// selected path.
#[derive(Debug, Clone, Parser)]
#[command(about, long_about, version, override_usage = "fzfdirs [options]")]
struct Cli {
    /// Bookmark file to use instead of the default one.
    #[arg(long, value_name = "file")]
    pub file: Option<PathBuf>,

    /// Edit bookmark file with $EDITOR.
    #[arg(short, long, group = "mode")]
    pub edit: bool,

    /// Add path to recently used file.
    #[arg(long, value_name = "path", group = "mode")]
    pub add_recent: Option<PathBuf>,

    /// Add directory as a bookmark.
    #[arg(long, value_name = "dir", group = "mode")]
    pub bookmark: Option<PathBuf>,

    /// Description of bookmark added with --bookmark.
    #[arg(long, value_name = "text", requires = "bookmark")]
    pub desc: Option<String>,

    /// When to color output.
    #[arg(long, value_enum, default_value_t = ColorMode::Auto, value_name = "when")]
    pub color: ColorMode,

    /// Increase verbosity level.
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Extra debug output.
    #[arg(long)]
    pub debug: bool,
}

impl Cli {
    fn run(self, printer: &Printer) -> Result<i32> {
        let file = match self.file {
            Some(file) => file,
            None => default_bookmark_file()?,
        };

        if self.edit {
            edit(&file)?;
            return Ok(0);
        }

        let mut bookmarks = Bookmarks::load(&file)?;
        info!("loaded {} bookmarks from {:?}", bookmarks.len(), file.display());
        let mut recent = RecentlyUsed::load(default_recent_file()?)?;

        if let Some(path) = self.add_recent {
            let path = if path.is_absolute() {
                path
            } else {
                home_dir()?.join(path)
            };
            if bookmarks.contains(&path) {
                recent.add(path.to_string_lossy())?;
            } else {
                info!("{:?} is not bookmarked, skip adding to recent paths", path.display());
            }
            return Ok(0);
        }

        if let Some(dir) = self.bookmark {
            let dir = env::current_dir()?.join(dir).canonicalize()?;
            if bookmarks.bookmark(&dir, self.desc)? {
                printer.out(format!("Bookmarked: {}", dir.display()));
            }
            return Ok(0);
        }

        if bookmarks.is_empty() {
            printer.err(
                "There are no bookmarks yet. --edit opens file in editor.",
                Color::Yellow,
            );
            return Ok(1);
        }

        for bookmark in bookmarks.ordered(Some(&recent)) {
            printer.out(bookmark.format(printer));
        }

        Ok(0)
    }
}

fn edit(file: &Path) -> Result<()> {
    let editor = env::var("EDITOR").unwrap_or_else(|_| "vim".into());
    debug!("open {:?} with {editor}", file.display());
    let status = Command::new(&editor).arg(file).spawn()?.wait()?;
    if !status.success() {
        return Err(anyhow!("editor {editor:?} failed"));
    }

    Ok(())
}

fn main() {
    let cli = Cli::parse();
    let printer = Printer::from_mode(cli.color);
    init_logging(cli.verbose, printer.color());
    debug!("{cli:?}");

    let debug = cli.debug;
    match cli.run(&printer) {
        Ok(code) => exit(code),
        Err(error) => {
            if debug {
                error!("{error:?}");
            }
            printer.err(format!("Error: {error:#}"), Color::Red);
            exit(1);
        }
    }
}

fn init_logging(verbose: u8, color: bool) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let layer = fmt::layer()
        .compact()
        .with_writer(std::io::stderr)
        .with_ansi(color)
        .with_target(false)
        .without_time();
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(level))
        .unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::registry()
        .with(layer)
        .with(filter)
        .init();
}
