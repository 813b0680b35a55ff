// SPDX-FileCopyrightText: 2025 Jason Pena <jasonpena@awkless.com>
// SPDX-License-Identifier: MIT

use dirhop::{
    path::default_stack_file,
    select::{run_menu, InquireSelector, Outcome, SelectError},
    stack::DirStack,
    term::{ColorMode, Printer},
};

use anyhow::Result;
use clap::Parser;
use nu_ansi_term::Color;
use std::{path::PathBuf, process::exit};
use tracing::{debug, error};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Keep a list of recently visited directories to choose from.
///
/// Meant to be wrapped by a shell function that changes into whatever
/// directory gets printed.
#[derive(Debug, Clone, Parser)]
#[command(about, long_about, version, override_usage = "ds [options]")]
struct Cli {
    /// Add path to directory stack.
    #[arg(long, value_name = "dir", group = "mode")]
    pub add: Option<String>,

    /// Delete the directory stack file.
    #[arg(long, group = "mode")]
    pub delete: bool,

    /// List current entries sorted on access time on stdout.
    #[arg(long, group = "mode")]
    pub list: bool,

    /// Use this stack file instead of the default one.
    #[arg(long, value_name = "file")]
    pub file: Option<PathBuf>,

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
            None => default_stack_file()?,
        };
        let mut stack = DirStack::load_or_recover(file)?;

        if let Some(dir) = self.add {
            stack.add(dir);
            stack.save()?;
            return Ok(0);
        }

        if self.delete {
            stack.delete()?;
            return Ok(0);
        }

        if self.list {
            for entry in stack.sorted() {
                printer.out(format!(
                    "{} | {}",
                    entry.visited_at.format("%Y-%m-%d %H:%M:%S%.6f"),
                    entry.path.display()
                ));
            }
            return Ok(0);
        }

        let cwd = stack.resolver().resolve(".");
        match run_menu(&mut stack, &mut InquireSelector, &cwd) {
            Ok(outcome) => {
                report(&outcome, printer);
                Ok(outcome.exit_code())
            }
            Err(error @ (SelectError::NothingSelected | SelectError::NoEntryAvailable)) => {
                printer.out(error.to_string());
                Ok(error.exit_code())
            }
            Err(error) => Err(error.into()),
        }
    }
}

fn report(outcome: &Outcome, printer: &Printer) {
    match outcome {
        Outcome::Visit(path) | Outcome::Popped(path) => printer.out(path.display().to_string()),
        Outcome::Deleted(paths) => {
            for path in paths {
                printer.out(format!("Deleted: {}", path.display()));
            }
        }
    }
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
