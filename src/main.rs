//! # wtool CLI Entry Point
//!
//! Parses arguments with clap and hands them to [`wtool::add::run`].

use anyhow::{Context, Result};
use clap::Parser;
use colored::*;
use std::path::PathBuf;

use wtool::add::{self, AddOptions};
use wtool::naming::ResolveMode;

#[derive(Parser)]
#[command(name = "wtool")]
#[command(
    about = "Add new_go_repository entries to a Bazel WORKSPACE",
    version = env!("CARGO_PKG_VERSION")
)]
#[command(long_about = "Add new_go_repository entries to a Bazel WORKSPACE.\n\n\
    Identifiers are Bazel repository names such as com_github_golang_glog, which are \
    converted to Go import paths (github.com/golang/glog). Each dependency is pinned to \
    the latest commit reported by 'git ls-remote'.\n\n\
    If the conversion guesses wrong, pass --asis with the import path instead.")]
struct Cli {
    /// Leave identifiers as-is: treat them as Go import paths rather than
    /// Bazel names like org_golang_x_net
    #[arg(long)]
    asis: bool,

    /// Print the updated WORKSPACE instead of writing it
    #[arg(long)]
    dry_run: bool,

    /// Show each resolution step
    #[arg(short, long)]
    verbose: bool,

    /// Only report errors
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,

    /// Search for the WORKSPACE starting from DIR instead of the current directory
    #[arg(short = 'C', long, value_name = "DIR")]
    directory: Option<PathBuf>,

    /// Repository names (or import paths with --asis), added in order
    #[arg(required = true, value_name = "IDENTIFIER")]
    identifiers: Vec<String>,
}

fn main() {
    let cli = Cli::parse();

    if let Err(e) = run(cli) {
        eprintln!("{} {:#}", "x".red(), e);
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<()> {
    let start = match cli.directory {
        Some(dir) => dir,
        None => std::env::current_dir().context("Failed to read current directory")?,
    };

    let options = AddOptions {
        mode: ResolveMode::from_asis(cli.asis),
        dry_run: cli.dry_run,
        verbose: cli.verbose,
        quiet: cli.quiet,
    };

    add::run(&start, &cli.identifiers, &options)?;
    Ok(())
}
