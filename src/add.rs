//! `wtool <identifier>...`: resolve each dependency and append it to
//! `WORKSPACE`.
//!
//! Identifiers are processed one at a time, in order. Every declaration is
//! appended to the in-memory document first; the file is written once at the
//! end, so any failure leaves it untouched.
//!
//! Progress and diagnostics go to stderr; stdout carries only the summary,
//! or the file itself with `--dry-run`.

use crate::config::WtoolConfig;
use crate::declaration::Declaration;
use crate::error::WtoolError;
use crate::naming::{self, ResolveMode};
use crate::ui;
use crate::vcs::{self, GitCli, RemoteLister, RepoRootResolver, VcsDiscovery};
use crate::workspace::{self, WORKSPACE_FILE, WorkspaceFile};
use anyhow::{Context, Result};
use colored::*;
use std::io::Write;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Default)]
pub struct AddOptions {
    pub mode: ResolveMode,
    /// Print the resulting file instead of writing it
    pub dry_run: bool,
    pub verbose: bool,
    pub quiet: bool,
}

/// What a run appended, and to which file.
#[derive(Debug)]
pub struct AddReport {
    pub workspace: PathBuf,
    pub added: Vec<Declaration>,
    /// Canonical file contents, as written (or as would be written)
    pub contents: Vec<u8>,
}

/// Find the workspace above `start`, then add every identifier to it.
pub fn run(start: &Path, identifiers: &[String], options: &AddOptions) -> Result<AddReport> {
    let root = workspace::find_workspace_root(start)?;
    let config = WtoolConfig::load(&root)?;

    let resolver = VcsDiscovery::new(config.discovery_timeout(), options.verbose);
    let lister = GitCli::new(&config.git, options.verbose);
    let path = root.join(WORKSPACE_FILE);

    let report = add_to_workspace(&path, identifiers, &config.rule, options, &resolver, &lister)
        .with_context(|| format!("Failed to update {}", path.display()))?;

    if options.dry_run {
        std::io::stdout()
            .write_all(&report.contents)
            .context("Failed to write to stdout")?;
    } else if !options.quiet {
        print_summary(&report);
    }

    Ok(report)
}

/// Resolve `identifiers` and append a `rule(...)` for each to the workspace
/// file at `path`.
pub fn add_to_workspace(
    path: &Path,
    identifiers: &[String],
    rule: &str,
    options: &AddOptions,
    resolver: &dyn RepoRootResolver,
    lister: &dyn RemoteLister,
) -> Result<AddReport, WtoolError> {
    let mut workspace = WorkspaceFile::load(path)?;
    if options.verbose {
        eprintln!("{} Loaded {}", "ℹ".blue(), workspace.path().display());
    }

    let existing: Vec<String> = workspace
        .declared_names()
        .into_iter()
        .map(str::to_string)
        .collect();
    let mut added: Vec<Declaration> = Vec::new();

    for identifier in identifiers {
        let dep = naming::resolve(identifier, options.mode)?;
        if options.verbose {
            eprintln!(
                "{} {} -> {}",
                "ℹ".blue(),
                dep.name.bold(),
                dep.import_path
            );
        }

        if !options.quiet
            && (existing.contains(&dep.name) || added.iter().any(|d| d.name == dep.name))
        {
            eprintln!(
                "{} '{}' is already declared; adding it again",
                "!".yellow(),
                dep.name
            );
        }

        let spinner = (!options.quiet && !options.verbose).then(|| ui::lookup_spinner(&dep.name));
        let lookup = vcs::latest_commit(&dep.import_path, resolver, lister);
        if let Some(pb) = spinner {
            pb.finish_and_clear();
        }
        let (root, commit) = lookup?;

        if options.verbose {
            eprintln!(
                "{} {} ({} {}) at {}",
                "ℹ".blue(),
                root.root,
                root.vcs,
                root.repo,
                commit
            );
        }

        let declaration = Declaration::new(dep, commit);
        workspace.append(&declaration, rule);
        added.push(declaration);
    }

    let contents = if options.dry_run {
        workspace.render()
    } else {
        workspace.save()?
    };

    Ok(AddReport {
        workspace: path.to_path_buf(),
        added,
        contents,
    })
}

fn print_summary(report: &AddReport) {
    let mut table = ui::Table::new(&["Name", "Import Path", "Commit"]);
    for decl in &report.added {
        table.add_row(vec![
            decl.name.clone(),
            decl.importpath.clone(),
            decl.short_commit().to_string(),
        ]);
    }
    table.print();
    println!(
        "{} Added {} {} to {}",
        "✓".green(),
        report.added.len(),
        if report.added.len() == 1 {
            "dependency"
        } else {
            "dependencies"
        },
        report.workspace.display()
    );
}
