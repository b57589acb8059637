//! `git ls-remote` wrapper.

use super::RemoteLister;
use crate::error::WtoolError;
use colored::*;
use std::io::{BufRead, BufReader};
use std::path::PathBuf;
use std::process::{Child, Command, Stdio};

/// Lists remote references by running the git executable.
#[derive(Debug, Clone)]
pub struct GitCli {
    program: PathBuf,
    verbose: bool,
}

impl GitCli {
    pub fn new(program: impl Into<PathBuf>, verbose: bool) -> Self {
        Self {
            program: program.into(),
            verbose,
        }
    }

    fn program_name(&self) -> String {
        self.program.display().to_string()
    }
}

impl Default for GitCli {
    fn default() -> Self {
        Self::new("git", false)
    }
}

impl RemoteLister for GitCli {
    fn ls_remote(&self, repo: &str, reference: &str) -> Result<String, WtoolError> {
        if self.verbose {
            eprintln!(
                "   {} {} ls-remote {} {}",
                "$".dimmed(),
                self.program_name(),
                repo,
                reference
            );
        }

        let mut child = Command::new(&self.program)
            .args(["ls-remote", repo, reference])
            .env("GIT_TERMINAL_PROMPT", "0")
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .spawn()
            .map_err(|source| WtoolError::ProcessSpawn {
                program: self.program_name(),
                source,
            })?;

        let Some(stdout) = child.stdout.take() else {
            reap_in_background(child, self.verbose);
            return Err(WtoolError::NoRemoteOutput {
                repo: repo.to_string(),
                reference: reference.to_string(),
            });
        };

        let mut first_line = String::new();
        let read = BufReader::new(stdout).read_line(&mut first_line);
        // Only the first line matters; the pipe is closed by now.
        reap_in_background(child, self.verbose);

        read.map_err(|source| WtoolError::RemoteRead {
            repo: repo.to_string(),
            source,
        })?;

        match parse_ls_remote_line(&first_line) {
            Some(hash) => Ok(hash.to_string()),
            None => Err(WtoolError::NoRemoteOutput {
                repo: repo.to_string(),
                reference: reference.to_string(),
            }),
        }
    }
}

/// Extract the hash from one `<hash>\t<ref>` line of `git ls-remote` output.
///
/// Returns `None` for a blank line.
pub fn parse_ls_remote_line(line: &str) -> Option<&str> {
    let line = line.trim_end_matches(['\r', '\n']);
    let hash = line.split('\t').next().unwrap_or_default();
    if hash.is_empty() { None } else { Some(hash) }
}

/// Wait for `child` on a detached thread so it does not linger as a zombie.
/// The exit status is not needed by anyone.
fn reap_in_background(mut child: Child, verbose: bool) {
    std::thread::spawn(move || match child.wait() {
        Ok(status) if verbose && !status.success() => {
            eprintln!("   {} git ls-remote exited with {}", "!".yellow(), status);
        }
        Err(e) if verbose => {
            eprintln!("   {} failed to wait for git ls-remote: {}", "!".yellow(), e);
        }
        _ => {}
    });
}
