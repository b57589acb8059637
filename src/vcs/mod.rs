//! Version control lookups.
//!
//! Two steps turn an import path into a commit:
//!
//! - **Discovery**: find the repository root and VCS behind an import path,
//!   from a table of well-known hosts or the `?go-get=1` meta tags
//! - **Remote listing**: ask the repository for the hash of `HEAD` with
//!   `git ls-remote`, without cloning anything
//!
//! Both sit behind traits so the driver can be exercised without a network.

mod discovery;
mod remote;

pub use discovery::{
    MetaImport, VcsDiscovery, parse_go_import_meta, select_meta_import, static_repo_root,
};
pub use remote::{GitCli, parse_ls_remote_line};

use crate::error::WtoolError;

/// Reference queried when none is given.
pub const DEFAULT_REFERENCE: &str = "HEAD";

/// Version control system serving a repository.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VcsKind {
    Git,
    Mercurial,
    Bazaar,
    Subversion,
    Fossil,
    Other(String),
}

impl VcsKind {
    /// Parse the command name used by `go get` (`git`, `hg`, `bzr`, ...).
    pub fn from_cmd(cmd: &str) -> Self {
        match cmd {
            "git" => VcsKind::Git,
            "hg" => VcsKind::Mercurial,
            "bzr" => VcsKind::Bazaar,
            "svn" => VcsKind::Subversion,
            "fossil" => VcsKind::Fossil,
            other => VcsKind::Other(other.to_string()),
        }
    }

    pub fn cmd(&self) -> &str {
        match self {
            VcsKind::Git => "git",
            VcsKind::Mercurial => "hg",
            VcsKind::Bazaar => "bzr",
            VcsKind::Subversion => "svn",
            VcsKind::Fossil => "fossil",
            VcsKind::Other(cmd) => cmd,
        }
    }
}

impl std::fmt::Display for VcsKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.cmd())
    }
}

/// Where the source for an import path lives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepoRoot {
    pub vcs: VcsKind,
    /// URL the VCS clones from
    pub repo: String,
    /// Import path prefix corresponding to the repository root
    pub root: String,
}

/// Maps an import path to the repository that serves it.
pub trait RepoRootResolver {
    fn repo_root_for_import_path(&self, import_path: &str) -> Result<RepoRoot, WtoolError>;
}

/// Lists references of a remote repository.
pub trait RemoteLister {
    /// Return the commit hash `reference` points to in `repo`.
    fn ls_remote(&self, repo: &str, reference: &str) -> Result<String, WtoolError>;
}

/// Resolve `import_path` to its repository and return the hash of `HEAD`.
///
/// Only git repositories are supported.
pub fn latest_commit(
    import_path: &str,
    resolver: &dyn RepoRootResolver,
    lister: &dyn RemoteLister,
) -> Result<(RepoRoot, String), WtoolError> {
    let root = resolver.repo_root_for_import_path(import_path)?;
    if root.vcs != VcsKind::Git {
        return Err(WtoolError::UnsupportedVcs {
            import_path: import_path.to_string(),
            vcs: root.vcs.to_string(),
        });
    }
    let commit = lister.ls_remote(&root.repo, DEFAULT_REFERENCE)?;
    Ok((root, commit))
}
