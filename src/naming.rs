//! Mapping between Bazel repository names and Go import paths.
//!
//! Bazel names Go repositories after their reversed host and path, so
//! `github.com/golang/glog` becomes `com_github_golang_glog`. Going the other
//! way is lossy (both `-` and `/` fold into `_`), so the reverse mapping is a
//! heuristic:
//!
//! ```text
//! com_github_golang_glog      -> github.com/golang/glog
//! com_github_foo_bar_baz      -> github.com/foo/bar-baz
//! org_golang_google_grpc      -> google.golang.org/grpc
//! com_google_cloud_go         -> cloud.google.com/go
//! ```
//!
//! When the heuristic guesses wrong, `--asis` takes the import path verbatim
//! and derives the repository name from it instead.

use crate::error::WtoolError;

/// How identifiers on the command line are interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ResolveMode {
    /// Identifiers are Bazel repository names like `org_golang_x_net`
    #[default]
    BazelName,
    /// Identifiers are Go import paths, used as-is
    ImportPath,
}

impl ResolveMode {
    pub fn from_asis(asis: bool) -> Self {
        if asis {
            ResolveMode::ImportPath
        } else {
            ResolveMode::BazelName
        }
    }
}

/// A dependency with both of its names worked out.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedDependency {
    /// Name the repository is registered under in `WORKSPACE`
    pub name: String,
    /// Go import path the repository is fetched from
    pub import_path: String,
}

const MIN_SEGMENTS: usize = 4;

/// Resolve a command-line identifier into a repository name and import path.
pub fn resolve(identifier: &str, mode: ResolveMode) -> Result<ResolvedDependency, WtoolError> {
    if identifier.is_empty() {
        return Err(WtoolError::MalformedIdentifier {
            identifier: identifier.to_string(),
            reason: "identifier is empty".to_string(),
        });
    }

    match mode {
        ResolveMode::ImportPath => Ok(ResolvedDependency {
            name: import_path_to_repo_name(identifier),
            import_path: identifier.to_string(),
        }),
        ResolveMode::BazelName => Ok(ResolvedDependency {
            name: identifier.to_string(),
            import_path: repo_name_to_import_path(identifier)?,
        }),
    }
}

fn repo_name_to_import_path(name: &str) -> Result<String, WtoolError> {
    let segments: Vec<&str> = name.split('_').collect();
    if segments.len() < MIN_SEGMENTS {
        return Err(WtoolError::MalformedIdentifier {
            identifier: name.to_string(),
            reason: format!(
                "only {}-part or longer strings supported for workspace names",
                MIN_SEGMENTS
            ),
        });
    }

    let rest = segments[3..].join("-");

    if name.starts_with("org_golang_google") {
        return Ok(format!("google.golang.org/{}", rest));
    }
    if name.starts_with("com_google_cloud") {
        return Ok(format!("cloud.google.com/{}", rest));
    }

    Ok(format!(
        "{}.{}/{}/{}",
        segments[1], segments[0], segments[2], rest
    ))
}

/// Convert an import path into the Bazel repository name rules_go expects.
///
/// The host labels are reversed, everything is joined with `_`, and any
/// remaining `-` or `.` become `_`.
pub fn import_path_to_repo_name(import_path: &str) -> String {
    let mut components = import_path.split('/');
    let host = components.next().unwrap_or_default();

    let mut parts: Vec<&str> = host.split('.').rev().collect();
    parts.extend(components);

    parts
        .join("_")
        .chars()
        .map(|c| match c {
            '-' | '.' => '_',
            _ => c.to_ascii_lowercase(),
        })
        .collect()
}
