use std::path::PathBuf;

/// Every way adding a dependency to the workspace can fail.
///
/// All of these are fatal: the driver stops at the first one and the
/// workspace file is left untouched.
#[derive(Debug)]
pub enum WtoolError {
    /// No ancestor of the start directory contains a `WORKSPACE` file
    WorkspaceNotFound { start: PathBuf },
    /// Reading the workspace file failed
    FileRead {
        path: PathBuf,
        source: std::io::Error,
    },
    /// Writing the workspace file back failed
    FileWrite {
        path: PathBuf,
        source: std::io::Error,
    },
    /// The workspace file is not well-formed
    Parse {
        path: PathBuf,
        line: usize,
        column: usize,
        message: String,
    },
    /// `wtool.toml` could not be read or deserialized
    Config { path: PathBuf, message: String },
    /// An identifier cannot be turned into an import path
    MalformedIdentifier { identifier: String, reason: String },
    /// The import path cannot be mapped to a repository root
    VcsResolution { import_path: String, message: String },
    /// The repository root uses a version control system other than git
    UnsupportedVcs { import_path: String, vcs: String },
    /// `git ls-remote` printed nothing usable
    NoRemoteOutput { repo: String, reference: String },
    /// `git ls-remote` could not be started
    ProcessSpawn {
        program: String,
        source: std::io::Error,
    },
    /// Reading the output of `git ls-remote` failed
    RemoteRead { repo: String, source: std::io::Error },
}

impl std::fmt::Display for WtoolError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            WtoolError::WorkspaceNotFound { start } => write!(
                f,
                "no WORKSPACE file found in {} or any parent directory",
                start.display()
            ),
            WtoolError::FileRead { path, source } => {
                write!(f, "failed to read {}: {}", path.display(), source)
            }
            WtoolError::FileWrite { path, source } => {
                write!(f, "failed to write {}: {}", path.display(), source)
            }
            WtoolError::Parse {
                path,
                line,
                column,
                message,
            } => write!(f, "{}:{}:{}: {}", path.display(), line, column, message),
            WtoolError::Config { path, message } => {
                write!(f, "invalid config {}: {}", path.display(), message)
            }
            WtoolError::MalformedIdentifier { identifier, reason } => {
                write!(f, "malformed identifier {:?}: {}", identifier, reason)
            }
            WtoolError::VcsResolution {
                import_path,
                message,
            } => write!(
                f,
                "cannot resolve repository for {:?}: {}",
                import_path, message
            ),
            WtoolError::UnsupportedVcs { import_path, vcs } => write!(
                f,
                "only git supported, not {:?} (repository of {:?})",
                vcs, import_path
            ),
            WtoolError::NoRemoteOutput { repo, reference } => {
                write!(f, "nothing returned from ls-remote {:?} {}", repo, reference)
            }
            WtoolError::ProcessSpawn { program, source } => {
                write!(f, "failed to start {}: {}", program, source)
            }
            WtoolError::RemoteRead { repo, source } => {
                write!(f, "failed to read ls-remote output for {:?}: {}", repo, source)
            }
        }
    }
}

impl std::error::Error for WtoolError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            WtoolError::FileRead { source, .. }
            | WtoolError::FileWrite { source, .. }
            | WtoolError::ProcessSpawn { source, .. }
            | WtoolError::RemoteRead { source, .. } => Some(source),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_error_display_has_location() {
        let err = WtoolError::Parse {
            path: PathBuf::from("WORKSPACE"),
            line: 3,
            column: 7,
            message: "unterminated string".to_string(),
        };
        assert_eq!(err.to_string(), "WORKSPACE:3:7: unterminated string");
    }

    #[test]
    fn test_unsupported_vcs_display() {
        let err = WtoolError::UnsupportedVcs {
            import_path: "launchpad.net/foo".to_string(),
            vcs: "bzr".to_string(),
        };
        assert!(err.to_string().starts_with("only git supported, not \"bzr\""));
    }

    #[test]
    fn test_io_source_is_exposed() {
        use std::error::Error;
        let err = WtoolError::FileRead {
            path: PathBuf::from("WORKSPACE"),
            source: std::io::Error::new(std::io::ErrorKind::NotFound, "gone"),
        };
        assert!(err.source().is_some());
    }
}
