//! # wtool - WORKSPACE dependency helper
//!
//! wtool augments a Bazel `WORKSPACE` file with `new_go_repository` entries.
//!
//! ## Quick Start
//!
//! ```bash
//! # Bazel repository names are mapped back to Go import paths
//! wtool com_github_golang_glog com_google_cloud_go
//!
//! # When the mapping guesses wrong, pass the import path itself
//! wtool --asis github.com/golang/glog
//! ```
//!
//! Each dependency is resolved to its git repository and pinned to the
//! current `HEAD` commit via `git ls-remote`.
//!
//! ## Module Organization
//!
//! - [`naming`] - Bazel repository name <-> Go import path
//! - [`vcs`] - Repository discovery and remote commit lookup
//! - [`declaration`] - The record appended per dependency
//! - [`workspace`] - Locating, parsing and rewriting `WORKSPACE`
//! - [`add`] - The command driver

/// Command driver: resolve, append, write.
pub mod add;

/// Configuration file parsing (`wtool.toml`).
pub mod config;

/// Dependency declarations.
pub mod declaration;

/// Error type shared by all modules.
pub mod error;

/// Repository name and import path mapping.
pub mod naming;

/// Terminal UI utilities (tables, spinners).
pub mod ui;

/// Version control discovery and `git ls-remote`.
pub mod vcs;

/// `WORKSPACE` discovery, parsing and formatting.
pub mod workspace;
