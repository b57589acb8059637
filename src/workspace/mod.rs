//! The Bazel `WORKSPACE` file.
//!
//! - [`find_workspace_root`] walks up from a directory to the nearest
//!   `WORKSPACE`
//! - [`WorkspaceFile`] loads it, appends declarations in order and writes it
//!   back in canonical form
//!
//! Parsing and printing go through [`BuildFileSyntax`]; [`Starlark`] is the
//! implementation used by the CLI.

mod print;
mod syntax;

pub use syntax::{Attr, BuildFileSyntax, CallExpr, Document, Starlark, Stmt, StmtKind};

use crate::declaration::Declaration;
use crate::error::WtoolError;
use std::fs;
use std::path::{Path, PathBuf};

pub const WORKSPACE_FILE: &str = "WORKSPACE";

/// Find the nearest directory at or above `start` containing a `WORKSPACE`
/// file.
pub fn find_workspace_root(start: &Path) -> Result<PathBuf, WtoolError> {
    start
        .ancestors()
        .find(|dir| dir.join(WORKSPACE_FILE).is_file())
        .map(Path::to_path_buf)
        .ok_or_else(|| WtoolError::WorkspaceNotFound {
            start: start.to_path_buf(),
        })
}

/// A loaded `WORKSPACE` file.
///
/// Nothing touches the disk between [`WorkspaceFile::load`] and
/// [`WorkspaceFile::save`].
pub struct WorkspaceFile {
    document: Document,
    syntax: Box<dyn BuildFileSyntax>,
}

impl WorkspaceFile {
    pub fn load(path: &Path) -> Result<Self, WtoolError> {
        Self::load_with(path, Box::new(Starlark))
    }

    pub fn load_with(path: &Path, syntax: Box<dyn BuildFileSyntax>) -> Result<Self, WtoolError> {
        let data = fs::read(path).map_err(|source| WtoolError::FileRead {
            path: path.to_path_buf(),
            source,
        })?;
        let document = syntax.parse(path, &data)?;
        Ok(Self { document, syntax })
    }

    pub fn path(&self) -> &Path {
        &self.document.path
    }

    pub fn document(&self) -> &Document {
        &self.document
    }

    /// Names of every repository already declared with `name = "..."`.
    pub fn declared_names(&self) -> Vec<&str> {
        self.document
            .stmts
            .iter()
            .filter_map(Stmt::declared_name)
            .collect()
    }

    /// Append `declaration` as a `rule(...)` call after every existing
    /// statement. Existing entries with the same name are left alone.
    pub fn append(&mut self, declaration: &Declaration, rule: &str) {
        self.document.push_call(declaration.to_call(rule));
    }

    /// Canonical bytes of the current document.
    pub fn render(&mut self) -> Vec<u8> {
        self.syntax.rewrite(&mut self.document);
        self.syntax.format(&self.document)
    }

    /// Write the canonical document back to where it was loaded from.
    /// Returns the bytes written.
    pub fn save(&mut self) -> Result<Vec<u8>, WtoolError> {
        let bytes = self.render();
        fs::write(&self.document.path, &bytes).map_err(|source| WtoolError::FileWrite {
            path: self.document.path.clone(),
            source,
        })?;
        Ok(bytes)
    }
}
