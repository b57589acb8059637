//! Statement-level model of a Starlark build file.
//!
//! Existing statements are kept as source text; only statements added by
//! wtool are structured. That is enough to append to a `WORKSPACE` without
//! disturbing anything already in it.

use crate::error::WtoolError;
use regex::Regex;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

static CALL_NAME_ATTR: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?s)^[A-Za-z_][A-Za-z0-9_.]*\s*\(.*?\bname\s*=\s*"([^"\\]*)""#).unwrap()
});

/// Parse, normalize and print build files.
pub trait BuildFileSyntax {
    fn parse(&self, path: &Path, data: &[u8]) -> Result<Document, WtoolError>;
    /// Bring the document into canonical layout.
    fn rewrite(&self, document: &mut Document);
    fn format(&self, document: &Document) -> Vec<u8>;
}

/// A parsed build file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Document {
    pub path: PathBuf,
    pub stmts: Vec<Stmt>,
    /// Comment lines after the last statement (`""` marks a blank line).
    /// Appending a call moves them above it.
    pub trailing: Vec<String>,
}

/// A top-level statement plus the comments and blank lines above it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Stmt {
    /// Lines preceding the statement; `""` marks a blank line
    pub leading: Vec<String>,
    pub kind: StmtKind,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StmtKind {
    /// Source text of a statement read from disk
    Source(String),
    Call(CallExpr),
}

/// `function(key = "value", ...)`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallExpr {
    pub function: String,
    pub args: Vec<Attr>,
}

/// `key = "value"` inside a call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attr {
    pub key: String,
    pub value: String,
}

impl Attr {
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }
}

impl Stmt {
    /// The `name = "..."` attribute of a call statement, if any.
    pub fn declared_name(&self) -> Option<&str> {
        match &self.kind {
            StmtKind::Call(call) => call
                .args
                .iter()
                .find(|a| a.key == "name")
                .map(|a| a.value.as_str()),
            StmtKind::Source(text) => CALL_NAME_ATTR
                .captures(text)
                .and_then(|c| c.get(1))
                .map(|m| m.as_str()),
        }
    }
}

impl Document {
    /// Append `call` after everything in the document, trailing comments
    /// included.
    pub fn push_call(&mut self, call: CallExpr) {
        let mut leading = std::mem::take(&mut self.trailing);
        leading.push(String::new());
        self.stmts.push(Stmt {
            leading,
            kind: StmtKind::Call(call),
        });
    }
}

/// The Starlark dialect used by Bazel `WORKSPACE` and `BUILD` files.
#[derive(Debug, Clone, Copy, Default)]
pub struct Starlark;

impl BuildFileSyntax for Starlark {
    fn parse(&self, path: &Path, data: &[u8]) -> Result<Document, WtoolError> {
        let source = std::str::from_utf8(data).map_err(|e| WtoolError::Parse {
            path: path.to_path_buf(),
            line: 1,
            column: 1,
            message: format!("file is not valid UTF-8: {}", e),
        })?;
        Parser::new(path).parse(source)
    }

    fn rewrite(&self, document: &mut Document) {
        super::print::rewrite(document);
    }

    fn format(&self, document: &Document) -> Vec<u8> {
        super::print::format(document).into_bytes()
    }
}

#[derive(Debug, Clone, Copy)]
struct Quote {
    ch: char,
    triple: bool,
    line: usize,
    column: usize,
}

struct Parser<'a> {
    path: &'a Path,
    stmts: Vec<Stmt>,
    pending: Vec<String>,
    /// Leading lines and text of the statement being read
    current: Option<(Vec<String>, String)>,
    brackets: Vec<(char, usize, usize)>,
    quote: Option<Quote>,
}

impl<'a> Parser<'a> {
    fn new(path: &'a Path) -> Self {
        Self {
            path,
            stmts: Vec::new(),
            pending: Vec::new(),
            current: None,
            brackets: Vec::new(),
            quote: None,
        }
    }

    fn error(&self, line: usize, column: usize, message: impl Into<String>) -> WtoolError {
        WtoolError::Parse {
            path: self.path.to_path_buf(),
            line,
            column,
            message: message.into(),
        }
    }

    fn parse(mut self, source: &str) -> Result<Document, WtoolError> {
        for (idx, line) in source.lines().enumerate() {
            self.line(idx + 1, line)?;
        }

        if let Some(q) = self.quote {
            return Err(self.error(q.line, q.column, "unterminated string"));
        }
        if let Some(&(open, line, column)) = self.brackets.last() {
            return Err(self.error(line, column, format!("unclosed '{}'", open)));
        }
        // A trailing backslash continuation runs into end of file.
        self.finish();

        while self.pending.last().is_some_and(|l| l.is_empty()) {
            self.pending.pop();
        }

        Ok(Document {
            path: self.path.to_path_buf(),
            stmts: self.stmts,
            trailing: self.pending,
        })
    }

    fn line(&mut self, lineno: usize, line: &str) -> Result<(), WtoolError> {
        if self.current.is_none() {
            let trimmed = line.trim();
            if trimmed.is_empty() {
                if self.pending.last().is_none_or(|l| !l.is_empty()) {
                    self.pending.push(String::new());
                }
                return Ok(());
            }
            if trimmed.starts_with('#') {
                self.pending.push(line.trim_end().to_string());
                return Ok(());
            }

            if line.starts_with([' ', '\t']) {
                // Indented block body, e.g. under a `def`: reopen the
                // previous statement.
                let Some(Stmt {
                    leading,
                    kind: StmtKind::Source(mut text),
                }) = self.stmts.pop()
                else {
                    return Err(self.error(lineno, 1, "unexpected indentation"));
                };
                for pending in self.pending.drain(..) {
                    text.push('\n');
                    text.push_str(&pending);
                }
                text.push('\n');
                self.current = Some((leading, text));
            } else {
                self.current = Some((std::mem::take(&mut self.pending), String::new()));
            }
        } else if let Some((_, text)) = self.current.as_mut() {
            text.push('\n');
        }

        let ends_in_string = self.scan(lineno, line)?;
        let kept = if ends_in_string { line } else { line.trim_end() };
        if let Some((_, text)) = self.current.as_mut() {
            text.push_str(kept);
        }

        let continued = !ends_in_string && line.trim_end().ends_with('\\');
        if self.quote.is_none() && self.brackets.is_empty() && !continued {
            self.finish();
        }
        Ok(())
    }

    fn finish(&mut self) {
        if let Some((leading, text)) = self.current.take() {
            self.stmts.push(Stmt {
                leading,
                kind: StmtKind::Source(text),
            });
        }
    }

    /// Track strings and brackets across one physical line. Returns whether
    /// the line ends inside a triple-quoted string.
    fn scan(&mut self, lineno: usize, line: &str) -> Result<bool, WtoolError> {
        let chars: Vec<char> = line.chars().collect();
        let mut i = 0;

        while i < chars.len() {
            let c = chars[i];
            let column = i + 1;

            if let Some(q) = self.quote {
                if c == '\\' {
                    i += 2;
                    continue;
                }
                if c == q.ch {
                    if !q.triple {
                        self.quote = None;
                    } else if chars.get(i + 1) == Some(&q.ch) && chars.get(i + 2) == Some(&q.ch)
                    {
                        self.quote = None;
                        i += 3;
                        continue;
                    }
                }
                i += 1;
                continue;
            }

            match c {
                '#' => break,
                '"' | '\'' => {
                    let triple = chars.get(i + 1) == Some(&c) && chars.get(i + 2) == Some(&c);
                    self.quote = Some(Quote {
                        ch: c,
                        triple,
                        line: lineno,
                        column,
                    });
                    i += if triple { 3 } else { 1 };
                    continue;
                }
                '(' | '[' | '{' => self.brackets.push((c, lineno, column)),
                ')' | ']' | '}' => {
                    let expected = match c {
                        ')' => '(',
                        ']' => '[',
                        _ => '{',
                    };
                    match self.brackets.pop() {
                        Some((open, _, _)) if open == expected => {}
                        Some((open, line, col)) => {
                            return Err(self.error(
                                lineno,
                                column,
                                format!(
                                    "'{}' does not match '{}' opened at {}:{}",
                                    c, open, line, col
                                ),
                            ));
                        }
                        None => {
                            return Err(self.error(lineno, column, format!("unexpected '{}'", c)));
                        }
                    }
                }
                _ => {}
            }
            i += 1;
        }

        match self.quote {
            Some(q) if q.triple => Ok(true),
            Some(q) => Err(self.error(q.line, q.column, "unterminated string")),
            None => Ok(false),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(src: &str) -> Result<Document, WtoolError> {
        Starlark.parse(Path::new("WORKSPACE"), src.as_bytes())
    }

    fn sources(doc: &Document) -> Vec<&str> {
        doc.stmts
            .iter()
            .map(|s| match &s.kind {
                StmtKind::Source(text) => text.as_str(),
                StmtKind::Call(_) => panic!("Expected Source statement"),
            })
            .collect()
    }

    #[test]
    fn test_statements_split_at_top_level() {
        let doc = parse(
            r#"workspace(name = "demo")

load("@io_bazel_rules_go//go:def.bzl", "go_repositories", "new_go_repository")

go_repositories()
"#,
        )
        .unwrap();
        assert_eq!(
            sources(&doc),
            [
                r#"workspace(name = "demo")"#,
                r#"load("@io_bazel_rules_go//go:def.bzl", "go_repositories", "new_go_repository")"#,
                "go_repositories()",
            ]
        );
        assert_eq!(doc.stmts[1].leading, [""]);
        assert!(doc.trailing.is_empty());
    }

    #[test]
    fn test_multiline_call_is_one_statement() {
        let doc = parse(
            "git_repository(\n    name = \"io_bazel_rules_go\",   \n    remote = \"https://github.com/bazelbuild/rules_go.git\",\n    tag = \"0.2.0\",\n)\n",
        )
        .unwrap();
        assert_eq!(doc.stmts.len(), 1);
        // Trailing whitespace is dropped.
        assert!(sources(&doc)[0].contains("\"io_bazel_rules_go\",\n"));
        assert_eq!(doc.stmts[0].declared_name(), Some("io_bazel_rules_go"));
    }

    #[test]
    fn test_comments_attach_to_next_statement() {
        let doc = parse("# header\n\n# about glog\nfoo()\n# the end\n\n").unwrap();
        assert_eq!(doc.stmts[0].leading, ["# header", "", "# about glog"]);
        assert_eq!(doc.trailing, ["# the end"]);
    }

    #[test]
    fn test_brackets_in_strings_and_comments_ignored() {
        let doc = parse("x = \"(\" # )]}\ny = ')'\nz = \"\"\"\n  ( unbalanced\n\"\"\"\n").unwrap();
        assert_eq!(doc.stmts.len(), 3);
        assert_eq!(sources(&doc)[2], "z = \"\"\"\n  ( unbalanced\n\"\"\"");
    }

    #[test]
    fn test_escaped_quote_in_string() {
        let doc = parse("x = \"a \\\" (\"\ny = 1\n").unwrap();
        assert_eq!(doc.stmts.len(), 2);
    }

    #[test]
    fn test_def_body_continues_statement() {
        let doc = parse("def deps():\n    foo()\n\n    bar()\n\nbaz()\n").unwrap();
        assert_eq!(
            sources(&doc),
            ["def deps():\n    foo()\n\n    bar()", "baz()"]
        );
    }

    #[test]
    fn test_backslash_continuation() {
        let doc = parse("x = 1 + \\\n    2\ny = 3\n").unwrap();
        assert_eq!(sources(&doc), ["x = 1 + \\\n    2", "y = 3"]);
    }

    #[test]
    fn test_unclosed_bracket() {
        let err = parse("foo(\n    name = \"x\",\n").unwrap_err();
        match err {
            WtoolError::Parse {
                line,
                column,
                message,
                ..
            } => {
                assert_eq!((line, column), (1, 4));
                assert!(message.contains("unclosed '('"));
            }
            other => panic!("Expected Parse error, got {:?}", other),
        }
    }

    #[test]
    fn test_mismatched_bracket() {
        let err = parse("foo([)\n").unwrap_err();
        assert!(err.to_string().contains("does not match"));
    }

    #[test]
    fn test_unexpected_close() {
        let err = parse("foo()\n)\n").unwrap_err();
        assert!(err.to_string().contains("WORKSPACE:2:1: unexpected ')'"));
    }

    #[test]
    fn test_unterminated_strings() {
        assert!(parse("x = \"abc\n").is_err());
        let err = parse("x = '''abc\n").unwrap_err();
        assert!(err.to_string().contains("unterminated string"));
    }

    #[test]
    fn test_leading_indentation_without_statement() {
        assert!(parse("   foo()\n").is_err());
    }

    #[test]
    fn test_invalid_utf8() {
        let err = Starlark
            .parse(Path::new("WORKSPACE"), &[0x66, 0x6f, 0xff])
            .unwrap_err();
        assert!(err.to_string().contains("UTF-8"));
    }

    #[test]
    fn test_declared_name_of_source() {
        let doc = parse("new_go_repository(\n    name = \"com_github_golang_glog\",\n)\nload(\"x\", \"y\")\n")
            .unwrap();
        assert_eq!(doc.stmts[0].declared_name(), Some("com_github_golang_glog"));
        assert_eq!(doc.stmts[1].declared_name(), None);
    }
}
