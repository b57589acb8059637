//! Canonical layout and printing for [`Document`].

use super::syntax::{CallExpr, Document, StmtKind};

const INDENT: &str = "    ";

/// Normalize blank lines: none at the top of the file, never two in a row,
/// and one before every statement added by wtool.
pub fn rewrite(document: &mut Document) {
    for (idx, stmt) in document.stmts.iter_mut().enumerate() {
        collapse_blank_lines(&mut stmt.leading);
        if idx == 0 {
            while stmt.leading.first().is_some_and(|l| l.is_empty()) {
                stmt.leading.remove(0);
            }
        } else if matches!(stmt.kind, StmtKind::Call(_)) && stmt.leading.is_empty() {
            stmt.leading.insert(0, String::new());
        }
    }

    collapse_blank_lines(&mut document.trailing);
    if document.stmts.is_empty() {
        while document.trailing.first().is_some_and(|l| l.is_empty()) {
            document.trailing.remove(0);
        }
    }
    while document.trailing.last().is_some_and(|l| l.is_empty()) {
        document.trailing.pop();
    }
}

fn collapse_blank_lines(lines: &mut Vec<String>) {
    lines.dedup_by(|a, b| a.is_empty() && b.is_empty());
}

/// Print the document. Statements read from disk come out as they went in.
pub fn format(document: &Document) -> String {
    let mut out = String::new();

    for stmt in &document.stmts {
        for line in &stmt.leading {
            out.push_str(line);
            out.push('\n');
        }
        match &stmt.kind {
            StmtKind::Source(text) => out.push_str(text),
            StmtKind::Call(call) => format_call(call, &mut out),
        }
        out.push('\n');
    }

    for line in &document.trailing {
        out.push_str(line);
        out.push('\n');
    }

    out
}

fn format_call(call: &CallExpr, out: &mut String) {
    out.push_str(&call.function);
    if call.args.is_empty() {
        out.push_str("()");
        return;
    }

    out.push_str("(\n");
    for attr in &call.args {
        out.push_str(INDENT);
        out.push_str(&attr.key);
        out.push_str(" = ");
        out.push_str(&quote(&attr.value));
        out.push_str(",\n");
    }
    out.push(')');
}

/// Double-quoted Starlark string literal.
fn quote(value: &str) -> String {
    let mut s = String::with_capacity(value.len() + 2);
    s.push('"');
    for c in value.chars() {
        match c {
            '"' => s.push_str("\\\""),
            '\\' => s.push_str("\\\\"),
            '\n' => s.push_str("\\n"),
            '\t' => s.push_str("\\t"),
            '\r' => s.push_str("\\r"),
            _ => s.push(c),
        }
    }
    s.push('"');
    s
}
