//! Terminal output helpers.
//!
//! - `Table` - box-drawn table sized to the terminal
//! - `lookup_spinner` - spinner shown while a remote is queried

use colored::*;
use indicatif::{ProgressBar, ProgressStyle};
use std::time::Duration;

pub struct Table {
    headers: Vec<String>,
    rows: Vec<Vec<String>>,
}

impl Table {
    pub fn new(headers: &[&str]) -> Self {
        Self {
            headers: headers.iter().map(|s| s.to_string()).collect(),
            rows: Vec::new(),
        }
    }

    pub fn add_row(&mut self, row: Vec<String>) {
        if row.len() == self.headers.len() {
            self.rows.push(row);
        }
    }

    /// Render with a maximum total width; the widest columns shrink first.
    pub fn render(&self, max_width: usize) -> String {
        if self.headers.is_empty() {
            return String::new();
        }

        let mut widths: Vec<usize> = self
            .headers
            .iter()
            .map(|h| console::measure_text_width(h))
            .collect();
        for row in &self.rows {
            for (w, cell) in widths.iter_mut().zip(row) {
                *w = (*w).max(console::measure_text_width(cell));
            }
        }

        // "│ " + " │ " between columns + " │"
        let overhead = 4 + 3 * (widths.len() - 1);
        while overhead + widths.iter().sum::<usize>() > max_width {
            let Some(widest) = widths.iter_mut().filter(|w| **w > 8).max_by_key(|w| **w) else {
                break;
            };
            *widest -= 1;
        }

        let border = |left: &str, mid: &str, right: &str| {
            let parts: Vec<String> = widths.iter().map(|w| "─".repeat(w + 2)).collect();
            format!("{}{}{}\n", left, parts.join(mid), right)
        };
        let line = |cells: &[String], bold: bool| {
            let parts: Vec<String> = cells
                .iter()
                .zip(&widths)
                .map(|(cell, &w)| {
                    let cell = console::truncate_str(cell, w, "...");
                    let padded = console::pad_str(&cell, w, console::Alignment::Left, None);
                    if bold {
                        padded.bold().to_string()
                    } else {
                        padded.into_owned()
                    }
                })
                .collect();
            format!("│ {} │\n", parts.join(" │ "))
        };

        let mut out = border("┌", "┬", "┐");
        out.push_str(&line(&self.headers, true));
        out.push_str(&border("├", "┼", "┤"));
        for row in &self.rows {
            out.push_str(&line(row, false));
        }
        out.push_str(&border("└", "┴", "┘"));
        out
    }

    pub fn print(&self) {
        let (_, term_width) = console::Term::stdout().size();
        for line in self.render(term_width as usize).lines() {
            println!("  {}", line);
        }
    }
}

/// Spinner on stderr for one remote lookup. Hidden when stderr is not a
/// terminal.
pub fn lookup_spinner(label: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.blue} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
            .tick_chars("⣾⣽⣻⢿⡿⣟⣯⣷ "),
    );
    pb.set_message(format!("Resolving {}...", label));
    pb.enable_steady_tick(Duration::from_millis(100));
    pb
}
