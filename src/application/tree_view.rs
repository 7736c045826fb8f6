use std::fmt::Write as _;

use colored::Colorize;

use crate::filesystem::{LoadingStatus, TreeNode};

const INDENT: &str = "  ";
const UNITS: [&str; 4] = ["KiB", "MiB", "GiB", "TiB"];

/// Plain-text rendering of a (partially loaded) tree, one node per line.
#[derive(Debug, Clone, Copy)]
pub struct TreeView {
    color: bool,
    max_depth: Option<usize>,
}

impl TreeView {
    pub fn new(color: bool, max_depth: Option<usize>) -> Self {
        Self { color, max_depth }
    }

    pub fn render(&self, node: &TreeNode) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "{}", self.label(node, node.path()));
        self.render_children(node, 1, &mut out);
        out
    }

    /// One line naming the directory that contains the rendered node.
    pub fn parent_line(&self, parent: &TreeNode) -> String {
        let line = format!("(in {}/)", parent.path());
        if self.color {
            format!("{}\n", line.as_str().dimmed())
        } else {
            format!("{line}\n")
        }
    }

    fn render_children(&self, node: &TreeNode, depth: usize, out: &mut String) {
        if self.max_depth.is_some_and(|max| depth > max) {
            return;
        }

        for child in node.walk() {
            let _ = writeln!(
                out,
                "{}{}",
                INDENT.repeat(depth),
                self.label(&child, child.name())
            );
            if child.is_directory() {
                self.render_children(&child, depth + 1, out);
            }
        }
    }

    fn label(&self, node: &TreeNode, name: &str) -> String {
        if !node.is_directory() {
            let size = node.content_length().map(format_size).unwrap_or_default();
            return match (self.color, size.is_empty()) {
                (_, true) => name.to_string(),
                (true, false) => format!("{} {}", name, size.as_str().dimmed()),
                (false, false) => format!("{name} {size}"),
            };
        }

        let directory = format!("{name}/");
        let directory = if self.color {
            directory.as_str().blue().bold().to_string()
        } else {
            directory
        };

        if node.loading_status() == LoadingStatus::Ready {
            return directory;
        }
        let tag = if node.is_unknown() {
            "(unknown)"
        } else {
            "(not loaded)"
        };
        if self.color {
            format!("{} {}", directory, tag.dimmed())
        } else {
            format!("{directory} {tag}")
        }
    }
}

/// Human readable size, e.g. `512 B` or `1.5 KiB`.
pub fn format_size(bytes: u64) -> String {
    if bytes < 1024 {
        return format!("{bytes} B");
    }

    let mut value = bytes as f64 / 1024.0;
    let mut unit = 0;
    while value >= 1024.0 && unit < UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }
    format!("{value:.1} {}", UNITS[unit])
}
