use crate::store::{NodeKind, SurfaceStore};
use core_types::Handle;
use std::fmt::{self, Write};

/// Deterministic line serialization of a live subtree, for test comparisons.
///
/// Rules:
/// - One line per object, indented two spaces per depth.
/// - Elements print as `<tag name="value" ...>` with attributes in name
///   order, followed by live properties and style entries if any.
/// - Text prints quoted and escaped.
/// - Fragments print as `#fragment` unless inlined by the options.
#[derive(Clone, Copy, Debug)]
pub struct SnapshotOptions {
    pub show_handles: bool,
    pub inline_fragments: bool,
}

impl Default for SnapshotOptions {
    fn default() -> Self {
        Self {
            show_handles: false,
            inline_fragments: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SurfaceSnapshot {
    lines: Vec<String>,
}

impl SurfaceSnapshot {
    /// Snapshot of the children of `root`.
    pub fn new(store: &SurfaceStore, root: Handle, options: SnapshotOptions) -> Self {
        let mut lines = Vec::new();
        for child in store.children(root) {
            walk(store, *child, 0, &options, &mut lines);
        }
        Self { lines }
    }

    pub fn as_lines(&self) -> &[String] {
        &self.lines
    }

    pub fn render(&self) -> String {
        self.lines.join("\n")
    }
}

impl fmt::Display for SurfaceSnapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.render())
    }
}

fn walk(
    store: &SurfaceStore,
    handle: Handle,
    depth: usize,
    options: &SnapshotOptions,
    out: &mut Vec<String>,
) {
    let Ok(record) = store.record(handle) else {
        out.push(format!("{}<released {handle}>", "  ".repeat(depth)));
        return;
    };
    if matches!(record.kind, NodeKind::Fragment) && options.inline_fragments {
        for child in &record.children {
            walk(store, *child, depth, options, out);
        }
        return;
    }
    let mut line = "  ".repeat(depth);
    if options.show_handles {
        let _ = write!(line, "{handle} ");
    }
    match &record.kind {
        NodeKind::Element {
            tag,
            attributes,
            properties,
            style,
            ..
        } => {
            let _ = write!(line, "<{tag}");
            for (name, value) in attributes {
                let _ = write!(line, " {name}=\"{}\"", escape_text(value));
            }
            for (name, value) in properties {
                let _ = write!(line, " .{name}={value}");
            }
            if let Some(text) = &style.text {
                let _ = write!(line, " style=\"{}\"", escape_text(text));
            } else if !style.entries.is_empty() {
                let entries: Vec<_> = style
                    .entries
                    .iter()
                    .map(|(name, value)| format!("{name}: {value}"))
                    .collect();
                let _ = write!(line, " style=\"{}\"", entries.join("; "));
            }
            line.push('>');
        }
        NodeKind::Text { text } => {
            let _ = write!(line, "\"{}\"", escape_text(text));
        }
        NodeKind::Fragment => line.push_str("#fragment"),
    }
    out.push(line);
    for child in &record.children {
        walk(store, *child, depth + 1, options, out);
    }
}

pub fn escape_text(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '\\' => out.push_str("\\\\"),
            '"' => out.push_str("\\\""),
            '\n' => out.push_str("\\n"),
            '\t' => out.push_str("\\t"),
            ch if ch < ' ' => {
                let _ = write!(out, "\\u{{{:02X}}}", ch as u32);
            }
            _ => out.push(ch),
        }
    }
    out
}

/// Panics with a readable report if the snapshot of `root` differs from
/// `expected`.
pub fn assert_snapshot(store: &SurfaceStore, root: Handle, expected: &[&str]) {
    let actual = SurfaceSnapshot::new(store, root, SnapshotOptions::default());
    let expected: Vec<String> = expected.iter().map(|line| line.to_string()).collect();
    if actual.as_lines() != expected.as_slice() {
        panic!(
            "surface snapshot mismatch\nexpected:\n{}\nactual:\n{}",
            expected.join("\n"),
            actual.render()
        );
    }
}
