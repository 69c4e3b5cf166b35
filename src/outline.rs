//! Indented text rendering of a tree

use crate::config::DisplayConfig;
use crate::tree::TreeNode;

/// Render `root` one node per line, children indented below their parent.
///
/// Leaves show as `"name": value` (or just the name when values are hidden),
/// containers as `name (n)` with their child count. Nodes deeper than
/// `max_depth` levels below the root are left out.
pub fn render(root: &TreeNode, config: &DisplayConfig, max_depth: Option<usize>) -> String {
    let mut out = String::new();
    root.walk(&mut |path, node| {
        if max_depth.is_some_and(|max| path.depth() > max) {
            return;
        }
        out.push_str(&" ".repeat(path.depth() * config.indent));
        out.push_str(&node_line(node, config));
        out.push('\n');
    });
    out
}

fn node_line(node: &TreeNode, config: &DisplayConfig) -> String {
    match &node.value {
        Some(value) if config.show_values => format!(
            "\"{}\": {}",
            node.name,
            truncate_value(value, config.max_value_chars)
        ),
        Some(_) => node.name.clone(),
        None => format!("{} ({})", node.name, node.children.len()),
    }
}

/// Cut `value` to at most `max_chars` characters, ellipsis included.
///
/// Counts characters, not bytes. Line breaks are shown as `\n` so that a
/// value stays on one line.
pub fn truncate_value(value: &str, max_chars: usize) -> String {
    let value = value.replace('\r', "").replace('\n', "\\n");
    if value.chars().count() <= max_chars {
        return value;
    }

    let keep_chars = max_chars.saturating_sub(3);
    let truncated: String = value.chars().take(keep_chars).collect();
    format!("{truncated}...")
}
