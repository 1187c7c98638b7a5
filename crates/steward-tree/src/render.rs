//! Renders configuration subtrees as indented `key: value` text.
//!
//! Branch nodes produce `key:` followed by their children two spaces deeper;
//! leaf nodes produce `key: value`. Values are written without quoting.

use std::io::{self, Write};

use crate::node::{ConfigNode, NodeKind};

const INDENT: &[u8] = b"  ";

/// Renders `node` at the given nesting depth.
///
/// Returns `Ok(false)` without writing anything when the node has an empty
/// key or is [`NodeKind::Empty`]. A value carried by a branch node is not
/// written; only its children are.
///
/// # Errors
///
/// Propagates write failures from `writer`.
pub fn render<W>(node: &ConfigNode, writer: &mut W, depth: usize) -> io::Result<bool>
where
    W: Write + ?Sized,
{
    if node.key().is_empty() {
        return Ok(false);
    }
    match node.kind() {
        NodeKind::Empty => Ok(false),
        NodeKind::Branch => {
            write_indent(writer, depth)?;
            writeln!(writer, "{}:", node.key())?;
            for child in node.children() {
                render(child, writer, depth + 1)?;
            }
            Ok(true)
        }
        NodeKind::Leaf(value) => {
            write_indent(writer, depth)?;
            writeln!(writer, "{}: {value}", node.key())?;
            Ok(true)
        }
    }
}

/// Renders each child of `node` at depth zero and returns how many produced
/// output.
///
/// # Errors
///
/// Propagates write failures from `writer`.
pub fn render_children<W>(node: &ConfigNode, writer: &mut W) -> io::Result<usize>
where
    W: Write + ?Sized,
{
    let mut rendered = 0;
    for child in node.children() {
        if render(child, writer, 0)? {
            rendered += 1;
        }
    }
    Ok(rendered)
}

/// Renders the children of `node` into a string.
#[must_use]
pub fn render_children_to_string(node: &ConfigNode) -> String {
    let mut buffer = Vec::new();
    // Writes into a Vec cannot fail.
    if render_children(node, &mut buffer).is_err() {
        return String::new();
    }
    String::from_utf8_lossy(&buffer).into_owned()
}

fn write_indent<W>(writer: &mut W, depth: usize) -> io::Result<()>
where
    W: Write + ?Sized,
{
    for _ in 0..depth {
        writer.write_all(INDENT)?;
    }
    Ok(())
}
