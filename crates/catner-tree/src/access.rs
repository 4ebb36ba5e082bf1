//! Generic lookups over the direct children of an element.
//!
//! Every search walks children in document order and the first match wins;
//! callers rely on that ordering as the tie-break between duplicates.

use crate::document::{Document, NodeId};

/// Returns the first direct child of `parent` named `name` and, when `value`
/// is given, whose content equals it exactly.
pub fn find_child(
    doc: &Document,
    parent: NodeId,
    name: &str,
    value: Option<&str>,
) -> Option<NodeId> {
    children_named(doc, parent, name)
        .find(|child| value.map_or(true, |expected| content_matches(doc, *child, expected)))
}

/// Like [`find_child`], but appends a new child when nothing matches. The new
/// child carries `value` as its text when given, otherwise it is empty.
pub fn find_or_create_child(
    doc: &mut Document,
    parent: NodeId,
    name: &str,
    value: Option<&str>,
) -> NodeId {
    match find_child(doc, parent, name, value) {
        Some(child) => child,
        None => doc.create_child(parent, name, value),
    }
}

pub fn count_children(doc: &Document, parent: NodeId, name: &str, value: Option<&str>) -> usize {
    children_named(doc, parent, name)
        .filter(|child| value.map_or(true, |expected| content_matches(doc, *child, expected)))
        .count()
}

/// Zero-based `n`th child of `parent` named `name`.
pub fn nth_child(doc: &Document, parent: NodeId, name: &str, n: usize) -> Option<NodeId> {
    children_named(doc, parent, name).nth(n)
}

/// Next following sibling sharing the name of `node`, skipping unrelated
/// siblings in between.
pub fn next_sibling_same_name(doc: &Document, node: NodeId) -> Option<NodeId> {
    let name = doc.name(node)?;
    let parent = doc.parent(node)?;
    let siblings = doc.children(parent);
    let position = siblings.iter().position(|sibling| *sibling == node)?;

    siblings[position + 1..]
        .iter()
        .copied()
        .find(|sibling| doc.name(*sibling) == Some(name))
}

pub fn children_named<'a>(
    doc: &'a Document,
    parent: NodeId,
    name: &'a str,
) -> impl Iterator<Item = NodeId> + 'a {
    doc.children(parent)
        .iter()
        .copied()
        .filter(move |child| doc.name(*child) == Some(name))
}

/// Overwrites the text of the first child of `parent` named `name`. When no
/// such child exists it is appended if `create` is set. Returns false when
/// nothing was written.
pub fn set_child_text(
    doc: &mut Document,
    parent: NodeId,
    name: &str,
    value: &str,
    create: bool,
) -> bool {
    match find_child(doc, parent, name, None) {
        Some(child) => {
            doc.set_text(child, value);
            true
        }
        None if create => {
            doc.create_child(parent, name, Some(value));
            true
        }
        None => false,
    }
}

/// Copies the content of `node` into `buf` as a NUL-terminated byte string,
/// truncating when it does not fit.
///
/// Returns the buffer size required for the whole content including the
/// terminator, so a return value larger than `buf.len()` signals truncation.
/// An absent node or empty content leaves an empty string and returns 0.
pub fn copy_content(doc: &Document, node: Option<NodeId>, buf: &mut [u8]) -> usize {
    let content = node.and_then(|id| doc.content(id)).unwrap_or_default();
    if content.is_empty() {
        if let Some(first) = buf.first_mut() {
            *first = 0;
        }
        return 0;
    }

    let required = content.len() + 1;
    if buf.is_empty() {
        return required;
    }

    let copied = content.len().min(buf.len() - 1);
    buf[..copied].copy_from_slice(&content.as_bytes()[..copied]);
    buf[copied] = 0;
    required
}

fn content_matches(doc: &Document, node: NodeId, expected: &str) -> bool {
    doc.content(node).as_deref() == Some(expected)
}
