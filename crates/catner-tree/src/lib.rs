mod access;
mod document;
mod error;
mod xml;

pub use access::{
    children_named, copy_content, count_children, find_child, find_or_create_child, nth_child,
    next_sibling_same_name, set_child_text,
};
pub use document::{Document, NodeId};
pub use error::{TreeError, TreeResult};
