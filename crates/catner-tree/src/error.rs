use std::io;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum TreeError {
    #[error("malformed xml at byte {position}: {source}")]
    Syntax {
        position: u64,
        source: quick_xml::Error,
    },

    #[error("element name is not valid utf-8")]
    InvalidName,

    #[error("closing tag '{found}' does not match open element '{expected}'")]
    MismatchedTag { expected: String, found: String },

    #[error("unexpected closing tag '{0}' outside of any element")]
    UnexpectedClose(String),

    #[error("document ended with {0} unclosed element(s)")]
    Unclosed(usize),

    #[error("document has more than one root element")]
    MultipleRoots,

    #[error("node is no longer part of the document")]
    StaleNode,

    #[error("i/o error: {0}")]
    Io(#[from] io::Error),
}

pub type TreeResult<T> = Result<T, TreeError>;
