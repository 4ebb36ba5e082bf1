use std::fmt;
use std::io;

use catner_tree::TreeError;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum ExitCode {
    Success = 0,
    NotFound = 1,
    AlreadyExists = 2,
    InvalidValue = 3,
    NoSelection = 4,
    Io = 5,
    InvalidDocument = 6,
    Other = 7,
}

impl ExitCode {
    pub fn from_u8(value: u8) -> Option<Self> {
        match value {
            0 => Some(Self::Success),
            1 => Some(Self::NotFound),
            2 => Some(Self::AlreadyExists),
            3 => Some(Self::InvalidValue),
            4 => Some(Self::NoSelection),
            5 => Some(Self::Io),
            6 => Some(Self::InvalidDocument),
            7 => Some(Self::Other),
            _ => None,
        }
    }
}

/// Kind of entity a lookup failed to find.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Target {
    Article,
    Feature,
    Variant,
    Node,
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Target::Article => "article",
            Target::Feature => "feature",
            Target::Variant => "variant",
            Target::Node => "node",
        };
        f.write_str(label)
    }
}

/// Cursor slot that was required but empty.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Slot {
    Article,
    Feature,
    Variant,
    Image,
    Unit,
}

impl fmt::Display for Slot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Slot::Article => "article",
            Slot::Feature => "feature",
            Slot::Variant => "variant",
            Slot::Image => "image",
            Slot::Unit => "unit",
        };
        f.write_str(label)
    }
}

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("invalid value: {0}")]
    InvalidValue(String),

    #[error("no such {0}")]
    NotFound(Target),

    #[error("already exists: {0}")]
    AlreadyExists(String),

    #[error("no {0} selected")]
    NoSelection(Slot),

    #[error("document is missing required element {0}")]
    MissingContainer(&'static str),

    #[error("xml error: {0}")]
    Xml(#[from] TreeError),

    #[error("i/o error: {0}")]
    Io(#[from] io::Error),

    #[error("{0}")]
    Other(String),
}

impl CatalogError {
    pub fn exit_code(&self) -> ExitCode {
        match self {
            Self::NotFound(_) => ExitCode::NotFound,
            Self::AlreadyExists(_) => ExitCode::AlreadyExists,
            Self::InvalidValue(_) => ExitCode::InvalidValue,
            Self::NoSelection(_) => ExitCode::NoSelection,
            Self::Io(_) => ExitCode::Io,
            Self::MissingContainer(_) | Self::Xml(_) => ExitCode::InvalidDocument,
            Self::Other(_) => ExitCode::Other,
        }
    }
}

pub type CatalogResult<T> = Result<T, CatalogError>;
