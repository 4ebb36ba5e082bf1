//! Mutable BMEcat catalog documents with a single-selection cursor.
//!
//! [`CatalogState`] owns the parsed tree. Its `add_*`, `set_*`, `get_*`,
//! `del_*` and `num_*` operations accept an explicit key or, when the key is
//! `None`, act on the entity currently selected through the `select_*` family.

mod add;
mod count;
pub mod cursor;
mod del;
pub mod diff;
pub mod error;
pub mod fs;
mod get;
pub mod model;
pub mod schema;
mod set;
mod state;

pub use catner_config::{Config, DefaultSettings, OutputSettings};
pub use catner_tree::{copy_content, Document, NodeId};
pub use cursor::Selection;
pub use diff::build_unified_diff;
pub use error::{CatalogError, CatalogResult, ExitCode, Slot, Target};
pub use get::{ArticleImage, ArticleSummary, ArticleUnit};
pub use state::{CatalogState, STDOUT_PATH};
