//! Schema-aware lookups layered over the generic child accessors.
//!
//! All locators walk siblings in document order and return the first match.
//! There is no secondary index; a lookup costs one pass over the siblings.

use catner_tree::{
    children_named, count_children, find_child, find_or_create_child, set_child_text, Document,
    NodeId,
};
use log::warn;

use crate::error::{CatalogError, CatalogResult};
use crate::schema;

/// Handles of the required containers every catalog document carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Containers {
    pub root: NodeId,
    pub header: NodeId,
    pub catalog: NodeId,
    pub articles: NodeId,
}

impl Containers {
    /// Builds the skeleton of an empty catalog in `doc`, replacing any root.
    pub fn create(doc: &mut Document) -> Self {
        let root = new_root(doc);
        let header = doc.create_child(root, schema::HEADER, None);
        let articles = doc.create_child(root, schema::ARTICLES, None);
        let catalog = doc.create_child(header, schema::CATALOG, None);
        Containers {
            root,
            header,
            catalog,
            articles,
        }
    }

    /// Finds the required containers of a parsed document. Missing containers
    /// are created when `amend` is set; otherwise the first missing one is
    /// reported. A root element with a foreign name is never accepted.
    pub fn resolve(doc: &mut Document, amend: bool) -> CatalogResult<Self> {
        let root = match doc.root() {
            Some(root) if doc.name(root) == Some(schema::ROOT) => root,
            Some(_) => return Err(CatalogError::MissingContainer(schema::ROOT)),
            None if amend => {
                warn!("event=amend module=model element={}", schema::ROOT);
                new_root(doc)
            }
            None => return Err(CatalogError::MissingContainer(schema::ROOT)),
        };

        let header = require_child(doc, root, schema::HEADER, amend)?;
        let articles = require_child(doc, root, schema::ARTICLES, amend)?;
        let catalog = require_child(doc, header, schema::CATALOG, amend)?;

        Ok(Containers {
            root,
            header,
            catalog,
            articles,
        })
    }
}

fn new_root(doc: &mut Document) -> NodeId {
    let root = doc.set_root(schema::ROOT);
    doc.set_attribute(root, "version", schema::VERSION);
    doc.set_attribute(root, "xmlns", schema::NAMESPACE);
    root
}

fn require_child(
    doc: &mut Document,
    parent: NodeId,
    name: &'static str,
    amend: bool,
) -> CatalogResult<NodeId> {
    if let Some(child) = find_child(doc, parent, name, None) {
        return Ok(child);
    }
    if !amend {
        return Err(CatalogError::MissingContainer(name));
    }
    warn!("event=amend module=model element={name}");
    Ok(find_or_create_child(doc, parent, name, None))
}

pub fn locate_generator(doc: &Document, header: NodeId) -> Option<NodeId> {
    find_child(doc, header, schema::GENERATOR, None)
}

/// First article whose `SUPPLIER_AID` equals `aid`.
pub fn locate_article(doc: &Document, articles: NodeId, aid: &str) -> Option<NodeId> {
    children_named(doc, articles, schema::ARTICLE)
        .find(|article| find_child(doc, *article, schema::ARTICLE_ID, Some(aid)).is_some())
}

pub fn locate_feature(doc: &Document, article: NodeId, fid: &str) -> Option<NodeId> {
    let features = find_child(doc, article, schema::FEATURES, None)?;
    children_named(doc, features, schema::FEATURE)
        .find(|feature| find_child(doc, *feature, schema::FEATURE_ID, Some(fid)).is_some())
}

pub fn locate_variant(doc: &Document, feature: NodeId, vid: &str) -> Option<NodeId> {
    let variants = find_child(doc, feature, schema::VARIANTS, None)?;
    children_named(doc, variants, schema::VARIANT)
        .find(|variant| find_child(doc, *variant, schema::VARIANT_ID, Some(vid)).is_some())
}

/// Image entry (`MIME`) of `article` whose source path equals `path`.
pub fn locate_image(doc: &Document, article: NodeId, path: &str) -> Option<NodeId> {
    let images = find_child(doc, article, schema::IMAGES, None)?;
    children_named(doc, images, schema::IMAGE)
        .find(|image| find_child(doc, *image, schema::IMAGE_PATH, Some(path)).is_some())
}

pub fn locate_category(doc: &Document, article: NodeId, category: &str) -> Option<NodeId> {
    children_named(doc, article, schema::CATEGORY).find(|reference| {
        find_child(doc, *reference, schema::CATEGORY_ID, Some(category)).is_some()
    })
}

/// Alternative unit with the given code inside an `ARTICLE_ORDER_DETAILS`.
pub fn locate_alt_unit(doc: &Document, units: NodeId, code: &str) -> Option<NodeId> {
    children_named(doc, units, schema::ALT_UNIT)
        .find(|unit| find_child(doc, *unit, schema::UNIT_CODE, Some(code)).is_some())
}

pub fn num_features(doc: &Document, article: NodeId) -> usize {
    find_child(doc, article, schema::FEATURES, None)
        .map_or(0, |features| count_children(doc, features, schema::FEATURE, None))
}

pub fn num_variants(doc: &Document, feature: NodeId) -> usize {
    find_child(doc, feature, schema::VARIANTS, None)
        .map_or(0, |variants| count_children(doc, variants, schema::VARIANT, None))
}

/// Rewrites `FORDER` of every feature of `article` to 1..N in document order,
/// creating the element where it is missing.
pub fn renumber_features(doc: &mut Document, article: NodeId) {
    let Some(features) = find_child(doc, article, schema::FEATURES, None) else {
        return;
    };
    let ordered: Vec<NodeId> = children_named(doc, features, schema::FEATURE).collect();
    for (index, feature) in ordered.into_iter().enumerate() {
        let order = (index + 1).to_string();
        set_child_text(doc, feature, schema::FEATURE_ORDER, &order, true);
    }
}

/// Content of the first child of `parent` named `name`.
pub fn child_content(doc: &Document, parent: NodeId, name: &str) -> Option<String> {
    find_child(doc, parent, name, None).and_then(|child| doc.content(child))
}

/// Walks up `levels` parents from `node`.
pub(crate) fn ancestor(doc: &Document, node: NodeId, levels: usize) -> Option<NodeId> {
    (0..levels).try_fold(node, |current, _| doc.parent(current))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn feature(doc: &mut Document, features: NodeId, fid: &str, order: &str) -> NodeId {
        let feature = doc.create_child(features, schema::FEATURE, None);
        doc.create_child(feature, schema::FEATURE_ID, Some(fid));
        doc.create_child(feature, schema::FEATURE_ORDER, Some(order));
        feature
    }

    #[test]
    fn resolve_without_amend_reports_first_missing_container() {
        let mut doc = Document::parse("<BMECAT><HEADER/></BMECAT>").unwrap();
        let err = Containers::resolve(&mut doc, false).unwrap_err();
        assert!(matches!(
            err,
            CatalogError::MissingContainer(schema::ARTICLES)
        ));
    }

    #[test]
    fn resolve_with_amend_builds_skeleton_from_empty_document() {
        let mut doc = Document::new();
        let containers = Containers::resolve(&mut doc, true).unwrap();
        assert_eq!(doc.name(containers.root), Some(schema::ROOT));
        assert_eq!(doc.attribute(containers.root, "version"), Some(schema::VERSION));
        assert_eq!(doc.parent(containers.catalog), Some(containers.header));
        assert_eq!(doc.parent(containers.articles), Some(containers.root));
    }

    #[test]
    fn foreign_root_is_rejected_even_when_amending() {
        let mut doc = Document::parse("<CATALOGUE/>").unwrap();
        assert!(Containers::resolve(&mut doc, true).is_err());
    }

    #[test]
    fn locate_article_skips_non_article_children() {
        let mut doc = Document::new();
        let containers = Containers::create(&mut doc);
        let stray = doc.create_child(containers.articles, "NOTE", None);
        doc.create_child(stray, schema::ARTICLE_ID, Some("A1"));
        let article = doc.create_child(containers.articles, schema::ARTICLE, None);
        doc.create_child(article, schema::ARTICLE_ID, Some("A1"));

        assert_eq!(locate_article(&doc, containers.articles, "A1"), Some(article));
        assert_eq!(locate_article(&doc, containers.articles, "A2"), None);
    }

    #[test]
    fn renumber_closes_gaps_in_document_order() {
        let mut doc = Document::new();
        let containers = Containers::create(&mut doc);
        let article = doc.create_child(containers.articles, schema::ARTICLE, None);
        let features = doc.create_child(article, schema::FEATURES, None);
        let first = feature(&mut doc, features, "F1", "1");
        let third = feature(&mut doc, features, "F3", "3");
        let bare = doc.create_child(features, schema::FEATURE, None);

        renumber_features(&mut doc, article);

        assert_eq!(child_content(&doc, first, schema::FEATURE_ORDER).as_deref(), Some("1"));
        assert_eq!(child_content(&doc, third, schema::FEATURE_ORDER).as_deref(), Some("2"));
        assert_eq!(child_content(&doc, bare, schema::FEATURE_ORDER).as_deref(), Some("3"));
        assert_eq!(num_features(&doc, article), 3);
    }
}
