//! Read accessors. A missing path degrades to an empty result.

use catner_tree::{children_named, find_child, NodeId};

use crate::model;
use crate::schema;
use crate::state::CatalogState;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArticleImage {
    pub mime: String,
    pub path: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArticleUnit {
    pub code: String,
    pub factor: String,
}

/// One row of a catalog listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArticleSummary {
    pub aid: String,
    pub title: String,
    pub main_unit: String,
    pub categories: usize,
    pub images: usize,
    pub features: usize,
}

impl CatalogState {
    pub fn get_locale(&self) -> String {
        self.text_of(Some(self.containers.catalog), schema::LOCALE)
    }

    pub fn get_generator(&self) -> String {
        model::locate_generator(&self.doc, self.containers.header)
            .and_then(|generator| self.doc.content(generator))
            .unwrap_or_default()
    }

    pub fn get_territories(&self) -> Vec<String> {
        children_named(&self.doc, self.containers.catalog, schema::TERRITORY)
            .filter_map(|territory| self.doc.content(territory))
            .collect()
    }

    pub fn get_article_title(&self, aid: Option<&str>) -> String {
        let details = self.article_child(aid, schema::ARTICLE_DETAILS);
        self.text_of(details, schema::ARTICLE_TITLE)
    }

    pub fn get_article_descr(&self, aid: Option<&str>) -> String {
        let details = self.article_child(aid, schema::ARTICLE_DETAILS);
        self.text_of(details, schema::ARTICLE_DESCR)
    }

    pub fn get_article_categories(&self, aid: Option<&str>) -> Vec<String> {
        let Ok(article) = self.resolve_article(aid) else {
            return Vec::new();
        };
        children_named(&self.doc, article, schema::CATEGORY)
            .filter_map(|reference| model::child_content(&self.doc, reference, schema::CATEGORY_ID))
            .collect()
    }

    pub fn get_article_images(&self, aid: Option<&str>) -> Vec<ArticleImage> {
        let Some(images) = self.article_child(aid, schema::IMAGES) else {
            return Vec::new();
        };
        children_named(&self.doc, images, schema::IMAGE)
            .map(|image| ArticleImage {
                mime: self.text_of(Some(image), schema::IMAGE_MIME),
                path: self.text_of(Some(image), schema::IMAGE_PATH),
            })
            .collect()
    }

    pub fn get_main_unit(&self, aid: Option<&str>) -> String {
        let units = self.article_child(aid, schema::UNITS);
        self.text_of(units, schema::MAIN_UNIT)
    }

    pub fn get_article_units(&self, aid: Option<&str>) -> Vec<ArticleUnit> {
        let Some(units) = self.article_child(aid, schema::UNITS) else {
            return Vec::new();
        };
        children_named(&self.doc, units, schema::ALT_UNIT)
            .map(|unit| ArticleUnit {
                code: self.text_of(Some(unit), schema::UNIT_CODE),
                factor: self.text_of(Some(unit), schema::UNIT_FACTOR),
            })
            .collect()
    }

    pub fn get_feature_name(&self, aid: Option<&str>, fid: Option<&str>) -> String {
        self.text_of(self.feature_node(aid, fid), schema::FEATURE_NAME)
    }

    pub fn get_feature_descr(&self, aid: Option<&str>, fid: Option<&str>) -> String {
        self.text_of(self.feature_node(aid, fid), schema::FEATURE_DESCR)
    }

    pub fn get_feature_unit(&self, aid: Option<&str>, fid: Option<&str>) -> String {
        self.text_of(self.feature_node(aid, fid), schema::FEATURE_UNIT)
    }

    pub fn get_feature_order(&self, aid: Option<&str>, fid: Option<&str>) -> String {
        self.text_of(self.feature_node(aid, fid), schema::FEATURE_ORDER)
    }

    pub fn get_feature_value(&self, aid: Option<&str>, fid: Option<&str>) -> String {
        self.text_of(self.feature_node(aid, fid), schema::FEATURE_VALUE)
    }

    /// Feature ids of the article in document order.
    pub fn get_feature_ids(&self, aid: Option<&str>) -> Vec<String> {
        let Some(features) = self.article_child(aid, schema::FEATURES) else {
            return Vec::new();
        };
        children_named(&self.doc, features, schema::FEATURE)
            .map(|feature| self.text_of(Some(feature), schema::FEATURE_ID))
            .collect()
    }

    pub fn get_variant_value(
        &self,
        aid: Option<&str>,
        fid: Option<&str>,
        vid: Option<&str>,
    ) -> String {
        let variant = self
            .feature_node(aid, fid)
            .and_then(|feature| self.resolve_variant(feature, vid).ok());
        self.text_of(variant, schema::VARIANT_VALUE)
    }

    pub fn get_selected_article_id(&self) -> String {
        self.text_of(self.live_slot(self.selection.article()), schema::ARTICLE_ID)
    }

    pub fn get_selected_feature_id(&self) -> String {
        self.text_of(self.live_slot(self.selection.feature()), schema::FEATURE_ID)
    }

    pub fn get_selected_variant_id(&self) -> String {
        self.text_of(self.live_slot(self.selection.variant()), schema::VARIANT_ID)
    }

    pub fn get_selected_image_path(&self) -> String {
        self.text_of(self.live_slot(self.selection.image()), schema::IMAGE_PATH)
    }

    pub fn get_selected_unit_code(&self) -> String {
        self.text_of(self.live_slot(self.selection.unit()), schema::UNIT_CODE)
    }

    pub fn article_summaries(&self) -> Vec<ArticleSummary> {
        children_named(&self.doc, self.containers.articles, schema::ARTICLE)
            .map(|article| {
                let details = find_child(&self.doc, article, schema::ARTICLE_DETAILS, None);
                let units = find_child(&self.doc, article, schema::UNITS, None);
                let images = find_child(&self.doc, article, schema::IMAGES, None);
                ArticleSummary {
                    aid: self.text_of(Some(article), schema::ARTICLE_ID),
                    title: self.text_of(details, schema::ARTICLE_TITLE),
                    main_unit: self.text_of(units, schema::MAIN_UNIT),
                    categories: children_named(&self.doc, article, schema::CATEGORY).count(),
                    images: images.map_or(0, |images| {
                        children_named(&self.doc, images, schema::IMAGE).count()
                    }),
                    features: model::num_features(&self.doc, article),
                }
            })
            .collect()
    }

    fn article_child(&self, aid: Option<&str>, name: &str) -> Option<NodeId> {
        let article = self.resolve_article(aid).ok()?;
        find_child(&self.doc, article, name, None)
    }

    fn feature_node(&self, aid: Option<&str>, fid: Option<&str>) -> Option<NodeId> {
        self.resolve_article_feature(aid, fid)
            .ok()
            .map(|(_, feature)| feature)
    }

    fn live_slot(&self, node: Option<NodeId>) -> Option<NodeId> {
        node.filter(|id| self.doc.contains(*id))
    }

    fn text_of(&self, parent: Option<NodeId>, name: &str) -> String {
        parent
            .and_then(|parent| model::child_content(&self.doc, parent, name))
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn getters_degrade_to_empty_on_missing_paths() {
        let state = CatalogState::init();
        assert_eq!(state.get_locale(), "");
        assert_eq!(state.get_generator(), "");
        assert!(state.get_territories().is_empty());
        assert_eq!(state.get_article_title(Some("missing")), "");
        assert_eq!(state.get_article_title(None), "");
        assert!(state.get_article_images(Some("missing")).is_empty());
        assert_eq!(state.get_feature_value(None, None), "");
        assert_eq!(state.get_selected_article_id(), "");
    }

    #[test]
    fn title_is_read_from_article_details() {
        let mut state = CatalogState::init();
        state
            .add_article("A1", Some("Hex bolt"), Some("Zinc plated"))
            .unwrap();
        assert_eq!(state.get_article_title(Some("A1")), "Hex bolt");
        assert_eq!(state.get_article_descr(Some("A1")), "Zinc plated");
    }

    #[test]
    fn summaries_list_articles_in_document_order() {
        let mut state = CatalogState::init();
        state.add_article("B2", Some("Nut"), None).unwrap();
        state.add_article("A1", Some("Bolt"), None).unwrap();
        state.add_article_image(Some("A1"), None, "bolt.jpg").unwrap();
        state.add_article_unit(Some("A1"), None, None, true).unwrap();

        let summaries = state.article_summaries();
        assert_eq!(summaries.len(), 2);
        assert_eq!(summaries[0].aid, "B2");
        assert_eq!(summaries[1].title, "Bolt");
        assert_eq!(summaries[1].images, 1);
        assert_eq!(summaries[1].main_unit, "PCE");
        assert_eq!(
            state.get_article_images(Some("A1")),
            vec![ArticleImage {
                mime: "image/jpg".to_string(),
                path: "bolt.jpg".to_string(),
            }]
        );
    }
}
