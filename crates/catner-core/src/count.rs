use catner_tree::{count_children, find_child};

use crate::model;
use crate::schema;
use crate::state::CatalogState;

impl CatalogState {
    pub fn num_territories(&self) -> usize {
        count_children(&self.doc, self.containers.catalog, schema::TERRITORY, None)
    }

    pub fn num_articles(&self) -> usize {
        count_children(&self.doc, self.containers.articles, schema::ARTICLE, None)
    }

    pub fn num_article_categories(&self, aid: Option<&str>) -> usize {
        self.resolve_article(aid).map_or(0, |article| {
            count_children(&self.doc, article, schema::CATEGORY, None)
        })
    }

    pub fn num_article_images(&self, aid: Option<&str>) -> usize {
        self.count_in_article(aid, schema::IMAGES, schema::IMAGE)
    }

    /// Number of alternative units; the main unit is not counted separately.
    pub fn num_article_units(&self, aid: Option<&str>) -> usize {
        self.count_in_article(aid, schema::UNITS, schema::ALT_UNIT)
    }

    pub fn num_features(&self, aid: Option<&str>) -> usize {
        self.resolve_article(aid)
            .map_or(0, |article| model::num_features(&self.doc, article))
    }

    pub fn num_variants(&self, aid: Option<&str>, fid: Option<&str>) -> usize {
        self.resolve_article_feature(aid, fid)
            .map_or(0, |(_, feature)| model::num_variants(&self.doc, feature))
    }

    fn count_in_article(&self, aid: Option<&str>, container: &str, name: &str) -> usize {
        self.resolve_article(aid)
            .ok()
            .and_then(|article| find_child(&self.doc, article, container, None))
            .map_or(0, |parent| count_children(&self.doc, parent, name, None))
    }
}
