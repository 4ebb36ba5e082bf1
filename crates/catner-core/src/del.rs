use catner_tree::find_child;
use log::debug;

use crate::error::{CatalogError, CatalogResult, Target};
use crate::model;
use crate::schema;
use crate::state::CatalogState;

impl CatalogState {
    /// Removes `GENERATOR_INFO`. Returns whether anything was removed.
    pub fn del_generator(&mut self) -> bool {
        let removed = model::locate_generator(&self.doc, self.containers.header)
            .is_some_and(|generator| self.doc.remove(generator));
        debug!("event=del_generator module=del removed={removed}");
        removed
    }

    /// Removes a territory code. Returns whether it was present.
    pub fn del_territory(&mut self, code: &str) -> bool {
        let removed = find_child(
            &self.doc,
            self.containers.catalog,
            schema::TERRITORY,
            Some(code),
        )
        .is_some_and(|territory| self.doc.remove(territory));
        debug!("event=del_territory module=del code={code} removed={removed}");
        removed
    }

    pub fn del_article(&mut self, aid: Option<&str>) -> CatalogResult<()> {
        let article = self.resolve_article(aid)?;
        self.doc.remove(article);
        self.after_delete("del_article");
        Ok(())
    }

    /// Removes the image with source `path`, or the selected image.
    pub fn del_article_image(&mut self, aid: Option<&str>, path: Option<&str>) -> CatalogResult<()> {
        let article = self.resolve_article(aid)?;
        let image = self.resolve_image(article, path)?;
        self.doc.remove(image);
        self.after_delete("del_article_image");
        Ok(())
    }

    pub fn del_article_category(&mut self, aid: Option<&str>, category: &str) -> CatalogResult<()> {
        let article = self.resolve_article(aid)?;
        let reference = model::locate_category(&self.doc, article, category)
            .ok_or(CatalogError::NotFound(Target::Node))?;
        self.doc.remove(reference);
        self.after_delete("del_article_category");
        Ok(())
    }

    /// Removes a feature and renumbers the remaining ones to 1..N.
    pub fn del_feature(&mut self, aid: Option<&str>, fid: Option<&str>) -> CatalogResult<()> {
        let (article, feature) = self.resolve_article_feature(aid, fid)?;
        self.doc.remove(feature);
        model::renumber_features(&mut self.doc, article);
        self.after_delete("del_feature");
        Ok(())
    }

    pub fn del_weight_feature(&mut self, aid: Option<&str>) -> CatalogResult<()> {
        let fid = self.defaults.weight_feature.clone();
        self.del_feature(aid, Some(&fid))
    }

    pub fn del_variant(
        &mut self,
        aid: Option<&str>,
        fid: Option<&str>,
        vid: Option<&str>,
    ) -> CatalogResult<()> {
        let (_, feature) = self.resolve_article_feature(aid, fid)?;
        let variant = self.resolve_variant(feature, vid)?;
        self.doc.remove(variant);
        self.after_delete("del_variant");
        Ok(())
    }

    pub fn del_weight_variant(&mut self, aid: Option<&str>, vid: Option<&str>) -> CatalogResult<()> {
        let fid = self.defaults.weight_feature.clone();
        self.del_variant(aid, Some(&fid), vid)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Slot;

    #[test]
    fn generator_and_territory_deletes_are_silent_when_absent() {
        let mut state = CatalogState::init();
        assert!(!state.del_generator());
        assert!(!state.del_territory("DE"));

        state.add_generator("catner").unwrap();
        state.add_territory("DE").unwrap();
        assert!(state.del_generator());
        assert!(state.del_territory("DE"));
        assert_eq!(state.num_territories(), 0);
    }

    #[test]
    fn image_is_removed_by_source_path() {
        let mut state = CatalogState::init();
        state.add_article("A1", None, None).unwrap();
        state.add_article_image(Some("A1"), None, "a.jpg").unwrap();
        state.add_article_image(Some("A1"), Some("image/png"), "b.png").unwrap();

        state.del_article_image(Some("A1"), Some("a.jpg")).unwrap();

        let images = state.get_article_images(Some("A1"));
        assert_eq!(images.len(), 1);
        assert_eq!(images[0].path, "b.png");
        assert!(matches!(
            state.del_article_image(Some("A1"), Some("a.jpg")),
            Err(CatalogError::NotFound(Target::Node))
        ));
    }

    #[test]
    fn deleting_selected_image_clears_only_that_slot() {
        let mut state = CatalogState::init();
        state.add_article("A1", None, None).unwrap();
        state.add_article_image(Some("A1"), None, "a.jpg").unwrap();
        state.add_feature(Some("A1"), "F1", None, None, None, None).unwrap();
        state.select_article("A1").unwrap();
        state.select_first_feature().unwrap();
        state.select_first_image().unwrap();

        state.del_article_image(None, None).unwrap();

        assert_eq!(state.selection().image(), None);
        assert_eq!(state.get_selected_feature_id(), "F1");
        assert!(matches!(
            state.del_article_image(None, None),
            Err(CatalogError::NoSelection(Slot::Image))
        ));
    }

    #[test]
    fn missing_category_is_not_found() {
        let mut state = CatalogState::init();
        state.add_article("A1", None, None).unwrap();
        state.add_article_category(Some("A1"), "C1").unwrap();
        assert!(matches!(
            state.del_article_category(Some("A1"), "C2"),
            Err(CatalogError::NotFound(Target::Node))
        ));
        state.del_article_category(Some("A1"), "C1").unwrap();
        assert_eq!(state.num_article_categories(Some("A1")), 0);
    }
}
