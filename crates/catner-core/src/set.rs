use catner_config::is_country_code;
use catner_tree::{find_or_create_child, set_child_text, NodeId};
use log::debug;

use crate::error::{CatalogError, CatalogResult, Target};
use crate::model;
use crate::schema;
use crate::state::CatalogState;

impl CatalogState {
    pub fn set_locale(&mut self, value: &str) -> CatalogResult<()> {
        if !is_country_code(value) {
            return Err(CatalogError::InvalidValue(format!(
                "locale must be two ASCII letters (received '{value}')"
            )));
        }
        set_child_text(
            &mut self.doc,
            self.containers.catalog,
            schema::LOCALE,
            value,
            true,
        );
        debug!("event=set_locale module=set value={value}");
        Ok(())
    }

    /// Sets `GENERATOR_INFO`, creating it when absent.
    pub fn set_generator(&mut self, value: &str) -> CatalogResult<()> {
        set_child_text(
            &mut self.doc,
            self.containers.header,
            schema::GENERATOR,
            value,
            true,
        );
        debug!("event=set_generator module=set value={value}");
        Ok(())
    }

    /// Renames an article. The new id must be non-empty and unused.
    pub fn set_article_id(&mut self, aid: Option<&str>, value: &str) -> CatalogResult<()> {
        if value.is_empty() {
            return Err(CatalogError::InvalidValue(
                "article id must not be empty".to_string(),
            ));
        }
        let article = self.resolve_article(aid)?;
        match model::locate_article(&self.doc, self.containers.articles, value) {
            Some(other) if other != article => {
                return Err(CatalogError::AlreadyExists(format!("article {value}")));
            }
            _ => {}
        }
        self.overwrite(article, schema::ARTICLE_ID, value)?;
        debug!("event=set_article_id module=set value={value}");
        Ok(())
    }

    pub fn set_article_title(&mut self, aid: Option<&str>, value: &str) -> CatalogResult<()> {
        let article = self.resolve_article(aid)?;
        let details = find_or_create_child(&mut self.doc, article, schema::ARTICLE_DETAILS, None);
        set_child_text(&mut self.doc, details, schema::ARTICLE_TITLE, value, true);
        Ok(())
    }

    pub fn set_article_descr(&mut self, aid: Option<&str>, value: &str) -> CatalogResult<()> {
        let article = self.resolve_article(aid)?;
        let details = find_or_create_child(&mut self.doc, article, schema::ARTICLE_DETAILS, None);
        set_child_text(&mut self.doc, details, schema::ARTICLE_DESCR, value, true);
        Ok(())
    }

    /// Renames a feature within its article. Fails when another feature of the
    /// article already uses `value`.
    pub fn set_feature_id(
        &mut self,
        aid: Option<&str>,
        fid: Option<&str>,
        value: &str,
    ) -> CatalogResult<()> {
        if value.is_empty() {
            return Err(CatalogError::InvalidValue(
                "feature id must not be empty".to_string(),
            ));
        }
        let (article, feature) = self.resolve_article_feature(aid, fid)?;
        match model::locate_feature(&self.doc, article, value) {
            Some(other) if other != feature => {
                return Err(CatalogError::AlreadyExists(format!("feature {value}")));
            }
            _ => {}
        }
        self.overwrite(feature, schema::FEATURE_ID, value)
    }

    pub fn set_feature_name(
        &mut self,
        aid: Option<&str>,
        fid: Option<&str>,
        value: &str,
    ) -> CatalogResult<()> {
        let (_, feature) = self.resolve_article_feature(aid, fid)?;
        set_child_text(&mut self.doc, feature, schema::FEATURE_NAME, value, true);
        Ok(())
    }

    pub fn set_feature_descr(
        &mut self,
        aid: Option<&str>,
        fid: Option<&str>,
        value: &str,
    ) -> CatalogResult<()> {
        let (_, feature) = self.resolve_article_feature(aid, fid)?;
        set_child_text(&mut self.doc, feature, schema::FEATURE_DESCR, value, true);
        Ok(())
    }

    /// Sets the scalar value of a feature. Features that hold variants are
    /// rejected; their values live on the variants.
    pub fn set_feature_value(
        &mut self,
        aid: Option<&str>,
        fid: Option<&str>,
        value: &str,
    ) -> CatalogResult<()> {
        let (_, feature) = self.resolve_article_feature(aid, fid)?;
        if model::num_variants(&self.doc, feature) > 0 {
            return Err(CatalogError::InvalidValue(
                "feature holds variants and cannot take a scalar value".to_string(),
            ));
        }
        set_child_text(&mut self.doc, feature, schema::FEATURE_VALUE, value, true);
        Ok(())
    }

    /// Sets the unit of a feature; an empty value restores the default unit.
    pub fn set_feature_unit(
        &mut self,
        aid: Option<&str>,
        fid: Option<&str>,
        value: &str,
    ) -> CatalogResult<()> {
        let (_, feature) = self.resolve_article_feature(aid, fid)?;
        let unit = if value.is_empty() {
            self.defaults.feature_unit.clone()
        } else {
            value.to_string()
        };
        set_child_text(&mut self.doc, feature, schema::FEATURE_UNIT, &unit, true);
        Ok(())
    }

    pub fn set_variant_value(
        &mut self,
        aid: Option<&str>,
        fid: Option<&str>,
        vid: Option<&str>,
        value: &str,
    ) -> CatalogResult<()> {
        let (_, feature) = self.resolve_article_feature(aid, fid)?;
        let variant = self.resolve_variant(feature, vid)?;
        self.overwrite(variant, schema::VARIANT_VALUE, value)
    }

    pub fn set_weight_variant(
        &mut self,
        aid: Option<&str>,
        vid: Option<&str>,
        value: &str,
    ) -> CatalogResult<()> {
        let fid = self.defaults.weight_feature.clone();
        self.set_variant_value(aid, Some(&fid), vid, value)
    }

    /// Overwrites an existing child; a missing child is reported, not created.
    fn overwrite(&mut self, parent: NodeId, name: &str, value: &str) -> CatalogResult<()> {
        if set_child_text(&mut self.doc, parent, name, value, false) {
            Ok(())
        } else {
            Err(CatalogError::NotFound(Target::Node))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn with_feature() -> CatalogState {
        let mut state = CatalogState::init();
        state.add_article("A1", None, None).unwrap();
        state
            .add_feature(Some("A1"), "F1", Some("Size"), None, None, Some("M"))
            .unwrap();
        state
            .add_feature(Some("A1"), "F2", Some("Colour"), None, None, None)
            .unwrap();
        state
    }

    #[test]
    fn locale_is_validated_and_replaced() {
        let mut state = CatalogState::init();
        assert!(matches!(
            state.set_locale("ENG"),
            Err(CatalogError::InvalidValue(_))
        ));
        state.set_locale("EN").unwrap();
        state.set_locale("DE").unwrap();
        assert_eq!(state.get_locale(), "DE");
    }

    #[test]
    fn article_rename_rejects_duplicates_and_empty_ids() {
        let mut state = with_feature();
        state.add_article("A2", None, None).unwrap();

        assert!(matches!(
            state.set_article_id(Some("A1"), "A2"),
            Err(CatalogError::AlreadyExists(_))
        ));
        assert!(matches!(
            state.set_article_id(Some("A1"), ""),
            Err(CatalogError::InvalidValue(_))
        ));
        state.set_article_id(Some("A1"), "A1").unwrap();
        state.set_article_id(Some("A1"), "A3").unwrap();
        assert_eq!(state.num_features(Some("A3")), 2);
    }

    #[test]
    fn feature_rename_rejects_sibling_and_empty_ids() {
        let mut state = with_feature();
        assert!(matches!(
            state.set_feature_id(Some("A1"), Some("F1"), "F2"),
            Err(CatalogError::AlreadyExists(_))
        ));
        assert!(matches!(
            state.set_feature_id(Some("A1"), Some("F1"), ""),
            Err(CatalogError::InvalidValue(_))
        ));
        assert_eq!(state.get_feature_ids(Some("A1")), vec!["F1", "F2"]);
        state.set_feature_id(Some("A1"), Some("F1"), "F9").unwrap();
        assert_eq!(state.get_feature_name(Some("A1"), Some("F9")), "Size");
    }

    #[test]
    fn empty_unit_restores_default() {
        let mut state = with_feature();
        state.set_feature_unit(Some("A1"), Some("F1"), "cm").unwrap();
        assert_eq!(state.get_feature_unit(Some("A1"), Some("F1")), "cm");
        state.set_feature_unit(Some("A1"), Some("F1"), "").unwrap();
        assert_eq!(state.get_feature_unit(Some("A1"), Some("F1")), "00");
    }

    #[test]
    fn scalar_value_refused_once_variants_exist() {
        let mut state = with_feature();
        state.set_feature_value(Some("A1"), Some("F2"), "blue").unwrap();
        assert_eq!(state.get_feature_value(Some("A1"), Some("F2")), "blue");

        state.add_variant(Some("A1"), Some("F2"), "V1", "red").unwrap();
        let before = state.to_xml_string().unwrap();
        assert!(matches!(
            state.set_feature_value(Some("A1"), Some("F2"), "green"),
            Err(CatalogError::InvalidValue(_))
        ));
        assert_eq!(state.to_xml_string().unwrap(), before);
    }

    #[test]
    fn variant_value_follows_cursor_when_ids_omitted() {
        let mut state = with_feature();
        state.add_variant(Some("A1"), Some("F1"), "V1", "S").unwrap();
        state.select_article("A1").unwrap();
        state.select_feature("F1").unwrap();
        state.select_first_variant().unwrap();

        state.set_variant_value(None, None, None, "XL").unwrap();
        assert_eq!(
            state.get_variant_value(Some("A1"), Some("F1"), Some("V1")),
            "XL"
        );
    }
}
