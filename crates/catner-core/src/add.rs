use catner_config::is_country_code;
use catner_tree::{find_child, find_or_create_child, set_child_text};
use log::debug;

use crate::error::{CatalogError, CatalogResult};
use crate::model;
use crate::schema;
use crate::state::CatalogState;

impl CatalogState {
    /// Adds `GENERATOR_INFO`. Fails if the header already names a generator.
    pub fn add_generator(&mut self, value: &str) -> CatalogResult<()> {
        if model::locate_generator(&self.doc, self.containers.header).is_some() {
            return Err(CatalogError::AlreadyExists(schema::GENERATOR.to_string()));
        }
        self.doc
            .create_child(self.containers.header, schema::GENERATOR, Some(value));
        debug!("event=add_generator module=add value={value}");
        Ok(())
    }

    /// Adds a shipping territory. Adding a code that is already present is a
    /// successful no-op.
    pub fn add_territory(&mut self, code: &str) -> CatalogResult<()> {
        if !is_country_code(code) {
            return Err(CatalogError::InvalidValue(format!(
                "territory must be two ASCII letters (received '{code}')"
            )));
        }
        find_or_create_child(
            &mut self.doc,
            self.containers.catalog,
            schema::TERRITORY,
            Some(code),
        );
        debug!("event=add_territory module=add code={code}");
        Ok(())
    }

    pub fn add_article(
        &mut self,
        aid: &str,
        title: Option<&str>,
        descr: Option<&str>,
    ) -> CatalogResult<()> {
        if aid.is_empty() {
            return Err(CatalogError::InvalidValue(
                "article id must not be empty".to_string(),
            ));
        }
        if model::locate_article(&self.doc, self.containers.articles, aid).is_some() {
            return Err(CatalogError::AlreadyExists(format!("article {aid}")));
        }

        let doc = &mut self.doc;
        let article = doc.create_child(self.containers.articles, schema::ARTICLE, None);
        doc.create_child(article, schema::ARTICLE_ID, Some(aid));
        let details = doc.create_child(article, schema::ARTICLE_DETAILS, None);
        if let Some(title) = title {
            doc.create_child(details, schema::ARTICLE_TITLE, Some(title));
        }
        if let Some(descr) = descr {
            doc.create_child(details, schema::ARTICLE_DESCR, Some(descr));
        }
        debug!("event=add_article module=add aid={aid}");
        Ok(())
    }

    /// Appends an image to the article's `MIME_INFO`. The mime type falls back
    /// to the configured default.
    pub fn add_article_image(
        &mut self,
        aid: Option<&str>,
        mime: Option<&str>,
        path: &str,
    ) -> CatalogResult<()> {
        let article = self.resolve_article(aid)?;
        if model::locate_image(&self.doc, article, path).is_some() {
            return Err(CatalogError::AlreadyExists(format!("image {path}")));
        }

        let mime = mime.unwrap_or(&self.defaults.image_mime).to_string();
        let doc = &mut self.doc;
        let images = find_or_create_child(doc, article, schema::IMAGES, None);
        let image = doc.create_child(images, schema::IMAGE, None);
        doc.create_child(image, schema::IMAGE_MIME, Some(&mime));
        doc.create_child(image, schema::IMAGE_PATH, Some(path));
        debug!("event=add_article_image module=add path={path} mime={mime}");
        Ok(())
    }

    /// Adds or updates an alternative unit of the article.
    ///
    /// Unlike the other `add_*` operations an existing unit code is not an
    /// error: its factor is overwritten. The main unit is set when the article
    /// has none yet, or replaced when `main` is set.
    pub fn add_article_unit(
        &mut self,
        aid: Option<&str>,
        code: Option<&str>,
        factor: Option<&str>,
        main: bool,
    ) -> CatalogResult<()> {
        let article = self.resolve_article(aid)?;
        let code = code.unwrap_or(&self.defaults.unit_code).to_string();
        let factor = factor.unwrap_or(&self.defaults.unit_factor).to_string();

        let doc = &mut self.doc;
        let units = find_or_create_child(doc, article, schema::UNITS, None);
        let existing = model::locate_alt_unit(doc, units, &code);

        match find_child(doc, units, schema::MAIN_UNIT, None) {
            None => {
                doc.create_child(units, schema::MAIN_UNIT, Some(&code));
            }
            Some(main_unit) if main => doc.set_text(main_unit, &code),
            Some(_) => {}
        }

        match existing {
            Some(unit) => {
                set_child_text(doc, unit, schema::UNIT_FACTOR, &factor, true);
            }
            None => {
                let unit = doc.create_child(units, schema::ALT_UNIT, None);
                doc.create_child(unit, schema::UNIT_CODE, Some(&code));
                doc.create_child(unit, schema::UNIT_FACTOR, Some(&factor));
            }
        }
        debug!(
            "event=add_article_unit module=add code={code} factor={factor} main={main} upsert={}",
            existing.is_some()
        );
        Ok(())
    }

    pub fn add_article_category(&mut self, aid: Option<&str>, category: &str) -> CatalogResult<()> {
        let article = self.resolve_article(aid)?;
        if model::locate_category(&self.doc, article, category).is_some() {
            return Err(CatalogError::AlreadyExists(format!("category {category}")));
        }

        let reference = self.doc.create_child(article, schema::CATEGORY, None);
        self.doc
            .create_child(reference, schema::CATEGORY_ID, Some(category));
        debug!("event=add_article_category module=add category={category}");
        Ok(())
    }

    /// Adds feature `fid` to the article, numbered after the existing ones.
    ///
    /// The description defaults to the name and the unit to the configured
    /// feature unit.
    pub fn add_feature(
        &mut self,
        aid: Option<&str>,
        fid: &str,
        name: Option<&str>,
        descr: Option<&str>,
        unit: Option<&str>,
        value: Option<&str>,
    ) -> CatalogResult<()> {
        if fid.is_empty() {
            return Err(CatalogError::InvalidValue(
                "feature id must not be empty".to_string(),
            ));
        }
        let article = self.resolve_article(aid)?;
        if model::locate_feature(&self.doc, article, fid).is_some() {
            return Err(CatalogError::AlreadyExists(format!("feature {fid}")));
        }

        let order = (model::num_features(&self.doc, article) + 1).to_string();
        let unit = unit.unwrap_or(&self.defaults.feature_unit).to_string();

        let doc = &mut self.doc;
        let features = find_or_create_child(doc, article, schema::FEATURES, None);
        let feature = doc.create_child(features, schema::FEATURE, None);
        doc.create_child(feature, schema::FEATURE_ID, Some(fid));
        doc.create_child(feature, schema::FEATURE_NAME, Some(name.unwrap_or_default()));
        doc.create_child(
            feature,
            schema::FEATURE_DESCR,
            Some(descr.or(name).unwrap_or_default()),
        );
        doc.create_child(feature, schema::FEATURE_UNIT, Some(&unit));
        doc.create_child(feature, schema::FEATURE_ORDER, Some(&order));
        if let Some(value) = value {
            doc.create_child(feature, schema::FEATURE_VALUE, Some(value));
        }
        debug!("event=add_feature module=add fid={fid} order={order}");
        Ok(())
    }

    /// Adds the weight feature, named after its own id.
    pub fn add_weight_feature(&mut self, aid: Option<&str>) -> CatalogResult<()> {
        let fid = self.defaults.weight_feature.clone();
        self.add_feature(aid, &fid, Some(&fid), None, None, None)
    }

    /// Adds variant `vid` to a feature. A scalar value held by the feature is
    /// dropped, since a feature carries either a value or variants.
    pub fn add_variant(
        &mut self,
        aid: Option<&str>,
        fid: Option<&str>,
        vid: &str,
        value: &str,
    ) -> CatalogResult<()> {
        let (_, feature) = self.resolve_article_feature(aid, fid)?;
        if model::locate_variant(&self.doc, feature, vid).is_some() {
            return Err(CatalogError::AlreadyExists(format!("variant {vid}")));
        }

        let doc = &mut self.doc;
        if let Some(scalar) = find_child(doc, feature, schema::FEATURE_VALUE, None) {
            doc.remove(scalar);
        }
        let variants = find_or_create_child(doc, feature, schema::VARIANTS, None);
        let variant = doc.create_child(variants, schema::VARIANT, None);
        doc.create_child(variant, schema::VARIANT_ID, Some(vid));
        doc.create_child(variant, schema::VARIANT_VALUE, Some(value));
        debug!("event=add_variant module=add vid={vid}");
        Ok(())
    }

    pub fn add_weight_variant(
        &mut self,
        aid: Option<&str>,
        vid: &str,
        value: &str,
    ) -> CatalogResult<()> {
        let fid = self.defaults.weight_feature.clone();
        self.add_variant(aid, Some(&fid), vid, value)
    }
}
