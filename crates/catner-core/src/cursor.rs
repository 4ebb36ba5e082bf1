//! The single-selection cursor and its navigation operations.
//!
//! Five slots are tracked. The article slot owns the other four: whenever the
//! selected article changes (including to nothing) the feature, variant,
//! image and unit slots are cleared. A feature change clears the variant.

use catner_tree::{find_child, next_sibling_same_name, nth_child, Document, NodeId};
use log::debug;

use crate::error::{CatalogError, CatalogResult, Slot, Target};
use crate::model;
use crate::schema;
use crate::state::CatalogState;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Selection {
    article: Option<NodeId>,
    feature: Option<NodeId>,
    variant: Option<NodeId>,
    image: Option<NodeId>,
    unit: Option<NodeId>,
}

impl Selection {
    pub fn article(&self) -> Option<NodeId> {
        self.article
    }

    pub fn feature(&self) -> Option<NodeId> {
        self.feature
    }

    pub fn variant(&self) -> Option<NodeId> {
        self.variant
    }

    pub fn image(&self) -> Option<NodeId> {
        self.image
    }

    pub fn unit(&self) -> Option<NodeId> {
        self.unit
    }

    pub fn is_empty(&self) -> bool {
        *self == Selection::default()
    }

    pub fn clear(&mut self) {
        *self = Selection::default();
    }

    fn set_article(&mut self, article: Option<NodeId>) {
        if self.article != article {
            *self = Selection {
                article,
                ..Selection::default()
            };
        }
    }

    fn set_feature(&mut self, feature: Option<NodeId>) {
        if self.feature != feature {
            self.feature = feature;
            self.variant = None;
        }
    }

    /// Drops every slot whose node is gone from `doc`, cascading exactly as
    /// if the selection had moved away from it.
    pub fn prune(&mut self, doc: &Document) {
        let dead = |slot: Option<NodeId>| slot.is_some_and(|node| !doc.contains(node));

        if dead(self.article) {
            self.clear();
            return;
        }
        if dead(self.feature) {
            self.set_feature(None);
        }
        if dead(self.variant) {
            self.variant = None;
        }
        if dead(self.image) {
            self.image = None;
        }
        if dead(self.unit) {
            self.unit = None;
        }
    }
}

impl CatalogState {
    /// Selects the article `aid`. An unknown id leaves the selection untouched.
    pub fn select_article(&mut self, aid: &str) -> CatalogResult<()> {
        let article = model::locate_article(&self.doc, self.containers.articles, aid)
            .ok_or(CatalogError::NotFound(Target::Article))?;
        self.selection.set_article(Some(article));
        debug!("event=select module=cursor slot=article aid={aid}");
        Ok(())
    }

    pub fn select_first_article(&mut self) -> CatalogResult<()> {
        let first = nth_child(&self.doc, self.containers.articles, schema::ARTICLE, 0);
        self.selection.set_article(first);
        first
            .map(|_| ())
            .ok_or(CatalogError::NotFound(Target::Article))
    }

    /// Advances to the next article; past the last one the slot is emptied.
    pub fn select_next_article(&mut self) -> CatalogResult<()> {
        let current = self.selected(Slot::Article)?;
        let next = next_sibling_same_name(&self.doc, current);
        self.selection.set_article(next);
        next.map(|_| ())
            .ok_or(CatalogError::NotFound(Target::Article))
    }

    pub fn select_feature(&mut self, fid: &str) -> CatalogResult<()> {
        let article = self.selected(Slot::Article)?;
        let feature = model::locate_feature(&self.doc, article, fid)
            .ok_or(CatalogError::NotFound(Target::Feature))?;
        self.selection.set_feature(Some(feature));
        debug!("event=select module=cursor slot=feature fid={fid}");
        Ok(())
    }

    pub fn select_first_feature(&mut self) -> CatalogResult<()> {
        let article = self.selected(Slot::Article)?;
        let first = find_child(&self.doc, article, schema::FEATURES, None)
            .and_then(|features| nth_child(&self.doc, features, schema::FEATURE, 0));
        self.selection.set_feature(first);
        first
            .map(|_| ())
            .ok_or(CatalogError::NotFound(Target::Feature))
    }

    pub fn select_next_feature(&mut self) -> CatalogResult<()> {
        self.selected(Slot::Article)?;
        let current = self.selected(Slot::Feature)?;
        let next = next_sibling_same_name(&self.doc, current);
        self.selection.set_feature(next);
        next.map(|_| ())
            .ok_or(CatalogError::NotFound(Target::Feature))
    }

    pub fn select_first_variant(&mut self) -> CatalogResult<()> {
        let feature = self.selected(Slot::Feature)?;
        let first = find_child(&self.doc, feature, schema::VARIANTS, None)
            .and_then(|variants| nth_child(&self.doc, variants, schema::VARIANT, 0));
        self.selection.variant = first;
        first
            .map(|_| ())
            .ok_or(CatalogError::NotFound(Target::Variant))
    }

    pub fn select_next_variant(&mut self) -> CatalogResult<()> {
        self.selected(Slot::Feature)?;
        let current = self.selected(Slot::Variant)?;
        let next = next_sibling_same_name(&self.doc, current);
        self.selection.variant = next;
        next.map(|_| ())
            .ok_or(CatalogError::NotFound(Target::Variant))
    }

    pub fn select_first_image(&mut self) -> CatalogResult<()> {
        let article = self.selected(Slot::Article)?;
        let first = find_child(&self.doc, article, schema::IMAGES, None)
            .and_then(|images| nth_child(&self.doc, images, schema::IMAGE, 0));
        self.selection.image = first;
        first.map(|_| ()).ok_or(CatalogError::NotFound(Target::Node))
    }

    pub fn select_next_image(&mut self) -> CatalogResult<()> {
        self.selected(Slot::Article)?;
        let current = self.selected(Slot::Image)?;
        let next = next_sibling_same_name(&self.doc, current);
        self.selection.image = next;
        next.map(|_| ()).ok_or(CatalogError::NotFound(Target::Node))
    }

    pub fn select_first_unit(&mut self) -> CatalogResult<()> {
        let article = self.selected(Slot::Article)?;
        let first = find_child(&self.doc, article, schema::UNITS, None)
            .and_then(|units| nth_child(&self.doc, units, schema::ALT_UNIT, 0));
        self.selection.unit = first;
        first.map(|_| ()).ok_or(CatalogError::NotFound(Target::Node))
    }

    pub fn select_next_unit(&mut self) -> CatalogResult<()> {
        self.selected(Slot::Article)?;
        let current = self.selected(Slot::Unit)?;
        let next = next_sibling_same_name(&self.doc, current);
        self.selection.unit = next;
        next.map(|_| ()).ok_or(CatalogError::NotFound(Target::Node))
    }

    pub fn clear_selection(&mut self) {
        self.selection.clear();
    }

    fn selected(&self, slot: Slot) -> CatalogResult<NodeId> {
        let node = match slot {
            Slot::Article => self.selection.article,
            Slot::Feature => self.selection.feature,
            Slot::Variant => self.selection.variant,
            Slot::Image => self.selection.image,
            Slot::Unit => self.selection.unit,
        };
        node.filter(|id| self.doc.contains(*id))
            .ok_or(CatalogError::NoSelection(slot))
    }
}
