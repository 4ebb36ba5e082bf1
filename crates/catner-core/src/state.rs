use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use catner_config::{Config, DefaultSettings, OutputSettings};
use catner_tree::{Document, NodeId};
use log::{debug, info};

use crate::cursor::Selection;
use crate::error::{CatalogError, CatalogResult, Slot, Target};
use crate::fs::write_atomic;
use crate::model::{self, Containers};

/// Path that routes output to standard output instead of a file.
pub const STDOUT_PATH: &str = "-";

/// An open catalog document together with its selection cursor.
///
/// The state exclusively owns its tree; every `NodeId` it hands out is only
/// meaningful until the next delete.
#[derive(Debug, Clone)]
pub struct CatalogState {
    pub(crate) doc: Document,
    pub(crate) containers: Containers,
    pub(crate) selection: Selection,
    pub(crate) defaults: DefaultSettings,
    pub(crate) output: OutputSettings,
    path: Option<PathBuf>,
}

impl Default for CatalogState {
    fn default() -> Self {
        Self::init()
    }
}

impl CatalogState {
    /// Creates an empty catalog with the required containers in place.
    pub fn init() -> Self {
        let mut doc = Document::new();
        let containers = Containers::create(&mut doc);
        CatalogState {
            doc,
            containers,
            selection: Selection::default(),
            defaults: DefaultSettings::default(),
            output: OutputSettings::default(),
            path: None,
        }
    }

    /// Creates an empty catalog and applies the header presets of `config`.
    pub fn init_with(config: &Config) -> CatalogResult<Self> {
        let mut state = Self::init().with_settings(config.defaults.clone(), config.output.clone());
        if let Some(generator) = &config.document.generator {
            state.set_generator(generator)?;
        }
        if let Some(locale) = &config.document.locale {
            state.set_locale(locale)?;
        }
        for territory in &config.document.territories {
            state.add_territory(territory)?;
        }
        Ok(state)
    }

    /// Reads and parses the catalog stored at `path`. See [`CatalogState::parse`]
    /// for the meaning of `amend`.
    pub fn load(path: impl AsRef<Path>, amend: bool) -> CatalogResult<Self> {
        let path = path.as_ref();
        info!("event=load module=state path={} amend={amend}", path.display());
        let contents = fs::read_to_string(path)?;
        let mut state = Self::parse(&contents, amend)?;
        state.path = Some(path.to_path_buf());
        Ok(state)
    }

    /// Parses a catalog from XML text. With `amend` set, missing required
    /// containers are created; otherwise their absence fails the load.
    pub fn parse(xml: &str, amend: bool) -> CatalogResult<Self> {
        let mut doc = Document::parse(xml)?;
        let containers = Containers::resolve(&mut doc, amend)?;
        Ok(CatalogState {
            doc,
            containers,
            selection: Selection::default(),
            defaults: DefaultSettings::default(),
            output: OutputSettings::default(),
            path: None,
        })
    }

    pub fn with_settings(mut self, defaults: DefaultSettings, output: OutputSettings) -> Self {
        self.defaults = defaults;
        self.output = output;
        self
    }

    pub fn document(&self) -> &Document {
        &self.doc
    }

    pub fn containers(&self) -> Containers {
        self.containers
    }

    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    /// File the catalog was loaded from, if any.
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    pub fn defaults(&self) -> &DefaultSettings {
        &self.defaults
    }

    pub fn to_xml_string(&self) -> CatalogResult<String> {
        Ok(self.doc.to_xml_string(self.output.indent)?)
    }

    /// Writes the catalog to `path`, or to standard output for `"-"`. Files are
    /// replaced atomically, keeping a `.bak` copy when backups are enabled.
    pub fn write_xml(&self, path: impl AsRef<Path>) -> CatalogResult<()> {
        let path = path.as_ref();
        if path == Path::new(STDOUT_PATH) {
            return self.print_xml();
        }
        let rendered = self.to_xml_string()?;
        write_atomic(path, &rendered, self.output.backup)?;
        info!(
            "event=write module=state path={} bytes={}",
            path.display(),
            rendered.len()
        );
        Ok(())
    }

    pub fn print_xml(&self) -> CatalogResult<()> {
        let stdout = io::stdout();
        let mut handle = stdout.lock();
        self.doc.write_to(&mut handle, self.output.indent)?;
        handle.flush()?;
        Ok(())
    }

    /// Writes the catalog back to the file it was loaded from.
    pub fn save(&self) -> CatalogResult<()> {
        match &self.path {
            Some(path) => self.write_xml(path),
            None => Err(CatalogError::Other(
                "catalog was not loaded from a file".to_string(),
            )),
        }
    }

    /// Article named by `aid`, or the selected article when `aid` is omitted.
    pub(crate) fn resolve_article(&self, aid: Option<&str>) -> CatalogResult<NodeId> {
        match aid {
            Some(aid) => model::locate_article(&self.doc, self.containers.articles, aid)
                .ok_or(CatalogError::NotFound(Target::Article)),
            None => self
                .live(self.selection.article())
                .ok_or(CatalogError::NoSelection(Slot::Article)),
        }
    }

    /// Feature `fid` of `article`, or the selected feature when it belongs to
    /// `article`.
    pub(crate) fn resolve_feature(&self, article: NodeId, fid: Option<&str>) -> CatalogResult<NodeId> {
        match fid {
            Some(fid) => model::locate_feature(&self.doc, article, fid)
                .ok_or(CatalogError::NotFound(Target::Feature)),
            None => self
                .live(self.selection.feature())
                .filter(|feature| model::ancestor(&self.doc, *feature, 2) == Some(article))
                .ok_or(CatalogError::NoSelection(Slot::Feature)),
        }
    }

    pub(crate) fn resolve_variant(&self, feature: NodeId, vid: Option<&str>) -> CatalogResult<NodeId> {
        match vid {
            Some(vid) => model::locate_variant(&self.doc, feature, vid)
                .ok_or(CatalogError::NotFound(Target::Variant)),
            None => self
                .live(self.selection.variant())
                .filter(|variant| model::ancestor(&self.doc, *variant, 2) == Some(feature))
                .ok_or(CatalogError::NoSelection(Slot::Variant)),
        }
    }

    pub(crate) fn resolve_image(&self, article: NodeId, path: Option<&str>) -> CatalogResult<NodeId> {
        match path {
            Some(path) => model::locate_image(&self.doc, article, path)
                .ok_or(CatalogError::NotFound(Target::Node)),
            None => self
                .live(self.selection.image())
                .filter(|image| model::ancestor(&self.doc, *image, 2) == Some(article))
                .ok_or(CatalogError::NoSelection(Slot::Image)),
        }
    }

    pub(crate) fn resolve_article_feature(
        &self,
        aid: Option<&str>,
        fid: Option<&str>,
    ) -> CatalogResult<(NodeId, NodeId)> {
        let article = self.resolve_article(aid)?;
        let feature = self.resolve_feature(article, fid)?;
        Ok((article, feature))
    }

    /// Clears cursor slots invalidated by a removal.
    pub(crate) fn after_delete(&mut self, event: &str) {
        self.selection.prune(&self.doc);
        debug!("event={event} module=state status=ok");
    }

    fn live(&self, node: Option<NodeId>) -> Option<NodeId> {
        node.filter(|id| self.doc.contains(*id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn init_produces_minimal_catalog() {
        let xml = CatalogState::init().to_xml_string().unwrap();
        assert!(xml.starts_with("<?xml version=\"1.0\" encoding=\"utf-8\"?>\n"));
        assert!(xml.contains(
            "<BMECAT version=\"2005\" xmlns=\"http://www.bmecat.org/bmecat/2005.1\">"
        ));
        assert!(xml.contains("<CATALOG/>"));
        assert!(xml.contains("<T_NEW_CATALOG/>"));
    }

    #[test]
    fn save_without_source_path_fails() {
        assert!(matches!(
            CatalogState::init().save(),
            Err(CatalogError::Other(_))
        ));
    }

    #[test]
    fn load_remembers_path_and_save_writes_back() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("catalog.xml");
        CatalogState::init().write_xml(&path).unwrap();

        let mut state = CatalogState::load(&path, false).unwrap();
        assert_eq!(state.path(), Some(path.as_path()));
        state.add_article("A1", Some("Bolt"), None).unwrap();
        state.save().unwrap();

        let reloaded = CatalogState::load(&path, false).unwrap();
        assert_eq!(reloaded.num_articles(), 1);
        assert!(path.with_extension("bak").exists());
    }

    #[test]
    fn parse_without_amend_rejects_missing_catalog() {
        let err = CatalogState::parse(
            "<BMECAT><HEADER/><T_NEW_CATALOG/></BMECAT>",
            false,
        )
        .unwrap_err();
        assert!(matches!(err, CatalogError::MissingContainer("CATALOG")));
    }
}
