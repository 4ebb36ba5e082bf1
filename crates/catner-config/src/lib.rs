//! Configuration primitives and loader for the catner toolkit.
//!
//! Settings are resolved from a stack of layers, lowest precedence first:
//! built-in defaults → git root → working directory → override flag.
//! Each layer is a `.catner.toml` file; values it sets replace the values of
//! lower layers field by field. The merged result is validated once and
//! normalised into typed settings so downstream crates never touch raw TOML.

use std::env;
use std::fmt;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;

const CONFIG_FILE_NAME: &str = ".catner.toml";
const MAX_INDENT: usize = 8;

/// Complete configuration resolved from defaults and on-disk overrides.
#[derive(Clone, Debug)]
pub struct Config {
    pub defaults: DefaultSettings,
    pub document: DocumentSettings,
    pub output: OutputSettings,
    pub sources: ConfigSources,
}

/// Fallback values used when a catalog operation omits an optional field.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DefaultSettings {
    pub unit_code: String,
    pub unit_factor: String,
    pub feature_unit: String,
    pub image_mime: String,
    pub weight_feature: String,
}

impl Default for DefaultSettings {
    fn default() -> Self {
        DefaultSettings {
            unit_code: "PCE".to_owned(),
            unit_factor: "1".to_owned(),
            feature_unit: "00".to_owned(),
            image_mime: "image/jpg".to_owned(),
            weight_feature: "kloeckner_weight".to_owned(),
        }
    }
}

/// Header values applied to freshly initialised documents and the load mode.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DocumentSettings {
    pub amend: bool,
    pub generator: Option<String>,
    pub locale: Option<String>,
    pub territories: Vec<String>,
}

impl Default for DocumentSettings {
    fn default() -> Self {
        DocumentSettings {
            amend: true,
            generator: Some("catner".to_owned()),
            locale: None,
            territories: Vec::new(),
        }
    }
}

/// Serialization settings.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct OutputSettings {
    pub indent: usize,
    pub backup: bool,
}

impl Default for OutputSettings {
    fn default() -> Self {
        OutputSettings {
            indent: 2,
            backup: true,
        }
    }
}

/// Where the resolved settings came from.
#[derive(Clone, Debug)]
pub struct ConfigSources {
    pub working_directory: PathBuf,
    pub layers: Vec<ConfigSource>,
}

/// One layer that contributed to the resolved settings.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ConfigSource {
    pub kind: ConfigSourceKind,
    pub path: Option<PathBuf>,
}

impl ConfigSource {
    fn default_layer() -> Self {
        ConfigSource {
            kind: ConfigSourceKind::Default,
            path: None,
        }
    }

    fn for_file(kind: ConfigSourceKind, path: PathBuf) -> Self {
        ConfigSource {
            kind,
            path: Some(path),
        }
    }

    fn describe(&self) -> String {
        match &self.path {
            Some(path) => format!("{} {}", self.kind, path.display()),
            None => self.kind.to_string(),
        }
    }
}

/// Layer kinds, lowest precedence first.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ConfigSourceKind {
    Default,
    GitRoot,
    Local,
    Override,
}

impl fmt::Display for ConfigSourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            ConfigSourceKind::Default => "built-in settings",
            ConfigSourceKind::GitRoot => "repository .catner.toml",
            ConfigSourceKind::Local => "working-directory .catner.toml",
            ConfigSourceKind::Override => "--config file",
        };
        f.write_str(label)
    }
}

/// Inputs to [`Config::load`]; both default to the process environment.
#[derive(Clone, Debug, Default)]
pub struct LoadOptions {
    pub override_path: Option<PathBuf>,
    pub working_dir: Option<PathBuf>,
}

impl LoadOptions {
    pub fn with_override_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.override_path = Some(path.into());
        self
    }

    pub fn with_working_dir(mut self, path: impl Into<PathBuf>) -> Self {
        self.working_dir = Some(path.into());
        self
    }
}

/// Failure to produce a usable [`Config`].
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot use working directory {attempted}: {source}")]
    WorkingDirectory {
        attempted: PathBuf,
        source: io::Error,
    },
    #[error("config file {path} does not exist")]
    OverrideNotFound { path: PathBuf },
    #[error("cannot read {path}: {source}")]
    Io { path: PathBuf, source: io::Error },
    #[error("invalid TOML in {path}: {source}")]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },
    #[error("invalid catalog settings:\n{0}")]
    Validation(ConfigValidationErrors),
}

impl Config {
    /// Merges every discovered `.catner.toml` over the built-in settings and
    /// validates the result. Later layers win field by field.
    pub fn load(options: LoadOptions) -> Result<Self, ConfigError> {
        let working_dir = resolve_working_dir(options.working_dir)?;
        let override_path = options.override_path.map(|path| {
            if path.is_absolute() {
                path
            } else {
                working_dir.join(path)
            }
        });
        if let Some(path) = override_path.as_ref().filter(|path| !path.exists()) {
            return Err(ConfigError::OverrideNotFound { path: path.clone() });
        }

        let mut layers = vec![ConfigSource::default_layer()];
        let mut merged = defaults_layer(ConfigSource::default_layer());
        for source in file_layers(&working_dir, override_path) {
            if let Some(path) = &source.path {
                merged.merge(load_layer(path, source.clone())?);
            }
            layers.push(source);
        }

        let resolved = merged.finalize().map_err(ConfigError::Validation)?;
        Ok(Config {
            defaults: resolved.defaults,
            document: resolved.document,
            output: resolved.output,
            sources: ConfigSources {
                working_directory: working_dir,
                layers,
            },
        })
    }

    /// Built-in settings without consulting the filesystem.
    pub fn builtin() -> Self {
        Config {
            defaults: DefaultSettings::default(),
            document: DocumentSettings::default(),
            output: OutputSettings::default(),
            sources: ConfigSources {
                working_directory: PathBuf::from("."),
                layers: vec![ConfigSource::default_layer()],
            },
        }
    }
}

/// Existing config files in precedence order. A file reachable through more
/// than one route is only read at its highest-precedence position.
fn file_layers(working_dir: &Path, override_path: Option<PathBuf>) -> Vec<ConfigSource> {
    let local = working_dir.join(CONFIG_FILE_NAME);
    let git = working_dir
        .ancestors()
        .find(|dir| dir.join(".git").exists())
        .map(|root| root.join(CONFIG_FILE_NAME));

    let mut layers = Vec::new();
    if let Some(git) = git.filter(|git| git.exists() && *git != local) {
        if override_path.as_ref() != Some(&git) {
            layers.push(ConfigSource::for_file(ConfigSourceKind::GitRoot, git));
        }
    }
    if local.exists() && override_path.as_ref() != Some(&local) {
        layers.push(ConfigSource::for_file(ConfigSourceKind::Local, local));
    }
    if let Some(path) = override_path {
        layers.push(ConfigSource::for_file(ConfigSourceKind::Override, path));
    }
    layers
}

fn resolve_working_dir(requested: Option<PathBuf>) -> Result<PathBuf, ConfigError> {
    let Some(path) = requested else {
        return env::current_dir().map_err(|source| ConfigError::WorkingDirectory {
            attempted: PathBuf::from("."),
            source,
        });
    };
    fs::canonicalize(&path).map_err(|source| ConfigError::WorkingDirectory {
        attempted: path,
        source,
    })
}

fn load_layer(path: &Path, source: ConfigSource) -> Result<PartialConfig, ConfigError> {
    let contents = fs::read_to_string(path).map_err(|err| ConfigError::Io {
        path: path.into(),
        source: err,
    })?;
    let raw: RawConfig = toml::from_str(&contents).map_err(|err| ConfigError::Parse {
        path: path.into(),
        source: err,
    })?;
    Ok(raw.into_partial(source))
}

fn defaults_layer(source: ConfigSource) -> PartialConfig {
    let defaults = DefaultSettings::default();
    let document = DocumentSettings::default();
    let output = OutputSettings::default();
    let at = |value| Some(Located::new(value, source.clone()));

    PartialConfig {
        defaults: DefaultsPartial {
            unit_code: at(defaults.unit_code),
            unit_factor: at(defaults.unit_factor),
            feature_unit: at(defaults.feature_unit),
            image_mime: at(defaults.image_mime),
            weight_feature: at(defaults.weight_feature),
        },
        document: DocumentPartial {
            amend: Some(Located::new(document.amend, source.clone())),
            generator: document
                .generator
                .map(|value| Located::new(value, source.clone())),
            locale: None,
            territories: Some(Located::new(document.territories, source.clone())),
        },
        output: OutputPartial {
            indent: Some(Located::new(output.indent, source.clone())),
            backup: Some(Located::new(output.backup, source.clone())),
        },
    }
}

#[derive(Clone, Debug)]
struct Located<T> {
    value: T,
    source: ConfigSource,
}

impl<T> Located<T> {
    fn new(value: T, source: ConfigSource) -> Self {
        Located { value, source }
    }
}

#[derive(Clone, Debug, Default)]
struct PartialConfig {
    defaults: DefaultsPartial,
    document: DocumentPartial,
    output: OutputPartial,
}

#[derive(Clone, Debug, Default)]
struct DefaultsPartial {
    unit_code: Option<Located<String>>,
    unit_factor: Option<Located<String>>,
    feature_unit: Option<Located<String>>,
    image_mime: Option<Located<String>>,
    weight_feature: Option<Located<String>>,
}

#[derive(Clone, Debug, Default)]
struct DocumentPartial {
    amend: Option<Located<bool>>,
    generator: Option<Located<String>>,
    locale: Option<Located<String>>,
    territories: Option<Located<Vec<String>>>,
}

#[derive(Clone, Debug, Default)]
struct OutputPartial {
    indent: Option<Located<usize>>,
    backup: Option<Located<bool>>,
}

fn overlay<T>(target: &mut Option<T>, other: Option<T>) {
    if other.is_some() {
        *target = other;
    }
}

impl PartialConfig {
    fn merge(&mut self, other: PartialConfig) {
        let defaults = other.defaults;
        overlay(&mut self.defaults.unit_code, defaults.unit_code);
        overlay(&mut self.defaults.unit_factor, defaults.unit_factor);
        overlay(&mut self.defaults.feature_unit, defaults.feature_unit);
        overlay(&mut self.defaults.image_mime, defaults.image_mime);
        overlay(&mut self.defaults.weight_feature, defaults.weight_feature);

        let document = other.document;
        overlay(&mut self.document.amend, document.amend);
        overlay(&mut self.document.generator, document.generator);
        overlay(&mut self.document.locale, document.locale);
        overlay(&mut self.document.territories, document.territories);

        overlay(&mut self.output.indent, other.output.indent);
        overlay(&mut self.output.backup, other.output.backup);
    }

    fn finalize(self) -> Result<ResolvedConfig, ConfigValidationErrors> {
        let mut errors = Vec::new();
        let fallback = DefaultSettings::default();

        let defaults = DefaultSettings {
            unit_code: non_empty(self.defaults.unit_code, "defaults.unit_code", &mut errors)
                .unwrap_or(fallback.unit_code),
            unit_factor: non_empty(self.defaults.unit_factor, "defaults.unit_factor", &mut errors)
                .unwrap_or(fallback.unit_factor),
            feature_unit: non_empty(
                self.defaults.feature_unit,
                "defaults.feature_unit",
                &mut errors,
            )
            .unwrap_or(fallback.feature_unit),
            image_mime: non_empty(self.defaults.image_mime, "defaults.image_mime", &mut errors)
                .unwrap_or(fallback.image_mime),
            weight_feature: non_empty(
                self.defaults.weight_feature,
                "defaults.weight_feature",
                &mut errors,
            )
            .unwrap_or(fallback.weight_feature),
        };

        let locale = self.document.locale.map(|located| {
            if !is_country_code(&located.value) {
                errors.push(
                    ConfigValidationError::new(
                        Some(located.source.clone()),
                        format!("expected two ASCII letters (received '{}')", located.value),
                    )
                    .with_context("document.locale"),
                );
            }
            located.value
        });

        let territories = match self.document.territories {
            Some(located) => {
                for code in &located.value {
                    if !is_country_code(code) {
                        errors.push(
                            ConfigValidationError::new(
                                Some(located.source.clone()),
                                format!("expected two ASCII letters (received '{code}')"),
                            )
                            .with_context("document.territories"),
                        );
                    }
                }
                located.value
            }
            None => Vec::new(),
        };

        let document = DocumentSettings {
            amend: self.document.amend.map_or(true, |located| located.value),
            generator: self.document.generator.map(|located| located.value),
            locale,
            territories,
        };

        let indent = match self.output.indent {
            Some(located) if located.value > MAX_INDENT => {
                errors.push(
                    ConfigValidationError::new(
                        Some(located.source.clone()),
                        format!(
                            "must be at most {MAX_INDENT} (received {})",
                            located.value
                        ),
                    )
                    .with_context("output.indent"),
                );
                located.value
            }
            Some(located) => located.value,
            None => OutputSettings::default().indent,
        };

        let output = OutputSettings {
            indent,
            backup: self.output.backup.map_or(true, |located| located.value),
        };

        if !errors.is_empty() {
            return Err(ConfigValidationErrors(errors));
        }

        Ok(ResolvedConfig {
            defaults,
            document,
            output,
        })
    }
}

fn non_empty(
    located: Option<Located<String>>,
    context: &str,
    errors: &mut Vec<ConfigValidationError>,
) -> Option<String> {
    let located = located?;
    if located.value.trim().is_empty() {
        errors.push(
            ConfigValidationError::new(Some(located.source), "must not be empty".to_owned())
                .with_context(context),
        );
        return None;
    }
    Some(located.value)
}

/// Two ASCII letters, as required for locale and territory codes.
pub fn is_country_code(value: &str) -> bool {
    value.len() == 2 && value.bytes().all(|byte| byte.is_ascii_alphabetic())
}

#[derive(Clone, Debug)]
struct ResolvedConfig {
    defaults: DefaultSettings,
    document: DocumentSettings,
    output: OutputSettings,
}

/// Container for validation failures, formatted as a bullet list.
#[derive(Debug)]
pub struct ConfigValidationErrors(pub Vec<ConfigValidationError>);

impl fmt::Display for ConfigValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (idx, err) in self.0.iter().enumerate() {
            if idx > 0 {
                writeln!(f)?;
            }
            write!(f, "- {err}")?;
        }
        Ok(())
    }
}

impl ConfigValidationErrors {
    pub fn iter(&self) -> impl Iterator<Item = &ConfigValidationError> {
        self.0.iter()
    }
}

/// Validation failure with optional provenance.
#[derive(Clone, Debug)]
pub struct ConfigValidationError {
    pub source: Option<ConfigSource>,
    pub message: String,
    pub context: Option<String>,
}

impl ConfigValidationError {
    fn new(source: Option<ConfigSource>, message: String) -> Self {
        ConfigValidationError {
            source,
            message,
            context: None,
        }
    }

    fn with_context(mut self, context: impl Into<String>) -> Self {
        self.context = Some(context.into());
        self
    }
}

impl fmt::Display for ConfigValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(context) = &self.context {
            write!(f, "{}: {}", context, self.message)?;
        } else {
            write!(f, "{}", self.message)?;
        }
        if let Some(source) = &self.source {
            write!(f, " ({})", source.describe())?;
        }
        Ok(())
    }
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawConfig {
    #[serde(default)]
    defaults: Option<RawDefaults>,
    #[serde(default)]
    document: Option<RawDocument>,
    #[serde(default)]
    output: Option<RawOutput>,
}

impl RawConfig {
    fn into_partial(self, source: ConfigSource) -> PartialConfig {
        PartialConfig {
            defaults: self
                .defaults
                .map(|raw| raw.into_partial(&source))
                .unwrap_or_default(),
            document: self
                .document
                .map(|raw| raw.into_partial(&source))
                .unwrap_or_default(),
            output: self
                .output
                .map(|raw| raw.into_partial(&source))
                .unwrap_or_default(),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawDefaults {
    #[serde(default)]
    unit_code: Option<String>,
    #[serde(default)]
    unit_factor: Option<String>,
    #[serde(default)]
    feature_unit: Option<String>,
    #[serde(default)]
    image_mime: Option<String>,
    #[serde(default)]
    weight_feature: Option<String>,
}

impl RawDefaults {
    fn into_partial(self, source: &ConfigSource) -> DefaultsPartial {
        let at = |value: Option<String>| value.map(|value| Located::new(value, source.clone()));
        DefaultsPartial {
            unit_code: at(self.unit_code),
            unit_factor: at(self.unit_factor),
            feature_unit: at(self.feature_unit),
            image_mime: at(self.image_mime),
            weight_feature: at(self.weight_feature),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawDocument {
    #[serde(default)]
    amend: Option<bool>,
    #[serde(default)]
    generator: Option<String>,
    #[serde(default)]
    locale: Option<String>,
    #[serde(default)]
    territories: Option<Vec<String>>,
}

impl RawDocument {
    fn into_partial(self, source: &ConfigSource) -> DocumentPartial {
        DocumentPartial {
            amend: self.amend.map(|value| Located::new(value, source.clone())),
            generator: self
                .generator
                .map(|value| Located::new(value, source.clone())),
            locale: self.locale.map(|value| Located::new(value, source.clone())),
            territories: self
                .territories
                .map(|value| Located::new(value, source.clone())),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawOutput {
    #[serde(default)]
    indent: Option<usize>,
    #[serde(default)]
    backup: Option<bool>,
}

impl RawOutput {
    fn into_partial(self, source: &ConfigSource) -> OutputPartial {
        OutputPartial {
            indent: self.indent.map(|value| Located::new(value, source.clone())),
            backup: self.backup.map(|value| Located::new(value, source.clone())),
        }
    }
}
