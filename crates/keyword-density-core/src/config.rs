//! Configuration loading and discovery.
//!
//! This module provides configuration file discovery by:
//! 1. Walking up from the current directory to find project config
//! 2. Loading user config from XDG config directory
//! 3. Merging with sensible defaults
//!
//! # Supported formats
//!
//! The following configuration file formats are supported:
//! - TOML (`.toml`)
//! - YAML (`.yaml`, `.yml`)
//! - JSON (`.json`)
//!
//! # Config file locations (in order of precedence, highest first):
//! - `keyword-density.<ext>` in current directory or any parent
//! - `.keyword-density.<ext>` in current directory or any parent
//! - `kwd.<ext>` in current directory or any parent
//! - `.kwd.<ext>` in current directory or any parent
//! - `~/.config/keyword-density/config.<ext>` (user config)
//!
//! Where `<ext>` is one of: `toml`, `yaml`, `yml`, `json`
//!
//! When multiple files exist in the same directory, all are merged via figment.
//! Later extensions override earlier: toml < yaml < yml < json.
//!
//! # Example
//! ```no_run
//! use camino::Utf8PathBuf;
//! use keyword_density_core::config::ConfigLoader;
//!
//! let cwd = std::env::current_dir().unwrap();
//! let cwd = Utf8PathBuf::try_from(cwd).expect("current directory is not valid UTF-8");
//! let (config, _sources) = ConfigLoader::new()
//!     .with_project_search(&cwd)
//!     .load()
//!     .unwrap();
//! let report = config.analyzer(&[], None).analyze("USB driver notes");
//! ```

use std::collections::HashMap;

use camino::{Utf8Path, Utf8PathBuf};
use figment::Figment;
use figment::providers::{Env, Format, Json, Serialized, Toml, Yaml};
use serde::{Deserialize, Serialize};

use crate::density::{DensityAnalyzer, TargetDensity};
use crate::error::{ConfigError, ConfigResult};
use crate::keyword::Keyword;
use crate::validator::DensityValidator;

/// Named density band for a group of keywords.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
#[cfg_attr(feature = "clap", derive(clap::ValueEnum))]
pub enum KeywordTier {
    /// The page's main phrase (3–5%).
    #[default]
    Primary,
    /// Supporting phrases (1.5–4%).
    Secondary,
    /// Long, specific phrases (0.3–2%).
    LongTail,
}

impl KeywordTier {
    /// The band this tier maps to.
    pub const fn range(self) -> TargetDensity {
        match self {
            Self::Primary => TargetDensity::PRIMARY,
            Self::Secondary => TargetDensity::SECONDARY,
            Self::LongTail => TargetDensity::LONG_TAIL,
        }
    }

    /// Tier name as written in config files.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Primary => "primary",
            Self::Secondary => "secondary",
            Self::LongTail => "long-tail",
        }
    }
}

impl std::fmt::Display for KeywordTier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A group of keywords sharing one density band.
///
/// The band starts from `tier` (primary when omitted); `min` and `max`
/// override either bound.
#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct KeywordSet {
    /// Label shown in `info` output.
    pub name: String,
    /// Keywords in this set.
    pub keywords: Vec<String>,
    /// Preset band.
    pub tier: Option<KeywordTier>,
    /// Lower bound override, in percent.
    pub min: Option<f64>,
    /// Upper bound override, in percent.
    pub max: Option<f64>,
}

impl KeywordSet {
    /// Effective band for this set.
    pub fn range(&self) -> TargetDensity {
        let base = self.tier.unwrap_or_default().range();
        TargetDensity::new(self.min.unwrap_or(base.min), self.max.unwrap_or(base.max))
    }
}

/// The configuration for keyword-density.
///
/// Deserialized from config files found during discovery (TOML, YAML, or
/// JSON) and `KEYWORD_DENSITY_*` environment variables.
#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct Config {
    /// Log level for the application (e.g., "debug", "info", "warn", "error").
    pub log_level: LogLevel,
    /// Directory for JSONL log files (falls back to platform defaults if unset).
    pub log_dir: Option<Utf8PathBuf>,
    /// Maximum input size in bytes (default: 5 MiB).
    ///
    /// Applies to files read by the CLI and content passed to the MCP server.
    /// Use `disable_input_limit` to remove the limit entirely.
    pub max_input_bytes: Option<usize>,
    /// Disable the input size limit entirely.
    #[serde(default)]
    pub disable_input_limit: bool,
    /// Keywords tracked at `target_density` when none are given on the
    /// command line.
    pub keywords: Option<Vec<String>>,
    /// Band for `keywords` and command-line keywords (default 3–5%).
    pub target_density: Option<TargetDensity>,
    /// Keyword groups with their own bands.
    pub keyword_sets: Option<Vec<KeywordSet>>,
    /// Extra validator categories (category → primary keyword).
    ///
    /// These extend the built-in categories. On a name collision the
    /// configured keyword wins.
    pub categories: Option<HashMap<String, String>>,
    /// Seed for the optimizer's paragraph picker. Omit for a fresh seed per
    /// run.
    pub seed: Option<u64>,
}

impl Config {
    /// Build an analyzer from config, with command-line overrides.
    ///
    /// Non-empty `keywords` replace every configured keyword and use
    /// `target`, falling back to `target_density`. Otherwise the analyzer
    /// tracks `keyword_sets` at their own bands followed by `keywords` at
    /// `target_density`. With nothing configured the built-in keyword list
    /// is used.
    pub fn analyzer(&self, keywords: &[String], target: Option<TargetDensity>) -> DensityAnalyzer {
        let target = target.or(self.target_density).unwrap_or_default();
        if !keywords.is_empty() {
            return DensityAnalyzer::new(keywords, target);
        }

        let mut pairs: Vec<(Keyword, TargetDensity)> = Vec::new();
        for set in self.keyword_sets.iter().flatten() {
            let range = set.range();
            pairs.extend(set.keywords.iter().map(|k| (Keyword::new(k), range)));
        }
        pairs.extend(
            self.keywords
                .iter()
                .flatten()
                .map(|k| (Keyword::new(k), target)),
        );
        pairs.retain(|(k, _)| !k.is_empty());

        if pairs.is_empty() {
            DensityAnalyzer::new(Vec::<String>::new(), target)
        } else {
            DensityAnalyzer::with_targets(pairs)
        }
    }

    /// Build a validator with the built-in and configured categories.
    pub fn validator(&self) -> DensityValidator {
        DensityValidator::new().with_categories(self.categories.iter().flatten())
    }
}

/// Log level configuration.
#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    /// Verbose output for debugging and development.
    Debug,
    /// Standard operational information (default).
    #[default]
    Info,
    /// Warnings about potential issues.
    Warn,
    /// Errors that indicate failures.
    Error,
}

impl LogLevel {
    /// Returns the log level as a lowercase string slice.
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Debug => "debug",
            Self::Info => "info",
            Self::Warn => "warn",
            Self::Error => "error",
        }
    }
}

/// Metadata about which configuration sources were loaded.
///
/// Returned alongside [`Config`] from [`ConfigLoader::load()`] so commands
/// can report the actual config files without re-discovering them.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ConfigSources {
    /// Project config files found by walking up, ordered low→high precedence.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub project_files: Vec<Utf8PathBuf>,
    /// User config file from XDG config directory.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_file: Option<Utf8PathBuf>,
    /// Explicit config files loaded (e.g., from `--config` flag).
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub explicit_files: Vec<Utf8PathBuf>,
}

impl ConfigSources {
    /// Returns the highest-precedence config file that was loaded.
    ///
    /// Precedence: explicit files > project files > user file.
    pub fn primary_file(&self) -> Option<&Utf8Path> {
        self.explicit_files
            .last()
            .map(Utf8PathBuf::as_path)
            .or_else(|| self.project_files.last().map(Utf8PathBuf::as_path))
            .or(self.user_file.as_deref())
    }
}

/// Supported configuration file extensions (in order of preference).
const CONFIG_EXTENSIONS: &[&str] = &["toml", "yaml", "yml", "json"];

/// Application name for XDG directory lookup and config file names.
const APP_NAME: &str = "keyword-density";

/// Application names to search for config files (in precedence order, lowest first).
const APP_NAMES: &[&str] = &["kwd", "keyword-density"];

/// Prefix for environment overrides.
const ENV_PREFIX: &str = "KEYWORD_DENSITY_";

/// Builder for loading configuration from multiple sources.
#[derive(Debug, Default)]
pub struct ConfigLoader {
    /// Starting directory for project config search.
    project_search_root: Option<Utf8PathBuf>,
    /// Whether to include user config from XDG directory.
    include_user_config: bool,
    /// Stop searching when we hit a directory containing this file/dir.
    boundary_marker: Option<String>,
    /// Explicit config files to load (for testing or programmatic use).
    explicit_files: Vec<Utf8PathBuf>,
}

impl ConfigLoader {
    /// Create a new config loader with default settings.
    pub fn new() -> Self {
        Self {
            project_search_root: None,
            include_user_config: true,
            boundary_marker: Some(".git".to_string()),
            explicit_files: Vec::new(),
        }
    }

    /// Set the starting directory for project config search.
    pub fn with_project_search<P: AsRef<Utf8Path>>(mut self, path: P) -> Self {
        self.project_search_root = Some(path.as_ref().to_path_buf());
        self
    }

    /// Set whether to include user config from `~/.config/keyword-density/`.
    pub const fn with_user_config(mut self, include: bool) -> Self {
        self.include_user_config = include;
        self
    }

    /// Set a boundary marker to stop directory traversal. Default is `.git`.
    pub fn with_boundary_marker<S: Into<String>>(mut self, marker: S) -> Self {
        self.boundary_marker = Some(marker.into());
        self
    }

    /// Disable boundary marker (search all the way to filesystem root).
    pub fn without_boundary_marker(mut self) -> Self {
        self.boundary_marker = None;
        self
    }

    /// Add an explicit config file to load.
    ///
    /// Files are loaded in order, with later files taking precedence.
    /// Explicit files are loaded after discovered files.
    pub fn with_file<P: AsRef<Utf8Path>>(mut self, path: P) -> Self {
        self.explicit_files.push(path.as_ref().to_path_buf());
        self
    }

    /// Load configuration, merging all discovered sources.
    ///
    /// Precedence (highest to lowest):
    /// 1. `KEYWORD_DENSITY_*` environment variables
    /// 2. Explicit files (in order added via `with_file`)
    /// 3. Project config (closest to search root)
    /// 4. User config (`~/.config/keyword-density/config.<ext>`)
    /// 5. Default values
    #[tracing::instrument(skip(self), fields(search_root = ?self.project_search_root))]
    pub fn load(self) -> ConfigResult<(Config, ConfigSources)> {
        tracing::debug!("loading configuration");
        let mut figment = Figment::new().merge(Serialized::defaults(Config::default()));
        let mut sources = ConfigSources::default();

        if self.include_user_config
            && let Some(user_config) = self.find_user_config()
        {
            figment = Self::merge_file(figment, &user_config);
            sources.user_file = Some(user_config);
        }

        if let Some(ref root) = self.project_search_root {
            let project_configs = self.find_project_configs(root);
            for pc in &project_configs {
                figment = Self::merge_file(figment, pc);
            }
            sources.project_files = project_configs;
        }

        for file in &self.explicit_files {
            figment = Self::merge_file(figment, file);
        }
        sources.explicit_files = self.explicit_files;

        // KEYWORD_DENSITY_SEED=7, KEYWORD_DENSITY_LOG_LEVEL=debug, etc.
        figment = figment.merge(Env::prefixed(ENV_PREFIX).lowercase(true));

        let config: Config = figment
            .extract()
            .map_err(|e| ConfigError::Deserialize(Box::new(e)))?;
        tracing::info!(
            log_level = config.log_level.as_str(),
            keywords = config.keywords.as_ref().map_or(0, Vec::len),
            keyword_sets = config.keyword_sets.as_ref().map_or(0, Vec::len),
            "configuration loaded"
        );
        Ok((config, sources))
    }

    /// Load configuration, returning an error if no config file is found.
    pub fn load_or_error(self) -> ConfigResult<(Config, ConfigSources)> {
        let has_user = self.include_user_config && self.find_user_config().is_some();
        let has_project = self
            .project_search_root
            .as_ref()
            .is_some_and(|root| !self.find_project_configs(root).is_empty());
        let has_explicit = !self.explicit_files.is_empty();

        if !has_user && !has_project && !has_explicit {
            return Err(ConfigError::NotFound);
        }

        self.load()
    }

    /// Find project config files by walking up from the given directory.
    ///
    /// Returns every match from the closest directory that has any, ordered
    /// low-to-high precedence: `kwd` names before `keyword-density` names,
    /// dotfiles before regular files within each name.
    fn find_project_configs(&self, start: &Utf8Path) -> Vec<Utf8PathBuf> {
        let mut current = Some(start.to_path_buf());

        while let Some(dir) = current {
            let mut found = Vec::new();

            for app_name in APP_NAMES {
                for ext in CONFIG_EXTENSIONS {
                    let dotfile = dir.join(format!(".{app_name}.{ext}"));
                    if dotfile.is_file() {
                        found.push(dotfile);
                    }
                }
                for ext in CONFIG_EXTENSIONS {
                    let regular = dir.join(format!("{app_name}.{ext}"));
                    if regular.is_file() {
                        found.push(regular);
                    }
                }
            }

            if !found.is_empty() {
                return found;
            }

            // Checked after the config files so a config next to the marker is found.
            if let Some(ref marker) = self.boundary_marker
                && dir.join(marker).exists()
                && dir != start
            {
                break;
            }

            current = dir.parent().map(Utf8Path::to_path_buf);
        }

        Vec::new()
    }

    /// Find user config in XDG config directory.
    fn find_user_config(&self) -> Option<Utf8PathBuf> {
        let config_dir = user_config_dir()?;
        CONFIG_EXTENSIONS
            .iter()
            .map(|ext| config_dir.join(format!("config.{ext}")))
            .find(|path| path.is_file())
    }

    /// Merge a config file into the figment, detecting format from extension.
    fn merge_file(figment: Figment, path: &Utf8Path) -> Figment {
        match path.extension() {
            Some("yaml" | "yml") => figment.merge(Yaml::file_exact(path.as_str())),
            Some("json") => figment.merge(Json::file_exact(path.as_str())),
            _ => figment.merge(Toml::file_exact(path.as_str())),
        }
    }
}

fn project_dirs() -> Option<directories::ProjectDirs> {
    directories::ProjectDirs::from("", "", APP_NAME)
}

/// Get the user config directory path.
///
/// Returns `~/.config/keyword-density/` on Linux,
/// `~/Library/Application Support/keyword-density/` on macOS, and the
/// equivalent elsewhere.
pub fn user_config_dir() -> Option<Utf8PathBuf> {
    let proj_dirs = project_dirs()?;
    Utf8PathBuf::from_path_buf(proj_dirs.config_dir().to_path_buf()).ok()
}

/// Get the local data directory path (machine-specific, not synced).
///
/// Default home for JSONL log files.
pub fn user_data_local_dir() -> Option<Utf8PathBuf> {
    let proj_dirs = project_dirs()?;
    Utf8PathBuf::from_path_buf(proj_dirs.data_local_dir().to_path_buf()).ok()
}
