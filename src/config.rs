//! Site configuration module.
//!
//! Handles loading, validating, and merging `config.toml`. Stock defaults are
//! the base layer; the site's `config.toml` (sitting next to the articles
//! directory) overrides whatever keys it names.
//!
//! ## Config File Location
//!
//! ```text
//! site/
//! ├── config.toml              # Optional, overrides stock defaults
//! ├── articles.json            # Generated manifest
//! └── articles/
//!     ├── FAQ/
//!     │   ├── install.md
//!     │   └── install.en.md
//!     └── Update-Notes/
//!         └── v2.md
//! ```
//!
//! ## Configuration Options
//!
//! ```toml
//! articles_dir = "articles"
//! manifest_file = "articles.json"
//!
//! [languages]
//! default = "zh"
//! supported = ["zh", "en", "ja"]
//!
//! [languages.labels]
//! zh = "中文"
//! en = "English"
//! ja = "日本語"
//!
//! [category_weights]
//! "FAQ" = 100
//! "Other" = -1
//!
//! [client]
//! recent_articles = 5
//! refresh_interval_secs = 60
//! search_debounce_ms = 250
//! search_limit = 10
//! index_batch_size = 10
//! # cache_version = "v3"
//! ```
//!
//! Unknown keys are rejected to catch typos early.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use std::time::Duration;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("Config validation error: {0}")]
    Validation(String),
}

/// Site configuration loaded from `config.toml`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SiteConfig {
    /// Articles root, relative to the site directory.
    pub articles_dir: String,
    /// Manifest file name, relative to the site directory.
    pub manifest_file: String,
    /// Language settings, copied verbatim into the manifest.
    pub languages: LanguageConfig,
    /// Category ordering weights. Larger sorts first; unlisted categories weigh 0.
    pub category_weights: BTreeMap<String, i32>,
    /// Reading client behavior.
    pub client: ClientConfig,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            articles_dir: "articles".to_string(),
            manifest_file: "articles.json".to_string(),
            languages: LanguageConfig::default(),
            category_weights: BTreeMap::new(),
            client: ClientConfig::default(),
        }
    }
}

impl SiteConfig {
    /// Validate config values are within acceptable ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.languages.supported.is_empty() {
            return Err(ConfigError::Validation(
                "languages.supported must not be empty".into(),
            ));
        }
        if !self.languages.is_supported(&self.languages.default) {
            return Err(ConfigError::Validation(format!(
                "languages.default '{}' must be listed in languages.supported",
                self.languages.default
            )));
        }
        if self.client.recent_articles == 0 {
            return Err(ConfigError::Validation(
                "client.recent_articles must be at least 1".into(),
            ));
        }
        if self.client.index_batch_size == 0 {
            return Err(ConfigError::Validation(
                "client.index_batch_size must be at least 1".into(),
            ));
        }
        if self.client.search_limit == 0 {
            return Err(ConfigError::Validation(
                "client.search_limit must be at least 1".into(),
            ));
        }
        if self.client.refresh_interval_secs == 0 {
            return Err(ConfigError::Validation(
                "client.refresh_interval_secs must be at least 1".into(),
            ));
        }
        Ok(())
    }

    /// Weight of a category; unlisted categories weigh 0.
    pub fn category_weight(&self, name: &str) -> i32 {
        self.category_weights.get(name).copied().unwrap_or(0)
    }
}

/// Language settings shared by the builder and the client.
///
/// Serialized into the manifest as `config: {default, supported, labels}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LanguageConfig {
    /// Language of files without a language suffix.
    pub default: String,
    /// Every language code a `name.<lang>.md` suffix may carry.
    pub supported: Vec<String>,
    /// Human-readable label per language code.
    pub labels: BTreeMap<String, String>,
}

impl Default for LanguageConfig {
    fn default() -> Self {
        Self {
            default: "zh".to_string(),
            supported: vec!["zh".to_string(), "en".to_string(), "ja".to_string()],
            labels: BTreeMap::from([
                ("zh".to_string(), "中文".to_string()),
                ("en".to_string(), "English".to_string()),
                ("ja".to_string(), "日本語".to_string()),
            ]),
        }
    }
}

impl LanguageConfig {
    pub fn is_supported(&self, code: &str) -> bool {
        self.supported.iter().any(|s| s == code)
    }

    pub fn is_default(&self, code: &str) -> bool {
        self.default == code
    }

    /// Label for a language, falling back to the code itself.
    pub fn label<'a>(&'a self, code: &'a str) -> &'a str {
        self.labels.get(code).map(String::as_str).unwrap_or(code)
    }
}

/// Reading client settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ClientConfig {
    /// Articles shown per category card on the home view.
    pub recent_articles: usize,
    /// Seconds between manifest refresh checks.
    pub refresh_interval_secs: u64,
    /// Quiet period after the last keystroke before a search runs.
    pub search_debounce_ms: u64,
    /// Maximum number of ranked search results.
    pub search_limit: usize,
    /// Concurrent article fetches per batch while building the search index.
    pub index_batch_size: usize,
    /// Appended as `?v=<version>` to every client fetch when set.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cache_version: Option<String>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            recent_articles: 5,
            refresh_interval_secs: 60,
            search_debounce_ms: 250,
            search_limit: 10,
            index_batch_size: 10,
            cache_version: None,
        }
    }
}

impl ClientConfig {
    pub fn refresh_interval(&self) -> Duration {
        Duration::from_secs(self.refresh_interval_secs)
    }

    pub fn search_debounce(&self) -> Duration {
        Duration::from_millis(self.search_debounce_ms)
    }
}

// =============================================================================
// Config loading, merging, and validation
// =============================================================================

/// Returns the stock default config as a `toml::Value::Table`.
pub fn stock_defaults_value() -> toml::Value {
    toml::Value::try_from(SiteConfig::default()).expect("default config must serialize")
}

/// Recursively merge `overlay` on top of `base`.
///
/// - Tables are merged key-by-key (overlay keys override base keys).
/// - Non-table values in overlay replace base values entirely.
/// - Keys in base that are not in overlay are preserved.
pub fn merge_toml(base: toml::Value, overlay: toml::Value) -> toml::Value {
    match (base, overlay) {
        (toml::Value::Table(mut base_table), toml::Value::Table(overlay_table)) => {
            for (key, overlay_val) in overlay_table {
                let merged = match base_table.remove(&key) {
                    Some(base_val) => merge_toml(base_val, overlay_val),
                    None => overlay_val,
                };
                base_table.insert(key, merged);
            }
            toml::Value::Table(base_table)
        }
        (_, overlay) => overlay,
    }
}

/// Load `config.toml` from a directory as a raw TOML value.
///
/// Returns `Ok(None)` if no `config.toml` exists in the directory.
pub fn load_raw_config(path: &Path) -> Result<Option<toml::Value>, ConfigError> {
    let config_path = path.join("config.toml");
    if !config_path.exists() {
        return Ok(None);
    }
    let content = fs::read_to_string(&config_path)?;
    let value: toml::Value = toml::from_str(&content)?;
    Ok(Some(value))
}

/// Merge an optional overlay onto a base value, then deserialize and validate.
pub fn resolve_config(
    base: toml::Value,
    overlay: Option<toml::Value>,
) -> Result<SiteConfig, ConfigError> {
    let merged = match overlay {
        Some(ov) => merge_toml(base, ov),
        None => base,
    };
    let config: SiteConfig = merged.try_into()?;
    config.validate()?;
    Ok(config)
}

/// Load config from `config.toml` in the given site directory.
pub fn load_config(site_root: &Path) -> Result<SiteConfig, ConfigError> {
    let base = stock_defaults_value();
    let overlay = load_raw_config(site_root)?;
    resolve_config(base, overlay)
}

/// Returns a fully-commented stock `config.toml`.
///
/// Used by the `gen-config` CLI command.
pub fn stock_config_toml() -> &'static str {
    r##"# Simple FAQ Configuration
# =========================
# All settings are optional. Values shown below are the defaults.
# Unknown keys will cause an error.

# Directory holding one sub-directory per category.
articles_dir = "articles"

# Manifest written by `simple-faq index` and read by the client.
manifest_file = "articles.json"

# ---------------------------------------------------------------------------
# Languages
# ---------------------------------------------------------------------------
# Files named `slug.<lang>.md` are translations of `slug.md` when <lang> is a
# supported, non-default language.
[languages]
default = "zh"
supported = ["zh", "en", "ja"]

[languages.labels]
zh = "中文"
en = "English"
ja = "日本語"

# ---------------------------------------------------------------------------
# Category ordering
# ---------------------------------------------------------------------------
# Larger weights sort first. Unlisted categories weigh 0; ties are alphabetical.
[category_weights]
# "FAQ" = 100
# "Update-Notes" = 90
# "Other" = -1

# ---------------------------------------------------------------------------
# Reading client
# ---------------------------------------------------------------------------
[client]
# Most recent articles shown per category card on the home view.
recent_articles = 5

# Seconds between checks for a regenerated manifest.
refresh_interval_secs = 60

# Quiet period after the last keystroke before a search runs.
search_debounce_ms = 250

# Maximum number of ranked search results.
search_limit = 10

# Concurrent article fetches per batch while building the search index.
index_batch_size = 10

# Cache-busting token appended to every fetch as ?v=<cache_version>.
# cache_version = "v1"
"##
}
