//! The `articles.json` manifest shared by the builder and the client.
//!
//! The builder writes it; the client only ever reads it. Field names are
//! camelCase on the wire:
//!
//! ```json
//! {
//!   "config": { "default": "zh", "supported": ["zh", "en"], "labels": { "zh": "中文" } },
//!   "categoryWeights": { "FAQ": 100 },
//!   "categories": [
//!     {
//!       "name": "FAQ",
//!       "title": "FAQ",
//!       "articles": [
//!         {
//!           "title": "Install", "date": "2024-03-01", "slug": "install",
//!           "description": "", "tags": [], "lastModified": "2024-03-01T08:00:00.000Z",
//!           "language": "zh",
//!           "translations": { "en": { "...": "..." } }
//!         }
//!       ]
//!     }
//!   ]
//! }
//! ```

use crate::config::LanguageConfig;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::collections::BTreeMap;
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ManifestError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Manifest {
    pub config: LanguageConfig,
    #[serde(default)]
    pub category_weights: BTreeMap<String, i32>,
    #[serde(default)]
    pub categories: Vec<Category>,
}

/// A category directory and its primary articles, newest first.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Category {
    /// Directory name. Used in fragments, fetch paths, weights and stored state.
    pub name: String,
    /// Display form of the name.
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub articles: Vec<Article>,
}

impl Category {
    pub fn display_title(&self) -> &str {
        if self.title.is_empty() {
            &self.name
        } else {
            &self.title
        }
    }

    pub fn find_article(&self, slug: &str) -> Option<&Article> {
        self.articles.iter().find(|a| a.slug == slug)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Article {
    pub title: String,
    /// Creation day, `YYYY-MM-DD`.
    pub date: String,
    pub slug: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub tags: Vec<String>,
    /// RFC 3339 modification signal.
    pub last_modified: String,
    pub language: String,
    /// Only populated on primary (default-language) articles.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub translations: BTreeMap<String, Article>,
}

impl Article {
    /// The variant to display for `language`, or the primary itself.
    pub fn variant(&self, language: &str) -> &Article {
        self.translations.get(language).unwrap_or(self)
    }
}

impl Manifest {
    pub fn empty(config: LanguageConfig) -> Self {
        Self {
            config,
            category_weights: BTreeMap::new(),
            categories: Vec::new(),
        }
    }

    pub fn from_json(json: &str) -> Result<Self, ManifestError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn to_json(&self) -> Result<String, ManifestError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn load(path: &Path) -> Result<Self, ManifestError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_json(&content)
    }

    /// Write pretty JSON to `path`, creating parent directories.
    pub fn save(&self, path: &Path) -> Result<(), ManifestError> {
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent)?;
        }
        let mut json = self.to_json()?;
        json.push('\n');
        std::fs::write(path, json)?;
        Ok(())
    }

    pub fn find_category(&self, name: &str) -> Option<&Category> {
        self.categories.iter().find(|c| c.name == name)
    }

    pub fn find_article(&self, category: &str, slug: &str) -> Option<&Article> {
        self.find_category(category)?.find_article(slug)
    }

    /// Number of primary articles across all categories.
    pub fn article_count(&self) -> usize {
        self.categories.iter().map(|c| c.articles.len()).sum()
    }

    /// Number of translation variants across all categories.
    pub fn translation_count(&self) -> usize {
        self.categories
            .iter()
            .flat_map(|c| &c.articles)
            .map(|a| a.translations.len())
            .sum()
    }
}

/// SHA-256 hex digest of raw manifest bytes.
pub fn fingerprint(bytes: &[u8]) -> String {
    format!("{:x}", Sha256::digest(bytes))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn article(slug: &str, language: &str) -> Article {
        Article {
            title: slug.to_uppercase(),
            date: "2024-01-01".into(),
            slug: slug.into(),
            description: String::new(),
            tags: vec![],
            last_modified: "2024-01-01T00:00:00.000Z".into(),
            language: language.into(),
            translations: BTreeMap::new(),
        }
    }

    fn sample() -> Manifest {
        let mut primary = article("install", "zh");
        primary
            .translations
            .insert("en".into(), article("install", "en"));
        let mut m = Manifest::empty(LanguageConfig::default());
        m.categories.push(Category {
            name: "FAQ".into(),
            title: "FAQ".into(),
            articles: vec![primary, article("reset", "zh")],
        });
        m
    }

    #[test]
    fn serializes_camel_case() {
        let json = sample().to_json().unwrap();
        assert!(json.contains("\"categoryWeights\""));
        assert!(json.contains("\"lastModified\""));
        assert!(!json.contains("last_modified"));
    }

    #[test]
    fn empty_translations_omitted() {
        let json = serde_json::to_value(article("a", "zh")).unwrap();
        assert!(json.get("translations").is_none());
    }

    #[test]
    fn save_and_load_roundtrip() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("out/articles.json");
        let m = sample();
        m.save(&path).unwrap();
        assert_eq!(Manifest::load(&path).unwrap(), m);
    }

    #[test]
    fn save_into_missing_parent_that_is_a_file_fails() {
        let tmp = TempDir::new().unwrap();
        std::fs::write(tmp.path().join("blocker"), "").unwrap();
        let result = sample().save(&tmp.path().join("blocker/articles.json"));
        assert!(matches!(result, Err(ManifestError::Io(_))));
    }

    #[test]
    fn parses_minimal_manifest_without_titles() {
        let json = r#"{
            "config": {"default": "en", "supported": ["en"], "labels": {}},
            "categories": [{"name": "Guides", "articles": [
                {"title": "A", "date": "2024-01-01", "slug": "a",
                 "lastModified": "2024-01-01T00:00:00.000Z", "language": "en"}
            ]}]
        }"#;
        let m = Manifest::from_json(json).unwrap();
        assert!(m.category_weights.is_empty());
        assert_eq!(m.categories[0].display_title(), "Guides");
        assert!(m.categories[0].articles[0].tags.is_empty());
    }

    #[test]
    fn variant_prefers_translation() {
        let m = sample();
        let a = m.find_article("FAQ", "install").unwrap();
        assert_eq!(a.variant("en").language, "en");
        assert_eq!(a.variant("ja").language, "zh");
    }

    #[test]
    fn counts() {
        let m = sample();
        assert_eq!(m.article_count(), 2);
        assert_eq!(m.translation_count(), 1);
        assert!(m.find_article("FAQ", "missing").is_none());
        assert!(m.find_article("Nope", "install").is_none());
    }

    #[test]
    fn fingerprint_tracks_content() {
        assert_eq!(fingerprint(b"abc"), fingerprint(b"abc"));
        assert_ne!(fingerprint(b"abc"), fingerprint(b"abd"));
        assert_eq!(fingerprint(b"").len(), 64);
    }
}
