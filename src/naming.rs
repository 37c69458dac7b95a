//! Filename conventions for categories and articles.
//!
//! Every article file follows one pattern: a base slug, an optional language
//! suffix, and the `.md` extension. Categories are plain directory names whose
//! dashes become spaces for display.
//!
//! ## Article Files
//!
//! - `install.md` → slug "install", default language
//! - `install.en.md` → slug "install", language "en" (when `en` is supported)
//! - `v1.2.md` → slug "v1.2", default language (`2` is not a language)
//!
//! ## Display Titles
//!
//! - `Update-Notes/` → "Update Notes"
//! - `常见问题-FAQ/` → "常见问题 FAQ"

use crate::config::LanguageConfig;

/// Result of parsing an article filename like `install.en.md`.
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedArticleName {
    /// Language-neutral identifier shared by every translation of the article.
    pub slug: String,
    /// Language of the file: the suffix when recognized, otherwise the default.
    pub language: String,
    /// True when the filename carried a recognized translation suffix.
    pub is_translation: bool,
}

/// Parse an article filename following the `slug[.lang].md` convention.
///
/// Returns `None` for anything that is not a markdown file or has an empty
/// stem. A suffix is only treated as a language when it names a supported
/// language other than the default; `install.zh.md` with `zh` as the default
/// keeps `install.zh` as its slug.
pub fn parse_article_file(file_name: &str, languages: &LanguageConfig) -> Option<ParsedArticleName> {
    let stem = file_name.strip_suffix(".md")?;
    if stem.is_empty() {
        return None;
    }

    if let Some((base, suffix)) = stem.rsplit_once('.')
        && !base.is_empty()
        && languages.is_supported(suffix)
        && !languages.is_default(suffix)
    {
        return Some(ParsedArticleName {
            slug: base.to_string(),
            language: suffix.to_string(),
            is_translation: true,
        });
    }

    Some(ParsedArticleName {
        slug: stem.to_string(),
        language: languages.default.clone(),
        is_translation: false,
    })
}

/// Filename of an article variant within its category directory.
///
/// The default language has no suffix: `("install", "zh")` → `install.md`
/// when `zh` is the default, `("install", "en")` → `install.en.md`.
pub fn article_file_name(slug: &str, language: &str, languages: &LanguageConfig) -> String {
    if languages.is_default(language) {
        format!("{slug}.md")
    } else {
        format!("{slug}.{language}.md")
    }
}

/// Display title for a category directory: dashes converted to spaces.
pub fn humanize_category(name: &str) -> String {
    name.replace('-', " ")
}
