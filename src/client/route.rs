//! Fragment routing.
//!
//! The URL fragment is the only routing surface:
//!
//! - `#<category>/<slug>` → article
//! - `#<category>` → category listing
//! - empty → home
//!
//! Fragments arrive percent-encoded from the address bar
//! (`#%E5%B8%B8%E8%A7%81` for `#常见`) and are decoded before matching.

use percent_encoding::percent_decode_str;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Route {
    Home,
    Category(String),
    Article { category: String, slug: String },
}

impl Route {
    pub fn parse(fragment: &str) -> Self {
        let raw = fragment.strip_prefix('#').unwrap_or(fragment);
        let decoded = percent_decode_str(raw).decode_utf8_lossy();
        let path = decoded.trim().trim_matches('/');
        if path.is_empty() {
            return Route::Home;
        }
        match path.split_once('/') {
            Some((category, slug)) if !category.is_empty() && !slug.is_empty() => Route::Article {
                category: category.to_string(),
                slug: slug.to_string(),
            },
            Some((category, _)) => Route::Category(category.to_string()),
            None => Route::Category(path.to_string()),
        }
    }

    pub fn article(category: impl Into<String>, slug: impl Into<String>) -> Self {
        Route::Article {
            category: category.into(),
            slug: slug.into(),
        }
    }

    /// Canonical fragment, unencoded.
    pub fn fragment(&self) -> String {
        match self {
            Route::Home => String::new(),
            Route::Category(name) => format!("#{name}"),
            Route::Article { category, slug } => format!("#{category}/{slug}"),
        }
    }
}

/// Storage key of an article's reading progress.
pub fn progress_key(category: &str, slug: &str) -> String {
    format!("progress:#{category}/{slug}")
}
