//! Application state owned by the [`App`](super::App) controller.
//!
//! Render functions borrow an [`AppState`]; nothing reads global state.

use crate::front_matter::FrontMatter;
use crate::manifest::Manifest;
use crate::search::SearchHit;
use super::markdown::TocEntry;
use std::collections::BTreeMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Theme {
    #[default]
    Light,
    Dark,
}

impl Theme {
    pub fn as_str(self) -> &'static str {
        match self {
            Theme::Light => "light",
            Theme::Dark => "dark",
        }
    }

    /// Unknown values fall back to light.
    pub fn parse(value: &str) -> Self {
        match value {
            "dark" => Theme::Dark,
            _ => Theme::Light,
        }
    }

    pub fn toggled(self) -> Self {
        match self {
            Theme::Light => Theme::Dark,
            Theme::Dark => Theme::Light,
        }
    }
}

/// Which page is shown in the main pane.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum View {
    #[default]
    Home,
    Category(String),
    Article { category: String, slug: String },
}

/// Contents of the article pane.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum ArticlePane {
    #[default]
    Empty,
    /// Shown synchronously while the body is fetched.
    Loading { category: String, slug: String },
    Loaded(Box<LoadedArticle>),
    Failed { category: String, slug: String, error: ErrorPanel },
}

impl ArticlePane {
    /// `(category, slug)` the pane shows or is loading.
    pub fn target(&self) -> Option<(&str, &str)> {
        match self {
            ArticlePane::Empty => None,
            ArticlePane::Loading { category, slug } | ArticlePane::Failed { category, slug, .. } => {
                Some((category, slug))
            }
            ArticlePane::Loaded(a) => Some((&a.category, &a.slug)),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct LoadedArticle {
    pub category: String,
    pub slug: String,
    /// Language of the file actually displayed (after any fallback).
    pub language: String,
    /// Fetched path, including any cache-busting query.
    pub path: String,
    pub front_matter: Option<FrontMatter>,
    /// `YYYY-MM-DD` from the front-matter, else from the manifest.
    pub date: Option<String>,
    pub html: String,
    pub toc: Vec<TocEntry>,
    /// Saved scroll fraction for the view to restore once laid out.
    pub restore_scroll: f64,
}

/// A visible, dismissable failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ErrorPanel {
    pub title: String,
    /// Resource that failed.
    pub path: String,
    pub message: String,
}

/// Category name → expanded in the sidebar. Missing means expanded.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CategoryState(pub BTreeMap<String, bool>);

impl CategoryState {
    pub fn is_open(&self, category: &str) -> bool {
        self.0.get(category).copied().unwrap_or(true)
    }

    pub fn toggle(&mut self, category: &str) -> bool {
        let open = !self.is_open(category);
        self.0.insert(category.to_string(), open);
        open
    }

    pub fn from_json(json: &str) -> Self {
        Self(serde_json::from_str(json).unwrap_or_default())
    }

    pub fn to_json(&self) -> String {
        serde_json::to_string(&self.0).unwrap_or_else(|_| "{}".to_string())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum SearchStatus {
    #[default]
    Idle,
    /// A debounced query is scheduled or the index is loading.
    Searching,
    Ready,
    Failed(String),
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct SearchState {
    pub query: String,
    pub results: Vec<SearchHit>,
    /// Index into `results` of the keyboard-focused row.
    pub focused: Option<usize>,
    pub status: SearchStatus,
    /// Bumped on every input; outcomes from older generations are dropped.
    pub generation: u64,
    /// Set when the results come from a tag click rather than typed text.
    pub tag_filter: Option<String>,
}

impl SearchState {
    pub fn clear(&mut self) {
        self.query.clear();
        self.results.clear();
        self.focused = None;
        self.status = SearchStatus::Idle;
        self.tag_filter = None;
        self.generation += 1;
    }

    pub fn focus_next(&mut self) {
        if self.results.is_empty() {
            return;
        }
        self.focused = Some(match self.focused {
            None => 0,
            Some(i) => (i + 1).min(self.results.len() - 1),
        });
    }

    pub fn focus_prev(&mut self) {
        self.focused = match self.focused {
            None | Some(0) => None,
            Some(i) => Some(i - 1),
        };
    }

    /// Focused result, or the top one.
    pub fn selected(&self) -> Option<&SearchHit> {
        self.results.get(self.focused.unwrap_or(0))
    }
}

#[derive(Debug, Clone, Default)]
pub struct AppState {
    pub manifest: Option<Manifest>,
    /// SHA-256 of the manifest text currently held.
    pub fingerprint: Option<String>,
    pub language: String,
    pub theme: Theme,
    pub view: View,
    pub article: ArticlePane,
    pub categories: CategoryState,
    pub search: SearchState,
    /// Page-level failure, e.g. the manifest could not be loaded.
    pub error: Option<ErrorPanel>,
    /// Fragment the controller last set itself.
    pub fragment: String,
}
