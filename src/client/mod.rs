//! The reading client.
//!
//! [`App`] is the controller: it owns an [`AppState`], talks to the site
//! through a [`Fetcher`], persists preferences in a [`Store`], and renders
//! with the functions in [`view`]. It is driven by a host (the `render`
//! command, or tests) that feeds it fragments, delegated UI events,
//! keystrokes and scroll positions.
//!
//! Operations that touch the view never return errors. Failures become
//! [`ErrorPanel`]s in the state and are logged.
//!
//! ```text
//! start(fragment) ──► manifest + preferences ──► route
//! navigate(fragment) ─┬─► Home / Category
//!                     └─► load_article ──► Loading ──► Loaded | Failed
//! on_search_input ──► Debouncer ──► next_search_outcome ──► results
//! RefreshTimer::tick ──► refresh ──► (fingerprint changed) reload
//! ```

pub mod debounce;
pub mod events;
pub mod fetch;
pub mod markdown;
pub mod refresh;
pub mod route;
pub mod state;
pub mod storage;
pub mod view;

use crate::config::{LanguageConfig, SiteConfig};
use crate::front_matter;
use crate::i18n::UiStrings;
use crate::manifest::{self, Manifest};
use crate::naming;
use crate::search::{IndexOptions, SearchHit, SearchIndex};
use debounce::{Debounced, Debouncer};
use events::{SearchKey, UiEvent};
use fetch::{FetchError, Fetcher, with_cache_version};
use route::{Route, progress_key};
use state::{AppState, ArticlePane, CategoryState, ErrorPanel, LoadedArticle, SearchStatus, Theme, View};
use std::sync::Arc;
use storage::Store;
use tokio::sync::mpsc::{self, UnboundedReceiver};
use tracing::{debug, info, trace, warn};

pub const THEME_KEY: &str = "theme";
pub const LANGUAGE_KEY: &str = "language";
pub const CATEGORY_STATE_KEY: &str = "categoryState";

/// Scroll geometry of the article container.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScrollMetrics {
    pub scroll_top: f64,
    pub scroll_height: f64,
    pub client_height: f64,
}

impl ScrollMetrics {
    /// Position as a fraction in `0.0..=1.0`; 0 when nothing scrolls.
    pub fn fraction(&self) -> f64 {
        let scrollable = self.scroll_height - self.client_height;
        if scrollable <= 0.0 || !scrollable.is_finite() {
            return 0.0;
        }
        (self.scroll_top / scrollable).clamp(0.0, 1.0)
    }
}

pub struct App<F: Fetcher, S: Store> {
    config: SiteConfig,
    fetcher: F,
    store: S,
    state: AppState,
    index: Option<Arc<SearchIndex>>,
    debouncer: Debouncer<Vec<SearchHit>>,
    outcomes: UnboundedReceiver<Debounced<Vec<SearchHit>>>,
}

impl<F: Fetcher, S: Store> App<F, S> {
    pub fn new(config: SiteConfig, fetcher: F, store: S) -> Self {
        let (tx, outcomes) = mpsc::unbounded_channel();
        let debouncer = Debouncer::new(config.client.search_debounce(), tx);
        let state = AppState {
            language: config.languages.default.clone(),
            ..Default::default()
        };
        Self {
            config,
            fetcher,
            store,
            state,
            index: None,
            debouncer,
            outcomes,
        }
    }

    pub fn state(&self) -> &AppState {
        &self.state
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn config(&self) -> &SiteConfig {
        &self.config
    }

    pub fn search_index(&self) -> Option<&SearchIndex> {
        self.index.as_deref()
    }

    /// Full page HTML for the current state.
    pub fn render(&self) -> String {
        view::render_page(&self.state, self.config.client.recent_articles).into_string()
    }

    fn strings(&self) -> &'static UiStrings {
        UiStrings::for_language(&self.state.language)
    }

    /// Language settings from the manifest once loaded, else from config.
    fn languages(&self) -> &LanguageConfig {
        self.state
            .manifest
            .as_ref()
            .map(|m| &m.config)
            .unwrap_or(&self.config.languages)
    }

    fn versioned(&self, path: &str) -> String {
        with_cache_version(path, self.config.client.cache_version.as_deref())
    }

    fn persist(&mut self, key: &str, value: String) {
        if let Err(e) = self.store.set(key, value) {
            warn!(key, error = %e, "failed to persist client state");
        }
    }

    // ========================================================================
    // Startup and navigation
    // ========================================================================

    /// Load the manifest and saved preferences, then show `fragment`.
    pub async fn start(&mut self, fragment: &str) {
        self.state.theme = self.store.get(THEME_KEY).map(|t| Theme::parse(&t)).unwrap_or_default();
        self.state.categories = self
            .store
            .get(CATEGORY_STATE_KEY)
            .map(|json| CategoryState::from_json(&json))
            .unwrap_or_default();

        match self.fetch_manifest().await {
            Ok((manifest, fingerprint)) => {
                info!(
                    categories = manifest.categories.len(),
                    articles = manifest.article_count(),
                    "manifest loaded"
                );
                self.state.manifest = Some(manifest);
                self.state.fingerprint = Some(fingerprint);
            }
            Err(panel) => self.state.error = Some(panel),
        }

        let stored = self.store.get(LANGUAGE_KEY);
        self.state.language = match stored {
            Some(code) if self.languages().is_supported(&code) => code,
            _ => self.languages().default.clone(),
        };

        self.show(Route::parse(fragment)).await;
    }

    async fn fetch_manifest(&self) -> Result<(Manifest, String), ErrorPanel> {
        let path = self.versioned(&self.config.manifest_file);
        let failed = |message: String| ErrorPanel {
            title: self.strings().index_load_error.to_string(),
            path: path.clone(),
            message,
        };
        let text = self.fetcher.fetch(&path).await.map_err(|e| {
            warn!(error = %e, "failed to fetch manifest");
            failed(e.to_string())
        })?;
        let manifest = Manifest::from_json(&text).map_err(|e| {
            warn!(error = %e, "failed to parse manifest");
            failed(e.to_string())
        })?;
        Ok((manifest, manifest::fingerprint(text.as_bytes())))
    }

    /// React to a fragment change from the host.
    ///
    /// The fragment the app set itself comes back as an echo and is ignored.
    pub async fn navigate(&mut self, fragment: &str) {
        let route = Route::parse(fragment);
        if route == Route::parse(&self.state.fragment) {
            trace!(fragment, "ignoring fragment echo");
            return;
        }
        self.show(route).await;
    }

    async fn show(&mut self, route: Route) {
        match route {
            Route::Home => self.go_home(),
            Route::Category(name) => self.open_category(name),
            Route::Article { category, slug } => self.load_article(&slug, &category).await,
        }
    }

    fn go_home(&mut self) {
        self.state.view = View::Home;
        self.state.fragment = Route::Home.fragment();
    }

    fn open_category(&mut self, name: String) {
        self.state.fragment = Route::Category(name.clone()).fragment();
        self.state.view = View::Category(name);
    }

    // ========================================================================
    // Articles
    // ========================================================================

    /// Show an article. Requesting the one already shown is a no-op.
    pub async fn load_article(&mut self, slug: &str, category: &str) {
        let showing = matches!(self.state.article, ArticlePane::Loading { .. } | ArticlePane::Loaded(_))
            && self.state.article.target() == Some((category, slug));
        if showing {
            debug!(category, slug, "article already shown");
            self.state.fragment = Route::article(category, slug).fragment();
            self.state.view = View::Article {
                category: category.to_string(),
                slug: slug.to_string(),
            };
            return;
        }
        self.fetch_article(slug, category).await;
    }

    async fn fetch_article(&mut self, slug: &str, category: &str) {
        let route = Route::article(category, slug);
        self.state.fragment = route.fragment();
        self.state.view = View::Article {
            category: category.to_string(),
            slug: slug.to_string(),
        };
        self.state.article = ArticlePane::Loading {
            category: category.to_string(),
            slug: slug.to_string(),
        };

        let language = self.state.language.clone();
        let default = self.languages().default.clone();
        let dir = format!("{}/{}", self.config.articles_dir, category);
        let path = self.versioned(&format!(
            "{dir}/{}",
            naming::article_file_name(slug, &language, self.languages())
        ));

        let mut result = self.fetcher.fetch(&path).await.map(|text| (path.clone(), language.clone(), text));
        if let Err(e) = &result
            && e.is_unsuccessful_response()
            && language != default
        {
            let fallback = self.versioned(&format!("{dir}/{slug}.md"));
            debug!(%e, %fallback, "translation unavailable, using default language");
            result = self.fetcher.fetch(&fallback).await.map(|text| (fallback, default, text));
        }

        self.state.article = match result {
            Ok((path, language, text)) => {
                let doc = front_matter::parse_lenient(&text);
                let rendered = markdown::render(doc.body);
                let date = doc
                    .front_matter
                    .as_ref()
                    .and_then(|fm| fm.date)
                    .map(|d| d.format("%Y-%m-%d").to_string())
                    .or_else(|| self.manifest_date(category, slug, &language));
                let restore_scroll = self
                    .store
                    .get(&progress_key(category, slug))
                    .and_then(|v| v.parse::<f64>().ok())
                    .map(|f| f.clamp(0.0, 1.0))
                    .unwrap_or(0.0);
                ArticlePane::Loaded(Box::new(LoadedArticle {
                    category: category.to_string(),
                    slug: slug.to_string(),
                    language,
                    path,
                    front_matter: doc.front_matter,
                    date,
                    html: rendered.html,
                    toc: rendered.toc,
                    restore_scroll,
                }))
            }
            Err(e) => self.article_failed(category, slug, &e),
        };
    }

    /// Manifest date of the article in `language`, else of its primary.
    fn manifest_date(&self, category: &str, slug: &str, language: &str) -> Option<String> {
        let article = self.state.manifest.as_ref()?.find_article(category, slug)?;
        let entry = article.translations.get(language).unwrap_or(article);
        Some(entry.date.clone()).filter(|d| !d.is_empty())
    }

    fn article_failed(&self, category: &str, slug: &str, error: &FetchError) -> ArticlePane {
        warn!(category, slug, %error, "failed to load article");
        let path = match error {
            FetchError::Status { path, .. }
            | FetchError::Http { path, .. }
            | FetchError::Io { path, .. }
            | FetchError::InvalidUrl { path, .. } => path.clone(),
        };
        ArticlePane::Failed {
            category: category.to_string(),
            slug: slug.to_string(),
            error: ErrorPanel {
                title: self.strings().load_failed.to_string(),
                path,
                message: error.to_string(),
            },
        }
    }

    /// Record the reading position of the open article.
    pub fn on_scroll(&mut self, metrics: ScrollMetrics) {
        let ArticlePane::Loaded(article) = &self.state.article else {
            return;
        };
        let key = progress_key(&article.category, &article.slug);
        self.persist(&key, metrics.fraction().to_string());
    }

    async fn reload_open_article(&mut self) {
        if let View::Article { category, slug } = self.state.view.clone() {
            self.fetch_article(&slug, &category).await;
        }
    }

    // ========================================================================
    // Events
    // ========================================================================

    pub async fn dispatch(&mut self, event: UiEvent) {
        trace!(?event, "dispatch");
        match event {
            UiEvent::OpenArticle { category, slug } => self.load_article(&slug, &category).await,
            UiEvent::OpenCategory(name) => self.open_category(name),
            UiEvent::ToggleCategory(name) => {
                self.state.categories.toggle(&name);
                let json = self.state.categories.to_json();
                self.persist(CATEGORY_STATE_KEY, json);
            }
            UiEvent::SearchTag(tag) => self.search_tag(&tag).await,
            UiEvent::ToggleTheme => {
                self.state.theme = self.state.theme.toggled();
                self.persist(THEME_KEY, self.state.theme.as_str().to_string());
            }
            UiEvent::SetLanguage(code) => self.set_language(code).await,
            UiEvent::GoHome => self.go_home(),
            UiEvent::DismissError => {
                self.state.error = None;
                if matches!(self.state.article, ArticlePane::Failed { .. }) {
                    self.state.article = ArticlePane::Empty;
                }
            }
        }
    }

    async fn set_language(&mut self, code: String) {
        if !self.languages().is_supported(&code) {
            warn!(language = %code, "ignoring unsupported language");
            return;
        }
        if code == self.state.language {
            return;
        }
        self.state.language = code.clone();
        self.persist(LANGUAGE_KEY, code);
        self.reload_open_article().await;
    }

    // ========================================================================
    // Refresh
    // ========================================================================

    /// Re-fetch the manifest and apply it if it changed.
    ///
    /// Returns whether anything changed. Failures keep the current state.
    pub async fn refresh(&mut self) -> bool {
        let (manifest, fingerprint) = match self.fetch_manifest().await {
            Ok(loaded) => loaded,
            Err(panel) => {
                debug!(message = %panel.message, "refresh skipped");
                return false;
            }
        };
        if self.state.fingerprint.as_deref() == Some(fingerprint.as_str()) {
            trace!("manifest unchanged");
            return false;
        }
        info!(articles = manifest.article_count(), "manifest changed, refreshing");
        self.state.manifest = Some(manifest);
        self.state.fingerprint = Some(fingerprint);
        self.state.error = None;
        self.index = None;
        self.reload_open_article().await;
        true
    }

    // ========================================================================
    // Search
    // ========================================================================

    async fn ensure_index(&mut self) -> Option<Arc<SearchIndex>> {
        if let Some(index) = &self.index {
            return Some(Arc::clone(index));
        }
        let manifest = self.state.manifest.as_ref()?;
        let options = IndexOptions {
            articles_dir: self.config.articles_dir.clone(),
            batch_size: self.config.client.index_batch_size,
            cache_version: self.config.client.cache_version.clone(),
            limit: self.config.client.search_limit,
        };
        let index = Arc::new(SearchIndex::build(manifest, &self.fetcher, &options).await);
        self.index = Some(Arc::clone(&index));
        Some(index)
    }

    /// New search box text. The query runs after the debounce delay; collect
    /// its results with [`next_search_outcome`](Self::next_search_outcome).
    pub async fn on_search_input(&mut self, text: &str) {
        self.state.search.query = text.to_string();
        self.state.search.tag_filter = None;
        self.state.search.focused = None;

        if text.trim().is_empty() {
            self.clear_search();
            return;
        }

        self.state.search.status = SearchStatus::Searching;
        let Some(index) = self.ensure_index().await else {
            self.state.search.status = SearchStatus::Failed(self.strings().index_load_error.to_string());
            return;
        };
        let query = text.to_string();
        self.state.search.generation = self.debouncer.schedule(move || index.search(&query));
    }

    /// Wait for the next debounced result and apply it if still current.
    ///
    /// Returns whether the view changed; `false` for a superseded result.
    pub async fn next_search_outcome(&mut self) -> bool {
        match self.outcomes.recv().await {
            Some(outcome) => self.apply_search_outcome(outcome),
            None => false,
        }
    }

    fn apply_search_outcome(&mut self, outcome: Debounced<Vec<SearchHit>>) -> bool {
        if outcome.generation != self.state.search.generation {
            trace!(generation = outcome.generation, "discarding stale search result");
            return false;
        }
        self.state.search.results = outcome.value;
        self.state.search.focused = None;
        self.state.search.status = SearchStatus::Ready;
        true
    }

    fn clear_search(&mut self) {
        self.debouncer.cancel();
        self.state.search.clear();
        self.state.search.generation = self.debouncer.generation();
    }

    pub async fn on_search_key(&mut self, key: SearchKey) {
        match key {
            SearchKey::Escape => self.clear_search(),
            SearchKey::ArrowDown => self.state.search.focus_next(),
            SearchKey::ArrowUp => self.state.search.focus_prev(),
            SearchKey::Enter => {
                let Some(hit) = self.state.search.selected().cloned() else {
                    return;
                };
                self.clear_search();
                self.load_article(&hit.slug, &hit.category).await;
            }
        }
    }

    /// Show every article carrying `tag`, skipping the debounce.
    pub async fn search_tag(&mut self, tag: &str) {
        self.debouncer.cancel();
        self.state.search.generation = self.debouncer.generation();
        self.state.search.query.clear();
        self.state.search.focused = None;
        self.state.search.tag_filter = Some(tag.to_string());
        match self.ensure_index().await {
            Some(index) => {
                self.state.search.results = index.search_by_tag(tag);
                self.state.search.status = SearchStatus::Ready;
            }
            None => {
                self.state.search.results.clear();
                self.state.search.status = SearchStatus::Failed(self.strings().index_load_error.to_string());
            }
        }
    }
}
