//! HTML views rendered with Maud.
//!
//! Every function takes the state it shows by reference and returns
//! [`Markup`]. Interactive elements carry `data-action` attributes (see
//! [`events`](super::events)) rather than handlers.

use super::state::{AppState, ArticlePane, CategoryState, ErrorPanel, LoadedArticle, SearchState, SearchStatus, View};
use crate::i18n::UiStrings;
use crate::manifest::{Article, Category, Manifest};
use maud::{DOCTYPE, Markup, PreEscaped, html};

// ============================================================================
// Page
// ============================================================================

/// The whole page for the current state.
pub fn render_page(state: &AppState, recent_articles: usize) -> Markup {
    let strings = UiStrings::for_language(&state.language);
    html! {
        (DOCTYPE)
        html lang=(state.language) data-theme=(state.theme.as_str()) {
            head {
                meta charset="UTF-8";
                meta name="viewport" content="width=device-width, initial-scale=1.0";
                title { (strings.site_title) }
            }
            body {
                (render_header(state, strings))
                @if let Some(error) = &state.error {
                    (render_error(error, strings))
                }
                div.layout {
                    @if let Some(manifest) = &state.manifest {
                        (render_sidebar(manifest, &state.categories, current_article(state), &state.language))
                    }
                    main.content {
                        @if !state.search.query.is_empty() || state.search.tag_filter.is_some() {
                            (render_search(&state.search, strings))
                        }
                        (render_main(state, recent_articles, strings))
                    }
                }
            }
        }
    }
}

fn current_article(state: &AppState) -> Option<(&str, &str)> {
    match &state.view {
        View::Article { category, slug } => Some((category, slug)),
        _ => None,
    }
}

fn render_header(state: &AppState, strings: &UiStrings) -> Markup {
    html! {
        header.site-header {
            a.site-title href="#" data-action="go-home" { (strings.site_title) }
            input.search-input type="search" placeholder=(strings.search_placeholder) value=(state.search.query);
            button.theme-toggle type="button" data-action="toggle-theme" { (state.theme.toggled().as_str()) }
            @if let Some(manifest) = &state.manifest {
                nav.language-select {
                    @for code in &manifest.config.supported {
                        @let current = *code == state.language;
                        button type="button" class=[current.then_some("current")]
                            data-action="set-language" data-lang=(code) {
                            (manifest.config.label(code))
                        }
                    }
                }
            }
        }
    }
}

fn render_main(state: &AppState, recent_articles: usize, strings: &UiStrings) -> Markup {
    let Some(manifest) = &state.manifest else {
        return html! {};
    };
    match &state.view {
        View::Home => render_home(manifest, recent_articles, &state.language),
        View::Category(name) => render_category(manifest, name, &state.language, strings),
        View::Article { .. } => render_article_pane(&state.article, strings),
    }
}

// ============================================================================
// Navigation
// ============================================================================

fn article_link(category: &Category, article: &Article, language: &str) -> Markup {
    let shown = article.variant(language);
    html! {
        a.article-link href={ "#" (category.name) "/" (article.slug) }
            data-action="open-article" data-category=(category.name) data-slug=(article.slug) {
            span.article-title { (shown.title) }
            span.article-date { (article.date) }
        }
    }
}

/// Home: one card per category with its most recent articles.
pub fn render_home(manifest: &Manifest, recent_articles: usize, language: &str) -> Markup {
    html! {
        section.home {
            @for category in &manifest.categories {
                div.category-card {
                    h2 {
                        a href={ "#" (category.name) } data-action="open-category" data-category=(category.name) {
                            (category.display_title())
                        }
                    }
                    ul {
                        @for article in category.articles.iter().take(recent_articles) {
                            li { (article_link(category, article, language)) }
                        }
                    }
                }
            }
        }
    }
}

/// Sidebar: every article, grouped by collapsible category.
pub fn render_sidebar(
    manifest: &Manifest,
    categories: &CategoryState,
    current: Option<(&str, &str)>,
    language: &str,
) -> Markup {
    html! {
        nav.sidebar {
            @for category in &manifest.categories {
                @let open = categories.is_open(&category.name);
                div.nav-category.collapsed[!open] {
                    button.nav-category-toggle type="button"
                        data-action="toggle-category" data-category=(category.name)
                        aria-expanded=(if open { "true" } else { "false" }) {
                        (category.display_title())
                    }
                    @if open {
                        ul {
                            @for article in &category.articles {
                                @let active = current == Some((category.name.as_str(), article.slug.as_str()));
                                li class=[active.then_some("active")] {
                                    (article_link(category, article, language))
                                }
                            }
                        }
                    }
                }
            }
        }
    }
}

/// Category listing: all articles with descriptions.
pub fn render_category(manifest: &Manifest, name: &str, language: &str, strings: &UiStrings) -> Markup {
    let Some(category) = manifest.find_category(name) else {
        return render_error(
            &ErrorPanel {
                title: strings.load_failed.to_string(),
                path: format!("#{name}"),
                message: format!("unknown category {name}"),
            },
            strings,
        );
    };
    html! {
        section.category-listing {
            (back_link(strings))
            h1 { (category.display_title()) }
            ul.article-list {
                @for article in &category.articles {
                    @let shown = article.variant(language);
                    li {
                        (article_link(category, article, language))
                        @if !shown.description.is_empty() {
                            p.article-description { (shown.description) }
                        }
                        (tag_list(&shown.tags))
                    }
                }
            }
        }
    }
}

fn back_link(strings: &UiStrings) -> Markup {
    html! {
        a.back-home href="#" data-action="go-home" { (strings.back_to_home) }
    }
}

fn tag_list(tags: &[String]) -> Markup {
    html! {
        @if !tags.is_empty() {
            ul.tags {
                @for tag in tags {
                    li { button.tag type="button" data-action="search-tag" data-tag=(tag) { (tag) } }
                }
            }
        }
    }
}

// ============================================================================
// Article
// ============================================================================

pub fn render_article_pane(pane: &ArticlePane, strings: &UiStrings) -> Markup {
    match pane {
        ArticlePane::Empty => html! {},
        ArticlePane::Loading { .. } => html! {
            div.article-loading { (strings.loading_article) }
        },
        ArticlePane::Failed { error, .. } => render_error(error, strings),
        ArticlePane::Loaded(article) => render_article(article, strings),
    }
}

fn render_article(article: &LoadedArticle, strings: &UiStrings) -> Markup {
    html! {
        article.article data-category=(article.category) data-slug=(article.slug)
            data-scroll=(article.restore_scroll.to_string()) {
            (back_link(strings))
            @if let Some(fm) = &article.front_matter {
                header.article-meta {
                    h1 { (fm.title) }
                    @if let Some(day) = &article.date {
                        time datetime=(day) { (day) }
                    }
                    (tag_list(&fm.tags))
                }
            }
            @if !article.toc.is_empty() {
                nav.toc {
                    h2 { (strings.table_of_contents) }
                    ul {
                        @for entry in &article.toc {
                            li class={ "toc-h" (entry.level) } {
                                a href={ "#" (article.category) "/" (article.slug) } data-anchor=(entry.anchor) {
                                    (entry.text)
                                }
                            }
                        }
                    }
                }
            }
            div.article-body { (PreEscaped(&article.html)) }
        }
    }
}

// ============================================================================
// Search and errors
// ============================================================================

pub fn render_search(search: &SearchState, strings: &UiStrings) -> Markup {
    html! {
        section.search-results {
            @match &search.status {
                SearchStatus::Searching => {
                    p.search-status { (strings.search_searching) }
                }
                SearchStatus::Failed(message) => {
                    p.search-status.error { (strings.index_load_error) ": " (message) }
                }
                SearchStatus::Idle | SearchStatus::Ready => {
                    @if search.results.is_empty() {
                        p.search-status { (strings.search_no_results) }
                    } @else {
                        ul {
                            @for (i, hit) in search.results.iter().enumerate() {
                                li class=[(search.focused == Some(i)).then_some("focused")] {
                                    a href=(hit.fragment()) data-action="open-article"
                                        data-category=(hit.category) data-slug=(hit.slug) {
                                        span.result-title { (hit.title) }
                                        span.result-category { (hit.category) }
                                    }
                                    (tag_list(&hit.tags))
                                }
                            }
                        }
                    }
                }
            }
        }
    }
}

pub fn render_error(error: &ErrorPanel, strings: &UiStrings) -> Markup {
    html! {
        div.error-panel role="alert" {
            h2 { (error.title) }
            p.error-path { code { (error.path) } }
            p.error-message { (strings.error_message) ": " (error.message) }
            button.dismiss type="button" data-action="dismiss-error" { (strings.dismiss) }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::state::Theme;
    use crate::test_helpers::fixture_manifest;

    fn state() -> AppState {
        AppState {
            manifest: Some(fixture_manifest()),
            language: "zh".into(),
            ..Default::default()
        }
    }

    #[test]
    fn home_limits_recent_articles() {
        let m = fixture_manifest();
        let html = render_home(&m, 1, "zh").into_string();
        assert!(html.contains("重置密码"));
        // install is older than reset-password in FAQ
        assert!(!html.contains("安装应用"));
    }

    #[test]
    fn links_carry_data_actions() {
        let html = render_home(&fixture_manifest(), 5, "zh").into_string();
        assert!(html.contains(r#"data-action="open-article" data-category="FAQ" data-slug="install""#));
        assert!(html.contains(r#"data-action="open-category" data-category="FAQ""#));
    }

    #[test]
    fn home_uses_translated_titles() {
        let html = render_home(&fixture_manifest(), 5, "en").into_string();
        assert!(html.contains("Installing the app"));
        // No English variant: primary title is kept
        assert!(html.contains("重置密码"));
    }

    #[test]
    fn sidebar_collapsed_category_hides_list() {
        let m = fixture_manifest();
        let mut cats = CategoryState::default();
        cats.toggle("FAQ");
        let html = render_sidebar(&m, &cats, None, "zh").into_string();
        assert!(html.contains(r#"class="nav-category collapsed""#));
        assert!(!html.contains("重置密码"));
        assert!(html.contains("快速开始"));
    }

    #[test]
    fn sidebar_marks_active_article() {
        let m = fixture_manifest();
        let html = render_sidebar(&m, &CategoryState::default(), Some(("FAQ", "install")), "zh").into_string();
        assert!(html.contains(r#"<li class="active">"#));
    }

    #[test]
    fn category_listing_shows_descriptions_and_tags() {
        let m = fixture_manifest();
        let html = render_category(&m, "FAQ", "zh", UiStrings::for_language("zh")).into_string();
        assert!(html.contains("第一次安装的步骤"));
        assert!(html.contains(r#"data-action="search-tag" data-tag="setup""#));
    }

    #[test]
    fn unknown_category_renders_error() {
        let m = fixture_manifest();
        let html = render_category(&m, "Nope", "en", UiStrings::for_language("en")).into_string();
        assert!(html.contains("error-panel"));
        assert!(html.contains("#Nope"));
    }

    #[test]
    fn loading_placeholder() {
        let pane = ArticlePane::Loading {
            category: "FAQ".into(),
            slug: "a".into(),
        };
        let html = render_article_pane(&pane, UiStrings::for_language("en")).into_string();
        assert!(html.contains("Loading document..."));
    }

    #[test]
    fn error_panel_escapes_and_is_dismissable() {
        let error = ErrorPanel {
            title: "Load Failed".into(),
            path: "articles/FAQ/<x>.md".into(),
            message: "HTTP 404".into(),
        };
        let html = render_error(&error, UiStrings::for_language("en")).into_string();
        assert!(html.contains("articles/FAQ/&lt;x&gt;.md"));
        assert!(html.contains(r#"data-action="dismiss-error""#));
        assert!(html.contains("Error message: HTTP 404"));
    }

    #[test]
    fn page_carries_theme_and_language() {
        let mut s = state();
        s.theme = Theme::Dark;
        let html = render_page(&s, 5).into_string();
        assert!(html.starts_with("<!DOCTYPE html>"));
        assert!(html.contains(r#"<html lang="zh" data-theme="dark">"#));
        assert!(html.contains(r#"data-action="set-language" data-lang="ja""#));
    }

    #[test]
    fn search_no_results_message() {
        let search = SearchState {
            query: "zzz".into(),
            status: SearchStatus::Ready,
            ..Default::default()
        };
        let html = render_search(&search, UiStrings::for_language("en")).into_string();
        assert!(html.contains("No results found"));
    }
}
