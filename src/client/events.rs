//! Delegated UI events.
//!
//! Rendered elements carry their intent in `data-*` attributes instead of
//! per-element handlers:
//!
//! ```html
//! <a href="#FAQ/install" data-action="open-article" data-category="FAQ" data-slug="install">
//! ```
//!
//! One listener on the container reads the attributes of the clicked element
//! and hands them to [`UiEvent::from_attributes`]; re-rendering a view never
//! needs to re-bind anything.

pub const ACTION: &str = "data-action";
pub const CATEGORY: &str = "data-category";
pub const SLUG: &str = "data-slug";
pub const TAG: &str = "data-tag";
pub const LANG: &str = "data-lang";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UiEvent {
    OpenArticle { category: String, slug: String },
    OpenCategory(String),
    ToggleCategory(String),
    SearchTag(String),
    ToggleTheme,
    SetLanguage(String),
    GoHome,
    DismissError,
}

impl UiEvent {
    /// Parse the `data-*` attributes of a clicked element.
    ///
    /// Returns `None` for elements without a known action or missing a
    /// required attribute.
    pub fn from_attributes<'a>(attrs: impl IntoIterator<Item = (&'a str, &'a str)>) -> Option<Self> {
        let mut action = None;
        let mut category = None;
        let mut slug = None;
        let mut tag = None;
        let mut lang = None;
        for (name, value) in attrs {
            match name {
                ACTION => action = Some(value),
                CATEGORY => category = Some(value.to_string()),
                SLUG => slug = Some(value.to_string()),
                TAG => tag = Some(value.to_string()),
                LANG => lang = Some(value.to_string()),
                _ => {}
            }
        }

        match action? {
            "open-article" => Some(UiEvent::OpenArticle {
                category: category?,
                slug: slug?,
            }),
            "open-category" => Some(UiEvent::OpenCategory(category?)),
            "toggle-category" => Some(UiEvent::ToggleCategory(category?)),
            "search-tag" => Some(UiEvent::SearchTag(tag?)),
            "toggle-theme" => Some(UiEvent::ToggleTheme),
            "set-language" => Some(UiEvent::SetLanguage(lang?)),
            "go-home" => Some(UiEvent::GoHome),
            "dismiss-error" => Some(UiEvent::DismissError),
            _ => None,
        }
    }
}

/// Keys the search box reacts to, by their `KeyboardEvent.key` names.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchKey {
    Escape,
    Enter,
    ArrowDown,
    ArrowUp,
}

impl SearchKey {
    pub fn parse(key: &str) -> Option<Self> {
        match key {
            "Escape" | "Esc" => Some(Self::Escape),
            "Enter" => Some(Self::Enter),
            "ArrowDown" | "Down" => Some(Self::ArrowDown),
            "ArrowUp" | "Up" => Some(Self::ArrowUp),
            _ => None,
        }
    }
}
