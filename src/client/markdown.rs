//! Markdown to HTML for the article view.
//!
//! Rendering is `pulldown-cmark` with two adjustments to the event stream:
//! every heading gets a stable `id`, and fenced code blocks with a language
//! syntect knows are replaced by class-based highlighted HTML (`<span
//! class="source rust">` and so on; the stylesheet owns the colors).
//!
//! `h2` and `h3` headings are collected into a table of contents.

use maud::{PreEscaped, html};
use pulldown_cmark::{CodeBlockKind, CowStr, Event, HeadingLevel, Options, Parser, Tag, TagEnd, html as md_html};
use std::collections::HashMap;
use std::sync::LazyLock;
use syntect::html::{ClassStyle, ClassedHTMLGenerator};
use syntect::parsing::SyntaxSet;
use syntect::util::LinesWithEndings;

static SYNTAXES: LazyLock<SyntaxSet> = LazyLock::new(SyntaxSet::load_defaults_newlines);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TocEntry {
    /// 2 or 3.
    pub level: u8,
    pub text: String,
    pub anchor: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedMarkdown {
    pub html: String,
    pub toc: Vec<TocEntry>,
}

fn options() -> Options {
    Options::ENABLE_TABLES | Options::ENABLE_STRIKETHROUGH | Options::ENABLE_TASKLISTS
}

/// Render a markdown body (front-matter already removed).
pub fn render(body: &str) -> RenderedMarkdown {
    let events: Vec<Event<'_>> = Parser::new_ext(body, options()).collect();

    let mut anchors = AnchorAllocator::default();
    let mut toc = Vec::new();
    let mut out: Vec<Event<'_>> = Vec::with_capacity(events.len());

    let mut iter = events.into_iter();
    while let Some(event) = iter.next() {
        match event {
            Event::Start(Tag::Heading {
                level,
                id: _,
                classes,
                attrs,
            }) => {
                // Buffer the heading's inline events to learn its text first
                let mut inner = Vec::new();
                let mut text = String::new();
                for e in iter.by_ref() {
                    if matches!(e, Event::End(TagEnd::Heading(_))) {
                        break;
                    }
                    if let Event::Text(t) | Event::Code(t) = &e {
                        text.push_str(t);
                    }
                    inner.push(e);
                }
                let anchor = anchors.allocate(&text);
                if matches!(level, HeadingLevel::H2 | HeadingLevel::H3) {
                    toc.push(TocEntry {
                        level: level as u8,
                        text: text.trim().to_string(),
                        anchor: anchor.clone(),
                    });
                }
                out.push(Event::Start(Tag::Heading {
                    level,
                    id: Some(CowStr::from(anchor)),
                    classes,
                    attrs,
                }));
                out.extend(inner);
                out.push(Event::End(TagEnd::Heading(level)));
            }
            Event::Start(Tag::CodeBlock(kind)) => {
                let mut code = String::new();
                for e in iter.by_ref() {
                    match e {
                        Event::End(TagEnd::CodeBlock) => break,
                        Event::Text(t) => code.push_str(&t),
                        _ => {}
                    }
                }
                let lang = match &kind {
                    CodeBlockKind::Fenced(info) => info.split_whitespace().next().unwrap_or(""),
                    CodeBlockKind::Indented => "",
                };
                out.push(Event::Html(CowStr::from(code_block_html(&code, lang))));
            }
            other => out.push(other),
        }
    }

    let mut html_out = String::new();
    md_html::push_html(&mut html_out, out.into_iter());
    RenderedMarkdown { html: html_out, toc }
}

/// Highlighted `<pre>` for known languages, escaped plain text otherwise.
pub fn code_block_html(code: &str, lang: &str) -> String {
    let highlighted = (!lang.is_empty())
        .then(|| SYNTAXES.find_syntax_by_token(lang))
        .flatten()
        .and_then(|syntax| {
            let mut generator =
                ClassedHTMLGenerator::new_with_class_style(syntax, &SYNTAXES, ClassStyle::Spaced);
            for line in LinesWithEndings::from(code) {
                generator
                    .parse_html_for_line_which_includes_newline(line)
                    .ok()?;
            }
            Some(generator.finalize())
        });

    let lang_class = (!lang.is_empty()).then(|| format!("language-{lang}"));
    let markup = match highlighted {
        Some(inner) => html! {
            pre.code.highlighted { code class=[lang_class] { (PreEscaped(inner)) } }
        },
        None => html! {
            pre.code { code class=[lang_class] { (code) } }
        },
    };
    let mut s = markup.into_string();
    s.push('\n');
    s
}

/// Heading ids, unique within one document.
///
/// The first use of a slug is bare; repeats get `-1`, `-2`, ...
#[derive(Default)]
struct AnchorAllocator {
    seen: HashMap<String, usize>,
}

impl AnchorAllocator {
    fn allocate(&mut self, text: &str) -> String {
        let mut base = slugify(text);
        if base.is_empty() {
            base = "section".to_string();
        }
        let count = self.seen.entry(base.clone()).or_insert(0);
        let anchor = if *count == 0 {
            base
        } else {
            format!("{base}-{count}")
        };
        *count += 1;
        anchor
    }
}

/// Lowercase, keep alphanumerics (any script), separators become `-`.
fn slugify(text: &str) -> String {
    let mut slug = String::new();
    for c in text.to_lowercase().chars() {
        if c.is_alphanumeric() {
            slug.push(c);
        } else if (c.is_whitespace() || c == '-' || c == '_') && !slug.ends_with('-') {
            slug.push('-');
        }
    }
    slug.trim_matches('-').to_string()
}
