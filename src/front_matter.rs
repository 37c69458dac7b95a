//! Typed front-matter parsing.
//!
//! An article starts with a YAML header fenced by `---` lines:
//!
//! ```text
//! ---
//! title: Installing the app
//! date: 2024-03-01
//! description: First steps
//! tags: [setup, install]
//! ---
//! # Body starts here
//! ```
//!
//! The header is deserialized with `serde_yaml` into [`FrontMatter`]. Only
//! `title` is required. `tags` takes a YAML list, or a single scalar which
//! becomes a one-element list. Keys this module doesn't know are ignored so
//! authors can keep editor-specific metadata in the header.

use chrono::NaiveDate;
use serde::Deserialize;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum FrontMatterError {
    #[error("no front-matter block (expected a leading `---` line and a closing `---` line)")]
    Missing,
    #[error("front-matter has no title")]
    MissingTitle,
    #[error("front-matter YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

/// Validated article metadata.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrontMatter {
    /// Non-empty, trimmed.
    pub title: String,
    /// Author-supplied creation date, when it is a valid `YYYY-MM-DD`.
    pub date: Option<NaiveDate>,
    pub description: String,
    /// Ordered, duplicates removed.
    pub tags: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct RawFrontMatter {
    title: Option<String>,
    date: Option<serde_yaml::Value>,
    description: Option<String>,
    tags: Option<TagsField>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum TagsField {
    List(Vec<String>),
    One(String),
}

impl TryFrom<RawFrontMatter> for FrontMatter {
    type Error = FrontMatterError;

    fn try_from(raw: RawFrontMatter) -> Result<Self, Self::Error> {
        let title = raw
            .title
            .map(|t| t.trim().to_string())
            .filter(|t| !t.is_empty())
            .ok_or(FrontMatterError::MissingTitle)?;

        let date = raw.date.as_ref().and_then(parse_date_value);

        let tags = match raw.tags {
            Some(TagsField::List(list)) => list,
            Some(TagsField::One(tag)) => vec![tag],
            None => Vec::new(),
        };

        Ok(FrontMatter {
            title,
            date,
            description: raw.description.unwrap_or_default().trim().to_string(),
            tags: dedup_tags(tags),
        })
    }
}

fn parse_date_value(value: &serde_yaml::Value) -> Option<NaiveDate> {
    let s = value.as_str()?;
    NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d").ok()
}

fn dedup_tags(tags: Vec<String>) -> Vec<String> {
    let mut out: Vec<String> = Vec::with_capacity(tags.len());
    for tag in tags {
        let tag = tag.trim().to_string();
        if !tag.is_empty() && !out.contains(&tag) {
            out.push(tag);
        }
    }
    out
}

/// Split a document into its raw YAML header and body.
///
/// Returns `None` when the text does not open with a `---` line or the
/// header is never closed.
pub fn split(text: &str) -> Option<(&str, &str)> {
    let text = text.strip_prefix('\u{feff}').unwrap_or(text);
    let (first, rest) = text.split_once('\n')?;
    if first.trim_end_matches('\r') != "---" {
        return None;
    }

    let mut offset = 0;
    for line in rest.split_inclusive('\n') {
        if line.trim_end_matches(['\r', '\n']) == "---" {
            let header = &rest[..offset];
            let body = &rest[offset + line.len()..];
            return Some((header, body));
        }
        offset += line.len();
    }
    None
}

/// Parse the front-matter of a document, returning the metadata and body.
pub fn parse(text: &str) -> Result<(FrontMatter, &str), FrontMatterError> {
    let (header, body) = split(text).ok_or(FrontMatterError::Missing)?;
    if header.trim().is_empty() {
        return Err(FrontMatterError::MissingTitle);
    }
    let raw: RawFrontMatter = serde_yaml::from_str(header)?;
    Ok((FrontMatter::try_from(raw)?, body))
}

/// A document as the reader sees it: optional metadata plus renderable body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Document<'a> {
    pub front_matter: Option<FrontMatter>,
    pub body: &'a str,
}

/// Lenient parse for display.
///
/// A well-formed header yields metadata. A closed but invalid header is
/// stripped and yields none. Text without a closed header is all body.
pub fn parse_lenient(text: &str) -> Document<'_> {
    match split(text) {
        Some((_, body)) => Document {
            front_matter: parse(text).ok().map(|(fm, _)| fm),
            body,
        },
        None => Document {
            front_matter: None,
            body: text,
        },
    }
}

/// Body text with any closed front-matter block removed.
pub fn strip(text: &str) -> &str {
    split(text).map(|(_, body)| body).unwrap_or(text)
}

#[cfg(test)]
mod tests {
    use super::*;

    const FULL: &str = "---\ntitle: Installing\ndate: 2024-03-01\ndescription: First steps\ntags: [setup, install]\n---\n# Body\n";

    #[test]
    fn parses_all_fields() {
        let (fm, body) = parse(FULL).unwrap();
        assert_eq!(fm.title, "Installing");
        assert_eq!(fm.date, NaiveDate::from_ymd_opt(2024, 3, 1));
        assert_eq!(fm.description, "First steps");
        assert_eq!(fm.tags, vec!["setup", "install"]);
        assert_eq!(body, "# Body\n");
    }

    #[test]
    fn optional_fields_default_empty() {
        let (fm, _) = parse("---\ntitle: Only a title\n---\nbody").unwrap();
        assert_eq!(fm.date, None);
        assert_eq!(fm.description, "");
        assert!(fm.tags.is_empty());
    }

    #[test]
    fn block_list_tags() {
        let (fm, _) = parse("---\ntitle: T\ntags:\n  - a\n  - b\n---\n").unwrap();
        assert_eq!(fm.tags, vec!["a", "b"]);
    }

    #[test]
    fn scalar_tag_is_single_tag() {
        // No comma sniffing: the whole scalar is one tag
        let (fm, _) = parse("---\ntitle: T\ntags: a, b\n---\n").unwrap();
        assert_eq!(fm.tags, vec!["a, b"]);
    }

    #[test]
    fn duplicate_tags_removed_in_order() {
        let (fm, _) = parse("---\ntitle: T\ntags: [b, a, b, ' a ']\n---\n").unwrap();
        assert_eq!(fm.tags, vec!["b", "a"]);
    }

    #[test]
    fn missing_title_is_error() {
        let err = parse("---\ndescription: no title here\n---\nbody").unwrap_err();
        assert!(matches!(err, FrontMatterError::MissingTitle));
    }

    #[test]
    fn blank_title_is_error() {
        let err = parse("---\ntitle: '   '\n---\nbody").unwrap_err();
        assert!(matches!(err, FrontMatterError::MissingTitle));
    }

    #[test]
    fn empty_header_is_missing_title() {
        let err = parse("---\n---\nbody").unwrap_err();
        assert!(matches!(err, FrontMatterError::MissingTitle));
    }

    #[test]
    fn no_block_is_missing() {
        assert!(matches!(
            parse("# Just markdown").unwrap_err(),
            FrontMatterError::Missing
        ));
    }

    #[test]
    fn unterminated_block_is_missing() {
        assert!(matches!(
            parse("---\ntitle: T\nbody without closing").unwrap_err(),
            FrontMatterError::Missing
        ));
    }

    #[test]
    fn malformed_yaml_is_error() {
        let err = parse("---\ntitle: [unclosed\n---\nbody").unwrap_err();
        assert!(matches!(err, FrontMatterError::Yaml(_)));
    }

    #[test]
    fn invalid_date_is_ignored() {
        let (fm, _) = parse("---\ntitle: T\ndate: last tuesday\n---\n").unwrap();
        assert_eq!(fm.date, None);
    }

    #[test]
    fn crlf_line_endings() {
        let (fm, body) = parse("---\r\ntitle: Windows\r\n---\r\nbody\r\n").unwrap();
        assert_eq!(fm.title, "Windows");
        assert_eq!(body, "body\r\n");
    }

    #[test]
    fn byte_order_mark_is_skipped() {
        let (fm, _) = parse("\u{feff}---\ntitle: BOM\n---\n").unwrap();
        assert_eq!(fm.title, "BOM");
    }

    #[test]
    fn unknown_keys_ignored() {
        let (fm, _) = parse("---\ntitle: T\nauthor: someone\n---\n").unwrap();
        assert_eq!(fm.title, "T");
    }

    #[test]
    fn dashes_inside_body_untouched() {
        let (_, body) = parse("---\ntitle: T\n---\nabove\n---\nbelow\n").unwrap();
        assert_eq!(body, "above\n---\nbelow\n");
    }

    // =========================================================================
    // Lenient parsing
    // =========================================================================

    #[test]
    fn lenient_valid_header() {
        let doc = parse_lenient(FULL);
        assert_eq!(doc.front_matter.unwrap().title, "Installing");
        assert_eq!(doc.body, "# Body\n");
    }

    #[test]
    fn lenient_bad_header_is_stripped() {
        let doc = parse_lenient("---\ntitle: [oops\n---\nvisible");
        assert!(doc.front_matter.is_none());
        assert_eq!(doc.body, "visible");
    }

    #[test]
    fn lenient_unterminated_renders_everything() {
        let text = "---\ntitle: T\nno end";
        let doc = parse_lenient(text);
        assert!(doc.front_matter.is_none());
        assert_eq!(doc.body, text);
    }

    #[test]
    fn strip_without_header_is_identity() {
        assert_eq!(strip("plain"), "plain");
        assert_eq!(strip("---\nx: 1\n---\nrest"), "rest");
    }
}
