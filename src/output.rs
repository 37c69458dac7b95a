//! CLI output formatting.
//!
//! # Information-First Display
//!
//! Output is **information-centric, not file-centric**. Every article leads
//! with its positional index and title; the file it came from is secondary
//! context on an indented `Source:` line. Read top to bottom, the index output
//! is the site's table of contents.
//!
//! # Output Format
//!
//! ## Index
//!
//! ```text
//! Categories
//! 001 FAQ (2 articles)
//!     001 重置密码 [2024-04-12]
//!         Source: FAQ/reset-password.md
//!     002 安装应用 [2024-03-01]
//!         Source: FAQ/install.md
//!         Translations: en, ja
//!
//! Skipped
//!     FAQ/untitled.md: missing title
//!
//! Orphaned translations
//!     FAQ/only-english.en.md
//!
//! Dates: 8 new
//! Indexed 6 articles (2 translations) in 4 categories
//! ```
//!
//! ## Search
//!
//! ```text
//! 001 重置密码 (score 3)
//!     #FAQ/reset-password
//!     Tags: account, Security
//! ```
//!
//! # Architecture
//!
//! Each command has a `format_*` function (returns `Vec<String>`) for
//! testability and a `print_*` wrapper that writes to stdout. Format functions
//! are pure: no I/O, no side effects.

use crate::manifest::{Article, Manifest};
use crate::scan::ScanReport;
use crate::search::SearchHit;
use std::path::Path;

// ============================================================================
// Shared helpers
// ============================================================================

/// Format a 1-based positional index as 3-digit zero-padded.
fn format_index(pos: usize) -> String {
    format!("{:0>3}", pos)
}

/// Return indentation string: 4 spaces per depth level.
fn indent(depth: usize) -> String {
    "    ".repeat(depth)
}

/// Path relative to the articles root, with `/` separators.
fn display_path(path: &Path, root: &Path) -> String {
    let relative = path.strip_prefix(root).unwrap_or(path);
    relative
        .components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}

fn plural(n: usize, one: &str, many: &str) -> String {
    if n == 1 {
        format!("{n} {one}")
    } else {
        format!("{n} {many}")
    }
}

fn article_line(index: usize, article: &Article) -> String {
    if article.date.is_empty() {
        format!("{} {}", format_index(index), article.title)
    } else {
        format!("{} {} [{}]", format_index(index), article.title, article.date)
    }
}

// ============================================================================
// Index
// ============================================================================

/// Format the result of an index build.
pub fn format_index_output(manifest: &Manifest, report: &ScanReport, articles_root: &Path) -> Vec<String> {
    let mut lines = vec!["Categories".to_string()];

    for (i, category) in manifest.categories.iter().enumerate() {
        lines.push(format!(
            "{} {} ({})",
            format_index(i + 1),
            category.display_title(),
            plural(category.articles.len(), "article", "articles")
        ));
        for (j, article) in category.articles.iter().enumerate() {
            lines.push(format!("{}{}", indent(1), article_line(j + 1, article)));
            lines.push(format!("{}Source: {}/{}.md", indent(2), category.name, article.slug));
            if !article.translations.is_empty() {
                let languages: Vec<&str> = article.translations.keys().map(String::as_str).collect();
                lines.push(format!("{}Translations: {}", indent(2), languages.join(", ")));
            }
        }
    }

    if !report.skipped.is_empty() {
        lines.push(String::new());
        lines.push("Skipped".to_string());
        for skipped in &report.skipped {
            lines.push(format!(
                "{}{}: {}",
                indent(1),
                display_path(&skipped.path, articles_root),
                skipped.reason
            ));
        }
    }

    if !report.orphaned.is_empty() {
        lines.push(String::new());
        lines.push("Orphaned translations".to_string());
        for path in &report.orphaned {
            lines.push(format!("{}{}", indent(1), display_path(path, articles_root)));
        }
    }

    lines.push(String::new());
    lines.push(format!("Dates: {}", report.dates));
    lines.push(format!(
        "Indexed {} ({}) in {}",
        plural(manifest.article_count(), "article", "articles"),
        plural(manifest.translation_count(), "translation", "translations"),
        plural(manifest.categories.len(), "category", "categories"),
    ));

    lines
}

/// Print index output to stdout.
pub fn print_index_output(manifest: &Manifest, report: &ScanReport, articles_root: &Path) {
    for line in format_index_output(manifest, report, articles_root) {
        println!("{}", line);
    }
}

// ============================================================================
// Search
// ============================================================================

/// Format ranked search hits.
pub fn format_search_results(hits: &[SearchHit]) -> Vec<String> {
    if hits.is_empty() {
        return vec!["No results".to_string()];
    }
    let mut lines = Vec::new();
    for (i, hit) in hits.iter().enumerate() {
        lines.push(format!("{} {} (score {})", format_index(i + 1), hit.title, hit.score));
        lines.push(format!("{}{}", indent(1), hit.fragment()));
        if !hit.tags.is_empty() {
            lines.push(format!("{}Tags: {}", indent(1), hit.tags.join(", ")));
        }
    }
    lines
}

/// Print search results to stdout.
pub fn print_search_results(hits: &[SearchHit]) {
    for line in format_search_results(hits) {
        println!("{}", line);
    }
}

// ============================================================================
// Tests
// ============================================================================
