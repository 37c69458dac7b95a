//! Shared test utilities for the simple-faq test suite.
//!
//! Provides fixture setup, manifest lookups that panic with the available
//! names on a miss, and bulk extractors for ordering assertions.
//!
//! # Usage
//!
//! ```rust
//! use crate::test_helpers::*;
//!
//! let site = setup_fixtures();
//! let result = scan_fixture_site(site.path());
//!
//! let install = find_article(&result.manifest, "FAQ", "install");
//! assert_eq!(install.translations.len(), 2);
//! assert_eq!(category_names(&result.manifest)[0], "FAQ");
//! ```

use chrono::{DateTime, TimeZone, Utc};
use std::path::Path;
use tempfile::TempDir;

use crate::config;
use crate::dates::DateLedger;
use crate::history::FixedClock;
use crate::manifest::{Article, Category, Manifest};
use crate::scan::{self, ScanResult};

// =========================================================================
// Fixture setup
// =========================================================================

/// Copy `fixtures/site/` to a temp directory and return it.
///
/// Tests get an isolated copy they can mutate without affecting other tests
/// or the source fixtures.
pub fn setup_fixtures() -> TempDir {
    let tmp = TempDir::new().unwrap();
    let fixtures = Path::new(env!("CARGO_MANIFEST_DIR")).join("fixtures/site");
    copy_dir_recursive(&fixtures, tmp.path()).unwrap();
    tmp
}

fn copy_dir_recursive(src: &Path, dst: &Path) -> std::io::Result<()> {
    for entry in std::fs::read_dir(src)? {
        let entry = entry?;
        let src_path = entry.path();
        let dst_path = dst.join(entry.file_name());

        if src_path.is_dir() {
            std::fs::create_dir_all(&dst_path)?;
            copy_dir_recursive(&src_path, &dst_path)?;
        } else {
            std::fs::copy(&src_path, &dst_path)?;
        }
    }
    Ok(())
}

/// Fixed build time used by fixture scans.
pub fn fixture_now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap()
}

/// Scan a copied fixture site with its own config, an empty ledger and no
/// modification signals.
pub fn scan_fixture_site(site_root: &Path) -> ScanResult {
    let config = config::load_config(site_root).unwrap();
    scan::build_index_at(
        &site_root.join(&config.articles_dir),
        &config,
        &DateLedger::empty(),
        &FixedClock::new(),
        fixture_now(),
    )
    .unwrap()
}

/// The fixture site's manifest.
pub fn fixture_manifest() -> Manifest {
    let site = setup_fixtures();
    scan_fixture_site(site.path()).manifest
}

// =========================================================================
// Manifest lookups: panics with a clear message on miss
// =========================================================================

/// Find a category by directory name. Panics if not found.
pub fn find_category<'a>(manifest: &'a Manifest, name: &str) -> &'a Category {
    manifest.find_category(name).unwrap_or_else(|| {
        let names = category_names(manifest);
        panic!("category '{name}' not found. Available: {names:?}")
    })
}

/// Find a primary article by slug within a category. Panics if not found.
pub fn find_article<'a>(manifest: &'a Manifest, category: &str, slug: &str) -> &'a Article {
    let cat = find_category(manifest, category);
    cat.find_article(slug).unwrap_or_else(|| {
        let slugs: Vec<&str> = cat.articles.iter().map(|a| a.slug.as_str()).collect();
        panic!("article '{slug}' not found in category '{category}'. Available: {slugs:?}")
    })
}

// =========================================================================
// Bulk extractors
// =========================================================================

/// All category names in manifest order.
pub fn category_names(manifest: &Manifest) -> Vec<&str> {
    manifest.categories.iter().map(|c| c.name.as_str()).collect()
}

/// Article slugs of one category in manifest order. Panics if the category
/// is missing.
pub fn article_slugs<'a>(manifest: &'a Manifest, category: &str) -> Vec<&'a str> {
    find_category(manifest, category)
        .articles
        .iter()
        .map(|a| a.slug.as_str())
        .collect()
}
