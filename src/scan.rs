//! Article discovery and manifest generation.
//!
//! Scans the articles directory, parses each file's front-matter, resolves
//! its dates against the previous manifest, groups translations, and produces
//! the [`Manifest`] the client reads.
//!
//! ## Directory Structure
//!
//! ```text
//! articles/                        # Articles root
//! ├── FAQ/                         # Category (directory name is the key)
//! │   ├── install.md               # Primary article, default language
//! │   ├── install.en.md            # English translation of `install`
//! │   ├── install.ja.md            # Japanese translation of `install`
//! │   └── reset-password.md
//! ├── Update-Notes/                # Displayed as "Update Notes"
//! │   └── v1.0.md
//! └── .drafts/                     # Hidden, ignored
//! ```
//!
//! ## Rules
//!
//! - Only directories directly under the root are categories; loose files
//!   there are ignored, as is anything whose name starts with `.`.
//! - A file without a usable title is skipped with a warning. Siblings are
//!   unaffected.
//! - A translation needs a default-language file with the same slug. Without
//!   one the translation is dropped and reported as orphaned.
//! - Articles sort by `date`, newest first; equal dates keep filename order.
//! - Categories sort by configured weight, largest first, then by name.

use crate::config::SiteConfig;
use crate::dates::{DateDecision, DateLedger, DateStats};
use crate::front_matter;
use crate::history::ModificationClock;
use crate::manifest::{Article, Category, Manifest};
use crate::naming::{self, ParsedArticleName};
use chrono::{DateTime, Utc};
use rayon::prelude::*;
use std::cmp::Ordering;
use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, warn};
use walkdir::WalkDir;

#[derive(Error, Debug)]
pub enum ScanError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Directory walk error: {0}")]
    Walk(#[from] walkdir::Error),
    #[error("Articles root is not a directory: {0}")]
    NotADirectory(PathBuf),
}

/// Output of a scan: the manifest plus what happened along the way.
#[derive(Debug)]
pub struct ScanResult {
    pub manifest: Manifest,
    pub report: ScanReport,
}

#[derive(Debug, Default)]
pub struct ScanReport {
    /// Article files that made it into the manifest, primaries and translations.
    pub indexed: usize,
    /// Files left out, with the reason.
    pub skipped: Vec<SkippedFile>,
    /// Translations whose slug has no default-language file.
    pub orphaned: Vec<PathBuf>,
    pub dates: DateStats,
}

#[derive(Debug, Clone)]
pub struct SkippedFile {
    pub path: PathBuf,
    pub reason: String,
}

/// Scan `root` using the current time for files without a signal.
pub fn build_index(
    root: &Path,
    config: &SiteConfig,
    ledger: &DateLedger,
    clock: &dyn ModificationClock,
) -> Result<ScanResult, ScanError> {
    build_index_at(root, config, ledger, clock, Utc::now())
}

/// Scan `root` with an explicit "now".
pub fn build_index_at(
    root: &Path,
    config: &SiteConfig,
    ledger: &DateLedger,
    clock: &dyn ModificationClock,
    now: DateTime<Utc>,
) -> Result<ScanResult, ScanError> {
    if !root.is_dir() {
        return Err(ScanError::NotADirectory(root.to_path_buf()));
    }

    let mut report = ScanReport::default();
    let mut categories = Vec::new();

    for dir in collect_entries(root, EntryKind::Directory)? {
        let name = file_name(&dir);
        let files = collect_entries(&dir, EntryKind::Markdown)?;

        let outcomes: Vec<FileOutcome> = files
            .par_iter()
            .map(|path| parse_file(path, &name, config, ledger, clock, now))
            .collect();

        let articles = group_translations(outcomes, &mut report);
        categories.push(Category {
            title: naming::humanize_category(&name),
            name,
            articles,
        });
    }

    sort_categories(&mut categories, config);

    let manifest = Manifest {
        config: config.languages.clone(),
        category_weights: config.category_weights.clone(),
        categories,
    };
    Ok(ScanResult { manifest, report })
}

#[derive(Clone, Copy, PartialEq)]
enum EntryKind {
    Directory,
    Markdown,
}

/// Immediate children of `dir` of one kind, sorted by file name, hidden
/// entries excluded.
fn collect_entries(dir: &Path, kind: EntryKind) -> Result<Vec<PathBuf>, ScanError> {
    let mut entries = Vec::new();
    let walker = WalkDir::new(dir)
        .min_depth(1)
        .max_depth(1)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|e| !e.file_name().to_string_lossy().starts_with('.'));

    for entry in walker {
        let entry = entry?;
        let wanted = match kind {
            EntryKind::Directory => entry.file_type().is_dir(),
            EntryKind::Markdown => {
                entry.file_type().is_file()
                    && entry.file_name().to_string_lossy().ends_with(".md")
            }
        };
        if wanted {
            entries.push(entry.into_path());
        }
    }
    Ok(entries)
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_default()
}

struct ParsedFile {
    path: PathBuf,
    name: ParsedArticleName,
    article: Article,
    decision: DateDecision,
}

enum FileOutcome {
    Parsed(Box<ParsedFile>),
    Skipped(SkippedFile),
}

fn parse_file(
    path: &Path,
    category: &str,
    config: &SiteConfig,
    ledger: &DateLedger,
    clock: &dyn ModificationClock,
    now: DateTime<Utc>,
) -> FileOutcome {
    let skip = |reason: String| {
        warn!(path = %path.display(), %reason, "skipping article");
        FileOutcome::Skipped(SkippedFile {
            path: path.to_path_buf(),
            reason,
        })
    };

    let Some(name) = naming::parse_article_file(&file_name(path), &config.languages) else {
        return skip("not an article file name".to_string());
    };
    let content = match std::fs::read_to_string(path) {
        Ok(c) => c,
        Err(e) => return skip(e.to_string()),
    };
    let fm = match front_matter::parse(&content) {
        Ok((fm, _)) => fm,
        Err(e) => return skip(e.to_string()),
    };

    let signal = clock.modified_at(path);
    let (dates, decision) =
        ledger.resolve(category, &name.slug, &name.language, signal, fm.date, now);
    debug!(
        category,
        slug = %name.slug,
        language = %name.language,
        ?decision,
        date = %dates.date,
        last_modified = %dates.last_modified,
        "resolved article dates"
    );

    let article = Article {
        title: fm.title,
        date: dates.date,
        slug: name.slug.clone(),
        description: fm.description,
        tags: fm.tags,
        last_modified: dates.last_modified,
        language: name.language.clone(),
        translations: BTreeMap::new(),
    };
    FileOutcome::Parsed(Box::new(ParsedFile {
        path: path.to_path_buf(),
        name,
        article,
        decision,
    }))
}

/// Merge translations into their primaries and sort newest first.
fn group_translations(outcomes: Vec<FileOutcome>, report: &mut ScanReport) -> Vec<Article> {
    let mut primaries: Vec<Article> = Vec::new();
    let mut translations: Vec<ParsedFile> = Vec::new();

    for outcome in outcomes {
        match outcome {
            FileOutcome::Skipped(s) => report.skipped.push(s),
            FileOutcome::Parsed(parsed) => {
                report.dates.record(parsed.decision);
                if parsed.name.is_translation {
                    translations.push(*parsed);
                } else {
                    report.indexed += 1;
                    primaries.push(parsed.article);
                }
            }
        }
    }

    let positions: HashMap<String, usize> = primaries
        .iter()
        .enumerate()
        .map(|(i, a)| (a.slug.clone(), i))
        .collect();

    for t in translations {
        match positions.get(&t.name.slug) {
            Some(&i) => {
                report.indexed += 1;
                primaries[i]
                    .translations
                    .insert(t.name.language.clone(), t.article);
            }
            None => {
                warn!(
                    path = %t.path.display(),
                    slug = %t.name.slug,
                    "translation has no default-language article, dropping it"
                );
                report.orphaned.push(t.path);
            }
        }
    }

    // Stable: equal dates keep filename order
    primaries.sort_by(|a, b| b.date.cmp(&a.date));
    primaries
}

/// Weight descending, then accent- and case-folded name, then raw name.
fn sort_categories(categories: &mut [Category], config: &SiteConfig) {
    categories.sort_by(|a, b| {
        config
            .category_weight(&b.name)
            .cmp(&config.category_weight(&a.name))
            .then_with(|| compare_names(&a.name, &b.name))
    });
}

fn compare_names(a: &str, b: &str) -> Ordering {
    let fold = |s: &str| deunicode::deunicode(s).to_lowercase();
    fold(a).cmp(&fold(b)).then_with(|| a.cmp(b))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::history::FixedClock;
    use crate::test_helpers::*;
    use chrono::TimeZone;
    use pretty_assertions::assert_eq;
    use std::fs;
    use tempfile::TempDir;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 6, 1, 12, 0, 0).unwrap()
    }

    fn write_article(root: &Path, category: &str, file: &str, header: &str) {
        let dir = root.join(category);
        fs::create_dir_all(&dir).unwrap();
        fs::write(dir.join(file), format!("---\n{header}\n---\nBody of {file}\n")).unwrap();
    }

    fn scan_tmp(root: &Path, config: &SiteConfig) -> ScanResult {
        build_index_at(root, config, &DateLedger::empty(), &FixedClock::new(), now()).unwrap()
    }

    // =========================================================================
    // Fixture site
    // =========================================================================

    #[test]
    fn fixture_categories_ordered_by_weight() {
        let site = setup_fixtures();
        let result = scan_fixture_site(site.path());
        assert_eq!(
            category_names(&result.manifest),
            vec!["FAQ", "Update-Notes", "Guides", "Other"]
        );
    }

    #[test]
    fn fixture_skips_untitled_and_orphans() {
        let site = setup_fixtures();
        let result = scan_fixture_site(site.path());
        let faq = find_category(&result.manifest, "FAQ");
        assert!(faq.find_article("untitled").is_none());
        assert!(faq.find_article("only-english").is_none());
        assert_eq!(result.report.skipped.len(), 1);
        assert_eq!(result.report.orphaned.len(), 1);
    }

    #[test]
    fn fixture_translations_grouped() {
        let site = setup_fixtures();
        let result = scan_fixture_site(site.path());
        let install = find_article(&result.manifest, "FAQ", "install");
        assert_eq!(install.language, "zh");
        let langs: Vec<&str> = install.translations.keys().map(String::as_str).collect();
        assert_eq!(langs, vec!["en", "ja"]);
        assert_eq!(install.translations["en"].title, "Installing the app");
    }

    #[test]
    fn fixture_category_titles_humanized() {
        let site = setup_fixtures();
        let result = scan_fixture_site(site.path());
        assert_eq!(find_category(&result.manifest, "Update-Notes").title, "Update Notes");
    }

    // =========================================================================
    // Discovery
    // =========================================================================

    #[test]
    fn hidden_entries_and_loose_files_ignored() {
        let tmp = TempDir::new().unwrap();
        write_article(tmp.path(), "FAQ", "a.md", "title: A");
        write_article(tmp.path(), "FAQ", ".draft.md", "title: Draft");
        write_article(tmp.path(), ".hidden", "b.md", "title: B");
        fs::write(tmp.path().join("README.md"), "---\ntitle: R\n---\n").unwrap();
        fs::write(tmp.path().join("FAQ/notes.txt"), "not markdown").unwrap();

        let result = scan_tmp(tmp.path(), &SiteConfig::default());
        assert_eq!(category_names(&result.manifest), vec!["FAQ"]);
        assert_eq!(article_slugs(&result.manifest, "FAQ"), vec!["a"]);
    }

    #[test]
    fn empty_category_kept() {
        let tmp = TempDir::new().unwrap();
        fs::create_dir_all(tmp.path().join("Empty")).unwrap();
        let result = scan_tmp(tmp.path(), &SiteConfig::default());
        assert_eq!(category_names(&result.manifest), vec!["Empty"]);
        assert!(result.manifest.categories[0].articles.is_empty());
    }

    #[test]
    fn missing_root_is_error() {
        let tmp = TempDir::new().unwrap();
        let err = build_index(
            &tmp.path().join("nope"),
            &SiteConfig::default(),
            &DateLedger::empty(),
            &FixedClock::new(),
        )
        .unwrap_err();
        assert!(matches!(err, ScanError::NotADirectory(_)));
    }

    #[test]
    fn missing_title_skipped_run_succeeds() {
        let tmp = TempDir::new().unwrap();
        write_article(tmp.path(), "FAQ", "good.md", "title: Good");
        write_article(tmp.path(), "FAQ", "bad.md", "description: no title");
        fs::write(tmp.path().join("FAQ/plain.md"), "# no front-matter").unwrap();

        let result = scan_tmp(tmp.path(), &SiteConfig::default());
        assert_eq!(article_slugs(&result.manifest, "FAQ"), vec!["good"]);
        assert_eq!(result.report.skipped.len(), 2);
        assert_eq!(result.report.indexed, 1);
    }

    #[test]
    fn unsupported_suffix_is_its_own_article() {
        let tmp = TempDir::new().unwrap();
        write_article(tmp.path(), "FAQ", "a.md", "title: A\ndate: 2024-01-01");
        write_article(tmp.path(), "FAQ", "a.fr.md", "title: A fr\ndate: 2024-01-02");
        let result = scan_tmp(tmp.path(), &SiteConfig::default());
        assert_eq!(article_slugs(&result.manifest, "FAQ"), vec!["a.fr", "a"]);
        assert!(find_article(&result.manifest, "FAQ", "a").translations.is_empty());
    }

    #[test]
    fn translation_only_slug_dropped() {
        let tmp = TempDir::new().unwrap();
        write_article(tmp.path(), "FAQ", "lonely.en.md", "title: Lonely");
        let result = scan_tmp(tmp.path(), &SiteConfig::default());
        assert!(article_slugs(&result.manifest, "FAQ").is_empty());
        assert_eq!(result.report.orphaned, vec![tmp.path().join("FAQ/lonely.en.md")]);
    }

    // =========================================================================
    // Ordering
    // =========================================================================

    #[test]
    fn articles_sorted_by_date_desc_stable() {
        let tmp = TempDir::new().unwrap();
        write_article(tmp.path(), "FAQ", "a.md", "title: A\ndate: 2024-01-01");
        write_article(tmp.path(), "FAQ", "b.md", "title: B\ndate: 2024-03-01");
        write_article(tmp.path(), "FAQ", "c.md", "title: C\ndate: 2024-01-01");
        write_article(tmp.path(), "FAQ", "d.md", "title: D\ndate: 2024-02-01");

        let result = scan_tmp(tmp.path(), &SiteConfig::default());
        assert_eq!(article_slugs(&result.manifest, "FAQ"), vec!["b", "d", "a", "c"]);
    }

    #[test]
    fn categories_weight_then_alphabetical() {
        let tmp = TempDir::new().unwrap();
        for cat in ["D", "C", "B", "A"] {
            fs::create_dir_all(tmp.path().join(cat)).unwrap();
        }
        let mut config = SiteConfig::default();
        config.category_weights.insert("A".into(), 100);
        config.category_weights.insert("B".into(), 90);
        config.category_weights.insert("C".into(), 0);

        let result = scan_tmp(tmp.path(), &config);
        assert_eq!(category_names(&result.manifest), vec!["A", "B", "C", "D"]);
    }

    #[test]
    fn negative_weight_sorts_last() {
        let tmp = TempDir::new().unwrap();
        for cat in ["Other", "Zeta", "alpha"] {
            fs::create_dir_all(tmp.path().join(cat)).unwrap();
        }
        let mut config = SiteConfig::default();
        config.category_weights.insert("Other".into(), -1);

        let result = scan_tmp(tmp.path(), &config);
        assert_eq!(category_names(&result.manifest), vec!["alpha", "Zeta", "Other"]);
    }

    #[test]
    fn accented_names_fold_for_ordering() {
        assert_eq!(compare_names("Équipe", "Facturation"), Ordering::Less);
        assert_eq!(compare_names("apple", "Banana"), Ordering::Less);
    }

    // =========================================================================
    // Date continuity
    // =========================================================================

    #[test]
    fn rebuild_without_changes_is_identical() {
        let tmp = TempDir::new().unwrap();
        write_article(tmp.path(), "FAQ", "a.md", "title: A");
        write_article(tmp.path(), "FAQ", "a.en.md", "title: A en");
        let a = tmp.path().join("FAQ/a.md");
        let a_en = tmp.path().join("FAQ/a.en.md");
        let clock = FixedClock::new()
            .with(&a, Utc.with_ymd_and_hms(2024, 4, 1, 9, 0, 0).unwrap())
            .with(&a_en, Utc.with_ymd_and_hms(2024, 4, 2, 9, 0, 0).unwrap());
        let config = SiteConfig::default();

        let first = build_index_at(tmp.path(), &config, &DateLedger::empty(), &clock, now())
            .unwrap();
        let ledger = DateLedger::from_manifest(&first.manifest);
        let later = now() + chrono::Duration::days(30);
        let second = build_index_at(tmp.path(), &config, &ledger, &clock, later).unwrap();

        assert_eq!(first.manifest, second.manifest);
        assert_eq!(second.report.dates.unchanged, 2);
    }

    #[test]
    fn content_change_updates_last_modified_only() {
        let tmp = TempDir::new().unwrap();
        write_article(tmp.path(), "FAQ", "a.md", "title: A");
        let path = tmp.path().join("FAQ/a.md");
        let config = SiteConfig::default();

        let before = FixedClock::new().with(&path, Utc.with_ymd_and_hms(2024, 4, 1, 9, 0, 0).unwrap());
        let first = build_index_at(tmp.path(), &config, &DateLedger::empty(), &before, now())
            .unwrap();

        let after = FixedClock::new().with(&path, Utc.with_ymd_and_hms(2024, 8, 15, 9, 0, 0).unwrap());
        let ledger = DateLedger::from_manifest(&first.manifest);
        let second = build_index_at(tmp.path(), &config, &ledger, &after, now()).unwrap();

        let a = find_article(&second.manifest, "FAQ", "a");
        assert_eq!(a.date, "2024-04-01");
        assert_eq!(a.last_modified, "2024-08-15T09:00:00.000Z");
        assert_eq!(second.report.dates.changed, 1);
    }

    #[test]
    fn deleted_file_disappears_on_rebuild() {
        let tmp = TempDir::new().unwrap();
        write_article(tmp.path(), "FAQ", "a.md", "title: A");
        write_article(tmp.path(), "FAQ", "b.md", "title: B");
        let config = SiteConfig::default();
        let first = scan_tmp(tmp.path(), &config);

        fs::remove_file(tmp.path().join("FAQ/b.md")).unwrap();
        let ledger = DateLedger::from_manifest(&first.manifest);
        let second =
            build_index_at(tmp.path(), &config, &ledger, &FixedClock::new(), now()).unwrap();
        assert_eq!(article_slugs(&second.manifest, "FAQ"), vec!["a"]);
    }

    #[test]
    fn manifest_carries_language_config_and_weights() {
        let tmp = TempDir::new().unwrap();
        let mut config = SiteConfig::default();
        config.category_weights.insert("FAQ".into(), 5);
        let result = scan_tmp(tmp.path(), &config);
        assert_eq!(result.manifest.config, config.languages);
        assert_eq!(result.manifest.category_weights["FAQ"], 5);
    }
}
