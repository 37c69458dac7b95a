//! Date continuity across index rebuilds.
//!
//! Every article carries two dates: `date`, the day it was first seen, and
//! `lastModified`, its most recent modification signal. Neither is stored in
//! the article file, so each build recovers them from the previous manifest.
//!
//! # Design
//!
//! The previous manifest is flattened into a [`DateLedger`] keyed by
//! `category/slug/language`. Translations get their own keys, so an English
//! edit never moves the Chinese article's `lastModified`.
//!
//! For each file the builder asks the ledger to [`resolve`](DateLedger::resolve)
//! its dates given the current signal:
//!
//! | Prior record | Signal | Outcome |
//! |---|---|---|
//! | none | any | **new**: `date` = signal day (or front-matter date), `lastModified` = signal |
//! | present | differs | **changed**: keep `date`, update `lastModified` |
//! | present | same | **unchanged**: copy both |
//! | present | unknown | **unchanged**: copy both |
//!
//! Signals are compared at millisecond precision, the precision they are
//! stored at, so a filesystem mtime with nanoseconds still matches its own
//! recorded value.
//!
//! ## Storage
//!
//! The ledger has no file of its own; it is rebuilt from `articles.json` at
//! the start of every run. A missing or unreadable manifest gives an empty
//! ledger and every article is treated as new.

use crate::history::{format_signal, parse_signal};
use crate::manifest::{Article, Manifest};
use chrono::{DateTime, NaiveDate, Utc};
use std::collections::HashMap;
use std::fmt;
use std::path::Path;
use tracing::debug;

/// Recorded dates for one article variant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DateRecord {
    pub date: String,
    pub last_modified: String,
}

/// How an article's dates were decided.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DateDecision {
    New,
    Changed,
    Unchanged,
}

/// Prior dates indexed by `category/slug/language`.
#[derive(Debug, Clone, Default)]
pub struct DateLedger {
    records: HashMap<String, DateRecord>,
}

fn ledger_key(category: &str, slug: &str, language: &str) -> String {
    format!("{category}/{slug}/{language}")
}

impl DateLedger {
    pub fn empty() -> Self {
        Self::default()
    }

    /// Flatten a manifest, including translations, into a ledger.
    pub fn from_manifest(manifest: &Manifest) -> Self {
        let mut records = HashMap::new();
        for category in &manifest.categories {
            for article in &category.articles {
                insert_article(&mut records, &category.name, article);
                for translation in article.translations.values() {
                    insert_article(&mut records, &category.name, translation);
                }
            }
        }
        Self { records }
    }

    /// Load from a previous manifest file. Returns an empty ledger if the
    /// file doesn't exist or can't be parsed.
    pub fn load(manifest_path: &Path) -> Self {
        match Manifest::load(manifest_path) {
            Ok(manifest) => {
                let ledger = Self::from_manifest(&manifest);
                debug!(
                    path = %manifest_path.display(),
                    records = ledger.len(),
                    "loaded previous manifest"
                );
                ledger
            }
            Err(e) => {
                debug!(
                    path = %manifest_path.display(),
                    error = %e,
                    "no usable previous manifest, starting with an empty ledger"
                );
                Self::empty()
            }
        }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn get(&self, category: &str, slug: &str, language: &str) -> Option<&DateRecord> {
        self.records.get(&ledger_key(category, slug, language))
    }

    /// Decide the dates of one article variant.
    ///
    /// `signal` is the file's current modification time, `seed` the
    /// front-matter date, and `now` stands in for a signal when a new file
    /// has none.
    pub fn resolve(
        &self,
        category: &str,
        slug: &str,
        language: &str,
        signal: Option<DateTime<Utc>>,
        seed: Option<NaiveDate>,
        now: DateTime<Utc>,
    ) -> (DateRecord, DateDecision) {
        let Some(prior) = self.get(category, slug, language) else {
            let at = signal.unwrap_or(now);
            let day = seed.unwrap_or_else(|| at.date_naive());
            let record = DateRecord {
                date: day.format("%Y-%m-%d").to_string(),
                last_modified: format_signal(at),
            };
            return (record, DateDecision::New);
        };

        match signal {
            Some(at) if !same_signal(&prior.last_modified, at) => (
                DateRecord {
                    date: prior.date.clone(),
                    last_modified: format_signal(at),
                },
                DateDecision::Changed,
            ),
            _ => (prior.clone(), DateDecision::Unchanged),
        }
    }
}

fn insert_article(records: &mut HashMap<String, DateRecord>, category: &str, article: &Article) {
    records.insert(
        ledger_key(category, &article.slug, &article.language),
        DateRecord {
            date: article.date.clone(),
            last_modified: article.last_modified.clone(),
        },
    );
}

fn same_signal(recorded: &str, at: DateTime<Utc>) -> bool {
    let current = format_signal(at);
    match parse_signal(recorded) {
        Some(prev) => format_signal(prev) == current,
        None => recorded == current,
    }
}

/// Summary of date decisions for a build run.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct DateStats {
    pub new: u32,
    pub changed: u32,
    pub unchanged: u32,
}

impl DateStats {
    pub fn record(&mut self, decision: DateDecision) {
        match decision {
            DateDecision::New => self.new += 1,
            DateDecision::Changed => self.changed += 1,
            DateDecision::Unchanged => self.unchanged += 1,
        }
    }

    pub fn total(&self) -> u32 {
        self.new + self.changed + self.unchanged
    }
}

impl fmt::Display for DateStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.changed > 0 || self.unchanged > 0 {
            write!(
                f,
                "{} new, {} changed, {} unchanged ({} total)",
                self.new,
                self.changed,
                self.unchanged,
                self.total()
            )
        } else {
            write!(f, "{} new", self.new)
        }
    }
}
