//! Modification signals for article files.
//!
//! The builder decides whether an article changed by comparing its current
//! modification signal against the `lastModified` recorded in the previous
//! manifest. Version control is the preferred source because checkouts reset
//! filesystem times; the filesystem mtime covers untracked files and
//! machines without git.

use chrono::{DateTime, SecondsFormat, Utc};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::process::Command;

/// Source of per-file modification times.
pub trait ModificationClock: Sync {
    /// Last modification time of `path`, or `None` when nothing is known.
    fn modified_at(&self, path: &Path) -> Option<DateTime<Utc>>;
}

/// Filesystem modification time.
#[derive(Debug, Default, Clone, Copy)]
pub struct FsClock;

impl ModificationClock for FsClock {
    fn modified_at(&self, path: &Path) -> Option<DateTime<Utc>> {
        let modified = std::fs::metadata(path).ok()?.modified().ok()?;
        Some(DateTime::<Utc>::from(modified))
    }
}

/// Last commit time from `git log`, falling back to the filesystem.
#[derive(Debug, Default, Clone, Copy)]
pub struct GitClock {
    fallback: FsClock,
}

impl GitClock {
    pub fn new() -> Self {
        Self::default()
    }

    fn commit_time(path: &Path) -> Option<DateTime<Utc>> {
        let dir = path.parent()?;
        let file = path.file_name()?;
        let output = Command::new("git")
            .arg("log")
            .arg("-1")
            .arg("--format=%cI")
            .arg("--")
            .arg(file)
            .current_dir(dir)
            .output()
            .ok()?;
        if !output.status.success() {
            return None;
        }
        parse_signal(String::from_utf8_lossy(&output.stdout).trim())
    }
}

impl ModificationClock for GitClock {
    fn modified_at(&self, path: &Path) -> Option<DateTime<Utc>> {
        Self::commit_time(path).or_else(|| self.fallback.modified_at(path))
    }
}

/// Fixed per-path times, for tests and reproducible builds.
#[derive(Debug, Default, Clone)]
pub struct FixedClock {
    times: HashMap<PathBuf, DateTime<Utc>>,
}

impl FixedClock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, path: impl Into<PathBuf>, at: DateTime<Utc>) {
        self.times.insert(path.into(), at);
    }

    pub fn with(mut self, path: impl Into<PathBuf>, at: DateTime<Utc>) -> Self {
        self.set(path, at);
        self
    }
}

impl ModificationClock for FixedClock {
    fn modified_at(&self, path: &Path) -> Option<DateTime<Utc>> {
        self.times.get(path).copied()
    }
}

/// Canonical string form of a signal as stored in `lastModified`.
pub fn format_signal(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Parse an RFC 3339 timestamp in any offset into UTC.
///
/// Empty input (an untracked file's empty `git log`) is `None`.
pub fn parse_signal(s: &str) -> Option<DateTime<Utc>> {
    if s.is_empty() {
        return None;
    }
    DateTime::parse_from_rfc3339(s)
        .ok()
        .map(|dt| dt.with_timezone(&Utc))
}
