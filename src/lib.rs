//! # Simple FAQ
//!
//! A static FAQ and documentation site. Articles are markdown files with YAML
//! front-matter, grouped into category directories. There is no server-side
//! logic: the builder writes one JSON manifest, and the reading client fetches
//! that manifest plus individual article files.
//!
//! # Architecture
//!
//! ```text
//! articles/<category>/<slug>[.<lang>].md
//!        │
//!        ▼  scan (+ previous manifest for dates)
//! articles.json
//!        │
//!        ▼  client::App (fetch, route, render)
//! HTML views ◄── search::SearchIndex (built from fetched bodies)
//! ```
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`scan`] | Walks category directories and produces the manifest |
//! | [`front_matter`] | Strict and lenient YAML front-matter parsing |
//! | [`naming`] | `<slug>[.<lang>].md` filename convention |
//! | [`dates`] | Date continuity against the previous manifest |
//! | [`history`] | Last-modified signals from git or the filesystem |
//! | [`manifest`] | The `articles.json` data model |
//! | [`config`] | `config.toml` loading, merging and validation |
//! | [`search`] | Field-weighted full-text search over article bodies |
//! | [`client`] | Reading client: routing, article loading, state, views |
//! | [`i18n`] | Interface strings per language |
//! | [`output`] | CLI output formatting |
//!
//! # Design Decisions
//!
//! ## Dates Survive Rebuilds
//!
//! A fresh checkout gives every file the same modification time. The builder
//! therefore keys dates on `(category, slug, language)` in the previous
//! manifest. A known article keeps its `date`; only `lastModified` moves, and
//! only when the modification signal changes. The signal comes from the last
//! git commit touching the file, falling back to the filesystem.
//!
//! ## One Manifest, Lazy Bodies
//!
//! Navigation needs only the manifest. Article bodies are fetched when opened,
//! and the search index fetches them in bounded batches the first time the
//! user searches.
//!
//! ## Explicit State
//!
//! The client keeps everything it shows in [`client::state::AppState`], owned
//! by [`client::App`]. Views are Maud functions of that state, and interactive
//! elements describe their intent in `data-*` attributes.

pub mod client;
pub mod config;
pub mod dates;
pub mod front_matter;
pub mod history;
pub mod i18n;
pub mod manifest;
pub mod naming;
pub mod output;
pub mod scan;
pub mod search;

#[cfg(test)]
pub(crate) mod test_helpers;
