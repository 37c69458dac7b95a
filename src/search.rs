//! Client-side full-text search.
//!
//! The index covers four fields per article: `title`, `content`, `category`
//! and `tags`. Bodies are not in the manifest, so [`SearchIndex::build`]
//! fetches every article's default-language file, a batch at a time per
//! category.
//!
//! ## Tokenization
//!
//! Text is lowercased and split into words with `unicode-segmentation`.
//! Chinese, Japanese and Korean characters have no spaces between words, so
//! each of those characters is its own token. `安装应用` indexes as
//! `安 装 应 用`, and the query `安装` matches it.
//!
//! ## Matching and scoring
//!
//! A query token matches an indexed token that contains it, so `inst` finds
//! `install`. Each field is queried on its own and a document matches a
//! field only when every query token matches there. Per matching field a
//! document scores 2 for `title` and 1 for anything else; results are sorted
//! by total score and cut to the configured limit.

use crate::client::fetch::{Fetcher, with_cache_version};
use crate::front_matter;
use crate::manifest::Manifest;
use futures::future::join_all;
use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::fmt;
use tracing::{info, warn};
use unicode_segmentation::UnicodeSegmentation;

/// One indexed article.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchDocument {
    /// `category/slug`.
    pub id: String,
    pub title: String,
    /// Category directory name.
    pub category: String,
    pub category_title: String,
    pub tags: Vec<String>,
    pub date: String,
    pub slug: String,
    pub content: String,
}

/// A ranked search result without the indexed body.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchHit {
    pub id: String,
    pub title: String,
    pub category: String,
    pub slug: String,
    pub date: String,
    pub tags: Vec<String>,
    pub score: u32,
}

impl SearchHit {
    fn from_document(doc: &SearchDocument, score: u32) -> Self {
        Self {
            id: doc.id.clone(),
            title: doc.title.clone(),
            category: doc.category.clone(),
            slug: doc.slug.clone(),
            date: doc.date.clone(),
            tags: doc.tags.clone(),
            score,
        }
    }

    /// Fragment that opens this result.
    pub fn fragment(&self) -> String {
        format!("#{}/{}", self.category, self.slug)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Field {
    Title,
    Content,
    Category,
    Tags,
}

impl Field {
    const ALL: [Field; 4] = [Field::Title, Field::Content, Field::Category, Field::Tags];

    fn weight(self) -> u32 {
        match self {
            Field::Title => 2,
            _ => 1,
        }
    }

    fn text(self, doc: &SearchDocument) -> String {
        match self {
            Field::Title => doc.title.clone(),
            Field::Content => doc.content.clone(),
            Field::Category => doc.category_title.clone(),
            Field::Tags => doc.tags.join(" "),
        }
    }
}

/// Token → documents containing it, for one field.
#[derive(Debug, Default, Clone)]
struct FieldIndex {
    postings: BTreeMap<String, BTreeSet<usize>>,
}

impl FieldIndex {
    fn add(&mut self, doc: usize, text: &str) {
        for token in tokenize(text) {
            self.postings.entry(token).or_default().insert(doc);
        }
    }

    /// Documents in which every query token matches some indexed token.
    fn query(&self, tokens: &[String]) -> BTreeSet<usize> {
        let mut result: Option<BTreeSet<usize>> = None;
        for token in tokens {
            let matches: BTreeSet<usize> = self
                .postings
                .iter()
                .filter(|(indexed, _)| indexed.contains(token.as_str()))
                .flat_map(|(_, docs)| docs.iter().copied())
                .collect();
            result = Some(match result {
                None => matches,
                Some(prev) => prev.intersection(&matches).copied().collect(),
            });
            if result.as_ref().is_some_and(BTreeSet::is_empty) {
                break;
            }
        }
        result.unwrap_or_default()
    }
}

/// Settings for building an index from a manifest.
#[derive(Debug, Clone)]
pub struct IndexOptions {
    /// Site-relative articles root.
    pub articles_dir: String,
    /// Concurrent fetches per batch within a category.
    pub batch_size: usize,
    pub cache_version: Option<String>,
    /// Maximum ranked results.
    pub limit: usize,
}

impl Default for IndexOptions {
    fn default() -> Self {
        Self {
            articles_dir: "articles".to_string(),
            batch_size: 10,
            cache_version: None,
            limit: 10,
        }
    }
}

/// Outcome counts of an index build.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct IndexStats {
    pub indexed: u32,
    pub failed: u32,
}

impl fmt::Display for IndexStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.failed > 0 {
            write!(f, "{} indexed, {} failed", self.indexed, self.failed)
        } else {
            write!(f, "{} indexed", self.indexed)
        }
    }
}

#[derive(Debug, Clone)]
pub struct SearchIndex {
    documents: Vec<SearchDocument>,
    fields: [FieldIndex; 4],
    limit: usize,
    stats: IndexStats,
}

impl SearchIndex {
    /// Index documents that are already in memory.
    pub fn from_documents(documents: Vec<SearchDocument>, limit: usize) -> Self {
        let mut fields: [FieldIndex; 4] = Default::default();
        for (i, doc) in documents.iter().enumerate() {
            for (slot, field) in fields.iter_mut().zip(Field::ALL) {
                slot.add(i, &field.text(doc));
            }
        }
        let stats = IndexStats {
            indexed: documents.len() as u32,
            failed: 0,
        };
        Self {
            documents,
            fields,
            limit,
            stats,
        }
    }

    /// Fetch every primary article body and index it.
    ///
    /// A failed fetch skips that one article; it is counted in
    /// [`stats`](Self::stats) and logged.
    pub async fn build<F: Fetcher>(manifest: &Manifest, fetcher: &F, options: &IndexOptions) -> Self {
        let batch_size = options.batch_size.max(1);
        let mut documents = Vec::new();
        let mut failed = 0;

        for category in &manifest.categories {
            for batch in category.articles.chunks(batch_size) {
                let paths: Vec<String> = batch
                    .iter()
                    .map(|a| {
                        let path = format!("{}/{}/{}.md", options.articles_dir, category.name, a.slug);
                        with_cache_version(&path, options.cache_version.as_deref())
                    })
                    .collect();
                let bodies = join_all(paths.iter().map(|p| fetcher.fetch(p))).await;

                for (article, body) in batch.iter().zip(bodies) {
                    match body {
                        Ok(text) => documents.push(SearchDocument {
                            id: format!("{}/{}", category.name, article.slug),
                            title: article.title.clone(),
                            category: category.name.clone(),
                            category_title: category.display_title().to_string(),
                            tags: article.tags.clone(),
                            date: article.date.clone(),
                            slug: article.slug.clone(),
                            content: clean_body(&text),
                        }),
                        Err(e) => {
                            warn!(error = %e, "failed to load article for search index");
                            failed += 1;
                        }
                    }
                }
            }
        }

        let mut index = Self::from_documents(documents, options.limit);
        index.stats.failed = failed;
        info!(stats = %index.stats, "search index built");
        index
    }

    pub fn stats(&self) -> &IndexStats {
        &self.stats
    }

    pub fn len(&self) -> usize {
        self.documents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }

    /// Ranked multi-field search. Blank queries return nothing.
    pub fn search(&self, query: &str) -> Vec<SearchHit> {
        let tokens = tokenize(query);
        if tokens.is_empty() {
            return Vec::new();
        }

        // Insertion order is first-hit order; the sort below is stable on it
        let mut order: Vec<usize> = Vec::new();
        let mut scores: HashMap<usize, u32> = HashMap::new();
        for (slot, field) in self.fields.iter().zip(Field::ALL) {
            for doc in slot.query(&tokens) {
                let score = scores.entry(doc).or_insert_with(|| {
                    order.push(doc);
                    0
                });
                *score += field.weight();
            }
        }

        let mut ranked: Vec<(usize, u32)> = order.into_iter().map(|d| (d, scores[&d])).collect();
        ranked.sort_by(|a, b| b.1.cmp(&a.1));
        ranked
            .into_iter()
            .take(self.limit)
            .map(|(d, score)| SearchHit::from_document(&self.documents[d], score))
            .collect()
    }

    /// Articles carrying `tag`, compared case-insensitively.
    pub fn search_by_tag(&self, tag: &str) -> Vec<SearchHit> {
        let wanted = tag.trim().to_lowercase();
        if wanted.is_empty() {
            return Vec::new();
        }
        self.documents
            .iter()
            .filter(|d| d.tags.iter().any(|t| t.to_lowercase() == wanted))
            .map(|d| SearchHit::from_document(d, 0))
            .collect()
    }

    /// Articles in the category named `name`, compared case-insensitively.
    pub fn search_by_category(&self, name: &str) -> Vec<SearchHit> {
        let wanted = name.trim().to_lowercase();
        if wanted.is_empty() {
            return Vec::new();
        }
        self.documents
            .iter()
            .filter(|d| d.category.to_lowercase() == wanted)
            .map(|d| SearchHit::from_document(d, 0))
            .collect()
    }
}

/// Body text for indexing: front-matter and heading markers removed.
fn clean_body(text: &str) -> String {
    front_matter::strip(text).replace('#', "").trim().to_string()
}

/// Characters searched one at a time: CJK ideographs, kana and hangul.
fn is_cjk(ch: char) -> bool {
    matches!(ch,
        '\u{3040}'..='\u{30FF}'     // hiragana, katakana
        | '\u{31F0}'..='\u{31FF}'   // katakana phonetic extensions
        | '\u{3400}'..='\u{4DBF}'   // CJK extension A
        | '\u{4E00}'..='\u{9FFF}'   // CJK unified ideographs
        | '\u{F900}'..='\u{FAFF}'   // CJK compatibility ideographs
        | '\u{FF66}'..='\u{FF9F}'   // halfwidth katakana
        | '\u{1100}'..='\u{11FF}'   // hangul jamo
        | '\u{3130}'..='\u{318F}'   // hangul compatibility jamo
        | '\u{AC00}'..='\u{D7AF}'   // hangul syllables
        | '\u{20000}'..='\u{2EBEF}' // CJK extensions B through F
    )
}

/// Lowercased tokens of `text`, unique, in first-seen order.
pub fn tokenize(text: &str) -> Vec<String> {
    fn push(token: String, tokens: &mut Vec<String>) {
        if !token.is_empty() && !tokens.contains(&token) {
            tokens.push(token);
        }
    }

    let lower = text.to_lowercase();
    let mut tokens: Vec<String> = Vec::new();

    for word in lower.unicode_words() {
        let mut current = String::new();
        for ch in word.chars() {
            if is_cjk(ch) {
                push(std::mem::take(&mut current), &mut tokens);
                push(ch.to_string(), &mut tokens);
            } else if ch.is_alphanumeric() {
                current.push(ch);
            } else {
                push(std::mem::take(&mut current), &mut tokens);
            }
        }
        push(current, &mut tokens);
    }
    tokens
}
