//! Resource fetching for the reading client.
//!
//! The client never touches the network or disk directly; it asks a
//! [`Fetcher`] for a site-relative path such as `articles.json` or
//! `articles/FAQ/install.en.md`. [`HttpFetcher`] reads from a deployed site,
//! [`DirFetcher`] from a local site directory.
//!
//! Paths may carry a `?v=<version>` cache-busting query; see
//! [`with_cache_version`].

use percent_encoding::{AsciiSet, CONTROLS, utf8_percent_encode};
use std::path::PathBuf;
use thiserror::Error;
use tracing::trace;

#[derive(Error, Debug)]
pub enum FetchError {
    #[error("{path}: HTTP {status}")]
    Status { path: String, status: u16 },
    #[error("{path}: {source}")]
    Http {
        path: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("{path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("{path}: invalid base URL: {message}")]
    InvalidUrl { path: String, message: String },
}

impl FetchError {
    /// The server answered, just not successfully.
    ///
    /// Only these trigger the default-language fallback; transport errors
    /// would fail the same way on a second try.
    pub fn is_unsuccessful_response(&self) -> bool {
        matches!(self, Self::Status { .. })
    }
}

/// Source of site resources.
pub trait Fetcher: Send + Sync {
    /// Fetch the text body at a site-relative path.
    fn fetch(&self, path: &str) -> impl Future<Output = Result<String, FetchError>> + Send;
}

/// Append `?v=<version>` when a cache version is configured.
pub fn with_cache_version(path: &str, version: Option<&str>) -> String {
    match version {
        Some(v) if !v.is_empty() => format!("{path}?v={v}"),
        _ => path.to_string(),
    }
}

/// Drop any query string from a site-relative path.
fn strip_query(path: &str) -> &str {
    path.split_once('?').map(|(p, _)| p).unwrap_or(path)
}

/// Characters escaped inside a URL path segment.
const SEGMENT: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'#')
    .add(b'%')
    .add(b'<')
    .add(b'>')
    .add(b'?')
    .add(b'`')
    .add(b'{')
    .add(b'}');

/// Percent-encode each segment of a site-relative path, keeping the query.
pub fn encode_path(path: &str) -> String {
    let (path_part, query) = match path.split_once('?') {
        Some((p, q)) => (p, Some(q)),
        None => (path, None),
    };
    let encoded = path_part
        .split('/')
        .map(|segment| utf8_percent_encode(segment, SEGMENT).to_string())
        .collect::<Vec<_>>()
        .join("/");
    match query {
        Some(q) => format!("{encoded}?{q}"),
        None => encoded,
    }
}

/// Reads from a site served over HTTP.
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: reqwest::Client,
    base_url: String,
}

impl HttpFetcher {
    /// `base_url` is the site root, e.g. `https://docs.example.com/help/`.
    pub fn new(base_url: impl Into<String>) -> Self {
        let mut base_url = base_url.into();
        if !base_url.ends_with('/') {
            base_url.push('/');
        }
        Self {
            client: reqwest::Client::new(),
            base_url,
        }
    }

    pub fn url_for(&self, path: &str) -> Result<reqwest::Url, FetchError> {
        let joined = format!(
            "{}{}",
            self.base_url,
            encode_path(path.trim_start_matches('/'))
        );
        reqwest::Url::parse(&joined).map_err(|e| FetchError::InvalidUrl {
            path: path.to_string(),
            message: e.to_string(),
        })
    }
}

impl Fetcher for HttpFetcher {
    async fn fetch(&self, path: &str) -> Result<String, FetchError> {
        let url = self.url_for(path)?;
        trace!(%url, "fetching");
        let http = |source| FetchError::Http {
            path: path.to_string(),
            source,
        };
        let response = self.client.get(url).send().await.map_err(http)?;
        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                path: path.to_string(),
                status: status.as_u16(),
            });
        }
        response.text().await.map_err(http)
    }
}

/// Reads from a site directory on disk. A missing file is reported as an
/// HTTP 404, matching what a static file server would answer.
#[derive(Debug, Clone)]
pub struct DirFetcher {
    root: PathBuf,
}

impl DirFetcher {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

impl Fetcher for DirFetcher {
    async fn fetch(&self, path: &str) -> Result<String, FetchError> {
        let relative = strip_query(path).trim_start_matches('/');
        let full = self.root.join(relative);
        trace!(path = %full.display(), "reading");
        match tokio::fs::read_to_string(&full).await {
            Ok(text) => Ok(text),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Err(FetchError::Status {
                path: path.to_string(),
                status: 404,
            }),
            Err(source) => Err(FetchError::Io {
                path: path.to_string(),
                source,
            }),
        }
    }
}
