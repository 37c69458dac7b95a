use clap::{Parser, Subcommand};
use simple_faq::client::fetch::{DirFetcher, FetchError, Fetcher, HttpFetcher, with_cache_version};
use simple_faq::client::refresh::RefreshTimer;
use simple_faq::client::storage::{FileStore, Store};
use simple_faq::client::{App, LANGUAGE_KEY};
use simple_faq::config::{self, SiteConfig};
use simple_faq::dates::DateLedger;
use simple_faq::history::GitClock;
use simple_faq::manifest::Manifest;
use simple_faq::search::{IndexOptions, SearchIndex};
use simple_faq::{output, scan};
use std::path::{Path, PathBuf};
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

fn version_string() -> &'static str {
    let describe = env!("SIMPLE_FAQ_DESCRIBE");
    if describe.is_empty() {
        env!("CARGO_PKG_VERSION")
    } else {
        // Leaked once at startup
        Box::leak(format!("{} ({describe})", env!("CARGO_PKG_VERSION")).into_boxed_str())
    }
}

#[derive(Parser)]
#[command(name = "simple-faq")]
#[command(about = "Static FAQ and documentation site builder and reader")]
#[command(long_about = "\
Static FAQ and documentation site builder and reader

Articles are markdown files with YAML front-matter, grouped into category
directories. 'index' writes the manifest the reader loads; 'render' and
'search' run the reader against a site directory or a deployed URL.

Site structure:

  site/
  ├── config.toml                  # Site config (optional)
  ├── articles.json                # Written by 'simple-faq index'
  └── articles/
      ├── FAQ/                     # Category
      │   ├── install.md           # Default language
      │   ├── install.en.md        # English translation
      │   └── reset-password.md
      └── Update-Notes/            # Shown as \"Update Notes\"
          └── v1.0.md

Front-matter:

  ---
  title: Installing the app        # Required
  date: 2024-03-01                 # Optional, seeds the first build
  description: First-time setup
  tags: [setup, install]
  ---

Run 'simple-faq gen-config' to generate a documented config.toml.")]
#[command(version = version_string())]
struct Cli {
    /// Site root holding config.toml and the articles directory
    #[arg(long, default_value = ".", global = true)]
    source: PathBuf,

    /// Manifest path (default: <source>/<manifest_file from config>)
    #[arg(long, global = true)]
    manifest: Option<PathBuf>,

    /// Directory or http(s):// base URL the reader fetches from (default: source)
    #[arg(long, global = true)]
    site: Option<String>,

    /// Reader state file (theme, language, reading progress)
    #[arg(long, default_value = ".simple-faq/state.json", global = true)]
    state: PathBuf,

    /// Reader language, saved for later runs
    #[arg(long, global = true)]
    language: Option<String>,

    /// Log at debug level (RUST_LOG overrides)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Scan articles and write the manifest
    Index,
    /// Scan articles without writing the manifest
    Check,
    /// Print a stock config.toml with all options documented
    GenConfig,
    /// Render the reader page for a fragment such as '#FAQ/install'
    Render {
        #[arg(default_value = "")]
        fragment: String,
        /// Keep running and re-print the page when the site changes
        #[arg(long)]
        watch: bool,
    },
    /// Search article titles, bodies, categories and tags
    Search {
        query: String,
        /// Treat the query as an exact tag
        #[arg(long, conflicts_with = "category")]
        tag: bool,
        /// Treat the query as an exact category name
        #[arg(long)]
        category: bool,
    },
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    initialize_tracing(cli.verbose);

    match &cli.command {
        Command::Index => {
            let config = config::load_config(&cli.source)?;
            let manifest_path = manifest_path(&cli, &config);
            let articles_root = cli.source.join(&config.articles_dir);
            let ledger = DateLedger::load(&manifest_path);
            let result = scan::build_index(&articles_root, &config, &ledger, &GitClock::new())?;
            result.manifest.save(&manifest_path)?;
            output::print_index_output(&result.manifest, &result.report, &articles_root);
            println!("==> Wrote {}", manifest_path.display());
        }
        Command::Check => {
            let config = config::load_config(&cli.source)?;
            let manifest_path = manifest_path(&cli, &config);
            let articles_root = cli.source.join(&config.articles_dir);
            println!("==> Checking {}", articles_root.display());
            let ledger = DateLedger::load(&manifest_path);
            let result = scan::build_index(&articles_root, &config, &ledger, &GitClock::new())?;
            output::print_index_output(&result.manifest, &result.report, &articles_root);
            if result.report.skipped.is_empty() && result.report.orphaned.is_empty() {
                println!("==> Articles are valid");
            }
        }
        Command::GenConfig => {
            print!("{}", config::stock_config_toml());
        }
        Command::Render { fragment, watch } => {
            let config = config::load_config(&cli.source)?;
            let fetcher = site_fetcher(&cli);
            let mut store = FileStore::open(&cli.state);
            if let Some(language) = &cli.language {
                store.set(LANGUAGE_KEY, language.clone())?;
            }
            runtime()?.block_on(render(config, fetcher, store, fragment, *watch));
        }
        Command::Search { query, tag, category } => {
            let config = config::load_config(&cli.source)?;
            let fetcher = site_fetcher(&cli);
            let hits = runtime()?.block_on(async {
                let path = with_cache_version(&config.manifest_file, config.client.cache_version.as_deref());
                let manifest = Manifest::from_json(&fetcher.fetch(&path).await?)?;
                let options = IndexOptions {
                    articles_dir: config.articles_dir.clone(),
                    batch_size: config.client.index_batch_size,
                    cache_version: config.client.cache_version.clone(),
                    limit: config.client.search_limit,
                };
                let index = SearchIndex::build(&manifest, &fetcher, &options).await;
                info!(stats = %index.stats(), "index ready");
                let hits = if *tag {
                    index.search_by_tag(query)
                } else if *category {
                    index.search_by_category(query)
                } else {
                    index.search(query)
                };
                Ok::<_, Box<dyn std::error::Error>>(hits)
            })?;
            output::print_search_results(&hits);
        }
    }

    Ok(())
}

/// Log to stderr; stdout carries command output.
fn initialize_tracing(verbose: bool) {
    let default = if verbose { "simple_faq=debug" } else { "simple_faq=warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn runtime() -> std::io::Result<tokio::runtime::Runtime> {
    tokio::runtime::Builder::new_current_thread().enable_all().build()
}

fn manifest_path(cli: &Cli, config: &SiteConfig) -> PathBuf {
    cli.manifest
        .clone()
        .unwrap_or_else(|| cli.source.join(&config.manifest_file))
}

async fn render<F: Fetcher>(config: SiteConfig, fetcher: F, store: FileStore, fragment: &str, watch: bool) {
    let period = config.client.refresh_interval();
    let mut app = App::new(config, fetcher, store);
    app.start(fragment).await;
    println!("{}", app.render());
    if !watch {
        return;
    }

    let (mut timer, _visibility) = RefreshTimer::new(period);
    loop {
        let trigger = timer.tick().await;
        debug!(?trigger, "checking for site changes");
        if app.refresh().await {
            println!("{}", app.render());
        }
    }
}

/// Where the reader fetches from: a local directory or a deployed site.
enum SiteFetcher {
    Dir(DirFetcher),
    Http(HttpFetcher),
}

impl Fetcher for SiteFetcher {
    async fn fetch(&self, path: &str) -> Result<String, FetchError> {
        match self {
            SiteFetcher::Dir(f) => f.fetch(path).await,
            SiteFetcher::Http(f) => f.fetch(path).await,
        }
    }
}

fn site_fetcher(cli: &Cli) -> SiteFetcher {
    match cli.site.as_deref() {
        Some(url) if url.starts_with("http://") || url.starts_with("https://") => {
            SiteFetcher::Http(HttpFetcher::new(url))
        }
        Some(dir) => SiteFetcher::Dir(DirFetcher::new(Path::new(dir))),
        None => SiteFetcher::Dir(DirFetcher::new(&cli.source)),
    }
}
