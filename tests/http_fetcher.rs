//! `HttpFetcher` and the client against a real HTTP server.

use simple_faq::client::App;
use simple_faq::client::fetch::{FetchError, Fetcher, HttpFetcher};
use simple_faq::client::state::ArticlePane;
use simple_faq::client::storage::{MemoryStore, Store};
use simple_faq::config::SiteConfig;
use wiremock::{Mock, MockServer, ResponseTemplate, matchers};

fn base(server: &MockServer) -> String {
    format!("{}/help", server.uri())
}

#[tokio::test]
async fn fetches_text_under_base_path() {
    let server = MockServer::start().await;
    Mock::given(matchers::method("GET"))
        .and(matchers::path("/help/articles.json"))
        .respond_with(ResponseTemplate::new(200).set_body_string("{}"))
        .expect(1)
        .mount(&server)
        .await;

    let fetcher = HttpFetcher::new(base(&server));
    assert_eq!(fetcher.fetch("articles.json").await.unwrap(), "{}");
}

#[tokio::test]
async fn non_success_status_is_unsuccessful_response() {
    let server = MockServer::start().await;
    Mock::given(matchers::method("GET"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let err = HttpFetcher::new(base(&server))
        .fetch("articles/FAQ/a.en.md")
        .await
        .unwrap_err();
    assert!(err.is_unsuccessful_response());
    assert!(matches!(err, FetchError::Status { status: 404, .. }));
    assert_eq!(err.to_string(), "articles/FAQ/a.en.md: HTTP 404");
}

#[tokio::test]
async fn encodes_path_and_keeps_query() {
    let server = MockServer::start().await;
    Mock::given(matchers::method("GET"))
        .and(matchers::path("/help/articles/%E5%B8%B8%E8%A7%81%E9%97%AE%E9%A2%98/a%20b.md"))
        .and(matchers::query_param("v", "7"))
        .respond_with(ResponseTemplate::new(200).set_body_string("body"))
        .expect(1)
        .mount(&server)
        .await;

    let fetcher = HttpFetcher::new(base(&server));
    assert_eq!(
        fetcher.fetch("articles/常见问题/a b.md?v=7").await.unwrap(),
        "body"
    );
}

#[tokio::test]
async fn connection_failure_is_transport_error() {
    // Nothing listens on port 9 of localhost in test environments
    let err = HttpFetcher::new("http://127.0.0.1:9/")
        .fetch("articles.json")
        .await
        .unwrap_err();
    assert!(matches!(err, FetchError::Http { .. }));
    assert!(!err.is_unsuccessful_response());
}

#[tokio::test]
async fn client_falls_back_over_http() {
    let server = MockServer::start().await;
    let manifest = r#"{
        "config": {"default": "zh", "supported": ["zh", "en"], "labels": {}},
        "categoryWeights": {},
        "categories": [{"name": "FAQ", "articles": [{
            "title": "重置密码", "date": "2024-04-12", "slug": "reset",
            "description": "", "tags": [], "lastModified": "", "language": "zh"
        }]}]
    }"#;
    Mock::given(matchers::path("/help/articles.json"))
        .respond_with(ResponseTemplate::new(200).set_body_string(manifest))
        .mount(&server)
        .await;
    Mock::given(matchers::path("/help/articles/FAQ/reset.en.md"))
        .respond_with(ResponseTemplate::new(404))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(matchers::path("/help/articles/FAQ/reset.md"))
        .respond_with(ResponseTemplate::new(200).set_body_string("---\ntitle: 重置密码\n---\n点击。\n"))
        .expect(1)
        .mount(&server)
        .await;

    let mut store = MemoryStore::new();
    store.set("language", "en".to_string()).unwrap();
    let mut app = App::new(SiteConfig::default(), HttpFetcher::new(base(&server)), store);
    app.start("#FAQ/reset").await;

    match &app.state().article {
        ArticlePane::Loaded(article) => {
            assert_eq!(article.language, "zh");
            assert!(article.html.contains("点击。"));
        }
        other => panic!("expected a loaded article, got {other:?}"),
    }
}
