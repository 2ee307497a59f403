// tests/providers_http.rs
//
// Wire-level tests for the HTTP clients against an in-process axum server
// bound to 127.0.0.1:0. Each test serves canned replies per path and
// inspects what the client actually sent.
//
// Covered:
// - feed fetch: browser User-Agent, XML Accept header, non-2xx as error
// - Gemini: path, API key header, safety settings, fallback on 5xx / bad body
// - KV REST: get/set paths, bearer token, error envelope as Err

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};

use axum::{
    extract::State,
    http::{HeaderMap, Method, StatusCode, Uri},
    response::{IntoResponse, Response},
    Router,
};
use serde_json::{json, Value};

use asd_news_digest::article::{article_id, EnrichedArticle};
use asd_news_digest::config::{AiConfig, KvConfig};
use asd_news_digest::enrich::{EnrichOutcome, Enricher, GeminiProvider, ModelEnricher, TextModel};
use asd_news_digest::ingest::fetch_all;
use asd_news_digest::ingest::providers::{HttpFeedProvider, BROWSER_USER_AGENT, FEED_ACCEPT};
use asd_news_digest::ingest::types::{FeedSource, SourceProvider};
use asd_news_digest::store::{ArticleStore, KvStore};

#[derive(Debug, Clone)]
struct Seen {
    method: Method,
    path: String,
    headers: HeaderMap,
    body: String,
}

/// Canned replies keyed by path; unknown paths get 404.
#[derive(Clone, Default)]
struct Upstream {
    replies: Arc<HashMap<String, (StatusCode, String)>>,
    seen: Arc<Mutex<Vec<Seen>>>,
}

impl Upstream {
    fn seen(&self) -> Vec<Seen> {
        self.seen.lock().expect("seen lock").clone()
    }
}

async fn record(
    State(up): State<Upstream>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    body: String,
) -> Response {
    let path = uri.path().to_string();
    up.seen.lock().expect("seen lock").push(Seen {
        method,
        path: path.clone(),
        headers,
        body,
    });
    match up.replies.get(&path) {
        Some((status, body)) => (*status, body.clone()).into_response(),
        None => StatusCode::NOT_FOUND.into_response(),
    }
}

/// Start a server for `replies`; returns its base URL and the recorder.
async fn serve(replies: &[(&str, StatusCode, String)]) -> (String, Upstream) {
    let up = Upstream {
        replies: Arc::new(
            replies
                .iter()
                .map(|(p, s, b)| (p.to_string(), (*s, b.clone())))
                .collect(),
        ),
        ..Upstream::default()
    };
    let app = Router::new().fallback(record).with_state(up.clone());
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind");
    let addr: SocketAddr = listener.local_addr().expect("addr");
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });
    (format!("http://{addr}"), up)
}

fn header<'a>(seen: &'a Seen, name: &str) -> &'a str {
    seen.headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
}

const FEED: &str = r#"<?xml version="1.0"?><rss version="2.0"><channel>
<item><title>Autism study</title><link>https://x.example/1</link>
<pubDate>Tue, 10 Jun 2025 08:00:00 GMT</pubDate></item>
</channel></rss>"#;

// ---- feeds ----

#[tokio::test]
async fn feed_fetch_sends_browser_identity() {
    let (base, up) = serve(&[("/feed", StatusCode::OK, FEED.to_string())]).await;
    let provider = HttpFeedProvider::new().expect("client");

    let body = provider
        .fetch_document(&FeedSource::new(format!("{base}/feed"), "X", true))
        .await
        .expect("fetch");
    assert_eq!(body, FEED);

    let seen = up.seen();
    assert_eq!(seen.len(), 1);
    assert_eq!(seen[0].method, Method::GET);
    assert_eq!(header(&seen[0], "user-agent"), BROWSER_USER_AGENT);
    assert_eq!(header(&seen[0], "accept"), FEED_ACCEPT);
}

#[tokio::test]
async fn feed_non_2xx_is_an_error() {
    let (base, _) = serve(&[("/broken", StatusCode::INTERNAL_SERVER_ERROR, "oops".into())]).await;
    let provider = HttpFeedProvider::new().expect("client");

    let err = provider
        .fetch_document(&FeedSource::new(format!("{base}/broken"), "X", true))
        .await
        .expect_err("500 must fail");
    assert!(err.to_string().contains("Status code 500"), "{err:#}");
}

#[tokio::test]
async fn failing_http_source_is_skipped_by_fetch_all() {
    let (base, _) = serve(&[("/feed", StatusCode::OK, FEED.to_string())]).await;
    let provider = HttpFeedProvider::new().expect("client");
    let sources = vec![
        FeedSource::new(format!("{base}/missing"), "Gone", true),
        FeedSource::new(format!("{base}/feed"), "Live", true),
    ];

    let all = fetch_all(&provider, &sources).await;
    assert_eq!(all.len(), 1);
    assert_eq!(all[0].source, "Live");
}

// ---- gemini ----

const GEMINI_PATH: &str = "/v1beta/models/gemini-test:generateContent";

fn gemini(base: &str) -> GeminiProvider {
    GeminiProvider::from_config(&AiConfig {
        api_key: Some("k-123".into()),
        model: "gemini-test".into(),
        endpoint: format!("{base}/v1beta"),
    })
    .expect("configured provider")
}

#[tokio::test]
async fn gemini_request_shape() {
    let reply = json!({
        "candidates": [{ "content": { "parts": [{ "text": "{\"titleJa\":" }, { "text": "\"X\"}" }] } }]
    });
    let (base, up) = serve(&[(GEMINI_PATH, StatusCode::OK, reply.to_string())]).await;

    let text = gemini(&base).generate("PROMPT BODY").await;
    assert_eq!(text.as_deref(), Some("{\"titleJa\":\"X\"}"));

    let seen = up.seen();
    assert_eq!(seen.len(), 1);
    assert_eq!(seen[0].method, Method::POST);
    assert_eq!(seen[0].path, GEMINI_PATH);
    assert_eq!(header(&seen[0], "x-goog-api-key"), "k-123");

    let sent: Value = serde_json::from_str(&seen[0].body).expect("json request");
    assert_eq!(sent["contents"][0]["parts"][0]["text"], "PROMPT BODY");
    let safety = sent["safetySettings"].as_array().expect("safetySettings");
    assert_eq!(safety.len(), 4);
    assert!(safety.iter().all(|s| s["threshold"] == "BLOCK_NONE"));
    assert!(safety
        .iter()
        .any(|s| s["category"] == "HARM_CATEGORY_DANGEROUS_CONTENT"));
}

#[tokio::test]
async fn gemini_server_error_gives_processing_fallback() {
    let (base, _) = serve(&[(GEMINI_PATH, StatusCode::INTERNAL_SERVER_ERROR, "{}".into())]).await;

    let r = ModelEnricher::new(gemini(&base))
        .analyze("Title", "Snippet", "Nature")
        .await;
    assert_eq!(r.outcome, EnrichOutcome::Fallback);
    assert!(r.summary.starts_with("TITLE: "));
}

#[tokio::test]
async fn gemini_undecodable_body_gives_processing_fallback() {
    let (base, _) = serve(&[(GEMINI_PATH, StatusCode::OK, "<html>proxy</html>".into())]).await;

    assert!(gemini(&base).generate("p").await.is_none());
    let r = ModelEnricher::new(gemini(&base))
        .analyze("Title", "", "Nature")
        .await;
    assert_eq!(r.outcome, EnrichOutcome::Fallback);
}

// ---- kv ----

fn kv(base: &str) -> KvStore {
    KvStore::new(KvConfig {
        url: base.to_string(),
        token: "tok".into(),
        key: "asd_news".into(),
    })
    .expect("kv client")
}

fn record_for(link: &str) -> EnrichedArticle {
    EnrichedArticle {
        id: article_id(link),
        title: "T".into(),
        link: link.into(),
        published_at: "Tue, 10 Jun 2025 08:00:00 GMT".into(),
        source: "S".into(),
        snippet: None,
        summary_text: "TITLE: T".into(),
        country: Some("US".into()),
        category: Some("研究".into()),
        reliability: Some("★★".into()),
        parent_meaning: Some("m".into()),
        today_action: Some("a".into()),
        fetched_at: "2025-06-10T09:00:00.000Z".into(),
    }
}

#[tokio::test]
async fn kv_set_then_get_with_bearer() {
    let items = vec![record_for("https://a.example/1")];
    let stored = serde_json::to_string(&items).expect("json");
    let (base, up) = serve(&[
        ("/set/asd_news", StatusCode::OK, json!({ "result": "OK" }).to_string()),
        ("/get/asd_news", StatusCode::OK, json!({ "result": stored }).to_string()),
    ])
    .await;
    let store = kv(&base);

    store.save(&items).await.expect("save");
    assert_eq!(store.load().await.expect("load"), items);

    let seen = up.seen();
    assert_eq!(seen.len(), 2);
    assert_eq!(seen[0].method, Method::POST);
    assert_eq!(seen[0].path, "/set/asd_news");
    assert_eq!(header(&seen[0], "authorization"), "Bearer tok");
    let body: Vec<EnrichedArticle> = serde_json::from_str(&seen[0].body).expect("set body");
    assert_eq!(body, items);

    assert_eq!(seen[1].method, Method::GET);
    assert_eq!(seen[1].path, "/get/asd_news");
    assert_eq!(header(&seen[1], "authorization"), "Bearer tok");
}

#[tokio::test]
async fn kv_missing_key_loads_empty() {
    let (base, _) = serve(&[("/get/asd_news", StatusCode::OK, json!({ "result": null }).to_string())]).await;
    assert!(kv(&base).load().await.expect("load").is_empty());
}

#[tokio::test]
async fn kv_error_envelope_is_err() {
    let denied = json!({ "error": "WRONGPASS invalid token" }).to_string();
    let (base, _) = serve(&[
        ("/get/asd_news", StatusCode::UNAUTHORIZED, denied.clone()),
        ("/set/asd_news", StatusCode::UNAUTHORIZED, denied),
    ])
    .await;
    let store = kv(&base);

    let err = store.load().await.expect_err("load must fail");
    assert!(format!("{err:#}").contains("WRONGPASS"));
    assert!(store.save(&[record_for("https://a.example/1")]).await.is_err());
}
