// tests/store_file.rs
//
// File-backed store on a temp dir.

use asd_news_digest::article::{article_id, EnrichedArticle};
use asd_news_digest::store::{ArticleStore, FileStore};
use tempfile::tempdir;

fn record(title: &str, link: &str) -> EnrichedArticle {
    EnrichedArticle {
        id: article_id(link),
        title: title.into(),
        link: link.into(),
        published_at: "Tue, 10 Jun 2025 08:00:00 GMT".into(),
        source: "Autism Speaks".into(),
        snippet: Some("snippet".into()),
        summary_text: "TITLE: 見出し\n- 要点".into(),
        country: Some("米国".into()),
        category: Some("研究".into()),
        reliability: Some("★★".into()),
        parent_meaning: Some("意味".into()),
        today_action: Some("行動".into()),
        fetched_at: "2025-06-10T09:00:00.000Z".into(),
    }
}

#[tokio::test]
async fn missing_file_loads_empty() {
    let dir = tempdir().expect("tempdir");
    let store = FileStore::new(dir.path().join("news.json"));
    assert!(store.load().await.expect("load").is_empty());
}

#[tokio::test]
async fn invalid_or_blank_content_loads_empty() {
    let dir = tempdir().expect("tempdir");
    let path = dir.path().join("news.json");

    std::fs::write(&path, "{ not json").expect("write");
    assert!(FileStore::new(&path).load().await.expect("load").is_empty());

    std::fs::write(&path, "   \n").expect("write");
    assert!(FileStore::new(&path).load().await.expect("load").is_empty());

    // valid JSON of the wrong shape
    std::fs::write(&path, r#"{"items": []}"#).expect("write");
    assert!(FileStore::new(&path).load().await.expect("load").is_empty());
}

#[tokio::test]
async fn save_creates_parent_dirs_and_overwrites() {
    let dir = tempdir().expect("tempdir");
    let path = dir.path().join("data").join("nested").join("news.json");
    let store = FileStore::new(&path);

    let first = vec![record("A", "https://a.example/1"), record("B", "https://a.example/2")];
    store.save(&first).await.expect("save");
    assert_eq!(store.load().await.expect("load"), first);

    let second = vec![record("C", "https://a.example/3")];
    store.save(&second).await.expect("save");
    assert_eq!(store.load().await.expect("load"), second);
    assert!(!path.with_extension("json.tmp").exists());
}

#[tokio::test]
async fn persisted_keys_match_the_document_format() {
    let dir = tempdir().expect("tempdir");
    let path = dir.path().join("news.json");
    FileStore::new(&path)
        .save(&[record("A", "https://a.example/1")])
        .await
        .expect("save");

    let raw = std::fs::read_to_string(&path).expect("read");
    let v: serde_json::Value = serde_json::from_str(&raw).expect("json");
    let obj = &v[0];
    for key in [
        "id",
        "title",
        "link",
        "pubDate",
        "source",
        "contentSnippet",
        "summary",
        "country",
        "category",
        "reliability",
        "parentMeaning",
        "todayAction",
        "fetchedAt",
    ] {
        assert!(obj.get(key).is_some(), "missing key {key}");
    }
}

#[tokio::test]
async fn older_records_without_enrichment_fields_still_load() {
    let dir = tempdir().expect("tempdir");
    let path = dir.path().join("news.json");
    std::fs::write(
        &path,
        r#"[{"id":"aHR0cHM6Ly9hLmV4YW1wbGUvMQ==","title":"A","link":"https://a.example/1",
            "pubDate":"Tue, 10 Jun 2025 08:00:00 GMT","source":"S","summary":"TITLE: A"}]"#,
    )
    .expect("write");

    let items = FileStore::new(&path).load().await.expect("load");
    assert_eq!(items.len(), 1);
    assert_eq!(items[0].id, article_id("https://a.example/1"));
    assert!(items[0].country.is_none());
}
