//! Session state as seen by the key-value store, across sessions.

use super::fakes::{test_config, FakeWiki, PhraseTranslator};
use serde_json::json;
use std::sync::Arc;
use tempfile::TempDir;
use wikitrans::error::ApiError;
use wikitrans::store::{KeyValueStore, MemoryStore, SledStore};
use wikitrans::ArticleSession;

async fn fetch(session: &ArticleSession, wiki: &FakeWiki, title: &str) {
    session.set_input_title(title);
    session.fetch_article(wiki).await.unwrap();
}

#[tokio::test]
async fn test_key_layout_after_flush() {
    let store = Arc::new(MemoryStore::new());
    let session = ArticleSession::open(store.clone(), test_config())
        .await
        .unwrap();
    let wiki = FakeWiki::new();
    fetch(&session, &wiki, "Water").await;
    session
        .translate_block(&PhraseTranslator::new(), &wiki, "mwAQ")
        .await
        .unwrap();
    session.flush().await;

    assert_eq!(store.peek("lastActiveTitle"), Some(json!("Water")));
    let blocks = store.peek("Water:blocks").unwrap();
    assert_eq!(blocks.as_array().unwrap().len(), 3);
    assert_eq!(blocks[0]["id"], json!("mwAQ"));
    assert_eq!(blocks[0]["tagName"], json!("P"));
    assert_eq!(store.peek("Water:body-class"), Some(json!("mw-body-content")));
    assert!(store.peek("Water:translations").unwrap()["mwAQ"].is_string());
    assert_eq!(store.peek("Water:article-styles").unwrap().as_array().unwrap().len(), 2);
    assert!(store.peek("Water:reference-map").unwrap()["sea"].is_string());

    let saved = store.peek("savedArticlesList").unwrap();
    assert_eq!(saved[0]["id"], json!("Water"));
    assert_eq!(saved[0]["title"], json!("Water"));
    assert!(saved[0]["updatedAt"].is_string());
}

#[tokio::test]
async fn test_multi_word_titles_use_normalized_ids() {
    let store = Arc::new(MemoryStore::new());
    let session = ArticleSession::open(store.clone(), test_config())
        .await
        .unwrap();
    let wiki = FakeWiki::new();
    session.set_input_title("  Sea water ");
    session.fetch_article(&wiki).await.unwrap_err();
    session.flush().await;

    // The display title is stored trimmed; the id scopes the article keys
    assert_eq!(store.peek("lastActiveTitle"), Some(json!("Sea water")));
    assert_eq!(session.active_id().as_deref(), Some("Sea_water"));
}

#[tokio::test]
async fn test_reopen_restores_active_article() {
    let store: Arc<dyn KeyValueStore> = Arc::new(MemoryStore::new());
    let wiki = FakeWiki::new();
    {
        let session = ArticleSession::open(store.clone(), test_config())
            .await
            .unwrap();
        fetch(&session, &wiki, "Water").await;
        session
            .translate_block(&PhraseTranslator::new(), &wiki, "mwAQ")
            .await
            .unwrap();
        session.shutdown().await;
    }

    let reopened = ArticleSession::open(store, test_config()).await.unwrap();
    assert_eq!(reopened.active_title(), "Water");
    assert_eq!(reopened.input_title(), "Water");
    assert_eq!(reopened.state().blocks.get().len(), 3);
    assert!(reopened.state().is_translated("mwAQ"));
    assert_eq!(reopened.saved_articles().len(), 1);
}

#[tokio::test]
async fn test_switching_articles_keeps_each_articles_state() {
    let store = Arc::new(MemoryStore::new());
    let session = ArticleSession::open(store.clone(), test_config())
        .await
        .unwrap();
    let wiki = FakeWiki::new();
    let translator = PhraseTranslator::new();

    fetch(&session, &wiki, "Water").await;
    session.translate_block(&translator, &wiki, "mwAQ").await.unwrap();
    fetch(&session, &wiki, "Ice").await;
    session.translate_block(&translator, &wiki, "mwAQ").await.unwrap();
    session.flush().await;

    let water = store.peek("Water:translations").unwrap();
    let ice = store.peek("Ice:translations").unwrap();
    assert!(water["mwAQ"].as_str().unwrap().contains("水は"));
    assert_eq!(ice["mwAQ"], json!("<p id=\"mwAQ\">氷は浮く。</p>"));

    let order: Vec<String> = session.saved_articles().into_iter().map(|a| a.id).collect();
    assert_eq!(order, vec!["Ice", "Water"]);

    session.open_saved("Water").await.unwrap();
    assert_eq!(session.active_title(), "Water");
    assert!(session.state().translations.get()["mwAQ"].contains("水は"));
    session.translate_block(&translator, &wiki, "mwAg").await.unwrap();
    let order: Vec<String> = session.saved_articles().into_iter().map(|a| a.id).collect();
    assert_eq!(order, vec!["Water", "Ice"]);
}

#[tokio::test]
async fn test_open_unknown_article_fails() {
    let store: Arc<dyn KeyValueStore> = Arc::new(MemoryStore::new());
    let session = ArticleSession::open(store, test_config()).await.unwrap();
    let err = session.open_saved("Nowhere").await.unwrap_err();
    assert!(matches!(err, ApiError::ArticleNotFound(id) if id == "Nowhere"));
}

#[tokio::test]
async fn test_forget_removes_every_key() {
    let store = Arc::new(MemoryStore::new());
    let session = ArticleSession::open(store.clone(), test_config())
        .await
        .unwrap();
    let wiki = FakeWiki::new();
    fetch(&session, &wiki, "Ice").await;
    fetch(&session, &wiki, "Water").await;
    session
        .translate_block(&PhraseTranslator::new(), &wiki, "mwAQ")
        .await
        .unwrap();
    session.flush().await;
    assert!(store.peek("Water:blocks").is_some());

    session.forget_article("Water").await.unwrap();
    session.flush().await;

    for suffix in ["blocks", "translations", "body-class", "article-styles", "reference-map"] {
        assert_eq!(store.peek(&format!("Water:{}", suffix)), None, "{}", suffix);
    }
    assert!(store.peek("Ice:blocks").is_some());
    assert_eq!(session.active_title(), "");
    assert_eq!(session.active_id(), None);
    let ids: Vec<String> = session.saved_articles().into_iter().map(|a| a.id).collect();
    assert_eq!(ids, vec!["Ice"]);
    assert_eq!(store.peek("savedArticlesList").unwrap().as_array().unwrap().len(), 1);

    let err = session.forget_article("Water").await.unwrap_err();
    assert!(matches!(err, ApiError::ArticleNotFound(_)));
}

#[tokio::test]
async fn test_sled_store_round_trip() {
    let temp_dir = TempDir::new().unwrap();
    let store = Arc::new(SledStore::new(&temp_dir.path().join("store")).unwrap());
    let wiki = FakeWiki::new();
    {
        let session = ArticleSession::open(store.clone(), test_config())
            .await
            .unwrap();
        fetch(&session, &wiki, "Water").await;
        session.shutdown().await;
    }
    store.flush().await.unwrap();

    assert_eq!(
        store.get("lastActiveTitle").await.unwrap(),
        Some(json!("Water"))
    );
    let reopened = ArticleSession::open(store, test_config()).await.unwrap();
    assert_eq!(reopened.active_title(), "Water");
    assert_eq!(reopened.state().body_class.get(), "mw-body-content");
}
