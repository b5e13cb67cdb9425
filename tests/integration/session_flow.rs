//! Fetch, translate, and serialize through one session.

use super::fakes::{test_config, FakeWiki, PhraseTranslator};
use std::sync::atomic::Ordering;
use std::sync::Arc;
use wikitrans::error::ApiError;
use wikitrans::store::{KeyValueStore, MemoryStore};
use wikitrans::{ArticleSession, RunOutcome, TranslateOutcome};

async fn open_session() -> ArticleSession {
    let store: Arc<dyn KeyValueStore> = Arc::new(MemoryStore::new());
    ArticleSession::open(store, test_config()).await.unwrap()
}

async fn fetch(session: &ArticleSession, wiki: &FakeWiki, title: &str) -> usize {
    session.set_input_title(title);
    match session.fetch_article(wiki).await.unwrap() {
        RunOutcome::Done(count) => count,
        other => panic!("fetch did not run: {:?}", other),
    }
}

#[tokio::test]
async fn test_fetch_segments_article_and_side_data() {
    let session = open_session().await;
    let wiki = FakeWiki::new();

    assert_eq!(fetch(&session, &wiki, "Water").await, 3);
    assert_eq!(session.active_title(), "Water");
    assert_eq!(session.active_id().as_deref(), Some("Water"));

    let state = session.state();
    let ids: Vec<String> = state.blocks.get().into_iter().map(|b| b.id).collect();
    assert_eq!(ids, vec!["mwAQ", "mwAg", "block-2"]);
    assert_eq!(state.body_class.get(), "mw-body-content");

    let styles = state.styles.get();
    assert_eq!(styles.len(), 2);
    assert!(styles[0].contains("https://en.wikipedia.org/w/load.php"));
    assert!(state.references.get().contains_key("sea"));
}

#[tokio::test]
async fn test_fetch_with_blank_title_is_skipped() {
    let session = open_session().await;
    let wiki = FakeWiki::new();
    session.set_input_title("   ");
    assert_eq!(
        session.fetch_article(&wiki).await.unwrap(),
        RunOutcome::Skipped
    );
    assert_eq!(wiki.fetches.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_fetch_failure_is_reported() {
    let session = open_session().await;
    let wiki = FakeWiki::new();
    session.set_input_title("Missing page");
    let err = session.fetch_article(&wiki).await.unwrap_err();
    assert!(matches!(err, ApiError::ClientError(_)));
    assert!(session.state().blocks.get().is_empty());
}

#[tokio::test]
async fn test_translate_resolves_official_link() {
    let session = open_session().await;
    let wiki = FakeWiki::new();
    let translator = PhraseTranslator::new();
    fetch(&session, &wiki, "Water").await;

    let outcome = session
        .translate_block(&translator, &wiki, "mwAQ")
        .await
        .unwrap();
    assert_eq!(outcome, TranslateOutcome::Translated);

    let translated = session.state().translations.get()["mwAQ"].clone();
    assert_eq!(
        translated,
        r#"<p id="mwAQ">水は<a rel="mw:WikiLink" href="./%E9%85%B8%E7%B4%A0" title="酸素">酸素</a>.</p>"#
    );
}

#[tokio::test]
async fn test_translate_falls_back_to_interlanguage_link_on_collision() {
    let session = open_session().await;
    let wiki = FakeWiki::new();
    let translator = PhraseTranslator::new();
    fetch(&session, &wiki, "Water").await;

    session
        .translate_block(&translator, &wiki, "mwAg")
        .await
        .unwrap();
    let translated = session.state().translations.get()["mwAg"].clone();

    assert!(translated.starts_with(r#"<p id="mwAg">海は<span typeof="mw:Transclusion""#));
    assert!(translated.contains(r#""wt":"Brine/塩水""#));
    assert!(translated.contains(r#""wt":"Ill""#));
    assert!(translated.contains(">Brine/塩水</span>"));
    // The reference survives the round trip untouched by the model
    assert!(translated.contains(r#"typeof="mw:Extension/ref""#));
    assert!(!translated.contains("⟨"));
}

#[tokio::test]
async fn test_translate_all_and_generate_wikitext() {
    let session = open_session().await;
    let wiki = FakeWiki::new();
    let translator = PhraseTranslator::new();
    fetch(&session, &wiki, "Water").await;

    let report = session.translate_all(&translator, &wiki).await;
    assert_eq!(report.translated, vec!["mwAQ", "mwAg"]);
    assert_eq!(report.bypassed, vec!["block-2"]);
    assert!(report.failed.is_empty());
    // The style block never reaches the model
    assert_eq!(translator.calls.load(Ordering::SeqCst), 2);

    let again = session.translate_all(&translator, &wiki).await;
    assert!(again.translated.is_empty());
    assert_eq!(translator.calls.load(Ordering::SeqCst), 2);

    let wikitext = match session.generate_wikitext(&wiki).await.unwrap() {
        RunOutcome::Done(wikitext) => wikitext,
        other => panic!("serializer did not run: {:?}", other),
    };
    assert!(wikitext.starts_with("= Water =\n<p id=\"mwAQ\">水は"));
    assert!(wikitext.ends_with("<style>.infobox{color:red}</style>"));
    assert_eq!(session.wikitext(), Some(wikitext));

    let calls = wiki.serialized.lock();
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].0, "Water");
}

#[tokio::test]
async fn test_generate_wikitext_without_blocks_is_skipped() {
    let session = open_session().await;
    let wiki = FakeWiki::new();
    assert_eq!(
        session.generate_wikitext(&wiki).await.unwrap(),
        RunOutcome::Skipped
    );
    assert!(wiki.serialized.lock().is_empty());
}

#[tokio::test]
async fn test_reset_translation_keeps_blocks() {
    let session = open_session().await;
    let wiki = FakeWiki::new();
    let translator = PhraseTranslator::new();
    fetch(&session, &wiki, "Water").await;
    session.translate_all(&translator, &wiki).await;

    session.reset_translation();
    assert!(session.state().translations.get().is_empty());
    assert_eq!(session.state().blocks.get().len(), 3);
    assert!(session.orchestrator().selection().is_none());
}

#[tokio::test]
async fn test_refetch_keeps_existing_translations() {
    let session = open_session().await;
    let wiki = FakeWiki::new();
    let translator = PhraseTranslator::new();
    fetch(&session, &wiki, "Water").await;
    session
        .translate_block(&translator, &wiki, "mwAQ")
        .await
        .unwrap();

    fetch(&session, &wiki, "Water").await;
    assert!(session.state().is_translated("mwAQ"));
    assert_eq!(session.wikitext(), None);
}
