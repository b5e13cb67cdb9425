//! In-process stand-ins for the encyclopedia and the translation model.

use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use wikitrans::client::{
    ArticleSerializer, ArticleSource, FetchedArticle, LinkDirection, LinkResolver,
    TitleSuggester, Translator,
};
use wikitrans::config::AppConfig;
use wikitrans::error::ClientError;

pub const WATER_HTML: &str = r#"<!DOCTYPE html>
<html><head><link rel="stylesheet" href="/w/load.php?modules=site.styles"></head>
<body class="mw-body-content"><section data-mw-section-id="0"><p id="mwAQ">Water is made of <a rel="mw:WikiLink" href="./Oxygen" title="Oxygen">oxygen</a>.</p><p id="mwAg">Seas hold <a rel="mw:WikiLink" href="./Brine" title="Brine">brine</a><sup typeof="mw:Extension/ref" id="cite_ref-1" data-mw='{"name":"ref","attrs":{"name":"sea"}}'>[1]</sup>.</p><style>.infobox{color:red}</style></section></body></html>"#;

pub const ICE_HTML: &str = r#"<!DOCTYPE html>
<html><head></head><body><p id="mwAQ">Ice floats.</p></body></html>"#;

/// Test configuration with a short debounce.
pub fn test_config() -> AppConfig {
    let mut config = AppConfig::default();
    config.sync.debounce_ms = 20;
    config.wiki.source_lang = "en".to_string();
    config.wiki.target_lang = "ja".to_string();
    config
}

/// Serves canned articles and langlinks; records serializer input.
pub struct FakeWiki {
    articles: HashMap<String, String>,
    langlinks: HashMap<(String, LinkDirection), String>,
    pub fetches: AtomicUsize,
    pub serialized: Mutex<Vec<(String, String)>>,
}

impl FakeWiki {
    pub fn new() -> Self {
        let mut articles = HashMap::new();
        articles.insert("Water".to_string(), WATER_HTML.to_string());
        articles.insert("Ice".to_string(), ICE_HTML.to_string());

        let mut langlinks = HashMap::new();
        langlinks.insert(
            ("Oxygen".to_string(), LinkDirection::SourceToTarget),
            "酸素".to_string(),
        );
        // The proposed title for Brine already belongs to another article
        langlinks.insert(
            ("塩水".to_string(), LinkDirection::TargetToSource),
            "Saline water".to_string(),
        );
        Self {
            articles,
            langlinks,
            fetches: AtomicUsize::new(0),
            serialized: Mutex::new(Vec::new()),
        }
    }
}

#[async_trait]
impl ArticleSource for FakeWiki {
    async fn fetch_article(&self, title: &str) -> Result<FetchedArticle, ClientError> {
        self.fetches.fetch_add(1, Ordering::SeqCst);
        match self.articles.get(title) {
            Some(html) => Ok(FetchedArticle {
                title: title.to_string(),
                html: html.clone(),
            }),
            None => Err(ClientError::Status {
                status: 404,
                message: format!("{} not found", title),
            }),
        }
    }
}

#[async_trait]
impl LinkResolver for FakeWiki {
    async fn lang_link(
        &self,
        title: &str,
        direction: LinkDirection,
    ) -> Result<Option<String>, ClientError> {
        Ok(self.langlinks.get(&(title.to_string(), direction)).cloned())
    }
}

#[async_trait]
impl ArticleSerializer for FakeWiki {
    async fn serialize_article(&self, html: &str, title: &str) -> Result<String, ClientError> {
        self.serialized
            .lock()
            .push((title.to_string(), html.to_string()));
        Ok(format!("= {} =\n{}", title, html))
    }
}

#[async_trait]
impl TitleSuggester for FakeWiki {
    async fn suggest_titles(&self, query: &str) -> Vec<String> {
        let mut titles: Vec<String> = self
            .articles
            .keys()
            .filter(|title| title.starts_with(query))
            .cloned()
            .collect();
        titles.sort();
        titles
    }
}

/// Phrase-table translator that keeps placeholders intact.
pub struct PhraseTranslator {
    phrases: Vec<(&'static str, &'static str)>,
    pub calls: AtomicUsize,
}

impl PhraseTranslator {
    pub fn new() -> Self {
        Self {
            phrases: vec![
                ("Water is made of ", "水は"),
                ("ja=\"Oxygen\"", "ja=\"酸素\""),
                ("⟩oxygen⟨", "⟩酸素⟨"),
                ("Seas hold ", "海は"),
                ("ja=\"Brine\"", "ja=\"塩水\""),
                ("⟩brine⟨", "⟩塩水⟨"),
                ("Ice floats.", "氷は浮く。"),
            ],
            calls: AtomicUsize::new(0),
        }
    }
}

#[async_trait]
impl Translator for PhraseTranslator {
    async fn translate(&self, text: &str) -> Result<String, ClientError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let mut out = text.to_string();
        for (from, to) in &self.phrases {
            out = out.replace(from, to);
        }
        Ok(out)
    }
}
