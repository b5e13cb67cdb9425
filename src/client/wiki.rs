//! HTTP client for the encyclopedia's REST and action APIs.

use crate::client::{
    ArticleSerializer, ArticleSource, FetchedArticle, LinkDirection, LinkResolver, TitleSuggester,
};
use crate::config::WikiConfig;
use crate::error::ClientError;
use crate::types::encode_title;
use async_trait::async_trait;
use reqwest::header::USER_AGENT;
use reqwest::{Client, RequestBuilder, Response};
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, warn};

/// User agent for title suggestions when none is configured.
pub const FALLBACK_USER_AGENT: &str = "WikipediaTranslationHelper/1.0";

const SUGGEST_LIMIT: &str = "10";

/// Client for one source/target language pair.
pub struct WikiClient {
    http: Client,
    config: WikiConfig,
}

impl WikiClient {
    pub fn new(config: WikiConfig) -> Result<Self, ClientError> {
        let http = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| ClientError::Request(format!("Failed to create HTTP client: {}", e)))?;
        Ok(Self { http, config })
    }

    pub fn config(&self) -> &WikiConfig {
        &self.config
    }

    fn user_agent(&self) -> Result<&str, ClientError> {
        self.config.user_agent().ok_or_else(|| {
            ClientError::NotConfigured(
                "Encyclopedia user agent required (set wiki.user_agent or WIKITRANS__WIKI__USER_AGENT)"
                    .to_string(),
            )
        })
    }

    async fn send(&self, request: RequestBuilder) -> Result<Response, ClientError> {
        let response = request.send().await?;
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let body = response.text().await.unwrap_or_default();
        Err(ClientError::Status {
            status: status.as_u16(),
            message: if body.is_empty() {
                status.to_string()
            } else {
                body
            },
        })
    }
}

fn require(value: &str, what: &str) -> Result<(), ClientError> {
    if value.trim().is_empty() {
        return Err(ClientError::InvalidInput(format!("{} is required", what)));
    }
    Ok(())
}

/// First langlink title in an action API `query` response.
///
/// Missing pages (id `-1` or a `missing` marker) and pages without langlinks
/// yield `None`.
pub fn langlink_from_response(response: &Value) -> Option<String> {
    let pages = response.pointer("/query/pages")?.as_object()?;
    let (page_id, page) = pages.iter().next()?;
    if page_id == "-1" || page.get("missing").is_some() {
        return None;
    }
    page.get("langlinks")?
        .as_array()?
        .first()?
        .get("*")?
        .as_str()
        .filter(|title| !title.is_empty())
        .map(str::to_string)
}

/// Titles from an `opensearch` response (`[query, titles, descriptions, urls]`).
pub fn titles_from_opensearch(response: &Value) -> Vec<String> {
    response
        .get(1)
        .and_then(Value::as_array)
        .map(|titles| {
            titles
                .iter()
                .filter_map(Value::as_str)
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default()
}

#[async_trait]
impl ArticleSource for WikiClient {
    async fn fetch_article(&self, title: &str) -> Result<FetchedArticle, ClientError> {
        require(title, "Title")?;
        let user_agent = self.user_agent()?;
        let url = format!("{}/page/html/{}", self.config.rest_base(), encode_title(title));

        debug!(title = %title, "Fetching article markup");
        let response = self
            .send(self.http.get(&url).header(USER_AGENT, user_agent))
            .await?;
        let html = response.text().await?;
        Ok(FetchedArticle {
            title: title.to_string(),
            html,
        })
    }
}

#[async_trait]
impl ArticleSerializer for WikiClient {
    async fn serialize_article(&self, html: &str, title: &str) -> Result<String, ClientError> {
        require(html, "Markup")?;
        require(title, "Title")?;
        let user_agent = self.user_agent()?;
        let url = format!(
            "{}/transform/html/to/wikitext/{}",
            self.config.rest_base(),
            encode_title(title)
        );

        debug!(title = %title, bytes = html.len(), "Serializing article markup");
        let response = self
            .send(
                self.http
                    .post(&url)
                    .header(USER_AGENT, user_agent)
                    .json(&serde_json::json!({ "html": html })),
            )
            .await?;
        Ok(response.text().await?)
    }
}

#[async_trait]
impl LinkResolver for WikiClient {
    async fn lang_link(
        &self,
        title: &str,
        direction: LinkDirection,
    ) -> Result<Option<String>, ClientError> {
        require(title, "Title")?;
        let user_agent = self.user_agent()?;
        let (from, to) = match direction {
            LinkDirection::SourceToTarget => (&self.config.source_lang, &self.config.target_lang),
            LinkDirection::TargetToSource => (&self.config.target_lang, &self.config.source_lang),
        };

        let response = self
            .send(
                self.http
                    .get(self.config.action_api(from))
                    .header(USER_AGENT, user_agent)
                    .query(&[
                        ("action", "query"),
                        ("prop", "langlinks"),
                        ("titles", title),
                        ("lllang", to.as_str()),
                        ("format", "json"),
                    ]),
            )
            .await?;
        let body: Value = response
            .json()
            .await
            .map_err(|e| ClientError::UnexpectedResponse(e.to_string()))?;
        let found = langlink_from_response(&body);
        debug!(title = %title, from = %from, to = %to, found = ?found, "Langlink lookup");
        Ok(found)
    }
}

#[async_trait]
impl TitleSuggester for WikiClient {
    async fn suggest_titles(&self, query: &str) -> Vec<String> {
        if query.trim().is_empty() {
            return Vec::new();
        }
        let user_agent = self.config.user_agent().unwrap_or(FALLBACK_USER_AGENT);
        let request = self
            .http
            .get(self.config.action_api(&self.config.source_lang))
            .header(USER_AGENT, user_agent)
            .query(&[
                ("action", "opensearch"),
                ("format", "json"),
                ("search", query),
                ("limit", SUGGEST_LIMIT),
            ]);

        let body = match self.send(request).await {
            Ok(response) => response.json::<Value>().await,
            Err(e) => {
                warn!(query = %query, error = %e, "Title suggestion failed");
                return Vec::new();
            }
        };
        match body {
            Ok(body) => titles_from_opensearch(&body),
            Err(e) => {
                warn!(query = %query, error = %e, "Title suggestion returned an unreadable body");
                Vec::new()
            }
        }
    }
}
