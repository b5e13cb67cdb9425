//! Whole-article extraction: blocks plus the side data needed to render and
//! reassemble an article (styles, body class, citations).

use crate::markup::segmenter::segment;
use crate::markup::serialize::outer_html;
use crate::types::TranslationBlock;
use once_cell::sync::Lazy;
use regex::Regex;
use scraper::{ElementRef, Html};
use serde_json::Value;
use std::collections::BTreeMap;

/// Citation name or element id to citation markup.
pub type ReferenceMap = BTreeMap<String, String>;

static ATTR_ROOT_URL: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(href|src|url)(\s*=\s*)(["']?)/([^/])"#).expect("valid attribute URL pattern")
});

static CSS_ROOT_URL: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"url\((['"]?)/([^/])"#).expect("valid css URL pattern"));

/// Everything extracted from one fetched article.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParsedArticle {
    pub blocks: Vec<TranslationBlock>,
    pub styles: Vec<String>,
    pub body_class: String,
    pub references: ReferenceMap,
}

/// Parse a full article document.
///
/// `wiki_origin` is the absolute origin (`https://en.wikipedia.org`) that
/// root-relative URLs in style fragments are rewritten against.
pub fn parse_article(markup: &str, wiki_origin: &str) -> ParsedArticle {
    let document = Html::parse_document(markup);
    let root = document.root_element();
    let body = find_element(root, "body");

    let blocks = body.map(segment).unwrap_or_default();
    let body_class = body
        .and_then(|b| b.value().attr("class"))
        .unwrap_or_default()
        .to_string();

    let mut styles = Vec::new();
    let mut references = ReferenceMap::new();
    for element in root.descendants().filter_map(ElementRef::wrap) {
        if is_style_element(element) {
            styles.push(absolutize_urls(&outer_html(element), wiki_origin));
        }
        if let Some(name) = reference_name(element) {
            references.insert(name, outer_html(element));
        }
    }

    ParsedArticle {
        blocks,
        styles,
        body_class,
        references,
    }
}

fn find_element<'a>(root: ElementRef<'a>, name: &str) -> Option<ElementRef<'a>> {
    root.descendants()
        .filter_map(ElementRef::wrap)
        .find(|element| element.value().name() == name)
}

fn is_style_element(element: ElementRef<'_>) -> bool {
    let value = element.value();
    match value.name() {
        "style" => true,
        "link" => value
            .attr("rel")
            .map(|rel| {
                rel.split_ascii_whitespace()
                    .any(|token| token.eq_ignore_ascii_case("stylesheet"))
            })
            .unwrap_or(false),
        _ => false,
    }
}

/// Key of a citation element, from `data-mw` `attrs.name` or the element id.
fn reference_name(element: ElementRef<'_>) -> Option<String> {
    let value = element.value();
    let typeof_attr = value.attr("typeof")?;
    if !typeof_attr
        .split_ascii_whitespace()
        .any(|t| t == "mw:Extension/ref")
    {
        return None;
    }
    let from_data = value
        .attr("data-mw")
        .and_then(|raw| serde_json::from_str::<Value>(raw).ok())
        .and_then(|data| {
            data.pointer("/attrs/name")
                .and_then(Value::as_str)
                .map(str::to_string)
        })
        .filter(|name| !name.is_empty());
    from_data.or_else(|| value.id().map(str::to_string))
}

/// Rewrite root-relative URLs in a style fragment to absolute ones.
///
/// Protocol-relative URLs (`//host/...`) are left alone.
pub fn absolutize_urls(fragment: &str, wiki_origin: &str) -> String {
    let origin = wiki_origin.trim_end_matches('/');
    let rewritten = ATTR_ROOT_URL.replace_all(fragment, |caps: &regex::Captures<'_>| {
        format!("{}{}{}{}/{}", &caps[1], &caps[2], &caps[3], origin, &caps[4])
    });
    CSS_ROOT_URL
        .replace_all(&rewritten, |caps: &regex::Captures<'_>| {
            format!("url({}{}/{}", &caps[1], origin, &caps[2])
        })
        .into_owned()
}
