//! Cross-language link resolution for decoded link placeholders.
//!
//! Each link first tries the official langlink. Without one, the translator's
//! proposed title is checked in reverse for a collision with a different
//! article, and an interlanguage-link transclusion is emitted instead.

use crate::client::{LinkDirection, LinkResolver};
use crate::markup::serialize::{escape_attr, escape_text, unescape};
use crate::types::encode_title;
use serde_json::{json, Map, Value};
use tracing::{debug, warn};

/// Name of the interlanguage-link template.
pub const ILL_TEMPLATE: &str = "Ill";

/// How one link placeholder was resolved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LinkResolution {
    /// An official counterpart exists
    Official { target: String },
    /// No counterpart; link through the interlanguage template
    Fallback { candidate: String, collision: bool },
    /// The official lookup failed; emit the label only
    Plain,
}

impl LinkResolution {
    /// Resolve a link per the three-step protocol.
    pub async fn resolve(resolver: &dyn LinkResolver, source_title: &str, guess_title: &str) -> Self {
        match resolver
            .lang_link(source_title, LinkDirection::SourceToTarget)
            .await
        {
            Ok(Some(target)) => return LinkResolution::Official { target },
            Ok(None) => {}
            Err(e) => {
                warn!(title = %source_title, error = %e, "Langlink lookup failed, keeping label");
                return LinkResolution::Plain;
            }
        }

        let collision = match resolver
            .lang_link(guess_title, LinkDirection::TargetToSource)
            .await
        {
            Ok(Some(back_link)) => back_link != source_title,
            Ok(None) => false,
            Err(e) => {
                warn!(
                    title = %source_title,
                    guess = %guess_title,
                    error = %e,
                    "Collision check failed, keeping proposed title"
                );
                false
            }
        };

        let candidate = if collision {
            debug!(title = %source_title, guess = %guess_title, "Proposed title collides");
            format!("{}/{}", source_title, guess_title)
        } else {
            guess_title.to_string()
        };
        LinkResolution::Fallback {
            candidate,
            collision,
        }
    }

    /// Markup replacing the placeholder.
    ///
    /// `label` is markup text as it appeared in the translated placeholder.
    pub fn render(&self, source_lang: &str, source_title: &str, label: &str) -> String {
        match self {
            LinkResolution::Official { target } => official_link(target, label),
            LinkResolution::Fallback {
                candidate,
                collision,
            } => ill_transclusion(source_lang, source_title, candidate, *collision, label),
            LinkResolution::Plain => label.to_string(),
        }
    }
}

/// `<a rel="mw:WikiLink" href="./T" title="T">label</a>`
pub fn official_link(target: &str, label: &str) -> String {
    format!(
        "<a rel=\"mw:WikiLink\" href=\"./{}\" title=\"{}\">{}</a>",
        encode_title(target),
        escape_attr(target),
        label
    )
}

/// Interlanguage-link transclusion span for a title without a counterpart.
pub fn ill_transclusion(
    source_lang: &str,
    source_title: &str,
    candidate: &str,
    collision: bool,
    label: &str,
) -> String {
    let plain_label = unescape(label);
    let include_label = !collision && plain_label != candidate;

    let mut params = Map::new();
    params.insert("1".to_string(), json!({ "wt": candidate }));
    params.insert("2".to_string(), json!({ "wt": source_lang }));
    params.insert("3".to_string(), json!({ "wt": source_title }));
    if include_label {
        params.insert("label".to_string(), json!({ "wt": plain_label }));
    }
    let data_mw = json!({
        "parts": [{
            "template": {
                "target": { "wt": ILL_TEMPLATE, "href": format!("./Template:{}", ILL_TEMPLATE) },
                "params": Value::Object(params),
                "i": 0
            }
        }]
    });

    let shown = if include_label {
        label.to_string()
    } else {
        escape_text(candidate)
    };
    format!(
        "<span typeof=\"mw:Transclusion\" data-mw='{}'>{}</span>",
        escape_single_quoted(&data_mw.to_string()),
        shown
    )
}

fn escape_single_quoted(value: &str) -> String {
    value.replace('&', "&amp;").replace('\'', "&apos;")
}
