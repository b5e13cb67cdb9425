//! Decode side of the vault codec.

use crate::client::LinkResolver;
use crate::codec::links::LinkResolution;
use crate::codec::placeholder::{find_links, ELEMENT_TOKEN};
use crate::codec::vault::Vault;
use futures::future::join_all;
use tracing::debug;

/// Resolve link placeholders, then restore vaulted elements.
///
/// Lookups for all links run concurrently; replacements are applied by
/// position once every lookup has settled.
pub async fn decode(
    text: &str,
    vault: &Vault,
    resolver: &dyn LinkResolver,
    source_lang: &str,
) -> String {
    let linked = resolve_links(text, resolver, source_lang).await;
    restore_elements(&linked, vault)
}

async fn resolve_links(text: &str, resolver: &dyn LinkResolver, source_lang: &str) -> String {
    let links = find_links(text);
    if links.is_empty() {
        return text.to_string();
    }

    let resolutions = join_all(
        links
            .iter()
            .map(|link| LinkResolution::resolve(resolver, &link.title, &link.guess)),
    )
    .await;

    let mut out = String::with_capacity(text.len());
    let mut cursor = 0;
    for (link, resolution) in links.iter().zip(resolutions) {
        out.push_str(&text[cursor..link.start]);
        out.push_str(&resolution.render(source_lang, &link.title, &link.label));
        cursor = link.end;
    }
    out.push_str(&text[cursor..]);
    debug!(links = links.len(), "Resolved link placeholders");
    out
}

/// Replace every `⟨elem:i⟩` with `vault[i]`; out-of-range tokens stay as-is.
pub fn restore_elements(text: &str, vault: &Vault) -> String {
    ELEMENT_TOKEN
        .replace_all(text, |caps: &regex::Captures<'_>| {
            caps[1]
                .parse::<usize>()
                .ok()
                .and_then(|index| vault.get(index))
                .map(str::to_string)
                .unwrap_or_else(|| caps[0].to_string())
        })
        .into_owned()
}
