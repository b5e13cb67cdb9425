//! Document segmenter: flattens a content container into translation blocks.

use crate::markup::serialize::outer_html;
use crate::types::TranslationBlock;
use scraper::ElementRef;

/// Flatten `container` into ordered blocks.
///
/// `section` elements are replaced by their flattened children; every other
/// element child becomes one block. Text and comment children are skipped.
pub fn segment(container: ElementRef<'_>) -> Vec<TranslationBlock> {
    let mut blocks = Vec::new();
    collect(container, &mut blocks);
    blocks
}

fn collect(parent: ElementRef<'_>, blocks: &mut Vec<TranslationBlock>) {
    for child in parent.children().filter_map(ElementRef::wrap) {
        let element = child.value();
        if element.name().eq_ignore_ascii_case("section") {
            collect(child, blocks);
            continue;
        }
        let id = match element.id() {
            Some(id) if !id.is_empty() => id.to_string(),
            _ => format!("block-{}", blocks.len()),
        };
        blocks.push(TranslationBlock::new(
            id,
            element.name().to_ascii_uppercase(),
            outer_html(child),
        ));
    }
}
