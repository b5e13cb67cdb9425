//! Text formatting for CLI output.

use crate::markup::{plain_text, snippet};
use crate::orchestrator::{TranslateAllReport, TranslateOutcome};
use crate::session::TranslatedContent;
use crate::types::{ArticleMetadata, TranslationBlock};
use comfy_table::presets::UTF8_BORDERS_ONLY;
use comfy_table::Table;
use owo_colors::OwoColorize;

const PREVIEW_CHARS: usize = 48;

/// Bold, underlined section heading.
pub fn format_section_heading(title: &str) -> String {
    format!("{}", title.bold().underline())
}

fn block_status(block: &TranslationBlock, translations: &TranslatedContent) -> &'static str {
    if translations.contains_key(&block.id) {
        "translated"
    } else if block.is_non_content() {
        "verbatim"
    } else {
        "pending"
    }
}

/// Blocks of the active article with their translation status.
pub fn format_blocks(
    title: &str,
    blocks: &[TranslationBlock],
    translations: &TranslatedContent,
) -> String {
    if blocks.is_empty() {
        return "No blocks. Fetch an article first.".to_string();
    }
    let done = blocks
        .iter()
        .filter(|b| translations.contains_key(&b.id))
        .count();

    let mut table = Table::new();
    table.load_preset(UTF8_BORDERS_ONLY);
    table.set_header(vec!["#", "Id", "Tag", "Status", "Text"]);
    for (index, block) in blocks.iter().enumerate() {
        table.add_row(vec![
            index.to_string(),
            block.id.clone(),
            block.tag_name.clone(),
            block_status(block, translations).to_string(),
            snippet(&plain_text(&block.html), PREVIEW_CHARS),
        ]);
    }
    format!(
        "{}\n\n{}\n\n{} of {} blocks translated",
        format_section_heading(title),
        table,
        done,
        blocks.len()
    )
}

/// Saved articles, newest first.
pub fn format_articles(articles: &[ArticleMetadata], active_id: Option<&str>) -> String {
    if articles.is_empty() {
        return "No saved articles.".to_string();
    }
    let mut table = Table::new();
    table.load_preset(UTF8_BORDERS_ONLY);
    table.set_header(vec!["", "Id", "Title", "Updated"]);
    for article in articles {
        let marker = if Some(article.id.as_str()) == active_id {
            "*"
        } else {
            ""
        };
        table.add_row(vec![
            marker.to_string(),
            article.id.clone(),
            article.title.clone(),
            article.updated_at.format("%Y-%m-%d %H:%M").to_string(),
        ]);
    }
    format!("{}\n\n{}", format_section_heading("Saved articles"), table)
}

pub fn format_suggestions(query: &str, titles: &[String]) -> String {
    if titles.is_empty() {
        return format!("No titles match \"{}\".", query);
    }
    titles.join("\n")
}

pub fn format_translate_outcome(block_id: &str, outcome: &TranslateOutcome) -> String {
    match outcome {
        TranslateOutcome::Translated => format!("Translated {}", block_id),
        TranslateOutcome::Bypassed => format!("Copied {} verbatim", block_id),
        TranslateOutcome::AlreadyTranslated => format!("{} is already translated", block_id),
        TranslateOutcome::InProgress => format!("{} is already being translated", block_id),
        TranslateOutcome::Busy { in_flight } => {
            format!("Busy: {} is being translated, try again later", in_flight)
        }
        TranslateOutcome::StoredForInactive { article_id } => {
            format!("Translated {} (stored for {}, no longer active)", block_id, article_id)
        }
    }
}

pub fn format_translate_report(report: &TranslateAllReport) -> String {
    let mut out = format!(
        "Translated {}, copied {}, skipped {}, failed {}",
        report.translated.len(),
        report.bypassed.len(),
        report.skipped.len(),
        report.failed.len()
    );
    for (block_id, error) in &report.failed {
        out.push_str(&format!("\n  {} {}: {}", "✗".red(), block_id, error));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    #[test]
    fn test_block_status() {
        let mut translations = TranslatedContent::new();
        translations.insert("a".to_string(), "<p>訳</p>".to_string());
        let done = TranslationBlock::new("a".to_string(), "P", "<p>x</p>");
        let style = TranslationBlock::new("b".to_string(), "STYLE", "<style></style>");
        let pending = TranslationBlock::new("c".to_string(), "P", "<p>y</p>");
        assert_eq!(block_status(&done, &translations), "translated");
        assert_eq!(block_status(&style, &translations), "verbatim");
        assert_eq!(block_status(&pending, &translations), "pending");

        let out = format_blocks("Water", &[done, style, pending], &translations);
        assert!(out.contains("1 of 3 blocks translated"));
    }

    #[test]
    fn test_format_articles_marks_active() {
        let articles = vec![ArticleMetadata {
            id: "Water".to_string(),
            title: "Water".to_string(),
            updated_at: Utc.with_ymd_and_hms(2026, 3, 1, 9, 30, 0).unwrap(),
        }];
        let out = format_articles(&articles, Some("Water"));
        assert!(out.contains("2026-03-01 09:30"));
        assert!(out.contains('*'));
        assert_eq!(format_articles(&[], None), "No saved articles.");
    }

    #[test]
    fn test_format_outcomes() {
        assert_eq!(
            format_translate_outcome(
                "b",
                &TranslateOutcome::Busy {
                    in_flight: "a".to_string()
                }
            ),
            "Busy: a is being translated, try again later"
        );
        assert_eq!(
            format_translate_outcome(
                "mwAQ",
                &TranslateOutcome::StoredForInactive {
                    article_id: "Water".to_string()
                }
            ),
            "Translated mwAQ (stored for Water, no longer active)"
        );
        assert_eq!(format_suggestions("zz", &[]), "No titles match \"zz\".");
    }
}
