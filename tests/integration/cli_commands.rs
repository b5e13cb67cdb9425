//! CLI commands over an in-memory store.

use super::fakes::{test_config, FakeWiki, PhraseTranslator};
use std::sync::Arc;
use tempfile::TempDir;
use wikitrans::error::ApiError;
use wikitrans::store::MemoryStore;
use wikitrans::tooling::{CliContext, Collaborators, Commands};

fn context_with(store: Arc<MemoryStore>) -> CliContext {
    let wiki = Arc::new(FakeWiki::new());
    let collaborators = Collaborators {
        source: wiki.clone(),
        serializer: wiki.clone(),
        resolver: wiki.clone(),
        suggester: wiki,
        translator: Some(Arc::new(PhraseTranslator::new())),
    };
    CliContext::with_parts(test_config(), store, collaborators).unwrap()
}

fn fetch(title: &str) -> Commands {
    Commands::Fetch {
        title: title.to_string(),
    }
}

#[test]
fn test_fetch_translate_and_export() {
    let temp_dir = TempDir::new().unwrap();
    let context = context_with(Arc::new(MemoryStore::new()));

    let output = context.execute(&fetch("Water")).unwrap();
    assert_eq!(output, "Fetched Water (3 blocks)");

    let output = context.execute(&Commands::Blocks).unwrap();
    assert!(output.contains("mwAQ"));
    assert!(output.contains("0 of 3 blocks translated"));

    let output = context
        .execute(&Commands::Translate {
            block_id: Some("mwAQ".to_string()),
            all: false,
        })
        .unwrap();
    assert_eq!(output, "Translated mwAQ");

    let output = context
        .execute(&Commands::Translate {
            block_id: None,
            all: true,
        })
        .unwrap();
    assert_eq!(output, "Translated 1, copied 1, skipped 0, failed 0");

    let path = temp_dir.path().join("Water.wiki");
    let output = context
        .execute(&Commands::Wikitext {
            output: Some(path.clone()),
        })
        .unwrap();
    assert_eq!(output, format!("Wrote wikitext to {}", path.display()));
    let written = std::fs::read_to_string(&path).unwrap();
    assert!(written.starts_with("= Water =\n"));
}

#[test]
fn test_commands_require_an_active_article() {
    let context = context_with(Arc::new(MemoryStore::new()));
    for command in [
        Commands::Blocks,
        Commands::Reset,
        Commands::Wikitext { output: None },
    ] {
        let err = context.execute(&command).unwrap_err();
        assert!(matches!(err, ApiError::InvalidInput(_)), "{:?}", command);
    }
}

#[test]
fn test_state_survives_a_new_context() {
    let store = Arc::new(MemoryStore::new());
    {
        let context = context_with(store.clone());
        context.execute(&fetch("Ice")).unwrap();
        context.execute(&fetch("Water")).unwrap();
    }

    let context = context_with(store);
    assert_eq!(context.session().active_title(), "Water");

    let output = context.execute(&Commands::Articles).unwrap();
    let water = output.find("Water").unwrap();
    let ice = output.find("Ice").unwrap();
    assert!(water < ice);

    let output = context
        .execute(&Commands::Open {
            id: "Ice".to_string(),
        })
        .unwrap();
    assert_eq!(output, "Opened Ice (1 blocks)");

    context
        .execute(&Commands::Forget {
            id: "Water".to_string(),
        })
        .unwrap();
    let output = context.execute(&Commands::Articles).unwrap();
    assert!(!output.contains("Water"));
}

#[test]
fn test_suggest_lists_matching_titles() {
    let context = context_with(Arc::new(MemoryStore::new()));
    let output = context
        .execute(&Commands::Suggest {
            query: "Wa".to_string(),
        })
        .unwrap();
    assert_eq!(output, "Water");
}
