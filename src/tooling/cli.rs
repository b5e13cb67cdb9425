//! CLI Tooling
//!
//! Command-line front end over one [`ArticleSession`]. Every command runs on
//! the context's runtime and flushes pending state before returning.

use crate::client::model::ModelTranslator;
use crate::client::wiki::WikiClient;
use crate::client::{ArticleSerializer, ArticleSource, LinkResolver, TitleSuggester, Translator};
use crate::config::AppConfig;
use crate::error::{ApiError, StorageError};
use crate::logging::LoggingConfig;
use crate::session::{ArticleSession, RunOutcome};
use crate::store::{KeyValueStore, SledStore};
use crate::tooling::format::{
    format_articles, format_blocks, format_suggestions, format_translate_outcome,
    format_translate_report,
};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;
use tokio::runtime::Runtime;
use tracing::info;

/// wikitrans - block-by-block article translation between two wikis
#[derive(Parser)]
#[command(name = "wikitrans")]
#[command(about = "Translate encyclopedia articles block by block, keeping markup and links intact")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Configuration file path (layered over the global config)
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Log debug output to stderr
    #[arg(long, default_value = "false")]
    pub verbose: bool,

    /// Log level (trace, debug, info, warn, error, off)
    #[arg(long)]
    pub log_level: Option<String>,

    /// Log format (json, text)
    #[arg(long)]
    pub log_format: Option<String>,

    /// Log output (stdout, stderr, file, both)
    #[arg(long)]
    pub log_output: Option<String>,

    /// Log file path (if output includes "file")
    #[arg(long)]
    pub log_file: Option<PathBuf>,
}

impl Cli {
    /// Apply command-line logging overrides on top of the config section.
    pub fn logging_config(&self, base: &LoggingConfig) -> LoggingConfig {
        let mut config = base.clone();
        if self.verbose {
            config.enabled = true;
            config.level = "debug".to_string();
            config.output = "stderr".to_string();
        }
        if let Some(level) = &self.log_level {
            config.level = level.clone();
        }
        if let Some(format) = &self.log_format {
            config.format = format.clone();
        }
        if let Some(output) = &self.log_output {
            config.output = output.clone();
        }
        if let Some(file) = &self.log_file {
            config.file = Some(file.clone());
        }
        config
    }
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Commands {
    /// Fetch an article and make it the active one
    Fetch {
        /// Article title in the source language
        title: String,
    },
    /// List the blocks of the active article
    Blocks,
    /// Translate one block, or every remaining block
    Translate {
        /// Block id (see `blocks`)
        #[arg(required_unless_present = "all", conflicts_with = "all")]
        block_id: Option<String>,
        /// Translate every block not yet translated
        #[arg(long)]
        all: bool,
    },
    /// Convert the assembled article to wikitext
    Wikitext {
        /// Write to this file instead of stdout
        #[arg(long)]
        output: Option<PathBuf>,
    },
    /// List saved articles, most recent first
    Articles,
    /// Make a saved article the active one
    Open {
        /// Article id (see `articles`)
        id: String,
    },
    /// Suggest article titles matching a prefix
    Suggest { query: String },
    /// Discard all translations of the active article
    Reset,
    /// Delete a saved article and its stored data
    Forget {
        /// Article id (see `articles`)
        id: String,
    },
}

/// Outbound collaborators used by the commands.
#[derive(Clone)]
pub struct Collaborators {
    pub source: Arc<dyn ArticleSource>,
    pub serializer: Arc<dyn ArticleSerializer>,
    pub resolver: Arc<dyn LinkResolver>,
    pub suggester: Arc<dyn TitleSuggester>,
    /// `None` builds the model translator from config on first use
    pub translator: Option<Arc<dyn Translator>>,
}

impl Collaborators {
    /// Encyclopedia client for every wiki role; the model translator is lazy.
    pub fn from_config(config: &AppConfig) -> Result<Self, ApiError> {
        let wiki = Arc::new(WikiClient::new(config.wiki.clone())?);
        Ok(Self {
            source: wiki.clone(),
            serializer: wiki.clone(),
            resolver: wiki.clone(),
            suggester: wiki,
            translator: None,
        })
    }
}

/// CLI context owning the runtime and the session
pub struct CliContext {
    runtime: Runtime,
    config: AppConfig,
    session: ArticleSession,
    collaborators: Collaborators,
}

impl CliContext {
    /// Open the configured sled store and the real collaborators.
    pub fn new(config: AppConfig) -> Result<Self, ApiError> {
        config.validate()?;
        let store_path = config.storage.resolve_path()?;
        std::fs::create_dir_all(&store_path).map_err(StorageError::IoError)?;
        let store = SledStore::with_namespace(&store_path, config.storage.namespace.clone())?;
        let collaborators = Collaborators::from_config(&config)?;
        Self::with_parts(config, Arc::new(store), collaborators)
    }

    /// Build a context over an explicit store and collaborators.
    pub fn with_parts(
        config: AppConfig,
        store: Arc<dyn KeyValueStore>,
        collaborators: Collaborators,
    ) -> Result<Self, ApiError> {
        let runtime = tokio::runtime::Builder::new_multi_thread()
            .enable_all()
            .build()
            .map_err(|e| ApiError::ConfigError(format!("Failed to start runtime: {}", e)))?;
        let session = runtime.block_on(ArticleSession::open(store, config.clone()))?;
        Ok(Self {
            runtime,
            config,
            session,
            collaborators,
        })
    }

    pub fn session(&self) -> &ArticleSession {
        &self.session
    }

    /// Execute a CLI command
    pub fn execute(&self, command: &Commands) -> Result<String, ApiError> {
        self.runtime.block_on(async {
            let result = self.execute_inner(command).await;
            self.session.flush().await;
            result
        })
    }

    fn translator(&self) -> Result<Arc<dyn Translator>, ApiError> {
        match &self.collaborators.translator {
            Some(translator) => Ok(Arc::clone(translator)),
            None => Ok(Arc::new(ModelTranslator::new(
                &self.config.translator,
                &self.config.wiki,
            )?)),
        }
    }

    fn require_active(&self) -> Result<String, ApiError> {
        let title = self.session.active_title();
        if title.is_empty() {
            return Err(ApiError::InvalidInput(
                "No active article. Run `fetch <title>` or `open <id>` first.".to_string(),
            ));
        }
        Ok(title)
    }

    async fn execute_inner(&self, command: &Commands) -> Result<String, ApiError> {
        match command {
            Commands::Fetch { title } => {
                self.session.set_input_title(title.clone());
                match self
                    .session
                    .fetch_article(self.collaborators.source.as_ref())
                    .await?
                {
                    RunOutcome::Done(count) => Ok(format!(
                        "Fetched {} ({} blocks)",
                        self.session.active_title(),
                        count
                    )),
                    RunOutcome::Skipped => Err(ApiError::InvalidInput(
                        "Title is required".to_string(),
                    )),
                    RunOutcome::AlreadyRunning => Ok("A fetch is already running".to_string()),
                }
            }
            Commands::Blocks => {
                let title = self.require_active()?;
                let state = self.session.state();
                let translations = state.translations.get();
                Ok(state
                    .blocks
                    .read(|blocks| format_blocks(&title, blocks, &translations)))
            }
            Commands::Translate { block_id, all } => {
                self.require_active()?;
                let translator = self.translator()?;
                let resolver = self.collaborators.resolver.as_ref();
                if *all {
                    let report = self
                        .session
                        .translate_all(translator.as_ref(), resolver)
                        .await;
                    info!(
                        translated = report.translated.len(),
                        failed = report.failed.len(),
                        "Translate all finished"
                    );
                    return Ok(format_translate_report(&report));
                }
                let block_id = block_id.as_deref().ok_or_else(|| {
                    ApiError::InvalidInput("Block id or --all is required".to_string())
                })?;
                let outcome = self
                    .session
                    .translate_block(translator.as_ref(), resolver, block_id)
                    .await?;
                Ok(format_translate_outcome(block_id, &outcome))
            }
            Commands::Wikitext { output } => {
                self.require_active()?;
                let wikitext = match self
                    .session
                    .generate_wikitext(self.collaborators.serializer.as_ref())
                    .await?
                {
                    RunOutcome::Done(wikitext) => wikitext,
                    RunOutcome::Skipped => {
                        return Ok("Active article has no blocks".to_string())
                    }
                    RunOutcome::AlreadyRunning => {
                        return Ok("Wikitext generation is already running".to_string())
                    }
                };
                match output {
                    Some(path) => {
                        std::fs::write(path, &wikitext).map_err(StorageError::IoError)?;
                        Ok(format!("Wrote wikitext to {}", path.display()))
                    }
                    None => Ok(wikitext),
                }
            }
            Commands::Articles => {
                let active = self.session.active_id();
                Ok(format_articles(
                    &self.session.saved_articles(),
                    active.as_deref(),
                ))
            }
            Commands::Open { id } => {
                let entry = self.session.open_saved(id).await?;
                let count = self.session.state().blocks.read(Vec::len);
                Ok(format!("Opened {} ({} blocks)", entry.title, count))
            }
            Commands::Suggest { query } => {
                let titles = self.collaborators.suggester.suggest_titles(query).await;
                Ok(format_suggestions(query, &titles))
            }
            Commands::Reset => {
                let title = self.require_active()?;
                self.session.reset_translation();
                Ok(format!("Cleared translations for {}", title))
            }
            Commands::Forget { id } => {
                self.session.forget_article(id).await?;
                Ok(format!("Forgot {}", id))
            }
        }
    }
}

impl Drop for CliContext {
    fn drop(&mut self) {
        self.runtime.block_on(self.session.shutdown());
    }
}
