//! MergeService: layers sources over the defaults and deserializes `AppConfig`.

use crate::config::sources::{environment, files};
use crate::config::AppConfig;
use config::builder::DefaultState;
use config::{Config, ConfigBuilder, ConfigError};
use std::path::Path;

pub struct MergeService;

impl MergeService {
    /// Precedence, lowest first: defaults, global file, explicit file,
    /// environment.
    pub fn load(explicit: Option<&Path>) -> Result<AppConfig, ConfigError> {
        let builder = Self::builder_with_defaults()?;
        let builder = files::add_global(builder);
        let builder = match explicit {
            Some(path) => files::add_explicit(builder, path),
            None => builder,
        };
        let builder = environment::add_to_builder(builder);
        builder.build()?.try_deserialize()
    }

    /// Defaults plus environment only, ignoring every file.
    pub fn load_from_env() -> Result<AppConfig, ConfigError> {
        let builder = environment::add_to_builder(Self::builder_with_defaults()?);
        builder.build()?.try_deserialize()
    }

    fn builder_with_defaults() -> Result<ConfigBuilder<DefaultState>, ConfigError> {
        let defaults = Config::try_from(&AppConfig::default())?;
        Ok(Config::builder().add_source(defaults))
    }
}
