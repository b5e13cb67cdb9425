//! File sources: the optional global file and an explicitly requested file.

use crate::config::paths::xdg_root;
use config::builder::DefaultState;
use config::{ConfigBuilder, File, FileFormat};
use std::path::Path;

/// Add `$XDG_CONFIG_HOME/wikitrans/config.toml` when it exists.
pub fn add_global(builder: ConfigBuilder<DefaultState>) -> ConfigBuilder<DefaultState> {
    match xdg_root::global_config_file() {
        Some(path) => builder.add_source(File::from(path).format(FileFormat::Toml).required(false)),
        None => builder,
    }
}

/// Add a file that must exist; the format follows its extension.
pub fn add_explicit(builder: ConfigBuilder<DefaultState>, path: &Path) -> ConfigBuilder<DefaultState> {
    builder.add_source(File::from(path).required(true))
}
