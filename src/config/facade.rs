//! Config loading entry point.

use crate::config::merge::merge_policy;
use crate::config::sources::{global_file, workspace_file};
use crate::config::GeorefConfig;
use config::{ConfigError, Environment, File};
use std::path::{Path, PathBuf};

const ENV_PREFIX: &str = "GEOREF";

pub struct ConfigLoader;

impl ConfigLoader {
    /// Load configuration for a workspace.
    ///
    /// Precedence (highest last): defaults, global file, `config/config.toml`,
    /// `config/{GEOREF_ENV}.toml`, `GEOREF_*` environment variables.
    pub fn load(workspace_root: &Path) -> Result<GeorefConfig, ConfigError> {
        let builder = merge_policy::builder_with_defaults()?;
        let builder = global_file::add_to_builder(builder)?;
        let builder = workspace_file::add_to_builder(builder, workspace_root)?;
        builder
            .add_source(environment())
            .build()?
            .try_deserialize()
    }

    /// Load from one explicit file, skipping file discovery. Environment variables
    /// still apply on top.
    pub fn load_from_file(path: &Path) -> Result<GeorefConfig, ConfigError> {
        merge_policy::builder_with_defaults()?
            .add_source(File::from(path).required(true))
            .add_source(environment())
            .build()?
            .try_deserialize()
    }

    /// Path of the global config file, if `HOME`/`XDG_CONFIG_HOME` is set.
    pub fn global_config_path() -> Option<PathBuf> {
        global_file::global_config_path()
    }
}

fn environment() -> Environment {
    Environment::with_prefix(ENV_PREFIX)
        .prefix_separator("_")
        .separator("__")
}
