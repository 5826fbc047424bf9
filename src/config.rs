//! Configuration System
//!
//! Layered configuration built with the `config` crate. Sources, lowest precedence
//! first: built-in defaults, the global file, the workspace files, then `GEOREF_*`
//! environment variables (nested keys separated by `__`, e.g.
//! `GEOREF_PIPELINE__DEFAULT_BATCH_SIZE=25`).

use crate::error::PipelineError;
use crate::logging::LoggingConfig;
use crate::store::DEFAULT_BATCH_SIZE;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

mod facade;
mod merge;
mod sources;

pub use facade::ConfigLoader;

/// Root configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GeorefConfig {
    #[serde(default)]
    pub storage: StorageConfig,

    #[serde(default)]
    pub pipeline: PipelineConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Storage locations. Relative paths are resolved against the workspace root.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// sled database holding the frame catalog and tracking state
    #[serde(default = "default_store_path")]
    pub store_path: PathBuf,

    /// Root under which output products are written
    #[serde(default = "default_output_root")]
    pub output_root: PathBuf,

    /// Archive of full-resolution source images
    #[serde(default = "default_source_archive")]
    pub source_archive: PathBuf,

    /// Where source images are materialized while a frame is processed
    #[serde(default = "default_scratch_dir")]
    pub scratch_dir: PathBuf,
}

fn default_store_path() -> PathBuf {
    PathBuf::from(".georef/store")
}

fn default_output_root() -> PathBuf {
    PathBuf::from(".georef/output")
}

fn default_source_archive() -> PathBuf {
    PathBuf::from(".georef/archive")
}

fn default_scratch_dir() -> PathBuf {
    PathBuf::from(".georef/scratch")
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            store_path: default_store_path(),
            output_root: default_output_root(),
            source_archive: default_source_archive(),
            scratch_dir: default_scratch_dir(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// Frames selected per run when `--limit` is 0 or absent
    #[serde(default = "default_batch_size")]
    pub default_batch_size: usize,
}

fn default_batch_size() -> usize {
    DEFAULT_BATCH_SIZE
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            default_batch_size: default_batch_size(),
        }
    }
}

impl StorageConfig {
    pub fn validate(&self) -> Result<(), String> {
        for (name, path) in [
            ("store_path", &self.store_path),
            ("output_root", &self.output_root),
            ("source_archive", &self.source_archive),
            ("scratch_dir", &self.scratch_dir),
        ] {
            if path.as_os_str().is_empty() {
                return Err(format!("storage.{} cannot be empty", name));
            }
        }
        if self.scratch_dir == self.source_archive {
            return Err("storage.scratch_dir must differ from storage.source_archive".to_string());
        }
        Ok(())
    }

    /// Make every relative path absolute under `workspace_root`.
    pub fn resolve(&mut self, workspace_root: &Path) {
        for path in [
            &mut self.store_path,
            &mut self.output_root,
            &mut self.source_archive,
            &mut self.scratch_dir,
        ] {
            if path.is_relative() {
                *path = workspace_root.join(&*path);
            }
        }
    }
}

impl GeorefConfig {
    /// Validate the entire configuration
    pub fn validate(&self) -> Result<(), PipelineError> {
        let mut errors = Vec::new();
        if let Err(e) = self.storage.validate() {
            errors.push(e);
        }
        if self.pipeline.default_batch_size == 0 {
            errors.push("pipeline.default_batch_size must be greater than 0".to_string());
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(PipelineError::Configuration(format!(
                "Configuration validation failed:\n{}",
                errors.join("\n")
            )))
        }
    }
}
