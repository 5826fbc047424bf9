//! Merge rules: defaults, override order, conflict handling.

use crate::store::DEFAULT_BATCH_SIZE;
use config::Config;
use config::ConfigBuilder;
use config::ConfigError;

/// Create a Config builder with merge policy defaults applied.
pub fn builder_with_defaults() -> Result<ConfigBuilder<config::builder::DefaultState>, ConfigError>
{
    Config::builder()
        .set_default("storage.store_path", ".georef/store")?
        .set_default("storage.output_root", ".georef/output")?
        .set_default("storage.source_archive", ".georef/archive")?
        .set_default("storage.scratch_dir", ".georef/scratch")?
        .set_default("pipeline.default_batch_size", DEFAULT_BATCH_SIZE as u64)
}
