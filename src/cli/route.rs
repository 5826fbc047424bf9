//! Route: load configuration, open stores, and run the pipeline.

use crate::cli::parse::Cli;
use crate::cli::presentation::{format_batch_report, format_frame_list};
use crate::config::{ConfigLoader, GeorefConfig};
use crate::error::PipelineError;
use crate::output::FsOutputWriter;
use crate::pipeline::OutputPipeline;
use crate::probe::ImageCrateProber;
use crate::select::select_frames;
use crate::source::FsSourceArchive;
use crate::store::persistence::open_db;
use crate::store::{SledFrameCatalog, SledTrackingStore};
use std::path::PathBuf;
use tracing::info;

/// Resolved configuration plus the open database for one invocation.
pub struct RunContext {
    config: GeorefConfig,
    db: sled::Db,
}

impl RunContext {
    /// Load configuration for `workspace` (or from `config_path`) and open the store.
    pub fn new(workspace: PathBuf, config_path: Option<PathBuf>) -> Result<Self, PipelineError> {
        let config = match config_path {
            Some(path) => ConfigLoader::load_from_file(&path)?,
            None => ConfigLoader::load(&workspace)?,
        };
        Self::from_config(config, &workspace)
    }

    pub fn from_config(
        mut config: GeorefConfig,
        workspace: &std::path::Path,
    ) -> Result<Self, PipelineError> {
        config.storage.resolve(workspace);
        config.validate()?;
        let db = open_db(&config.storage.store_path)?;
        info!(store = %config.storage.store_path.display(), "Opened tracking store");
        Ok(Self { config, db })
    }

    pub fn config(&self) -> &GeorefConfig {
        &self.config
    }

    pub fn db(&self) -> &sled::Db {
        &self.db
    }

    /// Select frames and run the pipeline over them.
    ///
    /// Per-frame failures are part of the returned report; only configuration and
    /// store-opening problems are errors.
    pub fn execute(&self, cli: &Cli) -> Result<String, PipelineError> {
        let explicit = cli.frame_override()?;
        let storage = &self.config.storage;

        let archive = FsSourceArchive::new(&storage.source_archive, &storage.scratch_dir)?;
        let store = SledTrackingStore::new(self.db.clone(), Box::new(archive))?
            .with_default_batch_size(self.config.pipeline.default_batch_size);
        let catalog = SledFrameCatalog::new(&self.db)?;

        let frames = select_frames(&store, cli.limit, explicit.as_ref())?;
        if cli.list {
            return Ok(format_frame_list(&frames));
        }

        let prober = ImageCrateProber;
        let writer = FsOutputWriter::new();
        let pipeline = OutputPipeline::new(&catalog, &store, &prober, &writer, &storage.output_root);
        // Each commit is flushed by the store, so the report is always returned
        let report = pipeline.run(&frames);

        Ok(format_batch_report(&report))
    }
}
