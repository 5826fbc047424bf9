//! Output Pipeline
//!
//! Runs the per-frame sequence load → fetch → probe → reconcile → write → cleanup →
//! commit for a batch of frames. Every frame gets its own `Result`; a failing frame is
//! recorded in the [`BatchReport`] and the batch moves on.
//!
//! A frame is committed as written only after its products are on disk. A crash
//! anywhere before the commit leaves the frame ready, and a re-run rewrites the
//! product from a freshly materialized source image.

use crate::error::{error_chain, FrameError};
use crate::output::{output_prefix, OutputProduct, OutputRequest, OutputWriter};
use crate::probe::ImageProber;
use crate::reconcile::reconcile_pixel_coordinates;
use crate::registration::RegistrationResult;
use crate::store::{FrameCatalog, TrackingStore};
use crate::types::FrameId;
use std::path::{Path, PathBuf};
use tracing::{debug, error, info, warn};

/// Successful processing of one frame.
#[derive(Debug)]
pub struct FrameOutcome {
    pub product: OutputProduct,
    /// Manual inliers were rescaled to the source resolution
    pub rescaled: bool,
    /// Non-fatal failure to remove the temporary source image
    pub cleanup_failure: Option<FrameError>,
}

#[derive(Debug)]
pub struct FrameFailure {
    pub id: FrameId,
    pub error: FrameError,
}

/// Per-run tally.
#[derive(Debug, Default)]
pub struct BatchReport {
    pub attempted: usize,
    pub succeeded: usize,
    pub failed: usize,
    pub cleanup_warnings: usize,
    pub written: Vec<FrameId>,
    pub failures: Vec<FrameFailure>,
}

impl BatchReport {
    pub fn is_clean(&self) -> bool {
        self.failed == 0
    }
}

pub struct OutputPipeline<'a> {
    catalog: &'a dyn FrameCatalog,
    store: &'a dyn TrackingStore,
    prober: &'a dyn ImageProber,
    writer: &'a dyn OutputWriter,
    output_root: PathBuf,
}

impl<'a> OutputPipeline<'a> {
    pub fn new(
        catalog: &'a dyn FrameCatalog,
        store: &'a dyn TrackingStore,
        prober: &'a dyn ImageProber,
        writer: &'a dyn OutputWriter,
        output_root: impl Into<PathBuf>,
    ) -> Self {
        Self {
            catalog,
            store,
            prober,
            writer,
            output_root: output_root.into(),
        }
    }

    pub fn output_root(&self) -> &Path {
        &self.output_root
    }

    /// Process frames one at a time in the given order.
    pub fn run(&self, frames: &[FrameId]) -> BatchReport {
        info!(frames = frames.len(), "Output generation started");
        let mut report = BatchReport::default();

        if frames.is_empty() {
            info!("Did not find any frames ready to process");
        }

        for id in frames {
            report.attempted += 1;
            info!(frame = %id, "Processing frame");

            match self.process_frame(id) {
                Ok(outcome) => {
                    report.succeeded += 1;
                    if outcome.cleanup_failure.is_some() {
                        report.cleanup_warnings += 1;
                    }
                    info!(
                        frame = %id,
                        prefix = %outcome.product.prefix.display(),
                        rescaled = outcome.rescaled,
                        "Frame written"
                    );
                    report.written.push(id.clone());
                }
                Err(err) => {
                    error!(
                        frame = %id,
                        kind = err.kind(),
                        error = %error_chain(&err),
                        "Frame failed"
                    );
                    report.failed += 1;
                    report.failures.push(FrameFailure {
                        id: id.clone(),
                        error: err,
                    });
                }
            }
        }

        info!(
            attempted = report.attempted,
            succeeded = report.succeeded,
            failed = report.failed,
            cleanup_warnings = report.cleanup_warnings,
            "Output generation stopped"
        );
        report
    }

    /// Run the full sequence for a single frame.
    pub fn process_frame(&self, id: &FrameId) -> Result<FrameOutcome, FrameError> {
        let metadata = self
            .catalog
            .load_frame(id)
            .map_err(FrameError::Catalog)?
            .ok_or(FrameError::FrameNotFound)?;
        debug!(frame = %id, ?metadata, "Loaded frame metadata");

        // From here on the source image handle deletes the scratch copy on every
        // early return.
        let registration = self
            .store
            .get_registration_result(id)
            .map_err(FrameError::RegistrationFetch)?;
        registration.check_pairing()?;

        let actual = self.prober.image_size(registration.source_image.path())?;
        let rescaled = registration.is_manual && registration.manual_image_size != Some(actual);
        let registration = if registration.is_manual {
            reconcile_pixel_coordinates(registration, actual)?
        } else {
            registration
        };

        let prefix = output_prefix(&self.output_root, id);
        let product = self.write(&registration, &prefix)?;

        let RegistrationResult { source_image, .. } = registration;
        let cleanup_path = source_image.path().to_path_buf();
        let cleanup_failure = match source_image.release() {
            Ok(()) => None,
            Err(source) => {
                let err = FrameError::CleanupFailure {
                    path: cleanup_path,
                    source,
                };
                warn!(frame = %id, error = %err, "Source image cleanup failed");
                Some(err)
            }
        };

        self.store
            .mark_written(id)
            .map_err(FrameError::CommitFailure)?;

        Ok(FrameOutcome {
            product,
            rescaled,
            cleanup_failure,
        })
    }

    fn write(
        &self,
        registration: &RegistrationResult,
        prefix: &Path,
    ) -> Result<OutputProduct, FrameError> {
        let request = OutputRequest {
            source_image: registration.source_image.path(),
            output_prefix: prefix,
            image_inliers: &registration.image_inliers,
            gdc_inliers: &registration.gdc_inliers,
            registration_mpp: registration.registration_mpp,
            is_manual: registration.is_manual,
            overwrite: true,
        };
        self.writer
            .write_output_products(&request)
            .map_err(FrameError::WriteFailure)
    }
}
