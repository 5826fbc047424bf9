//! Frame catalog and tracking store
//!
//! The tracking store is the only state shared between pipeline runs. It knows which
//! frames are ready for output, hands out their registration results, and records the
//! `ReadyForOutput -> Written` transition. The frame catalog describes frames.
//!
//! No lease is taken when a frame is selected: two concurrent runs may both process
//! the same ready frame. That is tolerated only because output writing overwrites and
//! `mark_written` is idempotent.

pub mod memory;
pub mod persistence;

pub use memory::{InMemoryFrameCatalog, InMemoryTrackingStore};
pub use persistence::{SledFrameCatalog, SledTrackingStore};

use crate::error::StorageError;
use crate::registration::RegistrationResult;
use crate::types::{FrameId, FrameMetadata};

/// Batch size used when a caller asks for "no limit" (0)
pub const DEFAULT_BATCH_SIZE: usize = 100;

/// Upstream frame catalog
pub trait FrameCatalog {
    /// Look up a frame; `Ok(None)` when the catalog has no such frame.
    fn load_frame(&self, id: &FrameId) -> Result<Option<FrameMetadata>, StorageError>;
}

/// Registration tracking store
pub trait TrackingStore {
    /// Frames in `ReadyForOutput`, in readiness order, at most `limit` of them.
    /// A `limit` of 0 selects the store's default batch size.
    fn list_ready_frames(&self, limit: usize) -> Result<Vec<FrameId>, StorageError>;

    /// Fetch the registration result for a frame, materializing its source image.
    fn get_registration_result(&self, id: &FrameId) -> Result<RegistrationResult, StorageError>;

    /// Record `ReadyForOutput -> Written`. Committing an already written frame is a no-op.
    fn mark_written(&self, id: &FrameId) -> Result<(), StorageError>;
}

pub(crate) fn effective_limit(limit: usize, default_batch_size: usize) -> usize {
    if limit == 0 {
        default_batch_size
    } else {
        limit
    }
}
