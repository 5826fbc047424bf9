//! Frame Selector

use crate::error::PipelineError;
use crate::store::TrackingStore;
use crate::types::FrameId;
use tracing::debug;

/// Build the explicit single-frame override from optional CLI values.
///
/// Mission, roll and frame go together: all three or none.
pub fn frame_override(
    mission: Option<&str>,
    roll: Option<&str>,
    frame: Option<&str>,
) -> Result<Option<FrameId>, PipelineError> {
    match (mission, roll, frame) {
        (None, None, None) => Ok(None),
        (Some(mission), Some(roll), Some(frame)) => {
            let id = FrameId::new(mission, roll, frame);
            id.validate().map_err(PipelineError::Configuration)?;
            Ok(Some(id))
        }
        _ => Err(PipelineError::Configuration(
            "mission/roll/frame must be provided together".to_string(),
        )),
    }
}

/// Frames to process this run.
///
/// An explicit frame is returned as-is, whatever its tracking state. Otherwise the
/// store's ready frames are returned in store order, at most `limit` of them
/// (0 meaning the store's default batch size).
pub fn select_frames(
    store: &dyn TrackingStore,
    limit: usize,
    explicit: Option<&FrameId>,
) -> Result<Vec<FrameId>, PipelineError> {
    if let Some(id) = explicit {
        debug!(frame = %id, "Using explicit frame");
        return Ok(vec![id.clone()]);
    }
    let frames = store.list_ready_frames(limit)?;
    debug!(limit, selected = frames.len(), "Selected ready frames");
    Ok(frames)
}
