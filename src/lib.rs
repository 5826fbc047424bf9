//! Georef Output: Output Generation for Registered Frames
//!
//! Finalizes georeferenced image products once an upstream registration step has
//! computed alignment data for a frame. Frames that are ready for output are selected
//! from the tracking store, manual pixel coordinates are reconciled against the real
//! source image resolution, the output products are written, the temporary source
//! image is discarded, and the frame is durably marked as written.

pub mod cli;
pub mod config;
pub mod error;
pub mod logging;
pub mod output;
pub mod pipeline;
pub mod probe;
pub mod reconcile;
pub mod registration;
pub mod select;
pub mod source;
pub mod store;
pub mod types;
