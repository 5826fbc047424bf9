//! Output products
//!
//! Every frame's product set lives under a prefix derived only from its identifier,
//! so downstream readers can find a product without consulting the tracking store.

pub mod writer;

pub use writer::FsOutputWriter;

use crate::error::WriteError;
use crate::types::{FrameId, GroundPoint, PixelPoint};
use std::ffi::OsString;
use std::path::{Path, PathBuf};

/// `{output_root}/{mission}/{roll}/{MISSION-ROLL-FRAME}`
pub fn output_prefix(output_root: &Path, id: &FrameId) -> PathBuf {
    output_root
        .join(&id.mission)
        .join(&id.roll)
        .join(id.file_stem())
}

/// Append `suffix` to a prefix without treating any part of the stem as an extension.
pub fn with_suffix(prefix: &Path, suffix: &str) -> PathBuf {
    let mut name = OsString::from(prefix.as_os_str());
    name.push(suffix);
    PathBuf::from(name)
}

/// Everything the writer needs for one frame.
#[derive(Debug, Clone, Copy)]
pub struct OutputRequest<'a> {
    pub source_image: &'a Path,
    pub output_prefix: &'a Path,
    pub image_inliers: &'a [PixelPoint],
    pub gdc_inliers: &'a [GroundPoint],
    pub registration_mpp: f64,
    pub is_manual: bool,
    /// Replace an existing product instead of failing
    pub overwrite: bool,
}

/// Files produced for one frame.
#[derive(Debug, Clone, PartialEq)]
pub struct OutputProduct {
    pub prefix: PathBuf,
    pub files: Vec<PathBuf>,
}

pub trait OutputWriter {
    /// Write the full product set. With `overwrite` set, re-running on an existing
    /// product must replace it whole, never append to or partially update it.
    fn write_output_products(&self, request: &OutputRequest<'_>)
        -> Result<OutputProduct, WriteError>;
}
