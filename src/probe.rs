//! Image dimension probing

use crate::error::ProbeError;
use crate::types::ImageSize;
use std::path::Path;

pub trait ImageProber {
    fn image_size(&self, path: &Path) -> Result<ImageSize, ProbeError>;
}

/// Reads dimensions from the image header via the `image` crate without decoding
/// pixel data.
#[derive(Debug, Default, Clone, Copy)]
pub struct ImageCrateProber;

impl ImageProber for ImageCrateProber {
    fn image_size(&self, path: &Path) -> Result<ImageSize, ProbeError> {
        let (width, height) = image::image_dimensions(path).map_err(|e| ProbeError {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        Ok(ImageSize::new(width, height))
    }
}
