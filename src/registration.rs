//! Registration results handed from the upstream registration step.

use crate::error::FrameError;
use crate::source::TempSourceImage;
use crate::types::{GroundPoint, ImageSize, PixelPoint};
use serde::{Deserialize, Serialize};

/// Registration data as persisted by the tracking store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredRegistration {
    /// Inlier pixel coordinates were hand-collected, possibly at another resolution
    pub is_manual: bool,
    pub image_inliers: Vec<PixelPoint>,
    pub gdc_inliers: Vec<GroundPoint>,
    pub registration_mpp: f64,
    /// Resolution `image_inliers` were measured at; only set for manual registrations
    #[serde(default)]
    pub manual_image_size: Option<ImageSize>,
}

/// Registration data for one frame together with its materialized source image.
#[derive(Debug)]
pub struct RegistrationResult {
    pub is_manual: bool,
    pub image_inliers: Vec<PixelPoint>,
    pub gdc_inliers: Vec<GroundPoint>,
    pub registration_mpp: f64,
    pub manual_image_size: Option<ImageSize>,
    pub source_image: TempSourceImage,
}

impl RegistrationResult {
    pub fn from_stored(stored: StoredRegistration, source_image: TempSourceImage) -> Self {
        Self {
            is_manual: stored.is_manual,
            image_inliers: stored.image_inliers,
            gdc_inliers: stored.gdc_inliers,
            registration_mpp: stored.registration_mpp,
            manual_image_size: stored.manual_image_size,
            source_image,
        }
    }

    /// Pixel and ground inliers must pair up one to one.
    pub fn check_pairing(&self) -> Result<(), FrameError> {
        if self.image_inliers.len() != self.gdc_inliers.len() {
            return Err(FrameError::DataIntegrity(format!(
                "{} image inliers but {} ground inliers",
                self.image_inliers.len(),
                self.gdc_inliers.len()
            )));
        }
        Ok(())
    }
}
