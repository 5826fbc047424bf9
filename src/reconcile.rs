//! Coordinate Reconciler
//!
//! Manually collected inlier pixels are measured on whatever rendition of the image
//! the operator was looking at, which is not necessarily the full-resolution source.
//! The reconciler maps them into the pixel space of the actual source image.
//!
//! Limitation: side labels or crops that change the effective image area are not
//! accounted for. The scale is computed from full image dimensions only.

use crate::error::FrameError;
use crate::registration::RegistrationResult;
use crate::types::{ImageSize, PixelPoint};
use tracing::debug;

/// Independent per-axis scale factors from measured to actual resolution.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScaleFactors {
    pub width: f64,
    pub height: f64,
}

impl ScaleFactors {
    /// Scale factors taking `measured` pixel space to `actual`.
    ///
    /// Returns `None` when the two sizes are identical and no rescale is needed.
    pub fn between(measured: ImageSize, actual: ImageSize) -> Result<Option<Self>, FrameError> {
        if measured.width == 0 || measured.height == 0 {
            return Err(FrameError::DataIntegrity(format!(
                "manual image size {} has a zero dimension",
                measured
            )));
        }
        if measured == actual {
            return Ok(None);
        }
        Ok(Some(Self {
            width: f64::from(actual.width) / f64::from(measured.width),
            height: f64::from(actual.height) / f64::from(measured.height),
        }))
    }

    pub fn apply(&self, point: PixelPoint) -> PixelPoint {
        PixelPoint::new(point.x * self.width, point.y * self.height)
    }
}

/// Rescale every point, preserving order and length.
pub fn rescale_points(points: &[PixelPoint], scale: ScaleFactors) -> Vec<PixelPoint> {
    points.iter().map(|p| scale.apply(*p)).collect()
}

/// Remap the image inliers of a manual registration into the pixel space of the
/// actual source image.
///
/// Only `image_inliers` change; ground inliers, mpp and the source image handle pass
/// through untouched. Callers check `is_manual` before invoking this.
pub fn reconcile_pixel_coordinates(
    mut result: RegistrationResult,
    actual: ImageSize,
) -> Result<RegistrationResult, FrameError> {
    let measured = result.manual_image_size.ok_or_else(|| {
        FrameError::DataIntegrity("manual registration has no recorded image size".to_string())
    })?;
    result.check_pairing()?;

    if let Some(scale) = ScaleFactors::between(measured, actual)? {
        debug!(
            measured = %measured,
            actual = %actual,
            width_scale = scale.width,
            height_scale = scale.height,
            "Rescaling manual inlier coordinates"
        );
        result.image_inliers = rescale_points(&result.image_inliers, scale);
    }

    Ok(result)
}
