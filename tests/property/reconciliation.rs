//! Property-based tests for coordinate reconciliation

use georef_output::reconcile::{reconcile_pixel_coordinates, ScaleFactors};
use georef_output::registration::RegistrationResult;
use georef_output::source::TempSourceImage;
use georef_output::types::{GroundPoint, ImageSize, PixelPoint};
use proptest::prelude::*;

fn result(
    is_manual: bool,
    measured: ImageSize,
    pixels: Vec<(f64, f64)>,
) -> RegistrationResult {
    let ground = pixels
        .iter()
        .enumerate()
        .map(|(i, _)| GroundPoint::new(i as f64, -(i as f64)))
        .collect();
    RegistrationResult {
        is_manual,
        image_inliers: pixels.into_iter().map(|(x, y)| PixelPoint::new(x, y)).collect(),
        gdc_inliers: ground,
        registration_mpp: 25.0,
        manual_image_size: if is_manual { Some(measured) } else { None },
        source_image: TempSourceImage::new("/nonexistent/property-source.tif"),
    }
}

fn size() -> impl Strategy<Value = ImageSize> {
    (1u32..20_000, 1u32..20_000).prop_map(|(w, h)| ImageSize::new(w, h))
}

fn pixels() -> impl Strategy<Value = Vec<(f64, f64)>> {
    prop::collection::vec((0.0f64..20_000.0, 0.0f64..20_000.0), 0..40)
}

proptest! {
    #[test]
    fn rescale_matches_per_axis_ratio(measured in size(), actual in size(), pts in pixels()) {
        let input = result(true, measured, pts.clone());
        let out = reconcile_pixel_coordinates(input, actual).unwrap();

        prop_assert_eq!(out.image_inliers.len(), pts.len());
        prop_assert_eq!(out.gdc_inliers.len(), out.image_inliers.len());
        let sx = f64::from(actual.width) / f64::from(measured.width);
        let sy = f64::from(actual.height) / f64::from(measured.height);
        for (p, (x, y)) in out.image_inliers.iter().zip(pts.iter()) {
            if measured == actual {
                prop_assert_eq!(*p, PixelPoint::new(*x, *y));
            } else {
                prop_assert_eq!(*p, PixelPoint::new(x * sx, y * sy));
            }
        }
    }

    #[test]
    fn equal_resolution_is_identity(measured in size(), pts in pixels()) {
        let input = result(true, measured, pts.clone());
        let expected = input.image_inliers.clone();
        let out = reconcile_pixel_coordinates(input, measured).unwrap();
        prop_assert_eq!(out.image_inliers, expected);
    }

    #[test]
    fn pairing_order_is_preserved(measured in size(), actual in size(), pts in pixels()) {
        let input = result(true, measured, pts);
        let ground_before = input.gdc_inliers.clone();
        let out = reconcile_pixel_coordinates(input, actual).unwrap();
        prop_assert_eq!(out.gdc_inliers, ground_before);
    }
}

/// Scale factors are never infinite or NaN for valid measured sizes
#[test]
fn test_scale_factors_are_finite() {
    let mut runner = proptest::test_runner::TestRunner::default();

    runner
        .run(&(size(), size()), |(measured, actual)| {
            if let Some(scale) = ScaleFactors::between(measured, actual).unwrap() {
                assert!(scale.width.is_finite() && scale.width > 0.0);
                assert!(scale.height.is_finite() && scale.height > 0.0);
            }
            Ok(())
        })
        .unwrap();
}

#[test]
fn test_zero_measured_dimension_always_rejected() {
    let mut runner = proptest::test_runner::TestRunner::default();

    runner
        .run(&(0u32..5000, size()), |(w, actual)| {
            assert!(ScaleFactors::between(ImageSize::new(w, 0), actual).is_err());
            assert!(ScaleFactors::between(ImageSize::new(0, w), actual).is_err());
            Ok(())
        })
        .unwrap();
}
