//! Full pipeline over the sled store, filesystem archive, `image` prober and
//! filesystem writer.

use super::support::{automatic_registration, manual_registration, Workspace};
use georef_output::output::{output_prefix, FsOutputWriter};
use georef_output::pipeline::OutputPipeline;
use georef_output::probe::ImageCrateProber;
use georef_output::select::select_frames;
use georef_output::store::TrackingStore;
use georef_output::types::{FrameId, ImageSize, PixelPoint, TrackingState};

#[test]
fn test_manual_frame_is_rescaled_written_and_committed() {
    let ws = Workspace::new();
    let id = FrameId::new("ISS043", "E", "12345");
    ws.stage_frame(&id, ImageSize::new(40, 24));
    let store = ws.tracking_store();
    store
        .enqueue_ready(&id, &manual_registration(ImageSize::new(20, 12)))
        .unwrap();

    let catalog = ws.catalog();
    let pipeline = OutputPipeline::new(
        &catalog,
        &store,
        &ImageCrateProber,
        &FsOutputWriter,
        &ws.output_root,
    );
    let frames = select_frames(&store, 0, None).unwrap();
    let report = pipeline.run(&frames);

    assert_eq!(report.succeeded, 1, "failures: {:?}", report.failures);
    assert_eq!(store.state(&id).unwrap(), Some(TrackingState::Written));
    assert!(ws.scratch_is_empty(), "temporary source image must be removed");

    let prefix = output_prefix(&ws.output_root, &id);
    let sidecar = FsOutputWriter::read_sidecar(&prefix).unwrap();
    assert!(sidecar.is_manual);
    assert_eq!(sidecar.image_file, "ISS043-E-12345.png");
    assert_eq!(sidecar.tie_points[0].pixel, PixelPoint::new(20.0, 10.0));
    assert_eq!(sidecar.tie_points[1].pixel, PixelPoint::new(60.0, 24.0));
    assert_eq!(
        sidecar.tie_points[1].ground,
        automatic_registration().gdc_inliers[1]
    );
}

#[test]
fn test_written_frames_are_not_reselected() {
    let ws = Workspace::new();
    let store = ws.tracking_store();
    let ids: Vec<FrameId> = (1..=3)
        .map(|n| FrameId::new("ISS030", "E", format!("{}", n)))
        .collect();
    for id in &ids {
        ws.stage_frame(id, ImageSize::new(8, 8));
        store.enqueue_ready(id, &automatic_registration()).unwrap();
    }

    let catalog = ws.catalog();
    let pipeline = OutputPipeline::new(
        &catalog,
        &store,
        &ImageCrateProber,
        &FsOutputWriter,
        &ws.output_root,
    );

    let first = select_frames(&store, 2, None).unwrap();
    assert_eq!(first, ids[..2].to_vec());
    assert_eq!(pipeline.run(&first).succeeded, 2);

    let second = select_frames(&store, 0, None).unwrap();
    assert_eq!(second, vec![ids[2].clone()]);
    pipeline.run(&second);

    assert!(select_frames(&store, 0, None).unwrap().is_empty());
}

#[test]
fn test_failures_do_not_stop_the_batch() {
    let ws = Workspace::new();
    let store = ws.tracking_store();

    let missing_source = FrameId::new("M1", "R1", "1");
    ws.catalog()
        .put_frame(&georef_output::types::FrameMetadata::new(missing_source.clone()))
        .unwrap();
    store
        .enqueue_ready(&missing_source, &automatic_registration())
        .unwrap();

    let bad_manual = FrameId::new("M1", "R1", "2");
    ws.stage_frame(&bad_manual, ImageSize::new(8, 8));
    store
        .enqueue_ready(&bad_manual, &manual_registration(ImageSize::new(0, 8)))
        .unwrap();

    let good = FrameId::new("M1", "R1", "3");
    ws.stage_frame(&good, ImageSize::new(8, 8));
    store.enqueue_ready(&good, &automatic_registration()).unwrap();

    let catalog = ws.catalog();
    let pipeline = OutputPipeline::new(
        &catalog,
        &store,
        &ImageCrateProber,
        &FsOutputWriter,
        &ws.output_root,
    );
    let report = pipeline.run(&store.list_ready_frames(0).unwrap());

    assert_eq!(report.attempted, 3);
    assert_eq!(report.failed, 2);
    assert_eq!(report.written, vec![good]);
    let kinds: Vec<&str> = report.failures.iter().map(|f| f.error.kind()).collect();
    assert_eq!(kinds, vec!["registration_fetch", "data_integrity"]);
    assert_eq!(
        store.list_ready_frames(0).unwrap(),
        vec![missing_source, bad_manual]
    );
    assert!(ws.scratch_is_empty());
}

#[test]
fn test_explicit_frame_is_processed_even_when_written() {
    let ws = Workspace::new();
    let store = ws.tracking_store();
    let id = FrameId::new("ISS043", "E", "777");
    ws.stage_frame(&id, ImageSize::new(8, 8));
    store.enqueue_ready(&id, &automatic_registration()).unwrap();
    store.mark_written(&id).unwrap();

    let catalog = ws.catalog();
    let pipeline = OutputPipeline::new(
        &catalog,
        &store,
        &ImageCrateProber,
        &FsOutputWriter,
        &ws.output_root,
    );
    let frames = select_frames(&store, 0, Some(&id)).unwrap();
    let report = pipeline.run(&frames);

    assert_eq!(report.succeeded, 1);
    assert!(FsOutputWriter::sidecar_path(&output_prefix(&ws.output_root, &id)).exists());
}
