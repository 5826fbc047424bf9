//! CLI route over a real workspace.

use clap::Parser;
use georef_output::cli::{Cli, RunContext};
use georef_output::config::GeorefConfig;
use georef_output::registration::StoredRegistration;
use georef_output::source::FsSourceArchive;
use georef_output::store::{SledFrameCatalog, SledTrackingStore};
use georef_output::types::{FrameId, FrameMetadata, GroundPoint, PixelPoint, TrackingState};
use tempfile::TempDir;

fn stage(context: &RunContext, id: &FrameId) {
    let storage = &context.config().storage;
    let dir = storage.source_archive.join(&id.mission).join(&id.roll);
    std::fs::create_dir_all(&dir).unwrap();
    image::RgbImage::new(4, 4)
        .save(dir.join(format!("{}.png", id.file_stem())))
        .unwrap();

    SledFrameCatalog::new(context.db())
        .unwrap()
        .put_frame(&FrameMetadata::new(id.clone()))
        .unwrap();
    tracking_store(context)
        .enqueue_ready(
            id,
            &StoredRegistration {
                is_manual: false,
                image_inliers: vec![PixelPoint::new(1.0, 2.0)],
                gdc_inliers: vec![GroundPoint::new(10.0, 20.0)],
                registration_mpp: 20.0,
                manual_image_size: None,
            },
        )
        .unwrap();
}

fn tracking_store(context: &RunContext) -> SledTrackingStore {
    let storage = &context.config().storage;
    let archive = FsSourceArchive::new(&storage.source_archive, &storage.scratch_dir).unwrap();
    SledTrackingStore::new(context.db().clone(), Box::new(archive)).unwrap()
}

fn context_with_batch_size(dir: &TempDir, batch: usize) -> RunContext {
    let mut config = GeorefConfig::default();
    config.pipeline.default_batch_size = batch;
    RunContext::from_config(config, dir.path()).unwrap()
}

#[test]
fn test_zero_limit_uses_configured_default_batch() {
    let dir = TempDir::new().unwrap();
    let context = context_with_batch_size(&dir, 100);
    let ids: Vec<FrameId> = (0..5).map(|n| FrameId::new("M1", "R2", format!("F{}", n))).collect();
    for id in &ids {
        stage(&context, id);
    }

    let cli = Cli::try_parse_from(["georef-output", "--limit", "0", "--list"]).unwrap();
    let listing = context.execute(&cli).unwrap();
    assert!(listing.starts_with("Frames selected (5):"));

    let cli = Cli::try_parse_from(["georef-output", "--limit", "0"]).unwrap();
    let output = context.execute(&cli).unwrap();
    assert!(output.contains("Succeeded: 5"), "{}", output);

    let store = tracking_store(&context);
    for id in &ids {
        assert_eq!(store.state(id).unwrap(), Some(TrackingState::Written));
    }
}

#[test]
fn test_limit_caps_run() {
    let dir = TempDir::new().unwrap();
    let context = context_with_batch_size(&dir, 100);
    for n in 0..3 {
        stage(&context, &FrameId::new("M1", "R2", format!("F{}", n)));
    }

    let cli = Cli::try_parse_from(["georef-output", "--limit", "2"]).unwrap();
    let output = context.execute(&cli).unwrap();
    assert!(output.contains("Attempted: 2"), "{}", output);

    let cli = Cli::try_parse_from(["georef-output", "--list"]).unwrap();
    assert_eq!(
        context.execute(&cli).unwrap(),
        "Frames selected (1):\n  1. M1-R2-F2"
    );
}

#[test]
fn test_partial_frame_override_aborts_run() {
    let dir = TempDir::new().unwrap();
    let context = context_with_batch_size(&dir, 100);
    stage(&context, &FrameId::new("M1", "R2", "F3"));

    let cli = Cli::try_parse_from(["georef-output", "--mission", "M1"]).unwrap();
    let err = context.execute(&cli).unwrap_err();
    assert!(matches!(
        err,
        georef_output::error::PipelineError::Configuration(_)
    ));

    let store = tracking_store(&context);
    assert_eq!(
        store.state(&FrameId::new("M1", "R2", "F3")).unwrap(),
        Some(TrackingState::ReadyForOutput)
    );
}

#[test]
fn test_nothing_ready() {
    let dir = TempDir::new().unwrap();
    let context = context_with_batch_size(&dir, 100);
    let cli = Cli::try_parse_from(["georef-output"]).unwrap();
    assert_eq!(
        context.execute(&cli).unwrap(),
        "Did not find any frames ready to process."
    );
}

#[test]
fn test_commits_survive_reopening_the_store() {
    let dir = TempDir::new().unwrap();
    let ids: Vec<FrameId> = (0..2).map(|n| FrameId::new("M9", "R1", format!("F{}", n))).collect();
    {
        let context = context_with_batch_size(&dir, 100);
        for id in &ids {
            stage(&context, id);
        }
        let cli = Cli::try_parse_from(["georef-output"]).unwrap();
        let output = context.execute(&cli).unwrap();
        assert!(output.contains("Succeeded: 2"), "{}", output);
    }

    let reopened = context_with_batch_size(&dir, 100);
    let store = tracking_store(&reopened);
    for id in &ids {
        assert_eq!(store.state(id).unwrap(), Some(TrackingState::Written));
    }
    let cli = Cli::try_parse_from(["georef-output", "--list"]).unwrap();
    assert_eq!(
        reopened.execute(&cli).unwrap(),
        "Did not find any frames ready to process."
    );
}
