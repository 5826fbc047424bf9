//! Shared fixtures: a temporary workspace with a sled store, a source archive of
//! small PNG frames, a scratch directory and an output root.

use georef_output::registration::StoredRegistration;
use georef_output::source::FsSourceArchive;
use georef_output::store::persistence::open_db;
use georef_output::store::{SledFrameCatalog, SledTrackingStore};
use georef_output::types::{FrameId, FrameMetadata, GroundPoint, ImageSize, PixelPoint};
use std::path::PathBuf;
use tempfile::TempDir;

pub struct Workspace {
    _dir: TempDir,
    pub db: sled::Db,
    pub archive_root: PathBuf,
    pub scratch_dir: PathBuf,
    pub output_root: PathBuf,
}

impl Workspace {
    pub fn new() -> Self {
        let dir = TempDir::new().unwrap();
        let db = open_db(dir.path().join("store")).unwrap();
        let archive_root = dir.path().join("archive");
        let scratch_dir = dir.path().join("scratch");
        let output_root = dir.path().join("output");
        std::fs::create_dir_all(&archive_root).unwrap();
        Self {
            _dir: dir,
            db,
            archive_root,
            scratch_dir,
            output_root,
        }
    }

    pub fn tracking_store(&self) -> SledTrackingStore {
        let archive = FsSourceArchive::new(&self.archive_root, &self.scratch_dir).unwrap();
        SledTrackingStore::new(self.db.clone(), Box::new(archive)).unwrap()
    }

    pub fn catalog(&self) -> SledFrameCatalog {
        SledFrameCatalog::new(&self.db).unwrap()
    }

    /// Archive a PNG of the given size and catalog the frame.
    pub fn stage_frame(&self, id: &FrameId, size: ImageSize) {
        let dir = self.archive_root.join(&id.mission).join(&id.roll);
        std::fs::create_dir_all(&dir).unwrap();
        image::RgbImage::new(size.width, size.height)
            .save(dir.join(format!("{}.png", id.file_stem())))
            .unwrap();
        self.catalog()
            .put_frame(&FrameMetadata::new(id.clone()))
            .unwrap();
    }

    pub fn scratch_is_empty(&self) -> bool {
        match std::fs::read_dir(&self.scratch_dir) {
            Ok(mut entries) => entries.next().is_none(),
            Err(_) => true,
        }
    }
}

pub fn automatic_registration() -> StoredRegistration {
    StoredRegistration {
        is_manual: false,
        image_inliers: vec![PixelPoint::new(10.0, 5.0), PixelPoint::new(30.0, 12.0)],
        gdc_inliers: vec![
            GroundPoint::new(-95.36, 29.76),
            GroundPoint {
                lon: -95.30,
                lat: 29.70,
                alt: Some(12.0),
            },
        ],
        registration_mpp: 35.0,
        manual_image_size: None,
    }
}

pub fn manual_registration(measured: ImageSize) -> StoredRegistration {
    StoredRegistration {
        is_manual: true,
        manual_image_size: Some(measured),
        ..automatic_registration()
    }
}
