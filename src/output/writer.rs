//! Filesystem output writer
//!
//! Writes two files per frame:
//! - `{prefix}.{ext}`: the full-resolution source image
//! - `{prefix}.georef.json`: tie points, mpp and provenance for the image
//!
//! Both files are staged under unique temporary names in the output directory
//! before anything existing is touched. The previous sidecar is then removed, the
//! image renamed into place, and the sidecar renamed in last: its presence marks a
//! complete product, and a failure part way never leaves an old sidecar describing
//! a new image. Unique staging names let concurrent runs overwrite the same product
//! without truncating each other's files; the last rename wins.

use crate::error::WriteError;
use crate::output::{with_suffix, OutputProduct, OutputRequest, OutputWriter};
use crate::source::SOURCE_EXTENSIONS;
use crate::types::{GroundPoint, PixelPoint};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use tracing::debug;

const SIDECAR_SUFFIX: &str = ".georef.json";
const DEFAULT_IMAGE_EXTENSION: &str = "tif";

/// One pixel/ground correspondence
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TiePoint {
    pub pixel: PixelPoint,
    pub ground: GroundPoint,
}

/// Contents of `{prefix}.georef.json`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeorefSidecar {
    pub image_file: String,
    /// blake3 digest of the image file, hex
    pub image_blake3: String,
    pub is_manual: bool,
    pub registration_mpp: f64,
    pub tie_points: Vec<TiePoint>,
    pub written_at: String,
}

#[derive(Debug, Default, Clone, Copy)]
pub struct FsOutputWriter;

impl FsOutputWriter {
    pub fn new() -> Self {
        Self
    }

    /// Path of the sidecar for a prefix
    pub fn sidecar_path(prefix: &Path) -> PathBuf {
        with_suffix(prefix, SIDECAR_SUFFIX)
    }

    /// Read back a sidecar written by this writer.
    pub fn read_sidecar(prefix: &Path) -> Result<GeorefSidecar, WriteError> {
        let raw = fs::read(Self::sidecar_path(prefix))?;
        Ok(serde_json::from_slice(&raw)?)
    }
}

impl OutputWriter for FsOutputWriter {
    fn write_output_products(
        &self,
        request: &OutputRequest<'_>,
    ) -> Result<OutputProduct, WriteError> {
        if request.image_inliers.len() != request.gdc_inliers.len() {
            return Err(WriteError::InvalidRequest(format!(
                "{} image inliers but {} ground inliers",
                request.image_inliers.len(),
                request.gdc_inliers.len()
            )));
        }

        let extension = request
            .source_image
            .extension()
            .and_then(|ext| ext.to_str())
            .unwrap_or(DEFAULT_IMAGE_EXTENSION)
            .to_ascii_lowercase();
        let image_path = with_suffix(request.output_prefix, &format!(".{}", extension));
        let sidecar_path = Self::sidecar_path(request.output_prefix);

        if !request.overwrite {
            for existing in [&image_path, &sidecar_path] {
                if existing.exists() {
                    return Err(WriteError::AlreadyExists(existing.clone()));
                }
            }
        }

        let parent = image_path
            .parent()
            .filter(|dir| !dir.as_os_str().is_empty())
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from("."));
        fs::create_dir_all(&parent)?;

        let mut image_tmp = staging_file(&parent, &image_path)?;
        {
            let mut source = fs::File::open(request.source_image)?;
            io::copy(&mut source, image_tmp.as_file_mut())?;
        }
        image_tmp.as_file().sync_all()?;
        let digest = hash_file(image_tmp.path())?;

        let sidecar = GeorefSidecar {
            image_file: image_path
                .file_name()
                .map(|name| name.to_string_lossy().into_owned())
                .unwrap_or_default(),
            image_blake3: digest,
            is_manual: request.is_manual,
            registration_mpp: request.registration_mpp,
            tie_points: request
                .image_inliers
                .iter()
                .zip(request.gdc_inliers)
                .map(|(pixel, ground)| TiePoint {
                    pixel: *pixel,
                    ground: *ground,
                })
                .collect(),
            written_at: Utc::now().to_rfc3339(),
        };
        let mut sidecar_tmp = staging_file(&parent, &sidecar_path)?;
        serde_json::to_writer_pretty(sidecar_tmp.as_file_mut(), &sidecar)?;
        sidecar_tmp.as_file().sync_all()?;

        remove_if_present(&sidecar_path)?;
        image_tmp.persist(&image_path).map_err(|e| e.error)?;
        remove_stale_images(request.output_prefix, &extension)?;
        sidecar_tmp.persist(&sidecar_path).map_err(|e| e.error)?;

        debug!(
            prefix = %request.output_prefix.display(),
            tie_points = sidecar.tie_points.len(),
            "Wrote output products"
        );

        Ok(OutputProduct {
            prefix: request.output_prefix.to_path_buf(),
            files: vec![image_path, sidecar_path],
        })
    }
}

fn hash_file(path: &Path) -> io::Result<String> {
    let mut file = fs::File::open(path)?;
    let mut hasher = blake3::Hasher::new();
    io::copy(&mut file, &mut hasher)?;
    Ok(hasher.finalize().to_hex().to_string())
}

/// Temporary file next to `target`, deleted on drop unless persisted.
fn staging_file(dir: &Path, target: &Path) -> io::Result<NamedTempFile> {
    let name = target
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default();
    tempfile::Builder::new()
        .prefix(&format!(".{}.", name))
        .suffix(".tmp")
        .tempfile_in(dir)
}

fn remove_if_present(path: &Path) -> io::Result<()> {
    match fs::remove_file(path) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(e),
    }
}

/// Remove images left under `prefix` by earlier runs with a different source format.
fn remove_stale_images(prefix: &Path, keep: &str) -> io::Result<()> {
    for ext in SOURCE_EXTENSIONS.iter().filter(|ext| **ext != keep) {
        remove_if_present(&with_suffix(prefix, &format!(".{}", ext)))?;
    }
    Ok(())
}
