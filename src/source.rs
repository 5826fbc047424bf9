//! Source image materialization
//!
//! Registration results carry a locally materialized copy of the full-resolution
//! source image. The copy belongs to the pipeline invocation that fetched it, so it
//! is handed out as a [`TempSourceImage`] which deletes the file when released or
//! dropped, on success and failure paths alike.

use crate::error::StorageError;
use crate::types::FrameId;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Extensions probed, in order, when locating a frame in the archive
pub(crate) const SOURCE_EXTENSIONS: &[&str] = &["tif", "tiff", "jpg", "jpeg", "png"];

/// Scoped handle to a temporary copy of a source image.
#[derive(Debug)]
pub struct TempSourceImage {
    path: PathBuf,
    released: bool,
}

impl TempSourceImage {
    /// Take ownership of the file at `path`.
    pub fn new<P: Into<PathBuf>>(path: P) -> Self {
        Self {
            path: path.into(),
            released: false,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Delete the file now and report the outcome.
    ///
    /// A file that is already gone counts as success.
    pub fn release(mut self) -> io::Result<()> {
        self.released = true;
        remove_if_present(&self.path)
    }
}

impl Drop for TempSourceImage {
    fn drop(&mut self) {
        if self.released {
            return;
        }
        if let Err(e) = remove_if_present(&self.path) {
            warn!(path = %self.path.display(), error = %e, "Failed to remove temporary source image");
        }
    }
}

fn remove_if_present(path: &Path) -> io::Result<()> {
    match fs::remove_file(path) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(e),
    }
}

/// Makes the full-resolution source image for a frame available locally.
pub trait SourceArchive {
    fn materialize(&self, id: &FrameId) -> Result<TempSourceImage, StorageError>;
}

/// Filesystem archive laid out as `{root}/{mission}/{roll}/{MISSION-ROLL-FRAME}.{ext}`.
///
/// Materializing copies the archived image into the scratch directory; the archive
/// itself is never modified.
pub struct FsSourceArchive {
    root: PathBuf,
    scratch_dir: PathBuf,
}

impl FsSourceArchive {
    pub fn new<P: AsRef<Path>, Q: AsRef<Path>>(
        root: P,
        scratch_dir: Q,
    ) -> Result<Self, StorageError> {
        let scratch_dir = scratch_dir.as_ref().to_path_buf();
        fs::create_dir_all(&scratch_dir).map_err(|e| {
            StorageError::IoError(io::Error::new(
                e.kind(),
                format!(
                    "Failed to create scratch directory at {:?}: {}",
                    scratch_dir, e
                ),
            ))
        })?;
        Ok(Self {
            root: root.as_ref().to_path_buf(),
            scratch_dir,
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Locate the archived image for a frame, if any.
    pub fn locate(&self, id: &FrameId) -> Option<PathBuf> {
        let dir = self.root.join(&id.mission).join(&id.roll);
        let stem = id.file_stem();
        SOURCE_EXTENSIONS
            .iter()
            .map(|ext| dir.join(format!("{}.{}", stem, ext)))
            .find(|candidate| candidate.is_file())
    }
}

impl SourceArchive for FsSourceArchive {
    fn materialize(&self, id: &FrameId) -> Result<TempSourceImage, StorageError> {
        let archived = self
            .locate(id)
            .ok_or_else(|| StorageError::NotFound(format!("source image for {}", id)))?;
        let extension = archived
            .extension()
            .map(|ext| format!(".{}", ext.to_string_lossy()))
            .unwrap_or_default();

        // Unique per materialization, so concurrent runs on the same frame each
        // get their own copy. The extension is kept for format detection.
        let copy_error = |e: io::Error| {
            StorageError::IoError(io::Error::new(
                e.kind(),
                format!("Failed to copy {:?} into {:?}: {}", archived, self.scratch_dir, e),
            ))
        };
        let mut scratch = tempfile::Builder::new()
            .prefix(&format!("{}.", id.file_stem()))
            .suffix(&extension)
            .tempfile_in(&self.scratch_dir)
            .map_err(copy_error)?;
        let mut source = fs::File::open(&archived).map_err(copy_error)?;
        io::copy(&mut source, scratch.as_file_mut()).map_err(copy_error)?;
        let (_, target) = scratch.keep().map_err(|e| copy_error(e.error))?;
        debug!(frame = %id, path = %target.display(), "Materialized source image");

        Ok(TempSourceImage::new(target))
    }
}
