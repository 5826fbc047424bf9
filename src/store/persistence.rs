//! Sled-backed catalog and tracking store

use crate::error::StorageError;
use crate::registration::{RegistrationResult, StoredRegistration};
use crate::source::SourceArchive;
use crate::store::{effective_limit, FrameCatalog, TrackingStore, DEFAULT_BATCH_SIZE};
use crate::types::{FrameId, FrameMetadata, TrackingState};
use chrono::Utc;
use sled::{Batch, Db, Tree};
use std::path::Path;
use tracing::debug;

const TREE_TRACKING: &str = "tracking";
const TREE_FRAMES: &str = "frames";

// Key prefixes inside the tracking tree. A single tree lets one `Batch` cover the
// whole state transition.
const PREFIX_REGISTRATION: &str = "reg:";
const PREFIX_SEQ: &str = "seq:";
const PREFIX_READY: &str = "ready:";
const PREFIX_WRITTEN: &str = "written:";
const SEQ_KEY_PAD: usize = 20;

/// Open (or create) the sled database shared by the catalog and tracking store.
pub fn open_db<P: AsRef<Path>>(path: P) -> Result<Db, StorageError> {
    sled::open(path).map_err(|e| {
        StorageError::IoError(std::io::Error::new(
            std::io::ErrorKind::Other,
            format!("Failed to open sled database: {}", e),
        ))
    })
}

/// Tracking store persisted in sled.
///
/// Readiness order is the order frames were enqueued, kept by a monotonically
/// increasing sequence number from `Db::generate_id`.
pub struct SledTrackingStore {
    db: Db,
    tree: Tree,
    archive: Box<dyn SourceArchive>,
    default_batch_size: usize,
}

impl SledTrackingStore {
    pub fn new(db: Db, archive: Box<dyn SourceArchive>) -> Result<Self, StorageError> {
        let tree = db.open_tree(TREE_TRACKING)?;
        Ok(Self {
            db,
            tree,
            archive,
            default_batch_size: DEFAULT_BATCH_SIZE,
        })
    }

    pub fn with_default_batch_size(mut self, default_batch_size: usize) -> Self {
        self.default_batch_size = default_batch_size;
        self
    }

    /// Hand-off from the registration step: store the result and queue the frame.
    ///
    /// Re-enqueueing a ready frame replaces its registration but keeps its position.
    /// Written frames are terminal; returns `false` and leaves them untouched.
    pub fn enqueue_ready(
        &self,
        id: &FrameId,
        registration: &StoredRegistration,
    ) -> Result<bool, StorageError> {
        id.validate().map_err(StorageError::InvalidFrameId)?;
        let key = id.store_key();

        if self.tree.contains_key(written_key(&key))? {
            debug!(frame = %id, "Ignoring enqueue of written frame");
            return Ok(false);
        }

        let value = bincode::serialize(registration).map_err(|e| StorageError::Corrupt {
            key: key.clone(),
            message: format!("Failed to serialize registration: {}", e),
        })?;

        let mut batch = Batch::default();
        batch.insert(registration_key(&key).as_bytes(), value);
        if !self.tree.contains_key(seq_key(&key))? {
            let seq = self.db.generate_id()?;
            batch.insert(seq_key(&key).as_bytes(), seq.to_be_bytes().to_vec());
            batch.insert(ready_key(seq).as_bytes(), key.as_bytes());
        }
        self.tree.apply_batch(batch)?;
        self.db.flush()?;
        Ok(true)
    }

    /// Current state of a frame, `None` if the store has never seen it.
    pub fn state(&self, id: &FrameId) -> Result<Option<TrackingState>, StorageError> {
        let key = id.store_key();
        if self.tree.contains_key(written_key(&key))? {
            return Ok(Some(TrackingState::Written));
        }
        if self.tree.contains_key(registration_key(&key))? {
            return Ok(Some(TrackingState::ReadyForOutput));
        }
        Ok(None)
    }

    /// RFC 3339 time at which the frame was first committed as written.
    pub fn written_at(&self, id: &FrameId) -> Result<Option<String>, StorageError> {
        let key = id.store_key();
        match self.tree.get(written_key(&key))? {
            Some(raw) => Ok(Some(String::from_utf8_lossy(&raw).into_owned())),
            None => Ok(None),
        }
    }

    fn load_registration(&self, id: &FrameId) -> Result<StoredRegistration, StorageError> {
        let key = id.store_key();
        let raw = self
            .tree
            .get(registration_key(&key))?
            .ok_or_else(|| StorageError::NotFound(format!("registration for {}", id)))?;
        bincode::deserialize(&raw).map_err(|e| StorageError::Corrupt {
            key,
            message: format!("Failed to deserialize registration: {}", e),
        })
    }
}

impl TrackingStore for SledTrackingStore {
    fn list_ready_frames(&self, limit: usize) -> Result<Vec<FrameId>, StorageError> {
        let limit = effective_limit(limit, self.default_batch_size);
        let mut out = Vec::new();
        for item in self.tree.scan_prefix(PREFIX_READY).take(limit) {
            let (key, value) = item?;
            let frame_key = String::from_utf8_lossy(&value).into_owned();
            let id = FrameId::from_store_key(&frame_key).ok_or_else(|| StorageError::Corrupt {
                key: String::from_utf8_lossy(&key).into_owned(),
                message: format!("Invalid frame key '{}'", frame_key),
            })?;
            out.push(id);
        }
        Ok(out)
    }

    fn get_registration_result(&self, id: &FrameId) -> Result<RegistrationResult, StorageError> {
        let stored = self.load_registration(id)?;
        let source_image = self.archive.materialize(id)?;
        Ok(RegistrationResult::from_stored(stored, source_image))
    }

    fn mark_written(&self, id: &FrameId) -> Result<(), StorageError> {
        let key = id.store_key();
        let mut batch = Batch::default();

        if let Some(raw) = self.tree.get(seq_key(&key))? {
            let bytes = <[u8; 8]>::try_from(&raw[..]).map_err(|_| StorageError::Corrupt {
                key: seq_key(&key),
                message: "Sequence number is not 8 bytes".to_string(),
            })?;
            batch.remove(ready_key(u64::from_be_bytes(bytes)).as_bytes());
            batch.remove(seq_key(&key).as_bytes());
        }
        if !self.tree.contains_key(written_key(&key))? {
            batch.insert(written_key(&key).as_bytes(), Utc::now().to_rfc3339().as_bytes());
        }

        self.tree.apply_batch(batch)?;
        // Durability point: once this returns the frame is never selected again
        self.db.flush()?;
        Ok(())
    }
}

/// Frame catalog persisted in sled, values are bincode-encoded `FrameMetadata`.
pub struct SledFrameCatalog {
    tree: Tree,
}

impl SledFrameCatalog {
    pub fn new(db: &Db) -> Result<Self, StorageError> {
        Ok(Self {
            tree: db.open_tree(TREE_FRAMES)?,
        })
    }

    pub fn put_frame(&self, metadata: &FrameMetadata) -> Result<(), StorageError> {
        metadata.id.validate().map_err(StorageError::InvalidFrameId)?;
        let key = metadata.id.store_key();
        let value = bincode::serialize(metadata).map_err(|e| StorageError::Corrupt {
            key: key.clone(),
            message: format!("Failed to serialize frame metadata: {}", e),
        })?;
        self.tree.insert(key.as_bytes(), value)?;
        Ok(())
    }
}

impl FrameCatalog for SledFrameCatalog {
    fn load_frame(&self, id: &FrameId) -> Result<Option<FrameMetadata>, StorageError> {
        let key = id.store_key();
        match self.tree.get(key.as_bytes())? {
            Some(raw) => {
                let metadata = bincode::deserialize(&raw).map_err(|e| StorageError::Corrupt {
                    key,
                    message: format!("Failed to deserialize frame metadata: {}", e),
                })?;
                Ok(Some(metadata))
            }
            None => Ok(None),
        }
    }
}

fn registration_key(frame_key: &str) -> String {
    format!("{PREFIX_REGISTRATION}{frame_key}")
}

fn seq_key(frame_key: &str) -> String {
    format!("{PREFIX_SEQ}{frame_key}")
}

fn written_key(frame_key: &str) -> String {
    format!("{PREFIX_WRITTEN}{frame_key}")
}

fn ready_key(seq: u64) -> String {
    format!("{PREFIX_READY}{seq:0SEQ_KEY_PAD$}")
}
