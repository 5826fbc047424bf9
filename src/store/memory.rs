//! In-memory catalog and tracking store
//!
//! Drop-in substitutes for the sled implementations, used by tests and by callers
//! that stage a batch without a database.

use crate::error::StorageError;
use crate::registration::{RegistrationResult, StoredRegistration};
use crate::source::SourceArchive;
use crate::store::{effective_limit, FrameCatalog, TrackingStore, DEFAULT_BATCH_SIZE};
use crate::types::{FrameId, FrameMetadata, TrackingState};
use parking_lot::Mutex;
use std::collections::{HashMap, HashSet};

#[derive(Default)]
struct MemoryState {
    registrations: HashMap<FrameId, StoredRegistration>,
    ready: Vec<FrameId>,
    written: HashSet<FrameId>,
}

pub struct InMemoryTrackingStore {
    state: Mutex<MemoryState>,
    archive: Box<dyn SourceArchive>,
    default_batch_size: usize,
}

impl InMemoryTrackingStore {
    pub fn new(archive: Box<dyn SourceArchive>) -> Self {
        Self {
            state: Mutex::new(MemoryState::default()),
            archive,
            default_batch_size: DEFAULT_BATCH_SIZE,
        }
    }

    pub fn with_default_batch_size(mut self, default_batch_size: usize) -> Self {
        self.default_batch_size = default_batch_size;
        self
    }

    /// Same contract as [`SledTrackingStore::enqueue_ready`](crate::store::SledTrackingStore::enqueue_ready).
    pub fn enqueue_ready(
        &self,
        id: &FrameId,
        registration: StoredRegistration,
    ) -> Result<bool, StorageError> {
        id.validate().map_err(StorageError::InvalidFrameId)?;
        let mut state = self.state.lock();
        if state.written.contains(id) {
            return Ok(false);
        }
        if !state.ready.contains(id) {
            state.ready.push(id.clone());
        }
        state.registrations.insert(id.clone(), registration);
        Ok(true)
    }

    pub fn state(&self, id: &FrameId) -> Option<TrackingState> {
        let state = self.state.lock();
        if state.written.contains(id) {
            Some(TrackingState::Written)
        } else if state.registrations.contains_key(id) {
            Some(TrackingState::ReadyForOutput)
        } else {
            None
        }
    }
}

impl TrackingStore for InMemoryTrackingStore {
    fn list_ready_frames(&self, limit: usize) -> Result<Vec<FrameId>, StorageError> {
        let limit = effective_limit(limit, self.default_batch_size);
        let state = self.state.lock();
        Ok(state.ready.iter().take(limit).cloned().collect())
    }

    fn get_registration_result(&self, id: &FrameId) -> Result<RegistrationResult, StorageError> {
        let stored = self
            .state
            .lock()
            .registrations
            .get(id)
            .cloned()
            .ok_or_else(|| StorageError::NotFound(format!("registration for {}", id)))?;
        let source_image = self.archive.materialize(id)?;
        Ok(RegistrationResult::from_stored(stored, source_image))
    }

    fn mark_written(&self, id: &FrameId) -> Result<(), StorageError> {
        let mut state = self.state.lock();
        state.ready.retain(|ready| ready != id);
        state.written.insert(id.clone());
        Ok(())
    }
}

#[derive(Default)]
pub struct InMemoryFrameCatalog {
    frames: Mutex<HashMap<FrameId, FrameMetadata>>,
}

impl InMemoryFrameCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn put_frame(&self, metadata: FrameMetadata) {
        self.frames.lock().insert(metadata.id.clone(), metadata);
    }
}

impl FrameCatalog for InMemoryFrameCatalog {
    fn load_frame(&self, id: &FrameId) -> Result<Option<FrameMetadata>, StorageError> {
        Ok(self.frames.lock().get(id).cloned())
    }
}
