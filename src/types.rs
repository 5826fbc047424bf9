//! Core type definitions

use serde::{Deserialize, Serialize};
use std::fmt;

/// Natural key of a frame: mission, roll and frame number.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct FrameId {
    pub mission: String,
    pub roll: String,
    pub frame: String,
}

impl FrameId {
    pub fn new(
        mission: impl Into<String>,
        roll: impl Into<String>,
        frame: impl Into<String>,
    ) -> Self {
        Self {
            mission: mission.into(),
            roll: roll.into(),
            frame: frame.into(),
        }
    }

    /// Check that every component is usable both as a store key segment and as a
    /// path component.
    pub fn validate(&self) -> Result<(), String> {
        for (name, value) in [
            ("mission", &self.mission),
            ("roll", &self.roll),
            ("frame", &self.frame),
        ] {
            if value.is_empty() {
                return Err(format!("{} cannot be empty", name));
            }
            if value.contains(&['/', '\\'][..]) || value == "." || value == ".." {
                return Err(format!("{} '{}' is not a valid path component", name, value));
            }
        }
        Ok(())
    }

    /// Key used by the sled stores: `mission/roll/frame`
    pub fn store_key(&self) -> String {
        format!("{}/{}/{}", self.mission, self.roll, self.frame)
    }

    pub fn from_store_key(key: &str) -> Option<Self> {
        let mut parts = key.split('/');
        let id = FrameId::new(parts.next()?, parts.next()?, parts.next()?);
        if parts.next().is_some() || id.validate().is_err() {
            return None;
        }
        Some(id)
    }

    /// File stem for products of this frame, e.g. `ISS043-E-12345`
    pub fn file_stem(&self) -> String {
        format!("{}-{}-{}", self.mission, self.roll, self.frame)
    }
}

impl fmt::Display for FrameId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.file_stem())
    }
}

/// Pixel coordinate in some image space.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PixelPoint {
    pub x: f64,
    pub y: f64,
}

impl PixelPoint {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Ground control coordinate (degrees, optional altitude in meters).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GroundPoint {
    pub lon: f64,
    pub lat: f64,
    #[serde(default)]
    pub alt: Option<f64>,
}

impl GroundPoint {
    pub fn new(lon: f64, lat: f64) -> Self {
        Self {
            lon,
            lat,
            alt: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ImageSize {
    pub width: u32,
    pub height: u32,
}

impl ImageSize {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }
}

impl fmt::Display for ImageSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

/// Catalog entry describing a frame.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FrameMetadata {
    pub id: FrameId,
    #[serde(default)]
    pub camera: Option<String>,
    #[serde(default)]
    pub focal_length_mm: Option<f64>,
    /// Approximate nadir point of the frame
    #[serde(default)]
    pub center: Option<GroundPoint>,
    /// Capture time, RFC 3339
    #[serde(default)]
    pub captured_at: Option<String>,
}

impl FrameMetadata {
    pub fn new(id: FrameId) -> Self {
        Self {
            id,
            camera: None,
            focal_length_mm: None,
            center: None,
            captured_at: None,
        }
    }
}

/// Lifetime state of a frame in the tracking store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TrackingState {
    ReadyForOutput,
    Written,
}
