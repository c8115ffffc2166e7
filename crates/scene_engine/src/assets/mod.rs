//! Content descriptors registered by the host
//!
//! Decoding and GPU upload happen outside the engine. The host registers what
//! the scene needs to know about each resource (its size, its frame layout)
//! under a string key, and leaf entities refer to content by that key.

mod storage;

pub use storage::KeyedStorage;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::scene::AnimationState;

/// Content storage errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AssetError {
    /// A key was registered twice
    #[error("Content key '{0}' is already registered")]
    DuplicateKey(String),

    /// A key is not registered
    #[error("Content key '{0}' not found")]
    NotFound(String),
}

/// Texture metadata
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TextureInfo {
    /// Width in pixels
    pub width: f32,
    /// Height in pixels
    pub height: f32,
}

/// Frame-strip animation layout
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnimationDescriptor {
    /// Width of one frame
    pub frame_width: f32,
    /// Height of one frame
    pub frame_height: f32,
    /// Number of frames in the strip
    pub frame_count: u32,
    /// Playback speed
    pub frames_per_second: f32,
    /// Wrap around at the end
    #[serde(default)]
    pub looping: bool,
}

impl AnimationDescriptor {
    /// Fresh playback state for this descriptor
    pub fn instantiate(&self, key: &str) -> AnimationState {
        AnimationState {
            descriptor: Some(key.to_owned()),
            ..AnimationState::new(self.frame_count, self.frames_per_second, self.looping)
        }
    }
}

/// Sound metadata
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SoundInfo {
    /// Source path, resolved by the host
    pub path: String,
    /// Playback volume in `0..=1`
    pub volume: f32,
}

/// All content storages owned by the engine
#[derive(Debug, Default)]
pub struct AssetStorage {
    /// Textures by key
    pub textures: KeyedStorage<TextureInfo>,
    /// Animations by key
    pub animations: KeyedStorage<AnimationDescriptor>,
    /// Sounds by key
    pub sounds: KeyedStorage<SoundInfo>,
}

impl AssetStorage {
    /// Create empty storages
    pub fn new() -> Self {
        Self::default()
    }

    /// Drop every registered item
    pub fn clear(&mut self) {
        self.textures.clear();
        self.animations.clear();
        self.sounds.clear();
    }

    /// Total number of registered items
    pub fn len(&self) -> usize {
        self.textures.len() + self.animations.len() + self.sounds.len()
    }

    /// Whether nothing is registered
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
