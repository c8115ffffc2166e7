//! # Scene Engine
//!
//! A retained-mode 2D scene graph written in Rust.
//!
//! ## Features
//!
//! - **Scene Graph**: Arena-backed entity tree with transform propagation
//! - **Lazy Bounds**: Dirty-gated area refresh for culling and queries
//! - **Queries**: Point picking, rectangle, segment and entity overlap, raycasts
//! - **Events**: Type-keyed broadcast with weakly held receivers
//! - **Backend Agnostic**: Drawing goes through the [`render::Renderer`] trait
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use scene_engine::prelude::*;
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let mut engine = Engine::new(EngineConfig::default())?;
//!
//!     let ship = engine.scene.spawn(EntityBuilder::image(32.0, 32.0).position(100.0, 50.0));
//!     engine.add_child(ship)?;
//!
//!     let mut renderer = RecordingRenderer::new();
//!     engine.frame(1.0 / 60.0, &mut renderer)?;
//!
//!     let picked = engine.scene.get_at_point(engine.root(), Vec2::new(110.0, 60.0), CollisionMask::ALL);
//!     assert_eq!(picked, Some(ship));
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]

pub mod assets;
pub mod config;
pub mod events;
pub mod foundation;
pub mod physics;
pub mod render;
pub mod scene;

mod engine;

pub use engine::{CameraConfig, Engine, EngineConfig, EngineError, ScreenConfig};

/// Common imports for engine users
pub mod prelude {
    pub use crate::{
        assets::{AnimationDescriptor, AssetError, AssetStorage, SoundInfo, TextureInfo},
        config::{Config, ConfigFormat},
        events::{Event, EventArg, EventBus, EventReceiver, SharedReceiver},
        foundation::{
            math::{Color, Vec2},
            rect::RectF,
        },
        physics::CollisionMask,
        render::{DrawCommand, RecordingRenderer, Renderer},
        scene::{Behavior, Camera, EntityBuilder, EntityId, RaycastResult, SceneError, SceneGraph, Visual},
        Engine, EngineConfig, EngineError,
    };
}
