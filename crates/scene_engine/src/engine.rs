//! Core engine implementation
//!
//! The engine owns the scene root and drives the per-frame sequence:
//! propagate-if-dirty, update, draw, then the end-of-frame removal pass.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{
    assets::{AssetError, AssetStorage},
    config::{Config, ConfigError},
    events::{Event, EventBus, SharedReceiver},
    foundation::{math::Vec2, rect::RectF},
    render::Renderer,
    scene::{Camera, EntityBuilder, EntityId, ImageContent, SceneError, SceneGraph, Visual},
};

/// Main engine struct
///
/// The engine coordinates the scene, the camera, the content storages and
/// the event bus.
pub struct Engine {
    /// Entity arena and tree
    pub scene: SceneGraph,

    /// View applied to the root before drawing
    pub camera: Camera,

    /// Registered content descriptors
    pub assets: AssetStorage,

    /// Type-keyed event broadcast
    pub events: EventBus,

    root: EntityId,
    config: EngineConfig,
    frame_count: u64,
}

impl Engine {
    /// Create a new engine instance
    pub fn new(config: EngineConfig) -> Result<Self, EngineError> {
        log::info!("Initializing engine...");

        let ScreenConfig { width, height } = config.screen;
        if !(width > 0.0 && height > 0.0) {
            return Err(EngineError::InitializationFailed(format!(
                "Screen size must be positive, got {width}x{height}"
            )));
        }

        let mut scene = SceneGraph::new();
        let root = scene.spawn_root(EntityBuilder::container(width, height).name("root"));

        let mut camera = Camera::new(config.camera.x, config.camera.y, width, height);
        camera.set_boundaries(config.camera.boundaries);

        log::info!("Engine ready: {width}x{height} screen, camera {}", if config.use_camera { "on" } else { "off" });

        Ok(Self {
            scene,
            camera,
            assets: AssetStorage::new(),
            events: EventBus::new(),
            root,
            config,
            frame_count: 0,
        })
    }

    /// Scene root
    pub fn root(&self) -> EntityId {
        self.root
    }

    /// Engine configuration
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Frames completed by [`Engine::frame`]
    pub fn frame_count(&self) -> u64 {
        self.frame_count
    }

    /// Attach an entity to the root
    pub fn add_child(&mut self, child: EntityId) -> Result<EntityId, EngineError> {
        self.scene.add_child(self.root, child).map_err(|e| {
            log::warn!("Rejected attach of {child:?}: {e}");
            EngineError::from(e)
        })
    }

    /// Detach an entity from the root immediately
    pub fn remove_child(&mut self, child: EntityId) -> Result<(), EngineError> {
        self.scene.remove_child(self.root, child).map_err(|e| {
            log::warn!("Rejected detach of {child:?}: {e}");
            EngineError::from(e)
        })
    }

    /// Queue an entity for detachment from its parent at the end of the frame
    pub fn mark_for_removal(&mut self, entity: EntityId) -> Result<(), EngineError> {
        let parent = self.scene.parent(entity).ok_or(SceneError::NotMyChild)?;
        self.scene.remove_child_deferred(parent, entity)?;
        Ok(())
    }

    /// Create a detached image entity sized from a registered texture
    pub fn spawn_image(&mut self, key: &str) -> Result<EntityId, EngineError> {
        let texture = *self.assets.textures.require(key)?;
        let builder = EntityBuilder::image(texture.width, texture.height).visual(Visual::Image(ImageContent {
            texture: Some(key.to_owned()),
            ..ImageContent::default()
        }));
        Ok(self.scene.spawn(builder))
    }

    /// Create a detached animation entity sized from a registered descriptor
    pub fn spawn_animation(&mut self, key: &str) -> Result<EntityId, EngineError> {
        let descriptor = self.assets.animations.require(key)?;
        let builder = EntityBuilder::animation(
            descriptor.instantiate(key),
            descriptor.frame_width,
            descriptor.frame_height,
        );
        Ok(self.scene.spawn(builder))
    }

    /// Update the scene
    pub fn update(&mut self, delta_time: f32) -> Result<(), EngineError> {
        self.propagate_if_dirty();
        self.scene.update(self.root, delta_time)?;
        Ok(())
    }

    /// Draw the scene; returns the number of draw commands issued
    pub fn draw(&mut self, renderer: &mut dyn Renderer) -> Result<usize, EngineError> {
        if self.config.use_camera {
            self.apply_camera()?;
        }
        self.propagate_if_dirty();

        let redraw = RectF::new(0.0, 0.0, self.config.screen.width, self.config.screen.height);
        Ok(self.scene.draw(self.root, &redraw, None, renderer))
    }

    /// Process the deferred-removal queue in FIFO order
    ///
    /// Each entity is detached from whatever parent it has now and freed.
    /// Entities freed since they were queued are skipped. Returns the number
    /// of entities removed.
    pub fn post_draw(&mut self) -> Result<usize, EngineError> {
        let queue = self.scene.drain_removals();
        let mut removed = 0;

        for entity in queue {
            if !self.scene.contains(entity) {
                continue;
            }
            self.scene.free(entity, false)?;
            removed += 1;
        }

        if removed > 0 {
            log::debug!("Removed {removed} entities at end of frame {}", self.frame_count);
        }
        Ok(removed)
    }

    /// Run one full frame: update, draw, end-of-frame removals
    pub fn frame(&mut self, delta_time: f32, renderer: &mut dyn Renderer) -> Result<usize, EngineError> {
        self.update(delta_time)?;
        let drawn = self.draw(renderer)?;
        self.post_draw()?;

        self.frame_count += 1;
        log::debug!("Frame {} drew {drawn} entities", self.frame_count);
        Ok(drawn)
    }

    /// Register a receiver for an event type
    pub fn register_event_receiver(&mut self, receiver: &SharedReceiver, event_type: &str) -> bool {
        self.events.register(receiver, event_type)
    }

    /// Unregister a receiver from an event type
    pub fn unregister_event_receiver(&mut self, receiver: &SharedReceiver, event_type: &str) -> bool {
        self.events.unregister(receiver, event_type)
    }

    /// Unregister a receiver from every event type
    pub fn unregister_from_all_events(&mut self, receiver: &SharedReceiver) -> usize {
        self.events.unregister_all(receiver)
    }

    /// Deliver an event to its live receivers
    pub fn broadcast_event(&mut self, event: &Event) -> usize {
        self.events.broadcast(event)
    }

    /// Release the scene and every registered resource
    ///
    /// The root survives with no children so the engine stays usable.
    pub fn shutdown(&mut self) -> Result<(), EngineError> {
        log::info!("Shutting down engine after {} frames", self.frame_count);
        self.events.clear();
        self.scene.drain_removals();
        self.scene.clear(self.root)?;
        self.assets.clear();
        Ok(())
    }

    fn propagate_if_dirty(&mut self) {
        if self.scene.is_dirty(self.root) {
            log::trace!("Propagating transforms from root");
            self.scene.apply_transform_recursive(self.root);
        }
    }

    fn apply_camera(&mut self) -> Result<(), SceneError> {
        let scale = Vec2::new(self.camera.scale_x(), self.camera.scale_y());
        let position = Vec2::new(-self.camera.x() / scale.x, -self.camera.y() / scale.y);

        self.scene.set_position(self.root, position)?;
        self.scene.set_scale(self.root, Vec2::new(1.0 / scale.x, 1.0 / scale.y))
    }
}

/// Screen dimensions
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScreenConfig {
    /// Screen width
    pub width: f32,
    /// Screen height
    pub height: f32,
}

impl Default for ScreenConfig {
    fn default() -> Self {
        Self {
            width: 640.0,
            height: 480.0,
        }
    }
}

/// Initial camera placement
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct CameraConfig {
    /// Left edge
    pub x: f32,
    /// Top edge
    pub y: f32,
    /// Region the view is kept inside
    #[serde(default)]
    pub boundaries: Option<RectF>,
}

/// Engine configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Screen size, also the size of the root and the redraw region
    pub screen: ScreenConfig,

    /// Whether the camera drives the root transform
    pub use_camera: bool,

    /// Initial camera placement
    pub camera: CameraConfig,

    /// Log filter used by hosts when initialising the logger
    pub log_level: String,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            screen: ScreenConfig::default(),
            use_camera: true,
            camera: CameraConfig::default(),
            log_level: "info".to_string(),
        }
    }
}

impl Config for EngineConfig {}

/// Engine-level errors
#[derive(Error, Debug)]
pub enum EngineError {
    /// Initialization error
    #[error("Engine initialization failed: {0}")]
    InitializationFailed(String),

    /// Structural scene error
    #[error("Scene error: {0}")]
    Scene(#[from] SceneError),

    /// Content storage error
    #[error("Asset error: {0}")]
    Asset(#[from] AssetError),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use super::*;
    use crate::assets::{AnimationDescriptor, TextureInfo};
    use crate::config::ConfigFormat;
    use crate::events::EventReceiver;
    use crate::render::RecordingRenderer;

    fn engine() -> Engine {
        Engine::new(EngineConfig::default()).unwrap()
    }

    #[test]
    fn test_rejects_empty_screen() {
        let config = EngineConfig {
            screen: ScreenConfig { width: 0.0, height: 480.0 },
            ..EngineConfig::default()
        };

        assert!(matches!(Engine::new(config), Err(EngineError::InitializationFailed(_))));
    }

    #[test]
    fn test_spawn_from_registered_content() {
        let mut engine = engine();
        engine.assets.textures.add("ship", TextureInfo { width: 32.0, height: 16.0 }).unwrap();
        engine
            .assets
            .animations
            .add(
                "boom",
                AnimationDescriptor {
                    frame_width: 24.0,
                    frame_height: 24.0,
                    frame_count: 8,
                    frames_per_second: 16.0,
                    looping: false,
                },
            )
            .unwrap();

        let ship = engine.spawn_image("ship").unwrap();
        let boom = engine.spawn_animation("boom").unwrap();

        assert_eq!(engine.scene.get(ship).unwrap().original_size(), Vec2::new(32.0, 16.0));
        assert_eq!(engine.scene.get(boom).unwrap().original_size(), Vec2::new(24.0, 24.0));
        assert!(matches!(
            engine.spawn_image("missing"),
            Err(EngineError::Asset(AssetError::NotFound(_)))
        ));
    }

    #[test]
    fn test_frame_draws_attached_entities() {
        let mut engine = engine();
        let a = engine.scene.spawn(EntityBuilder::image(10.0, 10.0).position(5.0, 5.0));
        engine.add_child(a).unwrap();

        let mut renderer = RecordingRenderer::new();
        let drawn = engine.frame(1.0 / 60.0, &mut renderer).unwrap();

        assert_eq!(drawn, 2);
        assert_eq!(engine.frame_count(), 1);
        assert!(!engine.scene.is_dirty(engine.root()));
    }

    #[test]
    fn test_camera_moves_root() {
        let mut engine = engine();
        let a = engine.scene.spawn(EntityBuilder::image(10.0, 10.0).position(100.0, 100.0));
        engine.add_child(a).unwrap();
        engine.camera.set_position(50.0, 20.0);

        let mut renderer = RecordingRenderer::new();
        engine.draw(&mut renderer).unwrap();

        let position = engine.scene.get(a).unwrap().absolute().position;
        assert_eq!(position, Vec2::new(50.0, 80.0));
    }

    #[test]
    fn test_zero_camera_zoom_keeps_root_finite() {
        let mut engine = engine();
        engine.camera.set_position(10.0, 0.0);
        engine.camera.set_scale(0.0, 0.0);

        engine.draw(&mut RecordingRenderer::new()).unwrap();

        let root = engine.scene.get(engine.root()).unwrap();
        assert_eq!(root.scale(), Vec2::new(1.0, 1.0));
        assert_eq!(root.position(), Vec2::new(-10.0, 0.0));
    }

    #[test]
    fn test_attach_errors_surface() {
        let mut engine = engine();
        let a = engine.scene.spawn(EntityBuilder::new());
        engine.add_child(a).unwrap();
        let root = engine.root();

        assert!(matches!(
            engine.scene.add_child(a, root),
            Err(SceneError::CyclicGraph)
        ));
        assert!(matches!(
            engine.mark_for_removal(root),
            Err(EngineError::Scene(SceneError::NotMyChild))
        ));
    }

    #[test]
    fn test_events_forward_to_bus() {
        struct Counter(usize);
        impl EventReceiver for Counter {
            fn receive_event(&mut self, _event: &Event) {
                self.0 += 1;
            }
        }

        let mut engine = engine();
        let counter = Rc::new(RefCell::new(Counter(0)));
        let shared: SharedReceiver = counter.clone();

        assert!(engine.register_event_receiver(&shared, "tick"));
        assert_eq!(engine.broadcast_event(&Event::new("tick")), 1);
        assert!(engine.unregister_event_receiver(&shared, "tick"));
        assert_eq!(engine.broadcast_event(&Event::new("tick")), 0);
        assert_eq!(counter.borrow().0, 1);
        assert_eq!(engine.unregister_from_all_events(&shared), 0);
    }

    #[test]
    fn test_shutdown_releases_everything() {
        let mut engine = engine();
        engine.assets.textures.add("ship", TextureInfo { width: 8.0, height: 8.0 }).unwrap();
        let ship = engine.spawn_image("ship").unwrap();
        engine.add_child(ship).unwrap();

        engine.shutdown().unwrap();

        assert!(!engine.scene.contains(ship));
        assert!(engine.scene.contains(engine.root()));
        assert!(engine.assets.is_empty());
    }

    #[test]
    fn test_config_parses_partial_toml() {
        let config = EngineConfig::from_str_as(
            "use_camera = false\n[screen]\nwidth = 800.0\nheight = 600.0\n",
            ConfigFormat::Toml,
        )
        .unwrap();

        assert_eq!(config.screen, ScreenConfig { width: 800.0, height: 600.0 });
        assert!(!config.use_camera);
        assert_eq!(config.log_level, "info");
        assert_eq!(config.camera, CameraConfig::default());
    }
}
