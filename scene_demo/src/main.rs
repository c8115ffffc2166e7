//! Headless asteroid field: a ship fires bullets into drifting rocks
//!
//! Runs a fixed number of frames against a logging renderer and reports
//! hits through the event bus.

use std::cell::RefCell;
use std::rc::Rc;

use rand::Rng;
use serde::{Deserialize, Serialize};

use scene_engine::foundation::logging;
use scene_engine::prelude::*;

// Field configuration
const DEFAULT_CONFIG_PATH: &str = "scene_demo.toml";
const BULLET_SPEED: f32 = 400.0;
const BULLET_LIFETIME: f32 = 1.5;
const FIRE_INTERVAL: f32 = 0.25;
const ROCK_SPIN: f32 = 45.0;  // Degrees per second
const FRAME_TIME: f32 = 1.0 / 60.0;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
struct DemoConfig {
    engine: EngineConfig,
    frames: u32,
    rock_count: usize,
}

impl Default for DemoConfig {
    fn default() -> Self {
        Self {
            engine: EngineConfig::default(),
            frames: 240,
            rock_count: 12,
        }
    }
}

impl Config for DemoConfig {}

/// Renderer that only logs what it is asked to draw
#[derive(Default)]
struct LogRenderer {
    draws: usize,
}

impl Renderer for LogRenderer {
    fn draw_entity(&mut self, command: &DrawCommand<'_>) {
        self.draws += 1;
        log::trace!(
            "draw {} {:?} at ({:.1}, {:.1}) rot {:.1}",
            command.visual.kind(),
            command.name.unwrap_or("-"),
            command.position.x,
            command.position.y,
            command.rotation_degrees
        );
    }
}

/// Counts destroyed rocks
#[derive(Default)]
struct Scoreboard {
    destroyed: usize,
}

impl EventReceiver for Scoreboard {
    fn receive_event(&mut self, event: &Event) {
        self.destroyed += 1;
        if let Some(at) = event.get_position("at") {
            log::info!("Rock destroyed at ({:.0}, {:.0}), total {}", at.x, at.y, self.destroyed);
        }
    }
}

/// Straight-line projectile that expires after a while
struct Bullet {
    velocity: Vec2,
    life: f32,
}

impl Behavior for Bullet {
    fn update(&mut self, scene: &mut SceneGraph, entity: EntityId, delta_time: f32) -> Result<(), SceneError> {
        self.life -= delta_time;
        if self.life <= 0.0 {
            let parent = scene.parent(entity).ok_or(SceneError::NotMyChild)?;
            return scene.remove_child_deferred(parent, entity);
        }

        let position = scene.get(entity).map_or(Vec2::zeros(), |e| e.position());
        scene.set_position(entity, position + self.velocity * delta_time)
    }
}

struct AsteroidField {
    engine: Engine,
    ship: EntityId,
    rocks: EntityId,
    bullets: EntityId,
    scoreboard: Rc<RefCell<Scoreboard>>,
    receiver: SharedReceiver,
    fire_timer: f32,
}

impl AsteroidField {
    fn new(config: DemoConfig) -> Result<Self, EngineError> {
        let mut engine = Engine::new(config.engine)?;
        register_content(&mut engine)?;

        let ship = engine.spawn_image("ship")?;
        let screen = engine.config().screen;
        engine.scene.set_name(ship, Some("ship".into()))?;
        engine.scene.set_position(ship, Vec2::new(40.0, screen.height / 2.0))?;
        engine.scene.set_collision_mask(ship, CollisionMask::PLAYER)?;
        engine.add_child(ship)?;

        let rocks = engine.scene.spawn(EntityBuilder::new().name("rocks").collision_mask(CollisionMask::ENEMY));
        let bullets = engine.scene.spawn(EntityBuilder::new().name("bullets").collision_mask(CollisionMask::PROJECTILE));
        engine.add_child(rocks)?;
        engine.add_child(bullets)?;

        let mut rng = rand::thread_rng();
        for i in 0..config.rock_count {
            let rock = engine.spawn_image("rock")?;
            let x = rng.gen_range(screen.width * 0.4..screen.width - 40.0);
            let y = rng.gen_range(20.0..screen.height - 40.0);
            let spin = if i % 2 == 0 { ROCK_SPIN } else { -ROCK_SPIN };

            engine.scene.set_name(rock, Some(format!("rock{i}")))?;
            engine.scene.set_position(rock, Vec2::new(x, y))?;
            engine.scene.set_collision_mask(rock, CollisionMask::ENEMY)?;
            engine.scene.set_collision(rock, Some(RectF::new(4.0, 4.0, 24.0, 24.0)))?;
            engine.scene.set_behavior(
                rock,
                Some(Box::new(move |scene: &mut SceneGraph, id: EntityId, dt: f32| {
                    let rotation = scene.get(id).map_or(0.0, |e| e.rotation());
                    scene.set_rotation(id, rotation + spin * dt)
                })),
            )?;
            engine.scene.add_child(rocks, rock)?;
        }

        let scoreboard = Rc::new(RefCell::new(Scoreboard::default()));
        let receiver: SharedReceiver = scoreboard.clone();
        engine.register_event_receiver(&receiver, "rock_destroyed");

        Ok(Self {
            engine,
            ship,
            rocks,
            bullets,
            scoreboard,
            receiver,
            fire_timer: 0.0,
        })
    }

    fn step(&mut self, renderer: &mut LogRenderer) -> Result<(), EngineError> {
        self.fire_timer -= FRAME_TIME;
        if self.fire_timer <= 0.0 {
            self.fire()?;
            self.fire_timer = FIRE_INTERVAL;
        }

        self.engine.frame(FRAME_TIME, renderer)?;
        self.resolve_hits()
    }

    fn fire(&mut self) -> Result<(), EngineError> {
        let ship = self.engine.scene.get(self.ship).map_or(Vec2::zeros(), |e| e.position());
        let mut rng = rand::thread_rng();
        let direction = Vec2::new(1.0, rng.gen_range(-0.3..0.3)).normalize();

        let bullet = self.engine.scene.spawn(
            EntityBuilder::image(4.0, 4.0)
                .position(ship.x + 32.0, ship.y + 8.0)
                .collision_mask(CollisionMask::PROJECTILE)
                .behavior(Bullet {
                    velocity: direction * BULLET_SPEED,
                    life: BULLET_LIFETIME,
                }),
        );
        self.engine.scene.add_child(self.bullets, bullet)?;

        let root = self.engine.root();
        let ray = self.engine.scene.raycast(
            root,
            ship,
            ship + direction * BULLET_SPEED * BULLET_LIFETIME,
            CollisionMask::ENEMY,
        );
        if let Some(target) = ray.entity.filter(|_| ray.hit) {
            log::debug!("Bullet heading for {target:?} at {:.0}% of its range", ray.ratio * 100.0);
        }
        Ok(())
    }

    fn resolve_hits(&mut self) -> Result<(), EngineError> {
        let mut pending: Vec<EntityId> = self.engine.scene.pending_removals().collect();

        for bullet in self.engine.scene.snapshot_children(self.bullets) {
            if pending.contains(&bullet) {
                continue;
            }
            let hits = self.engine.scene.query_entity(self.rocks, bullet, CollisionMask::ENEMY, false);
            let Some(&rock) = hits.first() else {
                continue;
            };
            if pending.contains(&rock) {
                continue;
            }

            let at = self.engine.scene.get(rock).map_or(Vec2::zeros(), |e| e.position());
            self.engine.mark_for_removal(rock)?;
            self.engine.mark_for_removal(bullet)?;
            pending.push(rock);
            self.engine.broadcast_event(
                &Event::new("rock_destroyed")
                    .from_entity(bullet)
                    .with_arg("rock", EventArg::Entity(rock))
                    .with_arg("at", EventArg::Position(at)),
            );
        }
        Ok(())
    }
}

fn register_content(engine: &mut Engine) -> Result<(), AssetError> {
    engine.assets.textures.add("ship", TextureInfo { width: 32.0, height: 16.0 })?;
    engine.assets.textures.add("rock", TextureInfo { width: 32.0, height: 32.0 })?;
    engine.assets.animations.add(
        "explosion",
        AnimationDescriptor {
            frame_width: 32.0,
            frame_height: 32.0,
            frame_count: 8,
            frames_per_second: 24.0,
            looping: false,
        },
    )?;
    Ok(())
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config_path = std::env::args().nth(1).unwrap_or_else(|| DEFAULT_CONFIG_PATH.to_string());
    let config = DemoConfig::load_or_default(&config_path)?;
    logging::init_with_level(logging::parse_level(&config.engine.log_level));

    log::info!("Starting asteroid field with {} rocks for {} frames", config.rock_count, config.frames);
    let frames = config.frames;
    let mut field = AsteroidField::new(config)?;
    let mut renderer = LogRenderer::default();

    for _ in 0..frames {
        field.step(&mut renderer)?;
    }

    let root = field.engine.root();
    let remaining = field.engine.scene.num_children(field.rocks);
    let cockpit = Vec2::new(50.0, field.engine.config().screen.height / 2.0 + 4.0);
    let picked = field.engine.scene.get_at_point(root, cockpit, CollisionMask::ALL);
    log::info!(
        "Finished {} frames: {} draws, {} rocks destroyed, {} remaining, ship picked: {}",
        field.engine.frame_count(),
        renderer.draws,
        field.scoreboard.borrow().destroyed,
        remaining,
        picked == Some(field.ship)
    );

    field.engine.unregister_from_all_events(&field.receiver);
    field.engine.shutdown()?;
    Ok(())
}
