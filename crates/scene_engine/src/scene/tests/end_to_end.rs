//! Whole-frame scenarios: build a tree, run frames, query the result

use approx::assert_relative_eq;

use crate::foundation::math::Vec2;
use crate::foundation::rect::RectF;
use crate::physics::CollisionMask;
use crate::render::RecordingRenderer;
use crate::scene::{EntityBuilder, SceneError};
use crate::{Engine, EngineConfig};

#[cfg(test)]
mod tests {
    use super::*;

    fn engine() -> Engine {
        Engine::new(EngineConfig::default()).unwrap()
    }

    #[test]
    fn test_pick_nested_entity_after_frame() {
        let mut engine = engine();
        let a = engine.scene.spawn(EntityBuilder::image(20.0, 20.0).name("A").position(100.0, 50.0));
        let b = engine.scene.spawn(EntityBuilder::image(10.0, 10.0).name("B").position(5.0, 5.0));
        engine.add_child(a).unwrap();
        engine.scene.add_child(a, b).unwrap();

        let mut renderer = RecordingRenderer::new();
        engine.frame(1.0 / 60.0, &mut renderer).unwrap();

        let root = engine.root();
        assert_eq!(engine.scene.get_at_point(root, Vec2::new(107.0, 57.0), CollisionMask::ALL), Some(b));
        assert_eq!(engine.scene.get_at_point(root, Vec2::new(200.0, 200.0), CollisionMask::ALL), None);
        assert_eq!(engine.scene.entity_named(root, "B", false), Some(b));
    }

    #[test]
    fn test_container_area_is_union_of_children() {
        let mut engine = engine();
        let group = engine.scene.spawn(EntityBuilder::new());
        let first = engine.scene.spawn(EntityBuilder::image(10.0, 10.0));
        let second = engine.scene.spawn(EntityBuilder::image(10.0, 10.0).position(15.0, 15.0));
        engine.add_child(group).unwrap();
        engine.scene.add_child(group, first).unwrap();
        engine.scene.add_child(group, second).unwrap();

        engine.draw(&mut RecordingRenderer::new()).unwrap();

        assert_eq!(engine.scene.get_area(group, true), Some(RectF::new(0.0, 0.0, 25.0, 25.0)));
        assert_eq!(engine.scene.get_area(engine.root(), true), Some(RectF::new(0.0, 0.0, 25.0, 25.0)));
    }

    #[test]
    fn test_rotation_composes_down_the_tree() {
        let mut engine = engine();
        let arm = engine.scene.spawn(EntityBuilder::new().position(100.0, 50.0).rotation(90.0));
        let hand = engine.scene.spawn(EntityBuilder::image(4.0, 4.0).position(10.0, 0.0));
        engine.add_child(arm).unwrap();
        engine.scene.add_child(arm, hand).unwrap();

        engine.draw(&mut RecordingRenderer::new()).unwrap();

        let abs = engine.scene.get(hand).unwrap().absolute();
        assert_relative_eq!(abs.position.x, 100.0, epsilon = 1e-4);
        assert_relative_eq!(abs.position.y, 60.0, epsilon = 1e-4);
        assert_relative_eq!(abs.rotation, 90.0, epsilon = 1e-4);
    }

    #[test]
    fn test_cycle_rejected_through_engine() {
        let mut engine = engine();
        let a = engine.scene.spawn(EntityBuilder::new());
        let b = engine.scene.spawn(EntityBuilder::new());
        engine.add_child(a).unwrap();
        engine.scene.add_child(a, b).unwrap();

        engine.scene.remove_child(engine.root(), a).unwrap();
        assert!(matches!(engine.scene.add_child(b, a), Err(SceneError::CyclicGraph)));
        assert_eq!(engine.scene.parent(b), Some(a));
        assert_eq!(engine.scene.parent(a), None);
    }

    #[test]
    fn test_mutation_converges_after_next_frame() {
        let mut engine = engine();
        let ship = engine.scene.spawn(EntityBuilder::image(10.0, 10.0));
        engine.add_child(ship).unwrap();
        let mut renderer = RecordingRenderer::new();
        engine.frame(0.0, &mut renderer).unwrap();

        engine.scene.set_position(ship, Vec2::new(40.0, 30.0)).unwrap();
        assert!(engine.scene.is_dirty(engine.root()));

        engine.frame(0.0, &mut renderer).unwrap();

        let root = engine.root();
        assert!(!engine.scene.is_dirty(root));
        assert_eq!(engine.scene.get(ship).unwrap().bounds().area, RectF::new(40.0, 30.0, 10.0, 10.0));
        assert_eq!(engine.scene.get_at_point(root, Vec2::new(45.0, 35.0), CollisionMask::ALL), Some(ship));
        assert_eq!(engine.scene.get_at_point(root, Vec2::new(5.0, 5.0), CollisionMask::ALL), None);
    }

    #[test]
    fn test_camera_offsets_draw_position() {
        let mut engine = engine();
        let ship = engine.scene.spawn(EntityBuilder::image(10.0, 10.0).position(300.0, 200.0));
        engine.add_child(ship).unwrap();
        engine.camera.set_position(100.0, 50.0);

        let mut renderer = RecordingRenderer::new();
        engine.frame(0.0, &mut renderer).unwrap();

        let draw = renderer.commands().iter().find(|c| c.entity == ship).unwrap();
        assert_eq!(draw.position, Vec2::new(200.0, 150.0));
    }
}
