//! Unit tests for scene.rs

use glam::{Vec2, Vec3};
use crate::graphics_device::mock_graphics_device::{calls, mock_device_pair, position_of};
use crate::render::Device;
use crate::scene::{Actor, MeshComponent, Scene, SimpleVertex};

fn actor_with_triangle(device: &Device, name: &str) -> Actor {
    let mut actor = Actor::new(device, name).unwrap();
    let mesh = MeshComponent {
        name: name.to_string(),
        vertices: vec![SimpleVertex::new(Vec3::ZERO, Vec2::ZERO, Vec3::Y); 3],
        indices: vec![0, 1, 2],
    };
    actor.set_mesh(device, &[mesh]).unwrap();
    actor
}

#[test]
fn test_add_and_find() {
    let (device, _context, _log) = mock_device_pair();
    let mut scene = Scene::new();

    let first = scene.add_actor(actor_with_triangle(&device, "first"));
    let second = scene.add_actor(actor_with_triangle(&device, "second"));

    assert_eq!((first, second), (0, 1));
    assert_eq!(scene.find_actor("second"), Some(1));
    assert_eq!(scene.find_actor("missing"), None);
    assert_eq!(scene.actor(0).unwrap().name(), "first");
}

#[test]
fn test_update_then_render_in_actor_order() {
    let (device, mut context, log) = mock_device_pair();
    let mut scene = Scene::new();
    scene.add_actor(actor_with_triangle(&device, "a"));
    scene.add_actor(actor_with_triangle(&device, "b"));
    log.lock().unwrap().clear();

    scene.update(0.0, &mut context).unwrap();
    scene.render(&mut context).unwrap();

    let recorded = calls(&log);
    let updates = recorded.iter().filter(|c| c.starts_with("update_subresource")).count();
    let draws = recorded.iter().filter(|c| c.starts_with("draw_indexed(3,0,0)")).count();
    assert_eq!((updates, draws), (2, 2));
    assert!(position_of(&log, "update_subresource").unwrap() < position_of(&log, "draw_indexed").unwrap());
}

#[test]
fn test_remove_actor() {
    let (device, _context, _log) = mock_device_pair();
    let mut scene = Scene::new();
    scene.add_actor(actor_with_triangle(&device, "a"));
    scene.add_actor(actor_with_triangle(&device, "b"));

    let removed = scene.remove_actor(0).unwrap();

    assert_eq!(removed.mesh_count(), 0);
    assert_eq!(scene.len(), 1);
    assert_eq!(scene.find_actor("b"), Some(0));
    assert!(scene.remove_actor(5).is_none());
}

#[test]
fn test_destroy_twice() {
    let (device, _context, _log) = mock_device_pair();
    let mut scene = Scene::new();
    scene.add_actor(actor_with_triangle(&device, "a"));
    scene.destroy();
    scene.destroy();
    assert!(scene.is_empty());
}
