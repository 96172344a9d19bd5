//! Unit tests for render_target_view.rs

use crate::error::Error;
use crate::graphics_device::mock_graphics_device::{calls, mock_device_pair};
use crate::graphics_device::{BindFlags, Format};
use crate::render::{DepthStencilView, RenderTargetView, Texture};

#[test]
fn test_render_binds_then_clears() {
    let (device, mut context, log) = mock_device_pair();
    let mut target = Texture::new();
    target.init_target(&device, 8, 8, Format::R8G8B8A8_UNORM, 1, BindFlags::RENDER_TARGET).unwrap();
    let mut view = RenderTargetView::new();
    view.init(&device, &target, Format::R8G8B8A8_UNORM).unwrap();
    log.lock().unwrap().clear();

    view.render(&mut context, &DepthStencilView::new(), [0.1, 0.1, 0.1, 1.0]).unwrap();

    assert_eq!(calls(&log), vec![
        "om_set_render_targets(1,false)",
        "clear_render_target_view([0.1, 0.1, 0.1, 1.0])",
    ]);
}

#[test]
fn test_init_without_resource_fails() {
    let (device, _context, log) = mock_device_pair();
    let result = RenderTargetView::new().init(&device, &Texture::new(), Format::R8G8B8A8_UNORM);
    assert!(matches!(result, Err(Error::InvalidArgument(_))));
    assert!(calls(&log).is_empty());
}

#[test]
fn test_render_uninitialized_fails() {
    let (_device, mut context, log) = mock_device_pair();
    let result = RenderTargetView::new().render(&mut context, &DepthStencilView::new(), [0.0; 4]);
    assert!(result.is_err());
    assert!(calls(&log).is_empty());
}

#[test]
fn test_bind_only() {
    let (device, mut context, log) = mock_device_pair();
    let mut target = Texture::new();
    target.init_target(&device, 8, 8, Format::R8G8B8A8_UNORM, 1, BindFlags::RENDER_TARGET).unwrap();
    let mut view = RenderTargetView::new();
    view.init(&device, &target, Format::R8G8B8A8_UNORM).unwrap();
    log.lock().unwrap().clear();

    view.bind(&mut context, None);

    assert_eq!(calls(&log), vec!["om_set_render_targets(1,false)"]);
}

#[test]
fn test_destroy_is_idempotent() {
    let mut view = RenderTargetView::new();
    view.destroy();
    view.destroy();
    assert!(!view.is_valid());
}
