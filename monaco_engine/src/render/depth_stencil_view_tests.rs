//! Unit tests for depth_stencil_view.rs

use crate::error::Error;
use crate::graphics_device::mock_graphics_device::{calls, mock_device_pair};
use crate::graphics_device::{BindFlags, Format};
use crate::render::{DepthStencilView, RenderTargetView, Texture};

#[test]
fn test_render_clears_depth_and_stencil() {
    let (device, mut context, log) = mock_device_pair();
    let mut depth = Texture::new();
    depth.init_target(&device, 8, 8, Format::D24_UNORM_S8_UINT, 1, BindFlags::DEPTH_STENCIL).unwrap();
    let mut view = DepthStencilView::new();
    view.init(&device, &depth, Format::D24_UNORM_S8_UINT).unwrap();
    log.lock().unwrap().clear();

    view.render(&mut context).unwrap();

    // DEPTH | STENCIL = 3
    assert_eq!(calls(&log), vec!["clear_depth_stencil_view(3,1,0)"]);
}

#[test]
fn test_color_format_rejected() {
    let (device, _context, _log) = mock_device_pair();
    let mut depth = Texture::new();
    depth.init_target(&device, 8, 8, Format::D32_FLOAT, 1, BindFlags::DEPTH_STENCIL).unwrap();

    let result = DepthStencilView::new().init(&device, &depth, Format::R8G8B8A8_UNORM);
    assert!(matches!(result, Err(Error::InvalidArgument(_))));
}

#[test]
fn test_bound_together_with_render_target() {
    let (device, mut context, log) = mock_device_pair();
    let mut color = Texture::new();
    color.init_target(&device, 8, 8, Format::R8G8B8A8_UNORM, 1, BindFlags::RENDER_TARGET).unwrap();
    let mut depth = Texture::new();
    depth.init_target(&device, 8, 8, Format::D32_FLOAT, 1, BindFlags::DEPTH_STENCIL).unwrap();
    let mut rtv = RenderTargetView::new();
    rtv.init(&device, &color, Format::R8G8B8A8_UNORM).unwrap();
    let mut dsv = DepthStencilView::new();
    dsv.init(&device, &depth, Format::D32_FLOAT).unwrap();
    log.lock().unwrap().clear();

    rtv.render(&mut context, &dsv, [0.0, 0.0, 0.0, 1.0]).unwrap();

    assert_eq!(calls(&log)[0], "om_set_render_targets(1,true)");
}

#[test]
fn test_destroy_is_idempotent() {
    let mut view = DepthStencilView::new();
    view.destroy();
    view.destroy();
    assert!(view.native().is_none());
}
