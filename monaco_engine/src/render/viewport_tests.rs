//! Unit tests for viewport.rs and sampler_state.rs

use crate::error::Error;
use crate::graphics_device::mock_graphics_device::{calls, mock_device_pair, MockWindow};
use crate::graphics_device::{AddressMode, Filter, SamplerDesc};
use crate::render::{SamplerState, Viewport};

// ============================================================================
// VIEWPORT
// ============================================================================

#[test]
fn test_viewport_from_window() {
    let (_device, mut context, log) = mock_device_pair();
    let mut viewport = Viewport::new();

    viewport.init_from_window(&MockWindow { width: 1280, height: 720 }).unwrap();
    viewport.render(&mut context);

    assert_eq!(viewport.desc().max_depth, 1.0);
    assert!((viewport.aspect_ratio() - 1280.0 / 720.0).abs() < 1e-6);
    assert_eq!(calls(&log), vec!["rs_set_viewports([(1280.0, 720.0)])"]);
}

#[test]
fn test_viewport_zero_size_rejected() {
    let mut viewport = Viewport::new();
    assert!(matches!(viewport.init(0, 600), Err(Error::InvalidArgument(_))));
    assert!(matches!(viewport.init(800, 0), Err(Error::InvalidArgument(_))));
    assert_eq!(viewport.aspect_ratio(), 1.0);
}

#[test]
fn test_uninitialized_viewport_not_bound() {
    let (_device, mut context, log) = mock_device_pair();
    Viewport::new().render(&mut context);
    assert!(calls(&log).is_empty());
}

// ============================================================================
// SAMPLER STATE
// ============================================================================

#[test]
fn test_default_sampler_is_linear_wrap() {
    let (device, mut context, log) = mock_device_pair();
    let mut sampler = SamplerState::new();

    sampler.init(&device).unwrap();
    sampler.render(&mut context, 0);

    let desc = sampler.desc().unwrap();
    assert_eq!(desc.filter, Filter::Linear);
    assert_eq!(desc.address_u, AddressMode::Wrap);
    assert_eq!(desc.min_lod, 0.0);
    assert_eq!(desc.max_lod, f32::MAX);
    assert_eq!(calls(&log), vec!["create_sampler_state", "ps_set_samplers(0,1)"]);
}

#[test]
fn test_invalid_sampler_desc_rejected() {
    let (device, _context, _log) = mock_device_pair();
    let desc = SamplerDesc { max_anisotropy: 0, ..Default::default() };
    let mut sampler = SamplerState::new();
    assert!(sampler.init_with_desc(&device, &desc).is_err());
    assert!(!sampler.is_valid());
}

#[test]
fn test_sampler_destroy_is_idempotent() {
    let (device, _context, _log) = mock_device_pair();
    let mut sampler = SamplerState::new();
    sampler.init(&device).unwrap();
    sampler.destroy();
    sampler.destroy();
    assert!(sampler.desc().is_none());
}
