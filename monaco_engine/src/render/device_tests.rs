//! Unit tests for device.rs
//!
//! Validation happens before delegation: rejected calls never reach the
//! native device (checked through the mock call log).

use std::sync::{Arc, Mutex};
use crate::error::Error;
use crate::graphics_device::mock_graphics_device::{calls, CallLog, MockGraphicsDevice};
use crate::graphics_device::{
    BindFlags, BufferDesc, Format, InputElementDesc, SamplerDesc, ShaderStage, TextureDesc,
};
use crate::render::Device;

fn mock_device() -> (Device, CallLog) {
    let log: CallLog = Arc::new(Mutex::new(Vec::new()));
    (Device::from_native(Box::new(MockGraphicsDevice::new(log.clone()))), log)
}

// ============================================================================
// LIFECYCLE
// ============================================================================

#[test]
fn test_uninitialized_device_rejects_creation() {
    let device = Device::new();
    assert!(!device.is_valid());
    let desc = BufferDesc { byte_width: 16, bind: BindFlags::CONSTANT_BUFFER, stride: 0 };
    assert!(matches!(device.create_buffer(&desc, None), Err(Error::InvalidArgument(_))));
}

#[test]
fn test_destroy_is_idempotent() {
    let (mut device, _log) = mock_device();
    device.destroy();
    device.destroy();
    assert!(!device.is_valid());
}

// ============================================================================
// BUFFERS
// ============================================================================

#[test]
fn test_zero_width_buffer_never_reaches_backend() {
    let (device, log) = mock_device();
    let desc = BufferDesc { byte_width: 0, bind: BindFlags::VERTEX_BUFFER, stride: 32 };
    assert!(matches!(device.create_buffer(&desc, None), Err(Error::InvalidArgument(_))));
    assert!(calls(&log).is_empty());
}

#[test]
fn test_oversized_initial_data_is_rejected() {
    let (device, _log) = mock_device();
    let desc = BufferDesc { byte_width: 4, bind: BindFlags::INDEX_BUFFER, stride: 4 };
    let result = device.create_buffer(&desc, Some(&[0u8; 8]));
    assert!(matches!(result, Err(Error::InvalidArgument(_))));
}

#[test]
fn test_valid_buffer_is_created() {
    let (device, log) = mock_device();
    let desc = BufferDesc { byte_width: 64, bind: BindFlags::CONSTANT_BUFFER, stride: 0 };
    let buffer = device.create_buffer(&desc, None).unwrap();
    assert_eq!(buffer.desc().byte_width, 64);
    assert_eq!(calls(&log), vec!["create_buffer"]);
}

// ============================================================================
// TEXTURES AND VIEWS
// ============================================================================

#[test]
fn test_zero_sized_texture_is_rejected() {
    let (device, log) = mock_device();
    let desc = TextureDesc::new_2d(0, 600, Format::R8G8B8A8_UNORM, BindFlags::SHADER_RESOURCE);
    assert!(matches!(device.create_texture_2d(&desc, &[]), Err(Error::InvalidArgument(_))));
    assert!(calls(&log).is_empty());
}

#[test]
fn test_depth_format_requires_depth_bind() {
    let (device, _log) = mock_device();
    let desc = TextureDesc::new_2d(800, 600, Format::D24_UNORM_S8_UINT, BindFlags::SHADER_RESOURCE);
    assert!(device.create_texture_2d(&desc, &[]).is_err());
}

#[test]
fn test_short_mip_data_is_rejected() {
    let (device, _log) = mock_device();
    let desc = TextureDesc::new_2d(4, 4, Format::R8G8B8A8_UNORM, BindFlags::SHADER_RESOURCE);
    let data = vec![0u8; 10];
    assert!(device.create_texture_2d(&desc, &[&data]).is_err());
}

#[test]
fn test_view_requires_matching_bind_flag() {
    let (device, _log) = mock_device();
    let desc = TextureDesc::new_2d(8, 8, Format::R8G8B8A8_UNORM, BindFlags::SHADER_RESOURCE);
    let texture = device.create_texture_2d(&desc, &[]).unwrap();

    assert!(device.create_render_target_view(&texture, Format::R8G8B8A8_UNORM).is_err());
    assert!(device.create_depth_stencil_view(&texture, Format::D24_UNORM_S8_UINT).is_err());
    assert!(device.create_shader_resource_view(&texture, Format::R8G8B8A8_UNORM).is_ok());
}

// ============================================================================
// SHADERS
// ============================================================================

#[test]
fn test_compile_shader_requires_names() {
    let (device, _log) = mock_device();
    assert!(device.compile_shader("", "VS", ShaderStage::Vertex).is_err());
    assert!(device.compile_shader("shader.spv", "", ShaderStage::Vertex).is_err());
}

#[test]
fn test_pixel_bytecode_cannot_make_vertex_shader() {
    let (device, _log) = mock_device();
    let blob = device.compile_shader("shader.spv", "PS", ShaderStage::Pixel).unwrap();
    assert!(matches!(device.create_vertex_shader(&blob), Err(Error::InvalidArgument(_))));
    assert!(device.create_pixel_shader(&blob).is_ok());
}

#[test]
fn test_input_layout_resolves_offsets_before_backend() {
    let (device, _log) = mock_device();
    let blob = device.compile_shader("shader.spv", "VS", ShaderStage::Vertex).unwrap();
    let layout = vec![
        InputElementDesc::new("POSITION", Format::R32G32B32_FLOAT),
        InputElementDesc::new("TEXCOORD", Format::R32G32_FLOAT),
    ];

    let input_layout = device.create_input_layout(&layout, &blob).unwrap();
    assert_eq!(input_layout.elements()[1].aligned_byte_offset, 12);
}

#[test]
fn test_input_layout_mismatch_is_hard_failure() {
    let (device, log) = mock_device();
    let blob = device.compile_shader("shader.spv", "VS", ShaderStage::Vertex).unwrap();
    let layout = vec![InputElementDesc::new("POSITION", Format::R32G32B32_FLOAT)];

    assert!(matches!(device.create_input_layout(&layout, &blob), Err(Error::InvalidResource(_))));
    assert!(!calls(&log).contains(&"create_input_layout".to_string()));
}

// ============================================================================
// SAMPLERS
// ============================================================================

#[test]
fn test_sampler_validation() {
    let (device, _log) = mock_device();
    assert!(device.create_sampler_state(&SamplerDesc::default()).is_ok());

    let bad = SamplerDesc { max_anisotropy: 0, ..SamplerDesc::default() };
    assert!(device.create_sampler_state(&bad).is_err());

    let inverted = SamplerDesc { min_lod: 4.0, max_lod: 1.0, ..SamplerDesc::default() };
    assert!(device.create_sampler_state(&inverted).is_err());
}
