//! Unit tests for shader_program.rs (and the input layout it owns)

use std::sync::{Arc, Mutex};
use crate::error::Error;
use crate::graphics_device::mock_graphics_device::{calls, mock_device_pair, CallLog, MockGraphicsDevice};
use crate::graphics_device::{Format, InputElementDesc};
use crate::render::{Device, ShaderProgram};
use crate::scene::SimpleVertex;

fn failing_device(fail_on: &str) -> (Device, CallLog) {
    let log: CallLog = Arc::new(Mutex::new(Vec::new()));
    let mut mock = MockGraphicsDevice::new(log.clone());
    mock.fail_on.push(fail_on.to_string());
    (Device::from_native(Box::new(mock)), log)
}

// ============================================================================
// INIT
// ============================================================================

#[test]
fn test_init_creation_order() {
    let (device, _context, log) = mock_device_pair();
    let mut program = ShaderProgram::new();

    program.init(&device, "MonacoEngine2.spv", &SimpleVertex::input_layout()).unwrap();

    assert!(program.is_valid());
    assert_eq!(calls(&log), vec![
        "compile_shader:VS",
        "create_vertex_shader",
        "create_input_layout",
        "compile_shader:PS",
        "create_pixel_shader",
    ]);
    // offsets resolved for the packed vertex
    let offsets: Vec<u32> = program.input_layout().elements().iter().map(|e| e.aligned_byte_offset).collect();
    assert_eq!(offsets, vec![0, 12, 20]);
}

#[test]
fn test_pixel_compile_failure_aborts() {
    let (device, log) = failing_device("compile_shader:PS");
    let mut program = ShaderProgram::new();

    let result = program.init(&device, "broken.spv", &SimpleVertex::input_layout());

    assert!(matches!(result, Err(Error::InitializationFailed(_))));
    assert!(!program.is_valid());
    assert!(!program.input_layout().is_valid());
    assert!(!calls(&log).contains(&"create_pixel_shader".to_string()));
}

#[test]
fn test_vertex_compile_failure_stops_before_layout() {
    let (device, log) = failing_device("compile_shader:VS");

    assert!(ShaderProgram::new().init(&device, "broken.spv", &SimpleVertex::input_layout()).is_err());
    assert_eq!(calls(&log), vec!["compile_shader:VS"]);
}

#[test]
fn test_layout_mismatch_is_invalid_resource() {
    let (device, _context, _log) = mock_device_pair();
    // location 0 is a float3 in the shader
    let layout = vec![InputElementDesc::new("POSITION", Format::R32_UINT)];

    let result = ShaderProgram::new().init(&device, "MonacoEngine2.spv", &layout);
    assert!(matches!(result, Err(Error::InvalidResource(_))));
}

#[test]
fn test_empty_layout_rejected() {
    let (device, _context, _log) = mock_device_pair();
    let result = ShaderProgram::new().init(&device, "MonacoEngine2.spv", &[]);
    assert!(matches!(result, Err(Error::InvalidArgument(_))));
}

#[test]
fn test_empty_file_name_rejected() {
    let (device, _context, log) = mock_device_pair();
    let result = ShaderProgram::new().init(&device, "", &SimpleVertex::input_layout());
    assert!(matches!(result, Err(Error::InvalidArgument(_))));
    assert!(calls(&log).is_empty());
}

// ============================================================================
// RENDER / DESTROY
// ============================================================================

#[test]
fn test_render_binds_layout_then_shaders() {
    let (device, mut context, log) = mock_device_pair();
    let mut program = ShaderProgram::new();
    program.init(&device, "MonacoEngine2.spv", &SimpleVertex::input_layout()).unwrap();
    log.lock().unwrap().clear();

    program.render(&mut context);

    assert_eq!(calls(&log), vec![
        "ia_set_input_layout(true)",
        "vs_set_shader(VS)",
        "ps_set_shader(PS)",
    ]);
}

#[test]
fn test_destroy_twice() {
    let (device, mut context, log) = mock_device_pair();
    let mut program = ShaderProgram::new();
    program.init(&device, "MonacoEngine2.spv", &SimpleVertex::input_layout()).unwrap();

    program.destroy();
    program.destroy();
    log.lock().unwrap().clear();
    program.render(&mut context);

    assert!(!program.is_valid());
    assert!(calls(&log).is_empty());
}
