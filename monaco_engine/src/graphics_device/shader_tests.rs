//! Unit tests for shader.rs
//!
//! Covers APPEND_ALIGNED offset resolution and input-layout validation.

use crate::error::Error;
use crate::graphics_device::{
    resolve_element_offsets, validate_input_layout, Format, InputElementDesc,
    ScalarKind, SignatureElement, APPEND_ALIGNED_ELEMENT,
};

fn position_texcoord_layout() -> Vec<InputElementDesc> {
    vec![
        InputElementDesc::new("POSITION", Format::R32G32B32_FLOAT),
        InputElementDesc::new("TEXCOORD", Format::R32G32_FLOAT),
    ]
}

fn float_input(location: u32, component_count: u32) -> SignatureElement {
    SignatureElement {
        location,
        component_count,
        scalar: ScalarKind::Float,
        name: None,
    }
}

// ============================================================================
// OFFSET RESOLUTION
// ============================================================================

#[test]
fn test_append_aligned_offsets_are_packed() {
    let resolved = resolve_element_offsets(&position_texcoord_layout());
    assert_eq!(resolved[0].aligned_byte_offset, 0);
    assert_eq!(resolved[1].aligned_byte_offset, 12);
}

#[test]
fn test_explicit_offset_is_kept_and_followed() {
    let mut layout = position_texcoord_layout();
    layout[1].aligned_byte_offset = 16;
    layout.push(InputElementDesc::new("NORMAL", Format::R32G32B32_FLOAT));

    let resolved = resolve_element_offsets(&layout);
    assert_eq!(resolved[1].aligned_byte_offset, 16);
    assert_eq!(resolved[2].aligned_byte_offset, 24);
}

#[test]
fn test_offsets_are_tracked_per_slot() {
    let mut layout = position_texcoord_layout();
    layout[1].input_slot = 1;
    let resolved = resolve_element_offsets(&layout);
    assert_eq!(resolved[0].aligned_byte_offset, 0);
    assert_eq!(resolved[1].aligned_byte_offset, 0);
    assert_eq!(layout[1].aligned_byte_offset, APPEND_ALIGNED_ELEMENT);
}

// ============================================================================
// VALIDATION
// ============================================================================

#[test]
fn test_matching_layout_is_accepted() {
    let signature = vec![float_input(0, 3), float_input(1, 2)];
    assert!(validate_input_layout(&position_texcoord_layout(), &signature).is_ok());
}

#[test]
fn test_extra_elements_are_allowed() {
    let mut layout = position_texcoord_layout();
    layout.push(InputElementDesc::new("NORMAL", Format::R32G32B32_FLOAT));
    let signature = vec![float_input(0, 3), float_input(1, 2)];
    assert!(validate_input_layout(&layout, &signature).is_ok());
}

#[test]
fn test_missing_location_is_rejected() {
    let signature = vec![float_input(0, 3), float_input(1, 2), float_input(2, 3)];
    let result = validate_input_layout(&position_texcoord_layout(), &signature);
    assert!(matches!(result, Err(Error::InvalidResource(_))));
}

#[test]
fn test_scalar_mismatch_is_rejected() {
    let signature = vec![SignatureElement {
        location: 0,
        component_count: 1,
        scalar: ScalarKind::Uint,
        name: Some("in.var.BLENDINDICES".to_string()),
    }];
    let result = validate_input_layout(&position_texcoord_layout(), &signature);
    assert!(matches!(result, Err(Error::InvalidResource(_))));
}

#[test]
fn test_empty_layout_is_invalid_argument() {
    let result = validate_input_layout(&[], &[float_input(0, 3)]);
    assert!(matches!(result, Err(Error::InvalidArgument(_))));
}

#[test]
fn test_empty_semantic_is_invalid_argument() {
    let layout = vec![InputElementDesc::new("", Format::R32G32B32_FLOAT)];
    let result = validate_input_layout(&layout, &[]);
    assert!(matches!(result, Err(Error::InvalidArgument(_))));
}

#[test]
fn test_depth_format_element_is_rejected() {
    let layout = vec![InputElementDesc::new("POSITION", Format::D32_FLOAT)];
    let result = validate_input_layout(&layout, &[]);
    assert!(matches!(result, Err(Error::InvalidArgument(_))));
}
