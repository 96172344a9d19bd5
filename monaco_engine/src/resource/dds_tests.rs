//! Unit tests for dds.rs

use crate::error::Error;
use crate::graphics_device::Format;
use crate::resource::dds::parse_dds;

/// Build a minimal DDS file: header words followed by `payload`
fn build_dds(width: u32, height: u32, mip_count: u32, pf_flags: u32, four_cc: &[u8; 4], masks: [u32; 4], payload: &[u8]) -> Vec<u8> {
    let mut words = vec![0u32; 31];
    words[0] = 124;
    words[1] = 0x1007 | if mip_count > 1 { 0x0002_0000 } else { 0 };
    words[2] = height;
    words[3] = width;
    words[6] = mip_count;
    // pixel format starts at word 18
    words[18] = 32;
    words[19] = pf_flags;
    words[20] = u32::from_le_bytes(*four_cc);
    words[21] = if pf_flags & 0x40 != 0 { 32 } else { 0 };
    words[22] = masks[0];
    words[23] = masks[1];
    words[24] = masks[2];
    words[25] = masks[3];

    let mut bytes = b"DDS ".to_vec();
    for word in words {
        bytes.extend_from_slice(&word.to_le_bytes());
    }
    bytes.extend_from_slice(payload);
    bytes
}

// ============================================================================
// FORMAT DETECTION
// ============================================================================

#[test]
fn test_dxt1_with_mip_chain() {
    // 8x8 BC1: 32 bytes + 4x4: 8 bytes + 2x2: 8 bytes + 1x1: 8 bytes
    let payload = vec![0xAB; 32 + 8 + 8 + 8];
    let bytes = build_dds(8, 8, 4, 0x4, b"DXT1", [0; 4], &payload);

    let image = parse_dds("test.dds", &bytes).unwrap();

    assert_eq!(image.format, Format::BC1_UNORM);
    assert_eq!((image.width, image.height), (8, 8));
    let sizes: Vec<usize> = image.mips.iter().map(|m| m.len()).collect();
    assert_eq!(sizes, vec![32, 8, 8, 8]);
}

#[test]
fn test_dxt5_maps_to_bc3() {
    let bytes = build_dds(4, 4, 1, 0x4, b"DXT5", [0; 4], &[0u8; 16]);
    assert_eq!(parse_dds("a.dds", &bytes).unwrap().format, Format::BC3_UNORM);
}

#[test]
fn test_uncompressed_rgba_and_bgra() {
    let rgba = build_dds(2, 2, 1, 0x41, b"\0\0\0\0",
        [0x0000_00ff, 0x0000_ff00, 0x00ff_0000, 0xff00_0000], &[0u8; 16]);
    assert_eq!(parse_dds("rgba.dds", &rgba).unwrap().format, Format::R8G8B8A8_UNORM);

    let bgra = build_dds(2, 2, 1, 0x41, b"\0\0\0\0",
        [0x00ff_0000, 0x0000_ff00, 0x0000_00ff, 0xff00_0000], &[0u8; 16]);
    assert_eq!(parse_dds("bgra.dds", &bgra).unwrap().format, Format::B8G8R8A8_UNORM);
}

#[test]
fn test_dx10_header() {
    let mut dx10 = Vec::new();
    for word in [71u32, 3, 0, 1, 0] {
        dx10.extend_from_slice(&word.to_le_bytes());
    }
    dx10.extend_from_slice(&[0u8; 8]);
    let bytes = build_dds(4, 4, 1, 0x4, b"DX10", [0; 4], &dx10);

    let image = parse_dds("dx10.dds", &bytes).unwrap();
    assert_eq!(image.format, Format::BC1_UNORM);
    assert_eq!(image.mips[0].len(), 8);
}

// ============================================================================
// FAILURES
// ============================================================================

#[test]
fn test_bad_magic_is_parse_failure() {
    let result = parse_dds("x.dds", b"PNG.............");
    assert!(matches!(result, Err(Error::ParseFailed(_))));
}

#[test]
fn test_truncated_payload_is_parse_failure() {
    let bytes = build_dds(8, 8, 1, 0x4, b"DXT1", [0; 4], &[0u8; 10]);
    assert!(matches!(parse_dds("short.dds", &bytes), Err(Error::ParseFailed(_))));
}

#[test]
fn test_unknown_four_cc_is_unsupported() {
    let bytes = build_dds(4, 4, 1, 0x4, b"ATI2", [0; 4], &[0u8; 16]);
    assert!(matches!(parse_dds("bc5.dds", &bytes), Err(Error::Unsupported(_))));
}

#[test]
fn test_huge_mip_count_is_parse_failure() {
    let bytes = build_dds(4, 4, 0x4000_0000, 0x4, b"DXT1", [0; 4], &[]);
    assert!(matches!(parse_dds("huge.dds", &bytes), Err(Error::ParseFailed(_))));
}

#[test]
fn test_mip_count_beyond_chain_length_is_parse_failure() {
    // a 1x1 surface has a single level, 40 levels of payload are still rejected
    let bytes = build_dds(1, 1, 40, 0x4, b"DXT1", [0; 4], &[0u8; 320]);
    assert!(matches!(parse_dds("deep.dds", &bytes), Err(Error::ParseFailed(_))));
}

#[test]
fn test_full_mip_chain_is_accepted() {
    // 2x1: 8 bytes + 1x1: 8 bytes
    let bytes = build_dds(2, 1, 2, 0x4, b"DXT1", [0; 4], &[0u8; 16]);
    assert_eq!(parse_dds("chain.dds", &bytes).unwrap().mips.len(), 2);
}
