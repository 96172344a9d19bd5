/// DirectDraw Surface reader (the GPU-native texture container)
///
/// Supports the formats the engine can upload directly: BC1/BC2/BC3 (legacy
/// FourCC or DX10 header) and uncompressed 32-bit RGBA/BGRA, with mip chains.

use bytemuck::{Pod, Zeroable};
use crate::error::Result;
use crate::graphics_device::Format;

const DDS_MAGIC: &[u8; 4] = b"DDS ";
const DDSD_MIPMAPCOUNT: u32 = 0x0002_0000;
const DDPF_FOURCC: u32 = 0x4;
const DDPF_RGB: u32 = 0x40;

const fn four_cc(code: &[u8; 4]) -> u32 {
    u32::from_le_bytes(*code)
}

#[repr(C)]
#[derive(Clone, Copy, Pod, Zeroable)]
struct DdsPixelFormat {
    size: u32,
    flags: u32,
    four_cc: u32,
    rgb_bit_count: u32,
    r_mask: u32,
    g_mask: u32,
    b_mask: u32,
    a_mask: u32,
}

#[repr(C)]
#[derive(Clone, Copy, Pod, Zeroable)]
struct DdsHeader {
    size: u32,
    flags: u32,
    height: u32,
    width: u32,
    pitch_or_linear_size: u32,
    depth: u32,
    mip_map_count: u32,
    reserved1: [u32; 11],
    pixel_format: DdsPixelFormat,
    caps: u32,
    caps2: u32,
    caps3: u32,
    caps4: u32,
    reserved2: u32,
}

#[repr(C)]
#[derive(Clone, Copy, Pod, Zeroable)]
struct DdsHeaderDx10 {
    dxgi_format: u32,
    resource_dimension: u32,
    misc_flag: u32,
    array_size: u32,
    misc_flags2: u32,
}

/// Decoded DDS surface: top-level size, format and one slice per mip
#[derive(Debug, Clone)]
pub struct DdsImage {
    pub width: u32,
    pub height: u32,
    pub format: Format,
    pub mips: Vec<Vec<u8>>,
}

fn format_from_dxgi(dxgi_format: u32) -> Option<Format> {
    match dxgi_format {
        28 => Some(Format::R8G8B8A8_UNORM),
        29 => Some(Format::R8G8B8A8_UNORM_SRGB),
        71 => Some(Format::BC1_UNORM),
        74 => Some(Format::BC2_UNORM),
        77 => Some(Format::BC3_UNORM),
        87 => Some(Format::B8G8R8A8_UNORM),
        _ => None,
    }
}

fn format_from_pixel_format(pf: &DdsPixelFormat) -> Option<Format> {
    if pf.flags & DDPF_FOURCC != 0 {
        return match pf.four_cc {
            x if x == four_cc(b"DXT1") => Some(Format::BC1_UNORM),
            x if x == four_cc(b"DXT2") || x == four_cc(b"DXT3") => Some(Format::BC2_UNORM),
            x if x == four_cc(b"DXT4") || x == four_cc(b"DXT5") => Some(Format::BC3_UNORM),
            _ => None,
        };
    }
    if pf.flags & DDPF_RGB != 0 && pf.rgb_bit_count == 32 {
        return match (pf.r_mask, pf.g_mask, pf.b_mask) {
            (0x0000_00ff, 0x0000_ff00, 0x00ff_0000) => Some(Format::R8G8B8A8_UNORM),
            (0x00ff_0000, 0x0000_ff00, 0x0000_00ff) => Some(Format::B8G8R8A8_UNORM),
            _ => None,
        };
    }
    None
}

/// Parse a DDS file held in memory
pub fn parse_dds(name: &str, bytes: &[u8]) -> Result<DdsImage> {
    const HEADER_END: usize = 4 + std::mem::size_of::<DdsHeader>();

    if bytes.len() < HEADER_END || &bytes[0..4] != DDS_MAGIC {
        crate::engine_bail!("monaco::Dds", ParseFailed: "'{}' is not a DDS file", name);
    }

    let header: DdsHeader = bytemuck::pod_read_unaligned(&bytes[4..HEADER_END]);
    if header.size != 124 || header.pixel_format.size != 32 {
        crate::engine_bail!("monaco::Dds", ParseFailed:
            "'{}' has a malformed header (size {})", name, header.size);
    }
    if header.width == 0 || header.height == 0 {
        crate::engine_bail!("monaco::Dds", ParseFailed: "'{}' has zero dimensions", name);
    }

    let mut data_start = HEADER_END;
    let format = if header.pixel_format.flags & DDPF_FOURCC != 0
        && header.pixel_format.four_cc == four_cc(b"DX10")
    {
        let dx10_end = HEADER_END + std::mem::size_of::<DdsHeaderDx10>();
        if bytes.len() < dx10_end {
            crate::engine_bail!("monaco::Dds", ParseFailed: "'{}' has a truncated DX10 header", name);
        }
        let dx10: DdsHeaderDx10 = bytemuck::pod_read_unaligned(&bytes[HEADER_END..dx10_end]);
        data_start = dx10_end;
        if dx10.array_size > 1 {
            crate::engine_bail!("monaco::Dds", Unsupported:
                "'{}' is a texture array ({} slices)", name, dx10.array_size);
        }
        format_from_dxgi(dx10.dxgi_format).ok_or_else(|| {
            crate::engine_err!("monaco::Dds", Unsupported:
                "'{}' uses DXGI format {}", name, dx10.dxgi_format)
        })?
    } else {
        format_from_pixel_format(&header.pixel_format).ok_or_else(|| {
            crate::engine_err!("monaco::Dds", Unsupported:
                "'{}' uses an unsupported pixel format", name)
        })?
    };

    let mip_count = if header.flags & DDSD_MIPMAPCOUNT != 0 {
        header.mip_map_count.max(1)
    } else {
        1
    };
    let max_mips = 32 - header.width.max(header.height).leading_zeros();
    if mip_count > max_mips {
        crate::engine_bail!("monaco::Dds", ParseFailed:
            "'{}' claims {} mips but a {}x{} chain has at most {}",
            name, mip_count, header.width, header.height, max_mips);
    }

    let mut mips = Vec::with_capacity(mip_count as usize);
    let mut offset = data_start;
    for level in 0..mip_count {
        let width = (header.width >> level).max(1);
        let height = (header.height >> level).max(1);
        let size = format.surface_size(width, height);
        let slice = bytes.get(offset..offset + size).ok_or_else(|| {
            crate::engine_err!("monaco::Dds", ParseFailed:
                "'{}' is truncated at mip {}", name, level)
        })?;
        mips.push(slice.to_vec());
        offset += size;
    }

    Ok(DdsImage {
        width: header.width,
        height: header.height,
        format,
        mips,
    })
}

#[cfg(test)]
#[path = "dds_tests.rs"]
mod tests;
