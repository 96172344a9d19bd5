/// Pixel, vertex-element and index formats shared by every GPU object

/// Data format of a texel, vertex element or index
///
/// Names follow the native API convention so descriptors read the same on
/// both sides of the backend boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[allow(non_camel_case_types)]
pub enum Format {
    // Color formats
    R8G8B8A8_UNORM,
    R8G8B8A8_UNORM_SRGB,
    B8G8R8A8_UNORM,

    // Float formats (vertex elements)
    R32_FLOAT,
    R32G32_FLOAT,
    R32G32B32_FLOAT,
    R32G32B32A32_FLOAT,

    // Index formats
    R16_UINT,
    R32_UINT,

    // Depth formats
    D24_UNORM_S8_UINT,
    D32_FLOAT,

    // Block-compressed formats (4x4 texel blocks)
    BC1_UNORM,
    BC2_UNORM,
    BC3_UNORM,
}

impl Format {
    /// Size in bytes of one element, or of one 4x4 block for BC formats
    pub fn size_bytes(&self) -> u32 {
        match self {
            Format::R16_UINT => 2,
            Format::R8G8B8A8_UNORM
            | Format::R8G8B8A8_UNORM_SRGB
            | Format::B8G8R8A8_UNORM
            | Format::R32_FLOAT
            | Format::R32_UINT
            | Format::D24_UNORM_S8_UINT
            | Format::D32_FLOAT => 4,
            Format::R32G32_FLOAT | Format::BC1_UNORM => 8,
            Format::R32G32B32_FLOAT => 12,
            Format::R32G32B32A32_FLOAT | Format::BC2_UNORM | Format::BC3_UNORM => 16,
        }
    }

    /// Number of components (channels)
    pub fn component_count(&self) -> u32 {
        match self {
            Format::R32_FLOAT | Format::R16_UINT | Format::R32_UINT | Format::D32_FLOAT => 1,
            Format::R32G32_FLOAT | Format::D24_UNORM_S8_UINT => 2,
            Format::R32G32B32_FLOAT => 3,
            _ => 4,
        }
    }

    /// True for depth (and depth-stencil) formats
    pub fn is_depth(&self) -> bool {
        matches!(self, Format::D24_UNORM_S8_UINT | Format::D32_FLOAT)
    }

    /// True if the format carries a stencil aspect
    pub fn has_stencil(&self) -> bool {
        matches!(self, Format::D24_UNORM_S8_UINT)
    }

    /// True for BCn formats
    pub fn is_block_compressed(&self) -> bool {
        matches!(self, Format::BC1_UNORM | Format::BC2_UNORM | Format::BC3_UNORM)
    }

    /// True if the format can be used as an index format
    pub fn is_index_format(&self) -> bool {
        matches!(self, Format::R16_UINT | Format::R32_UINT)
    }

    /// Bytes per row of a `width` texel wide surface
    pub fn row_pitch(&self, width: u32) -> u32 {
        if self.is_block_compressed() {
            width.div_ceil(4).max(1) * self.size_bytes()
        } else {
            width * self.size_bytes()
        }
    }

    /// Bytes for a whole `width` x `height` surface
    pub fn surface_size(&self, width: u32, height: u32) -> usize {
        let rows = if self.is_block_compressed() {
            height.div_ceil(4).max(1)
        } else {
            height
        };
        self.row_pitch(width) as usize * rows as usize
    }
}

#[cfg(test)]
#[path = "format_tests.rs"]
mod tests;
