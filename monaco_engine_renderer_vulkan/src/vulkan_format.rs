/// Conversions from engine descriptors to Vulkan enums

use ash::vk;
use monaco_engine::monaco::graphics::{
    AddressMode, ComparisonFunc, Filter, Format, PrimitiveTopology,
};

/// Native format for an engine format
///
/// `D24_UNORM_S8_UINT` is returned as-is; the device substitutes its own
/// depth format when the GPU cannot render to it.
pub fn format_to_vk(format: Format) -> vk::Format {
    match format {
        Format::R8G8B8A8_UNORM => vk::Format::R8G8B8A8_UNORM,
        Format::R8G8B8A8_UNORM_SRGB => vk::Format::R8G8B8A8_SRGB,
        Format::B8G8R8A8_UNORM => vk::Format::B8G8R8A8_UNORM,
        Format::R32_FLOAT => vk::Format::R32_SFLOAT,
        Format::R32G32_FLOAT => vk::Format::R32G32_SFLOAT,
        Format::R32G32B32_FLOAT => vk::Format::R32G32B32_SFLOAT,
        Format::R32G32B32A32_FLOAT => vk::Format::R32G32B32A32_SFLOAT,
        Format::R16_UINT => vk::Format::R16_UINT,
        Format::R32_UINT => vk::Format::R32_UINT,
        Format::D24_UNORM_S8_UINT => vk::Format::D24_UNORM_S8_UINT,
        Format::D32_FLOAT => vk::Format::D32_SFLOAT,
        Format::BC1_UNORM => vk::Format::BC1_RGBA_UNORM_BLOCK,
        Format::BC2_UNORM => vk::Format::BC2_UNORM_BLOCK,
        Format::BC3_UNORM => vk::Format::BC3_UNORM_BLOCK,
    }
}

/// Index type for an index format
pub fn index_type_to_vk(format: Format) -> Option<vk::IndexType> {
    match format {
        Format::R16_UINT => Some(vk::IndexType::UINT16),
        Format::R32_UINT => Some(vk::IndexType::UINT32),
        _ => None,
    }
}

/// Image aspects covered by views of `format`
pub fn aspect_mask(format: Format) -> vk::ImageAspectFlags {
    if format.has_stencil() {
        vk::ImageAspectFlags::DEPTH | vk::ImageAspectFlags::STENCIL
    } else if format.is_depth() {
        vk::ImageAspectFlags::DEPTH
    } else {
        vk::ImageAspectFlags::COLOR
    }
}

pub fn topology_to_vk(topology: PrimitiveTopology) -> vk::PrimitiveTopology {
    match topology {
        PrimitiveTopology::PointList => vk::PrimitiveTopology::POINT_LIST,
        PrimitiveTopology::LineList => vk::PrimitiveTopology::LINE_LIST,
        PrimitiveTopology::LineStrip => vk::PrimitiveTopology::LINE_STRIP,
        PrimitiveTopology::TriangleList => vk::PrimitiveTopology::TRIANGLE_LIST,
        PrimitiveTopology::TriangleStrip => vk::PrimitiveTopology::TRIANGLE_STRIP,
    }
}

/// Min/mag filter and mip mode for a filter
pub fn filter_to_vk(filter: Filter) -> (vk::Filter, vk::SamplerMipmapMode) {
    match filter {
        Filter::Point => (vk::Filter::NEAREST, vk::SamplerMipmapMode::NEAREST),
        Filter::Linear | Filter::Anisotropic => (vk::Filter::LINEAR, vk::SamplerMipmapMode::LINEAR),
    }
}

pub fn address_mode_to_vk(mode: AddressMode) -> vk::SamplerAddressMode {
    match mode {
        AddressMode::Wrap => vk::SamplerAddressMode::REPEAT,
        AddressMode::Mirror => vk::SamplerAddressMode::MIRRORED_REPEAT,
        AddressMode::Clamp => vk::SamplerAddressMode::CLAMP_TO_EDGE,
        AddressMode::Border => vk::SamplerAddressMode::CLAMP_TO_BORDER,
    }
}

/// Compare op, or None when comparison is disabled
pub fn comparison_to_vk(func: ComparisonFunc) -> Option<vk::CompareOp> {
    match func {
        ComparisonFunc::Never => None,
        ComparisonFunc::Less => Some(vk::CompareOp::LESS),
        ComparisonFunc::LessEqual => Some(vk::CompareOp::LESS_OR_EQUAL),
        ComparisonFunc::Always => Some(vk::CompareOp::ALWAYS),
    }
}

/// Sample count flag for an MSAA sample count (rounded down to a power of two)
pub fn sample_count_to_vk(count: u32) -> vk::SampleCountFlags {
    match count {
        0 | 1 => vk::SampleCountFlags::TYPE_1,
        2..=3 => vk::SampleCountFlags::TYPE_2,
        4..=7 => vk::SampleCountFlags::TYPE_4,
        8..=15 => vk::SampleCountFlags::TYPE_8,
        16..=31 => vk::SampleCountFlags::TYPE_16,
        32..=63 => vk::SampleCountFlags::TYPE_32,
        _ => vk::SampleCountFlags::TYPE_64,
    }
}

/// Viewport flipped on Y so D3D-style clip space renders upright
pub fn flipped_viewport(x: f32, y: f32, width: f32, height: f32, min_depth: f32, max_depth: f32) -> vk::Viewport {
    vk::Viewport {
        x,
        y: y + height,
        width,
        height: -height,
        min_depth,
        max_depth,
    }
}

#[cfg(test)]
#[path = "vulkan_format_tests.rs"]
mod tests;
