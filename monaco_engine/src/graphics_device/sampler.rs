/// Sampler state trait and descriptor

use std::any::Any;

/// Texture filtering mode (applied to min, mag and mip)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Filter {
    Point,
    Linear,
    Anisotropic,
}

/// Texture addressing mode outside [0, 1]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AddressMode {
    Wrap,
    Mirror,
    Clamp,
    Border,
}

/// Comparison function for comparison samplers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ComparisonFunc {
    Never,
    Less,
    LessEqual,
    Always,
}

/// Descriptor for creating a sampler state
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SamplerDesc {
    pub filter: Filter,
    pub address_u: AddressMode,
    pub address_v: AddressMode,
    pub address_w: AddressMode,
    pub max_anisotropy: u32,
    pub comparison: ComparisonFunc,
    pub min_lod: f32,
    pub max_lod: f32,
}

impl Default for SamplerDesc {
    /// Linear filtering, wrap addressing, full mip range
    fn default() -> Self {
        Self {
            filter: Filter::Linear,
            address_u: AddressMode::Wrap,
            address_v: AddressMode::Wrap,
            address_w: AddressMode::Wrap,
            max_anisotropy: 1,
            comparison: ComparisonFunc::Never,
            min_lod: 0.0,
            max_lod: f32::MAX,
        }
    }
}

/// Native sampler object
pub trait SamplerState: Send + Sync {
    /// Descriptor the sampler was created from
    fn desc(&self) -> &SamplerDesc;

    /// Backend downcast hook
    fn as_any(&self) -> &dyn Any;
}
