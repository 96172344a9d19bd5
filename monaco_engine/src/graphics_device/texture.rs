/// Texture and view traits with their descriptors

use std::any::Any;
use std::sync::Arc;
use crate::graphics_device::{BindFlags, Format};

/// Descriptor for creating a 2D texture
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TextureDesc {
    /// Width in texels
    pub width: u32,
    /// Height in texels
    pub height: u32,
    /// Number of mip levels (1 = no mipmaps)
    pub mip_levels: u32,
    /// Texel format
    pub format: Format,
    /// MSAA sample count (1 = single sampled)
    pub sample_count: u32,
    /// Where the texture will be bound
    pub bind: BindFlags,
}

impl TextureDesc {
    /// Single-mip, single-sample texture
    pub fn new_2d(width: u32, height: u32, format: Format, bind: BindFlags) -> Self {
        Self {
            width,
            height,
            mip_levels: 1,
            format,
            sample_count: 1,
            bind,
        }
    }
}

/// Native 2D texture resource
pub trait Texture: Send + Sync {
    /// Descriptor the texture was created from
    fn desc(&self) -> &TextureDesc;

    /// Backend downcast hook
    fn as_any(&self) -> &dyn Any;
}

/// Shader-visible view over a texture
///
/// Holds its own reference to the texture, so the texture wrapper may drop
/// its handle once the view exists.
pub trait ShaderResourceView: Send + Sync {
    /// Viewed texture
    fn texture(&self) -> &Arc<dyn Texture>;

    /// View format
    fn format(&self) -> Format;

    /// Backend downcast hook
    fn as_any(&self) -> &dyn Any;
}

/// Color attachment view over a texture
pub trait RenderTargetView: Send + Sync {
    /// Viewed texture
    fn texture(&self) -> &Arc<dyn Texture>;

    /// View format
    fn format(&self) -> Format;

    /// Backend downcast hook
    fn as_any(&self) -> &dyn Any;
}

/// Depth/stencil attachment view over a texture
pub trait DepthStencilView: Send + Sync {
    /// Viewed texture
    fn texture(&self) -> &Arc<dyn Texture>;

    /// View format
    fn format(&self) -> Format;

    /// Backend downcast hook
    fn as_any(&self) -> &dyn Any;
}
