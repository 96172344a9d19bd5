/// Device - validated resource factory owned by the application

use std::sync::Arc;

use crate::error::Result;
use crate::graphics_device::{
    self as gd, resolve_element_offsets, validate_input_layout, BindFlags, BufferDesc,
    Format, GraphicsDevice, InputElementDesc, SamplerDesc, ShaderBytecode, ShaderStage,
    TextureDesc,
};

/// Owner of the native graphics device
///
/// Every creation call is validated before it reaches the backend. A rejected
/// call returns an error and creates nothing, so the caller's output slot
/// keeps its previous value.
#[derive(Default)]
pub struct Device {
    device: Option<Box<dyn GraphicsDevice>>,
}

impl Device {
    /// Empty device (filled by `SwapChain::init`)
    pub fn new() -> Self {
        Self::default()
    }

    /// Wrap an already created native device
    pub fn from_native(device: Box<dyn GraphicsDevice>) -> Self {
        Self { device: Some(device) }
    }

    pub(crate) fn set_native(&mut self, device: Box<dyn GraphicsDevice>) {
        self.device = Some(device);
    }

    /// True between a successful init and destroy
    pub fn is_valid(&self) -> bool {
        self.device.is_some()
    }

    fn native(&self) -> Result<&dyn GraphicsDevice> {
        self.device.as_deref().ok_or_else(|| {
            crate::engine_err!("monaco::Device", InvalidArgument: "Device is not initialized")
        })
    }

    /// Create a buffer
    ///
    /// # Errors
    ///
    /// `InvalidArgument` for a zero byte width, missing bind flags or initial
    /// data larger than the buffer.
    pub fn create_buffer(&self, desc: &BufferDesc, initial_data: Option<&[u8]>) -> Result<Arc<dyn gd::Buffer>> {
        let device = self.native()?;
        if desc.byte_width == 0 {
            crate::engine_bail!("monaco::Device", InvalidArgument: "Buffer byte width is 0");
        }
        if desc.bind.is_empty() {
            crate::engine_bail!("monaco::Device", InvalidArgument: "Buffer has no bind flags");
        }
        if let Some(data) = initial_data {
            if data.len() > desc.byte_width as usize {
                crate::engine_bail!("monaco::Device", InvalidArgument:
                    "Initial data ({} bytes) exceeds buffer size ({} bytes)",
                    data.len(), desc.byte_width);
            }
        }
        device.create_buffer(desc, initial_data)
    }

    /// Create a 2D texture with optional per-mip initial data
    pub fn create_texture_2d(&self, desc: &TextureDesc, initial_data: &[&[u8]]) -> Result<Arc<dyn gd::Texture>> {
        let device = self.native()?;
        if desc.width == 0 || desc.height == 0 {
            crate::engine_bail!("monaco::Device", InvalidArgument:
                "Texture dimensions {}x{} must be non-zero", desc.width, desc.height);
        }
        if desc.mip_levels == 0 || desc.sample_count == 0 {
            crate::engine_bail!("monaco::Device", InvalidArgument:
                "Texture needs at least one mip level and one sample");
        }
        if desc.bind.is_empty() {
            crate::engine_bail!("monaco::Device", InvalidArgument: "Texture has no bind flags");
        }
        if desc.format.is_depth() != desc.bind.contains(BindFlags::DEPTH_STENCIL) {
            crate::engine_bail!("monaco::Device", InvalidArgument:
                "Format {:?} does not match bind flags {:?}", desc.format, desc.bind);
        }
        if !initial_data.is_empty() {
            if initial_data.len() != desc.mip_levels as usize {
                crate::engine_bail!("monaco::Device", InvalidArgument:
                    "Expected {} mip levels of data, got {}", desc.mip_levels, initial_data.len());
            }
            for (level, data) in initial_data.iter().enumerate() {
                let width = (desc.width >> level).max(1);
                let height = (desc.height >> level).max(1);
                let expected = desc.format.surface_size(width, height);
                if data.len() < expected {
                    crate::engine_bail!("monaco::Device", InvalidArgument:
                        "Mip {} has {} bytes, expected {}", level, data.len(), expected);
                }
            }
        }
        device.create_texture_2d(desc, initial_data)
    }

    pub fn create_render_target_view(&self, texture: &Arc<dyn gd::Texture>, format: Format) -> Result<Arc<dyn gd::RenderTargetView>> {
        let device = self.native()?;
        if !texture.desc().bind.contains(BindFlags::RENDER_TARGET) || format.is_depth() {
            crate::engine_bail!("monaco::Device", InvalidArgument:
                "Texture cannot be viewed as a render target with format {:?}", format);
        }
        device.create_render_target_view(texture, format)
    }

    pub fn create_depth_stencil_view(&self, texture: &Arc<dyn gd::Texture>, format: Format) -> Result<Arc<dyn gd::DepthStencilView>> {
        let device = self.native()?;
        if !texture.desc().bind.contains(BindFlags::DEPTH_STENCIL) || !format.is_depth() {
            crate::engine_bail!("monaco::Device", InvalidArgument:
                "Texture cannot be viewed as a depth stencil with format {:?}", format);
        }
        device.create_depth_stencil_view(texture, format)
    }

    pub fn create_shader_resource_view(&self, texture: &Arc<dyn gd::Texture>, format: Format) -> Result<Arc<dyn gd::ShaderResourceView>> {
        let device = self.native()?;
        if !texture.desc().bind.contains(BindFlags::SHADER_RESOURCE) {
            crate::engine_bail!("monaco::Device", InvalidArgument:
                "Texture was not created with SHADER_RESOURCE");
        }
        device.create_shader_resource_view(texture, format)
    }

    /// Compile one entry point of a combined shader file
    pub fn compile_shader(&self, file_name: &str, entry_point: &str, stage: ShaderStage) -> Result<ShaderBytecode> {
        let device = self.native()?;
        if file_name.is_empty() || entry_point.is_empty() {
            crate::engine_bail!("monaco::Device", InvalidArgument:
                "Shader file name and entry point must be non-empty");
        }
        device.compile_shader(file_name, entry_point, stage)
    }

    pub fn create_vertex_shader(&self, bytecode: &ShaderBytecode) -> Result<Arc<dyn gd::VertexShader>> {
        let device = self.native()?;
        Self::check_bytecode(bytecode, ShaderStage::Vertex)?;
        device.create_vertex_shader(bytecode)
    }

    pub fn create_pixel_shader(&self, bytecode: &ShaderBytecode) -> Result<Arc<dyn gd::PixelShader>> {
        let device = self.native()?;
        Self::check_bytecode(bytecode, ShaderStage::Pixel)?;
        device.create_pixel_shader(bytecode)
    }

    /// Create an input layout validated against the vertex shader signature
    pub fn create_input_layout(&self, elements: &[InputElementDesc], vertex_bytecode: &ShaderBytecode) -> Result<Arc<dyn gd::InputLayout>> {
        let device = self.native()?;
        Self::check_bytecode(vertex_bytecode, ShaderStage::Vertex)?;
        let resolved = resolve_element_offsets(elements);
        validate_input_layout(&resolved, &vertex_bytecode.input_signature)?;
        device.create_input_layout(&resolved, vertex_bytecode)
    }

    pub fn create_sampler_state(&self, desc: &SamplerDesc) -> Result<Arc<dyn gd::SamplerState>> {
        let device = self.native()?;
        if desc.max_anisotropy == 0 || desc.max_anisotropy > 16 {
            crate::engine_bail!("monaco::Device", InvalidArgument:
                "Max anisotropy {} outside 1..=16", desc.max_anisotropy);
        }
        if desc.min_lod > desc.max_lod {
            crate::engine_bail!("monaco::Device", InvalidArgument:
                "Min LOD {} above max LOD {}", desc.min_lod, desc.max_lod);
        }
        device.create_sampler_state(desc)
    }

    /// Block until the GPU has finished all submitted work
    pub fn wait_idle(&self) -> Result<()> {
        self.native()?.wait_idle()
    }

    /// Release the native device (idempotent)
    pub fn destroy(&mut self) {
        if self.device.take().is_some() {
            crate::engine_debug!("monaco::Device", "Device destroyed");
        }
    }

    fn check_bytecode(bytecode: &ShaderBytecode, stage: ShaderStage) -> Result<()> {
        if bytecode.stage != stage {
            crate::engine_bail!("monaco::Device", InvalidArgument:
                "Bytecode for '{}' is a {:?} shader, expected {:?}",
                bytecode.entry_point, bytecode.stage, stage);
        }
        if bytecode.code.is_empty() {
            crate::engine_bail!("monaco::Device", InvalidArgument:
                "Bytecode for '{}' is empty", bytecode.entry_point);
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "device_tests.rs"]
mod tests;
