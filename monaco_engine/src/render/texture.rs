/// Texture - owner of one texture resource or its shader view

use std::sync::Arc;

use crate::error::Result;
use crate::graphics_device::{self as gd, BindFlags, Format, TextureDesc};
use crate::render::{Device, DeviceContext};
use crate::resource::{ExtensionType, TextureData};

/// Texture wrapper
///
/// A texture is created through exactly one pathway: from a file or decoded
/// data (sampled textures), as a render/depth target, as a view of another
/// texture, or from the swap chain's back buffer. Sampled textures only keep
/// their shader view; the view holds the texture alive.
#[derive(Default)]
pub struct Texture {
    name: String,
    texture: Option<Arc<dyn gd::Texture>>,
    srv: Option<Arc<dyn gd::ShaderResourceView>>,
}

impl Texture {
    pub fn new() -> Self {
        Self::default()
    }

    fn ensure_uninitialized(&self, pathway: &str) -> Result<()> {
        if self.is_valid() {
            crate::engine_bail!("monaco::Texture", InvalidArgument:
                "{} on texture '{}' which is already initialized", pathway, self.name);
        }
        Ok(())
    }

    /// Load `<name><extension>` and upload it as a sampled texture
    ///
    /// # Errors
    ///
    /// `InvalidArgument` for an empty name, `AssetNotFound` / `ParseFailed`
    /// from decoding, or any device creation error.
    pub fn init_from_file(&mut self, device: &Device, name: &str, extension: ExtensionType) -> Result<()> {
        if name.is_empty() {
            crate::engine_bail!("monaco::Texture", InvalidArgument: "Texture name is empty");
        }
        self.ensure_uninitialized("init_from_file")?;
        let data = TextureData::load(name, extension)?;
        self.init_from_data(device, &data)
    }

    /// Upload decoded image data as a sampled texture
    pub fn init_from_data(&mut self, device: &Device, data: &TextureData) -> Result<()> {
        self.ensure_uninitialized("init_from_data")?;

        let desc = TextureDesc {
            mip_levels: data.mip_count(),
            ..TextureDesc::new_2d(data.width, data.height, data.format, BindFlags::SHADER_RESOURCE)
        };
        let mips: Vec<&[u8]> = data.mips.iter().map(Vec::as_slice).collect();

        let texture = device.create_texture_2d(&desc, &mips)?;
        let srv = device.create_shader_resource_view(&texture, data.format)?;

        crate::engine_debug!("monaco::Texture",
            "Texture '{}' created ({}x{}, {:?}, {} mips)",
            data.name, data.width, data.height, data.format, desc.mip_levels);

        // the view keeps the texture alive
        self.name = data.name.clone();
        self.srv = Some(srv);
        Ok(())
    }

    /// Create a render or depth target
    pub fn init_target(
        &mut self,
        device: &Device,
        width: u32,
        height: u32,
        format: Format,
        sample_count: u32,
        bind: BindFlags,
    ) -> Result<()> {
        self.ensure_uninitialized("init_target")?;
        let desc = TextureDesc {
            sample_count,
            ..TextureDesc::new_2d(width, height, format, bind)
        };
        self.texture = Some(device.create_texture_2d(&desc, &[])?);
        self.name = format!("target {}x{} {:?}", width, height, format);
        Ok(())
    }

    /// Create a shader view over another texture's resource
    pub fn init_view_of(&mut self, device: &Device, source: &Texture, format: Format) -> Result<()> {
        self.ensure_uninitialized("init_view_of")?;
        let texture = source.texture().ok_or_else(|| {
            crate::engine_err!("monaco::Texture", InvalidArgument:
                "Source texture '{}' has no resource", source.name)
        })?;
        self.srv = Some(device.create_shader_resource_view(texture, format)?);
        self.name = format!("{} (view)", source.name);
        Ok(())
    }

    /// Adopt the swap chain's back buffer
    pub(crate) fn set_back_buffer(&mut self, texture: Arc<dyn gd::Texture>) {
        self.texture = Some(texture);
        self.srv = None;
        self.name = "back buffer".to_string();
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// True when a resource or a view is held
    pub fn is_valid(&self) -> bool {
        self.texture.is_some() || self.srv.is_some()
    }

    /// Raw resource (targets and back buffer only)
    pub fn texture(&self) -> Option<&Arc<dyn gd::Texture>> {
        self.texture.as_ref()
    }

    pub fn shader_resource_view(&self) -> Option<&Arc<dyn gd::ShaderResourceView>> {
        self.srv.as_ref()
    }

    /// Width and height of the underlying resource
    pub fn size(&self) -> Option<(u32, u32)> {
        let texture = self.texture.as_ref().or_else(|| self.srv.as_ref().map(|srv| srv.texture()))?;
        Some((texture.desc().width, texture.desc().height))
    }

    /// Bind the shader view to pixel shader slot `start_slot`
    pub fn render(&self, device_context: &mut DeviceContext, start_slot: u32) {
        match &self.srv {
            Some(srv) => device_context.ps_set_shader_resources(start_slot, std::slice::from_ref(srv)),
            None => crate::engine_error!("monaco::Texture",
                "render on texture '{}' without a shader view", self.name),
        }
    }

    /// Release resource and view (idempotent)
    pub fn destroy(&mut self) {
        self.texture = None;
        self.srv = None;
    }
}

#[cfg(test)]
#[path = "texture_tests.rs"]
mod tests;
