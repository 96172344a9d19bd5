/// CPU-side texture images decoded from disk
///
/// PNG and JPG files go through the `image` crate and always come out as
/// 4-channel RGBA8. DDS files keep their stored format and mip chain.

use std::path::Path;
use crate::error::Result;
use crate::graphics_device::Format;
use crate::resource::dds::parse_dds;

/// Container format of a texture file, chosen by the caller
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ExtensionType {
    Png,
    Jpg,
    Dds,
}

impl ExtensionType {
    /// File suffix appended to a texture name, dot included
    pub fn suffix(&self) -> &'static str {
        match self {
            ExtensionType::Png => ".png",
            ExtensionType::Jpg => ".jpg",
            ExtensionType::Dds => ".dds",
        }
    }

    /// Guess the container from a path's extension (case-insensitive)
    pub fn from_path(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?.to_ascii_lowercase();
        match ext.as_str() {
            "png" => Some(ExtensionType::Png),
            "jpg" | "jpeg" => Some(ExtensionType::Jpg),
            "dds" => Some(ExtensionType::Dds),
            _ => None,
        }
    }
}

/// Decoded texture ready for upload
#[derive(Debug, Clone)]
pub struct TextureData {
    pub name: String,
    pub width: u32,
    pub height: u32,
    pub format: Format,
    /// One tightly packed slice per mip level, largest first
    pub mips: Vec<Vec<u8>>,
}

impl TextureData {
    /// Load `<name><suffix>` from disk
    pub fn load(name: &str, extension: ExtensionType) -> Result<Self> {
        let path = format!("{}{}", name, extension.suffix());
        Self::load_path(name, Path::new(&path), extension)
    }

    /// Load an explicit path, keeping `name` as the texture's identity
    pub fn load_path(name: &str, path: &Path, extension: ExtensionType) -> Result<Self> {
        let bytes = std::fs::read(path).map_err(|e| {
            crate::engine_err!("monaco::TextureData", AssetNotFound:
                "cannot read texture '{}': {}", path.display(), e)
        })?;
        Self::from_encoded(name, &bytes, extension)
    }

    /// Decode an in-memory file
    pub fn from_encoded(name: &str, bytes: &[u8], extension: ExtensionType) -> Result<Self> {
        let image_format = match extension {
            ExtensionType::Dds => {
                let dds = parse_dds(name, bytes)?;
                return Ok(Self {
                    name: name.to_string(),
                    width: dds.width,
                    height: dds.height,
                    format: dds.format,
                    mips: dds.mips,
                });
            }
            ExtensionType::Png => image::ImageFormat::Png,
            ExtensionType::Jpg => image::ImageFormat::Jpeg,
        };

        let decoded = image::load_from_memory_with_format(bytes, image_format).map_err(|e| {
            crate::engine_err!("monaco::TextureData", ParseFailed:
                "cannot decode texture '{}': {}", name, e)
        })?;
        let rgba = decoded.to_rgba8();
        let (width, height) = rgba.dimensions();

        crate::engine_debug!("monaco::TextureData",
            "Decoded '{}' ({}x{}, {:?})", name, width, height, extension);

        Self::from_rgba8(name, width, height, rgba.into_raw())
    }

    /// Wrap raw RGBA8 pixels (single mip)
    pub fn from_rgba8(name: &str, width: u32, height: u32, pixels: Vec<u8>) -> Result<Self> {
        if width == 0 || height == 0 {
            crate::engine_bail!("monaco::TextureData", InvalidArgument:
                "texture '{}' has zero size", name);
        }
        let expected = Format::R8G8B8A8_UNORM.surface_size(width, height);
        if pixels.len() != expected {
            crate::engine_bail!("monaco::TextureData", InvalidArgument:
                "texture '{}' has {} bytes, expected {}", name, pixels.len(), expected);
        }
        Ok(Self {
            name: name.to_string(),
            width,
            height,
            format: Format::R8G8B8A8_UNORM,
            mips: vec![pixels],
        })
    }

    pub fn mip_count(&self) -> u32 {
        self.mips.len() as u32
    }

    pub fn size_in_bytes(&self) -> usize {
        self.mips.iter().map(Vec::len).sum()
    }
}

#[cfg(test)]
#[path = "texture_data_tests.rs"]
mod tests;
