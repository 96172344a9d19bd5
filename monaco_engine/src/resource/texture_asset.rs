/// TextureAsset - texture resource: decoded in `load`, uploaded in `init`

use std::path::Path;

use crate::error::Result;
use crate::render::{Device, DeviceContext, Texture};
use crate::resource::{ExtensionType, Resource, ResourceState, ResourceType, TextureData};

pub struct TextureAsset {
    name: String,
    extension: ExtensionType,
    data: Option<TextureData>,
    texture: Texture,
    size_in_bytes: usize,
    state: ResourceState,
}

impl TextureAsset {
    pub fn new(name: &str, extension: ExtensionType) -> Self {
        Self {
            name: name.to_string(),
            extension,
            data: None,
            texture: Texture::new(),
            size_in_bytes: 0,
            state: ResourceState::Unloaded,
        }
    }

    pub fn extension(&self) -> ExtensionType {
        self.extension
    }

    pub fn texture(&self) -> &Texture {
        &self.texture
    }

    /// Bind the texture to pixel shader slot `slot`
    pub fn render(&self, device_context: &mut DeviceContext, slot: u32) {
        self.texture.render(device_context, slot);
    }
}

impl Resource for TextureAsset {
    fn name(&self) -> &str {
        &self.name
    }

    fn resource_type(&self) -> ResourceType {
        ResourceType::Texture
    }

    fn state(&self) -> ResourceState {
        self.state
    }

    fn load(&mut self, file: &str) -> Result<()> {
        self.state = ResourceState::Loading;
        match TextureData::load_path(&self.name, Path::new(file), self.extension) {
            Ok(data) => {
                self.size_in_bytes = data.size_in_bytes();
                self.data = Some(data);
                Ok(())
            }
            Err(e) => {
                self.state = ResourceState::Failed;
                Err(e)
            }
        }
    }

    fn init(&mut self, device: &Device) -> Result<()> {
        let Some(data) = self.data.take() else {
            self.state = ResourceState::Failed;
            crate::engine_bail!("monaco::TextureAsset", InvalidArgument:
                "Texture '{}' initialized before load", self.name);
        };
        if let Err(e) = self.texture.init_from_data(device, &data) {
            self.state = ResourceState::Failed;
            return Err(e);
        }
        self.state = ResourceState::Loaded;
        Ok(())
    }

    fn unload(&mut self) {
        self.texture.destroy();
        self.data = None;
        self.size_in_bytes = 0;
        self.state = ResourceState::Unloaded;
    }

    fn size_in_bytes(&self) -> usize {
        self.size_in_bytes
    }
}
