/// Model3D - mesh resource loaded from a model file

use std::path::Path;

use crate::error::Result;
use crate::render::Device;
use crate::resource::model_loader::load_obj;
use crate::resource::{Resource, ResourceState, ResourceType};
use crate::scene::{MeshComponent, SimpleVertex};

/// Model file format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ModelType {
    Obj,
    Fbx,
}

pub struct Model3D {
    name: String,
    model_type: ModelType,
    flip_uv: bool,
    meshes: Vec<MeshComponent>,
    state: ResourceState,
}

impl Model3D {
    /// Texcoords are flipped (`v' = 1 - v`) when `flip_uv` is set
    pub fn new(name: &str, model_type: ModelType, flip_uv: bool) -> Self {
        Self {
            name: name.to_string(),
            model_type,
            flip_uv,
            meshes: Vec::new(),
            state: ResourceState::Unloaded,
        }
    }

    pub fn model_type(&self) -> ModelType {
        self.model_type
    }

    pub fn meshes(&self) -> &[MeshComponent] {
        &self.meshes
    }
}

impl Resource for Model3D {
    fn name(&self) -> &str {
        &self.name
    }

    fn resource_type(&self) -> ResourceType {
        ResourceType::Model
    }

    fn state(&self) -> ResourceState {
        self.state
    }

    fn load(&mut self, file: &str) -> Result<()> {
        self.state = ResourceState::Loading;
        let loaded = match self.model_type {
            ModelType::Obj => load_obj(Path::new(file), self.flip_uv),
            ModelType::Fbx => Err(crate::engine_err!("monaco::Model3D", Unsupported:
                "FBX import is not available ('{}')", file)),
        };

        match loaded {
            Ok(mesh) => {
                self.meshes = vec![mesh];
                Ok(())
            }
            Err(e) => {
                self.state = ResourceState::Failed;
                Err(e)
            }
        }
    }

    /// Meshes are uploaded by the actors that draw them; only check that
    /// there is something to draw
    fn init(&mut self, _device: &Device) -> Result<()> {
        if self.meshes.iter().all(MeshComponent::is_empty) {
            self.state = ResourceState::Failed;
            crate::engine_bail!("monaco::Model3D", InvalidResource:
                "Model '{}' contains no geometry", self.name);
        }
        self.state = ResourceState::Loaded;
        Ok(())
    }

    fn unload(&mut self) {
        self.meshes.clear();
        self.state = ResourceState::Unloaded;
    }

    fn size_in_bytes(&self) -> usize {
        self.meshes
            .iter()
            .map(|mesh| {
                mesh.vertices.len() * std::mem::size_of::<SimpleVertex>()
                    + mesh.indices.len() * std::mem::size_of::<u32>()
            })
            .sum()
    }
}
