/// Actor - named entity with components and the GPU buffers to draw them

use std::sync::Arc;
use glam::Vec4;

use crate::error::Result;
use crate::graphics_device::PrimitiveTopology;
use crate::render::{
    BindingKind, Buffer, CbChangesEveryFrame, Device, DeviceContext, SamplerState,
    CB_CHANGES_EVERY_FRAME_SLOT,
};
use crate::resource::TextureAsset;
use crate::scene::{Component, ComponentKind, Material, MeshComponent, Transform};

struct MeshBuffers {
    vertex: Buffer,
    index: Buffer,
}

/// Scene entity
///
/// Every actor carries a `Transform`. Meshes added through `set_mesh` get one
/// vertex/index buffer pair each; mesh `i` is drawn with texture `i` of the
/// material (or its first texture).
pub struct Actor {
    name: String,
    components: Vec<Component>,
    mesh_buffers: Vec<MeshBuffers>,
    constant_buffer: Buffer,
    sampler: SamplerState,
}

impl Actor {
    /// Create an actor with an identity transform and its per-actor GPU state
    pub fn new(device: &Device, name: &str) -> Result<Self> {
        if name.is_empty() {
            crate::engine_bail!("monaco::Actor", InvalidArgument: "Actor name is empty");
        }
        let mut constant_buffer = Buffer::new();
        constant_buffer.init_constant(device, std::mem::size_of::<CbChangesEveryFrame>() as u32)?;
        let mut sampler = SamplerState::new();
        sampler.init(device)?;

        Ok(Self {
            name: name.to_string(),
            components: vec![Component::Transform(Transform::default())],
            mesh_buffers: Vec::new(),
            constant_buffer,
            sampler,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn set_name(&mut self, name: &str) {
        self.name = name.to_string();
    }

    // ===== COMPONENTS =====

    pub fn add_component<T: ComponentKind>(&mut self, component: T) {
        self.components.push(component.into());
    }

    /// First component of type `T`
    pub fn get_component<T: ComponentKind>(&self) -> Option<&T> {
        self.components.iter().find_map(T::from_component)
    }

    pub fn get_component_mut<T: ComponentKind>(&mut self) -> Option<&mut T> {
        self.components.iter_mut().find_map(T::from_component_mut)
    }

    /// All components of type `T`, in insertion order
    pub fn components<'a, T: ComponentKind + 'a>(&'a self) -> impl Iterator<Item = &'a T> {
        self.components.iter().filter_map(T::from_component)
    }

    pub fn has_component<T: ComponentKind>(&self) -> bool {
        self.components.iter().any(|c| c.component_type() == T::TYPE)
    }

    fn remove_components<T: ComponentKind>(&mut self) {
        self.components.retain(|c| c.component_type() != T::TYPE);
    }

    /// Current transform (identity when the component was never added)
    pub fn transform(&self) -> Transform {
        self.get_component::<Transform>().copied().unwrap_or_default()
    }

    // ===== MESHES AND MATERIAL =====

    /// Replace the actor's meshes and rebuild their buffers
    ///
    /// Nothing changes if any buffer fails to build.
    pub fn set_mesh(&mut self, device: &Device, meshes: &[MeshComponent]) -> Result<()> {
        let mut buffers = Vec::with_capacity(meshes.len());
        for mesh in meshes {
            let mut vertex = Buffer::new();
            vertex.init_from_mesh(device, mesh, BindingKind::Vertex)?;
            let mut index = Buffer::new();
            index.init_from_mesh(device, mesh, BindingKind::Index)?;
            buffers.push(MeshBuffers { vertex, index });
        }

        for old in &mut self.mesh_buffers {
            old.vertex.destroy();
            old.index.destroy();
        }
        self.mesh_buffers = buffers;
        self.remove_components::<MeshComponent>();
        for mesh in meshes {
            self.add_component(mesh.clone());
        }

        crate::engine_debug!("monaco::Actor", "Actor '{}' has {} meshes", self.name, meshes.len());
        Ok(())
    }

    pub fn set_textures(&mut self, textures: Vec<Arc<TextureAsset>>) {
        match self.get_component_mut::<Material>() {
            Some(material) => material.textures = textures,
            None => self.add_component(Material { textures, ..Default::default() }),
        }
    }

    pub fn set_color(&mut self, color: Vec4) {
        match self.get_component_mut::<Material>() {
            Some(material) => material.color = color,
            None => self.add_component(Material { color, ..Default::default() }),
        }
    }

    /// Per-actor constant buffer (register b2)
    pub fn constant_buffer(&self) -> &Buffer {
        &self.constant_buffer
    }

    pub fn mesh_count(&self) -> usize {
        self.mesh_buffers.len()
    }

    // ===== FRAME =====

    /// Refresh the per-actor constant buffer from the transform and material
    pub fn update(&mut self, _delta_time: f32, device_context: &mut DeviceContext) -> Result<()> {
        let color = self.get_component::<Material>().map_or(Vec4::ONE, |m| m.color);
        let constants = CbChangesEveryFrame::new(self.transform().world_matrix(), color);
        self.constant_buffer.update_value(device_context, &constants)
    }

    /// Bind per-actor state and issue one indexed draw per mesh
    pub fn render(&self, device_context: &mut DeviceContext) -> Result<()> {
        if self.mesh_buffers.is_empty() {
            return Ok(());
        }

        device_context.ia_set_primitive_topology(PrimitiveTopology::TriangleList);
        self.constant_buffer.render(device_context, CB_CHANGES_EVERY_FRAME_SLOT, true);
        self.sampler.render(device_context, 0);

        let material = self.get_component::<Material>();
        for (index, buffers) in self.mesh_buffers.iter().enumerate() {
            buffers.vertex.render(device_context, 0, false);
            buffers.index.render(device_context, 0, false);
            if let Some(texture) = material.and_then(|m| m.texture_for_mesh(index)) {
                texture.render(device_context, 0);
            }
            device_context.draw_indexed(buffers.index.element_count(), 0, 0)?;
        }
        Ok(())
    }

    /// Release every GPU object owned by the actor (idempotent)
    pub fn destroy(&mut self) {
        for buffers in &mut self.mesh_buffers {
            buffers.vertex.destroy();
            buffers.index.destroy();
        }
        self.mesh_buffers.clear();
        self.constant_buffer.destroy();
        self.sampler.destroy();
    }
}

#[cfg(test)]
#[path = "actor_tests.rs"]
mod tests;
