/// Mesh data container: vertices and triangle indices
///
/// Produced by the model loader and consumed by actors, which turn it into
/// vertex and index buffers.

use bytemuck::{Pod, Zeroable};
use glam::{Vec2, Vec3};
use crate::graphics_device::{Format, InputElementDesc};

/// Vertex layout used by every mesh: position, texcoord, normal (32 bytes)
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Default, Pod, Zeroable)]
pub struct SimpleVertex {
    pub position: Vec3,
    pub texcoord: Vec2,
    pub normal: Vec3,
}

const _: () = assert!(std::mem::size_of::<SimpleVertex>() == 32);

impl SimpleVertex {
    pub fn new(position: Vec3, texcoord: Vec2, normal: Vec3) -> Self {
        Self { position, texcoord, normal }
    }

    /// Input layout matching the field order above
    pub fn input_layout() -> Vec<InputElementDesc> {
        vec![
            InputElementDesc::new("POSITION", Format::R32G32B32_FLOAT),
            InputElementDesc::new("TEXCOORD", Format::R32G32_FLOAT),
            InputElementDesc::new("NORMAL", Format::R32G32B32_FLOAT),
        ]
    }
}

/// Named vertex and index lists
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MeshComponent {
    pub name: String,
    pub vertices: Vec<SimpleVertex>,
    pub indices: Vec<u32>,
}

impl MeshComponent {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            ..Default::default()
        }
    }

    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    pub fn index_count(&self) -> usize {
        self.indices.len()
    }

    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty() || self.indices.is_empty()
    }

    pub fn clear(&mut self) {
        self.vertices.clear();
        self.indices.clear();
    }
}
