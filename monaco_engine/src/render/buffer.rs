/// Buffer - one vertex, index or constant buffer

use std::sync::Arc;
use bytemuck::Pod;

use crate::error::Result;
use crate::graphics_device::{self as gd, BindFlags, BufferDesc, Format};
use crate::render::{Device, DeviceContext};
use crate::scene::MeshComponent;

/// Role a buffer was created for, fixed at init
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BindingKind {
    Vertex,
    Index,
    Constant,
}

/// Constant buffers must be sized in 16-byte registers
pub const CONSTANT_BUFFER_ALIGNMENT: u32 = 16;

/// Buffer wrapper
///
/// The binding kind chosen at init decides what `render` binds: vertex
/// buffers go to the input assembler with their stride, index buffers as
/// 32-bit indices, constant buffers to the vertex shader and optionally the
/// pixel shader.
#[derive(Default)]
pub struct Buffer {
    buffer: Option<Arc<dyn gd::Buffer>>,
    kind: Option<BindingKind>,
    stride: u32,
    element_count: u32,
}

impl Buffer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a vertex buffer holding `vertices`
    pub fn init_vertex<T: Pod>(&mut self, device: &Device, vertices: &[T]) -> Result<()> {
        if vertices.is_empty() {
            crate::engine_bail!("monaco::Buffer", InvalidArgument: "Vertex buffer has no vertices");
        }
        let stride = std::mem::size_of::<T>() as u32;
        let bytes: &[u8] = bytemuck::cast_slice(vertices);
        self.create(device, BindingKind::Vertex, stride, bytes.len() as u32, Some(bytes), vertices.len() as u32)
    }

    /// Create a 32-bit index buffer
    pub fn init_index(&mut self, device: &Device, indices: &[u32]) -> Result<()> {
        if indices.is_empty() {
            crate::engine_bail!("monaco::Buffer", InvalidArgument: "Index buffer has no indices");
        }
        let bytes: &[u8] = bytemuck::cast_slice(indices);
        self.create(device, BindingKind::Index, 4, bytes.len() as u32, Some(bytes), indices.len() as u32)
    }

    /// Create the vertex or index buffer of a mesh
    pub fn init_from_mesh(&mut self, device: &Device, mesh: &MeshComponent, kind: BindingKind) -> Result<()> {
        match kind {
            BindingKind::Vertex => self.init_vertex(device, &mesh.vertices),
            BindingKind::Index => self.init_index(device, &mesh.indices),
            BindingKind::Constant => crate::engine_bail!("monaco::Buffer", InvalidArgument:
                "Mesh '{}' cannot build a constant buffer", mesh.name),
        }
    }

    /// Create an uninitialized constant buffer of `byte_width` bytes
    ///
    /// # Errors
    ///
    /// `InvalidArgument` for a zero width, `InvalidResource` when the width is
    /// not a multiple of 16 (no rounding is applied).
    pub fn init_constant(&mut self, device: &Device, byte_width: u32) -> Result<()> {
        check_constant_width(byte_width)?;
        self.create(device, BindingKind::Constant, 0, byte_width, None, 1)
    }

    /// Create a constant buffer sized and filled from `value`
    pub fn init_constant_from<T: Pod>(&mut self, device: &Device, value: &T) -> Result<()> {
        let bytes = bytemuck::bytes_of(value);
        check_constant_width(bytes.len() as u32)?;
        self.create(device, BindingKind::Constant, 0, bytes.len() as u32, Some(bytes), 1)
    }

    fn create(
        &mut self,
        device: &Device,
        kind: BindingKind,
        stride: u32,
        byte_width: u32,
        initial_data: Option<&[u8]>,
        element_count: u32,
    ) -> Result<()> {
        let bind = match kind {
            BindingKind::Vertex => BindFlags::VERTEX_BUFFER,
            BindingKind::Index => BindFlags::INDEX_BUFFER,
            BindingKind::Constant => BindFlags::CONSTANT_BUFFER,
        };
        let desc = BufferDesc { byte_width, bind, stride };
        // keep the old buffer if creation fails
        let buffer = device.create_buffer(&desc, initial_data)?;

        self.buffer = Some(buffer);
        self.kind = Some(kind);
        self.stride = stride;
        self.element_count = element_count;
        Ok(())
    }

    pub fn is_valid(&self) -> bool {
        self.buffer.is_some()
    }

    pub fn kind(&self) -> Option<BindingKind> {
        self.kind
    }

    pub fn stride(&self) -> u32 {
        self.stride
    }

    /// Number of vertices or indices (1 for constant buffers)
    pub fn element_count(&self) -> u32 {
        self.element_count
    }

    pub fn byte_width(&self) -> u32 {
        self.buffer.as_ref().map_or(0, |b| b.desc().byte_width)
    }

    pub fn native(&self) -> Option<&Arc<dyn gd::Buffer>> {
        self.buffer.as_ref()
    }

    /// Overwrite the buffer contents from the start
    pub fn update(&self, device_context: &mut DeviceContext, data: &[u8]) -> Result<()> {
        let buffer = self.buffer.as_ref().ok_or_else(|| {
            crate::engine_err!("monaco::Buffer", InvalidArgument: "update on an uninitialized buffer")
        })?;
        device_context.update_subresource(buffer, data)
    }

    /// Overwrite the buffer with the bytes of a plain-data value
    pub fn update_value<T: Pod>(&self, device_context: &mut DeviceContext, value: &T) -> Result<()> {
        self.update(device_context, bytemuck::bytes_of(value))
    }

    /// Bind according to the binding kind
    ///
    /// `start_slot` is the vertex buffer slot or constant buffer register and
    /// is ignored for index buffers. `bind_to_pixel_shader` additionally binds
    /// a constant buffer to the pixel shader.
    pub fn render(&self, device_context: &mut DeviceContext, start_slot: u32, bind_to_pixel_shader: bool) {
        let (Some(buffer), Some(kind)) = (&self.buffer, self.kind) else {
            crate::engine_error!("monaco::Buffer", "render on an uninitialized buffer");
            return;
        };
        match kind {
            BindingKind::Vertex => {
                device_context.ia_set_vertex_buffers(start_slot, std::slice::from_ref(buffer), &[self.stride], &[0]);
            }
            BindingKind::Index => {
                device_context.ia_set_index_buffer(Some(buffer), Format::R32_UINT, 0);
            }
            BindingKind::Constant => {
                device_context.vs_set_constant_buffers(start_slot, std::slice::from_ref(buffer));
                if bind_to_pixel_shader {
                    device_context.ps_set_constant_buffers(start_slot, std::slice::from_ref(buffer));
                }
            }
        }
    }

    /// Release the buffer (idempotent)
    pub fn destroy(&mut self) {
        self.buffer = None;
        self.kind = None;
        self.stride = 0;
        self.element_count = 0;
    }
}

fn check_constant_width(byte_width: u32) -> Result<()> {
    if byte_width == 0 {
        crate::engine_bail!("monaco::Buffer", InvalidArgument: "Constant buffer byte width is 0");
    }
    if byte_width % CONSTANT_BUFFER_ALIGNMENT != 0 {
        crate::engine_bail!("monaco::Buffer", InvalidResource:
            "Constant buffer byte width {} is not a multiple of {}",
            byte_width, CONSTANT_BUFFER_ALIGNMENT);
    }
    Ok(())
}

#[cfg(test)]
#[path = "buffer_tests.rs"]
mod tests;
