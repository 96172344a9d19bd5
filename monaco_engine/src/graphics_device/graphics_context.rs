/// Command submission trait (immediate context)

use std::sync::Arc;
use bitflags::bitflags;
use crate::error::Result;
use crate::graphics_device::{
    Buffer, DepthStencilView, Format, InputLayout, PixelShader, RenderTargetView,
    SamplerState, ShaderResourceView, VertexShader,
};

/// Primitive topology for input assembly
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PrimitiveTopology {
    PointList,
    LineList,
    LineStrip,
    TriangleList,
    TriangleStrip,
}

bitflags! {
    /// Aspects cleared by clear_depth_stencil_view
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct ClearFlags: u32 {
        const DEPTH = 1 << 0;
        const STENCIL = 1 << 1;
    }
}

/// Native viewport rectangle
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ViewportDesc {
    pub top_left_x: f32,
    pub top_left_y: f32,
    pub width: f32,
    pub height: f32,
    pub min_depth: f32,
    pub max_depth: f32,
}

/// Immediate command context
///
/// Bind calls only record what the next draw will use; they never fail and
/// perform no redundancy filtering. Calls that touch GPU memory or submit
/// work return a Result.
pub trait GraphicsContext: Send {
    fn ia_set_input_layout(&mut self, layout: Option<&Arc<dyn InputLayout>>);

    /// Bind vertex buffers starting at `start_slot` (one stride/offset per buffer)
    fn ia_set_vertex_buffers(
        &mut self,
        start_slot: u32,
        buffers: &[Arc<dyn Buffer>],
        strides: &[u32],
        offsets: &[u32],
    );

    fn ia_set_index_buffer(&mut self, buffer: Option<&Arc<dyn Buffer>>, format: Format, offset: u32);

    fn ia_set_primitive_topology(&mut self, topology: PrimitiveTopology);

    fn vs_set_shader(&mut self, shader: Option<&Arc<dyn VertexShader>>);

    fn vs_set_constant_buffers(&mut self, start_slot: u32, buffers: &[Arc<dyn Buffer>]);

    fn ps_set_shader(&mut self, shader: Option<&Arc<dyn PixelShader>>);

    fn ps_set_constant_buffers(&mut self, start_slot: u32, buffers: &[Arc<dyn Buffer>]);

    fn ps_set_shader_resources(&mut self, start_slot: u32, views: &[Arc<dyn ShaderResourceView>]);

    fn ps_set_samplers(&mut self, start_slot: u32, samplers: &[Arc<dyn SamplerState>]);

    fn rs_set_viewports(&mut self, viewports: &[ViewportDesc]);

    fn om_set_render_targets(
        &mut self,
        render_targets: &[Arc<dyn RenderTargetView>],
        depth_stencil: Option<&Arc<dyn DepthStencilView>>,
    );

    /// Clear a color target to `color` (RGBA)
    fn clear_render_target_view(&mut self, view: &Arc<dyn RenderTargetView>, color: [f32; 4]) -> Result<()>;

    /// Clear the selected aspects of a depth/stencil target
    fn clear_depth_stencil_view(
        &mut self,
        view: &Arc<dyn DepthStencilView>,
        flags: ClearFlags,
        depth: f32,
        stencil: u8,
    ) -> Result<()>;

    /// Overwrite the start of a buffer with `data`
    fn update_subresource(&mut self, buffer: &Arc<dyn Buffer>, data: &[u8]) -> Result<()>;

    /// Non-indexed draw with the currently bound state
    fn draw(&mut self, vertex_count: u32, start_vertex: u32) -> Result<()>;

    /// Indexed draw with the currently bound state
    fn draw_indexed(&mut self, index_count: u32, start_index: u32, base_vertex: i32) -> Result<()>;

    /// Unbind everything (used before teardown)
    fn clear_state(&mut self);
}
