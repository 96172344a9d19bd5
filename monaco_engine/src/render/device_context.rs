/// DeviceContext - forwarding wrapper over the native immediate context

use std::sync::Arc;

use crate::error::Result;
use crate::graphics_device::{
    self as gd, ClearFlags, Format, GraphicsContext, PrimitiveTopology, ViewportDesc,
};

/// Owner of the native immediate context
///
/// Every bind call is forwarded as-is: no state is cached and redundant binds
/// are legal. Binding order within a frame is the caller's responsibility.
/// Calling a bind on a destroyed context is a programmer error; it is logged
/// and ignored.
#[derive(Default)]
pub struct DeviceContext {
    context: Option<Box<dyn GraphicsContext>>,
}

macro_rules! forward {
    ($self:ident, $name:literal, |$ctx:ident| $call:expr) => {
        match $self.context.as_deref_mut() {
            Some($ctx) => $call,
            None => crate::engine_error!("monaco::DeviceContext",
                "{} called on an uninitialized context", $name),
        }
    };
}

impl DeviceContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Wrap an already created native context
    pub fn from_native(context: Box<dyn GraphicsContext>) -> Self {
        Self { context: Some(context) }
    }

    pub(crate) fn set_native(&mut self, context: Box<dyn GraphicsContext>) {
        self.context = Some(context);
    }

    pub fn is_valid(&self) -> bool {
        self.context.is_some()
    }

    fn native(&mut self) -> Result<&mut dyn GraphicsContext> {
        match self.context.as_deref_mut() {
            Some(context) => Ok(context),
            None => Err(crate::engine_err!("monaco::DeviceContext", InvalidArgument:
                "DeviceContext is not initialized")),
        }
    }

    // ===== INPUT ASSEMBLER =====

    pub fn ia_set_input_layout(&mut self, layout: Option<&Arc<dyn gd::InputLayout>>) {
        forward!(self, "ia_set_input_layout", |ctx| ctx.ia_set_input_layout(layout));
    }

    pub fn ia_set_vertex_buffers(&mut self, start_slot: u32, buffers: &[Arc<dyn gd::Buffer>], strides: &[u32], offsets: &[u32]) {
        forward!(self, "ia_set_vertex_buffers", |ctx| ctx.ia_set_vertex_buffers(start_slot, buffers, strides, offsets));
    }

    pub fn ia_set_index_buffer(&mut self, buffer: Option<&Arc<dyn gd::Buffer>>, format: Format, offset: u32) {
        forward!(self, "ia_set_index_buffer", |ctx| ctx.ia_set_index_buffer(buffer, format, offset));
    }

    pub fn ia_set_primitive_topology(&mut self, topology: PrimitiveTopology) {
        forward!(self, "ia_set_primitive_topology", |ctx| ctx.ia_set_primitive_topology(topology));
    }

    // ===== SHADER STAGES =====

    pub fn vs_set_shader(&mut self, shader: Option<&Arc<dyn gd::VertexShader>>) {
        forward!(self, "vs_set_shader", |ctx| ctx.vs_set_shader(shader));
    }

    pub fn vs_set_constant_buffers(&mut self, start_slot: u32, buffers: &[Arc<dyn gd::Buffer>]) {
        forward!(self, "vs_set_constant_buffers", |ctx| ctx.vs_set_constant_buffers(start_slot, buffers));
    }

    pub fn ps_set_shader(&mut self, shader: Option<&Arc<dyn gd::PixelShader>>) {
        forward!(self, "ps_set_shader", |ctx| ctx.ps_set_shader(shader));
    }

    pub fn ps_set_constant_buffers(&mut self, start_slot: u32, buffers: &[Arc<dyn gd::Buffer>]) {
        forward!(self, "ps_set_constant_buffers", |ctx| ctx.ps_set_constant_buffers(start_slot, buffers));
    }

    pub fn ps_set_shader_resources(&mut self, start_slot: u32, views: &[Arc<dyn gd::ShaderResourceView>]) {
        forward!(self, "ps_set_shader_resources", |ctx| ctx.ps_set_shader_resources(start_slot, views));
    }

    pub fn ps_set_samplers(&mut self, start_slot: u32, samplers: &[Arc<dyn gd::SamplerState>]) {
        forward!(self, "ps_set_samplers", |ctx| ctx.ps_set_samplers(start_slot, samplers));
    }

    // ===== RASTERIZER / OUTPUT MERGER =====

    pub fn rs_set_viewports(&mut self, viewports: &[ViewportDesc]) {
        forward!(self, "rs_set_viewports", |ctx| ctx.rs_set_viewports(viewports));
    }

    pub fn om_set_render_targets(&mut self, render_targets: &[Arc<dyn gd::RenderTargetView>], depth_stencil: Option<&Arc<dyn gd::DepthStencilView>>) {
        forward!(self, "om_set_render_targets", |ctx| ctx.om_set_render_targets(render_targets, depth_stencil));
    }

    // ===== COMMANDS =====

    pub fn clear_render_target_view(&mut self, view: &Arc<dyn gd::RenderTargetView>, color: [f32; 4]) -> Result<()> {
        self.native()?.clear_render_target_view(view, color)
    }

    pub fn clear_depth_stencil_view(&mut self, view: &Arc<dyn gd::DepthStencilView>, flags: ClearFlags, depth: f32, stencil: u8) -> Result<()> {
        self.native()?.clear_depth_stencil_view(view, flags, depth, stencil)
    }

    pub fn update_subresource(&mut self, buffer: &Arc<dyn gd::Buffer>, data: &[u8]) -> Result<()> {
        if data.len() > buffer.desc().byte_width as usize {
            crate::engine_bail!("monaco::DeviceContext", InvalidArgument:
                "update_subresource: {} bytes into a {} byte buffer",
                data.len(), buffer.desc().byte_width);
        }
        self.native()?.update_subresource(buffer, data)
    }

    pub fn draw(&mut self, vertex_count: u32, start_vertex: u32) -> Result<()> {
        self.native()?.draw(vertex_count, start_vertex)
    }

    pub fn draw_indexed(&mut self, index_count: u32, start_index: u32, base_vertex: i32) -> Result<()> {
        self.native()?.draw_indexed(index_count, start_index, base_vertex)
    }

    /// Unbind all pipeline state
    pub fn clear_state(&mut self) {
        forward!(self, "clear_state", |ctx| ctx.clear_state());
    }

    /// Release the native context (idempotent)
    pub fn destroy(&mut self) {
        if self.context.take().is_some() {
            crate::engine_debug!("monaco::DeviceContext", "DeviceContext destroyed");
        }
    }
}

#[cfg(test)]
#[path = "device_context_tests.rs"]
mod tests;
