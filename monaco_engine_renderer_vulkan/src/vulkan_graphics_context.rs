/// VulkanGraphicsContext - immediate context emulated on a command buffer
///
/// Bind calls only store state. Draws resolve the stored state into a cached
/// pipeline and a per-draw descriptor set, then record the draw. Clears and
/// buffer updates are recorded immediately, outside any rendering scope.

use std::sync::{Arc, Mutex, MutexGuard};
use ash::vk;
use monaco_engine::monaco::Result;
use monaco_engine::monaco::graphics::{
    Buffer, ClearFlags, DepthStencilView, Format, GraphicsContext, InputLayout, PixelShader,
    PrimitiveTopology, RenderTargetView, SamplerState, ShaderResourceView, VertexShader, ViewportDesc,
};
use monaco_engine::{engine_bail, engine_err, engine_warn};

use crate::vulkan_buffer::VulkanBuffer;
use crate::vulkan_context::{
    GpuContext, CONSTANT_BUFFER_BINDING_BASE, MAX_SLOTS, SAMPLER_BINDING_BASE, SHADER_RESOURCE_BINDING_BASE,
};
use crate::vulkan_format::{flipped_viewport, index_type_to_vk, topology_to_vk};
use crate::vulkan_frame::FrameRecorder;
use crate::vulkan_pipeline::{PipelineCache, PipelineKey};
use crate::vulkan_sampler::VulkanSampler;
use crate::vulkan_shader::{vulkan_pixel_shader, vulkan_vertex_shader, VulkanInputLayout};
use crate::vulkan_texture::{VulkanTexture, VulkanView};

/// Largest vkCmdUpdateBuffer payload
const MAX_UPDATE_SIZE: usize = 65536;

#[derive(Clone)]
struct VertexBinding {
    buffer: Arc<dyn Buffer>,
    stride: u32,
    offset: u32,
}

/// State recorded by the bind calls
#[derive(Default)]
struct BoundState {
    input_layout: Option<Arc<dyn InputLayout>>,
    vertex_buffers: Vec<Option<VertexBinding>>,
    index_buffer: Option<(Arc<dyn Buffer>, Format, u32)>,
    topology: Option<PrimitiveTopology>,
    vertex_shader: Option<Arc<dyn VertexShader>>,
    pixel_shader: Option<Arc<dyn PixelShader>>,
    vs_constant_buffers: Vec<Option<Arc<dyn Buffer>>>,
    ps_constant_buffers: Vec<Option<Arc<dyn Buffer>>>,
    shader_resources: Vec<Option<Arc<dyn ShaderResourceView>>>,
    samplers: Vec<Option<Arc<dyn SamplerState>>>,
    viewport: Option<ViewportDesc>,
    render_targets: Vec<Arc<dyn RenderTargetView>>,
    depth_stencil: Option<Arc<dyn DepthStencilView>>,
}

/// Store `items` into `slots` starting at `start_slot`, growing as needed
fn bind_slots<T: Clone>(slots: &mut Vec<Option<T>>, start_slot: u32, items: &[T]) {
    for (i, item) in items.iter().enumerate() {
        let slot = start_slot as usize + i;
        if slot >= MAX_SLOTS as usize {
            engine_warn!("monaco::vulkan::GraphicsContext",
                "Slot {} exceeds the {} supported slots, ignored", slot, MAX_SLOTS);
            return;
        }
        if slots.len() <= slot {
            slots.resize(slot + 1, None);
        }
        slots[slot] = Some(item.clone());
    }
}

pub struct VulkanGraphicsContext {
    ctx: Arc<GpuContext>,
    frames: Arc<Mutex<FrameRecorder>>,
    pipelines: PipelineCache,
    state: BoundState,
    /// Render targets changed since the rendering scope was opened
    targets_dirty: bool,
}

impl VulkanGraphicsContext {
    pub(crate) fn new(ctx: Arc<GpuContext>, frames: Arc<Mutex<FrameRecorder>>) -> Self {
        Self {
            pipelines: PipelineCache::new(ctx.clone()),
            ctx,
            frames,
            state: BoundState::default(),
            targets_dirty: true,
        }
    }

    /// Number of distinct pipelines created so far
    pub fn pipeline_count(&self) -> usize {
        self.pipelines.len()
    }

    fn lock_frames(&self) -> Result<MutexGuard<'_, FrameRecorder>> {
        self.frames.lock()
            .map_err(|_| engine_err!("monaco::vulkan::GraphicsContext", "Frame recorder lock poisoned"))
    }

    /// Open (or reopen) the rendering scope on the bound targets
    fn begin_rendering(&mut self, frames: &mut FrameRecorder, cmd: vk::CommandBuffer) -> Result<vk::Extent2D> {
        let first = self.state.render_targets.first().ok_or_else(|| {
            engine_err!("monaco::vulkan::GraphicsContext", InvalidResource: "Draw without a render target")
        })?;
        let first_desc = first.texture().desc();
        let extent = vk::Extent2D { width: first_desc.width, height: first_desc.height };

        if frames.rendering && !self.targets_dirty {
            return Ok(extent);
        }
        frames.end_rendering();

        let mut color_attachments = Vec::with_capacity(self.state.render_targets.len());
        for target in &self.state.render_targets {
            let view = target_view(target.as_any())?;
            view.native_texture()?.transition(cmd, vk::ImageLayout::COLOR_ATTACHMENT_OPTIMAL);
            color_attachments.push(vk::RenderingAttachmentInfo::default()
                .image_view(view.view)
                .image_layout(vk::ImageLayout::COLOR_ATTACHMENT_OPTIMAL)
                .load_op(vk::AttachmentLoadOp::LOAD)
                .store_op(vk::AttachmentStoreOp::STORE));
            frames.keep_alive(target.clone());
        }

        let depth_attachment = match &self.state.depth_stencil {
            Some(depth) => {
                let view = target_view(depth.as_any())?;
                view.native_texture()?.transition(cmd, vk::ImageLayout::DEPTH_STENCIL_ATTACHMENT_OPTIMAL);
                frames.keep_alive(depth.clone());
                Some(vk::RenderingAttachmentInfo::default()
                    .image_view(view.view)
                    .image_layout(vk::ImageLayout::DEPTH_STENCIL_ATTACHMENT_OPTIMAL)
                    .load_op(vk::AttachmentLoadOp::LOAD)
                    .store_op(vk::AttachmentStoreOp::STORE))
            }
            None => None,
        };
        let has_stencil = self.state.depth_stencil.as_ref()
            .map(|depth| depth.format().has_stencil())
            .unwrap_or(false);

        let mut rendering_info = vk::RenderingInfo::default()
            .render_area(vk::Rect2D { offset: vk::Offset2D::default(), extent })
            .layer_count(1)
            .color_attachments(&color_attachments);
        if let Some(depth) = depth_attachment.as_ref() {
            rendering_info = rendering_info.depth_attachment(depth);
            if has_stencil {
                rendering_info = rendering_info.stencil_attachment(depth);
            }
        }

        unsafe {
            self.ctx.device.cmd_begin_rendering(cmd, &rendering_info);
        }
        frames.rendering = true;
        self.targets_dirty = false;
        Ok(extent)
    }

    /// Resolve the bound state and record everything a draw needs
    fn prepare_draw(&mut self, frames: &mut FrameRecorder, cmd: vk::CommandBuffer) -> Result<()> {
        let vertex_shader = self.state.vertex_shader.clone().ok_or_else(|| {
            engine_err!("monaco::vulkan::GraphicsContext", InvalidResource: "Draw without a vertex shader")
        })?;
        let pixel_shader = self.state.pixel_shader.clone().ok_or_else(|| {
            engine_err!("monaco::vulkan::GraphicsContext", InvalidResource: "Draw without a pixel shader")
        })?;
        let input_layout = self.state.input_layout.clone().ok_or_else(|| {
            engine_err!("monaco::vulkan::GraphicsContext", InvalidResource: "Draw without an input layout")
        })?;
        let native_layout = input_layout.as_any().downcast_ref::<VulkanInputLayout>().ok_or_else(|| {
            engine_err!("monaco::vulkan::GraphicsContext", InvalidResource:
                "Input layout was not created by the Vulkan backend")
        })?;

        // Sampled images must leave their attachment/transfer layouts outside rendering
        let mut sampled: Vec<&VulkanTexture> = Vec::new();
        for view in self.state.shader_resources.iter().flatten() {
            sampled.push(target_view(view.as_any())?.native_texture()?);
        }
        if sampled.iter().any(|texture| texture.current_layout() != vk::ImageLayout::SHADER_READ_ONLY_OPTIMAL) {
            frames.end_rendering();
            for texture in &sampled {
                texture.transition(cmd, vk::ImageLayout::SHADER_READ_ONLY_OPTIMAL);
            }
        }

        let extent = self.begin_rendering(frames, cmd)?;

        // Pipeline
        let elements = input_layout.elements();
        let mut strides: Vec<(u32, u32)> = Vec::new();
        for element in elements {
            if strides.iter().any(|(slot, _)| *slot == element.input_slot) {
                continue;
            }
            let binding = self.state.vertex_buffers
                .get(element.input_slot as usize)
                .and_then(|binding| binding.as_ref())
                .ok_or_else(|| engine_err!("monaco::vulkan::GraphicsContext", InvalidResource:
                    "Input slot {} has no vertex buffer bound", element.input_slot))?;
            strides.push((element.input_slot, binding.stride));
        }
        strides.sort_unstable();

        let vs = vulkan_vertex_shader(&vertex_shader)?;
        let ps = vulkan_pixel_shader(&pixel_shader)?;
        let color_formats = self.state.render_targets
            .iter()
            .map(|target| target_view(target.as_any()).and_then(|view| view.native_texture()).map(|t| t.vk_format.as_raw()))
            .collect::<Result<Vec<i32>>>()?;
        let depth_format = match &self.state.depth_stencil {
            Some(depth) => target_view(depth.as_any())?.native_texture()?.vk_format,
            None => vk::Format::UNDEFINED,
        };
        let samples = self.state.render_targets[0].texture().desc().sample_count;

        let key = PipelineKey {
            vertex_module: vk::Handle::as_raw(vs.module),
            pixel_module: vk::Handle::as_raw(ps.module),
            input_layout: native_layout.id,
            topology: topology_to_vk(self.state.topology.unwrap_or(PrimitiveTopology::TriangleList)).as_raw(),
            strides,
            color_formats,
            depth_format: depth_format.as_raw(),
            samples: crate::vulkan_format::sample_count_to_vk(samples).as_raw(),
        };
        let pipeline = self.pipelines.get_or_create(&key, vs, ps, elements)?;

        let device = &self.ctx.device;
        unsafe {
            device.cmd_bind_pipeline(cmd, vk::PipelineBindPoint::GRAPHICS, pipeline);

            let viewport = self.state.viewport.unwrap_or(ViewportDesc {
                width: extent.width as f32,
                height: extent.height as f32,
                max_depth: 1.0,
                ..Default::default()
            });
            device.cmd_set_viewport(cmd, 0, &[flipped_viewport(
                viewport.top_left_x, viewport.top_left_y, viewport.width, viewport.height,
                viewport.min_depth, viewport.max_depth,
            )]);
            device.cmd_set_scissor(cmd, 0, &[vk::Rect2D { offset: vk::Offset2D::default(), extent }]);
        }

        self.bind_descriptors(frames, cmd)?;

        for (slot, _) in &key.strides {
            if let Some(binding) = self.state.vertex_buffers.get(*slot as usize).and_then(|b| b.as_ref()) {
                let native = vulkan_buffer(&binding.buffer)?;
                unsafe {
                    device.cmd_bind_vertex_buffers(cmd, *slot, &[native.buffer], &[binding.offset as u64]);
                }
                frames.keep_alive(binding.buffer.clone());
            }
        }

        frames.keep_alive(vertex_shader);
        frames.keep_alive(pixel_shader);
        Ok(())
    }

    /// Write one descriptor set from the bound constant buffers, views and samplers
    fn bind_descriptors(&self, frames: &mut FrameRecorder, cmd: vk::CommandBuffer) -> Result<()> {
        let set = frames.allocate_descriptor_set()?;

        let mut buffer_infos: Vec<(u32, vk::DescriptorBufferInfo)> = Vec::new();
        for slot in 0..MAX_SLOTS as usize {
            // One binding per slot for both stages; the vertex stage binding wins
            let buffer = self.state.vs_constant_buffers.get(slot).cloned().flatten()
                .or_else(|| self.state.ps_constant_buffers.get(slot).cloned().flatten());
            if let Some(buffer) = buffer {
                let native = vulkan_buffer(&buffer)?;
                buffer_infos.push((CONSTANT_BUFFER_BINDING_BASE + slot as u32, vk::DescriptorBufferInfo {
                    buffer: native.buffer,
                    offset: 0,
                    range: vk::WHOLE_SIZE,
                }));
                frames.keep_alive(buffer);
            }
        }

        let mut image_infos: Vec<(u32, vk::DescriptorType, vk::DescriptorImageInfo)> = Vec::new();
        for (slot, view) in self.state.shader_resources.iter().enumerate() {
            if let Some(view) = view {
                image_infos.push((SHADER_RESOURCE_BINDING_BASE + slot as u32, vk::DescriptorType::SAMPLED_IMAGE,
                    vk::DescriptorImageInfo {
                        sampler: vk::Sampler::null(),
                        image_view: target_view(view.as_any())?.view,
                        image_layout: vk::ImageLayout::SHADER_READ_ONLY_OPTIMAL,
                    }));
                frames.keep_alive(view.clone());
            }
        }
        for (slot, sampler) in self.state.samplers.iter().enumerate() {
            if let Some(sampler) = sampler {
                let native = sampler.as_any().downcast_ref::<VulkanSampler>().ok_or_else(|| {
                    engine_err!("monaco::vulkan::GraphicsContext", InvalidResource:
                        "Sampler was not created by the Vulkan backend")
                })?;
                image_infos.push((SAMPLER_BINDING_BASE + slot as u32, vk::DescriptorType::SAMPLER,
                    vk::DescriptorImageInfo {
                        sampler: native.sampler,
                        image_view: vk::ImageView::null(),
                        image_layout: vk::ImageLayout::UNDEFINED,
                    }));
                frames.keep_alive(sampler.clone());
            }
        }

        let mut writes = Vec::with_capacity(buffer_infos.len() + image_infos.len());
        for (binding, info) in &buffer_infos {
            writes.push(vk::WriteDescriptorSet::default()
                .dst_set(set)
                .dst_binding(*binding)
                .descriptor_type(vk::DescriptorType::UNIFORM_BUFFER)
                .buffer_info(std::slice::from_ref(info)));
        }
        for (binding, ty, info) in &image_infos {
            writes.push(vk::WriteDescriptorSet::default()
                .dst_set(set)
                .dst_binding(*binding)
                .descriptor_type(*ty)
                .image_info(std::slice::from_ref(info)));
        }

        unsafe {
            self.ctx.device.update_descriptor_sets(&writes, &[]);
            self.ctx.device.cmd_bind_descriptor_sets(
                cmd, vk::PipelineBindPoint::GRAPHICS, self.ctx.pipeline_layout, 0, &[set], &[]);
        }
        Ok(())
    }
}

/// Recover the Vulkan view behind any engine view trait object
fn target_view(any: &dyn std::any::Any) -> Result<&VulkanView> {
    any.downcast_ref::<VulkanView>().ok_or_else(|| {
        engine_err!("monaco::vulkan::GraphicsContext", InvalidResource: "View was not created by the Vulkan backend")
    })
}

fn vulkan_buffer(buffer: &Arc<dyn Buffer>) -> Result<&VulkanBuffer> {
    buffer.as_any().downcast_ref::<VulkanBuffer>().ok_or_else(|| {
        engine_err!("monaco::vulkan::GraphicsContext", InvalidResource: "Buffer was not created by the Vulkan backend")
    })
}

impl GraphicsContext for VulkanGraphicsContext {
    fn ia_set_input_layout(&mut self, layout: Option<&Arc<dyn InputLayout>>) {
        self.state.input_layout = layout.cloned();
    }

    fn ia_set_vertex_buffers(&mut self, start_slot: u32, buffers: &[Arc<dyn Buffer>], strides: &[u32], offsets: &[u32]) {
        let bindings: Vec<VertexBinding> = buffers
            .iter()
            .enumerate()
            .map(|(i, buffer)| VertexBinding {
                buffer: buffer.clone(),
                stride: strides.get(i).copied().unwrap_or(buffer.desc().stride),
                offset: offsets.get(i).copied().unwrap_or(0),
            })
            .collect();
        bind_slots(&mut self.state.vertex_buffers, start_slot, &bindings);
    }

    fn ia_set_index_buffer(&mut self, buffer: Option<&Arc<dyn Buffer>>, format: Format, offset: u32) {
        self.state.index_buffer = buffer.map(|buffer| (buffer.clone(), format, offset));
    }

    fn ia_set_primitive_topology(&mut self, topology: PrimitiveTopology) {
        self.state.topology = Some(topology);
    }

    fn vs_set_shader(&mut self, shader: Option<&Arc<dyn VertexShader>>) {
        self.state.vertex_shader = shader.cloned();
    }

    fn vs_set_constant_buffers(&mut self, start_slot: u32, buffers: &[Arc<dyn Buffer>]) {
        bind_slots(&mut self.state.vs_constant_buffers, start_slot, buffers);
    }

    fn ps_set_shader(&mut self, shader: Option<&Arc<dyn PixelShader>>) {
        self.state.pixel_shader = shader.cloned();
    }

    fn ps_set_constant_buffers(&mut self, start_slot: u32, buffers: &[Arc<dyn Buffer>]) {
        bind_slots(&mut self.state.ps_constant_buffers, start_slot, buffers);
    }

    fn ps_set_shader_resources(&mut self, start_slot: u32, views: &[Arc<dyn ShaderResourceView>]) {
        bind_slots(&mut self.state.shader_resources, start_slot, views);
    }

    fn ps_set_samplers(&mut self, start_slot: u32, samplers: &[Arc<dyn SamplerState>]) {
        bind_slots(&mut self.state.samplers, start_slot, samplers);
    }

    fn rs_set_viewports(&mut self, viewports: &[ViewportDesc]) {
        self.state.viewport = viewports.first().copied();
    }

    fn om_set_render_targets(&mut self, render_targets: &[Arc<dyn RenderTargetView>], depth_stencil: Option<&Arc<dyn DepthStencilView>>) {
        let same_colors = render_targets.len() == self.state.render_targets.len()
            && render_targets.iter().zip(&self.state.render_targets).all(|(a, b)| Arc::ptr_eq(a, b));
        let same_depth = match (depth_stencil, &self.state.depth_stencil) {
            (Some(a), Some(b)) => Arc::ptr_eq(a, b),
            (None, None) => true,
            _ => false,
        };
        if !(same_colors && same_depth) {
            self.state.render_targets = render_targets.to_vec();
            self.state.depth_stencil = depth_stencil.cloned();
            self.targets_dirty = true;
        }
    }

    fn clear_render_target_view(&mut self, view: &Arc<dyn RenderTargetView>, color: [f32; 4]) -> Result<()> {
        let frames = self.frames.clone();
        let mut frames = frames.lock()
            .map_err(|_| engine_err!("monaco::vulkan::GraphicsContext", "Frame recorder lock poisoned"))?;
        let cmd = frames.begin()?;
        frames.end_rendering();

        let texture = target_view(view.as_any())?.native_texture()?;
        texture.transition(cmd, vk::ImageLayout::TRANSFER_DST_OPTIMAL);
        unsafe {
            self.ctx.device.cmd_clear_color_image(
                cmd,
                texture.image,
                vk::ImageLayout::TRANSFER_DST_OPTIMAL,
                &vk::ClearColorValue { float32: color },
                &[texture.full_range()],
            );
        }
        frames.keep_alive(view.clone());
        Ok(())
    }

    fn clear_depth_stencil_view(&mut self, view: &Arc<dyn DepthStencilView>, flags: ClearFlags, depth: f32, stencil: u8) -> Result<()> {
        let frames = self.frames.clone();
        let mut frames = frames.lock()
            .map_err(|_| engine_err!("monaco::vulkan::GraphicsContext", "Frame recorder lock poisoned"))?;
        let cmd = frames.begin()?;
        frames.end_rendering();

        let texture = target_view(view.as_any())?.native_texture()?;
        let mut range = texture.full_range();
        let mut aspects = vk::ImageAspectFlags::empty();
        if flags.contains(ClearFlags::DEPTH) {
            aspects |= vk::ImageAspectFlags::DEPTH;
        }
        if flags.contains(ClearFlags::STENCIL) {
            aspects |= vk::ImageAspectFlags::STENCIL;
        }
        range.aspect_mask &= aspects;
        if range.aspect_mask.is_empty() {
            return Ok(());
        }

        texture.transition(cmd, vk::ImageLayout::TRANSFER_DST_OPTIMAL);
        unsafe {
            self.ctx.device.cmd_clear_depth_stencil_image(
                cmd,
                texture.image,
                vk::ImageLayout::TRANSFER_DST_OPTIMAL,
                &vk::ClearDepthStencilValue { depth, stencil: stencil as u32 },
                &[range],
            );
        }
        frames.keep_alive(view.clone());
        Ok(())
    }

    fn update_subresource(&mut self, buffer: &Arc<dyn Buffer>, data: &[u8]) -> Result<()> {
        let native = vulkan_buffer(buffer)?;
        let byte_width = buffer.desc().byte_width as usize;
        let padded_len = data.len().next_multiple_of(4);
        if padded_len > byte_width {
            engine_bail!("monaco::vulkan::GraphicsContext", InvalidArgument:
                "Update of {} bytes does not fit a {} byte buffer", data.len(), byte_width);
        }
        let mut padded;
        let payload = if padded_len == data.len() {
            data
        } else {
            padded = data.to_vec();
            padded.resize(padded_len, 0);
            padded.as_slice()
        };

        let mut frames = self.lock_frames()?;
        let cmd = frames.begin()?;
        frames.end_rendering();

        unsafe {
            for (i, chunk) in payload.chunks(MAX_UPDATE_SIZE).enumerate() {
                self.ctx.device.cmd_update_buffer(cmd, native.buffer, (i * MAX_UPDATE_SIZE) as u64, chunk);
            }
            let barrier = vk::BufferMemoryBarrier::default()
                .src_access_mask(vk::AccessFlags::TRANSFER_WRITE)
                .dst_access_mask(vk::AccessFlags::UNIFORM_READ
                    | vk::AccessFlags::VERTEX_ATTRIBUTE_READ
                    | vk::AccessFlags::INDEX_READ)
                .src_queue_family_index(vk::QUEUE_FAMILY_IGNORED)
                .dst_queue_family_index(vk::QUEUE_FAMILY_IGNORED)
                .buffer(native.buffer)
                .offset(0)
                .size(vk::WHOLE_SIZE);
            self.ctx.device.cmd_pipeline_barrier(
                cmd,
                vk::PipelineStageFlags::TRANSFER,
                vk::PipelineStageFlags::ALL_GRAPHICS,
                vk::DependencyFlags::empty(),
                &[],
                &[barrier],
                &[],
            );
        }
        frames.keep_alive(buffer.clone());
        Ok(())
    }

    fn draw(&mut self, vertex_count: u32, start_vertex: u32) -> Result<()> {
        let frames = self.frames.clone();
        let mut frames = frames.lock()
            .map_err(|_| engine_err!("monaco::vulkan::GraphicsContext", "Frame recorder lock poisoned"))?;
        let cmd = frames.begin()?;
        self.prepare_draw(&mut frames, cmd)?;
        unsafe {
            self.ctx.device.cmd_draw(cmd, vertex_count, 1, start_vertex, 0);
        }
        Ok(())
    }

    fn draw_indexed(&mut self, index_count: u32, start_index: u32, base_vertex: i32) -> Result<()> {
        let frames = self.frames.clone();
        let mut frames = frames.lock()
            .map_err(|_| engine_err!("monaco::vulkan::GraphicsContext", "Frame recorder lock poisoned"))?;
        let cmd = frames.begin()?;

        let (index_buffer, format, offset) = self.state.index_buffer.clone().ok_or_else(|| {
            engine_err!("monaco::vulkan::GraphicsContext", InvalidResource: "Indexed draw without an index buffer")
        })?;
        let index_type = index_type_to_vk(format).ok_or_else(|| {
            engine_err!("monaco::vulkan::GraphicsContext", InvalidArgument: "{:?} is not an index format", format)
        })?;

        self.prepare_draw(&mut frames, cmd)?;
        let native = vulkan_buffer(&index_buffer)?;
        unsafe {
            self.ctx.device.cmd_bind_index_buffer(cmd, native.buffer, offset as u64, index_type);
            self.ctx.device.cmd_draw_indexed(cmd, index_count, 1, start_index, base_vertex, 0);
        }
        frames.keep_alive(index_buffer);
        Ok(())
    }

    fn clear_state(&mut self) {
        self.state = BoundState::default();
        self.targets_dirty = true;
    }
}
