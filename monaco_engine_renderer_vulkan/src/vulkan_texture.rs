/// Texture and views - Vulkan implementation of the texture traits

use std::any::Any;
use std::sync::{Arc, Mutex};
use ash::vk;
use gpu_allocator::vulkan::Allocation;
use gpu_allocator::MemoryLocation;
use monaco_engine::monaco::Result;
use monaco_engine::monaco::graphics::{
    BindFlags, DepthStencilView, Format, RenderTargetView, ShaderResourceView, Texture, TextureDesc,
};
use monaco_engine::{engine_bail, engine_err};

use crate::vulkan_context::GpuContext;
use crate::vulkan_format::{aspect_mask, sample_count_to_vk};

/// Vulkan 2D image
///
/// The current layout is tracked so the context can insert transitions
/// before each use.
pub struct VulkanTexture {
    ctx: Arc<GpuContext>,
    pub(crate) image: vk::Image,
    allocation: Option<Allocation>,
    pub(crate) vk_format: vk::Format,
    pub(crate) aspect: vk::ImageAspectFlags,
    pub(crate) layout: Mutex<vk::ImageLayout>,
    desc: TextureDesc,
}

impl VulkanTexture {
    pub(crate) fn new(ctx: Arc<GpuContext>, desc: &TextureDesc, vk_format: vk::Format, initial_data: &[&[u8]]) -> Result<Self> {
        let mut usage = vk::ImageUsageFlags::TRANSFER_DST | vk::ImageUsageFlags::TRANSFER_SRC;
        if desc.bind.contains(BindFlags::SHADER_RESOURCE) {
            usage |= vk::ImageUsageFlags::SAMPLED;
        }
        if desc.bind.contains(BindFlags::RENDER_TARGET) {
            usage |= vk::ImageUsageFlags::COLOR_ATTACHMENT;
        }
        if desc.bind.contains(BindFlags::DEPTH_STENCIL) {
            usage |= vk::ImageUsageFlags::DEPTH_STENCIL_ATTACHMENT;
        }

        unsafe {
            let create_info = vk::ImageCreateInfo::default()
                .image_type(vk::ImageType::TYPE_2D)
                .format(vk_format)
                .extent(vk::Extent3D { width: desc.width, height: desc.height, depth: 1 })
                .mip_levels(desc.mip_levels.max(1))
                .array_layers(1)
                .samples(sample_count_to_vk(desc.sample_count))
                .tiling(vk::ImageTiling::OPTIMAL)
                .usage(usage)
                .sharing_mode(vk::SharingMode::EXCLUSIVE)
                .initial_layout(vk::ImageLayout::UNDEFINED);
            let image = ctx.device.create_image(&create_info, None)
                .map_err(|e| engine_err!("monaco::vulkan::Texture", "Failed to create image: {:?}", e))?;

            let requirements = ctx.device.get_image_memory_requirements(image);
            let allocation = match ctx.allocate("texture", requirements, MemoryLocation::GpuOnly, false) {
                Ok(allocation) => allocation,
                Err(e) => {
                    ctx.device.destroy_image(image, None);
                    return Err(e);
                }
            };
            let memory = allocation.memory();
            let offset = allocation.offset();

            let texture = Self {
                ctx: ctx.clone(),
                image,
                allocation: Some(allocation),
                vk_format,
                aspect: aspect_mask(desc.format),
                layout: Mutex::new(vk::ImageLayout::UNDEFINED),
                desc: *desc,
            };
            ctx.device.bind_image_memory(image, memory, offset)
                .map_err(|e| engine_err!("monaco::vulkan::Texture", "Failed to bind image memory: {:?}", e))?;

            if !initial_data.is_empty() {
                texture.upload(initial_data)?;
            }
            Ok(texture)
        }
    }

    /// Copy one slice per mip through a staging buffer, leaving the image shader-readable
    fn upload(&self, mips: &[&[u8]]) -> Result<()> {
        if mips.len() > self.desc.mip_levels as usize {
            engine_bail!("monaco::vulkan::Texture", InvalidArgument:
                "{} mip slices for a texture with {} levels", mips.len(), self.desc.mip_levels);
        }
        let total: usize = mips.iter().map(|mip| mip.len()).sum();
        let staging = StagingBuffer::new(self.ctx.clone(), total as u64)?;

        let mut regions = Vec::with_capacity(mips.len());
        let mut offset = 0usize;
        for (level, mip) in mips.iter().enumerate() {
            staging.write(offset, mip)?;
            regions.push(vk::BufferImageCopy::default()
                .buffer_offset(offset as u64)
                .image_subresource(vk::ImageSubresourceLayers {
                    aspect_mask: self.aspect,
                    mip_level: level as u32,
                    base_array_layer: 0,
                    layer_count: 1,
                })
                .image_extent(vk::Extent3D {
                    width: (self.desc.width >> level).max(1),
                    height: (self.desc.height >> level).max(1),
                    depth: 1,
                }));
            offset += mip.len();
        }

        let device = &self.ctx.device;
        let range = self.full_range();
        self.ctx.submit_one_shot(|cmd| unsafe {
            image_barrier(device, cmd, self.image, range,
                vk::ImageLayout::UNDEFINED, vk::ImageLayout::TRANSFER_DST_OPTIMAL);
            device.cmd_copy_buffer_to_image(cmd, staging.buffer, self.image,
                vk::ImageLayout::TRANSFER_DST_OPTIMAL, &regions);
            image_barrier(device, cmd, self.image, range,
                vk::ImageLayout::TRANSFER_DST_OPTIMAL, vk::ImageLayout::SHADER_READ_ONLY_OPTIMAL);
        })?;

        self.set_layout(vk::ImageLayout::SHADER_READ_ONLY_OPTIMAL);
        Ok(())
    }

    pub(crate) fn full_range(&self) -> vk::ImageSubresourceRange {
        vk::ImageSubresourceRange {
            aspect_mask: self.aspect,
            base_mip_level: 0,
            level_count: self.desc.mip_levels.max(1),
            base_array_layer: 0,
            layer_count: 1,
        }
    }

    pub(crate) fn current_layout(&self) -> vk::ImageLayout {
        self.layout.lock().map(|layout| *layout).unwrap_or(vk::ImageLayout::UNDEFINED)
    }

    pub(crate) fn set_layout(&self, layout: vk::ImageLayout) {
        if let Ok(mut current) = self.layout.lock() {
            *current = layout;
        }
    }

    /// Record a transition to `new_layout` if the image is not already in it
    pub(crate) fn transition(&self, cmd: vk::CommandBuffer, new_layout: vk::ImageLayout) {
        let old_layout = self.current_layout();
        if old_layout == new_layout {
            return;
        }
        unsafe {
            image_barrier(&self.ctx.device, cmd, self.image, self.full_range(), old_layout, new_layout);
        }
        self.set_layout(new_layout);
    }
}

impl Texture for VulkanTexture {
    fn desc(&self) -> &TextureDesc {
        &self.desc
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

impl Drop for VulkanTexture {
    fn drop(&mut self) {
        if let Some(allocation) = self.allocation.take() {
            self.ctx.free(allocation);
        }
        unsafe {
            self.ctx.device.destroy_image(self.image, None);
        }
    }
}

/// Full barrier between two layouts
///
/// All-commands scopes keep the immediate-context emulation simple; every
/// transition happens outside a rendering scope.
pub(crate) unsafe fn image_barrier(
    device: &ash::Device,
    cmd: vk::CommandBuffer,
    image: vk::Image,
    range: vk::ImageSubresourceRange,
    old_layout: vk::ImageLayout,
    new_layout: vk::ImageLayout,
) {
    let barrier = vk::ImageMemoryBarrier::default()
        .src_access_mask(vk::AccessFlags::MEMORY_WRITE)
        .dst_access_mask(vk::AccessFlags::MEMORY_READ | vk::AccessFlags::MEMORY_WRITE)
        .old_layout(old_layout)
        .new_layout(new_layout)
        .src_queue_family_index(vk::QUEUE_FAMILY_IGNORED)
        .dst_queue_family_index(vk::QUEUE_FAMILY_IGNORED)
        .image(image)
        .subresource_range(range);
    device.cmd_pipeline_barrier(
        cmd,
        vk::PipelineStageFlags::ALL_COMMANDS,
        vk::PipelineStageFlags::ALL_COMMANDS,
        vk::DependencyFlags::empty(),
        &[],
        &[],
        &[barrier],
    );
}

// ============================================================================
// Staging buffer
// ============================================================================

struct StagingBuffer {
    ctx: Arc<GpuContext>,
    buffer: vk::Buffer,
    allocation: Option<Allocation>,
    size: u64,
}

impl StagingBuffer {
    fn new(ctx: Arc<GpuContext>, size: u64) -> Result<Self> {
        unsafe {
            let create_info = vk::BufferCreateInfo::default()
                .size(size.max(1))
                .usage(vk::BufferUsageFlags::TRANSFER_SRC)
                .sharing_mode(vk::SharingMode::EXCLUSIVE);
            let buffer = ctx.device.create_buffer(&create_info, None)
                .map_err(|e| engine_err!("monaco::vulkan::Texture", "Failed to create staging buffer: {:?}", e))?;
            let requirements = ctx.device.get_buffer_memory_requirements(buffer);
            let allocation = match ctx.allocate("staging", requirements, MemoryLocation::CpuToGpu, true) {
                Ok(allocation) => allocation,
                Err(e) => {
                    ctx.device.destroy_buffer(buffer, None);
                    return Err(e);
                }
            };
            let memory = allocation.memory();
            let offset = allocation.offset();
            let staging = Self { ctx: ctx.clone(), buffer, allocation: Some(allocation), size };
            ctx.device.bind_buffer_memory(buffer, memory, offset)
                .map_err(|e| engine_err!("monaco::vulkan::Texture", "Failed to bind staging memory: {:?}", e))?;
            Ok(staging)
        }
    }

    fn write(&self, offset: usize, data: &[u8]) -> Result<()> {
        if (offset + data.len()) as u64 > self.size {
            engine_bail!("monaco::vulkan::Texture", "Staging write out of range");
        }
        let mapped = self.allocation.as_ref()
            .and_then(|allocation| allocation.mapped_ptr())
            .ok_or_else(|| engine_err!("monaco::vulkan::Texture", "Staging buffer is not mapped"))?;
        unsafe {
            std::ptr::copy_nonoverlapping(data.as_ptr(), (mapped.as_ptr() as *mut u8).add(offset), data.len());
        }
        Ok(())
    }
}

impl Drop for StagingBuffer {
    fn drop(&mut self) {
        if let Some(allocation) = self.allocation.take() {
            self.ctx.free(allocation);
        }
        unsafe {
            self.ctx.device.destroy_buffer(self.buffer, None);
        }
    }
}

// ============================================================================
// Views
// ============================================================================

/// Image view over a VulkanTexture
///
/// One type serves as shader resource, render target and depth/stencil view;
/// the engine only ever sees it through the matching trait.
pub struct VulkanView {
    ctx: Arc<GpuContext>,
    pub(crate) view: vk::ImageView,
    texture: Arc<dyn Texture>,
    format: Format,
}

impl VulkanView {
    pub(crate) fn new(ctx: Arc<GpuContext>, texture: &Arc<dyn Texture>, format: Format) -> Result<Self> {
        let native = vulkan_texture(texture)?;
        let create_info = vk::ImageViewCreateInfo::default()
            .image(native.image)
            .view_type(vk::ImageViewType::TYPE_2D)
            .format(native.vk_format)
            .subresource_range(native.full_range());
        let view = unsafe {
            ctx.device.create_image_view(&create_info, None)
                .map_err(|e| engine_err!("monaco::vulkan::View", "Failed to create image view: {:?}", e))?
        };
        Ok(Self { ctx, view, texture: texture.clone(), format })
    }

    /// Backing image of the view
    pub(crate) fn native_texture(&self) -> Result<&VulkanTexture> {
        vulkan_texture(&self.texture)
    }
}

/// Recover the Vulkan image behind an engine texture
pub(crate) fn vulkan_texture(texture: &Arc<dyn Texture>) -> Result<&VulkanTexture> {
    texture.as_any().downcast_ref::<VulkanTexture>()
        .ok_or_else(|| engine_err!("monaco::vulkan::View", InvalidResource:
            "Texture was not created by the Vulkan backend"))
}

impl ShaderResourceView for VulkanView {
    fn texture(&self) -> &Arc<dyn Texture> {
        &self.texture
    }

    fn format(&self) -> Format {
        self.format
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

impl RenderTargetView for VulkanView {
    fn texture(&self) -> &Arc<dyn Texture> {
        &self.texture
    }

    fn format(&self) -> Format {
        self.format
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

impl DepthStencilView for VulkanView {
    fn texture(&self) -> &Arc<dyn Texture> {
        &self.texture
    }

    fn format(&self) -> Format {
        self.format
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

impl Drop for VulkanView {
    fn drop(&mut self) {
        unsafe {
            self.ctx.device.destroy_image_view(self.view, None);
        }
    }
}
