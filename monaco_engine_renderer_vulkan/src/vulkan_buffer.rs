/// Buffer - Vulkan implementation of the Buffer trait

use std::any::Any;
use std::sync::Arc;
use ash::vk;
use gpu_allocator::vulkan::Allocation;
use gpu_allocator::MemoryLocation;
use monaco_engine::monaco::Result;
use monaco_engine::monaco::graphics::{BindFlags, Buffer, BufferDesc};
use monaco_engine::engine_err;

use crate::vulkan_context::GpuContext;

/// Vulkan buffer
///
/// Host-visible so initial data is written through the mapping; later updates
/// are recorded on the command buffer by the context.
pub struct VulkanBuffer {
    ctx: Arc<GpuContext>,
    pub(crate) buffer: vk::Buffer,
    allocation: Option<Allocation>,
    desc: BufferDesc,
}

impl VulkanBuffer {
    pub(crate) fn new(ctx: Arc<GpuContext>, desc: &BufferDesc, initial_data: Option<&[u8]>) -> Result<Self> {
        let mut usage = vk::BufferUsageFlags::TRANSFER_DST;
        if desc.bind.contains(BindFlags::VERTEX_BUFFER) {
            usage |= vk::BufferUsageFlags::VERTEX_BUFFER;
        }
        if desc.bind.contains(BindFlags::INDEX_BUFFER) {
            usage |= vk::BufferUsageFlags::INDEX_BUFFER;
        }
        if desc.bind.contains(BindFlags::CONSTANT_BUFFER) {
            usage |= vk::BufferUsageFlags::UNIFORM_BUFFER;
        }

        unsafe {
            let create_info = vk::BufferCreateInfo::default()
                .size(desc.byte_width as u64)
                .usage(usage)
                .sharing_mode(vk::SharingMode::EXCLUSIVE);
            let buffer = ctx.device.create_buffer(&create_info, None)
                .map_err(|e| engine_err!("monaco::vulkan::Buffer", "Failed to create buffer: {:?}", e))?;

            let requirements = ctx.device.get_buffer_memory_requirements(buffer);
            let allocation = match ctx.allocate("buffer", requirements, MemoryLocation::CpuToGpu, true) {
                Ok(allocation) => allocation,
                Err(e) => {
                    ctx.device.destroy_buffer(buffer, None);
                    return Err(e);
                }
            };

            let memory = allocation.memory();
            let offset = allocation.offset();
            // From here on Drop releases the buffer and its memory
            let result = Self { ctx: ctx.clone(), buffer, allocation: Some(allocation), desc: *desc };
            ctx.device.bind_buffer_memory(buffer, memory, offset)
                .map_err(|e| engine_err!("monaco::vulkan::Buffer", "Failed to bind buffer memory: {:?}", e))?;

            if let Some(data) = initial_data {
                result.write_mapped(data)?;
            }
            Ok(result)
        }
    }

    fn write_mapped(&self, data: &[u8]) -> Result<()> {
        let allocation = self.allocation.as_ref()
            .ok_or_else(|| engine_err!("monaco::vulkan::Buffer", "Buffer has no allocation"))?;
        let mapped = allocation.mapped_ptr()
            .ok_or_else(|| engine_err!("monaco::vulkan::Buffer", "Buffer is not CPU-accessible"))?;
        let len = data.len().min(self.desc.byte_width as usize);
        unsafe {
            std::ptr::copy_nonoverlapping(data.as_ptr(), mapped.as_ptr() as *mut u8, len);
        }
        Ok(())
    }
}

impl Buffer for VulkanBuffer {
    fn desc(&self) -> &BufferDesc {
        &self.desc
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

impl Drop for VulkanBuffer {
    fn drop(&mut self) {
        if let Some(allocation) = self.allocation.take() {
            self.ctx.free(allocation);
        }
        unsafe {
            self.ctx.device.destroy_buffer(self.buffer, None);
        }
    }
}
