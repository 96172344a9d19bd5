/// GpuContext - Shared GPU state for all Vulkan objects
///
/// Every native object created by the backend holds an `Arc<GpuContext>`, so
/// the device and instance are destroyed only after the last buffer, texture
/// or view is gone.

use ash::vk;
use gpu_allocator::vulkan::{Allocation, AllocationCreateDesc, AllocationScheme, Allocator};
use gpu_allocator::MemoryLocation;
use std::mem::ManuallyDrop;
use std::sync::{Arc, Mutex};
use monaco_engine::monaco::{Error, Result};
use monaco_engine::{engine_err, engine_error};

/// Descriptor set 0 binding of constant buffer slot 0
pub const CONSTANT_BUFFER_BINDING_BASE: u32 = 0;
/// Descriptor set 0 binding of shader resource slot 0
pub const SHADER_RESOURCE_BINDING_BASE: u32 = 16;
/// Descriptor set 0 binding of sampler slot 0
pub const SAMPLER_BINDING_BASE: u32 = 32;
/// Slots available per resource kind
pub const MAX_SLOTS: u32 = 8;

/// Shared GPU context
pub struct GpuContext {
    /// Vulkan entry (keeps the loader alive)
    _entry: ash::Entry,
    /// Vulkan instance
    pub instance: ash::Instance,
    pub physical_device: vk::PhysicalDevice,
    /// Vulkan logical device
    pub device: ash::Device,

    /// GPU memory allocator
    /// Wrapped in ManuallyDrop so it is released before the device
    pub allocator: ManuallyDrop<Arc<Mutex<Allocator>>>,

    /// Graphics queue (also used for present)
    pub graphics_queue: vk::Queue,
    pub graphics_queue_family: u32,

    /// Command pool for one-shot upload operations
    pub upload_command_pool: Mutex<vk::CommandPool>,

    /// Layout shared by every pipeline (descriptor set 0)
    pub descriptor_set_layout: vk::DescriptorSetLayout,
    pub pipeline_layout: vk::PipelineLayout,

    /// Native format used for D24_UNORM_S8_UINT on this device
    pub depth_stencil_format: vk::Format,

    pub(crate) debug_utils_loader: Option<ash::ext::debug_utils::Instance>,
    pub(crate) debug_messenger: Option<vk::DebugUtilsMessengerEXT>,
}

impl GpuContext {
    #[allow(clippy::too_many_arguments)]
    pub(crate) fn new(
        entry: ash::Entry,
        instance: ash::Instance,
        physical_device: vk::PhysicalDevice,
        device: ash::Device,
        allocator: Allocator,
        graphics_queue: vk::Queue,
        graphics_queue_family: u32,
        depth_stencil_format: vk::Format,
        debug_utils_loader: Option<ash::ext::debug_utils::Instance>,
        debug_messenger: Option<vk::DebugUtilsMessengerEXT>,
    ) -> Result<Self> {
        unsafe {
            let upload_pool_create_info = vk::CommandPoolCreateInfo::default()
                .queue_family_index(graphics_queue_family)
                .flags(vk::CommandPoolCreateFlags::TRANSIENT | vk::CommandPoolCreateFlags::RESET_COMMAND_BUFFER);
            let upload_command_pool = device.create_command_pool(&upload_pool_create_info, None)
                .map_err(|e| engine_err!("monaco::vulkan::GpuContext", InitializationFailed:
                    "Failed to create upload command pool: {:?}", e))?;

            let (descriptor_set_layout, pipeline_layout) = Self::create_layouts(&device)?;

            Ok(Self {
                _entry: entry,
                instance,
                physical_device,
                device,
                allocator: ManuallyDrop::new(Arc::new(Mutex::new(allocator))),
                graphics_queue,
                graphics_queue_family,
                upload_command_pool: Mutex::new(upload_command_pool),
                descriptor_set_layout,
                pipeline_layout,
                depth_stencil_format,
                debug_utils_loader,
                debug_messenger,
            })
        }
    }

    /// Fixed binding convention: constant buffer `b` -> binding `b`, shader
    /// resource `t` -> binding `16 + t`, sampler `s` -> binding `32 + s`
    unsafe fn create_layouts(device: &ash::Device) -> Result<(vk::DescriptorSetLayout, vk::PipelineLayout)> {
        let stages = vk::ShaderStageFlags::VERTEX | vk::ShaderStageFlags::FRAGMENT;
        let mut bindings = Vec::with_capacity(3 * MAX_SLOTS as usize);
        for (base, ty) in [
            (CONSTANT_BUFFER_BINDING_BASE, vk::DescriptorType::UNIFORM_BUFFER),
            (SHADER_RESOURCE_BINDING_BASE, vk::DescriptorType::SAMPLED_IMAGE),
            (SAMPLER_BINDING_BASE, vk::DescriptorType::SAMPLER),
        ] {
            for slot in 0..MAX_SLOTS {
                bindings.push(vk::DescriptorSetLayoutBinding::default()
                    .binding(base + slot)
                    .descriptor_type(ty)
                    .descriptor_count(1)
                    .stage_flags(stages));
            }
        }

        let set_layout_info = vk::DescriptorSetLayoutCreateInfo::default().bindings(&bindings);
        let set_layout = device.create_descriptor_set_layout(&set_layout_info, None)
            .map_err(|e| engine_err!("monaco::vulkan::GpuContext", InitializationFailed:
                "Failed to create descriptor set layout: {:?}", e))?;

        let set_layouts = [set_layout];
        let layout_info = vk::PipelineLayoutCreateInfo::default().set_layouts(&set_layouts);
        let pipeline_layout = match device.create_pipeline_layout(&layout_info, None) {
            Ok(layout) => layout,
            Err(e) => {
                device.destroy_descriptor_set_layout(set_layout, None);
                return Err(engine_err!("monaco::vulkan::GpuContext", InitializationFailed:
                    "Failed to create pipeline layout: {:?}", e));
            }
        };
        Ok((set_layout, pipeline_layout))
    }

    /// Allocate memory for `requirements` at `location`
    pub fn allocate(&self, name: &str, requirements: vk::MemoryRequirements, location: MemoryLocation, linear: bool) -> Result<Allocation> {
        let mut allocator = self.allocator.lock()
            .map_err(|_| engine_err!("monaco::vulkan::GpuContext", "Allocator lock poisoned"))?;
        allocator.allocate(&AllocationCreateDesc {
            name,
            requirements,
            location,
            linear,
            allocation_scheme: AllocationScheme::GpuAllocatorManaged,
        })
        .map_err(|e| {
            engine_error!("monaco::vulkan::GpuContext",
                "Out of GPU memory for '{}' ({} bytes): {:?}", name, requirements.size, e);
            Error::OutOfMemory
        })
    }

    /// Return an allocation to the allocator
    pub fn free(&self, allocation: Allocation) {
        // Don't panic if the lock fails, the native object still has to go
        if let Ok(mut allocator) = self.allocator.lock() {
            allocator.free(allocation).ok();
        }
    }

    /// Record commands with `record` and wait for them to complete
    pub fn submit_one_shot<F>(&self, record: F) -> Result<()>
    where
        F: FnOnce(vk::CommandBuffer),
    {
        let pool = self.upload_command_pool.lock()
            .map_err(|_| engine_err!("monaco::vulkan::GpuContext", "Upload pool lock poisoned"))?;

        unsafe {
            let allocate_info = vk::CommandBufferAllocateInfo::default()
                .command_pool(*pool)
                .level(vk::CommandBufferLevel::PRIMARY)
                .command_buffer_count(1);
            let command_buffer = self.device.allocate_command_buffers(&allocate_info)
                .map_err(|e| engine_err!("monaco::vulkan::GpuContext",
                    "Failed to allocate upload command buffer: {:?}", e))?[0];

            let result = (|| {
                let begin_info = vk::CommandBufferBeginInfo::default()
                    .flags(vk::CommandBufferUsageFlags::ONE_TIME_SUBMIT);
                self.device.begin_command_buffer(command_buffer, &begin_info)
                    .map_err(|e| engine_err!("monaco::vulkan::GpuContext",
                        "Failed to begin upload command buffer: {:?}", e))?;

                record(command_buffer);

                self.device.end_command_buffer(command_buffer)
                    .map_err(|e| engine_err!("monaco::vulkan::GpuContext",
                        "Failed to end upload command buffer: {:?}", e))?;

                let command_buffers = [command_buffer];
                let submit_info = vk::SubmitInfo::default().command_buffers(&command_buffers);
                self.device.queue_submit(self.graphics_queue, &[submit_info], vk::Fence::null())
                    .map_err(|e| engine_err!("monaco::vulkan::GpuContext",
                        "Failed to submit upload commands: {:?}", e))?;
                self.device.queue_wait_idle(self.graphics_queue)
                    .map_err(|e| engine_err!("monaco::vulkan::GpuContext",
                        "Failed to wait for upload commands: {:?}", e))
            })();

            self.device.free_command_buffers(*pool, &[command_buffer]);
            result
        }
    }

    /// True if `format` supports `features` with optimal tiling
    pub fn supports_optimal(&self, format: vk::Format, features: vk::FormatFeatureFlags) -> bool {
        let properties = unsafe {
            self.instance.get_physical_device_format_properties(self.physical_device, format)
        };
        properties.optimal_tiling_features.contains(features)
    }
}

impl Drop for GpuContext {
    fn drop(&mut self) {
        unsafe {
            self.device.device_wait_idle().ok();

            self.device.destroy_pipeline_layout(self.pipeline_layout, None);
            self.device.destroy_descriptor_set_layout(self.descriptor_set_layout, None);
            if let Ok(pool) = self.upload_command_pool.lock() {
                self.device.destroy_command_pool(*pool, None);
            }

            // Allocator must go before the device
            ManuallyDrop::drop(&mut self.allocator);
            self.device.destroy_device(None);

            if let (Some(loader), Some(messenger)) = (&self.debug_utils_loader, self.debug_messenger) {
                loader.destroy_debug_utils_messenger(messenger, None);
            }
            self.instance.destroy_instance(None);
        }
    }
}
