/// FrameRecorder - per-frame command buffers shared by the context and swapchain
///
/// The immediate context records into the current frame's command buffer,
/// begun lazily on the first call. The swapchain submits it on present and
/// moves on to the next frame.

use std::any::Any;
use std::sync::Arc;
use ash::vk;
use monaco_engine::monaco::Result;
use monaco_engine::engine_err;

use crate::vulkan_context::{GpuContext, MAX_SLOTS};

/// Frames that may be in flight at once
pub const FRAMES_IN_FLIGHT: usize = 2;

/// Descriptor sets available to one frame (one per draw)
const DESCRIPTOR_SETS_PER_FRAME: u32 = 4096;

struct FrameResources {
    command_buffer: vk::CommandBuffer,
    fence: vk::Fence,
    descriptor_pool: vk::DescriptorPool,
    image_available: vk::Semaphore,
    /// Objects referenced by the recorded commands, released once the fence signals
    keep_alive: Vec<Box<dyn Any + Send>>,
}

pub struct FrameRecorder {
    ctx: Arc<GpuContext>,
    command_pool: vk::CommandPool,
    frames: Vec<FrameResources>,
    current: usize,
    recording: bool,
    /// A dynamic rendering scope is open on the command buffer
    pub(crate) rendering: bool,
}

impl FrameRecorder {
    pub fn new(ctx: Arc<GpuContext>) -> Result<Self> {
        unsafe {
            let pool_info = vk::CommandPoolCreateInfo::default()
                .queue_family_index(ctx.graphics_queue_family)
                .flags(vk::CommandPoolCreateFlags::RESET_COMMAND_BUFFER);
            let command_pool = ctx.device.create_command_pool(&pool_info, None)
                .map_err(|e| engine_err!("monaco::vulkan::FrameRecorder", InitializationFailed:
                    "Failed to create frame command pool: {:?}", e))?;

            // Drop cleans up whatever was created if a later step fails
            let mut recorder = Self {
                ctx: ctx.clone(),
                command_pool,
                frames: Vec::with_capacity(FRAMES_IN_FLIGHT),
                current: 0,
                recording: false,
                rendering: false,
            };

            let allocate_info = vk::CommandBufferAllocateInfo::default()
                .command_pool(command_pool)
                .level(vk::CommandBufferLevel::PRIMARY)
                .command_buffer_count(FRAMES_IN_FLIGHT as u32);
            let command_buffers = ctx.device.allocate_command_buffers(&allocate_info)
                .map_err(|e| engine_err!("monaco::vulkan::FrameRecorder", InitializationFailed:
                    "Failed to allocate frame command buffers: {:?}", e))?;

            let pool_sizes = [
                vk::DescriptorPoolSize {
                    ty: vk::DescriptorType::UNIFORM_BUFFER,
                    descriptor_count: DESCRIPTOR_SETS_PER_FRAME * MAX_SLOTS,
                },
                vk::DescriptorPoolSize {
                    ty: vk::DescriptorType::SAMPLED_IMAGE,
                    descriptor_count: DESCRIPTOR_SETS_PER_FRAME * MAX_SLOTS,
                },
                vk::DescriptorPoolSize {
                    ty: vk::DescriptorType::SAMPLER,
                    descriptor_count: DESCRIPTOR_SETS_PER_FRAME * MAX_SLOTS,
                },
            ];

            for command_buffer in command_buffers {
                let fence_info = vk::FenceCreateInfo::default().flags(vk::FenceCreateFlags::SIGNALED);
                let fence = ctx.device.create_fence(&fence_info, None)
                    .map_err(|e| engine_err!("monaco::vulkan::FrameRecorder", InitializationFailed:
                        "Failed to create frame fence: {:?}", e))?;
                let image_available = match ctx.device.create_semaphore(&vk::SemaphoreCreateInfo::default(), None) {
                    Ok(semaphore) => semaphore,
                    Err(e) => {
                        ctx.device.destroy_fence(fence, None);
                        return Err(engine_err!("monaco::vulkan::FrameRecorder", InitializationFailed:
                            "Failed to create image-available semaphore: {:?}", e));
                    }
                };
                let pool_info = vk::DescriptorPoolCreateInfo::default()
                    .pool_sizes(&pool_sizes)
                    .max_sets(DESCRIPTOR_SETS_PER_FRAME);
                let descriptor_pool = match ctx.device.create_descriptor_pool(&pool_info, None) {
                    Ok(pool) => pool,
                    Err(e) => {
                        ctx.device.destroy_semaphore(image_available, None);
                        ctx.device.destroy_fence(fence, None);
                        return Err(engine_err!("monaco::vulkan::FrameRecorder", InitializationFailed:
                            "Failed to create descriptor pool: {:?}", e));
                    }
                };

                recorder.frames.push(FrameResources {
                    command_buffer,
                    fence,
                    descriptor_pool,
                    image_available,
                    keep_alive: Vec::new(),
                });
            }

            Ok(recorder)
        }
    }

    /// Command buffer of the current frame, begun if needed
    ///
    /// Beginning a frame waits for its previous submission and releases the
    /// objects that submission kept alive.
    pub fn begin(&mut self) -> Result<vk::CommandBuffer> {
        let device = &self.ctx.device;
        let frame = &mut self.frames[self.current];
        if self.recording {
            return Ok(frame.command_buffer);
        }

        unsafe {
            device.wait_for_fences(&[frame.fence], true, u64::MAX)
                .map_err(|e| engine_err!("monaco::vulkan::FrameRecorder",
                    "Failed to wait for frame fence: {:?}", e))?;
            frame.keep_alive.clear();

            device.reset_descriptor_pool(frame.descriptor_pool, vk::DescriptorPoolResetFlags::empty())
                .map_err(|e| engine_err!("monaco::vulkan::FrameRecorder",
                    "Failed to reset descriptor pool: {:?}", e))?;
            device.reset_command_buffer(frame.command_buffer, vk::CommandBufferResetFlags::empty())
                .map_err(|e| engine_err!("monaco::vulkan::FrameRecorder",
                    "Failed to reset command buffer: {:?}", e))?;

            let begin_info = vk::CommandBufferBeginInfo::default()
                .flags(vk::CommandBufferUsageFlags::ONE_TIME_SUBMIT);
            device.begin_command_buffer(frame.command_buffer, &begin_info)
                .map_err(|e| engine_err!("monaco::vulkan::FrameRecorder",
                    "Failed to begin command buffer: {:?}", e))?;
        }

        self.recording = true;
        Ok(frame.command_buffer)
    }

    /// Close the open rendering scope, if any
    pub fn end_rendering(&mut self) {
        if self.rendering {
            unsafe {
                self.ctx.device.cmd_end_rendering(self.frames[self.current].command_buffer);
            }
            self.rendering = false;
        }
    }

    /// Keep `object` alive until the current frame has executed
    pub fn keep_alive<T: Any + Send>(&mut self, object: T) {
        self.frames[self.current].keep_alive.push(Box::new(object));
    }

    pub fn allocate_descriptor_set(&mut self) -> Result<vk::DescriptorSet> {
        let set_layouts = [self.ctx.descriptor_set_layout];
        let allocate_info = vk::DescriptorSetAllocateInfo::default()
            .descriptor_pool(self.frames[self.current].descriptor_pool)
            .set_layouts(&set_layouts);
        let sets = unsafe {
            self.ctx.device.allocate_descriptor_sets(&allocate_info)
                .map_err(|e| engine_err!("monaco::vulkan::FrameRecorder",
                    "Descriptor pool exhausted ({} draws per frame max): {:?}", DESCRIPTOR_SETS_PER_FRAME, e))?
        };
        sets.into_iter().next()
            .ok_or_else(|| engine_err!("monaco::vulkan::FrameRecorder", "Driver returned no descriptor set"))
    }

    /// Semaphore the swapchain signals when the current frame's image is acquired
    pub fn image_available(&self) -> vk::Semaphore {
        self.frames[self.current].image_available
    }

    /// End and submit the current command buffer
    ///
    /// # Arguments
    ///
    /// * `wait` - Semaphore (and stage) to wait on before the transfer to the swapchain image
    /// * `signal` - Semaphore signaled when the commands complete
    pub fn submit(&mut self, wait: Option<(vk::Semaphore, vk::PipelineStageFlags)>, signal: Option<vk::Semaphore>) -> Result<()> {
        let command_buffer = self.begin()?;
        self.end_rendering();
        self.recording = false;

        let device = &self.ctx.device;
        let frame = &self.frames[self.current];
        unsafe {
            device.end_command_buffer(command_buffer)
                .map_err(|e| engine_err!("monaco::vulkan::FrameRecorder",
                    "Failed to end command buffer: {:?}", e))?;
            device.reset_fences(&[frame.fence])
                .map_err(|e| engine_err!("monaco::vulkan::FrameRecorder",
                    "Failed to reset frame fence: {:?}", e))?;

            let command_buffers = [command_buffer];
            let wait_semaphores: Vec<vk::Semaphore> = wait.iter().map(|(semaphore, _)| *semaphore).collect();
            let wait_stages: Vec<vk::PipelineStageFlags> = wait.iter().map(|(_, stage)| *stage).collect();
            let signal_semaphores: Vec<vk::Semaphore> = signal.into_iter().collect();
            let submit_info = vk::SubmitInfo::default()
                .wait_semaphores(&wait_semaphores)
                .wait_dst_stage_mask(&wait_stages)
                .command_buffers(&command_buffers)
                .signal_semaphores(&signal_semaphores);

            device.queue_submit(self.ctx.graphics_queue, &[submit_info], frame.fence)
                .map_err(|e| engine_err!("monaco::vulkan::FrameRecorder",
                    "Failed to submit frame: {:?}", e))?;
        }
        Ok(())
    }

    /// Move to the next frame in flight
    pub fn advance(&mut self) {
        self.current = (self.current + 1) % self.frames.len().max(1);
    }

    /// Submit pending work and wait for the GPU to finish everything
    pub fn flush(&mut self) -> Result<()> {
        if self.recording {
            self.submit(None, None)?;
            self.advance();
        }
        unsafe {
            self.ctx.device.device_wait_idle()
                .map_err(|e| engine_err!("monaco::vulkan::FrameRecorder",
                    "Failed to wait for device idle: {:?}", e))?;
        }
        for frame in &mut self.frames {
            frame.keep_alive.clear();
        }
        Ok(())
    }
}

impl Drop for FrameRecorder {
    fn drop(&mut self) {
        unsafe {
            let device = &self.ctx.device;
            device.device_wait_idle().ok();
            for frame in self.frames.drain(..) {
                device.destroy_descriptor_pool(frame.descriptor_pool, None);
                device.destroy_semaphore(frame.image_available, None);
                device.destroy_fence(frame.fence, None);
            }
            device.destroy_command_pool(self.command_pool, None);
        }
    }
}
