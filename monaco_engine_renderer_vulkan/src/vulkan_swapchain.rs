/// VulkanSwapchain - Vulkan implementation of the Swapchain trait
///
/// The engine renders into an offscreen back buffer. `present` resolves it
/// when multisampled, blits it into the acquired swapchain image, submits the
/// frame and presents.

use std::sync::{Arc, Mutex};
use ash::vk;
use monaco_engine::monaco::{Error, Result};
use monaco_engine::monaco::graphics::{BindFlags, Format, Swapchain, Texture, TextureDesc};
use monaco_engine::{engine_debug, engine_err, engine_warn};

use crate::vulkan_context::GpuContext;
use crate::vulkan_format::format_to_vk;
use crate::vulkan_frame::FrameRecorder;
use crate::vulkan_texture::{image_barrier, VulkanTexture};

/// Back buffer format seen by the engine
pub const BACK_BUFFER_FORMAT: Format = Format::R8G8B8A8_UNORM;

pub struct VulkanSwapchain {
    ctx: Arc<GpuContext>,
    frames: Arc<Mutex<FrameRecorder>>,

    surface: vk::SurfaceKHR,
    surface_loader: ash::khr::surface::Instance,
    swapchain_loader: ash::khr::swapchain::Device,
    swapchain: vk::SwapchainKHR,
    images: Vec<vk::Image>,
    extent: vk::Extent2D,
    /// One per swapchain image, signaled when the frame's commands complete
    render_finished: Vec<vk::Semaphore>,
    vsync: bool,

    sample_count: u32,
    back_buffer: Arc<VulkanTexture>,
    /// Single-sample copy of a multisampled back buffer
    resolve_target: Option<Arc<VulkanTexture>>,
}

impl VulkanSwapchain {
    #[allow(clippy::too_many_arguments)]
    pub(crate) fn new(
        ctx: Arc<GpuContext>,
        frames: Arc<Mutex<FrameRecorder>>,
        surface: vk::SurfaceKHR,
        surface_loader: ash::khr::surface::Instance,
        width: u32,
        height: u32,
        sample_count: u32,
        vsync: bool,
    ) -> Result<Self> {
        let swapchain_loader = ash::khr::swapchain::Device::new(&ctx.instance, &ctx.device);
        let (back_buffer, resolve_target) = Self::create_targets(&ctx, width, height, sample_count)?;

        let mut swapchain = Self {
            ctx,
            frames,
            surface,
            surface_loader,
            swapchain_loader,
            swapchain: vk::SwapchainKHR::null(),
            images: Vec::new(),
            extent: vk::Extent2D { width, height },
            render_finished: Vec::new(),
            vsync,
            sample_count,
            back_buffer,
            resolve_target,
        };
        swapchain.create_swapchain(width, height)?;
        Ok(swapchain)
    }

    fn create_targets(ctx: &Arc<GpuContext>, width: u32, height: u32, sample_count: u32) -> Result<(Arc<VulkanTexture>, Option<Arc<VulkanTexture>>)> {
        let vk_format = format_to_vk(BACK_BUFFER_FORMAT);
        let desc = TextureDesc {
            sample_count,
            ..TextureDesc::new_2d(width, height, BACK_BUFFER_FORMAT, BindFlags::RENDER_TARGET)
        };
        let back_buffer = Arc::new(VulkanTexture::new(ctx.clone(), &desc, vk_format, &[])?);

        let resolve_target = if sample_count > 1 {
            let desc = TextureDesc::new_2d(width, height, BACK_BUFFER_FORMAT, BindFlags::RENDER_TARGET);
            Some(Arc::new(VulkanTexture::new(ctx.clone(), &desc, vk_format, &[])?))
        } else {
            None
        };
        Ok((back_buffer, resolve_target))
    }

    /// (Re)create the native swapchain, retiring the previous one
    fn create_swapchain(&mut self, width: u32, height: u32) -> Result<()> {
        unsafe {
            let capabilities = self.surface_loader
                .get_physical_device_surface_capabilities(self.ctx.physical_device, self.surface)
                .map_err(|e| engine_err!("monaco::vulkan::Swapchain", InitializationFailed:
                    "Failed to get surface capabilities: {:?}", e))?;
            let formats = self.surface_loader
                .get_physical_device_surface_formats(self.ctx.physical_device, self.surface)
                .map_err(|e| engine_err!("monaco::vulkan::Swapchain", InitializationFailed:
                    "Failed to get surface formats: {:?}", e))?;
            let present_modes = self.surface_loader
                .get_physical_device_surface_present_modes(self.ctx.physical_device, self.surface)
                .map_err(|e| engine_err!("monaco::vulkan::Swapchain", InitializationFailed:
                    "Failed to get present modes: {:?}", e))?;

            let surface_format = formats
                .iter()
                .find(|f| f.format == vk::Format::B8G8R8A8_UNORM || f.format == vk::Format::R8G8B8A8_UNORM)
                .or_else(|| formats.first())
                .copied()
                .ok_or_else(|| engine_err!("monaco::vulkan::Swapchain", InitializationFailed:
                    "Surface reports no formats"))?;

            let extent = if capabilities.current_extent.width != u32::MAX {
                capabilities.current_extent
            } else {
                vk::Extent2D {
                    width: width.clamp(capabilities.min_image_extent.width, capabilities.max_image_extent.width),
                    height: height.clamp(capabilities.min_image_extent.height, capabilities.max_image_extent.height),
                }
            };

            let present_mode = choose_present_mode(self.vsync, &present_modes);

            let mut image_count = capabilities.min_image_count + 1;
            if capabilities.max_image_count > 0 {
                image_count = image_count.min(capabilities.max_image_count);
            }

            let old_swapchain = self.swapchain;
            let create_info = vk::SwapchainCreateInfoKHR::default()
                .surface(self.surface)
                .min_image_count(image_count)
                .image_format(surface_format.format)
                .image_color_space(surface_format.color_space)
                .image_extent(extent)
                .image_array_layers(1)
                .image_usage(vk::ImageUsageFlags::COLOR_ATTACHMENT | vk::ImageUsageFlags::TRANSFER_DST)
                .image_sharing_mode(vk::SharingMode::EXCLUSIVE)
                .pre_transform(capabilities.current_transform)
                .composite_alpha(vk::CompositeAlphaFlagsKHR::OPAQUE)
                .present_mode(present_mode)
                .clipped(true)
                .old_swapchain(old_swapchain);

            let swapchain = self.swapchain_loader.create_swapchain(&create_info, None)
                .map_err(|e| engine_err!("monaco::vulkan::Swapchain", InitializationFailed:
                    "Failed to create swapchain: {:?}", e))?;
            if old_swapchain != vk::SwapchainKHR::null() {
                self.swapchain_loader.destroy_swapchain(old_swapchain, None);
            }
            self.swapchain = swapchain;

            self.images = self.swapchain_loader.get_swapchain_images(swapchain)
                .map_err(|e| engine_err!("monaco::vulkan::Swapchain", InitializationFailed:
                    "Failed to get swapchain images: {:?}", e))?;
            self.extent = extent;

            for semaphore in self.render_finished.drain(..) {
                self.ctx.device.destroy_semaphore(semaphore, None);
            }
            for _ in 0..self.images.len() {
                let semaphore = self.ctx.device.create_semaphore(&vk::SemaphoreCreateInfo::default(), None)
                    .map_err(|e| engine_err!("monaco::vulkan::Swapchain", InitializationFailed:
                        "Failed to create render-finished semaphore: {:?}", e))?;
                self.render_finished.push(semaphore);
            }

            engine_debug!("monaco::vulkan::Swapchain",
                "Swapchain {}x{} {:?}, {} images, {:?}",
                extent.width, extent.height, surface_format.format, self.images.len(), present_mode);
            Ok(())
        }
    }

    /// Record resolve + blit of the back buffer into swapchain image `index`
    fn record_blit(&self, cmd: vk::CommandBuffer, index: usize) {
        let device = &self.ctx.device;
        let back_desc = self.back_buffer.desc();

        let source = match &self.resolve_target {
            Some(resolve) => {
                self.back_buffer.transition(cmd, vk::ImageLayout::TRANSFER_SRC_OPTIMAL);
                resolve.transition(cmd, vk::ImageLayout::TRANSFER_DST_OPTIMAL);
                let region = vk::ImageResolve {
                    src_subresource: color_layers(),
                    src_offset: vk::Offset3D::default(),
                    dst_subresource: color_layers(),
                    dst_offset: vk::Offset3D::default(),
                    extent: vk::Extent3D { width: back_desc.width, height: back_desc.height, depth: 1 },
                };
                unsafe {
                    device.cmd_resolve_image(
                        cmd,
                        self.back_buffer.image,
                        vk::ImageLayout::TRANSFER_SRC_OPTIMAL,
                        resolve.image,
                        vk::ImageLayout::TRANSFER_DST_OPTIMAL,
                        &[region],
                    );
                }
                resolve.as_ref()
            }
            None => self.back_buffer.as_ref(),
        };
        source.transition(cmd, vk::ImageLayout::TRANSFER_SRC_OPTIMAL);

        let target = self.images[index];
        let color_range = vk::ImageSubresourceRange {
            aspect_mask: vk::ImageAspectFlags::COLOR,
            base_mip_level: 0,
            level_count: 1,
            base_array_layer: 0,
            layer_count: 1,
        };
        let blit = vk::ImageBlit {
            src_subresource: color_layers(),
            src_offsets: [
                vk::Offset3D::default(),
                vk::Offset3D { x: back_desc.width as i32, y: back_desc.height as i32, z: 1 },
            ],
            dst_subresource: color_layers(),
            dst_offsets: [
                vk::Offset3D::default(),
                vk::Offset3D { x: self.extent.width as i32, y: self.extent.height as i32, z: 1 },
            ],
        };

        unsafe {
            image_barrier(device, cmd, target, color_range,
                vk::ImageLayout::UNDEFINED, vk::ImageLayout::TRANSFER_DST_OPTIMAL);
            device.cmd_blit_image(
                cmd,
                source.image,
                vk::ImageLayout::TRANSFER_SRC_OPTIMAL,
                target,
                vk::ImageLayout::TRANSFER_DST_OPTIMAL,
                &[blit],
                vk::Filter::NEAREST,
            );
            image_barrier(device, cmd, target, color_range,
                vk::ImageLayout::TRANSFER_DST_OPTIMAL, vk::ImageLayout::PRESENT_SRC_KHR);
        }
    }

    fn recreate(&mut self, width: u32, height: u32) -> Result<()> {
        if let Ok(mut frames) = self.frames.lock() {
            frames.flush()?;
        }
        self.create_swapchain(width, height)
    }
}

/// FIFO for vsync, otherwise the lowest latency mode available
pub fn choose_present_mode(vsync: bool, available: &[vk::PresentModeKHR]) -> vk::PresentModeKHR {
    if vsync {
        return vk::PresentModeKHR::FIFO;
    }
    [vk::PresentModeKHR::MAILBOX, vk::PresentModeKHR::IMMEDIATE]
        .into_iter()
        .find(|mode| available.contains(mode))
        .unwrap_or(vk::PresentModeKHR::FIFO)
}

fn color_layers() -> vk::ImageSubresourceLayers {
    vk::ImageSubresourceLayers {
        aspect_mask: vk::ImageAspectFlags::COLOR,
        mip_level: 0,
        base_array_layer: 0,
        layer_count: 1,
    }
}

impl Swapchain for VulkanSwapchain {
    fn back_buffer(&self) -> Result<Arc<dyn Texture>> {
        let texture: Arc<dyn Texture> = self.back_buffer.clone();
        Ok(texture)
    }

    fn present(&mut self, sync_interval: u32) -> Result<()> {
        let vsync = sync_interval > 0;
        if vsync != self.vsync {
            self.vsync = vsync;
            let (width, height) = (self.extent.width, self.extent.height);
            self.recreate(width, height)?;
        }

        let frames = self.frames.clone();
        let mut frames = frames.lock()
            .map_err(|_| engine_err!("monaco::vulkan::Swapchain", "Frame recorder lock poisoned"))?;
        let cmd = frames.begin()?;
        frames.end_rendering();

        let image_available = frames.image_available();
        let acquired = unsafe {
            self.swapchain_loader.acquire_next_image(self.swapchain, u64::MAX, image_available, vk::Fence::null())
        };
        let index = match acquired {
            Ok((index, _suboptimal)) => index as usize,
            Err(vk::Result::ERROR_OUT_OF_DATE_KHR) => {
                // Nothing can be shown this frame; still retire the recorded work
                frames.submit(None, None)?;
                frames.advance();
                drop(frames);
                engine_warn!("monaco::vulkan::Swapchain", "Swapchain out of date, recreating");
                let (width, height) = (self.extent.width, self.extent.height);
                return self.recreate(width, height);
            }
            Err(e) => {
                return Err(engine_err!("monaco::vulkan::Swapchain", "Failed to acquire swapchain image: {:?}", e));
            }
        };

        self.record_blit(cmd, index);
        frames.keep_alive(self.back_buffer.clone());
        if let Some(resolve) = &self.resolve_target {
            frames.keep_alive(resolve.clone());
        }

        let render_finished = self.render_finished[index];
        frames.submit(Some((image_available, vk::PipelineStageFlags::TRANSFER)), Some(render_finished))?;
        frames.advance();
        drop(frames);

        let swapchains = [self.swapchain];
        let image_indices = [index as u32];
        let wait_semaphores = [render_finished];
        let present_info = vk::PresentInfoKHR::default()
            .wait_semaphores(&wait_semaphores)
            .swapchains(&swapchains)
            .image_indices(&image_indices);

        let presented = unsafe { self.swapchain_loader.queue_present(self.ctx.graphics_queue, &present_info) };
        match presented {
            Ok(false) => Ok(()),
            Ok(true) | Err(vk::Result::ERROR_OUT_OF_DATE_KHR) => {
                let (width, height) = (self.extent.width, self.extent.height);
                self.recreate(width, height)
            }
            Err(e) => Err(engine_err!("monaco::vulkan::Swapchain", "Failed to present: {:?}", e)),
        }
    }

    fn resize_buffers(&mut self, width: u32, height: u32) -> Result<()> {
        if width == 0 || height == 0 {
            return Err(Error::InvalidArgument(format!("Cannot resize swapchain to {}x{}", width, height)));
        }
        self.recreate(width, height)?;
        let (back_buffer, resolve_target) = Self::create_targets(&self.ctx, width, height, self.sample_count)?;
        self.back_buffer = back_buffer;
        self.resolve_target = resolve_target;
        Ok(())
    }

    fn width(&self) -> u32 {
        self.back_buffer.desc().width
    }

    fn height(&self) -> u32 {
        self.back_buffer.desc().height
    }

    fn format(&self) -> Format {
        BACK_BUFFER_FORMAT
    }
}

impl Drop for VulkanSwapchain {
    fn drop(&mut self) {
        if let Ok(mut frames) = self.frames.lock() {
            frames.flush().ok();
        }
        unsafe {
            for semaphore in self.render_finished.drain(..) {
                self.ctx.device.destroy_semaphore(semaphore, None);
            }
            self.swapchain_loader.destroy_swapchain(self.swapchain, None);
            self.surface_loader.destroy_surface(self.surface, None);
        }
    }
}

#[cfg(test)]
#[path = "vulkan_swapchain_tests.rs"]
mod tests;
