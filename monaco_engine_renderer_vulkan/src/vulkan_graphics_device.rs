/// VulkanGraphicsDevice - Vulkan implementation of the GraphicsDevice trait
///
/// Also hosts `create_vulkan_backend`, the factory registered under the
/// "vulkan" backend name. It brings up instance, surface, device, allocator,
/// frame recorder, context and swapchain for one window.

use std::ffi::CString;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use ash::vk;
use gpu_allocator::vulkan::{Allocator, AllocatorCreateDesc};
use raw_window_handle::{HasDisplayHandle, HasWindowHandle};
use monaco_engine::monaco::Result;
use monaco_engine::monaco::graphics::{
    validate_input_layout, Buffer, BufferDesc, DepthStencilView, Format, GraphicsBackend,
    GraphicsConfig, GraphicsDevice, InputElementDesc, InputLayout, PixelShader, RenderTargetView,
    SamplerDesc, SamplerState, ShaderBytecode, ShaderResourceView, ShaderStage, Texture,
    TextureDesc, VertexShader, Window,
};
use monaco_engine::{engine_bail, engine_debug, engine_err, engine_info, engine_warn};

use crate::vulkan_buffer::VulkanBuffer;
use crate::vulkan_context::GpuContext;
use crate::vulkan_format::format_to_vk;
use crate::vulkan_frame::FrameRecorder;
use crate::vulkan_graphics_context::VulkanGraphicsContext;
use crate::vulkan_sampler::VulkanSampler;
use crate::vulkan_shader::{compile_shader, VulkanInputLayout, VulkanShader};
use crate::vulkan_swapchain::VulkanSwapchain;
use crate::vulkan_texture::{VulkanTexture, VulkanView};

/// Vulkan resource factory
pub struct VulkanGraphicsDevice {
    ctx: Arc<GpuContext>,
    next_layout_id: AtomicU64,
}

impl VulkanGraphicsDevice {
    pub(crate) fn new(ctx: Arc<GpuContext>) -> Self {
        Self { ctx, next_layout_id: AtomicU64::new(1) }
    }

    /// Native image format for an engine format, honoring the depth fallback
    fn texture_format(&self, format: Format) -> vk::Format {
        match format {
            Format::D24_UNORM_S8_UINT => self.ctx.depth_stencil_format,
            other => format_to_vk(other),
        }
    }
}

impl GraphicsDevice for VulkanGraphicsDevice {
    fn create_buffer(&self, desc: &BufferDesc, initial_data: Option<&[u8]>) -> Result<Arc<dyn Buffer>> {
        Ok(Arc::new(VulkanBuffer::new(self.ctx.clone(), desc, initial_data)?))
    }

    fn create_texture_2d(&self, desc: &TextureDesc, initial_data: &[&[u8]]) -> Result<Arc<dyn Texture>> {
        let vk_format = self.texture_format(desc.format);
        if vk_format == vk::Format::UNDEFINED {
            engine_bail!("monaco::vulkan::GraphicsDevice", Unsupported:
                "Format {:?} has no Vulkan equivalent", desc.format);
        }
        Ok(Arc::new(VulkanTexture::new(self.ctx.clone(), desc, vk_format, initial_data)?))
    }

    fn create_render_target_view(&self, texture: &Arc<dyn Texture>, format: Format) -> Result<Arc<dyn RenderTargetView>> {
        Ok(Arc::new(VulkanView::new(self.ctx.clone(), texture, format)?))
    }

    fn create_depth_stencil_view(&self, texture: &Arc<dyn Texture>, format: Format) -> Result<Arc<dyn DepthStencilView>> {
        Ok(Arc::new(VulkanView::new(self.ctx.clone(), texture, format)?))
    }

    fn create_shader_resource_view(&self, texture: &Arc<dyn Texture>, format: Format) -> Result<Arc<dyn ShaderResourceView>> {
        Ok(Arc::new(VulkanView::new(self.ctx.clone(), texture, format)?))
    }

    fn compile_shader(&self, file_name: &str, entry_point: &str, stage: ShaderStage) -> Result<ShaderBytecode> {
        compile_shader(file_name, entry_point, stage)
    }

    fn create_vertex_shader(&self, bytecode: &ShaderBytecode) -> Result<Arc<dyn VertexShader>> {
        if bytecode.stage != ShaderStage::Vertex {
            engine_bail!("monaco::vulkan::GraphicsDevice", InvalidArgument:
                "'{}' in '{}' is not a vertex shader", bytecode.entry_point, bytecode.source_name);
        }
        Ok(Arc::new(VulkanShader::new(self.ctx.clone(), bytecode)?))
    }

    fn create_pixel_shader(&self, bytecode: &ShaderBytecode) -> Result<Arc<dyn PixelShader>> {
        if bytecode.stage != ShaderStage::Pixel {
            engine_bail!("monaco::vulkan::GraphicsDevice", InvalidArgument:
                "'{}' in '{}' is not a pixel shader", bytecode.entry_point, bytecode.source_name);
        }
        Ok(Arc::new(VulkanShader::new(self.ctx.clone(), bytecode)?))
    }

    fn create_input_layout(
        &self,
        elements: &[InputElementDesc],
        vertex_bytecode: &ShaderBytecode,
    ) -> Result<Arc<dyn InputLayout>> {
        validate_input_layout(elements, &vertex_bytecode.input_signature)?;
        let id = self.next_layout_id.fetch_add(1, Ordering::Relaxed);
        Ok(Arc::new(VulkanInputLayout::new(id, elements)))
    }

    fn create_sampler_state(&self, desc: &SamplerDesc) -> Result<Arc<dyn SamplerState>> {
        Ok(Arc::new(VulkanSampler::new(self.ctx.clone(), desc)?))
    }

    fn wait_idle(&self) -> Result<()> {
        unsafe {
            self.ctx.device.device_wait_idle()
                .map_err(|e| engine_err!("monaco::vulkan::GraphicsDevice", "Failed to wait idle: {:?}", e))
        }
    }
}

// ============================================================================
// Backend bring-up
// ============================================================================

/// Highest supported power-of-two sample count not above `requested`
pub fn clamp_sample_count(requested: u32, supported: vk::SampleCountFlags) -> u32 {
    let mut count = requested.clamp(1, 64).next_power_of_two();
    if count > requested.max(1) {
        count /= 2;
    }
    while count > 1 && !supported.contains(vk::SampleCountFlags::from_raw(count)) {
        count /= 2;
    }
    count
}

/// First depth/stencil format usable as an attachment: D24S8, else D32S8
pub fn choose_depth_stencil_format(supports: impl Fn(vk::Format) -> bool) -> Option<vk::Format> {
    [vk::Format::D24_UNORM_S8_UINT, vk::Format::D32_SFLOAT_S8_UINT]
        .into_iter()
        .find(|&format| supports(format))
}

/// Create the Vulkan device, context and swapchain for `window`
pub fn create_vulkan_backend(window: &dyn Window, config: &GraphicsConfig) -> Result<GraphicsBackend> {
    let (width, height) = window.client_size();
    if width == 0 || height == 0 {
        engine_bail!("monaco::vulkan::Backend", InitializationFailed:
            "Window client area is empty ({}x{})", width, height);
    }

    unsafe {
        let entry = ash::Entry::load()
            .map_err(|e| engine_err!("monaco::vulkan::Backend", InitializationFailed:
                "Failed to load Vulkan: {}", e))?;

        let app_name = CString::new(config.app_name.as_str())
            .map_err(|e| engine_err!("monaco::vulkan::Backend", InitializationFailed:
                "Invalid app name: {}", e))?;
        let app_info = vk::ApplicationInfo::default()
            .application_name(&app_name)
            .application_version(vk::make_api_version(
                0,
                config.app_version.0,
                config.app_version.1,
                config.app_version.2,
            ))
            .engine_name(c"MonacoEngine2")
            .engine_version(vk::make_api_version(0, 2, 0, 0))
            .api_version(vk::API_VERSION_1_3);

        let display_handle = window.display_handle()
            .map_err(|e| engine_err!("monaco::vulkan::Backend", InitializationFailed:
                "Failed to get display handle: {}", e))?;
        let window_handle = window.window_handle()
            .map_err(|e| engine_err!("monaco::vulkan::Backend", InitializationFailed:
                "Failed to get window handle: {}", e))?;

        #[allow(unused_mut)]
        let mut extension_names = ash_window::enumerate_required_extensions(display_handle.as_raw())
            .map_err(|e| engine_err!("monaco::vulkan::Backend", InitializationFailed:
                "Failed to get required extensions: {:?}", e))?
            .to_vec();
        #[allow(unused_mut)]
        let mut layer_names: Vec<*const std::os::raw::c_char> = Vec::new();

        #[cfg(feature = "vulkan-validation")]
        let validation = config.enable_validation;
        #[cfg(not(feature = "vulkan-validation"))]
        let validation = false;
        if config.enable_validation && !validation {
            engine_warn!("monaco::vulkan::Backend",
                "Validation requested but the 'vulkan-validation' feature is disabled");
        }
        #[cfg(feature = "vulkan-validation")]
        if validation {
            layer_names.push(c"VK_LAYER_KHRONOS_validation".as_ptr());
            extension_names.push(ash::ext::debug_utils::NAME.as_ptr());
        }

        let instance_info = vk::InstanceCreateInfo::default()
            .application_info(&app_info)
            .enabled_layer_names(&layer_names)
            .enabled_extension_names(&extension_names);
        let instance = entry.create_instance(&instance_info, None)
            .map_err(|e| engine_err!("monaco::vulkan::Backend", InitializationFailed:
                "Failed to create instance: {:?}", e))?;

        #[cfg(feature = "vulkan-validation")]
        let (debug_utils_loader, debug_messenger) = if validation {
            let loader = ash::ext::debug_utils::Instance::new(&entry, &instance);
            match loader.create_debug_utils_messenger(&crate::debug::messenger_create_info(), None) {
                Ok(messenger) => (Some(loader), Some(messenger)),
                Err(e) => {
                    engine_warn!("monaco::vulkan::Backend", "Failed to create debug messenger: {:?}", e);
                    (None, None)
                }
            }
        } else {
            (None, None)
        };
        #[cfg(not(feature = "vulkan-validation"))]
        let (debug_utils_loader, debug_messenger) = (None, None);

        let surface = ash_window::create_surface(
            &entry,
            &instance,
            display_handle.as_raw(),
            window_handle.as_raw(),
            None,
        )
        .map_err(|e| engine_err!("monaco::vulkan::Backend", InitializationFailed:
            "Failed to create surface: {:?}", e))?;
        let surface_loader = ash::khr::surface::Instance::new(&entry, &instance);

        // Pick a device with a queue family that does both graphics and present
        let physical_devices = instance.enumerate_physical_devices()
            .map_err(|e| engine_err!("monaco::vulkan::Backend", InitializationFailed:
                "Failed to enumerate physical devices: {:?}", e))?;
        let mut candidates: Vec<(vk::PhysicalDevice, u32, bool)> = Vec::new();
        for physical_device in physical_devices {
            let properties = instance.get_physical_device_properties(physical_device);
            if properties.api_version < vk::API_VERSION_1_3 {
                continue;
            }
            let families = instance.get_physical_device_queue_family_properties(physical_device);
            let family = (0..families.len() as u32).find(|&i| {
                families[i as usize].queue_flags.contains(vk::QueueFlags::GRAPHICS)
                    && surface_loader
                        .get_physical_device_surface_support(physical_device, i, surface)
                        .unwrap_or(false)
            });
            if let Some(family) = family {
                let discrete = properties.device_type == vk::PhysicalDeviceType::DISCRETE_GPU;
                candidates.push((physical_device, family, discrete));
            }
        }
        let (physical_device, queue_family, _) = candidates
            .iter()
            .find(|(_, _, discrete)| *discrete)
            .or_else(|| candidates.first())
            .copied()
            .ok_or_else(|| engine_err!("monaco::vulkan::Backend", InitializationFailed:
                "No Vulkan 1.3 GPU can present to this window"))?;

        let properties = instance.get_physical_device_properties(physical_device);
        let device_name = properties.device_name_as_c_str()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|_| "unknown".to_string());
        engine_info!("monaco::vulkan::Backend", "Using GPU '{}'", device_name);

        let supported_features = instance.get_physical_device_features(physical_device);
        let features = vk::PhysicalDeviceFeatures::default()
            .sampler_anisotropy(supported_features.sampler_anisotropy == vk::TRUE);
        let mut vulkan13_features = vk::PhysicalDeviceVulkan13Features::default()
            .dynamic_rendering(true);

        let queue_priorities = [1.0];
        let queue_infos = [vk::DeviceQueueCreateInfo::default()
            .queue_family_index(queue_family)
            .queue_priorities(&queue_priorities)];
        let device_extension_names = [ash::khr::swapchain::NAME.as_ptr()];
        let device_info = vk::DeviceCreateInfo::default()
            .queue_create_infos(&queue_infos)
            .enabled_extension_names(&device_extension_names)
            .enabled_features(&features)
            .push_next(&mut vulkan13_features);
        let device = instance.create_device(physical_device, &device_info, None)
            .map_err(|e| engine_err!("monaco::vulkan::Backend", InitializationFailed:
                "Failed to create device: {:?}", e))?;
        let graphics_queue = device.get_device_queue(queue_family, 0);

        let allocator = Allocator::new(&AllocatorCreateDesc {
            instance: instance.clone(),
            device: device.clone(),
            physical_device,
            debug_settings: Default::default(),
            buffer_device_address: false,
            allocation_sizes: Default::default(),
        })
        .map_err(|e| engine_err!("monaco::vulkan::Backend", InitializationFailed:
            "Failed to create allocator: {:?}", e))?;

        let depth_stencil_format = choose_depth_stencil_format(|format| {
            instance.get_physical_device_format_properties(physical_device, format)
                .optimal_tiling_features
                .contains(vk::FormatFeatureFlags::DEPTH_STENCIL_ATTACHMENT)
        })
        .ok_or_else(|| engine_err!("monaco::vulkan::Backend", InitializationFailed:
            "No supported depth/stencil attachment format"))?;
        if depth_stencil_format != vk::Format::D24_UNORM_S8_UINT {
            engine_warn!("monaco::vulkan::Backend",
                "D24_UNORM_S8_UINT unsupported, using {:?} for depth/stencil", depth_stencil_format);
        }

        let limits = properties.limits;
        let sample_count = clamp_sample_count(
            config.sample_count,
            limits.framebuffer_color_sample_counts & limits.framebuffer_depth_sample_counts,
        );
        if sample_count != config.sample_count {
            engine_warn!("monaco::vulkan::Backend",
                "{}x MSAA unsupported, using {}x", config.sample_count, sample_count);
        }

        let ctx = Arc::new(GpuContext::new(
            entry,
            instance,
            physical_device,
            device,
            allocator,
            graphics_queue,
            queue_family,
            depth_stencil_format,
            debug_utils_loader,
            debug_messenger,
        )?);

        let frames = Arc::new(Mutex::new(FrameRecorder::new(ctx.clone())?));
        let swapchain = VulkanSwapchain::new(
            ctx.clone(),
            frames.clone(),
            surface,
            surface_loader,
            width,
            height,
            sample_count,
            config.vsync,
        )?;
        let context = VulkanGraphicsContext::new(ctx.clone(), frames);
        let device = VulkanGraphicsDevice::new(ctx);

        engine_debug!("monaco::vulkan::Backend", "Vulkan backend ready ({}x{}, {}x MSAA)",
            width, height, sample_count);

        Ok(GraphicsBackend {
            device: Box::new(device),
            context: Box::new(context),
            swapchain: Box::new(swapchain),
        })
    }
}

#[cfg(test)]
#[path = "vulkan_graphics_device_tests.rs"]
mod tests;
