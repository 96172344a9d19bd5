/*!
# Monaco Engine - Vulkan Backend

Vulkan implementation of the Monaco engine graphics device traits.

The device, immediate context and swapchain are built on ash (Vulkan 1.3
dynamic rendering) with gpu-allocator for memory and spirq for shader
reflection. Call [`register`] once at startup to make the backend available
under the name "vulkan".
*/

mod vulkan_context;
mod vulkan_format;
mod vulkan_buffer;
mod vulkan_texture;
mod vulkan_shader;
mod vulkan_sampler;
mod vulkan_pipeline;
mod vulkan_frame;
mod vulkan_graphics_context;
mod vulkan_swapchain;
mod vulkan_graphics_device;

#[cfg(feature = "vulkan-validation")]
mod debug;

/// Namespace mirroring `monaco_engine::monaco`
pub mod monaco {
    pub use crate::vulkan_graphics_device::{create_vulkan_backend, VulkanGraphicsDevice};
    pub use crate::vulkan_graphics_context::VulkanGraphicsContext;
    pub use crate::vulkan_swapchain::VulkanSwapchain;
    pub use crate::register;

    #[cfg(feature = "vulkan-validation")]
    pub use crate::debug::{log_validation_report, reset_validation_stats, validation_stats, ValidationStats};
}

/// Backend name used in `GraphicsConfig::backend`
pub const BACKEND_NAME: &str = "vulkan";

/// Register the Vulkan backend with the plugin system
///
/// # Example
///
/// ```no_run
/// use monaco_engine::monaco::graphics::{create_graphics_backend, GraphicsConfig};
/// # fn run(window: &winit::window::Window) -> monaco_engine::monaco::Result<()> {
/// monaco_engine_renderer_vulkan::register();
/// let backend = create_graphics_backend(window, &GraphicsConfig::default())?;
/// # Ok(())
/// # }
/// ```
pub fn register() {
    monaco_engine::monaco::graphics::register_graphics_backend(BACKEND_NAME, |window, config| {
        vulkan_graphics_device::create_vulkan_backend(window, config)
    });
}
