/// SwapChain - presentation chain wrapper and device bootstrap

use crate::error::Result;
use crate::graphics_device::{
    create_graphics_backend, Format, GraphicsBackend, GraphicsConfig, Swapchain, Window,
};
use crate::render::{Device, DeviceContext, Texture};

/// Owner of the native swapchain
///
/// `init` creates the device, the immediate context and the chain together
/// (the native API builds them as one unit) and hands the back buffer to the
/// caller's `Texture`.
#[derive(Default)]
pub struct SwapChain {
    swapchain: Option<Box<dyn Swapchain>>,
    sample_count: u32,
}

impl SwapChain {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create device, context and chain for `window` with the configured backend
    ///
    /// # Errors
    ///
    /// Any failure is fatal for application startup: no frame can exist
    /// without a chain.
    pub fn init(
        &mut self,
        device: &mut Device,
        device_context: &mut DeviceContext,
        back_buffer: &mut Texture,
        window: &dyn Window,
        config: &GraphicsConfig,
    ) -> Result<()> {
        let (width, height) = window.client_size();
        if width == 0 || height == 0 {
            crate::engine_bail!("monaco::SwapChain", InvalidArgument:
                "Window client area is {}x{}", width, height);
        }
        if config.sample_count == 0 {
            crate::engine_bail!("monaco::SwapChain", InvalidArgument: "Sample count is 0");
        }

        let backend = create_graphics_backend(window, config).map_err(|e| {
            crate::engine_err!("monaco::SwapChain", InitializationFailed:
                "Graphics backend '{}' failed: {}", config.backend, e)
        })?;

        self.init_with_backend(device, device_context, back_buffer, backend, config.sample_count)
    }

    /// Take ownership of an already created backend
    pub fn init_with_backend(
        &mut self,
        device: &mut Device,
        device_context: &mut DeviceContext,
        back_buffer: &mut Texture,
        backend: GraphicsBackend,
        sample_count: u32,
    ) -> Result<()> {
        let GraphicsBackend { device: native_device, context, swapchain } = backend;

        let texture = swapchain.back_buffer()?;
        // The backend may clamp the requested MSAA level to what the GPU supports
        let actual_samples = texture.desc().sample_count.max(1);
        if actual_samples != sample_count {
            crate::engine_warn!("monaco::SwapChain",
                "Requested {}x MSAA, back buffer uses {}x", sample_count, actual_samples);
        }
        back_buffer.set_back_buffer(texture);

        crate::engine_info!("monaco::SwapChain",
            "Swap chain ready: {}x{} {:?}, {}x MSAA",
            swapchain.width(), swapchain.height(), swapchain.format(), actual_samples);

        device.set_native(native_device);
        device_context.set_native(context);
        self.swapchain = Some(swapchain);
        self.sample_count = actual_samples;
        Ok(())
    }

    pub fn is_valid(&self) -> bool {
        self.swapchain.is_some()
    }

    /// Present the back buffer, waiting for vertical sync when `vsync` is set
    pub fn present(&mut self, vsync: bool) -> Result<()> {
        let swapchain = self.swapchain.as_deref_mut().ok_or_else(|| {
            crate::engine_err!("monaco::SwapChain", InvalidArgument: "present on an uninitialized swap chain")
        })?;
        swapchain.present(if vsync { 1 } else { 0 })
    }

    /// Resize the chain and refresh the caller's back buffer texture
    pub fn resize(&mut self, width: u32, height: u32, back_buffer: &mut Texture) -> Result<()> {
        if width == 0 || height == 0 {
            crate::engine_bail!("monaco::SwapChain", InvalidArgument:
                "Cannot resize to {}x{}", width, height);
        }
        let swapchain = self.swapchain.as_deref_mut().ok_or_else(|| {
            crate::engine_err!("monaco::SwapChain", InvalidArgument: "resize on an uninitialized swap chain")
        })?;

        back_buffer.destroy();
        swapchain.resize_buffers(width, height)?;
        back_buffer.set_back_buffer(swapchain.back_buffer()?);
        Ok(())
    }

    pub fn width(&self) -> u32 {
        self.swapchain.as_ref().map_or(0, |s| s.width())
    }

    pub fn height(&self) -> u32 {
        self.swapchain.as_ref().map_or(0, |s| s.height())
    }

    pub fn format(&self) -> Option<Format> {
        self.swapchain.as_ref().map(|s| s.format())
    }

    /// MSAA sample count the back buffer was created with
    pub fn sample_count(&self) -> u32 {
        self.sample_count
    }

    /// Release the chain and everything it acquired (idempotent)
    pub fn destroy(&mut self) {
        if self.swapchain.take().is_some() {
            crate::engine_debug!("monaco::SwapChain", "Swap chain destroyed");
        }
    }
}

#[cfg(test)]
#[path = "swap_chain_tests.rs"]
mod tests;
