/// DepthStencilView - depth target view, cleared once per frame

use std::sync::Arc;

use crate::error::Result;
use crate::graphics_device::{self as gd, ClearFlags, Format};
use crate::render::{Device, DeviceContext, Texture};

#[derive(Default)]
pub struct DepthStencilView {
    view: Option<Arc<dyn gd::DepthStencilView>>,
}

impl DepthStencilView {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a view over a depth target texture
    pub fn init(&mut self, device: &Device, depth_stencil: &Texture, format: Format) -> Result<()> {
        if !format.is_depth() {
            crate::engine_bail!("monaco::DepthStencilView", InvalidArgument:
                "{:?} is not a depth format", format);
        }
        let resource = depth_stencil.texture().ok_or_else(|| {
            crate::engine_err!("monaco::DepthStencilView", InvalidArgument:
                "Texture '{}' has no depth resource", depth_stencil.name())
        })?;
        self.view = Some(device.create_depth_stencil_view(resource, format)?);
        Ok(())
    }

    pub fn is_valid(&self) -> bool {
        self.view.is_some()
    }

    pub fn native(&self) -> Option<&Arc<dyn gd::DepthStencilView>> {
        self.view.as_ref()
    }

    /// Clear depth to 1.0 and stencil to 0
    pub fn render(&self, device_context: &mut DeviceContext) -> Result<()> {
        let view = self.view.as_ref().ok_or_else(|| {
            crate::engine_err!("monaco::DepthStencilView", InvalidArgument: "render on an uninitialized view")
        })?;
        device_context.clear_depth_stencil_view(view, ClearFlags::DEPTH | ClearFlags::STENCIL, 1.0, 0)
    }

    /// Release the view (idempotent)
    pub fn destroy(&mut self) {
        self.view = None;
    }
}

#[cfg(test)]
#[path = "depth_stencil_view_tests.rs"]
mod tests;
