/// RenderTargetView - color target bound for the geometry pass

use std::sync::Arc;

use crate::error::Result;
use crate::graphics_device::{self as gd, Format};
use crate::render::{DepthStencilView, Device, DeviceContext, Texture};

#[derive(Default)]
pub struct RenderTargetView {
    view: Option<Arc<dyn gd::RenderTargetView>>,
}

impl RenderTargetView {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a view over `texture` (usually the back buffer)
    pub fn init(&mut self, device: &Device, texture: &Texture, format: Format) -> Result<()> {
        let resource = texture.texture().ok_or_else(|| {
            crate::engine_err!("monaco::RenderTargetView", InvalidArgument:
                "Texture '{}' has no resource to render into", texture.name())
        })?;
        self.view = Some(device.create_render_target_view(resource, format)?);
        Ok(())
    }

    pub fn is_valid(&self) -> bool {
        self.view.is_some()
    }

    pub fn native(&self) -> Option<&Arc<dyn gd::RenderTargetView>> {
        self.view.as_ref()
    }

    /// Bind with `depth_stencil_view`, then clear to `clear_color`
    pub fn render(
        &self,
        device_context: &mut DeviceContext,
        depth_stencil_view: &DepthStencilView,
        clear_color: [f32; 4],
    ) -> Result<()> {
        let view = self.view.as_ref().ok_or_else(|| {
            crate::engine_err!("monaco::RenderTargetView", InvalidArgument: "render on an uninitialized view")
        })?;
        device_context.om_set_render_targets(std::slice::from_ref(view), depth_stencil_view.native());
        device_context.clear_render_target_view(view, clear_color)?;
        Ok(())
    }

    /// Bind without clearing
    pub fn bind(&self, device_context: &mut DeviceContext, depth_stencil_view: Option<&DepthStencilView>) {
        match &self.view {
            Some(view) => device_context.om_set_render_targets(
                std::slice::from_ref(view),
                depth_stencil_view.and_then(DepthStencilView::native),
            ),
            None => crate::engine_error!("monaco::RenderTargetView", "bind on an uninitialized view"),
        }
    }

    /// Release the view (idempotent)
    pub fn destroy(&mut self) {
        self.view = None;
    }
}

#[cfg(test)]
#[path = "render_target_view_tests.rs"]
mod tests;
