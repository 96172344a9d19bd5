/// Viewport - rasterizer viewport covering the client area

use crate::error::Result;
use crate::graphics_device::{ViewportDesc, Window};
use crate::render::DeviceContext;

/// Full-target viewport with depth range [0, 1]
///
/// Holds no native resource; `destroy` is not needed.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Viewport {
    desc: ViewportDesc,
}

impl Viewport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Size the viewport to the window's client area
    pub fn init_from_window(&mut self, window: &dyn Window) -> Result<()> {
        let (width, height) = window.client_size();
        self.init(width, height)
    }

    /// Size the viewport explicitly
    pub fn init(&mut self, width: u32, height: u32) -> Result<()> {
        if width == 0 || height == 0 {
            crate::engine_bail!("monaco::Viewport", InvalidArgument:
                "Viewport size {}x{} must be non-zero", width, height);
        }
        self.desc = ViewportDesc {
            top_left_x: 0.0,
            top_left_y: 0.0,
            width: width as f32,
            height: height as f32,
            min_depth: 0.0,
            max_depth: 1.0,
        };
        Ok(())
    }

    pub fn desc(&self) -> &ViewportDesc {
        &self.desc
    }

    /// Width / height, or 1 before init
    pub fn aspect_ratio(&self) -> f32 {
        if self.desc.height > 0.0 {
            self.desc.width / self.desc.height
        } else {
            1.0
        }
    }

    pub fn render(&self, device_context: &mut DeviceContext) {
        if self.desc.width == 0.0 {
            crate::engine_error!("monaco::Viewport", "render on an uninitialized viewport");
            return;
        }
        device_context.rs_set_viewports(std::slice::from_ref(&self.desc));
    }
}

#[cfg(test)]
#[path = "viewport_tests.rs"]
mod tests;
