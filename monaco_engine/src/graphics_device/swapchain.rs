/// Swapchain trait - window presentation

use std::sync::Arc;
use crate::error::Result;
use crate::graphics_device::{Format, Texture};

/// Presentation chain bound to a window
///
/// The back buffer is an ordinary texture owned by the chain; rendering into
/// it goes through a render target view like any other target.
pub trait Swapchain: Send {
    /// Back buffer texture for the current frame
    fn back_buffer(&self) -> Result<Arc<dyn Texture>>;

    /// Present the back buffer
    ///
    /// # Arguments
    ///
    /// * `sync_interval` - 0 presents immediately, 1 or more waits for vertical sync
    fn present(&mut self, sync_interval: u32) -> Result<()>;

    /// Recreate the buffers after a window resize
    ///
    /// Previously returned back buffer textures must be released (and views
    /// recreated) by the caller.
    fn resize_buffers(&mut self, width: u32, height: u32) -> Result<()>;

    /// Width of the back buffer in pixels
    fn width(&self) -> u32;

    /// Height of the back buffer in pixels
    fn height(&self) -> u32;

    /// Pixel format of the back buffer
    fn format(&self) -> Format;
}
