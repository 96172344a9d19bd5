/// Graphics device module - the native backend abstraction
///
/// Backends implement these traits; the engine's `render` wrappers own the
/// resulting objects.

pub mod format;
pub mod buffer;
pub mod texture;
pub mod shader;
pub mod sampler;
pub mod graphics_context;
pub mod swapchain;
pub mod window;
pub mod graphics_device;

pub use format::*;
pub use buffer::*;
pub use texture::*;
pub use shader::*;
pub use sampler::*;
pub use graphics_context::*;
pub use swapchain::*;
pub use window::*;
pub use graphics_device::*;

// Mock graphics device for tests (no GPU required)
#[cfg(test)]
pub mod mock_graphics_device;
