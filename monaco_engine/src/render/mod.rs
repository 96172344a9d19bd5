//! Render module
//!
//! Owning wrappers around the native graphics objects. Each wrapper holds at
//! most one native handle, creates it in `init`, binds it in `render` and
//! releases it in an idempotent `destroy`.

mod device;
mod device_context;
mod swap_chain;
mod buffer;
mod texture;
mod render_target_view;
mod depth_stencil_view;
mod input_layout;
mod sampler_state;
mod viewport;
mod shader_program;
mod constant_buffers;

pub use device::Device;
pub use device_context::DeviceContext;
pub use swap_chain::SwapChain;
pub use buffer::{BindingKind, Buffer, CONSTANT_BUFFER_ALIGNMENT};
pub use texture::Texture;
pub use render_target_view::RenderTargetView;
pub use depth_stencil_view::DepthStencilView;
pub use input_layout::InputLayout;
pub use sampler_state::SamplerState;
pub use viewport::Viewport;
pub use shader_program::{ShaderProgram, PIXEL_ENTRY_POINT, VERTEX_ENTRY_POINT};
pub use constant_buffers::{
    CbChangeOnResize, CbChangesEveryFrame, CbNeverChanges,
    CB_CHANGES_EVERY_FRAME_SLOT, CB_CHANGE_ON_RESIZE_SLOT, CB_NEVER_CHANGES_SLOT,
};
