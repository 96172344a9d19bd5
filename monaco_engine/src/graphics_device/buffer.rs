/// Buffer trait, bind flags and buffer descriptor

use std::any::Any;
use bitflags::bitflags;

bitflags! {
    /// Pipeline stages a resource can be bound to
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct BindFlags: u32 {
        const VERTEX_BUFFER = 1 << 0;
        const INDEX_BUFFER = 1 << 1;
        const CONSTANT_BUFFER = 1 << 2;
        const SHADER_RESOURCE = 1 << 3;
        const RENDER_TARGET = 1 << 4;
        const DEPTH_STENCIL = 1 << 5;
    }
}

/// Descriptor for creating a buffer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BufferDesc {
    /// Size in bytes
    pub byte_width: u32,
    /// Where the buffer will be bound
    pub bind: BindFlags,
    /// Element stride in bytes (vertex size, index size, 0 for constants)
    pub stride: u32,
}

/// Native buffer resource
///
/// Implemented by backend-specific buffer types (e.g., VulkanBuffer).
/// The native object is released when the last reference is dropped.
pub trait Buffer: Send + Sync {
    /// Descriptor the buffer was created from
    fn desc(&self) -> &BufferDesc;

    /// Backend downcast hook
    fn as_any(&self) -> &dyn Any;
}
