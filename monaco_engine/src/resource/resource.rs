/// Resource trait shared by every asset kept in the resource manager

use crate::error::Result;
use crate::render::Device;

/// Lifecycle of a resource
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ResourceState {
    #[default]
    Unloaded,
    Loading,
    Loaded,
    Failed,
}

/// Kind of asset, for statistics and debugging
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResourceType {
    Texture,
    Model,
    Shader,
    Audio,
    Unknown,
}

/// Loadable asset
///
/// `load` reads and decodes the file on the CPU, `init` creates the GPU
/// objects. A resource reaches `Loaded` only after both succeed.
pub trait Resource: Send + Sync {
    /// Identifier the resource was created with
    fn name(&self) -> &str;

    fn resource_type(&self) -> ResourceType;

    fn state(&self) -> ResourceState;

    /// Read the asset from `file`
    fn load(&mut self, file: &str) -> Result<()>;

    /// Create GPU-side objects from the loaded data
    fn init(&mut self, device: &Device) -> Result<()>;

    /// Release CPU and GPU data, back to `Unloaded`
    fn unload(&mut self);

    /// Approximate memory footprint
    fn size_in_bytes(&self) -> usize;
}
