/// GraphicsDevice trait - resource factory interface, and backend plugins

use std::sync::{Arc, Mutex, OnceLock};
use rustc_hash::FxHashMap;

use crate::error::Result;
use crate::graphics_device::{
    Buffer, BufferDesc, DepthStencilView, Format, GraphicsContext, InputElementDesc,
    InputLayout, PixelShader, RenderTargetView, SamplerDesc, SamplerState,
    ShaderBytecode, ShaderResourceView, ShaderStage, Swapchain, Texture, TextureDesc,
    VertexShader, Window,
};

/// Graphics configuration
#[derive(Debug, Clone)]
pub struct GraphicsConfig {
    /// Registered backend plugin name
    pub backend: String,
    /// Enable validation/debug layers
    pub enable_validation: bool,
    /// Application name
    pub app_name: String,
    /// Application version (major, minor, patch)
    pub app_version: (u32, u32, u32),
    /// Wait for vertical sync on present
    pub vsync: bool,
    /// MSAA sample count of the back buffer and depth target
    pub sample_count: u32,
}

impl Default for GraphicsConfig {
    fn default() -> Self {
        Self {
            backend: "vulkan".to_string(),
            enable_validation: cfg!(debug_assertions),
            app_name: "Monaco Engine 2".to_string(),
            app_version: (1, 0, 0),
            vsync: true,
            sample_count: 4,
        }
    }
}

/// Resource factory
///
/// Implemented by backend-specific devices (e.g., VulkanGraphicsDevice).
/// Arguments reaching a backend have already been validated by the engine's
/// `Device` wrapper.
pub trait GraphicsDevice: Send + Sync {
    /// Create a buffer, optionally filled with `initial_data`
    fn create_buffer(&self, desc: &BufferDesc, initial_data: Option<&[u8]>) -> Result<Arc<dyn Buffer>>;

    /// Create a 2D texture
    ///
    /// # Arguments
    ///
    /// * `desc` - Texture descriptor
    /// * `initial_data` - One tightly packed slice per mip level, or empty
    fn create_texture_2d(&self, desc: &TextureDesc, initial_data: &[&[u8]]) -> Result<Arc<dyn Texture>>;

    fn create_render_target_view(&self, texture: &Arc<dyn Texture>, format: Format) -> Result<Arc<dyn RenderTargetView>>;

    fn create_depth_stencil_view(&self, texture: &Arc<dyn Texture>, format: Format) -> Result<Arc<dyn DepthStencilView>>;

    fn create_shader_resource_view(&self, texture: &Arc<dyn Texture>, format: Format) -> Result<Arc<dyn ShaderResourceView>>;

    /// Compile (or load precompiled) `entry_point` from a combined shader file
    fn compile_shader(&self, file_name: &str, entry_point: &str, stage: ShaderStage) -> Result<ShaderBytecode>;

    fn create_vertex_shader(&self, bytecode: &ShaderBytecode) -> Result<Arc<dyn VertexShader>>;

    fn create_pixel_shader(&self, bytecode: &ShaderBytecode) -> Result<Arc<dyn PixelShader>>;

    /// Create an input layout (elements already have resolved offsets)
    fn create_input_layout(
        &self,
        elements: &[InputElementDesc],
        vertex_bytecode: &ShaderBytecode,
    ) -> Result<Arc<dyn InputLayout>>;

    fn create_sampler_state(&self, desc: &SamplerDesc) -> Result<Arc<dyn SamplerState>>;

    /// Block until the GPU is idle
    fn wait_idle(&self) -> Result<()>;
}

/// The three native services created together for one window
pub struct GraphicsBackend {
    pub device: Box<dyn GraphicsDevice>,
    pub context: Box<dyn GraphicsContext>,
    pub swapchain: Box<dyn Swapchain>,
}

// ============================================================================
// Plugin system for registering graphics backends
// ============================================================================

/// Backend factory function type
type GraphicsBackendFactory = Box<dyn Fn(&dyn Window, &GraphicsConfig) -> Result<GraphicsBackend> + Send + Sync>;

static BACKEND_REGISTRY: OnceLock<Mutex<FxHashMap<String, Arc<GraphicsBackendFactory>>>> = OnceLock::new();

fn backend_registry() -> &'static Mutex<FxHashMap<String, Arc<GraphicsBackendFactory>>> {
    BACKEND_REGISTRY.get_or_init(|| Mutex::new(FxHashMap::default()))
}

/// Register a graphics backend under `name` (replaces a previous registration)
pub fn register_graphics_backend<F>(name: &str, factory: F)
where
    F: Fn(&dyn Window, &GraphicsConfig) -> Result<GraphicsBackend> + Send + Sync + 'static,
{
    if let Ok(mut registry) = backend_registry().lock() {
        registry.insert(name.to_string(), Arc::new(Box::new(factory)));
        crate::engine_debug!("monaco::GraphicsBackend", "Registered graphics backend '{}'", name);
    }
}

/// True if a backend named `name` is registered
pub fn is_graphics_backend_registered(name: &str) -> bool {
    backend_registry()
        .lock()
        .map(|registry| registry.contains_key(name))
        .unwrap_or(false)
}

/// Create device, context and swapchain with the backend named in `config`
pub fn create_graphics_backend(window: &dyn Window, config: &GraphicsConfig) -> Result<GraphicsBackend> {
    let factory = {
        let registry = backend_registry().lock().map_err(|_| {
            crate::engine_err!("monaco::GraphicsBackend", InitializationFailed:
                "Backend registry lock poisoned")
        })?;
        registry.get(&config.backend).cloned().ok_or_else(|| {
            crate::engine_err!("monaco::GraphicsBackend", InitializationFailed:
                "Graphics backend '{}' not registered", config.backend)
        })?
    };

    factory(window, config)
}
