/// Mock graphics backend for unit tests (no GPU required)
///
/// Every native call made through the mock is appended to a shared call log,
/// so tests can assert creation order, binding order and teardown order.

use std::any::Any;
use std::sync::{Arc, Mutex};
use raw_window_handle::{
    DisplayHandle, HandleError, HasDisplayHandle, HasWindowHandle, WindowHandle,
};

use crate::error::{Error, Result};
use crate::graphics_device::{
    Buffer, BufferDesc, ClearFlags, DepthStencilView, Format, GraphicsBackend,
    GraphicsContext, GraphicsDevice, InputElementDesc, InputLayout, PixelShader,
    PrimitiveTopology, RenderTargetView, SamplerDesc, SamplerState, ScalarKind,
    ShaderBytecode, ShaderResourceView, ShaderStage, SignatureElement, Swapchain,
    Texture, TextureDesc, VertexShader, ViewportDesc, Window, BindFlags,
};

/// Shared, ordered record of native calls
pub type CallLog = Arc<Mutex<Vec<String>>>;

fn record(log: &CallLog, call: String) {
    log.lock().unwrap().push(call);
}

// ============================================================================
// Mock resources
// ============================================================================

#[derive(Debug)]
pub struct MockBuffer {
    pub desc: BufferDesc,
    pub contents: Mutex<Vec<u8>>,
}

impl Buffer for MockBuffer {
    fn desc(&self) -> &BufferDesc {
        &self.desc
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

#[derive(Debug)]
pub struct MockTexture {
    pub desc: TextureDesc,
    pub mip_data_len: Vec<usize>,
}

impl Texture for MockTexture {
    fn desc(&self) -> &TextureDesc {
        &self.desc
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// One struct serves as shader, render-target and depth view
pub struct MockView {
    pub texture: Arc<dyn Texture>,
    pub format: Format,
}

impl ShaderResourceView for MockView {
    fn texture(&self) -> &Arc<dyn Texture> {
        &self.texture
    }
    fn format(&self) -> Format {
        self.format
    }
    fn as_any(&self) -> &dyn Any {
        self
    }
}

impl RenderTargetView for MockView {
    fn texture(&self) -> &Arc<dyn Texture> {
        &self.texture
    }
    fn format(&self) -> Format {
        self.format
    }
    fn as_any(&self) -> &dyn Any {
        self
    }
}

impl DepthStencilView for MockView {
    fn texture(&self) -> &Arc<dyn Texture> {
        &self.texture
    }
    fn format(&self) -> Format {
        self.format
    }
    fn as_any(&self) -> &dyn Any {
        self
    }
}

#[derive(Debug)]
pub struct MockShader {
    pub entry_point: String,
}

impl VertexShader for MockShader {
    fn entry_point(&self) -> &str {
        &self.entry_point
    }
    fn as_any(&self) -> &dyn Any {
        self
    }
}

impl PixelShader for MockShader {
    fn entry_point(&self) -> &str {
        &self.entry_point
    }
    fn as_any(&self) -> &dyn Any {
        self
    }
}

#[derive(Debug)]
pub struct MockInputLayout {
    pub elements: Vec<InputElementDesc>,
}

impl InputLayout for MockInputLayout {
    fn elements(&self) -> &[InputElementDesc] {
        &self.elements
    }
    fn as_any(&self) -> &dyn Any {
        self
    }
}

#[derive(Debug)]
pub struct MockSampler {
    pub desc: SamplerDesc,
}

impl SamplerState for MockSampler {
    fn desc(&self) -> &SamplerDesc {
        &self.desc
    }
    fn as_any(&self) -> &dyn Any {
        self
    }
}

// ============================================================================
// Mock device
// ============================================================================

/// Mock resource factory
///
/// `fail_on` holds call names (e.g. "create_buffer", "compile_shader:PS") that
/// must fail with a BackendError.
pub struct MockGraphicsDevice {
    pub log: CallLog,
    pub vertex_signature: Vec<SignatureElement>,
    pub fail_on: Vec<String>,
}

impl MockGraphicsDevice {
    pub fn new(log: CallLog) -> Self {
        Self {
            log,
            vertex_signature: vec![
                SignatureElement { location: 0, component_count: 3, scalar: ScalarKind::Float, name: None },
                SignatureElement { location: 1, component_count: 2, scalar: ScalarKind::Float, name: None },
            ],
            fail_on: Vec::new(),
        }
    }

    fn check(&self, call: &str) -> Result<()> {
        record(&self.log, call.to_string());
        if self.fail_on.iter().any(|name| name == call) {
            return Err(Error::BackendError(format!("mock failure in {}", call)));
        }
        Ok(())
    }
}

impl GraphicsDevice for MockGraphicsDevice {
    fn create_buffer(&self, desc: &BufferDesc, initial_data: Option<&[u8]>) -> Result<Arc<dyn Buffer>> {
        self.check("create_buffer")?;
        let mut contents = vec![0u8; desc.byte_width as usize];
        if let Some(data) = initial_data {
            contents[..data.len()].copy_from_slice(data);
        }
        Ok(Arc::new(MockBuffer { desc: *desc, contents: Mutex::new(contents) }))
    }

    fn create_texture_2d(&self, desc: &TextureDesc, initial_data: &[&[u8]]) -> Result<Arc<dyn Texture>> {
        self.check("create_texture_2d")?;
        Ok(Arc::new(MockTexture {
            desc: *desc,
            mip_data_len: initial_data.iter().map(|mip| mip.len()).collect(),
        }))
    }

    fn create_render_target_view(&self, texture: &Arc<dyn Texture>, format: Format) -> Result<Arc<dyn RenderTargetView>> {
        self.check("create_render_target_view")?;
        Ok(Arc::new(MockView { texture: texture.clone(), format }))
    }

    fn create_depth_stencil_view(&self, texture: &Arc<dyn Texture>, format: Format) -> Result<Arc<dyn DepthStencilView>> {
        self.check("create_depth_stencil_view")?;
        Ok(Arc::new(MockView { texture: texture.clone(), format }))
    }

    fn create_shader_resource_view(&self, texture: &Arc<dyn Texture>, format: Format) -> Result<Arc<dyn ShaderResourceView>> {
        self.check("create_shader_resource_view")?;
        Ok(Arc::new(MockView { texture: texture.clone(), format }))
    }

    fn compile_shader(&self, file_name: &str, entry_point: &str, stage: ShaderStage) -> Result<ShaderBytecode> {
        self.check(&format!("compile_shader:{}", entry_point))?;
        Ok(ShaderBytecode {
            source_name: file_name.to_string(),
            entry_point: entry_point.to_string(),
            stage,
            code: vec![0x03, 0x02, 0x23, 0x07],
            input_signature: match stage {
                ShaderStage::Vertex => self.vertex_signature.clone(),
                ShaderStage::Pixel => Vec::new(),
            },
        })
    }

    fn create_vertex_shader(&self, bytecode: &ShaderBytecode) -> Result<Arc<dyn VertexShader>> {
        self.check("create_vertex_shader")?;
        Ok(Arc::new(MockShader { entry_point: bytecode.entry_point.clone() }))
    }

    fn create_pixel_shader(&self, bytecode: &ShaderBytecode) -> Result<Arc<dyn PixelShader>> {
        self.check("create_pixel_shader")?;
        Ok(Arc::new(MockShader { entry_point: bytecode.entry_point.clone() }))
    }

    fn create_input_layout(&self, elements: &[InputElementDesc], _vertex_bytecode: &ShaderBytecode) -> Result<Arc<dyn InputLayout>> {
        self.check("create_input_layout")?;
        Ok(Arc::new(MockInputLayout { elements: elements.to_vec() }))
    }

    fn create_sampler_state(&self, desc: &SamplerDesc) -> Result<Arc<dyn SamplerState>> {
        self.check("create_sampler_state")?;
        Ok(Arc::new(MockSampler { desc: *desc }))
    }

    fn wait_idle(&self) -> Result<()> {
        self.check("wait_idle")
    }
}

// ============================================================================
// Mock context
// ============================================================================

pub struct MockGraphicsContext {
    pub log: CallLog,
    pub fail_on: Vec<String>,
}

impl MockGraphicsContext {
    pub fn new(log: CallLog) -> Self {
        Self { log, fail_on: Vec::new() }
    }

    fn check(&self, call: String) -> Result<()> {
        let failing = self.fail_on.iter().any(|name| call.starts_with(name.as_str()));
        record(&self.log, call);
        if failing {
            return Err(Error::BackendError("mock context failure".to_string()));
        }
        Ok(())
    }
}

impl GraphicsContext for MockGraphicsContext {
    fn ia_set_input_layout(&mut self, layout: Option<&Arc<dyn InputLayout>>) {
        record(&self.log, format!("ia_set_input_layout({})", layout.is_some()));
    }

    fn ia_set_vertex_buffers(&mut self, start_slot: u32, buffers: &[Arc<dyn Buffer>], strides: &[u32], offsets: &[u32]) {
        record(&self.log, format!(
            "ia_set_vertex_buffers({},{},{:?},{:?})", start_slot, buffers.len(), strides, offsets
        ));
    }

    fn ia_set_index_buffer(&mut self, buffer: Option<&Arc<dyn Buffer>>, format: Format, offset: u32) {
        record(&self.log, format!("ia_set_index_buffer({},{:?},{})", buffer.is_some(), format, offset));
    }

    fn ia_set_primitive_topology(&mut self, topology: PrimitiveTopology) {
        record(&self.log, format!("ia_set_primitive_topology({:?})", topology));
    }

    fn vs_set_shader(&mut self, shader: Option<&Arc<dyn VertexShader>>) {
        let entry = shader.map(|s| s.entry_point().to_string()).unwrap_or_default();
        record(&self.log, format!("vs_set_shader({})", entry));
    }

    fn vs_set_constant_buffers(&mut self, start_slot: u32, buffers: &[Arc<dyn Buffer>]) {
        record(&self.log, format!("vs_set_constant_buffers({},{})", start_slot, buffers.len()));
    }

    fn ps_set_shader(&mut self, shader: Option<&Arc<dyn PixelShader>>) {
        let entry = shader.map(|s| s.entry_point().to_string()).unwrap_or_default();
        record(&self.log, format!("ps_set_shader({})", entry));
    }

    fn ps_set_constant_buffers(&mut self, start_slot: u32, buffers: &[Arc<dyn Buffer>]) {
        record(&self.log, format!("ps_set_constant_buffers({},{})", start_slot, buffers.len()));
    }

    fn ps_set_shader_resources(&mut self, start_slot: u32, views: &[Arc<dyn ShaderResourceView>]) {
        record(&self.log, format!("ps_set_shader_resources({},{})", start_slot, views.len()));
    }

    fn ps_set_samplers(&mut self, start_slot: u32, samplers: &[Arc<dyn SamplerState>]) {
        record(&self.log, format!("ps_set_samplers({},{})", start_slot, samplers.len()));
    }

    fn rs_set_viewports(&mut self, viewports: &[ViewportDesc]) {
        let sizes: Vec<(f32, f32)> = viewports.iter().map(|v| (v.width, v.height)).collect();
        record(&self.log, format!("rs_set_viewports({:?})", sizes));
    }

    fn om_set_render_targets(&mut self, render_targets: &[Arc<dyn RenderTargetView>], depth_stencil: Option<&Arc<dyn DepthStencilView>>) {
        record(&self.log, format!("om_set_render_targets({},{})", render_targets.len(), depth_stencil.is_some()));
    }

    fn clear_render_target_view(&mut self, _view: &Arc<dyn RenderTargetView>, color: [f32; 4]) -> Result<()> {
        self.check(format!("clear_render_target_view({:?})", color))
    }

    fn clear_depth_stencil_view(&mut self, _view: &Arc<dyn DepthStencilView>, flags: ClearFlags, depth: f32, stencil: u8) -> Result<()> {
        self.check(format!("clear_depth_stencil_view({},{},{})", flags.bits(), depth, stencil))
    }

    fn update_subresource(&mut self, buffer: &Arc<dyn Buffer>, data: &[u8]) -> Result<()> {
        self.check(format!("update_subresource({})", data.len()))?;
        if let Some(mock) = buffer.as_any().downcast_ref::<MockBuffer>() {
            let mut contents = mock.contents.lock().unwrap();
            contents[..data.len()].copy_from_slice(data);
        }
        Ok(())
    }

    fn draw(&mut self, vertex_count: u32, start_vertex: u32) -> Result<()> {
        self.check(format!("draw({},{})", vertex_count, start_vertex))
    }

    fn draw_indexed(&mut self, index_count: u32, start_index: u32, base_vertex: i32) -> Result<()> {
        self.check(format!("draw_indexed({},{},{})", index_count, start_index, base_vertex))
    }

    fn clear_state(&mut self) {
        record(&self.log, "clear_state".to_string());
    }
}

// ============================================================================
// Mock swapchain
// ============================================================================

pub struct MockSwapchain {
    pub log: CallLog,
    pub width: u32,
    pub height: u32,
    pub sample_count: u32,
    pub back_buffer: Arc<dyn Texture>,
}

impl MockSwapchain {
    pub fn new(log: CallLog, width: u32, height: u32, sample_count: u32) -> Self {
        Self {
            log,
            width,
            height,
            sample_count,
            back_buffer: Self::make_back_buffer(width, height, sample_count),
        }
    }

    fn make_back_buffer(width: u32, height: u32, sample_count: u32) -> Arc<dyn Texture> {
        Arc::new(MockTexture {
            desc: TextureDesc {
                sample_count,
                ..TextureDesc::new_2d(width, height, Format::R8G8B8A8_UNORM, BindFlags::RENDER_TARGET)
            },
            mip_data_len: Vec::new(),
        })
    }
}

impl Swapchain for MockSwapchain {
    fn back_buffer(&self) -> Result<Arc<dyn Texture>> {
        record(&self.log, "back_buffer".to_string());
        Ok(self.back_buffer.clone())
    }

    fn present(&mut self, sync_interval: u32) -> Result<()> {
        record(&self.log, format!("present({})", sync_interval));
        Ok(())
    }

    fn resize_buffers(&mut self, width: u32, height: u32) -> Result<()> {
        record(&self.log, format!("resize_buffers({},{})", width, height));
        self.width = width;
        self.height = height;
        self.back_buffer = Self::make_back_buffer(width, height, self.sample_count);
        Ok(())
    }

    fn width(&self) -> u32 {
        self.width
    }

    fn height(&self) -> u32 {
        self.height
    }

    fn format(&self) -> Format {
        Format::R8G8B8A8_UNORM
    }
}

// ============================================================================
// Mock window and backend helpers
// ============================================================================

/// Window without native handles (the mock backend never asks for them)
pub struct MockWindow {
    pub width: u32,
    pub height: u32,
}

impl HasWindowHandle for MockWindow {
    fn window_handle(&self) -> std::result::Result<WindowHandle<'_>, HandleError> {
        Err(HandleError::Unavailable)
    }
}

impl HasDisplayHandle for MockWindow {
    fn display_handle(&self) -> std::result::Result<DisplayHandle<'_>, HandleError> {
        Err(HandleError::Unavailable)
    }
}

impl Window for MockWindow {
    fn client_size(&self) -> (u32, u32) {
        (self.width, self.height)
    }
}

/// Build a complete mock backend sharing one call log
pub fn mock_backend(width: u32, height: u32, sample_count: u32) -> (GraphicsBackend, CallLog) {
    let log: CallLog = Arc::new(Mutex::new(Vec::new()));
    let backend = GraphicsBackend {
        device: Box::new(MockGraphicsDevice::new(log.clone())),
        context: Box::new(MockGraphicsContext::new(log.clone())),
        swapchain: Box::new(MockSwapchain::new(log.clone(), width, height, sample_count)),
    };
    (backend, log)
}

/// Calls recorded so far
pub fn calls(log: &CallLog) -> Vec<String> {
    log.lock().unwrap().clone()
}

/// Position of the first call starting with `prefix`
pub fn position_of(log: &CallLog, prefix: &str) -> Option<usize> {
    log.lock().unwrap().iter().position(|call| call.starts_with(prefix))
}

/// Device and context wrappers sharing one call log
pub fn mock_device_pair() -> (crate::render::Device, crate::render::DeviceContext, CallLog) {
    let log: CallLog = Arc::new(Mutex::new(Vec::new()));
    let device = crate::render::Device::from_native(Box::new(MockGraphicsDevice::new(log.clone())));
    let context = crate::render::DeviceContext::from_native(Box::new(MockGraphicsContext::new(log.clone())));
    (device, context, log)
}

/// Bytes currently stored in a mock buffer
pub fn buffer_contents(buffer: &Arc<dyn Buffer>) -> Vec<u8> {
    buffer
        .as_any()
        .downcast_ref::<MockBuffer>()
        .map(|mock| mock.contents.lock().unwrap().clone())
        .unwrap_or_default()
}
