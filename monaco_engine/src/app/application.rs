/// Application - owns every GPU object and runs the frame loop

use crate::app::{AppConfig, ActorDesc, Camera, EditorSession, FrameTimer, UiOverlay};
use crate::error::Result;
use crate::graphics_device::{BindFlags, Format, GraphicsBackend, Window};
use crate::render::{
    Buffer, CbChangeOnResize, CbNeverChanges, DepthStencilView, Device, DeviceContext,
    RenderTargetView, ShaderProgram, SwapChain, Texture, Viewport,
    CB_CHANGE_ON_RESIZE_SLOT, CB_NEVER_CHANGES_SLOT,
};
use crate::resource::{Model3D, ResourceManager, TextureAsset};
use crate::scene::{Actor, Scene, SimpleVertex, Transform};

const DEPTH_FORMAT: Format = Format::D24_UNORM_S8_UINT;

/// Engine application
///
/// `init` creates everything in dependency order, `frame` runs `update` then
/// `render`, and `destroy` tears down in reverse order. A failed `init`
/// leaves the application destroyed.
pub struct Application {
    config: AppConfig,

    device: Device,
    device_context: DeviceContext,
    swap_chain: SwapChain,
    back_buffer: Texture,
    render_target_view: RenderTargetView,
    depth_stencil: Texture,
    depth_stencil_view: DepthStencilView,
    viewport: Viewport,
    shader_program: ShaderProgram,
    cb_never_changes: Buffer,
    cb_change_on_resize: Buffer,

    camera: Camera,
    scene: Scene,
    resources: ResourceManager,
    session: EditorSession,
    overlay: Option<Box<dyn UiOverlay>>,
    timer: FrameTimer,
    initialized: bool,
}

impl Application {
    pub fn new(config: AppConfig) -> Self {
        let camera = Camera::new(&config.camera, 1.0);
        Self {
            config,
            device: Device::new(),
            device_context: DeviceContext::new(),
            swap_chain: SwapChain::new(),
            back_buffer: Texture::new(),
            render_target_view: RenderTargetView::new(),
            depth_stencil: Texture::new(),
            depth_stencil_view: DepthStencilView::new(),
            viewport: Viewport::new(),
            shader_program: ShaderProgram::new(),
            cb_never_changes: Buffer::new(),
            cb_change_on_resize: Buffer::new(),
            camera,
            scene: Scene::new(),
            resources: ResourceManager::new(),
            session: EditorSession::new(),
            overlay: None,
            timer: FrameTimer::new(),
            initialized: false,
        }
    }

    /// Install the editor overlay (replaces any previous one)
    pub fn set_overlay(&mut self, overlay: Box<dyn UiOverlay>) {
        if let Some(mut previous) = self.overlay.replace(overlay) {
            previous.shutdown();
        }
    }

    // ===== INIT =====

    /// Create the device and swap chain for `window`, then everything else
    pub fn init(&mut self, window: &dyn Window) -> Result<()> {
        let result = self
            .swap_chain
            .init(
                &mut self.device,
                &mut self.device_context,
                &mut self.back_buffer,
                window,
                &self.config.graphics,
            )
            .and_then(|()| self.init_resources());
        self.finish_init(result)
    }

    /// Same as `init` with an already created backend
    pub fn init_with_backend(&mut self, backend: GraphicsBackend) -> Result<()> {
        let result = self
            .swap_chain
            .init_with_backend(
                &mut self.device,
                &mut self.device_context,
                &mut self.back_buffer,
                backend,
                self.config.graphics.sample_count,
            )
            .and_then(|()| self.init_resources());
        self.finish_init(result)
    }

    fn finish_init(&mut self, result: Result<()>) -> Result<()> {
        match result {
            Ok(()) => {
                self.initialized = true;
                self.timer.reset();
                crate::engine_info!("monaco::Application",
                    "Initialized: {}x{}, {} actors",
                    self.swap_chain.width(), self.swap_chain.height(), self.scene.len());
                Ok(())
            }
            Err(e) => {
                crate::engine_error!("monaco::Application", "Failed to initialize: {}", e);
                self.destroy();
                Err(e)
            }
        }
    }

    fn init_resources(&mut self) -> Result<()> {
        let width = self.swap_chain.width();
        let height = self.swap_chain.height();

        self.init_size_dependent(width, height)?;

        let actors = self.config.actors.clone();
        for desc in &actors {
            let actor = self.build_actor(desc)?;
            self.scene.add_actor(actor);
        }

        self.shader_program
            .init(&self.device, &self.config.shader_file, &SimpleVertex::input_layout())?;

        self.camera = Camera::new(&self.config.camera, self.viewport.aspect_ratio());
        self.cb_never_changes
            .init_constant_from(&self.device, &CbNeverChanges::new(*self.camera.view_matrix()))?;
        self.cb_change_on_resize
            .init_constant_from(&self.device, &CbChangeOnResize::new(*self.camera.projection_matrix()))?;
        Ok(())
    }

    /// Render target view, depth target and viewport for a back buffer size
    fn init_size_dependent(&mut self, width: u32, height: u32) -> Result<()> {
        let format = self.swap_chain.format().unwrap_or(Format::R8G8B8A8_UNORM);
        self.render_target_view.init(&self.device, &self.back_buffer, format)?;
        self.depth_stencil.init_target(
            &self.device,
            width,
            height,
            DEPTH_FORMAT,
            self.swap_chain.sample_count(),
            BindFlags::DEPTH_STENCIL,
        )?;
        self.depth_stencil_view.init(&self.device, &self.depth_stencil, DEPTH_FORMAT)?;
        self.viewport.init(width, height)
    }

    fn build_actor(&mut self, desc: &ActorDesc) -> Result<Actor> {
        let (model_type, flip_uv) = (desc.model_type, desc.flip_uv);
        let model = self.resources.get_or_load(&self.device, &desc.model_file, &desc.model_file, || {
            Model3D::new(&desc.model_file, model_type, flip_uv)
        })?;

        let mut textures = Vec::with_capacity(desc.textures.len());
        for (name, extension) in &desc.textures {
            let file = format!("{}{}", name, extension.suffix());
            let extension = *extension;
            let texture = self.resources.get_or_load(&self.device, name, &file, || {
                TextureAsset::new(name, extension)
            })?;
            textures.push(texture);
        }

        let mut actor = Actor::new(&self.device, &desc.name)?;
        actor.set_mesh(&self.device, model.meshes())?;
        actor.set_textures(textures);
        actor.set_color(self.config.mesh_color);
        if let Some(transform) = actor.get_component_mut::<Transform>() {
            *transform = desc.transform;
        }
        Ok(actor)
    }

    // ===== FRAME =====

    /// Push view/projection constants and update every actor
    pub fn update(&mut self, delta_time: f32) -> Result<()> {
        self.ensure_initialized("update")?;
        self.cb_never_changes
            .update_value(&mut self.device_context, &CbNeverChanges::new(*self.camera.view_matrix()))?;
        self.cb_change_on_resize
            .update_value(&mut self.device_context, &CbChangeOnResize::new(*self.camera.projection_matrix()))?;
        self.scene.update(delta_time, &mut self.device_context)
    }

    /// Clear, draw the scene and the overlay, then present
    pub fn render(&mut self) -> Result<()> {
        self.ensure_initialized("render")?;
        let context = &mut self.device_context;

        self.render_target_view
            .render(context, &self.depth_stencil_view, self.config.clear_color)?;
        self.viewport.render(context);
        self.depth_stencil_view.render(context)?;

        self.shader_program.render(context);
        self.cb_never_changes.render(context, CB_NEVER_CHANGES_SLOT, false);
        self.cb_change_on_resize.render(context, CB_CHANGE_ON_RESIZE_SLOT, false);

        self.scene.render(context)?;

        if let Some(overlay) = self.overlay.as_mut() {
            self.session.validate_selection(self.scene.len());
            overlay.compose(&mut self.session, &mut self.scene);
            overlay.submit(context)?;
        }

        self.swap_chain.present(self.config.graphics.vsync)
    }

    /// Run one frame of `delta_time` seconds
    pub fn frame(&mut self, delta_time: f32) -> Result<()> {
        self.session.record_frame(delta_time);
        self.update(delta_time)?;
        self.render()
    }

    /// Run one frame timed by the internal clock
    pub fn tick(&mut self) -> Result<()> {
        let delta_time = self.timer.tick();
        self.frame(delta_time)
    }

    /// Rebuild everything that depends on the back buffer size
    ///
    /// A zero size (minimized window) is ignored.
    pub fn resize(&mut self, width: u32, height: u32) -> Result<()> {
        if !self.initialized || width == 0 || height == 0 {
            return Ok(());
        }
        if width == self.swap_chain.width() && height == self.swap_chain.height() {
            return Ok(());
        }

        self.device.wait_idle()?;
        self.device_context.om_set_render_targets(&[], None);
        self.render_target_view.destroy();
        self.depth_stencil_view.destroy();
        self.depth_stencil.destroy();

        self.swap_chain.resize(width, height, &mut self.back_buffer)?;
        self.init_size_dependent(width, height)?;

        self.camera.set_aspect_ratio(self.viewport.aspect_ratio());
        self.cb_change_on_resize
            .update_value(&mut self.device_context, &CbChangeOnResize::new(*self.camera.projection_matrix()))?;

        crate::engine_debug!("monaco::Application", "Resized to {}x{}", width, height);
        Ok(())
    }

    // ===== DESTROY =====

    /// Release everything in reverse dependency order (idempotent)
    pub fn destroy(&mut self) {
        if let Some(mut overlay) = self.overlay.take() {
            overlay.shutdown();
        }
        if self.device.is_valid() {
            if let Err(e) = self.device.wait_idle() {
                crate::engine_warn!("monaco::Application", "wait_idle failed during destroy: {}", e);
            }
        }
        if self.device_context.is_valid() {
            self.device_context.clear_state();
        }

        self.cb_never_changes.destroy();
        self.cb_change_on_resize.destroy();
        self.scene.destroy();
        self.resources.unload_all();
        self.shader_program.destroy();
        self.depth_stencil.destroy();
        self.depth_stencil_view.destroy();
        self.render_target_view.destroy();
        self.swap_chain.destroy();
        self.back_buffer.destroy();
        self.device_context.destroy();
        self.device.destroy();

        if self.initialized {
            crate::engine_info!("monaco::Application", "Destroyed");
        }
        self.initialized = false;
    }

    fn ensure_initialized(&self, operation: &str) -> Result<()> {
        if !self.initialized {
            crate::engine_bail!("monaco::Application", InvalidArgument:
                "{} called before init", operation);
        }
        Ok(())
    }

    // ===== ACCESSORS =====

    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    pub fn camera(&self) -> &Camera {
        &self.camera
    }

    pub fn camera_mut(&mut self) -> &mut Camera {
        &mut self.camera
    }

    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    pub fn scene_mut(&mut self) -> &mut Scene {
        &mut self.scene
    }

    pub fn resources(&self) -> &ResourceManager {
        &self.resources
    }

    pub fn session(&self) -> &EditorSession {
        &self.session
    }

    pub fn session_mut(&mut self) -> &mut EditorSession {
        &mut self.session
    }

    pub fn device(&self) -> &Device {
        &self.device
    }

    /// Set vertical sync for the following presents
    pub fn set_vsync(&mut self, vsync: bool) {
        self.config.graphics.vsync = vsync;
    }
}

impl Drop for Application {
    fn drop(&mut self) {
        self.destroy();
    }
}

#[cfg(test)]
#[path = "application_tests.rs"]
mod tests;
