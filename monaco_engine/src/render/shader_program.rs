/// ShaderProgram - vertex + pixel shader pair with its input layout

use std::sync::Arc;

use crate::error::Result;
use crate::graphics_device::{self as gd, InputElementDesc, ShaderStage};
use crate::render::{Device, DeviceContext, InputLayout};

/// Vertex shader entry point in the combined shader file
pub const VERTEX_ENTRY_POINT: &str = "VS";
/// Pixel shader entry point in the combined shader file
pub const PIXEL_ENTRY_POINT: &str = "PS";

/// Shaders built from one combined source file
///
/// `init` compiles the vertex stage, builds the input layout from its
/// bytecode, then compiles the pixel stage. Any failure aborts with the
/// compiler's diagnostic and leaves the program empty.
#[derive(Default)]
pub struct ShaderProgram {
    file_name: String,
    vertex_shader: Option<Arc<dyn gd::VertexShader>>,
    pixel_shader: Option<Arc<dyn gd::PixelShader>>,
    input_layout: InputLayout,
}

impl ShaderProgram {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn init(&mut self, device: &Device, file_name: &str, layout: &[InputElementDesc]) -> Result<()> {
        if file_name.is_empty() {
            crate::engine_bail!("monaco::ShaderProgram", InvalidArgument: "Shader file name is empty");
        }

        let vs_bytecode = device
            .compile_shader(file_name, VERTEX_ENTRY_POINT, ShaderStage::Vertex)
            .map_err(|e| compile_error(file_name, VERTEX_ENTRY_POINT, e))?;
        let vertex_shader = device.create_vertex_shader(&vs_bytecode)?;

        let mut input_layout = InputLayout::new();
        input_layout.init(device, layout, &vs_bytecode)?;

        let ps_bytecode = device
            .compile_shader(file_name, PIXEL_ENTRY_POINT, ShaderStage::Pixel)
            .map_err(|e| compile_error(file_name, PIXEL_ENTRY_POINT, e))?;
        let pixel_shader = device.create_pixel_shader(&ps_bytecode)?;

        crate::engine_info!("monaco::ShaderProgram",
            "Shader program '{}' ready ({} input elements)", file_name, layout.len());

        self.file_name = file_name.to_string();
        self.vertex_shader = Some(vertex_shader);
        self.pixel_shader = Some(pixel_shader);
        self.input_layout = input_layout;
        Ok(())
    }

    pub fn is_valid(&self) -> bool {
        self.vertex_shader.is_some() && self.pixel_shader.is_some()
    }

    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    pub fn input_layout(&self) -> &InputLayout {
        &self.input_layout
    }

    /// Bind input layout, vertex shader and pixel shader
    pub fn render(&self, device_context: &mut DeviceContext) {
        if !self.is_valid() {
            crate::engine_error!("monaco::ShaderProgram", "render on an uninitialized shader program");
            return;
        }
        self.input_layout.render(device_context);
        device_context.vs_set_shader(self.vertex_shader.as_ref());
        device_context.ps_set_shader(self.pixel_shader.as_ref());
    }

    /// Release shaders and layout (idempotent)
    pub fn destroy(&mut self) {
        self.input_layout.destroy();
        self.vertex_shader = None;
        self.pixel_shader = None;
    }
}

fn compile_error(file_name: &str, entry_point: &str, error: crate::error::Error) -> crate::error::Error {
    crate::engine_err!("monaco::ShaderProgram", InitializationFailed:
        "Compiling '{}' entry point {} failed: {}", file_name, entry_point, error)
}

#[cfg(test)]
#[path = "shader_program_tests.rs"]
mod tests;
