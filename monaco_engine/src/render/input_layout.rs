/// InputLayout - vertex buffer layout bound to the vertex shader inputs

use std::sync::Arc;

use crate::error::Result;
use crate::graphics_device::{self as gd, InputElementDesc, ShaderBytecode};
use crate::render::{Device, DeviceContext};

#[derive(Default)]
pub struct InputLayout {
    layout: Option<Arc<dyn gd::InputLayout>>,
}

impl InputLayout {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a layout for `elements`, validated against the vertex shader
    pub fn init(&mut self, device: &Device, elements: &[InputElementDesc], vertex_bytecode: &ShaderBytecode) -> Result<()> {
        if elements.is_empty() {
            crate::engine_bail!("monaco::InputLayout", InvalidArgument: "Input layout has no elements");
        }
        self.layout = Some(device.create_input_layout(elements, vertex_bytecode)?);
        Ok(())
    }

    pub fn is_valid(&self) -> bool {
        self.layout.is_some()
    }

    /// Elements with resolved offsets
    pub fn elements(&self) -> &[InputElementDesc] {
        self.layout.as_ref().map(|layout| layout.elements()).unwrap_or(&[])
    }

    pub fn render(&self, device_context: &mut DeviceContext) {
        match &self.layout {
            Some(layout) => device_context.ia_set_input_layout(Some(layout)),
            None => crate::engine_error!("monaco::InputLayout", "render on an uninitialized layout"),
        }
    }

    /// Release the layout (idempotent)
    pub fn destroy(&mut self) {
        self.layout = None;
    }
}
