/// Shader stages, compiled bytecode, input layout description and validation

use std::any::Any;
use crate::error::Result;
use crate::graphics_device::Format;

/// Sentinel offset: place the element right after the previous one in its slot
pub const APPEND_ALIGNED_ELEMENT: u32 = u32::MAX;

/// Programmable pipeline stage
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ShaderStage {
    Vertex,
    Pixel,
}

/// Scalar type of a shader input or vertex element
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScalarKind {
    Float,
    Int,
    Uint,
}

/// One entry of a vertex shader's input signature
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignatureElement {
    /// Input location (element index in the input layout)
    pub location: u32,
    /// Number of components declared by the shader
    pub component_count: u32,
    /// Scalar type declared by the shader
    pub scalar: ScalarKind,
    /// Variable name when the bytecode keeps debug names
    pub name: Option<String>,
}

/// Compiled shader blob for one entry point
///
/// Kept only until the shader object (and, for vertex shaders, the input
/// layout) has been created from it.
#[derive(Debug, Clone)]
pub struct ShaderBytecode {
    /// File the blob was produced from
    pub source_name: String,
    /// Entry point inside the file
    pub entry_point: String,
    /// Stage the entry point was compiled for
    pub stage: ShaderStage,
    /// Backend bytecode (SPIR-V words as bytes for Vulkan)
    pub code: Vec<u8>,
    /// Input signature (empty for pixel shaders)
    pub input_signature: Vec<SignatureElement>,
}

/// Native vertex shader object
pub trait VertexShader: Send + Sync {
    /// Entry point the shader was created from
    fn entry_point(&self) -> &str;

    /// Backend downcast hook
    fn as_any(&self) -> &dyn Any;
}

/// Native pixel shader object
pub trait PixelShader: Send + Sync {
    /// Entry point the shader was created from
    fn entry_point(&self) -> &str;

    /// Backend downcast hook
    fn as_any(&self) -> &dyn Any;
}

/// One element of an input layout
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InputElementDesc {
    /// HLSL-style semantic (POSITION, TEXCOORD, ...)
    pub semantic_name: String,
    /// Semantic index (TEXCOORD1 -> 1)
    pub semantic_index: u32,
    /// Element format
    pub format: Format,
    /// Vertex buffer slot the element is read from
    pub input_slot: u32,
    /// Byte offset in the vertex, or APPEND_ALIGNED_ELEMENT
    pub aligned_byte_offset: u32,
}

impl InputElementDesc {
    /// Per-vertex element in slot 0 appended after the previous element
    pub fn new(semantic_name: &str, format: Format) -> Self {
        Self {
            semantic_name: semantic_name.to_string(),
            semantic_index: 0,
            format,
            input_slot: 0,
            aligned_byte_offset: APPEND_ALIGNED_ELEMENT,
        }
    }
}

/// Native input layout object
pub trait InputLayout: Send + Sync {
    /// Elements with resolved byte offsets
    fn elements(&self) -> &[InputElementDesc];

    /// Backend downcast hook
    fn as_any(&self) -> &dyn Any;
}

impl Format {
    /// Scalar type used when the format feeds a shader input
    pub fn scalar_kind(&self) -> Option<ScalarKind> {
        match self {
            Format::R32_FLOAT
            | Format::R32G32_FLOAT
            | Format::R32G32B32_FLOAT
            | Format::R32G32B32A32_FLOAT
            | Format::R8G8B8A8_UNORM
            | Format::R8G8B8A8_UNORM_SRGB
            | Format::B8G8R8A8_UNORM => Some(ScalarKind::Float),
            Format::R16_UINT | Format::R32_UINT => Some(ScalarKind::Uint),
            _ => None,
        }
    }
}

/// Replace APPEND_ALIGNED_ELEMENT offsets by concrete ones, per input slot
pub fn resolve_element_offsets(elements: &[InputElementDesc]) -> Vec<InputElementDesc> {
    let mut next_offset: Vec<(u32, u32)> = Vec::new();
    elements
        .iter()
        .map(|element| {
            let index = match next_offset.iter().position(|(slot, _)| *slot == element.input_slot) {
                Some(index) => index,
                None => {
                    next_offset.push((element.input_slot, 0));
                    next_offset.len() - 1
                }
            };
            let cursor = &mut next_offset[index];
            let offset = if element.aligned_byte_offset == APPEND_ALIGNED_ELEMENT {
                cursor.1
            } else {
                element.aligned_byte_offset
            };
            cursor.1 = offset + element.format.size_bytes();

            InputElementDesc {
                aligned_byte_offset: offset,
                ..element.clone()
            }
        })
        .collect()
}

/// Validate an input layout against a vertex shader input signature
///
/// Element `i` feeds shader input location `i`. Every location the shader
/// reads must be provided with a matching scalar type; extra elements are
/// allowed and simply not consumed.
pub fn validate_input_layout(
    elements: &[InputElementDesc],
    signature: &[SignatureElement],
) -> Result<()> {
    if elements.is_empty() {
        crate::engine_bail!("monaco::InputLayout", InvalidArgument:
            "Input layout has no elements");
    }

    for (index, element) in elements.iter().enumerate() {
        if element.semantic_name.is_empty() {
            crate::engine_bail!("monaco::InputLayout", InvalidArgument:
                "Input element {} has an empty semantic name", index);
        }
        if element.format.scalar_kind().is_none() {
            crate::engine_bail!("monaco::InputLayout", InvalidArgument:
                "Input element '{}' uses non-vertex format {:?}",
                element.semantic_name, element.format);
        }
    }

    for input in signature {
        let element = elements.get(input.location as usize).ok_or_else(|| {
            crate::engine_err!("monaco::InputLayout", InvalidResource:
                "Vertex shader reads location {} ({}) but the layout only has {} elements",
                input.location,
                input.name.as_deref().unwrap_or("unnamed"),
                elements.len())
        })?;

        if element.format.scalar_kind() != Some(input.scalar) {
            crate::engine_bail!("monaco::InputLayout", InvalidResource:
                "Element '{}' ({:?}) does not match shader input {} of type {:?}",
                element.semantic_name, element.format, input.location, input.scalar);
        }
    }

    Ok(())
}

#[cfg(test)]
#[path = "shader_tests.rs"]
mod tests;
