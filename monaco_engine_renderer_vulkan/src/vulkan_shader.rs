/// Shaders and input layouts - Vulkan implementation of the shader traits
///
/// The combined shader file is a SPIR-V module holding both the `VS` and `PS`
/// entry points. "Compiling" an entry point loads the module and checks the
/// entry point with spirq reflection.

use std::any::Any;
use std::ffi::CString;
use std::io::Cursor;
use std::sync::Arc;
use ash::vk;
use monaco_engine::monaco::Result;
use monaco_engine::monaco::graphics::{
    InputElementDesc, InputLayout, PixelShader, ScalarKind, ShaderBytecode, ShaderStage,
    SignatureElement, VertexShader,
};
use monaco_engine::{engine_bail, engine_err};

use crate::vulkan_context::GpuContext;

/// Load `file_name` and reflect `entry_point` for `stage`
pub(crate) fn compile_shader(file_name: &str, entry_point: &str, stage: ShaderStage) -> Result<ShaderBytecode> {
    let bytes = std::fs::read(file_name).map_err(|e| {
        engine_err!("monaco::vulkan::Shader", AssetNotFound: "Cannot read shader '{}': {}", file_name, e)
    })?;
    let words = ash::util::read_spv(&mut Cursor::new(&bytes)).map_err(|e| {
        engine_err!("monaco::vulkan::Shader", ParseFailed: "'{}' is not SPIR-V: {}", file_name, e)
    })?;

    let input_signature = reflect_entry_point(file_name, &words, entry_point, stage)?;

    Ok(ShaderBytecode {
        source_name: file_name.to_string(),
        entry_point: entry_point.to_string(),
        stage,
        code: bytes,
        input_signature,
    })
}

/// Find `entry_point` for `stage` and return its vertex inputs (empty for pixel shaders)
pub(crate) fn reflect_entry_point(
    file_name: &str,
    words: &[u32],
    entry_point: &str,
    stage: ShaderStage,
) -> Result<Vec<SignatureElement>> {
    let entry_points = spirq::ReflectConfig::new()
        .spv(words)
        .ref_all_rscs(true)
        .reflect()
        .map_err(|e| engine_err!("monaco::vulkan::Shader", ParseFailed:
            "SPIR-V reflection of '{}' failed: {:?}", file_name, e))?;

    let expected_model = match stage {
        ShaderStage::Vertex => spirq::spirv::ExecutionModel::Vertex,
        ShaderStage::Pixel => spirq::spirv::ExecutionModel::Fragment,
    };
    let entry = entry_points
        .iter()
        .find(|ep| ep.name == entry_point && ep.exec_model == expected_model)
        .ok_or_else(|| engine_err!("monaco::vulkan::Shader", InvalidResource:
            "'{}' has no {:?} entry point named '{}'", file_name, stage, entry_point))?;

    if stage == ShaderStage::Pixel {
        return Ok(Vec::new());
    }

    let mut inputs: Vec<SignatureElement> = entry
        .vars
        .iter()
        .filter_map(|var| match var {
            spirq::var::Variable::Input { name, location, ty } => {
                let (scalar, component_count) = input_type(ty)?;
                Some(SignatureElement {
                    location: location.loc(),
                    component_count,
                    scalar,
                    name: name.clone(),
                })
            }
            _ => None,
        })
        .collect();
    inputs.sort_by_key(|input| input.location);
    Ok(inputs)
}

/// Scalar kind and component count of a vertex input type
fn input_type(ty: &spirq::ty::Type) -> Option<(ScalarKind, u32)> {
    use spirq::ty::Type;
    match ty {
        Type::Scalar(scalar) => Some((scalar_kind(scalar), 1)),
        Type::Vector(vector) => Some((scalar_kind(&vector.scalar_ty), vector.nscalar)),
        _ => None,
    }
}

fn scalar_kind(scalar_ty: &spirq::ty::ScalarType) -> ScalarKind {
    use spirq::ty::ScalarType;
    match scalar_ty {
        ScalarType::Integer { is_signed: true, .. } => ScalarKind::Int,
        ScalarType::Integer { is_signed: false, .. } => ScalarKind::Uint,
        _ => ScalarKind::Float,
    }
}

// ============================================================================
// Shader module
// ============================================================================

/// One entry point of a SPIR-V module
pub struct VulkanShader {
    ctx: Arc<GpuContext>,
    pub(crate) module: vk::ShaderModule,
    pub(crate) entry_point: CString,
    entry_name: String,
}

impl VulkanShader {
    pub(crate) fn new(ctx: Arc<GpuContext>, bytecode: &ShaderBytecode) -> Result<Self> {
        let entry_point = CString::new(bytecode.entry_point.as_str()).map_err(|_| {
            engine_err!("monaco::vulkan::Shader", InvalidArgument:
                "Entry point '{}' contains a NUL byte", bytecode.entry_point)
        })?;
        let words = ash::util::read_spv(&mut Cursor::new(&bytecode.code)).map_err(|e| {
            engine_err!("monaco::vulkan::Shader", ParseFailed:
                "Bytecode of '{}' is not SPIR-V: {}", bytecode.source_name, e)
        })?;

        let create_info = vk::ShaderModuleCreateInfo::default().code(&words);
        let module = unsafe {
            ctx.device.create_shader_module(&create_info, None)
                .map_err(|e| engine_err!("monaco::vulkan::Shader",
                    "Failed to create shader module for '{}': {:?}", bytecode.source_name, e))?
        };

        Ok(Self {
            ctx,
            module,
            entry_point,
            entry_name: bytecode.entry_point.clone(),
        })
    }
}

impl VertexShader for VulkanShader {
    fn entry_point(&self) -> &str {
        &self.entry_name
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

impl PixelShader for VulkanShader {
    fn entry_point(&self) -> &str {
        &self.entry_name
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

impl Drop for VulkanShader {
    fn drop(&mut self) {
        unsafe {
            self.ctx.device.destroy_shader_module(self.module, None);
        }
    }
}

/// Recover the Vulkan module behind an engine vertex shader
pub(crate) fn vulkan_vertex_shader(shader: &Arc<dyn VertexShader>) -> Result<&VulkanShader> {
    match shader.as_any().downcast_ref::<VulkanShader>() {
        Some(native) => Ok(native),
        None => engine_bail!("monaco::vulkan::Shader", InvalidResource:
            "Vertex shader was not created by the Vulkan backend"),
    }
}

/// Recover the Vulkan module behind an engine pixel shader
pub(crate) fn vulkan_pixel_shader(shader: &Arc<dyn PixelShader>) -> Result<&VulkanShader> {
    match shader.as_any().downcast_ref::<VulkanShader>() {
        Some(native) => Ok(native),
        None => engine_bail!("monaco::vulkan::Shader", InvalidResource:
            "Pixel shader was not created by the Vulkan backend"),
    }
}

// ============================================================================
// Input layout
// ============================================================================

/// Vertex input description
///
/// Element `i` feeds vertex input location `i`; pipelines are built from it
/// at draw time together with the bound vertex buffer strides.
pub struct VulkanInputLayout {
    pub(crate) id: u64,
    elements: Vec<InputElementDesc>,
}

impl VulkanInputLayout {
    pub(crate) fn new(id: u64, elements: &[InputElementDesc]) -> Self {
        Self { id, elements: elements.to_vec() }
    }
}

impl InputLayout for VulkanInputLayout {
    fn elements(&self) -> &[InputElementDesc] {
        &self.elements
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

#[cfg(test)]
#[path = "vulkan_shader_tests.rs"]
mod tests;
