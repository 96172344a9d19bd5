/// Graphics pipelines built on demand from the bound context state

use std::sync::Arc;
use ash::vk;
use rustc_hash::FxHashMap;
use monaco_engine::monaco::Result;
use monaco_engine::monaco::graphics::InputElementDesc;
use monaco_engine::{engine_debug, engine_err};

use crate::vulkan_context::GpuContext;
use crate::vulkan_format::format_to_vk;
use crate::vulkan_shader::VulkanShader;

/// Everything a pipeline depends on, in hashable form
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PipelineKey {
    pub vertex_module: u64,
    pub pixel_module: u64,
    pub input_layout: u64,
    pub topology: i32,
    /// (input slot, stride) for every slot the layout reads
    pub strides: Vec<(u32, u32)>,
    pub color_formats: Vec<i32>,
    /// vk::Format::UNDEFINED when no depth target is bound
    pub depth_format: i32,
    pub samples: u32,
}

/// Pipeline cache owned by the immediate context
pub struct PipelineCache {
    ctx: Arc<GpuContext>,
    pipelines: FxHashMap<PipelineKey, vk::Pipeline>,
}

impl PipelineCache {
    pub fn new(ctx: Arc<GpuContext>) -> Self {
        Self { ctx, pipelines: FxHashMap::default() }
    }

    pub fn len(&self) -> usize {
        self.pipelines.len()
    }

    /// Cached pipeline for `key`, created on first use
    pub fn get_or_create(
        &mut self,
        key: &PipelineKey,
        vertex_shader: &VulkanShader,
        pixel_shader: &VulkanShader,
        elements: &[InputElementDesc],
    ) -> Result<vk::Pipeline> {
        if let Some(&pipeline) = self.pipelines.get(key) {
            return Ok(pipeline);
        }

        let pipeline = self.create(key, vertex_shader, pixel_shader, elements)?;
        self.pipelines.insert(key.clone(), pipeline);
        engine_debug!("monaco::vulkan::PipelineCache",
            "Created pipeline #{} ({} vertex elements)", self.pipelines.len(), elements.len());
        Ok(pipeline)
    }

    fn create(
        &self,
        key: &PipelineKey,
        vertex_shader: &VulkanShader,
        pixel_shader: &VulkanShader,
        elements: &[InputElementDesc],
    ) -> Result<vk::Pipeline> {
        let stages = [
            vk::PipelineShaderStageCreateInfo::default()
                .stage(vk::ShaderStageFlags::VERTEX)
                .module(vertex_shader.module)
                .name(&vertex_shader.entry_point),
            vk::PipelineShaderStageCreateInfo::default()
                .stage(vk::ShaderStageFlags::FRAGMENT)
                .module(pixel_shader.module)
                .name(&pixel_shader.entry_point),
        ];

        let bindings: Vec<vk::VertexInputBindingDescription> = key
            .strides
            .iter()
            .map(|&(slot, stride)| vk::VertexInputBindingDescription {
                binding: slot,
                stride,
                input_rate: vk::VertexInputRate::VERTEX,
            })
            .collect();
        let attributes: Vec<vk::VertexInputAttributeDescription> = elements
            .iter()
            .enumerate()
            .map(|(location, element)| vk::VertexInputAttributeDescription {
                location: location as u32,
                binding: element.input_slot,
                format: format_to_vk(element.format),
                offset: element.aligned_byte_offset,
            })
            .collect();
        let vertex_input = vk::PipelineVertexInputStateCreateInfo::default()
            .vertex_binding_descriptions(&bindings)
            .vertex_attribute_descriptions(&attributes);

        let input_assembly = vk::PipelineInputAssemblyStateCreateInfo::default()
            .topology(vk::PrimitiveTopology::from_raw(key.topology));

        let viewport_state = vk::PipelineViewportStateCreateInfo::default()
            .viewport_count(1)
            .scissor_count(1);

        // Clockwise front faces, as with the default D3D rasterizer state
        let rasterization = vk::PipelineRasterizationStateCreateInfo::default()
            .polygon_mode(vk::PolygonMode::FILL)
            .cull_mode(vk::CullModeFlags::BACK)
            .front_face(vk::FrontFace::CLOCKWISE)
            .line_width(1.0);

        let multisample = vk::PipelineMultisampleStateCreateInfo::default()
            .rasterization_samples(vk::SampleCountFlags::from_raw(key.samples));

        let has_depth = key.depth_format != vk::Format::UNDEFINED.as_raw();
        let depth_stencil = vk::PipelineDepthStencilStateCreateInfo::default()
            .depth_test_enable(has_depth)
            .depth_write_enable(has_depth)
            .depth_compare_op(vk::CompareOp::LESS);

        let blend_attachments: Vec<vk::PipelineColorBlendAttachmentState> = key
            .color_formats
            .iter()
            .map(|_| vk::PipelineColorBlendAttachmentState::default()
                .color_write_mask(vk::ColorComponentFlags::RGBA))
            .collect();
        let color_blend = vk::PipelineColorBlendStateCreateInfo::default()
            .attachments(&blend_attachments);

        let dynamic_states = [vk::DynamicState::VIEWPORT, vk::DynamicState::SCISSOR];
        let dynamic_state = vk::PipelineDynamicStateCreateInfo::default()
            .dynamic_states(&dynamic_states);

        let color_formats: Vec<vk::Format> = key.color_formats.iter().map(|&f| vk::Format::from_raw(f)).collect();
        let depth_format = vk::Format::from_raw(key.depth_format);
        let stencil_format = if has_depth && has_stencil(depth_format) {
            depth_format
        } else {
            vk::Format::UNDEFINED
        };
        let mut rendering_info = vk::PipelineRenderingCreateInfo::default()
            .color_attachment_formats(&color_formats)
            .depth_attachment_format(depth_format)
            .stencil_attachment_format(stencil_format);

        let create_info = vk::GraphicsPipelineCreateInfo::default()
            .push_next(&mut rendering_info)
            .stages(&stages)
            .vertex_input_state(&vertex_input)
            .input_assembly_state(&input_assembly)
            .viewport_state(&viewport_state)
            .rasterization_state(&rasterization)
            .multisample_state(&multisample)
            .depth_stencil_state(&depth_stencil)
            .color_blend_state(&color_blend)
            .dynamic_state(&dynamic_state)
            .layout(self.ctx.pipeline_layout);

        let pipelines = unsafe {
            self.ctx.device
                .create_graphics_pipelines(vk::PipelineCache::null(), &[create_info], None)
                .map_err(|(_, e)| engine_err!("monaco::vulkan::PipelineCache",
                    "Failed to create graphics pipeline: {:?}", e))?
        };
        pipelines.into_iter().next()
            .ok_or_else(|| engine_err!("monaco::vulkan::PipelineCache", "Driver returned no pipeline"))
    }
}

/// True for combined depth/stencil formats
pub fn has_stencil(format: vk::Format) -> bool {
    matches!(
        format,
        vk::Format::D24_UNORM_S8_UINT | vk::Format::D32_SFLOAT_S8_UINT | vk::Format::D16_UNORM_S8_UINT
    )
}

impl Drop for PipelineCache {
    fn drop(&mut self) {
        unsafe {
            for (_, pipeline) in self.pipelines.drain() {
                self.ctx.device.destroy_pipeline(pipeline, None);
            }
        }
    }
}
