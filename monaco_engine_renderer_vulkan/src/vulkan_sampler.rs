/// Sampler - Vulkan implementation of the SamplerState trait

use std::any::Any;
use std::sync::Arc;
use ash::vk;
use monaco_engine::monaco::Result;
use monaco_engine::monaco::graphics::{Filter, SamplerDesc, SamplerState};
use monaco_engine::engine_err;

use crate::vulkan_context::GpuContext;
use crate::vulkan_format::{address_mode_to_vk, comparison_to_vk, filter_to_vk};

pub struct VulkanSampler {
    ctx: Arc<GpuContext>,
    pub(crate) sampler: vk::Sampler,
    desc: SamplerDesc,
}

impl VulkanSampler {
    pub(crate) fn new(ctx: Arc<GpuContext>, desc: &SamplerDesc) -> Result<Self> {
        let (filter, mipmap_mode) = filter_to_vk(desc.filter);
        let anisotropic = desc.filter == Filter::Anisotropic && desc.max_anisotropy > 1;
        let compare = comparison_to_vk(desc.comparison);

        let create_info = vk::SamplerCreateInfo::default()
            .mag_filter(filter)
            .min_filter(filter)
            .mipmap_mode(mipmap_mode)
            .address_mode_u(address_mode_to_vk(desc.address_u))
            .address_mode_v(address_mode_to_vk(desc.address_v))
            .address_mode_w(address_mode_to_vk(desc.address_w))
            .anisotropy_enable(anisotropic)
            .max_anisotropy(desc.max_anisotropy.max(1) as f32)
            .compare_enable(compare.is_some())
            .compare_op(compare.unwrap_or(vk::CompareOp::NEVER))
            .min_lod(desc.min_lod)
            .max_lod(desc.max_lod.min(vk::LOD_CLAMP_NONE))
            .border_color(vk::BorderColor::FLOAT_OPAQUE_BLACK);

        let sampler = unsafe {
            ctx.device.create_sampler(&create_info, None)
                .map_err(|e| engine_err!("monaco::vulkan::Sampler", "Failed to create sampler: {:?}", e))?
        };
        Ok(Self { ctx, sampler, desc: *desc })
    }
}

impl SamplerState for VulkanSampler {
    fn desc(&self) -> &SamplerDesc {
        &self.desc
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

impl Drop for VulkanSampler {
    fn drop(&mut self) {
        unsafe {
            self.ctx.device.destroy_sampler(self.sampler, None);
        }
    }
}
