/// SamplerState - texture sampler bound to the pixel shader

use std::sync::Arc;

use crate::error::Result;
use crate::graphics_device::{self as gd, SamplerDesc};
use crate::render::{Device, DeviceContext};

#[derive(Default)]
pub struct SamplerState {
    sampler: Option<Arc<dyn gd::SamplerState>>,
}

impl SamplerState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create the default sampler: linear filtering, wrap addressing,
    /// full LOD range
    pub fn init(&mut self, device: &Device) -> Result<()> {
        self.init_with_desc(device, &SamplerDesc::default())
    }

    pub fn init_with_desc(&mut self, device: &Device, desc: &SamplerDesc) -> Result<()> {
        self.sampler = Some(device.create_sampler_state(desc)?);
        Ok(())
    }

    pub fn is_valid(&self) -> bool {
        self.sampler.is_some()
    }

    pub fn desc(&self) -> Option<&SamplerDesc> {
        self.sampler.as_ref().map(|sampler| sampler.desc())
    }

    /// Bind to pixel shader sampler slot `start_slot`
    pub fn render(&self, device_context: &mut DeviceContext, start_slot: u32) {
        match &self.sampler {
            Some(sampler) => device_context.ps_set_samplers(start_slot, std::slice::from_ref(sampler)),
            None => crate::engine_error!("monaco::SamplerState", "render on an uninitialized sampler"),
        }
    }

    /// Release the sampler (idempotent)
    pub fn destroy(&mut self) {
        self.sampler = None;
    }
}
