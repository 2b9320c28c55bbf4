/// VulkanSampler - Vulkan implementation of the Sampler trait

use prism_hal::prism::Result;
use prism_hal::prism::render::{NativeHandle, Sampler, SamplerDesc};
use prism_hal::{hal_err, hal_warn};
use ash::vk;
use ash::vk::Handle;
use std::sync::Arc;

use crate::vulkan_context::GpuContext;
use crate::vulkan_types::{address_mode_to_vk, filter_to_vk, mipmap_mode_to_vk};

pub struct VulkanSampler {
    ctx: Arc<GpuContext>,
    pub(crate) sampler: vk::Sampler,
}

impl VulkanSampler {
    pub fn new(ctx: Arc<GpuContext>, desc: &SamplerDesc) -> Result<Self> {
        let address = address_mode_to_vk(desc.address_mode);

        let mut create_info = vk::SamplerCreateInfo::default()
            .mag_filter(filter_to_vk(desc.mag_filter))
            .min_filter(filter_to_vk(desc.min_filter))
            .mipmap_mode(mipmap_mode_to_vk(desc.mip_filter))
            .address_mode_u(address)
            .address_mode_v(address)
            .address_mode_w(address)
            .mip_lod_bias(0.0)
            .min_lod(0.0)
            .max_lod(vk::LOD_CLAMP_NONE)
            .border_color(vk::BorderColor::FLOAT_OPAQUE_BLACK)
            .unnormalized_coordinates(false)
            .compare_enable(false)
            .compare_op(vk::CompareOp::ALWAYS);

        if desc.max_anisotropy > 1.0 && ctx.max_sampler_anisotropy > 1.0 {
            create_info = create_info
                .anisotropy_enable(true)
                .max_anisotropy(desc.max_anisotropy.min(ctx.max_sampler_anisotropy));
        } else {
            if desc.max_anisotropy > 1.0 {
                hal_warn!("prism::vulkan", "Anisotropic filtering is not supported, sampler falls back to {:?} filtering", desc.min_filter);
            }
            create_info = create_info
                .anisotropy_enable(false)
                .max_anisotropy(1.0);
        }

        let sampler = unsafe {
            ctx.device.create_sampler(&create_info, None)
                .map_err(|e| hal_err!("prism::vulkan", "Failed to create sampler: {:?}", e))?
        };

        Ok(Self { ctx, sampler })
    }
}

impl Sampler for VulkanSampler {
    fn native_handle(&self) -> NativeHandle {
        NativeHandle(self.sampler.as_raw())
    }
}

impl Drop for VulkanSampler {
    fn drop(&mut self) {
        unsafe {
            self.ctx.device.destroy_sampler(self.sampler, None);
        }
    }
}
