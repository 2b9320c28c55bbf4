/// VulkanPipelineLayout - descriptor-set layout plus pipeline layout

use prism_hal::prism::Result;
use prism_hal::prism::render::{BindingDesc, NativeHandle, PipelineLayout, PipelineLayoutDesc};
use prism_hal::hal_err;
use ash::vk;
use ash::vk::Handle;
use std::sync::Arc;

use crate::vulkan_context::GpuContext;
use crate::vulkan_types::{resource_type_to_vk_descriptor, stage_flags_to_vk};

/// Pipeline layout with a single descriptor set
///
/// Every binding becomes one descriptor at its slot in set 0. The
/// destination bindings are the binding slots in declaration order.
pub struct VulkanPipelineLayout {
    ctx: Arc<GpuContext>,
    bindings: Vec<BindingDesc>,
    dst_bindings: Vec<u32>,
    pub(crate) set_layout: vk::DescriptorSetLayout,
    pub(crate) pipeline_layout: vk::PipelineLayout,
}

impl VulkanPipelineLayout {
    pub fn new(ctx: Arc<GpuContext>, desc: &PipelineLayoutDesc) -> Result<Self> {
        let vk_bindings = desc
            .bindings
            .iter()
            .map(|binding| {
                resource_type_to_vk_descriptor(binding.resource_type).map(|descriptor_type| {
                    vk::DescriptorSetLayoutBinding::default()
                        .binding(binding.slot)
                        .descriptor_type(descriptor_type)
                        .descriptor_count(1)
                        .stage_flags(stage_flags_to_vk(binding.stage_flags))
                })
            })
            .collect::<Result<Vec<_>>>()?;

        let mut layout = Self {
            ctx: Arc::clone(&ctx),
            bindings: desc.bindings.clone(),
            dst_bindings: desc.bindings.iter().map(|binding| binding.slot).collect(),
            set_layout: vk::DescriptorSetLayout::null(),
            pipeline_layout: vk::PipelineLayout::null(),
        };

        unsafe {
            let set_layout_info = vk::DescriptorSetLayoutCreateInfo::default()
                .bindings(&vk_bindings);

            layout.set_layout = ctx.device.create_descriptor_set_layout(&set_layout_info, None)
                .map_err(|e| hal_err!("prism::vulkan", "Failed to create descriptor set layout: {:?}", e))?;

            let pipeline_layout_info = vk::PipelineLayoutCreateInfo::default()
                .set_layouts(std::slice::from_ref(&layout.set_layout));

            layout.pipeline_layout = ctx.device.create_pipeline_layout(&pipeline_layout_info, None)
                .map_err(|e| hal_err!("prism::vulkan", "Failed to create pipeline layout: {:?}", e))?;
        }

        Ok(layout)
    }
}

impl PipelineLayout for VulkanPipelineLayout {
    fn bindings(&self) -> &[BindingDesc] {
        &self.bindings
    }

    fn dst_bindings(&self) -> &[u32] {
        &self.dst_bindings
    }

    fn native_handle(&self) -> NativeHandle {
        NativeHandle(self.pipeline_layout.as_raw())
    }

    fn native_set_layout(&self) -> Option<NativeHandle> {
        Some(NativeHandle(self.set_layout.as_raw()))
    }
}

impl Drop for VulkanPipelineLayout {
    fn drop(&mut self) {
        unsafe {
            if self.pipeline_layout != vk::PipelineLayout::null() {
                self.ctx.device.destroy_pipeline_layout(self.pipeline_layout, None);
            }
            if self.set_layout != vk::DescriptorSetLayout::null() {
                self.ctx.device.destroy_descriptor_set_layout(self.set_layout, None);
            }
        }
    }
}
