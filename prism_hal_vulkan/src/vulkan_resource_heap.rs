/// VulkanResourceHeap - Vulkan implementation of the ResourceHeap trait
///
/// Realises a `ResourceHeapPlan` with one descriptor pool sized exactly for
/// the heap, one descriptor set allocated from it, and one batched
/// descriptor update.

use prism_hal::prism::{Error, Result};
use prism_hal::prism::render::{NativeHandle, PipelineLayout, ResourceHeap, ResourceHeapDesc};
use prism_hal::prism::descriptor::{DescriptorResource, ResourceHeapPlan};
use prism_hal::{hal_err, hal_trace};
use ash::vk;
use ash::vk::Handle;
use std::sync::Arc;

use crate::vulkan_context::GpuContext;
use crate::vulkan_types::descriptor_type_to_vk;

pub struct VulkanResourceHeap {
    ctx: Arc<GpuContext>,
    pipeline_layout: Arc<dyn PipelineLayout>,
    descriptor_pool: vk::DescriptorPool,
    descriptor_sets: Vec<NativeHandle>,
}

/// Native info referenced by one descriptor write
enum WriteInfo {
    Image(vk::DescriptorImageInfo),
    Buffer(vk::DescriptorBufferInfo),
}

/// Descriptor-set layout the heap's set is allocated with
///
/// Fails with `MissingPipelineLayout` without a layout and with
/// `IncompatiblePipelineLayout` for a layout of another backend.
fn descriptor_set_layout(desc: &ResourceHeapDesc<'_>) -> Result<vk::DescriptorSetLayout> {
    let layout = desc.pipeline_layout.as_ref().ok_or(Error::MissingPipelineLayout)?;
    let set_layout = layout.native_set_layout().ok_or_else(|| {
        Error::IncompatiblePipelineLayout("pipeline layout has no Vulkan descriptor set layout".to_string())
    })?;
    Ok(vk::DescriptorSetLayout::from_raw(set_layout.0))
}

impl VulkanResourceHeap {
    /// Build a resource heap
    ///
    /// # Errors
    ///
    /// - `MissingPipelineLayout` without a pipeline layout
    /// - `IncompatiblePipelineLayout` if the layout has no Vulkan
    ///   descriptor-set layout
    /// - any error of `ResourceHeapPlan::new`
    pub fn new(ctx: Arc<GpuContext>, desc: &ResourceHeapDesc<'_>) -> Result<Self> {
        let set_layout = descriptor_set_layout(desc)?;
        let plan = ResourceHeapPlan::new(desc)?;

        let pool_sizes: Vec<vk::DescriptorPoolSize> = plan
            .pool_sizes()
            .iter()
            .map(|size| vk::DescriptorPoolSize {
                ty: descriptor_type_to_vk(size.ty),
                descriptor_count: size.count,
            })
            .collect();

        let mut heap = unsafe {
            let pool_create_info = vk::DescriptorPoolCreateInfo::default()
                .max_sets(1)
                .pool_sizes(&pool_sizes);

            let descriptor_pool = ctx.device.create_descriptor_pool(&pool_create_info, None)
                .map_err(|e| hal_err!("prism::vulkan", "Failed to create descriptor pool: {:?}", e))?;

            // From here on Drop destroys the pool if a later step fails
            Self {
                ctx: Arc::clone(&ctx),
                pipeline_layout: Arc::clone(plan.pipeline_layout()),
                descriptor_pool,
                descriptor_sets: Vec::with_capacity(1),
            }
        };

        let descriptor_set = unsafe {
            let layouts = [set_layout];
            let allocate_info = vk::DescriptorSetAllocateInfo::default()
                .descriptor_pool(heap.descriptor_pool)
                .set_layouts(&layouts);

            ctx.device.allocate_descriptor_sets(&allocate_info)
                .map_err(|e| hal_err!("prism::vulkan", "Failed to allocate descriptor set: {:?}", e))?[0]
        };
        heap.descriptor_sets.push(NativeHandle(descriptor_set.as_raw()));

        // Infos first, so the writes can point into a vector that no longer grows
        let infos: Vec<WriteInfo> = plan
            .writes()
            .iter()
            .map(|write| match write.resource {
                DescriptorResource::Sampler(sampler) => WriteInfo::Image(
                    vk::DescriptorImageInfo::default()
                        .sampler(vk::Sampler::from_raw(sampler.0))
                        .image_layout(vk::ImageLayout::UNDEFINED),
                ),
                DescriptorResource::Image { view } => WriteInfo::Image(
                    vk::DescriptorImageInfo::default()
                        .image_view(vk::ImageView::from_raw(view.0))
                        .image_layout(vk::ImageLayout::SHADER_READ_ONLY_OPTIMAL),
                ),
                DescriptorResource::Buffer { buffer, range } => WriteInfo::Buffer(
                    vk::DescriptorBufferInfo::default()
                        .buffer(vk::Buffer::from_raw(buffer.0))
                        .offset(0)
                        .range(range),
                ),
            })
            .collect();

        let writes: Vec<vk::WriteDescriptorSet> = plan
            .writes()
            .iter()
            .zip(&infos)
            .map(|(write, info)| {
                let vk_write = vk::WriteDescriptorSet::default()
                    .dst_set(descriptor_set)
                    .dst_binding(write.dst_binding)
                    .dst_array_element(0)
                    .descriptor_type(descriptor_type_to_vk(write.descriptor_type));
                match info {
                    WriteInfo::Image(image_info) => vk_write.image_info(std::slice::from_ref(image_info)),
                    WriteInfo::Buffer(buffer_info) => vk_write.buffer_info(std::slice::from_ref(buffer_info)),
                }
            })
            .collect();

        if !writes.is_empty() {
            unsafe {
                ctx.device.update_descriptor_sets(&writes, &[]);
            }
        }

        hal_trace!("prism::vulkan", "Created resource heap with {} descriptors", writes.len());
        Ok(heap)
    }
}

impl ResourceHeap for VulkanResourceHeap {
    fn native_pipeline_layout(&self) -> NativeHandle {
        self.pipeline_layout.native_handle()
    }

    fn native_descriptor_sets(&self) -> &[NativeHandle] {
        &self.descriptor_sets
    }
}

impl Drop for VulkanResourceHeap {
    fn drop(&mut self) {
        unsafe {
            // Frees the descriptor set with it
            self.ctx.device.destroy_descriptor_pool(self.descriptor_pool, None);
        }
    }
}
