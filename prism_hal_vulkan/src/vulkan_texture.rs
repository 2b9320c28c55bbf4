/// VulkanTexture - Vulkan implementation of the Texture trait

use prism_hal::prism::{Error, Result};
use prism_hal::prism::render::{NativeHandle, ResourceState, Texture, TextureDesc, TextureInfo, TrackedResource};
use prism_hal::{hal_debug, hal_err, hal_error};
use ash::vk;
use ash::vk::Handle;
use gpu_allocator::vulkan::{Allocation, AllocationCreateDesc, AllocationScheme};
use gpu_allocator::MemoryLocation;
use std::sync::Arc;

use crate::vulkan_context::GpuContext;
use crate::vulkan_types::{image_aspect_for_format, texture_format_to_vk};

/// 2D sampled Vulkan texture
///
/// The image is moved to `SHADER_READ_ONLY_OPTIMAL` at creation and stays
/// in that layout, which is the layout resource heaps reference it with.
pub struct VulkanTexture {
    ctx: Arc<GpuContext>,
    /// Vulkan image
    pub(crate) image: vk::Image,
    /// Vulkan image view
    pub(crate) view: vk::ImageView,
    /// GPU memory allocation
    allocation: Option<Allocation>,
    /// Read-only texture properties
    info: TextureInfo,
}

impl VulkanTexture {
    pub fn new(ctx: Arc<GpuContext>, desc: &TextureDesc) -> Result<Self> {
        if desc.width == 0 || desc.height == 0 {
            return Err(Error::InvalidResource(format!(
                "Texture extent must be non-zero (got {}x{})",
                desc.width, desc.height
            )));
        }

        let format = texture_format_to_vk(desc.format);
        let aspect_mask = image_aspect_for_format(desc.format);
        let mip_levels = desc.mip_levels.max(1);

        let mut usage_flags = vk::ImageUsageFlags::SAMPLED
            | vk::ImageUsageFlags::TRANSFER_SRC
            | vk::ImageUsageFlags::TRANSFER_DST;
        if desc.format.is_depth() {
            usage_flags |= vk::ImageUsageFlags::DEPTH_STENCIL_ATTACHMENT;
        }

        let subresource_range = vk::ImageSubresourceRange {
            aspect_mask,
            base_mip_level: 0,
            level_count: mip_levels,
            base_array_layer: 0,
            layer_count: 1,
        };

        // Build the struct as soon as the image exists so Drop releases
        // whatever was created if a later step fails.
        let mut texture = unsafe {
            let image_create_info = vk::ImageCreateInfo::default()
                .image_type(vk::ImageType::TYPE_2D)
                .format(format)
                .extent(vk::Extent3D {
                    width: desc.width,
                    height: desc.height,
                    depth: 1,
                })
                .mip_levels(mip_levels)
                .array_layers(1)
                .samples(vk::SampleCountFlags::TYPE_1)
                .tiling(vk::ImageTiling::OPTIMAL)
                .usage(usage_flags)
                .sharing_mode(vk::SharingMode::EXCLUSIVE)
                .initial_layout(vk::ImageLayout::UNDEFINED);

            let image = ctx.device.create_image(&image_create_info, None)
                .map_err(|e| hal_err!("prism::vulkan", "Failed to create texture image: {:?}", e))?;

            Self {
                ctx: Arc::clone(&ctx),
                image,
                view: vk::ImageView::null(),
                allocation: None,
                info: TextureInfo {
                    width: desc.width,
                    height: desc.height,
                    format: desc.format,
                    mip_levels,
                },
            }
        };

        unsafe {
            let requirements = ctx.device.get_image_memory_requirements(texture.image);

            let allocation = ctx
                .allocator
                .lock()
                .map_err(|_| Error::BackendError("GPU allocator lock poisoned".to_string()))?
                .allocate(&AllocationCreateDesc {
                    name: "texture",
                    requirements,
                    location: MemoryLocation::GpuOnly,
                    linear: false,
                    allocation_scheme: AllocationScheme::GpuAllocatorManaged,
                })
                .map_err(|_e| {
                    let size_mb = requirements.size as f64 / (1024.0 * 1024.0);
                    hal_error!("prism::vulkan", "Out of GPU memory for texture (size: {}x{}, {:.2} MB)", desc.width, desc.height, size_mb);
                    Error::OutOfMemory
                })?;

            let (memory, offset) = (allocation.memory(), allocation.offset());
            texture.allocation = Some(allocation);

            ctx.device.bind_image_memory(texture.image, memory, offset)
                .map_err(|e| hal_err!("prism::vulkan", "Failed to bind texture image memory: {:?}", e))?;

            let view_create_info = vk::ImageViewCreateInfo::default()
                .image(texture.image)
                .view_type(vk::ImageViewType::TYPE_2D)
                .format(format)
                .components(vk::ComponentMapping {
                    r: vk::ComponentSwizzle::IDENTITY,
                    g: vk::ComponentSwizzle::IDENTITY,
                    b: vk::ComponentSwizzle::IDENTITY,
                    a: vk::ComponentSwizzle::IDENTITY,
                })
                .subresource_range(subresource_range);

            texture.view = ctx.device.create_image_view(&view_create_info, None)
                .map_err(|e| hal_err!("prism::vulkan", "Failed to create texture image view: {:?}", e))?;
        }

        let image = texture.image;
        ctx.submit_one_shot(|device, command_buffer| unsafe {
            let barrier = vk::ImageMemoryBarrier::default()
                .old_layout(vk::ImageLayout::UNDEFINED)
                .new_layout(vk::ImageLayout::SHADER_READ_ONLY_OPTIMAL)
                .src_queue_family_index(vk::QUEUE_FAMILY_IGNORED)
                .dst_queue_family_index(vk::QUEUE_FAMILY_IGNORED)
                .image(image)
                .subresource_range(subresource_range)
                .src_access_mask(vk::AccessFlags::empty())
                .dst_access_mask(vk::AccessFlags::SHADER_READ);

            device.cmd_pipeline_barrier(
                command_buffer,
                vk::PipelineStageFlags::TOP_OF_PIPE,
                vk::PipelineStageFlags::ALL_GRAPHICS | vk::PipelineStageFlags::COMPUTE_SHADER,
                vk::DependencyFlags::empty(),
                &[],
                &[],
                std::slice::from_ref(&barrier),
            );
        })?;

        hal_debug!("prism::vulkan", "Created {}x{} texture ({:?}, {} mips)", desc.width, desc.height, desc.format, mip_levels);
        Ok(texture)
    }
}

impl TrackedResource for VulkanTexture {
    fn native_handle(&self) -> NativeHandle {
        NativeHandle(self.image.as_raw())
    }

    fn usage_state(&self) -> ResourceState {
        ResourceState::ShaderResource
    }
}

impl Texture for VulkanTexture {
    fn info(&self) -> &TextureInfo {
        &self.info
    }

    fn native_view(&self) -> NativeHandle {
        NativeHandle(self.view.as_raw())
    }
}

impl Drop for VulkanTexture {
    fn drop(&mut self) {
        unsafe {
            if self.view != vk::ImageView::null() {
                self.ctx.device.destroy_image_view(self.view, None);
            }

            if let Some(allocation) = self.allocation.take() {
                if let Ok(mut allocator) = self.ctx.allocator.lock() {
                    allocator.free(allocation).ok();
                }
            }

            self.ctx.device.destroy_image(self.image, None);
        }
    }
}
