/// VulkanBuffer - Vulkan implementation of the Buffer trait

use prism_hal::prism::{Error, Result};
use prism_hal::prism::render::{Buffer, BufferDesc, BufferUsage, NativeHandle, ResourceState, TrackedResource};
use prism_hal::{hal_err, hal_error};
use ash::vk;
use ash::vk::Handle;
use gpu_allocator::vulkan::{Allocation, AllocationCreateDesc, AllocationScheme};
use gpu_allocator::MemoryLocation;
use std::sync::Arc;

use crate::vulkan_context::GpuContext;
use crate::vulkan_types::buffer_usage_to_vk;

/// Device-local Vulkan buffer
///
/// Filled through the staging pool; the buffer can be the destination and
/// the source of buffer copies.
pub struct VulkanBuffer {
    /// Shared GPU context (device, allocator, queue, command pool)
    ctx: Arc<GpuContext>,
    /// Vulkan buffer
    pub(crate) buffer: vk::Buffer,
    /// GPU memory allocation
    allocation: Option<Allocation>,
    size: u64,
    usage: BufferUsage,
}

impl VulkanBuffer {
    /// Create a device-local buffer
    pub fn new(ctx: Arc<GpuContext>, desc: &BufferDesc) -> Result<Self> {
        let (buffer, allocation) = create_bound_buffer(
            &ctx,
            desc.size,
            buffer_usage_to_vk(desc.usage),
            MemoryLocation::GpuOnly,
            "buffer",
        )?;

        Ok(Self {
            ctx,
            buffer,
            allocation: Some(allocation),
            size: desc.size,
            usage: desc.usage,
        })
    }
}

/// Create a buffer and bind freshly allocated memory to it
///
/// Shared by device buffers and staging memory. On any failure the buffer
/// and its allocation are released before returning.
pub(crate) fn create_bound_buffer(
    ctx: &GpuContext,
    size: u64,
    usage: vk::BufferUsageFlags,
    location: MemoryLocation,
    name: &str,
) -> Result<(vk::Buffer, Allocation)> {
    unsafe {
        let buffer_create_info = vk::BufferCreateInfo::default()
            .size(size.max(1))
            .usage(usage)
            .sharing_mode(vk::SharingMode::EXCLUSIVE);

        let buffer = ctx.device.create_buffer(&buffer_create_info, None)
            .map_err(|e| hal_err!("prism::vulkan", "Failed to create {} of size {} bytes: {:?}", name, size, e))?;

        let requirements = ctx.device.get_buffer_memory_requirements(buffer);

        let allocation = {
            let mut allocator = match ctx.allocator.lock() {
                Ok(allocator) => allocator,
                Err(_) => {
                    ctx.device.destroy_buffer(buffer, None);
                    return Err(Error::BackendError("GPU allocator lock poisoned".to_string()));
                }
            };
            allocator.allocate(&AllocationCreateDesc {
                name,
                requirements,
                location,
                linear: true,
                allocation_scheme: AllocationScheme::GpuAllocatorManaged,
            })
        };

        let allocation = match allocation {
            Ok(allocation) => allocation,
            Err(_) => {
                let size_mb = requirements.size as f64 / (1024.0 * 1024.0);
                hal_error!("prism::vulkan", "Out of GPU memory for {} (required: {:.2} MB)", name, size_mb);
                ctx.device.destroy_buffer(buffer, None);
                return Err(Error::OutOfMemory);
            }
        };

        if let Err(e) = ctx.device.bind_buffer_memory(buffer, allocation.memory(), allocation.offset()) {
            if let Ok(mut allocator) = ctx.allocator.lock() {
                allocator.free(allocation).ok();
            }
            ctx.device.destroy_buffer(buffer, None);
            return Err(hal_err!("prism::vulkan", "Failed to bind {} memory: {:?}", name, e));
        }

        Ok((buffer, allocation))
    }
}

impl TrackedResource for VulkanBuffer {
    fn native_handle(&self) -> NativeHandle {
        NativeHandle(self.buffer.as_raw())
    }

    fn usage_state(&self) -> ResourceState {
        ResourceState::for_buffer_usage(self.usage)
    }
}

impl Buffer for VulkanBuffer {
    fn size(&self) -> u64 {
        self.size
    }

    fn usage(&self) -> BufferUsage {
        self.usage
    }
}

impl Drop for VulkanBuffer {
    fn drop(&mut self) {
        unsafe {
            // Free GPU memory
            if let Some(allocation) = self.allocation.take() {
                // Don't panic if lock fails - we still need to destroy the buffer
                if let Ok(mut allocator) = self.ctx.allocator.lock() {
                    allocator.free(allocation).ok();
                }
            }

            self.ctx.device.destroy_buffer(self.buffer, None);
        }
    }
}
