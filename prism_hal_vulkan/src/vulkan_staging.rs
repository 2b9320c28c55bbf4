/// Vulkan staging memory
///
/// Upload blocks live in `CpuToGpu` memory, readback blocks in `GpuToCpu`
/// memory. gpu-allocator keeps host-visible allocations persistently
/// mapped, so writes and reads are plain copies through the mapped slice
/// plus a flush or invalidate when the memory type is not host-coherent.

use prism_hal::prism::{Error, Result};
use prism_hal::prism::render::NativeHandle;
use prism_hal::prism::staging::{StagingAllocator, StagingHeap, StagingMemory};
use prism_hal::hal_err;
use ash::vk;
use ash::vk::Handle;
use gpu_allocator::vulkan::Allocation;
use gpu_allocator::MemoryLocation;
use std::sync::Arc;

use crate::vulkan_buffer::create_bound_buffer;
use crate::vulkan_context::GpuContext;

/// Allocates staging blocks for a `StagingBufferPool`
pub struct VulkanStagingAllocator {
    ctx: Arc<GpuContext>,
}

impl VulkanStagingAllocator {
    pub fn new(ctx: Arc<GpuContext>) -> Self {
        Self { ctx }
    }
}

impl StagingAllocator for VulkanStagingAllocator {
    fn allocate_staging(&self, size: u64, heap: StagingHeap) -> Result<Box<dyn StagingMemory>> {
        let (usage, location, name) = match heap {
            StagingHeap::Upload => (vk::BufferUsageFlags::TRANSFER_SRC, MemoryLocation::CpuToGpu, "staging upload buffer"),
            StagingHeap::Readback => (vk::BufferUsageFlags::TRANSFER_DST, MemoryLocation::GpuToCpu, "staging readback buffer"),
        };

        let (buffer, allocation) = create_bound_buffer(&self.ctx, size, usage, location, name)?;

        Ok(Box::new(VulkanStagingMemory {
            ctx: Arc::clone(&self.ctx),
            buffer,
            allocation: Some(allocation),
            size,
        }))
    }
}

/// One host-visible staging buffer
pub struct VulkanStagingMemory {
    ctx: Arc<GpuContext>,
    buffer: vk::Buffer,
    allocation: Option<Allocation>,
    size: u64,
}

impl VulkanStagingMemory {
    fn check_range(&self, offset: u64, len: usize) -> Result<std::ops::Range<usize>> {
        let end = offset.checked_add(len as u64).filter(|&end| end <= self.size);
        match end {
            Some(end) => Ok(offset as usize..end as usize),
            None => Err(Error::InvalidResource(format!(
                "Staging range {}..+{} exceeds buffer size {}",
                offset, len, self.size
            ))),
        }
    }

    fn is_coherent(allocation: &Allocation) -> bool {
        allocation
            .memory_properties()
            .contains(vk::MemoryPropertyFlags::HOST_COHERENT)
    }

    /// Mapped range covering `offset..` aligned to `nonCoherentAtomSize`
    fn mapped_range(&self, allocation: &Allocation, offset: u64) -> vk::MappedMemoryRange<'static> {
        let atom = self.ctx.non_coherent_atom_size;
        let start = allocation.offset() + offset;
        vk::MappedMemoryRange::default()
            .memory(unsafe { allocation.memory() })
            .offset(start - start % atom)
            .size(vk::WHOLE_SIZE)
    }
}

impl StagingMemory for VulkanStagingMemory {
    fn native_handle(&self) -> NativeHandle {
        NativeHandle(self.buffer.as_raw())
    }

    fn size(&self) -> u64 {
        self.size
    }

    fn write(&mut self, offset: u64, data: &[u8]) -> Result<()> {
        let range = self.check_range(offset, data.len())?;
        let allocation = self
            .allocation
            .as_mut()
            .ok_or_else(|| Error::MapFailed("Staging buffer has no allocation".to_string()))?;

        let mapped = allocation
            .mapped_slice_mut()
            .ok_or_else(|| Error::MapFailed("Staging buffer is not CPU-accessible".to_string()))?;
        mapped[range].copy_from_slice(data);

        let allocation = self
            .allocation
            .as_ref()
            .ok_or_else(|| Error::MapFailed("Staging buffer has no allocation".to_string()))?;
        if !Self::is_coherent(allocation) {
            let mapped_range = self.mapped_range(allocation, offset);
            unsafe {
                self.ctx.device.flush_mapped_memory_ranges(std::slice::from_ref(&mapped_range))
                    .map_err(|e| hal_err!("prism::vulkan", "Failed to flush staging memory: {:?}", e))?;
            }
        }
        Ok(())
    }

    fn read(&self, offset: u64, out: &mut [u8]) -> Result<()> {
        let range = self.check_range(offset, out.len())?;
        let allocation = self
            .allocation
            .as_ref()
            .ok_or_else(|| Error::MapFailed("Staging buffer has no allocation".to_string()))?;

        if !Self::is_coherent(allocation) {
            let mapped_range = self.mapped_range(allocation, offset);
            unsafe {
                self.ctx.device.invalidate_mapped_memory_ranges(std::slice::from_ref(&mapped_range))
                    .map_err(|e| hal_err!("prism::vulkan", "Failed to invalidate staging memory: {:?}", e))?;
            }
        }

        let mapped = allocation
            .mapped_slice()
            .ok_or_else(|| Error::MapFailed("Staging buffer is not CPU-accessible".to_string()))?;
        out.copy_from_slice(&mapped[range]);
        Ok(())
    }
}

impl Drop for VulkanStagingMemory {
    fn drop(&mut self) {
        unsafe {
            if let Some(allocation) = self.allocation.take() {
                if let Ok(mut allocator) = self.ctx.allocator.lock() {
                    allocator.free(allocation).ok();
                }
            }

            self.ctx.device.destroy_buffer(self.buffer, None);
        }
    }
}
