/// Staging memory and allocator traits
///
/// Backends implement these to give the staging pool CPU-visible GPU
/// memory blocks. Each block is an independent native buffer that can be
/// the source or destination of `CommandContext::copy_buffer_region`.

use crate::error::Result;
use crate::render::NativeHandle;

/// Heap a staging block is placed in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StagingHeap {
    /// CPU-write, GPU-read memory (copy source)
    Upload,
    /// GPU-write, CPU-read memory (copy destination)
    Readback,
}

/// A CPU-visible GPU memory block
pub trait StagingMemory: Send {
    /// Native buffer handle of the block
    fn native_handle(&self) -> NativeHandle;

    /// Size in bytes
    fn size(&self) -> u64;

    /// Copy `data` into the block at `offset`
    ///
    /// Fails with `Error::MapFailed` if the memory cannot be mapped.
    fn write(&mut self, offset: u64, data: &[u8]) -> Result<()>;

    /// Copy `out.len()` bytes from the block at `offset` into `out`
    ///
    /// Maps with a read range equal to `out.len()` and unmaps with an empty
    /// written range. Fails with `Error::MapFailed` if the memory cannot be
    /// mapped.
    fn read(&self, offset: u64, out: &mut [u8]) -> Result<()>;
}

/// Allocator of staging memory blocks
pub trait StagingAllocator: Send + Sync {
    /// Allocate a block of at least `size` bytes in `heap`
    fn allocate_staging(&self, size: u64, heap: StagingHeap) -> Result<Box<dyn StagingMemory>>;
}
