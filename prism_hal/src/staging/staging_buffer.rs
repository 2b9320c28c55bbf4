/// Growable global staging buffer (upload or readback)

use crate::error::{Error, Result};
use crate::render::NativeHandle;
use crate::staging::{StagingAllocator, StagingMemory, StagingHeap};
use crate::hal_debug;

/// Allocation granularity of global staging buffers
pub const STAGING_BUFFER_GRANULARITY: u64 = 4096;

/// Round `value` up to a multiple of `alignment` (0 is treated as 1)
pub fn align_up(value: u64, alignment: u64) -> u64 {
    let alignment = alignment.max(1);
    value.div_ceil(alignment) * alignment
}

/// A standing staging buffer that only ever grows
pub struct StagingBuffer {
    heap: StagingHeap,
    memory: Option<Box<dyn StagingMemory>>,
}

impl StagingBuffer {
    /// Create an empty buffer; memory is allocated on first use
    pub fn new(heap: StagingHeap) -> Self {
        Self { heap, memory: None }
    }

    /// Grow the buffer to hold at least `required` bytes
    ///
    /// The new size is `required` rounded up to the allocation granularity.
    /// A buffer that is already large enough is left untouched.
    pub fn ensure_capacity(&mut self, allocator: &dyn StagingAllocator, required: u64) -> Result<()> {
        if self.size() >= required {
            return Ok(());
        }

        let new_size = align_up(required, STAGING_BUFFER_GRANULARITY);
        hal_debug!(
            "prism::staging",
            "Growing {:?} staging buffer from {} to {} bytes",
            self.heap, self.size(), new_size
        );
        self.memory = Some(allocator.allocate_staging(new_size, self.heap)?);
        Ok(())
    }

    /// Current size in bytes (0 before the first allocation)
    pub fn size(&self) -> u64 {
        self.memory.as_ref().map_or(0, |memory| memory.size())
    }

    pub fn heap(&self) -> StagingHeap {
        self.heap
    }

    /// Copy `data` into the buffer at `offset`
    pub fn write(&mut self, offset: u64, data: &[u8]) -> Result<()> {
        match self.memory.as_mut() {
            Some(memory) => memory.write(offset, data),
            None => Err(Error::InvalidResource(format!("{:?} staging buffer is not allocated", self.heap))),
        }
    }

    /// Copy `out.len()` bytes from the buffer at `offset` into `out`
    pub fn read(&self, offset: u64, out: &mut [u8]) -> Result<()> {
        match self.memory.as_ref() {
            Some(memory) => memory.read(offset, out),
            None => Err(Error::InvalidResource(format!("{:?} staging buffer is not allocated", self.heap))),
        }
    }

    pub fn native_handle(&self) -> NativeHandle {
        self.memory.as_ref().map_or(NativeHandle::NULL, |memory| memory.native_handle())
    }
}
