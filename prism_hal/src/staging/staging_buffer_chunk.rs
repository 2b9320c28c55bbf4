/// Fixed-capacity, linearly advancing upload block

use crate::error::Result;
use crate::render::NativeHandle;
use crate::staging::{StagingAllocator, StagingMemory, StagingHeap};

/// One chunk of a staging pool
///
/// Writes advance `write_offset` monotonically until `reset` returns it to
/// zero. The memory block itself is kept for the chunk's lifetime.
pub struct StagingBufferChunk {
    memory: Box<dyn StagingMemory>,
    write_offset: u64,
}

impl StagingBufferChunk {
    /// Allocate a chunk of `size` bytes in the upload heap
    pub fn new(allocator: &dyn StagingAllocator, size: u64) -> Result<Self> {
        Ok(Self {
            memory: allocator.allocate_staging(size, StagingHeap::Upload)?,
            write_offset: 0,
        })
    }

    /// Returns true if `data_size` more bytes fit into the chunk
    pub fn capacity(&self, data_size: u64) -> bool {
        self.memory.size() - self.write_offset >= data_size
    }

    /// Rewind the chunk without releasing its memory
    pub fn reset(&mut self) {
        self.write_offset = 0;
    }

    /// Copy `data` into the chunk and advance the write offset
    ///
    /// Returns the offset within the chunk the data was written to. The
    /// caller must have checked `capacity` first.
    pub fn write_and_increment_offset(&mut self, data: &[u8]) -> Result<u64> {
        let offset = self.write_offset;
        self.memory.write(offset, data)?;
        self.write_offset += data.len() as u64;
        Ok(offset)
    }

    pub fn native_handle(&self) -> NativeHandle {
        self.memory.native_handle()
    }

    pub fn size(&self) -> u64 {
        self.memory.size()
    }

    pub fn write_offset(&self) -> u64 {
        self.write_offset
    }
}
