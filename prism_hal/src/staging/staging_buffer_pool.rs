/// Staging buffer pool
///
/// Supplies GPU-accessible scratch memory for transient uploads (chunked),
/// aligned uploads through one standing upload buffer, and GPU to CPU reads
/// through one standing readback buffer.
///
/// Every copy follows the same protocol: the GPU resource is transitioned
/// into its copy state, the copy is recorded, and the resource is returned
/// to its usage state. CPU-side writes happen before the first transition,
/// so a failed write never leaves a resource in its copy state.

use std::sync::Arc;
use crate::error::Result;
use crate::render::{Buffer, CommandContext, ResourceState};
use crate::staging::{StagingAllocator, StagingBuffer, StagingBufferChunk, StagingHeap, align_up};
use crate::hal_trace;

pub struct StagingBufferPool {
    allocator: Arc<dyn StagingAllocator>,
    chunk_size: u64,
    chunks: Vec<StagingBufferChunk>,
    chunk_idx: usize,
    global_upload: StagingBuffer,
    global_readback: StagingBuffer,
}

impl StagingBufferPool {
    /// Create an empty pool allocating chunks of `chunk_size` bytes
    pub fn new(allocator: Arc<dyn StagingAllocator>, chunk_size: u64) -> Self {
        Self {
            allocator,
            chunk_size,
            chunks: Vec::new(),
            chunk_idx: 0,
            global_upload: StagingBuffer::new(StagingHeap::Upload),
            global_readback: StagingBuffer::new(StagingHeap::Readback),
        }
    }

    /// Rewind every chunk and the cursor, keeping all memory
    ///
    /// Call once per frame after the GPU has consumed the previous uploads.
    pub fn reset(&mut self) {
        for chunk in &mut self.chunks {
            chunk.reset();
        }
        self.chunk_idx = 0;
    }

    /// Release every chunk
    ///
    /// The global upload and readback buffers are kept.
    pub fn clear(&mut self) {
        self.chunks.clear();
        self.chunk_idx = 0;
    }

    /// Upload `data` into `dst` at `dst_offset` through a chunk
    ///
    /// Chunks are scanned forward from the cursor; a new chunk of
    /// `max(chunk_size, data.len())` bytes is appended when none fits.
    ///
    /// Every copy of the pool is a buffer-to-buffer copy, so only buffers
    /// are accepted as endpoints:
    ///
    /// ```compile_fail
    /// use prism_hal::prism::render::{CommandContext, NativeHandle, ResourceState, TrackedResource};
    /// use prism_hal::prism::staging::StagingBufferPool;
    ///
    /// struct Image;
    /// impl TrackedResource for Image {
    ///     fn native_handle(&self) -> NativeHandle { NativeHandle(1) }
    ///     fn usage_state(&self) -> ResourceState { ResourceState::ShaderResource }
    /// }
    ///
    /// fn upload(pool: &mut StagingBufferPool, ctx: &mut dyn CommandContext) {
    ///     let _ = pool.write_staged(ctx, &Image, 0, &[0u8; 4]);
    /// }
    /// ```
    pub fn write_staged<B: Buffer>(
        &mut self,
        ctx: &mut dyn CommandContext,
        dst: &B,
        dst_offset: u64,
        data: &[u8],
    ) -> Result<()> {
        if data.is_empty() {
            return Ok(());
        }
        let data_size = data.len() as u64;

        // Find a chunk that fits the data or allocate a new chunk
        while self.chunk_idx < self.chunks.len() && !self.chunks[self.chunk_idx].capacity(data_size) {
            self.chunk_idx += 1;
        }
        if self.chunk_idx == self.chunks.len() {
            self.alloc_chunk(data_size)?;
        }

        let chunk = &mut self.chunks[self.chunk_idx];
        let src_offset = chunk.write_and_increment_offset(data)?;

        ctx.transition_resource(dst, ResourceState::CopyDestination, true);
        ctx.copy_buffer_region(dst.native_handle(), dst_offset, chunk.native_handle(), src_offset, data_size);
        ctx.transition_resource(dst, dst.usage_state(), true);
        Ok(())
    }

    /// Upload `data` into `dst` at `dst_offset` through the global upload buffer
    ///
    /// The upload buffer grows to fit `align_up(data.len(), alignment)` and
    /// never shrinks.
    ///
    /// Every call writes at offset 0 of the same upload buffer. On a context
    /// that records lazily, the copy reads the buffer when the work executes,
    /// so callers must `finish` the context between two immediate writes.
    /// Growth has the same hazard: the old buffer is released while recorded
    /// copies may still reference it.
    pub fn write_immediate<B: Buffer>(
        &mut self,
        ctx: &mut dyn CommandContext,
        dst: &B,
        dst_offset: u64,
        data: &[u8],
        alignment: u64,
    ) -> Result<()> {
        if data.is_empty() {
            return Ok(());
        }
        let data_size = data.len() as u64;

        self.global_upload.ensure_capacity(self.allocator.as_ref(), align_up(data_size, alignment))?;
        self.global_upload.write(0, data)?;

        ctx.transition_resource(dst, ResourceState::CopyDestination, true);
        ctx.copy_buffer_region(dst.native_handle(), dst_offset, self.global_upload.native_handle(), 0, data_size);
        ctx.transition_resource(dst, dst.usage_state(), true);
        Ok(())
    }

    /// Read `out.len()` bytes of `src` at `src_offset` back to the CPU
    ///
    /// Blocks until the GPU has finished the copy. A map failure of the
    /// readback buffer is returned as `Error::MapFailed`.
    pub fn read_subresource_region<B: Buffer>(
        &mut self,
        ctx: &mut dyn CommandContext,
        src: &B,
        src_offset: u64,
        out: &mut [u8],
        alignment: u64,
    ) -> Result<()> {
        if out.is_empty() {
            return Ok(());
        }
        let data_size = out.len() as u64;

        self.global_readback.ensure_capacity(self.allocator.as_ref(), align_up(data_size, alignment))?;

        // Copy source region to readback buffer and flush
        ctx.transition_resource(src, ResourceState::CopySource, true);
        ctx.copy_buffer_region(self.global_readback.native_handle(), 0, src.native_handle(), src_offset, data_size);
        ctx.transition_resource(src, src.usage_state(), true);
        ctx.finish(true)?;

        self.global_readback.read(0, out)
    }

    fn alloc_chunk(&mut self, min_chunk_size: u64) -> Result<()> {
        let size = self.chunk_size.max(min_chunk_size);
        hal_trace!("prism::staging", "Allocating staging chunk #{} ({} bytes)", self.chunks.len(), size);
        self.chunks.push(StagingBufferChunk::new(self.allocator.as_ref(), size)?);
        self.chunk_idx = self.chunks.len() - 1;
        Ok(())
    }

    /// Number of allocated chunks
    pub fn chunk_count(&self) -> usize {
        self.chunks.len()
    }

    /// Index of the chunk the next staged write starts scanning from
    pub fn current_chunk_index(&self) -> usize {
        self.chunk_idx
    }

    /// Current size of the global upload buffer
    pub fn upload_capacity(&self) -> u64 {
        self.global_upload.size()
    }

    /// Current size of the global readback buffer
    pub fn readback_capacity(&self) -> u64 {
        self.global_readback.size()
    }

    pub fn chunk_size(&self) -> u64 {
        self.chunk_size
    }
}

#[cfg(test)]
#[path = "staging_buffer_pool_tests.rs"]
mod tests;
