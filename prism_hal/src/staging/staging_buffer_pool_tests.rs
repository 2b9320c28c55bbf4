//! Unit tests for staging_buffer_pool.rs
//!
//! Tests chunk allocation and reuse, global buffer growth, readback, and the
//! transition-copy-restore protocol using the mock backend.

use std::sync::Arc;
use std::sync::atomic::Ordering;
use crate::error::Error;
use crate::render::{BufferUsage, ResourceState, NativeHandle};
use crate::render::mock_backend::{MockGpu, MockBuffer, MockStagingAllocator, MockCommandContext};
use crate::staging::{StagingBufferPool, StagingHeap, align_up};

struct Fixture {
    gpu: Arc<MockGpu>,
    allocator: Arc<MockStagingAllocator>,
    ctx: MockCommandContext,
}

fn fixture() -> Fixture {
    let gpu = MockGpu::new();
    let allocator = MockStagingAllocator::new(Arc::clone(&gpu));
    let ctx = MockCommandContext::new(Arc::clone(&gpu));
    Fixture { gpu, allocator, ctx }
}

fn pool(f: &Fixture, chunk_size: u64) -> StagingBufferPool {
    StagingBufferPool::new(f.allocator.clone(), chunk_size)
}

fn assert_paired(transitions: &[(NativeHandle, ResourceState)], copy_state: ResourceState, usage: ResourceState) {
    assert_eq!(transitions.len() % 2, 0);
    for pair in transitions.chunks(2) {
        assert_eq!(pair[0].1, copy_state);
        assert_eq!(pair[1].1, usage);
        assert_eq!(pair[0].0, pair[1].0);
    }
}

// ============================================================================
// ALIGNMENT HELPER
// ============================================================================

#[test]
fn test_align_up() {
    assert_eq!(align_up(0, 256), 0);
    assert_eq!(align_up(1, 256), 256);
    assert_eq!(align_up(256, 256), 256);
    assert_eq!(align_up(257, 256), 512);
    assert_eq!(align_up(7, 0), 7);
}

// ============================================================================
// WRITE STAGED
// ============================================================================

#[test]
fn test_write_staged_copies_bytes_to_destination() {
    let mut f = fixture();
    let mut pool = pool(&f, 64);
    let dst = MockBuffer::new(&f.gpu, 256, BufferUsage::Vertex);

    pool.write_staged(&mut f.ctx, &dst, 8, &[1, 2, 3, 4]).unwrap();

    assert_eq!(f.gpu.read(dst.handle, 8, 4), vec![1, 2, 3, 4]);
    assert_eq!(f.ctx.copies.len(), 1);
    assert_eq!(f.ctx.copies[0].dst_offset, 8);
    assert_eq!(f.ctx.copies[0].size, 4);
    assert_eq!(
        f.ctx.transitions,
        vec![
            (dst.handle, ResourceState::CopyDestination),
            (dst.handle, ResourceState::VertexAndConstantBuffer),
        ]
    );
}

#[test]
fn test_write_staged_chunk_count_is_bounded() {
    let mut f = fixture();
    let mut pool = pool(&f, 64);
    let dst = MockBuffer::new(&f.gpu, 1024, BufferUsage::Constant);

    // 10 writes of 16 bytes = 160 bytes -> at most ceil(160 / 64) = 3 chunks
    for i in 0..10u64 {
        pool.write_staged(&mut f.ctx, &dst, i * 16, &[i as u8; 16]).unwrap();
    }
    assert_eq!(pool.chunk_count(), 3);

    for i in 0..10u64 {
        assert_eq!(f.gpu.read(dst.handle, i * 16, 16), vec![i as u8; 16]);
    }
}

#[test]
fn test_reset_reuses_chunks_without_growth() {
    let mut f = fixture();
    let mut pool = pool(&f, 64);
    let dst = MockBuffer::new(&f.gpu, 1024, BufferUsage::Constant);

    for frame in 0..3 {
        for i in 0..10u64 {
            pool.write_staged(&mut f.ctx, &dst, i * 16, &[frame as u8; 16]).unwrap();
        }
        pool.reset();
        assert_eq!(pool.current_chunk_index(), 0);
    }

    assert_eq!(pool.chunk_count(), 3);
    assert_eq!(f.allocator.allocation_sizes(StagingHeap::Upload), vec![64, 64, 64]);
}

#[test]
fn test_oversized_write_allocates_fitting_chunk() {
    let mut f = fixture();
    let mut pool = pool(&f, 64);
    let dst = MockBuffer::new(&f.gpu, 256, BufferUsage::Storage);

    pool.write_staged(&mut f.ctx, &dst, 0, &[7u8; 100]).unwrap();

    assert_eq!(f.allocator.allocation_sizes(StagingHeap::Upload), vec![100]);
    assert_eq!(f.gpu.read(dst.handle, 0, 100), vec![7u8; 100]);
    assert_paired(&f.ctx.transitions, ResourceState::CopyDestination, ResourceState::UnorderedAccess);
}

#[test]
fn test_cursor_never_moves_backwards_within_generation() {
    let mut f = fixture();
    let mut pool = pool(&f, 64);
    let dst = MockBuffer::new(&f.gpu, 256, BufferUsage::Vertex);

    pool.write_staged(&mut f.ctx, &dst, 0, &[1u8; 48]).unwrap(); // chunk 0, 16 bytes left
    pool.write_staged(&mut f.ctx, &dst, 48, &[2u8; 32]).unwrap(); // chunk 1
    assert_eq!(pool.current_chunk_index(), 1);

    // Fits into chunk 0, but the scan starts at the cursor
    pool.write_staged(&mut f.ctx, &dst, 80, &[3u8; 8]).unwrap();
    assert_eq!(pool.current_chunk_index(), 1);
    assert_eq!(pool.chunk_count(), 2);
    assert_eq!(f.ctx.copies[1].src, f.ctx.copies[2].src);
    assert_eq!(f.ctx.copies[2].src_offset, 32);
}

#[test]
fn test_clear_releases_all_chunks() {
    let mut f = fixture();
    let mut pool = pool(&f, 64);
    let dst = MockBuffer::new(&f.gpu, 256, BufferUsage::Vertex);

    pool.write_staged(&mut f.ctx, &dst, 0, &[1u8; 48]).unwrap();
    pool.write_immediate(&mut f.ctx, &dst, 0, &[1u8; 8], 4).unwrap();
    pool.clear();

    assert_eq!(pool.chunk_count(), 0);
    assert_eq!(pool.current_chunk_index(), 0);
    assert_eq!(pool.upload_capacity(), 4096);

    pool.write_staged(&mut f.ctx, &dst, 0, &[2u8; 8]).unwrap();
    assert_eq!(pool.chunk_count(), 1);
}

// ============================================================================
// WRITE IMMEDIATE
// ============================================================================

#[test]
fn test_write_immediate_grows_with_granularity_and_never_shrinks() {
    let mut f = fixture();
    let mut pool = pool(&f, 64);
    let dst = MockBuffer::new(&f.gpu, 8192, BufferUsage::Index);

    pool.write_immediate(&mut f.ctx, &dst, 0, &[1u8; 100], 256).unwrap();
    assert_eq!(pool.upload_capacity(), 4096);

    pool.write_immediate(&mut f.ctx, &dst, 0, &[2u8; 5000], 256).unwrap();
    assert_eq!(pool.upload_capacity(), 8192);

    pool.write_immediate(&mut f.ctx, &dst, 16, &[3u8; 10], 256).unwrap();
    assert_eq!(pool.upload_capacity(), 8192);

    assert_eq!(f.allocator.allocation_sizes(StagingHeap::Upload), vec![4096, 8192]);
    assert_eq!(f.gpu.read(dst.handle, 16, 10), vec![3u8; 10]);
    assert_paired(&f.ctx.transitions, ResourceState::CopyDestination, ResourceState::IndexBuffer);
}

#[test]
fn test_write_immediate_zero_alignment_is_treated_as_one() {
    let mut f = fixture();
    let mut pool = pool(&f, 64);
    let dst = MockBuffer::new(&f.gpu, 64, BufferUsage::Vertex);

    pool.write_immediate(&mut f.ctx, &dst, 0, &[5u8; 10], 0).unwrap();

    assert_eq!(pool.upload_capacity(), 4096);
    assert_eq!(f.gpu.read(dst.handle, 0, 10), vec![5u8; 10]);
}

// ============================================================================
// READBACK
// ============================================================================

#[test]
fn test_read_subresource_region_returns_gpu_bytes() {
    let mut f = fixture();
    let mut pool = pool(&f, 64);
    let src = MockBuffer::new(&f.gpu, 64, BufferUsage::Storage);
    f.gpu.write(src.handle, 4, &[9, 8, 7]);

    let mut out = [0u8; 3];
    pool.read_subresource_region(&mut f.ctx, &src, 4, &mut out, 16).unwrap();

    assert_eq!(out, [9, 8, 7]);
    assert_eq!(f.ctx.finishes, vec![true]);
    assert_eq!(pool.readback_capacity(), 4096);
    assert_eq!(f.allocator.allocation_sizes(StagingHeap::Readback), vec![4096]);
    assert_eq!(
        f.ctx.transitions,
        vec![
            (src.handle, ResourceState::CopySource),
            (src.handle, ResourceState::UnorderedAccess),
        ]
    );
}

#[test]
fn test_readback_map_failure_is_reported() {
    let mut f = fixture();
    let mut pool = pool(&f, 64);
    let src = MockBuffer::new(&f.gpu, 64, BufferUsage::Storage);
    f.allocator.fail_map.store(true, Ordering::Relaxed);

    let mut out = [0u8; 8];
    let result = pool.read_subresource_region(&mut f.ctx, &src, 0, &mut out, 1);

    assert!(matches!(result, Err(Error::MapFailed(_))));
    assert_paired(&f.ctx.transitions, ResourceState::CopySource, ResourceState::UnorderedAccess);
}

// ============================================================================
// BUFFER ENDPOINTS
// ============================================================================

#[test]
fn test_every_copy_is_between_buffers() {
    let mut f = fixture();
    let mut pool = pool(&f, 64);
    let buffer = MockBuffer::new(&f.gpu, 64, BufferUsage::Constant);

    pool.write_staged(&mut f.ctx, &buffer, 0, &[1u8; 16]).unwrap();
    pool.write_immediate(&mut f.ctx, &buffer, 16, &[2u8; 16], 4).unwrap();
    let mut out = [0u8; 32];
    pool.read_subresource_region(&mut f.ctx, &buffer, 0, &mut out, 1).unwrap();

    assert_eq!(f.ctx.copies.len(), 3);
    assert_eq!(f.ctx.copies[0].dst, buffer.handle);
    assert_eq!(f.ctx.copies[1].dst, buffer.handle);
    assert_eq!(f.ctx.copies[2].src, buffer.handle);
    assert_eq!(&out[..16], &[1u8; 16]);
    assert_eq!(&out[16..], &[2u8; 16]);
}

// ============================================================================
// FAILURE AND EDGE CASES
// ============================================================================

#[test]
fn test_failed_upload_records_no_transition() {
    let mut f = fixture();
    let mut pool = pool(&f, 64);
    let dst = MockBuffer::new(&f.gpu, 64, BufferUsage::Vertex);
    f.allocator.fail_map.store(true, Ordering::Relaxed);

    assert!(matches!(pool.write_staged(&mut f.ctx, &dst, 0, &[1u8; 4]), Err(Error::MapFailed(_))));
    assert!(matches!(pool.write_immediate(&mut f.ctx, &dst, 0, &[1u8; 4], 4), Err(Error::MapFailed(_))));
    assert!(f.ctx.transitions.is_empty());
    assert!(f.ctx.copies.is_empty());
}

#[test]
fn test_zero_length_operations_are_noops() {
    let mut f = fixture();
    let mut pool = pool(&f, 64);
    let buffer = MockBuffer::new(&f.gpu, 64, BufferUsage::Vertex);

    pool.write_staged(&mut f.ctx, &buffer, 0, &[]).unwrap();
    pool.write_immediate(&mut f.ctx, &buffer, 0, &[], 256).unwrap();
    pool.read_subresource_region(&mut f.ctx, &buffer, 0, &mut [], 256).unwrap();

    assert_eq!(pool.chunk_count(), 0);
    assert_eq!(pool.upload_capacity(), 0);
    assert_eq!(pool.readback_capacity(), 0);
    assert!(f.allocator.allocations.lock().unwrap().is_empty());
    assert!(f.ctx.transitions.is_empty());
    assert!(f.ctx.finishes.is_empty());
}
