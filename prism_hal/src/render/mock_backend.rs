/// Mock backend for unit tests (no GPU required)
///
/// Provides a recording render context, mock resources, and a shared mock
/// GPU memory store used by the mock staging allocator and command context,
/// so staging uploads and readbacks can be checked byte for byte.

use std::sync::{Arc, Mutex};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use glam::{UVec2, UVec3, Vec4};
use rustc_hash::FxHashMap;

use crate::error::{Error, Result};
use crate::render::{
    NativeHandle, ResourceState, TrackedResource,
    Buffer, BufferUsage, Texture, TextureInfo, TextureFormat, Sampler,
    PipelineLayout, PipelineLayoutDesc, BindingDesc, ResourceHeap, RenderTarget,
    GraphicsPipeline, ComputePipeline, Query, QueryType, PrimitiveTopology,
    CommandContext, RenderContext, ClearFlags, CpuAccess, IndexType, Viewport, Rect2D, VsyncDesc,
};
use crate::staging::{StagingAllocator, StagingMemory, StagingHeap};

// ============================================================================
// Mock GPU memory
// ============================================================================

/// Shared byte store keyed by native handle
pub struct MockGpu {
    memory: Mutex<FxHashMap<NativeHandle, Vec<u8>>>,
    next_handle: AtomicU64,
}

impl MockGpu {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            memory: Mutex::new(FxHashMap::default()),
            next_handle: AtomicU64::new(1),
        })
    }

    /// Create a zero-filled block and return its handle
    pub fn create_memory(&self, size: u64) -> NativeHandle {
        let handle = self.next_handle();
        self.memory.lock().unwrap().insert(handle, vec![0u8; size as usize]);
        handle
    }

    /// Allocate a handle without backing memory (samplers, pipelines, ...)
    pub fn next_handle(&self) -> NativeHandle {
        NativeHandle(self.next_handle.fetch_add(1, Ordering::Relaxed))
    }

    pub fn read(&self, handle: NativeHandle, offset: u64, len: usize) -> Vec<u8> {
        let memory = self.memory.lock().unwrap();
        let block = &memory[&handle];
        block[offset as usize..offset as usize + len].to_vec()
    }

    pub fn write(&self, handle: NativeHandle, offset: u64, data: &[u8]) {
        let mut memory = self.memory.lock().unwrap();
        let block = memory.get_mut(&handle).unwrap();
        block[offset as usize..offset as usize + data.len()].copy_from_slice(data);
    }

    pub fn copy(&self, dst: NativeHandle, dst_offset: u64, src: NativeHandle, src_offset: u64, size: u64) {
        let bytes = self.read(src, src_offset, size as usize);
        self.write(dst, dst_offset, &bytes);
    }
}

// ============================================================================
// Mock Buffer / Texture / Sampler
// ============================================================================

#[derive(Debug)]
pub struct MockBuffer {
    pub handle: NativeHandle,
    pub size: u64,
    pub usage: BufferUsage,
}

impl MockBuffer {
    pub fn new(gpu: &MockGpu, size: u64, usage: BufferUsage) -> Self {
        Self { handle: gpu.create_memory(size), size, usage }
    }
}

impl TrackedResource for MockBuffer {
    fn native_handle(&self) -> NativeHandle {
        self.handle
    }

    fn usage_state(&self) -> ResourceState {
        ResourceState::for_buffer_usage(self.usage)
    }
}

impl Buffer for MockBuffer {
    fn size(&self) -> u64 {
        self.size
    }

    fn usage(&self) -> BufferUsage {
        self.usage
    }
}

#[derive(Debug)]
pub struct MockTexture {
    pub handle: NativeHandle,
    pub view: NativeHandle,
    pub info: TextureInfo,
}

impl MockTexture {
    pub fn new(gpu: &MockGpu, width: u32, height: u32) -> Self {
        Self {
            handle: gpu.next_handle(),
            view: gpu.next_handle(),
            info: TextureInfo {
                width,
                height,
                format: TextureFormat::R8G8B8A8_UNORM,
                mip_levels: 1,
            },
        }
    }
}

impl TrackedResource for MockTexture {
    fn native_handle(&self) -> NativeHandle {
        self.handle
    }

    fn usage_state(&self) -> ResourceState {
        ResourceState::ShaderResource
    }
}

impl Texture for MockTexture {
    fn info(&self) -> &TextureInfo {
        &self.info
    }

    fn native_view(&self) -> NativeHandle {
        self.view
    }
}

#[derive(Debug)]
pub struct MockSampler {
    pub handle: NativeHandle,
}

impl MockSampler {
    pub fn new(gpu: &MockGpu) -> Self {
        Self { handle: gpu.next_handle() }
    }
}

impl Sampler for MockSampler {
    fn native_handle(&self) -> NativeHandle {
        self.handle
    }
}

// ============================================================================
// Mock PipelineLayout / ResourceHeap
// ============================================================================

#[derive(Debug)]
pub struct MockPipelineLayout {
    pub bindings: Vec<BindingDesc>,
    pub dst_bindings: Vec<u32>,
    pub handle: NativeHandle,
    pub set_layout: Option<NativeHandle>,
}

impl MockPipelineLayout {
    pub fn new(desc: PipelineLayoutDesc) -> Self {
        let dst_bindings = desc.bindings.iter().map(|binding| binding.slot).collect();
        Self {
            bindings: desc.bindings,
            dst_bindings,
            handle: NativeHandle(0x1000),
            set_layout: Some(NativeHandle(0x2000)),
        }
    }
}

impl PipelineLayout for MockPipelineLayout {
    fn bindings(&self) -> &[BindingDesc] {
        &self.bindings
    }

    fn dst_bindings(&self) -> &[u32] {
        &self.dst_bindings
    }

    fn native_handle(&self) -> NativeHandle {
        self.handle
    }

    fn native_set_layout(&self) -> Option<NativeHandle> {
        self.set_layout
    }
}

pub struct MockResourceHeap {
    pub layout: NativeHandle,
    pub sets: Vec<NativeHandle>,
}

impl ResourceHeap for MockResourceHeap {
    fn native_pipeline_layout(&self) -> NativeHandle {
        self.layout
    }

    fn native_descriptor_sets(&self) -> &[NativeHandle] {
        &self.sets
    }
}

// ============================================================================
// Mock Pipelines / RenderTarget / Query
// ============================================================================

pub struct MockGraphicsPipeline;

impl GraphicsPipeline for MockGraphicsPipeline {
    fn native_handle(&self) -> NativeHandle {
        NativeHandle(0x3000)
    }
}

pub struct MockComputePipeline;

impl ComputePipeline for MockComputePipeline {
    fn native_handle(&self) -> NativeHandle {
        NativeHandle(0x3001)
    }
}

pub struct MockRenderTarget {
    pub resolution: UVec2,
}

impl RenderTarget for MockRenderTarget {
    fn resolution(&self) -> UVec2 {
        self.resolution
    }

    fn num_color_attachments(&self) -> u32 {
        1
    }

    fn native_handle(&self) -> NativeHandle {
        NativeHandle(0x4000)
    }
}

pub struct MockQuery {
    pub query_type: QueryType,
}

impl Query for MockQuery {
    fn query_type(&self) -> QueryType {
        self.query_type
    }

    fn native_handle(&self) -> NativeHandle {
        NativeHandle(0x5000)
    }
}

// ============================================================================
// Mock staging allocator and memory
// ============================================================================

pub struct MockStagingAllocator {
    pub gpu: Arc<MockGpu>,
    /// Every allocation made, in order
    pub allocations: Mutex<Vec<(u64, StagingHeap)>>,
    /// When set, blocks allocated afterwards fail to map
    pub fail_map: AtomicBool,
}

impl MockStagingAllocator {
    pub fn new(gpu: Arc<MockGpu>) -> Arc<Self> {
        Arc::new(Self {
            gpu,
            allocations: Mutex::new(Vec::new()),
            fail_map: AtomicBool::new(false),
        })
    }

    /// Sizes of the allocations made in `heap`, in order
    pub fn allocation_sizes(&self, heap: StagingHeap) -> Vec<u64> {
        self.allocations
            .lock()
            .unwrap()
            .iter()
            .filter(|(_, h)| *h == heap)
            .map(|(size, _)| *size)
            .collect()
    }
}

impl StagingAllocator for MockStagingAllocator {
    fn allocate_staging(&self, size: u64, heap: StagingHeap) -> Result<Box<dyn StagingMemory>> {
        self.allocations.lock().unwrap().push((size, heap));
        Ok(Box::new(MockStagingMemory {
            gpu: Arc::clone(&self.gpu),
            handle: self.gpu.create_memory(size),
            size,
            fail_map: self.fail_map.load(Ordering::Relaxed),
        }))
    }
}

pub struct MockStagingMemory {
    gpu: Arc<MockGpu>,
    handle: NativeHandle,
    size: u64,
    fail_map: bool,
}

impl StagingMemory for MockStagingMemory {
    fn native_handle(&self) -> NativeHandle {
        self.handle
    }

    fn size(&self) -> u64 {
        self.size
    }

    fn write(&mut self, offset: u64, data: &[u8]) -> Result<()> {
        if self.fail_map {
            return Err(Error::MapFailed("mock upload memory".to_string()));
        }
        self.gpu.write(self.handle, offset, data);
        Ok(())
    }

    fn read(&self, offset: u64, out: &mut [u8]) -> Result<()> {
        if self.fail_map {
            return Err(Error::MapFailed("mock readback memory".to_string()));
        }
        out.copy_from_slice(&self.gpu.read(self.handle, offset, out.len()));
        Ok(())
    }
}

// ============================================================================
// Mock command context
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MockCopy {
    pub dst: NativeHandle,
    pub dst_offset: u64,
    pub src: NativeHandle,
    pub src_offset: u64,
    pub size: u64,
}

/// Command context executing copies immediately against the mock GPU
pub struct MockCommandContext {
    pub gpu: Arc<MockGpu>,
    pub transitions: Vec<(NativeHandle, ResourceState)>,
    pub copies: Vec<MockCopy>,
    pub finishes: Vec<bool>,
}

impl MockCommandContext {
    pub fn new(gpu: Arc<MockGpu>) -> Self {
        Self {
            gpu,
            transitions: Vec::new(),
            copies: Vec::new(),
            finishes: Vec::new(),
        }
    }
}

impl CommandContext for MockCommandContext {
    fn transition_resource(&mut self, resource: &dyn TrackedResource, state: ResourceState, _flush_barrier: bool) {
        self.transitions.push((resource.native_handle(), state));
    }

    fn copy_buffer_region(
        &mut self,
        dst: NativeHandle,
        dst_offset: u64,
        src: NativeHandle,
        src_offset: u64,
        size: u64,
    ) {
        self.gpu.copy(dst, dst_offset, src, src_offset, size);
        self.copies.push(MockCopy { dst, dst_offset, src, src_offset, size });
    }

    fn finish(&mut self, wait_for_completion: bool) -> Result<()> {
        self.finishes.push(wait_for_completion);
        Ok(())
    }
}

// ============================================================================
// Mock render context
// ============================================================================

/// Render context recording the name of every call it receives
pub struct MockRenderContext {
    pub calls: Vec<String>,
    pub mapped: Vec<u8>,
    pub query_value: Option<u64>,
}

impl MockRenderContext {
    pub fn new() -> Self {
        Self {
            calls: Vec::new(),
            mapped: vec![0u8; 64],
            query_value: Some(42),
        }
    }

    fn record(&mut self, name: &str) -> Result<()> {
        self.calls.push(name.to_string());
        Ok(())
    }
}

impl RenderContext for MockRenderContext {
    fn present(&mut self) -> Result<()> {
        self.record("present")
    }

    fn set_vsync(&mut self, _vsync: &VsyncDesc) -> Result<()> {
        self.record("set_vsync")
    }

    fn set_viewports(&mut self, _viewports: &[Viewport]) -> Result<()> {
        self.record("set_viewports")
    }

    fn set_scissors(&mut self, _scissors: &[Rect2D]) -> Result<()> {
        self.record("set_scissors")
    }

    fn set_clear_color(&mut self, _color: Vec4) -> Result<()> {
        self.record("set_clear_color")
    }

    fn set_clear_depth(&mut self, _depth: f32) -> Result<()> {
        self.record("set_clear_depth")
    }

    fn set_clear_stencil(&mut self, _stencil: u32) -> Result<()> {
        self.record("set_clear_stencil")
    }

    fn clear_buffers(&mut self, _flags: ClearFlags) -> Result<()> {
        self.record("clear_buffers")
    }

    fn set_vertex_buffer(&mut self, _buffer: &dyn Buffer) -> Result<()> {
        self.record("set_vertex_buffer")
    }

    fn set_index_buffer(&mut self, _buffer: &dyn Buffer, _index_type: IndexType) -> Result<()> {
        self.record("set_index_buffer")
    }

    fn set_constant_buffer(&mut self, _buffer: &dyn Buffer, _slot: u32) -> Result<()> {
        self.record("set_constant_buffer")
    }

    fn set_storage_buffer(&mut self, _buffer: &dyn Buffer, _slot: u32) -> Result<()> {
        self.record("set_storage_buffer")
    }

    fn map_storage_buffer(&mut self, _buffer: &dyn Buffer, _access: CpuAccess) -> Result<*mut u8> {
        self.record("map_storage_buffer")?;
        Ok(self.mapped.as_mut_ptr())
    }

    fn unmap_storage_buffer(&mut self, _buffer: &dyn Buffer) -> Result<()> {
        self.record("unmap_storage_buffer")
    }

    fn set_texture(&mut self, _texture: &dyn Texture, _slot: u32) -> Result<()> {
        self.record("set_texture")
    }

    fn generate_mips(&mut self, _texture: &dyn Texture) -> Result<()> {
        self.record("generate_mips")
    }

    fn set_sampler(&mut self, _sampler: &dyn Sampler, _slot: u32) -> Result<()> {
        self.record("set_sampler")
    }

    fn set_graphics_resource_heap(&mut self, _heap: &dyn ResourceHeap, _first_set: u32) -> Result<()> {
        self.record("set_graphics_resource_heap")
    }

    fn set_compute_resource_heap(&mut self, _heap: &dyn ResourceHeap, _first_set: u32) -> Result<()> {
        self.record("set_compute_resource_heap")
    }

    fn set_render_target(&mut self, _target: &dyn RenderTarget) -> Result<()> {
        self.record("set_render_target")
    }

    fn unset_render_target(&mut self) -> Result<()> {
        self.record("unset_render_target")
    }

    fn set_graphics_pipeline(&mut self, _pipeline: &dyn GraphicsPipeline) -> Result<()> {
        self.record("set_graphics_pipeline")
    }

    fn set_compute_pipeline(&mut self, _pipeline: &dyn ComputePipeline) -> Result<()> {
        self.record("set_compute_pipeline")
    }

    fn begin_query(&mut self, _query: &dyn Query) -> Result<()> {
        self.record("begin_query")
    }

    fn end_query(&mut self, _query: &dyn Query) -> Result<()> {
        self.record("end_query")
    }

    fn query_result(&mut self, _query: &dyn Query) -> Result<Option<u64>> {
        self.record("query_result")?;
        Ok(self.query_value)
    }

    fn set_primitive_topology(&mut self, _topology: PrimitiveTopology) -> Result<()> {
        self.record("set_primitive_topology")
    }

    fn draw(&mut self, _num_vertices: u32, _first_vertex: u32) -> Result<()> {
        self.record("draw")
    }

    fn draw_indexed(&mut self, _num_indices: u32, _first_index: u32, _vertex_offset: i32) -> Result<()> {
        self.record("draw_indexed")
    }

    fn draw_instanced(
        &mut self,
        _num_vertices: u32,
        _first_vertex: u32,
        _num_instances: u32,
        _instance_offset: u32,
    ) -> Result<()> {
        self.record("draw_instanced")
    }

    fn draw_indexed_instanced(
        &mut self,
        _num_indices: u32,
        _num_instances: u32,
        _first_index: u32,
        _vertex_offset: i32,
        _instance_offset: u32,
    ) -> Result<()> {
        self.record("draw_indexed_instanced")
    }

    fn dispatch_compute(&mut self, _thread_groups: UVec3) -> Result<()> {
        self.record("dispatch_compute")
    }

    fn sync_gpu(&mut self) -> Result<()> {
        self.record("sync_gpu")
    }
}
