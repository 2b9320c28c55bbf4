/// Render context trait and the plain-data types it takes

use bitflags::bitflags;
use glam::{UVec3, Vec4};
use crate::error::Result;
use crate::render::{
    Buffer, Texture, Sampler, ResourceHeap, RenderTarget,
    GraphicsPipeline, ComputePipeline, Query, PrimitiveTopology,
};

bitflags! {
    /// Attachments cleared by `clear_buffers`
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct ClearFlags: u32 {
        const COLOR = 1 << 0;
        const DEPTH = 1 << 1;
        const STENCIL = 1 << 2;

        const COLOR_DEPTH = Self::COLOR.bits() | Self::DEPTH.bits();
        const ALL = Self::COLOR.bits() | Self::DEPTH.bits() | Self::STENCIL.bits();
    }
}

/// CPU access requested when mapping a buffer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CpuAccess {
    ReadOnly,
    WriteOnly,
    ReadWrite,
}

/// Index buffer element type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IndexType {
    /// 16-bit indices (max 65535 vertices)
    U16,
    /// 32-bit indices
    U32,
}

impl IndexType {
    /// Size in bytes of one index element
    pub fn size_bytes(&self) -> u32 {
        match self {
            IndexType::U16 => 2,
            IndexType::U32 => 4,
        }
    }
}

/// Viewport
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
    pub min_depth: f32,
    pub max_depth: f32,
}

/// 2D rectangle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rect2D {
    pub x: i32,
    pub y: i32,
    pub width: u32,
    pub height: u32,
}

/// Vertical synchronisation settings
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VsyncDesc {
    pub enabled: bool,
    /// Refresh rate in Hz
    pub refresh_rate: u32,
    /// Number of vertical blanks to wait per present
    pub interval: u32,
}

impl Default for VsyncDesc {
    fn default() -> Self {
        Self {
            enabled: false,
            refresh_rate: 60,
            interval: 1,
        }
    }
}

/// Render context trait
///
/// The full drawing, binding and compute surface of a backend. The debug
/// layer implements the same trait, so direct and debug-wrapped contexts
/// are interchangeable.
pub trait RenderContext {
    // ===== PRESENTATION AND FRAME STATE =====

    fn present(&mut self) -> Result<()>;

    fn set_vsync(&mut self, vsync: &VsyncDesc) -> Result<()>;

    fn set_viewports(&mut self, viewports: &[Viewport]) -> Result<()>;

    fn set_scissors(&mut self, scissors: &[Rect2D]) -> Result<()>;

    fn set_clear_color(&mut self, color: Vec4) -> Result<()>;

    fn set_clear_depth(&mut self, depth: f32) -> Result<()>;

    fn set_clear_stencil(&mut self, stencil: u32) -> Result<()>;

    fn clear_buffers(&mut self, flags: ClearFlags) -> Result<()>;

    // ===== BUFFERS =====

    fn set_vertex_buffer(&mut self, buffer: &dyn Buffer) -> Result<()>;

    fn set_index_buffer(&mut self, buffer: &dyn Buffer, index_type: IndexType) -> Result<()>;

    fn set_constant_buffer(&mut self, buffer: &dyn Buffer, slot: u32) -> Result<()>;

    fn set_storage_buffer(&mut self, buffer: &dyn Buffer, slot: u32) -> Result<()>;

    /// Map a storage buffer into CPU memory
    ///
    /// The pointer stays valid until `unmap_storage_buffer` is called for
    /// the same buffer.
    fn map_storage_buffer(&mut self, buffer: &dyn Buffer, access: CpuAccess) -> Result<*mut u8>;

    fn unmap_storage_buffer(&mut self, buffer: &dyn Buffer) -> Result<()>;

    // ===== TEXTURES AND SAMPLERS =====

    fn set_texture(&mut self, texture: &dyn Texture, slot: u32) -> Result<()>;

    fn generate_mips(&mut self, texture: &dyn Texture) -> Result<()>;

    fn set_sampler(&mut self, sampler: &dyn Sampler, slot: u32) -> Result<()>;

    // ===== RESOURCE HEAPS =====

    fn set_graphics_resource_heap(&mut self, heap: &dyn ResourceHeap, first_set: u32) -> Result<()>;

    fn set_compute_resource_heap(&mut self, heap: &dyn ResourceHeap, first_set: u32) -> Result<()>;

    // ===== RENDER TARGETS =====

    fn set_render_target(&mut self, target: &dyn RenderTarget) -> Result<()>;

    /// Return to the default (swapchain) render target
    fn unset_render_target(&mut self) -> Result<()>;

    // ===== PIPELINES =====

    fn set_graphics_pipeline(&mut self, pipeline: &dyn GraphicsPipeline) -> Result<()>;

    fn set_compute_pipeline(&mut self, pipeline: &dyn ComputePipeline) -> Result<()>;

    // ===== QUERIES =====

    fn begin_query(&mut self, query: &dyn Query) -> Result<()>;

    fn end_query(&mut self, query: &dyn Query) -> Result<()>;

    /// Result of a finished query, or None if it is not available yet
    fn query_result(&mut self, query: &dyn Query) -> Result<Option<u64>>;

    // ===== DRAWING =====

    fn set_primitive_topology(&mut self, topology: PrimitiveTopology) -> Result<()>;

    fn draw(&mut self, num_vertices: u32, first_vertex: u32) -> Result<()>;

    fn draw_indexed(&mut self, num_indices: u32, first_index: u32, vertex_offset: i32) -> Result<()>;

    fn draw_instanced(
        &mut self,
        num_vertices: u32,
        first_vertex: u32,
        num_instances: u32,
        instance_offset: u32,
    ) -> Result<()>;

    fn draw_indexed_instanced(
        &mut self,
        num_indices: u32,
        num_instances: u32,
        first_index: u32,
        vertex_offset: i32,
        instance_offset: u32,
    ) -> Result<()>;

    // ===== COMPUTE =====

    fn dispatch_compute(&mut self, thread_groups: UVec3) -> Result<()>;

    // ===== SYNCHRONISATION =====

    /// Block until the GPU has finished all submitted work
    fn sync_gpu(&mut self) -> Result<()>;
}
