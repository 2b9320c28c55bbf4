/// Debug render context
///
/// Wraps any `RenderContext`, forwards every call unchanged, and around the
/// forwarded calls runs validation (when a debugger is attached) and
/// profiling (when a profiler is attached). Capability errors are fatal:
/// a call that needs a feature or limit the `RenderingCaps` do not grant
/// (instancing, compute, storage buffers, the patch size, the viewport
/// count) returns `Error::UnsupportedFeature` and is never forwarded.

use std::sync::Arc;
use glam::{UVec3, Vec4};
use crate::config::Config;
use crate::error::{Error, Result};
use crate::render::{
    Buffer, Texture, Sampler, ResourceHeap, RenderTarget, GraphicsPipeline, ComputePipeline,
    Query, PrimitiveTopology, RenderContext, RenderingCaps,
    ClearFlags, CpuAccess, IndexType, Viewport, Rect2D, VsyncDesc,
};
use crate::debug::{RenderingDebugger, RecordingDebugger, RenderingProfiler, WarningType, ErrorType};
use crate::hal_debug;

pub struct DebugRenderContext<C: RenderContext> {
    instance: C,
    profiler: Option<Arc<RenderingProfiler>>,
    debugger: Option<Arc<dyn RenderingDebugger>>,
    caps: RenderingCaps,
    topology: PrimitiveTopology,
}

impl<C: RenderContext> DebugRenderContext<C> {
    pub fn new(
        instance: C,
        profiler: Option<Arc<RenderingProfiler>>,
        debugger: Option<Arc<dyn RenderingDebugger>>,
        caps: RenderingCaps,
    ) -> Self {
        Self {
            instance,
            profiler,
            debugger,
            caps,
            topology: PrimitiveTopology::default(),
        }
    }

    /// Wrap `instance` with the collaborators `config` asks for
    ///
    /// `enable_debug_layer` attaches a `RecordingDebugger`,
    /// `enable_profiler` a fresh `RenderingProfiler`.
    pub fn from_config(instance: C, config: &Config, caps: RenderingCaps) -> Self {
        let debugger: Option<Arc<dyn RenderingDebugger>> = if config.enable_debug_layer {
            Some(Arc::new(RecordingDebugger::new()))
        } else {
            None
        };
        let profiler = config.enable_profiler.then(|| Arc::new(RenderingProfiler::new()));

        hal_debug!(
            "prism::debug",
            "Debug render context created (debugger: {}, profiler: {})",
            debugger.is_some(), profiler.is_some()
        );
        Self::new(instance, profiler, debugger, caps)
    }

    pub fn instance(&self) -> &C {
        &self.instance
    }

    pub fn instance_mut(&mut self) -> &mut C {
        &mut self.instance
    }

    pub fn into_inner(self) -> C {
        self.instance
    }

    pub fn profiler(&self) -> Option<&Arc<RenderingProfiler>> {
        self.profiler.as_ref()
    }

    pub fn debugger(&self) -> Option<&Arc<dyn RenderingDebugger>> {
        self.debugger.as_ref()
    }

    pub fn caps(&self) -> &RenderingCaps {
        &self.caps
    }

    /// Topology set by the last `set_primitive_topology`
    pub fn topology(&self) -> PrimitiveTopology {
        self.topology
    }

    // ===== VALIDATION =====

    fn profile(&self, counter: impl FnOnce(&RenderingProfiler)) {
        if let Some(profiler) = &self.profiler {
            counter(profiler);
        }
    }

    fn debug_draw(&self, num_vertices: u32, num_instances: u32, indexed: bool, source: &str) {
        let Some(debugger) = &self.debugger else {
            return;
        };

        debugger.check_graphics_pipeline(source);
        debugger.check_vertex_buffer(source);
        if indexed {
            debugger.check_index_buffer(source);
        }
        self.debug_num_vertices(&**debugger, num_vertices, source);
        if num_instances == 0 {
            debugger.post_warning(WarningType::PointlessOperation, "no instances will be generated", source);
        }
    }

    fn debug_num_vertices(&self, debugger: &dyn RenderingDebugger, num_vertices: u32, source: &str) {
        if num_vertices == 0 {
            debugger.post_warning(WarningType::PointlessOperation, "no vertices will be generated", source);
        }

        let improper = match self.topology {
            PrimitiveTopology::PointList => None,
            PrimitiveTopology::LineList => (num_vertices % 2 != 0).then_some("line list".to_string()),
            PrimitiveTopology::LineStrip => (num_vertices < 2).then_some("line strip".to_string()),
            PrimitiveTopology::LineLoop => (num_vertices < 2).then_some("line loop".to_string()),
            PrimitiveTopology::LineListAdjacency => {
                (num_vertices % 2 != 0).then_some("line list adjacency".to_string())
            }
            PrimitiveTopology::LineStripAdjacency => {
                (num_vertices < 2).then_some("line strip adjacency".to_string())
            }
            PrimitiveTopology::TriangleList => (num_vertices % 3 != 0).then_some("triangle list".to_string()),
            PrimitiveTopology::TriangleStrip => (num_vertices < 3).then_some("triangle strip".to_string()),
            PrimitiveTopology::TriangleFan => (num_vertices < 3).then_some("triangle fan".to_string()),
            PrimitiveTopology::TriangleListAdjacency => {
                (num_vertices % 3 != 0).then_some("triangle list adjacency".to_string())
            }
            PrimitiveTopology::TriangleStripAdjacency => {
                (num_vertices < 3).then_some("triangle strip adjacency".to_string())
            }
            patches => patches
                .patch_size()
                .filter(|patch_size| num_vertices % patch_size != 0)
                .map(|patch_size| format!("patch{}", patch_size)),
        };

        if let Some(topology_name) = improper {
            debugger.post_warning(
                WarningType::ImproperArgument,
                &format!("improper number of vertices for {}", topology_name),
                source,
            );
        }
    }

    fn assert_instancing_supported(&self, instance_offset: u32, source: &str) -> Result<()> {
        if !self.caps.has_instancing {
            return self.err_not_supported("instancing", source);
        }
        if instance_offset != 0 && !self.caps.has_offset_instancing {
            return self.err_not_supported("offset instancing", source);
        }
        Ok(())
    }

    fn assert_storage_buffers_supported(&self, source: &str) -> Result<()> {
        if !self.caps.has_storage_buffers {
            return self.err_not_supported("storage buffers", source);
        }
        Ok(())
    }

    fn assert_topology_supported(&self, source: &str) -> Result<()> {
        match self.topology.patch_size() {
            Some(patch_size) if patch_size > self.caps.max_patch_vertices => {
                self.err_not_supported(&format!("patches with {} control points", patch_size), source)
            }
            _ => Ok(()),
        }
    }

    fn err_not_supported(&self, feature: &str, source: &str) -> Result<()> {
        if let Some(debugger) = &self.debugger {
            debugger.post_error(ErrorType::UnsupportedFeature, &format!("{} is not supported", feature), source);
        }
        Err(Error::UnsupportedFeature {
            feature: feature.to_string(),
            source: source.to_string(),
        })
    }
}

impl<C: RenderContext> RenderContext for DebugRenderContext<C> {
    // ===== PRESENTATION AND FRAME STATE =====

    fn present(&mut self) -> Result<()> {
        self.instance.present()
    }

    fn set_vsync(&mut self, vsync: &VsyncDesc) -> Result<()> {
        self.instance.set_vsync(vsync)
    }

    fn set_viewports(&mut self, viewports: &[Viewport]) -> Result<()> {
        if viewports.len() > self.caps.max_viewports as usize {
            return self.err_not_supported(&format!("{} viewports", viewports.len()), "set_viewports");
        }
        self.instance.set_viewports(viewports)
    }

    fn set_scissors(&mut self, scissors: &[Rect2D]) -> Result<()> {
        self.instance.set_scissors(scissors)
    }

    fn set_clear_color(&mut self, color: Vec4) -> Result<()> {
        self.instance.set_clear_color(color)
    }

    fn set_clear_depth(&mut self, depth: f32) -> Result<()> {
        self.instance.set_clear_depth(depth)
    }

    fn set_clear_stencil(&mut self, stencil: u32) -> Result<()> {
        self.instance.set_clear_stencil(stencil)
    }

    fn clear_buffers(&mut self, flags: ClearFlags) -> Result<()> {
        self.instance.clear_buffers(flags)
    }

    // ===== BUFFERS =====

    fn set_vertex_buffer(&mut self, buffer: &dyn Buffer) -> Result<()> {
        self.instance.set_vertex_buffer(buffer)?;
        self.profile(|p| p.set_vertex_buffer.inc());
        Ok(())
    }

    fn set_index_buffer(&mut self, buffer: &dyn Buffer, index_type: IndexType) -> Result<()> {
        self.instance.set_index_buffer(buffer, index_type)?;
        self.profile(|p| p.set_index_buffer.inc());
        Ok(())
    }

    fn set_constant_buffer(&mut self, buffer: &dyn Buffer, slot: u32) -> Result<()> {
        self.instance.set_constant_buffer(buffer, slot)?;
        self.profile(|p| p.set_constant_buffer.inc());
        Ok(())
    }

    fn set_storage_buffer(&mut self, buffer: &dyn Buffer, slot: u32) -> Result<()> {
        self.assert_storage_buffers_supported("set_storage_buffer")?;
        self.instance.set_storage_buffer(buffer, slot)?;
        self.profile(|p| p.set_storage_buffer.inc());
        Ok(())
    }

    fn map_storage_buffer(&mut self, buffer: &dyn Buffer, access: CpuAccess) -> Result<*mut u8> {
        self.assert_storage_buffers_supported("map_storage_buffer")?;
        self.profile(|p| p.map_storage_buffer.inc());
        self.instance.map_storage_buffer(buffer, access)
    }

    fn unmap_storage_buffer(&mut self, buffer: &dyn Buffer) -> Result<()> {
        self.instance.unmap_storage_buffer(buffer)
    }

    // ===== TEXTURES AND SAMPLERS =====

    fn set_texture(&mut self, texture: &dyn Texture, slot: u32) -> Result<()> {
        self.instance.set_texture(texture, slot)?;
        self.profile(|p| p.set_texture.inc());
        Ok(())
    }

    fn generate_mips(&mut self, texture: &dyn Texture) -> Result<()> {
        self.instance.generate_mips(texture)
    }

    fn set_sampler(&mut self, sampler: &dyn Sampler, slot: u32) -> Result<()> {
        self.instance.set_sampler(sampler, slot)?;
        self.profile(|p| p.set_sampler.inc());
        Ok(())
    }

    // ===== RESOURCE HEAPS =====

    fn set_graphics_resource_heap(&mut self, heap: &dyn ResourceHeap, first_set: u32) -> Result<()> {
        self.instance.set_graphics_resource_heap(heap, first_set)?;
        self.profile(|p| p.set_resource_heap.inc());
        Ok(())
    }

    fn set_compute_resource_heap(&mut self, heap: &dyn ResourceHeap, first_set: u32) -> Result<()> {
        self.instance.set_compute_resource_heap(heap, first_set)?;
        self.profile(|p| p.set_resource_heap.inc());
        Ok(())
    }

    // ===== RENDER TARGETS =====

    fn set_render_target(&mut self, target: &dyn RenderTarget) -> Result<()> {
        self.instance.set_render_target(target)?;
        self.profile(|p| p.set_render_target.inc());
        Ok(())
    }

    fn unset_render_target(&mut self) -> Result<()> {
        self.instance.unset_render_target()?;
        self.profile(|p| p.set_render_target.inc());
        Ok(())
    }

    // ===== PIPELINES =====

    fn set_graphics_pipeline(&mut self, pipeline: &dyn GraphicsPipeline) -> Result<()> {
        self.instance.set_graphics_pipeline(pipeline)?;
        self.profile(|p| p.set_graphics_pipeline.inc());
        Ok(())
    }

    fn set_compute_pipeline(&mut self, pipeline: &dyn ComputePipeline) -> Result<()> {
        self.instance.set_compute_pipeline(pipeline)?;
        self.profile(|p| p.set_compute_pipeline.inc());
        Ok(())
    }

    // ===== QUERIES =====

    fn begin_query(&mut self, query: &dyn Query) -> Result<()> {
        self.instance.begin_query(query)
    }

    fn end_query(&mut self, query: &dyn Query) -> Result<()> {
        self.instance.end_query(query)
    }

    fn query_result(&mut self, query: &dyn Query) -> Result<Option<u64>> {
        self.instance.query_result(query)
    }

    // ===== DRAWING =====

    fn set_primitive_topology(&mut self, topology: PrimitiveTopology) -> Result<()> {
        self.topology = topology;
        self.instance.set_primitive_topology(topology)
    }

    fn draw(&mut self, num_vertices: u32, first_vertex: u32) -> Result<()> {
        self.assert_topology_supported("draw")?;
        self.debug_draw(num_vertices, 1, false, "draw");
        self.instance.draw(num_vertices, first_vertex)?;
        self.profile(|p| p.record_draw_call(self.topology, num_vertices, 1, false));
        Ok(())
    }

    fn draw_indexed(&mut self, num_indices: u32, first_index: u32, vertex_offset: i32) -> Result<()> {
        self.assert_topology_supported("draw_indexed")?;
        self.debug_draw(num_indices, 1, true, "draw_indexed");
        self.instance.draw_indexed(num_indices, first_index, vertex_offset)?;
        self.profile(|p| p.record_draw_call(self.topology, num_indices, 1, false));
        Ok(())
    }

    fn draw_instanced(
        &mut self,
        num_vertices: u32,
        first_vertex: u32,
        num_instances: u32,
        instance_offset: u32,
    ) -> Result<()> {
        self.assert_instancing_supported(instance_offset, "draw_instanced")?;
        self.assert_topology_supported("draw_instanced")?;
        self.debug_draw(num_vertices, num_instances, false, "draw_instanced");
        self.instance.draw_instanced(num_vertices, first_vertex, num_instances, instance_offset)?;
        self.profile(|p| p.record_draw_call(self.topology, num_vertices, num_instances, true));
        Ok(())
    }

    fn draw_indexed_instanced(
        &mut self,
        num_indices: u32,
        num_instances: u32,
        first_index: u32,
        vertex_offset: i32,
        instance_offset: u32,
    ) -> Result<()> {
        self.assert_instancing_supported(instance_offset, "draw_indexed_instanced")?;
        self.assert_topology_supported("draw_indexed_instanced")?;
        self.debug_draw(num_indices, num_instances, true, "draw_indexed_instanced");
        self.instance
            .draw_indexed_instanced(num_indices, num_instances, first_index, vertex_offset, instance_offset)?;
        self.profile(|p| p.record_draw_call(self.topology, num_indices, num_instances, true));
        Ok(())
    }

    // ===== COMPUTE =====

    fn dispatch_compute(&mut self, thread_groups: UVec3) -> Result<()> {
        if !self.caps.has_compute_shaders {
            return self.err_not_supported("compute shaders", "dispatch_compute");
        }
        self.instance.dispatch_compute(thread_groups)?;
        self.profile(|p| p.dispatch_compute_calls.inc());
        Ok(())
    }

    // ===== SYNCHRONISATION =====

    fn sync_gpu(&mut self) -> Result<()> {
        self.instance.sync_gpu()
    }
}

#[cfg(test)]
#[path = "debug_render_context_tests.rs"]
mod tests;
