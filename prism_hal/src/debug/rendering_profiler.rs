/// Rendering profiler
///
/// Counts binding, draw and dispatch calls and the primitives they render.
/// Counters are atomic so a shared profiler can be read from another
/// thread while a context records into it.

use std::sync::atomic::{AtomicU64, Ordering};
use crate::render::PrimitiveTopology;

/// Monotonic call counter
#[derive(Debug, Default)]
pub struct ProfilerCounter {
    value: AtomicU64,
}

impl ProfilerCounter {
    pub fn inc(&self) {
        self.add(1);
    }

    pub fn add(&self, amount: u64) {
        self.value.fetch_add(amount, Ordering::Relaxed);
    }

    pub fn get(&self) -> u64 {
        self.value.load(Ordering::Relaxed)
    }

    pub fn reset(&self) {
        self.value.store(0, Ordering::Relaxed);
    }
}

/// Primitive class a topology renders
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PrimitiveClass {
    Points,
    Lines,
    Triangles,
    Patches,
}

/// Number of primitives `num_vertices` vertices produce with `topology`
pub fn primitive_count(topology: PrimitiveTopology, num_vertices: u32) -> (PrimitiveClass, u64) {
    let n = u64::from(num_vertices);
    match topology {
        PrimitiveTopology::PointList => (PrimitiveClass::Points, n),
        PrimitiveTopology::LineList => (PrimitiveClass::Lines, n / 2),
        PrimitiveTopology::LineStrip => (PrimitiveClass::Lines, n.saturating_sub(1)),
        PrimitiveTopology::LineLoop => (PrimitiveClass::Lines, if n >= 2 { n } else { 0 }),
        PrimitiveTopology::LineListAdjacency => (PrimitiveClass::Lines, n / 4),
        PrimitiveTopology::LineStripAdjacency => (PrimitiveClass::Lines, n.saturating_sub(3)),
        PrimitiveTopology::TriangleList => (PrimitiveClass::Triangles, n / 3),
        PrimitiveTopology::TriangleStrip | PrimitiveTopology::TriangleFan => {
            (PrimitiveClass::Triangles, n.saturating_sub(2))
        }
        PrimitiveTopology::TriangleListAdjacency => (PrimitiveClass::Triangles, n / 6),
        PrimitiveTopology::TriangleStripAdjacency => (PrimitiveClass::Triangles, n.saturating_sub(4) / 2),
        patches => {
            let patch_size = u64::from(patches.patch_size().unwrap_or(1));
            (PrimitiveClass::Patches, n / patch_size)
        }
    }
}

/// Plain copy of all profiler counters
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ProfileSnapshot {
    pub set_vertex_buffer: u64,
    pub set_index_buffer: u64,
    pub set_constant_buffer: u64,
    pub set_storage_buffer: u64,
    pub map_storage_buffer: u64,
    pub set_texture: u64,
    pub set_sampler: u64,
    pub set_resource_heap: u64,
    pub set_render_target: u64,
    pub set_graphics_pipeline: u64,
    pub set_compute_pipeline: u64,
    pub draw_calls: u64,
    pub instanced_draw_calls: u64,
    pub dispatch_compute_calls: u64,
    pub rendered_points: u64,
    pub rendered_lines: u64,
    pub rendered_triangles: u64,
    pub rendered_patches: u64,
}

/// Call and primitive counters of a render context
#[derive(Debug, Default)]
pub struct RenderingProfiler {
    pub set_vertex_buffer: ProfilerCounter,
    pub set_index_buffer: ProfilerCounter,
    pub set_constant_buffer: ProfilerCounter,
    pub set_storage_buffer: ProfilerCounter,
    pub map_storage_buffer: ProfilerCounter,
    pub set_texture: ProfilerCounter,
    pub set_sampler: ProfilerCounter,
    /// Graphics and compute resource heaps
    pub set_resource_heap: ProfilerCounter,
    /// Includes `unset_render_target`
    pub set_render_target: ProfilerCounter,
    pub set_graphics_pipeline: ProfilerCounter,
    pub set_compute_pipeline: ProfilerCounter,
    pub draw_calls: ProfilerCounter,
    pub instanced_draw_calls: ProfilerCounter,
    pub dispatch_compute_calls: ProfilerCounter,
    pub rendered_points: ProfilerCounter,
    pub rendered_lines: ProfilerCounter,
    pub rendered_triangles: ProfilerCounter,
    pub rendered_patches: ProfilerCounter,
}

impl RenderingProfiler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one draw call of `num_vertices` vertices and `num_instances` instances
    pub fn record_draw_call(&self, topology: PrimitiveTopology, num_vertices: u32, num_instances: u32, instanced: bool) {
        self.draw_calls.inc();
        if instanced {
            self.instanced_draw_calls.inc();
        }

        let (class, primitives) = primitive_count(topology, num_vertices);
        let total = primitives * u64::from(num_instances);
        match class {
            PrimitiveClass::Points => self.rendered_points.add(total),
            PrimitiveClass::Lines => self.rendered_lines.add(total),
            PrimitiveClass::Triangles => self.rendered_triangles.add(total),
            PrimitiveClass::Patches => self.rendered_patches.add(total),
        }
    }

    /// Set every counter back to zero
    pub fn reset(&self) {
        for counter in self.counters() {
            counter.reset();
        }
    }

    pub fn snapshot(&self) -> ProfileSnapshot {
        ProfileSnapshot {
            set_vertex_buffer: self.set_vertex_buffer.get(),
            set_index_buffer: self.set_index_buffer.get(),
            set_constant_buffer: self.set_constant_buffer.get(),
            set_storage_buffer: self.set_storage_buffer.get(),
            map_storage_buffer: self.map_storage_buffer.get(),
            set_texture: self.set_texture.get(),
            set_sampler: self.set_sampler.get(),
            set_resource_heap: self.set_resource_heap.get(),
            set_render_target: self.set_render_target.get(),
            set_graphics_pipeline: self.set_graphics_pipeline.get(),
            set_compute_pipeline: self.set_compute_pipeline.get(),
            draw_calls: self.draw_calls.get(),
            instanced_draw_calls: self.instanced_draw_calls.get(),
            dispatch_compute_calls: self.dispatch_compute_calls.get(),
            rendered_points: self.rendered_points.get(),
            rendered_lines: self.rendered_lines.get(),
            rendered_triangles: self.rendered_triangles.get(),
            rendered_patches: self.rendered_patches.get(),
        }
    }

    fn counters(&self) -> [&ProfilerCounter; 18] {
        [
            &self.set_vertex_buffer,
            &self.set_index_buffer,
            &self.set_constant_buffer,
            &self.set_storage_buffer,
            &self.map_storage_buffer,
            &self.set_texture,
            &self.set_sampler,
            &self.set_resource_heap,
            &self.set_render_target,
            &self.set_graphics_pipeline,
            &self.set_compute_pipeline,
            &self.draw_calls,
            &self.instanced_draw_calls,
            &self.dispatch_compute_calls,
            &self.rendered_points,
            &self.rendered_lines,
            &self.rendered_triangles,
            &self.rendered_patches,
        ]
    }
}
