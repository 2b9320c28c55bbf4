/// Rendering capabilities reported by a backend

/// Capability set consulted by the debug layer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RenderingCaps {
    /// Instanced draw calls are supported
    pub has_instancing: bool,
    /// Instanced draw calls with a non-zero instance offset are supported
    pub has_offset_instancing: bool,
    /// Compute shaders and `dispatch_compute` are supported
    pub has_compute_shaders: bool,
    /// Storage buffers are supported
    pub has_storage_buffers: bool,
    /// Maximum number of control points per patch (0 = no tessellation)
    pub max_patch_vertices: u32,
    /// Maximum number of simultaneous viewports
    pub max_viewports: u32,
}
