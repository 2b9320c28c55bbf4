/// Primitive topology and pipeline state traits

use crate::render::NativeHandle;

/// Primitive topology, with stable ordinals
///
/// `Patches1` to `Patches32` are tessellation patch lists with 1 to 32
/// control points; their ordinals are contiguous.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
#[repr(u32)]
pub enum PrimitiveTopology {
    PointList,
    LineList,
    LineStrip,
    LineLoop,
    LineListAdjacency,
    LineStripAdjacency,
    #[default]
    TriangleList,
    TriangleStrip,
    TriangleFan,
    TriangleListAdjacency,
    TriangleStripAdjacency,
    Patches1,
    Patches2,
    Patches3,
    Patches4,
    Patches5,
    Patches6,
    Patches7,
    Patches8,
    Patches9,
    Patches10,
    Patches11,
    Patches12,
    Patches13,
    Patches14,
    Patches15,
    Patches16,
    Patches17,
    Patches18,
    Patches19,
    Patches20,
    Patches21,
    Patches22,
    Patches23,
    Patches24,
    Patches25,
    Patches26,
    Patches27,
    Patches28,
    Patches29,
    Patches30,
    Patches31,
    Patches32,
}

impl PrimitiveTopology {
    /// Number of control points per patch, or None for non-patch topologies
    pub fn patch_size(self) -> Option<u32> {
        let ordinal = self as u32;
        let first = PrimitiveTopology::Patches1 as u32;
        if ordinal >= first {
            Some(ordinal - first + 1)
        } else {
            None
        }
    }

    /// Returns true for the `Patches1` to `Patches32` topologies
    pub fn is_patches(self) -> bool {
        self.patch_size().is_some()
    }
}

/// Graphics pipeline state trait
pub trait GraphicsPipeline: Send + Sync {
    /// Native handle of the pipeline object
    fn native_handle(&self) -> NativeHandle;
}

/// Compute pipeline state trait
pub trait ComputePipeline: Send + Sync {
    /// Native handle of the pipeline object
    fn native_handle(&self) -> NativeHandle;
}
