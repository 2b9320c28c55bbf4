/// Pipeline layout trait and descriptors

use bitflags::bitflags;
use crate::render::{NativeHandle, ResourceType};

bitflags! {
    /// Shader stages a binding is visible to
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct StageFlags: u32 {
        const VERTEX = 1 << 0;
        const TESS_CONTROL = 1 << 1;
        const TESS_EVALUATION = 1 << 2;
        const GEOMETRY = 1 << 3;
        const FRAGMENT = 1 << 4;
        const COMPUTE = 1 << 5;

        const ALL_GRAPHICS = Self::VERTEX.bits()
            | Self::TESS_CONTROL.bits()
            | Self::TESS_EVALUATION.bits()
            | Self::GEOMETRY.bits()
            | Self::FRAGMENT.bits();
    }
}

/// One binding point of a pipeline layout
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BindingDesc {
    /// Shader-visible resource name (may be empty on backends that bind by slot)
    pub name: String,
    /// Kind of resource bound at this point
    pub resource_type: ResourceType,
    /// Shader stages the binding is visible to
    pub stage_flags: StageFlags,
    /// Binding slot
    pub slot: u32,
}

impl BindingDesc {
    pub fn new(name: impl Into<String>, resource_type: ResourceType, stage_flags: StageFlags, slot: u32) -> Self {
        Self {
            name: name.into(),
            resource_type,
            stage_flags,
            slot,
        }
    }
}

/// Descriptor for creating a pipeline layout
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PipelineLayoutDesc {
    /// Bindings in declaration order
    pub bindings: Vec<BindingDesc>,
}

/// Pipeline layout trait
///
/// Describes the binding points of a pipeline. Resource heaps hold a shared
/// reference to the layout they were built against.
pub trait PipelineLayout: Send + Sync {
    /// Bindings in declaration order
    fn bindings(&self) -> &[BindingDesc];

    /// Destination binding slots, one per binding, in declaration order
    fn dst_bindings(&self) -> &[u32];

    /// Native handle of the pipeline layout object
    fn native_handle(&self) -> NativeHandle;

    /// Native descriptor-set layout, if the backend has one
    fn native_set_layout(&self) -> Option<NativeHandle> {
        None
    }
}
