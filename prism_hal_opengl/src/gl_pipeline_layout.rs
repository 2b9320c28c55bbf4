/// GlPipelineLayout - OpenGL implementation of the PipelineLayout trait

use prism_hal::prism::render::{BindingDesc, NativeHandle, PipelineLayout, PipelineLayoutDesc};

/// Pipeline layout of the OpenGL backend
///
/// OpenGL has no layout object: the layout only keeps the binding list,
/// which program binding layouts resolve by name.
#[derive(Debug, Clone)]
pub struct GlPipelineLayout {
    bindings: Vec<BindingDesc>,
    dst_bindings: Vec<u32>,
}

impl GlPipelineLayout {
    pub fn new(desc: &PipelineLayoutDesc) -> Self {
        Self {
            bindings: desc.bindings.clone(),
            dst_bindings: desc.bindings.iter().map(|binding| binding.slot).collect(),
        }
    }
}

impl PipelineLayout for GlPipelineLayout {
    fn bindings(&self) -> &[BindingDesc] {
        &self.bindings
    }

    fn dst_bindings(&self) -> &[u32] {
        &self.dst_bindings
    }

    fn native_handle(&self) -> NativeHandle {
        NativeHandle::NULL
    }
}
