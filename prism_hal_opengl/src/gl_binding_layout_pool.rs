/// GlShaderBindingLayoutPool - shares equivalent binding layouts

use std::sync::Arc;
use prism_hal::hal_trace;

use crate::gl_pipeline_layout::GlPipelineLayout;
use crate::gl_shader_binding_layout::GlShaderBindingLayout;

/// Pool of binding layouts, deduplicated by `compare_swo`
///
/// Layouts are kept sorted so a lookup is a binary search.
#[derive(Debug, Default)]
pub struct GlShaderBindingLayoutPool {
    layouts: Vec<Arc<GlShaderBindingLayout>>,
}

impl GlShaderBindingLayoutPool {
    pub fn new() -> Self {
        Self::default()
    }

    /// Shared layout for `pipeline_layout`, created on first request
    pub fn create_layout(&mut self, pipeline_layout: &GlPipelineLayout) -> Arc<GlShaderBindingLayout> {
        let layout = GlShaderBindingLayout::new(pipeline_layout);

        match self
            .layouts
            .binary_search_by(|probe| GlShaderBindingLayout::compare_swo(probe, &layout))
        {
            Ok(index) => Arc::clone(&self.layouts[index]),
            Err(index) => {
                hal_trace!("prism::opengl", "New shader binding layout with {} bindings", layout.bindings().len());
                let layout = Arc::new(layout);
                self.layouts.insert(index, Arc::clone(&layout));
                layout
            }
        }
    }

    /// Drop the layouts no program refers to anymore
    pub fn release_unused(&mut self) {
        self.layouts.retain(|layout| Arc::strong_count(layout) > 1);
    }

    pub fn len(&self) -> usize {
        self.layouts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.layouts.is_empty()
    }

    pub fn clear(&mut self) {
        self.layouts.clear();
    }
}
