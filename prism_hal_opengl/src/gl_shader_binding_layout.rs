/// GlShaderBindingLayout - named resource bindings of an OpenGL program
///
/// Resolves the named bindings of a pipeline layout into one flat list
/// partitioned by category: sampler uniforms first, then uniform blocks,
/// then shader-storage blocks, each in declaration order. Applying the
/// layout to a program assigns every name its binding slot. Programs built
/// against equivalent layouts can share one layout (see
/// `GlShaderBindingLayoutPool`).

use std::cmp::Ordering;
use prism_hal::prism::render::{PipelineLayout, ResourceType};
use prism_hal::hal_trace;

use crate::gl_pipeline_layout::GlPipelineLayout;
use crate::gl_program_api::{GLint, GLuint, GlProgramApi, GL_INVALID_INDEX};
use crate::gl_state_manager::GlStateManager;

/// A shader resource name and the slot it is bound to
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GlResourceBinding {
    pub name: String,
    pub slot: u32,
}

/// Binding category of a resource type, or None if it is not bound by name
fn binding_category(resource_type: ResourceType) -> Option<usize> {
    match resource_type {
        ResourceType::Sampler | ResourceType::Texture => Some(0),
        ResourceType::ConstantBuffer => Some(1),
        ResourceType::StorageBuffer => Some(2),
        _ => None,
    }
}

#[derive(Debug, Clone, Default)]
pub struct GlShaderBindingLayout {
    num_uniform_bindings: usize,
    num_uniform_block_bindings: usize,
    num_shader_storage_bindings: usize,
    bindings: Vec<GlResourceBinding>,
}

impl GlShaderBindingLayout {
    pub fn new(pipeline_layout: &GlPipelineLayout) -> Self {
        let mut categories: [Vec<GlResourceBinding>; 3] = Default::default();

        for binding in pipeline_layout.bindings() {
            if binding.name.is_empty() {
                continue;
            }
            if let Some(category) = binding_category(binding.resource_type) {
                categories[category].push(GlResourceBinding {
                    name: binding.name.clone(),
                    slot: binding.slot,
                });
            }
        }

        let [uniforms, uniform_blocks, storage_blocks] = categories;
        let mut layout = Self {
            num_uniform_bindings: uniforms.len(),
            num_uniform_block_bindings: uniform_blocks.len(),
            num_shader_storage_bindings: storage_blocks.len(),
            bindings: Vec::with_capacity(uniforms.len() + uniform_blocks.len() + storage_blocks.len()),
        };
        layout.bindings.extend(uniforms);
        layout.bindings.extend(uniform_blocks);
        layout.bindings.extend(storage_blocks);
        layout
    }

    /// Assign the binding slots of this layout to `program`
    ///
    /// Sampler uniforms are set on the current program, so with uniform
    /// bindings present `program` is made current through `state_manager`.
    /// Without a state manager the caller must have bound `program`.
    /// Names the program does not declare are skipped.
    pub fn uniform_and_block_binding(
        &self,
        api: &mut dyn GlProgramApi,
        program: GLuint,
        state_manager: Option<&mut GlStateManager>,
    ) {
        let (uniforms, rest) = self.bindings.split_at(self.num_uniform_bindings);
        let (uniform_blocks, storage_blocks) = rest.split_at(self.num_uniform_block_bindings);

        if !uniforms.is_empty() {
            if let Some(state_manager) = state_manager {
                state_manager.bind_program(api, program);
            }
            for binding in uniforms {
                let location = api.get_uniform_location(program, &binding.name);
                if location != -1 {
                    api.uniform_1i(location, binding.slot as GLint);
                } else {
                    hal_trace!("prism::opengl", "Program {} has no uniform '{}'", program, binding.name);
                }
            }
        }

        for binding in uniform_blocks {
            let block_index = api.get_uniform_block_index(program, &binding.name);
            if block_index != GL_INVALID_INDEX {
                api.uniform_block_binding(program, block_index, binding.slot);
            } else {
                hal_trace!("prism::opengl", "Program {} has no uniform block '{}'", program, binding.name);
            }
        }

        for binding in storage_blocks {
            let block_index = api.get_shader_storage_block_index(program, &binding.name);
            if block_index != GL_INVALID_INDEX {
                api.shader_storage_block_binding(program, block_index, binding.slot);
            } else {
                hal_trace!("prism::opengl", "Program {} has no storage block '{}'", program, binding.name);
            }
        }
    }

    /// Returns true if this layout has at least one binding
    pub fn has_bindings(&self) -> bool {
        !self.bindings.is_empty()
    }

    pub fn bindings(&self) -> &[GlResourceBinding] {
        &self.bindings
    }

    pub fn num_uniform_bindings(&self) -> usize {
        self.num_uniform_bindings
    }

    pub fn num_uniform_block_bindings(&self) -> usize {
        self.num_uniform_block_bindings
    }

    pub fn num_shader_storage_bindings(&self) -> usize {
        self.num_shader_storage_bindings
    }

    /// Strict-weak-order comparison of two layouts
    ///
    /// Compares the three category counts, then the bindings pairwise by
    /// slot and then by name. Equal layouts apply identically to a program.
    pub fn compare_swo(lhs: &Self, rhs: &Self) -> Ordering {
        lhs.num_uniform_bindings
            .cmp(&rhs.num_uniform_bindings)
            .then(lhs.num_uniform_block_bindings.cmp(&rhs.num_uniform_block_bindings))
            .then(lhs.num_shader_storage_bindings.cmp(&rhs.num_shader_storage_bindings))
            .then_with(|| {
                lhs.bindings
                    .iter()
                    .zip(&rhs.bindings)
                    .map(|(a, b)| a.slot.cmp(&b.slot).then_with(|| a.name.cmp(&b.name)))
                    .find(|ordering| ordering.is_ne())
                    .unwrap_or(Ordering::Equal)
            })
    }
}

impl PartialEq for GlShaderBindingLayout {
    fn eq(&self, other: &Self) -> bool {
        Self::compare_swo(self, other) == Ordering::Equal
    }
}

impl Eq for GlShaderBindingLayout {}

impl PartialOrd for GlShaderBindingLayout {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for GlShaderBindingLayout {
    fn cmp(&self, other: &Self) -> Ordering {
        Self::compare_swo(self, other)
    }
}

#[cfg(test)]
#[path = "gl_shader_binding_layout_tests.rs"]
mod tests;
