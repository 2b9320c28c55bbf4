/*!
# Prism HAL - OpenGL Backend

OpenGL implementation of the Prism HAL pipeline layout, plus the name
based resource binding model OpenGL programs need: a binding layout
resolves sampler uniforms, uniform blocks and shader-storage blocks of a
pipeline layout and assigns their slots to a program.

OpenGL is not loaded by this crate. Callers provide the program entry
points through `GlProgramApi`.
*/

mod gl_program_api;
mod gl_state_manager;
mod gl_pipeline_layout;
mod gl_shader_binding_layout;
mod gl_binding_layout_pool;

pub use gl_program_api::{GlProgramApi, GLint, GLuint, GL_INVALID_INDEX};
pub use gl_state_manager::GlStateManager;
pub use gl_pipeline_layout::GlPipelineLayout;
pub use gl_shader_binding_layout::{GlResourceBinding, GlShaderBindingLayout};
pub use gl_binding_layout_pool::GlShaderBindingLayoutPool;
