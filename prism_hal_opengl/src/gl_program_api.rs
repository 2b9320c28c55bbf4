/// OpenGL program entry points used for binding layout resolution
///
/// The crate does not load OpenGL itself. The application implements
/// `GlProgramApi` over its loader of choice (one call per GL function) and
/// passes it to the binding code, on the thread that owns the GL context.

pub type GLuint = u32;
pub type GLint = i32;

/// `GL_INVALID_INDEX`, returned for unknown uniform and storage blocks
pub const GL_INVALID_INDEX: GLuint = 0xFFFF_FFFF;

/// Program-object functions of OpenGL 4.3
pub trait GlProgramApi {
    /// `glUseProgram`
    fn use_program(&mut self, program: GLuint);

    /// `glGetUniformLocation`, -1 if the program has no such uniform
    fn get_uniform_location(&mut self, program: GLuint, name: &str) -> GLint;

    /// `glUniform1i` on the current program
    fn uniform_1i(&mut self, location: GLint, value: GLint);

    /// `glGetUniformBlockIndex`, `GL_INVALID_INDEX` if not found
    fn get_uniform_block_index(&mut self, program: GLuint, name: &str) -> GLuint;

    /// `glUniformBlockBinding`
    fn uniform_block_binding(&mut self, program: GLuint, block_index: GLuint, binding: GLuint);

    /// `glGetProgramResourceIndex(program, GL_SHADER_STORAGE_BLOCK, name)`,
    /// `GL_INVALID_INDEX` if not found
    fn get_shader_storage_block_index(&mut self, program: GLuint, name: &str) -> GLuint;

    /// `glShaderStorageBlockBinding`
    fn shader_storage_block_binding(&mut self, program: GLuint, block_index: GLuint, binding: GLuint);
}
