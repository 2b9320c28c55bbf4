/// GlStateManager - cache of bound OpenGL state

use prism_hal::hal_trace;

use crate::gl_program_api::{GLuint, GlProgramApi};

/// Tracks the current program so redundant `glUseProgram` calls are skipped
#[derive(Debug, Default)]
pub struct GlStateManager {
    bound_program: GLuint,
}

impl GlStateManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make `program` current if it is not already
    pub fn bind_program(&mut self, api: &mut dyn GlProgramApi, program: GLuint) {
        if self.bound_program != program {
            hal_trace!("prism::opengl", "glUseProgram({})", program);
            api.use_program(program);
            self.bound_program = program;
        }
    }

    /// Program currently bound, 0 if none
    pub fn bound_program(&self) -> GLuint {
        self.bound_program
    }

    /// Forget `program` if it is current, e.g. because it was deleted
    pub fn notify_program_release(&mut self, program: GLuint) {
        if self.bound_program == program {
            self.bound_program = 0;
        }
    }

    /// Forget all cached state, e.g. after foreign code touched the context
    pub fn invalidate(&mut self) {
        self.bound_program = 0;
    }
}
