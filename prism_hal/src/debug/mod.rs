/// Debug module - validating and profiling render-context proxy

pub mod rendering_debugger;
pub mod rendering_profiler;
pub mod debug_render_context;

pub use rendering_debugger::*;
pub use rendering_profiler::*;
pub use debug_render_context::*;
