/// Render module - object model shared by every backend

// Module declarations
pub mod resource;
pub mod buffer;
pub mod texture;
pub mod sampler;
pub mod pipeline;
pub mod pipeline_layout;
pub mod resource_heap;
pub mod render_target;
pub mod query;
pub mod caps;
pub mod command_context;
pub mod render_context;

// Re-export everything
pub use resource::*;
pub use buffer::*;
pub use texture::*;
pub use sampler::*;
pub use pipeline::*;
pub use pipeline_layout::*;
pub use resource_heap::*;
pub use render_target::*;
pub use query::*;
pub use caps::*;
pub use command_context::*;
pub use render_context::*;

// Mock backend for tests (no GPU required)
#[cfg(test)]
pub mod mock_backend;
