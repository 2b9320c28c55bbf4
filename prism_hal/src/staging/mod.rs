/// Staging module - upload and readback memory pooling

pub mod staging_memory;
pub mod staging_buffer_chunk;
pub mod staging_buffer;
pub mod staging_buffer_pool;

pub use staging_memory::*;
pub use staging_buffer_chunk::*;
pub use staging_buffer::*;
pub use staging_buffer_pool::*;
