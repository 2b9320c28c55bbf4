/// Descriptor module - pool sizing and binding-slot assignment for resource heaps

pub mod descriptor_type;
pub mod pool_size;
pub mod resource_heap_plan;

pub use descriptor_type::*;
pub use pool_size::*;
pub use resource_heap_plan::*;
