/// Buffer trait and buffer descriptor

use crate::render::{TrackedResource, ResourceState};

/// Buffer usage
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BufferUsage {
    /// Vertex buffer
    Vertex,
    /// Index buffer
    Index,
    /// Constant (uniform) buffer
    Constant,
    /// Storage buffer
    Storage,
    /// Indirect argument buffer
    Indirect,
}

impl ResourceState {
    /// Resting usage state for a buffer of the given usage
    pub fn for_buffer_usage(usage: BufferUsage) -> ResourceState {
        match usage {
            BufferUsage::Vertex | BufferUsage::Constant => ResourceState::VertexAndConstantBuffer,
            BufferUsage::Index => ResourceState::IndexBuffer,
            BufferUsage::Storage => ResourceState::UnorderedAccess,
            BufferUsage::Indirect => ResourceState::IndirectArgument,
        }
    }
}

/// Descriptor for creating a buffer
#[derive(Debug, Clone)]
pub struct BufferDesc {
    /// Size in bytes
    pub size: u64,
    /// Buffer usage
    pub usage: BufferUsage,
}

/// Buffer resource trait
///
/// Implemented by backend-specific buffer types (e.g., VulkanBuffer).
/// The buffer is automatically destroyed when dropped.
pub trait Buffer: TrackedResource + Send + Sync {
    /// Size in bytes
    fn size(&self) -> u64;

    /// Usage the buffer was created with
    fn usage(&self) -> BufferUsage;
}
