//! Error types for the Prism HAL
//!
//! This module defines the single error type shared by every backend,
//! covering construction failures (pipeline layouts, resource heaps),
//! runtime capability failures raised by the debug layer, and native
//! backend failures.

use std::fmt;

/// Result type for Prism HAL operations
pub type Result<T> = std::result::Result<T, Error>;

/// Prism HAL errors
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// Backend-specific error (Vulkan, OpenGL, etc.)
    BackendError(String),

    /// Out of GPU memory
    OutOfMemory,

    /// Invalid resource (buffer, texture, sampler, etc.)
    InvalidResource(String),

    /// Initialization failed (device, context, subsystems)
    InitializationFailed(String),

    /// A resource heap was requested without a pipeline layout
    MissingPipelineLayout,

    /// The pipeline layout cannot be used by this backend
    IncompatiblePipelineLayout(String),

    /// A resource view carries a type that cannot be bound through a resource heap
    InvalidResourceViewType(u32),

    /// The resource view list and the pipeline layout binding slots differ in length
    BindingCountMismatch {
        /// Number of resource views in the heap descriptor
        resource_views: usize,
        /// Number of destination binding slots in the pipeline layout
        binding_slots: usize,
    },

    /// A feature was used that the active capability set does not report
    UnsupportedFeature {
        /// Feature name (e.g. "instancing")
        feature: String,
        /// Call that used the feature (e.g. "draw_instanced")
        source: String,
    },

    /// Mapping GPU memory into the CPU address space failed
    MapFailed(String),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::BackendError(msg) => write!(f, "Backend error: {}", msg),
            Error::OutOfMemory => write!(f, "Out of GPU memory"),
            Error::InvalidResource(msg) => write!(f, "Invalid resource: {}", msg),
            Error::InitializationFailed(msg) => write!(f, "Initialization failed: {}", msg),
            Error::MissingPipelineLayout => {
                write!(f, "Failed to create resource heap due to missing pipeline layout")
            }
            Error::IncompatiblePipelineLayout(msg) => {
                write!(f, "Incompatible pipeline layout: {}", msg)
            }
            Error::InvalidResourceViewType(code) => {
                write!(f, "Invalid resource view type to create resource heap: 0x{:08X}", code)
            }
            Error::BindingCountMismatch { resource_views, binding_slots } => write!(
                f,
                "Resource view count ({}) does not match pipeline layout binding count ({})",
                resource_views, binding_slots
            ),
            Error::UnsupportedFeature { feature, source } => {
                write!(f, "{} is not supported (in '{}')", feature, source)
            }
            Error::MapFailed(msg) => write!(f, "Failed to map GPU memory: {}", msg),
        }
    }
}

impl std::error::Error for Error {}

#[cfg(test)]
#[path = "error_tests.rs"]
mod tests;
