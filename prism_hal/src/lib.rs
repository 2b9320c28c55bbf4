/*!
# Prism HAL

Core traits and types for the Prism cross-backend graphics hardware
abstraction layer.

This crate provides the backend-agnostic object model (buffers, textures,
pipeline layouts, resource heaps, render contexts) together with the
backend-neutral halves of the translation layer. Backend crates
(`prism_hal_vulkan`, `prism_hal_opengl`) implement the traits against a
native API.

## Architecture

- **StagingBufferPool**: chunked upload memory plus global upload/readback buffers
- **ResourceHeapPlan**: descriptor pool sizing and binding-slot assignment for resource heaps
- **DebugRenderContext**: validating, profiling proxy around any `RenderContext`
- **Hal**: process-wide logger sink used by the `hal_*` macros
*/

// Internal modules
mod error;
mod hal;
mod config;
pub mod log;
pub mod render;
pub mod staging;
pub mod descriptor;
pub mod debug;

// Main prism namespace module
pub mod prism {
    // Error types
    pub use crate::error::{Error, Result};

    // Logger sink
    pub use crate::hal::Hal;

    // Configuration
    pub use crate::config::{Config, DEFAULT_STAGING_CHUNK_SIZE};

    // Logging sub-module (types only, macros live at the crate root)
    pub mod log {
        pub use crate::log::{Logger, LogEntry, LogSeverity, DefaultLogger};
    }

    // Render sub-module with the object model
    pub mod render {
        pub use crate::render::*;
    }

    // Staging sub-module
    pub mod staging {
        pub use crate::staging::*;
    }

    // Descriptor aggregation sub-module
    pub mod descriptor {
        pub use crate::descriptor::*;
    }

    // Debug layer sub-module
    pub mod debug {
        pub use crate::debug::*;
    }
}

// Re-export math library at crate root
pub use glam;
