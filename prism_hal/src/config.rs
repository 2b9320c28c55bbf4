/// HAL configuration shared by every backend

/// Default size of one staging chunk (64 KiB)
pub const DEFAULT_STAGING_CHUNK_SIZE: u64 = 0x10000;

/// Configuration used when creating devices, staging pools and debug contexts
#[derive(Debug, Clone)]
pub struct Config {
    /// Application name (reported to the native API where supported)
    pub app_name: String,
    /// Application version (major, minor, patch)
    pub app_version: (u32, u32, u32),
    /// Wrap render contexts in the validating debug layer
    pub enable_debug_layer: bool,
    /// Attach a rendering profiler to debug render contexts
    pub enable_profiler: bool,
    /// Request native validation layers (e.g. VK_LAYER_KHRONOS_validation)
    pub enable_validation_layers: bool,
    /// Size in bytes of each staging chunk allocated by a staging pool
    pub staging_chunk_size: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            app_name: "Prism Application".to_string(),
            app_version: (1, 0, 0),
            enable_debug_layer: cfg!(debug_assertions),
            enable_profiler: false,
            enable_validation_layers: cfg!(debug_assertions),
            staging_chunk_size: DEFAULT_STAGING_CHUNK_SIZE,
        }
    }
}
