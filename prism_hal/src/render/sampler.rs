/// Sampler trait and sampler descriptor

use crate::render::NativeHandle;

/// Texel filter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Filter {
    Nearest,
    Linear,
}

/// Texture coordinate addressing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AddressMode {
    Repeat,
    MirroredRepeat,
    ClampToEdge,
    ClampToBorder,
}

/// Descriptor for creating a sampler
#[derive(Debug, Clone)]
pub struct SamplerDesc {
    pub min_filter: Filter,
    pub mag_filter: Filter,
    pub mip_filter: Filter,
    pub address_mode: AddressMode,
    /// Maximum anisotropy (1.0 disables anisotropic filtering)
    pub max_anisotropy: f32,
}

impl Default for SamplerDesc {
    fn default() -> Self {
        Self {
            min_filter: Filter::Linear,
            mag_filter: Filter::Linear,
            mip_filter: Filter::Linear,
            address_mode: AddressMode::Repeat,
            max_anisotropy: 1.0,
        }
    }
}

/// Sampler state trait
pub trait Sampler: Send + Sync {
    /// Native handle of the sampler object
    fn native_handle(&self) -> NativeHandle;
}
