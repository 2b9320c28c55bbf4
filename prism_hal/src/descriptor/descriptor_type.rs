/// Backend-neutral descriptor types

use crate::error::{Error, Result};
use crate::render::ResourceType;

/// Kind of descriptor a resource view occupies
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DescriptorType {
    Sampler,
    SampledImage,
    UniformBuffer,
    StorageBuffer,
}

impl DescriptorType {
    /// Descriptor type of a resource view of the given kind
    ///
    /// Only samplers, textures, constant buffers and storage buffers can be
    /// bound through a resource heap; any other kind fails with
    /// `Error::InvalidResourceViewType` carrying its type code.
    pub fn from_resource_type(resource_type: ResourceType) -> Result<DescriptorType> {
        match resource_type {
            ResourceType::Sampler => Ok(DescriptorType::Sampler),
            ResourceType::Texture => Ok(DescriptorType::SampledImage),
            ResourceType::ConstantBuffer => Ok(DescriptorType::UniformBuffer),
            ResourceType::StorageBuffer => Ok(DescriptorType::StorageBuffer),
            other => Err(Error::InvalidResourceViewType(other.code())),
        }
    }
}
