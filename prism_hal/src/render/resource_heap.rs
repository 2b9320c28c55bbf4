/// Resource heap trait and descriptors

use std::sync::Arc;
use crate::render::{Buffer, Texture, Sampler, PipelineLayout, NativeHandle, ResourceType};

/// Borrowed resource referenced by a resource view
#[derive(Clone, Copy)]
pub enum ResourceRef<'a> {
    Buffer(&'a dyn Buffer),
    Texture(&'a dyn Texture),
    Sampler(&'a dyn Sampler),
}

impl<'a> ResourceRef<'a> {
    /// Short name of the referenced kind, used in error messages
    pub fn kind_name(&self) -> &'static str {
        match self {
            ResourceRef::Buffer(_) => "buffer",
            ResourceRef::Texture(_) => "texture",
            ResourceRef::Sampler(_) => "sampler",
        }
    }
}

/// One resource bound through a resource heap
#[derive(Clone, Copy)]
pub struct ResourceViewDesc<'a> {
    /// Declared kind of the view
    pub resource_type: ResourceType,
    /// Referenced resource
    pub resource: ResourceRef<'a>,
}

impl<'a> ResourceViewDesc<'a> {
    pub fn buffer(resource_type: ResourceType, buffer: &'a dyn Buffer) -> Self {
        Self { resource_type, resource: ResourceRef::Buffer(buffer) }
    }

    pub fn texture(texture: &'a dyn Texture) -> Self {
        Self { resource_type: ResourceType::Texture, resource: ResourceRef::Texture(texture) }
    }

    pub fn sampler(sampler: &'a dyn Sampler) -> Self {
        Self { resource_type: ResourceType::Sampler, resource: ResourceRef::Sampler(sampler) }
    }
}

/// Descriptor for creating a resource heap
///
/// `resource_views` are matched positionally with the destination binding
/// slots of `pipeline_layout`.
#[derive(Clone, Default)]
pub struct ResourceHeapDesc<'a> {
    pub pipeline_layout: Option<Arc<dyn PipelineLayout>>,
    pub resource_views: Vec<ResourceViewDesc<'a>>,
}

/// Resource heap trait
///
/// A fixed set of resource views bound to a pipeline layout, built once.
pub trait ResourceHeap: Send + Sync {
    /// Native handle of the pipeline layout the heap was built against
    fn native_pipeline_layout(&self) -> NativeHandle;

    /// Native descriptor sets, in set order
    fn native_descriptor_sets(&self) -> &[NativeHandle];
}
