/// Backend-neutral construction plan of a resource heap
///
/// A plan aggregates the descriptor pool sizes of a resource heap and
/// assigns every resource view to its destination binding slot. Backends
/// realise the plan with native objects (one pool, one set, one batched
/// update).

use std::sync::Arc;
use crate::error::{Error, Result};
use crate::render::{NativeHandle, PipelineLayout, ResourceHeapDesc, ResourceRef, ResourceViewDesc};
use crate::descriptor::{DescriptorType, DescriptorPoolSize, compress_descriptor_pool_sizes};

/// Native resource written into a descriptor
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DescriptorResource {
    Sampler(NativeHandle),
    /// Shader-resource view of a texture
    Image { view: NativeHandle },
    /// Whole-buffer range starting at offset 0
    Buffer { buffer: NativeHandle, range: u64 },
}

/// One descriptor write of a plan
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DescriptorWrite {
    pub dst_binding: u32,
    pub descriptor_type: DescriptorType,
    pub resource: DescriptorResource,
}

pub struct ResourceHeapPlan {
    pipeline_layout: Arc<dyn PipelineLayout>,
    pool_sizes: Vec<DescriptorPoolSize>,
    writes: Vec<DescriptorWrite>,
}

impl ResourceHeapPlan {
    /// Build the plan for `desc`
    ///
    /// # Errors
    ///
    /// - `MissingPipelineLayout` if the descriptor has no pipeline layout
    /// - `InvalidResourceViewType` for a view kind that cannot be bound
    /// - `BindingCountMismatch` if the view list and the layout's
    ///   destination bindings differ in length
    /// - `InvalidResource` if a view references a resource of another kind
    ///   than its declared type
    pub fn new(desc: &ResourceHeapDesc<'_>) -> Result<Self> {
        let pipeline_layout = desc
            .pipeline_layout
            .as_ref()
            .ok_or(Error::MissingPipelineLayout)?;

        let mut pool_sizes = desc
            .resource_views
            .iter()
            .map(|view| DescriptorType::from_resource_type(view.resource_type).map(|ty| DescriptorPoolSize::new(ty, 1)))
            .collect::<Result<Vec<_>>>()?;
        compress_descriptor_pool_sizes(&mut pool_sizes);

        let dst_bindings = pipeline_layout.dst_bindings();
        if dst_bindings.len() != desc.resource_views.len() {
            return Err(Error::BindingCountMismatch {
                resource_views: desc.resource_views.len(),
                binding_slots: dst_bindings.len(),
            });
        }

        let writes = desc
            .resource_views
            .iter()
            .zip(dst_bindings)
            .map(|(view, &dst_binding)| Self::write_for_view(view, dst_binding))
            .collect::<Result<Vec<_>>>()?;

        Ok(Self {
            pipeline_layout: Arc::clone(pipeline_layout),
            pool_sizes,
            writes,
        })
    }

    fn write_for_view(view: &ResourceViewDesc<'_>, dst_binding: u32) -> Result<DescriptorWrite> {
        let descriptor_type = DescriptorType::from_resource_type(view.resource_type)?;
        let resource = match (descriptor_type, view.resource) {
            (DescriptorType::Sampler, ResourceRef::Sampler(sampler)) => {
                DescriptorResource::Sampler(sampler.native_handle())
            }
            (DescriptorType::SampledImage, ResourceRef::Texture(texture)) => {
                DescriptorResource::Image { view: texture.native_view() }
            }
            (DescriptorType::UniformBuffer | DescriptorType::StorageBuffer, ResourceRef::Buffer(buffer)) => {
                DescriptorResource::Buffer { buffer: buffer.native_handle(), range: buffer.size() }
            }
            (_, resource) => {
                return Err(Error::InvalidResource(format!(
                    "resource view declared as {:?} references a {} (binding {})",
                    view.resource_type,
                    resource.kind_name(),
                    dst_binding
                )));
            }
        };

        Ok(DescriptorWrite { dst_binding, descriptor_type, resource })
    }

    pub fn pipeline_layout(&self) -> &Arc<dyn PipelineLayout> {
        &self.pipeline_layout
    }

    /// Compressed pool sizes: each type at most once, no zero counts
    pub fn pool_sizes(&self) -> &[DescriptorPoolSize] {
        &self.pool_sizes
    }

    /// Descriptor writes in resource-view order
    pub fn writes(&self) -> &[DescriptorWrite] {
        &self.writes
    }
}

#[cfg(test)]
#[path = "resource_heap_plan_tests.rs"]
mod tests;
