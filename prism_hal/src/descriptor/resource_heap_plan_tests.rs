//! Unit tests for resource_heap_plan.rs

use std::sync::Arc;
use crate::error::Error;
use crate::render::{
    BindingDesc, BufferUsage, PipelineLayout, PipelineLayoutDesc, ResourceHeapDesc,
    ResourceType, ResourceViewDesc, StageFlags,
};
use crate::render::mock_backend::{MockGpu, MockBuffer, MockTexture, MockSampler, MockPipelineLayout};
use crate::descriptor::{
    DescriptorPoolSize, DescriptorResource, DescriptorType, ResourceHeapPlan,
};

fn layout(bindings: &[(ResourceType, u32)]) -> Arc<dyn PipelineLayout> {
    let desc = PipelineLayoutDesc {
        bindings: bindings
            .iter()
            .map(|(ty, slot)| BindingDesc::new("", *ty, StageFlags::ALL_GRAPHICS, *slot))
            .collect(),
    };
    Arc::new(MockPipelineLayout::new(desc))
}

// ============================================================================
// PLAN CONSTRUCTION
// ============================================================================

#[test]
fn test_plan_assigns_each_view_to_its_slot() {
    let gpu = MockGpu::new();
    let constants = MockBuffer::new(&gpu, 256, BufferUsage::Constant);
    let texture = MockTexture::new(&gpu, 64, 64);
    let sampler = MockSampler::new(&gpu);

    let desc = ResourceHeapDesc {
        pipeline_layout: Some(layout(&[
            (ResourceType::ConstantBuffer, 0),
            (ResourceType::Texture, 3),
            (ResourceType::Sampler, 5),
        ])),
        resource_views: vec![
            ResourceViewDesc::buffer(ResourceType::ConstantBuffer, &constants),
            ResourceViewDesc::texture(&texture),
            ResourceViewDesc::sampler(&sampler),
        ],
    };

    let plan = ResourceHeapPlan::new(&desc).unwrap();
    let writes = plan.writes();

    assert_eq!(writes.len(), 3);
    assert_eq!(writes[0].dst_binding, 0);
    assert_eq!(writes[0].descriptor_type, DescriptorType::UniformBuffer);
    assert_eq!(writes[0].resource, DescriptorResource::Buffer { buffer: constants.handle, range: 256 });
    assert_eq!(writes[1].dst_binding, 3);
    assert_eq!(writes[1].resource, DescriptorResource::Image { view: texture.view });
    assert_eq!(writes[2].dst_binding, 5);
    assert_eq!(writes[2].resource, DescriptorResource::Sampler(sampler.handle));
}

#[test]
fn test_plan_pool_sizes_are_compressed() {
    let gpu = MockGpu::new();
    let a = MockBuffer::new(&gpu, 16, BufferUsage::Constant);
    let b = MockBuffer::new(&gpu, 16, BufferUsage::Storage);
    let c = MockBuffer::new(&gpu, 16, BufferUsage::Constant);

    let desc = ResourceHeapDesc {
        pipeline_layout: Some(layout(&[
            (ResourceType::ConstantBuffer, 0),
            (ResourceType::StorageBuffer, 1),
            (ResourceType::ConstantBuffer, 2),
        ])),
        resource_views: vec![
            ResourceViewDesc::buffer(ResourceType::ConstantBuffer, &a),
            ResourceViewDesc::buffer(ResourceType::StorageBuffer, &b),
            ResourceViewDesc::buffer(ResourceType::ConstantBuffer, &c),
        ],
    };

    let plan = ResourceHeapPlan::new(&desc).unwrap();

    assert_eq!(
        plan.pool_sizes(),
        &[
            DescriptorPoolSize::new(DescriptorType::UniformBuffer, 2),
            DescriptorPoolSize::new(DescriptorType::StorageBuffer, 1),
        ]
    );
}

#[test]
fn test_empty_heap_has_no_writes() {
    let desc = ResourceHeapDesc {
        pipeline_layout: Some(layout(&[])),
        resource_views: Vec::new(),
    };

    let plan = ResourceHeapPlan::new(&desc).unwrap();

    assert!(plan.pool_sizes().is_empty());
    assert!(plan.writes().is_empty());
}

// ============================================================================
// ERROR CASES
// ============================================================================

#[test]
fn test_missing_pipeline_layout() {
    let gpu = MockGpu::new();
    let sampler = MockSampler::new(&gpu);
    let desc = ResourceHeapDesc {
        pipeline_layout: None,
        resource_views: vec![ResourceViewDesc::sampler(&sampler)],
    };

    assert!(matches!(ResourceHeapPlan::new(&desc), Err(Error::MissingPipelineLayout)));
}

#[test]
fn test_binding_count_mismatch() {
    let gpu = MockGpu::new();
    let sampler = MockSampler::new(&gpu);
    let texture = MockTexture::new(&gpu, 4, 4);
    let desc = ResourceHeapDesc {
        pipeline_layout: Some(layout(&[(ResourceType::Sampler, 0)])),
        resource_views: vec![ResourceViewDesc::sampler(&sampler), ResourceViewDesc::texture(&texture)],
    };

    assert!(matches!(
        ResourceHeapPlan::new(&desc),
        Err(Error::BindingCountMismatch { resource_views: 2, binding_slots: 1 })
    ));
}

#[test]
fn test_invalid_resource_view_type_reports_code() {
    let gpu = MockGpu::new();
    let vertices = MockBuffer::new(&gpu, 64, BufferUsage::Vertex);
    let desc = ResourceHeapDesc {
        pipeline_layout: Some(layout(&[(ResourceType::VertexBuffer, 0)])),
        resource_views: vec![ResourceViewDesc::buffer(ResourceType::VertexBuffer, &vertices)],
    };

    match ResourceHeapPlan::new(&desc) {
        Err(err @ Error::InvalidResourceViewType(code)) => {
            assert_eq!(code, ResourceType::VertexBuffer.code());
            assert!(err.to_string().contains("0x00000001"));
        }
        _ => panic!("expected InvalidResourceViewType"),
    }
}

#[test]
fn test_resource_kind_must_match_declared_type() {
    let gpu = MockGpu::new();
    let sampler = MockSampler::new(&gpu);
    let desc = ResourceHeapDesc {
        pipeline_layout: Some(layout(&[(ResourceType::Texture, 0)])),
        resource_views: vec![ResourceViewDesc {
            resource_type: ResourceType::Texture,
            resource: crate::render::ResourceRef::Sampler(&sampler),
        }],
    };

    assert!(matches!(ResourceHeapPlan::new(&desc), Err(Error::InvalidResource(_))));
}
