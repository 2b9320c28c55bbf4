/// Conversions from Prism HAL enums to Vulkan enums and flags

use ash::vk;
use prism_hal::prism::Result;
use prism_hal::prism::render::{
    AddressMode, BufferUsage, Filter, ResourceState, ResourceType, StageFlags, TextureFormat,
};
use prism_hal::prism::descriptor::DescriptorType;

pub(crate) fn descriptor_type_to_vk(ty: DescriptorType) -> vk::DescriptorType {
    match ty {
        DescriptorType::Sampler => vk::DescriptorType::SAMPLER,
        DescriptorType::SampledImage => vk::DescriptorType::SAMPLED_IMAGE,
        DescriptorType::UniformBuffer => vk::DescriptorType::UNIFORM_BUFFER,
        DescriptorType::StorageBuffer => vk::DescriptorType::STORAGE_BUFFER,
    }
}

/// Vulkan descriptor type of a pipeline-layout binding
pub(crate) fn resource_type_to_vk_descriptor(resource_type: ResourceType) -> Result<vk::DescriptorType> {
    DescriptorType::from_resource_type(resource_type).map(descriptor_type_to_vk)
}

pub(crate) fn stage_flags_to_vk(flags: StageFlags) -> vk::ShaderStageFlags {
    let mut vk_flags = vk::ShaderStageFlags::empty();
    if flags.contains(StageFlags::VERTEX) {
        vk_flags |= vk::ShaderStageFlags::VERTEX;
    }
    if flags.contains(StageFlags::TESS_CONTROL) {
        vk_flags |= vk::ShaderStageFlags::TESSELLATION_CONTROL;
    }
    if flags.contains(StageFlags::TESS_EVALUATION) {
        vk_flags |= vk::ShaderStageFlags::TESSELLATION_EVALUATION;
    }
    if flags.contains(StageFlags::GEOMETRY) {
        vk_flags |= vk::ShaderStageFlags::GEOMETRY;
    }
    if flags.contains(StageFlags::FRAGMENT) {
        vk_flags |= vk::ShaderStageFlags::FRAGMENT;
    }
    if flags.contains(StageFlags::COMPUTE) {
        vk_flags |= vk::ShaderStageFlags::COMPUTE;
    }
    vk_flags
}

pub(crate) fn filter_to_vk(filter: Filter) -> vk::Filter {
    match filter {
        Filter::Nearest => vk::Filter::NEAREST,
        Filter::Linear => vk::Filter::LINEAR,
    }
}

pub(crate) fn mipmap_mode_to_vk(filter: Filter) -> vk::SamplerMipmapMode {
    match filter {
        Filter::Nearest => vk::SamplerMipmapMode::NEAREST,
        Filter::Linear => vk::SamplerMipmapMode::LINEAR,
    }
}

pub(crate) fn address_mode_to_vk(mode: AddressMode) -> vk::SamplerAddressMode {
    match mode {
        AddressMode::Repeat => vk::SamplerAddressMode::REPEAT,
        AddressMode::MirroredRepeat => vk::SamplerAddressMode::MIRRORED_REPEAT,
        AddressMode::ClampToEdge => vk::SamplerAddressMode::CLAMP_TO_EDGE,
        AddressMode::ClampToBorder => vk::SamplerAddressMode::CLAMP_TO_BORDER,
    }
}

pub(crate) fn texture_format_to_vk(format: TextureFormat) -> vk::Format {
    match format {
        TextureFormat::R8G8B8A8_SRGB => vk::Format::R8G8B8A8_SRGB,
        TextureFormat::R8G8B8A8_UNORM => vk::Format::R8G8B8A8_UNORM,
        TextureFormat::B8G8R8A8_SRGB => vk::Format::B8G8R8A8_SRGB,
        TextureFormat::B8G8R8A8_UNORM => vk::Format::B8G8R8A8_UNORM,
        TextureFormat::R32_SFLOAT => vk::Format::R32_SFLOAT,
        TextureFormat::R32G32B32A32_SFLOAT => vk::Format::R32G32B32A32_SFLOAT,
        TextureFormat::D32_FLOAT => vk::Format::D32_SFLOAT,
        TextureFormat::D24_UNORM_S8_UINT => vk::Format::D24_UNORM_S8_UINT,
    }
}

pub(crate) fn image_aspect_for_format(format: TextureFormat) -> vk::ImageAspectFlags {
    if format.is_depth() {
        vk::ImageAspectFlags::DEPTH
    } else {
        vk::ImageAspectFlags::COLOR
    }
}

/// Buffer usage flags; every buffer can also be a copy source and destination
pub(crate) fn buffer_usage_to_vk(usage: BufferUsage) -> vk::BufferUsageFlags {
    let flags = match usage {
        BufferUsage::Vertex => vk::BufferUsageFlags::VERTEX_BUFFER,
        BufferUsage::Index => vk::BufferUsageFlags::INDEX_BUFFER,
        BufferUsage::Constant => vk::BufferUsageFlags::UNIFORM_BUFFER,
        BufferUsage::Storage => vk::BufferUsageFlags::STORAGE_BUFFER,
        BufferUsage::Indirect => vk::BufferUsageFlags::INDIRECT_BUFFER,
    };
    flags | vk::BufferUsageFlags::TRANSFER_SRC | vk::BufferUsageFlags::TRANSFER_DST
}

/// Memory accesses and pipeline stages of a resource state
pub(crate) fn state_access_and_stage(state: ResourceState) -> (vk::AccessFlags, vk::PipelineStageFlags) {
    match state {
        ResourceState::Common => (vk::AccessFlags::empty(), vk::PipelineStageFlags::TOP_OF_PIPE),
        ResourceState::VertexAndConstantBuffer => (
            vk::AccessFlags::VERTEX_ATTRIBUTE_READ | vk::AccessFlags::UNIFORM_READ,
            vk::PipelineStageFlags::VERTEX_INPUT | vk::PipelineStageFlags::ALL_GRAPHICS
                | vk::PipelineStageFlags::COMPUTE_SHADER,
        ),
        ResourceState::IndexBuffer => (vk::AccessFlags::INDEX_READ, vk::PipelineStageFlags::VERTEX_INPUT),
        ResourceState::UnorderedAccess => (
            vk::AccessFlags::SHADER_READ | vk::AccessFlags::SHADER_WRITE,
            vk::PipelineStageFlags::ALL_GRAPHICS | vk::PipelineStageFlags::COMPUTE_SHADER,
        ),
        ResourceState::ShaderResource => (
            vk::AccessFlags::SHADER_READ,
            vk::PipelineStageFlags::ALL_GRAPHICS | vk::PipelineStageFlags::COMPUTE_SHADER,
        ),
        ResourceState::IndirectArgument => (
            vk::AccessFlags::INDIRECT_COMMAND_READ,
            vk::PipelineStageFlags::DRAW_INDIRECT,
        ),
        ResourceState::CopyDestination => (vk::AccessFlags::TRANSFER_WRITE, vk::PipelineStageFlags::TRANSFER),
        ResourceState::CopySource => (vk::AccessFlags::TRANSFER_READ, vk::PipelineStageFlags::TRANSFER),
    }
}

#[cfg(test)]
#[path = "vulkan_types_tests.rs"]
mod tests;
