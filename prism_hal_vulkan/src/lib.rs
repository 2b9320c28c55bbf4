/*!
# Prism HAL - Vulkan Backend

Vulkan implementation of the Prism HAL traits, using the Ash library for
Vulkan bindings and gpu-allocator for memory management.

The backend is headless: `VulkanDevice` creates an instance, a logical
device and one graphics queue, then hands out buffers, textures,
samplers, pipeline layouts, resource heaps, staging pools and command
contexts that all share one `GpuContext`.

```no_run
use prism_hal::prism::Config;
use prism_hal_vulkan::VulkanDevice;

let device = VulkanDevice::new(&Config::default())?;
let _staging = device.create_staging_pool();
# Ok::<(), prism_hal::prism::Error>(())
```
*/

mod vulkan_context;
mod vulkan_types;
mod vulkan_debug;
mod vulkan_device;
mod vulkan_buffer;
mod vulkan_texture;
mod vulkan_sampler;
mod vulkan_staging;
mod vulkan_command_context;
mod vulkan_pipeline_layout;
mod vulkan_resource_heap;

pub use vulkan_context::GpuContext;
pub use vulkan_device::VulkanDevice;
pub use vulkan_buffer::VulkanBuffer;
pub use vulkan_texture::VulkanTexture;
pub use vulkan_sampler::VulkanSampler;
pub use vulkan_staging::{VulkanStagingAllocator, VulkanStagingMemory};
pub use vulkan_command_context::VulkanCommandContext;
pub use vulkan_pipeline_layout::VulkanPipelineLayout;
pub use vulkan_resource_heap::VulkanResourceHeap;
