/// VulkanDevice - headless Vulkan device and resource factory

use prism_hal::prism::{Config, Error, Result};
use prism_hal::prism::render::{
    BufferDesc, PipelineLayoutDesc, RenderingCaps, ResourceHeapDesc, SamplerDesc, TextureDesc,
};
use prism_hal::prism::staging::StagingBufferPool;
use prism_hal::{hal_err, hal_error, hal_info, hal_warn};
use ash::vk;
use gpu_allocator::vulkan::{Allocator, AllocatorCreateDesc};
use std::ffi::{CStr, CString};
use std::sync::Arc;

use crate::vulkan_buffer::VulkanBuffer;
use crate::vulkan_command_context::VulkanCommandContext;
use crate::vulkan_context::{GpuContext, GpuContextDesc};
use crate::vulkan_pipeline_layout::VulkanPipelineLayout;
use crate::vulkan_resource_heap::VulkanResourceHeap;
use crate::vulkan_sampler::VulkanSampler;
use crate::vulkan_staging::VulkanStagingAllocator;
use crate::vulkan_texture::VulkanTexture;

const VALIDATION_LAYER: &CStr = c"VK_LAYER_KHRONOS_validation";

/// Vulkan device
///
/// Central object for creating resources. Works without a window: no
/// surface or swapchain is created. Created objects share the device's
/// `GpuContext` and may outlive the `VulkanDevice`.
pub struct VulkanDevice {
    ctx: Arc<GpuContext>,
    physical_device: vk::PhysicalDevice,
    device_name: String,
    caps: RenderingCaps,
    staging_allocator: Arc<VulkanStagingAllocator>,
    staging_chunk_size: u64,
}

/// Validation layers are requested only when the crate feature is enabled
/// and the configuration asks for them.
pub(crate) fn validation_requested(config: &Config) -> bool {
    cfg!(feature = "vulkan-validation") && config.enable_validation_layers
}

/// Capabilities reported for a physical device
pub(crate) fn caps_from_properties(
    features: &vk::PhysicalDeviceFeatures,
    limits: &vk::PhysicalDeviceLimits,
) -> RenderingCaps {
    RenderingCaps {
        has_instancing: true,
        has_offset_instancing: true,
        has_compute_shaders: true,
        has_storage_buffers: true,
        max_patch_vertices: if features.tessellation_shader == vk::TRUE {
            limits.max_tessellation_patch_size
        } else {
            0
        },
        max_viewports: limits.max_viewports,
    }
}

impl VulkanDevice {
    pub fn new(config: &Config) -> Result<Self> {
        unsafe {
            let entry = ash::Entry::load()
                .map_err(|e| {
                    hal_error!("prism::vulkan", "Failed to load Vulkan library: {:?}", e);
                    Error::InitializationFailed(format!("Failed to load Vulkan library: {:?}", e))
                })?;

            let app_name = CString::new(config.app_name.as_str())
                .unwrap_or_else(|_| CString::from(c"Prism Application"));
            let (major, minor, patch) = config.app_version;

            let app_info = vk::ApplicationInfo::default()
                .application_name(&app_name)
                .application_version(vk::make_api_version(0, major, minor, patch))
                .engine_name(c"Prism")
                .engine_version(vk::make_api_version(0, 0, 1, 0))
                .api_version(vk::API_VERSION_1_2);

            let mut validation = validation_requested(config);
            if validation {
                let layers = entry.enumerate_instance_layer_properties().unwrap_or_default();
                let available = layers.iter().any(|layer| {
                    layer.layer_name_as_c_str().map(|name| name == VALIDATION_LAYER).unwrap_or(false)
                });
                if !available {
                    hal_warn!("prism::vulkan", "Validation requested but {:?} is not installed", VALIDATION_LAYER);
                    validation = false;
                }
            }

            let mut extension_names = Vec::new();
            let mut layer_names = Vec::new();
            if validation {
                extension_names.push(ash::ext::debug_utils::NAME.as_ptr());
                layer_names.push(VALIDATION_LAYER.as_ptr());
            }

            let create_info = vk::InstanceCreateInfo::default()
                .application_info(&app_info)
                .enabled_layer_names(&layer_names)
                .enabled_extension_names(&extension_names);

            let instance = entry
                .create_instance(&create_info, None)
                .map_err(|e| {
                    hal_error!("prism::vulkan", "Failed to create Vulkan instance: {:?}", e);
                    Error::InitializationFailed(format!("Failed to create instance: {:?}", e))
                })?;

            // The instance is now owned: destroy it ourselves on every error
            // until the GpuContext takes it over.
            let fail_instance = |instance: &ash::Instance, error: Error| {
                instance.destroy_instance(None);
                error
            };

            let (debug_utils_loader, debug_messenger) = if validation {
                let debug_utils = ash::ext::debug_utils::Instance::new(&entry, &instance);
                let debug_info = crate::vulkan_debug::messenger_create_info();
                match debug_utils.create_debug_utils_messenger(&debug_info, None) {
                    Ok(messenger) => (Some(debug_utils), Some(messenger)),
                    Err(e) => {
                        hal_warn!("prism::vulkan", "Failed to create debug messenger: {:?}", e);
                        (None, None)
                    }
                }
            } else {
                (None, None)
            };
            let fail_early = |instance: &ash::Instance, error: Error| {
                if let (Some(debug_utils), Some(messenger)) = (&debug_utils_loader, debug_messenger) {
                    debug_utils.destroy_debug_utils_messenger(messenger, None);
                }
                fail_instance(instance, error)
            };

            // Pick physical device and graphics queue family
            let physical_devices = match instance.enumerate_physical_devices() {
                Ok(devices) => devices,
                Err(e) => {
                    let error = Error::InitializationFailed(format!("Failed to enumerate physical devices: {:?}", e));
                    hal_error!("prism::vulkan", "{}", error);
                    return Err(fail_early(&instance, error));
                }
            };

            let selected = physical_devices.into_iter().find_map(|physical_device| {
                instance
                    .get_physical_device_queue_family_properties(physical_device)
                    .iter()
                    .position(|qf| qf.queue_flags.contains(vk::QueueFlags::GRAPHICS | vk::QueueFlags::COMPUTE))
                    .map(|index| (physical_device, index as u32))
            });

            let Some((physical_device, graphics_family_index)) = selected else {
                hal_error!("prism::vulkan", "No Vulkan-capable GPU with a graphics queue found");
                return Err(fail_early(
                    &instance,
                    Error::InitializationFailed("No Vulkan-capable GPU found".to_string()),
                ));
            };

            let properties = instance.get_physical_device_properties(physical_device);
            let supported_features = instance.get_physical_device_features(physical_device);
            let device_name = properties
                .device_name_as_c_str()
                .map(|name| name.to_string_lossy().into_owned())
                .unwrap_or_else(|_| "Unknown device".to_string());

            // Create logical device with the optional features it supports
            let queue_priorities = [1.0];
            let queue_create_info = vk::DeviceQueueCreateInfo::default()
                .queue_family_index(graphics_family_index)
                .queue_priorities(&queue_priorities);

            let device_features = vk::PhysicalDeviceFeatures::default()
                .sampler_anisotropy(supported_features.sampler_anisotropy == vk::TRUE)
                .tessellation_shader(supported_features.tessellation_shader == vk::TRUE)
                .multi_viewport(supported_features.multi_viewport == vk::TRUE);

            let device_create_info = vk::DeviceCreateInfo::default()
                .queue_create_infos(std::slice::from_ref(&queue_create_info))
                .enabled_features(&device_features);

            let device = match instance.create_device(physical_device, &device_create_info, None) {
                Ok(device) => device,
                Err(e) => {
                    hal_error!("prism::vulkan", "Failed to create logical device: {:?}", e);
                    return Err(fail_early(
                        &instance,
                        Error::InitializationFailed(format!("Failed to create device: {:?}", e)),
                    ));
                }
            };
            let fail_device = |device: &ash::Device, instance: &ash::Instance, error: Error| {
                device.destroy_device(None);
                fail_early(instance, error)
            };

            let graphics_queue = device.get_device_queue(graphics_family_index, 0);

            let allocator = match Allocator::new(&AllocatorCreateDesc {
                instance: instance.clone(),
                device: device.clone(),
                physical_device,
                debug_settings: Default::default(),
                buffer_device_address: false,
                allocation_sizes: Default::default(),
            }) {
                Ok(allocator) => allocator,
                Err(e) => {
                    hal_error!("prism::vulkan", "Failed to create GPU allocator: {:?}", e);
                    return Err(fail_device(
                        &device,
                        &instance,
                        Error::InitializationFailed(format!("Failed to create allocator: {:?}", e)),
                    ));
                }
            };

            let upload_pool_create_info = vk::CommandPoolCreateInfo::default()
                .queue_family_index(graphics_family_index)
                .flags(vk::CommandPoolCreateFlags::TRANSIENT | vk::CommandPoolCreateFlags::RESET_COMMAND_BUFFER);

            let upload_command_pool = match device.create_command_pool(&upload_pool_create_info, None) {
                Ok(pool) => pool,
                Err(e) => {
                    hal_error!("prism::vulkan", "Failed to create upload command pool: {:?}", e);
                    drop(allocator);
                    return Err(fail_device(
                        &device,
                        &instance,
                        Error::InitializationFailed(format!("Failed to create upload command pool: {:?}", e)),
                    ));
                }
            };

            let limits = properties.limits;
            let ctx = Arc::new(GpuContext::new(GpuContextDesc {
                entry,
                instance,
                device,
                allocator,
                graphics_queue,
                graphics_queue_family: graphics_family_index,
                upload_command_pool,
                non_coherent_atom_size: limits.non_coherent_atom_size,
                max_sampler_anisotropy: if device_features.sampler_anisotropy == vk::TRUE {
                    limits.max_sampler_anisotropy
                } else {
                    0.0
                },
                debug_utils_loader,
                debug_messenger,
            }));

            hal_info!(
                "prism::vulkan",
                "Vulkan device '{}' ready (queue family {}, validation {})",
                device_name, graphics_family_index, if validation { "on" } else { "off" }
            );

            Ok(Self {
                staging_allocator: Arc::new(VulkanStagingAllocator::new(Arc::clone(&ctx))),
                staging_chunk_size: config.staging_chunk_size,
                caps: caps_from_properties(&supported_features, &limits),
                physical_device,
                device_name,
                ctx,
            })
        }
    }

    /// Shared GPU context
    pub fn context(&self) -> &Arc<GpuContext> {
        &self.ctx
    }

    pub fn physical_device(&self) -> vk::PhysicalDevice {
        self.physical_device
    }

    pub fn device_name(&self) -> &str {
        &self.device_name
    }

    pub fn caps(&self) -> &RenderingCaps {
        &self.caps
    }

    pub fn create_buffer(&self, desc: &BufferDesc) -> Result<VulkanBuffer> {
        VulkanBuffer::new(Arc::clone(&self.ctx), desc)
    }

    pub fn create_texture(&self, desc: &TextureDesc) -> Result<VulkanTexture> {
        VulkanTexture::new(Arc::clone(&self.ctx), desc)
    }

    pub fn create_sampler(&self, desc: &SamplerDesc) -> Result<VulkanSampler> {
        VulkanSampler::new(Arc::clone(&self.ctx), desc)
    }

    pub fn create_pipeline_layout(&self, desc: &PipelineLayoutDesc) -> Result<VulkanPipelineLayout> {
        VulkanPipelineLayout::new(Arc::clone(&self.ctx), desc)
    }

    pub fn create_resource_heap(&self, desc: &ResourceHeapDesc<'_>) -> Result<VulkanResourceHeap> {
        VulkanResourceHeap::new(Arc::clone(&self.ctx), desc)
    }

    /// Staging pool with the configured chunk size
    pub fn create_staging_pool(&self) -> StagingBufferPool {
        StagingBufferPool::new(self.staging_allocator.clone(), self.staging_chunk_size)
    }

    pub fn create_command_context(&self) -> Result<VulkanCommandContext> {
        VulkanCommandContext::new(Arc::clone(&self.ctx))
    }

    pub fn wait_idle(&self) -> Result<()> {
        unsafe {
            self.ctx
                .device
                .device_wait_idle()
                .map_err(|e| hal_err!("prism::vulkan", "Failed to wait idle: {:?}", e))
        }
    }
}
