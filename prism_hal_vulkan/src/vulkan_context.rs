/// GpuContext - Shared GPU state for all Vulkan objects
///
/// Contains everything a Vulkan object needs after creation:
/// - Device for Vulkan API calls
/// - Allocator for memory management
/// - Queue for command submission
/// - Command pool for one-shot initialisation work

use ash::vk;
use gpu_allocator::vulkan::Allocator;
use prism_hal::prism::{Error, Result};
use prism_hal::hal_err;
use std::mem::ManuallyDrop;
use std::sync::{Arc, Mutex};

/// Shared GPU context for all Vulkan resources.
///
/// Shared (via `Arc`) by every buffer, texture, sampler, layout, heap and
/// command context. The context is the last owner of the device: dropping
/// the final reference frees the allocator, then destroys the device and
/// the instance, so objects may outlive the `VulkanDevice` that made them.
pub struct GpuContext {
    /// Vulkan logical device
    pub device: ash::Device,

    /// GPU memory allocator (shared, requires mutex for thread safety)
    /// Wrapped in ManuallyDrop so it is dropped BEFORE the device is destroyed
    pub allocator: ManuallyDrop<Arc<Mutex<Allocator>>>,

    /// Graphics queue for command submission
    pub graphics_queue: vk::Queue,

    /// Graphics queue family index
    pub graphics_queue_family: u32,

    /// Serialises `vkQueueSubmit` calls on the graphics queue
    pub(crate) queue_lock: Mutex<()>,

    /// Reusable command pool for one-shot initialisation work
    /// (created with TRANSIENT + RESET_COMMAND_BUFFER flags)
    pub upload_command_pool: Mutex<vk::CommandPool>,

    /// `VkPhysicalDeviceLimits::nonCoherentAtomSize`
    pub non_coherent_atom_size: u64,

    /// Largest sampler anisotropy, 0.0 when the device lacks the feature
    pub max_sampler_anisotropy: f32,

    /// Vulkan instance (destroyed after the device)
    instance: ash::Instance,

    /// Loaded Vulkan library, must outlive the instance
    _entry: ash::Entry,

    /// Debug utils loader (for validation layers)
    pub(crate) debug_utils_loader: Option<ash::ext::debug_utils::Instance>,

    /// Debug messenger handle
    pub(crate) debug_messenger: Option<vk::DebugUtilsMessengerEXT>,
}

/// Native objects a `GpuContext` takes ownership of
pub(crate) struct GpuContextDesc {
    pub entry: ash::Entry,
    pub instance: ash::Instance,
    pub device: ash::Device,
    pub allocator: Allocator,
    pub graphics_queue: vk::Queue,
    pub graphics_queue_family: u32,
    pub upload_command_pool: vk::CommandPool,
    pub non_coherent_atom_size: u64,
    pub max_sampler_anisotropy: f32,
    pub debug_utils_loader: Option<ash::ext::debug_utils::Instance>,
    pub debug_messenger: Option<vk::DebugUtilsMessengerEXT>,
}

impl GpuContext {
    pub(crate) fn new(desc: GpuContextDesc) -> Self {
        Self {
            device: desc.device,
            allocator: ManuallyDrop::new(Arc::new(Mutex::new(desc.allocator))),
            graphics_queue: desc.graphics_queue,
            graphics_queue_family: desc.graphics_queue_family,
            queue_lock: Mutex::new(()),
            upload_command_pool: Mutex::new(desc.upload_command_pool),
            non_coherent_atom_size: desc.non_coherent_atom_size.max(1),
            max_sampler_anisotropy: desc.max_sampler_anisotropy,
            instance: desc.instance,
            _entry: desc.entry,
            debug_utils_loader: desc.debug_utils_loader,
            debug_messenger: desc.debug_messenger,
        }
    }

    /// Submit command buffers to the graphics queue
    pub(crate) fn submit(&self, command_buffers: &[vk::CommandBuffer], fence: vk::Fence) -> Result<()> {
        let submit_info = vk::SubmitInfo::default().command_buffers(command_buffers);
        let _guard = self
            .queue_lock
            .lock()
            .map_err(|_| Error::BackendError("Graphics queue lock poisoned".to_string()))?;
        unsafe {
            self.device
                .queue_submit(self.graphics_queue, std::slice::from_ref(&submit_info), fence)
                .map_err(|e| hal_err!("prism::vulkan", "Failed to submit command buffer: {:?}", e))
        }
    }

    /// Record `record` into a one-shot command buffer and wait for it
    ///
    /// Used for work that must complete before an object is handed out
    /// (e.g. the initial layout transition of a texture).
    pub(crate) fn submit_one_shot<F>(&self, record: F) -> Result<()>
    where
        F: FnOnce(&ash::Device, vk::CommandBuffer),
    {
        let pool = self
            .upload_command_pool
            .lock()
            .map_err(|_| Error::BackendError("Upload command pool lock poisoned".to_string()))?;

        unsafe {
            let allocate_info = vk::CommandBufferAllocateInfo::default()
                .command_pool(*pool)
                .level(vk::CommandBufferLevel::PRIMARY)
                .command_buffer_count(1);

            let command_buffer = self.device.allocate_command_buffers(&allocate_info)
                .map_err(|e| hal_err!("prism::vulkan", "Failed to allocate one-shot command buffer: {:?}", e))?[0];

            let result = self.record_and_wait(command_buffer, record);
            self.device.free_command_buffers(*pool, &[command_buffer]);
            result
        }
    }

    unsafe fn record_and_wait<F>(&self, command_buffer: vk::CommandBuffer, record: F) -> Result<()>
    where
        F: FnOnce(&ash::Device, vk::CommandBuffer),
    {
        let begin_info = vk::CommandBufferBeginInfo::default()
            .flags(vk::CommandBufferUsageFlags::ONE_TIME_SUBMIT);

        self.device.begin_command_buffer(command_buffer, &begin_info)
            .map_err(|e| hal_err!("prism::vulkan", "Failed to begin one-shot command buffer: {:?}", e))?;

        record(&self.device, command_buffer);

        self.device.end_command_buffer(command_buffer)
            .map_err(|e| hal_err!("prism::vulkan", "Failed to end one-shot command buffer: {:?}", e))?;

        self.submit(&[command_buffer], vk::Fence::null())?;

        let _guard = self
            .queue_lock
            .lock()
            .map_err(|_| Error::BackendError("Graphics queue lock poisoned".to_string()))?;
        self.device.queue_wait_idle(self.graphics_queue)
            .map_err(|e| hal_err!("prism::vulkan", "Failed to wait for one-shot command buffer: {:?}", e))
    }
}

impl Drop for GpuContext {
    fn drop(&mut self) {
        unsafe {
            self.device.device_wait_idle().ok();

            // 1. Destroy the upload command pool
            if let Ok(pool) = self.upload_command_pool.get_mut() {
                if *pool != vk::CommandPool::null() {
                    self.device.destroy_command_pool(*pool, None);
                    *pool = vk::CommandPool::null();
                }
            }

            // 2. Drop allocator: free VkDeviceMemory pages BEFORE destroying device
            ManuallyDrop::drop(&mut self.allocator);

            // 3. Destroy debug messenger BEFORE device and instance
            if let (Some(debug_utils), Some(messenger)) = (&self.debug_utils_loader, &self.debug_messenger) {
                debug_utils.destroy_debug_utils_messenger(*messenger, None);
            }

            // 4. Destroy device and instance
            self.device.destroy_device(None);
            self.instance.destroy_instance(None);
        }
    }
}
