/// VulkanCommandContext - Vulkan implementation of the CommandContext trait
///
/// Owns one command pool, one primary command buffer and one fence.
/// Recording starts lazily with the first transition or copy. State
/// transitions are tracked per native handle and emitted as global memory
/// barriers, which order buffer accesses without touching image layouts.

use prism_hal::prism::{Error, Result};
use prism_hal::prism::render::{CommandContext, NativeHandle, ResourceState, TrackedResource};
use prism_hal::{hal_err, hal_trace};
use ash::vk;
use ash::vk::Handle;
use rustc_hash::FxHashMap;
use std::sync::Arc;

use crate::vulkan_context::GpuContext;
use crate::vulkan_types::state_access_and_stage;

/// Barrier masks accumulated between two flushes
#[derive(Default)]
struct PendingBarrier {
    src_access: vk::AccessFlags,
    dst_access: vk::AccessFlags,
    src_stage: vk::PipelineStageFlags,
    dst_stage: vk::PipelineStageFlags,
}

impl PendingBarrier {
    fn is_empty(&self) -> bool {
        self.src_stage.is_empty() && self.dst_stage.is_empty()
    }
}

/// Resources back in their usage state are no longer tracked
fn record_state(
    states: &mut FxHashMap<NativeHandle, ResourceState>,
    handle: NativeHandle,
    state: ResourceState,
    usage_state: ResourceState,
) {
    if state == usage_state {
        states.remove(&handle);
    } else {
        states.insert(handle, state);
    }
}

pub struct VulkanCommandContext {
    ctx: Arc<GpuContext>,
    command_pool: vk::CommandPool,
    command_buffer: vk::CommandBuffer,
    /// Signalled when the last submission completes
    fence: vk::Fence,
    recording: bool,
    /// A submission is pending on `fence`
    in_flight: bool,
    /// States of the resources currently outside their usage state
    states: FxHashMap<NativeHandle, ResourceState>,
    pending: PendingBarrier,
    /// First recording failure, reported by `finish`
    deferred_error: Option<Error>,
}

impl VulkanCommandContext {
    pub fn new(ctx: Arc<GpuContext>) -> Result<Self> {
        unsafe {
            let pool_create_info = vk::CommandPoolCreateInfo::default()
                .queue_family_index(ctx.graphics_queue_family)
                .flags(vk::CommandPoolCreateFlags::RESET_COMMAND_BUFFER);

            let command_pool = ctx.device.create_command_pool(&pool_create_info, None)
                .map_err(|e| hal_err!("prism::vulkan", "Failed to create command pool: {:?}", e))?;

            // Handles are released by Drop from here on
            let mut context = Self {
                ctx: Arc::clone(&ctx),
                command_pool,
                command_buffer: vk::CommandBuffer::null(),
                fence: vk::Fence::null(),
                recording: false,
                in_flight: false,
                states: FxHashMap::default(),
                pending: PendingBarrier::default(),
                deferred_error: None,
            };

            let allocate_info = vk::CommandBufferAllocateInfo::default()
                .command_pool(command_pool)
                .level(vk::CommandBufferLevel::PRIMARY)
                .command_buffer_count(1);

            context.command_buffer = ctx.device.allocate_command_buffers(&allocate_info)
                .map_err(|e| hal_err!("prism::vulkan", "Failed to allocate command buffer: {:?}", e))?[0];

            context.fence = ctx.device.create_fence(&vk::FenceCreateInfo::default(), None)
                .map_err(|e| hal_err!("prism::vulkan", "Failed to create command fence: {:?}", e))?;

            Ok(context)
        }
    }

    /// Last state recorded for `handle`, None while it rests in its usage state
    pub fn tracked_state(&self, handle: NativeHandle) -> Option<ResourceState> {
        self.states.get(&handle).copied()
    }

    /// Block until the last submission has completed
    pub fn wait(&mut self) -> Result<()> {
        if !self.in_flight {
            return Ok(());
        }
        unsafe {
            self.ctx.device.wait_for_fences(std::slice::from_ref(&self.fence), true, u64::MAX)
                .map_err(|e| hal_err!("prism::vulkan", "Failed to wait for command fence: {:?}", e))?;
            self.ctx.device.reset_fences(std::slice::from_ref(&self.fence))
                .map_err(|e| hal_err!("prism::vulkan", "Failed to reset command fence: {:?}", e))?;
        }
        self.in_flight = false;
        Ok(())
    }

    fn defer(&mut self, error: Error) {
        if self.deferred_error.is_none() {
            self.deferred_error = Some(error);
        }
    }

    /// Begin recording if not already recording; false if recording is unusable
    fn ensure_recording(&mut self) -> bool {
        if self.deferred_error.is_some() {
            return false;
        }
        if self.recording {
            return true;
        }

        if let Err(e) = self.wait() {
            self.defer(e);
            return false;
        }

        let begin_info = vk::CommandBufferBeginInfo::default()
            .flags(vk::CommandBufferUsageFlags::ONE_TIME_SUBMIT);
        let result = unsafe {
            self.ctx.device.begin_command_buffer(self.command_buffer, &begin_info)
        };
        match result {
            Ok(()) => {
                self.recording = true;
                true
            }
            Err(e) => {
                let error = hal_err!("prism::vulkan", "Failed to begin command buffer: {:?}", e);
                self.defer(error);
                false
            }
        }
    }

    fn flush_barriers(&mut self) {
        if self.pending.is_empty() || !self.recording {
            return;
        }
        let pending = std::mem::take(&mut self.pending);

        let barrier = vk::MemoryBarrier::default()
            .src_access_mask(pending.src_access)
            .dst_access_mask(pending.dst_access);

        let src_stage = if pending.src_stage.is_empty() {
            vk::PipelineStageFlags::TOP_OF_PIPE
        } else {
            pending.src_stage
        };
        let dst_stage = if pending.dst_stage.is_empty() {
            vk::PipelineStageFlags::BOTTOM_OF_PIPE
        } else {
            pending.dst_stage
        };

        unsafe {
            self.ctx.device.cmd_pipeline_barrier(
                self.command_buffer,
                src_stage,
                dst_stage,
                vk::DependencyFlags::empty(),
                std::slice::from_ref(&barrier),
                &[],
                &[],
            );
        }
    }
}

impl CommandContext for VulkanCommandContext {
    fn transition_resource(&mut self, resource: &dyn TrackedResource, state: ResourceState, flush_barrier: bool) {
        let handle = resource.native_handle();
        let previous = self.tracked_state(handle).unwrap_or_else(|| resource.usage_state());
        if previous == state {
            return;
        }
        if !self.ensure_recording() {
            return;
        }

        let (src_access, src_stage) = state_access_and_stage(previous);
        let (dst_access, dst_stage) = state_access_and_stage(state);
        self.pending.src_access |= src_access;
        self.pending.dst_access |= dst_access;
        self.pending.src_stage |= src_stage;
        self.pending.dst_stage |= dst_stage;
        record_state(&mut self.states, handle, state, resource.usage_state());

        hal_trace!("prism::vulkan", "Transition {:#x}: {:?} -> {:?}", handle.0, previous, state);

        if flush_barrier {
            self.flush_barriers();
        }
    }

    fn copy_buffer_region(
        &mut self,
        dst: NativeHandle,
        dst_offset: u64,
        src: NativeHandle,
        src_offset: u64,
        size: u64,
    ) {
        if size == 0 || !self.ensure_recording() {
            return;
        }
        self.flush_barriers();

        let region = vk::BufferCopy {
            src_offset,
            dst_offset,
            size,
        };
        unsafe {
            self.ctx.device.cmd_copy_buffer(
                self.command_buffer,
                vk::Buffer::from_raw(src.0),
                vk::Buffer::from_raw(dst.0),
                std::slice::from_ref(&region),
            );
        }
    }

    fn finish(&mut self, wait_for_completion: bool) -> Result<()> {
        if let Some(error) = self.deferred_error.take() {
            if self.recording {
                unsafe {
                    self.ctx.device.end_command_buffer(self.command_buffer).ok();
                    self.ctx.device
                        .reset_command_buffer(self.command_buffer, vk::CommandBufferResetFlags::empty())
                        .ok();
                }
                self.recording = false;
            }
            self.states.clear();
            self.pending = PendingBarrier::default();
            return Err(error);
        }

        if self.recording {
            self.flush_barriers();
            unsafe {
                self.ctx.device.end_command_buffer(self.command_buffer)
                    .map_err(|e| hal_err!("prism::vulkan", "Failed to end command buffer: {:?}", e))?;
            }
            self.recording = false;

            self.ctx.submit(std::slice::from_ref(&self.command_buffer), self.fence)?;
            self.in_flight = true;
        }

        if wait_for_completion {
            self.wait()?;
        }
        Ok(())
    }
}

impl Drop for VulkanCommandContext {
    fn drop(&mut self) {
        unsafe {
            if self.in_flight {
                self.ctx.device
                    .wait_for_fences(std::slice::from_ref(&self.fence), true, u64::MAX)
                    .ok();
            }
            if self.fence != vk::Fence::null() {
                self.ctx.device.destroy_fence(self.fence, None);
            }
            // Frees the command buffer with it
            self.ctx.device.destroy_command_pool(self.command_pool, None);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_state_tracks_only_resources_out_of_usage_state() {
        let mut states = FxHashMap::default();
        let buffer = NativeHandle(0x42);

        record_state(&mut states, buffer, ResourceState::CopyDestination, ResourceState::VertexAndConstantBuffer);
        assert_eq!(states.get(&buffer), Some(&ResourceState::CopyDestination));

        record_state(&mut states, buffer, ResourceState::VertexAndConstantBuffer, ResourceState::VertexAndConstantBuffer);
        assert!(states.is_empty());
    }

    #[test]
    fn test_record_state_is_bounded_by_resources_in_copy_states() {
        let mut states = FxHashMap::default();
        for raw in 1..=100u64 {
            let handle = NativeHandle(raw);
            record_state(&mut states, handle, ResourceState::CopySource, ResourceState::UnorderedAccess);
            record_state(&mut states, handle, ResourceState::UnorderedAccess, ResourceState::UnorderedAccess);
        }
        record_state(&mut states, NativeHandle(7), ResourceState::CopySource, ResourceState::UnorderedAccess);

        assert_eq!(states.len(), 1);
    }
}
