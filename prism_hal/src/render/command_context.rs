/// Command context trait

use crate::error::Result;
use crate::render::{NativeHandle, ResourceState, TrackedResource};

/// Command-recording handle consumed by the staging pool
///
/// Recording transitions and copies never fails; errors surface when the
/// recorded work is submitted by `finish`.
pub trait CommandContext {
    /// Record a state transition of `resource` to `state`
    ///
    /// With `flush_barrier` the barrier is emitted immediately instead of
    /// being batched with later transitions.
    fn transition_resource(&mut self, resource: &dyn TrackedResource, state: ResourceState, flush_barrier: bool);

    /// Record a buffer-to-buffer copy of `size` bytes
    fn copy_buffer_region(
        &mut self,
        dst: NativeHandle,
        dst_offset: u64,
        src: NativeHandle,
        src_offset: u64,
        size: u64,
    );

    /// Submit the recorded work
    ///
    /// With `wait_for_completion` the call blocks until the GPU has finished.
    fn finish(&mut self, wait_for_completion: bool) -> Result<()>;
}
