/// Render target trait

use glam::UVec2;
use crate::render::NativeHandle;

/// Render target trait
///
/// An off-screen set of attachments that render-context draw calls can
/// write into.
pub trait RenderTarget: Send + Sync {
    /// Resolution in pixels
    fn resolution(&self) -> UVec2;

    /// Number of color attachments
    fn num_color_attachments(&self) -> u32;

    /// Native handle of the target object (framebuffer, FBO, ...)
    fn native_handle(&self) -> NativeHandle;
}
