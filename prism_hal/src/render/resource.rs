/// Native handles, resource kinds and resource states

/// Opaque backend object handle
///
/// Vulkan handles round-trip through `ash::vk::Handle::{as_raw, from_raw}`,
/// OpenGL object names are stored zero-extended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct NativeHandle(pub u64);

impl NativeHandle {
    /// The null handle
    pub const NULL: NativeHandle = NativeHandle(0);

    /// Returns true for the null handle
    pub fn is_null(&self) -> bool {
        self.0 == 0
    }
}

/// Kind of a resource, with stable type codes
///
/// The numeric code is reported in errors (e.g. an invalid resource view type).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u32)]
pub enum ResourceType {
    Undefined = 0,
    VertexBuffer = 1,
    IndexBuffer = 2,
    ConstantBuffer = 3,
    StorageBuffer = 4,
    StreamOutputBuffer = 5,
    Texture = 6,
    RenderTarget = 7,
    Sampler = 8,
}

impl ResourceType {
    /// Stable numeric code of this resource type
    pub fn code(self) -> u32 {
        self as u32
    }
}

/// GPU-side usage state of a resource
///
/// Copies require the destination in `CopyDestination` and the source in
/// `CopySource`; the resource returns to its usage state afterwards.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResourceState {
    Common,
    VertexAndConstantBuffer,
    IndexBuffer,
    UnorderedAccess,
    ShaderResource,
    IndirectArgument,
    CopyDestination,
    CopySource,
}

/// A resource whose state is tracked by a command context
///
/// Implemented by buffers and textures.
pub trait TrackedResource {
    /// Native handle of the resource
    fn native_handle(&self) -> NativeHandle;

    /// State the resource rests in between copies
    fn usage_state(&self) -> ResourceState;
}
