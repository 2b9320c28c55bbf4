/// Query trait

use crate::render::NativeHandle;

/// Kind of GPU query
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum QueryType {
    SamplesPassed,
    AnySamplesPassed,
    PrimitivesGenerated,
    TimeElapsed,
}

/// Query object trait
pub trait Query: Send + Sync {
    fn query_type(&self) -> QueryType;

    fn native_handle(&self) -> NativeHandle;
}
