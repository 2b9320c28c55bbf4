/// Descriptor pool sizing

use crate::descriptor::DescriptorType;

/// Number of descriptors of one type a pool must hold
///
/// Generic over the descriptor type so backends can aggregate their native
/// enum (e.g. `ash::vk::DescriptorType`) directly.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DescriptorPoolSize<T = DescriptorType> {
    pub ty: T,
    pub count: u32,
}

impl<T> DescriptorPoolSize<T> {
    pub fn new(ty: T, count: u32) -> Self {
        Self { ty, count }
    }
}

/// Merge entries of equal type into the first one and drop empty entries
///
/// Each entry accumulates the counts of all later entries of the same type,
/// which are zeroed; zero-count entries are then removed. The relative order
/// of first occurrences is preserved.
pub fn compress_descriptor_pool_sizes<T: Copy + PartialEq>(pool_sizes: &mut Vec<DescriptorPoolSize<T>>) {
    for i in 0..pool_sizes.len() {
        let ty = pool_sizes[i].ty;
        let mut count = pool_sizes[i].count;
        for other in &mut pool_sizes[i + 1..] {
            if other.ty == ty {
                count += other.count;
                other.count = 0;
            }
        }
        pool_sizes[i].count = count;
    }

    pool_sizes.retain(|pool_size| pool_size.count != 0);
}

#[cfg(test)]
#[path = "pool_size_tests.rs"]
mod tests;
