/// Memory type selection for the video image

use ash::vk;
use crate::config::MemoryTypePolicy;

/// Pick a memory type index allowed by `type_bits`
///
/// `FirstMatching` returns the lowest allowed index whatever its property
/// flags are. `PreferDeviceLocal` returns the lowest allowed DEVICE_LOCAL
/// index and falls back to `FirstMatching`.
pub fn select_memory_type(
    type_bits: u32,
    properties: &vk::PhysicalDeviceMemoryProperties,
    policy: MemoryTypePolicy,
) -> Option<u32> {
    let count = properties.memory_type_count.min(vk::MAX_MEMORY_TYPES as u32);
    let allowed = |i: u32| type_bits & (1 << i) != 0;

    let first_matching = (0..count).find(|&i| allowed(i));

    match policy {
        MemoryTypePolicy::FirstMatching => first_matching,
        MemoryTypePolicy::PreferDeviceLocal => (0..count)
            .find(|&i| {
                allowed(i)
                    && properties.memory_types[i as usize]
                        .property_flags
                        .contains(vk::MemoryPropertyFlags::DEVICE_LOCAL)
            })
            .or(first_matching),
    }
}

#[cfg(test)]
#[path = "memory_tests.rs"]
mod tests;
