/// Vulkan render target assembly
///
/// Everything here goes through `VulkanDeviceFunctions`, so the protocol
/// (render pass once per device, image set per size, strict teardown order)
/// is independent of how the host loads its device.

pub mod device;
pub mod image_set;
pub mod memory;
pub mod render_pass;
pub mod render_target;

pub use device::VulkanDeviceFunctions;
pub use image_set::VulkanImageSet;
pub use memory::select_memory_type;
pub use render_pass::create_video_render_pass;
pub use render_target::VulkanRenderTarget;

use ash::vk;
use crate::error::Error;
use crate::vtex_error;

/// Log a failed Vulkan step and map its result code
///
/// Out-of-memory codes become `Error::OutOfMemory`, everything else a
/// `BackendError` naming the step.
pub(crate) fn vk_error(step: &str, result: vk::Result) -> Error {
    vtex_error!("vtex::vulkan", "Failed to {}: {:?}", step, result);
    match result {
        vk::Result::ERROR_OUT_OF_HOST_MEMORY | vk::Result::ERROR_OUT_OF_DEVICE_MEMORY => {
            Error::OutOfMemory
        }
        _ => Error::BackendError(format!("failed to {}: {:?}", step, result)),
    }
}
