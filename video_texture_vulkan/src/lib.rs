/*!
# Video Texture - Vulkan device binding

Implements `video_texture`'s `VulkanDeviceFunctions` over ash, bound to the
VkInstance/VkPhysicalDevice/VkDevice the host renders with. The host keeps
ownership of all three.

With the `vulkan-validation` feature, messages from the validation layers
are forwarded to the vtex logger and counted.

```no_run
use std::sync::Arc;
use video_texture::vtex::surface::DeviceContext;
use video_texture_vulkan::vtex::{AshDeviceFunctions, HostVulkanHandles, VulkanDeviceConfig};

# fn bind(window: &dyn video_texture::vtex::host::HostWindow) -> video_texture::vtex::Result<()> {
if let Some(handles) = HostVulkanHandles::from_window(window) {
    let functions = unsafe { AshDeviceFunctions::load(handles, VulkanDeviceConfig::default())? };
    let _context = DeviceContext::Vulkan(Arc::new(functions));
}
# Ok(())
# }
```
*/

mod ash_device;
#[cfg(feature = "vulkan-validation")]
mod validation;

pub mod vtex {
    pub use crate::ash_device::{AshDeviceFunctions, HostVulkanHandles, VulkanDeviceConfig};

    #[cfg(feature = "vulkan-validation")]
    pub mod validation {
        pub use crate::validation::{
            get_validation_stats, log_validation_summary, record_message,
            reset_validation_stats, severity_flags, vulkan_debug_callback, ValidationStats,
        };
    }
}
