/// AshDeviceFunctions - VulkanDeviceFunctions over the host's own VkDevice
///
/// The host creates and destroys the instance and device. This type only
/// loads function tables for them and, when validation is requested and
/// compiled in, a debug messenger it owns.

use ash::prelude::VkResult;
use ash::vk;
use ash::vk::Handle;
use video_texture::vtex::host::{HostResource, HostWindow};
use video_texture::vtex::vulkan::VulkanDeviceFunctions;
use video_texture::vtex::{Error, Result};
use video_texture::{vtex_debug, vtex_error};

/// Device loading options
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VulkanDeviceConfig {
    /// Attach a validation message counter to the host's instance
    ///
    /// Needs the `vulkan-validation` feature and VK_EXT_debug_utils enabled
    /// on the host instance. Ignored otherwise.
    pub enable_validation: bool,
}

impl Default for VulkanDeviceConfig {
    fn default() -> Self {
        Self {
            enable_validation: cfg!(debug_assertions),
        }
    }
}

/// Raw Vulkan handles owned by the host
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HostVulkanHandles {
    pub instance: vk::Instance,
    pub physical_device: vk::PhysicalDevice,
    pub device: vk::Device,
}

impl HostVulkanHandles {
    pub fn from_raw(instance: u64, physical_device: u64, device: u64) -> Self {
        Self {
            instance: vk::Instance::from_raw(instance),
            physical_device: vk::PhysicalDevice::from_raw(physical_device),
            device: vk::Device::from_raw(device),
        }
    }

    /// Query the three handles from a window rendering with Vulkan
    ///
    /// Returns `None` if the window does not expose one of them.
    pub fn from_window(window: &dyn HostWindow) -> Option<Self> {
        let instance = window.resource(HostResource::VulkanInstance)?;
        let physical_device = window.resource(HostResource::PhysicalDevice)?;
        let device = window.resource(HostResource::Device)?;
        Some(Self::from_raw(instance.as_raw(), physical_device.as_raw(), device.as_raw()))
    }

    /// Reject null handles before any function table is loaded
    pub fn validate(&self) -> Result<()> {
        let missing = if self.instance.is_null() {
            "VkInstance"
        } else if self.physical_device.is_null() {
            "VkPhysicalDevice"
        } else if self.device.is_null() {
            "VkDevice"
        } else {
            return Ok(());
        };
        vtex_error!("vtex::vulkan", "Host handed out a null {}", missing);
        Err(Error::InvalidResource(format!("null {}", missing)))
    }
}

pub struct AshDeviceFunctions {
    /// Keeps the Vulkan loader alive for the function tables below
    _entry: ash::Entry,
    instance: ash::Instance,
    physical_device: vk::PhysicalDevice,
    device: ash::Device,
    #[cfg(feature = "vulkan-validation")]
    messenger: Option<crate::validation::ValidationMessenger>,
}

impl AshDeviceFunctions {
    /// Load the system Vulkan library and bind to the host's handles
    ///
    /// # Errors
    ///
    /// - `Error::InitializationFailed` if the Vulkan library cannot be loaded
    /// - `Error::InvalidResource` if a handle is null
    ///
    /// # Safety
    ///
    /// The handles must be live objects created through the same Vulkan
    /// loader, and must outlive the returned value.
    pub unsafe fn load(handles: HostVulkanHandles, config: VulkanDeviceConfig) -> Result<Self> {
        let entry = ash::Entry::load().map_err(|e| {
            vtex_error!("vtex::vulkan", "Failed to load Vulkan library: {:?}", e);
            Error::InitializationFailed(format!("Failed to load Vulkan library: {:?}", e))
        })?;
        Self::from_entry(entry, handles, config)
    }

    /// Bind through the host's own `vkGetInstanceProcAddr`
    ///
    /// Used when the host loaded Vulkan itself (a custom loader or a
    /// statically linked driver).
    ///
    /// # Safety
    ///
    /// Same as [`AshDeviceFunctions::load`], and `get_instance_proc_addr`
    /// must belong to the loader that created `handles.instance`.
    pub unsafe fn from_proc_addr(
        get_instance_proc_addr: vk::PFN_vkGetInstanceProcAddr,
        handles: HostVulkanHandles,
        config: VulkanDeviceConfig,
    ) -> Result<Self> {
        let entry = ash::Entry::from_static_fn(ash::StaticFn { get_instance_proc_addr });
        Self::from_entry(entry, handles, config)
    }

    /// Bind an already loaded entry to the host's handles
    ///
    /// # Safety
    ///
    /// Same as [`AshDeviceFunctions::load`].
    pub unsafe fn from_entry(
        entry: ash::Entry,
        handles: HostVulkanHandles,
        config: VulkanDeviceConfig,
    ) -> Result<Self> {
        handles.validate()?;

        let instance = ash::Instance::load(entry.static_fn(), handles.instance);
        let device = ash::Device::load(instance.fp_v1_0(), handles.device);

        #[cfg(feature = "vulkan-validation")]
        let messenger = if config.enable_validation {
            crate::validation::ValidationMessenger::attach(&entry, &instance)
        } else {
            None
        };

        if config.enable_validation && !cfg!(feature = "vulkan-validation") {
            vtex_debug!("vtex::vulkan",
                "Validation requested but the vulkan-validation feature is disabled");
        }

        vtex_debug!("vtex::vulkan", "Bound to host device 0x{:x}", handles.device.as_raw());

        Ok(Self {
            _entry: entry,
            instance,
            physical_device: handles.physical_device,
            device,
            #[cfg(feature = "vulkan-validation")]
            messenger,
        })
    }

    /// True when a validation messenger is attached to the host instance
    pub fn validation_enabled(&self) -> bool {
        #[cfg(feature = "vulkan-validation")]
        {
            self.messenger.is_some()
        }
        #[cfg(not(feature = "vulkan-validation"))]
        {
            false
        }
    }
}

impl VulkanDeviceFunctions for AshDeviceFunctions {
    fn instance(&self) -> vk::Instance {
        self.instance.handle()
    }

    fn physical_device(&self) -> vk::PhysicalDevice {
        self.physical_device
    }

    fn device(&self) -> vk::Device {
        self.device.handle()
    }

    fn physical_device_memory_properties(&self) -> vk::PhysicalDeviceMemoryProperties {
        unsafe { self.instance.get_physical_device_memory_properties(self.physical_device) }
    }

    fn create_render_pass(&self, info: &vk::RenderPassCreateInfo<'_>) -> VkResult<vk::RenderPass> {
        unsafe { self.device.create_render_pass(info, None) }
    }

    fn destroy_render_pass(&self, render_pass: vk::RenderPass) {
        unsafe { self.device.destroy_render_pass(render_pass, None) }
    }

    fn create_image(&self, info: &vk::ImageCreateInfo<'_>) -> VkResult<vk::Image> {
        unsafe { self.device.create_image(info, None) }
    }

    fn destroy_image(&self, image: vk::Image) {
        unsafe { self.device.destroy_image(image, None) }
    }

    fn image_memory_requirements(&self, image: vk::Image) -> vk::MemoryRequirements {
        unsafe { self.device.get_image_memory_requirements(image) }
    }

    fn allocate_memory(&self, info: &vk::MemoryAllocateInfo<'_>) -> VkResult<vk::DeviceMemory> {
        unsafe { self.device.allocate_memory(info, None) }
    }

    fn free_memory(&self, memory: vk::DeviceMemory) {
        unsafe { self.device.free_memory(memory, None) }
    }

    fn bind_image_memory(&self, image: vk::Image, memory: vk::DeviceMemory, offset: vk::DeviceSize) -> VkResult<()> {
        unsafe { self.device.bind_image_memory(image, memory, offset) }
    }

    fn create_image_view(&self, info: &vk::ImageViewCreateInfo<'_>) -> VkResult<vk::ImageView> {
        unsafe { self.device.create_image_view(info, None) }
    }

    fn destroy_image_view(&self, view: vk::ImageView) {
        unsafe { self.device.destroy_image_view(view, None) }
    }

    fn create_framebuffer(&self, info: &vk::FramebufferCreateInfo<'_>) -> VkResult<vk::Framebuffer> {
        unsafe { self.device.create_framebuffer(info, None) }
    }

    fn destroy_framebuffer(&self, framebuffer: vk::Framebuffer) {
        unsafe { self.device.destroy_framebuffer(framebuffer, None) }
    }
}

// The instance and device belong to the host; only the messenger is ours.
#[cfg(feature = "vulkan-validation")]
impl Drop for AshDeviceFunctions {
    fn drop(&mut self) {
        if let Some(messenger) = self.messenger.take() {
            messenger.detach();
        }
    }
}

#[cfg(test)]
#[path = "ash_device_tests.rs"]
mod tests;
