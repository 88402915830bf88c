/// VulkanDeviceFunctions - the Vulkan entry points used by the render target assembly
///
/// The host owns the VkInstance/VkDevice; this trait exposes the handful of
/// device-level calls the assembly needs. `video_texture_vulkan` implements it
/// over an `ash::Device` loaded from the host's handles, tests implement it
/// with a counting mock.

use ash::prelude::VkResult;
use ash::vk;

/// Device-level Vulkan calls, made only from the render thread
///
/// Create-info structs are built with ash's builders and are valid for the
/// duration of the call. Destroy calls accept null handles as no-ops.
pub trait VulkanDeviceFunctions: Send + Sync {
    /// VkInstance the device was created from
    fn instance(&self) -> vk::Instance;

    /// VkPhysicalDevice backing `device()`
    fn physical_device(&self) -> vk::PhysicalDevice;

    /// VkDevice; identifies the device context (a change forces a new render pass)
    fn device(&self) -> vk::Device;

    fn physical_device_memory_properties(&self) -> vk::PhysicalDeviceMemoryProperties;

    fn create_render_pass(&self, info: &vk::RenderPassCreateInfo<'_>) -> VkResult<vk::RenderPass>;
    fn destroy_render_pass(&self, render_pass: vk::RenderPass);

    fn create_image(&self, info: &vk::ImageCreateInfo<'_>) -> VkResult<vk::Image>;
    fn destroy_image(&self, image: vk::Image);
    fn image_memory_requirements(&self, image: vk::Image) -> vk::MemoryRequirements;

    fn allocate_memory(&self, info: &vk::MemoryAllocateInfo<'_>) -> VkResult<vk::DeviceMemory>;
    fn free_memory(&self, memory: vk::DeviceMemory);
    fn bind_image_memory(&self, image: vk::Image, memory: vk::DeviceMemory, offset: vk::DeviceSize) -> VkResult<()>;

    fn create_image_view(&self, info: &vk::ImageViewCreateInfo<'_>) -> VkResult<vk::ImageView>;
    fn destroy_image_view(&self, view: vk::ImageView);

    fn create_framebuffer(&self, info: &vk::FramebufferCreateInfo<'_>) -> VkResult<vk::Framebuffer>;
    fn destroy_framebuffer(&self, framebuffer: vk::Framebuffer);
}
