/// VulkanRenderTarget - render pass + current image set for one device
///
/// Two independent sub-resources: the render pass is created once per
/// device, the image set is rebuilt for every size. Dropping the target
/// releases the image set and then destroys the render pass.

use std::sync::Arc;
use ash::vk;
use ash::vk::Handle;
use crate::config::MemoryTypePolicy;
use crate::error::Result;
use crate::surface::{PixelFormat, SurfaceSize};
use crate::vulkan::image_set::VulkanImageSet;
use crate::vulkan::render_pass::create_video_render_pass;
use crate::vulkan::VulkanDeviceFunctions;
use crate::{vtex_debug, vtex_trace};

pub struct VulkanRenderTarget {
    functions: Arc<dyn VulkanDeviceFunctions>,
    /// Device the render pass was created on
    device: vk::Device,
    render_pass: vk::RenderPass,
    format: PixelFormat,
    policy: MemoryTypePolicy,
    image_set: Option<VulkanImageSet>,
}

impl VulkanRenderTarget {
    /// Create the render pass for `functions.device()`
    pub fn new(
        functions: Arc<dyn VulkanDeviceFunctions>,
        format: PixelFormat,
        policy: MemoryTypePolicy,
    ) -> Result<Self> {
        let render_pass = create_video_render_pass(functions.as_ref(), format)?;
        let device = functions.device();
        vtex_debug!("vtex::vulkan", "Render pass created for device 0x{:x}", device.as_raw());
        Ok(Self {
            functions,
            device,
            render_pass,
            format,
            policy,
            image_set: None,
        })
    }

    /// Device this target's render pass belongs to
    pub fn device(&self) -> vk::Device {
        self.device
    }

    /// True when `functions` drive the same device as this target
    pub fn matches_device(&self, functions: &dyn VulkanDeviceFunctions) -> bool {
        functions.device() == self.device
    }

    pub fn functions(&self) -> &Arc<dyn VulkanDeviceFunctions> {
        &self.functions
    }

    pub fn render_pass(&self) -> vk::RenderPass {
        self.render_pass
    }

    pub fn image_set(&self) -> Option<&VulkanImageSet> {
        self.image_set.as_ref()
    }

    /// Release the current image set (if any) and assemble one sized to `size`
    ///
    /// On failure the target holds no image set.
    pub fn rebuild(&mut self, size: SurfaceSize) -> Result<VulkanImageSet> {
        self.release_image_set();
        let set = VulkanImageSet::build(
            self.functions.as_ref(),
            self.render_pass,
            size,
            self.format,
            self.policy,
        )?;
        vtex_trace!("vtex::vulkan", "Image set {}x{} built (memory type {})",
            size.width, size.height, set.memory_type_index);
        self.image_set = Some(set);
        Ok(set)
    }

    /// Destroy the current image set, keeping the render pass
    pub fn release_image_set(&mut self) {
        if let Some(mut set) = self.image_set.take() {
            set.destroy(self.functions.as_ref());
        }
    }
}

impl Drop for VulkanRenderTarget {
    fn drop(&mut self) {
        self.release_image_set();
        if !self.render_pass.is_null() {
            self.functions.destroy_render_pass(self.render_pass);
            self.render_pass = vk::RenderPass::null();
        }
    }
}

#[cfg(test)]
#[path = "render_target_tests.rs"]
mod tests;
