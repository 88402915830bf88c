/// VulkanImageSet - image, memory, view and framebuffer of one video frame target
///
/// Rebuilt on every size change. The framebuffer must never outlive the view
/// and image it attaches, so teardown runs framebuffer → memory → view → image.

use ash::vk;
use ash::vk::Handle;
use crate::config::MemoryTypePolicy;
use crate::error::{Error, Result};
use crate::surface::{PixelFormat, SurfaceSize};
use crate::vulkan::memory::select_memory_type;
use crate::vulkan::{vk_error, VulkanDeviceFunctions};
use crate::vtex_error;

/// Handles of an assembled video render target
///
/// The render pass is borrowed from the owning `VulkanRenderTarget` and is not
/// destroyed with the set.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VulkanImageSet {
    pub image: vk::Image,
    pub memory: vk::DeviceMemory,
    pub view: vk::ImageView,
    pub framebuffer: vk::Framebuffer,
    pub render_pass: vk::RenderPass,
    pub size: SurfaceSize,
    /// Memory type the image memory was allocated from
    pub memory_type_index: u32,
}

impl VulkanImageSet {
    fn empty(render_pass: vk::RenderPass, size: SurfaceSize) -> Self {
        Self {
            image: vk::Image::null(),
            memory: vk::DeviceMemory::null(),
            view: vk::ImageView::null(),
            framebuffer: vk::Framebuffer::null(),
            render_pass,
            size,
            memory_type_index: 0,
        }
    }

    /// True once every handle of the set has been destroyed (or never created)
    pub fn is_null(&self) -> bool {
        self.image.is_null()
            && self.memory.is_null()
            && self.view.is_null()
            && self.framebuffer.is_null()
    }

    /// Assemble a new set sized to `size` on `render_pass`
    ///
    /// On failure everything created so far is destroyed before returning, so
    /// a failed build never leaves partial resources behind.
    pub fn build(
        functions: &dyn VulkanDeviceFunctions,
        render_pass: vk::RenderPass,
        size: SurfaceSize,
        format: PixelFormat,
        policy: MemoryTypePolicy,
    ) -> Result<Self> {
        let mut set = Self::empty(render_pass, size);
        match set.assemble(functions, format, policy) {
            Ok(()) => Ok(set),
            Err(e) => {
                set.destroy(functions);
                Err(e)
            }
        }
    }

    fn assemble(
        &mut self,
        functions: &dyn VulkanDeviceFunctions,
        format: PixelFormat,
        policy: MemoryTypePolicy,
    ) -> Result<()> {
        let vk_format = format.to_vk();

        let image_info = vk::ImageCreateInfo::default()
            .image_type(vk::ImageType::TYPE_2D)
            .format(vk_format)
            .extent(vk::Extent3D {
                width: self.size.width,
                height: self.size.height,
                depth: 1,
            })
            .mip_levels(1)
            .array_layers(1)
            .samples(vk::SampleCountFlags::TYPE_1)
            .tiling(vk::ImageTiling::OPTIMAL)
            .usage(
                vk::ImageUsageFlags::SAMPLED
                    | vk::ImageUsageFlags::TRANSFER_DST
                    | vk::ImageUsageFlags::COLOR_ATTACHMENT,
            )
            .sharing_mode(vk::SharingMode::EXCLUSIVE)
            .initial_layout(vk::ImageLayout::PREINITIALIZED);

        self.image = functions.create_image(&image_info)
            .map_err(|e| vk_error("create image", e))?;

        let requirements = functions.image_memory_requirements(self.image);
        let memory_properties = functions.physical_device_memory_properties();
        self.memory_type_index = select_memory_type(
            requirements.memory_type_bits,
            &memory_properties,
            policy,
        )
        .ok_or_else(|| {
            vtex_error!("vtex::vulkan", "No memory type matches mask 0x{:08X}",
                requirements.memory_type_bits);
            Error::BackendError(format!(
                "no memory type matches mask 0x{:08X}",
                requirements.memory_type_bits
            ))
        })?;

        let allocate_info = vk::MemoryAllocateInfo::default()
            .allocation_size(requirements.size)
            .memory_type_index(self.memory_type_index);

        self.memory = functions.allocate_memory(&allocate_info)
            .map_err(|e| vk_error("allocate image memory", e))?;

        functions.bind_image_memory(self.image, self.memory, 0)
            .map_err(|e| vk_error("bind image memory", e))?;

        let view_info = vk::ImageViewCreateInfo::default()
            .image(self.image)
            .view_type(vk::ImageViewType::TYPE_2D)
            .format(vk_format)
            .components(vk::ComponentMapping {
                r: vk::ComponentSwizzle::IDENTITY,
                g: vk::ComponentSwizzle::IDENTITY,
                b: vk::ComponentSwizzle::IDENTITY,
                a: vk::ComponentSwizzle::IDENTITY,
            })
            .subresource_range(vk::ImageSubresourceRange {
                aspect_mask: vk::ImageAspectFlags::COLOR,
                base_mip_level: 0,
                level_count: vk::REMAINING_MIP_LEVELS,
                base_array_layer: 0,
                layer_count: vk::REMAINING_ARRAY_LAYERS,
            });

        self.view = functions.create_image_view(&view_info)
            .map_err(|e| vk_error("create image view", e))?;

        let framebuffer_info = vk::FramebufferCreateInfo::default()
            .render_pass(self.render_pass)
            .attachments(std::slice::from_ref(&self.view))
            .width(self.size.width)
            .height(self.size.height)
            .layers(1);

        self.framebuffer = functions.create_framebuffer(&framebuffer_info)
            .map_err(|e| vk_error("create framebuffer", e))?;

        Ok(())
    }

    /// Destroy every live handle: framebuffer, memory, view, image
    ///
    /// Null handles are skipped; the set is null afterwards.
    pub fn destroy(&mut self, functions: &dyn VulkanDeviceFunctions) {
        if !self.framebuffer.is_null() {
            functions.destroy_framebuffer(self.framebuffer);
            self.framebuffer = vk::Framebuffer::null();
        }
        if !self.memory.is_null() {
            functions.free_memory(self.memory);
            self.memory = vk::DeviceMemory::null();
        }
        if !self.view.is_null() {
            functions.destroy_image_view(self.view);
            self.view = vk::ImageView::null();
        }
        if !self.image.is_null() {
            functions.destroy_image(self.image);
            self.image = vk::Image::null();
        }
    }
}
