/// Render pass for the video render target

use ash::vk;
use crate::error::Result;
use crate::surface::PixelFormat;
use crate::vulkan::{vk_error, VulkanDeviceFunctions};

/// Create the single-subpass render pass the external renderer records into
///
/// One color attachment (cleared on load, stored), one sample, ending in
/// COLOR_ATTACHMENT_OPTIMAL. No depth/stencil and no resolve attachment.
/// Depends only on format and sample count, so it survives resizes.
pub fn create_video_render_pass(
    functions: &dyn VulkanDeviceFunctions,
    format: PixelFormat,
) -> Result<vk::RenderPass> {
    let color_attachment = vk::AttachmentDescription::default()
        .format(format.to_vk())
        .samples(vk::SampleCountFlags::TYPE_1)
        .load_op(vk::AttachmentLoadOp::CLEAR)
        .store_op(vk::AttachmentStoreOp::STORE)
        .stencil_load_op(vk::AttachmentLoadOp::DONT_CARE)
        .stencil_store_op(vk::AttachmentStoreOp::DONT_CARE)
        .initial_layout(vk::ImageLayout::UNDEFINED)
        .final_layout(vk::ImageLayout::COLOR_ATTACHMENT_OPTIMAL);

    let color_ref = vk::AttachmentReference::default()
        .attachment(0)
        .layout(vk::ImageLayout::COLOR_ATTACHMENT_OPTIMAL);

    let subpass = vk::SubpassDescription::default()
        .pipeline_bind_point(vk::PipelineBindPoint::GRAPHICS)
        .color_attachments(std::slice::from_ref(&color_ref));

    let render_pass_info = vk::RenderPassCreateInfo::default()
        .attachments(std::slice::from_ref(&color_attachment))
        .subpasses(std::slice::from_ref(&subpass));

    functions
        .create_render_pass(&render_pass_info)
        .map_err(|e| vk_error("create render pass", e))
}
