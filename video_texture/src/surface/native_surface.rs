/// NativeSurface - backend-tagged handle record of the live video surface

use ash::vk;
use ash::vk::Handle;
use crate::surface::{
    BackendKind, D3d11Texture, GlFramebuffer, MetalTexture, NativeHandle, SurfaceSize,
};
use crate::vulkan::VulkanImageSet;

/// The surface the external renderer draws into and the host samples
///
/// Exactly one variant is live per node, matching the host's active backend.
/// This is a plain handle record; the `SurfaceAllocator` that produced it owns
/// the GPU objects and releases them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NativeSurface {
    Gl(GlFramebuffer),
    D3d11(D3d11Texture),
    Metal(MetalTexture),
    Vulkan(VulkanImageSet),
}

impl NativeSurface {
    pub fn backend(&self) -> BackendKind {
        match self {
            NativeSurface::Gl(_) => BackendKind::OpenGl,
            NativeSurface::D3d11(_) => BackendKind::Direct3D11,
            NativeSurface::Metal(_) => BackendKind::Metal,
            NativeSurface::Vulkan(_) => BackendKind::Vulkan,
        }
    }

    pub fn size(&self) -> SurfaceSize {
        match self {
            NativeSurface::Gl(s) => s.size,
            NativeSurface::D3d11(s) => s.size,
            NativeSurface::Metal(s) => s.size,
            NativeSurface::Vulkan(s) => s.size,
        }
    }

    /// Object handed to the host's texture import
    ///
    /// GL texture name, ID3D11Texture2D, id<MTLTexture> or VkImage.
    pub fn native_object(&self) -> NativeHandle {
        match self {
            NativeSurface::Gl(s) => NativeHandle::from_raw(s.texture as u64),
            NativeSurface::D3d11(s) => s.texture,
            NativeSurface::Metal(s) => s.texture,
            NativeSurface::Vulkan(s) => NativeHandle::from_raw(s.image.as_raw()),
        }
    }

    /// Image layout the host should assume when sampling
    ///
    /// Only meaningful for Vulkan (a raw VkImageLayout); 0 elsewhere.
    pub fn native_layout(&self) -> i32 {
        match self {
            NativeSurface::Vulkan(_) => vk::ImageLayout::SHADER_READ_ONLY_OPTIMAL.as_raw(),
            _ => 0,
        }
    }
}
