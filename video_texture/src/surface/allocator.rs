/// SurfaceAllocator - creates and releases the node's native surface
///
/// Owns the GPU objects behind the `NativeSurface` it hands out. At most one
/// surface is live: allocating releases the previous one first. The Vulkan
/// render pass outlives surfaces and is only destroyed on device change or
/// shutdown.

use std::sync::Arc;
use ash::vk;
use ash::vk::Handle;
use crate::config::MemoryTypePolicy;
use crate::error::{Error, Result};
use crate::surface::{
    create_d3d11_surface, create_gl_surface, create_metal_surface, release_d3d11_surface,
    release_gl_surface, release_metal_surface, BackendKind, D3d11Device, GlFunctions,
    MetalDevice, NativeSurface, SurfaceDescriptor,
};
use crate::vulkan::{VulkanDeviceFunctions, VulkanRenderTarget};
use crate::{vtex_debug, vtex_error, vtex_info};

/// Device entry points for the host's active backend
#[derive(Clone)]
pub enum DeviceContext {
    OpenGl(Arc<dyn GlFunctions>),
    Direct3D11(Arc<dyn D3d11Device>),
    Metal(Arc<dyn MetalDevice>),
    Vulkan(Arc<dyn VulkanDeviceFunctions>),
}

impl DeviceContext {
    pub fn backend(&self) -> BackendKind {
        match self {
            DeviceContext::OpenGl(_) => BackendKind::OpenGl,
            DeviceContext::Direct3D11(_) => BackendKind::Direct3D11,
            DeviceContext::Metal(_) => BackendKind::Metal,
            DeviceContext::Vulkan(_) => BackendKind::Vulkan,
        }
    }

    /// Identity of the device behind this context
    ///
    /// VkDevice handle for Vulkan, the raw device for Direct3D11 and Metal.
    /// OpenGL exposes no device object, so the function table itself
    /// identifies the context; hosts hand out the same table for as long as
    /// the GL context lives.
    pub fn device_id(&self) -> u64 {
        match self {
            DeviceContext::OpenGl(gl) => Arc::as_ptr(gl) as *const () as usize as u64,
            DeviceContext::Direct3D11(device) => device.raw_device().as_raw(),
            DeviceContext::Metal(device) => device.raw_device().as_raw(),
            DeviceContext::Vulkan(functions) => functions.device().as_raw(),
        }
    }
}

/// Live surface together with the device it must be released on
struct LiveSurface {
    context: DeviceContext,
    surface: NativeSurface,
}

pub struct SurfaceAllocator {
    policy: MemoryTypePolicy,
    live: Option<LiveSurface>,
    vulkan: Option<VulkanRenderTarget>,
}

impl SurfaceAllocator {
    pub fn new(policy: MemoryTypePolicy) -> Self {
        Self {
            policy,
            live: None,
            vulkan: None,
        }
    }

    /// Currently live surface
    pub fn surface(&self) -> Option<&NativeSurface> {
        self.live.as_ref().map(|live| &live.surface)
    }

    /// Render pass of the Vulkan target, if one exists
    pub fn vulkan_render_pass(&self) -> Option<vk::RenderPass> {
        self.vulkan.as_ref().map(|target| target.render_pass())
    }

    /// Allocate a surface for `desc` on `context`
    ///
    /// The previous surface is released before anything is created. On error
    /// no surface is live and the caller retries on its next sync.
    ///
    /// # Errors
    ///
    /// - `Error::InvalidResource` if `desc.backend` is not the context's backend
    /// - any backend creation failure (already logged)
    pub fn ensure_surface(
        &mut self,
        context: &DeviceContext,
        desc: &SurfaceDescriptor,
    ) -> Result<NativeSurface> {
        if desc.backend != context.backend() {
            vtex_error!(
                "vtex::allocator",
                "{:?} descriptor handed to a {:?} device",
                desc.backend,
                context.backend()
            );
            return Err(Error::InvalidResource(format!(
                "descriptor backend {:?} does not match device backend {:?}",
                desc.backend,
                context.backend()
            )));
        }

        self.release();

        let surface = match context {
            DeviceContext::OpenGl(gl) => NativeSurface::Gl(create_gl_surface(gl.as_ref(), desc)?),
            DeviceContext::Direct3D11(device) => {
                NativeSurface::D3d11(create_d3d11_surface(device.as_ref(), desc)?)
            }
            DeviceContext::Metal(device) => {
                NativeSurface::Metal(create_metal_surface(device.as_ref(), desc)?)
            }
            DeviceContext::Vulkan(functions) => {
                let target = self.vulkan_target(functions, desc)?;
                NativeSurface::Vulkan(target.rebuild(desc.size)?)
            }
        };

        vtex_debug!("vtex::allocator", "{:?} surface {}x{} allocated",
            desc.backend, desc.size.width, desc.size.height);

        self.live = Some(LiveSurface {
            context: context.clone(),
            surface,
        });
        Ok(surface)
    }

    /// Vulkan target for `functions`' device, created on first use and
    /// recreated when the device changed
    fn vulkan_target(
        &mut self,
        functions: &Arc<dyn VulkanDeviceFunctions>,
        desc: &SurfaceDescriptor,
    ) -> Result<&mut VulkanRenderTarget> {
        let stale = self.vulkan
            .as_ref()
            .is_some_and(|target| !target.matches_device(functions.as_ref()));
        if stale {
            vtex_info!("vtex::allocator", "Vulkan device changed, recreating render pass");
            self.vulkan = None;
        }
        if self.vulkan.is_none() {
            self.vulkan = Some(VulkanRenderTarget::new(
                functions.clone(),
                desc.format,
                self.policy,
            )?);
        }
        self.vulkan
            .as_mut()
            .ok_or_else(|| Error::InitializationFailed("Vulkan render target missing".to_string()))
    }

    /// Release the live surface, if any
    pub fn release(&mut self) {
        let Some(live) = self.live.take() else {
            return;
        };
        match (live.context, live.surface) {
            (DeviceContext::OpenGl(gl), NativeSurface::Gl(surface)) => {
                release_gl_surface(gl.as_ref(), surface);
            }
            (DeviceContext::Direct3D11(device), NativeSurface::D3d11(surface)) => {
                release_d3d11_surface(device.as_ref(), surface);
            }
            (DeviceContext::Metal(device), NativeSurface::Metal(surface)) => {
                release_metal_surface(device.as_ref(), surface);
            }
            (DeviceContext::Vulkan(_), NativeSurface::Vulkan(_)) => {
                if let Some(target) = self.vulkan.as_mut() {
                    target.release_image_set();
                }
            }
            // ensure_surface only ever pairs a surface with its own backend
            _ => {}
        }
    }

    /// Release the live surface and the Vulkan render pass
    pub fn shutdown(&mut self) {
        self.release();
        self.vulkan = None;
    }
}

impl Drop for SurfaceAllocator {
    fn drop(&mut self) {
        self.shutdown();
    }
}

#[cfg(test)]
#[path = "allocator_tests.rs"]
mod tests;
