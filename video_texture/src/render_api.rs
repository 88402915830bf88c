/// Render API bridge
///
/// Builds the backend-tagged binding the external renderer is configured
/// with. The binding only lives for the duration of
/// `ExternalRenderer::configure`; the Vulkan frame callbacks it carries hold
/// weak references, so a renderer that keeps them around cannot keep the node
/// alive.

use std::sync::{Arc, Mutex, Weak};
use ash::vk;
use ash::vk::Handle;
use crate::error::Result;
use crate::host::{HostResource, HostWindow};
use crate::surface::{BackendKind, NativeHandle, NativeSurface, SurfaceSize};
use crate::vtex_warn_err;

/// Per-frame queries the external renderer makes while drawing on Vulkan
pub trait FrameCallbacks: Send + Sync {
    /// Size of the image set being rendered into
    fn render_target_size(&self) -> Option<SurfaceSize>;

    /// Framebuffer to record into this frame
    fn begin_frame(&self) -> Option<vk::Framebuffer>;

    /// Command buffer the host is recording for this frame
    fn current_command_buffer(&self) -> Option<vk::CommandBuffer>;

    fn end_frame(&self);
}

/// Everything the external renderer needs to draw into the node's surface
#[derive(Clone)]
pub enum RenderApiBinding {
    OpenGl {
        /// Framebuffer object name
        framebuffer: u32,
    },
    Direct3D11 {
        /// ID3D11Texture2D to render into
        render_target: NativeHandle,
    },
    Metal {
        /// id<MTLTexture> to render into
        texture: NativeHandle,
        /// id<MTLDevice>
        device: NativeHandle,
        /// id<MTLCommandQueue>
        command_queue: NativeHandle,
    },
    Vulkan {
        instance: vk::Instance,
        physical_device: vk::PhysicalDevice,
        device: vk::Device,
        render_pass: vk::RenderPass,
        callbacks: Arc<dyn FrameCallbacks>,
    },
}

impl RenderApiBinding {
    pub fn backend(&self) -> BackendKind {
        match self {
            RenderApiBinding::OpenGl { .. } => BackendKind::OpenGl,
            RenderApiBinding::Direct3D11 { .. } => BackendKind::Direct3D11,
            RenderApiBinding::Metal { .. } => BackendKind::Metal,
            RenderApiBinding::Vulkan { .. } => BackendKind::Vulkan,
        }
    }
}

impl std::fmt::Debug for RenderApiBinding {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RenderApiBinding::OpenGl { framebuffer } => f
                .debug_struct("OpenGl")
                .field("framebuffer", framebuffer)
                .finish(),
            RenderApiBinding::Direct3D11 { render_target } => f
                .debug_struct("Direct3D11")
                .field("render_target", render_target)
                .finish(),
            RenderApiBinding::Metal { texture, device, command_queue } => f
                .debug_struct("Metal")
                .field("texture", texture)
                .field("device", device)
                .field("command_queue", command_queue)
                .finish(),
            RenderApiBinding::Vulkan { instance, physical_device, device, render_pass, .. } => f
                .debug_struct("Vulkan")
                .field("instance", instance)
                .field("physical_device", physical_device)
                .field("device", device)
                .field("render_pass", render_pass)
                .finish_non_exhaustive(),
        }
    }
}

// ============================================================================
// Frame state
// ============================================================================

/// What the Vulkan callbacks report for the node's current image set
///
/// Cleared as soon as a rebuild starts, so callbacks made while the node has
/// no valid set report nothing.
#[derive(Debug, Default)]
pub struct FrameState {
    current: Mutex<Option<FrameTarget>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct FrameTarget {
    size: SurfaceSize,
    framebuffer: vk::Framebuffer,
}

impl FrameState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Publish the image set the renderer should draw into
    pub fn set(&self, size: SurfaceSize, framebuffer: vk::Framebuffer) {
        if let Ok(mut current) = self.current.lock() {
            *current = Some(FrameTarget { size, framebuffer });
        }
    }

    pub fn clear(&self) {
        if let Ok(mut current) = self.current.lock() {
            *current = None;
        }
    }

    pub fn size(&self) -> Option<SurfaceSize> {
        self.current.lock().ok().and_then(|c| c.map(|t| t.size))
    }

    pub fn framebuffer(&self) -> Option<vk::Framebuffer> {
        self.current.lock().ok().and_then(|c| c.map(|t| t.framebuffer))
    }
}

/// `FrameCallbacks` over weak references to a node's frame state and window
pub struct NodeFrameCallbacks {
    state: Weak<FrameState>,
    window: Weak<dyn HostWindow>,
}

impl NodeFrameCallbacks {
    pub fn new(state: &Arc<FrameState>, window: &Arc<dyn HostWindow>) -> Self {
        Self {
            state: Arc::downgrade(state),
            window: Arc::downgrade(window),
        }
    }
}

impl FrameCallbacks for NodeFrameCallbacks {
    fn render_target_size(&self) -> Option<SurfaceSize> {
        self.state.upgrade()?.size()
    }

    fn begin_frame(&self) -> Option<vk::Framebuffer> {
        self.state.upgrade()?.framebuffer()
    }

    fn current_command_buffer(&self) -> Option<vk::CommandBuffer> {
        // A node that is gone has no frame being recorded
        self.state.upgrade()?;
        let raw = self.window.upgrade()?.resource(HostResource::CommandList)?;
        if raw.is_null() {
            return None;
        }
        Some(vk::CommandBuffer::from_raw(raw.as_raw()))
    }

    fn end_frame(&self) {}
}

// ============================================================================
// Binding
// ============================================================================

/// Build the binding for `surface` on `window`'s active device
///
/// Vulkan bindings use the set's render pass and carry callbacks over
/// `frame_state`, which must already describe `surface`.
///
/// # Errors
///
/// `Error::BackendError` if the host withholds a handle the backend needs
pub fn bind_external_renderer(
    surface: &NativeSurface,
    window: &Arc<dyn HostWindow>,
    frame_state: &Arc<FrameState>,
) -> Result<RenderApiBinding> {
    let binding = match surface {
        NativeSurface::Gl(fbo) => RenderApiBinding::OpenGl {
            framebuffer: fbo.framebuffer,
        },
        NativeSurface::D3d11(texture) => RenderApiBinding::Direct3D11 {
            render_target: texture.texture,
        },
        NativeSurface::Metal(texture) => RenderApiBinding::Metal {
            texture: texture.texture,
            device: required_resource(window.as_ref(), HostResource::Device)?,
            command_queue: required_resource(window.as_ref(), HostResource::CommandQueue)?,
        },
        NativeSurface::Vulkan(set) => RenderApiBinding::Vulkan {
            instance: vk::Instance::from_raw(
                required_resource(window.as_ref(), HostResource::VulkanInstance)?.as_raw(),
            ),
            physical_device: vk::PhysicalDevice::from_raw(
                required_resource(window.as_ref(), HostResource::PhysicalDevice)?.as_raw(),
            ),
            device: vk::Device::from_raw(
                required_resource(window.as_ref(), HostResource::Device)?.as_raw(),
            ),
            render_pass: set.render_pass,
            callbacks: Arc::new(NodeFrameCallbacks::new(frame_state, window)),
        },
    };
    Ok(binding)
}

fn required_resource(window: &dyn HostWindow, resource: HostResource) -> Result<NativeHandle> {
    match window.resource(resource) {
        Some(handle) if !handle.is_null() => Ok(handle),
        _ => Err(vtex_warn_err!("vtex::render_api", "Host resource {:?} unavailable", resource)),
    }
}

#[cfg(test)]
#[path = "render_api_tests.rs"]
mod tests;
