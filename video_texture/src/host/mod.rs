/// Host module - the scene-graph host's side of the contract
///
/// The host (a UI toolkit's render loop) implements `HostWindow`, `HostItem`
/// and `HostTexture`. This crate never talks to the toolkit any other way.

pub mod signal;

pub use signal::{Signal, SignalConnection, Slot};

use std::sync::Arc;
use crate::surface::{BackendKind, DeviceContext, LogicalSize, NativeHandle, SurfaceSize};

/// Graphics API the host's scene graph renders with
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GraphicsApi {
    Unknown,
    Software,
    OpenGl,
    /// OpenGL through the host's RHI layer
    OpenGlRhi,
    Direct3D11,
    Metal,
    Vulkan,
}

impl GraphicsApi {
    /// Surface backend for this API, `None` when no video surface can be made
    pub fn backend_kind(self) -> Option<BackendKind> {
        match self {
            GraphicsApi::OpenGl | GraphicsApi::OpenGlRhi => Some(BackendKind::OpenGl),
            GraphicsApi::Direct3D11 => Some(BackendKind::Direct3D11),
            GraphicsApi::Metal => Some(BackendKind::Metal),
            GraphicsApi::Vulkan => Some(BackendKind::Vulkan),
            GraphicsApi::Unknown | GraphicsApi::Software => None,
        }
    }
}

/// Native objects the host exposes for its active device
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HostResource {
    /// ID3D11Device, id<MTLDevice> or VkDevice
    Device,
    /// id<MTLCommandQueue>
    CommandQueue,
    /// VkCommandBuffer being recorded for the current frame
    CommandList,
    /// VkPhysicalDevice
    PhysicalDevice,
    /// VkInstance
    VulkanInstance,
}

/// Request to wrap a native surface as a host texture
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TextureImport {
    /// GL texture name, ID3D11Texture2D, id<MTLTexture> or VkImage
    pub object: NativeHandle,
    /// VkImageLayout the image is in when sampled; 0 for other backends
    pub layout: i32,
    pub size: SurfaceSize,
}

/// Host texture sampling a native surface
///
/// Dropping it releases the host's wrapper, never the native surface.
pub trait HostTexture: Send {
    fn size(&self) -> SurfaceSize;
}

/// The window whose render thread hosts the node
pub trait HostWindow: Send + Sync {
    fn graphics_api(&self) -> GraphicsApi;

    /// Effective device pixel ratio of the screen the window is on
    fn device_pixel_ratio(&self) -> f64;

    /// Device entry points for `backend`, `None` if the window is not rendering with it
    fn device_context(&self, backend: BackendKind) -> Option<DeviceContext>;

    /// Native object for `resource`, `None` if unavailable
    fn resource(&self, resource: HostResource) -> Option<NativeHandle>;

    /// Wrap a native surface as a host texture
    fn import_texture(&self, import: &TextureImport) -> Option<Box<dyn HostTexture>>;

    /// Schedule a frame, so the before-rendering signal fires
    fn request_update(&self);

    /// Run `slot` on the render thread before each frame is recorded
    fn connect_before_rendering(&self, slot: Slot) -> SignalConnection;

    /// Run `slot` when the window moves to another screen
    fn connect_screen_changed(&self, slot: Slot) -> SignalConnection;
}

/// The UI item the video is shown in
pub trait HostItem: Send + Sync {
    /// Item size in logical units
    fn size(&self) -> LogicalSize;

    /// Schedule a repaint of the item (paint-node update)
    fn update(&self);

    fn window(&self) -> Option<Arc<dyn HostWindow>>;
}
