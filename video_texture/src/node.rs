/// VideoTextureNode - scene-graph node presenting the external renderer's output
///
/// Lives on the render thread. Each paint cycle the item calls `sync`, which
/// rebuilds the surface, the renderer binding and the host texture as one unit
/// whenever the effective size, the backend or the device changed. The host's
/// before-rendering signal then drives `render`, which asks the renderer to
/// draw into the bound surface.
///
/// ```text
/// Uninitialized ──sync──> Resizing ──> Ready ──size/backend/device change──> Resizing
///       ^                    │
///       └── rebuild failed ──┘
/// any state ──destroy──> Destroyed
/// ```

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Weak};
use crate::config::{Config, TextureFiltering};
use crate::error::{Error, Result};
use crate::host::{GraphicsApi, HostItem, HostTexture, HostWindow, SignalConnection, TextureImport};
use crate::render_api::{bind_external_renderer, FrameState};
use crate::renderer::ExternalRenderer;
use crate::surface::{
    BackendKind, DeviceContext, NativeSurface, SurfaceAllocator, SurfaceDescriptor, SurfaceSize,
};
use crate::{vtex_debug, vtex_error, vtex_trace, vtex_warn};

/// Lifecycle of a node
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeState {
    /// No surface yet, or the last rebuild failed
    Uninitialized,
    /// Surface, binding and host texture are live
    Ready,
    /// A rebuild is in progress
    Resizing,
    Destroyed,
}

/// What a `sync` call did
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SyncOutcome {
    /// Size and backend unchanged, nothing touched
    Unchanged,
    /// Surface, binding and host texture were rebuilt
    Rebuilt,
    /// Effective size has no area; the current surface is kept
    SkippedEmpty,
    /// The external renderer is gone; nothing was touched
    RendererGone,
}

/// Texture-coordinate transform applied when the host samples the texture
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum TextureCoordinatesTransform {
    #[default]
    NoTransform,
    MirrorHorizontally,
    MirrorVertically,
}

/// Node geometry in logical units
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct NodeRect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl NodeRect {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self { x, y, width, height }
    }
}

pub struct VideoTextureNode {
    item: Arc<dyn HostItem>,
    window: Arc<dyn HostWindow>,
    renderer: Option<Weak<dyn ExternalRenderer>>,
    config: Config,
    state: NodeState,

    allocator: SurfaceAllocator,
    frame_state: Arc<FrameState>,
    texture: Option<Box<dyn HostTexture>>,
    /// Effective size, backend and device of the live surface
    size: SurfaceSize,
    backend: Option<BackendKind>,
    device_id: Option<u64>,

    /// Device pixel ratio used by the last sync, as f64 bits
    dpr: Arc<AtomicU64>,
    /// Set while the renderer is bound to a live surface
    drawable: Arc<AtomicBool>,
    /// API the unsupported-backend diagnostic was last logged for
    unsupported_logged: Option<GraphicsApi>,

    rect: NodeRect,
    filtering: TextureFiltering,
    transform: TextureCoordinatesTransform,

    render_connection: Option<SignalConnection>,
    screen_connection: Option<SignalConnection>,
}

impl VideoTextureNode {
    /// Create a node for `item` shown in `window`
    ///
    /// Connects `render` to the window's before-rendering signal and a
    /// device-pixel-ratio check to its screen-changed signal. Only a weak
    /// reference to `renderer` is kept.
    pub fn new(
        item: Arc<dyn HostItem>,
        window: Arc<dyn HostWindow>,
        renderer: &Arc<dyn ExternalRenderer>,
        config: Config,
    ) -> Self {
        let renderer = Arc::downgrade(renderer);
        let drawable = Arc::new(AtomicBool::new(false));
        let dpr = Arc::new(AtomicU64::new(window.device_pixel_ratio().to_bits()));

        let render_connection = {
            let renderer = renderer.clone();
            let drawable = drawable.clone();
            window.connect_before_rendering(Arc::new(move || {
                render_frame(&renderer, &drawable);
            }))
        };

        let screen_connection = {
            let item = Arc::downgrade(&item);
            let window_ref = Arc::downgrade(&window);
            let dpr = dpr.clone();
            window.connect_screen_changed(Arc::new(move || {
                let (Some(item), Some(window)) = (item.upgrade(), window_ref.upgrade()) else {
                    return;
                };
                let current = window.device_pixel_ratio();
                if current != f64::from_bits(dpr.load(Ordering::Acquire)) {
                    vtex_debug!("vtex::node", "Device pixel ratio changed to {}", current);
                    item.update();
                }
            }))
        };

        Self {
            item,
            window,
            renderer: Some(renderer),
            allocator: SurfaceAllocator::new(config.memory_type_policy),
            config,
            state: NodeState::Uninitialized,
            frame_state: Arc::new(FrameState::new()),
            texture: None,
            size: SurfaceSize::default(),
            backend: None,
            device_id: None,
            dpr,
            drawable,
            unsupported_logged: None,
            rect: NodeRect::default(),
            filtering: config.filtering,
            transform: TextureCoordinatesTransform::NoTransform,
            render_connection: Some(render_connection),
            screen_connection: Some(screen_connection),
        }
    }

    pub fn state(&self) -> NodeState {
        self.state
    }

    pub fn window(&self) -> &Arc<dyn HostWindow> {
        &self.window
    }

    /// Host texture currently presented, if any
    pub fn texture(&self) -> Option<&dyn HostTexture> {
        self.texture.as_deref()
    }

    /// Native surface the renderer is bound to, if any
    pub fn surface(&self) -> Option<&NativeSurface> {
        self.allocator.surface()
    }

    /// Effective size of the live surface (zero before the first rebuild)
    pub fn size(&self) -> SurfaceSize {
        self.size
    }

    pub fn backend(&self) -> Option<BackendKind> {
        self.backend
    }

    pub fn rect(&self) -> NodeRect {
        self.rect
    }

    pub fn set_rect(&mut self, rect: NodeRect) {
        self.rect = rect;
    }

    pub fn filtering(&self) -> TextureFiltering {
        self.filtering
    }

    pub fn set_filtering(&mut self, filtering: TextureFiltering) {
        self.filtering = filtering;
    }

    pub fn texture_coordinates_transform(&self) -> TextureCoordinatesTransform {
        self.transform
    }

    pub fn set_texture_coordinates_transform(&mut self, transform: TextureCoordinatesTransform) {
        self.transform = transform;
    }

    /// Rebuild the surface if the effective size or backend changed
    ///
    /// Called from the item's paint-node update, on the render thread, while
    /// the logic thread is blocked.
    ///
    /// # Errors
    ///
    /// - `Error::UnsupportedBackend` if the host renders with an API that has
    ///   no video surface (logged once per API)
    /// - any allocation or binding failure (logged); the node is left
    ///   `Uninitialized` and the next sync retries
    pub fn sync(&mut self) -> Result<SyncOutcome> {
        if self.state == NodeState::Destroyed {
            vtex_debug!("vtex::node", "Sync on a destroyed node ignored");
            return Err(Error::InvalidResource("sync on a destroyed node".to_string()));
        }

        let dpr = self.window.device_pixel_ratio();
        self.dpr.store(dpr.to_bits(), Ordering::Release);
        let size = SurfaceSize::from_logical(self.item.size(), dpr);
        let api = self.window.graphics_api();
        let backend = api.backend_kind();
        let context = backend.and_then(|backend| self.window.device_context(backend));
        let device_id = context.as_ref().map(DeviceContext::device_id);

        let needs_new = self.texture.is_none()
            || size != self.size
            || backend != self.backend
            || device_id != self.device_id;
        if !needs_new {
            return Ok(SyncOutcome::Unchanged);
        }

        if size.is_empty() {
            vtex_trace!("vtex::node", "Effective size {}x{} has no area, keeping surface",
                size.width, size.height);
            return Ok(SyncOutcome::SkippedEmpty);
        }

        let Some(renderer) = self.renderer.as_ref().and_then(Weak::upgrade) else {
            return Ok(SyncOutcome::RendererGone);
        };

        let Some(backend) = backend else {
            self.release_surface();
            self.backend = None;
            self.device_id = None;
            self.state = NodeState::Uninitialized;
            if self.unsupported_logged != Some(api) {
                vtex_warn!("vtex::node", "Graphics API {:?} has no video surface support", api);
                self.unsupported_logged = Some(api);
            }
            return Err(Error::UnsupportedBackend(format!("{:?}", api)));
        };
        self.unsupported_logged = None;

        match self.rebuild(renderer.as_ref(), size, backend, context) {
            Ok(()) => Ok(SyncOutcome::Rebuilt),
            Err(e) => {
                self.release_surface();
                self.state = NodeState::Uninitialized;
                Err(e)
            }
        }
    }

    fn rebuild(
        &mut self,
        renderer: &dyn ExternalRenderer,
        size: SurfaceSize,
        backend: BackendKind,
        context: Option<DeviceContext>,
    ) -> Result<()> {
        self.state = NodeState::Resizing;
        vtex_trace!("vtex::node", "Rebuilding {:?} surface {}x{}", backend, size.width, size.height);

        let device_id = context.as_ref().map(DeviceContext::device_id);
        if self.backend.is_some_and(|previous| previous != backend) {
            vtex_debug!("vtex::node", "Backend changed to {:?}", backend);
            self.shutdown_device();
        } else if self.device_id.is_some_and(|previous| Some(previous) != device_id) {
            vtex_debug!("vtex::node", "{:?} device changed", backend);
            self.shutdown_device();
        }
        self.release_surface();

        let context = context.ok_or_else(|| {
            vtex_error!("vtex::node", "Host provides no {:?} device", backend);
            Error::InitializationFailed(format!("no {:?} device available", backend))
        })?;
        let desc = SurfaceDescriptor::new(size, backend)?;
        let surface = self.allocator.ensure_surface(&context, &desc)?;

        if let NativeSurface::Vulkan(set) = &surface {
            self.frame_state.set(size, set.framebuffer);
        }

        {
            let binding = bind_external_renderer(&surface, &self.window, &self.frame_state)?;
            renderer.configure(&binding);
        }
        if backend == BackendKind::OpenGl && self.config.flip_gl_y {
            renderer.scale(1.0, -1.0);
        } else {
            renderer.scale(1.0, 1.0);
        }

        let import = TextureImport {
            object: surface.native_object(),
            layout: surface.native_layout(),
            size,
        };
        let texture = self.window.import_texture(&import).ok_or_else(|| {
            vtex_error!("vtex::node", "Host failed to import {:?} surface {}x{}",
                backend, size.width, size.height);
            Error::BackendError("texture import failed".to_string())
        })?;
        self.texture = Some(texture);

        renderer.set_target_size(size.width, size.height);

        self.size = size;
        self.backend = Some(backend);
        self.device_id = Some(context.device_id());
        self.state = NodeState::Ready;
        self.drawable.store(true, Ordering::Release);
        vtex_debug!("vtex::node", "{:?} surface ready at {}x{}", backend, size.width, size.height);
        Ok(())
    }

    /// Release everything tied to the previous device, render pass included
    fn shutdown_device(&mut self) {
        self.release_surface();
        self.allocator.shutdown();
        self.device_id = None;
    }

    /// Drop the host texture, then release the surface it sampled
    fn release_surface(&mut self) {
        self.drawable.store(false, Ordering::Release);
        self.frame_state.clear();
        self.texture = None;
        self.allocator.release();
    }

    /// Ask the renderer to draw into the bound surface
    ///
    /// No-op when the renderer is gone or no surface is bound.
    pub fn render(&self) {
        if let Some(renderer) = &self.renderer {
            render_frame(renderer, &self.drawable);
        }
    }

    /// Release every backend resource and drop the renderer reference
    ///
    /// Disconnects from the window first, so no signal reaches a node that is
    /// being torn down. Idempotent.
    pub fn destroy(&mut self) {
        if self.state == NodeState::Destroyed {
            return;
        }
        self.render_connection = None;
        self.screen_connection = None;
        self.release_surface();
        self.allocator.shutdown();
        self.renderer = None;
        self.backend = None;
        self.device_id = None;
        self.state = NodeState::Destroyed;
        vtex_debug!("vtex::node", "Node destroyed");
    }
}

impl Drop for VideoTextureNode {
    fn drop(&mut self) {
        self.destroy();
    }
}

fn render_frame(renderer: &Weak<dyn ExternalRenderer>, drawable: &AtomicBool) {
    if !drawable.load(Ordering::Acquire) {
        return;
    }
    if let Some(renderer) = renderer.upgrade() {
        renderer.draw();
    }
}

#[cfg(test)]
#[path = "node_tests.rs"]
mod tests;
