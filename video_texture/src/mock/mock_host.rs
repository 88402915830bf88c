/// Mock host window, item and texture

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use rustc_hash::FxHashMap;
use crate::host::{
    GraphicsApi, HostItem, HostResource, HostTexture, HostWindow, Signal, SignalConnection, Slot,
    TextureImport,
};
use crate::surface::{BackendKind, DeviceContext, LogicalSize, NativeHandle, SurfaceSize};

// ============================================================================
// Mock Texture
// ============================================================================

pub struct MockHostTexture {
    pub import: TextureImport,
    live: Arc<AtomicUsize>,
}

impl HostTexture for MockHostTexture {
    fn size(&self) -> SurfaceSize {
        self.import.size
    }
}

impl Drop for MockHostTexture {
    fn drop(&mut self) {
        self.live.fetch_sub(1, Ordering::SeqCst);
    }
}

// ============================================================================
// Mock Window
// ============================================================================

pub struct MockWindow {
    pub api: Mutex<GraphicsApi>,
    pub dpr: Mutex<f64>,
    pub context: Mutex<Option<DeviceContext>>,
    pub resources: Mutex<FxHashMap<HostResource, NativeHandle>>,
    pub imports: Mutex<Vec<TextureImport>>,
    pub fail_import: AtomicBool,
    pub update_requests: AtomicUsize,
    /// Host textures alive right now
    pub live_textures: Arc<AtomicUsize>,
    pub before_rendering: Signal,
    pub screen_changed: Signal,
}

impl MockWindow {
    /// Window rendering with `api` through `context`, at pixel ratio 1
    ///
    /// Vulkan, Metal and command-list resources are pre-populated with
    /// non-null handles.
    pub fn new(api: GraphicsApi, context: Option<DeviceContext>) -> Self {
        let mut resources = FxHashMap::default();
        resources.insert(HostResource::Device, NativeHandle::from_raw(0xDE71CE));
        resources.insert(HostResource::CommandQueue, NativeHandle::from_raw(0xC0DE));
        resources.insert(HostResource::CommandList, NativeHandle::from_raw(0xCB));
        resources.insert(HostResource::PhysicalDevice, NativeHandle::from_raw(0x9D));
        resources.insert(HostResource::VulkanInstance, NativeHandle::from_raw(0x1257));
        Self {
            api: Mutex::new(api),
            dpr: Mutex::new(1.0),
            context: Mutex::new(context),
            resources: Mutex::new(resources),
            imports: Mutex::new(Vec::new()),
            fail_import: AtomicBool::new(false),
            update_requests: AtomicUsize::new(0),
            live_textures: Arc::new(AtomicUsize::new(0)),
            before_rendering: Signal::new(),
            screen_changed: Signal::new(),
        }
    }

    pub fn set_api(&self, api: GraphicsApi, context: Option<DeviceContext>) {
        *self.api.lock().unwrap() = api;
        *self.context.lock().unwrap() = context;
    }

    pub fn set_dpr(&self, dpr: f64) {
        *self.dpr.lock().unwrap() = dpr;
    }

    pub fn remove_resource(&self, resource: HostResource) {
        self.resources.lock().unwrap().remove(&resource);
    }

    pub fn import_count(&self) -> usize {
        self.imports.lock().unwrap().len()
    }

    pub fn last_import(&self) -> Option<TextureImport> {
        self.imports.lock().unwrap().last().copied()
    }
}

impl HostWindow for MockWindow {
    fn graphics_api(&self) -> GraphicsApi {
        *self.api.lock().unwrap()
    }

    fn device_pixel_ratio(&self) -> f64 {
        *self.dpr.lock().unwrap()
    }

    fn device_context(&self, backend: BackendKind) -> Option<DeviceContext> {
        self.context
            .lock()
            .unwrap()
            .clone()
            .filter(|context| context.backend() == backend)
    }

    fn resource(&self, resource: HostResource) -> Option<NativeHandle> {
        self.resources.lock().unwrap().get(&resource).copied()
    }

    fn import_texture(&self, import: &TextureImport) -> Option<Box<dyn HostTexture>> {
        if self.fail_import.load(Ordering::SeqCst) {
            return None;
        }
        self.imports.lock().unwrap().push(*import);
        self.live_textures.fetch_add(1, Ordering::SeqCst);
        Some(Box::new(MockHostTexture {
            import: *import,
            live: self.live_textures.clone(),
        }))
    }

    fn request_update(&self) {
        self.update_requests.fetch_add(1, Ordering::SeqCst);
    }

    fn connect_before_rendering(&self, slot: Slot) -> SignalConnection {
        self.before_rendering.connect(slot)
    }

    fn connect_screen_changed(&self, slot: Slot) -> SignalConnection {
        self.screen_changed.connect(slot)
    }
}

// ============================================================================
// Mock Item
// ============================================================================

pub struct MockItem {
    pub size: Mutex<LogicalSize>,
    pub updates: AtomicUsize,
    pub window: Mutex<Option<Arc<dyn HostWindow>>>,
}

impl MockItem {
    pub fn new(width: f64, height: f64, window: Option<Arc<dyn HostWindow>>) -> Self {
        Self {
            size: Mutex::new(LogicalSize::new(width, height)),
            updates: AtomicUsize::new(0),
            window: Mutex::new(window),
        }
    }

    pub fn resize(&self, width: f64, height: f64) {
        *self.size.lock().unwrap() = LogicalSize::new(width, height);
    }

    pub fn update_count(&self) -> usize {
        self.updates.load(Ordering::SeqCst)
    }
}

impl HostItem for MockItem {
    fn size(&self) -> LogicalSize {
        *self.size.lock().unwrap()
    }

    fn update(&self) {
        self.updates.fetch_add(1, Ordering::SeqCst);
    }

    fn window(&self) -> Option<Arc<dyn HostWindow>> {
        self.window.lock().unwrap().clone()
    }
}
