/// Mock GPU devices for every backend

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use ash::prelude::VkResult;
use ash::vk;
use ash::vk::Handle;
use crate::error::{Error, Result};
use crate::surface::{
    D3d11Device, D3d11TextureDesc, GlFunctions, MetalDevice, MetalTextureDesc, NativeHandle,
    SurfaceSize,
};
use crate::vulkan::VulkanDeviceFunctions;

// ============================================================================
// Event log
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResourceKind {
    GlTexture,
    GlFramebuffer,
    D3d11Texture,
    MetalTexture,
    VkRenderPass,
    VkImage,
    VkMemory,
    VkImageView,
    VkFramebuffer,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DeviceEvent {
    Create(ResourceKind, u64),
    Destroy(ResourceKind, u64),
}

/// Ordered record of device calls, shared between mocks
#[derive(Debug, Clone, Default)]
pub struct EventLog {
    events: Arc<Mutex<Vec<DeviceEvent>>>,
}

impl EventLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&self, event: DeviceEvent) {
        self.events.lock().unwrap().push(event);
    }

    pub fn events(&self) -> Vec<DeviceEvent> {
        self.events.lock().unwrap().clone()
    }

    pub fn clear(&self) {
        self.events.lock().unwrap().clear();
    }

    pub fn len(&self) -> usize {
        self.events.lock().unwrap().len()
    }

    pub fn creates(&self, kind: ResourceKind) -> usize {
        self.events()
            .iter()
            .filter(|e| matches!(e, DeviceEvent::Create(k, _) if *k == kind))
            .count()
    }

    pub fn destroys(&self, kind: ResourceKind) -> usize {
        self.events()
            .iter()
            .filter(|e| matches!(e, DeviceEvent::Destroy(k, _) if *k == kind))
            .count()
    }

    /// Handles created and not yet destroyed, across all kinds
    pub fn live(&self) -> usize {
        let events = self.events();
        let created = events.iter().filter(|e| matches!(e, DeviceEvent::Create(..))).count();
        created - (events.len() - created)
    }

    /// Kinds of destroy events, in order
    pub fn destroy_order(&self) -> Vec<ResourceKind> {
        self.events()
            .iter()
            .filter_map(|e| match e {
                DeviceEvent::Destroy(kind, _) => Some(*kind),
                _ => None,
            })
            .collect()
    }

    pub fn position(&self, event: DeviceEvent) -> Option<usize> {
        self.events().iter().position(|e| *e == event)
    }
}

/// Handle source; starts high so handles never collide with null
#[derive(Debug)]
struct HandleCounter(AtomicU64);

impl HandleCounter {
    fn new() -> Self {
        Self(AtomicU64::new(0x1000))
    }

    fn next(&self) -> u64 {
        self.0.fetch_add(1, Ordering::Relaxed)
    }
}

// ============================================================================
// OpenGL
// ============================================================================

pub struct MockGl {
    pub log: EventLog,
    next: HandleCounter,
    pub fail_texture: AtomicBool,
    pub fail_framebuffer: AtomicBool,
    /// Report GL_FRAMEBUFFER_UNSUPPORTED from the completeness check
    pub incomplete: AtomicBool,
    /// (texture, size, internal format) of every created texture
    pub textures: Mutex<Vec<(u32, SurfaceSize, u32)>>,
    /// (framebuffer, texture) attachments
    pub attachments: Mutex<Vec<(u32, u32)>>,
}

impl MockGl {
    pub fn new(log: &EventLog) -> Self {
        Self {
            log: log.clone(),
            next: HandleCounter::new(),
            fail_texture: AtomicBool::new(false),
            fail_framebuffer: AtomicBool::new(false),
            incomplete: AtomicBool::new(false),
            textures: Mutex::new(Vec::new()),
            attachments: Mutex::new(Vec::new()),
        }
    }
}

impl GlFunctions for MockGl {
    fn create_texture(&self, size: SurfaceSize, internal_format: u32) -> u32 {
        if self.fail_texture.load(Ordering::SeqCst) {
            return 0;
        }
        let texture = self.next.next() as u32;
        self.textures.lock().unwrap().push((texture, size, internal_format));
        self.log.record(DeviceEvent::Create(ResourceKind::GlTexture, texture as u64));
        texture
    }

    fn gen_framebuffer(&self) -> u32 {
        if self.fail_framebuffer.load(Ordering::SeqCst) {
            return 0;
        }
        let framebuffer = self.next.next() as u32;
        self.log.record(DeviceEvent::Create(ResourceKind::GlFramebuffer, framebuffer as u64));
        framebuffer
    }

    fn attach_color_texture(&self, framebuffer: u32, texture: u32) {
        self.attachments.lock().unwrap().push((framebuffer, texture));
    }

    fn framebuffer_status(&self, _framebuffer: u32) -> u32 {
        if self.incomplete.load(Ordering::SeqCst) {
            0x8CDD // GL_FRAMEBUFFER_UNSUPPORTED
        } else {
            crate::surface::GL_FRAMEBUFFER_COMPLETE
        }
    }

    fn delete_framebuffer(&self, framebuffer: u32) {
        self.log.record(DeviceEvent::Destroy(ResourceKind::GlFramebuffer, framebuffer as u64));
    }

    fn delete_texture(&self, texture: u32) {
        self.log.record(DeviceEvent::Destroy(ResourceKind::GlTexture, texture as u64));
    }
}

// ============================================================================
// Direct3D11
// ============================================================================

pub struct MockD3d11 {
    pub log: EventLog,
    next: HandleCounter,
    pub fail: AtomicBool,
    /// Succeed but hand back a null texture
    pub return_null: AtomicBool,
    pub descs: Mutex<Vec<D3d11TextureDesc>>,
}

impl MockD3d11 {
    pub fn new(log: &EventLog) -> Self {
        Self {
            log: log.clone(),
            next: HandleCounter::new(),
            fail: AtomicBool::new(false),
            return_null: AtomicBool::new(false),
            descs: Mutex::new(Vec::new()),
        }
    }
}

impl D3d11Device for MockD3d11 {
    fn create_texture_2d(&self, desc: &D3d11TextureDesc) -> Result<NativeHandle> {
        if self.fail.load(Ordering::SeqCst) {
            return Err(Error::OutOfMemory);
        }
        self.descs.lock().unwrap().push(*desc);
        if self.return_null.load(Ordering::SeqCst) {
            return Ok(NativeHandle::NULL);
        }
        let texture = self.next.next();
        self.log.record(DeviceEvent::Create(ResourceKind::D3d11Texture, texture));
        Ok(NativeHandle::from_raw(texture))
    }

    fn release_texture(&self, texture: NativeHandle) {
        self.log.record(DeviceEvent::Destroy(ResourceKind::D3d11Texture, texture.as_raw()));
    }

    fn raw_device(&self) -> NativeHandle {
        NativeHandle::from_raw(0xD3D)
    }
}

// ============================================================================
// Metal
// ============================================================================

pub struct MockMetal {
    pub log: EventLog,
    next: HandleCounter,
    pub fail: AtomicBool,
    pub descs: Mutex<Vec<MetalTextureDesc>>,
}

impl MockMetal {
    pub fn new(log: &EventLog) -> Self {
        Self {
            log: log.clone(),
            next: HandleCounter::new(),
            fail: AtomicBool::new(false),
            descs: Mutex::new(Vec::new()),
        }
    }
}

impl MetalDevice for MockMetal {
    fn new_texture(&self, desc: &MetalTextureDesc) -> Result<NativeHandle> {
        if self.fail.load(Ordering::SeqCst) {
            return Err(Error::BackendError("newTextureWithDescriptor failed".to_string()));
        }
        self.descs.lock().unwrap().push(*desc);
        let texture = self.next.next();
        self.log.record(DeviceEvent::Create(ResourceKind::MetalTexture, texture));
        Ok(NativeHandle::from_raw(texture))
    }

    fn release_texture(&self, texture: NativeHandle) {
        self.log.record(DeviceEvent::Destroy(ResourceKind::MetalTexture, texture.as_raw()));
    }

    fn raw_device(&self) -> NativeHandle {
        NativeHandle::from_raw(0x3E7A1)
    }
}

// ============================================================================
// Vulkan
// ============================================================================

/// Creation step of the Vulkan assembly, for failure injection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VulkanStep {
    RenderPass,
    Image,
    Memory,
    Bind,
    View,
    Framebuffer,
}

/// Fields of a VkImageCreateInfo, copied out of the call
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImageRecord {
    pub image_type: vk::ImageType,
    pub format: vk::Format,
    pub width: u32,
    pub height: u32,
    pub depth: u32,
    pub mip_levels: u32,
    pub array_layers: u32,
    pub samples: vk::SampleCountFlags,
    pub tiling: vk::ImageTiling,
    pub usage: vk::ImageUsageFlags,
    pub sharing_mode: vk::SharingMode,
    pub initial_layout: vk::ImageLayout,
}

/// Attachments and subpasses of a VkRenderPassCreateInfo
#[derive(Debug, Clone)]
pub struct RenderPassRecord {
    pub attachments: Vec<vk::AttachmentDescription>,
    pub subpass_count: u32,
    pub color_attachment_count: u32,
    pub has_depth_stencil: bool,
    pub has_resolve: bool,
    pub dependency_count: u32,
    pub bind_point: Option<vk::PipelineBindPoint>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FramebufferRecord {
    pub framebuffer: vk::Framebuffer,
    pub render_pass: vk::RenderPass,
    pub attachments: Vec<vk::ImageView>,
    pub width: u32,
    pub height: u32,
    pub layers: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ViewRecord {
    pub image: vk::Image,
    pub format: vk::Format,
    /// r, g, b, a swizzles
    pub components: [vk::ComponentSwizzle; 4],
    pub level_count: u32,
    pub layer_count: u32,
}

pub struct MockVulkanDevice {
    pub log: EventLog,
    next: HandleCounter,
    device: vk::Device,
    pub memory_type_bits: u32,
    pub memory_properties: vk::PhysicalDeviceMemoryProperties,
    pub fail_step: Mutex<Option<VulkanStep>>,
    pub images: Mutex<Vec<ImageRecord>>,
    pub render_passes: Mutex<Vec<RenderPassRecord>>,
    pub framebuffers: Mutex<Vec<FramebufferRecord>>,
    pub views: Mutex<Vec<ViewRecord>>,
    /// (memory, memory type index) of every allocation
    pub allocations: Mutex<Vec<(vk::DeviceMemory, u32)>>,
    pub bindings: Mutex<Vec<(vk::Image, vk::DeviceMemory)>>,
}

impl MockVulkanDevice {
    /// Device 0xDE71CE with four host-visible memory types and mask 0b0110
    pub fn new(log: &EventLog) -> Self {
        Self::with_device(log, 0xDE71CE)
    }

    pub fn with_device(log: &EventLog, raw_device: u64) -> Self {
        Self {
            log: log.clone(),
            next: HandleCounter::new(),
            device: vk::Device::from_raw(raw_device),
            memory_type_bits: 0b0110,
            memory_properties: memory_properties(&[vk::MemoryPropertyFlags::HOST_VISIBLE; 4]),
            fail_step: Mutex::new(None),
            images: Mutex::new(Vec::new()),
            render_passes: Mutex::new(Vec::new()),
            framebuffers: Mutex::new(Vec::new()),
            views: Mutex::new(Vec::new()),
            allocations: Mutex::new(Vec::new()),
            bindings: Mutex::new(Vec::new()),
        }
    }

    pub fn fail_at(&self, step: Option<VulkanStep>) {
        *self.fail_step.lock().unwrap() = step;
    }

    fn fails(&self, step: VulkanStep) -> bool {
        *self.fail_step.lock().unwrap() == Some(step)
    }
}

/// Memory properties with one heap and the given type flags
pub fn memory_properties(types: &[vk::MemoryPropertyFlags]) -> vk::PhysicalDeviceMemoryProperties {
    let mut props = vk::PhysicalDeviceMemoryProperties {
        memory_type_count: types.len() as u32,
        memory_heap_count: 1,
        ..Default::default()
    };
    for (i, flags) in types.iter().enumerate() {
        props.memory_types[i] = vk::MemoryType {
            property_flags: *flags,
            heap_index: 0,
        };
    }
    props.memory_heaps[0] = vk::MemoryHeap {
        size: 256 * 1024 * 1024,
        flags: vk::MemoryHeapFlags::DEVICE_LOCAL,
    };
    props
}

/// Copy `count` elements out of a create-info array pointer
fn copy_array<T: Copy>(ptr: *const T, count: u32) -> Vec<T> {
    if ptr.is_null() || count == 0 {
        return Vec::new();
    }
    unsafe { std::slice::from_raw_parts(ptr, count as usize) }.to_vec()
}

impl VulkanDeviceFunctions for MockVulkanDevice {
    fn instance(&self) -> vk::Instance {
        vk::Instance::from_raw(0x1257)
    }

    fn physical_device(&self) -> vk::PhysicalDevice {
        vk::PhysicalDevice::from_raw(0x9D)
    }

    fn device(&self) -> vk::Device {
        self.device
    }

    fn physical_device_memory_properties(&self) -> vk::PhysicalDeviceMemoryProperties {
        self.memory_properties
    }

    fn create_render_pass(&self, info: &vk::RenderPassCreateInfo<'_>) -> VkResult<vk::RenderPass> {
        if self.fails(VulkanStep::RenderPass) {
            return Err(vk::Result::ERROR_INITIALIZATION_FAILED);
        }
        let subpasses = copy_array(info.p_subpasses, info.subpass_count);
        let first = subpasses.first();
        self.render_passes.lock().unwrap().push(RenderPassRecord {
            attachments: copy_array(info.p_attachments, info.attachment_count),
            subpass_count: info.subpass_count,
            color_attachment_count: first.map_or(0, |s| s.color_attachment_count),
            has_depth_stencil: first.is_some_and(|s| !s.p_depth_stencil_attachment.is_null()),
            has_resolve: first.is_some_and(|s| !s.p_resolve_attachments.is_null()),
            dependency_count: info.dependency_count,
            bind_point: first.map(|s| s.pipeline_bind_point),
        });
        let handle = self.next.next();
        self.log.record(DeviceEvent::Create(ResourceKind::VkRenderPass, handle));
        Ok(vk::RenderPass::from_raw(handle))
    }

    fn destroy_render_pass(&self, render_pass: vk::RenderPass) {
        self.log.record(DeviceEvent::Destroy(ResourceKind::VkRenderPass, render_pass.as_raw()));
    }

    fn create_image(&self, info: &vk::ImageCreateInfo<'_>) -> VkResult<vk::Image> {
        if self.fails(VulkanStep::Image) {
            return Err(vk::Result::ERROR_OUT_OF_DEVICE_MEMORY);
        }
        self.images.lock().unwrap().push(ImageRecord {
            image_type: info.image_type,
            format: info.format,
            width: info.extent.width,
            height: info.extent.height,
            depth: info.extent.depth,
            mip_levels: info.mip_levels,
            array_layers: info.array_layers,
            samples: info.samples,
            tiling: info.tiling,
            usage: info.usage,
            sharing_mode: info.sharing_mode,
            initial_layout: info.initial_layout,
        });
        let handle = self.next.next();
        self.log.record(DeviceEvent::Create(ResourceKind::VkImage, handle));
        Ok(vk::Image::from_raw(handle))
    }

    fn destroy_image(&self, image: vk::Image) {
        self.log.record(DeviceEvent::Destroy(ResourceKind::VkImage, image.as_raw()));
    }

    fn image_memory_requirements(&self, _image: vk::Image) -> vk::MemoryRequirements {
        vk::MemoryRequirements {
            size: 800 * 600 * 4,
            alignment: 256,
            memory_type_bits: self.memory_type_bits,
        }
    }

    fn allocate_memory(&self, info: &vk::MemoryAllocateInfo<'_>) -> VkResult<vk::DeviceMemory> {
        if self.fails(VulkanStep::Memory) {
            return Err(vk::Result::ERROR_OUT_OF_DEVICE_MEMORY);
        }
        let memory = vk::DeviceMemory::from_raw(self.next.next());
        self.allocations.lock().unwrap().push((memory, info.memory_type_index));
        self.log.record(DeviceEvent::Create(ResourceKind::VkMemory, memory.as_raw()));
        Ok(memory)
    }

    fn free_memory(&self, memory: vk::DeviceMemory) {
        self.log.record(DeviceEvent::Destroy(ResourceKind::VkMemory, memory.as_raw()));
    }

    fn bind_image_memory(&self, image: vk::Image, memory: vk::DeviceMemory, _offset: vk::DeviceSize) -> VkResult<()> {
        if self.fails(VulkanStep::Bind) {
            return Err(vk::Result::ERROR_INITIALIZATION_FAILED);
        }
        self.bindings.lock().unwrap().push((image, memory));
        Ok(())
    }

    fn create_image_view(&self, info: &vk::ImageViewCreateInfo<'_>) -> VkResult<vk::ImageView> {
        if self.fails(VulkanStep::View) {
            return Err(vk::Result::ERROR_INITIALIZATION_FAILED);
        }
        self.views.lock().unwrap().push(ViewRecord {
            image: info.image,
            format: info.format,
            components: [
                info.components.r,
                info.components.g,
                info.components.b,
                info.components.a,
            ],
            level_count: info.subresource_range.level_count,
            layer_count: info.subresource_range.layer_count,
        });
        let handle = self.next.next();
        self.log.record(DeviceEvent::Create(ResourceKind::VkImageView, handle));
        Ok(vk::ImageView::from_raw(handle))
    }

    fn destroy_image_view(&self, view: vk::ImageView) {
        self.log.record(DeviceEvent::Destroy(ResourceKind::VkImageView, view.as_raw()));
    }

    fn create_framebuffer(&self, info: &vk::FramebufferCreateInfo<'_>) -> VkResult<vk::Framebuffer> {
        if self.fails(VulkanStep::Framebuffer) {
            return Err(vk::Result::ERROR_OUT_OF_HOST_MEMORY);
        }
        let framebuffer = vk::Framebuffer::from_raw(self.next.next());
        self.framebuffers.lock().unwrap().push(FramebufferRecord {
            framebuffer,
            render_pass: info.render_pass,
            attachments: copy_array(info.p_attachments, info.attachment_count),
            width: info.width,
            height: info.height,
            layers: info.layers,
        });
        self.log.record(DeviceEvent::Create(ResourceKind::VkFramebuffer, framebuffer.as_raw()));
        Ok(framebuffer)
    }

    fn destroy_framebuffer(&self, framebuffer: vk::Framebuffer) {
        self.log.record(DeviceEvent::Destroy(ResourceKind::VkFramebuffer, framebuffer.as_raw()));
    }
}
