/// Metal surface: a private-storage RGBA8 2D texture usable as shader input
/// and render target

use bitflags::bitflags;
use crate::error::Result;
use crate::surface::{NativeHandle, SurfaceDescriptor, SurfaceSize};
use crate::{vtex_bail, vtex_err};

bitflags! {
    /// MTLTextureUsage
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct MetalTextureUsage: u64 {
        const SHADER_READ = 0x1;
        const SHADER_WRITE = 0x2;
        const RENDER_TARGET = 0x4;
    }
}

/// MTLStorageMode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u64)]
pub enum MetalStorageMode {
    Shared = 0,
    Managed = 1,
    Private = 2,
}

/// Subset of MTLTextureDescriptor used for video surfaces (2D only)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MetalTextureDesc {
    pub width: u32,
    pub height: u32,
    pub mipmap_level_count: u32,
    /// MTLPixelFormat
    pub pixel_format: u64,
    pub storage_mode: MetalStorageMode,
    pub usage: MetalTextureUsage,
}

impl MetalTextureDesc {
    pub fn render_target(desc: &SurfaceDescriptor) -> Self {
        Self {
            width: desc.size.width,
            height: desc.size.height,
            mipmap_level_count: 1,
            pixel_format: desc.format.to_metal(),
            storage_mode: MetalStorageMode::Private,
            usage: MetalTextureUsage::SHADER_READ | MetalTextureUsage::RENDER_TARGET,
        }
    }
}

/// The host's MTLDevice
pub trait MetalDevice: Send + Sync {
    /// newTextureWithDescriptor: returns an owned id<MTLTexture>
    fn new_texture(&self, desc: &MetalTextureDesc) -> Result<NativeHandle>;

    /// Release a texture returned by `new_texture`
    fn release_texture(&self, texture: NativeHandle);

    /// The id<MTLDevice> itself
    fn raw_device(&self) -> NativeHandle;
}

/// Live Metal surface
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MetalTexture {
    /// id<MTLTexture>
    pub texture: NativeHandle,
    pub size: SurfaceSize,
}

pub fn create_metal_surface(device: &dyn MetalDevice, desc: &SurfaceDescriptor) -> Result<MetalTexture> {
    let texture = device.new_texture(&MetalTextureDesc::render_target(desc))
        .map_err(|e| vtex_err!("vtex::metal", "newTextureWithDescriptor {}x{} failed: {}",
            desc.size.width, desc.size.height, e))?;
    if texture.is_null() {
        vtex_bail!("vtex::metal", "newTextureWithDescriptor returned nil");
    }
    Ok(MetalTexture { texture, size: desc.size })
}

pub fn release_metal_surface(device: &dyn MetalDevice, surface: MetalTexture) {
    device.release_texture(surface.texture);
}

// ============================================================================
// Native implementation (metal crate, macOS only)
// ============================================================================

#[cfg(target_os = "macos")]
pub use native::NativeMetalDevice;

#[cfg(target_os = "macos")]
mod native {
    use super::{MetalDevice, MetalStorageMode, MetalTextureDesc, MetalTextureUsage};
    use crate::error::{Error, Result};
    use crate::surface::NativeHandle;
    use metal::foreign_types::{ForeignType, ForeignTypeRef};
    use metal::{
        Device, DeviceRef, MTLPixelFormat, MTLResourceOptions, MTLStorageMode, MTLTextureType,
        MTLTextureUsage, Texture, TextureDescriptor,
    };
    use rustc_hash::FxHashMap;
    use std::sync::Mutex;

    /// MetalDevice over the host's id<MTLDevice>
    ///
    /// Textures are kept alive here until `release_texture`.
    pub struct NativeMetalDevice {
        device: Device,
        textures: Mutex<FxHashMap<u64, Texture>>,
    }

    impl NativeMetalDevice {
        /// Retain the host's device
        ///
        /// # Safety
        ///
        /// `raw` must be a valid id<MTLDevice>.
        pub unsafe fn from_raw(raw: NativeHandle) -> Result<Self> {
            if raw.is_null() {
                return Err(Error::InitializationFailed("null MTLDevice".to_string()));
            }
            let device = DeviceRef::from_ptr(raw.as_ptr() as *mut metal::MTLDevice).to_owned();
            Ok(Self {
                device,
                textures: Mutex::new(FxHashMap::default()),
            })
        }
    }

    impl MetalDevice for NativeMetalDevice {
        fn new_texture(&self, desc: &MetalTextureDesc) -> Result<NativeHandle> {
            if desc.pixel_format != MTLPixelFormat::RGBA8Unorm as u64 {
                return Err(Error::InvalidResource(format!(
                    "unsupported MTLPixelFormat {}", desc.pixel_format
                )));
            }
            let descriptor = TextureDescriptor::new();
            descriptor.set_texture_type(MTLTextureType::D2);
            descriptor.set_pixel_format(MTLPixelFormat::RGBA8Unorm);
            descriptor.set_width(desc.width as u64);
            descriptor.set_height(desc.height as u64);
            descriptor.set_mipmap_level_count(desc.mipmap_level_count as u64);
            let (storage, options) = match desc.storage_mode {
                MetalStorageMode::Shared => (MTLStorageMode::Shared, MTLResourceOptions::StorageModeShared),
                MetalStorageMode::Managed => (MTLStorageMode::Managed, MTLResourceOptions::StorageModeManaged),
                MetalStorageMode::Private => (MTLStorageMode::Private, MTLResourceOptions::StorageModePrivate),
            };
            descriptor.set_resource_options(options);
            descriptor.set_storage_mode(storage);
            let mut usage = MTLTextureUsage::Unknown;
            if desc.usage.contains(MetalTextureUsage::SHADER_READ) {
                usage |= MTLTextureUsage::ShaderRead;
            }
            if desc.usage.contains(MetalTextureUsage::SHADER_WRITE) {
                usage |= MTLTextureUsage::ShaderWrite;
            }
            if desc.usage.contains(MetalTextureUsage::RENDER_TARGET) {
                usage |= MTLTextureUsage::RenderTarget;
            }
            descriptor.set_usage(usage);

            let texture = self.device.new_texture(&descriptor);
            let handle = NativeHandle::from_ptr(texture.as_ptr() as *mut std::ffi::c_void);
            self.textures
                .lock()
                .map_err(|_| Error::BackendError("Metal texture table lock poisoned".to_string()))?
                .insert(handle.as_raw(), texture);
            Ok(handle)
        }

        fn release_texture(&self, texture: NativeHandle) {
            if let Ok(mut textures) = self.textures.lock() {
                textures.remove(&texture.as_raw());
            }
        }

        fn raw_device(&self) -> NativeHandle {
            NativeHandle::from_ptr(self.device.as_ptr() as *mut std::ffi::c_void)
        }
    }
}

#[cfg(test)]
#[path = "metal_surface_tests.rs"]
mod tests;
