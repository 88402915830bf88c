/// Surface descriptor types: backend kind, pixel format, sizes, native handles

use std::ffi::c_void;
use ash::vk;
use crate::error::{Error, Result};

/// GPU backend a surface is allocated on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BackendKind {
    OpenGl,
    Direct3D11,
    Metal,
    Vulkan,
}

/// Pixel format of every video surface
///
/// The external renderer always writes 8-bit RGBA, so there is a single variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[allow(non_camel_case_types)]
pub enum PixelFormat {
    #[default]
    R8G8B8A8_UNORM,
}

impl PixelFormat {
    /// Vulkan format
    pub fn to_vk(self) -> vk::Format {
        match self {
            PixelFormat::R8G8B8A8_UNORM => vk::Format::R8G8B8A8_UNORM,
        }
    }

    /// DXGI_FORMAT value
    pub fn to_dxgi(self) -> u32 {
        match self {
            PixelFormat::R8G8B8A8_UNORM => 28, // DXGI_FORMAT_R8G8B8A8_UNORM
        }
    }

    /// MTLPixelFormat value
    pub fn to_metal(self) -> u64 {
        match self {
            PixelFormat::R8G8B8A8_UNORM => 70, // MTLPixelFormatRGBA8Unorm
        }
    }

    /// OpenGL sized internal format
    pub fn to_gl_internal(self) -> u32 {
        match self {
            PixelFormat::R8G8B8A8_UNORM => 0x8058, // GL_RGBA8
        }
    }
}

/// Item size in logical (device independent) units
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct LogicalSize {
    pub width: f64,
    pub height: f64,
}

impl LogicalSize {
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    /// True when either dimension is zero or negative
    pub fn is_empty(&self) -> bool {
        self.width <= 0.0 || self.height <= 0.0
    }
}

/// Surface size in physical pixels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct SurfaceSize {
    pub width: u32,
    pub height: u32,
}

impl SurfaceSize {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Physical size of a logical size on a display with the given pixel ratio
    ///
    /// Each dimension is rounded to the nearest pixel; negative or NaN
    /// results clamp to zero.
    pub fn from_logical(size: LogicalSize, device_pixel_ratio: f64) -> Self {
        let scale = |v: f64| {
            let scaled = (v * device_pixel_ratio).round();
            if scaled.is_nan() || scaled <= 0.0 {
                0
            } else if scaled >= u32::MAX as f64 {
                u32::MAX
            } else {
                scaled as u32
            }
        };
        Self {
            width: scale(size.width),
            height: scale(size.height),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }
}

/// Everything that determines a surface. Any change forces a full rebuild.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SurfaceDescriptor {
    pub size: SurfaceSize,
    pub format: PixelFormat,
    pub backend: BackendKind,
}

impl SurfaceDescriptor {
    /// Create a descriptor for a non-empty size
    ///
    /// # Errors
    ///
    /// `Error::InvalidResource` if either dimension is zero
    pub fn new(size: SurfaceSize, backend: BackendKind) -> Result<Self> {
        if size.is_empty() {
            return Err(Error::InvalidResource(format!(
                "surface size {}x{} has no area",
                size.width, size.height
            )));
        }
        Ok(Self {
            size,
            format: PixelFormat::R8G8B8A8_UNORM,
            backend,
        })
    }
}

/// Opaque, pointer-sized native object handle
///
/// Used for everything the host or a backend hands around without this crate
/// owning its type: D3D11/Metal object pointers, GL names, Vulkan dispatchable
/// handles, host command lists.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct NativeHandle(u64);

impl NativeHandle {
    pub const NULL: NativeHandle = NativeHandle(0);

    pub fn from_raw(raw: u64) -> Self {
        Self(raw)
    }

    pub fn from_ptr(ptr: *mut c_void) -> Self {
        Self(ptr as usize as u64)
    }

    pub fn as_raw(self) -> u64 {
        self.0
    }

    pub fn as_ptr(self) -> *mut c_void {
        self.0 as usize as *mut c_void
    }

    pub fn is_null(self) -> bool {
        self.0 == 0
    }
}
