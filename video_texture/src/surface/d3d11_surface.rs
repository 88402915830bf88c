/// Direct3D11 surface: a default-usage RGBA8 2D texture bound as both
/// shader resource and render target

use bitflags::bitflags;
use crate::error::Result;
use crate::surface::{NativeHandle, SurfaceDescriptor, SurfaceSize};
use crate::{vtex_bail, vtex_err};

bitflags! {
    /// D3D11_BIND_FLAG subset used for video surfaces
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct D3d11BindFlags: u32 {
        const SHADER_RESOURCE = 0x8;
        const RENDER_TARGET = 0x20;
    }
}

/// D3D11_USAGE
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[repr(u32)]
pub enum D3d11Usage {
    #[default]
    Default = 0,
    Immutable = 1,
    Dynamic = 2,
    Staging = 3,
}

/// Mirror of D3D11_TEXTURE2D_DESC
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct D3d11TextureDesc {
    pub width: u32,
    pub height: u32,
    pub mip_levels: u32,
    pub array_size: u32,
    /// DXGI_FORMAT
    pub format: u32,
    pub sample_count: u32,
    pub sample_quality: u32,
    pub usage: D3d11Usage,
    pub bind_flags: D3d11BindFlags,
    pub cpu_access_flags: u32,
    pub misc_flags: u32,
}

impl D3d11TextureDesc {
    /// Single-mip, single-layer, non-multisampled render target for `desc`
    pub fn render_target(desc: &SurfaceDescriptor) -> Self {
        Self {
            width: desc.size.width,
            height: desc.size.height,
            mip_levels: 1,
            array_size: 1,
            format: desc.format.to_dxgi(),
            sample_count: 1,
            sample_quality: 0,
            usage: D3d11Usage::Default,
            bind_flags: D3d11BindFlags::SHADER_RESOURCE | D3d11BindFlags::RENDER_TARGET,
            cpu_access_flags: 0,
            misc_flags: 0,
        }
    }
}

/// The host's ID3D11Device
pub trait D3d11Device: Send + Sync {
    /// ID3D11Device::CreateTexture2D without initial data
    ///
    /// Returns an owned ID3D11Texture2D pointer.
    fn create_texture_2d(&self, desc: &D3d11TextureDesc) -> Result<NativeHandle>;

    /// Release a texture returned by `create_texture_2d`
    fn release_texture(&self, texture: NativeHandle);

    /// The ID3D11Device pointer itself
    fn raw_device(&self) -> NativeHandle;
}

/// Live Direct3D11 surface
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct D3d11Texture {
    /// ID3D11Texture2D pointer
    pub texture: NativeHandle,
    pub size: SurfaceSize,
}

pub fn create_d3d11_surface(device: &dyn D3d11Device, desc: &SurfaceDescriptor) -> Result<D3d11Texture> {
    let texture_desc = D3d11TextureDesc::render_target(desc);
    let texture = device.create_texture_2d(&texture_desc)
        .map_err(|e| vtex_err!("vtex::d3d11", "CreateTexture2D {}x{} failed: {}",
            desc.size.width, desc.size.height, e))?;
    if texture.is_null() {
        vtex_bail!("vtex::d3d11", "CreateTexture2D returned a null texture");
    }
    Ok(D3d11Texture { texture, size: desc.size })
}

pub fn release_d3d11_surface(device: &dyn D3d11Device, surface: D3d11Texture) {
    device.release_texture(surface.texture);
}

#[cfg(test)]
#[path = "d3d11_surface_tests.rs"]
mod tests;
