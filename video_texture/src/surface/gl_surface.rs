/// OpenGL surface: a framebuffer object with one RGBA8 color texture
///
/// The texture name is what the host samples; the framebuffer name is what
/// the external renderer draws into. GL's framebuffer origin is bottom-left,
/// so the renderer is asked to flip vertically (see `Config::flip_gl_y`).

use crate::error::Result;
use crate::surface::{SurfaceDescriptor, SurfaceSize};
use crate::vtex_bail;

/// GL_FRAMEBUFFER_COMPLETE
pub const GL_FRAMEBUFFER_COMPLETE: u32 = 0x8CD5;

/// OpenGL entry points needed to build a render-to-texture target
///
/// Calls are made on the render thread with the host's context current.
/// Implementations restore the previous texture/framebuffer bindings.
pub trait GlFunctions: Send + Sync {
    /// Create a 2D texture with one mip level. Returns 0 on failure.
    fn create_texture(&self, size: SurfaceSize, internal_format: u32) -> u32;

    /// Create an empty framebuffer object. Returns 0 on failure.
    fn gen_framebuffer(&self) -> u32;

    /// Attach `texture` as color attachment 0 of `framebuffer`
    fn attach_color_texture(&self, framebuffer: u32, texture: u32);

    /// glCheckFramebufferStatus for `framebuffer`
    fn framebuffer_status(&self, framebuffer: u32) -> u32;

    fn delete_framebuffer(&self, framebuffer: u32);

    fn delete_texture(&self, texture: u32);
}

/// Live OpenGL surface
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GlFramebuffer {
    /// Framebuffer object the external renderer binds
    pub framebuffer: u32,
    /// Color attachment texture the host samples
    pub texture: u32,
    pub size: SurfaceSize,
}

/// Build a framebuffer object sized to `desc`
///
/// An incomplete framebuffer is deleted together with its texture.
pub fn create_gl_surface(gl: &dyn GlFunctions, desc: &SurfaceDescriptor) -> Result<GlFramebuffer> {
    let texture = gl.create_texture(desc.size, desc.format.to_gl_internal());
    if texture == 0 {
        vtex_bail!("vtex::gl", "Failed to create {}x{} color texture",
            desc.size.width, desc.size.height);
    }

    let framebuffer = gl.gen_framebuffer();
    if framebuffer == 0 {
        gl.delete_texture(texture);
        vtex_bail!("vtex::gl", "Failed to create framebuffer object");
    }

    gl.attach_color_texture(framebuffer, texture);

    let status = gl.framebuffer_status(framebuffer);
    if status != GL_FRAMEBUFFER_COMPLETE {
        gl.delete_framebuffer(framebuffer);
        gl.delete_texture(texture);
        vtex_bail!("vtex::gl", "Framebuffer incomplete: status 0x{:04X}", status);
    }

    Ok(GlFramebuffer {
        framebuffer,
        texture,
        size: desc.size,
    })
}

/// Delete the framebuffer object, then its color texture
pub fn release_gl_surface(gl: &dyn GlFunctions, surface: GlFramebuffer) {
    gl.delete_framebuffer(surface.framebuffer);
    gl.delete_texture(surface.texture);
}

// ============================================================================
// Native implementation (gl crate)
// ============================================================================

#[cfg(feature = "opengl")]
pub use native::GlLoader;

#[cfg(feature = "opengl")]
mod native {
    use super::GlFunctions;
    use crate::surface::SurfaceSize;
    use std::ffi::c_void;

    /// GlFunctions backed by the `gl` crate's global function table
    ///
    /// The function pointers are process-global; load them once from the
    /// host's current context before the first sync.
    pub struct GlLoader {
        _private: (),
    }

    impl GlLoader {
        /// Load GL entry points through the host's `getProcAddress`
        pub fn load_with<F>(loader: F) -> Self
        where
            F: FnMut(&'static str) -> *const c_void,
        {
            gl::load_with(loader);
            Self { _private: () }
        }
    }

    impl GlFunctions for GlLoader {
        fn create_texture(&self, size: SurfaceSize, internal_format: u32) -> u32 {
            unsafe {
                let mut previous = 0;
                gl::GetIntegerv(gl::TEXTURE_BINDING_2D, &mut previous);

                let mut texture = 0;
                gl::GenTextures(1, &mut texture);
                if texture == 0 {
                    return 0;
                }
                gl::BindTexture(gl::TEXTURE_2D, texture);
                gl::TexImage2D(
                    gl::TEXTURE_2D,
                    0,
                    internal_format as i32,
                    size.width as i32,
                    size.height as i32,
                    0,
                    gl::RGBA,
                    gl::UNSIGNED_BYTE,
                    std::ptr::null(),
                );
                gl::TexParameteri(gl::TEXTURE_2D, gl::TEXTURE_MIN_FILTER, gl::LINEAR as i32);
                gl::TexParameteri(gl::TEXTURE_2D, gl::TEXTURE_MAG_FILTER, gl::LINEAR as i32);
                gl::TexParameteri(gl::TEXTURE_2D, gl::TEXTURE_WRAP_S, gl::CLAMP_TO_EDGE as i32);
                gl::TexParameteri(gl::TEXTURE_2D, gl::TEXTURE_WRAP_T, gl::CLAMP_TO_EDGE as i32);
                gl::BindTexture(gl::TEXTURE_2D, previous as u32);

                if gl::GetError() != gl::NO_ERROR {
                    gl::DeleteTextures(1, &texture);
                    return 0;
                }
                texture
            }
        }

        fn gen_framebuffer(&self) -> u32 {
            let mut framebuffer = 0;
            unsafe {
                gl::GenFramebuffers(1, &mut framebuffer);
            }
            framebuffer
        }

        fn attach_color_texture(&self, framebuffer: u32, texture: u32) {
            unsafe {
                let mut previous = 0;
                gl::GetIntegerv(gl::FRAMEBUFFER_BINDING, &mut previous);
                gl::BindFramebuffer(gl::FRAMEBUFFER, framebuffer);
                gl::FramebufferTexture2D(
                    gl::FRAMEBUFFER,
                    gl::COLOR_ATTACHMENT0,
                    gl::TEXTURE_2D,
                    texture,
                    0,
                );
                gl::BindFramebuffer(gl::FRAMEBUFFER, previous as u32);
            }
        }

        fn framebuffer_status(&self, framebuffer: u32) -> u32 {
            unsafe {
                let mut previous = 0;
                gl::GetIntegerv(gl::FRAMEBUFFER_BINDING, &mut previous);
                gl::BindFramebuffer(gl::FRAMEBUFFER, framebuffer);
                let status = gl::CheckFramebufferStatus(gl::FRAMEBUFFER);
                gl::BindFramebuffer(gl::FRAMEBUFFER, previous as u32);
                status
            }
        }

        fn delete_framebuffer(&self, framebuffer: u32) {
            unsafe {
                gl::DeleteFramebuffers(1, &framebuffer);
            }
        }

        fn delete_texture(&self, texture: u32) {
            unsafe {
                gl::DeleteTextures(1, &texture);
            }
        }
    }
}

#[cfg(test)]
#[path = "gl_surface_tests.rs"]
mod tests;
