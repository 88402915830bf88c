/// Configuration shared by the item and the nodes it creates

/// Texture sampling filter applied to the node's host texture
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TextureFiltering {
    Nearest,
    #[default]
    Linear,
}

/// How the Vulkan image memory type is chosen from the requirements mask
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MemoryTypePolicy {
    /// Lowest memory type index allowed by the requirements mask,
    /// regardless of its property flags
    #[default]
    FirstMatching,
    /// Lowest allowed index that is DEVICE_LOCAL, falling back to
    /// `FirstMatching` when none is
    PreferDeviceLocal,
}

/// Video texture configuration
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Config {
    /// Filtering used when the host samples the video texture
    pub filtering: TextureFiltering,
    /// Vulkan memory type selection
    pub memory_type_policy: MemoryTypePolicy,
    /// Ask the external renderer for a vertical flip on OpenGL, whose
    /// framebuffer origin is bottom-left
    pub flip_gl_y: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            filtering: TextureFiltering::Linear,
            memory_type_policy: MemoryTypePolicy::FirstMatching,
            flip_gl_y: true,
        }
    }
}
