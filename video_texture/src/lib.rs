/*!
# Video Texture

Presents frames from an external video renderer as a texture inside a host
scene graph, on OpenGL, Direct3D11, Metal or Vulkan.

The external renderer draws straight into a backend-native offscreen surface
that the host samples, so no frame is ever copied.

## Architecture

- **VideoTextureItem**: logic-thread object owning the external renderer and producing nodes
- **VideoTextureNode**: render-thread node running the sync/render cycle
- **SurfaceAllocator**: per-backend creation and release of the native surface
- **VulkanRenderTarget**: render pass plus per-size image set on a Vulkan device
- **RenderApiBinding**: what the external renderer is configured with
- **HostWindow / HostItem**: the host's side of the contract

GPU calls go through small device traits (`GlFunctions`, `D3d11Device`,
`MetalDevice`, `VulkanDeviceFunctions`). The `video_texture_vulkan` crate
implements the Vulkan one over ash.
*/

// Internal modules
mod error;
mod bridge;
mod config;
pub mod log;
pub mod surface;
pub mod vulkan;
pub mod host;
pub mod renderer;
pub mod render_api;
pub mod node;
pub mod item;

#[cfg(test)]
pub(crate) mod mock;

// Main vtex namespace module
pub mod vtex {
    // Error types
    pub use crate::error::{Error, Result};

    // Logger singleton
    pub use crate::bridge::Bridge;

    pub use crate::config::{Config, MemoryTypePolicy, TextureFiltering};

    pub use crate::item::VideoTextureItem;
    pub use crate::node::{
        NodeRect, NodeState, SyncOutcome, TextureCoordinatesTransform, VideoTextureNode,
    };
    pub use crate::renderer::{ExternalRenderer, FrameReadyCallback, PlaybackState};

    // Logging sub-module (types only, macros live at the crate root)
    pub mod log {
        pub use crate::log::{format_plain, DefaultLogger, LogEntry, LogSeverity, Logger};
    }

    pub mod host {
        pub use crate::host::*;
    }

    pub mod surface {
        pub use crate::surface::*;
    }

    pub mod vulkan {
        pub use crate::vulkan::*;
    }

    pub mod render_api {
        pub use crate::render_api::*;
    }
}
