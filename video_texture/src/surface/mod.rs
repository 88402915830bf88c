/// Surface module - native surface model and per-backend allocation

pub mod descriptor;
pub mod native_surface;
pub mod allocator;

// Per-backend allocation
pub mod gl_surface;
pub mod d3d11_surface;
pub mod metal_surface;

pub use descriptor::*;
pub use native_surface::*;
pub use allocator::*;

pub use gl_surface::*;
pub use d3d11_surface::*;
pub use metal_surface::*;
