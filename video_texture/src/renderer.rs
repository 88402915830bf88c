/// ExternalRenderer - the video engine's "render into this surface" contract

use crate::render_api::RenderApiBinding;

/// Playback state pushed to the external renderer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum PlaybackState {
    #[default]
    Stopped,
    Playing,
    Paused,
}

/// Callback the renderer invokes when a new frame is ready to be drawn
pub type FrameReadyCallback = Box<dyn Fn() + Send + Sync>;

/// External video engine drawing into the node's surface
///
/// `configure`, `set_target_size`, `scale` and `draw` are called on the
/// render thread; playback control comes from the logic thread. Implementations
/// synchronize internally.
pub trait ExternalRenderer: Send + Sync {
    /// Bind the renderer to a new surface
    ///
    /// The binding is only valid for the duration of the call; anything the
    /// renderer needs later must be copied out of it.
    fn configure(&self, binding: &RenderApiBinding);

    /// Size in pixels of the surface bound by the last `configure`
    fn set_target_size(&self, width: u32, height: u32);

    /// Scale applied to the output; `(1.0, -1.0)` flips vertically
    fn scale(&self, x: f32, y: f32);

    /// Draw the current frame into the bound surface
    fn draw(&self);

    /// Install (or clear) the frame-ready notification
    fn set_frame_ready_callback(&self, callback: Option<FrameReadyCallback>);

    /// Media URL or path to play
    fn set_media(&self, url: &str);

    fn set_state(&self, state: PlaybackState);
}
