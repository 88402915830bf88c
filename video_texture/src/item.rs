/// VideoTextureItem - logic-thread owner of the external renderer
///
/// The host calls `update_paint_node` from its paint cycle and keeps the
/// returned node in its scene graph. The item holds the only strong reference
/// to the renderer; nodes hold weak ones.

use std::sync::Arc;
use crate::config::Config;
use crate::host::HostItem;
use crate::node::{NodeRect, TextureCoordinatesTransform, VideoTextureNode};
use crate::renderer::{ExternalRenderer, PlaybackState};
use crate::surface::LogicalSize;
use crate::{vtex_debug, vtex_warn};

pub struct VideoTextureItem {
    host: Arc<dyn HostItem>,
    renderer: Arc<dyn ExternalRenderer>,
    config: Config,
    source: String,
}

impl VideoTextureItem {
    /// Wrap `host` and take ownership of `renderer`
    ///
    /// Installs a frame-ready callback that schedules a repaint of the host
    /// item. The callback only holds a weak reference to the item.
    pub fn new(host: Arc<dyn HostItem>, renderer: Arc<dyn ExternalRenderer>, config: Config) -> Self {
        let weak_host = Arc::downgrade(&host);
        renderer.set_frame_ready_callback(Some(Box::new(move || {
            if let Some(host) = weak_host.upgrade() {
                host.update();
            }
        })));
        Self {
            host,
            renderer,
            config,
            source: String::new(),
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn renderer(&self) -> &Arc<dyn ExternalRenderer> {
        &self.renderer
    }

    /// Paint-node hook, called on the render thread with the logic thread blocked
    ///
    /// Returns `None` (and touches no backend) for a zero-area item that has
    /// no node yet. Otherwise syncs the node, refreshes its presentation state
    /// and schedules a frame so the before-rendering signal fires.
    pub fn update_paint_node(&self, node: Option<VideoTextureNode>) -> Option<VideoTextureNode> {
        let size = self.host.size();
        if node.is_none() && size.is_empty() {
            return None;
        }

        let mut node = match node {
            Some(node) => node,
            None => {
                let Some(window) = self.host.window() else {
                    vtex_warn!("vtex::item", "Item is not in a window, no node created");
                    return None;
                };
                vtex_debug!("vtex::item", "Creating video texture node");
                VideoTextureNode::new(self.host.clone(), window, &self.renderer, self.config)
            }
        };

        // The node retries on its next sync
        if let Err(e) = node.sync() {
            vtex_debug!("vtex::item", "Node sync failed: {}", e);
        }

        node.set_texture_coordinates_transform(TextureCoordinatesTransform::NoTransform);
        node.set_filtering(self.config.filtering);
        node.set_rect(NodeRect::new(0.0, 0.0, size.width, size.height));

        node.window().request_update();
        Some(node)
    }

    /// Geometry hook; repaints only when the size changed
    pub fn geometry_changed(&self, new_geometry: LogicalSize, old_geometry: LogicalSize) {
        if new_geometry != old_geometry {
            self.host.update();
        }
    }

    pub fn set_source(&mut self, url: &str) {
        self.renderer.set_media(url);
        self.source = url.to_string();
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn play(&self) {
        self.renderer.set_state(PlaybackState::Playing);
    }

    pub fn pause(&self) {
        self.renderer.set_state(PlaybackState::Paused);
    }

    pub fn stop(&self) {
        self.renderer.set_state(PlaybackState::Stopped);
    }

    /// The scene graph was invalidated (render thread)
    pub fn invalidate_scene_graph(&self, mut node: VideoTextureNode) {
        node.destroy();
    }

    /// The item was removed from its scene
    pub fn release_resources(&self, mut node: VideoTextureNode) {
        node.destroy();
    }
}

impl Drop for VideoTextureItem {
    fn drop(&mut self) {
        self.renderer.set_frame_ready_callback(None);
    }
}

#[cfg(test)]
#[path = "item_tests.rs"]
mod tests;
