/// UiOverlay - hook points for an immediate-mode editor overlay

use crate::error::Result;
use crate::render::DeviceContext;
use crate::app::EditorSession;
use crate::scene::Scene;

/// Overlay drawn on top of the scene, just before present
///
/// The application calls `compose` then `submit` once per frame, after the
/// actors have been drawn, and `shutdown` first during teardown.
pub trait UiOverlay {
    /// Build the overlay for this frame; may edit the session and the scene
    fn compose(&mut self, session: &mut EditorSession, scene: &mut Scene);

    /// Record the overlay's draw commands
    fn submit(&mut self, device_context: &mut DeviceContext) -> Result<()>;

    /// Release overlay resources
    fn shutdown(&mut self);
}
