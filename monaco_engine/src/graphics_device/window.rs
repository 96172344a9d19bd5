/// Window collaborator seen by the engine

use raw_window_handle::{HasDisplayHandle, HasWindowHandle};

/// A window the engine can present into
///
/// The engine only consumes three facts about a window: its client size and
/// its native window and display handles. Message dispatch stays with the
/// window owner.
pub trait Window: HasWindowHandle + HasDisplayHandle {
    /// Client area size in physical pixels
    fn client_size(&self) -> (u32, u32);
}

impl Window for winit::window::Window {
    fn client_size(&self) -> (u32, u32) {
        let size = self.inner_size();
        (size.width, size.height)
    }
}
