/*!
# Monaco Engine

A small forward renderer built around a Direct3D 11 style object model.

The engine talks to the GPU through the `graphics_device` traits. Backends
(Vulkan today) implement those traits and are selected at runtime through the
plugin registry, so the rest of the engine never sees a native API.

## Architecture

- **graphics**: native backend traits (device, immediate context, swap chain)
- **render**: owning wrappers with `init` / `render` / `destroy`
- **resource**: OBJ and texture loading plus the keyed resource cache
- **scene**: actors made of mesh, transform and material components
- **app**: the application, camera and editor session
*/

// Internal modules
mod error;
mod engine;
pub mod log;
pub mod graphics_device;
pub mod render;
pub mod resource;
pub mod scene;
pub mod app;

// Main monaco namespace module
pub mod monaco {
    // Error types
    pub use crate::error::{Error, Result};

    // Logging hub
    pub use crate::engine::Engine;

    // Application entry point
    pub use crate::app::Application;

    // Logging sub-module (types only, macros live at the crate root)
    pub mod log {
        pub use crate::log::{Logger, LogEntry, LogSeverity, DefaultLogger};
    }

    // Native backend traits and plugin registry
    pub mod graphics {
        pub use crate::graphics_device::*;
    }

    pub mod render {
        pub use crate::render::*;
    }

    pub mod resource {
        pub use crate::resource::*;
    }

    pub mod scene {
        pub use crate::scene::*;
    }

    pub mod app {
        pub use crate::app::*;
    }
}

// Re-export math library at crate root
pub use glam;
