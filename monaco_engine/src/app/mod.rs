//! Application module
//!
//! Configuration, camera, editor state and the `Application` that owns every
//! GPU object and drives the frame loop.

mod config;
mod camera;
mod editor_session;
mod ui_overlay;
mod frame_timer;
mod application;

pub use config::{ActorDesc, AppConfig, CameraConfig};
pub use camera::Camera;
pub use editor_session::EditorSession;
pub use ui_overlay::UiOverlay;
pub use frame_timer::FrameTimer;
pub use application::Application;
