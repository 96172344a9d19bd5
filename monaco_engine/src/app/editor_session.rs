/// EditorSession - editor UI state owned by the application

/// Selection, panel visibility and frame statistics
///
/// Passed explicitly to the overlay hooks each frame.
#[derive(Debug, Clone, PartialEq)]
pub struct EditorSession {
    /// Index into the scene's actor list
    pub selected_actor: Option<usize>,
    pub show_inspector: bool,
    pub show_outliner: bool,
    pub show_stats: bool,
    pub frame_count: u64,
    /// Frames per second averaged over the last full second
    pub fps: f32,
    fps_window_time: f32,
    fps_window_frames: u32,
}

impl Default for EditorSession {
    fn default() -> Self {
        Self {
            selected_actor: None,
            show_inspector: true,
            show_outliner: true,
            show_stats: true,
            frame_count: 0,
            fps: 0.0,
            fps_window_time: 0.0,
            fps_window_frames: 0,
        }
    }
}

impl EditorSession {
    pub fn new() -> Self {
        Self::default()
    }

    /// Count a frame of `delta_time` seconds
    pub fn record_frame(&mut self, delta_time: f32) {
        self.frame_count += 1;
        self.fps_window_frames += 1;
        self.fps_window_time += delta_time.max(0.0);
        if self.fps_window_time >= 1.0 {
            self.fps = self.fps_window_frames as f32 / self.fps_window_time;
            self.fps_window_time = 0.0;
            self.fps_window_frames = 0;
        }
    }

    /// Select actor `index` if it exists in a scene of `actor_count` actors
    pub fn select(&mut self, index: usize, actor_count: usize) -> bool {
        if index < actor_count {
            self.selected_actor = Some(index);
            true
        } else {
            false
        }
    }

    pub fn clear_selection(&mut self) {
        self.selected_actor = None;
    }

    /// Drop a selection that no longer points into the scene
    pub fn validate_selection(&mut self, actor_count: usize) {
        if self.selected_actor.is_some_and(|index| index >= actor_count) {
            self.selected_actor = None;
        }
    }
}

#[cfg(test)]
#[path = "editor_session_tests.rs"]
mod tests;
