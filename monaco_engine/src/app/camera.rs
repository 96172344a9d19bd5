/// Camera - view and projection matrices for the scene

use glam::{Mat4, Vec3};
use crate::app::CameraConfig;

/// Look-at camera with a left-handed perspective projection (depth 0..1)
#[derive(Debug, Clone, PartialEq)]
pub struct Camera {
    config: CameraConfig,
    aspect_ratio: f32,
    view: Mat4,
    projection: Mat4,
}

impl Camera {
    pub fn new(config: &CameraConfig, aspect_ratio: f32) -> Self {
        let mut camera = Self {
            config: *config,
            aspect_ratio,
            view: Mat4::IDENTITY,
            projection: Mat4::IDENTITY,
        };
        camera.rebuild_view();
        camera.rebuild_projection();
        camera
    }

    fn rebuild_view(&mut self) {
        self.view = Mat4::look_at_lh(self.config.eye, self.config.target, self.config.up);
    }

    fn rebuild_projection(&mut self) {
        self.projection = Mat4::perspective_lh(
            self.config.fov_y,
            self.aspect_ratio,
            self.config.near,
            self.config.far,
        );
    }

    pub fn look_at(&mut self, eye: Vec3, target: Vec3, up: Vec3) {
        self.config.eye = eye;
        self.config.target = target;
        self.config.up = up;
        self.rebuild_view();
    }

    /// Update the projection after a resize; non-positive ratios are ignored
    pub fn set_aspect_ratio(&mut self, aspect_ratio: f32) {
        if aspect_ratio > 0.0 && aspect_ratio.is_finite() {
            self.aspect_ratio = aspect_ratio;
            self.rebuild_projection();
        }
    }

    pub fn aspect_ratio(&self) -> f32 {
        self.aspect_ratio
    }

    pub fn eye(&self) -> Vec3 {
        self.config.eye
    }

    pub fn view_matrix(&self) -> &Mat4 {
        &self.view
    }

    pub fn projection_matrix(&self) -> &Mat4 {
        &self.projection
    }

    pub fn view_projection_matrix(&self) -> Mat4 {
        self.projection * self.view
    }
}

#[cfg(test)]
#[path = "camera_tests.rs"]
mod tests;
