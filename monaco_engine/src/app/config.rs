/// Application, camera and actor configuration

use std::f32::consts::FRAC_PI_4;
use glam::{Vec3, Vec4};

use crate::graphics_device::GraphicsConfig;
use crate::resource::{ExtensionType, ModelType};
use crate::scene::Transform;

/// Fixed look-at camera with a left-handed perspective projection
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CameraConfig {
    pub eye: Vec3,
    pub target: Vec3,
    pub up: Vec3,
    /// Vertical field of view in radians
    pub fov_y: f32,
    pub near: f32,
    pub far: f32,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            eye: Vec3::new(0.0, 3.0, -6.0),
            target: Vec3::new(0.0, 1.0, 0.0),
            up: Vec3::Y,
            fov_y: FRAC_PI_4,
            near: 0.01,
            far: 100.0,
        }
    }
}

/// One actor to build at startup
#[derive(Debug, Clone, PartialEq)]
pub struct ActorDesc {
    pub name: String,
    pub model_file: String,
    pub model_type: ModelType,
    /// Texture names (file = name + extension suffix), one per mesh
    pub textures: Vec<(String, ExtensionType)>,
    pub flip_uv: bool,
    pub transform: Transform,
}

impl ActorDesc {
    /// The gun shown by the default scene
    pub fn cyber_gun() -> Self {
        Self {
            name: "CyberGun".to_string(),
            model_file: "CyberGun.obj".to_string(),
            model_type: ModelType::Obj,
            textures: vec![("crucible_baseColor".to_string(), ExtensionType::Png)],
            flip_uv: true,
            transform: Transform::new(
                Vec3::new(2.0, -4.9, 11.6),
                Vec3::new(-0.6, 3.0, -0.2),
                Vec3::ONE,
            ),
        }
    }
}

/// Top-level application configuration
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub graphics: GraphicsConfig,
    pub camera: CameraConfig,
    pub clear_color: [f32; 4],
    /// Combined shader file holding the VS and PS entry points
    pub shader_file: String,
    /// Tint applied to every actor
    pub mesh_color: Vec4,
    pub actors: Vec<ActorDesc>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            graphics: GraphicsConfig::default(),
            camera: CameraConfig::default(),
            clear_color: [0.1, 0.1, 0.1, 1.0],
            shader_file: "MonacoEngine2.spv".to_string(),
            mesh_color: Vec4::ONE,
            actors: vec![ActorDesc::cyber_gun()],
        }
    }
}
