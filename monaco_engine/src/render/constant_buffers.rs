/// CPU mirrors of the shader constant buffers
///
/// Layouts match the shader's cbuffer declarations (16-byte registers).
/// Matrices are stored transposed, ready for upload.

use bytemuck::{Pod, Zeroable};
use glam::{Mat4, Vec4};

/// Register b0: camera view, written once at init
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct CbNeverChanges {
    pub view: Mat4,
}

/// Register b1: projection, rewritten on resize
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct CbChangeOnResize {
    pub projection: Mat4,
}

/// Register b2: per-actor world matrix and tint
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct CbChangesEveryFrame {
    pub world: Mat4,
    pub mesh_color: Vec4,
}

pub const CB_NEVER_CHANGES_SLOT: u32 = 0;
pub const CB_CHANGE_ON_RESIZE_SLOT: u32 = 1;
pub const CB_CHANGES_EVERY_FRAME_SLOT: u32 = 2;

const _: () = assert!(std::mem::size_of::<CbNeverChanges>() % 16 == 0);
const _: () = assert!(std::mem::size_of::<CbChangeOnResize>() % 16 == 0);
const _: () = assert!(std::mem::size_of::<CbChangesEveryFrame>() % 16 == 0);

impl CbNeverChanges {
    pub fn new(view: Mat4) -> Self {
        Self { view: view.transpose() }
    }
}

impl CbChangeOnResize {
    pub fn new(projection: Mat4) -> Self {
        Self { projection: projection.transpose() }
    }
}

impl CbChangesEveryFrame {
    pub fn new(world: Mat4, mesh_color: Vec4) -> Self {
        Self {
            world: world.transpose(),
            mesh_color,
        }
    }
}
