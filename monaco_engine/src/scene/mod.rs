//! Scene module
//!
//! Actors built from a closed set of components (mesh, transform, material)
//! and the scene that owns them.

mod mesh_component;
mod transform;
mod component;
mod actor;
mod scene;

pub use mesh_component::{MeshComponent, SimpleVertex};
pub use transform::Transform;
pub use component::{Component, ComponentKind, ComponentType, Material};
pub use actor::Actor;
pub use scene::Scene;
