/// Components attached to actors
///
/// A closed set of component kinds stored side by side on one actor and
/// looked up by type.

use std::sync::Arc;
use glam::Vec4;

use crate::resource::TextureAsset;
use crate::scene::{MeshComponent, Transform};

/// Surface appearance: textures (one per mesh) and a tint color
#[derive(Clone)]
pub struct Material {
    pub textures: Vec<Arc<TextureAsset>>,
    pub color: Vec4,
}

impl Default for Material {
    fn default() -> Self {
        Self {
            textures: Vec::new(),
            color: Vec4::ONE,
        }
    }
}

impl Material {
    /// Texture for mesh `index`, falling back to the first one
    pub fn texture_for_mesh(&self, index: usize) -> Option<&Arc<TextureAsset>> {
        self.textures.get(index).or_else(|| self.textures.first())
    }
}

impl std::fmt::Debug for Material {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Material")
            .field("textures", &self.textures.len())
            .field("color", &self.color)
            .finish()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ComponentType {
    Mesh,
    Transform,
    Material,
}

#[derive(Debug, Clone)]
pub enum Component {
    Mesh(MeshComponent),
    Transform(Transform),
    Material(Material),
}

impl Component {
    pub fn component_type(&self) -> ComponentType {
        match self {
            Component::Mesh(_) => ComponentType::Mesh,
            Component::Transform(_) => ComponentType::Transform,
            Component::Material(_) => ComponentType::Material,
        }
    }
}

/// Typed access into a `Component`
pub trait ComponentKind: Sized + Into<Component> {
    const TYPE: ComponentType;

    fn from_component(component: &Component) -> Option<&Self>;

    fn from_component_mut(component: &mut Component) -> Option<&mut Self>;
}

macro_rules! component_kind {
    ($ty:ty, $variant:ident) => {
        impl From<$ty> for Component {
            fn from(value: $ty) -> Self {
                Component::$variant(value)
            }
        }

        impl ComponentKind for $ty {
            const TYPE: ComponentType = ComponentType::$variant;

            fn from_component(component: &Component) -> Option<&Self> {
                match component {
                    Component::$variant(value) => Some(value),
                    _ => None,
                }
            }

            fn from_component_mut(component: &mut Component) -> Option<&mut Self> {
                match component {
                    Component::$variant(value) => Some(value),
                    _ => None,
                }
            }
        }
    };
}

component_kind!(MeshComponent, Mesh);
component_kind!(Transform, Transform);
component_kind!(Material, Material);
