//! Resource module
//!
//! Asset decoding (textures, OBJ models) and the keyed resource cache.

mod resource;
mod resource_manager;
mod texture_data;
mod texture_asset;
mod model;
pub mod dds;
pub mod model_loader;

pub use resource::{Resource, ResourceState, ResourceType};
pub use resource_manager::ResourceManager;
pub use texture_data::{ExtensionType, TextureData};
pub use texture_asset::TextureAsset;
pub use model::{Model3D, ModelType};
pub use model_loader::{load_obj, parse_obj, parse_obj_into};
