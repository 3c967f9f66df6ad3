use crate::assets::AssetId;
use crate::loaders::{ModelData, TextureData};
use crate::types::MeshData;

/// Geometry and textures handed over when an asset becomes ready
#[derive(Debug)]
pub enum AssetPayload<'a> {
    /// Generated mesh with a single texture (background sphere, image plane)
    Textured {
        mesh: MeshData,
        texture: &'a TextureData,
        /// Alpha-blended on top of everything else
        blend: bool,
    },
    Model(&'a ModelData),
}

/// Scene host abstraction - receives assets as they finish loading
pub trait SceneHost {
    /// Take ownership of the GPU side of a ready asset. Called once per asset.
    fn attach(&mut self, id: AssetId, payload: AssetPayload<'_>) -> anyhow::Result<()>;
}
