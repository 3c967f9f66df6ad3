pub mod error;
pub mod model;
pub mod sound;
pub mod texture;
pub mod worker;

pub use error::LoadError;
pub use model::{load_model, Material, ModelData, Node, Primitive};
pub use sound::{load_sound, SoundClip};
pub use texture::{load_texture, TextureData};
pub use worker::{spawn_load, spawn_shared_load, LoadResult, PendingLoad};
