pub mod animation;
pub mod assets;
pub mod camera;
pub mod cli;
pub mod config;
pub mod core;
pub mod effects;
pub mod geometry;
pub mod interaction;
pub mod loaders;
pub mod math;
pub mod render;
pub mod scene;
pub mod traits;
pub mod types;
pub mod updater;

pub use assets::{AssetId, AssetSet, LoadableAsset};
pub use config::{RevealPolicy, SceneConfig};
pub use interaction::{ClickEnv, ClickOutcome, InteractionMachine, InteractionState};
pub use scene::SceneContext;
