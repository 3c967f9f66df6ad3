pub mod renderer;

pub use renderer::{Lighting, SceneRenderer};
