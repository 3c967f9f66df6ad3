pub mod effects;
pub mod scene;

pub use effects::*;
pub use scene::*;
