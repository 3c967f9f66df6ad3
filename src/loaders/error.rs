use std::path::{Path, PathBuf};
use thiserror::Error;

/// Why an asset never became ready.
///
/// Cloneable so a single decode can be fanned out to several asset slots.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum LoadError {
    #[error("failed to read {}: {message}", .path.display())]
    Io { path: PathBuf, message: String },

    #[error("failed to decode image {}: {message}", .path.display())]
    ImageDecode { path: PathBuf, message: String },

    #[error("failed to import glTF {}: {message}", .path.display())]
    Gltf { path: PathBuf, message: String },

    #[error("{} contains no renderable geometry", .path.display())]
    EmptyModel { path: PathBuf },

    #[error("loader for {0} stopped before delivering a result")]
    Abandoned(String),
}

impl LoadError {
    pub fn io(path: &Path, err: std::io::Error) -> Self {
        Self::Io {
            path: path.to_path_buf(),
            message: err.to_string(),
        }
    }
}
