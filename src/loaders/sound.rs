use std::path::{Path, PathBuf};

use super::error::LoadError;

/// A short audio clip on disk, verified readable and non-empty
#[derive(Debug, Clone, PartialEq)]
pub struct SoundClip {
    pub path: PathBuf,
    pub bytes: u64,
}

pub fn load_sound(path: &Path) -> Result<SoundClip, LoadError> {
    let meta = std::fs::metadata(path).map_err(|e| LoadError::io(path, e))?;
    if !meta.is_file() || meta.len() == 0 {
        return Err(LoadError::Io {
            path: path.to_path_buf(),
            message: "not a non-empty file".to_string(),
        });
    }

    Ok(SoundClip {
        path: path.to_path_buf(),
        bytes: meta.len(),
    })
}
