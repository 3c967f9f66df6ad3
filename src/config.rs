//! Scene configuration
//!
//! Defaults reproduce the original scene: a background sphere, the case and
//! its animated twin sharing `bcase.gltf`, one decorative prop, two image
//! planes linked to external pages and a click sound. A JSON file can
//! override any part of it, and CLI flags override the file.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::cli::Cli;
use crate::math::DEFAULT_PLANE_DISTANCE;

/// At most this many image planes take part in the reveal
pub const MAX_PLANES: usize = 2;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config: {0}")]
    Parse(String),

    #[error("invalid config: {0}")]
    Invalid(String),
}

/// What happens after a revealed plane is dismissed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum RevealPolicy {
    /// Return to awaiting a choice; planes can be revealed again
    #[default]
    Repeat,
    /// Stop reacting to clicks after the first link is opened
    Once,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct WindowConfig {
    pub title: String,
    pub width: u32,
    pub height: u32,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            title: "Casa".to_string(),
            width: 1280,
            height: 800,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CameraConfig {
    pub fov_degrees: f32,
    pub near: f32,
    pub far: f32,
    pub position: [f32; 3],
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            fov_degrees: 45.0,
            near: 1.0,
            far: 1000.0,
            position: [0.0, 0.0, 70.0],
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct BackgroundConfig {
    pub image: PathBuf,
    pub radius: f32,
    pub segments: u32,
    pub position: [f32; 3],
}

impl Default for BackgroundConfig {
    fn default() -> Self {
        Self {
            image: PathBuf::from("background.jpg"),
            radius: 50.0,
            segments: 50,
            position: [0.0, 3.0, 0.0],
        }
    }
}

/// A glTF model and where it sits in the scene
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ModelConfig {
    pub path: PathBuf,
    pub position: [f32; 3],
    /// XYZ euler angles in radians
    pub rotation: [f32; 3],
    pub scale: f32,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("bcase.gltf"),
            position: [0.0, 0.0, 0.0],
            rotation: [0.0, 0.0, 0.0],
            scale: 10.0,
        }
    }
}

/// An image plane and the page it links to
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PlaneConfig {
    pub image: PathBuf,
    pub url: String,
    pub width: f32,
    pub height: f32,
}

impl Default for PlaneConfig {
    fn default() -> Self {
        Self {
            image: PathBuf::from("image1.png"),
            url: String::new(),
            width: 18.0,
            height: 30.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SoundConfig {
    pub file: PathBuf,
    /// Player command; the clip path is appended as the last argument
    pub player: Vec<String>,
}

impl Default for SoundConfig {
    fn default() -> Self {
        Self {
            file: PathBuf::from("glass.mp3"),
            player: default_audio_player(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SceneConfig {
    pub asset_root: PathBuf,
    pub window: WindowConfig,
    pub camera: CameraConfig,
    pub background: Option<BackgroundConfig>,
    pub case: ModelConfig,
    pub animated_case: ModelConfig,
    pub props: Vec<ModelConfig>,
    pub planes: Vec<PlaneConfig>,
    pub sound: Option<SoundConfig>,
    pub reveal: RevealPolicy,
    pub plane_distance: f32,
}

impl Default for SceneConfig {
    fn default() -> Self {
        Self {
            asset_root: PathBuf::from("assets"),
            window: WindowConfig::default(),
            camera: CameraConfig::default(),
            background: Some(BackgroundConfig::default()),
            case: ModelConfig::default(),
            animated_case: ModelConfig::default(),
            props: vec![ModelConfig {
                path: PathBuf::from("fin_re.glb"),
                position: [0.0, -4.0, -1.0],
                rotation: [0.0, 0.0, 0.0],
                scale: 8.0,
            }],
            planes: vec![
                PlaneConfig {
                    image: PathBuf::from("image1.png"),
                    url: "https://www.instagram.com/ar/3558694611051303".to_string(),
                    ..PlaneConfig::default()
                },
                PlaneConfig {
                    image: PathBuf::from("image2.png"),
                    url: "https://www.instagram.com/ar/699800535309791".to_string(),
                    ..PlaneConfig::default()
                },
            ],
            sound: Some(SoundConfig::default()),
            reveal: RevealPolicy::Repeat,
            plane_distance: DEFAULT_PLANE_DISTANCE,
        }
    }
}

impl SceneConfig {
    /// Load from a JSON file
    pub fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.display().to_string(),
            source: e,
        })?;

        Self::load_from_str(&content)
    }

    /// Load from a JSON string
    pub fn load_from_str(json: &str) -> Result<Self, ConfigError> {
        serde_json::from_str(json).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    /// Defaults, then the `--config` file, then CLI flags; validated
    pub fn from_cli(cli: &Cli) -> Result<Self, ConfigError> {
        let mut config = match &cli.config {
            Some(path) => Self::load_from_file(path)?,
            None => Self::default(),
        };
        config.apply_cli(cli);
        config.validate()?;
        Ok(config)
    }

    pub fn apply_cli(&mut self, cli: &Cli) {
        if let Some(root) = &cli.assets {
            self.asset_root = root.clone();
        }
        if cli.no_sound {
            self.sound = None;
        }
        if cli.no_background {
            self.background = None;
        }
        if let Some(count) = cli.planes {
            self.planes.truncate(count);
        }
        if let Some(reveal) = cli.reveal {
            self.reveal = reveal;
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.planes.len() > MAX_PLANES {
            return Err(ConfigError::Invalid(format!(
                "{} planes configured, at most {} are supported",
                self.planes.len(),
                MAX_PLANES
            )));
        }

        for (i, plane) in self.planes.iter().enumerate() {
            let url = url::Url::parse(&plane.url)
                .map_err(|e| ConfigError::Invalid(format!("plane {} url {:?}: {}", i, plane.url, e)))?;
            if !matches!(url.scheme(), "http" | "https") {
                return Err(ConfigError::Invalid(format!(
                    "plane {} url {:?} must be http or https",
                    i, plane.url
                )));
            }
            if plane.width <= 0.0 || plane.height <= 0.0 {
                return Err(ConfigError::Invalid(format!("plane {} has empty size", i)));
            }
        }

        if !(self.plane_distance > 0.0) {
            return Err(ConfigError::Invalid(format!(
                "plane_distance must be positive, got {}",
                self.plane_distance
            )));
        }

        let camera = &self.camera;
        if !(camera.near > 0.0 && camera.near < camera.far) {
            return Err(ConfigError::Invalid(format!(
                "camera near {} must be positive and below far {}",
                camera.near, camera.far
            )));
        }
        if !(camera.fov_degrees > 0.0 && camera.fov_degrees < 180.0) {
            return Err(ConfigError::Invalid(format!(
                "camera fov {} out of range",
                camera.fov_degrees
            )));
        }

        if let Some(sound) = &self.sound {
            if sound.player.is_empty() {
                return Err(ConfigError::Invalid("sound.player is empty".to_string()));
            }
        }

        Ok(())
    }

    /// Resolve an asset path against the asset root
    pub fn resolve(&self, path: &Path) -> PathBuf {
        self.asset_root.join(path)
    }
}

fn default_audio_player() -> Vec<String> {
    let cmd: &[&str] = if cfg!(target_os = "macos") {
        &["afplay"]
    } else {
        &["ffplay", "-nodisp", "-autoexit", "-loglevel", "quiet"]
    };
    cmd.iter().map(|s| s.to_string()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let config = SceneConfig::default();
        config.validate().unwrap();
        assert_eq!(config.planes.len(), 2);
        assert_eq!(config.case.path, config.animated_case.path);
        assert_eq!(config.plane_distance, 10.0);
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let config = SceneConfig::load_from_str(r#"{ "reveal": "once", "sound": null }"#).unwrap();
        assert_eq!(config.reveal, RevealPolicy::Once);
        assert!(config.sound.is_none());
        assert!(config.background.is_some());
        assert_eq!(config.camera.position, [0.0, 0.0, 70.0]);
    }

    #[test]
    fn test_unknown_field_is_rejected() {
        let err = SceneConfig::load_from_str(r#"{ "planez": [] }"#).unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn test_three_planes_rejected() {
        let mut config = SceneConfig::default();
        config.planes.push(config.planes[0].clone());
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn test_non_http_url_rejected() {
        let mut config = SceneConfig::default();
        config.planes[0].url = "file:///etc/passwd".to_string();
        assert!(config.validate().is_err());

        config.planes[0].url = "not a url".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_bad_distances_rejected() {
        let mut config = SceneConfig::default();
        config.plane_distance = 0.0;
        assert!(config.validate().is_err());

        let mut config = SceneConfig::default();
        config.camera.near = 1000.0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_resolve_joins_asset_root() {
        let config = SceneConfig::default();
        assert_eq!(
            config.resolve(Path::new("image1.png")),
            PathBuf::from("assets/image1.png")
        );
    }
}
