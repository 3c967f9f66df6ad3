//! Scene context: owns the asset set, the interaction machine and the
//! per-frame updater for as long as the scene is mounted.

use glam::{Mat4, Vec3};

use crate::assets::{AssetId, AssetSet};
use crate::config::SceneConfig;
use crate::interaction::{ClickEnv, ClickOutcome, InteractionMachine, InteractionState};
use crate::traits::SceneHost;
use crate::updater::FrameUpdater;

/// Render pass an item belongs to, in draw order
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum DrawLayer {
    /// Background sphere
    Unlit,
    /// Models
    Lit,
    /// Image planes, alpha-blended last
    Overlay,
}

/// One asset to draw this frame
#[derive(Debug, Clone)]
pub struct DrawItem {
    pub id: AssetId,
    pub layer: DrawLayer,
    /// (mesh index, world matrix) pairs; generated meshes use index 0
    pub instances: Vec<(usize, Mat4)>,
}

pub struct SceneContext {
    config: SceneConfig,
    assets: AssetSet,
    machine: InteractionMachine,
    updater: FrameUpdater,
    mounted: bool,
}

impl SceneContext {
    /// Start loading with `loader` and take ownership of the scene state
    pub fn mount(config: SceneConfig, loader: impl FnOnce(&SceneConfig) -> AssetSet) -> Self {
        let assets = loader(&config);
        log::info!(
            "Scene mounted: {} plane(s), sound {}, reveal {:?}",
            assets.planes.len(),
            if assets.sound.is_some() { "on" } else { "off" },
            config.reveal
        );

        Self {
            machine: InteractionMachine::new(config.reveal, config.plane_distance),
            updater: FrameUpdater::new(config.plane_distance),
            config,
            assets,
            mounted: true,
        }
    }

    /// Stop reacting to clicks and attaching late assets. In-flight loads
    /// run to completion and are dropped.
    pub fn unmount(&mut self) {
        if self.mounted {
            log::info!("Scene unmounted");
        }
        self.mounted = false;
    }

    pub fn is_mounted(&self) -> bool {
        self.mounted
    }

    pub fn config(&self) -> &SceneConfig {
        &self.config
    }

    pub fn assets(&self) -> &AssetSet {
        &self.assets
    }

    pub fn state(&self) -> InteractionState {
        self.machine.state()
    }

    pub fn case_opened(&self) -> bool {
        self.machine.case_opened()
    }

    pub fn click(&mut self, env: &mut ClickEnv<'_>) -> ClickOutcome {
        if !self.mounted {
            log::debug!("Click after unmount ignored");
            return ClickOutcome::Ignored;
        }
        self.machine.on_click(&mut self.assets, env)
    }

    /// Attach whatever finished loading since the last call
    pub fn poll_assets(&mut self, host: &mut dyn SceneHost) -> Vec<AssetId> {
        self.assets.attach_ready(host, self.mounted)
    }

    /// One redraw tick. Returns whether the host should request another frame.
    pub fn frame(&mut self, host: &mut dyn SceneHost, delta: f32, camera_position: Vec3) -> bool {
        self.poll_assets(host);
        if !self.mounted {
            return false;
        }
        self.updater.update(&mut self.assets, delta, camera_position);
        true
    }

    pub fn draw_list(&self) -> Vec<DrawItem> {
        if !self.mounted {
            return Vec::new();
        }
        self.assets.draw_list()
    }
}
