//! Click-driven state machine: open the case, reveal a plane, follow its link.

use glam::Vec3;
use rand::{Rng, RngCore};

use crate::assets::AssetSet;
use crate::config::RevealPolicy;
use crate::math::face_camera;
use crate::traits::{Navigator, SoundPlayer};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InteractionState {
    /// Case closed
    Idle,
    /// Case opened, next click reveals a plane
    AwaitingChoice,
    /// A plane is visible, next click opens its link
    PlaneShown,
    /// Link followed under [`RevealPolicy::Once`]; clicks do nothing
    Finished,
}

/// What a click did
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClickOutcome {
    Ignored,
    CaseOpened,
    PlaneRevealed(usize),
    LinkOpened { plane: usize, url: String },
}

/// Everything a click needs from outside the asset set
pub struct ClickEnv<'a> {
    pub camera_position: Vec3,
    pub rng: &'a mut dyn RngCore,
    pub sound: &'a mut dyn SoundPlayer,
    pub navigator: &'a mut dyn Navigator,
}

#[derive(Debug, Clone)]
pub struct InteractionMachine {
    state: InteractionState,
    case_opened: bool,
    policy: RevealPolicy,
    plane_distance: f32,
}

impl InteractionMachine {
    pub fn new(policy: RevealPolicy, plane_distance: f32) -> Self {
        Self {
            state: InteractionState::Idle,
            case_opened: false,
            policy,
            plane_distance,
        }
    }

    pub fn state(&self) -> InteractionState {
        self.state
    }

    /// Set once the opening animation has been started
    pub fn case_opened(&self) -> bool {
        self.case_opened
    }

    pub fn on_click(&mut self, assets: &mut AssetSet, env: &mut ClickEnv<'_>) -> ClickOutcome {
        let before = self.state;
        let outcome = match self.state {
            InteractionState::Idle => self.open_case(assets, env),
            InteractionState::AwaitingChoice => self.reveal_plane(assets, env),
            InteractionState::PlaneShown => self.follow_link(assets, env),
            InteractionState::Finished => ClickOutcome::Ignored,
        };

        if outcome == ClickOutcome::Ignored {
            log::debug!("Click ignored in {:?}", before);
        } else {
            log::info!("{:?} -> {:?}: {:?}", before, self.state, outcome);
        }
        outcome
    }

    fn open_case(&mut self, assets: &mut AssetSet, env: &mut ClickEnv<'_>) -> ClickOutcome {
        if self.case_opened || !assets.animated_case.is_ready() {
            return ClickOutcome::Ignored;
        }
        let Some(animation) = assets.animation.as_mut() else {
            return ClickOutcome::Ignored;
        };

        if !assets.case.set_visible(false) {
            log::debug!("Static case not loaded, nothing to hide");
        }
        assets.animated_case.set_visible(true);

        match assets.sound.as_ref().and_then(|s| s.get()) {
            Some(clip) => env.sound.play(clip),
            None => log::debug!("Sound not ready, opening silently"),
        }

        animation.play_once();
        self.case_opened = true;
        self.state = InteractionState::AwaitingChoice;
        ClickOutcome::CaseOpened
    }

    fn reveal_plane(&mut self, assets: &mut AssetSet, env: &mut ClickEnv<'_>) -> ClickOutcome {
        let candidates = assets.ready_planes();
        let chosen = match candidates.as_slice() {
            [] => return ClickOutcome::Ignored,
            [only] => *only,
            [first, second, ..] => {
                if env.rng.gen::<f64>() < 0.5 {
                    *first
                } else {
                    *second
                }
            }
        };

        assets.hide_planes();
        let asset = &mut assets.planes[chosen].asset;
        if let Some(transform) = asset.transform_mut() {
            if !face_camera(transform, env.camera_position, self.plane_distance) {
                log::debug!("Camera at origin, plane {} keeps its pose", chosen);
            }
        }
        asset.set_visible(true);

        self.state = InteractionState::PlaneShown;
        ClickOutcome::PlaneRevealed(chosen)
    }

    fn follow_link(&mut self, assets: &mut AssetSet, env: &mut ClickEnv<'_>) -> ClickOutcome {
        let Some(plane) = assets.visible_plane() else {
            log::warn!("No plane visible to follow, awaiting a new choice");
            self.state = InteractionState::AwaitingChoice;
            return ClickOutcome::Ignored;
        };

        let url = assets.planes[plane].url.clone();
        env.navigator.open(&url);
        assets.hide_planes();

        self.state = match self.policy {
            RevealPolicy::Repeat => InteractionState::AwaitingChoice,
            RevealPolicy::Once => InteractionState::Finished,
        };
        ClickOutcome::LinkOpened { plane, url }
    }
}
