//! Asset set: every loadable scene object and its readiness.
//!
//! Each asset is loaded on its own worker and polled from the main thread.
//! Readiness only moves forward (loading → ready, or loading → failed), a
//! ready asset is handed to the scene host exactly once, and nothing may
//! move or show an asset before it is ready.

use futures::channel::oneshot::Canceled;
use glam::Vec3;
use std::fmt;
use std::f32::consts::PI;
use std::sync::Arc;

use crate::animation::AnimationHandle;
use crate::config::SceneConfig;
use crate::geometry;
use crate::loaders::{
    load_model, load_sound, load_texture, spawn_load, spawn_shared_load, LoadError, ModelData,
    PendingLoad, SoundClip, TextureData,
};
use crate::math::Transform;
use crate::scene::{DrawItem, DrawLayer};
use crate::traits::{AssetPayload, SceneHost};

/// Where a plane waits, hidden, until it is first revealed
const PLANE_REST_POSITION: [f32; 3] = [0.0, 5.0, 15.0];
const PLANE_REST_EULER: [f32; 3] = [PI, PI, PI];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AssetId {
    Background,
    Case,
    AnimatedCase,
    Prop(usize),
    Plane(usize),
    Sound,
}

impl fmt::Display for AssetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AssetId::Background => write!(f, "background"),
            AssetId::Case => write!(f, "case"),
            AssetId::AnimatedCase => write!(f, "animated case"),
            AssetId::Prop(i) => write!(f, "prop {}", i),
            AssetId::Plane(i) => write!(f, "plane {}", i),
            AssetId::Sound => write!(f, "sound"),
        }
    }
}

enum Readiness<T> {
    Loading(PendingLoad<T>),
    Ready(T),
    Failed,
}

/// A scene object that streams in asynchronously
pub struct LoadableAsset<T> {
    id: AssetId,
    transform: Transform,
    visible: bool,
    state: Readiness<T>,
}

impl<T> LoadableAsset<T> {
    /// Asset still being decoded; `visible` applies once it is ready
    pub fn loading(id: AssetId, transform: Transform, visible: bool, pending: PendingLoad<T>) -> Self {
        Self {
            id,
            transform,
            visible,
            state: Readiness::Loading(pending),
        }
    }

    /// Asset that is already available and never goes through the host
    pub fn ready(id: AssetId, transform: Transform, visible: bool, value: T) -> Self {
        Self {
            id,
            transform,
            visible,
            state: Readiness::Ready(value),
        }
    }

    pub fn id(&self) -> AssetId {
        self.id
    }

    /// Check the pending load. Returns the value only on the call where the
    /// asset becomes ready; later calls return `None`.
    pub fn poll(&mut self) -> Option<&T> {
        let received = match &mut self.state {
            Readiness::Loading(pending) => pending.try_recv(),
            _ => return None,
        };

        match received {
            Ok(None) => None,
            Ok(Some(Ok(value))) => {
                log::info!("{} ready", self.id);
                self.state = Readiness::Ready(value);
                self.get()
            }
            Ok(Some(Err(e))) => {
                self.fail(&e);
                None
            }
            Err(Canceled) => {
                self.fail(&LoadError::Abandoned(self.id.to_string()));
                None
            }
        }
    }

    fn fail(&mut self, error: &LoadError) {
        log::warn!("{} will not be shown: {}", self.id, error);
        self.state = Readiness::Failed;
    }

    pub fn is_ready(&self) -> bool {
        matches!(self.state, Readiness::Ready(_))
    }

    pub fn is_failed(&self) -> bool {
        matches!(self.state, Readiness::Failed)
    }

    pub fn get(&self) -> Option<&T> {
        match &self.state {
            Readiness::Ready(value) => Some(value),
            _ => None,
        }
    }

    /// Ready and flagged visible
    pub fn is_visible(&self) -> bool {
        self.is_ready() && self.visible
    }

    /// Refused (returns false) until the asset is ready
    pub fn set_visible(&mut self, visible: bool) -> bool {
        if !self.is_ready() {
            return false;
        }
        self.visible = visible;
        true
    }

    pub fn transform(&self) -> &Transform {
        &self.transform
    }

    /// `None` until the asset is ready
    pub fn transform_mut(&mut self) -> Option<&mut Transform> {
        if self.is_ready() {
            Some(&mut self.transform)
        } else {
            None
        }
    }
}

impl<T> fmt::Debug for LoadableAsset<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = match self.state {
            Readiness::Loading(_) => "loading",
            Readiness::Ready(_) => "ready",
            Readiness::Failed => "failed",
        };
        f.debug_struct("LoadableAsset")
            .field("id", &self.id)
            .field("state", &state)
            .field("visible", &self.visible)
            .field("transform", &self.transform)
            .finish()
    }
}

/// Background sphere and its geometry
#[derive(Debug)]
pub struct Backdrop {
    pub asset: LoadableAsset<TextureData>,
    pub radius: f32,
    pub segments: u32,
}

/// Image plane and the page it links to
#[derive(Debug)]
pub struct PlaneAsset {
    pub asset: LoadableAsset<TextureData>,
    pub url: String,
    pub width: f32,
    pub height: f32,
}

/// Every asset the scene uses
#[derive(Debug)]
pub struct AssetSet {
    pub background: Option<Backdrop>,
    pub case: LoadableAsset<Arc<ModelData>>,
    pub animated_case: LoadableAsset<Arc<ModelData>>,
    /// Created once the animated case has loaded, if it carries a clip
    pub animation: Option<AnimationHandle>,
    pub props: Vec<LoadableAsset<Arc<ModelData>>>,
    pub planes: Vec<PlaneAsset>,
    pub sound: Option<LoadableAsset<SoundClip>>,
}

impl AssetSet {
    /// Start loading everything the config names
    pub fn load(config: &SceneConfig) -> Self {
        let background = config.background.as_ref().map(|bg| {
            let path = config.resolve(&bg.image);
            Backdrop {
                asset: LoadableAsset::loading(
                    AssetId::Background,
                    Transform::from_translation(Vec3::from_array(bg.position)),
                    true,
                    spawn_load("background", move || load_texture(&path)),
                ),
                radius: bg.radius,
                segments: bg.segments,
            }
        });

        let case_path = config.resolve(&config.case.path);
        let animated_path = config.resolve(&config.animated_case.path);
        let (case_load, animated_load) = if case_path == animated_path {
            log::debug!("Case and animated case share {}, decoding once", case_path.display());
            let mut shared = spawn_shared_load("case", 2, move || load_model(&case_path).map(Arc::new));
            let animated = shared.pop();
            (shared.pop(), animated)
        } else {
            (
                Some(spawn_load("case", move || load_model(&case_path).map(Arc::new))),
                Some(spawn_load("animated case", move || load_model(&animated_path).map(Arc::new))),
            )
        };

        let case = model_asset(AssetId::Case, &config.case, true, case_load);
        let animated_case = model_asset(AssetId::AnimatedCase, &config.animated_case, false, animated_load);

        let props = config
            .props
            .iter()
            .enumerate()
            .map(|(i, prop)| {
                let path = config.resolve(&prop.path);
                let pending = spawn_load(&format!("prop {}", i), move || load_model(&path).map(Arc::new));
                model_asset(AssetId::Prop(i), prop, true, Some(pending))
            })
            .collect();

        let planes = config
            .planes
            .iter()
            .enumerate()
            .map(|(i, plane)| {
                let path = config.resolve(&plane.image);
                PlaneAsset {
                    asset: LoadableAsset::loading(
                        AssetId::Plane(i),
                        Transform::from_placement(PLANE_REST_POSITION, PLANE_REST_EULER, 1.0),
                        false,
                        spawn_load(&format!("plane {}", i), move || load_texture(&path)),
                    ),
                    url: plane.url.clone(),
                    width: plane.width,
                    height: plane.height,
                }
            })
            .collect();

        let sound = config.sound.as_ref().map(|sound| {
            let path = config.resolve(&sound.file);
            LoadableAsset::loading(
                AssetId::Sound,
                Transform::IDENTITY,
                false,
                spawn_load("sound", move || load_sound(&path)),
            )
        });

        Self {
            background,
            case,
            animated_case,
            animation: None,
            props,
            planes,
            sound,
        }
    }

    /// Poll every pending asset and hand newly ready ones to the host.
    ///
    /// After unmount, late arrivals still settle but are never attached.
    /// Returns the ids that became ready during this call.
    pub fn attach_ready(&mut self, host: &mut dyn SceneHost, mounted: bool) -> Vec<AssetId> {
        let mut arrived = Vec::new();

        if let Some(backdrop) = self.background.as_mut() {
            let id = backdrop.asset.id();
            if let Some(texture) = backdrop.asset.poll() {
                arrived.push(id);
                if mounted {
                    let mesh = geometry::inside_out_sphere(backdrop.radius, backdrop.segments);
                    attach(host, id, AssetPayload::Textured { mesh, texture, blend: false });
                }
            }
        }

        for asset in std::iter::once(&mut self.case).chain(self.props.iter_mut()) {
            let id = asset.id();
            if let Some(model) = asset.poll() {
                arrived.push(id);
                if mounted {
                    attach(host, id, AssetPayload::Model(model.as_ref()));
                }
            }
        }

        let id = self.animated_case.id();
        if let Some(model) = self.animated_case.poll() {
            arrived.push(id);
            self.animation = model.clips.first().cloned().map(AnimationHandle::new);
            if self.animation.is_none() {
                log::warn!("{} has no animation clip; the case cannot be opened", id);
            }
            if mounted {
                attach(host, id, AssetPayload::Model(model.as_ref()));
            }
        }

        for plane in &mut self.planes {
            let id = plane.asset.id();
            if let Some(texture) = plane.asset.poll() {
                arrived.push(id);
                if mounted {
                    let mesh = geometry::plane(plane.width, plane.height);
                    attach(host, id, AssetPayload::Textured { mesh, texture, blend: true });
                }
            }
        }

        if let Some(sound) = self.sound.as_mut() {
            if sound.poll().is_some() {
                arrived.push(AssetId::Sound);
            }
        }

        if !mounted && !arrived.is_empty() {
            log::debug!("Dropped {} asset(s) that arrived after unmount", arrived.len());
        }

        arrived
    }

    /// True while any asset is still loading
    pub fn is_loading(&self) -> bool {
        let pending = |ready: bool, failed: bool| !ready && !failed;

        self.background
            .iter()
            .map(|b| pending(b.asset.is_ready(), b.asset.is_failed()))
            .chain(
                std::iter::once(&self.case)
                    .chain(std::iter::once(&self.animated_case))
                    .chain(self.props.iter())
                    .map(|a| pending(a.is_ready(), a.is_failed())),
            )
            .chain(self.planes.iter().map(|p| pending(p.asset.is_ready(), p.asset.is_failed())))
            .chain(self.sound.iter().map(|s| pending(s.is_ready(), s.is_failed())))
            .any(|p| p)
    }

    /// Indices of planes that have loaded
    pub fn ready_planes(&self) -> Vec<usize> {
        self.planes
            .iter()
            .enumerate()
            .filter(|(_, p)| p.asset.is_ready())
            .map(|(i, _)| i)
            .collect()
    }

    /// Index of the visible plane, if any
    pub fn visible_plane(&self) -> Option<usize> {
        self.planes.iter().position(|p| p.asset.is_visible())
    }

    pub fn visible_plane_count(&self) -> usize {
        self.planes.iter().filter(|p| p.asset.is_visible()).count()
    }

    pub fn hide_planes(&mut self) {
        for plane in &mut self.planes {
            plane.asset.set_visible(false);
        }
    }

    /// What the host should draw this frame, back to front by layer
    pub fn draw_list(&self) -> Vec<DrawItem> {
        let mut items = Vec::new();

        if let Some(backdrop) = self.background.as_ref().filter(|b| b.asset.is_visible()) {
            items.push(DrawItem {
                id: AssetId::Background,
                layer: DrawLayer::Unlit,
                instances: vec![(0, backdrop.asset.transform().matrix())],
            });
        }

        for asset in std::iter::once(&self.case).chain(self.props.iter()) {
            if let Some(model) = asset.get().filter(|_| asset.is_visible()) {
                items.push(DrawItem {
                    id: asset.id(),
                    layer: DrawLayer::Lit,
                    instances: model.mesh_instances(asset.transform().matrix(), &model.rest_pose()),
                });
            }
        }

        if let Some(model) = self.animated_case.get().filter(|_| self.animated_case.is_visible()) {
            let rest = model.rest_pose();
            let pose = match &self.animation {
                Some(handle) => handle.pose(&rest),
                None => rest,
            };
            items.push(DrawItem {
                id: AssetId::AnimatedCase,
                layer: DrawLayer::Lit,
                instances: model.mesh_instances(self.animated_case.transform().matrix(), &pose),
            });
        }

        for plane in self.planes.iter().filter(|p| p.asset.is_visible()) {
            items.push(DrawItem {
                id: plane.asset.id(),
                layer: DrawLayer::Overlay,
                instances: vec![(0, plane.asset.transform().matrix())],
            });
        }

        items
    }
}

fn model_asset(
    id: AssetId,
    config: &crate::config::ModelConfig,
    visible: bool,
    pending: Option<PendingLoad<Arc<ModelData>>>,
) -> LoadableAsset<Arc<ModelData>> {
    let transform = Transform::from_placement(config.position, config.rotation, config.scale);
    let pending = pending.unwrap_or_else(|| {
        // sender dropped: resolves as abandoned on first poll
        futures::channel::oneshot::channel().1
    });
    LoadableAsset::loading(id, transform, visible, pending)
}

fn attach(host: &mut dyn SceneHost, id: AssetId, payload: AssetPayload<'_>) {
    match host.attach(id, payload) {
        Ok(()) => log::debug!("Attached {} to the scene", id),
        Err(e) => log::warn!("Could not attach {}: {:#}", id, e),
    }
}
