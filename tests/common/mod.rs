#![allow(dead_code)]

use futures::channel::oneshot::{self, Sender};
use glam::Vec3;
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::path::PathBuf;
use std::sync::Arc;

use case_reveal::animation::{AnimationClip, Channel, ChannelValues, Interpolation};
use case_reveal::assets::{AssetId, AssetSet, LoadableAsset, PlaneAsset};
use case_reveal::geometry;
use case_reveal::interaction::{ClickEnv, ClickOutcome};
use case_reveal::loaders::{LoadResult, Material, ModelData, Node, Primitive, SoundClip, TextureData};
use case_reveal::math::Transform;
use case_reveal::scene::SceneContext;
use case_reveal::traits::{AssetPayload, Navigator, SceneHost, SoundPlayer};

pub const CAMERA: Vec3 = Vec3::new(0.0, 0.0, 70.0);

/// Scene host that records what it was given
#[derive(Default)]
pub struct RecordingHost {
    pub attached: Vec<AssetId>,
}

impl SceneHost for RecordingHost {
    fn attach(&mut self, id: AssetId, payload: AssetPayload<'_>) -> anyhow::Result<()> {
        if let AssetPayload::Textured { mesh, .. } = &payload {
            assert!(mesh.triangle_count() > 0, "{} attached without geometry", id);
        }
        self.attached.push(id);
        Ok(())
    }
}

impl RecordingHost {
    pub fn count(&self, id: AssetId) -> usize {
        self.attached.iter().filter(|&&a| a == id).count()
    }
}

#[derive(Default)]
pub struct RecordingSound {
    pub plays: usize,
}

impl SoundPlayer for RecordingSound {
    fn play(&mut self, _clip: &SoundClip) {
        self.plays += 1;
    }
}

#[derive(Default)]
pub struct RecordingNavigator {
    pub opened: Vec<String>,
}

impl Navigator for RecordingNavigator {
    fn open(&mut self, url: &str) {
        self.opened.push(url.to_string());
    }
}

/// Mocks and a seeded rng for driving clicks
pub struct Harness {
    pub sound: RecordingSound,
    pub navigator: RecordingNavigator,
    pub rng: StdRng,
    pub camera: Vec3,
}

impl Harness {
    pub fn new(seed: u64) -> Self {
        Self {
            sound: RecordingSound::default(),
            navigator: RecordingNavigator::default(),
            rng: StdRng::seed_from_u64(seed),
            camera: CAMERA,
        }
    }

    pub fn click(&mut self, scene: &mut SceneContext) -> ClickOutcome {
        let mut env = ClickEnv {
            camera_position: self.camera,
            rng: &mut self.rng,
            sound: &mut self.sound,
            navigator: &mut self.navigator,
        };
        scene.click(&mut env)
    }
}

/// Senders that complete the pending loads of [`pending_assets`]
pub struct Loaders {
    pub case: Sender<LoadResult<Arc<ModelData>>>,
    pub animated_case: Sender<LoadResult<Arc<ModelData>>>,
    pub planes: Vec<Sender<LoadResult<TextureData>>>,
    pub sound: Sender<LoadResult<SoundClip>>,
}

impl Loaders {
    /// Deliver every asset successfully
    pub fn deliver_all(self, clip_duration: f32) {
        let model = Arc::new(case_model(clip_duration));
        self.case.send(Ok(model.clone())).unwrap();
        self.animated_case.send(Ok(model)).unwrap();
        for plane in self.planes {
            plane.send(Ok(TextureData::solid([255, 0, 0, 128]))).unwrap();
        }
        self.sound.send(Ok(sound_clip())).unwrap();
    }
}

pub fn plane_url(i: usize) -> String {
    format!("https://example.com/plane/{}", i)
}

/// Asset set whose loads complete when the returned senders are used
pub fn pending_assets(planes: usize) -> (AssetSet, Loaders) {
    let (case_tx, case_rx) = oneshot::channel();
    let (animated_tx, animated_rx) = oneshot::channel();
    let (sound_tx, sound_rx) = oneshot::channel();

    let mut plane_txs = Vec::new();
    let mut plane_assets = Vec::new();
    for i in 0..planes {
        let (tx, rx) = oneshot::channel();
        plane_txs.push(tx);
        plane_assets.push(PlaneAsset {
            asset: LoadableAsset::loading(AssetId::Plane(i), Transform::IDENTITY, false, rx),
            url: plane_url(i),
            width: 18.0,
            height: 30.0,
        });
    }

    let assets = AssetSet {
        background: None,
        case: LoadableAsset::loading(AssetId::Case, Transform::IDENTITY, true, case_rx),
        animated_case: LoadableAsset::loading(AssetId::AnimatedCase, Transform::IDENTITY, false, animated_rx),
        animation: None,
        props: vec![],
        planes: plane_assets,
        sound: Some(LoadableAsset::loading(AssetId::Sound, Transform::IDENTITY, false, sound_rx)),
    };

    let loaders = Loaders {
        case: case_tx,
        animated_case: animated_tx,
        planes: plane_txs,
        sound: sound_tx,
    };

    (assets, loaders)
}

/// One-node model whose clip lifts the node over `duration` seconds
pub fn case_model(duration: f32) -> ModelData {
    let clip = AnimationClip::new(
        "open",
        vec![Channel {
            node: 0,
            interpolation: Interpolation::Linear,
            times: vec![0.0, duration],
            values: ChannelValues::Translation(vec![Vec3::ZERO, Vec3::new(0.0, 2.0, 0.0)]),
        }],
    );

    ModelData {
        nodes: vec![Node {
            name: Some("lid".to_string()),
            local: Transform::IDENTITY,
            mesh: Some(0),
            children: vec![],
        }],
        roots: vec![0],
        meshes: vec![vec![Primitive {
            mesh: geometry::plane(1.0, 1.0),
            material: Material::default(),
        }]],
        textures: vec![],
        clips: vec![Arc::new(clip)],
    }
}

pub fn sound_clip() -> SoundClip {
    SoundClip {
        path: PathBuf::from("glass.mp3"),
        bytes: 1024,
    }
}
