// updater.rs - Per-frame animation and billboard update
use glam::Vec3;

use crate::assets::AssetSet;
use crate::math::face_camera;

/// Runs once per redraw. Never looks at the interaction state.
#[derive(Debug, Clone, Copy)]
pub struct FrameUpdater {
    plane_distance: f32,
}

impl FrameUpdater {
    pub fn new(plane_distance: f32) -> Self {
        Self { plane_distance }
    }

    pub fn update(&self, assets: &mut AssetSet, delta: f32, camera_position: Vec3) {
        if let Some(animation) = assets.animation.as_mut() {
            animation.advance(delta);
            if animation.is_finished() && assets.animated_case.is_visible() {
                assets.animated_case.set_visible(false);
                log::debug!("Opening animation finished, hiding animated case");
            }
        }

        for plane in assets.planes.iter_mut().filter(|p| p.asset.is_visible()) {
            if let Some(transform) = plane.asset.transform_mut() {
                face_camera(transform, camera_position, self.plane_distance);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::animation::{AnimationClip, AnimationHandle, Channel, ChannelValues, Interpolation};
    use crate::assets::{AssetId, LoadableAsset};
    use crate::loaders::ModelData;
    use crate::math::Transform;
    use std::sync::Arc;

    fn assets_with_clip(duration: f32) -> AssetSet {
        let model = Arc::new(ModelData::default());
        let clip = AnimationClip::new(
            "open",
            vec![Channel {
                node: 0,
                interpolation: Interpolation::Linear,
                times: vec![0.0, duration],
                values: ChannelValues::Translation(vec![Vec3::ZERO, Vec3::Y]),
            }],
        );
        AssetSet {
            background: None,
            case: LoadableAsset::ready(AssetId::Case, Transform::IDENTITY, true, model.clone()),
            animated_case: LoadableAsset::ready(AssetId::AnimatedCase, Transform::IDENTITY, true, model),
            animation: Some(AnimationHandle::new(Arc::new(clip))),
            props: vec![],
            planes: vec![],
            sound: None,
        }
    }

    #[test]
    fn test_unstarted_clip_keeps_model_visible() {
        let mut assets = assets_with_clip(1.0);
        let updater = FrameUpdater::new(10.0);

        updater.update(&mut assets, 5.0, Vec3::new(0.0, 0.0, 70.0));
        assert!(assets.animated_case.is_visible());
        assert_eq!(assets.animation.as_ref().unwrap().time(), 0.0);
    }

    #[test]
    fn test_finished_clip_hides_model_without_rewind() {
        let mut assets = assets_with_clip(1.0);
        let updater = FrameUpdater::new(10.0);
        assets.animation.as_mut().unwrap().play_once();

        updater.update(&mut assets, 0.6, Vec3::Z);
        assert!(assets.animated_case.is_visible());

        updater.update(&mut assets, 0.6, Vec3::Z);
        assert!(!assets.animated_case.is_visible());
        assert_eq!(assets.animation.as_ref().unwrap().time(), 1.0);
    }
}
