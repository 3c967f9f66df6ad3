mod common;

use common::{pending_assets, Harness, RecordingHost, CAMERA};
use case_reveal::config::SceneConfig;
use case_reveal::interaction::ClickOutcome;
use case_reveal::scene::SceneContext;
use glam::Vec3;

fn scene_with_plane_shown(harness: &mut Harness) -> (SceneContext, usize) {
    let (assets, loaders) = pending_assets(2);
    let mut scene = SceneContext::mount(SceneConfig::default(), |_| assets);
    loaders.deliver_all(1.0);
    scene.poll_assets(&mut RecordingHost::default());

    harness.click(&mut scene);
    let ClickOutcome::PlaneRevealed(index) = harness.click(&mut scene) else {
        panic!("expected a plane to be revealed");
    };
    (scene, index)
}

#[test]
fn test_update_is_idempotent_for_fixed_camera() {
    let mut harness = Harness::new(7);
    let (mut scene, index) = scene_with_plane_shown(&mut harness);
    let mut host = RecordingHost::default();

    scene.frame(&mut host, 0.0, CAMERA);
    let first = *scene.assets().planes[index].asset.transform();
    for _ in 0..5 {
        scene.frame(&mut host, 0.0, CAMERA);
    }
    let after = *scene.assets().planes[index].asset.transform();

    assert!(first.translation.abs_diff_eq(after.translation, 1e-6));
    assert!(first.rotation.abs_diff_eq(after.rotation, 1e-6));
}

#[test]
fn test_visible_plane_follows_camera() {
    let mut harness = Harness::new(7);
    let (mut scene, index) = scene_with_plane_shown(&mut harness);

    let moved = Vec3::new(-50.0, 10.0, 30.0);
    scene.frame(&mut RecordingHost::default(), 0.016, moved);

    let transform = scene.assets().planes[index].asset.transform();
    assert!(transform.translation.abs_diff_eq(moved.normalize() * 10.0, 1e-4));
    let to_camera = (moved - transform.translation).normalize();
    assert!(transform.forward().abs_diff_eq(to_camera, 1e-4));
}

#[test]
fn test_hidden_planes_are_not_reposed() {
    let mut harness = Harness::new(7);
    let (mut scene, index) = scene_with_plane_shown(&mut harness);
    let other = 1 - index;
    let before = *scene.assets().planes[other].asset.transform();

    scene.frame(&mut RecordingHost::default(), 0.016, Vec3::new(5.0, 5.0, 5.0));

    assert_eq!(*scene.assets().planes[other].asset.transform(), before);
}

#[test]
fn test_camera_at_origin_keeps_pose() {
    let mut harness = Harness::new(7);
    let (mut scene, index) = scene_with_plane_shown(&mut harness);
    let before = *scene.assets().planes[index].asset.transform();

    scene.frame(&mut RecordingHost::default(), 0.016, Vec3::ZERO);

    assert_eq!(*scene.assets().planes[index].asset.transform(), before);
}

#[test]
fn test_animated_model_hidden_after_clip_finishes() {
    let (assets, loaders) = pending_assets(0);
    let mut scene = SceneContext::mount(SceneConfig::default(), |_| assets);
    let mut host = RecordingHost::default();
    let mut harness = Harness::new(0);
    loaders.deliver_all(0.5);
    scene.poll_assets(&mut host);

    // before opening, time never moves
    scene.frame(&mut host, 1.0, CAMERA);
    assert_eq!(scene.assets().animation.as_ref().unwrap().time(), 0.0);

    harness.click(&mut scene);
    scene.frame(&mut host, 0.3, CAMERA);
    assert!(scene.assets().animated_case.is_visible());

    scene.frame(&mut host, 0.3, CAMERA);
    assert!(!scene.assets().animated_case.is_visible());
    assert!(!scene.assets().case.is_visible());
    assert_eq!(scene.assets().animation.as_ref().unwrap().time(), 0.5);
}

#[test]
fn test_negative_delta_does_not_rewind() {
    let (assets, loaders) = pending_assets(0);
    let mut scene = SceneContext::mount(SceneConfig::default(), |_| assets);
    let mut host = RecordingHost::default();
    let mut harness = Harness::new(0);
    loaders.deliver_all(2.0);
    scene.poll_assets(&mut host);

    harness.click(&mut scene);
    scene.frame(&mut host, 0.5, CAMERA);
    scene.frame(&mut host, -0.25, CAMERA);

    assert_eq!(scene.assets().animation.as_ref().unwrap().time(), 0.5);
}

#[test]
fn test_frames_stop_after_unmount() {
    let (assets, _loaders) = pending_assets(0);
    let mut scene = SceneContext::mount(SceneConfig::default(), |_| assets);
    let mut host = RecordingHost::default();

    assert!(scene.frame(&mut host, 0.016, CAMERA));
    scene.unmount();
    assert!(!scene.frame(&mut host, 0.016, CAMERA));
    assert!(!scene.is_mounted());
}
