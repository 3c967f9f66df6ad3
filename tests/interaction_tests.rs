mod common;

use common::{pending_assets, plane_url, Harness, RecordingHost, CAMERA};
use case_reveal::config::{RevealPolicy, SceneConfig};
use case_reveal::interaction::{ClickOutcome, InteractionState};
use case_reveal::scene::SceneContext;
use glam::Vec3;

/// Mounted scene with every asset delivered and attached
fn ready_scene(planes: usize, reveal: RevealPolicy) -> SceneContext {
    let config = SceneConfig {
        reveal,
        ..SceneConfig::default()
    };
    let (assets, loaders) = pending_assets(planes);
    let mut scene = SceneContext::mount(config, |_| assets);
    loaders.deliver_all(1.0);
    scene.poll_assets(&mut RecordingHost::default());
    scene
}

#[test]
fn test_first_click_opens_case() {
    let mut scene = ready_scene(2, RevealPolicy::Repeat);
    let mut harness = Harness::new(3);

    assert_eq!(harness.click(&mut scene), ClickOutcome::CaseOpened);
    assert_eq!(scene.state(), InteractionState::AwaitingChoice);
    assert!(scene.case_opened());
    assert_eq!(harness.sound.plays, 1);

    let assets = scene.assets();
    assert!(!assets.case.is_visible());
    assert!(assets.animated_case.is_visible());
    let animation = assets.animation.as_ref().unwrap();
    assert!(animation.has_started());
    assert!(animation.is_playing());
}

#[test]
fn test_case_opens_only_once() {
    let mut scene = ready_scene(2, RevealPolicy::Repeat);
    let mut harness = Harness::new(3);

    harness.click(&mut scene);
    scene.frame(&mut RecordingHost::default(), 0.4, CAMERA);
    for _ in 0..6 {
        harness.click(&mut scene);
    }

    assert_eq!(harness.sound.plays, 1);
    let animation = scene.assets().animation.as_ref().unwrap();
    assert!((animation.time() - 0.4).abs() < 1e-6, "clip must not be rewound");
}

#[test]
fn test_reveal_shows_exactly_one_plane_facing_camera() {
    let mut scene = ready_scene(2, RevealPolicy::Repeat);
    let mut harness = Harness::new(11);
    harness.camera = Vec3::new(20.0, 15.0, 40.0);

    harness.click(&mut scene);
    let outcome = harness.click(&mut scene);

    let ClickOutcome::PlaneRevealed(index) = outcome else {
        panic!("expected a plane, got {:?}", outcome);
    };
    assert_eq!(scene.state(), InteractionState::PlaneShown);
    assert_eq!(scene.assets().visible_plane_count(), 1);
    assert_eq!(scene.assets().visible_plane(), Some(index));

    let transform = scene.assets().planes[index].asset.transform();
    let expected = harness.camera.normalize() * 10.0;
    assert!(transform.translation.abs_diff_eq(expected, 1e-4));

    let to_camera = (harness.camera - transform.translation).normalize();
    assert!(transform.forward().abs_diff_eq(to_camera, 1e-4));
}

#[test]
fn test_plane_choice_covers_both_planes() {
    let mut chosen = [false; 2];
    for seed in 0..32 {
        let mut scene = ready_scene(2, RevealPolicy::Repeat);
        let mut harness = Harness::new(seed);
        harness.click(&mut scene);
        if let ClickOutcome::PlaneRevealed(i) = harness.click(&mut scene) {
            chosen[i] = true;
        }
    }
    assert_eq!(chosen, [true, true]);
}

#[test]
fn test_single_plane_is_chosen_deterministically() {
    for seed in 0..8 {
        let mut scene = ready_scene(1, RevealPolicy::Repeat);
        let mut harness = Harness::new(seed);
        harness.click(&mut scene);
        assert_eq!(harness.click(&mut scene), ClickOutcome::PlaneRevealed(0));
    }
}

#[test]
fn test_link_click_opens_url_and_hides_planes() {
    let mut scene = ready_scene(2, RevealPolicy::Repeat);
    let mut harness = Harness::new(5);

    harness.click(&mut scene);
    let ClickOutcome::PlaneRevealed(index) = harness.click(&mut scene) else {
        panic!("expected a plane");
    };

    let outcome = harness.click(&mut scene);
    assert_eq!(
        outcome,
        ClickOutcome::LinkOpened {
            plane: index,
            url: plane_url(index)
        }
    );
    assert_eq!(harness.navigator.opened, [plane_url(index)]);
    assert_eq!(scene.assets().visible_plane_count(), 0);
    assert_eq!(scene.state(), InteractionState::AwaitingChoice);
}

#[test]
fn test_repeat_policy_allows_another_reveal() {
    let mut scene = ready_scene(2, RevealPolicy::Repeat);
    let mut harness = Harness::new(5);

    for _ in 0..3 {
        harness.click(&mut scene);
    }
    assert!(matches!(harness.click(&mut scene), ClickOutcome::PlaneRevealed(_)));
    assert!(matches!(harness.click(&mut scene), ClickOutcome::LinkOpened { .. }));
    assert_eq!(harness.navigator.opened.len(), 2);
}

#[test]
fn test_once_policy_ignores_clicks_after_link() {
    let mut scene = ready_scene(2, RevealPolicy::Once);
    let mut harness = Harness::new(5);

    for _ in 0..3 {
        harness.click(&mut scene);
    }
    assert_eq!(scene.state(), InteractionState::Finished);

    for _ in 0..3 {
        assert_eq!(harness.click(&mut scene), ClickOutcome::Ignored);
    }
    assert_eq!(harness.navigator.opened.len(), 1);
    assert_eq!(scene.assets().visible_plane_count(), 0);
}

#[test]
fn test_without_planes_case_still_opens() {
    let mut scene = ready_scene(0, RevealPolicy::Repeat);
    let mut harness = Harness::new(0);

    assert_eq!(harness.click(&mut scene), ClickOutcome::CaseOpened);
    assert_eq!(harness.click(&mut scene), ClickOutcome::Ignored);
    assert_eq!(scene.state(), InteractionState::AwaitingChoice);
    assert!(harness.navigator.opened.is_empty());
}
