// animation.rs - Keyframe clips and the play-once handle that drives them
use glam::{Quat, Vec3};
use std::sync::Arc;

use crate::math::Transform;

/// How values between two keyframes are produced
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Interpolation {
    Step,
    Linear,
}

/// Keyframe values for one animated node property
#[derive(Debug, Clone, PartialEq)]
pub enum ChannelValues {
    Translation(Vec<Vec3>),
    Rotation(Vec<Quat>),
    Scale(Vec<Vec3>),
}

impl ChannelValues {
    fn len(&self) -> usize {
        match self {
            ChannelValues::Translation(v) | ChannelValues::Scale(v) => v.len(),
            ChannelValues::Rotation(v) => v.len(),
        }
    }
}

/// One animated property of one node
#[derive(Debug, Clone, PartialEq)]
pub struct Channel {
    pub node: usize,
    pub interpolation: Interpolation,
    pub times: Vec<f32>,
    pub values: ChannelValues,
}

impl Channel {
    /// Keyframe pair and blend factor for time `t`
    fn locate(&self, t: f32) -> Option<(usize, usize, f32)> {
        let count = self.times.len().min(self.values.len());
        if count == 0 {
            return None;
        }

        let last = count - 1;
        if t <= self.times[0] {
            return Some((0, 0, 0.0));
        }
        if t >= self.times[last] {
            return Some((last, last, 0.0));
        }

        let next = self.times[..count].partition_point(|&k| k <= t);
        let prev = next - 1;
        let span = self.times[next] - self.times[prev];
        let alpha = if span > 0.0 {
            (t - self.times[prev]) / span
        } else {
            0.0
        };

        match self.interpolation {
            Interpolation::Step => Some((prev, prev, 0.0)),
            Interpolation::Linear => Some((prev, next, alpha)),
        }
    }

    /// Write this channel's value at time `t` into `target`
    pub fn apply(&self, t: f32, target: &mut Transform) {
        let Some((a, b, alpha)) = self.locate(t) else {
            return;
        };

        match &self.values {
            ChannelValues::Translation(v) => target.translation = v[a].lerp(v[b], alpha),
            ChannelValues::Scale(v) => target.scale = v[a].lerp(v[b], alpha),
            ChannelValues::Rotation(v) => target.rotation = v[a].slerp(v[b], alpha).normalize(),
        }
    }
}

/// A named set of channels. Duration is the latest keyframe time.
#[derive(Debug, Clone, PartialEq)]
pub struct AnimationClip {
    pub name: String,
    pub duration: f32,
    pub channels: Vec<Channel>,
}

impl AnimationClip {
    pub fn new(name: impl Into<String>, channels: Vec<Channel>) -> Self {
        let duration = channels
            .iter()
            .flat_map(|c| c.times.iter().copied())
            .fold(0.0f32, f32::max);

        Self {
            name: name.into(),
            duration,
            channels,
        }
    }

    /// Local node transforms at time `t`, starting from the rest pose
    pub fn sample(&self, t: f32, rest_pose: &[Transform]) -> Vec<Transform> {
        let mut pose = rest_pose.to_vec();
        for channel in &self.channels {
            if let Some(target) = pose.get_mut(channel.node) {
                channel.apply(t, target);
            }
        }
        pose
    }
}

/// Play-once handle for a clip bound to a model.
///
/// The play position only moves forward while playing and clamps at the
/// clip duration, where playback stops.
#[derive(Debug, Clone)]
pub struct AnimationHandle {
    clip: Arc<AnimationClip>,
    time: f32,
    playing: bool,
    started: bool,
}

impl AnimationHandle {
    pub fn new(clip: Arc<AnimationClip>) -> Self {
        Self {
            clip,
            time: 0.0,
            playing: false,
            started: false,
        }
    }

    /// Rewind to zero and start playing once
    pub fn play_once(&mut self) {
        self.time = 0.0;
        self.playing = true;
        self.started = true;
    }

    /// Advance by `delta` seconds if playing
    pub fn advance(&mut self, delta: f32) {
        if !self.playing {
            return;
        }

        self.time += delta.max(0.0);
        if self.time >= self.clip.duration {
            self.time = self.clip.duration;
            self.playing = false;
        }
    }

    pub fn clip(&self) -> &AnimationClip {
        &self.clip
    }

    pub fn time(&self) -> f32 {
        self.time
    }

    pub fn is_playing(&self) -> bool {
        self.playing
    }

    pub fn has_started(&self) -> bool {
        self.started
    }

    /// Started, and the play position has reached the clip duration
    pub fn is_finished(&self) -> bool {
        self.started && self.time >= self.clip.duration
    }

    /// Current local node transforms
    pub fn pose(&self, rest_pose: &[Transform]) -> Vec<Transform> {
        self.clip.sample(self.time, rest_pose)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lift_clip() -> AnimationClip {
        AnimationClip::new(
            "lift",
            vec![
                Channel {
                    node: 0,
                    interpolation: Interpolation::Linear,
                    times: vec![0.0, 2.0],
                    values: ChannelValues::Translation(vec![Vec3::ZERO, Vec3::new(0.0, 4.0, 0.0)]),
                },
                Channel {
                    node: 1,
                    interpolation: Interpolation::Step,
                    times: vec![0.0, 1.0, 1.5],
                    values: ChannelValues::Scale(vec![Vec3::ONE, Vec3::splat(2.0), Vec3::splat(3.0)]),
                },
            ],
        )
    }

    #[test]
    fn test_duration_is_last_keyframe() {
        assert_eq!(lift_clip().duration, 2.0);
        assert_eq!(AnimationClip::new("empty", vec![]).duration, 0.0);
    }

    #[test]
    fn test_linear_sampling() {
        let clip = lift_clip();
        let pose = clip.sample(0.5, &[Transform::IDENTITY; 2]);
        assert!(pose[0].translation.abs_diff_eq(Vec3::new(0.0, 1.0, 0.0), 1e-5));
    }

    #[test]
    fn test_step_sampling_holds_previous_key() {
        let clip = lift_clip();
        let pose = clip.sample(1.4, &[Transform::IDENTITY; 2]);
        assert_eq!(pose[1].scale, Vec3::splat(2.0));
    }

    #[test]
    fn test_sampling_clamps_outside_range() {
        let clip = lift_clip();
        let before = clip.sample(-1.0, &[Transform::IDENTITY; 2]);
        let after = clip.sample(10.0, &[Transform::IDENTITY; 2]);
        assert_eq!(before[0].translation, Vec3::ZERO);
        assert_eq!(after[0].translation, Vec3::new(0.0, 4.0, 0.0));
        assert_eq!(after[1].scale, Vec3::splat(3.0));
    }

    #[test]
    fn test_rotation_slerp_midpoint() {
        let clip = AnimationClip::new(
            "turn",
            vec![Channel {
                node: 0,
                interpolation: Interpolation::Linear,
                times: vec![0.0, 1.0],
                values: ChannelValues::Rotation(vec![
                    Quat::IDENTITY,
                    Quat::from_rotation_y(std::f32::consts::FRAC_PI_2),
                ]),
            }],
        );
        let pose = clip.sample(0.5, &[Transform::IDENTITY]);
        let expected = Quat::from_rotation_y(std::f32::consts::FRAC_PI_4);
        assert!(pose[0].rotation.abs_diff_eq(expected, 1e-4));
    }

    #[test]
    fn test_channel_for_missing_node_is_ignored() {
        let clip = lift_clip();
        let pose = clip.sample(1.0, &[Transform::IDENTITY]);
        assert_eq!(pose.len(), 1);
    }

    #[test]
    fn test_handle_plays_once_and_clamps() {
        let mut handle = AnimationHandle::new(Arc::new(lift_clip()));
        assert!(!handle.has_started());

        handle.advance(1.0);
        assert_eq!(handle.time(), 0.0, "idle handle must not advance");

        handle.play_once();
        handle.advance(0.5);
        handle.advance(-3.0);
        assert_eq!(handle.time(), 0.5);
        assert!(!handle.is_finished());

        handle.advance(5.0);
        assert_eq!(handle.time(), 2.0);
        assert!(handle.is_finished());
        assert!(!handle.is_playing());
    }

    #[test]
    fn test_zero_length_clip_finishes_on_first_check() {
        let mut handle = AnimationHandle::new(Arc::new(AnimationClip::new("still", vec![])));
        assert!(!handle.is_finished());
        handle.play_once();
        assert!(handle.is_finished());
    }
}
