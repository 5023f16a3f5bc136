//! Time-driven evaluation of a [`SkeletalAnim`]

use std::sync::Arc;

use nou_math::Mix;

use crate::pose::{JointPose, Pose};
use crate::skeleton::Skeleton;
use crate::track::{Keyframe, SkeletalAnim};

/// Per-track keyframe cursors
#[derive(Debug, Clone, Copy, Default)]
struct Cursor {
    position: usize,
    rotation: usize,
}

/// Plays a clip against a skeleton, producing a looping [`Pose`]
///
/// The timer advances with [`update`](Self::update) and wraps with a
/// floating-point remainder once it passes the clip duration, so overshoot
/// carries into the next loop. Channels without keyframes hold the bind pose
/// (or the identity delta for diff clips).
#[derive(Debug, Clone)]
pub struct ClipEvaluator {
    anim: Arc<SkeletalAnim>,
    timer: f32,
    /// Indices into `anim.tracks()` whose joint exists in the skeleton
    tracks: Vec<usize>,
    cursors: Vec<Cursor>,
    defaults: Pose,
    pose: Pose,
}

impl ClipEvaluator {
    /// Create an evaluator for `anim` playing on `skeleton`
    ///
    /// Tracks that target joints the skeleton does not have are skipped.
    pub fn new(anim: Arc<SkeletalAnim>, skeleton: &Skeleton) -> Self {
        let joint_count = skeleton.joint_count();
        let tracks: Vec<usize> = anim
            .tracks()
            .iter()
            .enumerate()
            .filter_map(|(i, track)| {
                if track.joint < joint_count {
                    Some(i)
                } else {
                    log::warn!(
                        "Clip '{}' animates joint {} but the skeleton has {} joints, skipping track",
                        anim.name(),
                        track.joint,
                        joint_count
                    );
                    None
                }
            })
            .collect();

        let defaults = if anim.is_diff() {
            Pose::identity(joint_count)
        } else {
            Pose::base(skeleton)
        };

        let mut evaluator = Self {
            cursors: vec![Cursor::default(); tracks.len()],
            tracks,
            pose: defaults.clone(),
            defaults,
            timer: 0.0,
            anim,
        };
        evaluator.evaluate();
        evaluator
    }

    pub fn anim(&self) -> &SkeletalAnim {
        &self.anim
    }

    pub fn is_diff(&self) -> bool {
        self.anim.is_diff()
    }

    /// Current playback time in seconds
    pub fn time(&self) -> f32 {
        self.timer
    }

    /// Pose as of the last update or seek
    pub fn pose(&self) -> &Pose {
        &self.pose
    }

    /// Advance playback by `dt` seconds and re-evaluate the pose
    ///
    /// Negative and non-finite steps do not move the timer.
    pub fn update(&mut self, dt: f32) {
        let duration = self.anim.duration();
        if duration > 0.0 && dt.is_finite() && dt > 0.0 {
            self.timer += dt;
            if self.timer > duration {
                self.timer %= duration;
                self.reset_cursors();
                log::trace!("Clip '{}' looped at {:.4}", self.anim.name(), self.timer);
            }
        }
        self.evaluate();
    }

    /// Jump to `time`, wrapped into the clip, and re-evaluate the pose
    pub fn seek(&mut self, time: f32) {
        let duration = self.anim.duration();
        self.timer = if duration <= 0.0 || !time.is_finite() {
            0.0
        } else if time > duration {
            time % duration
        } else {
            time.max(0.0)
        };
        self.reset_cursors();
        self.evaluate();
    }

    /// Rewind to the start of the clip
    pub fn reset(&mut self) {
        self.seek(0.0);
    }

    fn reset_cursors(&mut self) {
        self.cursors.fill(Cursor::default());
    }

    fn evaluate(&mut self) {
        let timer = self.timer;
        let tracks = self.anim.tracks();
        let out = self.pose.as_mut_slice();
        let defaults = self.defaults.as_slice();

        for (&track_index, cursor) in self.tracks.iter().zip(&mut self.cursors) {
            let track = &tracks[track_index];
            let joint = track.joint;
            let default = defaults[joint];

            out[joint] = JointPose {
                position: sample(&track.positions, &mut cursor.position, timer)
                    .unwrap_or(default.position),
                rotation: sample(&track.rotations, &mut cursor.rotation, timer)
                    .unwrap_or(default.rotation),
            };
        }
    }
}

/// Sample a keyframe channel at `time`, moving `cursor` forward as needed
///
/// Returns `None` for an empty channel. `cursor` only moves forward; callers
/// reset it to 0 when time jumps backwards.
pub fn sample<T: Mix>(keys: &[Keyframe<T>], cursor: &mut usize, time: f32) -> Option<T> {
    match keys {
        [] => None,
        [only] => Some(only.value),
        _ => {
            if *cursor >= keys.len() {
                *cursor = 0;
            }
            while *cursor + 1 < keys.len() && time > keys[*cursor + 1].time {
                *cursor += 1;
            }

            let current = &keys[*cursor];
            let Some(next) = keys.get(*cursor + 1) else {
                return Some(current.value);
            };

            let span = next.time - current.time;
            let t = if span > 0.0 {
                ((time - current.time) / span).clamp(0.0, 1.0)
            } else {
                0.0
            };
            Some(current.value.mix(&next.value, t))
        }
    }
}
