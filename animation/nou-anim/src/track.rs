//! Keyframe tracks and skeletal animation clips

use nou_math::{Quat, Vec3};

use crate::error::{AnimError, Result};
use crate::skeleton::Skeleton;

/// A value at a point in time (seconds)
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Keyframe<T> {
    pub time: f32,
    pub value: T,
}

impl<T> Keyframe<T> {
    pub const fn new(time: f32, value: T) -> Self {
        Self { time, value }
    }
}

/// Position and rotation keyframes for one skeleton joint
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct JointTrack {
    /// Target joint index in the skeleton
    pub joint: usize,
    pub positions: Vec<Keyframe<Vec3>>,
    pub rotations: Vec<Keyframe<Quat>>,
}

impl JointTrack {
    /// Create an empty track for `joint`
    pub fn new(joint: usize) -> Self {
        Self {
            joint,
            ..Default::default()
        }
    }

    /// Add a position keyframe (builder style)
    pub fn with_position(mut self, time: f32, value: Vec3) -> Self {
        self.positions.push(Keyframe::new(time, value));
        self
    }

    /// Add a rotation keyframe (builder style)
    pub fn with_rotation(mut self, time: f32, value: Quat) -> Self {
        self.rotations.push(Keyframe::new(time, value));
        self
    }

    /// Latest timestamp on either channel
    pub fn end_time(&self) -> f32 {
        let last_position = self.positions.last().map_or(0.0, |k| k.time);
        let last_rotation = self.rotations.last().map_or(0.0, |k| k.time);
        last_position.max(last_rotation)
    }

    fn sort(&mut self) {
        self.positions.sort_by(|a, b| a.time.total_cmp(&b.time));
        self.rotations.sort_by(|a, b| a.time.total_cmp(&b.time));
    }
}

/// A skeletal animation clip
///
/// Holds one [`JointTrack`] per animated joint. The clip's duration is the
/// largest keyframe timestamp across all tracks, or longer when extended
/// with [`SkeletalAnim::extend_duration`].
///
/// With the `serde` feature a clip (de)serializes as its name, tracks and
/// length. Loading re-sorts keyframes and never yields a diff clip.
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(from = "ClipData", into = "ClipData")
)]
pub struct SkeletalAnim {
    name: String,
    duration: f32,
    tracks: Vec<JointTrack>,
    diff: bool,
}

impl SkeletalAnim {
    /// Create an empty clip
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    /// Add a track, sorting its keyframes by time and extending the duration
    pub fn push_track(&mut self, mut track: JointTrack) {
        track.sort();
        self.duration = self.duration.max(track.end_time());
        self.tracks.push(track);
    }

    /// Extend the clip to at least `duration` seconds
    ///
    /// Channels that carry no joint track still count towards the loop
    /// length, so loaders report their timestamps through here.
    pub fn extend_duration(&mut self, duration: f32) {
        if duration.is_finite() {
            self.duration = self.duration.max(duration);
        }
    }

    /// Add a track (builder style)
    pub fn with_track(mut self, track: JointTrack) -> Self {
        self.push_track(track);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Clip length in seconds
    pub fn duration(&self) -> f32 {
        self.duration
    }

    pub fn tracks(&self) -> &[JointTrack] {
        &self.tracks
    }

    /// Whether keyframes hold deltas from the bind pose
    pub fn is_diff(&self) -> bool {
        self.diff
    }

    /// Re-express every keyframe relative to the skeleton's bind pose
    ///
    /// Positions become `key - base`, rotations `key * base⁻¹`. Tracks that
    /// target joints missing from `skeleton` are left untouched. A clip can
    /// only be converted once.
    pub fn convert_to_diff(&mut self, skeleton: &Skeleton) -> Result<()> {
        if self.diff {
            return Err(AnimError::AlreadyDiff(self.name.clone()));
        }

        for track in &mut self.tracks {
            let Some(joint) = skeleton.joint(track.joint) else {
                log::warn!(
                    "Clip '{}': joint {} not in skeleton, track left absolute",
                    self.name,
                    track.joint
                );
                continue;
            };

            let base_position = joint.base_position();
            let inv_base_rotation = joint.base_rotation().inverse();
            for key in &mut track.positions {
                key.value -= base_position;
            }
            for key in &mut track.rotations {
                key.value = (key.value * inv_base_rotation).normalize();
            }
        }

        self.diff = true;
        Ok(())
    }
}

/// Serialized form of [`SkeletalAnim`]
#[cfg(feature = "serde")]
#[derive(serde::Serialize, serde::Deserialize)]
struct ClipData {
    name: String,
    /// Lower bound on the clip length; the tracks may extend it
    #[serde(default)]
    duration: f32,
    #[serde(default)]
    tracks: Vec<JointTrack>,
}

#[cfg(feature = "serde")]
impl From<ClipData> for SkeletalAnim {
    fn from(data: ClipData) -> Self {
        let mut anim = Self::new(data.name);
        for track in data.tracks {
            anim.push_track(track);
        }
        anim.extend_duration(data.duration);
        anim
    }
}

#[cfg(feature = "serde")]
impl From<SkeletalAnim> for ClipData {
    fn from(anim: SkeletalAnim) -> Self {
        if anim.diff {
            log::warn!(
                "Clip '{}' is serialized as absolute; its bind-pose deltas will not round-trip",
                anim.name
            );
        }
        Self {
            name: anim.name,
            duration: anim.duration,
            tracks: anim.tracks,
        }
    }
}
