//! Building skeletons and clips from decoded skin and animation sources
//!
//! A [`SkinSource`] is the joint list of a skinned mesh as it comes out of a
//! file: bind-pose joints with child lists and one row-major inverse-bind
//! matrix per joint. [`load_skeleton`] turns it into a [`Skeleton`] plus a
//! [`JointIndexMap`] from source joint index to skeleton joint index; clips
//! loaded with [`load_clip`] for the same skin go through that map.
//!
//! Data problems that leave a usable result are returned as
//! [`LoadWarning`]s alongside it (and logged). Anything that makes the
//! asset unusable is a [`LoadError`].

use std::collections::{BTreeMap, VecDeque};
use std::fmt;

use nou_math::{Mat4, Quat, Vec3};
use thiserror::Error;

use crate::error::LoadError;
use crate::joint::Joint;
use crate::skeleton::Skeleton;
use crate::track::{JointTrack, Keyframe, SkeletalAnim};

/// Joint as stored in a skin source
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct SourceJoint {
    pub name: String,
    /// Bind-pose translation relative to the parent
    pub translation: [f32; 3],
    /// Bind-pose rotation relative to the parent, `[x, y, z, w]`
    pub rotation: [f32; 4],
    /// Indices of child joints in the source joint list
    pub children: Vec<usize>,
}

impl Default for SourceJoint {
    fn default() -> Self {
        Self {
            name: String::new(),
            translation: [0.0; 3],
            rotation: [0.0, 0.0, 0.0, 1.0],
            children: Vec::new(),
        }
    }
}

/// Skin data for [`load_skeleton`]
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SkinSource {
    pub joints: Vec<SourceJoint>,
    /// One row-major 4x4 matrix per joint
    #[cfg_attr(feature = "serde", serde(default))]
    pub inverse_bind_matrices: Option<Vec<[f32; 16]>>,
}

/// Property an animation channel drives
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum ChannelPath {
    Translation,
    Rotation,
    Scale,
    Weights,
}

impl ChannelPath {
    /// Floats per keyframe value
    pub fn stride(&self) -> usize {
        match self {
            Self::Translation | Self::Scale => 3,
            Self::Rotation => 4,
            Self::Weights => 1,
        }
    }
}

impl fmt::Display for ChannelPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Translation => "translation",
            Self::Rotation => "rotation",
            Self::Scale => "scale",
            Self::Weights => "weights",
        })
    }
}

/// One keyframed property of one source joint
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SourceChannel {
    /// Source joint index, as used by the matching [`SkinSource`]
    pub joint: usize,
    pub path: ChannelPath,
    /// Keyframe times in seconds
    pub times: Vec<f32>,
    /// Flattened values, [`ChannelPath::stride`] floats per keyframe
    pub values: Vec<f32>,
}

/// Animation data for [`load_clip`]
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AnimSource {
    pub name: String,
    pub channels: Vec<SourceChannel>,
}

/// Degraded-but-usable data found while loading
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LoadWarning {
    /// Channel drives a property joints do not animate
    #[error("Unsupported {path} channel on joint {joint} skipped")]
    UnsupportedChannel { joint: usize, path: ChannelPath },

    /// Channel targets a joint the skeleton does not have
    #[error("Channel {path} targets unknown joint {joint}, skipped")]
    UnknownJoint { joint: usize, path: ChannelPath },

    /// Zero-length rotation replaced with identity
    #[error("Joint {joint} has a degenerate rotation, using identity")]
    DegenerateRotation { joint: usize },
}

/// Source joint index to skeleton joint index
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct JointIndexMap {
    indices: Vec<Option<usize>>,
}

impl JointIndexMap {
    /// Skeleton index for a source joint index
    pub fn get(&self, source: usize) -> Option<usize> {
        self.indices.get(source).copied().flatten()
    }

    /// Number of source joints covered
    pub fn len(&self) -> usize {
        self.indices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }
}

/// Result of [`load_skeleton`]
#[derive(Debug, Clone)]
pub struct LoadedSkeleton {
    pub skeleton: Skeleton,
    pub index_map: JointIndexMap,
    pub warnings: Vec<LoadWarning>,
}

/// Result of [`load_clip`]
#[derive(Debug, Clone)]
pub struct LoadedClip {
    pub anim: SkeletalAnim,
    pub warnings: Vec<LoadWarning>,
}

fn warn(warnings: &mut Vec<LoadWarning>, warning: LoadWarning) {
    log::warn!("{warning}");
    warnings.push(warning);
}

fn rotation_from(raw: [f32; 4], joint: usize, warnings: &mut Vec<LoadWarning>) -> Quat {
    let q = Quat::from_array(raw);
    if q.length_squared() <= f32::EPSILON {
        warn(warnings, LoadWarning::DegenerateRotation { joint });
        Quat::IDENTITY
    } else {
        q.normalize()
    }
}

/// Build a skeleton from a skin source
///
/// Joints are re-ordered breadth-first from the single root so parents
/// precede children. The returned map translates source joint indices to
/// the new order.
pub fn load_skeleton(source: &SkinSource) -> Result<LoadedSkeleton, LoadError> {
    let count = source.joints.len();
    if count == 0 {
        return Err(LoadError::EmptySkin);
    }

    let inverse_binds = source
        .inverse_bind_matrices
        .as_ref()
        .ok_or(LoadError::MissingInverseBind)?;
    if inverse_binds.len() != count {
        return Err(LoadError::InverseBindCountMismatch {
            expected: count,
            actual: inverse_binds.len(),
        });
    }

    let mut parents: Vec<Option<usize>> = vec![None; count];
    for (joint, source_joint) in source.joints.iter().enumerate() {
        for &child in &source_joint.children {
            if child >= count {
                return Err(LoadError::UnknownChild { joint, child });
            }
            if parents[child].is_some() {
                return Err(LoadError::MultipleParents(child));
            }
            parents[child] = Some(joint);
        }
    }

    let roots: Vec<usize> = (0..count).filter(|i| parents[*i].is_none()).collect();
    let root = match roots.len() {
        0 => return Err(LoadError::NoRoot),
        1 => roots[0],
        _ => return Err(LoadError::MultipleRoots(roots)),
    };

    let mut warnings = Vec::new();
    let mut skeleton = Skeleton::new();
    let mut indices: Vec<Option<usize>> = vec![None; count];
    let mut queue = VecDeque::from([root]);

    while let Some(src) = queue.pop_front() {
        let source_joint = &source.joints[src];
        let joint = Joint::new(
            source_joint.name.clone(),
            Vec3::from_array(source_joint.translation),
            rotation_from(source_joint.rotation, src, &mut warnings),
            Mat4::from_cols_array(&inverse_binds[src]).transpose(),
        );
        let parent = parents[src].and_then(|p| indices[p]);
        indices[src] = Some(skeleton.add_joint(joint, parent));
        queue.extend(source_joint.children.iter().copied());
    }

    if let Some(unreached) = indices.iter().position(Option::is_none) {
        return Err(LoadError::Unreachable(unreached));
    }

    log::debug!(
        "Loaded skeleton with {} joints, root '{}'",
        skeleton.joint_count(),
        source.joints[root].name
    );

    Ok(LoadedSkeleton {
        skeleton,
        index_map: JointIndexMap { indices },
        warnings,
    })
}

/// Build a clip from an animation source, resolving joints through `map`
///
/// Translation and rotation channels become keyframe tracks; scale and
/// morph-weight channels, and channels for joints missing from `map`, are
/// skipped with a warning. Keyframes are sorted by time and the clip
/// duration is the largest timestamp of any channel, skipped ones included.
pub fn load_clip(source: &AnimSource, map: &JointIndexMap) -> Result<LoadedClip, LoadError> {
    let mut warnings = Vec::new();
    let mut tracks: BTreeMap<usize, JointTrack> = BTreeMap::new();
    let mut end_time = 0.0f32;

    for channel in &source.channels {
        let stride = channel.path.stride();
        let expected = channel.times.len() * stride;
        if channel.values.len() != expected {
            return Err(LoadError::ValueCountMismatch {
                joint: channel.joint,
                path: channel.path.to_string(),
                times: channel.times.len(),
                expected,
                actual: channel.values.len(),
            });
        }
        end_time = channel.times.iter().fold(end_time, |end, &t| end.max(t));

        if matches!(channel.path, ChannelPath::Scale | ChannelPath::Weights) {
            warn(
                &mut warnings,
                LoadWarning::UnsupportedChannel {
                    joint: channel.joint,
                    path: channel.path,
                },
            );
            continue;
        }

        let Some(joint) = map.get(channel.joint) else {
            warn(
                &mut warnings,
                LoadWarning::UnknownJoint {
                    joint: channel.joint,
                    path: channel.path,
                },
            );
            continue;
        };

        let track = tracks
            .entry(joint)
            .or_insert_with(|| JointTrack::new(joint));
        let values = channel.values.chunks_exact(stride);
        if channel.path == ChannelPath::Rotation {
            for (t, v) in channel.times.iter().zip(values) {
                let rotation =
                    rotation_from([v[0], v[1], v[2], v[3]], channel.joint, &mut warnings);
                track.rotations.push(Keyframe::new(*t, rotation));
            }
        } else {
            track.positions.extend(
                channel
                    .times
                    .iter()
                    .zip(values)
                    .map(|(t, v)| Keyframe::new(*t, Vec3::from_slice(v))),
            );
        }
    }

    let mut anim = SkeletalAnim::new(source.name.clone());
    for track in tracks.into_values() {
        anim.push_track(track);
    }
    anim.extend_duration(end_time);

    log::debug!(
        "Loaded clip '{}': {} tracks, {:.3}s",
        anim.name(),
        anim.tracks().len(),
        anim.duration()
    );

    Ok(LoadedClip { anim, warnings })
}
