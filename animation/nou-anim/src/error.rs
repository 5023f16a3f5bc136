use thiserror::Error;

/// Error types for animation setup
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AnimError {
    /// The clip's keyframes are already stored relative to the base pose
    #[error("Clip '{0}' has already been converted to a diff clip")]
    AlreadyDiff(String),

    /// Blend tree node index out of range
    #[error("Blend node {index} out of range: tree has {len} nodes")]
    NodeOutOfRange { index: usize, len: usize },
}

/// Result type using AnimError
pub type Result<T> = std::result::Result<T, AnimError>;

/// Errors that abort loading a skin or animation source
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LoadError {
    /// Skin has no joints at all
    #[error("Skin has no joints")]
    EmptySkin,

    /// Skin carries no inverse-bind matrices
    #[error("Skin is missing inverse-bind matrices")]
    MissingInverseBind,

    /// Inverse-bind matrix count does not match the joint count
    #[error("Inverse-bind count mismatch: expected {expected}, got {actual}")]
    InverseBindCountMismatch { expected: usize, actual: usize },

    /// A joint lists a child index outside the joint list
    #[error("Joint {joint} references unknown child {child}")]
    UnknownChild { joint: usize, child: usize },

    /// A joint is listed as the child of more than one joint
    #[error("Joint {0} has more than one parent")]
    MultipleParents(usize),

    /// No joint is free of a parent
    #[error("Skin has no root joint")]
    NoRoot,

    /// More than one joint is free of a parent
    #[error("Skin has multiple root joints: {0:?}")]
    MultipleRoots(Vec<usize>),

    /// Joint cannot be reached from the root
    #[error("Joint {0} is not reachable from the root")]
    Unreachable(usize),

    /// Keyframe value buffer does not match the timestamp count
    #[error(
        "Channel {path} on joint {joint}: {times} timestamps need {expected} values, got {actual}"
    )]
    ValueCountMismatch {
        joint: usize,
        path: String,
        times: usize,
        expected: usize,
        actual: usize,
    },
}
