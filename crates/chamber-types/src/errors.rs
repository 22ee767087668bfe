use crate::quantity::Dimension;

/// Errors raised while reading user-supplied parameters.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ParseError {
    #[error("cannot parse quantity '{text}': {reason}")]
    InvalidQuantity { text: String, reason: String },

    #[error("parameter '{name}' should be a {expected:?}, found {found:?}")]
    WrongDimension {
        name: String,
        expected: Dimension,
        found: Dimension,
    },

    #[error("missing parameter '{name}'")]
    MissingParameter { name: String },

    #[error("parameter '{name}' is a list, expected a single value")]
    ExpectedScalar { name: String },

    #[error("parameter '{name}' is a single value, expected a list")]
    ExpectedList { name: String },

    #[error("invalid parameter file: {reason}")]
    InvalidJson { reason: String },
}

/// Errors found when checking an aperture outline.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ProfileError {
    #[error("profile has no segments")]
    Empty,

    #[error("segment {index} does not start where the previous one ends (gap {gap:.3e} mm)")]
    Open { index: usize, gap: f64 },

    #[error("arc segment {index} is degenerate (collinear or coincident points)")]
    DegenerateArc { index: usize },

    #[error("segment {index} has zero length")]
    DegenerateLine { index: usize },

    #[error("a full {kind} must be the only segment of a profile")]
    MixedClosedCurve { kind: &'static str },

    #[error("{kind} has non-positive size {size}")]
    NonPositiveSize { kind: &'static str, size: f64 },
}
