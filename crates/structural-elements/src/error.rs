//! Error types for element assembly.
//!
//! Every failure in this crate is a caller contract violation: the element was
//! built for unsupported geometry, a load type has no residual routine, sizes
//! disagree, or a boundary condition lacks a field. None of them can be
//! retried; the driver aborts the whole step on the first one.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, ElementError>;

#[derive(Error, Debug)]
pub enum ElementError {
    #[error("Unsupported element dimension: {0} (expected 1, 2 or 3)")]
    UnsupportedDimension(usize),

    #[error("Invalid element geometry: {0}")]
    InvalidGeometry(String),

    #[error("Boundary condition type not implemented: {0}")]
    NotImplemented(String),

    #[error("Sensitivity state is not supported by structural elements")]
    SensitivityUnsupported,

    #[error("Follower forces are not implemented (request_jacobian = {request_jacobian})")]
    FollowerForces { request_jacobian: bool },

    #[error("Dimension mismatch in {context}: expected {expected}, got {found}")]
    DimensionMismatch {
        context: &'static str,
        expected: usize,
        found: usize,
    },

    #[error("Global DOF index {index} out of range for a vector of length {len}")]
    DofOutOfRange { index: usize, len: usize },

    #[error("Boundary condition has no field named '{0}'")]
    MissingField(String),

    #[error("Field '{name}' is not of type {expected}")]
    FieldTypeMismatch { name: String, expected: &'static str },

    #[error("Property card does not provide {0}")]
    MissingProperty(&'static str),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl ElementError {
    /// Whether the error signals a broken caller contract rather than a
    /// condition the caller could recover from. True for every variant.
    pub fn is_contract_violation(&self) -> bool {
        match self {
            ElementError::UnsupportedDimension(_)
            | ElementError::InvalidGeometry(_)
            | ElementError::NotImplemented(_)
            | ElementError::SensitivityUnsupported
            | ElementError::FollowerForces { .. }
            | ElementError::DimensionMismatch { .. }
            | ElementError::DofOutOfRange { .. }
            | ElementError::MissingField(_)
            | ElementError::FieldTypeMismatch { .. }
            | ElementError::MissingProperty(_)
            | ElementError::InvalidConfig(_)
            | ElementError::Json(_)
            | ElementError::Io(_) => true,
        }
    }

    pub(crate) fn check_len(context: &'static str, expected: usize, found: usize) -> Result<()> {
        if expected != found {
            return Err(ElementError::DimensionMismatch {
                context,
                expected,
                found,
            });
        }
        Ok(())
    }
}
