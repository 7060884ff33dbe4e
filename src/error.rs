//! Errors raised while building shapes and bodies.

use bevy::prelude::*;
use thiserror::Error;

/// Invalid input to a shape or body constructor.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum BodyError {
    /// A radius, width or height that is zero, negative, NaN or infinite.
    #[error("{dimension} must be positive and finite, got {value}")]
    InvalidExtent {
        /// Which extent was rejected.
        dimension: &'static str,
        /// The rejected value.
        value: f32,
    },

    #[error("density must be non-negative and finite, got {0}")]
    InvalidDensity(f32),

    #[error("position must be finite, got {0}")]
    NonFinitePosition(Vec2),

    #[error("angle must be finite, got {0}")]
    NonFiniteAngle(f32),
}

pub(crate) fn check_extent(dimension: &'static str, value: f32) -> Result<f32, BodyError> {
    if value.is_finite() && value > 0. {
        Ok(value)
    } else {
        Err(BodyError::InvalidExtent { dimension, value })
    }
}

pub(crate) fn check_placement(position: Vec2, angle: f32) -> Result<(), BodyError> {
    if !position.is_finite() {
        return Err(BodyError::NonFinitePosition(position));
    }
    if !angle.is_finite() {
        return Err(BodyError::NonFiniteAngle(angle));
    }
    Ok(())
}
