// Physics error taxonomy

use super::body::BodyHandle;

/// Errors raised by the physics world and the soft body generator
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum PhysicsError {
    /// A physical parameter is non-finite, negative where it must not be, or a
    /// dimension is empty. Fatal: the simulation must not step with it.
    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),

    #[error("Unknown body: {0:?}")]
    UnknownBody(BodyHandle),

    /// Integration produced NaN or infinity for a body
    #[error("Non-finite state on body {0:?}")]
    NonFiniteState(BodyHandle),

    #[error("World is halted after a previous failure")]
    Halted,
}

impl PhysicsError {
    pub(crate) fn invalid(message: impl Into<String>) -> Self {
        Self::InvalidConfiguration(message.into())
    }
}

/// Fail with `InvalidConfiguration` unless `value` is finite and strictly positive
pub(crate) fn ensure_positive(name: &str, value: f32) -> Result<(), PhysicsError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(PhysicsError::invalid(format!(
            "{name} must be positive and finite, got {value}"
        )))
    }
}

/// Fail with `InvalidConfiguration` unless `value` is finite and not negative
pub(crate) fn ensure_non_negative(name: &str, value: f32) -> Result<(), PhysicsError> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(PhysicsError::invalid(format!(
            "{name} must be non-negative and finite, got {value}"
        )))
    }
}

/// Like `ensure_positive`, but also rejects masses too small to invert
pub(crate) fn ensure_mass(name: &str, value: f32) -> Result<(), PhysicsError> {
    ensure_positive(name, value)?;
    if (1.0 / value).is_finite() {
        Ok(())
    } else {
        Err(PhysicsError::invalid(format!(
            "{name} is too small to invert, got {value}"
        )))
    }
}

pub(crate) fn ensure_finite_vec(name: &str, value: glam::Vec2) -> Result<(), PhysicsError> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(PhysicsError::invalid(format!(
            "{name} must be finite, got ({}, {})",
            value.x, value.y
        )))
    }
}
