// Damped springs between two bodies

use super::body::BodyHandle;
use super::error::{ensure_non_negative, ensure_positive, PhysicsError};
use glam::Vec2;

/// Below this length the spring axis is undefined
pub const DEGENERATE_LENGTH: f32 = 1e-6;

/// Handle to identify springs
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SpringHandle(pub(crate) u32);

impl SpringHandle {
    pub fn id(self) -> u32 {
        self.0
    }
}

/// Hooke spring with velocity damping along its axis
///
/// The endpoints are handles into the world; the spring never owns them and is
/// dropped together with either body.
#[derive(Debug, Clone)]
pub struct DampedSpring {
    pub(crate) handle: SpringHandle,
    body_a: BodyHandle,
    body_b: BodyHandle,
    rest_length: f32,
    stiffness: f32,
    damping: f32,
}

impl DampedSpring {
    pub fn new(
        body_a: BodyHandle,
        body_b: BodyHandle,
        rest_length: f32,
        stiffness: f32,
        damping: f32,
    ) -> Result<Self, PhysicsError> {
        if body_a == body_b {
            return Err(PhysicsError::invalid(format!(
                "spring cannot connect {body_a:?} to itself"
            )));
        }
        ensure_positive("spring rest length", rest_length)?;
        ensure_non_negative("spring stiffness", stiffness)?;
        ensure_non_negative("spring damping", damping)?;

        Ok(Self {
            handle: SpringHandle(u32::MAX),
            body_a,
            body_b,
            rest_length,
            stiffness,
            damping,
        })
    }

    pub fn handle(&self) -> SpringHandle {
        self.handle
    }

    pub fn bodies(&self) -> (BodyHandle, BodyHandle) {
        (self.body_a, self.body_b)
    }

    pub fn connects(&self, body: BodyHandle) -> bool {
        self.body_a == body || self.body_b == body
    }

    pub fn rest_length(&self) -> f32 {
        self.rest_length
    }

    pub fn stiffness(&self) -> f32 {
        self.stiffness
    }

    pub fn damping(&self) -> f32 {
        self.damping
    }

    /// Force acting on body B; body A receives the negation.
    ///
    /// `F = -k (L - L0) dir - c ((vB - vA) . dir) dir`, with `dir` pointing from
    /// A to B. Returns `None` when the endpoints coincide.
    pub fn force_on_b(&self, pos_a: Vec2, vel_a: Vec2, pos_b: Vec2, vel_b: Vec2) -> Option<Vec2> {
        let delta = pos_b - pos_a;
        let length = delta.length();
        if length < DEGENERATE_LENGTH {
            return None;
        }

        let dir = delta / length;
        let stretch = length - self.rest_length;
        let closing_speed = (vel_b - vel_a).dot(dir);

        Some(-self.stiffness * stretch * dir - self.damping * closing_speed * dir)
    }
}
