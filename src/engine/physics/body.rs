use super::error::{ensure_finite_vec, ensure_mass, PhysicsError};
use glam::Vec2;

/// Handle to identify rigid bodies
///
/// Ids grow monotonically, so sorting by handle is sorting by creation order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct BodyHandle(pub(crate) u32);

impl BodyHandle {
    /// Raw id, stable for the lifetime of the world
    pub fn id(self) -> u32 {
        self.0
    }
}

/// Position of `handle` in a body list kept in creation order
pub(crate) fn index_of(bodies: &[RigidBody], handle: BodyHandle) -> Option<usize> {
    bodies.binary_search_by_key(&handle, |body| body.handle).ok()
}

/// Whether a body integrates under forces or stays put
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BodyKind {
    Dynamic,
    Static,
}

/// A point mass owned by the physics world
#[derive(Debug, Clone)]
pub struct RigidBody {
    pub(crate) handle: BodyHandle,
    kind: BodyKind,
    position: Vec2,
    velocity: Vec2,
    mass: f32,
    inv_mass: f32,
    /// Force accumulated for the current sub-step
    force: Vec2,
}

impl RigidBody {
    pub fn handle(&self) -> BodyHandle {
        self.handle
    }

    pub fn kind(&self) -> BodyKind {
        self.kind
    }

    pub fn is_dynamic(&self) -> bool {
        self.kind == BodyKind::Dynamic
    }

    pub fn position(&self) -> Vec2 {
        self.position
    }

    pub fn velocity(&self) -> Vec2 {
        self.velocity
    }

    /// Mass in simulation units (0 for static bodies)
    pub fn mass(&self) -> f32 {
        self.mass
    }

    /// Inverse mass (0 for static bodies)
    pub fn inv_mass(&self) -> f32 {
        self.inv_mass
    }

    /// Set the linear velocity. No-op on static bodies.
    pub fn set_velocity(&mut self, velocity: Vec2) {
        if self.is_dynamic() {
            self.velocity = velocity;
        }
    }

    /// Accumulate a force for the current sub-step. No-op on static bodies.
    pub fn apply_force(&mut self, force: Vec2) {
        if self.is_dynamic() {
            self.force += force;
        }
    }

    /// Instantaneous velocity change scaled by inverse mass
    pub fn apply_impulse(&mut self, impulse: Vec2) {
        self.velocity += impulse * self.inv_mass;
    }

    pub(crate) fn translate(&mut self, delta: Vec2) {
        if self.is_dynamic() {
            self.position += delta;
        }
    }

    pub(crate) fn clear_force(&mut self) {
        self.force = Vec2::ZERO;
    }

    #[cfg(test)]
    pub(crate) fn accumulated_force(&self) -> Vec2 {
        self.force
    }

    /// Semi-implicit Euler: velocity first, then position with the new velocity
    pub(crate) fn integrate(&mut self, gravity: Vec2, h: f32) {
        if !self.is_dynamic() {
            return;
        }
        self.velocity += (gravity + self.force * self.inv_mass) * h;
        self.position += self.velocity * h;
    }

    pub(crate) fn is_finite(&self) -> bool {
        self.position.is_finite() && self.velocity.is_finite()
    }
}

/// Builder for creating rigid bodies with common configurations
pub struct BodyBuilder {
    kind: BodyKind,
    position: Vec2,
    mass: f32,
}

impl BodyBuilder {
    /// Create a new dynamic body (affected by forces and collisions)
    pub fn new_dynamic(mass: f32) -> Self {
        Self {
            kind: BodyKind::Dynamic,
            position: Vec2::ZERO,
            mass,
        }
    }

    /// Create a new fixed (static) body (completely immovable)
    pub fn new_fixed() -> Self {
        Self {
            kind: BodyKind::Static,
            position: Vec2::ZERO,
            mass: 0.0,
        }
    }

    /// Set the initial position of the body
    pub fn position(mut self, x: f32, y: f32) -> Self {
        self.position = Vec2::new(x, y);
        self
    }

    /// Build the rigid body. The world assigns its handle on insertion.
    pub fn build(self) -> Result<RigidBody, PhysicsError> {
        ensure_finite_vec("body position", self.position)?;

        let (mass, inv_mass) = match self.kind {
            BodyKind::Dynamic => {
                ensure_mass("body mass", self.mass)?;
                (self.mass, 1.0 / self.mass)
            }
            BodyKind::Static => (0.0, 0.0),
        };

        Ok(RigidBody {
            handle: BodyHandle(u32::MAX),
            kind: self.kind,
            position: self.position,
            velocity: Vec2::ZERO,
            mass,
            inv_mass,
            force: Vec2::ZERO,
        })
    }
}

/// Common rigid body configurations for sandbox objects
pub mod presets {
    use super::*;

    /// A ball dropped into the sandbox or a soft body mass point
    pub fn ball_body(position: Vec2, mass: f32) -> Result<RigidBody, PhysicsError> {
        BodyBuilder::new_dynamic(mass)
            .position(position.x, position.y)
            .build()
    }

    /// A boundary wall (fixed/static)
    pub fn wall_body(position: Vec2) -> Result<RigidBody, PhysicsError> {
        BodyBuilder::new_fixed()
            .position(position.x, position.y)
            .build()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_body_builder_dynamic() {
        let body = BodyBuilder::new_dynamic(2.0)
            .position(10.0, 20.0)
            .build()
            .unwrap();

        assert_eq!(body.kind(), BodyKind::Dynamic);
        assert_eq!(body.position(), Vec2::new(10.0, 20.0));
        assert_eq!(body.velocity(), Vec2::ZERO);
        assert_eq!(body.inv_mass(), 0.5);
    }

    #[test]
    fn test_body_builder_rejects_bad_mass() {
        assert!(BodyBuilder::new_dynamic(0.0).build().is_err());
        assert!(BodyBuilder::new_dynamic(-3.0).build().is_err());
        assert!(BodyBuilder::new_dynamic(f32::NAN).build().is_err());
        // Positive, but its inverse is infinite
        assert!(matches!(
            BodyBuilder::new_dynamic(1e-40).build(),
            Err(PhysicsError::InvalidConfiguration(_))
        ));
    }

    #[test]
    fn test_body_builder_rejects_non_finite_position() {
        let result = BodyBuilder::new_fixed().position(f32::INFINITY, 0.0).build();
        assert!(matches!(result, Err(PhysicsError::InvalidConfiguration(_))));
    }

    #[test]
    fn test_static_body_ignores_forces() {
        let mut body = presets::wall_body(Vec2::new(1.0, 1.0)).unwrap();
        body.apply_force(Vec2::new(100.0, 100.0));
        body.apply_impulse(Vec2::new(100.0, 100.0));
        body.set_velocity(Vec2::new(5.0, 5.0));
        body.integrate(Vec2::new(0.0, 981.0), 0.1);

        assert_eq!(body.position(), Vec2::new(1.0, 1.0));
        assert_eq!(body.velocity(), Vec2::ZERO);
        assert_eq!(body.mass(), 0.0);
    }

    #[test]
    fn test_semi_implicit_euler() {
        let mut body = presets::ball_body(Vec2::new(0.0, 0.0), 2.0).unwrap();
        body.apply_force(Vec2::new(4.0, 0.0));
        body.integrate(Vec2::new(0.0, 10.0), 0.5);

        // v = (0 + (4/2) * 0.5, 0 + 10 * 0.5), x = v * 0.5
        assert_eq!(body.velocity(), Vec2::new(1.0, 5.0));
        assert_eq!(body.position(), Vec2::new(0.5, 2.5));
    }
}
