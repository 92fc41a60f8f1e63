use super::body::BodyHandle;
use super::error::{ensure_positive, PhysicsError};
use glam::Vec2;

/// Handle to identify shapes (colliders)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ShapeHandle(pub(crate) u32);

impl ShapeHandle {
    pub fn id(self) -> u32 {
        self.0
    }
}

/// Collision geometry, centred on the owning body
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Geometry {
    Circle { radius: f32 },
    /// Axis-aligned box
    Polygon { half_extents: Vec2 },
}

impl Geometry {
    /// Half-size of the axis-aligned bounds around the body position
    pub fn half_extents(&self) -> Vec2 {
        match *self {
            Geometry::Circle { radius } => Vec2::splat(radius),
            Geometry::Polygon { half_extents } => half_extents,
        }
    }
}

/// A collider attached to a body; lives exactly as long as that body
#[derive(Debug, Clone)]
pub struct Shape {
    pub(crate) handle: ShapeHandle,
    body: BodyHandle,
    geometry: Geometry,
    elasticity: f32,
    friction: f32,
}

impl Shape {
    pub fn handle(&self) -> ShapeHandle {
        self.handle
    }

    pub fn body(&self) -> BodyHandle {
        self.body
    }

    pub fn geometry(&self) -> Geometry {
        self.geometry
    }

    pub fn elasticity(&self) -> f32 {
        self.elasticity
    }

    pub fn friction(&self) -> f32 {
        self.friction
    }
}

/// Builder for creating shapes with common configurations
pub struct ShapeBuilder {
    geometry: Geometry,
    elasticity: f32,
    friction: f32,
}

impl ShapeBuilder {
    /// Create a circle-shaped collider
    pub fn circle(radius: f32) -> Self {
        Self {
            geometry: Geometry::Circle { radius },
            elasticity: 0.0,
            friction: 0.5,
        }
    }

    /// Create a box-shaped collider
    pub fn box_shape(half_width: f32, half_height: f32) -> Self {
        Self {
            geometry: Geometry::Polygon {
                half_extents: Vec2::new(half_width, half_height),
            },
            elasticity: 0.0,
            friction: 0.5,
        }
    }

    /// Set elasticity/bounciness (0.0 = no bounce, 1.0 = perfect bounce)
    ///
    /// Not clamped: values outside [0, 1] are allowed and simply look odd.
    pub fn elasticity(mut self, elasticity: f32) -> Self {
        self.elasticity = elasticity;
        self
    }

    /// Set friction coefficient (0.0 = no friction, 1.0 = high friction)
    pub fn friction(mut self, friction: f32) -> Self {
        self.friction = friction;
        self
    }

    /// Build the shape for `body`. The world assigns its handle on insertion.
    pub fn build(self, body: BodyHandle) -> Result<Shape, PhysicsError> {
        match self.geometry {
            Geometry::Circle { radius } => ensure_positive("circle radius", radius)?,
            Geometry::Polygon { half_extents } => {
                ensure_positive("box half width", half_extents.x)?;
                ensure_positive("box half height", half_extents.y)?;
            }
        }

        Ok(Shape {
            handle: ShapeHandle(u32::MAX),
            body,
            geometry: self.geometry,
            elasticity: self.elasticity,
            friction: self.friction,
        })
    }
}

/// Material presets used by the sandbox
pub mod presets {
    use super::*;

    pub const BALL_ELASTICITY: f32 = 0.9;
    pub const BALL_FRICTION: f32 = 1.0;
    pub const WALL_ELASTICITY: f32 = 0.4;
    pub const WALL_FRICTION: f32 = 0.5;

    /// Bouncy, grippy ball (spawned balls and soft body mass points)
    pub fn ball_shape(radius: f32) -> ShapeBuilder {
        ShapeBuilder::circle(radius)
            .elasticity(BALL_ELASTICITY)
            .friction(BALL_FRICTION)
    }

    /// Boundary wall of the given full size
    pub fn wall_shape(size: Vec2) -> ShapeBuilder {
        ShapeBuilder::box_shape(size.x / 2.0, size.y / 2.0)
            .elasticity(WALL_ELASTICITY)
            .friction(WALL_FRICTION)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_shape_builder_box() {
        let shape = ShapeBuilder::box_shape(1.0, 2.0)
            .friction(0.3)
            .build(BodyHandle(0))
            .unwrap();

        assert_eq!(shape.friction(), 0.3);
        assert_eq!(shape.body(), BodyHandle(0));
        assert_eq!(shape.geometry().half_extents(), Vec2::new(1.0, 2.0));
    }

    #[test]
    fn test_shape_builder_rejects_degenerate_geometry() {
        assert!(ShapeBuilder::circle(0.0).build(BodyHandle(0)).is_err());
        assert!(ShapeBuilder::box_shape(1.0, -1.0).build(BodyHandle(0)).is_err());
    }

    #[test]
    fn test_out_of_range_material_is_accepted() {
        let shape = ShapeBuilder::circle(1.0)
            .elasticity(1.5)
            .friction(-0.2)
            .build(BodyHandle(3))
            .unwrap();
        assert_eq!(shape.elasticity(), 1.5);
        assert_eq!(shape.friction(), -0.2);
    }

    #[test]
    fn test_wall_preset() {
        let wall = presets::wall_shape(Vec2::new(800.0, 20.0))
            .build(BodyHandle(1))
            .unwrap();
        assert_eq!(
            wall.geometry(),
            Geometry::Polygon {
                half_extents: Vec2::new(400.0, 10.0)
            }
        );
        assert_eq!(wall.elasticity(), 0.4);
        assert_eq!(wall.friction(), 0.5);
    }
}
