// Mass-spring physics: bodies, shapes, springs and the world that steps them

pub mod body;
mod collision;
mod debug;
mod error;
pub mod shape;
mod spring;
mod world;

pub use body::{BodyBuilder, BodyHandle, BodyKind, RigidBody};
pub use collision::{CollisionEvent, CollisionEventQueue};
pub use debug::{DebugGeometry, DebugVertex, RenderInstance};
pub use error::PhysicsError;
pub(crate) use error::{ensure_finite_vec, ensure_mass, ensure_non_negative, ensure_positive};
pub use shape::{Geometry, Shape, ShapeBuilder, ShapeHandle};
pub use spring::{DampedSpring, SpringHandle};
pub use world::{
    EvictionPolicy, PhysicsWorld, WorldSettings, DEFAULT_GRAVITY, DEFAULT_MAX_TRACKED_BALLS,
    WALL_THICKNESS,
};

// Re-export the vector type used across the public API
pub use glam::Vec2;
