use super::body::{index_of, RigidBody};
use super::shape::{Geometry, Shape, ShapeHandle};
use crate::core::math::{mix_coefficients, pair_mut};
use glam::Vec2;
use parry2d::bounding_volume::{Aabb, BoundingVolume};
use parry2d::math::{Isometry, Vector};
use parry2d::query;
use parry2d::shape::{Ball, Cuboid, Shape as ParryShape};
use std::collections::HashSet;

/// Penetration tolerated before positional correction kicks in
const PENETRATION_SLOP: f32 = 0.01;

/// Fraction of the remaining penetration removed per resolution
const CORRECTION_PERCENT: f32 = 0.8;

/// Custom collision event for sandbox logic
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CollisionEvent {
    /// Two shapes started touching
    Started {
        shape1: ShapeHandle,
        shape2: ShapeHandle,
    },

    /// Two shapes stopped touching
    Stopped {
        shape1: ShapeHandle,
        shape2: ShapeHandle,
    },
}

/// One touching shape pair found by the narrow phase
#[derive(Debug, Clone, Copy)]
pub(crate) struct Contact {
    pub shape1: ShapeHandle,
    pub shape2: ShapeHandle,
    pub body1: usize,
    pub body2: usize,
    /// Unit normal pointing from shape1 towards shape2
    pub normal: Vec2,
    /// Penetration depth (0 when just touching)
    pub depth: f32,
    pub elasticity: f32,
    pub friction: f32,
}

/// parry2d view of a shape placed at its body's position
struct Proxy {
    shape: ShapeHandle,
    body: usize,
    collider: Collider,
    isometry: Isometry<f32>,
    aabb: Aabb,
    elasticity: f32,
    friction: f32,
}

enum Collider {
    Ball(Ball),
    Cuboid(Cuboid),
}

impl Collider {
    fn from_geometry(geometry: Geometry) -> Self {
        match geometry {
            Geometry::Circle { radius } => Collider::Ball(Ball::new(radius)),
            Geometry::Polygon { half_extents } => {
                Collider::Cuboid(Cuboid::new(Vector::new(half_extents.x, half_extents.y)))
            }
        }
    }

    fn as_shape(&self) -> &dyn ParryShape {
        match self {
            Collider::Ball(ball) => ball,
            Collider::Cuboid(cuboid) => cuboid,
        }
    }
}

fn build_proxies(bodies: &[RigidBody], shapes: &[Shape]) -> Vec<Proxy> {
    shapes
        .iter()
        .filter_map(|shape| {
            let body = index_of(bodies, shape.body())?;
            let position = bodies[body].position();
            let isometry = Isometry::translation(position.x, position.y);
            let collider = Collider::from_geometry(shape.geometry());
            let aabb = collider.as_shape().compute_aabb(&isometry);
            Some(Proxy {
                shape: shape.handle(),
                body,
                collider,
                isometry,
                aabb,
                elasticity: shape.elasticity(),
                friction: shape.friction(),
            })
        })
        .collect()
}

/// Broad phase (AABB overlap) then narrow phase (parry contact) over every
/// shape pair, in creation order.
///
/// Pairs on the same body and pairs where neither body can move are skipped.
pub(crate) fn find_contacts(bodies: &[RigidBody], shapes: &[Shape]) -> Vec<Contact> {
    let proxies = build_proxies(bodies, shapes);
    let mut contacts = Vec::new();

    for (i, p1) in proxies.iter().enumerate() {
        for p2 in &proxies[i + 1..] {
            if p1.body == p2.body {
                continue;
            }
            if bodies[p1.body].inv_mass() + bodies[p2.body].inv_mass() <= 0.0 {
                continue;
            }
            if !p1.aabb.intersects(&p2.aabb) {
                continue;
            }

            let result = query::contact(
                &p1.isometry,
                p1.collider.as_shape(),
                &p2.isometry,
                p2.collider.as_shape(),
                0.0,
            );
            let contact = match result {
                Ok(Some(contact)) => contact,
                Ok(None) => continue,
                Err(_) => {
                    log::debug!("Unsupported shape pair {:?}/{:?}", p1.shape, p2.shape);
                    continue;
                }
            };

            let normal = Vec2::new(contact.normal1.x, contact.normal1.y);
            if !normal.is_finite() {
                continue;
            }

            contacts.push(Contact {
                shape1: p1.shape,
                shape2: p2.shape,
                body1: p1.body,
                body2: p2.body,
                normal,
                depth: (-contact.dist).max(0.0),
                elasticity: mix_coefficients(p1.elasticity, p2.elasticity),
                friction: mix_coefficients(p1.friction, p2.friction),
            });
        }
    }

    contacts
}

/// Separate the pair and apply restitution and Coulomb friction impulses
pub(crate) fn resolve_contact(bodies: &mut [RigidBody], contact: &Contact) {
    let (a, b) = pair_mut(bodies, contact.body1, contact.body2);
    let inv_a = a.inv_mass();
    let inv_b = b.inv_mass();
    let inv_sum = inv_a + inv_b;
    if inv_sum <= 0.0 {
        return;
    }
    let n = contact.normal;

    let correction = (contact.depth - PENETRATION_SLOP).max(0.0) * CORRECTION_PERCENT / inv_sum;
    if correction > 0.0 {
        a.translate(-n * correction * inv_a);
        b.translate(n * correction * inv_b);
    }

    let relative = b.velocity() - a.velocity();
    let normal_speed = relative.dot(n);
    if normal_speed >= 0.0 {
        // Already separating
        return;
    }

    let jn = -(1.0 + contact.elasticity) * normal_speed / inv_sum;
    a.apply_impulse(-n * jn);
    b.apply_impulse(n * jn);

    let relative = b.velocity() - a.velocity();
    let tangent = relative - n * relative.dot(n);
    let tangent_speed = tangent.length();
    if tangent_speed < 1e-6 {
        return;
    }
    let t = tangent / tangent_speed;
    let max_friction = (contact.friction * jn).max(0.0);
    let jt = (-relative.dot(t) / inv_sum).clamp(-max_friction, max_friction);
    a.apply_impulse(-t * jt);
    b.apply_impulse(t * jt);
}

/// Queue for storing collision events during a physics step
///
/// Remembers which pairs touched at the end of the previous resolution pass so
/// only transitions become events.
#[derive(Debug, Default)]
pub struct CollisionEventQueue {
    events: Vec<CollisionEvent>,
    touching: HashSet<(ShapeHandle, ShapeHandle)>,
}

impl CollisionEventQueue {
    pub fn new() -> Self {
        Self {
            events: Vec::with_capacity(32),
            touching: HashSet::new(),
        }
    }

    /// Clear all events (call at start of physics step)
    pub fn clear(&mut self) {
        self.events.clear();
    }

    /// Get all collision events from this step
    pub fn events(&self) -> &[CollisionEvent] {
        &self.events
    }

    /// Number of shape pairs currently in contact
    pub fn touching_count(&self) -> usize {
        self.touching.len()
    }

    /// Diff this pass's contacts against the previous one
    pub(crate) fn record(&mut self, contacts: &[Contact]) {
        let current: HashSet<(ShapeHandle, ShapeHandle)> =
            contacts.iter().map(|c| (c.shape1, c.shape2)).collect();

        for c in contacts {
            if !self.touching.contains(&(c.shape1, c.shape2)) {
                self.events.push(CollisionEvent::Started {
                    shape1: c.shape1,
                    shape2: c.shape2,
                });
            }
        }

        // Sorted so event order does not depend on hash order
        let mut stopped: Vec<_> = self.touching.difference(&current).copied().collect();
        stopped.sort();
        for (shape1, shape2) in stopped {
            self.events.push(CollisionEvent::Stopped { shape1, shape2 });
        }

        self.touching = current;
    }

    /// Forget pairs involving removed shapes without emitting events
    pub(crate) fn forget(&mut self, removed: &[ShapeHandle]) {
        self.touching
            .retain(|(s1, s2)| !removed.contains(s1) && !removed.contains(s2));
    }
}
