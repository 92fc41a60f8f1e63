use super::body::{index_of, presets as body_presets, BodyBuilder, BodyHandle, RigidBody};
use super::collision::{self, CollisionEvent, CollisionEventQueue};
use super::debug::RenderInstance;
use super::error::{ensure_finite_vec, ensure_positive, PhysicsError};
use super::shape::{presets as shape_presets, Shape, ShapeBuilder, ShapeHandle};
use super::spring::{DampedSpring, SpringHandle};
use glam::Vec2;
use serde::Deserialize;
use std::collections::VecDeque;

/// Default gravity in pixels per second squared (y grows downward)
pub const DEFAULT_GRAVITY: Vec2 = Vec2::new(0.0, 981.0);

/// Default cap on the recent-spawns list
pub const DEFAULT_MAX_TRACKED_BALLS: usize = 10;

/// Wall thickness used by `add_boundaries`
pub const WALL_THICKNESS: f32 = 20.0;

/// What happens to a spawned ball once it falls off the recent-spawns list
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
pub enum EvictionPolicy {
    /// Drop the ball's body, shape and springs from the world as well
    #[default]
    #[serde(rename = "remove")]
    RemoveFromWorld,

    /// Only stop tracking; the ball keeps simulating forever
    #[serde(rename = "track-only")]
    TrackOnly,
}

/// Global parameters of a physics world
#[derive(Debug, Clone, PartialEq)]
pub struct WorldSettings {
    pub gravity: Vec2,
    /// Equal slices each `step(dt)` is split into
    pub substeps: u32,
    pub max_tracked_balls: usize,
    pub eviction: EvictionPolicy,
}

impl Default for WorldSettings {
    fn default() -> Self {
        Self {
            gravity: DEFAULT_GRAVITY,
            substeps: 1,
            max_tracked_balls: DEFAULT_MAX_TRACKED_BALLS,
            eviction: EvictionPolicy::default(),
        }
    }
}

impl WorldSettings {
    pub fn validate(&self) -> Result<(), PhysicsError> {
        ensure_finite_vec("gravity", self.gravity)?;
        if self.substeps == 0 {
            return Err(PhysicsError::invalid("substeps must be at least 1"));
        }
        if self.max_tracked_balls == 0 {
            return Err(PhysicsError::invalid("max tracked balls must be at least 1"));
        }
        Ok(())
    }
}

/// Bounded FIFO of recently spawned balls
#[derive(Debug)]
struct SpawnTracker {
    balls: VecDeque<ShapeHandle>,
    capacity: usize,
}

impl SpawnTracker {
    fn new(capacity: usize) -> Self {
        Self {
            balls: VecDeque::new(),
            capacity,
        }
    }

    /// Track a new ball, returning the oldest one if the cap was exceeded
    fn push(&mut self, ball: ShapeHandle) -> Option<ShapeHandle> {
        self.balls.push_back(ball);
        if self.balls.len() > self.capacity {
            self.balls.pop_front()
        } else {
            None
        }
    }

    fn forget(&mut self, removed: &[ShapeHandle]) {
        self.balls.retain(|ball| !removed.contains(ball));
    }
}

/// Physics world that owns every body, shape and spring and advances them in time
///
/// Bodies, shapes and springs are kept in creation order; every pass of `step`
/// walks them in that order so runs are reproducible.
pub struct PhysicsWorld {
    settings: WorldSettings,

    /// Rigid bodies, sorted by handle
    bodies: Vec<RigidBody>,

    /// Shapes, sorted by handle
    shapes: Vec<Shape>,

    /// Springs, sorted by handle
    springs: Vec<DampedSpring>,

    /// Collision event handler
    collision_event_queue: CollisionEventQueue,

    spawned: SpawnTracker,

    next_body_id: u32,
    next_shape_id: u32,
    next_spring_id: u32,

    step_count: u64,

    /// Springs skipped for zero length during the last step
    degenerate_springs: usize,

    /// Set once a step fails; no further stepping is allowed
    halted: bool,
}

impl PhysicsWorld {
    /// Create a new physics world with default settings
    pub fn new() -> Self {
        let settings = WorldSettings::default();
        let spawned = SpawnTracker::new(settings.max_tracked_balls);
        Self {
            settings,
            bodies: Vec::new(),
            shapes: Vec::new(),
            springs: Vec::new(),
            collision_event_queue: CollisionEventQueue::new(),
            spawned,
            next_body_id: 0,
            next_shape_id: 0,
            next_spring_id: 0,
            step_count: 0,
            degenerate_springs: 0,
            halted: false,
        }
    }

    /// Create a new physics world with custom settings
    pub fn with_settings(settings: WorldSettings) -> Result<Self, PhysicsError> {
        settings.validate()?;
        let mut world = Self::new();
        world.spawned = SpawnTracker::new(settings.max_tracked_balls);
        world.settings = settings;
        Ok(world)
    }

    /// Advance the simulation by `dt` seconds
    ///
    /// Per sub-step: zero forces, apply springs, integrate (semi-implicit
    /// Euler), then detect and resolve contacts. Any failure halts the world.
    pub fn step(&mut self, dt: f32) -> Result<(), PhysicsError> {
        if self.halted {
            return Err(PhysicsError::Halted);
        }
        if !dt.is_finite() || dt <= 0.0 {
            self.halted = true;
            return Err(PhysicsError::invalid(format!(
                "time step must be positive and finite, got {dt}"
            )));
        }

        self.collision_event_queue.clear();

        let gravity = self.settings.gravity;
        let h = dt / self.settings.substeps as f32;
        let mut degenerate = 0;

        for _ in 0..self.settings.substeps {
            for body in &mut self.bodies {
                body.clear_force();
            }

            degenerate = degenerate.max(self.apply_spring_forces());

            for body in &mut self.bodies {
                body.integrate(gravity, h);
            }

            let contacts = collision::find_contacts(&self.bodies, &self.shapes);
            for contact in &contacts {
                collision::resolve_contact(&mut self.bodies, contact);
            }
            self.collision_event_queue.record(&contacts);
        }

        if let Some(body) = self.bodies.iter().find(|body| !body.is_finite()) {
            let handle = body.handle();
            self.halted = true;
            log::error!("Body {:?} reached a non-finite state, halting", handle);
            return Err(PhysicsError::NonFiniteState(handle));
        }

        if degenerate != self.degenerate_springs {
            if degenerate > 0 {
                log::warn!("{} spring(s) have zero length and are skipped", degenerate);
            } else {
                log::debug!("No zero-length springs left");
            }
            self.degenerate_springs = degenerate;
        }

        self.step_count += 1;
        Ok(())
    }

    /// Apply every spring's force, returning how many were skipped for zero length
    fn apply_spring_forces(&mut self) -> usize {
        let mut degenerate = 0;
        for spring in &self.springs {
            let (a, b) = spring.bodies();
            let (Some(ia), Some(ib)) = (index_of(&self.bodies, a), index_of(&self.bodies, b))
            else {
                continue;
            };

            let body_a = &self.bodies[ia];
            let body_b = &self.bodies[ib];
            let force = spring.force_on_b(
                body_a.position(),
                body_a.velocity(),
                body_b.position(),
                body_b.velocity(),
            );

            match force {
                Some(force) => {
                    self.bodies[ia].apply_force(-force);
                    self.bodies[ib].apply_force(force);
                }
                None => degenerate += 1,
            }
        }
        degenerate
    }

    /// Add a rigid body to the physics world
    pub fn add_rigid_body(&mut self, mut body: RigidBody) -> BodyHandle {
        let handle = BodyHandle(self.next_body_id);
        self.next_body_id += 1;
        body.handle = handle;
        self.bodies.push(body);
        handle
    }

    /// Add a shape attached to a live body
    pub fn add_shape(
        &mut self,
        builder: ShapeBuilder,
        body: BodyHandle,
    ) -> Result<ShapeHandle, PhysicsError> {
        if self.body(body).is_none() {
            return Err(PhysicsError::UnknownBody(body));
        }
        let mut shape = builder.build(body)?;
        let handle = ShapeHandle(self.next_shape_id);
        self.next_shape_id += 1;
        shape.handle = handle;
        self.shapes.push(shape);
        Ok(handle)
    }

    /// Add a spring between two live bodies
    pub fn add_spring(&mut self, mut spring: DampedSpring) -> Result<SpringHandle, PhysicsError> {
        let (a, b) = spring.bodies();
        for body in [a, b] {
            if self.body(body).is_none() {
                return Err(PhysicsError::UnknownBody(body));
            }
        }
        let handle = SpringHandle(self.next_spring_id);
        self.next_spring_id += 1;
        spring.handle = handle;
        self.springs.push(spring);
        Ok(handle)
    }

    pub fn create_dynamic_body(
        &mut self,
        position: Vec2,
        mass: f32,
    ) -> Result<BodyHandle, PhysicsError> {
        let body = BodyBuilder::new_dynamic(mass)
            .position(position.x, position.y)
            .build()?;
        Ok(self.add_rigid_body(body))
    }

    pub fn create_static_body(&mut self, position: Vec2) -> Result<BodyHandle, PhysicsError> {
        let body = BodyBuilder::new_fixed()
            .position(position.x, position.y)
            .build()?;
        Ok(self.add_rigid_body(body))
    }

    pub fn attach_circle(
        &mut self,
        body: BodyHandle,
        radius: f32,
        elasticity: f32,
        friction: f32,
    ) -> Result<ShapeHandle, PhysicsError> {
        let builder = ShapeBuilder::circle(radius)
            .elasticity(elasticity)
            .friction(friction);
        self.add_shape(builder, body)
    }

    /// Attach an axis-aligned box described by its half-extents
    pub fn attach_polygon(
        &mut self,
        body: BodyHandle,
        half_extents: Vec2,
        elasticity: f32,
        friction: f32,
    ) -> Result<ShapeHandle, PhysicsError> {
        let builder = ShapeBuilder::box_shape(half_extents.x, half_extents.y)
            .elasticity(elasticity)
            .friction(friction);
        self.add_shape(builder, body)
    }

    pub fn create_spring(
        &mut self,
        body_a: BodyHandle,
        body_b: BodyHandle,
        rest_length: f32,
        stiffness: f32,
        damping: f32,
    ) -> Result<SpringHandle, PhysicsError> {
        let spring = DampedSpring::new(body_a, body_b, rest_length, stiffness, damping)?;
        self.add_spring(spring)
    }

    /// Remove a rigid body together with its shapes and every spring touching it
    pub fn remove_body(&mut self, handle: BodyHandle) -> bool {
        let Some(index) = index_of(&self.bodies, handle) else {
            return false;
        };
        self.bodies.remove(index);

        let removed: Vec<ShapeHandle> = self
            .shapes
            .iter()
            .filter(|shape| shape.body() == handle)
            .map(|shape| shape.handle())
            .collect();
        self.shapes.retain(|shape| shape.body() != handle);
        self.springs.retain(|spring| !spring.connects(handle));
        self.collision_event_queue.forget(&removed);
        self.spawned.forget(&removed);

        true
    }

    /// Close the area `[0, width] x [0, height]` with four static walls
    ///
    /// Walls are `WALL_THICKNESS` thick and sit flush with the edges. Calling
    /// this twice adds a second set of walls.
    pub fn add_boundaries(
        &mut self,
        width: f32,
        height: f32,
    ) -> Result<Vec<ShapeHandle>, PhysicsError> {
        ensure_positive("boundary width", width)?;
        ensure_positive("boundary height", height)?;

        let half = WALL_THICKNESS / 2.0;
        let walls = [
            // Along y = height, the floor under the default gravity
            (
                Vec2::new(width / 2.0, height - half),
                Vec2::new(width, WALL_THICKNESS),
            ),
            // Along y = 0
            (Vec2::new(width / 2.0, half), Vec2::new(width, WALL_THICKNESS)),
            // Left
            (Vec2::new(half, height / 2.0), Vec2::new(WALL_THICKNESS, height)),
            // Right
            (
                Vec2::new(width - half, height / 2.0),
                Vec2::new(WALL_THICKNESS, height),
            ),
        ];

        let mut handles = Vec::with_capacity(walls.len());
        for (position, size) in walls {
            let body = self.add_rigid_body(body_presets::wall_body(position)?);
            handles.push(self.add_shape(shape_presets::wall_shape(size), body)?);
        }

        log::info!("Added boundaries for a {}x{} area", width, height);
        Ok(handles)
    }

    /// Drop a bouncy ball into the world and track it as a recent spawn
    ///
    /// When the recent-spawns list overflows, the oldest ball is evicted
    /// according to the world's `EvictionPolicy`.
    pub fn spawn_ball(
        &mut self,
        position: Vec2,
        radius: f32,
        mass: f32,
    ) -> Result<ShapeHandle, PhysicsError> {
        ensure_positive("ball radius", radius)?;
        let body = self.add_rigid_body(body_presets::ball_body(position, mass)?);
        let shape = self.add_shape(shape_presets::ball_shape(radius), body)?;

        if let Some(evicted) = self.spawned.push(shape) {
            match self.settings.eviction {
                EvictionPolicy::RemoveFromWorld => {
                    if let Some(owner) = self.shape(evicted).map(Shape::body) {
                        self.remove_body(owner);
                    }
                    log::debug!("Evicted ball {:?} and removed it from the world", evicted);
                }
                EvictionPolicy::TrackOnly => {
                    log::debug!("Stopped tracking ball {:?}", evicted);
                }
            }
        }

        Ok(shape)
    }

    /// Recently spawned balls, oldest first
    pub fn tracked_balls(&self) -> impl Iterator<Item = ShapeHandle> + '_ {
        self.spawned.balls.iter().copied()
    }

    pub fn tracked_ball_count(&self) -> usize {
        self.spawned.balls.len()
    }

    /// Read-only snapshot of every shape for the renderer, in creation order
    pub fn render_snapshot(&self) -> Vec<RenderInstance> {
        self.shapes
            .iter()
            .filter_map(|shape| {
                let body = self.body(shape.body())?;
                Some(RenderInstance::new(body, shape))
            })
            .collect()
    }

    /// Get a reference to a rigid body
    pub fn body(&self, handle: BodyHandle) -> Option<&RigidBody> {
        index_of(&self.bodies, handle).map(|index| &self.bodies[index])
    }

    /// Get a mutable reference to a rigid body
    pub fn body_mut(&mut self, handle: BodyHandle) -> Option<&mut RigidBody> {
        let index = index_of(&self.bodies, handle)?;
        Some(&mut self.bodies[index])
    }

    /// Get a reference to a shape
    pub fn shape(&self, handle: ShapeHandle) -> Option<&Shape> {
        self.shapes
            .binary_search_by_key(&handle, Shape::handle)
            .ok()
            .map(|index| &self.shapes[index])
    }

    pub fn spring(&self, handle: SpringHandle) -> Option<&DampedSpring> {
        self.springs
            .binary_search_by_key(&handle, DampedSpring::handle)
            .ok()
            .map(|index| &self.springs[index])
    }

    pub fn bodies(&self) -> &[RigidBody] {
        &self.bodies
    }

    pub fn shapes(&self) -> &[Shape] {
        &self.shapes
    }

    pub fn springs(&self) -> &[DampedSpring] {
        &self.springs
    }

    /// Get all collision events from the last step
    pub fn collision_events(&self) -> &[CollisionEvent] {
        self.collision_event_queue.events()
    }

    /// Set gravity for the physics world
    pub fn set_gravity(&mut self, gravity: Vec2) -> Result<(), PhysicsError> {
        ensure_finite_vec("gravity", gravity)?;
        self.settings.gravity = gravity;
        Ok(())
    }

    /// Get current gravity
    pub fn gravity(&self) -> Vec2 {
        self.settings.gravity
    }

    pub fn settings(&self) -> &WorldSettings {
        &self.settings
    }

    /// Number of successful steps so far
    pub fn step_count(&self) -> u64 {
        self.step_count
    }

    /// Springs skipped for zero length during the last step
    pub fn degenerate_spring_count(&self) -> usize {
        self.degenerate_springs
    }

    pub fn is_halted(&self) -> bool {
        self.halted
    }
}

impl Default for PhysicsWorld {
    fn default() -> Self {
        Self::new()
    }
}
