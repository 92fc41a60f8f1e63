// The soft-body sandbox: a walled world, one soft body and user-spawned balls

use super::config::SimulationConfig;
use super::softbody::SoftBody;
use crate::engine::input::InputEvent;
use crate::engine::physics::{PhysicsError, PhysicsWorld, ShapeHandle};
use glam::Vec2;

/// Owns the physics world and reacts to input between steps
pub struct Sandbox {
    world: PhysicsWorld,
    soft_body: SoftBody,
    walls: Vec<ShapeHandle>,
    spawn_radius: f32,
    spawn_mass: f32,
    time_step: f32,
    running: bool,
}

impl Sandbox {
    /// Build the world described by `config`: boundaries first, then the soft body
    pub fn new(config: &SimulationConfig) -> Result<Self, PhysicsError> {
        config.validate()?;

        let mut world = PhysicsWorld::with_settings(config.physics.world_settings())?;
        let walls = world.add_boundaries(config.window.width, config.window.height)?;
        let soft_body = SoftBody::new(&mut world, config.soft_body.clone())?;

        log::info!(
            "Sandbox ready: {} bodies, {} shapes, {} springs",
            world.bodies().len(),
            world.shapes().len(),
            world.springs().len()
        );

        Ok(Self {
            world,
            soft_body,
            walls,
            spawn_radius: config.spawn.radius,
            spawn_mass: config.spawn.mass,
            time_step: config.time_step(),
            running: true,
        })
    }

    /// Apply one input event; its effect is visible to the next step
    pub fn handle_event(&mut self, event: InputEvent) -> Result<(), PhysicsError> {
        match event {
            InputEvent::Quit => {
                log::info!("Quit requested");
                self.running = false;
            }
            InputEvent::SpawnBallAt(position) => {
                self.spawn_ball(position)?;
            }
        }
        Ok(())
    }

    /// Drop a ball with the configured radius and mass
    pub fn spawn_ball(&mut self, position: Vec2) -> Result<ShapeHandle, PhysicsError> {
        let ball = self
            .world
            .spawn_ball(position, self.spawn_radius, self.spawn_mass)?;
        log::debug!("Spawned ball {:?} at {:?}", ball, position);
        Ok(ball)
    }

    /// Advance the world by one fixed time step
    pub fn step(&mut self) -> Result<(), PhysicsError> {
        self.world.step(self.time_step)
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn time_step(&self) -> f32 {
        self.time_step
    }

    pub fn world(&self) -> &PhysicsWorld {
        &self.world
    }

    pub fn soft_body(&self) -> &SoftBody {
        &self.soft_body
    }

    pub fn walls(&self) -> &[ShapeHandle] {
        &self.walls
    }
}
