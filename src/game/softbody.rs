// Soft body built from a lattice of point masses and damped springs

use crate::engine::physics::{
    body::presets as body_presets, ensure_finite_vec, ensure_mass, ensure_non_negative,
    ensure_positive, shape::presets as shape_presets, BodyHandle, PhysicsError, PhysicsWorld,
    ShapeHandle, SpringHandle,
};
use glam::Vec2;
use serde::Deserialize;

/// Shear springs span a cell diagonal
const SHEAR_FACTOR: f32 = std::f32::consts::SQRT_2;

/// Lattice neighbours visited for structural springs, in order
const STRUCTURAL_NEIGHBOURS: [(isize, isize); 2] = [(1, 0), (0, 1)];

/// Lattice neighbours visited for shear springs, in order
const SHEAR_NEIGHBOURS: [(isize, isize); 2] = [(1, 1), (-1, 1)];

/// Upper bound on `width * height`
pub const MAX_LATTICE_POINTS: usize = 65_536;

/// Parameters of a soft body lattice
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SoftBodyConfig {
    /// Position of mass point (0, 0)
    pub anchor: Vec2,
    /// Number of columns (index `i`)
    pub width: usize,
    /// Number of rows (index `j`)
    pub height: usize,
    /// Spacing between neighbouring points and structural spring rest length
    pub rest_length: f32,
    pub stiffness: f32,
    pub damping: f32,
    pub ball_mass: f32,
    pub ball_radius: f32,
}

impl SoftBodyConfig {
    /// Reject empty grids and non-physical parameters
    pub fn validate(&self) -> Result<(), PhysicsError> {
        if self.width == 0 || self.height == 0 {
            return Err(PhysicsError::InvalidConfiguration(format!(
                "soft body grid must not be empty, got {}x{}",
                self.width, self.height
            )));
        }
        match self.width.checked_mul(self.height) {
            Some(points) if points <= MAX_LATTICE_POINTS => {}
            _ => {
                return Err(PhysicsError::InvalidConfiguration(format!(
                    "soft body grid {}x{} exceeds {} points",
                    self.width, self.height, MAX_LATTICE_POINTS
                )))
            }
        }
        ensure_finite_vec("soft body anchor", self.anchor)?;
        ensure_positive("soft body rest length", self.rest_length)?;
        ensure_non_negative("soft body stiffness", self.stiffness)?;
        ensure_non_negative("soft body damping", self.damping)?;
        ensure_mass("soft body ball mass", self.ball_mass)?;
        ensure_positive("soft body ball radius", self.ball_radius)
    }
}

impl Default for SoftBodyConfig {
    fn default() -> Self {
        Self {
            anchor: Vec2::new(100.0, 100.0),
            width: 5,
            height: 5,
            rest_length: 25.0,
            stiffness: 1000.0,
            damping: 1.0,
            ball_mass: 0.1,
            ball_radius: 0.1,
        }
    }
}

/// A deformable body registered with a `PhysicsWorld`
///
/// The soft body only holds handles; the world owns every body, shape and
/// spring it created.
#[derive(Debug)]
pub struct SoftBody {
    config: SoftBodyConfig,
    /// Mass point shapes, `points[i][j]`
    points: Vec<Vec<ShapeHandle>>,
    /// Owning body of each point, same layout as `points`
    bodies: Vec<Vec<BodyHandle>>,
    springs: Vec<SpringHandle>,
}

impl SoftBody {
    /// Build the lattice and register it with `world`
    ///
    /// Mass points are created column by column, then structural springs
    /// (right, below) and finally shear springs (both diagonals downwards).
    pub fn new(world: &mut PhysicsWorld, config: SoftBodyConfig) -> Result<Self, PhysicsError> {
        config.validate()?;

        let mut soft_body = Self {
            points: Vec::new(),
            bodies: Vec::new(),
            springs: Vec::new(),
            config,
        };

        soft_body.create_points(world)?;
        soft_body.connect(world, &STRUCTURAL_NEIGHBOURS, None)?;
        let shear_length = soft_body.config.rest_length * SHEAR_FACTOR;
        soft_body.connect(world, &SHEAR_NEIGHBOURS, Some(shear_length))?;

        log::info!(
            "Created {}x{} soft body with {} springs",
            soft_body.config.width,
            soft_body.config.height,
            soft_body.springs.len()
        );

        Ok(soft_body)
    }

    fn create_points(&mut self, world: &mut PhysicsWorld) -> Result<(), PhysicsError> {
        let spacing = self.config.rest_length;
        for i in 0..self.config.width {
            let mut column_points = Vec::new();
            let mut column_bodies = Vec::new();

            for j in 0..self.config.height {
                let position = self.config.anchor + Vec2::new(i as f32, j as f32) * spacing;
                let body =
                    world.add_rigid_body(body_presets::ball_body(position, self.config.ball_mass)?);
                let shape =
                    world.add_shape(shape_presets::ball_shape(self.config.ball_radius), body)?;
                column_points.push(shape);
                column_bodies.push(body);
            }

            self.points.push(column_points);
            self.bodies.push(column_bodies);
        }
        Ok(())
    }

    fn connect(
        &mut self,
        world: &mut PhysicsWorld,
        neighbours: &[(isize, isize)],
        rest_length: Option<f32>,
    ) -> Result<(), PhysicsError> {
        for i in 0..self.config.width {
            for j in 0..self.config.height {
                for &(di, dj) in neighbours {
                    let Some(other) = self.neighbour(i, j, di, dj) else {
                        continue;
                    };
                    let a = self.bodies[i][j];
                    self.create_spring(world, a, other, rest_length)?;
                }
            }
        }
        Ok(())
    }

    fn neighbour(&self, i: usize, j: usize, di: isize, dj: isize) -> Option<BodyHandle> {
        let ni = i.checked_add_signed(di)?;
        let nj = j.checked_add_signed(dj)?;
        self.body(ni, nj)
    }

    /// Connect two bodies with this soft body's stiffness and damping
    ///
    /// `rest_length` falls back to the lattice spacing.
    pub fn create_spring(
        &mut self,
        world: &mut PhysicsWorld,
        body_a: BodyHandle,
        body_b: BodyHandle,
        rest_length: Option<f32>,
    ) -> Result<SpringHandle, PhysicsError> {
        let spring = world.create_spring(
            body_a,
            body_b,
            rest_length.unwrap_or(self.config.rest_length),
            self.config.stiffness,
            self.config.damping,
        )?;
        self.springs.push(spring);
        Ok(spring)
    }

    pub fn config(&self) -> &SoftBodyConfig {
        &self.config
    }

    /// Shape of mass point `(i, j)`
    pub fn point(&self, i: usize, j: usize) -> Option<ShapeHandle> {
        self.points.get(i)?.get(j).copied()
    }

    /// Body of mass point `(i, j)`
    pub fn body(&self, i: usize, j: usize) -> Option<BodyHandle> {
        self.bodies.get(i)?.get(j).copied()
    }

    pub fn springs(&self) -> &[SpringHandle] {
        &self.springs
    }

    pub fn spring_count(&self) -> usize {
        self.springs.len()
    }

    pub fn point_count(&self) -> usize {
        self.config.width * self.config.height
    }

    /// Current positions of the mass points still alive in `world`, `i` outer
    pub fn positions(&self, world: &PhysicsWorld) -> Vec<Vec2> {
        self.bodies
            .iter()
            .flatten()
            .filter_map(|body| world.body(*body).map(|body| body.position()))
            .collect()
    }

    /// Mean position of the live mass points
    pub fn centroid(&self, world: &PhysicsWorld) -> Option<Vec2> {
        let positions = self.positions(world);
        if positions.is_empty() {
            return None;
        }
        let sum: Vec2 = positions.iter().copied().sum();
        Some(sum / positions.len() as f32)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use std::collections::HashSet;

    fn expected_springs(w: usize, h: usize) -> usize {
        (w - 1) * h + w * (h - 1) + 2 * (w - 1) * (h - 1)
    }

    fn grid(width: usize, height: usize) -> SoftBodyConfig {
        SoftBodyConfig {
            width,
            height,
            ..SoftBodyConfig::default()
        }
    }

    #[test]
    fn test_lattice_counts() {
        for (w, h) in [(5, 5), (1, 1), (1, 4), (3, 1), (2, 2), (4, 3)] {
            let mut world = PhysicsWorld::new();
            let soft_body = SoftBody::new(&mut world, grid(w, h)).unwrap();

            assert_eq!(soft_body.point_count(), w * h);
            assert_eq!(world.bodies().len(), w * h);
            assert_eq!(world.shapes().len(), w * h);
            assert_eq!(soft_body.spring_count(), expected_springs(w, h), "{w}x{h}");
            assert_eq!(world.springs().len(), expected_springs(w, h));
        }
    }

    #[test]
    fn test_default_grid_spring_count() {
        let mut world = PhysicsWorld::new();
        let soft_body = SoftBody::new(&mut world, SoftBodyConfig::default()).unwrap();
        assert_eq!(soft_body.point_count(), 25);
        // 20 horizontal, 20 vertical and 32 diagonal
        assert_eq!(soft_body.spring_count(), expected_springs(5, 5));
        assert_eq!(soft_body.spring_count(), 72);
    }

    #[test]
    fn test_no_duplicate_or_self_springs() {
        let mut world = PhysicsWorld::new();
        SoftBody::new(&mut world, grid(4, 3)).unwrap();

        let mut pairs = HashSet::new();
        for spring in world.springs() {
            let (a, b) = spring.bodies();
            assert_ne!(a, b);
            let key = if a < b { (a, b) } else { (b, a) };
            assert!(pairs.insert(key), "duplicate spring {key:?}");
        }
    }

    #[test]
    fn test_springs_connect_lattice_neighbours() {
        let mut world = PhysicsWorld::new();
        let soft_body = SoftBody::new(&mut world, grid(3, 3)).unwrap();

        for spring in world.springs() {
            let (a, b) = spring.bodies();
            let pa = world.body(a).unwrap().position();
            let pb = world.body(b).unwrap().position();
            // Springs start at rest
            assert_abs_diff_eq!(pa.distance(pb), spring.rest_length(), epsilon = 1e-3);
            assert_eq!(spring.stiffness(), 1000.0);
            assert_eq!(spring.damping(), 1.0);
        }

        // First spring: (0,0) right to (1,0); first shear: (0,0) to (1,1)
        let structural = (3 - 1) * 3 + 3 * (3 - 1);
        let first = world.spring(soft_body.springs()[0]).unwrap();
        assert_eq!(
            first.bodies(),
            (soft_body.body(0, 0).unwrap(), soft_body.body(1, 0).unwrap())
        );
        let shear = world.spring(soft_body.springs()[structural]).unwrap();
        assert_eq!(
            shear.bodies(),
            (soft_body.body(0, 0).unwrap(), soft_body.body(1, 1).unwrap())
        );
        assert_abs_diff_eq!(shear.rest_length(), 25.0 * SHEAR_FACTOR, epsilon = 1e-4);
    }

    #[test]
    fn test_point_positions_and_material() {
        let mut world = PhysicsWorld::new();
        let soft_body = SoftBody::new(&mut world, SoftBodyConfig::default()).unwrap();

        let shape = world.shape(soft_body.point(2, 3).unwrap()).unwrap();
        let body = world.body(shape.body()).unwrap();
        assert_eq!(body.position(), Vec2::new(150.0, 175.0));
        assert_eq!(body.mass(), 0.1);
        assert_eq!(shape.geometry().half_extents(), Vec2::splat(0.1));
        assert_eq!(shape.elasticity(), 0.9);
        assert_eq!(shape.friction(), 1.0);

        assert!(soft_body.point(5, 0).is_none());
        assert!(soft_body.body(0, 5).is_none());

        let centroid = soft_body.centroid(&world).unwrap();
        assert_abs_diff_eq!(centroid.x, 150.0, epsilon = 1e-4);
        assert_abs_diff_eq!(centroid.y, 150.0, epsilon = 1e-4);
        assert_eq!(soft_body.positions(&world)[1], Vec2::new(100.0, 125.0));
    }

    #[test]
    fn test_invalid_configuration() {
        let mut world = PhysicsWorld::new();
        for config in [
            grid(0, 5),
            grid(5, 0),
            grid(usize::MAX, 2),
            grid(MAX_LATTICE_POINTS, 2),
            SoftBodyConfig {
                anchor: Vec2::new(f32::NAN, 0.0),
                ..SoftBodyConfig::default()
            },
            SoftBodyConfig {
                rest_length: 0.0,
                ..SoftBodyConfig::default()
            },
            SoftBodyConfig {
                stiffness: -1.0,
                ..SoftBodyConfig::default()
            },
            SoftBodyConfig {
                ball_mass: 0.0,
                ..SoftBodyConfig::default()
            },
        ] {
            assert!(matches!(
                SoftBody::new(&mut world, config),
                Err(PhysicsError::InvalidConfiguration(_))
            ));
        }
        // Rejected before anything was registered
        assert!(world.bodies().is_empty());
        assert!(world.springs().is_empty());
    }

    #[test]
    fn test_custom_spring_uses_default_rest_length() {
        let mut world = PhysicsWorld::new();
        let mut soft_body = SoftBody::new(&mut world, grid(3, 1)).unwrap();
        let a = soft_body.body(0, 0).unwrap();
        let c = soft_body.body(2, 0).unwrap();

        let spring = soft_body.create_spring(&mut world, a, c, None).unwrap();
        assert_eq!(world.spring(spring).unwrap().rest_length(), 25.0);
        let spring = soft_body.create_spring(&mut world, a, c, Some(50.0)).unwrap();
        assert_eq!(world.spring(spring).unwrap().rest_length(), 50.0);
        assert_eq!(soft_body.spring_count(), 4);
    }

    #[test]
    fn test_soft_body_settles_inside_boundaries() {
        let mut world = PhysicsWorld::with_settings(crate::engine::physics::WorldSettings {
            substeps: 4,
            ..Default::default()
        })
        .unwrap();
        world.add_boundaries(800.0, 800.0).unwrap();
        let soft_body = SoftBody::new(&mut world, SoftBodyConfig::default()).unwrap();

        for _ in 0..720 {
            world.step(1.0 / 144.0).unwrap();
        }

        for position in soft_body.positions(&world) {
            assert!(position.is_finite());
            assert!(position.x > 20.0 && position.x < 780.0);
            assert!(position.y > 20.0 && position.y < 780.0);
        }
        // Gravity pulled it down onto the floor
        assert!(soft_body.centroid(&world).unwrap().y > 600.0);
    }
}
