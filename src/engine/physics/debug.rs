use super::body::RigidBody;
use super::shape::{Geometry, Shape};
use super::world::PhysicsWorld;
use glam::Vec2;

/// Green for dynamic
pub const DYNAMIC_COLOR: [f32; 4] = [0.0, 1.0, 0.0, 0.8];
/// Gray for static
pub const STATIC_COLOR: [f32; 4] = [0.5, 0.5, 0.5, 0.8];

const CIRCLE_SEGMENTS: usize = 16;

/// Kind tag stored in `RenderInstance::kind`
pub const KIND_CIRCLE: u32 = 0;
pub const KIND_BOX: u32 = 1;

/// One shape as seen by a renderer, laid out for direct upload
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct RenderInstance {
    pub position: [f32; 2],
    /// Radius in both components for circles, half-extents for boxes
    pub extents: [f32; 2],
    pub color: [f32; 4],
    pub kind: u32,
    _padding: u32,
}

impl RenderInstance {
    pub fn new(body: &RigidBody, shape: &Shape) -> Self {
        let kind = match shape.geometry() {
            Geometry::Circle { .. } => KIND_CIRCLE,
            Geometry::Polygon { .. } => KIND_BOX,
        };
        Self {
            position: body.position().to_array(),
            extents: shape.geometry().half_extents().to_array(),
            color: body_color(body),
            kind,
            _padding: 0,
        }
    }
}

fn body_color(body: &RigidBody) -> [f32; 4] {
    if body.is_dynamic() {
        DYNAMIC_COLOR
    } else {
        STATIC_COLOR
    }
}

#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct DebugVertex {
    pub position: [f32; 2],
    pub color: [f32; 4],
}

/// Line-list outlines of every shape and spring in a world
///
/// Indices are `u16` pairs; geometry past `u16::MAX` vertices is dropped.
#[derive(Debug, Default)]
pub struct DebugGeometry {
    vertices: Vec<DebugVertex>,
    indices: Vec<u16>,
}

impl DebugGeometry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuild from scratch, reusing the allocations
    pub fn rebuild(&mut self, world: &PhysicsWorld) {
        self.vertices.clear();
        self.indices.clear();

        for shape in world.shapes() {
            let Some(body) = world.body(shape.body()) else {
                continue;
            };
            let color = body_color(body);
            match shape.geometry() {
                Geometry::Circle { radius } => self.draw_circle(body.position(), radius, color),
                Geometry::Polygon { half_extents } => {
                    self.draw_box(body.position(), half_extents, color)
                }
            }
        }

        for spring in world.springs() {
            let (a, b) = spring.bodies();
            if let (Some(a), Some(b)) = (world.body(a), world.body(b)) {
                self.draw_line(a.position(), b.position(), DYNAMIC_COLOR);
            }
        }
    }

    pub fn build(world: &PhysicsWorld) -> Self {
        let mut geometry = Self::new();
        geometry.rebuild(world);
        geometry
    }

    pub fn vertices(&self) -> &[DebugVertex] {
        &self.vertices
    }

    pub fn indices(&self) -> &[u16] {
        &self.indices
    }

    /// Raw vertex bytes, ready for a vertex buffer
    pub fn vertex_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.vertices)
    }

    pub fn index_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.indices)
    }

    fn has_room(&self, count: usize) -> bool {
        self.vertices.len() + count <= u16::MAX as usize
    }

    fn draw_circle(&mut self, center: Vec2, radius: f32, color: [f32; 4]) {
        if !self.has_room(CIRCLE_SEGMENTS) {
            return;
        }
        let start_idx = self.vertices.len() as u16;

        for i in 0..CIRCLE_SEGMENTS {
            let angle = (i as f32 / CIRCLE_SEGMENTS as f32) * std::f32::consts::TAU;
            let point = center + Vec2::new(angle.cos(), angle.sin()) * radius;

            self.vertices.push(DebugVertex {
                position: point.to_array(),
                color,
            });

            let next = (i + 1) % CIRCLE_SEGMENTS;
            self.indices.push(start_idx + i as u16);
            self.indices.push(start_idx + next as u16);
        }
    }

    fn draw_box(&mut self, center: Vec2, half_extents: Vec2, color: [f32; 4]) {
        if !self.has_room(4) {
            return;
        }
        let start_idx = self.vertices.len() as u16;

        let corners = [
            Vec2::new(-half_extents.x, -half_extents.y),
            Vec2::new(half_extents.x, -half_extents.y),
            Vec2::new(half_extents.x, half_extents.y),
            Vec2::new(-half_extents.x, half_extents.y),
        ];

        for corner in corners {
            self.vertices.push(DebugVertex {
                position: (center + corner).to_array(),
                color,
            });
        }

        for i in 0..4 {
            self.indices.push(start_idx + i);
            self.indices.push(start_idx + (i + 1) % 4);
        }
    }

    fn draw_line(&mut self, from: Vec2, to: Vec2, color: [f32; 4]) {
        if !self.has_room(2) {
            return;
        }
        let start_idx = self.vertices.len() as u16;
        for point in [from, to] {
            self.vertices.push(DebugVertex {
                position: point.to_array(),
                color,
            });
        }
        self.indices.push(start_idx);
        self.indices.push(start_idx + 1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_render_instance_layout() {
        assert_eq!(std::mem::size_of::<RenderInstance>(), 40);
        let instance: RenderInstance = bytemuck::Zeroable::zeroed();
        assert!(bytemuck::bytes_of(&instance).iter().all(|b| *b == 0));
    }

    #[test]
    fn test_outlines_for_world() {
        let mut world = PhysicsWorld::new();
        world.add_boundaries(800.0, 800.0).unwrap();
        world.spawn_ball(Vec2::new(400.0, 400.0), 35.0, 3.0).unwrap();

        let geometry = DebugGeometry::build(&world);
        // Four boxes and one circle
        assert_eq!(geometry.vertices().len(), 4 * 4 + CIRCLE_SEGMENTS);
        assert_eq!(geometry.indices().len(), 2 * (4 * 4 + CIRCLE_SEGMENTS));
        assert!(geometry
            .indices()
            .iter()
            .all(|i| (*i as usize) < geometry.vertices().len()));

        assert_eq!(geometry.vertices()[0].color, STATIC_COLOR);
        let circle = &geometry.vertices()[16];
        assert_eq!(circle.color, DYNAMIC_COLOR);
        assert_abs_diff_eq!(circle.position[0], 435.0, epsilon = 1e-4);
        assert_abs_diff_eq!(circle.position[1], 400.0, epsilon = 1e-4);
    }

    #[test]
    fn test_springs_drawn_as_lines() {
        let mut world = PhysicsWorld::new();
        let a = world.create_dynamic_body(Vec2::ZERO, 1.0).unwrap();
        let b = world.create_dynamic_body(Vec2::new(3.0, 4.0), 1.0).unwrap();
        world.create_spring(a, b, 5.0, 1.0, 0.0).unwrap();

        let mut geometry = DebugGeometry::new();
        geometry.rebuild(&world);
        assert_eq!(geometry.indices(), &[0, 1]);
        assert_eq!(geometry.vertices()[1].position, [3.0, 4.0]);
        assert_eq!(geometry.vertex_bytes().len(), 2 * 24);

        // Rebuilding does not accumulate
        geometry.rebuild(&world);
        assert_eq!(geometry.indices().len(), 2);
    }
}
