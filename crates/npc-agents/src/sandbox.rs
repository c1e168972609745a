//! Minimal in-memory physics world.
//!
//! Bodies are spheres stored in an arena and addressed by [`EntityHandle`].
//! Forces accumulate between steps and are integrated with semi-implicit
//! Euler plus linear damping. Bodies with zero mass are static.

use glam::{Quat, Vec3};
use npc_core::{
    EntityId, PhysicsWorldMut, RayHit, RaycastWorldView, SpatialWorldMut, SpatialWorldView,
    WorldMut, WorldView,
};

use crate::config::SandboxConfig;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct EntityHandle(u32);

impl EntityHandle {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl EntityId for EntityHandle {
    fn stable_id(self) -> u64 {
        self.0 as u64
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Body {
    pub position: Vec3,
    pub orientation: Quat,
    pub velocity: Vec3,
    /// `0.0` marks a static body that forces never move.
    pub mass: f32,
    pub radius: f32,
    force: Vec3,
}

impl Body {
    pub fn new(position: Vec3) -> Self {
        Self {
            position,
            orientation: Quat::IDENTITY,
            velocity: Vec3::ZERO,
            mass: 1.0,
            radius: 0.5,
            force: Vec3::ZERO,
        }
    }

    pub fn with_mass(mut self, mass: f32) -> Self {
        self.mass = mass.max(0.0);
        self
    }

    pub fn with_radius(mut self, radius: f32) -> Self {
        self.radius = radius.max(0.0);
        self
    }

    /// Force accumulated since the last step.
    pub fn pending_force(&self) -> Vec3 {
        self.force
    }

    pub fn is_static(&self) -> bool {
        self.mass <= 0.0
    }

    /// Distance along a normalized ray to the sphere surface, if hit.
    fn intersect(&self, origin: Vec3, direction: Vec3) -> Option<f32> {
        let offset = origin - self.position;
        let b = offset.dot(direction);
        let c = offset.length_squared() - self.radius * self.radius;
        let discriminant = b * b - c;
        if discriminant < 0.0 {
            return None;
        }
        let root = discriminant.sqrt();
        let near = -b - root;
        if near >= 0.0 {
            return Some(near);
        }
        // Origin inside the sphere.
        let far = -b + root;
        (far >= 0.0).then_some(0.0)
    }
}

#[derive(Debug, Clone, Default)]
pub struct Sandbox {
    bodies: Vec<Body>,
    damping: f32,
}

impl Sandbox {
    pub fn new(damping: f32) -> Self {
        Self {
            bodies: Vec::new(),
            damping: damping.max(0.0),
        }
    }

    pub fn from_config(config: &SandboxConfig) -> Self {
        Self::new(config.damping)
    }

    pub fn spawn(&mut self, body: Body) -> EntityHandle {
        let handle = EntityHandle(self.bodies.len() as u32);
        tracing::trace!(entity = ?handle, position = ?body.position, "spawned body");
        self.bodies.push(body);
        handle
    }

    pub fn body(&self, entity: EntityHandle) -> Option<&Body> {
        self.bodies.get(entity.index())
    }

    pub fn body_mut(&mut self, entity: EntityHandle) -> Option<&mut Body> {
        self.bodies.get_mut(entity.index())
    }

    pub fn len(&self) -> usize {
        self.bodies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bodies.is_empty()
    }

    pub fn handles(&self) -> impl Iterator<Item = EntityHandle> + '_ {
        (0..self.bodies.len() as u32).map(EntityHandle)
    }

    /// Integrate accumulated forces over `dt_seconds` and clear them.
    pub fn step(&mut self, dt_seconds: f32) {
        let dt = dt_seconds.max(0.0);
        let retain = (1.0 - self.damping * dt).max(0.0);
        for body in &mut self.bodies {
            if !body.is_static() && dt > 0.0 {
                body.velocity += body.force / body.mass * dt;
                body.velocity *= retain;
                body.position += body.velocity * dt;
            }
            body.force = Vec3::ZERO;
        }
    }
}

impl WorldView for Sandbox {
    type Entity = EntityHandle;
}

impl WorldMut for Sandbox {}

impl SpatialWorldView for Sandbox {
    fn position(&self, entity: EntityHandle) -> Option<Vec3> {
        self.body(entity).map(|body| body.position)
    }

    fn orientation(&self, entity: EntityHandle) -> Option<Quat> {
        self.body(entity).map(|body| body.orientation)
    }
}

impl SpatialWorldMut for Sandbox {
    fn set_position(&mut self, entity: EntityHandle, position: Vec3) {
        if let Some(body) = self.body_mut(entity) {
            body.position = position;
        }
    }

    fn set_orientation(&mut self, entity: EntityHandle, orientation: Quat) {
        if let Some(body) = self.body_mut(entity) {
            body.orientation = orientation.normalize();
        }
    }
}

impl PhysicsWorldMut for Sandbox {
    fn add_force(&mut self, entity: EntityHandle, force: Vec3) {
        if let Some(body) = self.body_mut(entity) {
            body.force += force;
        }
    }
}

impl RaycastWorldView for Sandbox {
    fn raycast(
        &self,
        origin: Vec3,
        direction: Vec3,
        ignore: EntityHandle,
    ) -> Option<RayHit<EntityHandle>> {
        let direction = direction.normalize_or_zero();
        if direction == Vec3::ZERO {
            return None;
        }

        let mut closest: Option<RayHit<EntityHandle>> = None;
        for (entity, body) in self.handles().zip(&self.bodies) {
            if entity == ignore {
                continue;
            }
            let Some(distance) = body.intersect(origin, direction) else {
                continue;
            };
            // Strict comparison keeps the lowest handle on ties.
            if closest.map_or(true, |hit| distance < hit.distance) {
                closest = Some(RayHit {
                    entity,
                    point: origin + direction * distance,
                    distance,
                });
            }
        }
        closest
    }
}
