use glam::{Quat, Vec3};

use crate::EntityId;

/// Read-only world access.
///
/// The core crate does not prescribe which queries a world must expose;
/// capabilities are layered on as extension traits below (and in `npc-nav`).
pub trait WorldView {
    type Entity: EntityId;
}

/// Write access / effect sink.
pub trait WorldMut: WorldView {}

/// Transform queries.
pub trait SpatialWorldView: WorldView {
    fn position(&self, entity: Self::Entity) -> Option<Vec3>;
    fn orientation(&self, entity: Self::Entity) -> Option<Quat>;
}

pub trait SpatialWorldMut: WorldMut + SpatialWorldView {
    fn set_position(&mut self, entity: Self::Entity, position: Vec3);
    fn set_orientation(&mut self, entity: Self::Entity, orientation: Quat);
}

/// Force sink for physically simulated entities.
///
/// Forces are instantaneous: the physics collaborator decides how they are
/// integrated.
pub trait PhysicsWorldMut: WorldMut {
    fn add_force(&mut self, entity: Self::Entity, force: Vec3);
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RayHit<E> {
    pub entity: E,
    pub point: Vec3,
    pub distance: f32,
}

pub trait RaycastWorldView: WorldView {
    /// Return the first entity hit along `direction` from `origin`, never
    /// reporting `ignore` itself.
    ///
    /// `direction` does not need to be normalized.
    fn raycast(
        &self,
        origin: Vec3,
        direction: Vec3,
        ignore: Self::Entity,
    ) -> Option<RayHit<Self::Entity>>;
}
