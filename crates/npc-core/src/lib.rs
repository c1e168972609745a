//! Engine-agnostic primitives shared by the NPC decision crates.

#![cfg_attr(docsrs, feature(doc_cfg))]
#![forbid(unsafe_code)]

pub mod entity;
pub mod tick;
pub mod world;

pub use entity::EntityId;
pub use glam::{Quat, Vec3};
pub use tick::TickContext;
pub use world::{
    PhysicsWorldMut, RayHit, RaycastWorldView, SpatialWorldMut, SpatialWorldView, WorldMut,
    WorldView,
};
