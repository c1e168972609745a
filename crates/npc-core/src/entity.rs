use core::fmt::Debug;

/// Stable handle for an entity owned by the surrounding world.
///
/// Controllers attach to a handle rather than owning the entity. Handles must
/// be cheap to copy and totally ordered so logs and iteration stay stable.
pub trait EntityId: Copy + Ord + Eq + Debug + 'static {
    fn stable_id(self) -> u64;
}

impl EntityId for u64 {
    fn stable_id(self) -> u64 {
        self
    }
}

impl EntityId for u32 {
    fn stable_id(self) -> u64 {
        self as u64
    }
}

impl EntityId for usize {
    fn stable_id(self) -> u64 {
        self as u64
    }
}
