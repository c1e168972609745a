use std::collections::VecDeque;

use npc_core::Vec3;

/// Ordered waypoints in travel order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NavPath {
    waypoints: VecDeque<Vec3>,
}

impl NavPath {
    pub fn new(points: impl IntoIterator<Item = Vec3>) -> Self {
        Self {
            waypoints: points.into_iter().collect(),
        }
    }

    pub fn push_waypoint(&mut self, point: Vec3) {
        self.waypoints.push_back(point);
    }

    /// Consume the next waypoint, front to back.
    pub fn pop_waypoint(&mut self) -> Option<Vec3> {
        self.waypoints.pop_front()
    }

    pub fn len(&self) -> usize {
        self.waypoints.len()
    }

    pub fn is_empty(&self) -> bool {
        self.waypoints.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Vec3> {
        self.waypoints.iter()
    }

    pub fn into_waypoints(self) -> Vec<Vec3> {
        self.waypoints.into()
    }
}

pub trait Pathfinder {
    /// Plan a route from `start` to `end`. `None` means no route exists (or
    /// either endpoint is outside the navigable area).
    fn find_path(&self, start: Vec3, end: Vec3) -> Option<NavPath>;
}

impl<P: Pathfinder + ?Sized> Pathfinder for &P {
    fn find_path(&self, start: Vec3, end: Vec3) -> Option<NavPath> {
        (**self).find_path(start, end)
    }
}
