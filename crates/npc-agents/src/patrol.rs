//! Patrol/chase controller.
//!
//! The controller owns a [`PatrolMemory`] and a behaviour tree whose leaves
//! are the plain functions in this module. Trees come in three shapes driven
//! by [`PatrolConfig`]:
//!
//! ```text
//! Root Sequence ── Patrolling Sequence ── Go To Room [── Look Around]
//! Root Selector ─┬ Chase Player
//!                └ Patrolling Sequence ── Go To Room [── Look Around]
//! ```

use glam::{Quat, Vec3};
use npc_bt::{
    BehaviourAction, BehaviourNode, BehaviourRunner, BehaviourSelector, BehaviourSequence,
    BehaviourState,
};
use npc_core::{PhysicsWorldMut, RaycastWorldView, SpatialWorldMut, TickContext, WorldView};
use npc_nav::Pathfinder;

use crate::config::PatrolConfig;

/// Every collaborator the patrol leaves need.
pub trait PatrolWorld: SpatialWorldMut + PhysicsWorldMut + RaycastWorldView {}

impl<T> PatrolWorld for T where T: SpatialWorldMut + PhysicsWorldMut + RaycastWorldView {}

/// State shared by the patrol leaves across ticks.
#[derive(Debug, Clone)]
pub struct PatrolMemory<E> {
    pub config: PatrolConfig,
    waypoints: Vec<Vec3>,
    cursor: usize,
    distance_to_waypoint: f32,
    behaviour_timer: f32,
    target: Option<E>,
}

impl<E: Copy> PatrolMemory<E> {
    pub fn new(waypoints: Vec<Vec3>, config: PatrolConfig) -> Self {
        Self {
            config,
            waypoints,
            cursor: 0,
            distance_to_waypoint: f32::INFINITY,
            behaviour_timer: 0.0,
            target: None,
        }
    }

    pub fn waypoints(&self) -> &[Vec3] {
        &self.waypoints
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// Distance measured by the last "Go To Room" tick.
    pub fn distance_to_waypoint(&self) -> f32 {
        self.distance_to_waypoint
    }

    pub fn behaviour_timer(&self) -> f32 {
        self.behaviour_timer
    }

    pub fn target(&self) -> Option<E> {
        self.target
    }

    pub fn set_target(&mut self, target: Option<E>) {
        self.target = target;
    }

    /// Waypoint under the cursor. The cursor is wrapped again on read so a
    /// shrunk or edited list can never be indexed out of bounds.
    pub fn current_waypoint(&mut self) -> Option<Vec3> {
        if self.waypoints.is_empty() {
            return None;
        }
        if self.cursor >= self.waypoints.len() {
            self.cursor = 0;
        }
        Some(self.waypoints[self.cursor])
    }

    /// Move to the next waypoint, wrapping to the first after the last.
    pub fn advance(&mut self) {
        if !self.waypoints.is_empty() {
            self.cursor = (self.cursor + 1) % self.waypoints.len();
        }
    }

    fn begin_run(&mut self) {
        self.behaviour_timer = 0.0;
    }
}

/// "Go To Room": push the entity towards the current waypoint until it is
/// within `arrival_distance`, then advance the cursor and succeed.
pub fn go_to_room<W: PatrolWorld>(
    ctx: &TickContext,
    entity: W::Entity,
    world: &mut W,
    memory: &mut PatrolMemory<W::Entity>,
    state: BehaviourState,
) -> BehaviourState {
    let Some(waypoint) = memory.current_waypoint() else {
        return BehaviourState::Failure;
    };

    match state {
        BehaviourState::Initialise => {
            tracing::info!(
                tick = ctx.tick,
                entity = ?entity,
                cursor = memory.cursor,
                waypoint = ?waypoint,
                "going to room"
            );
            BehaviourState::Ongoing
        }
        BehaviourState::Ongoing => {
            let Some(position) = world.position(entity) else {
                return BehaviourState::Failure;
            };
            let offset = waypoint - position;
            memory.distance_to_waypoint = offset.length();

            if memory.distance_to_waypoint < memory.config.arrival_distance {
                tracing::debug!(
                    tick = ctx.tick,
                    entity = ?entity,
                    cursor = memory.cursor,
                    "reached patrol waypoint"
                );
                memory.advance();
                return BehaviourState::Success;
            }

            world.add_force(
                entity,
                offset.normalize_or_zero() * memory.config.patrol_force,
            );
            BehaviourState::Ongoing
        }
        terminal => terminal,
    }
}

/// "Chase Player": starts only when the target is the first thing a ray from
/// the entity towards it hits, then keeps pushing towards the target until
/// something else is hit first. A ray that hits nothing keeps the chase going.
pub fn chase_player<W: PatrolWorld>(
    ctx: &TickContext,
    entity: W::Entity,
    world: &mut W,
    memory: &mut PatrolMemory<W::Entity>,
    state: BehaviourState,
) -> BehaviourState {
    let Some(target) = memory.target else {
        return BehaviourState::Failure;
    };

    match state {
        BehaviourState::Initialise => {
            if !matches!(sight_line(world, entity, target), Sight::Target(_)) {
                return BehaviourState::Failure;
            }
            tracing::info!(
                tick = ctx.tick,
                entity = ?entity,
                target = ?target,
                "target spotted, chasing"
            );
            BehaviourState::Ongoing
        }
        BehaviourState::Ongoing => match sight_line(world, entity, target) {
            Sight::Target(direction) | Sight::Clear(direction) => {
                world.add_force(entity, direction * memory.config.chase_force);
                BehaviourState::Ongoing
            }
            Sight::Obstructed => {
                tracing::info!(
                    tick = ctx.tick,
                    entity = ?entity,
                    target = ?target,
                    "lost sight of target"
                );
                BehaviourState::Failure
            }
        },
        terminal => terminal,
    }
}

/// "Look Around": wait out the configured pause, then turn by a fixed yaw.
pub fn look_around<W: PatrolWorld>(
    ctx: &TickContext,
    entity: W::Entity,
    world: &mut W,
    memory: &mut PatrolMemory<W::Entity>,
    state: BehaviourState,
) -> BehaviourState {
    match state {
        BehaviourState::Initialise => {
            memory.behaviour_timer = memory.config.look_around_seconds;
            BehaviourState::Ongoing
        }
        BehaviourState::Ongoing => {
            memory.behaviour_timer -= ctx.dt_seconds;
            if memory.behaviour_timer > 0.0 {
                return BehaviourState::Ongoing;
            }

            let turn = Quat::from_rotation_y(memory.config.look_around_degrees.to_radians());
            let orientation = world.orientation(entity).unwrap_or(Quat::IDENTITY);
            world.set_orientation(entity, orientation * turn);
            tracing::debug!(tick = ctx.tick, entity = ?entity, "looked around");
            BehaviourState::Success
        }
        terminal => terminal,
    }
}

/// Outcome of a ray cast from the entity towards its target.
enum Sight {
    /// The target was the first hit.
    Target(Vec3),
    /// Nothing was hit.
    Clear(Vec3),
    /// Something other than the target was hit first, or a transform is missing.
    Obstructed,
}

fn sight_line<W: PatrolWorld>(world: &W, entity: W::Entity, target: W::Entity) -> Sight {
    let (Some(from), Some(to)) = (world.position(entity), world.position(target)) else {
        return Sight::Obstructed;
    };
    let direction = (to - from).normalize_or_zero();
    match world.raycast(from, direction, entity) {
        Some(hit) if hit.entity == target => Sight::Target(direction),
        Some(_) => Sight::Obstructed,
        None => Sight::Clear(direction),
    }
}

type Memory<W> = PatrolMemory<<W as WorldView>::Entity>;
type PatrolNode<W> = Box<dyn BehaviourNode<W, Memory<W>>>;

pub struct PatrolController<W>
where
    W: PatrolWorld + 'static,
{
    entity: W::Entity,
    memory: Memory<W>,
    runner: BehaviourRunner<W, Memory<W>>,
}

impl<W> PatrolController<W>
where
    W: PatrolWorld + 'static,
{
    pub fn new(entity: W::Entity, waypoints: Vec<Vec3>, config: PatrolConfig) -> Self {
        let root = Self::build_tree(&config);
        if waypoints.is_empty() {
            tracing::warn!(entity = ?entity, "no patrol path, controller will idle");
        }
        Self {
            entity,
            memory: PatrolMemory::new(waypoints, config),
            runner: BehaviourRunner::new(root),
        }
    }

    /// Ask `pathfinder` once for the route between `start` and `end` and
    /// patrol along it.
    pub fn from_path<P>(
        entity: W::Entity,
        pathfinder: &P,
        start: Vec3,
        end: Vec3,
        config: PatrolConfig,
    ) -> Self
    where
        P: Pathfinder + ?Sized,
    {
        let waypoints = match pathfinder.find_path(start, end) {
            Some(path) => path.into_waypoints(),
            None => {
                tracing::warn!(entity = ?entity, start = ?start, end = ?end, "no path found");
                Vec::new()
            }
        };
        Self::new(entity, waypoints, config)
    }

    /// The root selector is not reactive: "Chase Player" is only retried once
    /// the patrolling sequence finishes its run, so a target that comes into
    /// view mid-leg is picked up at the next waypoint.
    fn build_tree(config: &PatrolConfig) -> PatrolNode<W> {
        let mut patrolling = BehaviourSequence::<W, Memory<W>>::new("Patrolling Sequence")
            .with_child(BehaviourAction::<W, Memory<W>>::new(
                "Go To Room",
                go_to_room::<W>,
            ));
        if config.look_around {
            patrolling.add_child(Box::new(BehaviourAction::<W, Memory<W>>::new(
                "Look Around",
                look_around::<W>,
            )));
        }

        if config.chase {
            Box::new(
                BehaviourSelector::<W, Memory<W>>::new("Root Selector")
                    .with_child(BehaviourAction::<W, Memory<W>>::new(
                        "Chase Player",
                        chase_player::<W>,
                    ))
                    .with_child(patrolling),
            )
        } else {
            Box::new(BehaviourSequence::<W, Memory<W>>::new("Root Sequence").with_child(patrolling))
        }
    }

    /// Advance the tree by one tick.
    ///
    /// Returns the root state for this tick, or `Initialise` without touching
    /// the world when there is nothing to patrol.
    pub fn update(&mut self, ctx: &TickContext, world: &mut W) -> BehaviourState {
        if self.is_idle() {
            return BehaviourState::Initialise;
        }
        if self.runner.state() == BehaviourState::Initialise {
            self.memory.begin_run();
        }
        self.runner.tick(ctx, self.entity, world, &mut self.memory)
    }

    pub fn entity(&self) -> W::Entity {
        self.entity
    }

    pub fn is_idle(&self) -> bool {
        self.memory.waypoints.is_empty()
    }

    /// Track `target` for "Chase Player", or stop tracking with `None`.
    pub fn set_target(&mut self, target: Option<W::Entity>) {
        self.memory.set_target(target);
    }

    pub fn target(&self) -> Option<W::Entity> {
        self.memory.target()
    }

    pub fn cursor(&self) -> usize {
        self.memory.cursor()
    }

    pub fn waypoints(&self) -> &[Vec3] {
        self.memory.waypoints()
    }

    pub fn memory(&self) -> &PatrolMemory<W::Entity> {
        &self.memory
    }

    pub fn root_name(&self) -> &str {
        self.runner.root().name()
    }

    pub fn last_outcome(&self) -> Option<BehaviourState> {
        self.runner.last_outcome()
    }

    pub fn completed_runs(&self) -> u64 {
        self.runner.completed_runs()
    }

    /// Drop the current run; the next update starts from the root again.
    pub fn reset(&mut self) {
        self.runner.reset();
    }
}
