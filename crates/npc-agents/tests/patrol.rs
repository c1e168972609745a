use std::collections::BTreeMap;

use glam::{Quat, Vec3};
use npc_agents::{chase_player, Body, PatrolConfig, PatrolController, PatrolMemory, Sandbox};
use npc_bt::{BehaviourAction, BehaviourNode, BehaviourState};
use npc_core::{
    PhysicsWorldMut, RayHit, RaycastWorldView, SpatialWorldMut, SpatialWorldView, TickContext,
    WorldMut, WorldView,
};
use npc_nav::{NavGrid, NavPath, Pathfinder};

/// Kinematic double: every force translates the entity by the force vector.
#[derive(Default)]
struct StepWorld {
    positions: BTreeMap<u32, Vec3>,
    orientations: BTreeMap<u32, Quat>,
    forces: Vec<(u32, Vec3)>,
    occluder: Option<u32>,
    /// Rays hit nothing, as with a range-limited cast.
    blind: bool,
}

impl StepWorld {
    fn with_entity(mut self, entity: u32, position: Vec3) -> Self {
        self.positions.insert(entity, position);
        self
    }
}

impl WorldView for StepWorld {
    type Entity = u32;
}

impl WorldMut for StepWorld {}

impl SpatialWorldView for StepWorld {
    fn position(&self, entity: u32) -> Option<Vec3> {
        self.positions.get(&entity).copied()
    }

    fn orientation(&self, entity: u32) -> Option<Quat> {
        self.positions.get(&entity)?;
        Some(self.orientations.get(&entity).copied().unwrap_or(Quat::IDENTITY))
    }
}

impl SpatialWorldMut for StepWorld {
    fn set_position(&mut self, entity: u32, position: Vec3) {
        self.positions.insert(entity, position);
    }

    fn set_orientation(&mut self, entity: u32, orientation: Quat) {
        self.orientations.insert(entity, orientation);
    }
}

impl PhysicsWorldMut for StepWorld {
    fn add_force(&mut self, entity: u32, force: Vec3) {
        self.forces.push((entity, force));
        if let Some(position) = self.positions.get_mut(&entity) {
            *position += force;
        }
    }
}

impl RaycastWorldView for StepWorld {
    fn raycast(&self, origin: Vec3, direction: Vec3, ignore: u32) -> Option<RayHit<u32>> {
        if self.blind {
            return None;
        }
        if let Some(occluder) = self.occluder.filter(|&o| o != ignore) {
            return Some(RayHit {
                entity: occluder,
                point: origin,
                distance: 0.0,
            });
        }

        let direction = direction.normalize_or_zero();
        self.positions
            .iter()
            .filter(|&(&entity, _)| entity != ignore)
            .filter_map(|(&entity, &position)| {
                let to = position - origin;
                let along = to.dot(direction);
                let off_axis = (to - direction * along).length();
                (along > 0.0 && off_axis < 0.5).then_some(RayHit {
                    entity,
                    point: position,
                    distance: along,
                })
            })
            .min_by(|a, b| a.distance.total_cmp(&b.distance))
    }
}

struct NoRoute;

impl Pathfinder for NoRoute {
    fn find_path(&self, _start: Vec3, _end: Vec3) -> Option<NavPath> {
        None
    }
}

const AGENT: u32 = 1;
const PLAYER: u32 = 2;
const WALL: u32 = 3;

fn unit_force() -> PatrolConfig {
    PatrolConfig {
        patrol_force: 1.0,
        chase_force: 1.0,
        ..PatrolConfig::default()
    }
}

#[test]
fn go_to_room_succeeds_exactly_when_within_arrival_distance() {
    let mut world = StepWorld::default().with_entity(AGENT, Vec3::ZERO);
    let mut patrol = PatrolController::<StepWorld>::new(
        AGENT,
        vec![Vec3::ZERO, Vec3::new(2.0, 0.0, 0.0)],
        unit_force(),
    );
    let mut ctx = TickContext::new(1, 1.0);
    let mut tick = |patrol: &mut PatrolController<StepWorld>, world: &mut StepWorld| {
        let state = patrol.update(&ctx, world);
        ctx = ctx.next();
        state
    };

    // Run 1: setup tick, then already standing on waypoint 0.
    assert_eq!(tick(&mut patrol, &mut world), BehaviourState::Ongoing);
    assert_eq!(tick(&mut patrol, &mut world), BehaviourState::Success);
    assert_eq!(patrol.cursor(), 1);
    assert!(world.forces.is_empty(), "no force inside the arrival threshold");

    // Run 2: waypoint 1 is 2 units away and each tick moves the agent 1 unit.
    assert_eq!(tick(&mut patrol, &mut world), BehaviourState::Ongoing);
    assert_eq!(tick(&mut patrol, &mut world), BehaviourState::Ongoing);
    assert_eq!(world.positions[&AGENT], Vec3::new(1.0, 0.0, 0.0));
    assert_eq!(tick(&mut patrol, &mut world), BehaviourState::Ongoing);
    assert_eq!(patrol.memory().distance_to_waypoint(), 1.0);
    assert_eq!(world.positions[&AGENT], Vec3::new(2.0, 0.0, 0.0));
    assert_eq!(tick(&mut patrol, &mut world), BehaviourState::Success);

    // Lap restart.
    assert_eq!(patrol.cursor(), 0);
    assert_eq!(patrol.completed_runs(), 2);
    assert_eq!(patrol.last_outcome(), Some(BehaviourState::Success));
    assert_eq!(
        world.forces,
        vec![
            (AGENT, Vec3::new(1.0, 0.0, 0.0)),
            (AGENT, Vec3::new(1.0, 0.0, 0.0)),
        ]
    );
}

#[test]
fn patrol_applies_configured_force_towards_waypoint() {
    let mut world = StepWorld::default().with_entity(AGENT, Vec3::ZERO);
    let mut patrol = PatrolController::<StepWorld>::new(
        AGENT,
        vec![Vec3::new(0.0, 0.0, 100.0)],
        PatrolConfig::default(),
    );
    let ctx = TickContext::new(0, 0.1);

    patrol.update(&ctx, &mut world);
    patrol.update(&ctx.next(), &mut world);

    assert_eq!(world.forces, vec![(AGENT, Vec3::new(0.0, 0.0, 20.0))]);
}

#[test]
fn cursor_wraps_after_last_waypoint() {
    let points = vec![Vec3::X, Vec3::Y, Vec3::Z];
    let mut memory = PatrolMemory::<u32>::new(points, PatrolConfig::default());

    memory.advance();
    memory.advance();
    assert_eq!(memory.cursor(), 2);
    assert_eq!(memory.current_waypoint(), Some(Vec3::Z));

    memory.advance();
    assert_eq!(memory.cursor(), 0);
    assert_eq!(memory.current_waypoint(), Some(Vec3::X));

    let mut empty = PatrolMemory::<u32>::new(Vec::new(), PatrolConfig::default());
    empty.advance();
    assert_eq!(empty.current_waypoint(), None);
}

#[test]
fn missing_path_leaves_controller_idle() {
    let mut world = StepWorld::default().with_entity(AGENT, Vec3::ZERO);
    let mut patrol = PatrolController::<StepWorld>::from_path(
        AGENT,
        &NoRoute,
        Vec3::ZERO,
        Vec3::new(5.0, 0.0, 0.0),
        PatrolConfig::default(),
    );

    assert!(patrol.is_idle());
    let mut ctx = TickContext::new(0, 0.1);
    for _ in 0..5 {
        assert_eq!(patrol.update(&ctx, &mut world), BehaviourState::Initialise);
        ctx = ctx.next();
    }
    assert!(world.forces.is_empty());
    assert_eq!(patrol.completed_runs(), 0);
}

#[test]
fn from_path_uses_grid_route_in_travel_order() {
    let grid = NavGrid::new(3, 1, 1.0);
    let patrol = PatrolController::<StepWorld>::from_path(
        AGENT,
        &grid,
        Vec3::ZERO,
        Vec3::new(2.0, 0.0, 0.0),
        PatrolConfig::default(),
    );

    assert!(!patrol.is_idle());
    assert_eq!(
        patrol.waypoints(),
        &[Vec3::ZERO, Vec3::new(1.0, 0.0, 0.0), Vec3::new(2.0, 0.0, 0.0)]
    );
    assert_eq!(patrol.root_name(), "Root Sequence");
}

#[test]
fn chase_fails_when_target_is_not_first_hit() {
    let mut world = StepWorld::default()
        .with_entity(AGENT, Vec3::ZERO)
        .with_entity(PLAYER, Vec3::new(5.0, 0.0, 0.0));
    world.occluder = Some(WALL);

    let mut memory = PatrolMemory::new(Vec::new(), unit_force());
    memory.set_target(Some(PLAYER));
    let mut chase = BehaviourAction::<StepWorld, PatrolMemory<u32>>::new(
        "Chase Player",
        chase_player::<StepWorld>,
    );

    let ctx = TickContext::new(0, 0.1);
    assert_eq!(
        chase.execute(&ctx, AGENT, &mut world, &mut memory),
        BehaviourState::Failure
    );
    assert!(world.forces.is_empty());
}

#[test]
fn chase_fails_without_target() {
    let mut world = StepWorld::default().with_entity(AGENT, Vec3::ZERO);
    let mut memory = PatrolMemory::new(Vec::new(), unit_force());
    let mut chase = BehaviourAction::<StepWorld, PatrolMemory<u32>>::new(
        "Chase Player",
        chase_player::<StepWorld>,
    );

    let ctx = TickContext::new(0, 0.1);
    assert_eq!(
        chase.execute(&ctx, AGENT, &mut world, &mut memory),
        BehaviourState::Failure
    );
}

#[test]
fn chase_keeps_pushing_when_ray_hits_nothing() {
    let mut world = StepWorld::default()
        .with_entity(AGENT, Vec3::ZERO)
        .with_entity(PLAYER, Vec3::new(5.0, 0.0, 0.0));
    let mut memory = PatrolMemory::new(Vec::new(), unit_force());
    memory.set_target(Some(PLAYER));
    let mut chase = BehaviourAction::<StepWorld, PatrolMemory<u32>>::new(
        "Chase Player",
        chase_player::<StepWorld>,
    );

    let ctx = TickContext::new(0, 0.1);
    assert_eq!(
        chase.execute(&ctx, AGENT, &mut world, &mut memory),
        BehaviourState::Ongoing
    );

    world.blind = true;
    assert_eq!(
        chase.execute(&ctx.next(), AGENT, &mut world, &mut memory),
        BehaviourState::Ongoing
    );
    assert_eq!(world.forces, vec![(AGENT, Vec3::new(1.0, 0.0, 0.0))]);
}

#[test]
fn chase_does_not_start_when_ray_hits_nothing() {
    let mut world = StepWorld::default()
        .with_entity(AGENT, Vec3::ZERO)
        .with_entity(PLAYER, Vec3::new(5.0, 0.0, 0.0));
    world.blind = true;
    let mut memory = PatrolMemory::new(Vec::new(), unit_force());
    memory.set_target(Some(PLAYER));
    let mut chase = BehaviourAction::<StepWorld, PatrolMemory<u32>>::new(
        "Chase Player",
        chase_player::<StepWorld>,
    );

    let ctx = TickContext::new(0, 0.1);
    assert_eq!(
        chase.execute(&ctx, AGENT, &mut world, &mut memory),
        BehaviourState::Failure
    );
    assert!(world.forces.is_empty());
}

#[test]
fn target_appearing_mid_leg_waits_for_next_waypoint() {
    let mut world = StepWorld::default()
        .with_entity(AGENT, Vec3::ZERO)
        .with_entity(PLAYER, Vec3::new(5.0, 0.0, 0.0));
    world.occluder = Some(WALL);
    let config = PatrolConfig {
        chase: true,
        ..unit_force()
    };
    let mut patrol =
        PatrolController::<StepWorld>::new(AGENT, vec![Vec3::new(0.0, 0.0, -10.0)], config);
    patrol.set_target(Some(PLAYER));

    let mut ctx = TickContext::new(0, 0.1);
    // Chase fails behind the wall, then Go To Room starts.
    for _ in 0..2 {
        assert_eq!(patrol.update(&ctx, &mut world), BehaviourState::Ongoing);
        ctx = ctx.next();
    }

    world.occluder = None;
    for _ in 0..3 {
        assert_eq!(patrol.update(&ctx, &mut world), BehaviourState::Ongoing);
        ctx = ctx.next();
    }

    assert_eq!(world.forces.len(), 3);
    for (_, force) in &world.forces {
        assert_eq!(*force, Vec3::new(0.0, 0.0, -1.0), "still patrolling, not chasing");
    }
}

#[test]
fn chase_follows_visible_target_then_falls_back_to_patrol() {
    let mut world = StepWorld::default()
        .with_entity(AGENT, Vec3::ZERO)
        .with_entity(PLAYER, Vec3::new(5.0, 0.0, 0.0));
    let config = PatrolConfig {
        chase: true,
        ..unit_force()
    };
    let mut patrol =
        PatrolController::<StepWorld>::new(AGENT, vec![Vec3::new(0.0, 0.0, -10.0)], config);
    patrol.set_target(Some(PLAYER));
    assert_eq!(patrol.root_name(), "Root Selector");

    let mut ctx = TickContext::new(0, 0.1);
    let mut tick = |patrol: &mut PatrolController<StepWorld>, world: &mut StepWorld| {
        let state = patrol.update(&ctx, world);
        ctx = ctx.next();
        state
    };

    // Spotted, then one chase step towards the player.
    assert_eq!(tick(&mut patrol, &mut world), BehaviourState::Ongoing);
    assert_eq!(tick(&mut patrol, &mut world), BehaviourState::Ongoing);
    assert_eq!(world.forces, vec![(AGENT, Vec3::new(1.0, 0.0, 0.0))]);

    // Line of sight lost: chase fails and the selector moves on to patrolling.
    world.occluder = Some(WALL);
    assert_eq!(tick(&mut patrol, &mut world), BehaviourState::Ongoing);
    assert_eq!(world.forces.len(), 1);

    // Go To Room setup, then a push towards the waypoint.
    assert_eq!(tick(&mut patrol, &mut world), BehaviourState::Ongoing);
    assert_eq!(tick(&mut patrol, &mut world), BehaviourState::Ongoing);
    assert_eq!(world.forces.len(), 2);
    let (_, push) = world.forces[1];
    assert!(push.z < 0.0, "patrol force should point at the waypoint: {push:?}");
}

#[test]
fn look_around_waits_then_turns() {
    let mut world = StepWorld::default().with_entity(AGENT, Vec3::ZERO);
    let config = PatrolConfig {
        look_around: true,
        look_around_seconds: 1.0,
        ..unit_force()
    };
    let mut patrol = PatrolController::<StepWorld>::new(AGENT, vec![Vec3::ZERO], config);

    let mut ctx = TickContext::new(0, 0.5);
    let mut states = Vec::new();
    for _ in 0..5 {
        states.push(patrol.update(&ctx, &mut world));
        ctx = ctx.next();
    }

    assert_eq!(
        states,
        vec![
            BehaviourState::Ongoing, // Go To Room setup
            BehaviourState::Ongoing, // arrived, sequence moves to Look Around
            BehaviourState::Ongoing, // countdown armed
            BehaviourState::Ongoing, // 0.5s left
            BehaviourState::Success, // turned
        ]
    );

    let expected = Quat::from_rotation_y(5.0_f32.to_radians());
    let orientation = world.orientation(AGENT).unwrap();
    assert!(orientation.abs_diff_eq(expected, 1e-6), "{orientation:?}");
}

#[test]
fn patrol_laps_in_sandbox() {
    let mut sandbox = Sandbox::new(2.0);
    let agent = sandbox.spawn(Body::new(Vec3::ZERO));
    let mut patrol = PatrolController::<Sandbox>::new(
        agent,
        vec![Vec3::ZERO, Vec3::new(10.0, 0.0, 0.0)],
        PatrolConfig::default(),
    );

    let mut ctx = TickContext::new(0, 1.0 / 60.0);
    for _ in 0..600 {
        patrol.update(&ctx, &mut sandbox);
        sandbox.step(ctx.dt_seconds);
        ctx = ctx.next();
    }

    assert!(
        patrol.completed_runs() >= 2,
        "agent should reach both waypoints, got {} runs",
        patrol.completed_runs()
    );
    assert_eq!(patrol.last_outcome(), Some(BehaviourState::Success));
}
