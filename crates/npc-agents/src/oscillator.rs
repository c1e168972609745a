//! Two-state oscillating controller.
//!
//! "move left" translates by `left_step` and counts time up; "move right"
//! translates by `right_step` and counts time down. The machine flips once the
//! counter leaves `[lower_bound, upper_bound]`.

use glam::Vec3;
use npc_core::{SpatialWorldMut, TickContext};
use npc_fsm::{FsmError, State, StateId, StateMachine, StateTransition};

use crate::config::OscillatorConfig;

#[derive(Debug, Clone, PartialEq)]
pub struct OscillatorMemory {
    pub counter: f32,
    pub config: OscillatorConfig,
}

impl OscillatorMemory {
    pub fn new(config: OscillatorConfig) -> Self {
        Self {
            counter: 0.0,
            config,
        }
    }
}

fn translate<W: SpatialWorldMut>(world: &mut W, entity: W::Entity, step: Vec3) {
    if let Some(position) = world.position(entity) {
        world.set_position(entity, position + step);
    }
}

fn move_left<W: SpatialWorldMut>(
    ctx: &TickContext,
    entity: W::Entity,
    world: &mut W,
    memory: &mut OscillatorMemory,
) {
    translate(world, entity, memory.config.left_step);
    memory.counter += ctx.dt_seconds;
}

fn move_right<W: SpatialWorldMut>(
    ctx: &TickContext,
    entity: W::Entity,
    world: &mut W,
    memory: &mut OscillatorMemory,
) {
    translate(world, entity, memory.config.right_step);
    memory.counter -= ctx.dt_seconds;
}

pub struct OscillatorController<W>
where
    W: SpatialWorldMut + 'static,
{
    entity: W::Entity,
    memory: OscillatorMemory,
    machine: StateMachine<W, OscillatorMemory>,
    move_left: StateId,
    move_right: StateId,
}

impl<W> OscillatorController<W>
where
    W: SpatialWorldMut + 'static,
{
    pub fn new(entity: W::Entity, config: OscillatorConfig) -> Result<Self, FsmError> {
        let mut machine: StateMachine<W, OscillatorMemory> = StateMachine::new();
        let left = machine.add_state(State::new("move left", move_left::<W>));
        let right = machine.add_state(State::new("move right", move_right::<W>));

        machine.add_transition(StateTransition::new(
            left,
            right,
            |_: &TickContext, _: W::Entity, _: &W, memory: &OscillatorMemory| {
                memory.counter > memory.config.upper_bound
            },
        ))?;
        machine.add_transition(StateTransition::new(
            right,
            left,
            |_: &TickContext, _: W::Entity, _: &W, memory: &OscillatorMemory| {
                memory.counter < memory.config.lower_bound
            },
        ))?;

        Ok(Self {
            entity,
            memory: OscillatorMemory::new(config),
            machine,
            move_left: left,
            move_right: right,
        })
    }

    /// Run one tick. Returns the new state when the direction flipped.
    pub fn update(&mut self, ctx: &TickContext, world: &mut W) -> Option<StateId> {
        self.machine
            .update(ctx, self.entity, world, &mut self.memory)
    }

    pub fn entity(&self) -> W::Entity {
        self.entity
    }

    pub fn counter(&self) -> f32 {
        self.memory.counter
    }

    pub fn active_state(&self) -> Option<StateId> {
        self.machine.active_state()
    }

    pub fn active_state_name(&self) -> Option<&str> {
        self.machine.active_state_name()
    }

    pub fn is_moving_left(&self) -> bool {
        self.machine.active_state() == Some(self.move_left)
    }

    pub fn is_moving_right(&self) -> bool {
        self.machine.active_state() == Some(self.move_right)
    }

    pub fn machine(&self) -> &StateMachine<W, OscillatorMemory> {
        &self.machine
    }
}
