use std::sync::atomic::{AtomicU32, Ordering};

use npc_core::{TickContext, WorldMut};

use crate::{FsmError, State, StateId, StateTransition};

static NEXT_MACHINE_ID: AtomicU32 = AtomicU32::new(1);

/// Discrete-state automaton with guarded edges.
///
/// The first state added becomes the active one. Every `update` runs the
/// active state's body, then scans transitions out of that state in
/// registration order and fires the first whose guard holds.
pub struct StateMachine<W, M>
where
    W: WorldMut + 'static,
    M: 'static,
{
    id: u32,
    states: Vec<State<W, M>>,
    transitions: Vec<StateTransition<W, M>>,
    active: Option<StateId>,
}

impl<W, M> StateMachine<W, M>
where
    W: WorldMut + 'static,
    M: 'static,
{
    pub fn new() -> Self {
        Self {
            id: NEXT_MACHINE_ID.fetch_add(1, Ordering::Relaxed),
            states: Vec::new(),
            transitions: Vec::new(),
            active: None,
        }
    }

    pub fn add_state(&mut self, state: State<W, M>) -> StateId {
        let id = StateId {
            machine: self.id,
            index: self.states.len() as u32,
        };
        self.states.push(state);
        if self.active.is_none() {
            self.active = Some(id);
        }
        id
    }

    /// Register a transition. Both endpoints must have been issued by this
    /// machine's [`StateMachine::add_state`].
    pub fn add_transition(&mut self, transition: StateTransition<W, M>) -> Result<(), FsmError> {
        if !self.contains(transition.from) {
            return Err(FsmError::InvalidTransitionSource(transition.from));
        }
        if !self.contains(transition.to) {
            return Err(FsmError::InvalidTransitionTarget(transition.to));
        }
        self.transitions.push(transition);
        Ok(())
    }

    pub fn contains(&self, id: StateId) -> bool {
        id.machine == self.id && id.index() < self.states.len()
    }

    pub fn active_state(&self) -> Option<StateId> {
        self.active
    }

    pub fn active_state_name(&self) -> Option<&str> {
        self.state_name(self.active?)
    }

    pub fn state_name(&self, id: StateId) -> Option<&str> {
        if !self.contains(id) {
            return None;
        }
        Some(self.states[id.index()].name())
    }

    /// Force the active state, bypassing guards.
    pub fn set_active(&mut self, id: StateId) -> Result<(), FsmError> {
        if !self.contains(id) {
            return Err(FsmError::UnknownState(id));
        }
        self.active = Some(id);
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.states.len()
    }

    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }

    pub fn transitions_len(&self) -> usize {
        self.transitions.len()
    }

    /// Advance one tick. Returns the new active state when a transition fired.
    pub fn update(
        &mut self,
        ctx: &TickContext,
        entity: W::Entity,
        world: &mut W,
        memory: &mut M,
    ) -> Option<StateId> {
        let active = self.active?;
        let state = self.states.get_mut(active.index())?;
        (state.update)(ctx, entity, world, memory);

        let world_view: &W = &*world;
        let memory_view: &M = &*memory;
        let next = self
            .transitions
            .iter_mut()
            .filter(|t| t.from == active)
            .find_map(|t| (t.guard)(ctx, entity, world_view, memory_view).then_some(t.to))?;

        self.active = Some(next);
        tracing::debug!(
            tick = ctx.tick,
            entity = ?entity,
            from = self.states[active.index()].name(),
            to = self.states[next.index()].name(),
            "state transition"
        );
        Some(next)
    }
}

impl<W, M> Default for StateMachine<W, M>
where
    W: WorldMut + 'static,
    M: 'static,
{
    fn default() -> Self {
        Self::new()
    }
}
