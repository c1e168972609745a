use std::borrow::Cow;
use std::fmt;

use npc_core::{TickContext, WorldMut, WorldView};

/// Per-tick body of a [`State`].
pub type UpdateFn<W, M> = dyn FnMut(&TickContext, <W as WorldView>::Entity, &mut W, &mut M);

/// Guard of a [`StateTransition`]. Guards only observe; they never mutate.
pub type GuardFn<W, M> = dyn FnMut(&TickContext, <W as WorldView>::Entity, &W, &M) -> bool;

/// Handle to a state registered with a particular machine.
///
/// Handles are only produced by [`crate::StateMachine::add_state`] and remember
/// which machine issued them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct StateId {
    pub(crate) machine: u32,
    pub(crate) index: u32,
}

impl StateId {
    pub fn index(self) -> usize {
        self.index as usize
    }
}

impl fmt::Display for StateId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}:{}", self.machine, self.index)
    }
}

pub struct State<W, M>
where
    W: WorldMut + 'static,
    M: 'static,
{
    name: Cow<'static, str>,
    pub(crate) update: Box<UpdateFn<W, M>>,
}

impl<W, M> State<W, M>
where
    W: WorldMut + 'static,
    M: 'static,
{
    pub fn new(
        name: impl Into<Cow<'static, str>>,
        update: impl FnMut(&TickContext, W::Entity, &mut W, &mut M) + 'static,
    ) -> Self {
        Self {
            name: name.into(),
            update: Box::new(update),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

pub struct StateTransition<W, M>
where
    W: WorldMut + 'static,
    M: 'static,
{
    pub(crate) from: StateId,
    pub(crate) to: StateId,
    pub(crate) guard: Box<GuardFn<W, M>>,
}

impl<W, M> StateTransition<W, M>
where
    W: WorldMut + 'static,
    M: 'static,
{
    pub fn new(
        from: StateId,
        to: StateId,
        guard: impl FnMut(&TickContext, W::Entity, &W, &M) -> bool + 'static,
    ) -> Self {
        Self {
            from,
            to,
            guard: Box::new(guard),
        }
    }

    pub fn source(&self) -> StateId {
        self.from
    }

    pub fn target(&self) -> StateId {
        self.to
    }
}
