use std::borrow::Cow;

use npc_core::{TickContext, WorldMut, WorldView};

use crate::bt::{BehaviourNode, BehaviourState};

/// Decision function of a [`BehaviourAction`].
///
/// Receives the action's current state (`Initialise` on the first call of a
/// run, `Ongoing` afterwards) and returns the next one. Anything that must
/// survive between ticks belongs in the memory struct `M`.
pub type ActionFn<W, M> = dyn FnMut(
    &TickContext,
    <W as WorldView>::Entity,
    &mut W,
    &mut M,
    BehaviourState,
) -> BehaviourState;

pub struct BehaviourAction<W, M>
where
    W: WorldMut + 'static,
    M: 'static,
{
    name: Cow<'static, str>,
    state: BehaviourState,
    func: Box<ActionFn<W, M>>,
}

impl<W, M> BehaviourAction<W, M>
where
    W: WorldMut + 'static,
    M: 'static,
{
    pub fn new(
        name: impl Into<Cow<'static, str>>,
        func: impl FnMut(&TickContext, W::Entity, &mut W, &mut M, BehaviourState) -> BehaviourState
            + 'static,
    ) -> Self {
        Self {
            name: name.into(),
            state: BehaviourState::Initialise,
            func: Box::new(func),
        }
    }
}

impl<W, M> BehaviourNode<W, M> for BehaviourAction<W, M>
where
    W: WorldMut + 'static,
    M: 'static,
{
    fn name(&self) -> &str {
        &self.name
    }

    fn state(&self) -> BehaviourState {
        self.state
    }

    fn execute(
        &mut self,
        ctx: &TickContext,
        entity: W::Entity,
        world: &mut W,
        memory: &mut M,
    ) -> BehaviourState {
        if self.state.is_terminal() {
            return self.state;
        }

        let next = (self.func)(ctx, entity, world, memory, self.state);
        if next != self.state {
            tracing::trace!(
                tick = ctx.tick,
                node = %self.name,
                from = ?self.state,
                to = ?next,
                "action state changed"
            );
        }
        self.state = next;
        next
    }

    fn reset(&mut self) {
        self.state = BehaviourState::Initialise;
    }
}

/// Runs children in order; succeeds once every child has succeeded.
///
/// The active child is remembered across ticks, and at most one child is
/// advanced per tick. An empty sequence succeeds immediately.
pub struct BehaviourSequence<W, M>
where
    W: WorldMut + 'static,
    M: 'static,
{
    name: Cow<'static, str>,
    state: BehaviourState,
    children: Vec<Box<dyn BehaviourNode<W, M>>>,
    active: Option<usize>,
}

impl<W, M> BehaviourSequence<W, M>
where
    W: WorldMut + 'static,
    M: 'static,
{
    pub fn new(name: impl Into<Cow<'static, str>>) -> Self {
        Self {
            name: name.into(),
            state: BehaviourState::Initialise,
            children: Vec::new(),
            active: None,
        }
    }

    pub fn with_child(mut self, child: impl BehaviourNode<W, M>) -> Self {
        self.add_child(Box::new(child));
        self
    }

    pub fn add_child(&mut self, child: Box<dyn BehaviourNode<W, M>>) {
        self.children.push(child);
    }

    pub fn children_len(&self) -> usize {
        self.children.len()
    }

    /// Index of the child currently being evaluated, `None` before the first
    /// tick of a run.
    pub fn active_child(&self) -> Option<usize> {
        self.active
    }
}

impl<W, M> BehaviourNode<W, M> for BehaviourSequence<W, M>
where
    W: WorldMut + 'static,
    M: 'static,
{
    fn name(&self) -> &str {
        &self.name
    }

    fn state(&self) -> BehaviourState {
        self.state
    }

    fn execute(
        &mut self,
        ctx: &TickContext,
        entity: W::Entity,
        world: &mut W,
        memory: &mut M,
    ) -> BehaviourState {
        if self.state.is_terminal() {
            return self.state;
        }
        if self.children.is_empty() {
            self.state = BehaviourState::Success;
            return self.state;
        }

        let index = *self.active.get_or_insert(0);
        let status = self.children[index].execute(ctx, entity, world, memory);
        self.state = match status {
            BehaviourState::Initialise | BehaviourState::Ongoing => BehaviourState::Ongoing,
            BehaviourState::Failure => BehaviourState::Failure,
            BehaviourState::Success => {
                let next = index + 1;
                if next < self.children.len() {
                    self.children[next].reset();
                    self.active = Some(next);
                    tracing::trace!(
                        tick = ctx.tick,
                        node = %self.name,
                        child = self.children[next].name(),
                        "sequence advanced"
                    );
                    BehaviourState::Ongoing
                } else {
                    BehaviourState::Success
                }
            }
        };
        self.state
    }

    fn reset(&mut self) {
        self.state = BehaviourState::Initialise;
        self.active = None;
        for c in self.children.iter_mut() {
            c.reset();
        }
    }
}

/// Runs children in order until one succeeds; fails once every child has
/// failed.
///
/// Mirrors [`BehaviourSequence`]: one child advances per tick, and an empty
/// selector succeeds immediately.
pub struct BehaviourSelector<W, M>
where
    W: WorldMut + 'static,
    M: 'static,
{
    name: Cow<'static, str>,
    state: BehaviourState,
    children: Vec<Box<dyn BehaviourNode<W, M>>>,
    active: Option<usize>,
}

impl<W, M> BehaviourSelector<W, M>
where
    W: WorldMut + 'static,
    M: 'static,
{
    pub fn new(name: impl Into<Cow<'static, str>>) -> Self {
        Self {
            name: name.into(),
            state: BehaviourState::Initialise,
            children: Vec::new(),
            active: None,
        }
    }

    pub fn with_child(mut self, child: impl BehaviourNode<W, M>) -> Self {
        self.add_child(Box::new(child));
        self
    }

    pub fn add_child(&mut self, child: Box<dyn BehaviourNode<W, M>>) {
        self.children.push(child);
    }

    pub fn children_len(&self) -> usize {
        self.children.len()
    }

    pub fn active_child(&self) -> Option<usize> {
        self.active
    }
}

impl<W, M> BehaviourNode<W, M> for BehaviourSelector<W, M>
where
    W: WorldMut + 'static,
    M: 'static,
{
    fn name(&self) -> &str {
        &self.name
    }

    fn state(&self) -> BehaviourState {
        self.state
    }

    fn execute(
        &mut self,
        ctx: &TickContext,
        entity: W::Entity,
        world: &mut W,
        memory: &mut M,
    ) -> BehaviourState {
        if self.state.is_terminal() {
            return self.state;
        }
        if self.children.is_empty() {
            self.state = BehaviourState::Success;
            return self.state;
        }

        let index = *self.active.get_or_insert(0);
        let status = self.children[index].execute(ctx, entity, world, memory);
        self.state = match status {
            BehaviourState::Initialise | BehaviourState::Ongoing => BehaviourState::Ongoing,
            BehaviourState::Success => BehaviourState::Success,
            BehaviourState::Failure => {
                let next = index + 1;
                if next < self.children.len() {
                    self.children[next].reset();
                    self.active = Some(next);
                    tracing::trace!(
                        tick = ctx.tick,
                        node = %self.name,
                        child = self.children[next].name(),
                        "selector fell through"
                    );
                    BehaviourState::Ongoing
                } else {
                    BehaviourState::Failure
                }
            }
        };
        self.state
    }

    fn reset(&mut self) {
        self.state = BehaviourState::Initialise;
        self.active = None;
        for c in self.children.iter_mut() {
            c.reset();
        }
    }
}
