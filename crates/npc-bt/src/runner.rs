use npc_core::{TickContext, WorldMut};

use crate::bt::{BehaviourNode, BehaviourState};

/// Per-tick driver for a behaviour tree.
///
/// The runner moves `Initialise -> Ongoing` when a run starts, executes the
/// root once per tick, and resets the tree once the root reports a terminal
/// state so the next tick starts a fresh run.
pub struct BehaviourRunner<W, M>
where
    W: WorldMut + 'static,
    M: 'static,
{
    root: Box<dyn BehaviourNode<W, M>>,
    state: BehaviourState,
    last_outcome: Option<BehaviourState>,
    completed_runs: u64,
}

impl<W, M> BehaviourRunner<W, M>
where
    W: WorldMut + 'static,
    M: 'static,
{
    pub fn new(root: Box<dyn BehaviourNode<W, M>>) -> Self {
        Self {
            root,
            state: BehaviourState::Initialise,
            last_outcome: None,
            completed_runs: 0,
        }
    }

    pub fn root(&self) -> &dyn BehaviourNode<W, M> {
        self.root.as_ref()
    }

    /// `Initialise` between runs, `Ongoing` while a run is in progress.
    pub fn state(&self) -> BehaviourState {
        self.state
    }

    /// Terminal state of the most recently completed run.
    pub fn last_outcome(&self) -> Option<BehaviourState> {
        self.last_outcome
    }

    pub fn completed_runs(&self) -> u64 {
        self.completed_runs
    }

    /// Abandon the current run.
    pub fn reset(&mut self) {
        self.root.reset();
        self.state = BehaviourState::Initialise;
    }

    pub fn tick(
        &mut self,
        ctx: &TickContext,
        entity: W::Entity,
        world: &mut W,
        memory: &mut M,
    ) -> BehaviourState {
        if self.state == BehaviourState::Initialise {
            self.state = BehaviourState::Ongoing;
            tracing::debug!(
                tick = ctx.tick,
                entity = ?entity,
                root = self.root.name(),
                "behaviour run started"
            );
        }

        let status = self.root.execute(ctx, entity, world, memory);
        match status {
            BehaviourState::Success => {
                tracing::info!(
                    tick = ctx.tick,
                    entity = ?entity,
                    root = self.root.name(),
                    "behaviour run succeeded"
                );
            }
            BehaviourState::Failure => {
                tracing::info!(
                    tick = ctx.tick,
                    entity = ?entity,
                    root = self.root.name(),
                    "behaviour run failed"
                );
            }
            BehaviourState::Initialise | BehaviourState::Ongoing => return status,
        }

        self.completed_runs = self.completed_runs.saturating_add(1);
        self.last_outcome = Some(status);
        self.reset();
        status
    }
}
