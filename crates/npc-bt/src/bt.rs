use npc_core::{TickContext, WorldMut};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum BehaviourState {
    /// Not evaluated yet in the current run.
    #[default]
    Initialise,
    Ongoing,
    Success,
    Failure,
}

impl BehaviourState {
    pub fn is_terminal(self) -> bool {
        matches!(self, BehaviourState::Success | BehaviourState::Failure)
    }
}

/// A node of a behaviour tree.
///
/// `W` is the world collaborator and `M` the memory struct owned by the
/// controller driving the tree. Nodes are owned by their parent composite.
pub trait BehaviourNode<W, M>: 'static
where
    W: WorldMut + 'static,
    M: 'static,
{
    fn name(&self) -> &str;

    fn state(&self) -> BehaviourState;

    /// Apply exactly one tick of evaluation and return the new state.
    ///
    /// Once the node reports `Success` or `Failure`, further calls return that
    /// state unchanged until [`BehaviourNode::reset`].
    fn execute(
        &mut self,
        ctx: &TickContext,
        entity: W::Entity,
        world: &mut W,
        memory: &mut M,
    ) -> BehaviourState;

    /// Return this node and all of its descendants to `Initialise`.
    fn reset(&mut self);
}
