use thiserror::Error;

use crate::StateId;

/// Configuration errors raised while wiring a [`crate::StateMachine`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum FsmError {
    #[error("transition source {0} is not registered with this state machine")]
    InvalidTransitionSource(StateId),

    #[error("transition target {0} is not registered with this state machine")]
    InvalidTransitionTarget(StateId),

    #[error("state {0} is not registered with this state machine")]
    UnknownState(StateId),
}
