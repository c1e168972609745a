//! Finite state machine runtime built on `npc-core`.
//!
//! A [`StateMachine`] runs the active [`State`] once per tick, then fires at
//! most one [`StateTransition`] out of it: the first registered one whose guard
//! holds.

#![cfg_attr(docsrs, feature(doc_cfg))]
#![forbid(unsafe_code)]

pub mod error;
pub mod machine;
pub mod state;

pub use error::FsmError;
pub use machine::StateMachine;
pub use state::{GuardFn, State, StateId, StateTransition, UpdateFn};
