//! NPC controllers built on the behaviour tree and state machine runtimes.
//!
//! - [`PatrolController`] follows a precomputed waypoint loop and, when
//!   enabled, chases a tracked target while it stays in line of sight.
//! - [`OscillatorController`] moves back and forth under a two-state machine.
//! - [`Sandbox`] is a small arena world implementing every collaborator trait,
//!   used by tests and the `npc-sim` binary.

#![cfg_attr(docsrs, feature(doc_cfg))]
#![forbid(unsafe_code)]

pub mod config;
pub mod oscillator;
pub mod patrol;
pub mod sandbox;

pub use config::{OscillatorConfig, PatrolConfig, SandboxConfig, SimConfig};
pub use oscillator::{OscillatorController, OscillatorMemory};
pub use patrol::{chase_player, go_to_room, look_around, PatrolController, PatrolMemory, PatrolWorld};
pub use sandbox::{Body, EntityHandle, Sandbox};
