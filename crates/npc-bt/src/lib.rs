//! Behaviour tree runtime built on `npc-core`.
//!
//! Trees are evaluated once per tick. Leaves are plain functions over a
//! controller-owned memory struct, so a tree carries no hidden state beyond each
//! node's [`BehaviourState`] and each composite's active-child cursor.

#![cfg_attr(docsrs, feature(doc_cfg))]
#![forbid(unsafe_code)]

pub mod bt;
pub mod nodes;
pub mod runner;

pub use bt::{BehaviourNode, BehaviourState};
pub use nodes::{ActionFn, BehaviourAction, BehaviourSelector, BehaviourSequence};
pub use runner::BehaviourRunner;
