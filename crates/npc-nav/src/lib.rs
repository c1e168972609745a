//! Navigation primitives: waypoint paths, the pathfinding collaborator trait,
//! and a grid A* backend that loads the classic `Maze.txt` layout.

#![cfg_attr(docsrs, feature(doc_cfg))]
#![forbid(unsafe_code)]

pub mod error;
pub mod grid;
pub mod path;

pub use error::NavError;
pub use grid::NavGrid;
pub use path::{NavPath, Pathfinder};
