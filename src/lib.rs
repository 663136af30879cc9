//! Decides whether a set of boxes fits into a single container, using a
//! time-boxed backtracking search over extreme-point anchors.

pub mod config;
pub mod error;
pub mod export;
pub mod extreme_point;
pub mod job;
pub mod ordering;
pub mod orientation;
pub mod render;
pub mod search;
pub mod solver;
pub mod types;
