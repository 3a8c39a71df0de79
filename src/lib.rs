#![warn(missing_docs)]

//! # `linkbone`
//!
//! A solver for path-drawing grid puzzles in the family of [Numberlink](https://en.wikipedia.org/wiki/Numberlink), as laid out in a puzzle editor.
//! A puzzle is a list of [`Entity`]s placed at integer coordinates: floor cells a path may cross, endpoints to be joined in pairs,
//! cells every path must visit, Slitherlink-style vertex clues, and line or cross hints on individual edges.
//!
//! Begin by loading a [`Puzzle`], either from JSON with [`Puzzle::from_json`] or by placing entities with [`Puzzle::place`].
//! Then either call [`solve()`] for one solution, or [`deduct()`] for the lines and crosses shared by every solution.
//! Both return an [`Outcome`]; the marks they produce can be merged back into the puzzle with [`Puzzle::merge_marks`].
//! Long-running work may be moved off-thread with [`worker::spawn`] and aborted through its handle.
//!
//! # Internals
//! This crate is driven by expressing the problem as a Boolean satisfiability problem (a "SAT"), extracting information from that solver, and re-expressing the puzzle accordingly.
//! Every point of the puzzle's bounding rectangle holds one of eleven [`Symbol`]s describing how a path passes through it,
//! and every edge between neighboring points is either drawn or not. See [`model::PuzzleModel`] for the constraints relating the two.
//!
//! Deduction computes the *backbone* of the edge variables: starting from one solution, it repeatedly asks the SAT engine for a solution
//! differing on at least one edge still believed fixed, and discards whatever differed, until no such solution exists.
//! The SAT engine is abstracted as an [`Engine`] so the loop may run on any solver capable of assumptions; [`varisat`] is the default.

pub use backbone::{backbone, deduct, deduct_with};
pub use cancel::CancelToken;
pub use engine::{Assignment, Engine, EngineError};
pub use entity::{EdgeMark, Entity, EntityError, EntityKind, EntityRecord, HintStyle};
pub use location::{Bounds, Location};
pub use puzzle::{Puzzle, PuzzleError};
pub use solver::{solve, solve_solution_with, solve_with, Outcome, Report, Solution, SolverFailure, Status};
pub use step::Step;
pub use symbol::Symbol;

mod tests;
pub mod backbone;
pub(crate) mod cancel;
pub(crate) mod engine;
pub mod entity;
pub mod grid;
pub(crate) mod location;
pub(crate) mod logic;
pub mod model;
pub(crate) mod puzzle;
pub(crate) mod solver;
pub(crate) mod step;
pub(crate) mod symbol;
pub mod worker;
#[cfg(feature = "wasm")]
pub mod wasm;
