//! JavaScript bindings.

use wasm_bindgen::prelude::*;

use crate::backbone::deduct;
use crate::puzzle::Puzzle;
use crate::solver::{solve, Outcome, Report, SolverFailure};

fn js_error(message: impl std::fmt::Display) -> JsValue {
    js_sys::Error::new(&message.to_string()).into()
}

fn run(puzzle: &str, operation: fn(&[crate::Entity]) -> Result<Outcome, SolverFailure>) -> Result<String, JsValue> {
    let puzzle = Puzzle::from_json(puzzle).map_err(js_error)?;
    let outcome = operation(puzzle.entities()).map_err(js_error)?;
    serde_json::to_string(&Report::from(outcome)).map_err(js_error)
}

/// Solve a puzzle given as a JSON array of records.
///
/// Returns a JSON object `{"status": ..., "records": [...]}`; errors are thrown as JavaScript `Error`s.
#[wasm_bindgen]
pub fn solve_json(puzzle: &str) -> Result<String, JsValue> {
    run(puzzle, solve)
}

/// Deduce the forced lines and crosses of a puzzle given as a JSON array of records.
///
/// Output and errors are as for [`solve_json`].
#[wasm_bindgen]
pub fn deduct_json(puzzle: &str) -> Result<String, JsValue> {
    run(puzzle, deduct)
}
