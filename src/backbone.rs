//! Edges shared by every solution.

use std::collections::HashSet;

use itertools::Itertools;
use log::{debug, info};
use varisat::{Lit, Solver};

use crate::cancel::CancelToken;
use crate::engine::Engine;
use crate::entity::{EdgeMark, Entity};
use crate::model::PuzzleModel;
use crate::solver::{Outcome, SolverFailure};

/// Narrow `candidates`, the literals true in some known solution, down to those true in every solution.
///
/// Each round asks for a solution flipping at least one remaining candidate, through a clause guarded by a fresh activation literal.
/// Whatever flipped is dropped; once no such solution exists, the remainder is the backbone.
/// The guard is retired after every round, so `engine` is left with no extra constraints in force.
///
/// Makes at most `candidates.len() + 1` engine calls, and none if `candidates` is empty.
pub fn backbone<E: Engine>(engine: &mut E, candidates: Vec<Lit>, cancel: &CancelToken) -> Result<Vec<Lit>, SolverFailure> {
    let mut candidates = candidates;
    let mut round = 0usize;

    while !candidates.is_empty() {
        cancel.check()?;
        round += 1;

        // activation => at least one candidate differs
        let activation = engine.new_var().positive();
        let mut clause = Vec::with_capacity(candidates.len() + 1);
        clause.push(!activation);
        clause.extend(candidates.iter().map(|lit| !*lit));
        engine.add_clause(&clause);

        let found = engine.solve_under(&[activation]);
        engine.add_clause(&[!activation]);

        let Some(assignment) = found? else {
            debug!("round {round}: no differing solution, {} remain", candidates.len());
            break;
        };

        let before = candidates.len();
        candidates.retain(|lit| assignment.holds(*lit));
        if candidates.len() == before {
            return Err(SolverFailure::ContractViolation);
        }
        debug!("round {round}: dropped {}, {} remain", before - candidates.len(), candidates.len());
    }

    Ok(candidates)
}

/// Deduce every edge that is present, or absent, in all solutions of `entities`.
///
/// Forced edges become line marks. Forbidden edges become cross marks, but only between two floor points;
/// crosses elsewhere say nothing a solver could not see already.
pub fn deduct_with<E: Engine>(entities: &[Entity], engine: E, cancel: &CancelToken) -> Result<Outcome, SolverFailure> {
    let Some(mut model) = PuzzleModel::build(entities, engine) else {
        return Ok(Outcome::NoModel);
    };
    info!("deducing on {} entities: {:?}", entities.len(), model.stats());

    cancel.check()?;
    let Some(first) = model.solve()? else {
        info!("no solution");
        return Ok(Outcome::Unsolvable);
    };

    let edges = model.lattice().edges().collect_vec();
    let candidates = edges.iter()
        .filter_map(|edge| model.edge_var(edge))
        .map(|var| var.lit(first.value(var)))
        .collect_vec();

    let survivors: HashSet<Lit> = backbone(model.engine_mut(), candidates, cancel)?.into_iter().collect();

    let marks = edges.iter()
        .filter_map(|edge| {
            let var = model.edge_var(edge)?;
            if survivors.contains(&var.positive()) {
                Some(EdgeMark::line(edge.origin, edge.step))
            } else if survivors.contains(&var.negative()) && model.is_floor(edge.origin) && model.is_floor(edge.target()) {
                Some(EdgeMark::cross(edge.origin, edge.step))
            } else {
                None
            }
        })
        .collect_vec();

    info!("deduced {} marks from {} fixed edges", marks.len(), survivors.len());
    Ok(Outcome::Solved(marks))
}

/// Deduce every edge that is present, or absent, in all solutions of `entities`.
pub fn deduct(entities: &[Entity]) -> Result<Outcome, SolverFailure> {
    deduct_with(entities, Solver::new(), &CancelToken::new())
}
