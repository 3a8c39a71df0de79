use std::fmt::{Display, Formatter};

use log::info;
use ndarray::Array2;
use petgraph::graphmap::UnGraphMap;
use serde::{Deserialize, Serialize};
use varisat::Solver;

use crate::cancel::CancelToken;
use crate::engine::{Engine, EngineError};
use crate::entity::{EdgeMark, Entity, EntityRecord};
use crate::location::{Bounds, Location};
use crate::model::PuzzleModel;
use crate::step::Step;
use crate::symbol::Symbol;

/// Reasons solving or deduction may fail outright.
///
/// An unsatisfiable puzzle is not a failure; see [`Outcome::Unsolvable`].
#[derive(Debug, derive_more::Display, derive_more::Error, derive_more::From)]
pub enum SolverFailure {
    /// The engine could not answer.
    #[display("{_0}")]
    Engine(#[from] EngineError),
    /// The [`CancelToken`] was raised.
    #[display("cancelled")]
    Cancelled,
    /// The engine answered a blocking clause with an assignment the clause forbids.
    /// This should never happen with a sound engine.
    #[display("SAT engine returned an assignment violating its own constraints")]
    ContractViolation,
    /// The engine's assignment gave a point no symbol.
    /// This should probably never happen.
    #[display("no symbol found at {at:?}")]
    NoSymbolFound {
        /// The point left without a symbol.
        at: Location,
    },
}

/// The result of solving or deducing on one puzzle.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Outcome<T = Vec<EdgeMark>> {
    /// There were no entities, so there was nothing to model.
    NoModel,
    /// The constraints admit no solution.
    Unsolvable,
    /// A solution, or the marks derived from one.
    Solved(T),
}

impl<T> Outcome<T> {
    /// Which of the three this is, without the payload.
    pub fn status(&self) -> Status {
        match self {
            Self::NoModel => Status::NoModel,
            Self::Unsolvable => Status::Unsolvable,
            Self::Solved(_) => Status::Solved,
        }
    }

    /// Transform a solved payload, keeping the other outcomes.
    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Outcome<U> {
        match self {
            Self::NoModel => Outcome::NoModel,
            Self::Unsolvable => Outcome::Unsolvable,
            Self::Solved(t) => Outcome::Solved(f(t)),
        }
    }

    /// The payload, if solved.
    pub fn solved(self) -> Option<T> {
        match self {
            Self::Solved(t) => Some(t),
            _ => None,
        }
    }
}

#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Status {
    /// See [`Outcome::NoModel`].
    NoModel,
    /// See [`Outcome::Unsolvable`].
    Unsolvable,
    /// See [`Outcome::Solved`].
    Solved,
}

/// An [`Outcome`] ready for JSON: its status and, when solved, the produced records.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct Report {
    /// How the puzzle came out.
    pub status: Status,
    /// Line and cross records; empty unless solved.
    pub records: Vec<EntityRecord>,
}

impl From<Outcome> for Report {
    fn from(outcome: Outcome) -> Self {
        let status = outcome.status();
        let records = outcome.solved()
            .unwrap_or_default()
            .into_iter()
            .map(EntityRecord::from)
            .collect();

        Self { status, records }
    }
}

/// One solution: the symbol chosen at every point of the puzzle's bounds.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Solution {
    bounds: Bounds,
    symbols: Array2<Symbol>,
}

impl Solution {
    /// The rectangle the solution covers.
    pub fn bounds(&self) -> &Bounds {
        &self.bounds
    }

    /// The symbol at `location`, or [`None`] outside the bounds.
    pub fn symbol_at(&self, location: Location) -> Option<Symbol> {
        self.bounds.index_of(location).map(|index| self.symbols[index])
    }

    /// A line mark for every rightward or downward opening, in row-major order.
    ///
    /// Leftward and upward openings are the same edges seen from the other side, so they are not repeated.
    pub fn marks(&self) -> Vec<EdgeMark> {
        self.symbols.indexed_iter()
            .flat_map(|(index, symbol)| {
                let at = self.bounds.location_at(index);
                Step::FORWARD_VARIANTS.iter()
                    .filter(move |step| symbol.opens(**step))
                    .map(move |step| EdgeMark::line(at, *step))
            })
            .collect()
    }

    /// The drawn lines as a graph over the non-empty points.
    pub fn graph(&self) -> UnGraphMap<Location, ()> {
        let mut graph = UnGraphMap::new();
        for (index, symbol) in self.symbols.indexed_iter() {
            if *symbol != Symbol::Empty {
                graph.add_node(self.bounds.location_at(index));
            }
        }
        for mark in self.marks() {
            graph.add_edge(mark.at, mark.far_end(), ());
        }

        graph
    }
}

impl Display for Solution {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        for row in self.symbols.rows() {
            for symbol in row {
                write!(f, "{}", symbol.glyph())?;
            }
            writeln!(f)?;
        }

        Ok(())
    }
}

/// Find one solution of `entities` on `engine`.
pub fn solve_solution_with<E: Engine>(entities: &[Entity], engine: E, cancel: &CancelToken) -> Result<Outcome<Solution>, SolverFailure> {
    let Some(mut model) = PuzzleModel::build(entities, engine) else {
        return Ok(Outcome::NoModel);
    };
    info!("solving {} entities: {:?}", entities.len(), model.stats());

    cancel.check()?;
    let Some(assignment) = model.solve()? else {
        info!("no solution");
        return Ok(Outcome::Unsolvable);
    };

    let bounds = *model.lattice().bounds();
    let mut symbols = Array2::default(bounds.shape());
    for (index, slot) in symbols.indexed_iter_mut() {
        let at = bounds.location_at(index);
        *slot = model.symbol_at(&assignment, at).ok_or(SolverFailure::NoSymbolFound { at })?;
    }

    Ok(Outcome::Solved(Solution { bounds, symbols }))
}

/// Find one solution of `entities` on `engine`, as line marks.
pub fn solve_with<E: Engine>(entities: &[Entity], engine: E, cancel: &CancelToken) -> Result<Outcome, SolverFailure> {
    Ok(solve_solution_with(entities, engine, cancel)?.map(|solution| solution.marks()))
}

/// Find one solution of `entities`, as line marks.
pub fn solve(entities: &[Entity]) -> Result<Outcome, SolverFailure> {
    solve_with(entities, Solver::new(), &CancelToken::new())
}
