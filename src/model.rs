//! The SAT encoding of a puzzle.

use std::collections::{HashMap, HashSet};
use std::num::NonZero;

use itertools::Itertools;
use log::{trace, warn};
use ndarray::Array2;
use petgraph::unionfind::UnionFind;
use strum::VariantArray;
use unordered_pair::UnorderedPair;
use varisat::{Lit, Var};

use crate::engine::{Assignment, Engine, EngineError};
use crate::entity::{EdgeMark, Entity, HintStyle};
use crate::grid::{GridEdge, Lattice};
use crate::location::Location;
use crate::logic::{exactly, exactly_one};
use crate::step::Step;
use crate::symbol::Symbol;

/// Identifier shared by the two endpoints of one path.
pub type PairID = NonZero<u32>;

/// The size of a built model.
///
/// Building twice from the same entities, in any order, yields equal stats.
#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq)]
pub struct ModelStats {
    /// Points of the lattice.
    pub points: usize,
    /// Edges of the lattice.
    pub edges: usize,
    /// Variables allocated on the engine.
    pub variables: usize,
    /// Clauses added to the engine.
    pub clauses: usize,
}

/// A puzzle expressed as a SAT problem on an [`Engine`].
///
/// # Logical setup
/// Let the lattice be an undirected graph G whose vertices are the points of the puzzle's bounding rectangle.
///
/// ## Vertices
/// Every vertex V holds exactly one [`Symbol`].
/// V's symbol opens toward a neighbor if and only if the edge to that neighbor is present; symbols opening off the lattice are ruled out.
/// If V is not floor (a floor cell, endpoint or loop cell), its symbol is [`Symbol::Empty`].
/// If V is an endpoint, its symbol is terminal; otherwise it is not.
///
/// ## No loops
/// Every vertex V carries a rank, encoded in order form (`rank(V) >= k` for each k).
/// No chain is longer than the connected region of floor holding it, so ranks are bounded by that region's size less one.
/// Terminals have rank 0.
/// A non-empty, non-terminal V must pick a parent among its present edges, and V's rank is strictly greater than its parent's.
/// Ranks cannot decrease forever around a cycle, so every path component is a chain between two terminals.
///
/// ## Pairs
/// Each pair of endpoints sharing an ID gets an affiliation.
/// Both endpoints carry it and no other terminal does; across every present edge, the two vertices agree on it.
/// So the path leaving one endpoint can only end at its partner.
///
/// ## Size
/// Ranks dominate: a floor region of R points costs about R² variables and 4R² clauses.
/// This suits editor-sized boards, whose floor regions run to a few hundred points at most.
///
/// ## Clues
/// A Slitherlink clue at a vertex counts the edges crossing the four half-lines leaving it; exactly that many are present.
/// A line hint asserts its edge; a cross hint denies it.
pub struct PuzzleModel<E: Engine> {
    engine: E,
    lattice: Lattice,
    // one variable per symbol per point, indexed like Symbol::VARIANTS
    symbols: Array2<Vec<Var>>,
    edges: HashMap<UnorderedPair<Location>, Var>,
    floor: HashSet<Location>,
    stats: ModelStats,
}

impl<E: Engine> PuzzleModel<E> {
    /// Express `entities` as constraints on `engine`, or return [`None`] if there are no entities to express.
    pub fn build(entities: &[Entity], engine: E) -> Option<Self> {
        let lattice = Lattice::enclosing(entities)?;

        let mut model = Self {
            engine,
            stats: ModelStats {
                points: lattice.point_count(),
                edges: lattice.edge_count(),
                ..Default::default()
            },
            lattice,
            symbols: Array2::default((0, 0)),
            edges: HashMap::new(),
            floor: entities.iter().filter(|e| e.is_traversable()).map(Entity::at).collect(),
        };

        model.allocate();
        model.link_symbols();
        model.constrain_terrain(entities);
        model.constrain_ranks(entities);
        model.constrain_pairs(entities);
        model.constrain_clues(entities);
        model.constrain_hints(entities);

        trace!("built model: {:?}", model.stats);
        Some(model)
    }

    fn new_var(&mut self) -> Var {
        self.stats.variables += 1;
        self.engine.new_var()
    }

    fn add_clause(&mut self, clause: &[Lit]) {
        self.stats.clauses += 1;
        self.engine.add_clause(clause);
    }

    fn add_clauses(&mut self, clauses: Vec<Vec<Lit>>) {
        for clause in clauses {
            self.add_clause(&clause);
        }
    }

    fn allocate(&mut self) {
        let shape = self.lattice.bounds().shape();
        let symbols = Array2::from_shape_simple_fn(shape, || {
            Symbol::VARIANTS.iter().map(|_| self.new_var()).collect_vec()
        });
        self.symbols = symbols;

        let endpoints = self.lattice.edges().map(|edge| edge.endpoints()).collect_vec();
        for endpoints in endpoints {
            let var = self.new_var();
            self.edges.insert(endpoints, var);
        }

        // a point holds exactly one symbol
        for index in self.lattice.bounds().locations().collect_vec() {
            let lits = Symbol::VARIANTS.iter().map(|symbol| self.symbol_var(index, *symbol).positive()).collect_vec();
            self.add_clauses(exactly_one(&lits));
        }
    }

    /// Tie each point's symbol to the edges around it.
    fn link_symbols(&mut self) {
        for location in self.lattice.bounds().locations().collect_vec() {
            for step in Step::VARIANTS {
                let opening = Symbol::opening(*step)
                    .map(|symbol| self.symbol_var(location, symbol).positive())
                    .collect_vec();

                match self.open_lit(location, *step) {
                    Some(edge) => {
                        // symbol opens toward step => edge present
                        for symbol in &opening {
                            self.add_clause(&[!*symbol, edge]);
                        }
                        // edge present => some symbol opening toward step
                        let mut clause = vec![!edge];
                        clause.extend(opening);
                        self.add_clause(&clause);
                    }
                    // no edge off the lattice
                    None => opening.iter().for_each(|symbol| self.add_clause(&[!*symbol])),
                }
            }
        }
    }

    fn constrain_terrain(&mut self, entities: &[Entity]) {
        let endpoints: HashSet<Location> = endpoints(entities).map(|(at, _)| at).collect();
        let loops: HashSet<Location> = entities.iter()
            .filter_map(|e| match e {
                Entity::SimpleLoop { at } => Some(*at),
                _ => None,
            })
            .collect();

        for location in self.lattice.bounds().locations().collect_vec() {
            let empty = self.symbol_var(location, Symbol::Empty);

            if !self.floor.contains(&location) {
                self.add_clause(&[empty.positive()]);
            }

            let terminals = Symbol::terminals().map(|symbol| self.symbol_var(location, symbol)).collect_vec();
            if endpoints.contains(&location) {
                self.add_clause(&terminals.iter().map(|var| var.positive()).collect_vec());
            } else {
                terminals.iter().for_each(|var| self.add_clause(&[var.negative()]));
            }

            // a path passes through every loop cell
            if loops.contains(&location) {
                self.add_clause(&[empty.negative()]);
            }
        }
    }

    /// Forbid cycles by ranking every floor point; see the type-level documentation.
    fn constrain_ranks(&mut self, entities: &[Entity]) {
        let endpoints: HashSet<Location> = endpoints(entities).map(|(at, _)| at).collect();
        let floor = self.floor_points();
        let region_sizes = self.region_sizes(&floor);

        // at_least[V][k - 1] <=> rank(V) >= k
        let mut at_least: HashMap<Location, Vec<Var>> = HashMap::with_capacity(floor.len());
        for (location, size) in floor.iter().zip(region_sizes) {
            let vars = (1..size).map(|_| self.new_var()).collect_vec();
            for (higher, lower) in vars.iter().skip(1).zip(&vars) {
                self.add_clause(&[higher.negative(), lower.positive()]);
            }
            at_least.insert(*location, vars);
        }

        for location in &floor {
            let own = &at_least[location];

            if endpoints.contains(location) {
                if let Some(first) = own.first() {
                    self.add_clause(&[first.negative()]);
                }
                continue;
            }

            let own = own.clone();
            let mut parents = Vec::with_capacity(Step::VARIANTS.len());

            for step in Step::VARIANTS {
                let neighbor = step.attempt_from(*location);
                let (Some(edge), Some(theirs)) = (self.open_lit(*location, *step), at_least.get(&neighbor)) else {
                    continue;
                };

                let parent = self.new_var();
                parents.push(parent.positive());
                // only along a present edge
                self.add_clause(&[parent.negative(), edge]);

                // rank(V) > rank(parent): rank(parent) >= k => rank(V) >= k + 1, for every k
                let theirs = theirs.clone();
                match own.first() {
                    Some(first) => self.add_clause(&[parent.negative(), first.positive()]),
                    None => self.add_clause(&[parent.negative()]),
                }
                for (k, their_k) in theirs.iter().enumerate() {
                    match own.get(k + 1) {
                        Some(own_next) => self.add_clause(&[parent.negative(), their_k.negative(), own_next.positive()]),
                        None => self.add_clause(&[parent.negative(), their_k.negative()]),
                    }
                }
            }

            // non-empty => has a parent
            let mut clause = vec![self.symbol_var(*location, Symbol::Empty).positive()];
            clause.extend(parents);
            self.add_clause(&clause);
        }
    }

    /// The size of the connected region of floor holding each of `floor`, in the same order.
    fn region_sizes(&self, floor: &[Location]) -> Vec<usize> {
        let position: HashMap<Location, usize> = floor.iter().enumerate().map(|(i, l)| (*l, i)).collect();

        let mut regions = UnionFind::new(floor.len());
        for edge in self.lattice.edges() {
            if let (Some(a), Some(b)) = (position.get(&edge.origin), position.get(&edge.target())) {
                regions.union(*a, *b);
            }
        }

        let roots = (0..floor.len()).map(|i| regions.find(i)).collect_vec();
        let sizes = roots.iter().copied().counts();
        roots.iter().map(|root| sizes[root]).collect()
    }

    fn constrain_pairs(&mut self, entities: &[Entity]) {
        let groups = endpoints(entities).map(|(at, pair)| (pair, at)).into_group_map();

        let pairs = groups.into_iter()
            .sorted_by_key(|(pair, _)| *pair)
            .filter_map(|(pair, locations)| match locations.as_slice() {
                [a, b] => Some((pair, (*a, *b))),
                _ => {
                    warn!("endpoint {pair} appears {} times; only pairs are connected", locations.len());
                    None
                }
            })
            .collect_vec();

        if pairs.is_empty() {
            return;
        }

        let floor = self.floor_points();
        let mut affiliation: HashMap<Location, Vec<Var>> = HashMap::with_capacity(floor.len());
        for location in &floor {
            let vars = pairs.iter().map(|_| self.new_var()).collect_vec();
            affiliation.insert(*location, vars);
        }

        // each endpoint holds its own pair's affiliation and no other; unpaired endpoints hold none
        for (at, pair) in endpoints(entities).collect_vec() {
            let Some(vars) = affiliation.get(&at).cloned() else { continue };
            for ((candidate, _), var) in pairs.iter().zip(vars) {
                self.add_clause(&[var.lit(*candidate == pair)]);
            }
        }

        // vertices joined by a present edge share affiliations
        for edge in self.lattice.edges().collect_vec() {
            let (Some(ours), Some(theirs)) = (affiliation.get(&edge.origin), affiliation.get(&edge.target())) else {
                continue;
            };
            let Some(present) = self.edge_var(&edge).map(Var::positive) else { continue };

            for (a, b) in ours.clone().into_iter().zip(theirs.clone()) {
                // present => (a <=> b) = (!present + !a + b)(!present + a + !b)
                self.add_clause(&[!present, a.negative(), b.positive()]);
                self.add_clause(&[!present, a.positive(), b.negative()]);
            }
        }
    }

    fn constrain_clues(&mut self, entities: &[Entity]) {
        for entity in entities {
            let Entity::SlitherlinkClue { at, target } = entity else { continue };

            let up_left = at.offset_by((-1, -1));
            let lits = [
                (up_left, Step::Right),
                (at.offset_by((-1, 0)), Step::Right),
                (up_left, Step::Down),
                (at.offset_by((0, -1)), Step::Down),
            ].into_iter()
                .filter_map(|(location, step)| self.open_lit(location, step))
                .collect_vec();

            self.add_clauses(exactly(&lits, *target as usize));
        }
    }

    fn constrain_hints(&mut self, entities: &[Entity]) {
        for entity in entities {
            let Entity::LineHint { mark, .. } = entity else { continue };

            match (self.mark_lit(mark), mark.style) {
                (Some(lit), HintStyle::Line) => self.add_clause(&[lit]),
                (Some(lit), HintStyle::Cross) => self.add_clause(&[!lit]),
                // an edge off the lattice is never present
                (None, HintStyle::Line) => self.add_clause(&[]),
                (None, HintStyle::Cross) => {}
            }
        }
    }

    fn floor_points(&self) -> Vec<Location> {
        self.lattice.bounds().locations().filter(|l| self.floor.contains(l)).collect_vec()
    }

    fn symbol_var(&self, location: Location, symbol: Symbol) -> Var {
        let index = self.lattice.bounds().index_of(location);
        // callers only pass locations taken from the lattice
        debug_assert!(index.is_some());
        self.symbols[index.unwrap_or_default()][symbol.ordinal()]
    }

    /// The grid the model is built on.
    pub fn lattice(&self) -> &Lattice {
        &self.lattice
    }

    /// How large the encoding came out.
    pub fn stats(&self) -> ModelStats {
        self.stats
    }

    /// The engine, for adding constraints beyond the puzzle's own.
    pub fn engine_mut(&mut self) -> &mut E {
        &mut self.engine
    }

    /// Whether `location` is floor, i.e. a path may run through it.
    pub fn is_floor(&self, location: Location) -> bool {
        self.floor.contains(&location)
    }

    /// The variable stating that `edge` is present.
    pub fn edge_var(&self, edge: &GridEdge) -> Option<Var> {
        self.edges.get(&edge.endpoints()).copied()
    }

    /// The literal stating that `location` opens toward `step`, if that edge lies on the lattice.
    pub fn open_lit(&self, location: Location, step: Step) -> Option<Lit> {
        self.edges
            .get(&UnorderedPair(location, step.attempt_from(location)))
            .map(|var| var.positive())
    }

    /// The literal stating that the edge under `mark` is present, regardless of style.
    pub fn mark_lit(&self, mark: &EdgeMark) -> Option<Lit> {
        self.open_lit(mark.at, mark.dir)
    }

    /// Find any assignment satisfying the puzzle.
    pub fn solve(&mut self) -> Result<Option<Assignment>, EngineError> {
        self.engine.solve_under(&[])
    }

    /// The symbol `assignment` places at `location`.
    pub fn symbol_at(&self, assignment: &Assignment, location: Location) -> Option<Symbol> {
        let index = self.lattice.bounds().index_of(location)?;
        Symbol::VARIANTS.iter()
            .zip(&self.symbols[index])
            .find(|(_, var)| assignment.value(**var))
            .map(|(symbol, _)| *symbol)
    }

    /// Whether `assignment` draws `edge`.
    pub fn edge_present(&self, assignment: &Assignment, edge: &GridEdge) -> bool {
        self.edge_var(edge).is_some_and(|var| assignment.value(var))
    }
}

fn endpoints(entities: &[Entity]) -> impl Iterator<Item = (Location, PairID)> + '_ {
    entities.iter().filter_map(|e| match e {
        Entity::EndPoint { at, pair } => Some((*at, *pair)),
        _ => None,
    })
}
