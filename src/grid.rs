//! The grid of points and edges a puzzle is solved on.

use petgraph::graphmap::UnGraphMap;
use unordered_pair::UnorderedPair;

use crate::entity::Entity;
use crate::location::{Bounds, Location};
use crate::step::Step;

/// An edge between two orthogonally adjacent points, named by its lower point and a forward step.
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct GridEdge {
    /// The lower point.
    pub origin: Location,
    /// Always forward.
    pub step: Step,
}

impl GridEdge {
    /// The higher point.
    pub fn target(&self) -> Location {
        self.step.attempt_from(self.origin)
    }

    /// Both points, unordered; the key of this edge in [`crate::model::PuzzleModel`].
    pub fn endpoints(&self) -> UnorderedPair<Location> {
        UnorderedPair(self.origin, self.target())
    }
}

/// The rectangular grid underlying a puzzle: every integer point of its [`Bounds`] and every edge between orthogonal neighbors inside them.
///
/// Points are graph nodes; each edge is labelled with the forward step from its lower point.
#[derive(Clone, Debug)]
pub struct Lattice {
    bounds: Bounds,
    graph: UnGraphMap<Location, Step>,
}

impl Lattice {
    /// Lay out every point of `bounds` and the edges between them.
    pub fn new(bounds: Bounds) -> Self {
        let mut graph = UnGraphMap::with_capacity(
            bounds.len(),
            // "horizontal" edges
            (bounds.width() - 1) * bounds.height()
                // "vertical" edges
                + (bounds.height() - 1) * bounds.width(),
        );

        for location in bounds.locations() {
            graph.add_node(location);
        }

        for location in bounds.locations() {
            // add edges to the right and down, if possible
            for step in Step::FORWARD_VARIANTS {
                let neighbor = step.attempt_from(location);
                if bounds.contains(neighbor) {
                    graph.add_edge(location, neighbor, *step);
                }
            }
        }

        Self { bounds, graph }
    }

    /// The lattice spanning every entity, or [`None`] if there are no entities.
    pub fn enclosing(entities: &[Entity]) -> Option<Self> {
        Bounds::enclosing(entities.iter().map(Entity::at)).map(Self::new)
    }

    /// The rectangle covered.
    pub fn bounds(&self) -> &Bounds {
        &self.bounds
    }

    /// Points and edges as a graph.
    pub fn graph(&self) -> &UnGraphMap<Location, Step> {
        &self.graph
    }

    /// Number of points, i.e. `bounds().len()`.
    pub fn point_count(&self) -> usize {
        self.graph.node_count()
    }

    /// Number of edges between neighboring points.
    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    /// Every edge, in row-major order of its origin, rightward before downward.
    pub fn edges(&self) -> impl Iterator<Item = GridEdge> + '_ {
        self.graph.all_edges().map(|(a, b, step)| GridEdge { origin: a.min(b), step: *step })
    }
}
