#[cfg(test)]
mod tests {
    use std::collections::HashSet;
    use std::num::NonZero;

    use itertools::Itertools;
    use petgraph::algo::{connected_components, has_path_connecting, is_cyclic_undirected};
    use proptest::prelude::*;
    use varisat::Solver;

    use crate::backbone::deduct;
    use crate::cancel::CancelToken;
    use crate::entity::{EdgeMark, Entity, HintStyle};
    use crate::grid::Lattice;
    use crate::location::{Bounds, Location};
    use crate::model::PuzzleModel;
    use crate::puzzle::Puzzle;
    use crate::solver::{solve, solve_solution_with, Outcome, Report, Solution, Status};
    use crate::step::Step;
    use crate::symbol::Symbol;

    fn end(x: i32, y: i32, pair: u32) -> Entity {
        Entity::EndPoint { at: Location(x, y), pair: NonZero::new(pair).unwrap() }
    }

    fn floor(x: i32, y: i32) -> Entity {
        Entity::FloorCell { at: Location(x, y) }
    }

    fn must_visit(x: i32, y: i32) -> Entity {
        Entity::SimpleLoop { at: Location(x, y) }
    }

    fn clue(x: i32, y: i32, target: u32) -> Entity {
        Entity::SlitherlinkClue { at: Location(x, y), target }
    }

    fn hint(x: i32, y: i32, dir: Step, style: HintStyle) -> Entity {
        Entity::LineHint { mark: EdgeMark::new(Location(x, y), dir, style), placed: Location(x, y) }
    }

    /// A Flow Free board: every pair of termini, with every other cell required to be filled.
    fn flow_board(size: i32, termini: &[(Location, Location)]) -> Vec<Entity> {
        let mut entities = termini.iter()
            .zip(1..)
            .flat_map(|((a, b), pair)| [end(a.0, a.1, pair), end(b.0, b.1, pair)])
            .collect_vec();
        let occupied: HashSet<Location> = entities.iter().map(Entity::at).collect();

        entities.extend((0..size).cartesian_product(0..size)
            .map(|(y, x)| Location(x, y))
            .filter(|l| !occupied.contains(l))
            .map(|l| must_visit(l.0, l.1)));
        entities
    }

    fn solution(entities: &[Entity]) -> Solution {
        solve_solution_with(entities, Solver::new(), &CancelToken::new())
            .unwrap()
            .solved()
            .expect("puzzle should be solvable")
    }

    /// No loops, every terminus ends one line, every other drawn point continues one, and every pair is joined.
    fn assert_valid(entities: &[Entity], solution: &Solution) {
        let graph = solution.graph();
        assert!(!is_cyclic_undirected(&graph));

        let groups = entities.iter()
            .filter_map(|e| match e {
                Entity::EndPoint { at, pair } => Some((*pair, *at)),
                _ => None,
            })
            .into_group_map();

        let termini: HashSet<Location> = groups.values().flatten().copied().collect();
        for node in graph.nodes() {
            let degree = if termini.contains(&node) { 1 } else { 2 };
            assert_eq!(graph.neighbors(node).count(), degree, "{node:?} has the wrong degree");
        }
        for terminus in &termini {
            assert!(graph.contains_node(*terminus), "{terminus:?} is not drawn");
        }

        let pairs = groups.iter()
            .filter_map(|(pair, termini)| match termini[..] {
                [a, b] => Some((pair, a, b)),
                _ => None,
            })
            .collect_vec();
        for (pair, a, b) in &pairs {
            assert!(has_path_connecting(&graph, *a, *b, None), "pair {pair} is not connected");
        }
        if pairs.len() == groups.len() {
            assert_eq!(connected_components(&graph), pairs.len());
        }
    }

    #[test]
    fn nothing_to_solve() {
        assert_eq!(solve(&[]).unwrap(), Outcome::NoModel);
        assert_eq!(deduct(&[]).unwrap(), Outcome::NoModel);
    }

    #[test]
    fn adjacent_pair() {
        let entities = [end(0, 0, 1), end(1, 0, 1)];
        let expected = Outcome::Solved(vec![EdgeMark::line(Location(0, 0), Step::Right)]);

        assert_eq!(solve(&entities).unwrap(), expected);
        assert_eq!(deduct(&entities).unwrap(), expected);
        assert_eq!(format!("{}", solution(&entities)), "╶╴\n");
    }

    #[test]
    fn bare_floor_is_solved_with_nothing_drawn() {
        // floor alone asks for no path, so leaving it empty is a solution rather than a contradiction
        let entities = [floor(0, 0), floor(1, 0)];

        assert_eq!(solve(&entities).unwrap(), Outcome::Solved(vec![]));
        // the only edge is between floor, and never drawn
        assert_eq!(deduct(&entities).unwrap(), Outcome::Solved(vec![EdgeMark::cross(Location(0, 0), Step::Right)]));
    }

    #[test]
    fn slitherlink_zero_crosses_everything() {
        let entities = [floor(0, 0), floor(1, 0), floor(0, 1), floor(1, 1), clue(1, 1, 0)];

        assert_eq!(deduct(&entities).unwrap(), Outcome::Solved(vec![
            EdgeMark::cross(Location(0, 0), Step::Right),
            EdgeMark::cross(Location(0, 0), Step::Down),
            EdgeMark::cross(Location(1, 0), Step::Down),
            EdgeMark::cross(Location(0, 1), Step::Right),
        ]));
    }

    #[test]
    fn slitherlink_counts_edges() {
        // one pair on a diagonal uses exactly two of the four edges around the center
        let base = [end(0, 0, 1), end(1, 1, 1), floor(1, 0), floor(0, 1)];

        for (target, solvable) in [(0, false), (1, false), (2, true), (3, false), (4, false), (5, false)] {
            let mut entities = base.to_vec();
            entities.push(clue(1, 1, target));
            assert_eq!(solve(&entities).unwrap().status() == Status::Solved, solvable, "clue {target}");
        }
    }

    #[test]
    fn slitherlink_at_corner() {
        // a clue on the border sees only the edges inside the bounds
        let entities = [end(0, 0, 1), end(1, 0, 1), clue(1, 0, 1)];
        assert_eq!(solve(&entities).unwrap().status(), Status::Solved);

        let entities = [end(0, 0, 1), end(1, 0, 1), clue(0, 0, 1)];
        assert_eq!(solve(&entities).unwrap(), Outcome::Unsolvable);
    }

    #[test]
    fn crossed_out_pair() {
        let entities = [
            end(0, 0, 1),
            end(1, 0, 1),
            Entity::hint(EdgeMark::cross(Location(0, 0), Step::Right)),
        ];

        assert_eq!(solve(&entities).unwrap(), Outcome::Unsolvable);
        assert_eq!(deduct(&entities).unwrap(), Outcome::Unsolvable);
    }

    #[test]
    fn hints_off_the_grid() {
        let line = Entity::hint(EdgeMark::line(Location(1, 0), Step::Right));
        let cross = Entity::hint(EdgeMark::cross(Location(1, 0), Step::Right));

        // the hint's own location lies inside; its edge does not
        assert_eq!(solve(&[end(0, 0, 1), end(1, 0, 1), line]).unwrap(), Outcome::Unsolvable);
        assert_eq!(solve(&[end(0, 0, 1), end(1, 0, 1), cross]).unwrap().status(), Status::Solved);
    }

    #[test]
    fn backward_hint_names_forward_edge() {
        let entities = [
            end(0, 0, 1),
            end(1, 1, 1),
            floor(1, 0),
            floor(0, 1),
            // the edge between (0, 1) and (1, 1), given from its right end
            hint(1, 1, Step::Left, HintStyle::Line),
        ];

        assert_eq!(solve(&entities).unwrap(), Outcome::Solved(vec![
            EdgeMark::line(Location(0, 0), Step::Down),
            EdgeMark::line(Location(0, 1), Step::Right),
        ]));
    }

    #[test]
    fn backward_hint_bounded_by_own_cell() {
        let entities = [end(1, 0, 1), end(2, 0, 1), hint(1, 0, Step::Left, HintStyle::Cross)];

        // the hinted edge reaches (0, 0), which is not part of the puzzle
        let lattice = Lattice::enclosing(&entities).unwrap();
        assert_eq!(lattice.bounds().min(), Location(1, 0));
        assert_eq!(lattice.point_count(), 2);
        assert_eq!(solve(&entities).unwrap(), Outcome::Solved(vec![EdgeMark::line(Location(1, 0), Step::Right)]));

        // and it is written back where it was put down
        let records = Puzzle::new(entities.to_vec()).to_records();
        assert_eq!((records[2].x, records[2].data.dir.as_deref()), (1, Some("left")));
        assert_eq!(Puzzle::from_records(records).unwrap().entities(), entities);
    }

    #[test]
    fn hints_on_one_edge_replace_each_other() {
        let mut puzzle = Puzzle::default();
        puzzle
            .place(hint(1, 0, Step::Left, HintStyle::Line))
            .place(hint(0, 0, Step::Right, HintStyle::Cross));

        assert_eq!(puzzle.entities(), [Entity::hint(EdgeMark::cross(Location(0, 0), Step::Right))]);
    }

    #[test]
    fn ranks_bounded_by_floor_region() {
        let arrow = Entity::YajilinArrow { at: Location(4, 0), num: 1, dir: Step::Up };
        // two regions of two points, split by the bare point (2, 0)
        let apart = [end(0, 0, 1), end(1, 0, 1), end(3, 0, 2), end(4, 0, 2)];
        // one region of four points, beside the bare point (4, 0)
        let together = [end(0, 0, 1), end(1, 0, 1), end(2, 0, 2), end(3, 0, 2), arrow];

        let stats = |entities: &[Entity]| PuzzleModel::build(entities, Solver::new()).unwrap().stats();
        let (apart_stats, together_stats) = (stats(&apart), stats(&together));
        assert_eq!((apart_stats.points, apart_stats.edges), (together_stats.points, together_stats.edges));
        // one rank variable per point against three
        assert_eq!(apart_stats.variables + 4 * 2, together_stats.variables);

        assert_eq!(solve(&apart).unwrap().status(), Status::Solved);
        assert_eq!(solve(&together).unwrap().status(), Status::Solved);
    }

    #[test]
    fn ambiguous_pair_has_empty_backbone() {
        let entities = [end(0, 0, 1), end(1, 1, 1), floor(1, 0), floor(0, 1)];
        assert_eq!(deduct(&entities).unwrap(), Outcome::Solved(vec![]));
    }

    #[test]
    fn must_visit_forces_route() {
        let entities = [end(0, 0, 1), end(1, 1, 1), floor(1, 0), floor(0, 1), must_visit(1, 0)];

        assert_eq!(deduct(&entities).unwrap(), Outcome::Solved(vec![
            EdgeMark::line(Location(0, 0), Step::Right),
            EdgeMark::cross(Location(0, 0), Step::Down),
            EdgeMark::line(Location(1, 0), Step::Down),
            EdgeMark::cross(Location(0, 1), Step::Right),
        ]));
    }

    #[test]
    fn crosses_only_between_floor() {
        // (0, 1) is bare, so the edges reaching it are never crossed out
        let entities = [end(0, 0, 1), end(1, 1, 1), floor(1, 0)];

        assert_eq!(deduct(&entities).unwrap(), Outcome::Solved(vec![
            EdgeMark::line(Location(0, 0), Step::Right),
            EdgeMark::line(Location(1, 0), Step::Down),
        ]));
    }

    #[test]
    fn pairs_cannot_cross() {
        let crossing = [end(0, 0, 1), end(1, 1, 1), end(1, 0, 2), end(0, 1, 2)];
        assert_eq!(solve(&crossing).unwrap(), Outcome::Unsolvable);

        let parallel = [end(0, 0, 1), end(1, 0, 1), end(0, 1, 2), end(1, 1, 2)];
        assert_eq!(solve(&parallel).unwrap(), Outcome::Solved(vec![
            EdgeMark::line(Location(0, 0), Step::Right),
            EdgeMark::line(Location(0, 1), Step::Right),
        ]));
    }

    #[test]
    fn pairs_stay_apart() {
        // A-B-A-B in a row: no path may run through another's terminus
        let entities = [end(0, 0, 1), end(1, 0, 2), end(2, 0, 1), end(3, 0, 2)];
        assert_eq!(solve(&entities).unwrap(), Outcome::Unsolvable);
    }

    #[test]
    fn lonely_endpoint() {
        let entities = [end(0, 0, 1), floor(1, 0)];
        assert_eq!(solve(&entities).unwrap(), Outcome::Unsolvable);
    }

    #[test]
    fn no_loops() {
        let entities = [must_visit(0, 0), must_visit(1, 0), must_visit(0, 1), must_visit(1, 1)];
        assert_eq!(solve(&entities).unwrap(), Outcome::Unsolvable);
    }

    #[test]
    fn no_loops_beside_a_path() {
        // a loop around the 2x2 block on the right would satisfy every cell locally; the bare column keeps the pair out
        let mut entities = vec![end(0, 0, 1), end(0, 1, 1)];
        entities.extend([(2, 0), (3, 0), (2, 1), (3, 1)].map(|(x, y)| must_visit(x, y)));
        assert_eq!(solve(&entities).unwrap(), Outcome::Unsolvable);
    }

    #[test]
    fn solve_most_basic() {
        // flow free classic pack level 1
        let entities = flow_board(5, &[
            (Location(0, 0), Location(1, 4)),
            (Location(2, 0), Location(1, 3)),
            (Location(2, 1), Location(2, 4)),
            (Location(4, 0), Location(3, 3)),
            (Location(4, 1), Location(3, 4)),
        ]);

        let solved = solution(&entities);
        assert_eq!(format!("{}", solved), "╷┌╴┌╴
││╷│╷
│││││
│╵│╵│
└╴╵╶┘
");
        assert_valid(&entities, &solved);

        // the solution is unique, so every edge is decided
        let marks = deduct(&entities).unwrap().solved().unwrap();
        let (lines, crosses) = marks.iter().partition::<Vec<_>, _>(|mark| mark.style == HintStyle::Line);
        assert_eq!(lines.len(), 20);
        assert_eq!(crosses.len(), 20);
        assert_eq!(lines.into_iter().copied().collect_vec(), solved.marks());
    }

    #[test]
    fn solve_large_simple_square() {
        // flow free extreme pack 2 12x12 level 13
        let entities = flow_board(12, &[
            (Location(7, 4), Location(4, 11)),
            (Location(6, 4), Location(5, 11)),
            (Location(6, 6), Location(0, 11)),
            (Location(2, 2), Location(7, 3)),
            (Location(5, 4), Location(7, 11)),
            (Location(7, 2), Location(3, 8)),
            (Location(2, 8), Location(5, 10)),
        ]);

        let solved = solution(&entities);
        assert_valid(&entities, &solved);
        assert!(solved.bounds().locations().all(|l| solved.symbol_at(l) != Some(Symbol::Empty)));
    }

    #[test]
    fn negative_coordinates() {
        let entities = [end(-3, -7, 1), end(-3, -5, 1), floor(-3, -6)];

        assert_eq!(solve(&entities).unwrap(), Outcome::Solved(vec![
            EdgeMark::line(Location(-3, -7), Step::Down),
            EdgeMark::line(Location(-3, -6), Step::Down),
        ]));
    }

    #[test]
    fn ignores_editor_only_entities() {
        let entities = [
            end(0, 0, 1),
            end(1, 0, 1),
            Entity::YajilinArrow { at: Location(0, 0), num: 3, dir: Step::Up },
            Entity::Unrecognized { at: Location(0, 0), type_name: "Sticker".to_owned() },
        ];
        assert_eq!(solve(&entities).unwrap(), Outcome::Solved(vec![EdgeMark::line(Location(0, 0), Step::Right)]));
    }

    #[test]
    fn solution_agrees_with_deduction() {
        let entities = [end(0, 0, 1), end(2, 2, 1), floor(1, 0), floor(2, 0), floor(0, 1), floor(1, 1), floor(2, 1), floor(0, 2), floor(1, 2)];
        let solved = solution(&entities);
        assert_valid(&entities, &solved);

        let drawn: HashSet<EdgeMark> = solved.marks().into_iter().collect();
        for mark in deduct(&entities).unwrap().solved().unwrap() {
            let line = EdgeMark { style: HintStyle::Line, ..mark };
            assert_eq!(drawn.contains(&line), mark.style == HintStyle::Line, "{mark:?}");
        }
    }

    #[test]
    fn deduction_reaches_fixed_point() {
        let mut puzzle = Puzzle::new(vec![end(0, 0, 1), end(1, 1, 1), floor(1, 0), floor(0, 1), must_visit(1, 0)]);

        let marks = deduct(puzzle.entities()).unwrap().solved().unwrap();
        assert_eq!(puzzle.merge_marks(&marks), 4);

        let again = deduct(puzzle.entities()).unwrap().solved().unwrap();
        assert_eq!(again, marks);
        assert_eq!(puzzle.merge_marks(&again), 0);
    }

    #[test]
    fn report_json() {
        let puzzle = Puzzle::from_json(r#"[
            {"type": "EndPoint", "x": 0, "y": 0, "data": {"num": 1}},
            {"type": "EndPoint", "x": 1, "y": 0, "data": {"num": 1}},
            {"type": "Solve_mode", "x": 1, "y": 0, "data": {"dir": "left", "style": "line"}}
        ]"#).unwrap();

        let report = Report::from(solve(puzzle.entities()).unwrap());
        assert_eq!(
            serde_json::to_value(&report).unwrap(),
            serde_json::json!({
                "status": "solved",
                "records": [{"type": "line-hint", "x": 0, "y": 0, "data": {"dir": "right", "style": "line"}}],
            }),
        );

        let report = Report::from(solve(&[end(0, 0, 1), floor(5, 5)]).unwrap());
        assert_eq!(serde_json::to_value(&report).unwrap(), serde_json::json!({"status": "unsolvable", "records": []}));
    }

    #[test]
    fn place_keeps_layers_exclusive() {
        let mut puzzle = Puzzle::default();
        puzzle
            .place(Entity::hint(EdgeMark::line(Location(0, 0), Step::Right)))
            .place(end(0, 0, 1))
            .place(floor(0, 0))
            .place(end(0, 0, 2))
            .place(Entity::hint(EdgeMark::cross(Location(0, 0), Step::Right)))
            .place(Entity::hint(EdgeMark::line(Location(0, 0), Step::Down)));

        // sorted by z-index: floor, then endpoint, then hints in placement order
        assert_eq!(puzzle.entities(), [
            floor(0, 0),
            end(0, 0, 2),
            Entity::hint(EdgeMark::cross(Location(0, 0), Step::Right)),
            Entity::hint(EdgeMark::line(Location(0, 0), Step::Down)),
        ]);

        puzzle.wipe_hints();
        assert_eq!(puzzle.entities(), [floor(0, 0), end(0, 0, 2)]);

        puzzle.clear();
        assert!(puzzle.is_empty());
    }

    #[test]
    fn merge_skips_duplicates() {
        let mut puzzle = Puzzle::new(vec![Entity::hint(EdgeMark::line(Location(0, 0), Step::Right))]);
        let marks = [
            EdgeMark::line(Location(0, 0), Step::Right),
            EdgeMark::cross(Location(0, 0), Step::Down),
            EdgeMark::cross(Location(0, 0), Step::Down),
        ];

        assert_eq!(puzzle.merge_marks(&marks), 1);
        assert_eq!(puzzle.entities().len(), 2);
    }

    fn small_puzzle() -> impl Strategy<Value = Vec<Entity>> {
        let at = (0..4i32, 0..4i32);
        let entity = prop_oneof![
            at.clone().prop_map(|(x, y)| floor(x, y)),
            at.clone().prop_map(|(x, y)| must_visit(x, y)),
            (at.clone(), 1..4u32).prop_map(|((x, y), pair)| end(x, y, pair)),
            (at.clone(), 0..5u32).prop_map(|((x, y), target)| clue(x, y, target)),
            (at, any::<bool>(), any::<bool>()).prop_map(|((x, y), down, cross)| {
                let dir = if down { Step::Down } else { Step::Right };
                let style = if cross { HintStyle::Cross } else { HintStyle::Line };
                hint(x, y, dir, style)
            }),
        ];

        prop::collection::vec(entity, 1..10)
    }

    proptest! {
        #[test]
        fn index_round_trip(locations in prop::collection::vec((-1000..1000i32, -1000..1000i32), 1..20)) {
            let locations = locations.into_iter().map(Location::from).collect_vec();
            let bounds = Bounds::enclosing(locations.iter().copied()).unwrap();

            for location in locations {
                let index = bounds.index_of(location);
                prop_assert!(index.is_some());
                prop_assert_eq!(bounds.location_at(index.unwrap()), location);
            }
        }

        #[test]
        fn build_is_idempotent(entities in small_puzzle()) {
            let once = PuzzleModel::build(&entities, Solver::new()).map(|model| model.stats());
            let twice = PuzzleModel::build(&entities, Solver::new()).map(|model| model.stats());
            let reversed = entities.iter().rev().cloned().collect_vec();
            let reordered = PuzzleModel::build(&reversed, Solver::new()).map(|model| model.stats());

            prop_assert!(once.is_some());
            prop_assert_eq!(once, twice);
            prop_assert_eq!(once, reordered);
        }

        #[test]
        fn solutions_are_valid(entities in small_puzzle()) {
            if let Outcome::Solved(solved) = solve_solution_with(&entities, Solver::new(), &CancelToken::new()).unwrap() {
                assert_valid(&entities, &solved);

                // every solution contains the backbone
                let drawn: HashSet<EdgeMark> = solved.marks().into_iter().collect();
                for mark in deduct(&entities).unwrap().solved().unwrap() {
                    let line = EdgeMark { style: HintStyle::Line, ..mark };
                    prop_assert_eq!(drawn.contains(&line), mark.style == HintStyle::Line);
                }
            } else {
                prop_assert_eq!(deduct(&entities).unwrap(), Outcome::Unsolvable);
            }
        }
    }
}
