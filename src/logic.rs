use itertools::Itertools;
use varisat::Lit;

pub(crate) fn at_most_one(lits: &[Lit]) -> Vec<Vec<Lit>> {
    // no two are true; (!A + !B) * (!A + !C) * ...
    lits.iter()
        .tuple_combinations()
        .map(|(a, b)| vec![!*a, !*b])
        .collect_vec()
}

pub(crate) fn exactly_one(lits: &[Lit]) -> Vec<Vec<Lit>> {
    let mut clauses = Vec::with_capacity(lits.len() * (lits.len() + 1) / 2 + 1);

    clauses.extend(at_most_one(lits));
    // at least one is true; A + B + C + ...
    clauses.push(lits.to_vec());

    clauses
}

/// Exactly `k` of `lits` are true.
///
/// Meant for the handful of literals around a single clue, so both halves are spelled out over combinations rather than with counter variables.
pub(crate) fn exactly(lits: &[Lit], k: usize) -> Vec<Vec<Lit>> {
    if k > lits.len() {
        // the empty clause; unsatisfiable
        return vec![vec![]];
    }

    // at most k: among any k + 1, one is false
    let at_most = lits.iter()
        .combinations(k + 1)
        .map(|combo| combo.into_iter().map(|lit| !*lit).collect_vec());

    // at least k: among any n - k + 1, one is true
    let at_least = lits.iter()
        .combinations(lits.len() - k + 1)
        .map(|combo| combo.into_iter().copied().collect_vec());

    at_most.chain(at_least).collect_vec()
}
