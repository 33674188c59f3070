//! A self-contained reference solver for the pipeline tests.
//!
//! Implements the same contract as the external solver: a model on
//! satisfiable formulas, unit clauses over the pinched variables on
//! unsatisfiable ones. Satisfiability is decided by a DPLL search with
//! unit propagation; the UNSAT "proof" lists the variables of a minimal
//! unsatisfiable clause subset found by deletion, which points the shape
//! builder at the over-constrained edges just like a real DRAT proof.

use ortho_layout::sat::cnf::CnfBuilder;
use ortho_layout::sat::solver::{ProofLine, SatOutcome, SatSolver};
use ortho_layout::Error;

pub struct ReferenceSolver;

impl SatSolver for ReferenceSolver {
    fn solve(&mut self, cnf: &CnfBuilder) -> Result<SatOutcome, Error> {
        let clauses: Vec<Vec<i32>> = cnf.clauses().map(<[i32]>::to_vec).collect();
        let variable_count = cnf.variable_count();
        match solve_dpll(&clauses, variable_count) {
            Some(model) => Ok(SatOutcome::Sat(model)),
            None => Ok(SatOutcome::Unsat(core_proof(&clauses, variable_count))),
        }
    }
}

/// Complete DPLL search. Returns a total assignment as signed literals,
/// defaulting unconstrained variables to true.
fn solve_dpll(clauses: &[Vec<i32>], variable_count: i32) -> Option<Vec<i32>> {
    let mut assignment: Vec<Option<bool>> = vec![None; variable_count as usize + 1];
    if !search(clauses, &mut assignment) {
        return None;
    }
    Some(
        (1..=variable_count)
            .map(|variable| {
                if assignment[variable as usize] == Some(false) {
                    -variable
                } else {
                    variable
                }
            })
            .collect(),
    )
}

fn literal_value(literal: i32, assignment: &[Option<bool>]) -> Option<bool> {
    assignment[literal.unsigned_abs() as usize].map(|value| value == (literal > 0))
}

fn search(clauses: &[Vec<i32>], assignment: &mut Vec<Option<bool>>) -> bool {
    // Unit propagation to a fixpoint; the trail is undone on failure.
    let mut trail: Vec<usize> = Vec::new();
    loop {
        let mut changed = false;
        for clause in clauses {
            let mut satisfied = false;
            let mut unassigned = None;
            let mut unassigned_count = 0;
            for &literal in clause {
                match literal_value(literal, assignment) {
                    Some(true) => {
                        satisfied = true;
                        break;
                    }
                    Some(false) => {}
                    None => {
                        unassigned_count += 1;
                        unassigned = Some(literal);
                    }
                }
            }
            if satisfied {
                continue;
            }
            match unassigned_count {
                0 => {
                    for &variable in &trail {
                        assignment[variable] = None;
                    }
                    return false;
                }
                1 => {
                    let literal = unassigned.expect("exactly one unassigned literal");
                    assignment[literal.unsigned_abs() as usize] = Some(literal > 0);
                    trail.push(literal.unsigned_abs() as usize);
                    changed = true;
                }
                _ => {}
            }
        }
        if !changed {
            break;
        }
    }

    // Branch on the first unassigned literal of the first unsatisfied
    // clause, trying to satisfy the clause first.
    let branch = clauses.iter().find_map(|clause| {
        let mut first_unassigned = None;
        for &literal in clause {
            match literal_value(literal, assignment) {
                Some(true) => return None,
                Some(false) => {}
                None => {
                    if first_unassigned.is_none() {
                        first_unassigned = Some(literal);
                    }
                }
            }
        }
        first_unassigned
    });
    let Some(literal) = branch else {
        return true;
    };
    let variable = literal.unsigned_abs() as usize;
    for value in [literal > 0, literal < 0] {
        assignment[variable] = Some(value);
        if search(clauses, assignment) {
            return true;
        }
        assignment[variable] = None;
    }
    for &variable in &trail {
        assignment[variable] = None;
    }
    false
}

/// Shrinks the formula to a minimal unsatisfiable subset by deletion and
/// emits one unit line per variable that the subset mentions.
fn core_proof(clauses: &[Vec<i32>], variable_count: i32) -> Vec<ProofLine> {
    let mut core: Vec<Vec<i32>> = clauses.to_vec();
    let mut index = 0;
    while index < core.len() {
        let mut candidate = core.clone();
        candidate.remove(index);
        if solve_dpll(&candidate, variable_count).is_none() {
            core = candidate;
        } else {
            index += 1;
        }
    }
    let mut variables: Vec<i32> = core
        .iter()
        .flatten()
        .map(|literal| literal.abs())
        .collect();
    variables.sort_unstable();
    variables.dedup();
    variables
        .into_iter()
        .map(|variable| ProofLine {
            deletion: false,
            literals: vec![variable],
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn satisfiable_formula_gets_a_model() {
        let clauses = vec![vec![1, 2], vec![-1, 2], vec![-2, 3]];
        let model = solve_dpll(&clauses, 3).unwrap();
        assert_eq!(model.len(), 3);
        assert!(model.contains(&2));
        assert!(model.contains(&3));
    }

    #[test]
    fn contradiction_is_unsat_with_a_core() {
        let clauses = vec![vec![1], vec![-1], vec![2, 3]];
        assert!(solve_dpll(&clauses, 3).is_none());
        let proof = core_proof(&clauses, 3);
        assert_eq!(proof.len(), 1);
        assert_eq!(proof[0].literals, vec![1]);
    }
}
