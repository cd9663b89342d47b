//! Session backed by the varisat CDCL engine.

use std::fmt;

use ::varisat::{ExtendFormula, Lit, Solver};
use tracing::{debug, trace};

use crate::error::{Error, Result};

use super::{Assignment, Literal, SatSolver};

/// [`SatSolver`] running on an in-process varisat instance.
pub struct VarisatSolver {
    engine: Solver<'static>,
    variables: usize,
    clauses: usize,
}

impl VarisatSolver {
    pub fn new() -> Self {
        Self {
            engine: Solver::new(),
            variables: 0,
            clauses: 0,
        }
    }
}

impl Default for VarisatSolver {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for VarisatSolver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("VarisatSolver")
            .field("variables", &self.variables)
            .field("clauses", &self.clauses)
            .finish()
    }
}

impl SatSolver for VarisatSolver {
    fn variable(&mut self) -> Literal {
        let var = self.engine.new_var();
        self.variables += 1;
        debug_assert_eq!(var.to_dimacs(), self.variables as isize);
        Literal::try_from(self.variables).unwrap_or_else(|_| {
            panic!("variable count {} exceeds the literal range", self.variables)
        })
    }

    fn ensure(&mut self, clause: &[Literal]) {
        let lits: Vec<Lit> = clause
            .iter()
            .map(|&lit| {
                assert!(
                    lit != 0 && (lit.unsigned_abs() as usize) <= self.variables,
                    "literal {} was not allocated in this session ({} variables)",
                    lit,
                    self.variables
                );
                Lit::from_dimacs(lit as isize)
            })
            .collect();
        self.engine.add_clause(&lits);
        self.clauses += 1;
    }

    fn clear(&mut self) {
        trace!(
            variables = self.variables,
            clauses = self.clauses,
            "clearing solver session"
        );
        *self = Self::new();
    }

    fn solve(&mut self) -> Result<Option<Assignment>> {
        let satisfiable = self
            .engine
            .solve()
            .map_err(|err| Error::Engine(err.to_string()))?;
        debug!(
            satisfiable,
            variables = self.variables,
            clauses = self.clauses,
            "varisat finished"
        );
        if !satisfiable {
            return Ok(None);
        }

        let model = self
            .engine
            .model()
            .ok_or_else(|| Error::Engine("satisfiable result without a model".into()))?;

        // Variables that occur in no clause may be missing from the model;
        // any value satisfies the formula for them.
        let mut values = vec![false; self.variables];
        for lit in model {
            if let Some(slot) = values.get_mut(lit.var().index()) {
                *slot = lit.is_positive();
            }
        }
        Ok(Some(Assignment::new(values)))
    }

    fn num_variables(&self) -> usize {
        self.variables
    }

    fn num_clauses(&self) -> usize {
        self.clauses
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_basic_sat() {
        let mut solver = VarisatSolver::new();
        let x = solver.variable();
        let y = solver.variable();
        let z = solver.variable();

        // (x ∨ y) ∧ (¬x ∨ z) ∧ ¬y
        solver.ensure(&[x, y]);
        solver.ensure(&[-x, z]);
        solver.ensure(&[-y]);

        let model = solver.solve().unwrap().expect("satisfiable");
        assert!(model.value(x));
        assert!(!model.value(y));
        assert!(model.value(z));
    }

    #[test]
    fn test_basic_unsat() {
        let mut solver = VarisatSolver::new();
        let x = solver.variable();
        solver.ensure(&[x]);
        solver.ensure(&[-x]);
        assert_eq!(solver.solve().unwrap(), None);
    }

    #[test]
    fn test_unconstrained_variable_is_assigned() {
        let mut solver = VarisatSolver::new();
        let x = solver.variable();
        let _free = solver.variable();
        solver.ensure(&[x]);
        let model = solver.solve().unwrap().expect("satisfiable");
        assert_eq!(model.num_variables(), 2);
    }

    #[test]
    fn test_incremental_then_clear() {
        let mut solver = VarisatSolver::new();
        let x = solver.variable();
        solver.ensure(&[x]);
        assert!(solver.solve().unwrap().is_some());
        solver.ensure(&[-x]);
        assert!(solver.solve().unwrap().is_none());

        solver.clear();
        assert_eq!(solver.num_variables(), 0);
        assert_eq!(solver.num_clauses(), 0);
        let y = solver.variable();
        assert_eq!(y, 1);
        solver.ensure(&[-y]);
        assert!(solver.solve().unwrap().is_some());
    }

    #[test]
    #[should_panic(expected = "not allocated")]
    fn test_foreign_literal_panics() {
        let mut solver = VarisatSolver::new();
        solver.variable();
        solver.ensure(&[2]);
    }
}
