//! SAT solver sessions.
//!
//! A [`SatSolver`] owns one working formula: a pool of variables and a set of
//! clauses over them. Literals are DIMACS-style signed integers: variable `v`
//! (numbered from 1) is the literal `v`, its negation `-v`.
//!
//! The engine behind a session is a black box that either returns a complete
//! assignment or reports unsatisfiability. Sessions are not shared: every
//! solve or enumeration starts by calling [`SatSolver::clear`].

mod varisat;

pub use self::varisat::VarisatSolver;

use crate::error::Result;
use crate::tensor::NamedTensor;

/// A signed variable id; never 0.
pub type Literal = i32;

/// A complete truth assignment to the variables of one session.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Assignment {
    /// `values[v - 1]` is the value of variable `v`
    values: Vec<bool>,
}

impl Assignment {
    /// Assignment where variable `v` takes `values[v - 1]`.
    pub fn new(values: Vec<bool>) -> Self {
        Self { values }
    }

    pub fn num_variables(&self) -> usize {
        self.values.len()
    }

    /// Truth value of a literal under this assignment.
    ///
    /// # Panics
    /// Panics on literal 0 or a variable outside the assignment.
    pub fn value(&self, lit: Literal) -> bool {
        assert!(lit != 0, "literal 0 is not a variable");
        let var = lit.unsigned_abs() as usize;
        assert!(
            var <= self.values.len(),
            "variable {} outside assignment of {} variables",
            var,
            self.values.len()
        );
        self.values[var - 1] == (lit > 0)
    }
}

/// A SAT solving session.
pub trait SatSolver {
    /// Allocate a fresh variable and return its positive literal.
    fn variable(&mut self) -> Literal;

    /// Add the disjunction of `clause` to the working formula.
    ///
    /// # Panics
    /// Panics if a literal is 0 or names a variable not allocated in this session.
    fn ensure(&mut self, clause: &[Literal]);

    /// Forget every variable and clause.
    fn clear(&mut self);

    /// Decide the working formula.
    ///
    /// Returns `Ok(None)` when unsatisfiable and a complete assignment
    /// otherwise. Engine failures are passed through as errors.
    fn solve(&mut self) -> Result<Option<Assignment>>;

    fn num_variables(&self) -> usize;

    fn num_clauses(&self) -> usize;

    /// One fresh variable per cell, allocated in row-major order.
    fn tensor(&mut self, shape: &[usize]) -> NamedTensor<Literal> {
        NamedTensor::generate(shape, |_| self.variable())
    }
}
