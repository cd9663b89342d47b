//! Problems over named boolean tensor variables.
//!
//! A [`ProblemSpec`] declares tensor variables by name and shape and holds one
//! [`Formula`] over them. The same formula is used to:
//!
//! - **check** a concrete assignment directly ([`ProblemSpec::check`])
//! - **solve** for one satisfying assignment ([`ProblemSpec::solve_one`])
//! - **enumerate** every satisfying assignment ([`ProblemSpec::models`])
//!
//! # Enumeration
//!
//! The formula is compiled once; then, until the solver reports
//! unsatisfiability, each model is decoded and a blocking clause over the
//! declared cells excludes exactly that assignment. Gate literals are never
//! blocked on, since the declared cells determine them. Every satisfying
//! assignment of the declared variables is therefore produced exactly once,
//! and the loop ends after at most 2^(declared cells) models.

use std::collections::btree_map::{self, BTreeMap};

use tracing::{debug, info};

use crate::algebra::{BoolAlgebra, Concrete, Symbolic};
use crate::error::{Error, Result};
use crate::solver::{Assignment, Literal, SatSolver};
use crate::tensor::shape::checked_size;
use crate::tensor::NamedTensor;

// ============================================================================
// BINDINGS
// ============================================================================

/// Tensors bound to variable names.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Bindings<T> {
    tensors: BTreeMap<String, NamedTensor<T>>,
}

/// One model: a boolean tensor per declared variable.
pub type Solution = Bindings<bool>;

impl<T> Bindings<T> {
    pub fn new() -> Self {
        Self {
            tensors: BTreeMap::new(),
        }
    }

    /// Bind `name`, returning the tensor it was bound to before.
    pub fn insert(&mut self, name: impl Into<String>, tensor: NamedTensor<T>) -> Option<NamedTensor<T>> {
        self.tensors.insert(name.into(), tensor)
    }

    /// Tensor bound to `name`.
    pub fn get(&self, name: &str) -> Result<&NamedTensor<T>> {
        self.tensors
            .get(name)
            .ok_or_else(|| Error::UnknownVariable(name.to_string()))
    }

    pub fn len(&self) -> usize {
        self.tensors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tensors.is_empty()
    }

    /// Bindings in name order.
    pub fn iter(&self) -> btree_map::Iter<'_, String, NamedTensor<T>> {
        self.tensors.iter()
    }
}

impl<T> Default for Bindings<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T, N: Into<String>> FromIterator<(N, NamedTensor<T>)> for Bindings<T> {
    fn from_iter<I: IntoIterator<Item = (N, NamedTensor<T>)>>(iter: I) -> Self {
        Self {
            tensors: iter.into_iter().map(|(n, t)| (n.into(), t)).collect(),
        }
    }
}

impl<'a, T> IntoIterator for &'a Bindings<T> {
    type Item = (&'a String, &'a NamedTensor<T>);
    type IntoIter = btree_map::Iter<'a, String, NamedTensor<T>>;

    fn into_iter(self) -> Self::IntoIter {
        self.tensors.iter()
    }
}

// ============================================================================
// FORMULAS AND PROBLEMS
// ============================================================================

/// A boolean formula over named tensor variables.
///
/// `compute` must be a pure, deterministic function of the algebra and the
/// bound tensors and must not depend on which interpreter runs it; otherwise
/// checking and enumeration can disagree.
pub trait Formula {
    fn compute<A: BoolAlgebra>(&self, alg: &mut A, vars: &Bindings<A::Elem>) -> Result<A::Elem>;
}

impl<F: Formula + ?Sized> Formula for &F {
    fn compute<A: BoolAlgebra>(&self, alg: &mut A, vars: &Bindings<A::Elem>) -> Result<A::Elem> {
        (**self).compute(alg, vars)
    }
}

/// Bounds on model enumeration.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct EnumerateOptions {
    /// Stop after this many models (`None` = all of them).
    pub limit: Option<usize>,
}

impl EnumerateOptions {
    pub fn with_limit(limit: usize) -> Self {
        Self { limit: Some(limit) }
    }
}

/// Declared tensor variables plus the formula constraining them.
#[derive(Clone, Debug)]
pub struct ProblemSpec<F> {
    shapes: BTreeMap<String, Vec<usize>>,
    formula: F,
}

impl<F: Formula> ProblemSpec<F> {
    /// Declare variables and their shapes.
    ///
    /// Fails on a repeated name or a shape whose cell count overflows.
    pub fn new<N: Into<String>>(
        shapes: impl IntoIterator<Item = (N, Vec<usize>)>,
        formula: F,
    ) -> Result<Self> {
        let mut declared = BTreeMap::new();
        for (name, shape) in shapes {
            let name = name.into();
            checked_size(&shape)?;
            if declared.insert(name.clone(), shape).is_some() {
                return Err(Error::MalformedInput(format!(
                    "variable '{}' declared twice",
                    name
                )));
            }
        }
        Ok(Self {
            shapes: declared,
            formula,
        })
    }

    pub fn shapes(&self) -> &BTreeMap<String, Vec<usize>> {
        &self.shapes
    }

    pub fn formula(&self) -> &F {
        &self.formula
    }

    /// Total number of declared cells (the variables models range over).
    pub fn num_cells(&self) -> usize {
        self.shapes.values().map(|s| s.iter().product::<usize>()).sum()
    }

    /// Evaluate the formula on concrete tensors.
    ///
    /// `tensors` must bind exactly the declared names, each with its declared shape.
    pub fn check(&self, tensors: &Bindings<bool>) -> Result<bool> {
        for (name, tensor) in tensors {
            let Some(shape) = self.shapes.get(name) else {
                return Err(Error::UnknownVariable(name.clone()));
            };
            if tensor.shape() != shape.as_slice() {
                return Err(Error::shape_mismatch("check", shape, tensor.shape()));
            }
        }
        if let Some(missing) = self.shapes.keys().find(|name| tensors.get(name).is_err()) {
            return Err(Error::MalformedInput(format!(
                "no tensor bound to variable '{}'",
                missing
            )));
        }

        self.formula.compute(&mut Concrete, tensors)
    }

    /// Start a fresh session holding the formula asserted true.
    ///
    /// Clears `solver`, allocates one literal per declared cell and compiles
    /// the formula. Returns the literal tensors of the declared variables;
    /// further constraints may be added to the session before solving.
    pub fn compile<S: SatSolver + ?Sized>(&self, solver: &mut S) -> Result<Bindings<Literal>> {
        solver.clear();

        let literals: Bindings<Literal> = self
            .shapes
            .iter()
            .map(|(name, shape)| (name.clone(), solver.tensor(shape)))
            .collect();

        let holds = self.formula.compute(&mut Symbolic::new(solver), &literals)?;
        solver.ensure(&[holds]);

        debug!(
            declared = self.num_cells(),
            variables = solver.num_variables(),
            clauses = solver.num_clauses(),
            "compiled formula"
        );
        Ok(literals)
    }

    /// Find one satisfying assignment, or `None` if there is none.
    pub fn solve_one<S: SatSolver + ?Sized>(&self, solver: &mut S) -> Result<Option<Solution>> {
        let literals = self.compile(solver)?;
        Ok(solver
            .solve()?
            .map(|assignment| decode(&literals, &assignment, &mut Vec::new())))
    }

    /// Lazily enumerate every satisfying assignment.
    pub fn models<'s, S: SatSolver + ?Sized>(&self, solver: &'s mut S) -> Result<Models<'s, S>> {
        let literals = self.compile(solver)?;
        Ok(Models {
            solver,
            literals,
            found: 0,
            exhausted: false,
        })
    }

    /// Every satisfying assignment, in solver order.
    ///
    /// Like [`enumerate`](Self::enumerate), leaves `solver` cleared.
    pub fn solve_all<S: SatSolver + ?Sized>(&self, solver: &mut S) -> Result<Vec<Solution>> {
        self.enumerate(solver, &EnumerateOptions::default())
    }

    /// Satisfying assignments, up to `options.limit` of them.
    ///
    /// The session is cleared afterwards, so no blocking clause outlives the call.
    pub fn enumerate<S: SatSolver + ?Sized>(
        &self,
        solver: &mut S,
        options: &EnumerateOptions,
    ) -> Result<Vec<Solution>> {
        let result = self.models(solver).and_then(|models| match options.limit {
            Some(limit) => models.take(limit).collect::<Result<Vec<_>>>(),
            None => models.collect::<Result<Vec<_>>>(),
        });
        solver.clear();
        let solutions = result?;
        info!(models = solutions.len(), "enumeration finished");
        Ok(solutions)
    }

    /// Number of satisfying assignments. Leaves `solver` cleared.
    pub fn count<S: SatSolver + ?Sized>(&self, solver: &mut S) -> Result<usize> {
        let result = self
            .models(solver)
            .and_then(|mut models| models.try_fold(0usize, |n, model| model.map(|_| n + 1)));
        solver.clear();
        result
    }

    /// Satisfying assignments stacked per variable along a new trailing axis.
    ///
    /// A variable declared with shape `s` comes back with shape `s + [m]`,
    /// where `m` is the number of models found; slice `k` of every variable
    /// belongs to model `k`. With no models the trailing extent is 0.
    pub fn collect<S: SatSolver + ?Sized>(
        &self,
        solver: &mut S,
        options: &EnumerateOptions,
    ) -> Result<Bindings<bool>> {
        let models = self.enumerate(solver, options)?;
        self.shapes
            .iter()
            .map(|(name, shape)| {
                let stacked = if models.is_empty() {
                    let mut empty = shape.clone();
                    empty.push(0);
                    NamedTensor::constant(&empty, false)
                } else {
                    let parts = models
                        .iter()
                        .map(|model| model.get(name).cloned())
                        .collect::<Result<Vec<_>>>()?;
                    NamedTensor::stack(&parts)?
                };
                Ok((name.clone(), stacked))
            })
            .collect()
    }
}

/// Decode the declared cells and collect the clause blocking this assignment.
fn decode(literals: &Bindings<Literal>, assignment: &Assignment, blocking: &mut Vec<Literal>) -> Solution {
    literals
        .iter()
        .map(|(name, tensor)| {
            let values = tensor.map(|&lit| {
                let value = assignment.value(lit);
                blocking.push(if value { -lit } else { lit });
                value
            });
            (name.clone(), values)
        })
        .collect()
}

// ============================================================================
// MODEL ITERATOR
// ============================================================================

/// Iterator over the models of a compiled problem.
///
/// Owns the solver session until dropped. The blocking clauses it adds stay in
/// the session until it is cleared, either explicitly or by the next
/// [`ProblemSpec::compile`].
pub struct Models<'s, S: SatSolver + ?Sized> {
    solver: &'s mut S,
    literals: Bindings<Literal>,
    found: usize,
    exhausted: bool,
}

impl<S: SatSolver + ?Sized> Models<'_, S> {
    /// Models produced so far.
    pub fn found(&self) -> usize {
        self.found
    }

    /// Literal tensors of the declared variables.
    pub fn literals(&self) -> &Bindings<Literal> {
        &self.literals
    }
}

impl<S: SatSolver + ?Sized> Iterator for Models<'_, S> {
    type Item = Result<Solution>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.exhausted {
            return None;
        }

        let assignment = match self.solver.solve() {
            Ok(Some(assignment)) => assignment,
            Ok(None) => {
                debug!(models = self.found, "no more models");
                self.exhausted = true;
                return None;
            }
            Err(err) => {
                self.exhausted = true;
                return Some(Err(err));
            }
        };

        let mut blocking = Vec::new();
        let solution = decode(&self.literals, &assignment, &mut blocking);
        self.found += 1;
        debug!(model = self.found, "found model");

        if blocking.is_empty() {
            // No declared cells: the single empty assignment is the only model
            self.exhausted = true;
        } else {
            self.solver.ensure(&blocking);
        }
        Some(Ok(solution))
    }
}
