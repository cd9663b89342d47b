//! tensorsat: boolean tensor formulas over a SAT solver
//!
//! Constraints are written once, against named-axis tensors of truth values,
//! and then either evaluated directly or compiled to CNF and handed to a SAT
//! engine to find (or enumerate) the tensors satisfying them.
//!
//! - [`tensor`]: immutable named-axis tensors, joins and contractions
//! - [`algebra`]: the interpreter interface and its concrete/symbolic backends
//! - [`solver`]: SAT sessions
//! - [`problem`]: declared variables plus one formula; check, solve, enumerate
//! - [`relations`]: ready-made predicates on relations, operations and monoids
//! - [`table`]: compact operation table encoding

pub mod algebra;
pub mod error;
pub mod pretty;
pub mod problem;
pub mod relations;
pub mod solver;
pub mod table;
pub mod tensor;

pub use algebra::{Aggregate, BoolAlgebra, Concrete, Connective, Symbolic};
pub use error::{Error, Result};
pub use problem::{Bindings, EnumerateOptions, Formula, Models, ProblemSpec, Solution};
pub use solver::{Assignment, Literal, SatSolver, VarisatSolver};
pub use tensor::{Axis, NamedTensor};
