//! Tagless final interface for boolean formulas.
//!
//! A formula is written once against [`BoolAlgebra`] and can then be run by
//! different interpreters without changing the formula itself:
//!
//! - **Concrete**: ordinary truth values, for direct checking
//! - **Symbolic**: every operator becomes a gate whose CNF encoding is sent
//!   to a SAT solver session, for solving and model enumeration
//!
//! # Example
//!
//! ```ignore
//! fn is_reflexive<A: BoolAlgebra>(alg: &mut A, rel: &NamedTensor<A::Elem>) -> Result<A::Elem> {
//!     alg.reduce(Aggregate::All, "", Connective::Id, &[rel.named("xx")])?.to_scalar()
//! }
//!
//! is_reflexive(&mut Concrete, &identity)?;          // -> bool
//! is_reflexive(&mut Symbolic::new(&mut solver), &literals)?; // -> Literal
//! ```
//!
//! Formulas must never try to find out which interpreter is running them.

mod concrete;
mod symbolic;

pub use concrete::Concrete;
pub use symbolic::Symbolic;

use std::fmt::Debug;

use crate::error::Result;
use crate::tensor::{join, Labeled, NamedTensor};

/// Aggregators usable in folds and contractions.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Aggregate {
    /// Conjunction; the empty block is true.
    All,
    /// Disjunction; the empty block is false.
    Any,
    /// Exactly one cell is true; the empty block is false.
    One,
    /// All cells are equal; the empty block is true.
    Eqs,
}

/// Pointwise connectives usable in maps and contractions.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Connective {
    Id,
    Not,
    And,
    Or,
    Imp,
    Equ,
    Leq,
}

impl Connective {
    /// Whether the connective accepts `n` arguments.
    ///
    /// `And` and `Or` take one or more arguments, `Id` and `Not` exactly one,
    /// the remaining connectives exactly two.
    pub fn accepts(self, n: usize) -> bool {
        match self {
            Connective::Id | Connective::Not => n == 1,
            Connective::And | Connective::Or => n >= 1,
            Connective::Imp | Connective::Equ | Connective::Leq => n == 2,
        }
    }
}

/// A boolean algebra interpreter.
///
/// Implementations must agree on the truth of every formula: for any
/// assignment of the inputs, the concrete result equals the value the
/// symbolic result takes in every model extending that assignment.
pub trait BoolAlgebra {
    /// Domain value: a truth value, a literal, ...
    type Elem: Clone + Debug;

    /// Embed a constant truth value.
    fn lift(&mut self, value: bool) -> Self::Elem;

    fn not(&mut self, a: &Self::Elem) -> Self::Elem;

    fn and(&mut self, a: &Self::Elem, b: &Self::Elem) -> Self::Elem;

    fn or(&mut self, a: &Self::Elem, b: &Self::Elem) -> Self::Elem;

    /// Equivalence `a ⇔ b`.
    fn equ(&mut self, a: &Self::Elem, b: &Self::Elem) -> Self::Elem;

    fn truth(&mut self) -> Self::Elem {
        self.lift(true)
    }

    fn falsity(&mut self) -> Self::Elem {
        self.lift(false)
    }

    fn id(&mut self, a: &Self::Elem) -> Self::Elem {
        a.clone()
    }

    /// Implication `a ⇒ b`.
    fn imp(&mut self, a: &Self::Elem, b: &Self::Elem) -> Self::Elem {
        let not_a = self.not(a);
        self.or(&not_a, b)
    }

    /// Order `a ≤ b` with false < true (same truth table as implication).
    fn leq(&mut self, a: &Self::Elem, b: &Self::Elem) -> Self::Elem {
        self.imp(a, b)
    }

    // ========================================================================
    // Aggregators
    // ========================================================================

    fn all(&mut self, elems: &[Self::Elem]) -> Self::Elem {
        let Some((first, rest)) = elems.split_first() else {
            return self.truth();
        };
        rest.iter()
            .fold(first.clone(), |acc, elem| self.and(&acc, elem))
    }

    fn any(&mut self, elems: &[Self::Elem]) -> Self::Elem {
        let Some((first, rest)) = elems.split_first() else {
            return self.falsity();
        };
        rest.iter()
            .fold(first.clone(), |acc, elem| self.or(&acc, elem))
    }

    /// Exactly one element is true.
    ///
    /// Not a pairwise fold: scans while tracking "at least one seen" and
    /// "at least two seen".
    fn one(&mut self, elems: &[Self::Elem]) -> Self::Elem {
        let Some((first, rest)) = elems.split_first() else {
            return self.falsity();
        };
        let mut seen_one = first.clone();
        let mut seen_two: Option<Self::Elem> = None;
        for elem in rest {
            let both = self.and(&seen_one, elem);
            seen_two = Some(match seen_two {
                Some(two) => self.or(&two, &both),
                None => both,
            });
            seen_one = self.or(&seen_one, elem);
        }
        match seen_two {
            Some(two) => {
                let not_two = self.not(&two);
                self.and(&seen_one, &not_two)
            }
            None => seen_one,
        }
    }

    /// All elements are equal.
    fn eqs(&mut self, elems: &[Self::Elem]) -> Self::Elem {
        let Some((first, rest)) = elems.split_first() else {
            return self.truth();
        };
        let pairs: Vec<Self::Elem> = rest.iter().map(|elem| self.equ(first, elem)).collect();
        self.all(&pairs)
    }

    fn aggregate(&mut self, agg: Aggregate, elems: &[Self::Elem]) -> Self::Elem {
        match agg {
            Aggregate::All => self.all(elems),
            Aggregate::Any => self.any(elems),
            Aggregate::One => self.one(elems),
            Aggregate::Eqs => self.eqs(elems),
        }
    }

    /// Apply a connective to its arguments.
    ///
    /// # Panics
    /// Panics if the argument count does not suit the connective.
    fn connect(&mut self, op: Connective, args: &[Self::Elem]) -> Self::Elem {
        assert!(
            op.accepts(args.len()),
            "{:?} applied to {} arguments",
            op,
            args.len()
        );
        match op {
            Connective::Id => self.id(&args[0]),
            Connective::Not => self.not(&args[0]),
            Connective::And => self.all(args),
            Connective::Or => self.any(args),
            Connective::Imp => self.imp(&args[0], &args[1]),
            Connective::Equ => self.equ(&args[0], &args[1]),
            Connective::Leq => self.leq(&args[0], &args[1]),
        }
    }

    // ========================================================================
    // Tensor-level operations (derived from the above)
    // ========================================================================

    /// Tensor of the given shape filled with a lifted constant.
    fn constant(&mut self, shape: &[usize], value: bool) -> NamedTensor<Self::Elem> {
        let elem = self.lift(value);
        NamedTensor::constant(shape, elem)
    }

    /// Embed a concrete tensor cell by cell.
    fn lift_tensor(&mut self, tensor: &NamedTensor<bool>) -> NamedTensor<Self::Elem> {
        tensor.map(|&value| self.lift(value))
    }

    /// Apply a unary connective to every cell.
    fn map(&mut self, op: Connective, tensor: &NamedTensor<Self::Elem>) -> NamedTensor<Self::Elem> {
        tensor.map(|elem| self.connect(op, std::slice::from_ref(elem)))
    }

    /// Apply a binary connective cellwise; shapes must agree.
    fn map2(
        &mut self,
        op: Connective,
        a: &NamedTensor<Self::Elem>,
        b: &NamedTensor<Self::Elem>,
    ) -> Result<NamedTensor<Self::Elem>> {
        NamedTensor::map2(a, b, |x, y| self.connect(op, &[x.clone(), y.clone()]))
    }

    /// Collapse the trailing `axes` axes with an aggregator.
    fn fold(
        &mut self,
        agg: Aggregate,
        axes: usize,
        tensor: &NamedTensor<Self::Elem>,
    ) -> Result<NamedTensor<Self::Elem>> {
        tensor.fold(axes, |block| self.aggregate(agg, block))
    }

    /// Join `operands` on shared labels, combine them pointwise with `op`,
    /// and aggregate away every label missing from `output`.
    fn reduce(
        &mut self,
        agg: Aggregate,
        output: &str,
        op: Connective,
        operands: &[Labeled<'_, Self::Elem>],
    ) -> Result<NamedTensor<Self::Elem>> {
        let joined = join(output, operands, |cells| self.connect(op, cells))?;
        joined
            .tensor
            .fold(joined.folded, |block| self.aggregate(agg, block))
    }
}
