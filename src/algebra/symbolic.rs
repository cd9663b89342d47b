//! Compilation of boolean formulas to CNF.
//!
//! Each gate gets a fresh output literal `o` and the clauses forcing
//! `o ⇔ gate(inputs)`, so the compiled formula is equisatisfiable with the
//! source formula and every gate literal is functionally determined by the inputs.
//! Gates are not shared between identical calls.

use super::BoolAlgebra;
use crate::solver::{Literal, SatSolver};

/// Interpreter that emits gates into a solver session.
pub struct Symbolic<'s, S: SatSolver + ?Sized> {
    solver: &'s mut S,
}

impl<'s, S: SatSolver + ?Sized> Symbolic<'s, S> {
    pub fn new(solver: &'s mut S) -> Self {
        Self { solver }
    }

    fn gate(&mut self) -> Literal {
        self.solver.variable()
    }

    /// `o ⇔ ∧ elems`
    fn and_gate(&mut self, elems: &[Literal]) -> Literal {
        let out = self.gate();
        let mut long = Vec::with_capacity(elems.len() + 1);
        long.push(out);
        for &x in elems {
            self.solver.ensure(&[-out, x]);
            long.push(-x);
        }
        self.solver.ensure(&long);
        out
    }

    /// `o ⇔ ∨ elems`
    fn or_gate(&mut self, elems: &[Literal]) -> Literal {
        let out = self.gate();
        let mut long = Vec::with_capacity(elems.len() + 1);
        long.push(-out);
        for &x in elems {
            self.solver.ensure(&[out, -x]);
            long.push(x);
        }
        self.solver.ensure(&long);
        out
    }
}

impl<S: SatSolver + ?Sized> BoolAlgebra for Symbolic<'_, S> {
    type Elem = Literal;

    /// Fresh literal pinned by a unit clause.
    fn lift(&mut self, value: bool) -> Literal {
        let lit = self.gate();
        self.solver.ensure(&[if value { lit } else { -lit }]);
        lit
    }

    fn not(&mut self, a: &Literal) -> Literal {
        -*a
    }

    fn and(&mut self, a: &Literal, b: &Literal) -> Literal {
        self.and_gate(&[*a, *b])
    }

    fn or(&mut self, a: &Literal, b: &Literal) -> Literal {
        self.or_gate(&[*a, *b])
    }

    fn equ(&mut self, a: &Literal, b: &Literal) -> Literal {
        let (a, b) = (*a, *b);
        let out = self.gate();
        self.solver.ensure(&[-out, -a, b]);
        self.solver.ensure(&[-out, a, -b]);
        self.solver.ensure(&[out, a, b]);
        self.solver.ensure(&[out, -a, -b]);
        out
    }

    fn imp(&mut self, a: &Literal, b: &Literal) -> Literal {
        self.or_gate(&[-*a, *b])
    }

    fn all(&mut self, elems: &[Literal]) -> Literal {
        match elems {
            [] => self.truth(),
            [x] => *x,
            _ => self.and_gate(elems),
        }
    }

    fn any(&mut self, elems: &[Literal]) -> Literal {
        match elems {
            [] => self.falsity(),
            [x] => *x,
            _ => self.or_gate(elems),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::algebra::{Aggregate, Concrete, Connective};
    use crate::solver::VarisatSolver;

    /// Compile `op` over fresh inputs, pin the inputs to `values` and return
    /// the value the output takes in the (unique) model.
    fn forced(values: &[bool], build: impl Fn(&mut Symbolic<'_, VarisatSolver>, &[Literal]) -> Literal) -> bool {
        let mut solver = VarisatSolver::new();
        let inputs: Vec<Literal> = values.iter().map(|_| solver.variable()).collect();
        let out = {
            let mut alg = Symbolic::new(&mut solver);
            build(&mut alg, &inputs)
        };
        for (&lit, &value) in inputs.iter().zip(values) {
            solver.ensure(&[if value { lit } else { -lit }]);
        }
        let model = solver.solve().unwrap().expect("gates never constrain inputs");
        model.value(out)
    }

    #[test]
    fn test_gates_match_truth_tables() {
        let ops = [
            Connective::And,
            Connective::Or,
            Connective::Imp,
            Connective::Equ,
            Connective::Leq,
        ];
        for op in ops {
            for a in [false, true] {
                for b in [false, true] {
                    let expected = Concrete.connect(op, &[a, b]);
                    let got = forced(&[a, b], |alg, x| alg.connect(op, x));
                    assert_eq!(got, expected, "{:?}({}, {})", op, a, b);
                }
            }
        }
    }

    #[test]
    fn test_aggregates_match_concrete() {
        let aggs = [Aggregate::All, Aggregate::Any, Aggregate::One, Aggregate::Eqs];
        for n in 0..4usize {
            for bits in 0..(1u32 << n) {
                let values: Vec<bool> = (0..n).map(|i| bits & (1 << i) != 0).collect();
                for agg in aggs {
                    let expected = Concrete.aggregate(agg, &values);
                    let got = forced(&values, |alg, x| alg.aggregate(agg, x));
                    assert_eq!(got, expected, "{:?} on {:?}", agg, values);
                }
            }
        }
    }

    #[test]
    fn test_lift_pins_value() {
        assert!(forced(&[], |alg, _| alg.lift(true)));
        assert!(!forced(&[], |alg, _| alg.lift(false)));
    }
}
