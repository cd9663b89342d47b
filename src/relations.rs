//! Predicates on relations and operations, written once for every interpreter.
//!
//! A relation of arity `r` on `n` elements is a `[n; r]` tensor. An operation
//! of arity `k` is stored in relational form as a `[n; k + 1]` tensor whose
//! cell `[v, x₁, .., xₖ]` is true iff the operation maps `(x₁, .., xₖ)` to `v`.
//! A monoid of unary maps is a `[n, n, m]` tensor holding `m` maps in
//! relational form along its trailing axis, as produced by
//! [`table::decode`](crate::table::decode).

use crate::algebra::{Aggregate, BoolAlgebra, Concrete, Connective};
use crate::error::{Error, Result};
use crate::problem::{Bindings, Formula, ProblemSpec};
use crate::tensor::{Labeled, NamedTensor};

/// Variable name used by relation problems.
pub const RELATION: &str = "rel";

/// Variable name used by operation problems.
pub const OPERATION: &str = "op";

/// Variable name used by [`ClosedSubsets`].
pub const SUBSET: &str = "sub";

/// Require `rank` axes of extent `n`.
fn require_extent<T>(kind: &'static str, tensor: &NamedTensor<T>, rank: usize, n: usize) -> Result<()> {
    let expected = vec![n; rank];
    if tensor.shape() != expected.as_slice() {
        return Err(Error::shape_mismatch(kind, &expected, tensor.shape()));
    }
    Ok(())
}

/// Require `rank` axes of one common extent.
fn require_cube<T>(kind: &'static str, tensor: &NamedTensor<T>, rank: usize) -> Result<()> {
    let n = tensor.shape().first().copied().unwrap_or(0);
    require_extent(kind, tensor, rank, n)
}

/// Number of elements the maps of `monoid` act on.
fn monoid_size<T>(monoid: &NamedTensor<T>) -> Result<usize> {
    match monoid.shape() {
        &[n, m, _] if n == m => Ok(n),
        shape => {
            let n = shape.first().copied().unwrap_or(0);
            Err(Error::shape_mismatch("monoid", &[n, n, 0], shape))
        }
    }
}

/// One label per axis, `a`, `b`, ...
fn axis_labels(kind: &str, rank: usize, min: usize) -> Result<String> {
    if rank < min || rank > 26 {
        return Err(Error::InvalidAxes(format!(
            "{} tensor of rank {} needs between {} and 26 axes",
            kind, rank, min
        )));
    }
    Ok(('a'..='z').take(rank).collect())
}

/// `labels` with the label at `axis` removed.
fn without(labels: &str, axis: usize) -> String {
    labels
        .chars()
        .enumerate()
        .filter(|&(i, _)| i != axis)
        .map(|(_, label)| label)
        .collect()
}

/// Every element is related to itself.
pub fn is_reflexive<A: BoolAlgebra>(alg: &mut A, rel: &NamedTensor<A::Elem>) -> Result<A::Elem> {
    require_cube("relation", rel, 2)?;
    alg.reduce(Aggregate::All, "", Connective::Id, &[rel.named("xx")])?
        .to_scalar()
}

pub fn is_symmetric<A: BoolAlgebra>(alg: &mut A, rel: &NamedTensor<A::Elem>) -> Result<A::Elem> {
    require_cube("relation", rel, 2)?;
    alg.reduce(
        Aggregate::All,
        "",
        Connective::Equ,
        &[rel.named("xy"), rel.named("yx")],
    )?
    .to_scalar()
}

/// `R ∘ R ⊆ R`
pub fn is_transitive<A: BoolAlgebra>(alg: &mut A, rel: &NamedTensor<A::Elem>) -> Result<A::Elem> {
    require_cube("relation", rel, 2)?;
    let composed = alg.reduce(
        Aggregate::Any,
        "xz",
        Connective::And,
        &[rel.named("xy"), rel.named("yz")],
    )?;
    let contained = alg.map2(Connective::Leq, &composed, rel)?;
    alg.fold(Aggregate::All, 2, &contained)?.to_scalar()
}

pub fn is_equivalence<A: BoolAlgebra>(alg: &mut A, rel: &NamedTensor<A::Elem>) -> Result<A::Elem> {
    let parts = [
        is_reflexive(alg, rel)?,
        is_symmetric(alg, rel)?,
        is_transitive(alg, rel)?,
    ];
    Ok(alg.all(&parts))
}

/// Some tuple outside the relation has each of its coordinates backed by the
/// relation: changing any single coordinate can land inside it.
///
/// For a binary relation, `∃x,y. ¬R(x,y) ∧ ∃y'. R(x,y') ∧ ∃x'. R(x',y)`.
pub fn is_essential<A: BoolAlgebra>(alg: &mut A, rel: &NamedTensor<A::Elem>) -> Result<A::Elem> {
    let labels = axis_labels("relation", rel.rank(), 2)?;
    let mut shadows = Vec::with_capacity(labels.len());
    for axis in 0..labels.len() {
        let kept = without(&labels, axis);
        let shadow = alg.reduce(Aggregate::Any, &kept, Connective::Id, &[rel.named(&labels)])?;
        shadows.push((shadow, kept));
    }
    let outside = alg.map(Connective::Not, rel);

    let mut operands: Vec<Labeled<'_, A::Elem>> = shadows
        .iter()
        .map(|(shadow, kept)| shadow.named(kept))
        .collect();
    operands.push(outside.named(&labels));
    alg.reduce(Aggregate::Any, "", Connective::And, &operands)?
        .to_scalar()
}

/// The relational form assigns exactly one value to every argument tuple.
pub fn is_function<A: BoolAlgebra>(alg: &mut A, func: &NamedTensor<A::Elem>) -> Result<A::Elem> {
    let rank = func.rank();
    let labels = axis_labels("operation", rank, 1)?;
    let unique = alg.reduce(
        Aggregate::One,
        &labels[1..],
        Connective::Id,
        &[func.named(&labels)],
    )?;
    alg.fold(Aggregate::All, rank - 1, &unique)?.to_scalar()
}

/// `m(x,x,y) = m(x,y,x) = m(y,x,x) = x`
pub fn is_majority<A: BoolAlgebra>(alg: &mut A, op: &NamedTensor<A::Elem>) -> Result<A::Elem> {
    require_cube("operation", op, 4)?;
    let mut parts = Vec::with_capacity(3);
    for labels in ["xxxy", "xxyx", "xyxx"] {
        parts.push(
            alg.reduce(Aggregate::All, "", Connective::Id, &[op.named(labels)])?
                .to_scalar()?,
        );
    }
    Ok(alg.all(&parts))
}

/// `p(x,x,y) = p(y,x,x) = y`
pub fn is_maltsev<A: BoolAlgebra>(alg: &mut A, op: &NamedTensor<A::Elem>) -> Result<A::Elem> {
    require_cube("operation", op, 4)?;
    let mut parts = Vec::with_capacity(2);
    for labels in ["yxxy", "yyxx"] {
        parts.push(
            alg.reduce(Aggregate::All, "", Connective::Id, &[op.named(labels)])?
                .to_scalar()?,
        );
    }
    Ok(alg.all(&parts))
}

/// The operation depends on every one of its arguments.
///
/// An operation ignores argument `i` when its graph is constant along that
/// axis for every value and every choice of the other arguments.
pub fn is_essential_op<A: BoolAlgebra>(alg: &mut A, op: &NamedTensor<A::Elem>) -> Result<A::Elem> {
    let labels = axis_labels("operation", op.rank(), 2)?;
    let mut ignored = Vec::with_capacity(labels.len() - 1);
    for axis in 1..labels.len() {
        let constant = alg.reduce(
            Aggregate::Eqs,
            &without(&labels, axis),
            Connective::Id,
            &[op.named(&labels)],
        )?;
        ignored.push(alg.fold(Aggregate::All, labels.len() - 1, &constant)?.to_scalar()?);
    }
    let some = alg.any(&ignored);
    Ok(alg.not(&some))
}

// ============================================================================
// MONOIDS OF UNARY MAPS
// ============================================================================

/// The maps are pairwise distinct and the composite of any two of them is one
/// of them.
pub fn is_monoid<A: BoolAlgebra>(alg: &mut A, monoid: &NamedTensor<A::Elem>) -> Result<A::Elem> {
    monoid_size(monoid)?;
    // x = fᵢ(fⱼ(z))
    let composed = alg.reduce(
        Aggregate::Any,
        "xzij",
        Connective::And,
        &[monoid.named("xyi"), monoid.named("yzj")],
    )?;
    // fₖ = fᵢ ∘ fⱼ, with k as the value axis
    let equal = alg.reduce(
        Aggregate::All,
        "kij",
        Connective::Equ,
        &[composed.named("xzij"), monoid.named("xzk")],
    )?;
    is_function(alg, &equal)
}

/// Every map of the monoid sends tuples of `rel` to tuples of `rel`.
///
/// Defined for relations of arity 1, 2 and 3.
pub fn is_compatible<A: BoolAlgebra>(
    alg: &mut A,
    rel: &NamedTensor<A::Elem>,
    monoid: &NamedTensor<A::Elem>,
) -> Result<A::Elem> {
    let n = monoid_size(monoid)?;
    require_extent("relation", rel, rel.rank(), n)?;
    let image = match rel.rank() {
        1 => alg.reduce(
            Aggregate::Any,
            "y",
            Connective::And,
            &[rel.named("x"), monoid.named("yxp")],
        )?,
        2 => {
            let first = alg.reduce(
                Aggregate::Any,
                "uyp",
                Connective::And,
                &[rel.named("xy"), monoid.named("uxp")],
            )?;
            alg.reduce(
                Aggregate::Any,
                "uv",
                Connective::And,
                &[first.named("uyp"), monoid.named("vyp")],
            )?
        }
        3 => {
            let first = alg.reduce(
                Aggregate::Any,
                "uyzp",
                Connective::And,
                &[rel.named("xyz"), monoid.named("uxp")],
            )?;
            let second = alg.reduce(
                Aggregate::Any,
                "uvzp",
                Connective::And,
                &[first.named("uyzp"), monoid.named("vyp")],
            )?;
            alg.reduce(
                Aggregate::Any,
                "uvw",
                Connective::And,
                &[second.named("uvzp"), monoid.named("wzp")],
            )?
        }
        rank => {
            return Err(Error::InvalidAxes(format!(
                "compatibility needs a relation of arity 1 to 3, got {}",
                rank
            )))
        }
    };
    let contained = alg.map2(Connective::Leq, &image, rel)?;
    alg.fold(Aggregate::All, rel.rank(), &contained)?.to_scalar()
}

/// Feeding the operation with maps of the monoid, all applied to the same
/// element, always gives a map of the monoid.
///
/// For a binary `f` and maps `p`, `q`: `t ↦ f(q(t), p(t))` is in the monoid.
/// Defined for binary and ternary operations.
pub fn is_stabilizer<A: BoolAlgebra>(
    alg: &mut A,
    op: &NamedTensor<A::Elem>,
    monoid: &NamedTensor<A::Elem>,
) -> Result<A::Elem> {
    let n = monoid_size(monoid)?;
    require_extent("operation", op, op.rank(), n)?;
    let composite = match op.rank() {
        3 => {
            let t = alg.reduce(
                Aggregate::Any,
                "xytp",
                Connective::And,
                &[op.named("xyz"), monoid.named("ztp")],
            )?;
            let t = alg.reduce(
                Aggregate::Any,
                "xtpq",
                Connective::And,
                &[t.named("xytp"), monoid.named("ytq")],
            )?;
            alg.reduce(
                Aggregate::All,
                "pqr",
                Connective::Equ,
                &[t.named("xtpq"), monoid.named("xtr")],
            )?
        }
        4 => {
            let t = alg.reduce(
                Aggregate::Any,
                "atpcd",
                Connective::And,
                &[op.named("abcd"), monoid.named("btp")],
            )?;
            let t = alg.reduce(
                Aggregate::Any,
                "atpqd",
                Connective::And,
                &[t.named("atpcd"), monoid.named("ctq")],
            )?;
            let t = alg.reduce(
                Aggregate::Any,
                "atpqr",
                Connective::And,
                &[t.named("atpqd"), monoid.named("dtr")],
            )?;
            alg.reduce(
                Aggregate::All,
                "pqrs",
                Connective::Equ,
                &[t.named("atpqr"), monoid.named("ats")],
            )?
        }
        rank => {
            return Err(Error::InvalidAxes(format!(
                "stabilizer needs an operation of arity 2 or 3, got {}",
                rank - 1
            )))
        }
    };
    let member = alg.fold(Aggregate::One, 1, &composite)?;
    alg.fold(Aggregate::All, member.rank(), &member)?.to_scalar()
}

// ============================================================================
// GALOIS CONNECTION
// ============================================================================

/// The binary operation applied coordinatewise to two tuples of `rel` gives a
/// tuple of `rel`.
pub fn is_preserved<A: BoolAlgebra>(
    alg: &mut A,
    rel: &NamedTensor<A::Elem>,
    op: &NamedTensor<A::Elem>,
) -> Result<A::Elem> {
    require_cube("operation", op, 3)?;
    let arity = rel.rank();
    if arity == 0 || arity > 8 {
        return Err(Error::InvalidAxes(format!(
            "preservation needs a relation of arity 1 to 8, got {}",
            arity
        )));
    }
    require_extent("relation", rel, arity, op.shape()[0])?;

    let labels: Vec<char> = ('a'..='z').collect();
    let left: String = labels[..arity].iter().collect();
    let right: String = labels[arity..2 * arity].iter().collect();
    let image: String = labels[2 * arity..3 * arity].iter().collect();
    let graphs: Vec<String> = (0..arity)
        .map(|i| [labels[2 * arity + i], labels[i], labels[arity + i]].iter().collect())
        .collect();

    let mut operands = vec![rel.named(&left), rel.named(&right)];
    operands.extend(graphs.iter().map(|graph| op.named(graph)));
    let reached = alg.reduce(Aggregate::Any, &image, Connective::And, &operands)?;
    let contained = alg.map2(Connective::Leq, &reached, rel)?;
    alg.fold(Aggregate::All, arity, &contained)?.to_scalar()
}

/// Matrix `[f, r]` telling whether operation `f` preserves relation `r`.
///
/// `ops` stacks binary operations (`[n, n, n, f]`) and `rels` stacks relations
/// (`[n; arity] + [r]`) along their trailing axes, as returned by
/// [`ProblemSpec::collect`].
pub fn galois_connection(ops: &NamedTensor<bool>, rels: &NamedTensor<bool>) -> Result<NamedTensor<bool>> {
    let ops = ops.unconcat()?;
    let rels = rels.unconcat()?;
    let mut cells = Vec::with_capacity(ops.len() * rels.len());
    for op in &ops {
        for rel in &rels {
            cells.push(is_preserved(&mut Concrete, rel, op)?);
        }
    }
    NamedTensor::from_vec(&[ops.len(), rels.len()], cells)
}

/// `subset` is closed in the Galois connection `galois`: it equals the set of
/// rows related to every column that all of `subset` is related to.
pub fn is_closed_subset<A: BoolAlgebra>(
    alg: &mut A,
    subset: &NamedTensor<A::Elem>,
    galois: &NamedTensor<A::Elem>,
) -> Result<A::Elem> {
    if galois.rank() != 2 {
        return Err(Error::InvalidAxes(format!(
            "Galois connection must be a matrix, got shape {:?}",
            galois.shape()
        )));
    }
    require_extent("subset", subset, 1, galois.shape()[0])?;
    let columns = alg.reduce(
        Aggregate::All,
        "y",
        Connective::Leq,
        &[subset.named("x"), galois.named("xy")],
    )?;
    let closure = alg.reduce(
        Aggregate::All,
        "x",
        Connective::Leq,
        &[columns.named("y"), galois.named("xy")],
    )?;
    let same = alg.map2(Connective::Equ, subset, &closure)?;
    alg.fold(Aggregate::All, 1, &same)?.to_scalar()
}

// ============================================================================
// READY-MADE PROBLEMS
// ============================================================================

/// Properties of a single binary relation bound to [`RELATION`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RelationProperty {
    Reflexive,
    Symmetric,
    Transitive,
    Equivalence,
    Essential,
}

impl RelationProperty {
    /// Problem ranging over all relations on `size` elements.
    pub fn problem(self, size: usize) -> Result<ProblemSpec<Self>> {
        ProblemSpec::new([(RELATION, vec![size, size])], self)
    }
}

impl Formula for RelationProperty {
    fn compute<A: BoolAlgebra>(&self, alg: &mut A, vars: &Bindings<A::Elem>) -> Result<A::Elem> {
        let rel = vars.get(RELATION)?;
        match self {
            RelationProperty::Reflexive => is_reflexive(alg, rel),
            RelationProperty::Symmetric => is_symmetric(alg, rel),
            RelationProperty::Transitive => is_transitive(alg, rel),
            RelationProperty::Equivalence => is_equivalence(alg, rel),
            RelationProperty::Essential => is_essential(alg, rel),
        }
    }
}

/// Properties of a ternary operation bound to [`OPERATION`].
///
/// Both include the requirement that the tensor is the graph of a function.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum OperationProperty {
    Majority,
    Maltsev,
}

impl OperationProperty {
    /// Problem ranging over all ternary operations on `size` elements.
    pub fn problem(self, size: usize) -> Result<ProblemSpec<Self>> {
        ProblemSpec::new([(OPERATION, vec![size; 4])], self)
    }
}

impl Formula for OperationProperty {
    fn compute<A: BoolAlgebra>(&self, alg: &mut A, vars: &Bindings<A::Elem>) -> Result<A::Elem> {
        let op = vars.get(OPERATION)?;
        let function = is_function(alg, op)?;
        let property = match self {
            OperationProperty::Majority => is_majority(alg, op)?,
            OperationProperty::Maltsev => is_maltsev(alg, op)?,
        };
        Ok(alg.and(&function, &property))
    }
}

/// Relations and operations invariant under a monoid of unary maps.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MonoidQuery {
    UnaryRelations,
    BinaryRelations,
    TernaryRelations,
    EssentialBinaryRelations,
    EssentialTernaryRelations,
    Quasiorders,
    BinaryOperations,
    TernaryOperations,
    EssentialBinaryOperations,
    EssentialTernaryOperations,
    MajorityOperations,
    MaltsevOperations,
}

impl MonoidQuery {
    pub const ALL: [MonoidQuery; 12] = [
        MonoidQuery::UnaryRelations,
        MonoidQuery::BinaryRelations,
        MonoidQuery::TernaryRelations,
        MonoidQuery::EssentialBinaryRelations,
        MonoidQuery::EssentialTernaryRelations,
        MonoidQuery::Quasiorders,
        MonoidQuery::BinaryOperations,
        MonoidQuery::TernaryOperations,
        MonoidQuery::EssentialBinaryOperations,
        MonoidQuery::EssentialTernaryOperations,
        MonoidQuery::MajorityOperations,
        MonoidQuery::MaltsevOperations,
    ];

    /// Name of the single declared variable.
    pub fn variable(self) -> &'static str {
        match self {
            MonoidQuery::UnaryRelations
            | MonoidQuery::BinaryRelations
            | MonoidQuery::TernaryRelations
            | MonoidQuery::EssentialBinaryRelations
            | MonoidQuery::EssentialTernaryRelations
            | MonoidQuery::Quasiorders => RELATION,
            _ => OPERATION,
        }
    }

    /// Rank of the declared variable.
    pub fn rank(self) -> usize {
        match self {
            MonoidQuery::UnaryRelations => 1,
            MonoidQuery::BinaryRelations
            | MonoidQuery::EssentialBinaryRelations
            | MonoidQuery::Quasiorders => 2,
            MonoidQuery::TernaryRelations
            | MonoidQuery::EssentialTernaryRelations
            | MonoidQuery::BinaryOperations
            | MonoidQuery::EssentialBinaryOperations => 3,
            MonoidQuery::TernaryOperations
            | MonoidQuery::EssentialTernaryOperations
            | MonoidQuery::MajorityOperations
            | MonoidQuery::MaltsevOperations => 4,
        }
    }

    pub fn describe(self) -> &'static str {
        match self {
            MonoidQuery::UnaryRelations => "unary relations",
            MonoidQuery::BinaryRelations => "binary relations",
            MonoidQuery::TernaryRelations => "ternary relations",
            MonoidQuery::EssentialBinaryRelations => "essential binary rels",
            MonoidQuery::EssentialTernaryRelations => "essential ternary rels",
            MonoidQuery::Quasiorders => "quasiorder relations",
            MonoidQuery::BinaryOperations => "binary ops",
            MonoidQuery::TernaryOperations => "ternary ops",
            MonoidQuery::EssentialBinaryOperations => "essential binary ops",
            MonoidQuery::EssentialTernaryOperations => "essential ternary ops",
            MonoidQuery::MajorityOperations => "majority ops",
            MonoidQuery::MaltsevOperations => "maltsev ops",
        }
    }
}

/// A [`MonoidQuery`] over one fixed monoid, lifted into every interpreter.
#[derive(Clone, Debug)]
pub struct Invariants {
    monoid: NamedTensor<bool>,
    query: MonoidQuery,
}

impl Invariants {
    pub fn new(monoid: NamedTensor<bool>, query: MonoidQuery) -> Result<Self> {
        monoid_size(&monoid)?;
        Ok(Self { monoid, query })
    }

    pub fn query(&self) -> MonoidQuery {
        self.query
    }

    /// Problem ranging over all relations or operations of the query's shape.
    pub fn problem(self) -> Result<ProblemSpec<Self>> {
        let n = monoid_size(&self.monoid)?;
        let shape = vec![n; self.query.rank()];
        ProblemSpec::new([(self.query.variable(), shape)], self)
    }
}

impl Formula for Invariants {
    fn compute<A: BoolAlgebra>(&self, alg: &mut A, vars: &Bindings<A::Elem>) -> Result<A::Elem> {
        let x = vars.get(self.query.variable())?;
        let monoid = alg.lift_tensor(&self.monoid);
        let parts = match self.query {
            MonoidQuery::UnaryRelations
            | MonoidQuery::BinaryRelations
            | MonoidQuery::TernaryRelations => vec![is_compatible(alg, x, &monoid)?],
            MonoidQuery::EssentialBinaryRelations | MonoidQuery::EssentialTernaryRelations => vec![
                is_compatible(alg, x, &monoid)?,
                is_essential(alg, x)?,
            ],
            MonoidQuery::Quasiorders => vec![
                is_compatible(alg, x, &monoid)?,
                is_reflexive(alg, x)?,
                is_transitive(alg, x)?,
            ],
            MonoidQuery::BinaryOperations | MonoidQuery::TernaryOperations => vec![
                is_function(alg, x)?,
                is_stabilizer(alg, x, &monoid)?,
            ],
            MonoidQuery::EssentialBinaryOperations | MonoidQuery::EssentialTernaryOperations => {
                vec![
                    is_function(alg, x)?,
                    is_stabilizer(alg, x, &monoid)?,
                    is_essential_op(alg, x)?,
                ]
            }
            MonoidQuery::MajorityOperations => vec![
                is_function(alg, x)?,
                is_stabilizer(alg, x, &monoid)?,
                is_majority(alg, x)?,
            ],
            MonoidQuery::MaltsevOperations => vec![
                is_function(alg, x)?,
                is_stabilizer(alg, x, &monoid)?,
                is_maltsev(alg, x)?,
            ],
        };
        Ok(alg.all(&parts))
    }
}

/// Subsets of the rows of a Galois connection that are closed in it.
#[derive(Clone, Debug)]
pub struct ClosedSubsets {
    galois: NamedTensor<bool>,
}

impl ClosedSubsets {
    /// Problem ranging over all subsets of the rows of `galois`, bound to [`SUBSET`].
    pub fn problem(galois: NamedTensor<bool>) -> Result<ProblemSpec<Self>> {
        if galois.rank() != 2 {
            return Err(Error::InvalidAxes(format!(
                "Galois connection must be a matrix, got shape {:?}",
                galois.shape()
            )));
        }
        let rows = galois.shape()[0];
        ProblemSpec::new([(SUBSET, vec![rows])], Self { galois })
    }
}

impl Formula for ClosedSubsets {
    fn compute<A: BoolAlgebra>(&self, alg: &mut A, vars: &Bindings<A::Elem>) -> Result<A::Elem> {
        let galois = alg.lift_tensor(&self.galois);
        is_closed_subset(alg, vars.get(SUBSET)?, &galois)
    }
}
