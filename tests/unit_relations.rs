//! Unit tests for relation and operation predicates
//!
//! Model counts are compared against the known numbers of relations and
//! operations with each property.


use generators::all_tensors;
use tensorsat::relations::{
    galois_connection, is_compatible, is_equivalence, is_monoid, is_reflexive, is_symmetric,
    is_transitive, ClosedSubsets, Invariants, MonoidQuery, OperationProperty, RelationProperty,
    OPERATION, RELATION, SUBSET,
};
use tensorsat::table::decode;
use tensorsat::{
    Concrete, EnumerateOptions, Formula, NamedTensor, ProblemSpec, Solution, VarisatSolver,
};

fn count(property: RelationProperty, size: usize) -> usize {
    property
        .problem(size)
        .unwrap()
        .count(&mut VarisatSolver::new())
        .unwrap()
}

#[test]
fn test_identity_is_reflexive() {
    let identity = NamedTensor::generate(&[3, 3], |i| i[0] == i[1]);
    assert!(is_reflexive(&mut Concrete, &identity).unwrap());
    assert!(is_symmetric(&mut Concrete, &identity).unwrap());
    assert!(is_transitive(&mut Concrete, &identity).unwrap());
    assert!(is_equivalence(&mut Concrete, &identity).unwrap());

    let empty = NamedTensor::constant(&[3, 3], false);
    assert!(!is_reflexive(&mut Concrete, &empty).unwrap());
    assert!(is_symmetric(&mut Concrete, &empty).unwrap());
    assert!(is_transitive(&mut Concrete, &empty).unwrap());
}

#[test]
fn test_relation_counts_on_three_elements() {
    // 2^6 choices off the diagonal
    assert_eq!(count(RelationProperty::Reflexive, 3), 64);
    // 2^3 on the diagonal times 2^3 unordered pairs
    assert_eq!(count(RelationProperty::Symmetric, 3), 64);
    assert_eq!(count(RelationProperty::Transitive, 3), 171);
    // partitions of a 3-element set
    assert_eq!(count(RelationProperty::Equivalence, 3), 5);
}

#[test]
fn test_transitive_counts_small() {
    assert_eq!(count(RelationProperty::Transitive, 1), 2);
    assert_eq!(count(RelationProperty::Transitive, 2), 13);
    assert_eq!(count(RelationProperty::Equivalence, 0), 1);
}

#[test]
fn test_essential_matches_brute_force() {
    let problem = RelationProperty::Essential.problem(2).unwrap();
    let expected = all_tensors(&[2, 2])
        .into_iter()
        .filter(|rel| {
            let bindings: Solution = [(RELATION, rel.clone())].into_iter().collect();
            problem.check(&bindings).unwrap()
        })
        .count();
    assert_eq!(problem.count(&mut VarisatSolver::new()).unwrap(), expected);
    assert!(expected > 0);
}

#[test]
fn test_operation_counts_on_two_elements() {
    let mut solver = VarisatSolver::new();
    // every triple over {0, 1} has a majority value
    let majority = OperationProperty::Majority.problem(2).unwrap();
    assert_eq!(majority.count(&mut solver).unwrap(), 1);
    // (0,1,0) and (1,0,1) are unconstrained
    let maltsev = OperationProperty::Maltsev.problem(2).unwrap();
    assert_eq!(maltsev.count(&mut solver).unwrap(), 4);
}

#[test]
fn test_enumerated_relations_pass_check() {
    let problem = RelationProperty::Equivalence.problem(3).unwrap();
    let models = problem
        .enumerate(&mut VarisatSolver::new(), &EnumerateOptions::with_limit(3))
        .unwrap();
    assert_eq!(models.len(), 3);
    for model in &models {
        assert!(problem.check(model).unwrap());
        let rel = model.get(RELATION).unwrap();
        assert!(is_equivalence(&mut Concrete, rel).unwrap());
    }
}

/// Models found by the solver, checked against a sweep over every candidate
fn sat_and_brute_force<F: Formula>(problem: &ProblemSpec<F>, name: &str) -> (usize, usize) {
    let shape = problem.shapes()[name].clone();
    let expected = all_tensors(&shape)
        .into_iter()
        .filter(|candidate| {
            let bindings: Solution = [(name, candidate.clone())].into_iter().collect();
            problem.check(&bindings).unwrap()
        })
        .count();
    (problem.count(&mut VarisatSolver::new()).unwrap(), expected)
}

fn invariants(size: usize, table: &str, query: MonoidQuery) -> ProblemSpec<Invariants> {
    let monoid = decode(size, table).unwrap();
    Invariants::new(monoid, query).unwrap().problem().unwrap()
}

#[test]
fn test_relations_compatible_with_constant_monoid() {
    // identity and the constant 0 on three elements
    let monoid = decode(3, "0 1 2 0 0 0").unwrap();
    assert!(is_monoid(&mut Concrete, &monoid).unwrap());

    // a compatible relation is empty or holds (0,0)
    let binary = invariants(3, "0 1 2 0 0 0", MonoidQuery::BinaryRelations);
    let (found, expected) = sat_and_brute_force(&binary, RELATION);
    assert_eq!(found, expected);
    assert_eq!(found, 1 + (1 << 8));

    let brute: usize = all_tensors(&[3, 3])
        .iter()
        .filter(|rel| is_compatible(&mut Concrete, rel, &monoid).unwrap())
        .count();
    assert_eq!(brute, found);

    let unary = invariants(3, "0 1 2 0 0 0", MonoidQuery::UnaryRelations);
    assert_eq!(sat_and_brute_force(&unary, RELATION), (5, 5));
}

#[test]
fn test_invariant_counts_match_brute_force() {
    for query in [
        MonoidQuery::EssentialBinaryRelations,
        MonoidQuery::Quasiorders,
        MonoidQuery::TernaryRelations,
        MonoidQuery::EssentialTernaryRelations,
        MonoidQuery::BinaryOperations,
        MonoidQuery::EssentialBinaryOperations,
    ] {
        // negation and the identity on two elements
        let problem = invariants(2, "0 1 1 0", query);
        let (found, expected) = sat_and_brute_force(&problem, query.variable());
        assert_eq!(found, expected, "{:?}", query);
    }
}

#[test]
fn test_operations_over_identity_monoid() {
    // only idempotent operations map the diagonal to the identity
    let count = |query| {
        invariants(2, "0 1", query)
            .count(&mut VarisatSolver::new())
            .unwrap()
    };
    assert_eq!(count(MonoidQuery::BinaryOperations), 4);
    // of x, y, x ∧ y and x ∨ y, the last two use both arguments
    assert_eq!(count(MonoidQuery::EssentialBinaryOperations), 2);
    assert_eq!(count(MonoidQuery::MajorityOperations), 1);
    assert_eq!(count(MonoidQuery::MaltsevOperations), 4);
    assert_eq!(count(MonoidQuery::TernaryRelations), 256);
}

#[test]
fn test_closed_subsets_of_collected_models() {
    let mut solver = VarisatSolver::new();
    let everything = EnumerateOptions::default();

    let ops = invariants(2, "0 1", MonoidQuery::BinaryOperations)
        .collect(&mut solver, &everything)
        .unwrap();
    let ops = ops.get(OPERATION).unwrap();
    assert_eq!(ops.shape(), &[2, 2, 2, 4]);

    let rels = invariants(2, "0 1", MonoidQuery::BinaryRelations)
        .collect(&mut solver, &everything)
        .unwrap();
    let rels = rels.get(RELATION).unwrap();
    assert_eq!(rels.shape(), &[2, 2, 16]);

    let galois = galois_connection(ops, rels).unwrap();
    assert_eq!(galois.shape(), &[4, 16]);
    // only the two projections preserve every binary relation
    let universal = galois.fold(1, |row| row.iter().all(|&x| x)).unwrap();
    assert_eq!(universal.iter().filter(|&&x| x).count(), 2);

    let closed = ClosedSubsets::problem(galois).unwrap();
    let (found, expected) = sat_and_brute_force(&closed, SUBSET);
    assert_eq!(found, expected);
    // the set of all operations is always closed
    let all: Solution = [(SUBSET, NamedTensor::constant(&[4], true))]
        .into_iter()
        .collect();
    assert!(closed.check(&all).unwrap());
}
