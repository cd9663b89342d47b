//! Property tests for tensor operations
//!
//! Tests algebraic properties of named tensors, joins and folds using proptest.


use generators::{arb_nonempty_shape, arb_permutation, arb_tensor, arb_tensor_pair};
use proptest::prelude::*;
use tensorsat::tensor::{join, reduce};
use tensorsat::{Aggregate, Axis, BoolAlgebra, Concrete, Connective, NamedTensor};

// ============================================================================
// Reshape
// ============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(256))]

    /// Permuting axes and permuting back restores every cell
    #[test]
    fn permutation_then_inverse_is_identity(
        (tensor, perm) in arb_tensor(4, 3)
            .prop_flat_map(|t| { let r = t.rank(); (Just(t), arb_permutation(r)) })
    ) {
        let shape = tensor.shape().to_vec();
        let permuted_shape: Vec<usize> = perm.iter().map(|&p| shape[p]).collect();
        let forward: Vec<Axis> = perm.iter().map(|&p| Axis::Source(p)).collect();

        let mut inverse = vec![0; perm.len()];
        for (target, &source) in perm.iter().enumerate() {
            inverse[source] = target;
        }
        let backward: Vec<Axis> = inverse.iter().map(|&i| Axis::Source(i)).collect();

        let permuted = tensor.reshape(&permuted_shape, &forward).unwrap();
        for index in tensorsat::tensor::shape::Indices::new(&permuted_shape) {
            let source: Vec<usize> = inverse.iter().map(|&i| index[i]).collect();
            prop_assert_eq!(permuted.get(&index), tensor.get(&source));
        }
        let restored = permuted.reshape(&shape, &backward).unwrap();
        prop_assert_eq!(restored, tensor);
    }

    /// Broadcasting a new axis repeats the tensor along it
    #[test]
    fn broadcast_repeats_cells(tensor in arb_tensor(3, 3), extent in 1usize..4) {
        let mut shape = tensor.shape().to_vec();
        shape.push(extent);
        let mut axes: Vec<Axis> = (0..tensor.rank()).map(Axis::Source).collect();
        axes.push(Axis::Broadcast);

        let wide = tensor.reshape(&shape, &axes).unwrap();
        for part in wide.unconcat().unwrap() {
            prop_assert_eq!(&part, &tensor);
        }
    }
}

// ============================================================================
// Folds
// ============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(256))]

    /// ALL over true cells and ANY over false cells give their identities
    #[test]
    fn fold_identities(shape in generators::arb_shape(4, 3), k in 0usize..5) {
        let k = k.min(shape.len());
        let mut alg = Concrete;
        let reduced = &shape[..shape.len() - k];

        let all = alg.fold(Aggregate::All, k, &NamedTensor::constant(&shape, true)).unwrap();
        prop_assert_eq!(all.shape(), reduced);
        prop_assert!(all.iter().all(|&x| x));

        let any = alg.fold(Aggregate::Any, k, &NamedTensor::constant(&shape, false)).unwrap();
        prop_assert_eq!(any.shape(), reduced);
        prop_assert!(any.iter().all(|&x| !x));
    }

    /// Folding one axis agrees with folding each slice of unconcat
    #[test]
    fn fold_matches_manual_count(tensor in arb_tensor(3, 3).prop_filter("rank", |t| t.rank() > 0)) {
        let ones = tensor.fold(1, |block| block.iter().filter(|&&x| x).count()).unwrap();
        let mut alg = Concrete;
        let one = alg.fold(Aggregate::One, 1, &tensor).unwrap();
        let eqs = alg.fold(Aggregate::Eqs, 1, &tensor).unwrap();
        let width = *tensor.shape().last().unwrap();

        for ((&count, &is_one), &is_eq) in ones.iter().zip(one.iter()).zip(eqs.iter()) {
            prop_assert_eq!(is_one, count == 1);
            prop_assert_eq!(is_eq, count == 0 || count == width);
        }
    }

    /// Folding too many axes is rejected
    #[test]
    fn fold_rejects_excess_axes(tensor in arb_tensor(3, 2)) {
        prop_assert!(tensor.fold(tensor.rank() + 1, |b| b.len()).is_err());
    }
}

// ============================================================================
// Elementwise and stacking
// ============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(256))]

    /// map2 applies the connective cell by cell
    #[test]
    fn map2_is_cellwise((a, b) in arb_tensor_pair(3, 3)) {
        let mut alg = Concrete;
        let imp = alg.map2(Connective::Imp, &a, &b).unwrap();
        let expected: Vec<bool> = a.iter().zip(b.iter()).map(|(&x, &y)| !x || y).collect();
        prop_assert_eq!(imp.to_vec(), expected);
    }

    /// unconcat followed by stack is the identity
    #[test]
    fn unconcat_then_stack(shape in arb_nonempty_shape(3, 3).prop_filter("rank", |s| !s.is_empty())) {
        let tensor = NamedTensor::generate(&shape, |i| i.iter().sum::<usize>() % 2 == 0);
        let parts = tensor.unconcat().unwrap();
        prop_assert_eq!(parts.len(), *shape.last().unwrap());
        prop_assert_eq!(NamedTensor::stack(&parts).unwrap(), tensor);
    }
}

// ============================================================================
// Joins
// ============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(128))]

    /// Composition through reduce matches the triple loop
    #[test]
    fn reduce_composes_relations(
        (r, s) in (1usize..4, 1usize..4, 1usize..4).prop_flat_map(|(x, y, z)| (
            generators::arb_bool_tensor(vec![x, y]),
            generators::arb_bool_tensor(vec![y, z]),
        ))
    ) {
        let composed = reduce(
            "xz",
            &[r.named("xy"), s.named("yz")],
            |v| v[0] && v[1],
            |block| block.iter().any(|&x| x),
        ).unwrap();
        let (x, y, z) = (r.shape()[0], r.shape()[1], s.shape()[1]);
        prop_assert_eq!(composed.shape(), &[x, z]);
        for i in 0..x {
            for k in 0..z {
                let expected = (0..y).any(|j| *r.get(&[i, j]) && *s.get(&[j, k]));
                prop_assert_eq!(*composed.get(&[i, k]), expected);
            }
        }
    }

    /// Joining with every label in the output keeps all cells in place
    #[test]
    fn join_identity_layout(tensor in arb_tensor(3, 3)) {
        let labels: String = "abc".chars().take(tensor.rank()).collect();
        let joined = join(&labels, &[tensor.named(&labels)], |v| v[0]).unwrap();
        prop_assert_eq!(joined.folded, 0);
        prop_assert_eq!(joined.labels, labels);
        prop_assert_eq!(joined.tensor, tensor);
    }
}
