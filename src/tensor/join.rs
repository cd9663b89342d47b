//! Named-axis joins and contractions.
//!
//! Operands are tensors whose axes carry single-character labels
//! (`rel.named("xy")`). Axes sharing a label are identified, so a join over
//! `"xy"` and `"yz"` ranges over all `(x, y, z)` where both operands are
//! indexed consistently. A label repeated inside one operand selects that
//! operand's diagonal.
//!
//! [`join`] computes a pointwise combination over the joint index space;
//! [`reduce`] then folds away every label absent from the output:
//!
//! ```ignore
//! // composition of relations: ∃y. R(x,y) ∧ S(y,z)
//! let composed = reduce("xz", &[r.named("xy"), s.named("yz")], |v| v[0] && v[1], |b| b.iter().any(|&x| x))?;
//! ```

use crate::error::{Error, Result};

use super::named::NamedTensor;

/// A tensor together with one label per axis.
#[derive(Clone, Copy, Debug)]
pub struct Labeled<'a, T> {
    tensor: &'a NamedTensor<T>,
    labels: &'a str,
}

impl<'a, T> Labeled<'a, T> {
    pub fn tensor(&self) -> &'a NamedTensor<T> {
        self.tensor
    }

    pub fn labels(&self) -> &'a str {
        self.labels
    }
}

impl<T> NamedTensor<T> {
    /// Attach axis labels for use in [`join`] or [`reduce`].
    ///
    /// The label count is validated when the operand is used.
    pub fn named<'a>(&'a self, labels: &'a str) -> Labeled<'a, T> {
        Labeled {
            tensor: self,
            labels,
        }
    }
}

/// Result of a [`join`]: output axes first, then `folded` trailing axes.
#[derive(Clone, Debug, PartialEq)]
pub struct Joined<U> {
    pub tensor: NamedTensor<U>,
    /// Labels of all axes of `tensor`, in order.
    pub labels: String,
    /// Number of trailing axes that do not belong to the output.
    pub folded: usize,
}

/// Label extents in order of first appearance across operands.
fn label_extents<T>(operands: &[Labeled<'_, T>]) -> Result<Vec<(char, usize)>> {
    let mut extents: Vec<(char, usize, usize)> = Vec::new();

    for (op_idx, operand) in operands.iter().enumerate() {
        let shape = operand.tensor.shape();
        let count = operand.labels.chars().count();
        if count != shape.len() {
            return Err(Error::InvalidLabels(format!(
                "labels '{}' do not fit rank-{} operand",
                operand.labels,
                shape.len()
            )));
        }

        for (label, &extent) in operand.labels.chars().zip(shape) {
            match extents.iter().find(|(l, _, _)| *l == label) {
                Some(&(_, known, owner)) if known != extent => {
                    return Err(Error::shape_mismatch(
                        "reduce",
                        operands[owner].tensor.shape(),
                        shape,
                    ));
                }
                Some(_) => {}
                None => extents.push((label, extent, op_idx)),
            }
        }
    }

    Ok(extents.into_iter().map(|(l, e, _)| (l, e)).collect())
}

/// Pointwise combination of `operands` over their joint index space.
///
/// The result has one axis per label of `output` (in that order) followed by
/// one axis per remaining label (in order of first appearance). `combine`
/// receives one cell per operand, in operand order.
pub fn join<T: Clone, U>(
    output: &str,
    operands: &[Labeled<'_, T>],
    mut combine: impl FnMut(&[T]) -> U,
) -> Result<Joined<U>> {
    if operands.is_empty() {
        return Err(Error::InvalidLabels("join needs at least one operand".into()));
    }
    let extents = label_extents(operands)?;

    let mut joint: Vec<(char, usize)> = Vec::with_capacity(extents.len());
    for label in output.chars() {
        if joint.iter().any(|(l, _)| *l == label) {
            return Err(Error::InvalidLabels(format!(
                "output label '{}' repeated in '{}'",
                label, output
            )));
        }
        let Some(&entry) = extents.iter().find(|(l, _)| *l == label) else {
            return Err(Error::InvalidLabels(format!(
                "output label '{}' does not occur in any operand",
                label
            )));
        };
        joint.push(entry);
    }
    let kept = joint.len();
    joint.extend(extents.iter().filter(|(l, _)| !output.contains(*l)).copied());

    // For each operand axis, the joint axis it reads its coordinate from
    let slots: Vec<Vec<usize>> = operands
        .iter()
        .map(|operand| {
            operand
                .labels
                .chars()
                .map(|label| joint.iter().position(|(l, _)| *l == label).unwrap_or(0))
                .collect()
        })
        .collect();

    let shape: Vec<usize> = joint.iter().map(|(_, e)| *e).collect();
    super::shape::checked_size(&shape)?;

    let mut cells: Vec<T> = Vec::with_capacity(operands.len());
    let mut coords: Vec<usize> = Vec::new();
    let tensor = NamedTensor::generate(&shape, |index| {
        cells.clear();
        for (operand, slot) in operands.iter().zip(&slots) {
            coords.clear();
            coords.extend(slot.iter().map(|&s| index[s]));
            cells.push(operand.tensor.get(&coords).clone());
        }
        combine(&cells)
    });

    Ok(Joined {
        tensor,
        labels: joint.iter().map(|(l, _)| *l).collect(),
        folded: joint.len() - kept,
    })
}

/// Contraction: [`join`] with `combine`, then fold every non-output label
/// with `aggregate`.
pub fn reduce<T: Clone, U: Clone>(
    output: &str,
    operands: &[Labeled<'_, T>],
    combine: impl FnMut(&[T]) -> U,
    aggregate: impl FnMut(&[U]) -> U,
) -> Result<NamedTensor<U>> {
    let joined = join(output, operands, combine)?;
    joined.tensor.fold(joined.folded, aggregate)
}
