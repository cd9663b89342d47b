//! Shapes, strides and index iteration.
//!
//! All iteration in the crate is row-major: the last axis varies fastest.

use crate::error::{Error, Result};

/// Number of cells in a shape, failing on overflow.
pub fn checked_size(shape: &[usize]) -> Result<usize> {
    shape.iter().try_fold(1usize, |acc, &extent| {
        acc.checked_mul(extent)
            .ok_or_else(|| Error::InvalidAxes(format!("shape {:?} is too large", shape)))
    })
}

/// Number of cells in a shape already known not to overflow.
pub(crate) fn size(shape: &[usize]) -> usize {
    shape.iter().product()
}

/// Row-major strides of a dense buffer with the given shape.
pub(crate) fn row_major_strides(shape: &[usize]) -> Vec<usize> {
    let mut strides = vec![0; shape.len()];
    let mut step = 1;
    for i in (0..shape.len()).rev() {
        strides[i] = step;
        step *= shape[i];
    }
    strides
}

// ============================================================================
// ITERATORS
// ============================================================================

/// Row-major walk over every index of a shape.
///
/// [`advance`](Indices::advance) lends the current index from one reused
/// buffer; the `Iterator` impl copies it out for callers that keep indices.
/// The walk is empty when some extent is zero and holds exactly one empty
/// index for rank 0.
#[derive(Clone, Debug)]
pub struct Indices {
    shape: Vec<usize>,
    index: Vec<usize>,
    state: Walk,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Walk {
    Start,
    Inside,
    Finished,
}

impl Indices {
    pub fn new(shape: &[usize]) -> Self {
        Self {
            shape: shape.to_vec(),
            index: vec![0; shape.len()],
            state: Walk::Start,
        }
    }

    /// Step to the next index and borrow it, or `None` once the walk is over.
    pub fn advance(&mut self) -> Option<&[usize]> {
        self.state = match self.state {
            Walk::Finished => Walk::Finished,
            Walk::Start if self.shape.contains(&0) => Walk::Finished,
            Walk::Start => Walk::Inside,
            Walk::Inside => {
                // bump the last axis below its extent and zero the axes after it
                let carry = self
                    .index
                    .iter()
                    .zip(&self.shape)
                    .rposition(|(&i, &extent)| i + 1 < extent);
                match carry {
                    Some(axis) => {
                        self.index[axis] += 1;
                        self.index[axis + 1..].fill(0);
                        Walk::Inside
                    }
                    None => Walk::Finished,
                }
            }
        };
        match self.state {
            Walk::Finished => None,
            _ => Some(&self.index),
        }
    }
}

impl Iterator for Indices {
    type Item = Vec<usize>;

    fn next(&mut self) -> Option<Self::Item> {
        self.advance().map(<[usize]>::to_vec)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_indices_row_major() {
        let all: Vec<_> = Indices::new(&[2, 3]).collect();
        assert_eq!(all.len(), 6);
        assert_eq!(all[0], vec![0, 0]);
        assert_eq!(all[1], vec![0, 1]);
        assert_eq!(all[3], vec![1, 0]);
        assert_eq!(all[5], vec![1, 2]);
    }

    #[test]
    fn test_indices_degenerate() {
        assert_eq!(Indices::new(&[]).count(), 1);
        assert_eq!(Indices::new(&[3, 0, 2]).count(), 0);
    }

    #[test]
    fn test_advance_reuses_buffer() {
        let mut walk = Indices::new(&[2, 1, 2]);
        let mut seen = Vec::new();
        let mut buffer = None;
        while let Some(index) = walk.advance() {
            let at = index.as_ptr();
            assert_eq!(*buffer.get_or_insert(at), at);
            seen.push(index.to_vec());
        }
        assert_eq!(
            seen,
            vec![vec![0, 0, 0], vec![0, 0, 1], vec![1, 0, 0], vec![1, 0, 1]]
        );
        // stays finished
        assert_eq!(walk.advance(), None);
        assert_eq!(walk.next(), None);

        let mut scalar = Indices::new(&[]);
        assert_eq!(scalar.advance(), Some(&[][..]));
        assert_eq!(scalar.advance(), None);
    }

    #[test]
    fn test_strides_and_size() {
        assert_eq!(row_major_strides(&[2, 3, 4]), vec![12, 4, 1]);
        assert_eq!(checked_size(&[2, 3, 4]).unwrap(), 24);
        assert_eq!(checked_size(&[]).unwrap(), 1);
        assert!(checked_size(&[usize::MAX, 2]).is_err());
    }
}
