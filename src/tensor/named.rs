//! Dense immutable tensors with strided views.
//!
//! A [`NamedTensor`] is an affine view (offset plus one stride per axis) into
//! a shared, immutable backing buffer. Every transformation returns a new
//! tensor; `reshape` and `unconcat` only rewrite the view and never copy
//! cells, while `map`, `map2` and `fold` materialize a fresh dense buffer.
//!
//! Cells are always visited in row-major order (last axis fastest).

use std::fmt;
use std::sync::Arc;

use crate::error::{Error, Result};

use super::shape::{checked_size, row_major_strides, size, Indices};

/// Target axis description for [`NamedTensor::reshape`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Axis {
    /// Copy the given source axis (its extent must match).
    Source(usize),
    /// Fresh axis of any extent along which every cell repeats (stride 0).
    Broadcast,
}

/// Immutable multidimensional array over a shared buffer.
#[derive(Clone)]
pub struct NamedTensor<T> {
    shape: Vec<usize>,
    strides: Vec<usize>,
    offset: usize,
    elems: Arc<[T]>,
}

impl<T> NamedTensor<T> {
    fn dense(shape: Vec<usize>, elems: Vec<T>) -> Self {
        debug_assert_eq!(size(&shape), elems.len());
        let strides = row_major_strides(&shape);
        Self {
            shape,
            strides,
            offset: 0,
            elems: elems.into(),
        }
    }

    /// Build a tensor by calling `cell` once per index, in row-major order.
    ///
    /// # Panics
    /// Panics if the number of cells overflows `usize`.
    pub fn generate(shape: &[usize], mut cell: impl FnMut(&[usize]) -> T) -> Self {
        let cells = checked_size(shape).unwrap_or_else(|err| panic!("{}", err));
        let mut elems = Vec::with_capacity(cells);
        let mut indices = Indices::new(shape);
        while let Some(index) = indices.advance() {
            elems.push(cell(index));
        }
        Self::dense(shape.to_vec(), elems)
    }

    /// Tensor whose every cell is `value`, stored once with all-zero strides.
    pub fn constant(shape: &[usize], value: T) -> Self {
        Self {
            shape: shape.to_vec(),
            strides: vec![0; shape.len()],
            offset: 0,
            elems: Arc::from(vec![value]),
        }
    }

    /// Rank-0 tensor holding a single value.
    pub fn scalar(value: T) -> Self {
        Self::constant(&[], value)
    }

    /// Rank-1 tensor over the given elements.
    pub fn vector(elems: Vec<T>) -> Self {
        Self::dense(vec![elems.len()], elems)
    }

    /// Tensor of the given shape over row-major elements.
    pub fn from_vec(shape: &[usize], elems: Vec<T>) -> Result<Self> {
        let expected = checked_size(shape)?;
        if expected != elems.len() {
            return Err(Error::InvalidAxes(format!(
                "shape {:?} needs {} elements, got {}",
                shape,
                expected,
                elems.len()
            )));
        }
        Ok(Self::dense(shape.to_vec(), elems))
    }

    pub fn shape(&self) -> &[usize] {
        &self.shape
    }

    /// Number of axes.
    pub fn rank(&self) -> usize {
        self.shape.len()
    }

    /// Number of cells.
    pub fn len(&self) -> usize {
        size(&self.shape)
    }

    /// True if some axis has extent 0.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn position(&self, index: &[usize]) -> usize {
        assert_eq!(
            index.len(),
            self.rank(),
            "index {:?} has wrong rank for shape {:?}",
            index,
            self.shape
        );
        let mut pos = self.offset;
        for ((&i, &extent), &stride) in index.iter().zip(&self.shape).zip(&self.strides) {
            assert!(i < extent, "index {:?} out of range for shape {:?}", index, self.shape);
            pos += i * stride;
        }
        pos
    }

    /// Cell at `index`.
    ///
    /// # Panics
    /// Panics if `index` has the wrong rank or lies outside the shape.
    pub fn get(&self, index: &[usize]) -> &T {
        &self.elems[self.position(index)]
    }

    /// Iterate over cells in row-major order.
    pub fn iter(&self) -> impl Iterator<Item = &T> + '_ {
        let mut indices = Indices::new(&self.shape);
        std::iter::from_fn(move || {
            let index = indices.advance()?;
            Some(&self.elems[self.position(index)])
        })
    }

    /// Offsets (relative to the view base) of every cell of the trailing
    /// `axes` axes, in row-major order.
    fn trailing_offsets(&self, axes: usize) -> Vec<usize> {
        let split = self.rank() - axes;
        let strides = &self.strides[split..];
        let mut indices = Indices::new(&self.shape[split..]);
        let mut offsets = Vec::new();
        while let Some(index) = indices.advance() {
            offsets.push(index.iter().zip(strides).map(|(i, s)| i * s).sum());
        }
        offsets
    }

    /// Relabel axes through stride arithmetic.
    ///
    /// `axis_map[i]` describes target axis `i`: either a source axis (whose
    /// extent must equal `new_shape[i]`) or a broadcast axis. Source axes not
    /// mentioned are projected to index 0. No cell is copied.
    pub fn reshape(&self, new_shape: &[usize], axis_map: &[Axis]) -> Result<Self> {
        if new_shape.len() != axis_map.len() {
            return Err(Error::InvalidAxes(format!(
                "axis map of length {} for target shape {:?}",
                axis_map.len(),
                new_shape
            )));
        }
        checked_size(new_shape)?;

        let mut strides = Vec::with_capacity(new_shape.len());
        for (&extent, axis) in new_shape.iter().zip(axis_map) {
            match *axis {
                Axis::Source(source) => {
                    if source >= self.rank() {
                        return Err(Error::InvalidAxes(format!(
                            "source axis {} out of range for rank {}",
                            source,
                            self.rank()
                        )));
                    }
                    if self.shape[source] != extent {
                        return Err(Error::shape_mismatch("reshape", &self.shape, new_shape));
                    }
                    strides.push(self.strides[source]);
                }
                Axis::Broadcast => strides.push(0),
            }
        }

        if self.is_empty() && size(new_shape) != 0 {
            return Err(Error::InvalidAxes(format!(
                "cannot view empty tensor of shape {:?} as non-empty shape {:?}",
                self.shape, new_shape
            )));
        }

        Ok(Self {
            shape: new_shape.to_vec(),
            strides,
            offset: self.offset,
            elems: Arc::clone(&self.elems),
        })
    }

    /// Elementwise unary transform.
    pub fn map<U>(&self, mut f: impl FnMut(&T) -> U) -> NamedTensor<U> {
        let elems = self.iter().map(|elem| f(elem)).collect();
        NamedTensor::dense(self.shape.clone(), elems)
    }

    /// Elementwise binary transform; both operands must have the same shape.
    pub fn map2<U, V>(
        a: &NamedTensor<T>,
        b: &NamedTensor<U>,
        mut f: impl FnMut(&T, &U) -> V,
    ) -> Result<NamedTensor<V>> {
        if a.shape != b.shape {
            return Err(Error::shape_mismatch("map2", &a.shape, &b.shape));
        }
        let elems = a.iter().zip(b.iter()).map(|(x, y)| f(x, y)).collect();
        Ok(NamedTensor::dense(a.shape.clone(), elems))
    }

    /// Split the trailing axis into one tensor per coordinate.
    pub fn unconcat(&self) -> Result<Vec<Self>> {
        let Some((&extent, outer)) = self.shape.split_last() else {
            return Err(Error::InvalidAxes("cannot unconcat a rank-0 tensor".into()));
        };
        let stride = self.strides[self.rank() - 1];
        let outer_strides = &self.strides[..self.rank() - 1];

        Ok((0..extent)
            .map(|k| Self {
                shape: outer.to_vec(),
                strides: outer_strides.to_vec(),
                offset: self.offset + k * stride,
                elems: Arc::clone(&self.elems),
            })
            .collect())
    }
}

impl<T: Clone> NamedTensor<T> {
    /// Value of a rank-0 tensor.
    pub fn to_scalar(&self) -> Result<T> {
        if self.rank() != 0 {
            return Err(Error::InvalidAxes(format!(
                "expected a scalar, found shape {:?}",
                self.shape
            )));
        }
        Ok(self.get(&[]).clone())
    }

    /// Cells in row-major order.
    pub fn to_vec(&self) -> Vec<T> {
        self.iter().cloned().collect()
    }

    /// Collapse the trailing `axes` axes.
    ///
    /// `f` receives the cells of each collapsed block in row-major order; for
    /// a block with a zero extent it receives an empty slice.
    pub fn fold<U>(&self, axes: usize, mut f: impl FnMut(&[T]) -> U) -> Result<NamedTensor<U>> {
        if axes > self.rank() {
            return Err(Error::InvalidAxes(format!(
                "cannot fold {} axes of shape {:?}",
                axes, self.shape
            )));
        }
        let split = self.rank() - axes;
        let outer = &self.shape[..split];
        let outer_strides = &self.strides[..split];
        let offsets = self.trailing_offsets(axes);

        let mut block = Vec::with_capacity(offsets.len());
        let mut elems = Vec::with_capacity(size(outer));
        let mut indices = Indices::new(outer);
        while let Some(index) = indices.advance() {
            let base: usize = self.offset
                + index
                    .iter()
                    .zip(outer_strides)
                    .map(|(i, s)| i * s)
                    .sum::<usize>();
            block.clear();
            block.extend(offsets.iter().map(|o| self.elems[base + o].clone()));
            elems.push(f(&block));
        }
        Ok(NamedTensor::dense(outer.to_vec(), elems))
    }

    /// Inverse of [`unconcat`](Self::unconcat): add a trailing axis indexing `parts`.
    pub fn stack(parts: &[NamedTensor<T>]) -> Result<Self> {
        let Some(first) = parts.first() else {
            return Err(Error::InvalidAxes("cannot stack zero tensors".into()));
        };
        if let Some(other) = parts.iter().find(|p| p.shape != first.shape) {
            return Err(Error::shape_mismatch("stack", &first.shape, &other.shape));
        }

        let mut shape = first.shape.clone();
        shape.push(parts.len());
        checked_size(&shape)?;

        let rank = first.rank();
        Ok(Self::generate(&shape, |index| {
            parts[index[rank]].get(&index[..rank]).clone()
        }))
    }
}

impl<T: PartialEq> PartialEq for NamedTensor<T> {
    fn eq(&self, other: &Self) -> bool {
        self.shape == other.shape && self.iter().eq(other.iter())
    }
}

impl<T: Eq> Eq for NamedTensor<T> {}

impl<T: fmt::Debug> fmt::Debug for NamedTensor<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NamedTensor")
            .field("shape", &self.shape)
            .field("cells", &self.iter().collect::<Vec<_>>())
            .finish()
    }
}
