//! Named-axis tensors.
//!
//! A tensor indexed by finite sets A₀, A₁, ..., Aₙ₋₁ is a function
//! [∏ᵢ Aᵢ] → T. Here every tensor is dense and immutable: a strided view into
//! a shared buffer, so relabelling axes (permutation, duplication, broadcast)
//! costs no copy.
//!
//! # Architecture
//!
//! - **shape**: shape validation, strides and row-major index iteration
//! - **named**: the [`NamedTensor`] view and its elementwise operations
//! - **join**: label-based joins and contractions (einsum over any aggregator)

mod join;
mod named;
pub mod shape;

pub use join::{join, reduce, Joined, Labeled};
pub use named::{Axis, NamedTensor};
