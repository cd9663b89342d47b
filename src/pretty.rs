//! Human-readable rendering of boolean tensors and solutions.
//!
//! Cells print as `0`/`1`. The last axis runs along a row, the one before it
//! down the rows; each slice of a higher-rank tensor is preceded by its
//! leading index. The output is diagnostic text with no stability guarantee.

use std::fmt;

use crate::problem::Bindings;
use crate::tensor::shape::Indices;
use crate::tensor::NamedTensor;

fn bit(value: bool) -> char {
    if value {
        '1'
    } else {
        '0'
    }
}

/// Write the trailing two axes below the fixed leading `prefix`.
fn write_matrix(
    f: &mut fmt::Formatter<'_>,
    tensor: &NamedTensor<bool>,
    prefix: &[usize],
    rows: usize,
    cols: usize,
) -> fmt::Result {
    let mut index = prefix.to_vec();
    index.extend([0, 0]);
    let (r, c) = (index.len() - 2, index.len() - 1);
    for row in 0..rows {
        index[r] = row;
        for col in 0..cols {
            index[c] = col;
            write!(f, "{}", bit(*tensor.get(&index)))?;
        }
        writeln!(f)?;
    }
    Ok(())
}

impl fmt::Display for NamedTensor<bool> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self.shape() {
            [] => writeln!(f, "{}", bit(*self.get(&[]))),
            [n] => {
                for i in 0..n {
                    write!(f, "{}", bit(*self.get(&[i])))?;
                }
                writeln!(f)
            }
            [rows, cols] => write_matrix(f, self, &[], rows, cols),
            ref shape => {
                let (lead, last) = shape.split_at(shape.len() - 2);
                for (i, prefix) in Indices::new(lead).enumerate() {
                    if i > 0 {
                        writeln!(f)?;
                    }
                    writeln!(f, "{:?}:", prefix)?;
                    write_matrix(f, self, &prefix, last[0], last[1])?;
                }
                Ok(())
            }
        }
    }
}

impl fmt::Display for Bindings<bool> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, (name, tensor)) in self.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            writeln!(f, "{} {:?}", name, tensor.shape())?;
            write!(f, "{}", tensor)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_low_ranks() {
        assert_eq!(NamedTensor::scalar(true).to_string(), "1\n");
        assert_eq!(
            NamedTensor::vector(vec![false, true, true]).to_string(),
            "011\n"
        );
        let identity = NamedTensor::generate(&[2, 3], |i| i[0] == i[1]);
        assert_eq!(identity.to_string(), "100\n010\n");
    }

    #[test]
    fn test_slices_of_rank_three() {
        let t = NamedTensor::generate(&[2, 1, 2], |i| i[0] == i[2]);
        assert_eq!(t.to_string(), "[0]:\n10\n\n[1]:\n01\n");
    }

    #[test]
    fn test_solution() {
        let solution: Bindings<bool> = [
            ("a", NamedTensor::scalar(false)),
            ("b", NamedTensor::vector(vec![true, false])),
        ]
        .into_iter()
        .collect();
        assert_eq!(solution.to_string(), "a []\n0\n\nb [2]\n10\n");
    }
}
