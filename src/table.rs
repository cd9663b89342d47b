//! Compact table encodings.
//!
//! A table is a string of decimal codes separated by spaces, listed in
//! row-major order, e.g. `"0 1 2 1 2 0"`. Decoding a table of base `size`
//! with `n` codes yields a boolean tensor of shape `[size, size, n / size]`
//! whose cell `[v, i, k]` is true iff code number `k * size + i` equals `v`:
//! the `k`-th block of `size` codes, read as a map `i ↦ code`, in relational
//! form.

use chumsky::prelude::*;

use crate::error::{render_report, Error, Result};
use crate::tensor::NamedTensor;

/// Parser for the space-separated code list.
fn codes() -> impl Parser<char, Vec<usize>, Error = Simple<char>> {
    let code = text::digits(10).try_map(|digits: String, span| {
        digits
            .parse::<usize>()
            .map_err(|_| Simple::custom(span, format!("code {} is too large", digits)))
    });
    let gap = just(' ').repeated();

    gap.clone()
        .ignore_then(code.then_ignore(gap).repeated())
        .then_ignore(end())
}

/// Parse the codes of a table without interpreting them.
pub fn parse_codes(text: &str) -> Result<Vec<usize>> {
    codes().parse(text).map_err(|errors| {
        let report = errors
            .iter()
            .map(|error| {
                let message = match (error.reason(), error.found()) {
                    (chumsky::error::SimpleReason::Custom(msg), _) => msg.clone(),
                    (_, Some(c)) => format!("unexpected character '{}'", c.escape_default()),
                    (_, None) => "unexpected end of input".to_string(),
                };
                render_report(text, error.span(), &message)
            })
            .collect::<Vec<_>>()
            .join("\n");
        Error::MalformedInput(report)
    })
}

/// Decode a table of base `size` into its relational tensor.
pub fn decode(size: usize, text: &str) -> Result<NamedTensor<bool>> {
    if size == 0 {
        return Err(Error::MalformedInput("table base size must be positive".into()));
    }
    let codes = parse_codes(text)?;
    if codes.len() % size != 0 {
        return Err(Error::MalformedInput(format!(
            "{} codes do not fill rows of {}",
            codes.len(),
            size
        )));
    }

    let blocks = codes.len() / size;
    Ok(NamedTensor::generate(&[size, size, blocks], |index| {
        codes[index[2] * size + index[1]] == index[0]
    }))
}

/// Encode a tensor of shape `[size, size, n]` back into table form.
///
/// Each column `[·, i, k]` must hold exactly one true cell.
pub fn encode(table: &NamedTensor<bool>) -> Result<String> {
    let &[size, inputs, blocks] = table.shape() else {
        return Err(Error::InvalidAxes(format!(
            "table tensor must have rank 3, found shape {:?}",
            table.shape()
        )));
    };

    let mut codes = Vec::with_capacity(inputs * blocks);
    for k in 0..blocks {
        for i in 0..inputs {
            let mut values = (0..size).filter(|&v| *table.get(&[v, i, k]));
            let (Some(v), None) = (values.next(), values.next()) else {
                return Err(Error::MalformedInput(format!(
                    "cell ({}, {}) does not hold exactly one value",
                    i, k
                )));
            };
            codes.push(v.to_string());
        }
    }
    Ok(codes.join(" "))
}
