//! Direct evaluation on truth values.

use super::BoolAlgebra;

/// The two-element boolean algebra on `bool`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Concrete;

impl BoolAlgebra for Concrete {
    type Elem = bool;

    #[inline]
    fn lift(&mut self, value: bool) -> bool {
        value
    }

    #[inline]
    fn not(&mut self, a: &bool) -> bool {
        !*a
    }

    #[inline]
    fn and(&mut self, a: &bool, b: &bool) -> bool {
        *a && *b
    }

    #[inline]
    fn or(&mut self, a: &bool, b: &bool) -> bool {
        *a || *b
    }

    #[inline]
    fn equ(&mut self, a: &bool, b: &bool) -> bool {
        a == b
    }

    #[inline]
    fn imp(&mut self, a: &bool, b: &bool) -> bool {
        !*a || *b
    }

    fn all(&mut self, elems: &[bool]) -> bool {
        elems.iter().all(|&x| x)
    }

    fn any(&mut self, elems: &[bool]) -> bool {
        elems.iter().any(|&x| x)
    }

    fn one(&mut self, elems: &[bool]) -> bool {
        let mut seen = 0u8;
        for _ in elems.iter().filter(|&&x| x) {
            seen += 1;
            if seen == 2 {
                return false;
            }
        }
        seen == 1
    }

    fn eqs(&mut self, elems: &[bool]) -> bool {
        elems.windows(2).all(|w| w[0] == w[1])
    }
}
