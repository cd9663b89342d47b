//! Fuzz the table decoder
//!
//! Arbitrary text and base sizes must produce a tensor or an error, never a
//! panic.

#![no_main]

use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let Some((&size, rest)) = data.split_first() else {
        return;
    };
    if let Ok(input) = std::str::from_utf8(rest) {
        if let Ok(tensor) = tensorsat::table::decode(usize::from(size % 8), input) {
            // Decoded tables with in-range codes encode back to the same codes
            if let Ok(encoded) = tensorsat::table::encode(&tensor) {
                let again = tensorsat::table::decode(usize::from(size % 8), &encoded);
                assert_eq!(again.as_ref(), Ok(&tensor));
            }
        }
    }
});
